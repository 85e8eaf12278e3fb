//! Conversion between CelType and the `cel.expr.Type` wire message.
//!
//! ## Round-trip notes
//!
//! - The unparameterized list is encoded as a `ListType` with no element
//!   type and decodes back to `CelType::List(None)`, distinct from `list(dyn)`.
//! - Struct types carry only their name on the wire and decode to
//!   `CelType::StructRef`, which compares equal to the struct type.
//! - Enum types encode as `int`, their kind. The enum name is not preserved.
//! - Optionals encode as the abstract type `optional`.
//! - The legacy `google.api.expr.v1alpha1.Type` message uses the same field
//!   numbers, so [`decode_type`] and [`encode_type`] serve both dialects.

use prost::Message;

use crate::error::WireError;
use crate::gen::cel::expr::r#type::{
    AbstractType as ProtoAbstractType, FunctionType as ProtoFunctionType,
    ListType as ProtoListType, MapType as ProtoMapType, PrimitiveType as ProtoPrimitiveType,
    TypeKind as ProtoTypeKind, WellKnownType as ProtoWellKnownType,
};
use crate::gen::cel::expr::Type as ProtoType;
use cel_model_types::{CelType, OPTIONAL_TYPE_NAME, OPTIONAL_WIRE_NAME};

/// Convert a wire Type to a CelType.
pub fn wire_to_type(proto: &ProtoType) -> Result<CelType, WireError> {
    let Some(kind) = &proto.type_kind else {
        return Ok(CelType::Unspecified);
    };
    let ty = match kind {
        ProtoTypeKind::Dyn(()) => CelType::Dyn,
        ProtoTypeKind::Null(_) => CelType::Null,
        ProtoTypeKind::Error(()) => CelType::Error,
        ProtoTypeKind::Primitive(p) => primitive_from_proto(*p).ok_or_else(|| unsupported(proto))?,
        ProtoTypeKind::Wrapper(p) => {
            CelType::nullable(primitive_from_proto(*p).ok_or_else(|| unsupported(proto))?)
        }
        ProtoTypeKind::WellKnown(w) => match ProtoWellKnownType::try_from(*w) {
            Ok(ProtoWellKnownType::Any) => CelType::Any,
            Ok(ProtoWellKnownType::Timestamp) => CelType::Timestamp,
            Ok(ProtoWellKnownType::Duration) => CelType::Duration,
            _ => return Err(unsupported(proto)),
        },
        ProtoTypeKind::ListType(list) => match &list.elem_type {
            Some(elem) => CelType::list(wire_to_type(elem)?),
            None => CelType::unparameterized_list(),
        },
        ProtoTypeKind::MapType(map) => {
            let (Some(key), Some(value)) = (&map.key_type, &map.value_type) else {
                return Err(unsupported(proto));
            };
            CelType::map(wire_to_type(key)?, wire_to_type(value)?)
        }
        ProtoTypeKind::Function(func) => {
            let result = func.result_type.as_ref().ok_or_else(|| unsupported(proto))?;
            let args = func
                .arg_types
                .iter()
                .map(wire_to_type)
                .collect::<Result<Vec<_>, _>>()?;
            CelType::function(wire_to_type(result)?, &args)
        }
        ProtoTypeKind::MessageType(name) => CelType::struct_ref(name),
        ProtoTypeKind::TypeParam(name) => CelType::type_param(name),
        ProtoTypeKind::Type(inner) => CelType::type_of(wire_to_type(inner)?),
        ProtoTypeKind::AbstractType(abs) => {
            let params = abs
                .parameter_types
                .iter()
                .map(wire_to_type)
                .collect::<Result<Vec<_>, _>>()?;
            match abs.name.as_str() {
                OPTIONAL_WIRE_NAME | OPTIONAL_TYPE_NAME => CelType::try_optional(&params)?,
                name => CelType::opaque(name, &params),
            }
        }
    };
    Ok(ty)
}

/// Convert a CelType to a wire Type.
pub fn type_to_wire(cel_type: &CelType) -> Result<ProtoType, WireError> {
    let type_kind = match cel_type {
        CelType::Bool | CelType::Int | CelType::UInt | CelType::Double | CelType::String
        | CelType::Bytes => ProtoTypeKind::Primitive(primitive_to_proto(cel_type) as i32),
        CelType::Any => ProtoTypeKind::WellKnown(ProtoWellKnownType::Any as i32),
        CelType::Timestamp => ProtoTypeKind::WellKnown(ProtoWellKnownType::Timestamp as i32),
        CelType::Duration => ProtoTypeKind::WellKnown(ProtoWellKnownType::Duration as i32),
        CelType::Dyn => ProtoTypeKind::Dyn(()),
        CelType::Null => ProtoTypeKind::Null(prost_types::NullValue::NullValue as i32),
        CelType::Error => ProtoTypeKind::Error(()),
        CelType::List(elem) => ProtoTypeKind::ListType(Box::new(ProtoListType {
            elem_type: match elem {
                Some(elem) => Some(Box::new(type_to_wire(elem)?)),
                None => None,
            },
        })),
        CelType::Map(key, value) => ProtoTypeKind::MapType(Box::new(ProtoMapType {
            key_type: Some(Box::new(type_to_wire(key)?)),
            value_type: Some(Box::new(type_to_wire(value)?)),
        })),
        // Optionals travel as `optional`; any other arity cannot round-trip
        CelType::Opaque { name, .. }
            if matches!(&**name, OPTIONAL_TYPE_NAME | OPTIONAL_WIRE_NAME) =>
        {
            return Err(WireError::UnsupportedType(cel_type.to_string()));
        }
        CelType::Opaque { name, params } => match cel_type.function_parts() {
            Some((result, args)) => ProtoTypeKind::Function(Box::new(ProtoFunctionType {
                result_type: Some(Box::new(type_to_wire(result)?)),
                arg_types: args.iter().map(type_to_wire).collect::<Result<_, _>>()?,
            })),
            None => ProtoTypeKind::AbstractType(ProtoAbstractType {
                name: name.to_string(),
                parameter_types: params.iter().map(type_to_wire).collect::<Result<_, _>>()?,
            }),
        },
        CelType::Optional(inner) => ProtoTypeKind::AbstractType(ProtoAbstractType {
            name: OPTIONAL_WIRE_NAME.to_string(),
            parameter_types: vec![type_to_wire(inner)?],
        }),
        CelType::Type(inner) => ProtoTypeKind::Type(Box::new(type_to_wire(inner)?)),
        CelType::TypeParam(name) => ProtoTypeKind::TypeParam(name.to_string()),
        CelType::Struct(_) | CelType::StructRef(_) => {
            ProtoTypeKind::MessageType(cel_type.name().to_string())
        }
        // Enums lose their name on the wire; see module docs
        CelType::Enum(_) => ProtoTypeKind::Primitive(ProtoPrimitiveType::Int64 as i32),
        CelType::Nullable(target) if target.is_primitive() => {
            ProtoTypeKind::Wrapper(primitive_to_proto(target) as i32)
        }
        CelType::Nullable(_) => return Err(WireError::UnsupportedType(cel_type.to_string())),
        CelType::Unspecified => return Ok(ProtoType { type_kind: None }),
    };

    Ok(ProtoType {
        type_kind: Some(type_kind),
    })
}

/// Encode a CelType as the binary `cel.expr.Type` message.
pub fn encode_type(cel_type: &CelType) -> Result<Vec<u8>, WireError> {
    Ok(type_to_wire(cel_type)?.encode_to_vec())
}

/// Decode a CelType from a binary `cel.expr.Type` or legacy v1alpha1 `Type` message.
pub fn decode_type(bytes: &[u8]) -> Result<CelType, WireError> {
    let proto = ProtoType::decode(bytes)?;
    wire_to_type(&proto)
}

fn primitive_from_proto(value: i32) -> Option<CelType> {
    match ProtoPrimitiveType::try_from(value).ok()? {
        ProtoPrimitiveType::Bool => Some(CelType::Bool),
        ProtoPrimitiveType::Int64 => Some(CelType::Int),
        ProtoPrimitiveType::Uint64 => Some(CelType::UInt),
        ProtoPrimitiveType::Double => Some(CelType::Double),
        ProtoPrimitiveType::String => Some(CelType::String),
        ProtoPrimitiveType::Bytes => Some(CelType::Bytes),
        ProtoPrimitiveType::Unspecified => None,
    }
}

fn primitive_to_proto(cel_type: &CelType) -> ProtoPrimitiveType {
    match cel_type {
        CelType::Bool => ProtoPrimitiveType::Bool,
        CelType::Int => ProtoPrimitiveType::Int64,
        CelType::UInt => ProtoPrimitiveType::Uint64,
        CelType::Double => ProtoPrimitiveType::Double,
        CelType::String => ProtoPrimitiveType::String,
        CelType::Bytes => ProtoPrimitiveType::Bytes,
        _ => ProtoPrimitiveType::Unspecified,
    }
}

fn unsupported(proto: &ProtoType) -> WireError {
    WireError::UnsupportedWireType(format!("{proto:?}"))
}

impl TryFrom<&ProtoType> for CelType {
    type Error = WireError;

    fn try_from(proto: &ProtoType) -> Result<Self, WireError> {
        wire_to_type(proto)
    }
}

impl TryFrom<&CelType> for ProtoType {
    type Error = WireError;

    fn try_from(cel_type: &CelType) -> Result<Self, WireError> {
        type_to_wire(cel_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cel_model_types::{EnumType, Kind, StructType};

    fn roundtrip(cel_type: &CelType) -> CelType {
        let proto = type_to_wire(cel_type).unwrap();
        wire_to_type(&proto).unwrap()
    }

    #[test]
    fn primitive_roundtrip() {
        for cel_type in [
            CelType::Bool,
            CelType::Int,
            CelType::UInt,
            CelType::Double,
            CelType::String,
            CelType::Bytes,
        ] {
            assert_eq!(roundtrip(&cel_type), cel_type);
        }
    }

    #[test]
    fn sentinel_roundtrip() {
        for cel_type in [
            CelType::Dyn,
            CelType::Null,
            CelType::Error,
            CelType::Any,
            CelType::Timestamp,
            CelType::Duration,
            CelType::Unspecified,
        ] {
            assert_eq!(roundtrip(&cel_type), cel_type);
        }
    }

    #[test]
    fn unspecified_is_unset_kind() {
        let proto = type_to_wire(&CelType::Unspecified).unwrap();
        assert!(proto.type_kind.is_none());
        assert_eq!(wire_to_type(&ProtoType::default()).unwrap(), CelType::Unspecified);
    }

    #[test]
    fn nested_roundtrip() {
        let cel_type = CelType::map(
            CelType::String,
            CelType::list(CelType::type_of(CelType::type_param("T"))),
        );
        assert_eq!(roundtrip(&cel_type), cel_type);
    }

    #[test]
    fn unparameterized_list_stays_distinct() {
        let proto = type_to_wire(&CelType::unparameterized_list()).unwrap();
        match &proto.type_kind {
            Some(ProtoTypeKind::ListType(list)) => assert!(list.elem_type.is_none()),
            other => panic!("expected list type, got {other:?}"),
        }
        assert_eq!(roundtrip(&CelType::unparameterized_list()), CelType::unparameterized_list());
        assert_ne!(roundtrip(&CelType::list(CelType::Dyn)), CelType::unparameterized_list());
    }

    #[test]
    fn wrapper_roundtrip() {
        let nullable = CelType::nullable(CelType::Int);
        let proto = type_to_wire(&nullable).unwrap();
        assert_eq!(
            proto.type_kind,
            Some(ProtoTypeKind::Wrapper(ProtoPrimitiveType::Int64 as i32))
        );
        assert_eq!(wire_to_type(&proto).unwrap(), nullable);
    }

    #[test]
    fn nullable_of_composite_is_unsupported() {
        let err = type_to_wire(&CelType::nullable(CelType::list(CelType::Int))).unwrap_err();
        assert!(matches!(err, WireError::UnsupportedType(_)));
    }

    #[test]
    fn function_uses_function_record() {
        let func = CelType::function(CelType::Bool, &[CelType::String, CelType::Int]);
        let proto = type_to_wire(&func).unwrap();
        match &proto.type_kind {
            Some(ProtoTypeKind::Function(f)) => {
                assert_eq!(f.arg_types.len(), 2);
                assert!(f.result_type.is_some());
            }
            other => panic!("expected function type, got {other:?}"),
        }
        let back = wire_to_type(&proto).unwrap();
        assert_eq!(back, func);
        assert_eq!(back.kind(), Kind::Function);
    }

    #[test]
    fn optional_uses_abstract_record() {
        let optional = CelType::optional(CelType::String);
        let proto = type_to_wire(&optional).unwrap();
        match &proto.type_kind {
            Some(ProtoTypeKind::AbstractType(abs)) => assert_eq!(abs.name, "optional"),
            other => panic!("expected abstract type, got {other:?}"),
        }
        assert_eq!(wire_to_type(&proto).unwrap(), optional);

        let by_type_name = ProtoType {
            type_kind: Some(ProtoTypeKind::AbstractType(ProtoAbstractType {
                name: "optional_type".to_string(),
                parameter_types: vec![type_to_wire(&CelType::Int).unwrap()],
            })),
        };
        assert_eq!(wire_to_type(&by_type_name).unwrap(), CelType::optional(CelType::Int));
    }

    #[test]
    fn optional_with_wrong_arity_fails() {
        let proto = ProtoType {
            type_kind: Some(ProtoTypeKind::AbstractType(ProtoAbstractType {
                name: "optional".to_string(),
                parameter_types: vec![],
            })),
        };
        assert!(matches!(wire_to_type(&proto), Err(WireError::InvalidType(_))));
    }

    #[test]
    fn abstract_type_roundtrip() {
        let cel_type = CelType::opaque("custom.Container", &[CelType::Int, CelType::String]);
        assert_eq!(roundtrip(&cel_type), cel_type);
    }

    #[test]
    fn struct_encodes_name_only() {
        let full = CelType::Struct(StructType::from_fields(
            "pkg.Msg",
            [("id".to_string(), CelType::Int)],
        ));
        let proto = type_to_wire(&full).unwrap();
        assert_eq!(
            proto.type_kind,
            Some(ProtoTypeKind::MessageType("pkg.Msg".to_string()))
        );
        let back = wire_to_type(&proto).unwrap();
        assert!(matches!(back, CelType::StructRef(_)));
        assert_eq!(back, full);
    }

    #[test]
    fn enum_encodes_as_int() {
        let color = CelType::Enum(EnumType::new("pkg.Color", [("RED".to_string(), 0)]));
        assert_eq!(roundtrip(&color), CelType::Int);
    }

    #[test]
    fn unspecified_primitive_is_rejected() {
        let proto = ProtoType {
            type_kind: Some(ProtoTypeKind::Primitive(ProtoPrimitiveType::Unspecified as i32)),
        };
        assert!(matches!(
            wire_to_type(&proto),
            Err(WireError::UnsupportedWireType(_))
        ));

        let bad_well_known = ProtoType {
            type_kind: Some(ProtoTypeKind::WellKnown(42)),
        };
        assert!(wire_to_type(&bad_well_known).is_err());
    }

    #[test]
    fn binary_roundtrip() {
        let cel_type = CelType::map(CelType::String, CelType::nullable(CelType::Double));
        let bytes = encode_type(&cel_type).unwrap();
        assert_eq!(decode_type(&bytes).unwrap(), cel_type);
        assert!(matches!(decode_type(&[0xff, 0xff]), Err(WireError::Decode(_))));
    }

    #[test]
    fn optional_named_opaque_types_round_trip() {
        for name in [OPTIONAL_TYPE_NAME, OPTIONAL_WIRE_NAME] {
            let cel_type = CelType::opaque(name, &[CelType::String]);
            let back = wire_to_type(&type_to_wire(&cel_type).unwrap()).unwrap();
            assert_eq!(back, CelType::optional(CelType::String));
        }

        let malformed = CelType::opaque(OPTIONAL_TYPE_NAME, &[CelType::Int, CelType::Int]);
        assert!(matches!(
            type_to_wire(&malformed),
            Err(WireError::UnsupportedType(_))
        ));
    }

    #[test]
    fn try_from_traits() {
        let cel_type = CelType::Int;
        let proto = ProtoType::try_from(&cel_type).unwrap();
        let back = CelType::try_from(&proto).unwrap();
        assert_eq!(cel_type, back);
    }
}
