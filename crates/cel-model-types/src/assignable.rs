//! The assignability relation used by the type checker.

use crate::types::CelType;

impl CelType {
    /// Returns true if this type is assignable from another type.
    ///
    /// Type `a` is assignable from type `b` if a value of type `b` can be
    /// used where a value of type `a` is expected.
    ///
    /// # Rules
    /// - `Dyn` and `Any` are assignable from every type
    /// - `Int` is assignable from any enum type
    /// - `Nullable(T)` is assignable from `T`-compatible types and from `null`
    /// - A scalar is assignable from a nullable type that accepts it
    /// - Struct types compare by fully qualified name
    /// - Parameterized types compare their immediate parameters pairwise
    /// - The JSON union accepts bool, double, null, string and JSON containers
    pub fn is_assignable_from(&self, other: &CelType) -> bool {
        match self {
            CelType::Dyn | CelType::Any => true,

            CelType::Nullable(target) => {
                self == other || matches!(other, CelType::Null) || target.is_assignable_from(other)
            }

            CelType::Struct(_) | CelType::StructRef(_) => match other.struct_name() {
                Some(name) => name == self.name(),
                None => self == other,
            },

            _ if self.is_json() => is_json_assignable(other),

            CelType::List(_)
            | CelType::Map(_, _)
            | CelType::Type(_)
            | CelType::Optional(_)
            | CelType::Opaque { .. } => self == other || self.parameters_assignable_from(other),

            CelType::Int if matches!(other, CelType::Enum(_)) => true,

            _ => {
                self == other
                    || (matches!(other, CelType::Nullable(_)) && other.is_assignable_from(self))
            }
        }
    }

    /// Same kind, name and arity, with every parameter of `self` assignable
    /// from the matching parameter of `other`.
    fn parameters_assignable_from(&self, other: &CelType) -> bool {
        if self.kind() != other.kind() || self.name() != other.name() {
            return false;
        }
        let mine = effective_parameters(self);
        let theirs = effective_parameters(other);
        mine.len() == theirs.len()
            && mine
                .iter()
                .zip(theirs.iter())
                .all(|(a, b)| a.is_assignable_from(b))
    }
}

/// Parameters for assignability, reading the unparameterized list as `list(dyn)`.
fn effective_parameters(ty: &CelType) -> Vec<CelType> {
    match ty {
        CelType::List(None) => vec![CelType::Dyn],
        _ => ty.parameters(),
    }
}

fn is_json_assignable(other: &CelType) -> bool {
    if other.is_json() {
        return true;
    }
    match other {
        CelType::Bool | CelType::Double | CelType::Null | CelType::String => true,
        CelType::List(Some(elem)) => is_json_assignable(elem),
        CelType::Map(key, value) => matches!(**key, CelType::String) && is_json_assignable(value),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{EnumType, StructType};
    use crate::CelType;

    fn sample_types() -> Vec<CelType> {
        vec![
            CelType::Bool,
            CelType::Int,
            CelType::UInt,
            CelType::Double,
            CelType::String,
            CelType::Bytes,
            CelType::Duration,
            CelType::Timestamp,
            CelType::Null,
            CelType::Error,
            CelType::Unspecified,
            CelType::unparameterized_list(),
            CelType::list(CelType::Int),
            CelType::map(CelType::String, CelType::Dyn),
            CelType::type_of(CelType::String),
            CelType::optional(CelType::Double),
            CelType::opaque("vector", &[CelType::Int]),
            CelType::function(CelType::Int, &[CelType::String]),
            CelType::type_param("T"),
            CelType::struct_ref("pkg.Msg"),
            CelType::Struct(StructType::from_fields("pkg.Full", [])),
            CelType::Enum(EnumType::new("pkg.Color", [("RED".to_string(), 0)])),
            CelType::nullable(CelType::Int),
            CelType::json(),
        ]
    }

    #[test]
    fn reflexive() {
        for ty in sample_types() {
            assert!(ty.is_assignable_from(&ty), "{ty} should accept itself");
        }
    }

    #[test]
    fn dyn_absorbs_everything() {
        for ty in sample_types() {
            assert!(CelType::Dyn.is_assignable_from(&ty), "dyn should accept {ty}");
            assert!(CelType::Any.is_assignable_from(&ty), "any should accept {ty}");
        }
    }

    #[test]
    fn enums_widen_to_int() {
        let color = CelType::Enum(EnumType::new("pkg.Color", [("RED".to_string(), 0)]));
        assert!(CelType::Int.is_assignable_from(&color));
        assert!(!CelType::UInt.is_assignable_from(&color));
        assert!(!color.is_assignable_from(&CelType::Int));
    }

    #[test]
    fn nullable_union() {
        let nullable_int = CelType::nullable(CelType::Int);
        assert!(nullable_int.is_assignable_from(&CelType::Int));
        assert!(nullable_int.is_assignable_from(&CelType::Null));
        assert!(!nullable_int.is_assignable_from(&CelType::String));

        assert!(CelType::Int.is_assignable_from(&nullable_int));
        assert!(!CelType::String.is_assignable_from(&nullable_int));
    }

    #[test]
    fn structs_are_nominal() {
        let full = CelType::Struct(StructType::from_fields("pkg.Msg", []));
        let reference = CelType::struct_ref("pkg.Msg");
        assert!(full.is_assignable_from(&reference));
        assert!(reference.is_assignable_from(&full));
        assert!(!reference.is_assignable_from(&CelType::struct_ref("pkg.Other")));
        assert!(!reference.is_assignable_from(&CelType::Int));
    }

    #[test]
    fn parameterized_compare_children() {
        let list_dyn = CelType::list(CelType::Dyn);
        assert!(list_dyn.is_assignable_from(&CelType::list(CelType::Int)));
        assert!(!CelType::list(CelType::Int).is_assignable_from(&list_dyn));
        assert!(list_dyn.is_assignable_from(&CelType::unparameterized_list()));
        assert!(CelType::unparameterized_list().is_assignable_from(&CelType::list(CelType::String)));

        let map_dyn = CelType::map(CelType::Dyn, CelType::Dyn);
        assert!(map_dyn.is_assignable_from(&CelType::map(CelType::String, CelType::Int)));
        assert!(!map_dyn.is_assignable_from(&CelType::list(CelType::Int)));

        assert!(!CelType::opaque("vector", &[CelType::Int])
            .is_assignable_from(&CelType::opaque("matrix", &[CelType::Int])));
        assert!(!CelType::opaque("vector", &[CelType::Int])
            .is_assignable_from(&CelType::opaque("vector", &[CelType::Int, CelType::Int])));
    }

    #[test]
    fn json_union() {
        let json = CelType::json();
        assert!(json.is_assignable_from(&CelType::Bool));
        assert!(json.is_assignable_from(&CelType::Double));
        assert!(json.is_assignable_from(&CelType::Null));
        assert!(json.is_assignable_from(&CelType::String));
        assert!(json.is_assignable_from(&CelType::list(CelType::Double)));
        assert!(json.is_assignable_from(&CelType::map(
            CelType::String,
            CelType::list(CelType::json())
        )));

        assert!(!json.is_assignable_from(&CelType::Int));
        assert!(!json.is_assignable_from(&CelType::map(CelType::Int, CelType::String)));
        assert!(!json.is_assignable_from(&CelType::list(CelType::Bytes)));
    }
}
