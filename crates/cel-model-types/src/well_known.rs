//! Well-known protobuf message types and their CEL equivalents.
//!
//! Consulted before generic message resolution, so a field of type
//! `google.protobuf.Int64Value` resolves to `wrapper(int)` rather than to a
//! struct type.

use crate::types::CelType;

pub const ANY_MESSAGE: &str = "google.protobuf.Any";
pub const DURATION_MESSAGE: &str = "google.protobuf.Duration";
pub const TIMESTAMP_MESSAGE: &str = "google.protobuf.Timestamp";
pub const STRUCT_MESSAGE: &str = "google.protobuf.Struct";
pub const VALUE_MESSAGE: &str = "google.protobuf.Value";
pub const LIST_VALUE_MESSAGE: &str = "google.protobuf.ListValue";
pub const EMPTY_MESSAGE: &str = "google.protobuf.Empty";
pub const FIELD_MASK_MESSAGE: &str = "google.protobuf.FieldMask";

pub const BOOL_VALUE_MESSAGE: &str = "google.protobuf.BoolValue";
pub const BYTES_VALUE_MESSAGE: &str = "google.protobuf.BytesValue";
pub const DOUBLE_VALUE_MESSAGE: &str = "google.protobuf.DoubleValue";
pub const FLOAT_VALUE_MESSAGE: &str = "google.protobuf.FloatValue";
pub const INT32_VALUE_MESSAGE: &str = "google.protobuf.Int32Value";
pub const INT64_VALUE_MESSAGE: &str = "google.protobuf.Int64Value";
pub const STRING_VALUE_MESSAGE: &str = "google.protobuf.StringValue";
pub const UINT32_VALUE_MESSAGE: &str = "google.protobuf.UInt32Value";
pub const UINT64_VALUE_MESSAGE: &str = "google.protobuf.UInt64Value";

/// All message names with a well-known mapping.
pub const WELL_KNOWN_MESSAGES: &[&str] = &[
    ANY_MESSAGE,
    DURATION_MESSAGE,
    TIMESTAMP_MESSAGE,
    STRUCT_MESSAGE,
    VALUE_MESSAGE,
    LIST_VALUE_MESSAGE,
    BOOL_VALUE_MESSAGE,
    BYTES_VALUE_MESSAGE,
    DOUBLE_VALUE_MESSAGE,
    FLOAT_VALUE_MESSAGE,
    INT32_VALUE_MESSAGE,
    INT64_VALUE_MESSAGE,
    STRING_VALUE_MESSAGE,
    UINT32_VALUE_MESSAGE,
    UINT64_VALUE_MESSAGE,
];

/// Convert a well-known message name to its CEL type.
///
/// - `google.protobuf.Timestamp` -> `Timestamp`
/// - `google.protobuf.Duration` -> `Duration`
/// - Wrapper types -> `Nullable(primitive)`
/// - `google.protobuf.Struct` -> `map(string, dyn)`
/// - `google.protobuf.Value` -> `dyn`
/// - `google.protobuf.ListValue` -> `list(dyn)`
/// - `google.protobuf.Any` -> `any`
pub fn well_known_type(full_name: &str) -> Option<CelType> {
    let ty = match full_name {
        TIMESTAMP_MESSAGE => CelType::Timestamp,
        DURATION_MESSAGE => CelType::Duration,

        BOOL_VALUE_MESSAGE => CelType::nullable(CelType::Bool),
        INT32_VALUE_MESSAGE | INT64_VALUE_MESSAGE => CelType::nullable(CelType::Int),
        UINT32_VALUE_MESSAGE | UINT64_VALUE_MESSAGE => CelType::nullable(CelType::UInt),
        FLOAT_VALUE_MESSAGE | DOUBLE_VALUE_MESSAGE => CelType::nullable(CelType::Double),
        STRING_VALUE_MESSAGE => CelType::nullable(CelType::String),
        BYTES_VALUE_MESSAGE => CelType::nullable(CelType::Bytes),

        STRUCT_MESSAGE => CelType::map(CelType::String, CelType::Dyn),
        VALUE_MESSAGE => CelType::Dyn,
        LIST_VALUE_MESSAGE => CelType::list(CelType::Dyn),
        ANY_MESSAGE => CelType::Any,

        _ => return None,
    };
    Some(ty)
}

/// The canonical message name for a CEL type with a well-known encoding.
///
/// Where several messages map to the same type, the 64-bit variant wins.
pub fn well_known_message_name(ty: &CelType) -> Option<&'static str> {
    let name = match ty {
        CelType::Timestamp => TIMESTAMP_MESSAGE,
        CelType::Duration => DURATION_MESSAGE,
        CelType::Any => ANY_MESSAGE,
        CelType::Dyn => VALUE_MESSAGE,
        CelType::Nullable(target) => match **target {
            CelType::Bool => BOOL_VALUE_MESSAGE,
            CelType::Int => INT64_VALUE_MESSAGE,
            CelType::UInt => UINT64_VALUE_MESSAGE,
            CelType::Double => DOUBLE_VALUE_MESSAGE,
            CelType::String => STRING_VALUE_MESSAGE,
            CelType::Bytes => BYTES_VALUE_MESSAGE,
            _ => return None,
        },
        CelType::Map(key, value)
            if matches!(**key, CelType::String) && matches!(**value, CelType::Dyn) =>
        {
            STRUCT_MESSAGE
        }
        CelType::List(Some(elem)) if matches!(**elem, CelType::Dyn) => LIST_VALUE_MESSAGE,
        _ => return None,
    };
    Some(name)
}

/// Returns true for the protobuf wrapper messages.
pub fn is_wrapper_message(full_name: &str) -> bool {
    matches!(
        well_known_type(full_name),
        Some(CelType::Nullable(_))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_type_mapping() {
        assert_eq!(well_known_type(TIMESTAMP_MESSAGE), Some(CelType::Timestamp));
        assert_eq!(well_known_type(DURATION_MESSAGE), Some(CelType::Duration));
        assert_eq!(
            well_known_type(INT64_VALUE_MESSAGE),
            Some(CelType::nullable(CelType::Int))
        );
        assert_eq!(
            well_known_type(INT32_VALUE_MESSAGE),
            Some(CelType::nullable(CelType::Int))
        );
        assert_eq!(
            well_known_type(STRUCT_MESSAGE),
            Some(CelType::map(CelType::String, CelType::Dyn))
        );
        assert_eq!(well_known_type(VALUE_MESSAGE), Some(CelType::Dyn));
        assert_eq!(well_known_type(ANY_MESSAGE), Some(CelType::Any));
        assert_eq!(well_known_type("my.package.MyMessage"), None);
    }

    #[test]
    fn reverse_mapping_prefers_64_bit() {
        assert_eq!(
            well_known_message_name(&CelType::nullable(CelType::Int)),
            Some(INT64_VALUE_MESSAGE)
        );
        assert_eq!(
            well_known_message_name(&CelType::list(CelType::Dyn)),
            Some(LIST_VALUE_MESSAGE)
        );
        assert_eq!(well_known_message_name(&CelType::list(CelType::Int)), None);
    }

    #[test]
    fn every_message_maps_back_to_its_type() {
        for name in WELL_KNOWN_MESSAGES {
            let ty = well_known_type(name).unwrap();
            let canonical = well_known_message_name(&ty).unwrap();
            assert_eq!(well_known_type(canonical), Some(ty));
        }
    }

    #[test]
    fn wrappers() {
        assert!(is_wrapper_message(BOOL_VALUE_MESSAGE));
        assert!(is_wrapper_message(UINT32_VALUE_MESSAGE));
        assert!(!is_wrapper_message(TIMESTAMP_MESSAGE));
    }
}
