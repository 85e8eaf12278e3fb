//! Value resolution and conversion errors.

use thiserror::Error;

/// Errors raised while resolving fields or converting values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    /// A field was selected that the message does not declare.
    #[error("field '{field}' is not declared in message '{message}'")]
    FieldNotDeclared { field: String, message: String },

    /// A value has no canonical JSON representation.
    #[error("cannot adapt {value_type} to JSON: {reason}")]
    JsonAdaptation { value_type: String, reason: String },

    /// JSON objects require string keys.
    #[error("unsupported map key type for JSON: {0}")]
    NonStringMapKey(String),

    /// A message type is not known to the schema source.
    #[error("unknown message type '{0}'")]
    UnknownMessage(String),

    /// Binary message data could not be parsed.
    #[error("failed to parse message '{message}': {reason}")]
    Parse { message: String, reason: String },

    /// A value has a different type than required.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// A `google.protobuf.Any` could not be unpacked.
    #[error("invalid google.protobuf.Any: {0}")]
    InvalidAny(String),
}

impl ValueError {
    pub fn field_not_declared(field: &str, message: &str) -> Self {
        ValueError::FieldNotDeclared {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    pub fn parse(message: &str, reason: impl ToString) -> Self {
        ValueError::Parse {
            message: message.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn type_mismatch(expected: &str, actual: &str) -> Self {
        ValueError::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn json(value_type: &str, reason: impl Into<String>) -> Self {
        ValueError::JsonAdaptation {
            value_type: value_type.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_names_field_and_message() {
        let err = ValueError::field_not_declared("bogus", "pkg.Msg");
        let text = err.to_string();
        assert!(text.contains("bogus"));
        assert!(text.contains("pkg.Msg"));
    }
}
