//! Type construction errors.

use thiserror::Error;

/// Errors raised while constructing type nodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// A parameterized type was given the wrong number of parameters.
    #[error("type '{type_name}' expects {expected} parameter(s), got {actual}")]
    InvalidArity {
        type_name: &'static str,
        expected: &'static str,
        actual: usize,
    },
}

impl TypeError {
    pub(crate) fn arity(type_name: &'static str, expected: &'static str, actual: usize) -> Self {
        TypeError::InvalidArity {
            type_name,
            expected,
            actual,
        }
    }
}
