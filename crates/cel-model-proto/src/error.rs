//! Wire conversion error types.

use cel_model_types::TypeError;
use thiserror::Error;

/// Errors that can occur converting between type nodes and the wire format.
#[derive(Debug, Error)]
pub enum WireError {
    /// A type node has no wire representation.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// A wire value has no type node mapping.
    #[error("unsupported wire type: {0}")]
    UnsupportedWireType(String),

    /// A decoded wire type violates a parameter arity rule.
    #[error(transparent)]
    InvalidType(#[from] TypeError),

    /// The binary encoding could not be decoded.
    #[error("failed to decode type: {0}")]
    Decode(#[from] prost::DecodeError),

    /// A descriptor set could not be loaded.
    #[error("invalid descriptor set: {0}")]
    Descriptor(#[from] prost_reflect::DescriptorError),
}
