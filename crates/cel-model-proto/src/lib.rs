//! Wire format and schema-backed types for the CEL type model.
//!
//! This crate converts [`CelType`](cel_model_types::CelType) to and from the
//! cel-spec `cel.expr.Type` protobuf message, and builds struct and enum types
//! from protobuf descriptors.
//!
//! # Example
//!
//! ```
//! use cel_model_types::CelType;
//! use cel_model_proto::{type_to_wire, wire_to_type};
//!
//! let ty = CelType::map(CelType::String, CelType::list(CelType::Int));
//! let wire = type_to_wire(&ty).unwrap();
//! assert_eq!(wire_to_type(&wire).unwrap(), ty);
//! ```

mod error;
pub mod gen;
mod provider;
pub mod schema;
mod type_conversion;

pub use error::WireError;
pub use provider::{SchemaFieldLookup, SchemaRegistry, SchemaTypeProvider, SchemaTypeProviderBuilder};
pub use schema::{EnumSchema, FieldSchema, FieldType, MessageSchema};
pub use type_conversion::{decode_type, encode_type, type_to_wire, wire_to_type};

// Re-export the wire message for convenience
pub use gen::cel::expr::Type as WireType;
