//! CEL type algebra.
//!
//! This crate provides the type representation shared by the CEL checker and
//! evaluator: a closed [`Kind`] taxonomy, the recursive [`CelType`] node,
//! assignability, canonical formatting and named-type providers.
//!
//! # Example
//!
//! ```
//! use cel_model_types::{CelType, Kind};
//!
//! let list_of_int = CelType::list(CelType::Int);
//! assert_eq!(list_of_int.kind(), Kind::List);
//! assert_eq!(list_of_int.to_string(), "list(int)");
//!
//! let list_of_dyn = CelType::list(CelType::Dyn);
//! assert!(list_of_dyn.is_assignable_from(&list_of_int));
//! ```

mod assignable;
mod error;
mod format;
mod kind;
mod provider;
mod types;
pub mod well_known;

pub use error::TypeError;
pub use format::{format, format_function};
pub use kind::Kind;
pub use provider::{BuiltinTypeProvider, CombinedTypeProvider, TypeProvider, TypeTable};
pub use types::{
    CelType, EnumType, FieldLookup, FieldMap, StructType, FUNCTION_TYPE_NAME, JSON_TYPE_NAME,
    OPTIONAL_TYPE_NAME, OPTIONAL_WIRE_NAME,
};
