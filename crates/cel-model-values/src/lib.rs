//! CEL runtime values.
//!
//! This crate provides the [`Value`] tagged union with zero values and
//! equality, struct values backed by protobuf messages (through a descriptor
//! pool or through a lightweight schema registry), preservation of unknown
//! fields, and adaptation of values to and from JSON.
//!
//! # Example
//!
//! ```
//! use cel_model_values::{to_json, MapKey, Value};
//!
//! let value = Value::map([(MapKey::string("big"), Value::Int(1 << 60))]);
//! assert_eq!(to_json(&value).unwrap().to_string(), r#"{"big":"1152921504606846976"}"#);
//! assert!(!value.is_zero_value());
//! ```

mod error;
mod json;
mod lite;
mod message;
mod time;
mod unknown;
mod value;

pub use error::ValueError;
pub use json::{from_json, to_json, JsonAdapter, OpaqueJsonConverter, MAX_SAFE_INTEGER};
pub use lite::LiteMessageValue;
pub use message::{ProtoMessageValue, ProtoValueConverter};
pub use time::{
    duration_to_json, format_duration, format_timestamp, timestamp_to_json, Duration, Timestamp,
    NANOS_PER_SECOND,
};
pub use unknown::{UnknownField, UnknownFieldSet};
pub use value::{
    AsAny, EnumValue, MapKey, OpaqueEq, OpaqueValue, OptionalValue, StructValue, Value, ValueMap,
};
