//! JSON adaptation.
//!
//! Values map onto `serde_json` following the protobuf JSON conventions:
//! 64-bit integers outside the range a double represents exactly become
//! decimal strings, bytes become base64, and timestamps and durations use
//! their canonical string forms.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map as JsonMap, Number, Value as JsonValue};

use cel_model_proto::schema::to_json_name;
use cel_model_types::well_known::{DURATION_MESSAGE, FIELD_MASK_MESSAGE, TIMESTAMP_MESSAGE};

use crate::error::ValueError;
use crate::time::{duration_to_json, timestamp_to_json};
use crate::value::{MapKey, OpaqueValue, OptionalValue, StructValue, Value, ValueMap};

/// Largest integer magnitude a JSON number carries without loss (2^53 - 1).
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// Converts opaque host values that have no JSON form of their own.
pub type OpaqueJsonConverter =
    Arc<dyn Fn(&dyn OpaqueValue) -> Option<JsonValue> + Send + Sync>;

/// Converts values to JSON.
#[derive(Clone, Default)]
pub struct JsonAdapter {
    opaque_converter: Option<OpaqueJsonConverter>,
}

impl JsonAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `converter` for opaque values whose `to_json` returns `None`.
    pub fn with_opaque_converter<F>(mut self, converter: F) -> Self
    where
        F: Fn(&dyn OpaqueValue) -> Option<JsonValue> + Send + Sync + 'static,
    {
        self.opaque_converter = Some(Arc::new(converter));
        self
    }

    /// Convert a value to JSON.
    pub fn to_json(&self, value: &Value) -> Result<JsonValue, ValueError> {
        match value {
            Value::Null => Ok(JsonValue::Null),
            Value::Bool(b) => Ok(JsonValue::Bool(*b)),
            Value::Int(i) => Ok(if i.unsigned_abs() <= MAX_SAFE_INTEGER as u64 {
                JsonValue::Number((*i).into())
            } else {
                JsonValue::String(i.to_string())
            }),
            Value::UInt(u) => Ok(if *u <= MAX_SAFE_INTEGER as u64 {
                JsonValue::Number((*u).into())
            } else {
                JsonValue::String(u.to_string())
            }),
            Value::Double(d) => Ok(double_to_json(*d)),
            Value::String(s) => Ok(JsonValue::String(s.to_string())),
            Value::Bytes(b) => Ok(JsonValue::String(STANDARD.encode(b))),
            Value::Duration(d) => duration_to_json(d)
                .map(JsonValue::String)
                .ok_or_else(|| ValueError::json(DURATION_MESSAGE, "duration out of range")),
            Value::Timestamp(t) => timestamp_to_json(t)
                .map(JsonValue::String)
                .ok_or_else(|| ValueError::json(TIMESTAMP_MESSAGE, "timestamp out of range")),
            Value::List(items) => items
                .iter()
                .map(|item| self.to_json(item))
                .collect::<Result<Vec<_>, _>>()
                .map(JsonValue::Array),
            Value::Map(map) => self.map_to_json(map),
            Value::Struct(s) => self.struct_to_json(s.as_ref()),
            Value::Enum(e) => Ok(JsonValue::Number(e.number.into())),
            Value::Optional(OptionalValue::Some(v)) => self.to_json(v),
            Value::Optional(OptionalValue::None) => Ok(JsonValue::Null),
            Value::Opaque(o) => o
                .to_json()
                .or_else(|| self.opaque_converter.as_ref().and_then(|c| c(o.as_ref())))
                .ok_or_else(|| {
                    ValueError::json(o.runtime_type_name(), "no JSON representation")
                }),
            Value::Type(_) | Value::Error(_) => Err(ValueError::json(
                value.cel_type().name(),
                "no JSON representation",
            )),
        }
    }

    fn map_to_json(&self, map: &ValueMap) -> Result<JsonValue, ValueError> {
        let mut object = JsonMap::new();
        for (key, value) in map.iter() {
            let MapKey::String(key) = key else {
                return Err(ValueError::NonStringMapKey(
                    key.to_value().cel_type().to_string(),
                ));
            };
            object.insert(key.to_string(), self.to_json(value)?);
        }
        Ok(JsonValue::Object(object))
    }

    fn struct_to_json(&self, value: &dyn StructValue) -> Result<JsonValue, ValueError> {
        if value.cel_type().name() == FIELD_MASK_MESSAGE {
            return field_mask_to_json(value);
        }
        let mut object = JsonMap::new();
        for (name, field) in value.set_fields()? {
            object.insert(name, self.to_json(&field)?);
        }
        Ok(JsonValue::Object(object))
    }
}

impl std::fmt::Debug for JsonAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonAdapter")
            .field("opaque_converter", &self.opaque_converter.is_some())
            .finish()
    }
}

fn double_to_json(d: f64) -> JsonValue {
    match Number::from_f64(d) {
        Some(n) => JsonValue::Number(n),
        None if d.is_nan() => JsonValue::String("NaN".to_string()),
        None if d.is_sign_positive() => JsonValue::String("Infinity".to_string()),
        None => JsonValue::String("-Infinity".to_string()),
    }
}

/// `paths` joined by commas, each path segment in lower camel case.
fn field_mask_to_json(mask: &dyn StructValue) -> Result<JsonValue, ValueError> {
    let paths = mask.select("paths")?;
    let Some(paths) = paths.as_list() else {
        return Err(ValueError::type_mismatch("list(string)", paths.cel_type().name()));
    };
    let mut rendered = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path
            .as_string()
            .ok_or_else(|| ValueError::type_mismatch("string", path.cel_type().name()))?;
        let segments: Vec<String> = path.split('.').map(to_json_name).collect();
        rendered.push(segments.join("."));
    }
    Ok(JsonValue::String(rendered.join(",")))
}

/// Convert a value to JSON with the default adapter.
pub fn to_json(value: &Value) -> Result<JsonValue, ValueError> {
    JsonAdapter::new().to_json(value)
}

/// Convert JSON to a value, the way `google.protobuf.Value` maps to values.
/// Numbers become doubles.
pub fn from_json(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
        JsonValue::String(s) => Value::string(s.as_str()),
        JsonValue::Array(items) => Value::list(items.iter().map(from_json).collect::<Vec<_>>()),
        JsonValue::Object(object) => Value::map(
            object
                .iter()
                .map(|(k, v)| (MapKey::string(k.as_str()), from_json(v))),
        ),
    }
}
