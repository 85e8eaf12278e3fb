//! Struct values backed by `prost_reflect` dynamic messages.
//!
//! [`ProtoValueConverter`] turns dynamic messages and their field values into
//! [`Value`]s. Well-known messages unwrap to native values: wrappers to
//! scalars, `Timestamp`/`Duration` to time values, `Struct`/`Value`/`ListValue`
//! to maps, lists and scalars, and `Any` to the value of the packed message.
//! Every other message becomes a [`ProtoMessageValue`].

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use prost_reflect::{
    Cardinality, DescriptorPool, DynamicMessage, ExtensionDescriptor, FieldDescriptor, Kind,
    MapKey as ReflectMapKey, ReflectMessage, Value as ReflectValue,
};
use tracing::trace;

use cel_model_types::well_known::{
    is_wrapper_message, ANY_MESSAGE, DURATION_MESSAGE, LIST_VALUE_MESSAGE, STRUCT_MESSAGE,
    TIMESTAMP_MESSAGE, VALUE_MESSAGE,
};
use cel_model_types::{CelType, TypeProvider};

use crate::error::ValueError;
use crate::value::{EnumValue, MapKey, StructValue, Value, ValueMap};

// ==================== Converter ====================

/// Converts dynamic messages to values.
///
/// The pool resolves extensions and `Any` payloads; the provider supplies the
/// struct and enum types reported by converted values.
pub struct ProtoValueConverter {
    pool: DescriptorPool,
    provider: Arc<dyn TypeProvider>,
}

impl ProtoValueConverter {
    pub fn new(pool: DescriptorPool, provider: Arc<dyn TypeProvider>) -> Self {
        Self { pool, provider }
    }

    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// Decode `data` as the message `type_name` and convert it.
    pub fn decode(self: &Arc<Self>, type_name: &str, data: &[u8]) -> Result<Value, ValueError> {
        let descriptor = self
            .pool
            .get_message_by_name(type_name)
            .ok_or_else(|| ValueError::UnknownMessage(type_name.to_string()))?;
        let message =
            DynamicMessage::decode(descriptor, data).map_err(|e| ValueError::parse(type_name, e))?;
        self.message_to_value(message)
    }

    /// Convert a message, unwrapping well-known types.
    pub fn message_to_value(self: &Arc<Self>, message: DynamicMessage) -> Result<Value, ValueError> {
        let descriptor = message.descriptor();
        let value = match descriptor.full_name() {
            TIMESTAMP_MESSAGE => {
                let (seconds, nanos) = seconds_nanos(&message);
                Value::timestamp(seconds, nanos)
            }
            DURATION_MESSAGE => {
                let (seconds, nanos) = seconds_nanos(&message);
                Value::duration(seconds, nanos)
            }
            VALUE_MESSAGE => self.json_value(&message)?,
            STRUCT_MESSAGE => self.json_struct(&message)?,
            LIST_VALUE_MESSAGE => self.json_list(&message)?,
            ANY_MESSAGE => self.unpack_any(&message)?,
            name if is_wrapper_message(name) => match descriptor.get_field_by_name("value") {
                Some(field) => self.convert(&message.get_field(&field), &field.kind())?,
                None => Value::Null,
            },
            _ => Value::Struct(Arc::new(ProtoMessageValue {
                message,
                converter: Arc::clone(self),
            })),
        };
        Ok(value)
    }

    /// Convert a field value of the given kind.
    fn convert(self: &Arc<Self>, value: &ReflectValue, kind: &Kind) -> Result<Value, ValueError> {
        let converted = match value {
            ReflectValue::Bool(b) => Value::Bool(*b),
            ReflectValue::I32(i) => Value::Int(i64::from(*i)),
            ReflectValue::I64(i) => Value::Int(*i),
            ReflectValue::U32(u) => Value::UInt(u64::from(*u)),
            ReflectValue::U64(u) => Value::UInt(*u),
            ReflectValue::F32(f) => Value::Double(f64::from(*f)),
            ReflectValue::F64(d) => Value::Double(*d),
            ReflectValue::String(s) => Value::string(s.as_str()),
            ReflectValue::Bytes(b) => Value::bytes(b.to_vec()),
            ReflectValue::EnumNumber(n) => self.enum_value(kind, *n),
            ReflectValue::Message(m) => self.message_to_value(m.clone())?,
            ReflectValue::List(items) => Value::list(
                items
                    .iter()
                    .map(|item| self.convert(item, kind))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            ReflectValue::Map(entries) => {
                let Kind::Message(entry) = kind else {
                    return Err(ValueError::type_mismatch("map entry", &format!("{kind:?}")));
                };
                let value_kind = entry.map_entry_value_field().kind();
                let mut map = ValueMap::new();
                for (key, value) in entries {
                    map.insert(map_key(key), self.convert(value, &value_kind)?);
                }
                Value::Map(Arc::new(map))
            }
        };
        Ok(converted)
    }

    fn enum_value(&self, kind: &Kind, number: i32) -> Value {
        if let Kind::Enum(descriptor) = kind {
            if let Some(CelType::Enum(enum_type)) = self.provider.find_type(descriptor.full_name()) {
                return Value::Enum(EnumValue::new(enum_type, number));
            }
        }
        Value::Int(i64::from(number))
    }

    // ==================== google.protobuf.Value/Struct/ListValue ====================

    fn json_value(self: &Arc<Self>, message: &DynamicMessage) -> Result<Value, ValueError> {
        // The `kind` oneof holds at most one field
        let Some((field, value)) = message.fields().next() else {
            return Ok(Value::Null);
        };
        match (field.name(), value) {
            ("null_value", _) => Ok(Value::Null),
            ("bool_value", ReflectValue::Bool(b)) => Ok(Value::Bool(*b)),
            ("number_value", ReflectValue::F64(d)) => Ok(Value::Double(*d)),
            ("string_value", ReflectValue::String(s)) => Ok(Value::string(s.as_str())),
            ("struct_value", ReflectValue::Message(m)) => self.json_struct(m),
            ("list_value", ReflectValue::Message(m)) => self.json_list(m),
            (name, _) => Err(ValueError::type_mismatch(VALUE_MESSAGE, name)),
        }
    }

    fn json_struct(self: &Arc<Self>, message: &DynamicMessage) -> Result<Value, ValueError> {
        let mut map = ValueMap::new();
        if let Some(fields) = message.get_field_by_name("fields") {
            if let ReflectValue::Map(entries) = fields.as_ref() {
                for (key, value) in entries {
                    let (ReflectMapKey::String(key), ReflectValue::Message(value)) = (key, value) else {
                        return Err(ValueError::type_mismatch(STRUCT_MESSAGE, "non-string key"));
                    };
                    map.insert(MapKey::string(key.as_str()), self.json_value(value)?);
                }
            }
        }
        Ok(Value::Map(Arc::new(map)))
    }

    fn json_list(self: &Arc<Self>, message: &DynamicMessage) -> Result<Value, ValueError> {
        let mut items = Vec::new();
        if let Some(values) = message.get_field_by_name("values") {
            if let ReflectValue::List(values) = values.as_ref() {
                for value in values {
                    match value {
                        ReflectValue::Message(m) => items.push(self.json_value(m)?),
                        _ => return Err(ValueError::type_mismatch(VALUE_MESSAGE, "non-message element")),
                    }
                }
            }
        }
        Ok(Value::list(items))
    }

    // ==================== google.protobuf.Any ====================

    fn unpack_any(self: &Arc<Self>, message: &DynamicMessage) -> Result<Value, ValueError> {
        let type_url = message
            .get_field_by_name("type_url")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let payload = message
            .get_field_by_name("value")
            .and_then(|v| v.as_bytes().cloned())
            .unwrap_or_default();
        let type_name = type_url.rsplit('/').next().unwrap_or_default();
        if type_name.is_empty() {
            return Err(ValueError::InvalidAny("missing type url".to_string()));
        }
        let descriptor = self
            .pool
            .get_message_by_name(type_name)
            .ok_or_else(|| ValueError::InvalidAny(format!("unknown type '{type_name}'")))?;
        let packed = DynamicMessage::decode(descriptor, payload)
            .map_err(|e| ValueError::InvalidAny(format!("{type_name}: {e}")))?;
        trace!(type_name, "unpacked google.protobuf.Any");
        self.message_to_value(packed)
    }
}

impl fmt::Debug for ProtoValueConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtoValueConverter").finish_non_exhaustive()
    }
}

fn seconds_nanos(message: &DynamicMessage) -> (i64, i64) {
    let seconds = message
        .get_field_by_name("seconds")
        .and_then(|v| v.as_i64())
        .unwrap_or(0);
    let nanos = message
        .get_field_by_name("nanos")
        .and_then(|v| v.as_i32())
        .unwrap_or(0);
    (seconds, i64::from(nanos))
}

fn map_key(key: &ReflectMapKey) -> MapKey {
    match key {
        ReflectMapKey::Bool(b) => MapKey::Bool(*b),
        ReflectMapKey::I32(i) => MapKey::Int(i64::from(*i)),
        ReflectMapKey::I64(i) => MapKey::Int(*i),
        ReflectMapKey::U32(u) => MapKey::UInt(u64::from(*u)),
        ReflectMapKey::U64(u) => MapKey::UInt(*u),
        ReflectMapKey::String(s) => MapKey::string(s.as_str()),
    }
}

// ==================== Message values ====================

/// A struct value backed by a dynamic message.
pub struct ProtoMessageValue {
    message: DynamicMessage,
    converter: Arc<ProtoValueConverter>,
}

enum FieldRef {
    Field(FieldDescriptor),
    Extension(ExtensionDescriptor),
}

impl ProtoMessageValue {
    pub fn message(&self) -> &DynamicMessage {
        &self.message
    }

    fn full_name(&self) -> String {
        self.message.descriptor().full_name().to_string()
    }

    /// Resolve a declared field by proto or JSON name, or an extension by
    /// its fully qualified name.
    fn resolve(&self, name: &str) -> Option<FieldRef> {
        let descriptor = self.message.descriptor();
        if let Some(field) = descriptor
            .get_field_by_name(name)
            .or_else(|| descriptor.get_field_by_json_name(name))
        {
            return Some(FieldRef::Field(field));
        }
        self.converter
            .pool
            .get_extension_by_name(name)
            .filter(|ext| ext.containing_message() == descriptor)
            .map(FieldRef::Extension)
    }

    fn is_set(&self, field: &FieldRef) -> bool {
        match field {
            FieldRef::Field(f) => self.message.has_field(f),
            FieldRef::Extension(e) => self.message.has_extension(e),
        }
    }
}

impl FieldRef {
    fn kind(&self) -> Kind {
        match self {
            FieldRef::Field(f) => f.kind(),
            FieldRef::Extension(e) => e.kind(),
        }
    }

    fn is_repeated(&self) -> bool {
        match self {
            FieldRef::Field(f) => f.cardinality() == Cardinality::Repeated,
            FieldRef::Extension(e) => e.cardinality() == Cardinality::Repeated,
        }
    }
}

impl fmt::Debug for ProtoMessageValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtoMessageValue")
            .field("message", &self.message)
            .finish()
    }
}

impl StructValue for ProtoMessageValue {
    fn cel_type(&self) -> CelType {
        let name = self.full_name();
        match self.converter.provider.find_type(&name) {
            Some(ty @ (CelType::Struct(_) | CelType::StructRef(_))) => ty,
            _ => CelType::struct_ref(&name),
        }
    }

    fn is_declared(&self, field: &str) -> bool {
        self.resolve(field).is_some()
    }

    fn has_field(&self, field: &str) -> bool {
        self.resolve(field).is_some_and(|f| self.is_set(&f))
    }

    fn select(&self, field: &str) -> Result<Value, ValueError> {
        let resolved = self
            .resolve(field)
            .ok_or_else(|| ValueError::field_not_declared(field, &self.full_name()))?;
        let kind = resolved.kind();
        if !resolved.is_repeated() && !self.is_set(&resolved) {
            // Unset wrapper and Any fields read as null
            if let Kind::Message(m) = &kind {
                if is_wrapper_message(m.full_name()) || m.full_name() == ANY_MESSAGE {
                    return Ok(Value::Null);
                }
            }
        }
        let value: Cow<'_, ReflectValue> = match &resolved {
            FieldRef::Field(f) => self.message.get_field(f),
            FieldRef::Extension(e) => self.message.get_extension(e),
        };
        self.converter.convert(&value, &kind)
    }

    fn set_fields(&self) -> Result<Vec<(String, Value)>, ValueError> {
        let mut fields = Vec::new();
        for (field, value) in self.message.fields() {
            let converted = self.converter.convert(value, &field.kind())?;
            fields.push((field.number(), field.name().to_string(), converted));
        }
        for (ext, value) in self.message.extensions() {
            let converted = self.converter.convert(value, &ext.kind())?;
            fields.push((ext.number(), ext.full_name().to_string(), converted));
        }
        fields.sort_by_key(|(number, _, _)| *number);
        Ok(fields
            .into_iter()
            .map(|(_, name, value)| (name, value))
            .collect())
    }

    fn is_zero_value(&self) -> bool {
        self.message.fields().next().is_none() && self.message.extensions().next().is_none()
    }
}
