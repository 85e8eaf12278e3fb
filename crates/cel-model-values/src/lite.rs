//! Struct values decoded from binary messages with a lightweight schema.
//!
//! The lite path needs no descriptor pool: fields are decoded against a
//! [`SchemaRegistry`], and every field the registry does not declare is kept
//! in an [`UnknownFieldSet`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use prost::bytes::Buf;
use prost::encoding::{decode_key, WireType};
use tracing::trace;

use cel_model_proto::{FieldSchema, FieldType, MessageSchema, SchemaRegistry};
use cel_model_types::well_known::{
    well_known_type, ANY_MESSAGE, BOOL_VALUE_MESSAGE, BYTES_VALUE_MESSAGE, DOUBLE_VALUE_MESSAGE,
    DURATION_MESSAGE, FLOAT_VALUE_MESSAGE, INT32_VALUE_MESSAGE, INT64_VALUE_MESSAGE,
    LIST_VALUE_MESSAGE, STRING_VALUE_MESSAGE, STRUCT_MESSAGE, TIMESTAMP_MESSAGE,
    UINT32_VALUE_MESSAGE, UINT64_VALUE_MESSAGE, VALUE_MESSAGE,
};
use cel_model_types::CelType;

use crate::error::ValueError;
use crate::unknown::{check_depth, read_field, read_length_delimited, UnknownField, UnknownFieldSet};
use crate::value::{MapKey, StructValue, Value, ValueMap};

const STRUCT_ENTRY_MESSAGE: &str = "google.protobuf.Struct.FieldsEntry";

/// A decoded message backed by a schema registry.
///
/// A singular message field that occurs more than once on the wire is
/// merged, as protobuf parsers do. Any other singular field keeps its last
/// value.
pub struct LiteMessageValue {
    registry: Arc<SchemaRegistry>,
    message: String,
    /// Known fields by number, including extensions.
    fields: BTreeMap<u32, Value>,
    unknown: UnknownFieldSet,
}

impl LiteMessageValue {
    /// Decode `data` as the message `message`.
    pub fn decode(
        registry: Arc<SchemaRegistry>,
        message: &str,
        data: &[u8],
    ) -> Result<Self, ValueError> {
        Self::decode_nested(registry, message, data, 0)
    }

    fn decode_nested(
        registry: Arc<SchemaRegistry>,
        message: &str,
        data: &[u8],
        depth: u32,
    ) -> Result<Self, ValueError> {
        check_depth(message, depth)?;
        if registry.message(message).is_none() {
            return Err(ValueError::UnknownMessage(message.to_string()));
        }
        let mut decoder = Decoder {
            registry: &registry,
            message,
            depth,
            fields: BTreeMap::new(),
            unknown: UnknownFieldSet::new(),
        };
        let mut buf = data;
        while buf.has_remaining() {
            let (number, wire_type) =
                decode_key(&mut buf).map_err(|e| ValueError::parse(message, e))?;
            decoder.read(number, wire_type, &mut buf)?;
        }
        let Decoder { fields, unknown, .. } = decoder;
        let fields = fields
            .into_iter()
            .map(|(number, acc)| Ok((number, acc.finish(&registry, depth)?)))
            .collect::<Result<BTreeMap<_, _>, ValueError>>()?;
        trace!(type_name = %message, unknown = unknown.len(), "decoded lite message");
        Ok(Self {
            registry,
            message: message.to_string(),
            fields,
            unknown,
        })
    }

    /// An empty message of type `message`.
    pub fn empty(registry: Arc<SchemaRegistry>, message: &str) -> Self {
        Self {
            registry,
            message: message.to_string(),
            fields: BTreeMap::new(),
            unknown: UnknownFieldSet::new(),
        }
    }

    pub fn message_name(&self) -> &str {
        &self.message
    }

    /// Fields the schema does not declare, in encounter order.
    pub fn unknown_fields(&self) -> &UnknownFieldSet {
        &self.unknown
    }

    /// Wire encoding of the unknown fields.
    pub fn encode_unknown_fields(&self) -> Vec<u8> {
        self.unknown.encode_to_vec()
    }

    fn lookup(&self, name: &str) -> Option<&FieldSchema> {
        self.registry
            .find_field(&self.message, name)
            .or_else(|| self.registry.find_extension(&self.message, name))
    }

    fn lookup_number(&self, number: u32) -> Option<&FieldSchema> {
        self.registry
            .field_by_number(&self.message, number)
            .or_else(|| self.registry.extension_by_number(&self.message, number))
    }

    fn default_value(&self, field: &FieldSchema) -> Value {
        if self.is_map_field(field) {
            return Value::Map(Arc::new(ValueMap::new()));
        }
        if field.repeated {
            return Value::list(Vec::<Value>::new());
        }
        match &field.field_type {
            FieldType::Message(name) | FieldType::Group(name) => {
                message_default(&self.registry, name)
            }
            FieldType::Enum(_) => Value::Int(0),
            scalar => scalar_default(scalar),
        }
    }

    fn is_map_field(&self, field: &FieldSchema) -> bool {
        field
            .field_type
            .message_name()
            .and_then(|name| self.registry.message(name))
            .is_some_and(|m| m.map_entry)
    }
}

impl fmt::Debug for LiteMessageValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiteMessageValue")
            .field("message", &self.message)
            .field("fields", &self.fields)
            .field("unknown", &self.unknown)
            .finish()
    }
}

impl StructValue for LiteMessageValue {
    fn cel_type(&self) -> CelType {
        self.registry
            .struct_type(&self.message)
            .unwrap_or_else(|| CelType::struct_ref(&self.message))
    }

    fn is_declared(&self, field: &str) -> bool {
        self.lookup(field).is_some()
    }

    fn has_field(&self, field: &str) -> bool {
        let Some(schema) = self.lookup(field) else {
            return false;
        };
        match self.fields.get(&schema.number) {
            Some(Value::List(items)) => !items.is_empty(),
            Some(Value::Map(map)) => !map.is_empty() || !self.is_map_field(schema),
            Some(_) => true,
            None => false,
        }
    }

    fn select(&self, field: &str) -> Result<Value, ValueError> {
        let schema = self
            .lookup(field)
            .ok_or_else(|| ValueError::field_not_declared(field, &self.message))?;
        Ok(match self.fields.get(&schema.number) {
            Some(value) => value.clone(),
            None => self.default_value(schema),
        })
    }

    fn set_fields(&self) -> Result<Vec<(String, Value)>, ValueError> {
        let mut out = Vec::with_capacity(self.fields.len());
        for (number, value) in &self.fields {
            let schema = self
                .lookup_number(*number)
                .ok_or_else(|| ValueError::parse(&self.message, "decoded field lost its schema"))?;
            out.push((schema.name.clone(), value.clone()));
        }
        Ok(out)
    }

    fn is_zero_value(&self) -> bool {
        self.fields.is_empty()
    }
}

// ==================== Decoding ====================

enum Accumulator {
    Single(Value),
    List(Vec<Value>),
    Map(ValueMap),
    /// Concatenated encodings of a singular message field, decoded as one.
    Message(String, Vec<u8>),
}

impl Accumulator {
    fn finish(self, registry: &Arc<SchemaRegistry>, depth: u32) -> Result<Value, ValueError> {
        Ok(match self {
            Accumulator::Single(v) => v,
            Accumulator::List(items) => Value::list(items),
            Accumulator::Map(map) => Value::Map(Arc::new(map)),
            Accumulator::Message(name, encoded) => {
                decode_message(registry, &name, &encoded, depth + 1)?
            }
        })
    }
}

struct Decoder<'a> {
    registry: &'a Arc<SchemaRegistry>,
    message: &'a str,
    depth: u32,
    fields: BTreeMap<u32, Accumulator>,
    unknown: UnknownFieldSet,
}

impl Decoder<'_> {
    fn read(&mut self, number: u32, wire_type: WireType, buf: &mut &[u8]) -> Result<(), ValueError> {
        let field = self
            .registry
            .field_by_number(self.message, number)
            .or_else(|| self.registry.extension_by_number(self.message, number))
            .cloned();
        let Some(field) = field else {
            return self.keep_unknown(number, wire_type, buf);
        };

        let expected = field.field_type.wire_type();
        if let Some(entry) = self.map_entry(&field) {
            if wire_type != WireType::LengthDelimited {
                return self.keep_unknown(number, wire_type, buf);
            }
            let data = read_length_delimited(self.message, buf)?;
            let (key, value) = self.decode_map_entry(&entry, data)?;
            match self.fields.entry(number).or_insert_with(|| Accumulator::Map(ValueMap::new())) {
                Accumulator::Map(map) => map.insert(key, value),
                _ => return Err(ValueError::parse(self.message, "map field decoded twice")),
            }
        } else if wire_type == expected {
            match field.field_type.message_name() {
                Some(name) if !field.repeated => {
                    self.merge_message(number, name, wire_type, buf)?;
                }
                _ => {
                    let value = decode_element(
                        self.registry,
                        self.message,
                        number,
                        &field.field_type,
                        wire_type,
                        buf,
                        self.depth,
                    )?;
                    self.store(&field, vec![value]);
                }
            }
        } else if field.repeated
            && field.field_type.is_packable()
            && wire_type == WireType::LengthDelimited
        {
            let mut packed = read_length_delimited(self.message, buf)?;
            let mut values = Vec::new();
            while packed.has_remaining() {
                values.push(decode_element(
                    self.registry,
                    self.message,
                    number,
                    &field.field_type,
                    expected,
                    &mut packed,
                    self.depth,
                )?);
            }
            self.store(&field, values);
        } else {
            // Wire type does not match the schema
            return self.keep_unknown(number, wire_type, buf);
        }
        Ok(())
    }

    fn keep_unknown(&mut self, number: u32, wire_type: WireType, buf: &mut &[u8]) -> Result<(), ValueError> {
        let raw = read_field(self.message, number, wire_type, buf, self.depth)?;
        self.unknown.push(number, raw);
        Ok(())
    }

    /// Append one occurrence of a singular message field.
    fn merge_message(
        &mut self,
        number: u32,
        name: &str,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<(), ValueError> {
        let encoded = match read_field(self.message, number, wire_type, buf, self.depth)? {
            UnknownField::LengthDelimited(bytes) => bytes,
            UnknownField::Group(set) => set.encode_to_vec(),
            _ => return Err(ValueError::parse(self.message, "wire type does not match field type")),
        };
        match self
            .fields
            .entry(number)
            .or_insert_with(|| Accumulator::Message(name.to_string(), Vec::new()))
        {
            Accumulator::Message(_, bytes) => bytes.extend_from_slice(&encoded),
            other => *other = Accumulator::Message(name.to_string(), encoded),
        }
        Ok(())
    }

    fn store(&mut self, field: &FieldSchema, values: Vec<Value>) {
        if field.repeated {
            match self
                .fields
                .entry(field.number)
                .or_insert_with(|| Accumulator::List(Vec::new()))
            {
                Accumulator::List(items) => items.extend(values),
                other => *other = Accumulator::List(values),
            }
        } else if let Some(last) = values.into_iter().last() {
            // Last value wins for singular scalars
            self.fields.insert(field.number, Accumulator::Single(last));
        }
    }

    fn map_entry(&self, field: &FieldSchema) -> Option<MessageSchema> {
        let name = field.field_type.message_name()?;
        self.registry
            .message(name)
            .filter(|m| m.map_entry)
            .cloned()
    }

    fn decode_map_entry(
        &self,
        entry: &MessageSchema,
        mut data: &[u8],
    ) -> Result<(MapKey, Value), ValueError> {
        let depth = self.depth + 1;
        check_depth(&entry.full_name, depth)?;
        let (key_field, value_field) = match entry.fields.as_slice() {
            [key, value] => (key, value),
            _ => return Err(ValueError::parse(&entry.full_name, "malformed map entry schema")),
        };
        let mut key = None;
        let mut value = None;
        while data.has_remaining() {
            let (number, wire_type) =
                decode_key(&mut data).map_err(|e| ValueError::parse(&entry.full_name, e))?;
            let target = if number == key_field.number {
                &key_field.field_type
            } else if number == value_field.number {
                &value_field.field_type
            } else {
                read_field(&entry.full_name, number, wire_type, &mut data, depth)?;
                continue;
            };
            let decoded = decode_element(
                self.registry,
                &entry.full_name,
                number,
                target,
                wire_type,
                &mut data,
                depth,
            )?;
            if number == key_field.number {
                key = Some(decoded);
            } else {
                value = Some(decoded);
            }
        }
        let key = match key {
            Some(k) => MapKey::from_value(&k)
                .ok_or_else(|| ValueError::parse(&entry.full_name, "invalid map key type"))?,
            None => default_map_key(&key_field.field_type)
                .ok_or_else(|| ValueError::parse(&entry.full_name, "invalid map key type"))?,
        };
        let value = match value {
            Some(v) => v,
            None => match &value_field.field_type {
                FieldType::Message(name) => message_default(self.registry, name),
                FieldType::Enum(_) => Value::Int(0),
                scalar => scalar_default(scalar),
            },
        };
        Ok((key, value))
    }
}

/// Decode a single element of `field_type` encoded with `wire_type`.
/// `depth` is the nesting level of the message holding the element.
fn decode_element(
    registry: &Arc<SchemaRegistry>,
    message: &str,
    number: u32,
    field_type: &FieldType,
    wire_type: WireType,
    buf: &mut &[u8],
    depth: u32,
) -> Result<Value, ValueError> {
    if wire_type != field_type.wire_type() {
        return Err(ValueError::parse(message, "wire type does not match field type"));
    }
    let raw = read_field(message, number, wire_type, buf, depth)?;
    let value = match (field_type, raw) {
        (FieldType::Int64, UnknownField::Varint(v)) => Value::Int(v as i64),
        (FieldType::Int32 | FieldType::Enum(_), UnknownField::Varint(v)) => {
            Value::Int(i64::from(v as i32))
        }
        (FieldType::Uint64, UnknownField::Varint(v)) => Value::UInt(v),
        (FieldType::Uint32, UnknownField::Varint(v)) => Value::UInt(u64::from(v as u32)),
        (FieldType::Sint32, UnknownField::Varint(v)) => Value::Int(i64::from(zigzag(v) as i32)),
        (FieldType::Sint64, UnknownField::Varint(v)) => Value::Int(zigzag(v)),
        (FieldType::Bool, UnknownField::Varint(v)) => Value::Bool(v != 0),
        (FieldType::Fixed64, UnknownField::Fixed64(v)) => Value::UInt(v),
        (FieldType::Sfixed64, UnknownField::Fixed64(v)) => Value::Int(v as i64),
        (FieldType::Double, UnknownField::Fixed64(v)) => Value::Double(f64::from_bits(v)),
        (FieldType::Fixed32, UnknownField::Fixed32(v)) => Value::UInt(u64::from(v)),
        (FieldType::Sfixed32, UnknownField::Fixed32(v)) => Value::Int(i64::from(v as i32)),
        (FieldType::Float, UnknownField::Fixed32(v)) => Value::Double(f64::from(f32::from_bits(v))),
        (FieldType::String, UnknownField::LengthDelimited(bytes)) => {
            Value::from(utf8(message, bytes)?)
        }
        (FieldType::Bytes, UnknownField::LengthDelimited(bytes)) => Value::bytes(bytes),
        (FieldType::Message(name), UnknownField::LengthDelimited(bytes)) => {
            decode_message(registry, name, &bytes, depth + 1)?
        }
        (FieldType::Group(name), UnknownField::Group(set)) => {
            decode_message(registry, name, &set.encode_to_vec(), depth + 1)?
        }
        _ => return Err(ValueError::parse(message, "wire type does not match field type")),
    };
    Ok(value)
}

// ==================== Well-known messages ====================

/// Decode a nested message at `depth`, unwrapping the well-known types.
fn decode_message(
    registry: &Arc<SchemaRegistry>,
    name: &str,
    data: &[u8],
    depth: u32,
) -> Result<Value, ValueError> {
    match name {
        TIMESTAMP_MESSAGE => {
            let (seconds, nanos) = decode_seconds_nanos(name, data, depth)?;
            Ok(Value::timestamp(seconds, nanos))
        }
        DURATION_MESSAGE => {
            let (seconds, nanos) = decode_seconds_nanos(name, data, depth)?;
            Ok(Value::duration(seconds, nanos))
        }
        STRUCT_MESSAGE => decode_json_struct(data, depth),
        VALUE_MESSAGE => decode_json_value(data, depth),
        LIST_VALUE_MESSAGE => decode_json_list(data, depth),
        ANY_MESSAGE => decode_any(registry, data, depth),
        _ => {
            if let Some(value_type) = wrapper_value_type(name) {
                return decode_wrapper(registry, name, &value_type, data, depth);
            }
            let message = LiteMessageValue::decode_nested(Arc::clone(registry), name, data, depth)?;
            Ok(Value::Struct(Arc::new(message)))
        }
    }
}

/// The value of an unset singular message field.
fn message_default(registry: &Arc<SchemaRegistry>, name: &str) -> Value {
    match name {
        TIMESTAMP_MESSAGE => Value::timestamp(0, 0),
        DURATION_MESSAGE => Value::duration(0, 0),
        STRUCT_MESSAGE => Value::Map(Arc::new(ValueMap::new())),
        LIST_VALUE_MESSAGE => Value::list(Vec::<Value>::new()),
        VALUE_MESSAGE | ANY_MESSAGE => Value::Null,
        name if wrapper_value_type(name).is_some() => Value::Null,
        name => Value::Struct(Arc::new(LiteMessageValue::empty(Arc::clone(registry), name))),
    }
}

fn decode_seconds_nanos(name: &str, mut data: &[u8], depth: u32) -> Result<(i64, i64), ValueError> {
    check_depth(name, depth)?;
    let mut seconds = 0i64;
    let mut nanos = 0i64;
    while data.has_remaining() {
        let (number, wire_type) = decode_key(&mut data).map_err(|e| ValueError::parse(name, e))?;
        match (number, read_field(name, number, wire_type, &mut data, depth)?) {
            (1, UnknownField::Varint(v)) => seconds = v as i64,
            (2, UnknownField::Varint(v)) => nanos = i64::from(v as i32),
            _ => {}
        }
    }
    Ok((seconds, nanos))
}

fn decode_wrapper(
    registry: &Arc<SchemaRegistry>,
    name: &str,
    value_type: &FieldType,
    mut data: &[u8],
    depth: u32,
) -> Result<Value, ValueError> {
    check_depth(name, depth)?;
    let mut value = scalar_default(value_type);
    while data.has_remaining() {
        let (number, wire_type) = decode_key(&mut data).map_err(|e| ValueError::parse(name, e))?;
        if number == 1 && wire_type == value_type.wire_type() {
            value = decode_element(registry, name, number, value_type, wire_type, &mut data, depth)?;
        } else {
            read_field(name, number, wire_type, &mut data, depth)?;
        }
    }
    Ok(value)
}

/// `google.protobuf.Value`: the last member of the `kind` oneof wins.
fn decode_json_value(mut data: &[u8], depth: u32) -> Result<Value, ValueError> {
    check_depth(VALUE_MESSAGE, depth)?;
    let mut value = Value::Null;
    while data.has_remaining() {
        let (number, wire_type) =
            decode_key(&mut data).map_err(|e| ValueError::parse(VALUE_MESSAGE, e))?;
        value = match (number, read_field(VALUE_MESSAGE, number, wire_type, &mut data, depth)?) {
            (1, UnknownField::Varint(_)) => Value::Null,
            (2, UnknownField::Fixed64(bits)) => Value::Double(f64::from_bits(bits)),
            (3, UnknownField::LengthDelimited(bytes)) => Value::from(utf8(VALUE_MESSAGE, bytes)?),
            (4, UnknownField::Varint(v)) => Value::Bool(v != 0),
            (5, UnknownField::LengthDelimited(bytes)) => decode_json_struct(&bytes, depth + 1)?,
            (6, UnknownField::LengthDelimited(bytes)) => decode_json_list(&bytes, depth + 1)?,
            (1..=6, _) => {
                return Err(ValueError::parse(VALUE_MESSAGE, "wire type does not match field type"))
            }
            _ => continue,
        };
    }
    Ok(value)
}

fn decode_json_struct(mut data: &[u8], depth: u32) -> Result<Value, ValueError> {
    check_depth(STRUCT_MESSAGE, depth)?;
    let mut map = ValueMap::new();
    while data.has_remaining() {
        let (number, wire_type) =
            decode_key(&mut data).map_err(|e| ValueError::parse(STRUCT_MESSAGE, e))?;
        match (number, read_field(STRUCT_MESSAGE, number, wire_type, &mut data, depth)?) {
            (1, UnknownField::LengthDelimited(entry)) => {
                let (key, value) = decode_json_entry(&entry, depth + 1)?;
                map.insert(MapKey::string(key), value);
            }
            (1, _) => {
                return Err(ValueError::parse(STRUCT_MESSAGE, "wire type does not match field type"))
            }
            _ => {}
        }
    }
    Ok(Value::Map(Arc::new(map)))
}

fn decode_json_entry(mut data: &[u8], depth: u32) -> Result<(String, Value), ValueError> {
    check_depth(STRUCT_ENTRY_MESSAGE, depth)?;
    let mut key = String::new();
    let mut value = Value::Null;
    while data.has_remaining() {
        let (number, wire_type) =
            decode_key(&mut data).map_err(|e| ValueError::parse(STRUCT_ENTRY_MESSAGE, e))?;
        match (number, read_field(STRUCT_ENTRY_MESSAGE, number, wire_type, &mut data, depth)?) {
            (1, UnknownField::LengthDelimited(bytes)) => key = utf8(STRUCT_ENTRY_MESSAGE, bytes)?,
            (2, UnknownField::LengthDelimited(bytes)) => value = decode_json_value(&bytes, depth + 1)?,
            (1 | 2, _) => {
                return Err(ValueError::parse(
                    STRUCT_ENTRY_MESSAGE,
                    "wire type does not match field type",
                ))
            }
            _ => {}
        }
    }
    Ok((key, value))
}

fn decode_json_list(mut data: &[u8], depth: u32) -> Result<Value, ValueError> {
    check_depth(LIST_VALUE_MESSAGE, depth)?;
    let mut items = Vec::new();
    while data.has_remaining() {
        let (number, wire_type) =
            decode_key(&mut data).map_err(|e| ValueError::parse(LIST_VALUE_MESSAGE, e))?;
        match (number, read_field(LIST_VALUE_MESSAGE, number, wire_type, &mut data, depth)?) {
            (1, UnknownField::LengthDelimited(bytes)) => items.push(decode_json_value(&bytes, depth + 1)?),
            (1, _) => {
                return Err(ValueError::parse(
                    LIST_VALUE_MESSAGE,
                    "wire type does not match field type",
                ))
            }
            _ => {}
        }
    }
    Ok(Value::list(items))
}

/// `google.protobuf.Any`: the packed message must be registered or well known.
fn decode_any(registry: &Arc<SchemaRegistry>, mut data: &[u8], depth: u32) -> Result<Value, ValueError> {
    check_depth(ANY_MESSAGE, depth)?;
    let mut type_url = String::new();
    let mut payload = Vec::new();
    while data.has_remaining() {
        let (number, wire_type) =
            decode_key(&mut data).map_err(|e| ValueError::parse(ANY_MESSAGE, e))?;
        match (number, read_field(ANY_MESSAGE, number, wire_type, &mut data, depth)?) {
            (1, UnknownField::LengthDelimited(bytes)) => type_url = utf8(ANY_MESSAGE, bytes)?,
            (2, UnknownField::LengthDelimited(bytes)) => payload = bytes,
            (1 | 2, _) => {
                return Err(ValueError::parse(ANY_MESSAGE, "wire type does not match field type"))
            }
            _ => {}
        }
    }
    let type_name = type_url.rsplit('/').next().unwrap_or_default();
    if type_name.is_empty() {
        return Err(ValueError::InvalidAny("missing type url".to_string()));
    }
    if well_known_type(type_name).is_none() && registry.message(type_name).is_none() {
        return Err(ValueError::InvalidAny(format!("unknown type '{type_name}'")));
    }
    let value = decode_message(registry, type_name, &payload, depth + 1).map_err(|e| match e {
        ValueError::Parse { .. } => e,
        other => ValueError::InvalidAny(format!("{type_name}: {other}")),
    })?;
    trace!(type_name, "unpacked google.protobuf.Any");
    Ok(value)
}

// ==================== Scalars ====================

/// The `value` field type of a wrapper message.
fn wrapper_value_type(name: &str) -> Option<FieldType> {
    let ty = match name {
        BOOL_VALUE_MESSAGE => FieldType::Bool,
        BYTES_VALUE_MESSAGE => FieldType::Bytes,
        DOUBLE_VALUE_MESSAGE => FieldType::Double,
        FLOAT_VALUE_MESSAGE => FieldType::Float,
        INT32_VALUE_MESSAGE => FieldType::Int32,
        INT64_VALUE_MESSAGE => FieldType::Int64,
        STRING_VALUE_MESSAGE => FieldType::String,
        UINT32_VALUE_MESSAGE => FieldType::Uint32,
        UINT64_VALUE_MESSAGE => FieldType::Uint64,
        _ => return None,
    };
    Some(ty)
}

fn utf8(message: &str, bytes: Vec<u8>) -> Result<String, ValueError> {
    String::from_utf8(bytes).map_err(|e| ValueError::parse(message, e))
}

fn zigzag(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

fn scalar_default(field_type: &FieldType) -> Value {
    match field_type.scalar_type() {
        Some(CelType::Bool) => Value::Bool(false),
        Some(CelType::Int) => Value::Int(0),
        Some(CelType::UInt) => Value::UInt(0),
        Some(CelType::Double) => Value::Double(0.0),
        Some(CelType::String) => Value::string(""),
        Some(CelType::Bytes) => Value::bytes(Vec::<u8>::new()),
        _ => Value::Null,
    }
}

fn default_map_key(field_type: &FieldType) -> Option<MapKey> {
    MapKey::from_value(&scalar_default(field_type))
}
