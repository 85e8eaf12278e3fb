//! Lightweight message schemas.
//!
//! A `MessageSchema` carries just what type resolution and the lite value
//! path need from a descriptor: field names, numbers, wire types and
//! sub-type references. Schemas are built from `prost_reflect` descriptors or
//! written by hand for message-lite sources that ship no descriptor pool.

use prost::encoding::WireType;
use prost_reflect::{Cardinality, EnumDescriptor, ExtensionDescriptor, FieldDescriptor, Kind, MessageDescriptor};

use cel_model_types::CelType;

/// Protobuf field types. Message, group and enum fields name their sub-type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Bytes,
    Uint32,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
    /// Message field, by fully qualified message name.
    Message(String),
    /// Group field, by fully qualified message name.
    Group(String),
    /// Enum field, by fully qualified enum name.
    Enum(String),
}

impl FieldType {
    /// The wire type a singular value of this field is encoded with.
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldType::Int64
            | FieldType::Uint64
            | FieldType::Int32
            | FieldType::Uint32
            | FieldType::Sint32
            | FieldType::Sint64
            | FieldType::Bool
            | FieldType::Enum(_) => WireType::Varint,
            FieldType::Double | FieldType::Fixed64 | FieldType::Sfixed64 => WireType::SixtyFourBit,
            FieldType::Float | FieldType::Fixed32 | FieldType::Sfixed32 => WireType::ThirtyTwoBit,
            FieldType::String | FieldType::Bytes | FieldType::Message(_) => {
                WireType::LengthDelimited
            }
            FieldType::Group(_) => WireType::StartGroup,
        }
    }

    /// Whether repeated values of this type may use the packed encoding.
    pub fn is_packable(&self) -> bool {
        !matches!(
            self,
            FieldType::String | FieldType::Bytes | FieldType::Message(_) | FieldType::Group(_)
        )
    }

    /// The CEL type of a scalar field. `None` for message, group and enum fields.
    pub fn scalar_type(&self) -> Option<CelType> {
        let ty = match self {
            FieldType::Bool => CelType::Bool,
            FieldType::Int32
            | FieldType::Int64
            | FieldType::Sint32
            | FieldType::Sint64
            | FieldType::Sfixed32
            | FieldType::Sfixed64 => CelType::Int,
            FieldType::Uint32 | FieldType::Uint64 | FieldType::Fixed32 | FieldType::Fixed64 => {
                CelType::UInt
            }
            FieldType::Float | FieldType::Double => CelType::Double,
            FieldType::String => CelType::String,
            FieldType::Bytes => CelType::Bytes,
            FieldType::Message(_) | FieldType::Group(_) | FieldType::Enum(_) => return None,
        };
        Some(ty)
    }

    /// The referenced message name for message and group fields.
    pub fn message_name(&self) -> Option<&str> {
        match self {
            FieldType::Message(name) | FieldType::Group(name) => Some(name),
            _ => None,
        }
    }

    fn from_kind(kind: Kind, is_group: bool) -> Self {
        match kind {
            Kind::Double => FieldType::Double,
            Kind::Float => FieldType::Float,
            Kind::Int32 => FieldType::Int32,
            Kind::Int64 => FieldType::Int64,
            Kind::Uint32 => FieldType::Uint32,
            Kind::Uint64 => FieldType::Uint64,
            Kind::Sint32 => FieldType::Sint32,
            Kind::Sint64 => FieldType::Sint64,
            Kind::Fixed32 => FieldType::Fixed32,
            Kind::Fixed64 => FieldType::Fixed64,
            Kind::Sfixed32 => FieldType::Sfixed32,
            Kind::Sfixed64 => FieldType::Sfixed64,
            Kind::Bool => FieldType::Bool,
            Kind::String => FieldType::String,
            Kind::Bytes => FieldType::Bytes,
            Kind::Message(msg) if is_group => FieldType::Group(msg.full_name().to_string()),
            Kind::Message(msg) => FieldType::Message(msg.full_name().to_string()),
            Kind::Enum(e) => FieldType::Enum(e.full_name().to_string()),
        }
    }
}

/// A message field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    /// Field name. For extensions this is the fully qualified extension name.
    pub name: String,
    pub json_name: String,
    pub number: u32,
    pub field_type: FieldType,
    /// Repeated fields, including map fields.
    pub repeated: bool,
}

impl FieldSchema {
    /// A singular field whose JSON name is the lower camel case form of `name`.
    pub fn new(name: impl Into<String>, number: u32, field_type: FieldType) -> Self {
        let name = name.into();
        Self {
            json_name: to_json_name(&name),
            name,
            number,
            field_type,
            repeated: false,
        }
    }

    /// Mark the field as repeated.
    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    /// Override the JSON name.
    pub fn with_json_name(mut self, json_name: impl Into<String>) -> Self {
        self.json_name = json_name.into();
        self
    }

    pub fn from_descriptor(field: &FieldDescriptor) -> Self {
        Self {
            name: field.name().to_string(),
            json_name: field.json_name().to_string(),
            number: field.number(),
            field_type: FieldType::from_kind(field.kind(), field.is_group()),
            repeated: field.cardinality() == Cardinality::Repeated,
        }
    }

    pub fn from_extension(ext: &ExtensionDescriptor) -> Self {
        Self {
            name: ext.full_name().to_string(),
            json_name: ext.full_name().to_string(),
            number: ext.number(),
            field_type: FieldType::from_kind(ext.kind(), false),
            repeated: ext.cardinality() == Cardinality::Repeated,
        }
    }
}

/// A message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSchema {
    pub full_name: String,
    /// Fields in declaration order.
    pub fields: Vec<FieldSchema>,
    /// Synthetic map entry message: field 0 is the key, field 1 the value.
    pub map_entry: bool,
}

impl MessageSchema {
    pub fn new(full_name: impl Into<String>, fields: Vec<FieldSchema>) -> Self {
        Self {
            full_name: full_name.into(),
            fields,
            map_entry: false,
        }
    }

    /// A map entry message with the given key and value types.
    pub fn map_entry(full_name: impl Into<String>, key: FieldType, value: FieldType) -> Self {
        Self {
            full_name: full_name.into(),
            fields: vec![FieldSchema::new("key", 1, key), FieldSchema::new("value", 2, value)],
            map_entry: true,
        }
    }

    pub fn from_descriptor(message: &MessageDescriptor) -> Self {
        Self {
            full_name: message.full_name().to_string(),
            fields: message.fields().map(|f| FieldSchema::from_descriptor(&f)).collect(),
            map_entry: message.is_map_entry(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_number(&self, number: u32) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.number == number)
    }
}

/// An enum type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSchema {
    pub full_name: String,
    /// `(name, number)` constants in declaration order.
    pub values: Vec<(String, i32)>,
}

impl EnumSchema {
    pub fn new(full_name: impl Into<String>, values: Vec<(String, i32)>) -> Self {
        Self {
            full_name: full_name.into(),
            values,
        }
    }

    pub fn from_descriptor(descriptor: &EnumDescriptor) -> Self {
        Self {
            full_name: descriptor.full_name().to_string(),
            values: descriptor
                .values()
                .map(|v| (v.name().to_string(), v.number()))
                .collect(),
        }
    }
}

/// Lower camel case JSON name, as protoc derives it.
pub fn to_json_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
