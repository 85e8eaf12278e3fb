//! Runtime values.
//!
//! `Value` is the closed set of values an evaluation can produce. Struct and
//! opaque values are the two open seams: struct values are backed by a message
//! representation ([`StructValue`]), opaque values by any host type that
//! implements [`OpaqueValue`].

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use cel_model_types::{CelType, EnumType};

use crate::error::ValueError;
use crate::time::{format_duration, format_timestamp, Duration, Timestamp};

/// A CEL runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// Unsigned 64-bit integer.
    UInt(u64),
    /// 64-bit floating point.
    Double(f64),
    /// Unicode string (Arc for cheap cloning).
    String(Arc<str>),
    /// Immutable byte sequence.
    Bytes(Arc<[u8]>),
    /// Duration (seconds and nanos).
    Duration(Duration),
    /// Timestamp (seconds and nanos since Unix epoch).
    Timestamp(Timestamp),
    /// Heterogeneous list.
    List(Arc<[Value]>),
    /// Key-value map (uses BTreeMap for deterministic iteration).
    Map(Arc<ValueMap>),
    /// Message-backed struct value.
    Struct(Arc<dyn StructValue>),
    /// Enum constant.
    Enum(EnumValue),
    /// Optional value (present or absent).
    Optional(OptionalValue),
    /// Host object outside the closed value set.
    Opaque(Arc<dyn OpaqueValue>),
    /// Type value (represents a CEL type at runtime).
    Type(CelType),
    /// Error value.
    Error(Arc<ValueError>),
}

// ==================== Struct values ====================

/// A struct value backed by some message representation.
///
/// Field names are the declared field names of the message, or the fully
/// qualified names of its extensions.
pub trait StructValue: fmt::Debug + Send + Sync {
    /// The struct type of this value.
    fn cel_type(&self) -> CelType;

    /// Returns true if `field` is a declared field or a known extension.
    fn is_declared(&self, field: &str) -> bool;

    /// Returns true if `field` is set. Undeclared fields are never set.
    fn has_field(&self, field: &str) -> bool;

    /// The value of `field`, or its default when unset.
    fn select(&self, field: &str) -> Result<Value, ValueError>;

    /// The value of `field` if it is set.
    fn find(&self, field: &str) -> Result<Option<Value>, ValueError> {
        if !self.is_declared(field) {
            return Err(ValueError::field_not_declared(field, self.cel_type().name()));
        }
        if !self.has_field(field) {
            return Ok(None);
        }
        self.select(field).map(Some)
    }

    /// Every set field, in field number order.
    fn set_fields(&self) -> Result<Vec<(String, Value)>, ValueError>;

    /// Returns true if no field is set.
    fn is_zero_value(&self) -> bool;
}

// ==================== Opaque values ====================

/// Helper trait to view a value as `&dyn Any`.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Equality between opaque values of the same runtime type.
///
/// Provided for every `T: PartialEq + OpaqueValue`.
pub trait OpaqueEq {
    fn opaque_eq(&self, other: &dyn OpaqueValue) -> bool;
}

impl<T> OpaqueEq for T
where
    T: PartialEq + OpaqueValue + 'static,
{
    fn opaque_eq(&self, other: &dyn OpaqueValue) -> bool {
        if self.runtime_type_name() != other.runtime_type_name() {
            return false;
        }
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

/// A host object carried through evaluation as [`Value::Opaque`].
pub trait OpaqueValue: AsAny + OpaqueEq + fmt::Debug + Send + Sync {
    /// A stable, fully qualified name for this value's runtime type.
    fn runtime_type_name(&self) -> &str;

    fn cel_type(&self) -> CelType {
        CelType::opaque(self.runtime_type_name(), &[])
    }

    fn is_zero_value(&self) -> bool {
        false
    }

    /// JSON form of this value, if it has one.
    fn to_json(&self) -> Option<serde_json::Value> {
        None
    }
}

impl dyn OpaqueValue + '_ {
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }
}

// ==================== Enum and optional values ====================

/// A constant of an enum type.
#[derive(Debug, Clone)]
pub struct EnumValue {
    pub enum_type: EnumType,
    pub number: i32,
}

impl EnumValue {
    pub fn new(enum_type: EnumType, number: i32) -> Self {
        Self { enum_type, number }
    }

    /// Symbolic name of the number, if the enum declares one.
    pub fn name(&self) -> Option<&str> {
        self.enum_type.find_name(self.number)
    }
}

impl PartialEq for EnumValue {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number && self.enum_type.name() == other.enum_type.name()
    }
}

/// A CEL optional value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionalValue {
    /// An absent optional value.
    None,
    /// A present optional value.
    Some(Box<Value>),
}

impl OptionalValue {
    /// Create an absent optional.
    pub fn none() -> Self {
        OptionalValue::None
    }

    /// Create a present optional.
    pub fn some(value: Value) -> Self {
        OptionalValue::Some(Box::new(value))
    }

    /// Returns true if the optional is present.
    pub fn is_present(&self) -> bool {
        matches!(self, OptionalValue::Some(_))
    }

    /// Get the inner value, or None if absent.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            OptionalValue::None => None,
            OptionalValue::Some(v) => Some(v),
        }
    }
}

// ==================== Maps ====================

/// A CEL map with heterogeneous keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap {
    entries: BTreeMap<MapKey, Value>,
}

/// A map key. CEL allows bool, int, uint, and string keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    Bool(bool),
    Int(i64),
    UInt(u64),
    String(Arc<str>),
}

impl MapKey {
    /// Create a map key from a Value.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(MapKey::Bool(*b)),
            Value::Int(i) => Some(MapKey::Int(*i)),
            Value::UInt(u) => Some(MapKey::UInt(*u)),
            Value::String(s) => Some(MapKey::String(s.clone())),
            _ => None,
        }
    }

    /// Convert back to a Value.
    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Bool(b) => Value::Bool(*b),
            MapKey::Int(i) => Value::Int(*i),
            MapKey::UInt(u) => Value::UInt(*u),
            MapKey::String(s) => Value::String(s.clone()),
        }
    }

    pub fn string(s: impl Into<Arc<str>>) -> Self {
        MapKey::String(s.into())
    }
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map from an iterator of key-value pairs. Later keys win.
    pub fn from_entries(entries: impl IntoIterator<Item = (MapKey, Value)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, key: &MapKey) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: MapKey, value: Value) {
        self.entries.insert(key, value);
    }

    pub fn contains_key(&self, key: &MapKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MapKey, &Value)> {
        self.entries.iter()
    }
}

// ==================== Value Constructors ====================

impl Value {
    /// Create a string value.
    pub fn string(s: impl Into<Arc<str>>) -> Self {
        Value::String(s.into())
    }

    /// Create a bytes value.
    pub fn bytes(b: impl Into<Arc<[u8]>>) -> Self {
        Value::Bytes(b.into())
    }

    /// Create a list value.
    pub fn list(elements: impl Into<Arc<[Value]>>) -> Self {
        Value::List(elements.into())
    }

    /// Create a map value.
    pub fn map(entries: impl IntoIterator<Item = (MapKey, Value)>) -> Self {
        Value::Map(Arc::new(ValueMap::from_entries(entries)))
    }

    /// Create a timestamp value, normalizing out-of-range nanos.
    pub fn timestamp(seconds: i64, nanos: i64) -> Self {
        Value::Timestamp(Timestamp::normalized(seconds, nanos))
    }

    /// Create a duration value, normalizing out-of-range nanos.
    pub fn duration(seconds: i64, nanos: i64) -> Self {
        Value::Duration(Duration::normalized(seconds, nanos))
    }

    pub fn optional_none() -> Self {
        Value::Optional(OptionalValue::None)
    }

    pub fn optional_some(value: Value) -> Self {
        Value::Optional(OptionalValue::some(value))
    }

    pub fn error(err: ValueError) -> Self {
        Value::Error(Arc::new(err))
    }
}

// ==================== Type Information ====================

impl Value {
    /// Get the CEL type of this value.
    pub fn cel_type(&self) -> CelType {
        match self {
            Value::Null => CelType::Null,
            Value::Bool(_) => CelType::Bool,
            Value::Int(_) => CelType::Int,
            Value::UInt(_) => CelType::UInt,
            Value::Double(_) => CelType::Double,
            Value::String(_) => CelType::String,
            Value::Bytes(_) => CelType::Bytes,
            Value::Duration(_) => CelType::Duration,
            Value::Timestamp(_) => CelType::Timestamp,
            Value::List(_) => CelType::list(CelType::Dyn),
            Value::Map(_) => CelType::map(CelType::Dyn, CelType::Dyn),
            Value::Struct(s) => s.cel_type(),
            Value::Enum(e) => CelType::Enum(e.enum_type.clone()),
            Value::Optional(opt) => match opt {
                OptionalValue::None => CelType::optional(CelType::Dyn),
                OptionalValue::Some(v) => CelType::optional(v.cel_type()),
            },
            Value::Opaque(o) => o.cel_type(),
            Value::Type(t) => CelType::type_of(t.clone()),
            Value::Error(_) => CelType::Error,
        }
    }

    /// Returns true for the default value of this value's type.
    pub fn is_zero_value(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(i) => *i == 0,
            Value::UInt(u) => *u == 0,
            Value::Double(d) => *d == 0.0,
            Value::String(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::Duration(d) => d.is_zero(),
            Value::Timestamp(t) => t.is_epoch(),
            Value::List(l) => l.is_empty(),
            Value::Map(m) => m.is_empty(),
            Value::Struct(s) => s.is_zero_value(),
            Value::Enum(e) => e.number == 0,
            Value::Optional(opt) => !opt.is_present(),
            Value::Opaque(o) => o.is_zero_value(),
            Value::Type(_) | Value::Error(_) => false,
        }
    }

    /// Check if this value is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// ==================== Value Conversions ====================

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view. Enum constants report their number.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Enum(e) => Some(i64::from(e.number)),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::UInt(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&dyn StructValue> {
        match self {
            Value::Struct(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_optional(&self) -> Option<&OptionalValue> {
        match self {
            Value::Optional(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ValueError> {
        match self {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::UInt(u)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

// ==================== Equality ====================

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            // IEEE 754: NaN != NaN
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => struct_eq(a.as_ref(), b.as_ref()),
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Optional(a), Value::Optional(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => a.opaque_eq(b.as_ref()),
            (Value::Type(a), Value::Type(b)) => a == b,
            _ => false,
        }
    }
}

fn struct_eq(a: &dyn StructValue, b: &dyn StructValue) -> bool {
    if a.cel_type().name() != b.cel_type().name() {
        return false;
    }
    match (a.set_fields(), b.set_fields()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

// ==================== Display ====================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}u", v),
            Value::Double(v) => {
                if v.is_nan() {
                    write!(f, "NaN")
                } else if v.is_infinite() {
                    if v.is_sign_positive() {
                        write!(f, "+infinity")
                    } else {
                        write!(f, "-infinity")
                    }
                } else if v.fract() == 0.0 {
                    write!(f, "{}.0", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            Value::String(v) => write!(f, "{:?}", v),
            Value::Bytes(v) => write!(f, "b\"{}\"", String::from_utf8_lossy(v)),
            Value::Duration(d) => write!(f, "duration(\"{}\")", format_duration(d)),
            Value::Timestamp(t) => write!(f, "timestamp(\"{}\")", format_timestamp(t)),
            Value::List(v) => {
                write!(f, "[")?;
                for (i, elem) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, "]")
            }
            Value::Map(m) => {
                write!(f, "{{")?;
                for (i, (key, value)) in m.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key.to_value(), value)?;
                }
                write!(f, "}}")
            }
            Value::Struct(s) => {
                write!(f, "{}{{", s.cel_type().name())?;
                if let Ok(fields) = s.set_fields() {
                    for (i, (name, value)) in fields.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}: {}", name, value)?;
                    }
                }
                write!(f, "}}")
            }
            Value::Enum(e) => match e.name() {
                Some(name) => write!(f, "{}.{}", e.enum_type.name(), name),
                None => write!(f, "{}({})", e.enum_type.name(), e.number),
            },
            Value::Optional(o) => match o {
                OptionalValue::None => write!(f, "optional.none()"),
                OptionalValue::Some(v) => write!(f, "optional.of({})", v),
            },
            Value::Opaque(o) => write!(f, "{}({:?})", o.runtime_type_name(), o),
            Value::Type(t) => write!(f, "type({})", t),
            Value::Error(e) => write!(f, "error({})", e),
        }
    }
}
