//! Unknown protobuf fields.
//!
//! Fields a schema does not declare are kept as an ordered multimap of
//! `(field number, raw value)` so that they survive a decode/encode cycle.
//! Duplicates and encounter order are preserved exactly.

use prost::bytes::Buf;
use prost::encoding::{decode_key, decode_varint, encode_key, encode_varint, WireType};

use crate::error::ValueError;
use crate::value::Value;

/// Maximum nesting of groups and messages, matching prost's decoder.
pub(crate) const RECURSION_LIMIT: u32 = 100;

/// Fail with a parse error once `depth` passes [`RECURSION_LIMIT`].
pub(crate) fn check_depth(message: &str, depth: u32) -> Result<(), ValueError> {
    if depth > RECURSION_LIMIT {
        return Err(ValueError::parse(message, "recursion limit exceeded"));
    }
    Ok(())
}

/// The raw value of an unknown field, as determined by its wire type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownField {
    Varint(u64),
    Fixed64(u64),
    LengthDelimited(Vec<u8>),
    Fixed32(u32),
    Group(UnknownFieldSet),
}

impl UnknownField {
    /// The value form of the raw field. Varints read as `int`, fixed-width
    /// fields as `uint`, and length-delimited fields and groups as `bytes`.
    pub fn to_value(&self) -> Value {
        match self {
            UnknownField::Varint(v) => Value::Int(*v as i64),
            UnknownField::Fixed64(v) => Value::UInt(*v),
            UnknownField::Fixed32(v) => Value::UInt(u64::from(*v)),
            UnknownField::LengthDelimited(bytes) => Value::bytes(bytes.clone()),
            UnknownField::Group(set) => Value::bytes(set.encode_to_vec()),
        }
    }

    fn wire_type(&self) -> WireType {
        match self {
            UnknownField::Varint(_) => WireType::Varint,
            UnknownField::Fixed64(_) => WireType::SixtyFourBit,
            UnknownField::LengthDelimited(_) => WireType::LengthDelimited,
            UnknownField::Fixed32(_) => WireType::ThirtyTwoBit,
            UnknownField::Group(_) => WireType::StartGroup,
        }
    }
}

/// Unknown fields in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownFieldSet {
    fields: Vec<(u32, UnknownField)>,
}

impl UnknownFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every field of `data` as unknown.
    pub fn decode(message: &str, data: &[u8]) -> Result<Self, ValueError> {
        let mut buf = data;
        let mut set = Self::new();
        while buf.has_remaining() {
            let (number, wire_type) =
                decode_key(&mut buf).map_err(|e| ValueError::parse(message, e))?;
            let field = read_field(message, number, wire_type, &mut buf, 0)?;
            set.push(number, field);
        }
        Ok(set)
    }

    pub fn push(&mut self, number: u32, field: UnknownField) {
        self.fields.push((number, field));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Entries in encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &UnknownField)> {
        self.fields.iter().map(|(n, f)| (*n, f))
    }

    /// Every entry for `number`, in encounter order.
    pub fn get(&self, number: u32) -> impl Iterator<Item = &UnknownField> {
        self.fields
            .iter()
            .filter(move |(n, _)| *n == number)
            .map(|(_, f)| f)
    }

    /// The varint elements recorded for `number`, reading length-delimited
    /// entries as packed varints. Packed and unpacked encodings of the same
    /// elements yield the same result.
    pub fn repeated_varints(&self, number: u32) -> Result<Vec<u64>, ValueError> {
        let mut out = Vec::new();
        for field in self.get(number) {
            match field {
                UnknownField::Varint(v) => out.push(*v),
                UnknownField::LengthDelimited(bytes) => {
                    let mut buf = bytes.as_slice();
                    while buf.has_remaining() {
                        let v = decode_varint(&mut buf)
                            .map_err(|e| ValueError::parse("packed field", e))?;
                        out.push(v);
                    }
                }
                _ => {}
            }
        }
        Ok(out)
    }

    /// Append the wire encoding of every entry to `buf`.
    ///
    /// Canonically encoded input is reproduced byte for byte.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        for (number, field) in &self.fields {
            encode_key(*number, field.wire_type(), buf);
            match field {
                UnknownField::Varint(v) => encode_varint(*v, buf),
                UnknownField::Fixed64(v) => buf.extend_from_slice(&v.to_le_bytes()),
                UnknownField::Fixed32(v) => buf.extend_from_slice(&v.to_le_bytes()),
                UnknownField::LengthDelimited(bytes) => {
                    encode_varint(bytes.len() as u64, buf);
                    buf.extend_from_slice(bytes);
                }
                UnknownField::Group(set) => {
                    set.encode(buf);
                    encode_key(*number, WireType::EndGroup, buf);
                }
            }
        }
    }

    pub fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}

/// Read one field value of `wire_type` from `buf`. The key has already been
/// consumed. `depth` is the nesting level of the enclosing message.
pub(crate) fn read_field(
    message: &str,
    number: u32,
    wire_type: WireType,
    buf: &mut &[u8],
    depth: u32,
) -> Result<UnknownField, ValueError> {
    match wire_type {
        WireType::Varint => decode_varint(buf)
            .map(UnknownField::Varint)
            .map_err(|e| ValueError::parse(message, e)),
        WireType::SixtyFourBit => {
            if buf.remaining() < 8 {
                return Err(ValueError::parse(message, "truncated fixed64 field"));
            }
            Ok(UnknownField::Fixed64(buf.get_u64_le()))
        }
        WireType::ThirtyTwoBit => {
            if buf.remaining() < 4 {
                return Err(ValueError::parse(message, "truncated fixed32 field"));
            }
            Ok(UnknownField::Fixed32(buf.get_u32_le()))
        }
        WireType::LengthDelimited => {
            read_length_delimited(message, buf).map(|bytes| UnknownField::LengthDelimited(bytes.to_vec()))
        }
        WireType::StartGroup => {
            check_depth(message, depth + 1)?;
            let mut group = UnknownFieldSet::new();
            loop {
                if !buf.has_remaining() {
                    return Err(ValueError::parse(message, "unterminated group"));
                }
                let (inner, inner_type) = decode_key(buf).map_err(|e| ValueError::parse(message, e))?;
                if inner_type == WireType::EndGroup {
                    if inner != number {
                        return Err(ValueError::parse(message, "mismatched end group"));
                    }
                    return Ok(UnknownField::Group(group));
                }
                let field = read_field(message, inner, inner_type, buf, depth + 1)?;
                group.push(inner, field);
            }
        }
        WireType::EndGroup => Err(ValueError::parse(message, "unexpected end group")),
    }
}

/// Read a length prefix and split off that many bytes.
pub(crate) fn read_length_delimited<'a>(
    message: &str,
    buf: &mut &'a [u8],
) -> Result<&'a [u8], ValueError> {
    let len = decode_varint(buf).map_err(|e| ValueError::parse(message, e))?;
    let len = usize::try_from(len)
        .ok()
        .filter(|len| *len <= buf.len())
        .ok_or_else(|| ValueError::parse(message, "length-delimited field exceeds buffer"))?;
    let data: &'a [u8] = *buf;
    let (head, tail) = data.split_at(len);
    *buf = tail;
    Ok(head)
}
