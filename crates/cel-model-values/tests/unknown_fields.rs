//! Unknown fields survive the lite decode path unchanged.

use std::sync::Arc;

use prost::encoding::{encode_key, encode_varint, WireType};

use cel_model_proto::{FieldSchema, FieldType, MessageSchema, SchemaRegistry, SchemaTypeProvider};
use cel_model_values::{LiteMessageValue, StructValue, UnknownField, Value};

fn registry() -> Arc<SchemaRegistry> {
    let provider = SchemaTypeProvider::builder()
        .add_message(MessageSchema::new(
            "test.Sparse",
            vec![
                FieldSchema::new("name", 1, FieldType::String),
                FieldSchema::new("created", 2, FieldType::Message("google.protobuf.Timestamp".to_string())),
            ],
        ))
        .build();
    Arc::clone(provider.registry())
}

fn varint_field(number: u32, value: u64, buf: &mut Vec<u8>) {
    encode_key(number, WireType::Varint, buf);
    encode_varint(value, buf);
}

fn packed_field(number: u32, values: &[u64], buf: &mut Vec<u8>) {
    let mut payload = Vec::new();
    for v in values {
        encode_varint(*v, &mut payload);
    }
    encode_key(number, WireType::LengthDelimited, buf);
    encode_varint(payload.len() as u64, buf);
    buf.extend_from_slice(&payload);
}

#[test]
fn unknown_fields_keep_order_and_encoding() {
    let mut bytes = Vec::new();
    varint_field(2500, 1, &mut bytes);
    packed_field(2504, &[4, 5], &mut bytes);
    varint_field(2504, 4, &mut bytes);
    varint_field(2504, 5, &mut bytes);

    let msg = LiteMessageValue::decode(registry(), "test.Sparse", &bytes).unwrap();
    let unknown = msg.unknown_fields();

    let entries: Vec<(u32, UnknownField)> = unknown.iter().map(|(n, f)| (n, f.clone())).collect();
    assert_eq!(
        entries,
        vec![
            (2500, UnknownField::Varint(1)),
            (2504, UnknownField::LengthDelimited(vec![4, 5])),
            (2504, UnknownField::Varint(4)),
            (2504, UnknownField::Varint(5)),
        ]
    );
    assert_eq!(unknown.repeated_varints(2500).unwrap(), vec![1]);
    assert_eq!(unknown.repeated_varints(2504).unwrap(), vec![4, 5, 4, 5]);
    assert_eq!(msg.encode_unknown_fields(), bytes);
    assert_eq!(
        unknown.get(2500).map(UnknownField::to_value).collect::<Vec<_>>(),
        vec![Value::Int(1)]
    );
}

#[test]
fn packed_and_unpacked_encodings_agree() {
    let mut packed = Vec::new();
    packed_field(2504, &[4, 5], &mut packed);
    let mut unpacked = Vec::new();
    varint_field(2504, 4, &mut unpacked);
    varint_field(2504, 5, &mut unpacked);

    let read = |bytes: &[u8]| {
        LiteMessageValue::decode(registry(), "test.Sparse", bytes)
            .unwrap()
            .unknown_fields()
            .repeated_varints(2504)
            .unwrap()
    };
    assert_eq!(read(&packed), read(&unpacked));
    assert_eq!(read(&packed), vec![4, 5]);
}

#[test]
fn known_fields_decode_alongside_unknown_ones() {
    let mut bytes = Vec::new();
    varint_field(2500, 1, &mut bytes);
    encode_key(1, WireType::LengthDelimited, &mut bytes);
    encode_varint(3, &mut bytes);
    bytes.extend_from_slice(b"abc");

    let mut created = Vec::new();
    varint_field(1, 20, &mut created);
    varint_field(2, 2_000_000_001, &mut created);
    encode_key(2, WireType::LengthDelimited, &mut bytes);
    encode_varint(created.len() as u64, &mut bytes);
    bytes.extend_from_slice(&created);

    let msg = LiteMessageValue::decode(registry(), "test.Sparse", &bytes).unwrap();
    assert_eq!(msg.select("name").unwrap(), Value::string("abc"));
    assert_eq!(msg.select("created").unwrap(), Value::timestamp(22, 1));
    assert_eq!(msg.unknown_fields().len(), 1);
    assert!(!msg.is_zero_value());

    let names: Vec<String> = msg.set_fields().unwrap().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["name", "created"]);
}

#[test]
fn malformed_data_fails_whole_message() {
    let mut bytes = Vec::new();
    varint_field(2500, 1, &mut bytes);
    encode_key(2501, WireType::LengthDelimited, &mut bytes);
    encode_varint(10, &mut bytes);
    bytes.push(0);

    let err = LiteMessageValue::decode(registry(), "test.Sparse", &bytes).unwrap_err();
    assert!(err.to_string().contains("test.Sparse"));
}
