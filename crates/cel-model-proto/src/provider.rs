//! Schema-backed type provider.
//!
//! [`SchemaTypeProviderBuilder`] accumulates message, enum and extension
//! schemas, then freezes them into a [`SchemaRegistry`]. Every message
//! becomes a struct type whose fields are resolved lazily against the
//! registry; every enum becomes an enum type.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use prost::Message;
use prost_reflect::DescriptorPool;
use tracing::{debug, trace, warn};

use cel_model_types::well_known::well_known_type;
use cel_model_types::{CelType, EnumType, FieldLookup, StructType, TypeProvider, TypeTable};

use crate::error::WireError;
use crate::schema::{EnumSchema, FieldSchema, FieldType, MessageSchema};

// ==================== Registry ====================

#[derive(Debug)]
struct MessageIndex {
    schema: MessageSchema,
    /// Field lookup names, including JSON names when enabled.
    by_name: HashMap<String, usize>,
    by_number: HashMap<u32, usize>,
    field_names: Arc<BTreeSet<String>>,
    json_names: HashSet<String>,
}

impl MessageIndex {
    fn new(schema: MessageSchema, allow_json_field_names: bool) -> Self {
        let mut by_name = HashMap::new();
        let mut by_number = HashMap::new();
        let mut json_names = HashSet::new();
        for (i, field) in schema.fields.iter().enumerate() {
            by_name.insert(field.name.clone(), i);
            by_number.entry(field.number).or_insert(i);
            if allow_json_field_names {
                by_name.insert(field.json_name.clone(), i);
                if field.json_name != field.name {
                    json_names.insert(field.json_name.clone());
                }
            }
        }
        let field_names = Arc::new(by_name.keys().cloned().collect());
        Self {
            schema,
            by_name,
            by_number,
            field_names,
            json_names,
        }
    }
}

/// Frozen message, enum and extension schemas, indexed by fully qualified name.
#[derive(Debug)]
pub struct SchemaRegistry {
    messages: HashMap<String, MessageIndex>,
    message_order: Vec<String>,
    enums: HashMap<String, EnumType>,
    enum_order: Vec<String>,
    /// Owning message name to its extension fields.
    extensions: HashMap<String, Vec<FieldSchema>>,
    allow_json_field_names: bool,
}

impl SchemaRegistry {
    /// The schema of a message.
    pub fn message(&self, name: &str) -> Option<&MessageSchema> {
        self.messages.get(name).map(|m| &m.schema)
    }

    /// Look up a declared field by proto name, or by JSON name when enabled.
    pub fn find_field(&self, message: &str, field: &str) -> Option<&FieldSchema> {
        let index = self.messages.get(message)?;
        index.by_name.get(field).map(|&i| &index.schema.fields[i])
    }

    /// Look up a declared field by number.
    pub fn field_by_number(&self, message: &str, number: u32) -> Option<&FieldSchema> {
        let index = self.messages.get(message)?;
        index.by_number.get(&number).map(|&i| &index.schema.fields[i])
    }

    /// Look up an extension of `message` by its fully qualified name.
    pub fn find_extension(&self, message: &str, name: &str) -> Option<&FieldSchema> {
        self.extensions.get(message)?.iter().find(|f| f.name == name)
    }

    /// Look up an extension of `message` by field number.
    pub fn extension_by_number(&self, message: &str, number: u32) -> Option<&FieldSchema> {
        self.extensions.get(message)?.iter().find(|f| f.number == number)
    }

    /// The declared field names of a message.
    pub fn field_names(&self, message: &str) -> Option<&Arc<BTreeSet<String>>> {
        self.messages.get(message).map(|m| &m.field_names)
    }

    pub fn is_json_name(&self, message: &str, name: &str) -> bool {
        self.allow_json_field_names
            && self
                .messages
                .get(message)
                .is_some_and(|m| m.json_names.contains(name))
    }

    /// The enum type with the given name.
    pub fn enum_type(&self, name: &str) -> Option<&EnumType> {
        self.enums.get(name)
    }

    /// The struct type for a registered message.
    pub fn struct_type(self: &Arc<Self>, name: &str) -> Option<CelType> {
        let index = self.messages.get(name)?;
        let lookup = SchemaFieldLookup {
            registry: Arc::clone(self),
            message: name.to_string(),
        };
        Some(CelType::Struct(StructType::with_shared_names(
            name,
            Arc::clone(&index.field_names),
            Arc::new(lookup),
        )))
    }

    /// Resolve the CEL type of a field.
    ///
    /// Map entries become `map(K, V)`, well-known messages use their
    /// built-in type, other messages and enums resolve through the registry,
    /// and repeated fields wrap the element type in a list. Returns `None`
    /// when a referenced sub-type is not registered.
    pub fn resolve_field_type(self: &Arc<Self>, field: &FieldSchema) -> Option<CelType> {
        let elem = match &field.field_type {
            FieldType::Message(name) | FieldType::Group(name) => {
                if let Some(entry) = self.messages.get(name).filter(|m| m.schema.map_entry) {
                    let key = entry.schema.fields.first()?;
                    let value = entry.schema.fields.get(1)?;
                    return Some(CelType::map(
                        self.resolve_field_type(key)?,
                        self.resolve_field_type(value)?,
                    ));
                }
                match well_known_type(name) {
                    Some(ty) => ty,
                    None => self.struct_type(name)?,
                }
            }
            FieldType::Enum(name) => CelType::Enum(self.enums.get(name)?.clone()),
            scalar => scalar.scalar_type()?,
        };
        if field.repeated {
            Some(CelType::list(elem))
        } else {
            Some(elem)
        }
    }

    fn types(self: &Arc<Self>) -> TypeTable {
        let mut table = TypeTable::new();
        for name in &self.message_order {
            let is_entry = self.messages.get(name).is_some_and(|m| m.schema.map_entry);
            if is_entry {
                continue;
            }
            if let Some(ty) = self.struct_type(name) {
                table.insert(name.clone(), ty);
            }
        }
        for name in &self.enum_order {
            if let Some(e) = self.enums.get(name) {
                table.insert(name.clone(), CelType::Enum(e.clone()));
            }
        }
        table
    }

    fn warn_unresolved(self: &Arc<Self>) {
        for index in self.messages.values() {
            for field in &index.schema.fields {
                if self.resolve_field_type(field).is_none() {
                    warn!(
                        message = %index.schema.full_name,
                        field = %field.name,
                        "field type could not be resolved"
                    );
                }
            }
        }
    }
}

/// Field resolution for a struct type backed by a registry.
#[derive(Debug)]
pub struct SchemaFieldLookup {
    registry: Arc<SchemaRegistry>,
    message: String,
}

impl FieldLookup for SchemaFieldLookup {
    fn find_field(&self, name: &str) -> Option<CelType> {
        let field = self.registry.find_field(&self.message, name)?;
        self.registry.resolve_field_type(field)
    }

    fn find_extension(&self, name: &str) -> Option<CelType> {
        let field = self.registry.find_extension(&self.message, name)?;
        self.registry.resolve_field_type(field)
    }

    fn is_json_name(&self, name: &str) -> bool {
        self.registry.is_json_name(&self.message, name)
    }
}

// ==================== Builder ====================

/// Accumulates schemas for a [`SchemaTypeProvider`].
///
/// The first registration of a fully qualified name wins; later duplicates,
/// e.g. from overlapping descriptor sets, are skipped.
#[derive(Debug, Default)]
pub struct SchemaTypeProviderBuilder {
    messages: Vec<MessageSchema>,
    enums: Vec<EnumSchema>,
    extensions: Vec<(String, FieldSchema)>,
    allow_json_field_names: bool,
}

impl SchemaTypeProviderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every message, enum and extension in a descriptor pool.
    pub fn add_descriptor_pool(mut self, pool: &DescriptorPool) -> Self {
        self.messages
            .extend(pool.all_messages().map(|m| MessageSchema::from_descriptor(&m)));
        self.enums
            .extend(pool.all_enums().map(|e| EnumSchema::from_descriptor(&e)));
        self.extensions.extend(pool.all_extensions().map(|ext| {
            (
                ext.containing_message().full_name().to_string(),
                FieldSchema::from_extension(&ext),
            )
        }));
        self
    }

    /// Add the contents of a serialized `FileDescriptorSet`.
    pub fn add_file_descriptor_set(self, bytes: &[u8]) -> Result<Self, WireError> {
        let fds = prost_types::FileDescriptorSet::decode(bytes)?;
        let pool = DescriptorPool::from_file_descriptor_set(fds)?;
        Ok(self.add_descriptor_pool(&pool))
    }

    pub fn add_message(mut self, message: MessageSchema) -> Self {
        self.messages.push(message);
        self
    }

    pub fn add_enum(mut self, schema: EnumSchema) -> Self {
        self.enums.push(schema);
        self
    }

    /// Add an extension field of `owner`. The field name must be fully qualified.
    pub fn add_extension(mut self, owner: impl Into<String>, field: FieldSchema) -> Self {
        self.extensions.push((owner.into(), field));
        self
    }

    /// Also index fields by their JSON names.
    pub fn allow_json_field_names(mut self, allow: bool) -> Self {
        self.allow_json_field_names = allow;
        self
    }

    /// Freeze the accumulated schemas.
    pub fn build(self) -> SchemaTypeProvider {
        let mut messages = HashMap::new();
        let mut message_order = Vec::new();
        for schema in self.messages {
            if messages.contains_key(&schema.full_name) {
                trace!(name = %schema.full_name, "skipping duplicate message");
                continue;
            }
            message_order.push(schema.full_name.clone());
            messages.insert(
                schema.full_name.clone(),
                MessageIndex::new(schema, self.allow_json_field_names),
            );
        }

        let mut enums = HashMap::new();
        let mut enum_order = Vec::new();
        for schema in self.enums {
            if enums.contains_key(&schema.full_name) {
                trace!(name = %schema.full_name, "skipping duplicate enum");
                continue;
            }
            enum_order.push(schema.full_name.clone());
            let ty = EnumType::new(schema.full_name.as_str(), schema.values);
            enums.insert(schema.full_name, ty);
        }

        let mut extensions: HashMap<String, Vec<FieldSchema>> = HashMap::new();
        let mut extension_count = 0;
        for (owner, field) in self.extensions {
            let fields = extensions.entry(owner).or_default();
            if fields.iter().any(|f| f.name == field.name) {
                trace!(name = %field.name, "skipping duplicate extension");
                continue;
            }
            fields.push(field);
            extension_count += 1;
        }

        let registry = Arc::new(SchemaRegistry {
            messages,
            message_order,
            enums,
            enum_order,
            extensions,
            allow_json_field_names: self.allow_json_field_names,
        });
        registry.warn_unresolved();
        let table = registry.types();

        debug!(
            types = table.len(),
            extensions = extension_count,
            json_names = registry.allow_json_field_names,
            "schema type provider frozen"
        );

        SchemaTypeProvider { registry, table }
    }
}

// ==================== Provider ====================

/// Type provider over message and enum schemas.
#[derive(Debug, Clone)]
pub struct SchemaTypeProvider {
    registry: Arc<SchemaRegistry>,
    table: TypeTable,
}

impl SchemaTypeProvider {
    pub fn builder() -> SchemaTypeProviderBuilder {
        SchemaTypeProviderBuilder::new()
    }

    /// Build a provider over every type in a descriptor pool.
    pub fn from_pool(pool: &DescriptorPool) -> Self {
        SchemaTypeProviderBuilder::new().add_descriptor_pool(pool).build()
    }

    /// The frozen schemas backing this provider.
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }
}

impl TypeProvider for SchemaTypeProvider {
    fn types(&self) -> Vec<CelType> {
        self.table.types()
    }

    fn find_type(&self, name: &str) -> Option<CelType> {
        self.table.find_type(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_builder() -> SchemaTypeProviderBuilder {
        SchemaTypeProvider::builder()
            .add_message(MessageSchema::new(
                "pkg.Msg",
                vec![
                    FieldSchema::new("id", 1, FieldType::Int64),
                    FieldSchema::new("single_nested", 2, FieldType::Message("pkg.Nested".into())),
                    FieldSchema::new("tags", 3, FieldType::Message("pkg.Msg.TagsEntry".into()))
                        .repeated(),
                    FieldSchema::new("color", 4, FieldType::Enum("pkg.Color".into())),
                    FieldSchema::new("ids", 5, FieldType::Uint32).repeated(),
                    FieldSchema::new("wrapped", 6, FieldType::Message("google.protobuf.Int64Value".into())),
                    FieldSchema::new("missing", 7, FieldType::Message("pkg.Unregistered".into())),
                ],
            ))
            .add_message(MessageSchema::map_entry(
                "pkg.Msg.TagsEntry",
                FieldType::String,
                FieldType::Message("pkg.Nested".into()),
            ))
            .add_message(MessageSchema::new(
                "pkg.Nested",
                vec![FieldSchema::new("name", 1, FieldType::String)],
            ))
            .add_enum(EnumSchema::new(
                "pkg.Color",
                vec![("RED".into(), 0), ("GREEN".into(), 1)],
            ))
    }

    fn msg_type(provider: &SchemaTypeProvider) -> StructType {
        match provider.find_type("pkg.Msg") {
            Some(CelType::Struct(s)) => s,
            other => panic!("expected struct, got {other:?}"),
        }
    }

    #[test]
    fn resolves_fields() {
        let provider = sample_builder().build();
        let msg = msg_type(&provider);

        assert_eq!(msg.find_field("id"), Some(CelType::Int));
        assert_eq!(msg.find_field("single_nested"), Some(CelType::struct_ref("pkg.Nested")));
        assert_eq!(
            msg.find_field("tags"),
            Some(CelType::map(CelType::String, CelType::struct_ref("pkg.Nested")))
        );
        assert_eq!(msg.find_field("ids"), Some(CelType::list(CelType::UInt)));
        assert_eq!(msg.find_field("wrapped"), Some(CelType::nullable(CelType::Int)));
        assert_eq!(msg.find_field("missing"), None);
        assert_eq!(msg.find_field("nope"), None);

        let color = msg.find_field("color").unwrap();
        assert!(matches!(color, CelType::Enum(_)));
        assert_eq!(color.name(), "pkg.Color");
    }

    #[test]
    fn map_entries_are_not_types() {
        let provider = sample_builder().build();
        assert!(provider.find_type("pkg.Msg.TagsEntry").is_none());
        assert_eq!(provider.types().len(), 3);
    }

    #[test]
    fn enum_lookup() {
        let provider = sample_builder().build();
        match provider.find_type("pkg.Color") {
            Some(CelType::Enum(e)) => {
                assert_eq!(e.find_number("GREEN"), Some(1));
                assert_eq!(e.find_name(0), Some("RED"));
            }
            other => panic!("expected enum, got {other:?}"),
        }
    }

    #[test]
    fn first_registration_wins() {
        let provider = sample_builder()
            .add_message(MessageSchema::new(
                "pkg.Nested",
                vec![FieldSchema::new("other", 1, FieldType::Bool)],
            ))
            .build();
        match provider.find_type("pkg.Nested") {
            Some(CelType::Struct(s)) => {
                assert!(s.field_names().contains("name"));
                assert!(!s.field_names().contains("other"));
            }
            other => panic!("expected struct, got {other:?}"),
        }
    }

    #[test]
    fn extensions() {
        let provider = sample_builder()
            .add_extension("pkg.Msg", FieldSchema::new("pkg.ext_name", 100, FieldType::String))
            .add_extension("pkg.Msg", FieldSchema::new("pkg.ext_name", 101, FieldType::Bool))
            .build();
        let msg = msg_type(&provider);
        assert_eq!(msg.find_extension("pkg.ext_name"), Some(CelType::String));
        assert_eq!(msg.find_extension("pkg.other"), None);
        assert_eq!(msg.find_field("pkg.ext_name"), None);
        assert_eq!(
            provider.registry().extension_by_number("pkg.Msg", 100).map(|f| f.name.as_str()),
            Some("pkg.ext_name")
        );
    }

    #[test]
    fn json_field_names() {
        let plain = sample_builder().build();
        assert_eq!(msg_type(&plain).find_field("singleNested"), None);
        assert!(!msg_type(&plain).is_json_name("singleNested"));

        let json = sample_builder().allow_json_field_names(true).build();
        let msg = msg_type(&json);
        assert_eq!(msg.find_field("singleNested"), Some(CelType::struct_ref("pkg.Nested")));
        assert!(msg.field_names().contains("singleNested"));
        assert!(msg.is_json_name("singleNested"));
        assert!(!msg.is_json_name("id"));
    }

    #[test]
    fn json_name_collision_last_wins() {
        let provider = SchemaTypeProvider::builder()
            .add_message(MessageSchema::new(
                "pkg.Clash",
                vec![
                    FieldSchema::new("fooBar", 1, FieldType::Bool),
                    FieldSchema::new("foo_bar", 2, FieldType::String),
                ],
            ))
            .allow_json_field_names(true)
            .build();
        let field = provider.registry().find_field("pkg.Clash", "fooBar").unwrap();
        assert_eq!(field.number, 2);
    }
}
