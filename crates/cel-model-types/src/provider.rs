//! Named type lookup.
//!
//! A [`TypeProvider`] maps fully qualified names to type nodes. Providers are
//! built once and never mutated afterwards, so lookups need no locking.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use tracing::{debug, trace};

use crate::types::CelType;
use crate::well_known::{DURATION_MESSAGE, TIMESTAMP_MESSAGE};

/// Source of named types.
pub trait TypeProvider: Send + Sync {
    /// Every type known to this provider, in registration order.
    fn types(&self) -> Vec<CelType>;

    /// Look up a type by fully qualified name.
    fn find_type(&self, name: &str) -> Option<CelType>;
}

// ==================== Type table ====================

/// An insertion-ordered name to type map where the first registration wins.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    entries: Vec<(String, CelType)>,
    index: HashMap<String, usize>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `ty` under `name`. Returns false if the name was already taken.
    pub fn insert(&mut self, name: impl Into<String>, ty: CelType) -> bool {
        let name = name.into();
        if self.index.contains_key(&name) {
            trace!(name = %name, "skipping duplicate type registration");
            return false;
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, ty));
        true
    }

    pub fn get(&self, name: &str) -> Option<&CelType> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CelType)> {
        self.entries.iter().map(|(name, ty)| (name.as_str(), ty))
    }
}

impl TypeProvider for TypeTable {
    fn types(&self) -> Vec<CelType> {
        self.entries.iter().map(|(_, ty)| ty.clone()).collect()
    }

    fn find_type(&self, name: &str) -> Option<CelType> {
        self.get(name).cloned()
    }
}

// ==================== Builtin provider ====================

static BUILTIN_TYPES: LazyLock<TypeTable> = LazyLock::new(|| {
    let mut table = TypeTable::new();
    for ty in [
        CelType::Bool,
        CelType::Bytes,
        CelType::Double,
        CelType::Int,
        CelType::UInt,
        CelType::String,
        CelType::Null,
        CelType::Dyn,
        CelType::list(CelType::type_param("T")),
        CelType::map(CelType::type_param("K"), CelType::type_param("V")),
        CelType::type_of(CelType::type_param("T")),
        CelType::optional(CelType::type_param("T")),
    ] {
        table.insert(ty.name().to_string(), ty);
    }
    table.insert(TIMESTAMP_MESSAGE, CelType::Timestamp);
    table.insert(DURATION_MESSAGE, CelType::Duration);
    table
});

/// The built-in named types: primitives, `null_type`, `dyn`, the generic
/// containers and the time types.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTypeProvider;

impl BuiltinTypeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl TypeProvider for BuiltinTypeProvider {
    fn types(&self) -> Vec<CelType> {
        BUILTIN_TYPES.types()
    }

    fn find_type(&self, name: &str) -> Option<CelType> {
        BUILTIN_TYPES.find_type(name)
    }
}

// ==================== Combined provider ====================

/// Merges several providers. On a name collision the provider registered
/// first wins. The merge happens once, at construction.
#[derive(Debug, Clone)]
pub struct CombinedTypeProvider {
    table: TypeTable,
}

impl CombinedTypeProvider {
    pub fn new(providers: Vec<Arc<dyn TypeProvider>>) -> Self {
        let mut table = TypeTable::new();
        for provider in &providers {
            for ty in provider.types() {
                let name = ty.name().to_string();
                table.insert(name, ty);
            }
        }
        debug!(
            providers = providers.len(),
            types = table.len(),
            "combined type provider frozen"
        );
        Self { table }
    }
}

impl TypeProvider for CombinedTypeProvider {
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
    use crate::types::StructType;

    #[test]
    fn builtin_lookup() {
        let provider = BuiltinTypeProvider::new();
        assert_eq!(provider.find_type("int"), Some(CelType::Int));
        assert_eq!(provider.find_type("null_type"), Some(CelType::Null));
        assert_eq!(
            provider.find_type("map"),
            Some(CelType::map(CelType::type_param("K"), CelType::type_param("V")))
        );
        assert_eq!(
            provider.find_type("optional_type"),
            Some(CelType::optional(CelType::type_param("T")))
        );
        assert_eq!(
            provider.find_type("google.protobuf.Timestamp"),
            Some(CelType::Timestamp)
        );
        assert_eq!(provider.find_type("pkg.Unknown"), None);
        assert_eq!(provider.types().len(), 14);
    }

    #[test]
    fn table_first_registration_wins() {
        let mut table = TypeTable::new();
        assert!(table.insert("x", CelType::Int));
        assert!(!table.insert("x", CelType::String));
        assert_eq!(table.get("x"), Some(&CelType::Int));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn combined_provider_precedence() {
        let first = StructType::from_fields("X", [("a".to_string(), CelType::Int)]);
        let second = StructType::from_fields("X", [("b".to_string(), CelType::String)]);

        let mut p1 = TypeTable::new();
        p1.insert("X", CelType::Struct(first));
        let mut p2 = TypeTable::new();
        p2.insert("X", CelType::Struct(second));
        p2.insert("Y", CelType::struct_ref("Y"));

        let providers: Vec<Arc<dyn TypeProvider>> = vec![Arc::new(p1), Arc::new(p2)];
        let combined = CombinedTypeProvider::new(providers);
        let found = combined.find_type("X").unwrap();
        match found {
            CelType::Struct(s) => {
                assert!(s.field_names().contains("a"));
                assert!(!s.field_names().contains("b"));
            }
            other => panic!("expected struct, got {other}"),
        }
        assert!(combined.find_type("Y").is_some());
        assert_eq!(combined.types().len(), 2);
    }

    #[test]
    fn combined_with_builtins_keeps_order() {
        let mut custom = TypeTable::new();
        custom.insert("pkg.Msg", CelType::struct_ref("pkg.Msg"));
        let builtins: Arc<dyn TypeProvider> = Arc::new(BuiltinTypeProvider::new());
        let custom: Arc<dyn TypeProvider> = Arc::new(custom);
        let combined = CombinedTypeProvider::new(vec![builtins, custom]);
        let types = combined.types();
        assert_eq!(types.first(), Some(&CelType::Bool));
        assert_eq!(types.last(), Some(&CelType::struct_ref("pkg.Msg")));
    }
}
