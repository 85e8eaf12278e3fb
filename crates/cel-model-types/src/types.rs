//! CEL type nodes.
//!
//! `CelType` is the recursive type representation shared by the checker and
//! the evaluator. Scalar and sentinel types are unit variants; parameterized
//! types hold their parameters behind `Arc` so type nodes are cheap to clone
//! and safe to share across threads.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::TypeError;
use crate::kind::Kind;

/// Name of the opaque type used to encode function signatures.
///
/// `params[0]` is the result type, `params[1..]` are the argument types.
pub const FUNCTION_TYPE_NAME: &str = "function";

/// Name of the optional type.
pub const OPTIONAL_TYPE_NAME: &str = "optional_type";

/// Abstract type name optionals are encoded with on the wire.
pub const OPTIONAL_WIRE_NAME: &str = "optional";

/// Name of the opaque union type used for schema-less JSON interop.
pub const JSON_TYPE_NAME: &str = "json";

/// A CEL type node.
#[derive(Debug, Clone)]
pub enum CelType {
    // ==================== Simple types ====================
    /// Boolean type
    Bool,
    /// Signed 64-bit integer
    Int,
    /// Unsigned 64-bit integer
    UInt,
    /// 64-bit floating point
    Double,
    /// Unicode string
    String,
    /// Byte sequence
    Bytes,
    /// google.protobuf.Duration
    Duration,
    /// google.protobuf.Timestamp
    Timestamp,
    /// google.protobuf.Any
    Any,
    /// Dynamic type, assignable from everything
    Dyn,
    /// The null sentinel
    Null,
    /// Produced when type inference fails
    Error,

    // ==================== Parameterized types ====================
    /// `list(T)`. `None` is the legacy unparameterized list, distinct from `list(dyn)`.
    List(Option<Arc<CelType>>),
    /// `map(K, V)`
    Map(Arc<CelType>, Arc<CelType>),
    /// Abstract type with ordered parameters, e.g. the function encoding.
    Opaque {
        name: Arc<str>,
        params: Arc<[CelType]>,
    },
    /// `optional_type(T)`
    Optional(Arc<CelType>),
    /// `type(T)`, the type of a type.
    Type(Arc<CelType>),
    /// An unbound type variable.
    TypeParam(Arc<str>),

    // ==================== Nominal types ====================
    /// Message type backed by a field lookup.
    Struct(StructType),
    /// Message type known only by its fully qualified name.
    StructRef(Arc<str>),
    /// Enum type; reports kind `int`.
    Enum(EnumType),

    // ==================== Unions and sentinels ====================
    /// `T` or null, mirroring protobuf wrapper messages.
    Nullable(Arc<CelType>),
    /// No type set.
    Unspecified,
}

// ==================== Field lookup ====================

/// Resolves the fields of a struct type.
///
/// Implementations capture the schema they resolve against; the struct type
/// only holds a shared handle to them.
pub trait FieldLookup: Send + Sync + fmt::Debug {
    /// Type of the declared field `name`, if any.
    fn find_field(&self, name: &str) -> Option<CelType>;

    /// Type of the extension field with fully qualified name `name`, if any.
    fn find_extension(&self, _name: &str) -> Option<CelType> {
        None
    }

    /// Whether `name` refers to a field through its JSON name.
    fn is_json_name(&self, _name: &str) -> bool {
        false
    }
}

/// A fixed field table, for struct types that are not schema-backed.
#[derive(Debug, Default, Clone)]
pub struct FieldMap {
    fields: HashMap<String, CelType>,
}

impl FieldMap {
    pub fn new(fields: impl IntoIterator<Item = (String, CelType)>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }
}

impl FieldLookup for FieldMap {
    fn find_field(&self, name: &str) -> Option<CelType> {
        self.fields.get(name).cloned()
    }
}

/// A nominal struct type with an enumerable field set.
#[derive(Clone)]
pub struct StructType {
    name: Arc<str>,
    field_names: Arc<BTreeSet<String>>,
    lookup: Arc<dyn FieldLookup>,
}

impl StructType {
    /// Create a struct type. `name` must be fully qualified.
    pub fn new(
        name: impl Into<Arc<str>>,
        field_names: impl IntoIterator<Item = String>,
        lookup: Arc<dyn FieldLookup>,
    ) -> Self {
        Self {
            name: name.into(),
            field_names: Arc::new(field_names.into_iter().collect()),
            lookup,
        }
    }

    /// Create a struct type from a fixed list of fields.
    pub fn from_fields(
        name: impl Into<Arc<str>>,
        fields: impl IntoIterator<Item = (String, CelType)>,
    ) -> Self {
        let map = FieldMap::new(fields);
        let names: Vec<String> = map.fields.keys().cloned().collect();
        Self::new(name, names, Arc::new(map))
    }

    /// Create a struct type sharing an already-built field name set.
    pub fn with_shared_names(
        name: impl Into<Arc<str>>,
        field_names: Arc<BTreeSet<String>>,
        lookup: Arc<dyn FieldLookup>,
    ) -> Self {
        Self {
            name: name.into(),
            field_names,
            lookup,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared field names.
    pub fn field_names(&self) -> &BTreeSet<String> {
        &self.field_names
    }

    /// Type of a field, or `None` if the field is unknown or unresolvable.
    pub fn find_field(&self, name: &str) -> Option<CelType> {
        self.lookup.find_field(name)
    }

    /// Type of an extension field by fully qualified name.
    pub fn find_extension(&self, name: &str) -> Option<CelType> {
        self.lookup.find_extension(name)
    }

    /// Whether `name` is the JSON name of a field.
    pub fn is_json_name(&self, name: &str) -> bool {
        self.lookup.is_json_name(name)
    }
}

impl fmt::Debug for StructType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructType")
            .field("name", &self.name)
            .field("field_names", &self.field_names)
            .finish()
    }
}

// ==================== Enum types ====================

#[derive(Debug, Default)]
struct EnumValues {
    by_number: BTreeMap<i32, String>,
    by_name: HashMap<String, i32>,
}

/// An enum type with bidirectional name/number lookup.
#[derive(Clone)]
pub struct EnumType {
    name: Arc<str>,
    values: Arc<EnumValues>,
}

impl EnumType {
    /// Create an enum type from its `(name, number)` constants in declaration order.
    ///
    /// When several constants share a number, the first one names it.
    pub fn new(
        name: impl Into<Arc<str>>,
        constants: impl IntoIterator<Item = (String, i32)>,
    ) -> Self {
        let mut values = EnumValues::default();
        for (constant, number) in constants {
            values.by_number.entry(number).or_insert_with(|| constant.clone());
            values.by_name.insert(constant, number);
        }
        Self {
            name: name.into(),
            values: Arc::new(values),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of the constant `name`.
    pub fn find_number(&self, name: &str) -> Option<i32> {
        self.values.by_name.get(name).copied()
    }

    /// Name of the constant with `number`.
    pub fn find_name(&self, number: i32) -> Option<&str> {
        self.values.by_number.get(&number).map(String::as_str)
    }

    /// Constants ordered by number.
    pub fn constants(&self) -> impl Iterator<Item = (&str, i32)> {
        self.values.by_number.iter().map(|(n, name)| (name.as_str(), *n))
    }
}

impl fmt::Debug for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumType").field("name", &self.name).finish()
    }
}

// ==================== Constructors ====================

impl CelType {
    /// Create a list type with the given element type.
    ///
    /// # Example
    /// ```
    /// use cel_model_types::CelType;
    /// let list_of_int = CelType::list(CelType::Int);
    /// assert_eq!(list_of_int.to_string(), "list(int)");
    /// ```
    pub fn list(elem: CelType) -> Self {
        CelType::List(Some(Arc::new(elem)))
    }

    /// The legacy list type without an element parameter.
    pub fn unparameterized_list() -> Self {
        CelType::List(None)
    }

    /// Create a map type with the given key and value types.
    pub fn map(key: CelType, value: CelType) -> Self {
        CelType::Map(Arc::new(key), Arc::new(value))
    }

    /// Create a type value representing `type(T)`.
    pub fn type_of(inner: CelType) -> Self {
        CelType::Type(Arc::new(inner))
    }

    /// Create an optional type.
    pub fn optional(inner: CelType) -> Self {
        CelType::Optional(Arc::new(inner))
    }

    /// Create an opaque type with the given name and parameters.
    ///
    /// The optional type names with a single parameter produce
    /// [`CelType::Optional`], so each type has one representation.
    pub fn opaque(name: &str, params: &[CelType]) -> Self {
        if let (OPTIONAL_TYPE_NAME | OPTIONAL_WIRE_NAME, [inner]) = (name, params) {
            return CelType::optional(inner.clone());
        }
        CelType::Opaque {
            name: Arc::from(name),
            params: Arc::from(params),
        }
    }

    /// Create a function type. Encoded as `Opaque("function", [result, args...])`.
    ///
    /// # Example
    /// ```
    /// use cel_model_types::CelType;
    /// let func = CelType::function(CelType::Int, &[CelType::String]);
    /// assert_eq!(func.to_string(), "(string) -> int");
    /// ```
    pub fn function(result: CelType, args: &[CelType]) -> Self {
        let mut params = Vec::with_capacity(args.len() + 1);
        params.push(result);
        params.extend_from_slice(args);
        CelType::Opaque {
            name: Arc::from(FUNCTION_TYPE_NAME),
            params: Arc::from(params),
        }
    }

    /// The opaque JSON union type.
    pub fn json() -> Self {
        CelType::opaque(JSON_TYPE_NAME, &[])
    }

    /// Create a type parameter with the given name.
    pub fn type_param(name: &str) -> Self {
        CelType::TypeParam(Arc::from(name))
    }

    /// Create a lightweight reference to a message type.
    pub fn struct_ref(name: &str) -> Self {
        CelType::StructRef(Arc::from(name))
    }

    /// Create a nullable (wrapper) type.
    pub fn nullable(target: CelType) -> Self {
        CelType::Nullable(Arc::new(target))
    }

    /// Create a list type from a parameter list of length 0 or 1.
    pub fn try_list(params: &[CelType]) -> Result<Self, TypeError> {
        match params {
            [] => Ok(CelType::List(None)),
            [elem] => Ok(CelType::list(elem.clone())),
            _ => Err(TypeError::arity("list", "0 or 1", params.len())),
        }
    }

    /// Create a map type from a parameter list of length 2.
    pub fn try_map(params: &[CelType]) -> Result<Self, TypeError> {
        match params {
            [key, value] => Ok(CelType::map(key.clone(), value.clone())),
            _ => Err(TypeError::arity("map", "2", params.len())),
        }
    }

    /// Create a `type(T)` from a parameter list of length 1.
    pub fn try_type_of(params: &[CelType]) -> Result<Self, TypeError> {
        match params {
            [inner] => Ok(CelType::type_of(inner.clone())),
            _ => Err(TypeError::arity("type", "1", params.len())),
        }
    }

    /// Create an optional type from a parameter list of length 1.
    pub fn try_optional(params: &[CelType]) -> Result<Self, TypeError> {
        match params {
            [inner] => Ok(CelType::optional(inner.clone())),
            _ => Err(TypeError::arity(OPTIONAL_TYPE_NAME, "1", params.len())),
        }
    }
}

// ==================== Properties ====================

impl CelType {
    /// The kind of this type.
    pub fn kind(&self) -> Kind {
        match self {
            CelType::Bool => Kind::Bool,
            CelType::Int => Kind::Int,
            CelType::UInt => Kind::Uint,
            CelType::Double => Kind::Double,
            CelType::String => Kind::String,
            CelType::Bytes => Kind::Bytes,
            CelType::Duration => Kind::Duration,
            CelType::Timestamp => Kind::Timestamp,
            CelType::Any => Kind::Any,
            CelType::Dyn => Kind::Dyn,
            CelType::Null => Kind::Null,
            CelType::Error => Kind::Error,
            CelType::List(_) => Kind::List,
            CelType::Map(_, _) => Kind::Map,
            CelType::Opaque { name, .. } if &**name == FUNCTION_TYPE_NAME => Kind::Function,
            CelType::Opaque { .. } | CelType::Optional(_) => Kind::Opaque,
            CelType::Type(_) => Kind::Type,
            CelType::TypeParam(_) => Kind::TypeParam,
            CelType::Struct(_) | CelType::StructRef(_) => Kind::Struct,
            CelType::Enum(_) => Kind::Int,
            CelType::Nullable(target) => target.kind(),
            CelType::Unspecified => Kind::Unspecified,
        }
    }

    /// The name of this type. Struct and enum names are fully qualified.
    pub fn name(&self) -> &str {
        match self {
            CelType::Bool => "bool",
            CelType::Int => "int",
            CelType::UInt => "uint",
            CelType::Double => "double",
            CelType::String => "string",
            CelType::Bytes => "bytes",
            CelType::Duration => "google.protobuf.Duration",
            CelType::Timestamp => "google.protobuf.Timestamp",
            CelType::Any => "any",
            CelType::Dyn => "dyn",
            CelType::Null => "null_type",
            CelType::Error => "*error*",
            CelType::List(_) => "list",
            CelType::Map(_, _) => "map",
            CelType::Opaque { name, .. } => name,
            CelType::Optional(_) => OPTIONAL_TYPE_NAME,
            CelType::Type(_) => "type",
            CelType::TypeParam(name) => name,
            CelType::Struct(s) => s.name(),
            CelType::StructRef(name) => name,
            CelType::Enum(e) => e.name(),
            CelType::Nullable(target) => target.name(),
            CelType::Unspecified => "unspecified",
        }
    }

    /// The type parameters, in positional order. Empty for non-parameterized types.
    pub fn parameters(&self) -> Vec<CelType> {
        match self {
            CelType::List(Some(elem)) => vec![elem.as_ref().clone()],
            CelType::Map(key, value) => vec![key.as_ref().clone(), value.as_ref().clone()],
            CelType::Opaque { params, .. } => params.to_vec(),
            CelType::Optional(inner) | CelType::Type(inner) => vec![inner.as_ref().clone()],
            _ => Vec::new(),
        }
    }

    /// Returns true for the variants that carry parameters.
    pub fn is_parameterized(&self) -> bool {
        matches!(
            self,
            CelType::List(_)
                | CelType::Map(_, _)
                | CelType::Opaque { .. }
                | CelType::Optional(_)
                | CelType::Type(_)
        )
    }

    /// Returns true for nullable (wrapper) types.
    pub fn is_nullable(&self) -> bool {
        matches!(self, CelType::Nullable(_))
    }

    /// Returns true for `dyn` and `any`.
    pub fn is_dyn(&self) -> bool {
        matches!(self, CelType::Dyn | CelType::Any)
    }

    /// Returns true if this is a primitive type.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            CelType::Bool
                | CelType::Int
                | CelType::UInt
                | CelType::Double
                | CelType::String
                | CelType::Bytes
        )
    }

    /// Returns true for the opaque JSON union type.
    pub fn is_json(&self) -> bool {
        matches!(self, CelType::Opaque { name, params } if &**name == JSON_TYPE_NAME && params.is_empty())
    }

    /// Get the element type of a list, or None if not a list.
    ///
    /// The unparameterized list reports `dyn`.
    pub fn list_elem(&self) -> Option<&CelType> {
        match self {
            CelType::List(Some(elem)) => Some(elem),
            CelType::List(None) => Some(&CelType::Dyn),
            _ => None,
        }
    }

    /// Get the key and value types of a map, or None if not a map.
    pub fn map_types(&self) -> Option<(&CelType, &CelType)> {
        match self {
            CelType::Map(key, val) => Some((key, val)),
            _ => None,
        }
    }

    /// Get the inner type of a type value, or None if not a type.
    pub fn type_inner(&self) -> Option<&CelType> {
        match self {
            CelType::Type(inner) => Some(inner),
            _ => None,
        }
    }

    /// Get the inner type of an optional, or None if not an optional.
    pub fn optional_inner(&self) -> Option<&CelType> {
        match self {
            CelType::Optional(inner) => Some(inner),
            _ => None,
        }
    }

    /// Get the wrapped type of a nullable, or None if not nullable.
    pub fn nullable_target(&self) -> Option<&CelType> {
        match self {
            CelType::Nullable(target) => Some(target),
            _ => None,
        }
    }

    /// Get the message name of a struct or struct reference.
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            CelType::Struct(s) => Some(s.name()),
            CelType::StructRef(name) => Some(name),
            _ => None,
        }
    }

    /// Split a function type into its result and argument types.
    pub fn function_parts(&self) -> Option<(&CelType, &[CelType])> {
        match self {
            CelType::Opaque { name, params } if &**name == FUNCTION_TYPE_NAME => {
                params.split_first()
            }
            _ => None,
        }
    }
}

// ==================== Substitution ====================

impl CelType {
    /// Replace the parameters of this type positionally.
    ///
    /// Non-parameterized types are returned unchanged.
    pub fn with_parameters(&self, params: &[CelType]) -> Result<CelType, TypeError> {
        match self {
            CelType::List(_) => CelType::try_list(params),
            CelType::Map(_, _) => CelType::try_map(params),
            CelType::Type(_) => CelType::try_type_of(params),
            CelType::Optional(_) => CelType::try_optional(params),
            CelType::Opaque { name, .. } => Ok(CelType::Opaque {
                name: name.clone(),
                params: Arc::from(params),
            }),
            _ => Ok(self.clone()),
        }
    }

    /// Rename every type parameter with `namegen`, recursing into parameters.
    pub fn with_fresh_type_param_variables<F>(&self, namegen: &mut F) -> CelType
    where
        F: FnMut(&str) -> String,
    {
        match self {
            CelType::TypeParam(name) => CelType::TypeParam(Arc::from(namegen(name))),
            CelType::List(None) => self.clone(),
            CelType::List(Some(elem)) => CelType::list(elem.with_fresh_type_param_variables(namegen)),
            CelType::Map(key, value) => CelType::map(
                key.with_fresh_type_param_variables(namegen),
                value.with_fresh_type_param_variables(namegen),
            ),
            CelType::Type(inner) => CelType::type_of(inner.with_fresh_type_param_variables(namegen)),
            CelType::Optional(inner) => {
                CelType::optional(inner.with_fresh_type_param_variables(namegen))
            }
            CelType::Opaque { name, params } => {
                let params: Vec<CelType> = params
                    .iter()
                    .map(|p| p.with_fresh_type_param_variables(namegen))
                    .collect();
                CelType::Opaque {
                    name: name.clone(),
                    params: Arc::from(params),
                }
            }
            _ => self.clone(),
        }
    }
}

// ==================== Equality ====================

impl PartialEq for CelType {
    fn eq(&self, other: &Self) -> bool {
        self.is_nullable() == other.is_nullable()
            && self.kind() == other.kind()
            && self.name() == other.name()
            && self.parameters() == other.parameters()
    }
}

impl Eq for CelType {}

impl Hash for CelType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.is_nullable().hash(state);
        self.kind().hash(state);
        self.name().hash(state);
        self.parameters().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_is_enforced() {
        assert!(CelType::try_list(&[]).is_ok());
        assert!(CelType::try_list(&[CelType::Int]).is_ok());
        assert!(CelType::try_list(&[CelType::Int, CelType::Int]).is_err());

        assert!(CelType::try_map(&[CelType::String]).is_err());
        assert!(CelType::try_map(&[CelType::String, CelType::Int]).is_ok());
        assert!(CelType::try_map(&[CelType::String, CelType::Int, CelType::Int]).is_err());

        assert!(CelType::try_type_of(&[]).is_err());
        assert!(CelType::try_optional(&[CelType::Int, CelType::Int]).is_err());
        assert!(matches!(
            CelType::try_optional(&[]),
            Err(TypeError::InvalidArity { actual: 0, .. })
        ));
    }

    #[test]
    fn optional_names_build_the_optional_type() {
        let expected = CelType::optional(CelType::String);
        assert!(matches!(
            CelType::opaque(OPTIONAL_TYPE_NAME, &[CelType::String]),
            CelType::Optional(_)
        ));
        assert_eq!(CelType::opaque(OPTIONAL_TYPE_NAME, &[CelType::String]), expected);
        assert_eq!(CelType::opaque(OPTIONAL_WIRE_NAME, &[CelType::String]), expected);

        // Any other arity stays opaque
        let bare = CelType::opaque(OPTIONAL_TYPE_NAME, &[]);
        assert!(matches!(bare, CelType::Opaque { .. }));
    }

    #[test]
    fn kinds_and_names() {
        assert_eq!(CelType::Int.kind(), Kind::Int);
        assert_eq!(CelType::Null.name(), "null_type");
        assert_eq!(CelType::Timestamp.name(), "google.protobuf.Timestamp");
        assert_eq!(CelType::function(CelType::Int, &[]).kind(), Kind::Function);
        assert_eq!(CelType::optional(CelType::Int).kind(), Kind::Opaque);
        assert_eq!(CelType::optional(CelType::Int).name(), "optional_type");

        let nullable = CelType::nullable(CelType::Double);
        assert_eq!(nullable.kind(), Kind::Double);
        assert_eq!(nullable.name(), "double");
    }

    #[test]
    fn enum_reports_int_kind() {
        let e = EnumType::new("pkg.Color", [("RED".to_string(), 0), ("BLUE".to_string(), 1)]);
        let ty = CelType::Enum(e.clone());
        assert_eq!(ty.kind(), Kind::Int);
        assert_eq!(ty.name(), "pkg.Color");
        assert_eq!(e.find_number("BLUE"), Some(1));
        assert_eq!(e.find_name(0), Some("RED"));
        assert_eq!(e.find_name(7), None);
    }

    #[test]
    fn enum_alias_keeps_first_name() {
        let e = EnumType::new(
            "pkg.Alias",
            [("A".to_string(), 1), ("B".to_string(), 1)],
        );
        assert_eq!(e.find_name(1), Some("A"));
        assert_eq!(e.find_number("B"), Some(1));
    }

    #[test]
    fn parameters_of_each_variant() {
        assert!(CelType::Int.parameters().is_empty());
        assert!(CelType::unparameterized_list().parameters().is_empty());
        assert_eq!(CelType::list(CelType::Int).parameters(), vec![CelType::Int]);
        assert_eq!(
            CelType::map(CelType::String, CelType::Dyn).parameters(),
            vec![CelType::String, CelType::Dyn]
        );
        assert_eq!(CelType::type_of(CelType::Int).parameters(), vec![CelType::Int]);
    }

    #[test]
    fn with_parameters_is_positional() {
        let map = CelType::map(CelType::String, CelType::Int);
        let swapped = map.with_parameters(&[CelType::Int, CelType::String]).unwrap();
        assert_eq!(swapped, CelType::map(CelType::Int, CelType::String));

        assert!(map.with_parameters(&[CelType::Int]).is_err());
        assert_eq!(CelType::Bool.with_parameters(&[CelType::Int]).unwrap(), CelType::Bool);

        let opaque = CelType::opaque("vector", &[CelType::Int]);
        let replaced = opaque.with_parameters(&[CelType::Double, CelType::Double]).unwrap();
        assert_eq!(replaced.parameters(), vec![CelType::Double, CelType::Double]);
    }

    #[test]
    fn fresh_type_params_rename_leaves() {
        let generic = CelType::function(
            CelType::list(CelType::type_param("T")),
            &[CelType::map(CelType::type_param("K"), CelType::type_param("T"))],
        );
        let mut counter = 0;
        let fresh = generic.with_fresh_type_param_variables(&mut |name: &str| {
            counter += 1;
            format!("_var{counter}_{name}")
        });
        let (result, args) = fresh.function_parts().unwrap();
        assert_eq!(result, &CelType::list(CelType::type_param("_var1_T")));
        assert_eq!(
            args[0],
            CelType::map(CelType::type_param("_var2_K"), CelType::type_param("_var3_T"))
        );
        assert_eq!(CelType::Int.with_fresh_type_param_variables(&mut |n: &str| n.to_string()), CelType::Int);
    }

    #[test]
    fn struct_equality_is_nominal() {
        let full = StructType::from_fields("pkg.Msg", [("id".to_string(), CelType::Int)]);
        assert_eq!(CelType::Struct(full.clone()), CelType::struct_ref("pkg.Msg"));
        assert_ne!(CelType::Struct(full), CelType::struct_ref("pkg.Other"));
    }

    #[test]
    fn nullable_differs_from_target() {
        assert_ne!(CelType::nullable(CelType::Int), CelType::Int);
        assert_eq!(CelType::nullable(CelType::Int), CelType::nullable(CelType::Int));
    }

    #[test]
    fn unparameterized_list_is_distinct() {
        assert_ne!(CelType::unparameterized_list(), CelType::list(CelType::Dyn));
        assert_eq!(CelType::unparameterized_list().list_elem(), Some(&CelType::Dyn));
    }

    #[test]
    fn struct_field_lookup() {
        let s = StructType::from_fields(
            "pkg.Msg",
            [
                ("id".to_string(), CelType::Int),
                ("tags".to_string(), CelType::list(CelType::String)),
            ],
        );
        assert!(s.field_names().contains("tags"));
        assert_eq!(s.find_field("id"), Some(CelType::Int));
        assert_eq!(s.find_field("missing"), None);
        assert_eq!(s.find_extension("pkg.ext"), None);
        assert!(!s.is_json_name("id"));
    }

    #[test]
    fn hash_consistency() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(CelType::list(CelType::Int));
        set.insert(CelType::list(CelType::Int));
        set.insert(CelType::struct_ref("a.B"));
        set.insert(CelType::Struct(StructType::from_fields("a.B", [])));

        assert_eq!(set.len(), 2);
    }
}
