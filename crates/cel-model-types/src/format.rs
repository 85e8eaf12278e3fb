//! Canonical string rendering of types and function signatures.

use std::fmt;

use crate::types::CelType;

impl CelType {
    /// Returns the display name of this type as used in CEL.
    ///
    /// This is the canonical string representation shown in error messages,
    /// e.g. `list(int)`, `map(string, dyn)` or `(string) -> int`.
    pub fn display_name(&self) -> String {
        render(self, false)
    }
}

impl fmt::Display for CelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Render a type in canonical form.
pub fn format(ty: &CelType) -> String {
    render(ty, false)
}

/// Render a function signature.
///
/// With `is_instance`, the first argument renders as the receiver:
/// `string.(int) -> bool`. With `type_param_to_dyn`, free type parameters
/// render as `dyn`.
pub fn format_function(
    result: Option<&CelType>,
    args: &[CelType],
    is_instance: bool,
    type_param_to_dyn: bool,
) -> String {
    let mut out = String::new();
    let mut args = args;
    if is_instance {
        if let Some((receiver, rest)) = args.split_first() {
            out.push_str(&render(receiver, type_param_to_dyn));
            out.push('.');
            args = rest;
        }
    }
    out.push('(');
    out.push_str(&join(args, type_param_to_dyn));
    out.push(')');
    if let Some(result) = result {
        out.push_str(" -> ");
        out.push_str(&render(result, type_param_to_dyn));
    }
    out
}

fn join(types: &[CelType], type_param_to_dyn: bool) -> String {
    types
        .iter()
        .map(|t| render(t, type_param_to_dyn))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render(ty: &CelType, type_param_to_dyn: bool) -> String {
    match ty {
        CelType::Null => "null".to_string(),
        CelType::List(None) => "list".to_string(),
        CelType::List(Some(elem)) => format!("list({})", render(elem, type_param_to_dyn)),
        CelType::Map(key, value) => format!(
            "map({}, {})",
            render(key, type_param_to_dyn),
            render(value, type_param_to_dyn)
        ),
        CelType::Type(inner) => format!("type({})", render(inner, type_param_to_dyn)),
        CelType::Optional(inner) => {
            format!("{}({})", ty.name(), render(inner, type_param_to_dyn))
        }
        CelType::Opaque { params, .. } => match ty.function_parts() {
            Some((result, args)) => format_function(Some(result), args, false, type_param_to_dyn),
            None if params.is_empty() => ty.name().to_string(),
            None => format!("{}({})", ty.name(), join(params, type_param_to_dyn)),
        },
        CelType::TypeParam(_) if type_param_to_dyn => "dyn".to_string(),
        CelType::Nullable(target) => format!("wrapper({})", render(target, type_param_to_dyn)),
        _ => ty.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EnumType, StructType};

    #[test]
    fn primitive_types_display() {
        assert_eq!(CelType::Bool.to_string(), "bool");
        assert_eq!(CelType::Int.to_string(), "int");
        assert_eq!(CelType::UInt.to_string(), "uint");
        assert_eq!(CelType::Double.to_string(), "double");
        assert_eq!(CelType::String.to_string(), "string");
        assert_eq!(CelType::Bytes.to_string(), "bytes");
        assert_eq!(CelType::Null.to_string(), "null");
        assert_eq!(CelType::Error.to_string(), "*error*");
        assert_eq!(CelType::Dyn.to_string(), "dyn");
        assert_eq!(CelType::Any.to_string(), "any");
    }

    #[test]
    fn well_known_display() {
        assert_eq!(CelType::Timestamp.to_string(), "google.protobuf.Timestamp");
        assert_eq!(CelType::Duration.to_string(), "google.protobuf.Duration");
        assert_eq!(CelType::nullable(CelType::Int).to_string(), "wrapper(int)");
    }

    #[test]
    fn container_display() {
        assert_eq!(format(&CelType::list(CelType::Int)), "list(int)");
        assert_eq!(
            format(&CelType::map(CelType::String, CelType::Dyn)),
            "map(string, dyn)"
        );
        assert_eq!(
            format(&CelType::map(CelType::String, CelType::list(CelType::Int))),
            "map(string, list(int))"
        );
        assert_eq!(format(&CelType::type_of(CelType::Int)), "type(int)");
        assert_eq!(format(&CelType::optional(CelType::Int)), "optional_type(int)");
        assert_eq!(format(&CelType::unparameterized_list()), "list");
    }

    #[test]
    fn nominal_display() {
        let msg = CelType::Struct(StructType::from_fields("pkg.Msg", []));
        assert_eq!(format(&msg), "pkg.Msg");
        assert_eq!(format(&CelType::struct_ref("pkg.Ref")), "pkg.Ref");
        assert_eq!(format(&CelType::type_param("T")), "T");
        assert_eq!(format(&CelType::Enum(EnumType::new("pkg.E", []))), "pkg.E");
    }

    #[test]
    fn opaque_display() {
        assert_eq!(
            format(&CelType::opaque("vector", &[CelType::Int, CelType::String])),
            "vector(int, string)"
        );
        assert_eq!(format(&CelType::json()), "json");
    }

    #[test]
    fn function_display() {
        assert_eq!(
            format(&CelType::opaque("function", &[CelType::Int, CelType::String])),
            "(string) -> int"
        );
        assert_eq!(
            format(&CelType::function(CelType::Bool, &[CelType::String, CelType::Int])),
            "(string, int) -> bool"
        );
        assert_eq!(format(&CelType::function(CelType::Int, &[])), "() -> int");
    }

    #[test]
    fn function_type_params() {
        let args = [CelType::list(CelType::type_param("T")), CelType::Int];
        let result = CelType::type_param("T");
        assert_eq!(
            format_function(Some(&result), &args, false, false),
            "(list(T), int) -> T"
        );
        assert_eq!(
            format_function(Some(&result), &args, false, true),
            "(list(dyn), int) -> dyn"
        );
    }

    #[test]
    fn instance_function() {
        let args = [CelType::String, CelType::String];
        assert_eq!(
            format_function(Some(&CelType::Bool), &args, true, false),
            "string.(string) -> bool"
        );
        assert_eq!(format_function(None, &args, false, false), "(string, string)");
    }
}
