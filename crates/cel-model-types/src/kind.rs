//! Coarse type categories.
//!
//! Every [`CelType`](crate::CelType) reports exactly one `Kind`. Assignability
//! and formatting switch exhaustively over this enum, so it is closed.

use std::fmt;

/// The category of a CEL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// No kind set. Used by the unspecified sentinel type.
    Unspecified,
    /// The error type produced when inference fails.
    Error,
    /// Dynamic type, compatible with everything.
    Dyn,
    /// `google.protobuf.Any`.
    Any,
    Bool,
    Bytes,
    Double,
    /// `google.protobuf.Duration`.
    Duration,
    /// Function signature encoded as an opaque type.
    Function,
    Int,
    List,
    Map,
    Null,
    /// Abstract application-defined type.
    Opaque,
    String,
    /// Nominal message type.
    Struct,
    /// `google.protobuf.Timestamp`.
    Timestamp,
    /// The type of a type: `type(T)`.
    Type,
    /// An unbound type variable.
    TypeParam,
    Uint,
}

impl Kind {
    /// Returns true for `dyn` and `any`, the kinds that absorb every other type.
    pub fn is_dyn(self) -> bool {
        matches!(self, Kind::Dyn | Kind::Any)
    }

    /// Returns true for unbound type variables.
    pub fn is_type_param(self) -> bool {
        self == Kind::TypeParam
    }

    /// Returns true for the error kind.
    pub fn is_error(self) -> bool {
        self == Kind::Error
    }

    /// Returns true for bool, int, uint, double, string and bytes.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            Kind::Bool | Kind::Int | Kind::Uint | Kind::Double | Kind::String | Kind::Bytes
        )
    }

    /// Lowercase name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Unspecified => "unspecified",
            Kind::Error => "error",
            Kind::Dyn => "dyn",
            Kind::Any => "any",
            Kind::Bool => "bool",
            Kind::Bytes => "bytes",
            Kind::Double => "double",
            Kind::Duration => "duration",
            Kind::Function => "function",
            Kind::Int => "int",
            Kind::List => "list",
            Kind::Map => "map",
            Kind::Null => "null",
            Kind::Opaque => "opaque",
            Kind::String => "string",
            Kind::Struct => "struct",
            Kind::Timestamp => "timestamp",
            Kind::Type => "type",
            Kind::TypeParam => "type_param",
            Kind::Uint => "uint",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
