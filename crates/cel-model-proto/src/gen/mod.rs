//! Protobuf types for the `cel.expr.Type` message from cel-spec `checked.proto`.
//!
//! Written in the shape prost-build emits so the encoding matches other CEL
//! implementations byte for byte.

// Re-export prost_types for the NullValue enumeration
pub use prost_types;

pub mod cel {
    pub mod expr {
        /// Represents a CEL type.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Type {
            /// The kind of type.
            #[prost(
                oneof = "r#type::TypeKind",
                tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 14"
            )]
            pub type_kind: ::core::option::Option<r#type::TypeKind>,
        }

        /// Nested message and enum types in `Type`.
        pub mod r#type {
            /// List type with typed elements, e.g. `list<example.proto.MyMessage>`.
            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct ListType {
                /// The element type.
                #[prost(message, optional, boxed, tag = "1")]
                pub elem_type: ::core::option::Option<::prost::alloc::boxed::Box<super::Type>>,
            }

            /// Map type with parameterized key and value types, e.g. `map<string, int>`.
            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct MapType {
                /// The type of the key.
                #[prost(message, optional, boxed, tag = "1")]
                pub key_type: ::core::option::Option<::prost::alloc::boxed::Box<super::Type>>,
                /// The type of the value.
                #[prost(message, optional, boxed, tag = "2")]
                pub value_type: ::core::option::Option<::prost::alloc::boxed::Box<super::Type>>,
            }

            /// Function type with result and arg types.
            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct FunctionType {
                /// Result type of the function.
                #[prost(message, optional, boxed, tag = "1")]
                pub result_type: ::core::option::Option<::prost::alloc::boxed::Box<super::Type>>,
                /// Argument types of the function.
                #[prost(message, repeated, tag = "2")]
                pub arg_types: ::prost::alloc::vec::Vec<super::Type>,
            }

            /// Application defined abstract type.
            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct AbstractType {
                /// The fully qualified name of this abstract type.
                #[prost(string, tag = "1")]
                pub name: ::prost::alloc::string::String,
                /// Parameter types for this abstract type.
                #[prost(message, repeated, tag = "2")]
                pub parameter_types: ::prost::alloc::vec::Vec<super::Type>,
            }

            /// CEL primitive types.
            #[derive(
                Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
            )]
            #[repr(i32)]
            pub enum PrimitiveType {
                /// Unspecified type.
                Unspecified = 0,
                /// Boolean type.
                Bool = 1,
                /// Int64 type. 32-bit integer values are widened to int64.
                Int64 = 2,
                /// Uint64 type. 32-bit unsigned values are widened to uint64.
                Uint64 = 3,
                /// Double type. 32-bit float values are widened to double.
                Double = 4,
                /// String type.
                String = 5,
                /// Bytes type.
                Bytes = 6,
            }

            /// Well-known protobuf types treated with first-class support in CEL.
            #[derive(
                Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
            )]
            #[repr(i32)]
            pub enum WellKnownType {
                /// Unspecified type.
                Unspecified = 0,
                /// Well-known protobuf.Any type.
                Any = 1,
                /// Well-known protobuf.Timestamp type, internally referenced as `timestamp`.
                Timestamp = 2,
                /// Well-known protobuf.Duration type, internally referenced as `duration`.
                Duration = 3,
            }

            /// The kind of type.
            #[derive(Clone, PartialEq, ::prost::Oneof)]
            pub enum TypeKind {
                /// Dynamic type.
                #[prost(message, tag = "1")]
                Dyn(()),
                /// Null value.
                #[prost(enumeration = "::prost_types::NullValue", tag = "2")]
                Null(i32),
                /// Primitive types: `true`, `1u`, `-2.0`, `'string'`, `b'bytes'`.
                #[prost(enumeration = "PrimitiveType", tag = "3")]
                Primitive(i32),
                /// Wrapper of a primitive type, e.g. `google.protobuf.Int64Value`.
                #[prost(enumeration = "PrimitiveType", tag = "4")]
                Wrapper(i32),
                /// Well-known protobuf type such as `google.protobuf.Timestamp`.
                #[prost(enumeration = "WellKnownType", tag = "5")]
                WellKnown(i32),
                /// Parameterized list with elements of `list_type`, e.g. `list<timestamp>`.
                #[prost(message, tag = "6")]
                ListType(::prost::alloc::boxed::Box<ListType>),
                /// Parameterized map with typed keys and values.
                #[prost(message, tag = "7")]
                MapType(::prost::alloc::boxed::Box<MapType>),
                /// Function type.
                #[prost(message, tag = "8")]
                Function(::prost::alloc::boxed::Box<FunctionType>),
                /// Protocol buffer message type.
                #[prost(string, tag = "9")]
                MessageType(::prost::alloc::string::String),
                /// Type param type.
                #[prost(string, tag = "10")]
                TypeParam(::prost::alloc::string::String),
                /// Type type.
                #[prost(message, tag = "11")]
                Type(::prost::alloc::boxed::Box<super::Type>),
                /// Error type.
                #[prost(message, tag = "12")]
                Error(()),
                /// Abstract, application defined type.
                #[prost(message, tag = "14")]
                AbstractType(AbstractType),
            }
        }
    }
}
