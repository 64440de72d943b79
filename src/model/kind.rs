//! The closed set of value kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a [`Value`](super::Value) node.
///
/// Every value belongs to exactly one kind. The renderer dispatches on the
/// value itself, so this enum is mostly used for identity keys, hex-context
/// decisions, and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Invalid,
    Bool,
    Int,
    Uint,
    Float,
    Complex,
    String,
    Pointer,
    Interface,
    Slice,
    Array,
    Map,
    Struct,
    Func,
    Chan,
    RawPointer,
    /// A handle over another value or type (introspection on introspection).
    Meta,
    /// A value that cannot be looked into; only its type name is known.
    Opaque,
}

impl Kind {
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Invalid => "invalid",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::Complex => "complex",
            Kind::String => "string",
            Kind::Pointer => "pointer",
            Kind::Interface => "interface",
            Kind::Slice => "slice",
            Kind::Array => "array",
            Kind::Map => "map",
            Kind::Struct => "struct",
            Kind::Func => "func",
            Kind::Chan => "chan",
            Kind::RawPointer => "rawptr",
            Kind::Meta => "meta",
            Kind::Opaque => "opaque",
        }
    }

    /// Kinds whose runtime value can be nil.
    pub fn is_nillable(&self) -> bool {
        matches!(
            self,
            Kind::Pointer
                | Kind::Interface
                | Kind::Slice
                | Kind::Map
                | Kind::Func
                | Kind::Chan
                | Kind::RawPointer
        )
    }

    /// Kinds that can carry an identity.
    pub fn is_composite(&self) -> bool {
        matches!(self, Kind::Slice | Kind::Array | Kind::Map | Kind::Struct)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
