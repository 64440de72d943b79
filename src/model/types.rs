//! Declared types of value nodes.
//!
//! A [`Type`] is what a node *says* it is: the element type of an empty slice,
//! the parameter list of a nil function, the direction of a channel. Its
//! `Display` impl is the type name that ends up in descriptions, and it is the
//! key under which custom hooks are registered.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::Kind;

// ============================================================================
// Scalar widths
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntWidth {
    I8,
    I16,
    I32,
    I64,
    Isize,
}

impl IntWidth {
    pub fn name(&self) -> &'static str {
        match self {
            IntWidth::I8 => "i8",
            IntWidth::I16 => "i16",
            IntWidth::I32 => "i32",
            IntWidth::I64 => "i64",
            IntWidth::Isize => "isize",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UintWidth {
    U8,
    U16,
    U32,
    U64,
    Usize,
}

impl UintWidth {
    pub fn name(&self) -> &'static str {
        match self {
            UintWidth::U8 => "u8",
            UintWidth::U16 => "u16",
            UintWidth::U32 => "u32",
            UintWidth::U64 => "u64",
            UintWidth::Usize => "usize",
        }
    }

    /// Size in bytes. `Usize` follows the host pointer width.
    pub fn bytes(&self) -> usize {
        match self {
            UintWidth::U8 => 1,
            UintWidth::U16 => 2,
            UintWidth::U32 => 4,
            UintWidth::U64 => 8,
            UintWidth::Usize => std::mem::size_of::<usize>(),
        }
    }

    /// Number of hex digits used when rendered in hex context.
    pub fn hex_digits(&self) -> usize {
        self.bytes() * 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloatWidth {
    F32,
    F64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplexWidth {
    C64,
    C128,
}

/// Channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChanDir {
    Both,
    Recv,
    Send,
}

/// What a meta handle wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetaKind {
    Value,
    Type,
}

impl MetaKind {
    pub fn marker(&self) -> &'static str {
        match self {
            MetaKind::Value => "meta.Value",
            MetaKind::Type => "meta.Type",
        }
    }
}

// ============================================================================
// Signature
// ============================================================================

/// Parameter and result types of a function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub params: SmallVec<[Type; 4]>,
    pub results: SmallVec<[Type; 2]>,
}

impl Signature {
    pub fn new(
        params: impl IntoIterator<Item = Type>,
        results: impl IntoIterator<Item = Type>,
    ) -> Self {
        Self {
            params: params.into_iter().collect(),
            results: results.into_iter().collect(),
        }
    }
}

/// Renders as `(P1, P2)(R1, R2)`; the caller supplies the `func` prefix.
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type_list(f, &self.params)?;
        write_type_list(f, &self.results)
    }
}

fn write_type_list(f: &mut fmt::Formatter<'_>, types: &[Type]) -> fmt::Result {
    f.write_str("(")?;
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{ty}")?;
    }
    f.write_str(")")
}

// ============================================================================
// Type
// ============================================================================

/// Declared type of a value node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of")]
pub enum Type {
    Invalid,
    Bool,
    Int(IntWidth),
    Uint(UintWidth),
    Float(FloatWidth),
    Complex(ComplexWidth),
    String,
    Pointer(Box<Type>),
    /// `None` is the empty interface.
    Interface(Option<String>),
    Slice(Box<Type>),
    Array(Box<Type>, usize),
    Map(Box<Type>, Box<Type>),
    Struct(String),
    Func(Box<Signature>),
    Chan(ChanDir, Box<Type>),
    RawPointer,
    Meta(MetaKind),
    Opaque(String),
}

impl Type {
    pub const BOOL: Type = Type::Bool;
    pub const I8: Type = Type::Int(IntWidth::I8);
    pub const I16: Type = Type::Int(IntWidth::I16);
    pub const I32: Type = Type::Int(IntWidth::I32);
    pub const I64: Type = Type::Int(IntWidth::I64);
    pub const ISIZE: Type = Type::Int(IntWidth::Isize);
    pub const U8: Type = Type::Uint(UintWidth::U8);
    pub const U16: Type = Type::Uint(UintWidth::U16);
    pub const U32: Type = Type::Uint(UintWidth::U32);
    pub const U64: Type = Type::Uint(UintWidth::U64);
    pub const USIZE: Type = Type::Uint(UintWidth::Usize);
    pub const F32: Type = Type::Float(FloatWidth::F32);
    pub const F64: Type = Type::Float(FloatWidth::F64);
    pub const STRING: Type = Type::String;
    /// The empty interface: holds a value of any type.
    pub const ANY: Type = Type::Interface(None);

    pub fn pointer(elem: Type) -> Self { Type::Pointer(Box::new(elem)) }
    pub fn slice(elem: Type) -> Self { Type::Slice(Box::new(elem)) }
    pub fn array(elem: Type, len: usize) -> Self { Type::Array(Box::new(elem), len) }
    pub fn map(key: Type, value: Type) -> Self { Type::Map(Box::new(key), Box::new(value)) }
    pub fn structure(name: impl Into<String>) -> Self { Type::Struct(name.into()) }
    pub fn interface(name: impl Into<String>) -> Self { Type::Interface(Some(name.into())) }
    pub fn chan(dir: ChanDir, elem: Type) -> Self { Type::Chan(dir, Box::new(elem)) }

    pub fn func(
        params: impl IntoIterator<Item = Type>,
        results: impl IntoIterator<Item = Type>,
    ) -> Self {
        Type::Func(Box::new(Signature::new(params, results)))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Type::Invalid => Kind::Invalid,
            Type::Bool => Kind::Bool,
            Type::Int(_) => Kind::Int,
            Type::Uint(_) => Kind::Uint,
            Type::Float(_) => Kind::Float,
            Type::Complex(_) => Kind::Complex,
            Type::String => Kind::String,
            Type::Pointer(_) => Kind::Pointer,
            Type::Interface(_) => Kind::Interface,
            Type::Slice(_) => Kind::Slice,
            Type::Array(..) => Kind::Array,
            Type::Map(..) => Kind::Map,
            Type::Struct(_) => Kind::Struct,
            Type::Func(_) => Kind::Func,
            Type::Chan(..) => Kind::Chan,
            Type::RawPointer => Kind::RawPointer,
            Type::Meta(_) => Kind::Meta,
            Type::Opaque(_) => Kind::Opaque,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Invalid => f.write_str("invalid"),
            Type::Bool => f.write_str("bool"),
            Type::Int(w) => f.write_str(w.name()),
            Type::Uint(w) => f.write_str(w.name()),
            Type::Float(FloatWidth::F32) => f.write_str("f32"),
            Type::Float(FloatWidth::F64) => f.write_str("f64"),
            Type::Complex(ComplexWidth::C64) => f.write_str("complex64"),
            Type::Complex(ComplexWidth::C128) => f.write_str("complex128"),
            Type::String => f.write_str("String"),
            Type::Pointer(t) => write!(f, "*{t}"),
            Type::Interface(None) => f.write_str("interface"),
            Type::Interface(Some(name)) => f.write_str(name),
            Type::Slice(t) => write!(f, "[{t}]"),
            Type::Array(t, n) => write!(f, "[{t}; {n}]"),
            Type::Map(k, v) => write!(f, "map<{k}, {v}>"),
            Type::Struct(name) => f.write_str(name),
            Type::Func(sig) => write!(f, "func{sig}"),
            Type::Chan(ChanDir::Both, t) => write!(f, "chan<{t}>"),
            Type::Chan(ChanDir::Recv, t) => write!(f, "<-chan {t}"),
            Type::Chan(ChanDir::Send, t) => write!(f, "chan<- {t}"),
            Type::RawPointer => f.write_str("rawptr"),
            Type::Meta(m) => f.write_str(m.marker()),
            Type::Opaque(name) => f.write_str(name),
        }
    }
}
