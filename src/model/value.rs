//! Universal dynamic value type.

use std::fmt;

use chrono::{DateTime, Utc};
use url::Url;

use super::{
    ArrayValue, ChanDir, ChanValue, ComplexWidth, Field, FloatWidth, FuncValue, IntWidth,
    InterfaceValue, Kind, MapValue, MetaValue, PointerValue, Shared, Signature,
    SliceValue, Slot, StructValue, Type, UintWidth,
};

/// Struct name used by [`Value::timestamp`]; the built-in hook is keyed on it.
pub const TIMESTAMP_TYPE_NAME: &str = "DateTime";

/// Struct name used by [`Value::url`]; the built-in hook is keyed on it.
pub const URL_TYPE_NAME: &str = "Url";

/// A node in a runtime-typed value graph.
///
/// Covers the kinds of a reflective type system:
/// - Scalars: Bool, Int, Uint, Float, Complex, String
/// - Indirection: Pointer, Interface
/// - Containers: Slice, Array, Map, Struct
/// - Opaque behaviour: Func, Chan, RawPointer
/// - Introspection: Meta (a handle over another value or type), Opaque
///
/// Slices, maps and pointer targets live in [`Shared`] cells, so a graph can
/// share sub-objects and contain cycles.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The absent, untyped value.
    #[default]
    Invalid,
    Bool(bool),
    Int { value: i64, width: IntWidth },
    Uint { value: u64, width: UintWidth },
    Float { value: f64, width: FloatWidth },
    Complex { re: f64, im: f64, width: ComplexWidth },
    String(String),
    Pointer(PointerValue),
    Interface(InterfaceValue),
    Slice(SliceValue),
    Array(ArrayValue),
    Map(MapValue),
    Struct(StructValue),
    Func(FuncValue),
    Chan(ChanValue),
    RawPointer(Option<usize>),
    Meta(MetaValue),
    /// A value that cannot be introspected; only its type name is known.
    Opaque(String),
}

// ============================================================================
// Type checking
// ============================================================================

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Invalid => Kind::Invalid,
            Value::Bool(_) => Kind::Bool,
            Value::Int { .. } => Kind::Int,
            Value::Uint { .. } => Kind::Uint,
            Value::Float { .. } => Kind::Float,
            Value::Complex { .. } => Kind::Complex,
            Value::String(_) => Kind::String,
            Value::Pointer(_) => Kind::Pointer,
            Value::Interface(_) => Kind::Interface,
            Value::Slice(_) => Kind::Slice,
            Value::Array(_) => Kind::Array,
            Value::Map(_) => Kind::Map,
            Value::Struct(_) => Kind::Struct,
            Value::Func(_) => Kind::Func,
            Value::Chan(_) => Kind::Chan,
            Value::RawPointer(_) => Kind::RawPointer,
            Value::Meta(_) => Kind::Meta,
            Value::Opaque(_) => Kind::Opaque,
        }
    }

    /// Declared type of this node.
    pub fn type_of(&self) -> Type {
        match self {
            Value::Invalid => Type::Invalid,
            Value::Bool(_) => Type::Bool,
            Value::Int { width, .. } => Type::Int(*width),
            Value::Uint { width, .. } => Type::Uint(*width),
            Value::Float { width, .. } => Type::Float(*width),
            Value::Complex { width, .. } => Type::Complex(*width),
            Value::String(_) => Type::String,
            Value::Pointer(p) => Type::pointer(p.elem.clone()),
            Value::Interface(i) => i.ty.clone(),
            Value::Slice(s) => Type::slice(s.elem.clone()),
            Value::Array(a) => Type::array(a.elem.clone(), a.items.len()),
            Value::Map(m) => Type::map(m.key.clone(), m.value.clone()),
            Value::Struct(s) => Type::Struct(s.name.clone()),
            Value::Func(f) => Type::Func(Box::new(f.signature.clone())),
            Value::Chan(c) => Type::chan(c.dir, c.elem.clone()),
            Value::RawPointer(_) => Type::RawPointer,
            Value::Meta(m) => Type::Meta(m.kind()),
            Value::Opaque(name) => Type::Opaque(name.clone()),
        }
    }

    /// True for a nil pointer, interface, slice, map, func, chan or raw pointer.
    pub fn is_nil(&self) -> bool {
        if !self.kind().is_nillable() {
            return false;
        }
        match self {
            Value::Pointer(p) => p.target.is_none(),
            Value::Interface(i) => i.held.is_none(),
            Value::Slice(s) => s.items.is_none(),
            Value::Map(m) => m.entries.is_none(),
            Value::Func(f) => f.is_nil,
            Value::Chan(c) => c.is_nil,
            Value::RawPointer(addr) => addr.is_none(),
            _ => false,
        }
    }

    pub fn is_valid(&self) -> bool { !matches!(self, Value::Invalid) }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::Uint { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl Value {
    /// Pointer to an existing cell.
    pub fn pointer(elem: Type, target: &Slot) -> Self {
        Value::Pointer(PointerValue { elem, target: Some(target.clone()) })
    }

    /// Pointer to a fresh cell holding `value`.
    pub fn boxed(value: impl Into<Value>) -> Self {
        let value = value.into();
        let elem = value.type_of();
        Value::Pointer(PointerValue { elem, target: Some(Slot::new(value)) })
    }

    pub fn nil_pointer(elem: Type) -> Self {
        Value::Pointer(PointerValue { elem, target: None })
    }

    /// Wrap a value in the empty interface. Wrapping `Invalid` gives a nil
    /// interface.
    pub fn interface(held: impl Into<Value>) -> Self {
        let held = held.into();
        let held = held.is_valid().then(|| Box::new(held));
        Value::Interface(InterfaceValue { ty: Type::ANY, held })
    }

    pub fn nil_interface(ty: Type) -> Self {
        Value::Interface(InterfaceValue { ty, held: None })
    }

    /// Slice over fresh storage.
    pub fn slice(elem: Type, items: impl IntoIterator<Item = Value>) -> Self {
        Self::slice_of(elem, &Shared::new(items.into_iter().collect()))
    }

    /// Slice over existing storage.
    pub fn slice_of(elem: Type, items: &Shared<Vec<Value>>) -> Self {
        Value::Slice(SliceValue { elem, items: Some(items.clone()) })
    }

    pub fn nil_slice(elem: Type) -> Self {
        Value::Slice(SliceValue { elem, items: None })
    }

    pub fn array(elem: Type, items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(ArrayValue { elem, items: items.into_iter().collect() })
    }

    /// Map over a fresh entry table.
    pub fn map(key: Type, value: Type, entries: impl IntoIterator<Item = (Value, Value)>) -> Self {
        Self::map_of(key, value, &Shared::new(entries.into_iter().collect()))
    }

    /// Map over an existing entry table.
    pub fn map_of(key: Type, value: Type, entries: &Shared<Vec<(Value, Value)>>) -> Self {
        Value::Map(MapValue { key, value, entries: Some(entries.clone()) })
    }

    pub fn nil_map(key: Type, value: Type) -> Self {
        Value::Map(MapValue { key, value, entries: None })
    }

    pub fn structure(name: impl Into<String>, fields: impl IntoIterator<Item = Field>) -> Self {
        Value::Struct(StructValue { name: name.into(), fields: fields.into_iter().collect() })
    }

    pub fn func(
        params: impl IntoIterator<Item = Type>,
        results: impl IntoIterator<Item = Type>,
    ) -> Self {
        Value::Func(FuncValue { signature: Signature::new(params, results), is_nil: false })
    }

    pub fn nil_func(
        params: impl IntoIterator<Item = Type>,
        results: impl IntoIterator<Item = Type>,
    ) -> Self {
        Value::Func(FuncValue { signature: Signature::new(params, results), is_nil: true })
    }

    pub fn chan(dir: ChanDir, elem: Type) -> Self {
        Value::Chan(ChanValue { dir, elem, is_nil: false })
    }

    pub fn nil_chan(dir: ChanDir, elem: Type) -> Self {
        Value::Chan(ChanValue { dir, elem, is_nil: true })
    }

    pub fn raw_pointer(addr: usize) -> Self { Value::RawPointer(Some(addr)) }

    pub fn complex(re: f64, im: f64) -> Self {
        Value::Complex { re, im, width: ComplexWidth::C128 }
    }

    /// Meta handle over a value.
    pub fn meta(inner: impl Into<Value>) -> Self {
        Value::Meta(MetaValue::Value(Box::new(inner.into())))
    }

    /// Meta handle over a type.
    pub fn meta_type(ty: Type) -> Self {
        Value::Meta(MetaValue::Type(ty))
    }

    pub fn opaque(type_name: impl Into<String>) -> Self { Value::Opaque(type_name.into()) }

    /// A UTC timestamp, stored as seconds and nanoseconds since the epoch.
    ///
    /// Rendered by the built-in hook as `time<2020-01-01 01:01:01 UTC>`.
    pub fn timestamp(at: DateTime<Utc>) -> Self {
        Value::structure(
            TIMESTAMP_TYPE_NAME,
            [
                Field::private("secs", at.timestamp()),
                Field::private("nanos", at.timestamp_subsec_nanos()),
            ],
        )
    }

    /// A URL, stored as its serialization.
    ///
    /// Rendered by the built-in hook as `url<http://example.com>`.
    pub fn url(url: &Url) -> Self {
        Value::structure(URL_TYPE_NAME, [Field::private("href", url.as_str())])
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

macro_rules! from_int {
    ($($t:ty => $w:ident),* $(,)?) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self { Value::Int { value: v as i64, width: IntWidth::$w } }
        })*
    };
}

macro_rules! from_uint {
    ($($t:ty => $w:ident),* $(,)?) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self { Value::Uint { value: v as u64, width: UintWidth::$w } }
        })*
    };
}

from_int!(i8 => I8, i16 => I16, i32 => I32, i64 => I64, isize => Isize);
from_uint!(u8 => U8, u16 => U16, u32 => U32, u64 => U64, usize => Usize);

impl From<bool> for Value { fn from(v: bool) -> Self { Value::Bool(v) } }
impl From<f32> for Value {
    fn from(v: f32) -> Self { Value::Float { value: v as f64, width: FloatWidth::F32 } }
}
impl From<f64> for Value {
    fn from(v: f64) -> Self { Value::Float { value: v, width: FloatWidth::F64 } }
}
impl From<String> for Value { fn from(v: String) -> Self { Value::String(v) } }
impl From<&str> for Value { fn from(v: &str) -> Self { Value::String(v.to_owned()) } }
impl From<DateTime<Utc>> for Value { fn from(v: DateTime<Utc>) -> Self { Value::timestamp(v) } }
impl From<Url> for Value { fn from(v: Url) -> Self { Value::url(&v) } }

// ============================================================================
// Display
// ============================================================================

/// `{}` is the compact description, `{:#}` the multiline one.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = if f.alternate() { crate::config::DEFAULT_MULTILINE_STEP } else { 0 };
        f.write_str(&crate::describe(self, step))
    }
}
