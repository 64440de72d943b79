//! Payloads of the non-scalar kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ChanDir, MetaKind, Shared, Signature, Slot, Type, Value};

/// A pointer: element type plus the cell it points to (`None` = nil).
#[derive(Debug, Clone)]
pub struct PointerValue {
    pub elem: Type,
    pub target: Option<Slot>,
}

/// An interface holding a concrete value (`None` = nil).
#[derive(Debug, Clone)]
pub struct InterfaceValue {
    pub ty: Type,
    pub held: Option<Box<Value>>,
}

/// A slice over shared backing storage (`None` = nil).
#[derive(Debug, Clone)]
pub struct SliceValue {
    pub elem: Type,
    pub items: Option<Shared<Vec<Value>>>,
}

/// A fixed-length array stored inline.
#[derive(Debug, Clone)]
pub struct ArrayValue {
    pub elem: Type,
    pub items: Vec<Value>,
}

/// A map over a shared entry table (`None` = nil).
///
/// Entries are kept in insertion order, but that order is not part of any
/// contract: descriptions of maps must be treated as unordered.
#[derive(Debug, Clone)]
pub struct MapValue {
    pub key: Type,
    pub value: Type,
    pub entries: Option<Shared<Vec<(Value, Value)>>>,
}

/// A struct; fields are kept in declaration order.
#[derive(Debug, Clone)]
pub struct StructValue {
    pub name: String,
    pub fields: Vec<Field>,
}

impl StructValue {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Public,
    /// Meta handles below a private field are sealed.
    Private,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub visibility: Visibility,
    pub value: Value,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            value: value.into(),
        }
    }

    pub fn private(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            visibility: Visibility::Private,
            ..Self::new(name, value)
        }
    }

    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }
}

/// A function. Only its signature is ever looked at.
#[derive(Debug, Clone)]
pub struct FuncValue {
    pub signature: Signature,
    pub is_nil: bool,
}

/// A channel. Only its type is ever looked at; contents are never drained.
#[derive(Debug, Clone)]
pub struct ChanValue {
    pub dir: ChanDir,
    pub elem: Type,
    pub is_nil: bool,
}

/// A handle over another value or over a type.
#[derive(Debug, Clone)]
pub enum MetaValue {
    Value(Box<Value>),
    Type(Type),
}

/// What a meta handle resolves to once opened.
#[derive(Debug, Clone, Copy)]
pub enum MetaTarget<'a> {
    Value(&'a Value),
    Type(&'a Type),
}

impl MetaValue {
    pub fn kind(&self) -> MetaKind {
        match self {
            MetaValue::Value(_) => MetaKind::Value,
            MetaValue::Type(_) => MetaKind::Type,
        }
    }

    pub fn target(&self) -> MetaTarget<'_> {
        match self {
            MetaValue::Value(v) => MetaTarget::Value(v),
            MetaValue::Type(t) => MetaTarget::Type(t),
        }
    }
}

/// Default textual form of a handle that may not be opened: the marker plus
/// the wrapped type, e.g. `meta.Value{i64}`.
impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = self.kind().marker();
        match self {
            MetaValue::Value(v) => write!(f, "{marker}{{{}}}", v.type_of()),
            MetaValue::Type(t) => write!(f, "{marker}{{{t}}}"),
        }
    }
}
