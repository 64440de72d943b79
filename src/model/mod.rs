//! # Value Model
//!
//! The runtime-typed value graph that descriptions are produced from.
//! Callers build `Value`s; the describer only reads them.
//!
//! Design rule: this module is pure data. Sharing and cycles are expressed
//! through `Shared` cells, never through ids or indices.

pub mod kind;
pub mod types;
pub mod shared;
pub mod composite;
pub mod value;

pub use kind::Kind;
pub use types::{
    Type, Signature, ChanDir, MetaKind,
    IntWidth, UintWidth, FloatWidth, ComplexWidth,
};
pub use shared::{Shared, Slot};
pub use composite::{
    PointerValue, InterfaceValue, SliceValue, ArrayValue, MapValue,
    StructValue, Field, Visibility, FuncValue, ChanValue,
    MetaValue, MetaTarget,
};
pub use value::{Value, TIMESTAMP_TYPE_NAME, URL_TYPE_NAME};
