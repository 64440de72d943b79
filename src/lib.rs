//! # describe-rs — Structural Value Describer
//!
//! Produces a single text description of a runtime-typed value graph,
//! exposing structure, element types and identity. Shared sub-objects and
//! reference cycles are printed once and referred back to, so the describer
//! terminates on any graph a naive recursive printer would loop on.
//!
//! ## Design Principles
//!
//! 1. **Two passes**: scan for shared storage first, then render with labels
//! 2. **Closed dispatch**: `Value` is a closed enum, one rendering per kind
//! 3. **Always a string**: failures are contained at the hook, the node, or
//!    the whole call, and surface as diagnostic text
//! 4. **Injectable collaborators**: hook registry and exposure capability can
//!    be swapped per `Describer`
//!
//! ## Quick Start
//!
//! ```rust
//! use describe_rs::{describe, Field, Slot, Type, Value};
//!
//! // A struct whose `next` field points back at itself.
//! let slot = Slot::new(Value::Invalid);
//! let node = Value::structure("Node", [
//!     Field::new("val", 0i64),
//!     Field::new("next", Value::pointer(Type::structure("Node"), &slot)),
//! ]);
//! slot.set(node.clone());
//!
//! assert_eq!(describe(&node, 0), "Node<val=0 next=*1~Node<val=0 next=*$1>>");
//! ```
//!
//! ## Output
//!
//! | Value | Description |
//! |-------|-------------|
//! | string | `"text"` (raw, no escaping) |
//! | pointer / interface | `*target` / `@held` |
//! | slice, array | `u8[0xff 0x80]` (unsigned elements in hex) |
//! | map | `String:i64{"a"=1 "b"=2}` (order unspecified) |
//! | struct | `Point<x=1 y=2>` |
//! | shared / cyclic | `1~...` on first rendering, `$1` afterwards |
//! | nil / absent | `nil` / `invalid` |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod describe;
pub mod hooks;
pub mod exposure;
pub mod config;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Value, Type, Kind, Field, Visibility, Signature, ChanDir,
    Shared, Slot, MetaValue, MetaTarget,
};

// ============================================================================
// Re-exports: Describer
// ============================================================================

pub use describe::Describer;
pub use hooks::{Hook, HookError, HookRegistry};
pub use exposure::{Exposure, ExposeError};
pub use config::DescribeOptions;

// ============================================================================
// Entry points
// ============================================================================

/// Describe `value`.
///
/// `indent_step == 0` gives compact single-line output; anything else gives
/// multiline output indented by that many spaces per level. Uses the
/// process-wide hook registry. Never fails: problems show up as diagnostic
/// text (see [`config::set_panic_on_error`] for debugging).
pub fn describe(value: &Value, indent_step: usize) -> String {
    Describer::new().with_indent_step(indent_step).describe(value)
}

/// Compact description; shorthand for `describe(value, 0)`.
pub fn d(value: &Value) -> String {
    describe(value, 0)
}

/// Install or replace the process-wide hook for `ty`; `None` removes it.
pub fn register_hook(ty: Type, hook: Option<Hook>) -> Option<Hook> {
    hooks::global().register(ty, hook)
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid indent step {step} (maximum {max})")]
    InvalidIndentStep { step: usize, max: usize },

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Format error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
