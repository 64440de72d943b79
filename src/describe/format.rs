//! Output tokens and indentation.

use std::fmt::Write;

use crate::{Error, Result};

pub const OPEN_STRING: &str = "\"";
pub const CLOSE_STRING: &str = "\"";
pub const OPEN_ARRAY: &str = "[";
pub const CLOSE_ARRAY: &str = "]";
pub const OPEN_MAP: &str = "{";
pub const CLOSE_MAP: &str = "}";
pub const OPEN_STRUCT: &str = "<";
pub const CLOSE_STRUCT: &str = ">";
pub const OPEN_META: &str = "<";
pub const CLOSE_META: &str = ">";
pub const POINTER_PREFIX: &str = "*";
pub const INTERFACE_PREFIX: &str = "@";
pub const REFERENCE_SEPARATOR: &str = "~";
pub const REFERENCE_PREFIX: &str = "$";
pub const MAP_TYPE_SEPARATOR: &str = ":";
pub const NIL: &str = "nil";
pub const INVALID: &str = "invalid";
pub const FUNC: &str = "func";
pub const NIL_FUNC: &str = "nilfunc";

const ITEM_SEPARATOR: &str = " ";
const KEY_VALUE_SEPARATOR: &str = "=";
const MULTILINE_KEY_VALUE_SEPARATOR: &str = " = ";

/// Separator and indentation policy for one description.
///
/// Compact (`step == 0`): items separated by a single space, `key=value`.
/// Multiline: every item starts on its own line indented by `depth * step`
/// spaces, `key = value`, and the closing token goes back to the parent depth.
#[derive(Debug, Clone)]
pub struct Layout {
    step: usize,
    depth: usize,
}

impl Layout {
    pub fn new(step: usize) -> Self {
        Self { step, depth: 0 }
    }

    pub fn is_multiline(&self) -> bool {
        self.step > 0
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn open(&mut self, out: &mut String, token: &str) {
        out.push_str(token);
        self.depth += 1;
    }

    /// Close a composite. `had_items` decides whether the closing token goes
    /// on its own line in multiline mode.
    pub fn close(&mut self, out: &mut String, token: &str, had_items: bool) -> Result<()> {
        self.depth = self
            .depth
            .checked_sub(1)
            .ok_or_else(|| Error::Internal("indent depth underflow".into()))?;
        if had_items && self.is_multiline() {
            self.newline(out)?;
        }
        out.push_str(token);
        Ok(())
    }

    /// Emit whatever goes before an item.
    pub fn before_item(&self, out: &mut String, first: bool) -> Result<()> {
        if self.is_multiline() {
            self.newline(out)
        } else {
            if !first {
                out.push_str(ITEM_SEPARATOR);
            }
            Ok(())
        }
    }

    pub fn key_value_separator(&self) -> &'static str {
        if self.is_multiline() { MULTILINE_KEY_VALUE_SEPARATOR } else { KEY_VALUE_SEPARATOR }
    }

    fn newline(&self, out: &mut String) -> Result<()> {
        write!(out, "\n{:width$}", "", width = self.depth * self.step)?;
        Ok(())
    }
}
