//! # Describer
//!
//! Turns a value graph into text in two passes:
//!
//! ```text
//! value ──scan──▶ Occurrences ──build──▶ ReferenceTable
//!   │                                         │
//!   └────────────────render───────────────────┴──▶ String
//! ```
//!
//! The scan pass counts how often each composite storage identity is reached;
//! identities reached more than once get a label. The render pass writes the
//! first full rendering of a labelled node as `<label>~...` and every later
//! visit as `$<label>`, so shared and cyclic data is printed exactly once.
//!
//! ## Output tokens (compact mode)
//!
//! | Token | Meaning |
//! |-------|---------|
//! | `"..."` | string, contents raw |
//! | `T[...]` | slice or array with element type `T` |
//! | `K:V{k=v ...}` | map with key type `K` and value type `V` |
//! | `Name<f=v ...>` | struct, fields in declaration order |
//! | `*` / `@` | pointer / interface prefix |
//! | `1~` / `$1` | first rendering of a shared node / back-reference |
//! | `nil`, `invalid` | nil value, absent value |
//! | `func(..)(..)`, `nilfunc(..)(..)` | function signatures |
//! | `meta.Value<..>`, `meta.Type<..>` | introspection handles |
//!
//! Entry order of maps is not specified.

pub mod format;
pub mod scan;
mod render;

use std::sync::Arc;

use crate::config::{self, DescribeOptions};
use crate::exposure::{self, Exposure, SealBreaker};
use crate::hooks::{self, HookRegistry};
use crate::model::Value;
use crate::Result;

use render::{Cursor, Renderer};
use scan::ReferenceTable;

/// Describes values with a given hook registry, exposure capability and
/// options.
///
/// `Describer::new()` uses the process-wide hook registry and the default
/// exposure capability; both can be swapped for injected ones.
#[derive(Clone)]
pub struct Describer {
    hooks: Arc<HookRegistry>,
    exposure: Arc<dyn Exposure>,
    options: DescribeOptions,
}

impl Default for Describer {
    fn default() -> Self {
        Self::new()
    }
}

impl Describer {
    pub fn new() -> Self {
        Self {
            hooks: Arc::clone(hooks::global()),
            exposure: Arc::new(SealBreaker),
            options: DescribeOptions::default(),
        }
    }

    pub fn with_registry(mut self, hooks: Arc<HookRegistry>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_exposure(mut self, exposure: Arc<dyn Exposure>) -> Self {
        self.exposure = exposure;
        self
    }

    pub fn with_options(mut self, options: DescribeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_indent_step(mut self, indent_step: usize) -> Self {
        self.options.indent_step = indent_step;
        self
    }

    /// Describe `value`, returning any failure as an error.
    pub fn try_describe(&self, value: &Value) -> Result<String> {
        let options = self.options.validate()?;
        // Both passes open sealed handles through the same capability.
        let opener = self.exposure.as_ref();
        let opener = exposure::can_expose(opener).then_some(opener);

        // Phase 1: Scan
        let occurrences = scan::scan(value, opener);

        // Phase 2: Label
        let table = ReferenceTable::build(&occurrences);
        tracing::debug!(
            identities = occurrences.len(),
            labels = table.len(),
            indent_step = options.indent_step,
            "describing value"
        );

        // Phase 3: Render
        let mut renderer = Renderer::new(
            &table,
            &self.hooks,
            opener,
            options.indent_step,
        );
        renderer.render(value, Cursor::default())?;
        Ok(renderer.finish())
    }

    /// Describe `value`. Never fails: errors become a diagnostic string,
    /// unless [`config::panic_on_error`] is set.
    pub fn describe(&self, value: &Value) -> String {
        match self.try_describe(value) {
            Ok(description) => description,
            Err(e) if config::panic_on_error() => panic!("describe: unexpected error: {e}"),
            Err(e) => {
                tracing::warn!(error = %e, "describe failed");
                format!("describe: unexpected error: {e}")
            }
        }
    }
}

impl std::fmt::Debug for Describer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Describer")
            .field("hooks", &self.hooks)
            .field("exposure_supported", &self.exposure.is_supported())
            .field("options", &self.options)
            .finish()
    }
}
