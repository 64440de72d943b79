//! Process-wide flags and per-call options.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Largest accepted indent step. Anything above is a configuration error.
pub const MAX_INDENT_STEP: usize = 64;

/// Indent step used by `{:#}` formatting of a `Value`.
pub const DEFAULT_MULTILINE_STEP: usize = 4;

static EXPOSURE_ENABLED: AtomicBool = AtomicBool::new(true);
static PANIC_ON_ERROR: AtomicBool = AtomicBool::new(false);

// ============================================================================
// Flags
// ============================================================================

/// Allow sealed meta handles to be opened through the exposure capability.
///
/// Has no effect on builds where the capability is not supported
/// (see [`crate::exposure::SUPPORTED`]).
pub fn set_exposure_enabled(enabled: bool) {
    EXPOSURE_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn exposure_enabled() -> bool {
    EXPOSURE_ENABLED.load(Ordering::Relaxed)
}

/// Panic instead of returning a diagnostic string when describing fails.
/// Only useful when debugging this crate.
pub fn set_panic_on_error(enabled: bool) {
    PANIC_ON_ERROR.store(enabled, Ordering::Relaxed);
}

pub fn panic_on_error() -> bool {
    PANIC_ON_ERROR.load(Ordering::Relaxed)
}

// ============================================================================
// DescribeOptions
// ============================================================================

/// Options for a single description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescribeOptions {
    /// 0 selects compact single-line output; anything else is the number of
    /// spaces per nesting level in multiline output.
    pub indent_step: usize,
}

impl DescribeOptions {
    pub fn compact() -> Self {
        Self { indent_step: 0 }
    }

    pub fn multiline(indent_step: usize) -> Self {
        Self { indent_step }
    }

    pub fn is_multiline(&self) -> bool {
        self.indent_step > 0
    }

    pub fn validate(self) -> Result<Self> {
        if self.indent_step > MAX_INDENT_STEP {
            return Err(Error::InvalidIndentStep {
                step: self.indent_step,
                max: MAX_INDENT_STEP,
            });
        }
        Ok(self)
    }

    /// Parse and validate options from JSON, e.g. `{"indent_step": 2}`.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: DescribeOptions = serde_json::from_str(json)?;
        options.validate()
    }
}
