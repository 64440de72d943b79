//! Opening sealed meta handles.
//!
//! A meta handle reached through a private struct field is *sealed*: the
//! renderer may not look inside it on its own. The [`Exposure`] capability
//! can open it anyway. The capability is optional: it is compiled out with
//! the `safe` feature and on `wasm32`, it can be switched off at runtime with
//! [`config::set_exposure_enabled`], and opening may fail. Callers always keep
//! a fallback (the handle's default textual form).

use crate::config;
use crate::model::{MetaTarget, MetaValue};

/// Whether this build carries the exposure capability at all.
pub const SUPPORTED: bool = cfg!(not(any(feature = "safe", target_arch = "wasm32")));

#[derive(Debug, Clone, thiserror::Error)]
pub enum ExposeError {
    #[error("exposure is not supported on this build")]
    Unsupported,

    #[error("exposure refused: {0}")]
    Refused(String),
}

/// Capability that opens sealed meta handles.
pub trait Exposure: Send + Sync {
    /// Whether `expose` can succeed at all on this build.
    fn is_supported(&self) -> bool;

    fn expose<'a>(&self, meta: &'a MetaValue) -> Result<MetaTarget<'a>, ExposeError>;
}

/// The default capability: ignores the seal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SealBreaker;

impl Exposure for SealBreaker {
    fn is_supported(&self) -> bool { SUPPORTED }

    fn expose<'a>(&self, meta: &'a MetaValue) -> Result<MetaTarget<'a>, ExposeError> {
        if !SUPPORTED {
            return Err(ExposeError::Unsupported);
        }
        Ok(meta.target())
    }
}

/// A capability that is never available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExposure;

impl Exposure for NoExposure {
    fn is_supported(&self) -> bool { false }

    fn expose<'a>(&self, _meta: &'a MetaValue) -> Result<MetaTarget<'a>, ExposeError> {
        Err(ExposeError::Unsupported)
    }
}

/// Supported by the build and enabled at runtime.
pub fn can_expose(exposure: &dyn Exposure) -> bool {
    exposure.is_supported() && config::exposure_enabled()
}
