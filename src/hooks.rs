//! Custom rendering hooks.
//!
//! A hook replaces the default rendering of one concrete [`Type`]. Hooks live
//! in a [`HookRegistry`]: either the process-wide one returned by [`global`]
//! (created on first use with the built-in hooks, never torn down), or a
//! registry built by the caller and injected into a
//! [`Describer`](crate::Describer).
//!
//! ## Threading
//!
//! A registry is internally synchronized. Registering or removing a hook
//! while other threads are describing is safe; a description sees the
//! registry as it was when each node was looked up. Hooks run without the
//! registry lock held, so a hook may itself register hooks.
//!
//! By convention a hook prints a short type marker followed by the payload in
//! angle brackets, e.g. `time<2020-01-01 01:01:01 UTC>`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, LazyLock};

use chrono::DateTime;
use hashbrown::HashMap;
use parking_lot::RwLock;

use url::Url;

use crate::model::{Type, Value, TIMESTAMP_TYPE_NAME, URL_TYPE_NAME};

/// A custom renderer for one concrete type.
pub type Hook = Arc<dyn Fn(&Value) -> Result<String, HookError> + Send + Sync>;

/// Wrap a closure as a [`Hook`].
pub fn hook<F>(f: F) -> Hook
where
    F: Fn(&Value) -> Result<String, HookError> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum HookError {
    #[error("{0}")]
    Failed(String),

    #[error("unexpected value: expected {expected}, got {got}")]
    Mismatch { expected: String, got: String },

    #[error("panicked: {0}")]
    Panicked(String),
}

// ============================================================================
// HookRegistry
// ============================================================================

/// Concurrency-safe map from concrete type to hook.
#[derive(Default)]
pub struct HookRegistry {
    hooks: RwLock<HashMap<Type, Hook>>,
}

impl HookRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with the built-in hooks.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(Type::structure(TIMESTAMP_TYPE_NAME), Some(hook(describe_timestamp)));
        registry.register(Type::structure(URL_TYPE_NAME), Some(hook(describe_url)));
        registry
    }

    /// Install or replace the hook for `ty`; `None` removes it.
    /// Returns the hook previously registered for `ty`.
    pub fn register(&self, ty: Type, hook: Option<Hook>) -> Option<Hook> {
        let mut hooks = self.hooks.write();
        match hook {
            Some(hook) => hooks.insert(ty, hook),
            None => hooks.remove(&ty),
        }
    }

    pub fn get(&self, ty: &Type) -> Option<Hook> {
        self.hooks.read().get(ty).cloned()
    }

    pub fn contains(&self, ty: &Type) -> bool {
        self.hooks.read().contains_key(ty)
    }

    pub fn len(&self) -> usize {
        self.hooks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.read().is_empty()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hooks = self.hooks.read();
        let mut types: Vec<String> = hooks.keys().map(ToString::to_string).collect();
        types.sort();
        f.debug_struct("HookRegistry").field("types", &types).finish()
    }
}

static GLOBAL: LazyLock<Arc<HookRegistry>> =
    LazyLock::new(|| Arc::new(HookRegistry::with_builtins()));

/// The process-wide registry.
pub fn global() -> &'static Arc<HookRegistry> {
    &GLOBAL
}

/// Run a hook, containing both `Err` results and panics.
pub(crate) fn invoke(hook: &Hook, value: &Value) -> Result<String, HookError> {
    panic::catch_unwind(AssertUnwindSafe(|| hook(value)))
        .unwrap_or_else(|payload| Err(HookError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

// ============================================================================
// Built-in hooks
// ============================================================================

fn describe_timestamp(value: &Value) -> Result<String, HookError> {
    let mismatch = || HookError::Mismatch {
        expected: TIMESTAMP_TYPE_NAME.to_owned(),
        got: value.type_of().to_string(),
    };
    let fields = value.as_struct().ok_or_else(mismatch)?;
    let secs = fields.field("secs").and_then(Value::as_int).ok_or_else(mismatch)?;
    let nanos = fields.field("nanos").and_then(Value::as_uint).ok_or_else(mismatch)?;
    let nanos = u32::try_from(nanos).map_err(|_| mismatch())?;
    let at = DateTime::from_timestamp(secs, nanos)
        .ok_or_else(|| HookError::Failed(format!("timestamp out of range: {secs}s {nanos}ns")))?;
    Ok(format!("time<{at}>"))
}

/// `url<...>` with the normalized URL. A bare root path is left off, so
/// `http://example.com` stays as written.
fn describe_url(value: &Value) -> Result<String, HookError> {
    let href = value
        .as_struct()
        .and_then(|s| s.field("href"))
        .and_then(Value::as_str)
        .ok_or_else(|| HookError::Mismatch {
            expected: URL_TYPE_NAME.to_owned(),
            got: value.type_of().to_string(),
        })?;
    let url = Url::parse(href)
        .map_err(|e| HookError::Failed(format!("invalid url {href:?}: {e}")))?;
    let bare_root = url.has_host()
        && url.path() == "/"
        && url.query().is_none()
        && url.fragment().is_none();
    let text = match url.as_str().strip_suffix('/') {
        Some(bare) if bare_root => bare,
        _ => url.as_str(),
    };
    Ok(format!("url<{text}>"))
}
