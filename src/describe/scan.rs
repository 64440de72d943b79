//! First pass: find shared and cyclic storage.
//!
//! The scanner walks the graph once and counts how often each composite
//! identity is reached. A second visit to an identity is counted but not
//! expanded, so cycles end after one lap. Identities reached more than once
//! get a label in the [`ReferenceTable`].

use hashbrown::HashMap;

use crate::exposure::Exposure;
use crate::model::{Kind, MetaTarget, MetaValue, Value};

/// Storage identity of a composite node.
///
/// Slices and maps are identified by their shared storage cell. Structs and
/// arrays are identified by their own address, and only when addressable
/// (reached through a pointer, a slice element, or a field/element of an
/// addressable composite). A struct or array passed by value has no identity
/// and is always treated as unshared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity {
    addr: usize,
    kind: Kind,
}

impl Identity {
    pub fn of(value: &Value, addressable: bool) -> Option<Identity> {
        if !value.kind().is_composite() {
            return None;
        }
        let addr = match value {
            Value::Slice(s) => s.items.as_ref()?.addr(),
            Value::Map(m) => m.entries.as_ref()?.addr(),
            Value::Struct(_) | Value::Array(_) if addressable => value as *const Value as usize,
            _ => return None,
        };
        Some(Identity { addr, kind: value.kind() })
    }
}

// ============================================================================
// Occurrences
// ============================================================================

/// Visit count per identity, plus the order identities were first seen in.
#[derive(Debug, Default)]
pub struct Occurrences {
    counts: HashMap<Identity, usize>,
    order: Vec<Identity>,
}

impl Occurrences {
    pub fn count(&self, id: &Identity) -> usize {
        self.counts.get(id).copied().unwrap_or(0)
    }

    /// Number of distinct identities seen.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Identities in discovery order with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (Identity, usize)> + '_ {
        self.order.iter().map(|id| (*id, self.counts[id]))
    }

    /// Record a visit. Returns true on the first visit, i.e. when the
    /// caller should recurse.
    fn enter(&mut self, id: Identity) -> bool {
        let count = self.counts.entry(id).or_insert(0);
        *count += 1;
        if *count == 1 {
            self.order.push(id);
            true
        } else {
            false
        }
    }
}

/// Count identities reachable from `root`.
///
/// Sealed meta handles are opened through `exposure`, the same capability the
/// renderer uses. With `None`, or when opening fails, their contents are not
/// scanned, so nothing behind them is labelled.
pub fn scan(root: &Value, exposure: Option<&dyn Exposure>) -> Occurrences {
    let mut scanner = Scanner { occurrences: Occurrences::default(), exposure };
    scanner.visit(root, false, false);
    scanner.occurrences
}

struct Scanner<'a> {
    occurrences: Occurrences,
    exposure: Option<&'a dyn Exposure>,
}

impl Scanner<'_> {
    fn visit(&mut self, value: &Value, addressable: bool, sealed: bool) {
        match value {
            Value::Pointer(p) => {
                if let Some(target) = p.target.as_ref().and_then(|slot| slot.read()) {
                    self.visit(&target, true, sealed);
                }
            }
            Value::Interface(i) => {
                if let Some(held) = &i.held {
                    self.visit(held, false, sealed);
                }
            }
            Value::Meta(meta) => {
                if let Some(MetaTarget::Value(inner)) = self.open(meta, sealed) {
                    self.visit(inner, false, false);
                }
            }
            Value::Slice(s) => {
                let Some(items) = &s.items else { return };
                if !self.enter(value, addressable) {
                    return;
                }
                if let Some(items) = items.read() {
                    for item in items.iter() {
                        self.visit(item, true, sealed);
                    }
                }
            }
            Value::Map(m) => {
                let Some(entries) = &m.entries else { return };
                if !self.enter(value, addressable) {
                    return;
                }
                if let Some(entries) = entries.read() {
                    for (key, val) in entries.iter() {
                        self.visit(key, false, sealed);
                        self.visit(val, false, sealed);
                    }
                }
            }
            Value::Array(a) => {
                if addressable && !self.enter(value, addressable) {
                    return;
                }
                for item in &a.items {
                    self.visit(item, addressable, sealed);
                }
            }
            Value::Struct(s) => {
                if addressable && !self.enter(value, addressable) {
                    return;
                }
                for field in &s.fields {
                    self.visit(&field.value, addressable, sealed || field.is_private());
                }
            }
            _ => {}
        }
    }

    fn open<'m>(&self, meta: &'m MetaValue, sealed: bool) -> Option<MetaTarget<'m>> {
        if !sealed {
            return Some(meta.target());
        }
        self.exposure?.expose(meta).ok()
    }

    fn enter(&mut self, value: &Value, addressable: bool) -> bool {
        match Identity::of(value, addressable) {
            Some(id) => self.occurrences.enter(id),
            None => true,
        }
    }
}

// ============================================================================
// ReferenceTable
// ============================================================================

/// Labels for identities reached more than once.
///
/// Labels start at 1 and follow discovery order, so the same graph always
/// gets the same numbering. Only identities with a count above 1 are
/// labelled.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    labels: HashMap<Identity, usize>,
}

impl ReferenceTable {
    pub fn build(occurrences: &Occurrences) -> Self {
        let labels = occurrences
            .iter()
            .filter(|(_, count)| *count > 1)
            .enumerate()
            .map(|(i, (id, _))| (id, i + 1))
            .collect();
        Self { labels }
    }

    pub fn label(&self, id: &Identity) -> Option<usize> {
        self.labels.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
