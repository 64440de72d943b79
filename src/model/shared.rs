//! Shared storage cells.
//!
//! Anything that can be referenced from more than one place in a value graph
//! lives in a [`Shared`] cell: pointer targets, slice backing arrays, map
//! entry tables. Two nodes referencing the same cell are the same storage,
//! which is what the describer keys identities on.

use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::Value;

/// Reference-counted, lock-protected storage.
pub struct Shared<T> {
    inner: Arc<RwLock<T>>,
}

/// Target of a pointer.
pub type Slot = Shared<Value>;

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self { inner: Arc::new(RwLock::new(value)) }
    }

    /// Stable address of the storage, used as its identity.
    pub fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &Shared<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Read access for traversal.
    ///
    /// Takes a recursive read lock so a cell already being read further up a
    /// cyclic traversal can be read again. Returns `None` while a writer holds
    /// the cell.
    pub fn read(&self) -> Option<RwLockReadGuard<'_, T>> {
        self.inner.try_read_recursive()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.inner.write()
    }

    /// Replace the stored value, returning the old one.
    pub fn set(&self, value: T) -> T {
        std::mem::replace(&mut *self.inner.write(), value)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

// Prints the address only; a cell may (indirectly) contain itself.
impl<T> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shared({:#x})", self.addr())
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
