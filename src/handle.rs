//! Shared value cells returned by option registration.

use crate::coerce::{Coerce, CoerceError};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

/// A live reference to a registered option's value.
///
/// Registration returns a handle holding the declared default; a successful
/// parse stores the resolved value into the same cell. Handles are cheap to
/// clone and can be shared between threads.
///
/// # Example
/// ```
/// use declcfg::Registry;
///
/// let registry = Registry::new();
/// let port = registry.int("http.port", 8080, "listen port", &[]);
///
/// assert_eq!(port.get(), 8080);
/// assert_eq!(port.with(|p| p + 1), 8081);
/// ```
pub struct Handle<T> {
    cell: Arc<RwLock<T>>,
}

impl<T> Handle<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            cell: Arc::new(RwLock::new(value)),
        }
    }

    /// Locks the value for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.cell.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` against the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.read())
    }

    fn store(&self, value: T) {
        let mut guard = self.cell.write().unwrap_or_else(PoisonError::into_inner);
        *guard = value;
    }
}

impl<T: Clone> Handle<T> {
    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        self.read().clone()
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&*self.read()).finish()
    }
}

/// Type-erased view of a handle, stored inside the registry's nodes.
pub(crate) trait Cell: Send + Sync {
    /// Parses `raw` and stores the result. The cell is untouched on failure.
    fn set(&self, raw: &str) -> Result<(), CoerceError>;

    fn render(&self) -> String;

    fn type_name(&self) -> &'static str;
}

impl<T: Coerce> Cell for Handle<T> {
    fn set(&self, raw: &str) -> Result<(), CoerceError> {
        let value = T::coerce(raw)?;
        self.store(value);
        Ok(())
    }

    fn render(&self) -> String {
        self.read().render()
    }

    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }
}
