//! Observable attribute cells.
//!
//! A [`Property<T>`] is an attribute cell that owns its own change signal.
//! Observed records store every attribute that can affect sorting, sectioning
//! or display in a property, so that a controller can subscribe to changes by
//! key without the record having to know who is watching.
//!
//! ```
//! use set_controller_core::Property;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let rating = Property::new(3);
//! let changes = Arc::new(AtomicUsize::new(0));
//!
//! let seen = changes.clone();
//! let _observation = rating.changed().subscribe(move |_| {
//!     seen.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! assert!(!rating.set(3)); // unchanged, no notification
//! assert!(rating.set(5));
//! assert_eq!(changes.load(Ordering::SeqCst), 1);
//! ```

use std::fmt;

use parking_lot::RwLock;

use crate::logging::targets;
use crate::signal::Signal;

/// An observable attribute cell.
///
/// `set()` compares the new value with the current one and only stores and
/// notifies when it actually differs. The change signal is emitted after the
/// internal lock is released, so slots may read the property.
pub struct Property<T> {
    value: RwLock<T>,
    changed: Signal<()>,
}

impl<T: Clone> Property<T> {
    /// A cell holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
            changed: Signal::new(),
        }
    }

    /// A clone of the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Borrow the current value for the duration of `f`.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Store `value` without notifying observers.
    ///
    /// Projections built from this attribute stay stale until the next
    /// recompute.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }

    /// The signal emitted after each effective change.
    pub fn changed(&self) -> &Signal<()> {
        &self.changed
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Store `value` and notify observers if it differs from the current one.
    pub fn set(&self, value: T) -> bool {
        self.replace(value).is_some()
    }

    /// Like [`set`](Self::set), but hands back the displaced value.
    pub fn replace(&self, value: T) -> Option<T> {
        let old = {
            let mut current = self.value.write();
            if *current == value {
                return None;
            }
            std::mem::replace(&mut *current, value)
        };
        tracing::trace!(target: targets::PROPERTY, "property changed");
        self.changed.emit(());
        Some(old)
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &*self.value.read())
            .field("observers", &self.changed.connection_count())
            .finish()
    }
}

/// Wrap a plain value in a [`Property`].
pub trait IntoProperty<T> {
    /// The wrapped value as a fresh cell.
    fn into_property(self) -> Property<T>;
}

impl<T: Clone> IntoProperty<T> for T {
    fn into_property(self) -> Property<T> {
        Property::new(self)
    }
}
