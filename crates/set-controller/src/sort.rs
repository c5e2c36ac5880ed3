//! Sort descriptors.
//!
//! A [`SortDescriptor`] names the attribute key it sorts by and a direction.
//! By default it compares the [`Value`]s the members report for that key.
//! A typed comparator can be supplied instead; the key is still required,
//! because it is the attribute whose changes trigger re-sorting.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use set_controller_core::Value;

/// Type alias for a typed comparator.
pub type CompareFn<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// One sort criterion.
///
/// # Example
///
/// ```ignore
/// use set_controller::SortDescriptor;
///
/// let by_rating = SortDescriptor::<Friend>::descending("rating");
/// let by_name_len = SortDescriptor::with_comparator("name", true, |a: &Friend, b: &Friend| {
///     a.name.get().len().cmp(&b.name.get().len())
/// });
/// ```
pub struct SortDescriptor<T> {
    key: String,
    ascending: bool,
    comparator: Option<CompareFn<T>>,
}

impl<T> SortDescriptor<T> {
    /// Sort by the value of `key`.
    pub fn new(key: impl Into<String>, ascending: bool) -> Self {
        Self {
            key: key.into(),
            ascending,
            comparator: None,
        }
    }

    /// Ascending sort by the value of `key`.
    pub fn ascending(key: impl Into<String>) -> Self {
        Self::new(key, true)
    }

    /// Descending sort by the value of `key`.
    pub fn descending(key: impl Into<String>) -> Self {
        Self::new(key, false)
    }

    /// Sort with a typed comparator, re-sorting whenever `key` changes.
    ///
    /// `compare` defines ascending order; `ascending = false` reverses it.
    pub fn with_comparator<F>(key: impl Into<String>, ascending: bool, compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            ascending,
            comparator: Some(Arc::new(compare)),
        }
    }

    /// The attribute key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the order is ascending.
    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    /// Whether a typed comparator replaces value comparison.
    pub fn has_comparator(&self) -> bool {
        self.comparator.is_some()
    }

    /// The same criterion in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            key: self.key.clone(),
            ascending: !self.ascending,
            comparator: self.comparator.clone(),
        }
    }

    /// Compare two members given their resolved values for this key.
    ///
    /// With a comparator the values are ignored.
    pub(crate) fn compare(&self, a: &T, a_value: &Value, b: &T, b_value: &Value) -> Ordering {
        let ordering = match &self.comparator {
            Some(compare) => compare(a, b),
            None => a_value.total_cmp(b_value),
        };
        if self.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    }
}

impl<T> Clone for SortDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            ascending: self.ascending,
            comparator: self.comparator.clone(),
        }
    }
}

impl<T> fmt::Debug for SortDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortDescriptor")
            .field("key", &self.key)
            .field("ascending", &self.ascending)
            .field("comparator", &self.comparator.is_some())
            .finish()
    }
}
