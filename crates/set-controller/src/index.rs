//! Index paths for addressing members of a projection.
//!
//! An [`IndexPath`] is a `(section, item)` pair. Like any position into a
//! model that changes, it is only meaningful for the projection it was taken
//! from: after the next recompute cycle it must be remapped through the change
//! events (or looked up again) before it is used.

use std::fmt;

/// A `(section, item)` position within a projection.
///
/// Index paths order section-major, which is the order in which a list view
/// lays out rows.
///
/// ```
/// use set_controller::IndexPath;
///
/// let a = IndexPath::new(0, 5);
/// let b = IndexPath::new(1, 0);
/// assert!(a < b);
/// assert_eq!(b.to_string(), "(1, 0)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IndexPath {
    section: usize,
    item: usize,
}

impl IndexPath {
    /// Create an index path.
    #[inline]
    pub const fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }

    /// The section index.
    #[inline]
    pub fn section(&self) -> usize {
        self.section
    }

    /// The item index within the section.
    #[inline]
    pub fn item(&self) -> usize {
        self.item
    }

    /// Another item in the same section.
    #[inline]
    pub fn sibling(&self, item: usize) -> Self {
        Self::new(self.section, item)
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.section, self.item)
    }
}

impl From<(usize, usize)> for IndexPath {
    fn from((section, item): (usize, usize)) -> Self {
        Self::new(section, item)
    }
}

static_assertions::assert_impl_all!(IndexPath: Send, Sync, Copy);
