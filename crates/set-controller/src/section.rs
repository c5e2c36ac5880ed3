//! Section info.

use std::fmt;
use std::sync::Arc;

/// One group of a projection: a name and the members in display order.
///
/// The name is the section key value rendered as a string. Members whose
/// section value is nil, and every member of an unsectioned projection, sit
/// in a section with no name.
pub struct SectionInfo<T> {
    name: Option<String>,
    objects: Vec<Arc<T>>,
}

impl<T> SectionInfo<T> {
    /// Create a section.
    pub fn new(name: Option<String>, objects: Vec<Arc<T>>) -> Self {
        Self { name, objects }
    }

    /// The section name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of members in this section.
    pub fn number_of_objects(&self) -> usize {
        self.objects.len()
    }

    /// Members in display order.
    pub fn objects(&self) -> &[Arc<T>] {
        &self.objects
    }

    /// Whether the section has no members.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Position of `object` within this section, by identity.
    pub fn index_of(&self, object: &Arc<T>) -> Option<usize> {
        self.objects.iter().position(|o| Arc::ptr_eq(o, object))
    }

    pub(crate) fn objects_mut(&mut self) -> &mut Vec<Arc<T>> {
        &mut self.objects
    }
}

impl<T> Clone for SectionInfo<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            objects: self.objects.clone(),
        }
    }
}

impl<T> PartialEq for SectionInfo<T> {
    /// Sections are equal when their names match and they hold the same
    /// objects, by identity, in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.objects.len() == other.objects.len()
            && self
                .objects
                .iter()
                .zip(&other.objects)
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

impl<T> fmt::Debug for SectionInfo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionInfo")
            .field("name", &self.name)
            .field("number_of_objects", &self.objects.len())
            .finish()
    }
}
