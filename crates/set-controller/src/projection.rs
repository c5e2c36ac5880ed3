//! Sorted, sectioned projections of a set.
//!
//! [`project`] turns the unordered members of a set into a [`Projection`]:
//! every member resolved once, stably sorted by the sort descriptors and then
//! grouped into sections by the section key. Sections appear in the order in
//! which their first member appears in the sorted sequence, so a descriptor on
//! the section key itself orders the sections.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use set_controller_core::logging::{span_names, targets};
use set_controller_core::{ObjectKey, Observable, Value, resolve_key};

use crate::error::{Result, SetControllerError};
use crate::index::IndexPath;
use crate::section::SectionInfo;
use crate::sort::SortDescriptor;

/// An ordered list of sections with an identity index over their members.
pub struct Projection<T> {
    sections: Vec<SectionInfo<T>>,
    positions: HashMap<ObjectKey, IndexPath>,
}

impl<T> Projection<T> {
    /// A projection with no sections.
    pub fn empty() -> Self {
        Self {
            sections: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Build a projection from already ordered sections.
    ///
    /// Empty sections are kept; [`project`] never produces them.
    pub fn from_sections(sections: Vec<SectionInfo<T>>) -> Self {
        let mut positions = HashMap::new();
        for (s, section) in sections.iter().enumerate() {
            for (i, object) in section.objects().iter().enumerate() {
                positions.insert(ObjectKey::of(object), IndexPath::new(s, i));
            }
        }
        Self {
            sections,
            positions,
        }
    }

    /// The sections in order.
    pub fn sections(&self) -> &[SectionInfo<T>] {
        &self.sections
    }

    /// Number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Total number of members across all sections.
    pub fn object_count(&self) -> usize {
        self.positions.len()
    }

    /// Whether the projection holds no members.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// The member at `path`.
    pub fn object_at(&self, path: IndexPath) -> Option<&Arc<T>> {
        self.sections
            .get(path.section())
            .and_then(|section| section.objects().get(path.item()))
    }

    /// The path of `object`, by identity.
    pub fn index_path_of(&self, object: &Arc<T>) -> Option<IndexPath> {
        self.position(ObjectKey::of(object))
    }

    /// The path of the member with identity `key`.
    pub fn position(&self, key: ObjectKey) -> Option<IndexPath> {
        self.positions.get(&key).copied()
    }

    /// Index of the section named `name`.
    pub fn section_index(&self, name: Option<&str>) -> Option<usize> {
        self.sections.iter().position(|s| s.name() == name)
    }

    /// All members, flattened in display order.
    pub fn objects(&self) -> impl Iterator<Item = &Arc<T>> {
        self.sections.iter().flat_map(|s| s.objects().iter())
    }

    pub(crate) fn into_sections(self) -> Vec<SectionInfo<T>> {
        self.sections
    }
}

impl<T> Default for Projection<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Clone for Projection<T> {
    fn clone(&self) -> Self {
        Self {
            sections: self.sections.clone(),
            positions: self.positions.clone(),
        }
    }
}

impl<T> PartialEq for Projection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.sections == other.sections
    }
}

impl<T> fmt::Debug for Projection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Projection")
            .field("sections", &self.sections)
            .field("object_count", &self.positions.len())
            .finish()
    }
}

/// A member with every value the ordering needs, resolved once.
struct Entry<T> {
    object: Arc<T>,
    section: Option<String>,
    sort_values: Vec<Value>,
}

/// Build the projection of `members`.
///
/// Ties under the sort descriptors keep the order of `members`. Fails with
/// [`SetControllerError::AttributeResolution`] if any member cannot resolve the
/// section key or a value-compared sort key.
pub fn project<T: Observable>(
    members: &[Arc<T>],
    section_key: Option<&str>,
    sort_descriptors: &[SortDescriptor<T>],
) -> Result<Projection<T>> {
    let _span = tracing::trace_span!(
        target: targets::PROJECTION,
        span_names::PROJECTION,
        members = members.len()
    )
    .entered();

    let mut entries = Vec::with_capacity(members.len());
    for object in members {
        let section = match section_key {
            Some(key) => resolve_key(object.as_ref(), key)?.to_section_name(),
            None => None,
        };
        let sort_values = sort_descriptors
            .iter()
            .map(|descriptor| {
                if descriptor.has_comparator() {
                    Ok(Value::None)
                } else {
                    resolve_key(object.as_ref(), descriptor.key())
                }
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(SetControllerError::from)?;
        entries.push(Entry {
            object: object.clone(),
            section,
            sort_values,
        });
    }

    entries.sort_by(|a, b| compare_entries(sort_descriptors, a, b));

    let mut sections: Vec<SectionInfo<T>> = Vec::new();
    let mut section_index: HashMap<Option<String>, usize> = HashMap::new();
    for entry in entries {
        let index = *section_index.entry(entry.section.clone()).or_insert_with(|| {
            sections.push(SectionInfo::new(entry.section, Vec::new()));
            sections.len() - 1
        });
        sections[index].objects_mut().push(entry.object);
    }

    let projection = Projection::from_sections(sections);
    tracing::trace!(
        target: targets::PROJECTION,
        sections = projection.section_count(),
        objects = projection.object_count(),
        "projection built"
    );
    Ok(projection)
}

fn compare_entries<T>(descriptors: &[SortDescriptor<T>], a: &Entry<T>, b: &Entry<T>) -> Ordering {
    for (i, descriptor) in descriptors.iter().enumerate() {
        let ordering = descriptor.compare(&a.object, &a.sort_values[i], &b.object, &b.sort_values[i]);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
