//! Change computation between two projections.
//!
//! [`diff`] compares the previous and current projection of a recompute cycle
//! and produces a [`ChangeSet`]: the section and item events a list view needs
//! to animate from one to the other.
//!
//! # Matching
//!
//! Items are matched by identity, sections by name. A surviving section keeps
//! its place when it belongs to the longest run of surviving sections whose
//! relative order is unchanged; any other surviving section is reported as a
//! delete plus an insert. Items are handled the same way inside each section
//! that kept its place: members on the longest in-order run stay, the rest are
//! moves. An item that changes section, or whose section was replaced, is
//! always a move.
//!
//! # Ordering
//!
//! Events are emitted in the order a batch update consumes them:
//!
//! 1. section deletes, descending by old index
//! 2. section inserts, ascending by new index
//! 3. item deletes, descending by old path
//! 4. item moves, ascending by new path
//! 5. item inserts, ascending by new path
//! 6. item updates, ascending by old path
//!
//! Old indices refer to the previous projection, new indices to the current
//! one. [`ChangeSet::apply_to`] replays events with exactly these semantics.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use set_controller_core::logging::{span_names, targets};
use set_controller_core::ObjectKey;

use crate::error::{Result, SetControllerError};
use crate::index::IndexPath;
use crate::projection::Projection;
use crate::section::SectionInfo;

/// Kind of change reported for a section or an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChangeType {
    /// The object or section is new.
    Insert = 1,
    /// The object or section is gone.
    Delete = 2,
    /// The object changed position.
    Move = 3,
    /// The object kept its position but an observed attribute changed.
    Update = 4,
}

impl ChangeType {
    /// Numeric code of this change type.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeType::Insert => "insert",
            ChangeType::Delete => "delete",
            ChangeType::Move => "move",
            ChangeType::Update => "update",
        };
        f.write_str(name)
    }
}

/// A change to one item.
///
/// `old_path` is set for deletes, moves and updates; `new_path` for inserts
/// and moves.
pub struct ObjectChange<T> {
    pub object: Arc<T>,
    pub change_type: ChangeType,
    pub old_path: Option<IndexPath>,
    pub new_path: Option<IndexPath>,
}

/// A change to one section.
///
/// `index` is the old index for deletes and the new index for inserts.
pub struct SectionChange<T> {
    pub section: SectionInfo<T>,
    pub index: usize,
    pub change_type: ChangeType,
}

/// One event of a change set.
pub enum ChangeEvent<T> {
    Section(SectionChange<T>),
    Object(ObjectChange<T>),
}

impl<T> ChangeEvent<T> {
    /// The change type of the event.
    pub fn change_type(&self) -> ChangeType {
        match self {
            ChangeEvent::Section(change) => change.change_type,
            ChangeEvent::Object(change) => change.change_type,
        }
    }
}

impl<T> Clone for ObjectChange<T> {
    fn clone(&self) -> Self {
        Self {
            object: self.object.clone(),
            change_type: self.change_type,
            old_path: self.old_path,
            new_path: self.new_path,
        }
    }
}

impl<T> Clone for SectionChange<T> {
    fn clone(&self) -> Self {
        Self {
            section: self.section.clone(),
            index: self.index,
            change_type: self.change_type,
        }
    }
}

impl<T> Clone for ChangeEvent<T> {
    fn clone(&self) -> Self {
        match self {
            ChangeEvent::Section(change) => ChangeEvent::Section(change.clone()),
            ChangeEvent::Object(change) => ChangeEvent::Object(change.clone()),
        }
    }
}

impl<T> fmt::Debug for ChangeEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeEvent::Section(change) => f
                .debug_struct("Section")
                .field("change_type", &change.change_type)
                .field("index", &change.index)
                .field("name", &change.section.name())
                .finish(),
            ChangeEvent::Object(change) => f
                .debug_struct("Object")
                .field("change_type", &change.change_type)
                .field("old_path", &change.old_path)
                .field("new_path", &change.new_path)
                .finish(),
        }
    }
}

/// Ordered events of one recompute cycle.
pub struct ChangeSet<T> {
    events: Vec<ChangeEvent<T>>,
}

impl<T> ChangeSet<T> {
    /// Whether the cycle changed nothing.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Events in delivery order.
    pub fn events(&self) -> &[ChangeEvent<T>] {
        &self.events
    }

    /// Iterate over the events in delivery order.
    pub fn iter(&self) -> std::slice::Iter<'_, ChangeEvent<T>> {
        self.events.iter()
    }

    /// Number of events of `change_type`, counting sections and items.
    pub fn count(&self, change_type: ChangeType) -> usize {
        self.events
            .iter()
            .filter(|event| event.change_type() == change_type)
            .count()
    }

    /// Replay the events onto `previous`, the way a list view applies a batch
    /// update.
    ///
    /// All deletions (item deletes, move sources, then section deletes) are
    /// applied against old indices, then all insertions (section inserts, then
    /// item inserts and move destinations) against new indices. Replaying a
    /// change set onto the projection it was computed from yields the
    /// projection it was computed to.
    pub fn apply_to(&self, previous: &Projection<T>) -> Result<Projection<T>> {
        let mut sections: Vec<SectionInfo<T>> = previous.clone().into_sections();

        let mut removals: Vec<IndexPath> = Vec::new();
        let mut section_removals: Vec<usize> = Vec::new();
        let mut section_inserts: Vec<(usize, Option<String>)> = Vec::new();
        let mut insertions: Vec<(IndexPath, Arc<T>)> = Vec::new();

        for event in &self.events {
            match event {
                ChangeEvent::Section(change) => match change.change_type {
                    ChangeType::Delete => section_removals.push(change.index),
                    ChangeType::Insert => section_inserts
                        .push((change.index, change.section.name().map(str::to_owned))),
                    _ => {}
                },
                ChangeEvent::Object(change) => {
                    if matches!(change.change_type, ChangeType::Delete | ChangeType::Move) {
                        removals.push(missing_path(change.old_path, change.change_type)?);
                    }
                    if matches!(change.change_type, ChangeType::Insert | ChangeType::Move) {
                        let path = missing_path(change.new_path, change.change_type)?;
                        insertions.push((path, change.object.clone()));
                    }
                }
            }
        }

        removals.sort_unstable_by(|a, b| b.cmp(a));
        for path in removals {
            let items = sections
                .get_mut(path.section())
                .map(SectionInfo::objects_mut)
                .filter(|items| path.item() < items.len())
                .ok_or(SetControllerError::IndexOutOfRange { path })?;
            items.remove(path.item());
        }

        section_removals.sort_unstable_by(|a, b| b.cmp(a));
        for index in section_removals {
            if index >= sections.len() {
                return Err(SetControllerError::IndexOutOfRange {
                    path: IndexPath::new(index, 0),
                });
            }
            sections.remove(index);
        }

        section_inserts.sort_unstable_by_key(|(index, _)| *index);
        for (index, name) in section_inserts {
            if index > sections.len() {
                return Err(SetControllerError::IndexOutOfRange {
                    path: IndexPath::new(index, 0),
                });
            }
            sections.insert(index, SectionInfo::new(name, Vec::new()));
        }

        insertions.sort_by_key(|(path, _)| *path);
        for (path, object) in insertions {
            let items = sections
                .get_mut(path.section())
                .map(SectionInfo::objects_mut)
                .filter(|items| path.item() <= items.len())
                .ok_or(SetControllerError::IndexOutOfRange { path })?;
            items.insert(path.item(), object);
        }

        Ok(Projection::from_sections(sections))
    }
}

fn missing_path(path: Option<IndexPath>, change_type: ChangeType) -> Result<IndexPath> {
    path.ok_or_else(|| {
        SetControllerError::inconsistent(format!("{change_type} event without an index path"))
    })
}

impl<T> FromIterator<ChangeEvent<T>> for ChangeSet<T> {
    fn from_iter<I: IntoIterator<Item = ChangeEvent<T>>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl<T> Default for ChangeSet<T> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<T> Clone for ChangeSet<T> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
        }
    }
}

impl<T> fmt::Debug for ChangeSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.events).finish()
    }
}

impl<'a, T> IntoIterator for &'a ChangeSet<T> {
    type Item = &'a ChangeEvent<T>;
    type IntoIter = std::slice::Iter<'a, ChangeEvent<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Compute the events that turn `previous` into `current`.
///
/// `updated` holds the identities of members whose observed attributes
/// changed since `previous` was built; those that neither moved nor left are
/// reported as updates.
pub fn diff<T>(
    previous: &Projection<T>,
    current: &Projection<T>,
    updated: &HashSet<ObjectKey>,
) -> ChangeSet<T> {
    let _span = tracing::trace_span!(target: targets::DIFF, span_names::DIFF).entered();

    // Section matching.
    let old_by_name: HashMap<Option<&str>, usize> = previous
        .sections()
        .iter()
        .enumerate()
        .map(|(i, s)| (s.name(), i))
        .collect();
    let surviving: Vec<(usize, usize)> = current
        .sections()
        .iter()
        .enumerate()
        .filter_map(|(new, s)| old_by_name.get(&s.name()).map(|&old| (old, new)))
        .collect();
    let old_order: Vec<usize> = surviving.iter().map(|&(old, _)| old).collect();
    let section_weights: Vec<u64> = surviving
        .iter()
        .map(|&(old, new)| {
            let gained_or_changed = current.sections()[new].objects().iter().any(|object| {
                let key = ObjectKey::of(object);
                updated.contains(&key) || previous.position(key).map(|p| p.section()) != Some(old)
            });
            let lost = previous.sections()[old].objects().iter().any(|object| {
                current.position(ObjectKey::of(object)).map(|p| p.section()) != Some(new)
            });
            keep_weight(gained_or_changed || lost, surviving.len())
        })
        .collect();
    let stable = increasing_run(&old_order, &section_weights);

    // Old section index -> new section index, for sections that kept their place.
    let mut kept: HashMap<usize, usize> = HashMap::new();
    for (pair, keep) in surviving.iter().zip(&stable) {
        if *keep {
            kept.insert(pair.0, pair.1);
        }
    }
    let kept_new: HashSet<usize> = kept.values().copied().collect();

    let mut section_deletes = Vec::new();
    for (index, section) in previous.sections().iter().enumerate() {
        if !kept.contains_key(&index) {
            section_deletes.push(SectionChange {
                section: section.clone(),
                index,
                change_type: ChangeType::Delete,
            });
        }
    }
    let mut section_inserts = Vec::new();
    for (index, section) in current.sections().iter().enumerate() {
        if !kept_new.contains(&index) {
            section_inserts.push(SectionChange {
                section: section.clone(),
                index,
                change_type: ChangeType::Insert,
            });
        }
    }

    // Item matching.
    let mut deletes = Vec::new();
    for object in previous.objects() {
        if current.position(ObjectKey::of(object)).is_none() {
            deletes.push(ObjectChange {
                object: object.clone(),
                change_type: ChangeType::Delete,
                old_path: previous.index_path_of(object),
                new_path: None,
            });
        }
    }

    let mut moves = Vec::new();
    let mut inserts = Vec::new();
    let mut updates = Vec::new();
    for (new_section, section) in current.sections().iter().enumerate() {
        // Members that may keep their place: they were already in the old
        // counterpart of this section.
        let mut candidates: Vec<(usize, IndexPath)> = Vec::new();
        for (item, object) in section.objects().iter().enumerate() {
            let new_path = IndexPath::new(new_section, item);
            let Some(old_path) = previous.position(ObjectKey::of(object)) else {
                inserts.push(ObjectChange {
                    object: object.clone(),
                    change_type: ChangeType::Insert,
                    old_path: None,
                    new_path: Some(new_path),
                });
                continue;
            };
            if kept.get(&old_path.section()) == Some(&new_section) {
                candidates.push((item, old_path));
            } else {
                moves.push(ObjectChange {
                    object: object.clone(),
                    change_type: ChangeType::Move,
                    old_path: Some(old_path),
                    new_path: Some(new_path),
                });
            }
        }

        let old_items: Vec<usize> = candidates.iter().map(|(_, old)| old.item()).collect();
        let weights: Vec<u64> = candidates
            .iter()
            .map(|&(item, _)| {
                let changed = updated.contains(&ObjectKey::of(&section.objects()[item]));
                keep_weight(changed, candidates.len())
            })
            .collect();
        let staying = increasing_run(&old_items, &weights);
        for ((item, old_path), stays) in candidates.into_iter().zip(staying) {
            let object = &section.objects()[item];
            if !stays {
                moves.push(ObjectChange {
                    object: object.clone(),
                    change_type: ChangeType::Move,
                    old_path: Some(old_path),
                    new_path: Some(IndexPath::new(new_section, item)),
                });
            } else if updated.contains(&ObjectKey::of(object)) {
                updates.push(ObjectChange {
                    object: object.clone(),
                    change_type: ChangeType::Update,
                    old_path: Some(old_path),
                    new_path: None,
                });
            }
        }
    }

    section_deletes.sort_by(|a, b| b.index.cmp(&a.index));
    section_inserts.sort_by_key(|change| change.index);
    deletes.sort_by(|a, b| b.old_path.cmp(&a.old_path));
    moves.sort_by_key(|change| change.new_path);
    inserts.sort_by_key(|change| change.new_path);
    updates.sort_by_key(|change| change.old_path);

    tracing::trace!(
        target: targets::DIFF,
        section_deletes = section_deletes.len(),
        section_inserts = section_inserts.len(),
        deletes = deletes.len(),
        moves = moves.len(),
        inserts = inserts.len(),
        updates = updates.len(),
        "diff computed"
    );

    let events = section_deletes
        .into_iter()
        .chain(section_inserts)
        .map(ChangeEvent::Section)
        .chain(
            deletes
                .into_iter()
                .chain(moves)
                .chain(inserts)
                .chain(updates)
                .map(ChangeEvent::Object),
        )
        .collect();
    ChangeSet { events }
}

/// Weight of keeping one of `count` candidates in place.
///
/// Any number of changed candidates weighs less than one unchanged candidate,
/// so a reorder is blamed on the members whose attributes changed.
fn keep_weight(changed: bool, count: usize) -> u64 {
    if changed { 1 } else { count as u64 + 1 }
}

/// Mark the members of a heaviest strictly increasing subsequence of `seq`.
///
/// Among runs of equal weight the one completed first wins.
fn increasing_run(seq: &[usize], weights: &[u64]) -> Vec<bool> {
    let mut values = seq.to_vec();
    values.sort_unstable();
    values.dedup();

    // Fenwick tree over value ranks holding the heaviest run ending at or
    // below each rank, as (weight, index into seq).
    let mut tree: Vec<Option<(u64, usize)>> = vec![None; values.len() + 1];
    let mut predecessor: Vec<Option<usize>> = vec![None; seq.len()];
    let mut best: Option<(u64, usize)> = None;

    for (i, &value) in seq.iter().enumerate() {
        let rank = values.partition_point(|&v| v < value);

        let mut below = None;
        let mut k = rank;
        while k > 0 {
            below = heavier(below, tree[k]);
            k &= k - 1;
        }
        predecessor[i] = below.map(|(_, j)| j);

        let entry = Some((below.map_or(0, |(w, _)| w) + weights[i], i));
        best = heavier(best, entry);
        let mut k = rank + 1;
        while k < tree.len() {
            tree[k] = heavier(tree[k], entry);
            k += k & k.wrapping_neg();
        }
    }

    let mut marks = vec![false; seq.len()];
    let mut cursor = best.map(|(_, i)| i);
    while let Some(i) = cursor {
        marks[i] = true;
        cursor = predecessor[i];
    }
    marks
}

fn heavier(a: Option<(u64, usize)>, b: Option<(u64, usize)>) -> Option<(u64, usize)> {
    match (a, b) {
        (Some(x), Some(y)) if y.0 > x.0 => Some(y),
        (Some(x), _) => Some(x),
        (None, y) => y,
    }
}
