//! Delegate protocol for change notifications.

use std::sync::Arc;

use crate::controller::SetController;
use crate::diff::ChangeType;
use crate::error::SetControllerError;
use crate::index::IndexPath;
use crate::section::SectionInfo;

/// Receiver of a controller's change notifications.
///
/// Every method has an empty default, so a delegate implements only what it
/// needs. Per recompute cycle the controller calls, in order:
///
/// 1. [`will_change_content`](Self::will_change_content) once
/// 2. [`did_change_section`](Self::did_change_section) for each section event
/// 3. [`did_change_object`](Self::did_change_object) for each item event
/// 4. [`did_change_content`](Self::did_change_content) once
///
/// The controller already exposes the new projection from step 2 on, so
/// lookups such as [`SetController::object_at_index_path`] made inside the
/// callbacks answer against new positions.
///
/// Callbacks must not mutate the observed set or its members. A change
/// triggered from inside a callback is rejected with
/// [`SetControllerError::InconsistentState`]; call
/// [`SetController::refresh`] after the cycle to pick it up.
///
/// The controller holds its delegate weakly; keep the `Arc` alive for as long
/// as notifications are wanted.
///
/// # Example
///
/// ```ignore
/// struct TableUpdater;
///
/// impl SetControllerDelegate<Friend> for TableUpdater {
///     fn will_change_content(&self, _controller: &SetController<Friend>) {
///         println!("begin updates");
///     }
///
///     fn did_change_object(
///         &self,
///         _controller: &SetController<Friend>,
///         friend: &Arc<Friend>,
///         old_path: Option<IndexPath>,
///         change_type: ChangeType,
///         new_path: Option<IndexPath>,
///     ) {
///         println!("{change_type} {} {old_path:?} -> {new_path:?}", friend.name.get());
///     }
///
///     fn did_change_content(&self, _controller: &SetController<Friend>) {
///         println!("end updates");
///     }
/// }
/// ```
pub trait SetControllerDelegate<T>: Send + Sync {
    /// A change cycle is about to deliver events.
    fn will_change_content(&self, _controller: &SetController<T>) {}

    /// An item was inserted, deleted, moved or updated.
    ///
    /// # Arguments
    ///
    /// * `object` - The affected member
    /// * `old_path` - Position in the previous projection (deletes, moves, updates)
    /// * `change_type` - The kind of change
    /// * `new_path` - Position in the new projection (inserts, moves)
    fn did_change_object(
        &self,
        _controller: &SetController<T>,
        _object: &Arc<T>,
        _old_path: Option<IndexPath>,
        _change_type: ChangeType,
        _new_path: Option<IndexPath>,
    ) {
    }

    /// A section was inserted or deleted.
    ///
    /// `index` is the old index for deletes and the new index for inserts.
    fn did_change_section(
        &self,
        _controller: &SetController<T>,
        _section: &SectionInfo<T>,
        _index: usize,
        _change_type: ChangeType,
    ) {
    }

    /// All events of the cycle have been delivered.
    fn did_change_content(&self, _controller: &SetController<T>) {}

    /// A recompute failed. The previous projection is still current and no
    /// other callback is made for this cycle.
    fn controller_did_fail(&self, _controller: &SetController<T>, _error: &SetControllerError) {}
}
