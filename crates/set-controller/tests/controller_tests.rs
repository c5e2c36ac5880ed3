//! Tests for the set controller's query, recompute and notification cycle.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use set_controller::prelude::*;

use common::{
    Call, Document, Friend, RecordingDelegate, ReplayDelegate, fetched_names, init_tracing,
};

fn by_rating(delegate: &Arc<RecordingDelegate>) -> SetControllerConfig<Friend> {
    SetControllerConfig::new("friends")
        .observe("name")
        .sort_by(SortDescriptor::ascending("rating"))
        .delegate(delegate)
}

fn by_color(delegate: &Arc<RecordingDelegate>) -> SetControllerConfig<Friend> {
    SetControllerConfig::new("friends")
        .section_key("favorite_color")
        .sort_by(SortDescriptor::ascending("favorite_color"))
        .sort_by(SortDescriptor::ascending("name"))
        .delegate(delegate)
}

fn observing(
    document: &Arc<Document>,
    config: SetControllerConfig<Friend>,
) -> SetController<Friend> {
    init_tracing();
    let controller = SetController::new(document, config).unwrap();
    controller.perform_query().unwrap();
    controller
}

// =========================================================================
// Query
// =========================================================================

#[test]
fn test_first_query_emits_nothing() {
    let delegate = RecordingDelegate::new();
    let document = Document::new([Friend::new("B", 2.0), Friend::new("A", 1.0)]);
    let controller = observing(&document, by_rating(&delegate));

    assert!(delegate.take().is_empty());
    assert!(controller.is_observing());
    assert_eq!(controller.section_count(), 1);
    assert_eq!(fetched_names(&controller), vec!["A", "B"]);
    assert_eq!(controller.previous_projection(), controller.projection());
}

#[test]
fn test_query_twice_is_inconsistent() {
    let delegate = RecordingDelegate::new();
    let document = Document::new([Friend::new("A", 1.0)]);
    let controller = observing(&document, by_rating(&delegate));

    let err = controller.perform_query().unwrap_err();
    assert!(matches!(err, SetControllerError::InconsistentState { .. }));
    assert_eq!(err.code(), 1);
    assert_eq!(controller.last_error(), Some(err));
}

#[test]
fn test_query_on_empty_set() {
    let delegate = RecordingDelegate::new();
    let document = Document::new([]);
    let controller = observing(&document, by_color(&delegate));

    assert_eq!(controller.section_count(), 0);
    assert!(controller.fetched_objects().is_empty());
}

#[test]
fn test_failed_query_stays_idle() {
    let delegate = RecordingDelegate::new();
    let nameless = Friend::without_nickname("A", 1.0);
    let document = Document::new([nameless.clone()]);
    let config = SetControllerConfig::new("friends")
        .sort_by(SortDescriptor::ascending("nickname"))
        .delegate(&delegate);
    let controller = SetController::new(&document, config).unwrap();

    let err = controller.perform_query().unwrap_err();
    assert_eq!(err.code(), 2);
    assert_eq!(controller.state(), ControllerState::Idle);
    assert_eq!(nameless.nickname.changed().connection_count(), 0);
    assert_eq!(document.friends.inserted.connection_count(), 0);
}

// =========================================================================
// Recompute cycles
// =========================================================================

#[test]
fn test_insert_between() {
    let delegate = RecordingDelegate::new();
    let document = Document::new([Friend::new("A", 1.0), Friend::new("B", 2.0)]);
    let controller = observing(&document, by_rating(&delegate));

    document.friends.insert(Friend::new("C", 1.5));

    assert_eq!(
        delegate.take(),
        vec![
            Call::WillChange,
            Call::object("C", None, ChangeType::Insert, Some((0, 1))),
            Call::DidChange,
        ]
    );
    assert_eq!(fetched_names(&controller), vec!["A", "C", "B"]);
}

#[test]
fn test_delete() {
    let delegate = RecordingDelegate::new();
    let a = Friend::new("A", 1.0);
    let document = Document::new([a.clone(), Friend::new("B", 2.0)]);
    let controller = observing(&document, by_rating(&delegate));

    document.friends.remove(&a);

    assert_eq!(
        delegate.take(),
        vec![
            Call::WillChange,
            Call::object("A", Some((0, 0)), ChangeType::Delete, None),
            Call::DidChange,
        ]
    );
    assert_eq!(fetched_names(&controller), vec!["B"]);
}

#[test]
fn test_delete_last_member_removes_section() {
    let delegate = RecordingDelegate::new();
    let a = Friend::new("A", 1.0);
    let document = Document::new([a.clone()]);
    let controller = observing(&document, by_rating(&delegate));

    document.friends.clear();

    assert_eq!(
        delegate.take(),
        vec![
            Call::WillChange,
            Call::section(None, 0, ChangeType::Delete),
            Call::object("A", Some((0, 0)), ChangeType::Delete, None),
            Call::DidChange,
        ]
    );
    assert_eq!(controller.section_count(), 0);
}

#[test]
fn test_update_without_move() {
    let delegate = RecordingDelegate::new();
    let b = Friend::new("B", 2.0);
    let document = Document::new([Friend::new("A", 1.0), b.clone()]);
    let _controller = observing(&document, by_rating(&delegate));

    b.name.set("Bea".to_string());

    assert_eq!(
        delegate.take(),
        vec![
            Call::WillChange,
            Call::object("Bea", Some((0, 1)), ChangeType::Update, None),
            Call::DidChange,
        ]
    );
}

#[test]
fn test_sort_key_change_moves() {
    let delegate = RecordingDelegate::new();
    let a = Friend::new("A", 1.0);
    let document = Document::new([a.clone(), Friend::new("B", 2.0), Friend::new("C", 1.5)]);
    let controller = observing(&document, by_rating(&delegate));
    assert_eq!(fetched_names(&controller), vec!["A", "C", "B"]);

    a.rating.set(3.0);

    assert_eq!(
        delegate.take(),
        vec![
            Call::WillChange,
            Call::object("A", Some((0, 0)), ChangeType::Move, Some((0, 2))),
            Call::DidChange,
        ]
    );
    assert_eq!(fetched_names(&controller), vec!["C", "B", "A"]);
}

#[test]
fn test_swap_moves_changed_member() {
    let delegate = RecordingDelegate::new();
    let a = Friend::new("A", 1.0);
    let document = Document::new([a.clone(), Friend::new("B", 2.0)]);
    let controller = observing(&document, by_rating(&delegate));

    a.rating.set(3.0);

    assert_eq!(fetched_names(&controller), vec!["B", "A"]);
    assert_eq!(
        delegate.take(),
        vec![
            Call::WillChange,
            Call::object("A", Some((0, 0)), ChangeType::Move, Some((0, 1))),
            Call::DidChange,
        ]
    );
}

#[test]
fn test_section_swap_keeps_untouched_section() {
    let delegate = RecordingDelegate::new();
    let a = Friend::with_color("A", Some("blue"), 1.0);
    let document = Document::new([a.clone(), Friend::with_color("B", Some("red"), 2.0)]);
    let config = SetControllerConfig::new("friends")
        .section_key("favorite_color")
        .sort_by(SortDescriptor::ascending("rating"))
        .delegate(&delegate);
    let controller = observing(&document, config);
    assert_eq!(controller.section_index_for_name(Some("blue")), Some(0));

    a.rating.set(3.0);

    assert_eq!(controller.section_index_for_name(Some("red")), Some(0));
    assert_eq!(
        delegate.take(),
        vec![
            Call::WillChange,
            Call::section(Some("blue"), 0, ChangeType::Delete),
            Call::section(Some("blue"), 1, ChangeType::Insert),
            Call::object("A", Some((0, 0)), ChangeType::Move, Some((1, 0))),
            Call::DidChange,
        ]
    );
}

#[test]
fn test_unobserved_attribute_is_ignored() {
    let delegate = RecordingDelegate::new();
    let a = Friend::new("A", 1.0);
    let document = Document::new([a.clone()]);
    let _controller = observing(&document, by_rating(&delegate));

    a.favorite_color.set(Some("green".to_string()));

    assert!(delegate.take().is_empty());
}

#[test]
fn test_section_split() {
    let delegate = RecordingDelegate::new();
    let b = Friend::with_color("B", Some("blue"), 1.0);
    let document = Document::new([Friend::with_color("A", Some("blue"), 1.0), b.clone()]);
    let controller = observing(&document, by_color(&delegate));
    assert_eq!(controller.section_count(), 1);

    b.favorite_color.set(Some("red".to_string()));

    assert_eq!(
        delegate.take(),
        vec![
            Call::WillChange,
            Call::section(Some("red"), 1, ChangeType::Insert),
            Call::object("B", Some((0, 1)), ChangeType::Move, Some((1, 0))),
            Call::DidChange,
        ]
    );
    assert_eq!(controller.section_index_for_name(Some("red")), Some(1));
    assert_eq!(controller.number_of_objects(0).unwrap(), 1);
}

#[test]
fn test_nil_section_value() {
    let delegate = RecordingDelegate::new();
    let document = Document::new([
        Friend::with_color("A", Some("blue"), 1.0),
        Friend::with_color("B", None, 1.0),
    ]);
    let controller = observing(&document, by_color(&delegate));

    // Nil sorts first.
    assert_eq!(controller.section_index_for_name(None), Some(0));
    assert_eq!(controller.section_index_for_name(Some("blue")), Some(1));
    assert_eq!(controller.sections()[0].name(), None);
}

#[test]
fn test_stable_tie_break() {
    let delegate = RecordingDelegate::new();
    let document = Document::new([Friend::new("First", 1.0), Friend::new("Second", 1.0)]);
    let controller = observing(&document, by_rating(&delegate));
    assert_eq!(fetched_names(&controller), vec!["First", "Second"]);

    document.friends.insert(Friend::new("Third", 1.0));

    assert_eq!(fetched_names(&controller), vec!["First", "Second", "Third"]);
    assert_eq!(
        delegate.take(),
        vec![
            Call::WillChange,
            Call::object("Third", None, ChangeType::Insert, Some((0, 2))),
            Call::DidChange,
        ]
    );
}

#[test]
fn test_removed_member_is_unobserved() {
    let delegate = RecordingDelegate::new();
    let a = Friend::new("A", 1.0);
    let document = Document::new([a.clone(), Friend::new("B", 2.0)]);
    let _controller = observing(&document, by_rating(&delegate));
    assert_eq!(a.rating.changed().connection_count(), 1);

    document.friends.remove(&a);
    delegate.take();

    a.rating.set(9.0);
    a.name.set("Gone".to_string());

    assert!(delegate.take().is_empty());
    assert_eq!(a.rating.changed().connection_count(), 0);
    assert_eq!(a.name.changed().connection_count(), 0);
}

#[test]
fn test_inserted_member_is_observed() {
    let delegate = RecordingDelegate::new();
    let document = Document::new([Friend::new("A", 1.0)]);
    let _controller = observing(&document, by_rating(&delegate));

    let c = Friend::new("C", 2.0);
    document.friends.insert(c.clone());
    delegate.take();

    c.rating.set(0.5);

    assert_eq!(
        delegate.take(),
        vec![
            Call::WillChange,
            Call::object("C", Some((0, 1)), ChangeType::Move, Some((0, 0))),
            Call::DidChange,
        ]
    );
}

#[test]
fn test_batch_insert_is_one_cycle() {
    let delegate = RecordingDelegate::new();
    let document = Document::new([Friend::new("B", 2.0)]);
    let _controller = observing(&document, by_rating(&delegate));

    document
        .friends
        .extend([Friend::new("A", 1.0), Friend::new("C", 3.0)]);

    assert_eq!(
        delegate.take(),
        vec![
            Call::WillChange,
            Call::object("A", None, ChangeType::Insert, Some((0, 0))),
            Call::object("C", None, ChangeType::Insert, Some((0, 2))),
            Call::DidChange,
        ]
    );
}

#[test]
fn test_replay_matches_controller() {
    let replay = ReplayDelegate::new();
    let document = Document::new([
        Friend::with_color("A", Some("blue"), 1.0),
        Friend::with_color("B", Some("red"), 2.0),
        Friend::with_color("C", Some("blue"), 3.0),
    ]);
    let config = SetControllerConfig::new("friends")
        .section_key("favorite_color")
        .sort_by(SortDescriptor::descending("rating"))
        .delegate(&replay);
    let controller = observing(&document, config);

    let friends = document.friends.members();
    friends[0].rating.set(5.0);
    friends[1].favorite_color.set(Some("blue".to_string()));
    document.friends.insert(Friend::with_color("D", Some("green"), 4.0));
    friends[2].favorite_color.set(None);
    document.friends.remove(&friends[0]);
    friends[1].rating.set(0.0);
    document.friends.clear();

    assert_eq!(replay.cycles(), 7);
    assert!(replay.mismatches().is_empty(), "{:?}", replay.mismatches());
    assert_eq!(controller.section_count(), 0);
}

// =========================================================================
// Failure and re-entrancy
// =========================================================================

#[test]
fn test_failed_recompute_keeps_projection() {
    let delegate = RecordingDelegate::new();
    let document = Document::new([Friend::new("A", 1.0)]);
    let config = SetControllerConfig::new("friends")
        .sort_by(SortDescriptor::ascending("nickname"))
        .delegate(&delegate);
    let controller = observing(&document, config);
    let before = controller.projection();

    let broken = Friend::without_nickname("B", 2.0);
    document.friends.insert(broken.clone());

    assert_eq!(delegate.take(), vec![Call::Failed(2)]);
    assert_eq!(controller.projection(), before);
    assert!(matches!(
        controller.last_error(),
        Some(SetControllerError::QueryFailed { .. })
    ));

    // The new member is already observed, so fixing it recovers.
    broken.nickname.set(Some("b".to_string()));

    assert_eq!(
        delegate.take(),
        vec![
            Call::WillChange,
            Call::object("B", None, ChangeType::Insert, Some((0, 1))),
            Call::DidChange,
        ]
    );
    assert_eq!(controller.last_error(), None);
}

/// Inserts a member into the document from inside `did_change_content`, once.
struct MutatingDelegate {
    document: Arc<Document>,
    pending: Mutex<Option<Arc<Friend>>>,
    refresh_result: Mutex<Option<Result<()>>>,
}

impl SetControllerDelegate<Friend> for MutatingDelegate {
    fn did_change_content(&self, controller: &SetController<Friend>) {
        if let Some(friend) = self.pending.lock().take() {
            self.document.friends.insert(friend);
            *self.refresh_result.lock() = Some(controller.refresh());
        }
    }
}

#[test]
fn test_reentrant_mutation_rejected() {
    init_tracing();
    let document = Document::new([Friend::new("A", 1.0)]);
    let delegate = Arc::new(MutatingDelegate {
        document: document.clone(),
        pending: Mutex::new(Some(Friend::new("Late", 0.5))),
        refresh_result: Mutex::new(None),
    });
    let config = SetControllerConfig::new("friends")
        .sort_by(SortDescriptor::ascending("rating"))
        .delegate(&delegate);
    let controller = SetController::new(&document, config).unwrap();
    controller.perform_query().unwrap();

    document.friends.insert(Friend::new("B", 2.0));

    // The nested insert was rejected; so was the nested refresh.
    assert_eq!(fetched_names(&controller), vec!["A", "B"]);
    assert_eq!(controller.last_error().map(|e| e.code()), Some(1));
    assert!(matches!(
        delegate.refresh_result.lock().take(),
        Some(Err(SetControllerError::InconsistentState { .. }))
    ));

    controller.refresh().unwrap();
    assert_eq!(fetched_names(&controller), vec!["Late", "A", "B"]);
    assert_eq!(controller.last_error(), None);
}

#[test]
fn test_rejected_attribute_change_reported_by_refresh() {
    struct RenamingDelegate {
        target: Arc<Friend>,
        armed: Mutex<bool>,
    }

    impl SetControllerDelegate<Friend> for RenamingDelegate {
        fn did_change_content(&self, _controller: &SetController<Friend>) {
            if std::mem::take(&mut *self.armed.lock()) {
                self.target.name.set("Renamed".to_string());
            }
        }
    }

    init_tracing();
    let a = Friend::new("A", 1.0);
    let document = Document::new([a.clone()]);
    let renamer = Arc::new(RenamingDelegate {
        target: a.clone(),
        armed: Mutex::new(true),
    });
    let config = SetControllerConfig::new("friends")
        .observe("name")
        .sort_by(SortDescriptor::ascending("rating"))
        .delegate(&renamer);
    let controller = SetController::new(&document, config).unwrap();
    controller.perform_query().unwrap();

    document.friends.insert(Friend::new("B", 2.0));
    assert_eq!(controller.last_error().map(|e| e.code()), Some(1));

    let recorder = RecordingDelegate::new();
    controller.set_delegate(&recorder);
    controller.refresh().unwrap();

    assert_eq!(
        recorder.take(),
        vec![
            Call::WillChange,
            Call::object("Renamed", Some((0, 0)), ChangeType::Update, None),
            Call::DidChange,
        ]
    );
}

#[test]
fn test_delegate_reads_new_projection() {
    #[derive(Default)]
    struct LookupDelegate {
        found: Mutex<Vec<bool>>,
    }

    impl SetControllerDelegate<Friend> for LookupDelegate {
        fn did_change_object(
            &self,
            controller: &SetController<Friend>,
            object: &Arc<Friend>,
            _old_path: Option<IndexPath>,
            _change_type: ChangeType,
            new_path: Option<IndexPath>,
        ) {
            if let Some(path) = new_path {
                let at = controller.object_at_index_path(path).ok();
                self.found
                    .lock()
                    .push(at.is_some_and(|found| Arc::ptr_eq(&found, object)));
            }
        }
    }

    let lookup = Arc::new(LookupDelegate::default());
    let document = Document::new([Friend::new("A", 1.0)]);
    let config = SetControllerConfig::new("friends")
        .sort_by(SortDescriptor::descending("rating"))
        .delegate(&lookup);
    let _controller = observing(&document, config);

    document.friends.insert(Friend::new("B", 2.0));

    assert_eq!(*lookup.found.lock(), vec![true]);
}

// =========================================================================
// Lifecycle
// =========================================================================

#[test]
fn test_stop_observing() {
    let delegate = RecordingDelegate::new();
    let a = Friend::new("A", 1.0);
    let document = Document::new([a.clone()]);
    let controller = observing(&document, by_rating(&delegate));

    controller.stop_observing();
    controller.stop_observing();

    document.friends.insert(Friend::new("B", 2.0));
    a.rating.set(4.0);

    assert!(delegate.take().is_empty());
    assert_eq!(controller.state(), ControllerState::Idle);
    assert_eq!(fetched_names(&controller), vec!["A"]);
    assert_eq!(a.rating.changed().connection_count(), 0);
    assert_eq!(document.friends.inserted.connection_count(), 0);

    // A new query picks up the current membership.
    controller.perform_query().unwrap();
    assert_eq!(fetched_names(&controller), vec!["B", "A"]);
    assert!(delegate.take().is_empty());
}

#[test]
fn test_stop_before_query_is_harmless() {
    let delegate = RecordingDelegate::new();
    let document = Document::new([]);
    let controller = SetController::new(&document, by_rating(&delegate)).unwrap();

    controller.stop_observing();
    assert_eq!(controller.state(), ControllerState::Idle);
    assert!(controller.refresh().is_err());
}

#[test]
fn test_dropping_controller_releases_subscriptions() {
    let delegate = RecordingDelegate::new();
    let a = Friend::new("A", 1.0);
    let document = Document::new([a.clone()]);
    let controller = observing(&document, by_rating(&delegate));
    let clone = controller.clone();

    drop(controller);
    assert_eq!(a.rating.changed().connection_count(), 1);
    drop(clone);
    assert_eq!(a.rating.changed().connection_count(), 0);
    assert_eq!(document.friends.removed.connection_count(), 0);
}

#[test]
fn test_dropped_delegate_stops_callbacks() {
    struct Counter(Arc<AtomicUsize>);

    impl SetControllerDelegate<Friend> for Counter {
        fn did_change_content(&self, _controller: &SetController<Friend>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let count = Arc::new(AtomicUsize::new(0));
    let delegate = Arc::new(Counter(count.clone()));
    let document = Document::new([]);
    let config = SetControllerConfig::new("friends").delegate(&delegate);
    let controller = observing(&document, config);

    document.friends.insert(Friend::new("A", 1.0));
    assert_eq!(count.load(Ordering::SeqCst), 1);

    drop(delegate);
    document.friends.insert(Friend::new("B", 2.0));

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(controller.fetched_objects().len(), 2);
}

#[test]
fn test_dropped_container() {
    let delegate = RecordingDelegate::new();
    let document = Document::new([Friend::new("A", 1.0)]);
    let controller = SetController::new(&document, by_rating(&delegate)).unwrap();

    drop(document);

    assert!(controller.container().is_none());
    let err = controller.perform_query().unwrap_err();
    assert!(matches!(err, SetControllerError::InconsistentState { .. }));
    assert!(!controller.is_observing());
}

// =========================================================================
// Configuration and lookup
// =========================================================================

#[test]
fn test_invalid_configuration() {
    let document = Document::new([]);

    let unknown_set = SetControllerConfig::<Friend>::new("enemies");
    let err = SetController::new(&document, unknown_set).unwrap_err();
    assert_eq!(err.code(), 3);

    let unknown_key = SetControllerConfig::<Friend>::new("friends").observe("age");
    let err = SetController::new(&document, unknown_key).unwrap_err();
    assert!(matches!(err, SetControllerError::InvalidConfiguration { .. }));

    let unknown_section = SetControllerConfig::<Friend>::new("friends").section_key("team");
    assert!(SetController::new(&document, unknown_section).is_err());
}

#[test]
fn test_setters_only_while_idle() {
    let delegate = RecordingDelegate::new();
    let document = Document::new([Friend::new("A", 1.0), Friend::new("B", 2.0)]);
    let controller = observing(&document, by_rating(&delegate));

    let err = controller
        .set_sort_descriptors(vec![SortDescriptor::descending("rating")])
        .unwrap_err();
    assert_eq!(err.code(), 1);
    assert!(controller.set_section_key(Some("favorite_color")).is_err());
    assert!(controller.set_observed_keys(["rating"]).is_err());

    controller.stop_observing();
    let err = controller
        .set_sort_descriptors(vec![SortDescriptor::descending("height")])
        .unwrap_err();
    assert_eq!(err.code(), 3);

    controller
        .set_sort_descriptors(vec![SortDescriptor::descending("rating")])
        .unwrap();
    controller.set_observed_keys(["name", "nickname"]).unwrap();
    controller.perform_query().unwrap();

    assert_eq!(fetched_names(&controller), vec!["B", "A"]);
    assert_eq!(controller.observed_keys(), vec!["name", "nickname"]);
    assert_eq!(controller.sort_descriptors()[0].key(), "rating");
    assert_eq!(controller.section_key(), None);
    assert_eq!(controller.set_key(), "friends");
}

#[test]
fn test_comparator_sort() {
    let delegate = RecordingDelegate::new();
    let document = Document::new([
        Friend::new("Bo", 1.0),
        Friend::new("Alexandra", 2.0),
        Friend::new("Cyd", 3.0),
    ]);
    let config = SetControllerConfig::new("friends")
        .sort_by(SortDescriptor::with_comparator("name", true, |a: &Friend, b: &Friend| {
            a.name.with(|n| n.len()).cmp(&b.name.with(|n| n.len()))
        }))
        .delegate(&delegate);
    let controller = observing(&document, config);
    assert_eq!(fetched_names(&controller), vec!["Bo", "Cyd", "Alexandra"]);

    controller.fetched_objects()[0]
        .name
        .set("Bartholomew".to_string());

    assert_eq!(fetched_names(&controller), vec!["Cyd", "Alexandra", "Bartholomew"]);
    assert_eq!(
        delegate.take(),
        vec![
            Call::WillChange,
            Call::object("Bartholomew", Some((0, 0)), ChangeType::Move, Some((0, 2))),
            Call::DidChange,
        ]
    );
}

#[test]
fn test_lookups() {
    let delegate = RecordingDelegate::new();
    let a = Friend::with_color("A", Some("blue"), 1.0);
    let document = Document::new([a.clone(), Friend::with_color("B", Some("red"), 1.0)]);
    let controller = observing(&document, by_color(&delegate));

    let path = controller.index_path_for_object(&a).unwrap();
    assert_eq!(path, IndexPath::new(0, 0));
    assert!(Arc::ptr_eq(&controller.object_at_index_path(path).unwrap(), &a));

    let err = controller
        .object_at_index_path(IndexPath::new(1, 1))
        .unwrap_err();
    assert_eq!(
        err,
        SetControllerError::IndexOutOfRange {
            path: IndexPath::new(1, 1)
        }
    );
    assert!(controller.number_of_objects(2).is_err());
    assert!(controller
        .index_path_for_object(&Friend::new("Stranger", 0.0))
        .is_none());
}

#[test]
fn test_controller_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SetController<Friend>>();
    assert_send_sync::<SetControllerError>();
}
