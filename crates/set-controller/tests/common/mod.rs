//! Shared fixtures: a document with a set of friends, and delegates that
//! record or replay what a controller reports.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use set_controller::prelude::*;
use set_controller::{ChangeEvent, ChangeSet, ObjectChange, SectionChange};

/// A member of the observed set.
#[derive(Debug)]
pub struct Friend {
    pub name: Property<String>,
    pub favorite_color: Property<Option<String>>,
    pub rating: Property<f64>,
    /// Unset nicknames cannot be resolved.
    pub nickname: Property<Option<String>>,
}

impl Friend {
    pub fn new(name: &str, rating: f64) -> Arc<Self> {
        Self::with_color(name, None, rating)
    }

    pub fn with_color(name: &str, color: Option<&str>, rating: f64) -> Arc<Self> {
        Arc::new(Self {
            name: Property::new(name.to_string()),
            favorite_color: Property::new(color.map(str::to_string)),
            rating: Property::new(rating),
            nickname: Property::new(Some(name.to_lowercase())),
        })
    }

    pub fn without_nickname(name: &str, rating: f64) -> Arc<Self> {
        let friend = Self::new(name, rating);
        friend.nickname.set_silent(None);
        friend
    }
}

impl Observable for Friend {
    fn observable_keys() -> &'static [&'static str] {
        &["name", "favorite_color", "rating", "nickname"]
    }

    fn value_for_key(&self, key: &str) -> Option<Value> {
        match key {
            "name" => Some(Value::from(self.name.get())),
            "favorite_color" => Some(Value::from(self.favorite_color.get())),
            "rating" => Some(Value::from(self.rating.get())),
            "nickname" => self.nickname.get().map(Value::from),
            _ => None,
        }
    }

    fn key_signal(&self, key: &str) -> Option<&Signal<()>> {
        match key {
            "name" => Some(self.name.changed()),
            "favorite_color" => Some(self.favorite_color.changed()),
            "rating" => Some(self.rating.changed()),
            "nickname" => Some(self.nickname.changed()),
            _ => None,
        }
    }
}

/// The container owning the set.
pub struct Document {
    pub friends: ObservableSet<Friend>,
}

impl Document {
    pub fn new(friends: impl IntoIterator<Item = Arc<Friend>>) -> Arc<Self> {
        Arc::new(Self {
            friends: ObservableSet::with_members(friends),
        })
    }
}

impl SetContainer<Friend> for Document {
    fn set_for_key(&self, key: &str) -> Option<&ObservableSet<Friend>> {
        (key == "friends").then_some(&self.friends)
    }
}

/// One delegate callback, with members identified by name.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    WillChange,
    Section {
        name: Option<String>,
        index: usize,
        change: ChangeType,
    },
    Object {
        name: String,
        old: Option<IndexPath>,
        change: ChangeType,
        new: Option<IndexPath>,
    },
    DidChange,
    Failed(u32),
}

impl Call {
    pub fn object(
        name: &str,
        old: Option<(usize, usize)>,
        change: ChangeType,
        new: Option<(usize, usize)>,
    ) -> Self {
        Call::Object {
            name: name.to_string(),
            old: old.map(IndexPath::from),
            change,
            new: new.map(IndexPath::from),
        }
    }

    pub fn section(name: Option<&str>, index: usize, change: ChangeType) -> Self {
        Call::Section {
            name: name.map(str::to_string),
            index,
            change,
        }
    }
}

/// Records every callback in order.
#[derive(Default)]
pub struct RecordingDelegate {
    calls: Mutex<Vec<Call>>,
}

impl RecordingDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Take the calls recorded so far.
    pub fn take(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock())
    }
}

impl SetControllerDelegate<Friend> for RecordingDelegate {
    fn will_change_content(&self, _controller: &SetController<Friend>) {
        self.calls.lock().push(Call::WillChange);
    }

    fn did_change_object(
        &self,
        _controller: &SetController<Friend>,
        object: &Arc<Friend>,
        old_path: Option<IndexPath>,
        change_type: ChangeType,
        new_path: Option<IndexPath>,
    ) {
        self.calls.lock().push(Call::Object {
            name: object.name.get(),
            old: old_path,
            change: change_type,
            new: new_path,
        });
    }

    fn did_change_section(
        &self,
        _controller: &SetController<Friend>,
        section: &SectionInfo<Friend>,
        index: usize,
        change_type: ChangeType,
    ) {
        self.calls.lock().push(Call::Section {
            name: section.name().map(str::to_string),
            index,
            change: change_type,
        });
    }

    fn did_change_content(&self, _controller: &SetController<Friend>) {
        self.calls.lock().push(Call::DidChange);
    }

    fn controller_did_fail(&self, _controller: &SetController<Friend>, error: &SetControllerError) {
        self.calls.lock().push(Call::Failed(error.code()));
    }
}

/// Replays every delivered cycle onto the projection seen at
/// `will_change_content` and checks it against the committed one.
#[derive(Default)]
pub struct ReplayDelegate {
    before: Mutex<Option<Projection<Friend>>>,
    events: Mutex<Vec<ChangeEvent<Friend>>>,
    cycles: Mutex<usize>,
    mismatches: Mutex<Vec<String>>,
}

impl ReplayDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn cycles(&self) -> usize {
        *self.cycles.lock()
    }

    pub fn mismatches(&self) -> Vec<String> {
        self.mismatches.lock().clone()
    }
}

impl SetControllerDelegate<Friend> for ReplayDelegate {
    fn will_change_content(&self, controller: &SetController<Friend>) {
        *self.before.lock() = Some(controller.projection());
        self.events.lock().clear();
    }

    fn did_change_object(
        &self,
        _controller: &SetController<Friend>,
        object: &Arc<Friend>,
        old_path: Option<IndexPath>,
        change_type: ChangeType,
        new_path: Option<IndexPath>,
    ) {
        self.events.lock().push(ChangeEvent::Object(ObjectChange {
            object: object.clone(),
            change_type,
            old_path,
            new_path,
        }));
    }

    fn did_change_section(
        &self,
        _controller: &SetController<Friend>,
        section: &SectionInfo<Friend>,
        index: usize,
        change_type: ChangeType,
    ) {
        self.events.lock().push(ChangeEvent::Section(SectionChange {
            section: section.clone(),
            index,
            change_type,
        }));
    }

    fn did_change_content(&self, controller: &SetController<Friend>) {
        *self.cycles.lock() += 1;
        let before = self.before.lock().take().unwrap_or_default();
        let changes: ChangeSet<Friend> = self.events.lock().drain(..).collect();
        let after = controller.projection();
        match changes.apply_to(&before) {
            Ok(replayed) if replayed == after => {}
            Ok(replayed) => self.mismatches.lock().push(format!(
                "replayed {:?} but controller holds {:?}",
                names(&replayed),
                names(&after)
            )),
            Err(err) => self.mismatches.lock().push(err.to_string()),
        }
    }
}

/// Member names per section.
pub fn names(projection: &Projection<Friend>) -> Vec<(Option<String>, Vec<String>)> {
    projection
        .sections()
        .iter()
        .map(|section| {
            (
                section.name().map(str::to_string),
                section.objects().iter().map(|f| f.name.get()).collect(),
            )
        })
        .collect()
}

/// Member names of the controller's only section, or of all sections in order.
pub fn fetched_names(controller: &SetController<Friend>) -> Vec<String> {
    controller
        .fetched_objects()
        .iter()
        .map(|f| f.name.get())
        .collect()
}

/// Install a test subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
