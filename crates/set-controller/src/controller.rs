//! The set controller.
//!
//! [`SetController`] observes one set relationship of a container, keeps a
//! sorted and sectioned [`Projection`] of it, and turns every observed change
//! into a recompute cycle whose events are delivered to a
//! [`SetControllerDelegate`].
//!
//! # Lifecycle
//!
//! A controller starts [`Idle`](ControllerState::Idle).
//! [`perform_query`](SetController::perform_query) builds the first projection
//! without emitting events and subscribes to the set and to the trigger keys
//! of every member; the controller is then
//! [`Observing`](ControllerState::Observing).
//! [`stop_observing`](SetController::stop_observing) drops every subscription
//! and returns to `Idle`, leaving the last projection readable.
//!
//! # Recompute cycles
//!
//! Each insertion or removal on the set, and each change of a trigger key on
//! a member, runs one cycle synchronously on the mutating thread:
//!
//! 1. member subscriptions are brought in line with the new membership
//! 2. the new projection and its diff against the current one are computed
//! 3. `will_change_content`
//! 4. the new projection becomes current, the replaced one previous
//! 5. section events, then item events
//! 6. `did_change_content`
//!
//! If step 2 fails, the current projection is kept, the error is stored in
//! [`last_error`](SetController::last_error) and reported through
//! `controller_did_fail`; nothing else is delivered.
//!
//! Cycles do not nest. A change triggered while a cycle is running, typically
//! by a delegate mutating the set, is rejected with
//! [`SetControllerError::InconsistentState`]. Call
//! [`refresh`](SetController::refresh) once the cycle has finished to catch up.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use set_controller_core::logging::{span_names, targets};
use set_controller_core::{
    ObjectKey, Observable, PerfSpan, SetContainer, Subscription, ThreadAffinity, resolve_set,
    validate_keys,
};

use crate::config::{SetControllerConfig, downgrade_delegate, trigger_keys};
use crate::delegate::SetControllerDelegate;
use crate::diff::{ChangeEvent, ChangeSet, ChangeType, diff};
use crate::error::{Result, SetControllerError};
use crate::index::IndexPath;
use crate::projection::{Projection, project};
use crate::registry::{ChangeNotifier, SubscriptionRegistry};
use crate::section::SectionInfo;
use crate::sort::SortDescriptor;

/// Observation state of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    /// Not subscribed; the projection, if any, is stale.
    #[default]
    Idle,
    /// Subscribed; the projection tracks the set.
    Observing,
}

/// What started a recompute cycle.
#[derive(Debug, Clone, Copy)]
enum Trigger {
    Membership,
    Attribute(ObjectKey),
    Refresh,
}

/// Observes a set relationship and reports its sorted, sectioned changes.
///
/// `SetController` is a cheap handle; clones share the same controller.
///
/// # Example
///
/// ```ignore
/// let config = SetControllerConfig::new("friends")
///     .observe("name")
///     .sort_by(SortDescriptor::ascending("rating"))
///     .delegate(&table);
/// let controller = SetController::new(&document, config)?;
/// controller.perform_query()?;
///
/// document.friends.insert(Friend::new("Ada", 4.5)); // table receives an Insert
/// ```
pub struct SetController<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    container: Weak<dyn SetContainer<T>>,
    set_key: String,
    affinity: ThreadAffinity,
    in_cycle: AtomicBool,
    state: Mutex<State<T>>,
}

struct State<T> {
    phase: ControllerState,
    observed_keys: Vec<String>,
    section_key: Option<String>,
    sort_descriptors: Vec<SortDescriptor<T>>,
    delegate: Option<Weak<dyn SetControllerDelegate<T>>>,
    current: Projection<T>,
    previous: Projection<T>,
    registry: SubscriptionRegistry<T>,
    set_subscriptions: Vec<Subscription>,
    pending_updates: HashSet<ObjectKey>,
    last_error: Option<SetControllerError>,
}

impl<T> State<T> {
    fn trigger_keys(&self) -> Vec<String> {
        trigger_keys(
            &self.observed_keys,
            &self.sort_descriptors,
            self.section_key.as_deref(),
        )
    }

    fn delegate(&self) -> Option<Arc<dyn SetControllerDelegate<T>>> {
        self.delegate.as_ref().and_then(Weak::upgrade)
    }

    fn require_idle(&self, operation: &str) -> Result<()> {
        match self.phase {
            ControllerState::Idle => Ok(()),
            ControllerState::Observing => Err(SetControllerError::inconsistent(format!(
                "{operation} is not allowed while observing"
            ))),
        }
    }
}

/// A computed cycle, ready for delivery.
struct Cycle<T> {
    projection: Projection<T>,
    changes: ChangeSet<T>,
    delegate: Option<Arc<dyn SetControllerDelegate<T>>>,
}

/// Clears the re-entrancy flag when a cycle ends, however it ends.
struct CycleGuard<'a>(&'a AtomicBool);

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<T: Observable + 'static> SetController<T> {
    /// Create a controller for the set under `config.set_key` on `container`.
    ///
    /// The container is held weakly. Fails with
    /// [`SetControllerError::InvalidConfiguration`] if the set key does not
    /// name a set on the container or a configured key is not an observable
    /// key of `T`.
    pub fn new<C>(container: &Arc<C>, config: SetControllerConfig<T>) -> Result<Self>
    where
        C: SetContainer<T> + 'static,
    {
        config.validate(container.as_ref())?;

        let container: Arc<dyn SetContainer<T>> = container.clone();
        let SetControllerConfig {
            set_key,
            observed_keys,
            section_key,
            sort_descriptors,
            delegate,
        } = config;

        tracing::debug!(
            target: targets::CONTROLLER,
            set_key = %set_key,
            sections = ?section_key,
            sort_keys = sort_descriptors.len(),
            "controller created"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                container: Arc::downgrade(&container),
                set_key,
                affinity: ThreadAffinity::current(),
                in_cycle: AtomicBool::new(false),
                state: Mutex::new(State {
                    phase: ControllerState::Idle,
                    observed_keys,
                    section_key,
                    sort_descriptors,
                    delegate,
                    current: Projection::empty(),
                    previous: Projection::empty(),
                    registry: SubscriptionRegistry::new(),
                    set_subscriptions: Vec::new(),
                    pending_updates: HashSet::new(),
                    last_error: None,
                }),
            }),
        })
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Build the first projection and start observing.
    ///
    /// Emits no events. On failure nothing stays subscribed and the
    /// controller remains idle.
    #[tracing::instrument(skip(self), target = "set_controller::controller", level = "debug")]
    pub fn perform_query(&self) -> Result<()> {
        let _perf = PerfSpan::new(span_names::QUERY);

        if self.inner.in_cycle.load(Ordering::Acquire) {
            return Err(self.record(SetControllerError::inconsistent(
                "perform_query called during a change cycle",
            )));
        }

        let mut state = self.inner.state.lock();
        if state.phase == ControllerState::Observing {
            let err = SetControllerError::inconsistent(
                "perform_query called again without stop_observing",
            );
            state.last_error = Some(err.clone());
            return Err(err);
        }

        let result = self.start_observing(&mut state);
        state.last_error = result.as_ref().err().cloned();
        result
    }

    fn start_observing(&self, state: &mut State<T>) -> Result<()> {
        let container = self.container_strong()?;
        let set = resolve_set::<dyn SetContainer<T>, T>(container.as_ref(), &self.inner.set_key)
            .map_err(SetControllerError::invalid_config)?;

        let members = set.members();
        let projection = project(&members, state.section_key.as_deref(), &state.sort_descriptors)
            .map_err(SetControllerError::query_failed)?;

        let inserted = {
            let weak = Arc::downgrade(&self.inner);
            set.inserted
                .subscribe(move |_| Self::dispatch(&weak, Trigger::Membership))
        };
        let removed = {
            let weak = Arc::downgrade(&self.inner);
            set.removed
                .subscribe(move |_| Self::dispatch(&weak, Trigger::Membership))
        };
        state.set_subscriptions = vec![inserted, removed];

        let keys = state.trigger_keys();
        state.registry.sync(&members, &keys, &self.notifier());

        tracing::info!(
            target: targets::CONTROLLER,
            set_key = %self.inner.set_key,
            members = members.len(),
            sections = projection.section_count(),
            subscriptions = state.registry.subscription_count(),
            "observing"
        );

        state.previous = projection.clone();
        state.current = projection;
        state.pending_updates.clear();
        state.phase = ControllerState::Observing;
        Ok(())
    }

    /// Drop every subscription and return to idle.
    ///
    /// Idempotent. The last projection stays readable.
    pub fn stop_observing(&self) {
        let (set_subscriptions, released) = {
            let mut state = self.inner.state.lock();
            if state.phase == ControllerState::Idle {
                return;
            }
            state.phase = ControllerState::Idle;
            state.pending_updates.clear();
            (
                std::mem::take(&mut state.set_subscriptions),
                state.registry.clear(),
            )
        };
        drop(set_subscriptions);

        tracing::info!(
            target: targets::CONTROLLER,
            set_key = %self.inner.set_key,
            released,
            "stopped observing"
        );
    }

    /// Run a recompute cycle now.
    ///
    /// Attribute changes rejected while a previous cycle was running are
    /// reported as updates.
    #[tracing::instrument(skip(self), target = "set_controller::controller", level = "debug")]
    pub fn refresh(&self) -> Result<()> {
        if self.state() == ControllerState::Idle {
            return Err(self.record(SetControllerError::inconsistent(
                "refresh called while not observing",
            )));
        }
        self.run_cycle(Trigger::Refresh)
    }

    /// Whether the controller is observing.
    pub fn is_observing(&self) -> bool {
        self.state() == ControllerState::Observing
    }

    /// The observation state.
    pub fn state(&self) -> ControllerState {
        self.inner.state.lock().phase
    }

    /// The most recent error, cleared by the next successful query or cycle.
    pub fn last_error(&self) -> Option<SetControllerError> {
        self.inner.state.lock().last_error.clone()
    }

    // =========================================================================
    // Projection access
    // =========================================================================

    /// The sections of the current projection.
    pub fn sections(&self) -> Vec<SectionInfo<T>> {
        self.inner.state.lock().current.sections().to_vec()
    }

    /// Number of sections.
    pub fn section_count(&self) -> usize {
        self.inner.state.lock().current.section_count()
    }

    /// Number of members in `section`.
    pub fn number_of_objects(&self, section: usize) -> Result<usize> {
        self.inner
            .state
            .lock()
            .current
            .sections()
            .get(section)
            .map(SectionInfo::number_of_objects)
            .ok_or(SetControllerError::IndexOutOfRange {
                path: IndexPath::new(section, 0),
            })
    }

    /// The member at `path`.
    pub fn object_at_index_path(&self, path: IndexPath) -> Result<Arc<T>> {
        self.inner
            .state
            .lock()
            .current
            .object_at(path)
            .cloned()
            .ok_or(SetControllerError::IndexOutOfRange { path })
    }

    /// The path of `object`, by identity.
    pub fn index_path_for_object(&self, object: &Arc<T>) -> Option<IndexPath> {
        self.inner.state.lock().current.index_path_of(object)
    }

    /// All members in display order.
    pub fn fetched_objects(&self) -> Vec<Arc<T>> {
        self.inner.state.lock().current.objects().cloned().collect()
    }

    /// Index of the section named `name`; `None` names the unnamed section.
    pub fn section_index_for_name(&self, name: Option<&str>) -> Option<usize> {
        self.inner.state.lock().current.section_index(name)
    }

    /// A snapshot of the current projection.
    pub fn projection(&self) -> Projection<T> {
        self.inner.state.lock().current.clone()
    }

    /// A snapshot of the projection replaced by the last cycle.
    pub fn previous_projection(&self) -> Projection<T> {
        self.inner.state.lock().previous.clone()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Key of the observed set.
    pub fn set_key(&self) -> &str {
        &self.inner.set_key
    }

    /// The section key.
    pub fn section_key(&self) -> Option<String> {
        self.inner.state.lock().section_key.clone()
    }

    /// The declared observed keys.
    pub fn observed_keys(&self) -> Vec<String> {
        self.inner.state.lock().observed_keys.clone()
    }

    /// The sort descriptors.
    pub fn sort_descriptors(&self) -> Vec<SortDescriptor<T>> {
        self.inner.state.lock().sort_descriptors.clone()
    }

    /// The container, if it is still alive.
    pub fn container(&self) -> Option<Arc<dyn SetContainer<T>>> {
        self.inner.container.upgrade()
    }

    /// Deliver notifications to `delegate` from now on.
    pub fn set_delegate<D>(&self, delegate: &Arc<D>)
    where
        D: SetControllerDelegate<T> + 'static,
    {
        self.inner.state.lock().delegate = Some(downgrade_delegate(delegate));
    }

    /// Stop delivering notifications.
    pub fn clear_delegate(&self) {
        self.inner.state.lock().delegate = None;
    }

    /// Replace the sort descriptors. Only allowed while idle.
    pub fn set_sort_descriptors(&self, descriptors: Vec<SortDescriptor<T>>) -> Result<()> {
        let mut state = self.inner.state.lock();
        state.require_idle("set_sort_descriptors")?;
        validate_trigger_keys(&state.observed_keys, &descriptors, state.section_key.as_deref())?;
        state.sort_descriptors = descriptors;
        Ok(())
    }

    /// Replace the section key. Only allowed while idle.
    pub fn set_section_key(&self, key: Option<&str>) -> Result<()> {
        let mut state = self.inner.state.lock();
        state.require_idle("set_section_key")?;
        validate_trigger_keys(&state.observed_keys, &state.sort_descriptors, key)?;
        state.section_key = key.map(str::to_owned);
        Ok(())
    }

    /// Replace the observed keys. Only allowed while idle.
    pub fn set_observed_keys<I, K>(&self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        let mut state = self.inner.state.lock();
        state.require_idle("set_observed_keys")?;
        validate_trigger_keys(&keys, &state.sort_descriptors, state.section_key.as_deref())?;
        state.observed_keys = keys;
        Ok(())
    }

    // =========================================================================
    // Recompute cycle
    // =========================================================================

    fn dispatch(weak: &Weak<Inner<T>>, trigger: Trigger) {
        if let Some(inner) = weak.upgrade() {
            // Failures are recorded and reported by the cycle itself.
            let _ = SetController { inner }.run_cycle(trigger);
        }
    }

    fn notifier(&self) -> ChangeNotifier {
        let weak = Arc::downgrade(&self.inner);
        Arc::new(move |key| Self::dispatch(&weak, Trigger::Attribute(key)))
    }

    fn run_cycle(&self, trigger: Trigger) -> Result<()> {
        if self.inner.affinity.is_violated() {
            tracing::warn!(
                target: targets::CONTROLLER,
                ?trigger,
                owner = ?self.inner.affinity.thread_id(),
                "change observed off the controller's thread"
            );
        }

        if self.inner.in_cycle.swap(true, Ordering::AcqRel) {
            let err = SetControllerError::inconsistent(
                "change triggered while a change cycle was in progress",
            );
            tracing::warn!(target: targets::CONTROLLER, ?trigger, "re-entrant change rejected");
            let mut state = self.inner.state.lock();
            if let Trigger::Attribute(key) = trigger {
                state.pending_updates.insert(key);
            }
            state.last_error = Some(err.clone());
            return Err(err);
        }
        let _guard = CycleGuard(&self.inner.in_cycle);
        let _perf = PerfSpan::new(span_names::RECOMPUTE);

        match self.prepare_cycle(trigger) {
            Ok(Some(cycle)) => {
                self.deliver(cycle);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Compute the next projection and its diff while holding the state lock.
    fn prepare_cycle(&self, trigger: Trigger) -> Result<Option<Cycle<T>>> {
        let mut state = self.inner.state.lock();
        if state.phase != ControllerState::Observing {
            return Ok(None);
        }
        if let Trigger::Attribute(key) = trigger {
            state.pending_updates.insert(key);
        }

        let container = self.container_strong()?;
        let set = resolve_set::<dyn SetContainer<T>, T>(container.as_ref(), &self.inner.set_key)
            .map_err(|err| SetControllerError::inconsistent(err.to_string()))?;
        let members = set.members();

        let keys = state.trigger_keys();
        state.registry.sync(&members, &keys, &self.notifier());

        let projection = project(&members, state.section_key.as_deref(), &state.sort_descriptors)
            .map_err(SetControllerError::query_failed)?;
        let updated = std::mem::take(&mut state.pending_updates);
        let changes = diff(&state.current, &projection, &updated);

        Ok(Some(Cycle {
            projection,
            changes,
            delegate: state.delegate(),
        }))
    }

    fn deliver(&self, cycle: Cycle<T>) {
        let Cycle {
            projection,
            changes,
            delegate,
        } = cycle;

        if let Some(delegate) = &delegate {
            delegate.will_change_content(self);
        }

        {
            let mut state = self.inner.state.lock();
            state.previous = std::mem::replace(&mut state.current, projection);
            state.last_error = None;
        }

        if let Some(delegate) = &delegate {
            for event in &changes {
                match event {
                    ChangeEvent::Section(change) => delegate.did_change_section(
                        self,
                        &change.section,
                        change.index,
                        change.change_type,
                    ),
                    ChangeEvent::Object(change) => delegate.did_change_object(
                        self,
                        &change.object,
                        change.old_path,
                        change.change_type,
                        change.new_path,
                    ),
                }
            }
            delegate.did_change_content(self);
        }

        tracing::debug!(
            target: targets::CONTROLLER,
            events = changes.len(),
            inserts = changes.count(ChangeType::Insert),
            deletes = changes.count(ChangeType::Delete),
            moves = changes.count(ChangeType::Move),
            updates = changes.count(ChangeType::Update),
            delegate = delegate.is_some(),
            "change cycle delivered"
        );
    }

    fn fail(&self, err: &SetControllerError) {
        tracing::error!(
            target: targets::CONTROLLER,
            set_key = %self.inner.set_key,
            error = %err,
            "recompute failed, keeping previous projection"
        );
        let delegate = {
            let mut state = self.inner.state.lock();
            state.last_error = Some(err.clone());
            state.delegate()
        };
        if let Some(delegate) = delegate {
            delegate.controller_did_fail(self, err);
        }
    }

    fn record(&self, err: SetControllerError) -> SetControllerError {
        self.inner.state.lock().last_error = Some(err.clone());
        err
    }

    fn container_strong(&self) -> Result<Arc<dyn SetContainer<T>>> {
        self.inner
            .container
            .upgrade()
            .ok_or_else(|| SetControllerError::inconsistent("the observed container was dropped"))
    }
}

fn validate_trigger_keys<T: Observable>(
    observed: &[String],
    sort_descriptors: &[SortDescriptor<T>],
    section_key: Option<&str>,
) -> Result<()> {
    let keys = trigger_keys(observed, sort_descriptors, section_key);
    validate_keys::<T>(keys.iter().map(String::as_str)).map_err(SetControllerError::invalid_config)
}

impl<T> Clone for SetController<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for SetController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("SetController")
            .field("set_key", &self.inner.set_key)
            .field("state", &state.phase)
            .field("sections", &state.current.section_count())
            .field("objects", &state.current.object_count())
            .field("tracked", &state.registry.len())
            .finish()
    }
}
