//! Change notification for observable values.
//!
//! Every observable piece of the model announces changes through a
//! [`Signal`]: a [`crate::Property`] fires when its value changes, and an
//! [`crate::ObservableSet`] fires when members are inserted or removed. The
//! controller attaches callbacks to those signals and keeps the resulting
//! [`Subscription`] handles for as long as it observes.
//!
//! Callbacks run synchronously on the emitting thread. The connection table
//! is not locked while they run, so a callback may attach or detach callbacks
//! on the signal that is currently firing. A callback detached during an
//! emission may still run once for that emission.
//!
//! ```
//! use set_controller_core::Signal;
//!
//! let renamed = Signal::<String>::new();
//! let id = renamed.connect(|name| println!("now called {name}"));
//!
//! renamed.emit("Ann".to_string());
//! assert!(renamed.disconnect(id));
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Handle for one attached callback, accepted by [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Shared connection table. Subscriptions hold a `Weak` to it.
struct SignalInner<Args> {
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    blocked: AtomicBool,
}

/// Type-erased view of a connection table, used by [`Subscription`].
trait ConnectionTable: Send + Sync {
    fn disconnect(&self, id: ConnectionId) -> bool;
    fn contains(&self, id: ConnectionId) -> bool;
}

impl<Args: 'static> ConnectionTable for SignalInner<Args> {
    fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    fn contains(&self, id: ConnectionId) -> bool {
        self.connections.lock().contains_key(id)
    }
}

/// A list of callbacks run with `&Args` on every [`emit`](Self::emit).
///
/// Attribute signals carry `()`; set signals carry the members that changed.
/// Cloning is not supported: owners hand out `&Signal` and callers keep a
/// [`Subscription`].
pub struct Signal<Args> {
    inner: Arc<SignalInner<Args>>,
}

impl<Args: Send + 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: Send + 'static> Signal<Args> {
    /// A signal with nothing attached.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalInner {
                connections: Mutex::new(SlotMap::with_key()),
                blocked: AtomicBool::new(false),
            }),
        }
    }

    /// Attach `slot`; it stays attached until [`disconnect`](Self::disconnect)
    /// or until the signal is dropped.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.inner.connections.lock().insert(Arc::new(slot));
        tracing::trace!(target: targets::SIGNAL, ?id, "slot connected");
        id
    }

    /// Attach `slot` for the lifetime of the returned [`Subscription`].
    ///
    /// The subscription holds the signal weakly and never keeps the observed
    /// object alive.
    pub fn subscribe<F>(&self, slot: F) -> Subscription
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        let inner: Arc<dyn ConnectionTable> = self.inner.clone();
        Subscription {
            signal: Arc::downgrade(&inner),
            id,
        }
    }

    /// Detach the callback behind `id`. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.inner.connections.lock().remove(id).is_some()
    }

    /// Detach every callback.
    pub fn disconnect_all(&self) {
        self.inner.connections.lock().clear();
    }

    /// Number of attached callbacks.
    pub fn connection_count(&self) -> usize {
        self.inner.connections.lock().len()
    }

    /// Suppress emissions until unblocked, e.g. while a record is populated
    /// field by field.
    pub fn set_blocked(&self, blocked: bool) {
        self.inner.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Whether emissions are suppressed.
    pub fn is_blocked(&self) -> bool {
        self.inner.blocked.load(Ordering::SeqCst)
    }

    /// Run every attached callback with `args`, in attach order.
    #[tracing::instrument(skip_all, target = "set_controller_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        // Snapshot the slots so they run without the table locked.
        let slots: Vec<Slot<Args>> = self.inner.connections.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}

impl<Args> fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.inner.connections.lock().len())
            .field("blocked", &self.inner.blocked.load(Ordering::SeqCst))
            .finish()
    }
}

/// An attached callback that detaches itself when dropped.
///
/// Created by [`Signal::subscribe`]. Tearing it down does not need the signal
/// at hand, so a registry can drop a member's observations after the member
/// itself is gone.
///
/// ```
/// use set_controller_core::Property;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let rating = Property::new(3);
/// let changes = Arc::new(AtomicUsize::new(0));
/// let seen = changes.clone();
/// let observation = rating.changed().subscribe(move |_| {
///     seen.fetch_add(1, Ordering::SeqCst);
/// });
///
/// rating.set(4);
/// drop(observation);
/// rating.set(5);
/// assert_eq!(changes.load(Ordering::SeqCst), 1);
/// ```
#[must_use = "dropping a Subscription disconnects its slot immediately"]
pub struct Subscription {
    signal: Weak<dyn ConnectionTable>,
    id: ConnectionId,
}

impl Subscription {
    /// The connection ID backing this subscription.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns `true` while the signal is alive and the slot is connected.
    pub fn is_connected(&self) -> bool {
        self.signal
            .upgrade()
            .is_some_and(|signal| signal.contains(self.id))
    }

    /// Disconnect now instead of waiting for drop.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(signal) = self.signal.upgrade() {
            if signal.disconnect(self.id) {
                tracing::trace!(target: targets::SIGNAL, id = ?self.id, "subscription dropped");
            }
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("signal_alive", &(self.signal.strong_count() > 0))
            .finish()
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
static_assertions::assert_impl_all!(Subscription: Send, Sync);
