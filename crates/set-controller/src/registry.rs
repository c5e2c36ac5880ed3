//! Per-member attribute subscriptions.
//!
//! The registry holds the key subscriptions of every member currently in the
//! observed set, indexed by identity. [`SubscriptionRegistry::sync`] is called
//! with the new member list on every cycle: departed members are unsubscribed
//! and new ones subscribed, so each member is observed exactly once while it
//! belongs to the set.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

use set_controller_core::logging::targets;
use set_controller_core::{ObjectKey, Observable, Subscription};

/// Callback invoked with the identity of the member whose attribute changed.
pub type ChangeNotifier = Arc<dyn Fn(ObjectKey) + Send + Sync>;

struct Registration<T> {
    // Keeps the identity key from being reused while registered.
    _object: Weak<T>,
    subscriptions: Vec<Subscription>,
}

/// Outcome of a [`SubscriptionRegistry::sync`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub subscribed: usize,
    pub unsubscribed: usize,
}

/// Attribute subscriptions keyed by member identity.
pub struct SubscriptionRegistry<T> {
    entries: HashMap<ObjectKey, Registration<T>>,
}

impl<T: Observable + 'static> SubscriptionRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Make the registry cover exactly `members`, observing `keys` on each.
    ///
    /// Keys for which a member offers no change signal are skipped.
    pub fn sync(
        &mut self,
        members: &[Arc<T>],
        keys: &[String],
        notify: &ChangeNotifier,
    ) -> SyncReport {
        let wanted: HashSet<ObjectKey> = members.iter().map(ObjectKey::of).collect();
        let before = self.entries.len();
        self.entries.retain(|key, _| wanted.contains(key));
        let unsubscribed = before - self.entries.len();

        let mut subscribed = 0;
        for member in members {
            let key = ObjectKey::of(member);
            if self.entries.contains_key(&key) {
                continue;
            }
            let subscriptions = keys
                .iter()
                .filter_map(|attribute| {
                    let notify = notify.clone();
                    member.observe_key(attribute, move || notify(key))
                })
                .collect();
            self.entries.insert(
                key,
                Registration {
                    _object: Arc::downgrade(member),
                    subscriptions,
                },
            );
            subscribed += 1;
        }

        if subscribed > 0 || unsubscribed > 0 {
            tracing::trace!(
                target: targets::REGISTRY,
                subscribed,
                unsubscribed,
                total = self.entries.len(),
                "registry synced"
            );
        }
        SyncReport {
            subscribed,
            unsubscribed,
        }
    }

    /// Drop every subscription. Returns the number of members released.
    pub fn clear(&mut self) -> usize {
        let released = self.entries.len();
        self.entries.clear();
        released
    }
}

impl<T> SubscriptionRegistry<T> {
    /// Number of registered members.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no member is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total live subscriptions across all members.
    pub fn subscription_count(&self) -> usize {
        self.entries.values().map(|r| r.subscriptions.len()).sum()
    }

    /// Whether `member` is registered.
    pub fn contains(&self, member: &Arc<T>) -> bool {
        self.entries.contains_key(&ObjectKey::of(member))
    }
}

impl<T: Observable + 'static> Default for SubscriptionRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
