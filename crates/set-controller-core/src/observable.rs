//! Observable records, sets and containers.
//!
//! These traits replace string key-path observation with an explicit
//! capability: a record says which keys it has, how to read them, and which
//! signal fires when each one changes. A container says which of its
//! relationships are observable sets.
//!
//! # Example
//!
//! ```
//! use set_controller_core::{Observable, ObservableSet, Property, Signal, Value};
//! use std::sync::Arc;
//!
//! struct Tag {
//!     label: Property<String>,
//! }
//!
//! impl Observable for Tag {
//!     fn observable_keys() -> &'static [&'static str] {
//!         &["label"]
//!     }
//!
//!     fn value_for_key(&self, key: &str) -> Option<Value> {
//!         match key {
//!             "label" => Some(self.label.get().into()),
//!             _ => None,
//!         }
//!     }
//!
//!     fn key_signal(&self, key: &str) -> Option<&Signal<()>> {
//!         match key {
//!             "label" => Some(self.label.changed()),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let tags = ObservableSet::new();
//! let tag = Arc::new(Tag { label: Property::new("urgent".into()) });
//! assert!(tags.insert(tag.clone()));
//! assert!(!tags.insert(tag)); // identity-deduplicated
//! assert_eq!(tags.len(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{CoreError, Result};
use crate::logging::targets;
use crate::signal::{Signal, Subscription};
use crate::value::Value;

/// A record whose attributes can be read and observed by key.
pub trait Observable: Send + Sync {
    /// Every key this record type can resolve.
    ///
    /// Used to validate configurations before any instance exists.
    fn observable_keys() -> &'static [&'static str]
    where
        Self: Sized;

    /// Read the attribute stored under `key`.
    ///
    /// Returns `None` when the key cannot be resolved on this instance. A nil
    /// attribute is `Some(Value::None)`.
    fn value_for_key(&self, key: &str) -> Option<Value>;

    /// The signal emitted when the attribute under `key` changes.
    fn key_signal(&self, key: &str) -> Option<&Signal<()>>;

    /// Subscribe `callback` to changes of `key`.
    ///
    /// Returns `None` if the key has no change signal.
    fn observe_key<F>(&self, key: &str, callback: F) -> Option<Subscription>
    where
        F: Fn() + Send + Sync + 'static,
        Self: Sized,
    {
        self.key_signal(key)
            .map(|signal| signal.subscribe(move |_| callback()))
    }
}

/// A container object exposing observable set relationships by key.
pub trait SetContainer<T>: Send + Sync {
    /// The set stored under `key`, if that key names a set relationship.
    fn set_for_key(&self, key: &str) -> Option<&ObservableSet<T>>;
}

/// Read `key` on `object`, failing if the instance cannot resolve it.
pub fn resolve_key<T: Observable>(object: &T, key: &str) -> Result<Value> {
    object
        .value_for_key(key)
        .ok_or_else(|| CoreError::unresolved::<T>(key))
}

/// Check that every key in `keys` is declared by `T`.
pub fn validate_keys<'a, T: Observable>(keys: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let declared = T::observable_keys();
    for key in keys {
        if !declared.iter().any(|declared_key| *declared_key == key) {
            return Err(CoreError::unknown_key::<T>(key));
        }
    }
    Ok(())
}

/// Look up the set relationship `key` on `container`.
pub fn resolve_set<'c, C, T>(container: &'c C, key: &str) -> Result<&'c ObservableSet<T>>
where
    C: SetContainer<T> + ?Sized,
{
    container
        .set_for_key(key)
        .ok_or_else(|| CoreError::not_a_set::<C>(key))
}

/// Identity of a shared object, derived from its allocation address.
///
/// Two keys are equal exactly when they were taken from clones of the same
/// `Arc`. A key is only meaningful while some clone of that `Arc` is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(usize);

impl ObjectKey {
    /// The identity key of `object`.
    pub fn of<T: ?Sized>(object: &Arc<T>) -> Self {
        Self(Arc::as_ptr(object) as *const () as usize)
    }
}

/// A mutable set of shared records with change signals.
///
/// Membership is by identity (`Arc::ptr_eq`), not value equality. Members are
/// kept in insertion order, which makes enumeration, and therefore every
/// tie-break that depends on it, deterministic.
///
/// `inserted` and `removed` fire after the membership lock is released and
/// only when membership actually changed.
pub struct ObservableSet<T> {
    members: RwLock<Vec<Arc<T>>>,
    /// Emitted with the members that were just added.
    pub inserted: Signal<Vec<Arc<T>>>,
    /// Emitted with the members that were just removed.
    pub removed: Signal<Vec<Arc<T>>>,
}

impl<T: Send + Sync + 'static> Default for ObservableSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> ObservableSet<T> {
    /// Create an empty set.
    pub fn new() -> Self {
        Self {
            members: RwLock::new(Vec::new()),
            inserted: Signal::new(),
            removed: Signal::new(),
        }
    }

    /// Create a set with initial members, without emitting anything.
    pub fn with_members(members: impl IntoIterator<Item = Arc<T>>) -> Self {
        let set = Self::new();
        {
            let mut current = set.members.write();
            for member in members {
                if !current.iter().any(|m| Arc::ptr_eq(m, &member)) {
                    current.push(member);
                }
            }
        }
        set
    }

    /// Snapshot of the current members in enumeration order.
    pub fn members(&self) -> Vec<Arc<T>> {
        self.members.read().clone()
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    /// Returns `true` if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }

    /// Returns `true` if `member` (by identity) is in the set.
    pub fn contains(&self, member: &Arc<T>) -> bool {
        self.members.read().iter().any(|m| Arc::ptr_eq(m, member))
    }

    /// Add one member. Returns `false` if it was already present.
    pub fn insert(&self, member: Arc<T>) -> bool {
        !self.extend([member]).is_empty()
    }

    /// Remove one member. Returns `false` if it was not present.
    pub fn remove(&self, member: &Arc<T>) -> bool {
        !self.remove_all([member.clone()]).is_empty()
    }

    /// Add several members in one notification.
    ///
    /// Returns the members that were actually added.
    pub fn extend(&self, members: impl IntoIterator<Item = Arc<T>>) -> Vec<Arc<T>> {
        let added = {
            let mut current = self.members.write();
            let mut added = Vec::new();
            for member in members {
                if !current.iter().any(|m| Arc::ptr_eq(m, &member)) {
                    current.push(member.clone());
                    added.push(member);
                }
            }
            added
        };
        if !added.is_empty() {
            tracing::trace!(target: targets::SET, count = added.len(), "members inserted");
            self.inserted.emit(added.clone());
        }
        added
    }

    /// Remove several members in one notification.
    ///
    /// Returns the members that were actually removed.
    pub fn remove_all(&self, members: impl IntoIterator<Item = Arc<T>>) -> Vec<Arc<T>> {
        let removed = {
            let mut current = self.members.write();
            let mut removed = Vec::new();
            for member in members {
                if let Some(pos) = current.iter().position(|m| Arc::ptr_eq(m, &member)) {
                    removed.push(current.remove(pos));
                }
            }
            removed
        };
        if !removed.is_empty() {
            tracing::trace!(target: targets::SET, count = removed.len(), "members removed");
            self.removed.emit(removed.clone());
        }
        removed
    }

    /// Remove every member in one notification.
    pub fn clear(&self) -> Vec<Arc<T>> {
        let removed = std::mem::take(&mut *self.members.write());
        if !removed.is_empty() {
            tracing::trace!(target: targets::SET, count = removed.len(), "set cleared");
            self.removed.emit(removed.clone());
        }
        removed
    }
}

impl<T> fmt::Debug for ObservableSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableSet")
            .field("len", &self.members.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Item(u32);

    fn recorder(set: &ObservableSet<Item>) -> Arc<Mutex<Vec<(&'static str, Vec<u32>)>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_in = log.clone();
        set.inserted.connect(move |items: &Vec<Arc<Item>>| {
            log_in.lock().push(("inserted", items.iter().map(|i| i.0).collect()));
        });
        let log_out = log.clone();
        set.removed.connect(move |items: &Vec<Arc<Item>>| {
            log_out.lock().push(("removed", items.iter().map(|i| i.0).collect()));
        });
        log
    }

    #[test]
    fn test_identity_membership() {
        let set = ObservableSet::new();
        let a = Arc::new(Item(1));
        let a_twin = Arc::new(Item(1));

        assert!(set.insert(a.clone()));
        assert!(!set.insert(a.clone()));
        assert!(set.insert(a_twin.clone()));
        assert_eq!(set.len(), 2);
        assert!(set.contains(&a_twin));
    }

    #[test]
    fn test_signals_only_on_effective_change() {
        let set = ObservableSet::new();
        let log = recorder(&set);
        let a = Arc::new(Item(1));
        let b = Arc::new(Item(2));

        set.extend([a.clone(), b.clone(), a.clone()]);
        set.insert(a.clone());
        set.remove(&Arc::new(Item(9)));
        set.remove(&a);
        set.clear();
        set.clear();

        assert_eq!(
            *log.lock(),
            vec![("inserted", vec![1, 2]), ("removed", vec![1]), ("removed", vec![2])]
        );
    }

    #[test]
    fn test_enumeration_is_insertion_order() {
        let items: Vec<_> = (0..5).map(|i| Arc::new(Item(i))).collect();
        let set = ObservableSet::with_members(items.iter().rev().cloned());
        let order: Vec<u32> = set.members().iter().map(|i| i.0).collect();
        assert_eq!(order, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_slot_can_read_set() {
        let set = Arc::new(ObservableSet::new());
        let seen = Arc::new(Mutex::new(0));

        let weak = Arc::downgrade(&set);
        let seen_clone = seen.clone();
        set.inserted.connect(move |_: &Vec<Arc<Item>>| {
            if let Some(set) = weak.upgrade() {
                *seen_clone.lock() = set.len();
            }
        });

        set.insert(Arc::new(Item(1)));
        assert_eq!(*seen.lock(), 1);
    }

    struct Named {
        name: crate::Property<String>,
    }

    impl Observable for Named {
        fn observable_keys() -> &'static [&'static str] {
            &["name", "nickname"]
        }

        fn value_for_key(&self, key: &str) -> Option<Value> {
            match key {
                "name" => Some(self.name.get().into()),
                _ => None,
            }
        }

        fn key_signal(&self, key: &str) -> Option<&Signal<()>> {
            match key {
                "name" => Some(self.name.changed()),
                _ => None,
            }
        }
    }

    struct Holder {
        named: ObservableSet<Named>,
    }

    impl SetContainer<Named> for Holder {
        fn set_for_key(&self, key: &str) -> Option<&ObservableSet<Named>> {
            (key == "named").then_some(&self.named)
        }
    }

    #[test]
    fn test_key_resolution() {
        let named = Named {
            name: crate::Property::new("Ada".into()),
        };
        assert_eq!(resolve_key(&named, "name"), Ok(Value::from("Ada")));
        assert!(matches!(
            resolve_key(&named, "nickname"),
            Err(CoreError::Unresolved { .. })
        ));
        assert!(validate_keys::<Named>(["name", "nickname"]).is_ok());
        let err = validate_keys::<Named>(["name", "age"]).unwrap_err();
        assert_eq!(err.key(), "age");
    }

    #[test]
    fn test_set_resolution() {
        let holder = Holder {
            named: ObservableSet::new(),
        };
        assert!(resolve_set(&holder, "named").is_ok());
        assert!(matches!(
            resolve_set(&holder, "friends"),
            Err(CoreError::NotASet { .. })
        ));
    }

    #[test]
    fn test_observe_key_subscription() {
        let named = Named {
            name: crate::Property::new("Ada".into()),
        };
        let hits = Arc::new(Mutex::new(0));
        let hits_clone = hits.clone();
        let sub = named
            .observe_key("name", move || *hits_clone.lock() += 1)
            .expect("name is observable");
        named.name.set("Grace".into());
        drop(sub);
        named.name.set("Linus".into());
        assert_eq!(*hits.lock(), 1);
        assert!(named.observe_key("nickname", || {}).is_none());
    }

    #[test]
    fn test_object_key_identity() {
        let a = Arc::new(Item(1));
        let b = Arc::new(Item(1));
        assert_eq!(ObjectKey::of(&a), ObjectKey::of(&a.clone()));
        assert_ne!(ObjectKey::of(&a), ObjectKey::of(&b));
    }
}
