//! Controller configuration.

use std::fmt;
use std::sync::{Arc, Weak};

use set_controller_core::{Observable, SetContainer, resolve_set, validate_keys};

use crate::delegate::SetControllerDelegate;
use crate::error::{Result, SetControllerError};
use crate::sort::SortDescriptor;

/// Configuration for a [`SetController`](crate::SetController).
///
/// # Example
///
/// ```ignore
/// let config = SetControllerConfig::new("friends")
///     .observe_keys(["name", "favorite_color"])
///     .section_key("favorite_color")
///     .sort_by(SortDescriptor::ascending("favorite_color"))
///     .sort_by(SortDescriptor::ascending("name"))
///     .delegate(&table);
///
/// let controller = SetController::new(&document, config)?;
/// ```
pub struct SetControllerConfig<T> {
    /// Key of the set relationship on the container.
    pub set_key: String,
    /// Attribute keys whose changes trigger a recompute.
    pub observed_keys: Vec<String>,
    /// Attribute key used to group members into sections.
    pub section_key: Option<String>,
    /// Sort criteria, most significant first.
    pub sort_descriptors: Vec<SortDescriptor<T>>,
    /// Receiver of change notifications, held weakly.
    pub delegate: Option<Weak<dyn SetControllerDelegate<T>>>,
}

impl<T: Observable + 'static> SetControllerConfig<T> {
    /// Create a configuration observing the set under `set_key`.
    pub fn new(set_key: impl Into<String>) -> Self {
        Self {
            set_key: set_key.into(),
            observed_keys: Vec::new(),
            section_key: None,
            sort_descriptors: Vec::new(),
            delegate: None,
        }
    }

    /// Observe one more attribute key.
    pub fn observe(mut self, key: impl Into<String>) -> Self {
        self.observed_keys.push(key.into());
        self
    }

    /// Observe several attribute keys.
    pub fn observe_keys<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.observed_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Group members into sections by `key`.
    pub fn section_key(mut self, key: impl Into<String>) -> Self {
        self.section_key = Some(key.into());
        self
    }

    /// Append a sort criterion.
    pub fn sort_by(mut self, descriptor: SortDescriptor<T>) -> Self {
        self.sort_descriptors.push(descriptor);
        self
    }

    /// Replace all sort criteria.
    pub fn sort_descriptors(mut self, descriptors: Vec<SortDescriptor<T>>) -> Self {
        self.sort_descriptors = descriptors;
        self
    }

    /// Deliver notifications to `delegate`.
    pub fn delegate<D>(mut self, delegate: &Arc<D>) -> Self
    where
        D: SetControllerDelegate<T> + 'static,
    {
        self.delegate = Some(downgrade_delegate(delegate));
        self
    }

    /// Every key whose change triggers a recompute: the observed keys, then
    /// the sort keys, then the section key, without duplicates.
    pub fn trigger_keys(&self) -> Vec<String> {
        trigger_keys(
            &self.observed_keys,
            &self.sort_descriptors,
            self.section_key.as_deref(),
        )
    }

    /// Check the configuration against `container` and the member type.
    pub fn validate<C>(&self, container: &C) -> Result<()>
    where
        C: SetContainer<T> + ?Sized,
    {
        resolve_set::<C, T>(container, &self.set_key).map_err(SetControllerError::invalid_config)?;
        validate_keys::<T>(self.trigger_keys().iter().map(String::as_str))
            .map_err(SetControllerError::invalid_config)
    }
}

impl<T> fmt::Debug for SetControllerConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetControllerConfig")
            .field("set_key", &self.set_key)
            .field("observed_keys", &self.observed_keys)
            .field("section_key", &self.section_key)
            .field("sort_descriptors", &self.sort_descriptors)
            .field("has_delegate", &self.delegate.is_some())
            .finish()
    }
}

pub(crate) fn downgrade_delegate<T, D>(delegate: &Arc<D>) -> Weak<dyn SetControllerDelegate<T>>
where
    D: SetControllerDelegate<T> + 'static,
{
    let delegate: Arc<dyn SetControllerDelegate<T>> = delegate.clone();
    Arc::downgrade(&delegate)
}

pub(crate) fn trigger_keys<T>(
    observed: &[String],
    sort_descriptors: &[SortDescriptor<T>],
    section_key: Option<&str>,
) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    let candidates = observed
        .iter()
        .map(String::as_str)
        .chain(sort_descriptors.iter().map(SortDescriptor::key))
        .chain(section_key);
    for key in candidates {
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    }
    keys
}
