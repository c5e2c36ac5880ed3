//! Set Controller - sorted, sectioned, change-notifying views of observable sets.
//!
//! A [`SetController`] watches one set relationship of a container object and
//! presents it the way a list or table view wants it: grouped into sections,
//! sorted, addressable by [`IndexPath`]. Whenever the set or an observed
//! attribute of one of its members changes, the controller recomputes its
//! [`Projection`], diffs it against the previous one, and reports a minimal,
//! ordered batch of section and item events to its [`SetControllerDelegate`].
//!
//! This crate re-exports the observation primitives of
//! `set_controller_core` ([`Signal`], [`Property`], [`ObservableSet`],
//! [`Observable`], [`SetContainer`]).
//!
//! # Core Types
//!
//! - `SetController`: the change coordinator
//! - `SetControllerConfig`: set key, observed keys, section key, sort order
//! - `SortDescriptor`: one sort criterion, by value or typed comparator
//! - `Projection` / `SectionInfo`: the ordered, sectioned view
//! - `ChangeSet` / `ChangeEvent`: the events of one recompute cycle
//! - `SetControllerDelegate`: receiver of change notifications
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use set_controller::prelude::*;
//!
//! struct Friend {
//!     name: Property<String>,
//! }
//!
//! impl Observable for Friend {
//!     fn observable_keys() -> &'static [&'static str] {
//!         &["name"]
//!     }
//!
//!     fn value_for_key(&self, key: &str) -> Option<Value> {
//!         (key == "name").then(|| Value::from(self.name.get()))
//!     }
//!
//!     fn key_signal(&self, key: &str) -> Option<&Signal<()>> {
//!         (key == "name").then(|| self.name.changed())
//!     }
//! }
//!
//! struct Document {
//!     friends: ObservableSet<Friend>,
//! }
//!
//! impl SetContainer<Friend> for Document {
//!     fn set_for_key(&self, key: &str) -> Option<&ObservableSet<Friend>> {
//!         (key == "friends").then_some(&self.friends)
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let document = Arc::new(Document { friends: ObservableSet::new() });
//!     let config = SetControllerConfig::new("friends").sort_by(SortDescriptor::ascending("name"));
//!
//!     let controller = SetController::new(&document, config)?;
//!     controller.perform_query()?;
//!
//!     document.friends.insert(Arc::new(Friend { name: Property::new("Ada".into()) }));
//!     assert_eq!(controller.section_count(), 1);
//!     Ok(())
//! }
//! ```

pub use set_controller_core::*;

mod config;
mod controller;
pub mod debug;
mod delegate;
pub mod diff;
mod error;
mod index;
pub mod projection;
pub mod registry;
mod section;
mod sort;

pub use config::SetControllerConfig;
pub use controller::{ControllerState, SetController};
pub use debug::ProjectionDebug;
pub use delegate::SetControllerDelegate;
pub use diff::{ChangeEvent, ChangeSet, ChangeType, ObjectChange, SectionChange, diff};
pub use error::{Result, SetControllerError};
pub use index::IndexPath;
pub use projection::{Projection, project};
pub use section::SectionInfo;
pub use sort::{CompareFn, SortDescriptor};

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        ChangeType, ControllerState, IndexPath, Observable, ObservableSet, Projection, Property,
        Result, SectionInfo, SetContainer, SetController, SetControllerConfig,
        SetControllerDelegate, SetControllerError, Signal, SortDescriptor, Value,
    };
}
