//! Observation primitives for Set Controller.
//!
//! This crate provides the building blocks a set controller observes:
//!
//! - **Signal/Slot System**: Type-safe notification with RAII subscriptions
//! - **Property System**: Attribute cells that notify on effective change
//! - **Observable Records**: Key-addressable attributes and change signals
//! - **Observable Sets**: Identity-deduplicated member sets with
//!   insert/remove signals, exposed by containers under a key
//! - **Thread Affinity**: Detection of access from the wrong thread
//!
//! # Example
//!
//! ```
//! use set_controller_core::{ObservableSet, Signal};
//! use std::sync::Arc;
//!
//! let numbers: ObservableSet<u32> = ObservableSet::new();
//! let _sub = numbers.inserted.subscribe(|added| {
//!     println!("{} new member(s)", added.len());
//! });
//!
//! numbers.insert(Arc::new(7));
//! ```

mod error;
pub mod logging;
pub mod observable;
pub mod property;
pub mod signal;
pub mod thread_check;
mod value;

pub use error::{CoreError, Result};
pub use logging::{PerfSpan, TreeFormatOptions, TreeStyle};
pub use observable::{
    ObjectKey, Observable, ObservableSet, SetContainer, resolve_key, resolve_set, validate_keys,
};
pub use property::{IntoProperty, Property};
pub use signal::{ConnectionId, Signal, Subscription};
pub use thread_check::ThreadAffinity;
pub use value::Value;
