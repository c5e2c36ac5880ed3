//! Thread affinity checks.
//!
//! The observation model is single-threaded: every mutation of an observed
//! set or record, and therefore every recompute it triggers, is expected to
//! happen on one logical thread. [`ThreadAffinity`] records the thread an
//! object was created on so that violations can be detected and reported.
//!
//! ```
//! use set_controller_core::thread_check::ThreadAffinity;
//!
//! let affinity = ThreadAffinity::current();
//! assert!(affinity.is_same_thread());
//!
//! let other = std::thread::spawn(move || affinity.is_same_thread()).join().unwrap();
//! assert!(!other);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

/// Global switch for affinity checks.
static THREAD_CHECKS_ENABLED: AtomicBool = AtomicBool::new(true);

/// Turn affinity checks on or off for the whole process.
///
/// Hosts that serialize all access through their own queue or actor can turn
/// the checks off.
pub fn set_thread_checks_enabled(enabled: bool) {
    THREAD_CHECKS_ENABLED.store(enabled, Ordering::SeqCst);
}

/// Check if runtime thread checks are enabled.
#[inline]
pub fn thread_checks_enabled() -> bool {
    THREAD_CHECKS_ENABLED.load(Ordering::Relaxed)
}

/// Records the thread an object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl ThreadAffinity {
    /// Affinity to the calling thread.
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// The owning thread.
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Returns `true` if the calling thread is the owning thread.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Returns `true` if the calling thread violates the affinity and checks
    /// are enabled.
    #[inline]
    pub fn is_violated(&self) -> bool {
        thread_checks_enabled() && !self.is_same_thread()
    }

    /// Panic in debug builds if called from another thread.
    #[inline]
    pub fn debug_assert_same_thread(&self) {
        debug_assert!(
            !self.is_violated(),
            "accessed from thread {:?}, owned by {:?}",
            std::thread::current().id(),
            self.thread_id
        );
    }
}
