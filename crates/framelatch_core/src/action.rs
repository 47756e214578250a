//! # Action Handles
//!
//! A [`FrameAction`] is a zero-argument callable with a stable identity.
//!
//! Closures have no equality in Rust, so identity is assigned explicitly:
//! every call to [`FrameAction::new`] draws a fresh [`ActionId`], and clones
//! share it. Deduplication in the coalescer is by this id.
//!
//! ```text
//! let a = FrameAction::new(f);   // ActionId(7)
//! let b = a.clone();             // ActionId(7)  -> a == b
//! let c = FrameAction::new(f);   // ActionId(8)  -> a != c
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Next id handed out by [`FrameAction::new`].
static NEXT_ACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a [`FrameAction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionId(pub u64);

impl ActionId {
    /// Returns the raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action#{}", self.0)
    }
}

/// A unit of work to run once per frame.
///
/// Cheap to clone: the callable lives behind an `Arc`.
#[derive(Clone)]
pub struct FrameAction {
    id: ActionId,
    callable: Arc<dyn Fn() + Send + Sync>,
}

impl FrameAction {
    /// Wraps a callable in a new handle with a fresh identity.
    #[must_use]
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            id: ActionId(NEXT_ACTION_ID.fetch_add(1, Ordering::Relaxed)),
            callable: Arc::new(f),
        }
    }

    /// Returns this handle's identity.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ActionId {
        self.id
    }

    /// Runs the callable.
    #[inline]
    pub fn invoke(&self) {
        (self.callable)();
    }
}

impl PartialEq for FrameAction {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FrameAction {}

impl Hash for FrameAction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for FrameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameAction").field("id", &self.id).finish_non_exhaustive()
    }
}
