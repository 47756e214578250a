//! # Host Seam
//!
//! The coalescer asks one question of its host: "are you still running?"
//!
//! The answer is checked at the start of every drain, BEFORE any action
//! runs. A host that has stopped gets its pending actions dropped, not run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Liveness signal supplied by the host application.
pub trait FrameHost: Send + Sync {
    /// Returns false once the host's run loop has stopped.
    fn is_running(&self) -> bool;
}

/// A host that never stops.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysRunning;

impl FrameHost for AlwaysRunning {
    #[inline]
    fn is_running(&self) -> bool {
        true
    }
}

/// Shared run flag.
///
/// Clones observe the same flag. Starts out running; [`RunFlag::stop`] is
/// one-way.
#[derive(Clone, Debug)]
pub struct RunFlag {
    running: Arc<AtomicBool>,
}

impl RunFlag {
    /// Creates a flag in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Signals shutdown to every clone of this flag.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Returns false once any clone has called [`stop`](Self::stop).
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameHost for RunFlag {
    #[inline]
    fn is_running(&self) -> bool {
        RunFlag::is_running(self)
    }
}
