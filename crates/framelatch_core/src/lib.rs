//! # FRAMELATCH Core
//!
//! Run an action "once per frame", no matter how many call sites ask for it.
//!
//! ## The Problem
//!
//! ```text
//! Frame N:
//!   inventory changed  -> rebuild_ui()
//!   gold changed       -> rebuild_ui()
//!   item equipped      -> rebuild_ui()
//!
//! Naive:     3 rebuilds in frame N
//! Coalesced: 1 rebuild on the frame boundary
//! ```
//!
//! ## The Contract
//!
//! 1. **Producers** call [`FrameCoalescer::request_once_per_frame`] any number
//!    of times. Nothing runs inline.
//! 2. **The host** calls [`FrameCoalescer::drain_pending`] once per tick,
//!    after its update phase.
//! 3. Every distinct [`FrameAction`] requested since the last drain runs
//!    exactly once, in first-request order.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use framelatch_core::{FrameAction, FrameCoalescer};
//!
//! let rebuilds = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&rebuilds);
//! let rebuild_ui = FrameAction::new(move || {
//!     counter.fetch_add(1, Ordering::Relaxed);
//! });
//!
//! let coalescer = FrameCoalescer::default();
//! for _ in 0..3 {
//!     coalescer.request_once_per_frame(&rebuild_ui);
//! }
//! assert_eq!(rebuilds.load(Ordering::Relaxed), 0);
//!
//! coalescer.drain_pending();
//! assert_eq!(rebuilds.load(Ordering::Relaxed), 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod action;
pub mod coalescer;
pub mod host;

pub use action::{ActionId, FrameAction};
pub use coalescer::{
    CoalescerConfig, CoalescerStats, DrainOutcome, FrameCoalescer, ReentryPolicy, SchedulerState,
};
pub use host::{AlwaysRunning, FrameHost, RunFlag};

/// Default number of pre-allocated pending slots.
pub const DEFAULT_INITIAL_CAPACITY: usize = 100;
