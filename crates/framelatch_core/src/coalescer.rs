//! # Frame Action Coalescer
//!
//! One pending set, one in-flight flag, one drain per tick.
//!
//! ## Lifecycle
//!
//! ```text
//!            request (first of cycle)
//!   ┌──────┐ ──────────────────────> ┌───────────┐
//!   │ Idle │                         │ In-flight │ <── request (dedup, append)
//!   └──────┘ <────────────────────── └───────────┘
//!            drain_pending (pass done, nothing re-queued)
//! ```
//!
//! ## Drain Pass
//!
//! ```text
//! drain_pending_with(host)
//!   ├─ Idle?              -> DrainOutcome::Idle       (nothing requested)
//!   ├─ set empty?         -> DrainOutcome::Empty      (mark idle)
//!   ├─ !host.is_running() -> DrainOutcome::Dropped    (clear, nothing runs)
//!   └─ invoke in first-request order -> DrainOutcome::Ran
//! ```
//!
//! The lock is released before any action runs, so actions may request
//! further actions. Where those land depends on [`ReentryPolicy`].

use std::collections::HashSet;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::action::{ActionId, FrameAction};
use crate::host::{AlwaysRunning, FrameHost};
use crate::DEFAULT_INITIAL_CAPACITY;

/// What happens to actions requested while a drain pass is running.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReentryPolicy {
    /// The pass runs a snapshot; new requests wait for the next drain.
    #[default]
    NextDrain,
    /// The pass walks the live set; new requests run in the same pass.
    SamePass,
}

/// Coalescer configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoalescerConfig {
    /// Pre-allocated pending slots.
    pub initial_capacity: usize,
    /// Re-entrant request handling.
    pub reentry: ReentryPolicy,
}

impl Default for CoalescerConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            reentry: ReentryPolicy::NextDrain,
        }
    }
}

/// Scheduler state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchedulerState {
    /// No cycle scheduled.
    #[default]
    Idle,
    /// A cycle is scheduled and has not completed.
    InFlight,
}

/// Result of one call to [`FrameCoalescer::drain_pending`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrainOutcome {
    /// No cycle was in flight.
    Idle,
    /// A cycle was in flight with nothing pending.
    Empty,
    /// Another drain pass is already running on this coalescer.
    AlreadyDraining,
    /// The host had stopped; pending actions were discarded unrun.
    Dropped {
        /// Actions discarded.
        count: usize,
    },
    /// The pass ran.
    Ran {
        /// Actions invoked during the pass.
        invoked: usize,
        /// Actions requested during the pass that wait for the next drain.
        deferred: usize,
    },
}

impl DrainOutcome {
    /// Number of actions invoked by this drain.
    #[must_use]
    pub const fn invoked(&self) -> usize {
        match self {
            Self::Ran { invoked, .. } => *invoked,
            _ => 0,
        }
    }
}

/// Coalescer counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoalescerStats {
    /// Calls to `request_once_per_frame` / `request_optional(Some(..))`.
    pub requests: u64,
    /// Requests that were already pending.
    pub coalesced: u64,
    /// `request_optional(None)` calls.
    pub skipped: u64,
    /// Drains that found a cycle in flight.
    pub cycles: u64,
    /// Cycles that found the set empty.
    pub empty_cycles: u64,
    /// Actions invoked.
    pub invoked: u64,
    /// Actions discarded because the host had stopped.
    pub dropped: u64,
    /// Passes cut short by a panicking action.
    pub aborted_passes: u64,
}

struct Inner {
    /// Pending actions, first-request order.
    pending: Vec<FrameAction>,
    /// Ids in `pending`.
    members: HashSet<ActionId>,
    /// Recycled buffer for the next snapshot.
    spare: Vec<FrameAction>,
    state: SchedulerState,
    draining: bool,
    stats: CoalescerStats,
}

/// Deduplicating, frame-aligned action scheduler.
///
/// Construct once, share by reference (or `Arc`) with every producer, and
/// call [`drain_pending`](Self::drain_pending) once per tick from the host
/// loop.
pub struct FrameCoalescer {
    inner: Mutex<Inner>,
    config: CoalescerConfig,
}

impl FrameCoalescer {
    /// Creates an idle coalescer with an empty pending set.
    #[must_use]
    pub fn new(config: CoalescerConfig) -> Self {
        let capacity = config.initial_capacity;
        Self {
            inner: Mutex::new(Inner {
                pending: Vec::with_capacity(capacity),
                members: HashSet::with_capacity(capacity),
                spare: Vec::with_capacity(capacity),
                state: SchedulerState::Idle,
                draining: false,
                stats: CoalescerStats::default(),
            }),
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &CoalescerConfig {
        &self.config
    }

    /// Asks for `action` to run once on the next drain.
    ///
    /// Never runs anything inline. Repeating the request before the drain
    /// is a no-op. The first request of a cycle moves the coalescer from
    /// idle to in-flight.
    pub fn request_once_per_frame(&self, action: &FrameAction) {
        let mut inner = self.inner.lock();
        inner.stats.requests += 1;

        if !inner.members.insert(action.id()) {
            inner.stats.coalesced += 1;
            tracing::trace!(action = action.id().raw(), "request coalesced");
            return;
        }

        inner.pending.push(action.clone());

        if inner.state == SchedulerState::Idle {
            inner.state = SchedulerState::InFlight;
            tracing::trace!(action = action.id().raw(), "drain cycle scheduled");
        }
    }

    /// Like [`request_once_per_frame`](Self::request_once_per_frame), but
    /// tolerates a missing handle. `None` is skipped and starts nothing.
    pub fn request_optional(&self, action: Option<&FrameAction>) {
        match action {
            Some(action) => self.request_once_per_frame(action),
            None => {
                self.inner.lock().stats.skipped += 1;
                tracing::trace!("request without action skipped");
            }
        }
    }

    /// Runs the drain cycle for a host that never stops.
    pub fn drain_pending(&self) -> DrainOutcome {
        self.drain_pending_with(&AlwaysRunning)
    }

    /// Runs the drain cycle.
    ///
    /// The host's liveness is checked before anything runs: a stopped host
    /// gets every pending action discarded unrun.
    pub fn drain_pending_with(&self, host: &dyn FrameHost) -> DrainOutcome {
        let mut inner = self.inner.lock();

        if inner.state == SchedulerState::Idle {
            return DrainOutcome::Idle;
        }
        if inner.draining {
            return DrainOutcome::AlreadyDraining;
        }

        inner.stats.cycles += 1;

        if inner.pending.is_empty() {
            inner.state = SchedulerState::Idle;
            inner.stats.empty_cycles += 1;
            return DrainOutcome::Empty;
        }

        if !host.is_running() {
            let count = inner.pending.len();
            inner.pending.clear();
            inner.members.clear();
            inner.state = SchedulerState::Idle;
            inner.stats.dropped += count as u64;
            tracing::warn!(count, "host stopped, pending actions dropped");
            return DrainOutcome::Dropped { count };
        }

        inner.draining = true;
        drop(inner);

        let guard = PassGuard {
            coalescer: self,
            policy: self.config.reentry,
        };
        let outcome = match self.config.reentry {
            ReentryPolicy::NextDrain => self.run_snapshot(),
            ReentryPolicy::SamePass => self.run_live(),
        };
        std::mem::forget(guard);

        tracing::debug!(
            invoked = outcome.invoked(),
            policy = ?self.config.reentry,
            "drain cycle complete"
        );
        outcome
    }

    /// Snapshot, clear, then invoke. Called with `draining` set.
    fn run_snapshot(&self) -> DrainOutcome {
        let mut batch = {
            let mut inner = self.inner.lock();
            let mut batch = std::mem::take(&mut inner.spare);
            std::mem::swap(&mut batch, &mut inner.pending);
            inner.members.clear();
            batch
        };

        for action in &batch {
            action.invoke();
        }
        let invoked = batch.len();
        batch.clear();

        let mut inner = self.inner.lock();
        inner.spare = batch;
        inner.draining = false;
        inner.stats.invoked += invoked as u64;

        let deferred = inner.pending.len();
        inner.state = if deferred == 0 {
            SchedulerState::Idle
        } else {
            SchedulerState::InFlight
        };

        DrainOutcome::Ran { invoked, deferred }
    }

    /// Walk the live set by index, then clear. Called with `draining` set.
    ///
    /// The end-of-set check and the clear share one critical section, so a
    /// request from another thread either lands before it (and runs) or
    /// after it (and waits for the next drain).
    fn run_live(&self) -> DrainOutcome {
        let mut index = 0;
        loop {
            let mut inner = self.inner.lock();
            if let Some(action) = inner.pending.get(index).cloned() {
                drop(inner);
                action.invoke();
                index += 1;
                continue;
            }

            inner.pending.clear();
            inner.members.clear();
            inner.draining = false;
            inner.state = SchedulerState::Idle;
            inner.stats.invoked += index as u64;

            return DrainOutcome::Ran {
                invoked: index,
                deferred: 0,
            };
        }
    }

    /// Returns the scheduler state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.inner.lock().state
    }

    /// Returns true while a cycle is scheduled and not yet complete.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.state() == SchedulerState::InFlight
    }

    /// Number of actions waiting for the next drain.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Returns true if `action` is waiting for the next drain.
    #[must_use]
    pub fn is_pending(&self, action: &FrameAction) -> bool {
        self.inner.lock().members.contains(&action.id())
    }

    /// Returns a copy of the counters.
    #[must_use]
    pub fn stats(&self) -> CoalescerStats {
        self.inner.lock().stats
    }

    /// Zeroes the counters.
    pub fn reset_stats(&self) {
        self.inner.lock().stats = CoalescerStats::default();
    }
}

/// Puts the coalescer back in order if an action unwinds out of a pass.
///
/// The rest of the aborted pass is abandoned. Under `NextDrain`, requests
/// made before the panic stay pending for the next drain; under `SamePass`
/// the live set belonged to the pass and is cleared.
struct PassGuard<'a> {
    coalescer: &'a FrameCoalescer,
    policy: ReentryPolicy,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.coalescer.inner.lock();
        if self.policy == ReentryPolicy::SamePass {
            inner.pending.clear();
            inner.members.clear();
        }
        inner.draining = false;
        inner.stats.aborted_passes += 1;
        inner.state = if inner.pending.is_empty() {
            SchedulerState::Idle
        } else {
            SchedulerState::InFlight
        };
        tracing::warn!(policy = ?self.policy, "drain pass aborted by a panicking action");
    }
}

impl Default for FrameCoalescer {
    fn default() -> Self {
        Self::new(CoalescerConfig::default())
    }
}

impl std::fmt::Debug for FrameCoalescer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("FrameCoalescer")
            .field("state", &inner.state)
            .field("pending", &inner.pending.len())
            .field("draining", &inner.draining)
            .field("config", &self.config)
            .finish()
    }
}
