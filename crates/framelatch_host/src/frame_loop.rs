//! # Frame Loop
//!
//! Paces frames against a fixed budget and keeps the books on what each
//! frame's drain did.
//!
//! ```text
//!   next_due ─┬─ budget ─┬─ budget ─┬─ budget ─┬──>
//!             │ frame 0  │ frame 1  │ (late)   │ frame 3 ...
//!                                    └─ missed deadline: re-anchor to now,
//!                                       never burst to catch up
//! ```
//!
//! A late frame does not queue up extra frames. Each frame drains the
//! coalescer once, so catching up would mean several drains back to back
//! with nothing requested in between.

use std::time::{Duration, Instant};

use framelatch_core::DrainOutcome;

/// Per-frame bookkeeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames finished.
    pub frames: u64,
    /// Frames whose drain ran at least one action.
    pub drained_frames: u64,
    /// Actions run across all drains.
    pub actions_invoked: u64,
    /// Actions discarded by drains after the host stopped.
    pub actions_dropped: u64,
    /// Frames that overran the budget.
    pub late_frames: u64,
    /// Longest frame, update and drain together.
    pub worst_frame: Duration,
}

/// Fixed-budget frame pacer.
#[derive(Debug)]
pub struct FrameLoop {
    budget: Duration,
    next_due: Instant,
    stats: FrameStats,
}

impl FrameLoop {
    /// Creates a pacer for `tick_rate` frames per second. The first frame is
    /// due immediately.
    ///
    /// A rate of zero is treated as 1 Hz.
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        Self {
            budget: Duration::from_secs(1) / tick_rate.max(1),
            next_due: Instant::now(),
            stats: FrameStats::default(),
        }
    }

    /// Time allowed per frame.
    #[must_use]
    pub const fn budget(&self) -> Duration {
        self.budget
    }

    /// Returns true once the next frame's deadline has passed.
    #[must_use]
    pub fn is_due(&self) -> bool {
        Instant::now() >= self.next_due
    }

    /// Sleeps until the next frame is due.
    pub fn wait_until_due(&self) {
        let now = Instant::now();
        if now < self.next_due {
            std::thread::sleep(self.next_due - now);
        }
    }

    /// Marks the start of a frame.
    #[must_use]
    pub fn begin_frame(&self) -> Instant {
        Instant::now()
    }

    /// Records a finished frame and schedules the next one.
    pub fn finish_frame(&mut self, started: Instant, outcome: &DrainOutcome) {
        let now = Instant::now();
        let elapsed = now.duration_since(started);

        self.stats.frames += 1;
        self.stats.worst_frame = self.stats.worst_frame.max(elapsed);
        if elapsed > self.budget {
            self.stats.late_frames += 1;
        }

        if self.tally(outcome) {
            self.stats.drained_frames += 1;
        }

        self.next_due += self.budget;
        if self.next_due < now {
            self.next_due = now;
        }
    }

    /// Records the drain that runs after the last frame, outside any budget.
    pub fn record_shutdown(&mut self, outcome: &DrainOutcome) {
        self.tally(outcome);
    }

    /// Adds `outcome` to the action counters. Returns true if anything ran.
    fn tally(&mut self, outcome: &DrainOutcome) -> bool {
        match *outcome {
            DrainOutcome::Ran { invoked, .. } if invoked > 0 => {
                self.stats.actions_invoked += invoked as u64;
                true
            }
            DrainOutcome::Dropped { count } => {
                self.stats.actions_dropped += count as u64;
                false
            }
            _ => false,
        }
    }

    /// Frame bookkeeping so far.
    #[must_use]
    pub const fn stats(&self) -> &FrameStats {
        &self.stats
    }
}
