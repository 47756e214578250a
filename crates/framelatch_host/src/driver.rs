//! # Frame Driver
//!
//! Owns the frame loop and the coalescer, and fixes their order.
//!
//! ## Frame Order
//!
//! ```text
//! Frame N:
//! ┌──────────────────────────────────────────────────────────┐
//! │ 1. POLL COMMANDS   Stop -> clear run flag                │
//! │ 2. UPDATE          user code; may request actions        │
//! │ 3. DRAIN           coalescer.drain_pending_with(flag)    │
//! │                    every distinct request runs once      │
//! │ 4. WAIT            sleep until the next frame is due     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! A stop request is honored before the next update. Reaching `max_frames`
//! is treated as a stop. Either way the final drain sees a stopped flag, so
//! whatever is still pending is dropped, not run.

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use framelatch_core::{DrainOutcome, FrameAction, FrameCoalescer, RunFlag};

use crate::config::FramelatchConfig;
use crate::error::HostResult;
use crate::frame_loop::FrameLoop;

/// Commands accepted by a running driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverCommand {
    /// Stop after the current frame.
    Stop,
}

/// Cloneable remote control for a [`FrameDriver`].
#[derive(Clone, Debug)]
pub struct DriverHandle {
    commands: Sender<DriverCommand>,
}

impl DriverHandle {
    /// Asks the driver to stop. Returns false if the driver is gone.
    pub fn stop(&self) -> bool {
        self.commands.send(DriverCommand::Stop).is_ok()
    }
}

/// What the update phase of one frame sees.
#[derive(Debug)]
pub struct FrameContext<'a> {
    /// Frame number, starting at 0.
    pub frame: u64,
    /// The coalescer drained at the end of this frame.
    pub coalescer: &'a FrameCoalescer,
}

impl FrameContext<'_> {
    /// Requests `action` for this frame's boundary.
    pub fn request_once_per_frame(&self, action: &FrameAction) {
        self.coalescer.request_once_per_frame(action);
    }
}

/// Result of one stepped frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame number.
    pub frame: u64,
    /// What the end-of-frame drain did.
    pub outcome: DrainOutcome,
}

/// Runs frames: update, then drain.
#[derive(Debug)]
pub struct FrameDriver {
    frame_loop: FrameLoop,
    coalescer: Arc<FrameCoalescer>,
    run_flag: RunFlag,
    commands_tx: Sender<DriverCommand>,
    commands_rx: Receiver<DriverCommand>,
    max_frames: Option<u64>,
    frame: u64,
}

impl FrameDriver {
    /// Creates a driver from a validated config.
    ///
    /// # Errors
    ///
    /// Returns an error if the config fails validation.
    pub fn new(config: &FramelatchConfig) -> HostResult<Self> {
        config.validate()?;
        let (commands_tx, commands_rx) = unbounded();

        Ok(Self {
            frame_loop: FrameLoop::new(config.frame_loop.tick_rate),
            coalescer: Arc::new(FrameCoalescer::new(config.coalescer.clone())),
            run_flag: RunFlag::new(),
            commands_tx,
            commands_rx,
            max_frames: config.frame_loop.max_frames,
            frame: 0,
        })
    }

    /// Shared handle to the coalescer, for producers outside the update phase.
    #[must_use]
    pub fn coalescer(&self) -> Arc<FrameCoalescer> {
        Arc::clone(&self.coalescer)
    }

    /// The run flag checked by every drain.
    #[must_use]
    pub fn run_flag(&self) -> RunFlag {
        self.run_flag.clone()
    }

    /// Remote control for this driver.
    #[must_use]
    pub fn handle(&self) -> DriverHandle {
        DriverHandle {
            commands: self.commands_tx.clone(),
        }
    }

    /// Frames stepped so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// The underlying frame loop (timing stats).
    #[must_use]
    pub const fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    /// Runs one frame immediately, ignoring the timestep.
    pub fn step(&mut self, update: impl FnOnce(&FrameContext<'_>)) -> FrameReport {
        let frame = self.frame;
        let ctx = FrameContext {
            frame,
            coalescer: self.coalescer.as_ref(),
        };
        update(&ctx);

        let outcome = self.coalescer.drain_pending_with(&self.run_flag);
        self.frame += 1;

        if outcome != DrainOutcome::Idle {
            tracing::trace!(frame, ?outcome, "frame drained");
        }
        FrameReport { frame, outcome }
    }

    /// Runs frames at the configured rate until `max_frames` is reached or
    /// a stop is requested. Returns the number of frames run.
    ///
    /// Both exits end the same way: the run flag is cleared and one last
    /// drain drops whatever is still pending, such as work an action queued
    /// during the final frame's drain. The coalescer is idle on return and
    /// the driver cannot be run again.
    pub fn run(&mut self, mut update: impl FnMut(&FrameContext<'_>)) -> u64 {
        let started = self.frame;
        tracing::info!(
            frame_budget = ?self.frame_loop.budget(),
            max_frames = ?self.max_frames,
            "frame driver started"
        );

        loop {
            self.poll_commands();

            if !self.run_flag.is_running() {
                tracing::info!(frame = self.frame, "stop requested");
                break;
            }

            if let Some(max) = self.max_frames {
                if self.frame >= max {
                    tracing::info!(frame = self.frame, "max_frames reached");
                    self.run_flag.stop();
                    break;
                }
            }

            self.frame_loop.wait_until_due();
            let frame_start = self.frame_loop.begin_frame();
            let report = self.step(&mut update);
            self.frame_loop.finish_frame(frame_start, &report.outcome);
        }

        let outcome = self.coalescer.drain_pending_with(&self.run_flag);
        self.frame_loop.record_shutdown(&outcome);
        tracing::info!(frame = self.frame, ?outcome, "frame driver stopped");

        self.frame - started
    }

    fn poll_commands(&mut self) {
        while let Ok(command) = self.commands_rx.try_recv() {
            match command {
                DriverCommand::Stop => self.run_flag.stop(),
            }
        }
    }
}
