//! # FRAMELATCH Host
//!
//! Reference host loop for the frame coalescer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 FrameDriver                  │
//! │                                              │
//! │  ┌───────────┐   ┌──────────────────────┐    │
//! │  │ FrameLoop │   │ Arc<FrameCoalescer>  │<───┼── producers
//! │  │ (timing)  │   │ (pending set + flag) │    │
//! │  └───────────┘   └──────────────────────┘    │
//! │        │                    ▲                │
//! │        └── tick ── update ──┴── drain        │
//! │                                              │
//! │  RunFlag <── DriverHandle::stop (channel)    │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use framelatch_host::{FrameDriver, FramelatchConfig};
//!
//! let config = FramelatchConfig::from_file("framelatch.toml")?;
//! let mut driver = FrameDriver::new(&config)?;
//! driver.run(|ctx| {
//!     ctx.request_once_per_frame(&rebuild_ui);
//! });
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod driver;
pub mod error;
pub mod frame_loop;

pub use config::{FrameLoopConfig, FramelatchConfig};
pub use driver::{DriverCommand, DriverHandle, FrameContext, FrameDriver, FrameReport};
pub use error::{HostError, HostResult};
pub use frame_loop::{FrameLoop, FrameStats};

/// Default frame rate (updates per second).
///
/// At 60Hz, each frame is ~16.67ms.
pub const DEFAULT_TICK_RATE: u32 = 60;
