//! # Frame Demo
//!
//! Drives a coalescer for a few seconds with noisy producers and prints how
//! much work was saved.
//!
//! ## Usage
//!
//! ```bash
//! frame_demo --config config/framelatch.toml --frames 300 --tick-rate 120
//! ```

use std::process::ExitCode;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use framelatch_core::FrameAction;
use framelatch_host::{FrameDriver, FramelatchConfig};

fn print_usage() {
    println!("Usage: frame_demo [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>        TOML config file (default: built-in defaults)");
    println!("  -f, --frames <N>           Frames to run (default: config, else 180)");
    println!("  -t, --tick-rate <RATE>     Frames per second (default: config, else 60)");
    println!("  -h, --help                 Print this help");
}

fn counter_action(counter: &Arc<AtomicU64>) -> FrameAction {
    let counter = Arc::clone(counter);
    FrameAction::new(move || {
        counter.fetch_add(1, Ordering::Relaxed);
    })
}

/// Command line options.
#[derive(Debug, Default, PartialEq, Eq)]
struct DemoArgs {
    config_path: Option<String>,
    frames: Option<u64>,
    tick_rate: Option<u32>,
}

/// Parses the value that follows `flag`.
fn flag_value<T: FromStr>(flag: &str, value: Option<&String>) -> Result<T, String> {
    let value = value.ok_or_else(|| format!("{flag} needs a value"))?;
    value
        .parse()
        .map_err(|_| format!("invalid value for {flag}: {value:?}"))
}

/// Parses `args` (program name excluded). `Ok(None)` means help was asked for.
fn parse_args(args: &[String]) -> Result<Option<DemoArgs>, String> {
    let mut parsed = DemoArgs::default();
    let mut args = args.iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => parsed.config_path = Some(flag_value(arg, args.next())?),
            "--frames" | "-f" => parsed.frames = Some(flag_value(arg, args.next())?),
            "--tick-rate" | "-t" => parsed.tick_rate = Some(flag_value(arg, args.next())?),
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    Ok(Some(parsed))
}

fn main() -> ExitCode {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         FRAMELATCH DEMO                                          ║");
    println!("║         ONCE PER FRAME, NO MATTER WHO ASKS                       ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    // Simple parsing, no external deps
    let args: Vec<String> = std::env::args().skip(1).collect();
    let DemoArgs {
        config_path,
        frames,
        tick_rate,
    } = match parse_args(&args) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("frame_demo error: {err}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let mut config = match config_path {
        Some(path) => match FramelatchConfig::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("frame_demo error: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => FramelatchConfig::default(),
    };
    if let Some(rate) = tick_rate {
        config.frame_loop.tick_rate = rate;
    }
    config.frame_loop.max_frames = frames.or(config.frame_loop.max_frames).or(Some(180));

    let mut driver = match FrameDriver::new(&config) {
        Ok(driver) => driver,
        Err(err) => {
            eprintln!("frame_demo error: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "[demo] tick_rate={} max_frames={:?} reentry={:?}",
        config.frame_loop.tick_rate, config.frame_loop.max_frames, config.coalescer.reentry
    );

    let hud_rebuilds = Arc::new(AtomicU64::new(0));
    let autosaves = Arc::new(AtomicU64::new(0));
    let rebuild_hud = counter_action(&hud_rebuilds);
    let autosave = counter_action(&autosaves);
    let mut naive_rebuilds = 0u64;

    let started = Instant::now();
    let ran = driver.run(|ctx| {
        // Inventory, health and gold systems each want the HUD rebuilt.
        let noisy = 1 + ctx.frame % 5;
        for _ in 0..noisy {
            ctx.request_once_per_frame(&rebuild_hud);
            naive_rebuilds += 1;
        }
        if ctx.frame % 30 == 0 {
            ctx.request_once_per_frame(&autosave);
            ctx.request_once_per_frame(&autosave);
        }
    });
    let elapsed = started.elapsed();

    let coalescer = driver.coalescer();
    let stats = coalescer.stats();
    let timing = driver.frame_loop().stats();

    println!();
    println!("=== FRAMELATCH Summary ===");
    println!("Frames:           {ran} in {elapsed:.2?}");
    println!("Requests:         {}", stats.requests);
    println!("Coalesced:        {}", stats.coalesced);
    println!("Invoked:          {}", stats.invoked);
    println!(
        "HUD rebuilds:     {} (naive: {naive_rebuilds})",
        hud_rebuilds.load(Ordering::Relaxed)
    );
    println!("Autosaves:        {}", autosaves.load(Ordering::Relaxed));
    println!(
        "Drained frames:   {} of {}",
        timing.drained_frames, timing.frames
    );
    println!("Dropped at stop:  {}", timing.actions_dropped);
    println!(
        "Frame time:       worst {:.2?} (budget {:.2?}), {} late",
        timing.worst_frame,
        driver.frame_loop().budget(),
        timing.late_frames
    );

    ExitCode::SUCCESS
}
