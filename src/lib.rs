//! # Deltabench
//!
//! A delta-cycle testbench scheduler for time-stepped hardware models.
//!
//! Deltabench drives an external [`Model`] (a design under verification)
//! through coordinated clock, reset, and data stimulus while observing its
//! outputs and reacting to value changes within the same simulated instant.
//!
//! ## Design Principles
//!
//! - **Staged writes**: testbench writes are deferred and applied by an
//!   explicit commit step, reproducing non-blocking-assignment semantics —
//!   a value written in one delta is never readable in that same delta.
//! - **Delta-cycle convergence**: each instant runs Commit → Eval → Sample
//!   → React until no staged write remains, bounded by a configurable
//!   limit that turns unbroken combinational feedback into a diagnostic
//!   instead of a hang.
//! - **Two event domains, one timeline**: the testbench time wheel and the
//!   model's internal event schedule are resolved to a single strictly
//!   increasing sequence of instants.
//! - **Deterministic ordering**: same-time events fire FIFO, processes fire
//!   in registration order, and all execution is single-threaded and
//!   cooperative.
//!
//! ## Quick Start
//!
//! ```rust
//! use deltabench::models::StreamFifo;
//! use deltabench::{Scheduler, SimCtx, StopReason};
//!
//! let mut sched = Scheduler::new(StreamFifo::new()).with_max_time(200);
//!
//! let clk = sched.bind_input::<bool>(StreamFifo::CLK);
//! let valid = sched.bind_input::<bool>(StreamFifo::S_TVALID);
//! let data = sched.bind_input::<u64>(StreamFifo::S_TDATA);
//! let out_valid = sched.bind_output::<bool>(StreamFifo::M_TVALID);
//!
//! // Free-running clock from a self-rescheduling timed event.
//! fn tick(ctx: &mut SimCtx<StreamFifo>, clk: deltabench::Input<bool>) {
//!     let level = ctx.val(clk);
//!     ctx.write(clk, !level);
//!     ctx.schedule_after(5, move |ctx| tick(ctx, clk));
//! }
//! sched.schedule_at(5, move |ctx| tick(ctx, clk));
//!
//! // Present one beat.
//! sched.schedule_at(12, move |ctx| {
//!     ctx.write(valid, true);
//!     ctx.write(data, 0x42);
//! });
//!
//! // React to the output going valid.
//! sched
//!     .process("monitor", &[out_valid.id()], move |ctx| {
//!         if ctx.posedge(out_valid) {
//!             println!("{}: beat captured", ctx.now());
//!         }
//!     })
//!     .unwrap();
//!
//! let summary = sched.run().unwrap();
//! assert_eq!(summary.stop, StopReason::TimeLimit);
//! assert!(sched.ctx().val(out_valid));
//! ```
//!
//! ## Configuration-Driven Runs
//!
//! ```rust,ignore
//! use deltabench::config::SimConfig;
//!
//! let config = SimConfig::from_file("run.yaml")?;
//! deltabench::init_logging(&config.simulation.log_level);
//! sched.configure(&config.simulation);
//! ```

pub mod config;
pub mod model;
pub mod models;
pub mod observable;
pub mod process;
pub mod scheduler;
pub mod stats;
pub mod trace;
pub mod types;
pub mod wheel;

// Re-export commonly used types
pub use config::{ConfigError, SimConfig, SimParams};
pub use model::Model;
pub use observable::{Input, Observable, Output, PinValue, Signal, Writable};
pub use scheduler::{
    RunSummary, Scheduler, SchedulerError, SimCtx, StopReason, DEFAULT_DELTA_LIMIT,
};
pub use stats::SchedulerStats;
pub use trace::Trace;
pub use types::{ObservableId, PinId, ProcessId, SimTime};

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging.
///
/// # Example
///
/// ```rust,ignore
/// deltabench::init_logging("debug");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
