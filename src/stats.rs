//! Run counters.
//!
//! The scheduler keeps a small set of counters that describe how a run
//! unfolded; they back the JSON export and the loop-detection diagnostics.

use serde::{Deserialize, Serialize};

/// Counters collected over a run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SchedulerStats {
    /// Wall-clock instants advanced through.
    pub instants: u64,
    /// Delta cycles executed across all instants.
    pub deltas_run: u64,
    /// Largest number of delta cycles any single instant needed.
    pub max_deltas_in_instant: u32,
    /// Timed events fired from the wheel.
    pub timed_events_fired: u64,
    /// Model `eval()` calls.
    pub model_evals: u64,
    /// Process activations during React phases.
    pub process_activations: u64,
    /// Staged writes applied by commit phases.
    pub writes_committed: u64,
}
