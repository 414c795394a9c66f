//! Waveform trace recording.
//!
//! A [`Trace`] holds named probes over observables. The scheduler records
//! one sample per probe per wall-clock instant, after the delta loop for
//! that instant has converged, storing a new entry only when the value
//! differs from the last recorded one (plus the initial sample). The result
//! is a compact time-indexed waveform keyed to the same instants the
//! scheduler advanced through.

use serde::Serialize;

use crate::observable::Slot;
use crate::types::{ObservableId, SimTime};

#[derive(Clone, Debug, Serialize)]
struct Probe {
    name: String,
    id: ObservableId,
    /// Change-only samples: `(instant, bit pattern)`.
    samples: Vec<(SimTime, u64)>,
}

/// A set of named probes and their recorded waveforms.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Trace {
    probes: Vec<Probe>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a probe over the given observable.
    pub(crate) fn watch(&mut self, name: impl Into<String>, id: ObservableId) {
        self.probes.push(Probe {
            name: name.into(),
            id,
            samples: Vec::new(),
        });
    }

    /// Records the current value of every probe at `time`.
    ///
    /// Called once per converged instant; stores only changes.
    pub(crate) fn record(&mut self, time: SimTime, slots: &[Slot]) {
        for probe in &mut self.probes {
            let bits = slots[probe.id].value;
            let is_new = probe
                .samples
                .last()
                .map(|&(_, last)| last != bits)
                .unwrap_or(true);
            if is_new {
                probe.samples.push((time, bits));
            }
        }
    }

    /// The recorded samples of a probe, by name.
    pub fn samples(&self, name: &str) -> Option<&[(SimTime, u64)]> {
        self.probes
            .iter()
            .find(|probe| probe.name == name)
            .map(|probe| probe.samples.as_slice())
    }

    /// The probe's value as of `time`: the last sample at or before it.
    pub fn value_at(&self, name: &str, time: SimTime) -> Option<u64> {
        let samples = self.samples(name)?;
        samples
            .iter()
            .take_while(|&&(t, _)| t <= time)
            .last()
            .map(|&(_, bits)| bits)
    }

    /// Number of registered probes.
    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }

    /// Exports all probes and samples as JSON.
    pub fn export(&self) -> serde_json::Value {
        let probes: Vec<serde_json::Value> = self
            .probes
            .iter()
            .map(|probe| {
                serde_json::json!({
                    "name": probe.name,
                    "samples": probe.samples,
                })
            })
            .collect();
        serde_json::json!({ "probes": probes })
    }
}
