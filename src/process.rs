//! The process table.
//!
//! A process is a named callback bound either to an explicit sensitivity
//! set of observables or flagged always-active. Sensitivity edges live on
//! the observables' dependent lists; the process itself only carries its
//! callback, its always flag, and the per-delta triggered flag the React
//! phase drives.
//!
//! Per-process state (send counters, FSM variables) belongs inside the
//! closure moved in at registration: the closure is the registration
//! context, so lifetime and ownership stay explicit instead of leaking
//! through captured locals.

use crate::model::Model;
use crate::scheduler::SimCtx;

/// Callback type for registered processes.
pub type ProcessFn<M> = Box<dyn FnMut(&mut SimCtx<M>)>;

pub(crate) struct Process<M: Model> {
    pub(crate) name: String,
    pub(crate) callback: ProcessFn<M>,
    /// Runs every delta regardless of triggers.
    pub(crate) always: bool,
    /// Set by the React phase when a watched observable changed; cleared at
    /// the start of every React phase.
    pub(crate) triggered: bool,
}

impl<M: Model> Process<M> {
    pub(crate) fn new(name: String, callback: ProcessFn<M>, always: bool) -> Self {
        Self {
            name,
            callback,
            always,
            triggered: false,
        }
    }
}

impl<M: Model> std::fmt::Debug for Process<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Process")
            .field("name", &self.name)
            .field("always", &self.always)
            .field("triggered", &self.triggered)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Wire;

    #[test]
    fn test_process_debug() {
        let proc: Process<Wire> = Process::new("driver".to_string(), Box::new(|_| {}), false);
        let repr = format!("{proc:?}");
        assert!(repr.contains("driver"));
        assert!(repr.contains("always: false"));
    }
}
