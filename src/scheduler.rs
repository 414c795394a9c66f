//! The scheduler kernel.
//!
//! The [`Scheduler`] owns the time wheel, every observable, every process,
//! and the model, and it is the sole mutator of simulated time. Its run loop
//! interleaves wall-clock advancement with zero-time delta-cycle
//! convergence:
//!
//! 1. **Commit** — every input port and signal applies its staged write
//!    (`before ← value`, `value ← staged` if dirty), in registration order;
//!    input ports write through to their model pin.
//! 2. **Eval** — the model is stepped if anything committed dirty, if the
//!    model reports an internal event due at or before the current instant,
//!    or on the first delta of the instant.
//! 3. **Sample** — every output port re-reads its model pin.
//! 4. **React** — trigger flags are cleared, changed observables flag their
//!    dependents, and flagged or always-active processes run in
//!    registration order.
//! 5. **Converge** — the delta loop ends once no staged write remains;
//!    otherwise it repeats, bounded by the configured delta limit.
//!
//! Execution is single-threaded and cooperative. A process callback never
//! blocks; it runs to completion inside React and its effects (staged
//! writes, new timed events) are observed starting from the next Commit.

use thiserror::Error;
use tracing::{debug, error, info, trace};

use crate::config::SimParams;
use crate::model::Model;
use crate::observable::{Input, Observable, Output, PinValue, Signal, Slot, SlotKind, Writable};
use crate::process::Process;
use crate::stats::SchedulerStats;
use crate::trace::Trace;
use crate::types::{ObservableId, PinId, ProcessId, SimTime};
use crate::wheel::Wheel;

/// Delta iterations allowed per instant before the run aborts.
pub const DEFAULT_DELTA_LIMIT: u32 = 1000;

/// Errors surfaced by the scheduler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The delta loop failed to converge within the configured bound:
    /// an unbroken combinational feedback loop. Fatal; observable state is
    /// left as last committed.
    #[error("combinational loop at time {time}: {limit} delta cycles without convergence")]
    CombinationalLoop { time: SimTime, limit: u32 },

    /// A sensitivity list referenced an observable this scheduler never
    /// registered.
    #[error("sensitivity list references unbound observable {id}")]
    UnboundObservable { id: ObservableId },
}

/// Why a run loop ended. All three are normal terminal states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The model reported `finished()`.
    Finished,
    /// No timed events and no model-internal events remain.
    Idle,
    /// The next instant would exceed the configured time budget.
    TimeLimit,
}

/// Result of a completed run.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub stop: StopReason,
    pub final_time: SimTime,
    pub stats: SchedulerStats,
}

/// The mutable simulation state handed to timed actions and process
/// callbacks.
///
/// A callback may read any observable, stage writes through
/// [`write`](SimCtx::write), and schedule further timed actions; it may not
/// mutate another observable's internals directly, which preserves the
/// single-writer-per-phase discipline.
pub struct SimCtx<M: Model> {
    model: M,
    slots: Vec<Slot>,
    wheel: Wheel<M>,
    current_time: SimTime,
    stats: SchedulerStats,
}

impl<M: Model> SimCtx<M> {
    fn new(model: M) -> Self {
        Self {
            model,
            slots: Vec::new(),
            wheel: Wheel::new(),
            current_time: 0,
            stats: SchedulerStats::default(),
        }
    }

    /// The current simulated instant.
    pub fn now(&self) -> SimTime {
        self.current_time
    }

    /// The committed value of an observable.
    ///
    /// Staged writes are never visible here until the next commit phase.
    pub fn val<T: PinValue>(&self, obs: impl Observable<T>) -> T {
        T::from_bits(self.slots[obs.id()].value)
    }

    /// The value prior to the last commit or sample.
    pub fn prev<T: PinValue>(&self, obs: impl Observable<T>) -> T {
        T::from_bits(self.slots[obs.id()].before)
    }

    /// Whether the observable's value differs from its previous value.
    ///
    /// Transitions are reported strictly between the two most recent
    /// committed/sampled values; no deeper history is retained.
    pub fn changed<T: PinValue>(&self, obs: impl Observable<T>) -> bool {
        self.slots[obs.id()].changed()
    }

    /// Zero-to-nonzero transition of the last commit or sample.
    pub fn posedge<T: PinValue>(&self, obs: impl Observable<T>) -> bool {
        self.slots[obs.id()].posedge()
    }

    /// Nonzero-to-zero transition of the last commit or sample.
    pub fn negedge<T: PinValue>(&self, obs: impl Observable<T>) -> bool {
        self.slots[obs.id()].negedge()
    }

    /// Whether a staged write is pending application.
    pub fn dirty<T: PinValue>(&self, obs: impl Observable<T>) -> bool {
        self.slots[obs.id()].dirty
    }

    /// Stages a write. The value becomes visible at the next commit phase.
    pub fn write<T: PinValue>(&mut self, obs: impl Writable<T>, value: T) {
        self.slots[obs.id()].write(value.to_bits());
    }

    /// Enqueues an action for the given absolute time.
    pub fn schedule_at<F>(&mut self, time: SimTime, action: F)
    where
        F: FnOnce(&mut SimCtx<M>) + 'static,
    {
        self.wheel.push(time, Box::new(action));
    }

    /// Enqueues an action `delay` time units from now.
    pub fn schedule_after<F>(&mut self, delay: SimTime, action: F)
    where
        F: FnOnce(&mut SimCtx<M>) + 'static,
    {
        let time = self.current_time + delay;
        self.wheel.push(time, Box::new(action));
    }

    /// Read access to the model under test.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mutable access to the model under test.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Counters collected so far.
    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Commit phase: applies staged writes in registration order, writing
    /// through to model pins for input ports. Returns whether any write was
    /// applied.
    fn commit_all(&mut self) -> bool {
        let mut committed = false;
        for slot in &mut self.slots {
            match slot.kind {
                SlotKind::Input { pin } => {
                    if slot.commit() {
                        self.model.write_pin(pin, slot.value);
                        self.stats.writes_committed += 1;
                        committed = true;
                    }
                }
                SlotKind::Signal => {
                    if slot.commit() {
                        self.stats.writes_committed += 1;
                        committed = true;
                    }
                }
                SlotKind::Output { .. } => {}
            }
        }
        committed
    }

    /// Sample phase: re-reads every output port from its model pin.
    fn sample_all(&mut self) {
        for slot in &mut self.slots {
            if let SlotKind::Output { pin } = slot.kind {
                slot.sample(self.model.read_pin(pin));
            }
        }
    }

    fn any_dirty(&self) -> bool {
        self.slots.iter().any(|slot| slot.dirty)
    }

    fn model_event_due(&self) -> bool {
        self.model.events_pending() && self.model.next_time_slot() <= self.current_time
    }
}

/// The discrete-event testbench scheduler.
///
/// Observables and processes are registered during a one-time setup phase;
/// [`run`](Scheduler::run) then drives the model until a terminal state.
///
/// # Example
///
/// ```
/// use deltabench::models::Wire;
/// use deltabench::{Scheduler, StopReason};
///
/// let mut sched = Scheduler::new(Wire::new());
/// let din = sched.bind_input::<u8>(Wire::IN);
/// let dout = sched.bind_output::<u8>(Wire::OUT);
///
/// sched.schedule_at(10, move |ctx| ctx.write(din, 0x42));
///
/// let summary = sched.run().unwrap();
/// assert_eq!(summary.stop, StopReason::Idle);
/// assert_eq!(sched.ctx().val(dout), 0x42);
/// ```
pub struct Scheduler<M: Model> {
    ctx: SimCtx<M>,
    procs: Vec<Process<M>>,
    max_time: Option<SimTime>,
    delta_limit: u32,
    trace: Trace,
}

impl<M: Model> Scheduler<M> {
    /// Creates a scheduler around a model, with no time budget and the
    /// default delta limit.
    pub fn new(model: M) -> Self {
        Self {
            ctx: SimCtx::new(model),
            procs: Vec::new(),
            max_time: None,
            delta_limit: DEFAULT_DELTA_LIMIT,
            trace: Trace::new(),
        }
    }

    /// Sets the maximum simulated time budget.
    pub fn with_max_time(mut self, max_time: SimTime) -> Self {
        self.max_time = Some(max_time);
        self
    }

    /// Sets the per-instant delta iteration bound.
    pub fn with_delta_limit(mut self, limit: u32) -> Self {
        self.delta_limit = limit;
        self
    }

    /// Applies run parameters loaded from a configuration file.
    pub fn configure(&mut self, params: &SimParams) {
        self.max_time = params.max_time;
        self.delta_limit = params.delta_limit;
    }

    // ===== Setup: observables =====

    /// Binds an input port to a model pin.
    ///
    /// The port's initial value is read from the pin at binding time.
    pub fn bind_input<T: PinValue>(&mut self, pin: PinId) -> Input<T> {
        let init = self.ctx.model.read_pin(pin);
        let id = self.push_slot(SlotKind::Input { pin }, init);
        Input::from_id(id)
    }

    /// Binds an output port to a model pin.
    pub fn bind_output<T: PinValue>(&mut self, pin: PinId) -> Output<T> {
        let init = self.ctx.model.read_pin(pin);
        let id = self.push_slot(SlotKind::Output { pin }, init);
        Output::from_id(id)
    }

    /// Registers a testbench-internal signal with the given initial value.
    pub fn signal<T: PinValue>(&mut self, init: T) -> Signal<T> {
        let id = self.push_slot(SlotKind::Signal, init.to_bits());
        Signal::from_id(id)
    }

    fn push_slot(&mut self, kind: SlotKind, init: u64) -> ObservableId {
        let id = self.ctx.slots.len();
        self.ctx.slots.push(Slot::new(kind, init));
        id
    }

    // ===== Setup: processes =====

    /// Registers a process sensitive to a set of observables.
    ///
    /// The process fires in a delta if and only if one of the watched
    /// observables changed at the start of that delta's React phase.
    /// Registration order defines firing order; sensitivity edges are
    /// immutable after this call.
    ///
    /// Fails fast with [`SchedulerError::UnboundObservable`] if a
    /// sensitivity entry does not refer to an observable registered with
    /// this scheduler.
    pub fn process<F>(
        &mut self,
        name: impl Into<String>,
        sensitivity: &[ObservableId],
        callback: F,
    ) -> Result<ProcessId, SchedulerError>
    where
        F: FnMut(&mut SimCtx<M>) + 'static,
    {
        for &id in sensitivity {
            if id >= self.ctx.slots.len() {
                return Err(SchedulerError::UnboundObservable { id });
            }
        }

        let pid = self.procs.len();
        for &id in sensitivity {
            self.ctx.slots[id].dependents.push(pid);
        }
        self.procs
            .push(Process::new(name.into(), Box::new(callback), false));
        Ok(pid)
    }

    /// Registers a process that runs every delta, regardless of triggers.
    pub fn always<F>(&mut self, name: impl Into<String>, callback: F) -> ProcessId
    where
        F: FnMut(&mut SimCtx<M>) + 'static,
    {
        let pid = self.procs.len();
        self.procs
            .push(Process::new(name.into(), Box::new(callback), true));
        pid
    }

    // ===== Setup: timed events and trace probes =====

    /// Enqueues an action for the given absolute time.
    pub fn schedule_at<F>(&mut self, time: SimTime, action: F)
    where
        F: FnOnce(&mut SimCtx<M>) + 'static,
    {
        self.ctx.schedule_at(time, action);
    }

    /// Enqueues an action `delay` time units from now.
    pub fn schedule_after<F>(&mut self, delay: SimTime, action: F)
    where
        F: FnOnce(&mut SimCtx<M>) + 'static,
    {
        self.ctx.schedule_after(delay, action);
    }

    /// Records the named observable in the waveform trace, one sample per
    /// converged instant, stored only on change.
    pub fn watch<T: PinValue>(&mut self, name: impl Into<String>, obs: impl Observable<T>) {
        self.trace.watch(name, obs.id());
    }

    // ===== Run loop =====

    /// Runs until the model finishes, all event sources drain, or the time
    /// budget is exhausted — whichever comes first.
    pub fn run(&mut self) -> Result<RunSummary, SchedulerError> {
        debug!(
            observables = self.ctx.slots.len(),
            processes = self.procs.len(),
            max_time = ?self.max_time,
            "starting run"
        );

        let stop = loop {
            if let Some(stop) = self.step()? {
                break stop;
            }
        };

        info!(
            stop = ?stop,
            time = self.ctx.current_time,
            instants = self.ctx.stats.instants,
            deltas = self.ctx.stats.deltas_run,
            "run stopped"
        );

        Ok(RunSummary {
            stop,
            final_time: self.ctx.current_time,
            stats: self.ctx.stats.clone(),
        })
    }

    /// Advances through a single instant.
    ///
    /// Returns `Ok(Some(reason))` when a terminal state is reached instead,
    /// leaving time unchanged.
    pub fn step(&mut self) -> Result<Option<StopReason>, SchedulerError> {
        if self.ctx.model.finished() {
            return Ok(Some(StopReason::Finished));
        }

        let next = match self.next_instant() {
            Some(next) => next,
            None => return Ok(Some(StopReason::Idle)),
        };

        if let Some(max_time) = self.max_time {
            if next > max_time {
                return Ok(Some(StopReason::TimeLimit));
            }
        }

        self.ctx.current_time = next;
        self.ctx.stats.instants += 1;
        self.ctx.model.set_time(next);
        self.run_instant()?;
        Ok(None)
    }

    /// Resolves the next wall-clock instant as the minimum of the earliest
    /// wheel event and the model's next internal event.
    fn next_instant(&self) -> Option<SimTime> {
        let wheel_next = self.ctx.wheel.next_time();
        let model_next = if self.ctx.model.events_pending() {
            Some(self.ctx.model.next_time_slot())
        } else {
            None
        };

        let next = match (wheel_next, model_next) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => return None,
        };

        // Instants are strictly increasing: an action scheduled for a past
        // instant, or a model re-reporting an already serviced slot, fires
        // at the next instant instead of moving time backwards.
        if self.ctx.stats.instants > 0 && next <= self.ctx.current_time {
            Some(self.ctx.current_time + 1)
        } else {
            Some(next)
        }
    }

    /// Fires due timed events, then runs the delta loop to convergence.
    ///
    /// Actions scheduled during React for the current instant re-enter the
    /// event-firing phase before time advances; the delta counter spans the
    /// whole instant.
    fn run_instant(&mut self) -> Result<(), SchedulerError> {
        let now = self.ctx.current_time;
        let mut deltas: u32 = 0;

        loop {
            // All events due at this instant fire before the delta phase,
            // FIFO, including same-instant events chained by a firing
            // action.
            while let Some(action) = self.ctx.wheel.pop_due(now) {
                action(&mut self.ctx);
                self.ctx.stats.timed_events_fired += 1;
            }

            loop {
                if deltas >= self.delta_limit {
                    error!(
                        time = now,
                        limit = self.delta_limit,
                        "combinational loop: delta limit exceeded"
                    );
                    return Err(SchedulerError::CombinationalLoop {
                        time: now,
                        limit: self.delta_limit,
                    });
                }
                trace!(time = now, delta = deltas, "delta cycle");
                let first = deltas == 0;
                deltas += 1;

                let committed = self.ctx.commit_all();

                if committed || first || self.ctx.model_event_due() {
                    self.ctx.model.eval();
                    self.ctx.stats.model_evals += 1;
                }

                self.ctx.sample_all();

                self.react();

                if !self.ctx.any_dirty() {
                    break;
                }
            }

            if self.ctx.wheel.next_time() != Some(now) {
                break;
            }
        }

        self.ctx.stats.deltas_run += u64::from(deltas);
        self.ctx.stats.max_deltas_in_instant = self.ctx.stats.max_deltas_in_instant.max(deltas);
        self.trace.record(now, &self.ctx.slots);
        Ok(())
    }

    /// React phase: clears trigger flags, flags every dependent of a
    /// changed observable, then runs flagged and always-active processes in
    /// registration order.
    fn react(&mut self) {
        for proc in &mut self.procs {
            proc.triggered = false;
        }

        for slot in &self.ctx.slots {
            if slot.changed() {
                for &pid in &slot.dependents {
                    self.procs[pid].triggered = true;
                }
            }
        }

        for i in 0..self.procs.len() {
            if self.procs[i].triggered || self.procs[i].always {
                trace!(process = %self.procs[i].name, "process fires");
                (self.procs[i].callback)(&mut self.ctx);
                self.ctx.stats.process_activations += 1;
            }
        }
    }

    // ===== Accessors =====

    /// The current simulated instant.
    pub fn current_time(&self) -> SimTime {
        self.ctx.current_time
    }

    /// Read access to the simulation context.
    pub fn ctx(&self) -> &SimCtx<M> {
        &self.ctx
    }

    /// Mutable access to the simulation context (setup and inspection).
    pub fn ctx_mut(&mut self) -> &mut SimCtx<M> {
        &mut self.ctx
    }

    /// Read access to the model under test.
    pub fn model(&self) -> &M {
        self.ctx.model()
    }

    /// Counters collected so far.
    pub fn stats(&self) -> &SchedulerStats {
        &self.ctx.stats
    }

    /// The waveform trace recorded by registered probes.
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Exports scheduler state and counters as JSON.
    pub fn export_stats(&self) -> serde_json::Value {
        serde_json::json!({
            "scheduler": {
                "current_time": self.ctx.current_time,
                "observables": self.ctx.slots.len(),
                "processes": self.procs.len(),
                "pending_events": self.ctx.wheel.len(),
                "max_time": self.max_time,
                "delta_limit": self.delta_limit,
            },
            "counters": self.ctx.stats,
            "trace": self.trace.export(),
        })
    }
}
