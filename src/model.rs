//! The external model contract.
//!
//! A [`Model`] is the time-stepped design under verification. The scheduler
//! never reaches into model storage directly: every crossing between
//! testbench state and model state goes through the pin accessors, and the
//! only other entry points are `eval()` and `set_time()`.

use crate::types::{PinId, SimTime};

/// A time-stepped external model driven by the scheduler.
///
/// The scheduler consumes this interface in a fixed pattern per simulated
/// instant: it announces the new time via [`set_time`](Model::set_time),
/// writes committed input values through [`write_pin`](Model::write_pin),
/// steps the model with [`eval`](Model::eval), and reads outputs back with
/// [`read_pin`](Model::read_pin). Models with internally scheduled activity
/// (timers, delayed assignments) report it through
/// [`events_pending`](Model::events_pending) and
/// [`next_time_slot`](Model::next_time_slot) so the scheduler can resolve
/// the next instant as the minimum over both event domains.
pub trait Model {
    /// Advance the model's combinational/sequential evaluation given its
    /// current pin state.
    ///
    /// Must be idempotent when called again with unchanged inputs at the
    /// same time.
    fn eval(&mut self);

    /// Whether the model has internally scheduled future activity beyond
    /// what the scheduler drives.
    fn events_pending(&self) -> bool {
        false
    }

    /// Absolute time of the model's next internal event.
    ///
    /// Only meaningful while [`events_pending`](Model::events_pending)
    /// returns `true`.
    fn next_time_slot(&self) -> SimTime {
        SimTime::MAX
    }

    /// Model-side signal that the simulated run should stop.
    fn finished(&self) -> bool {
        false
    }

    /// Notifies the model that simulated time has advanced.
    ///
    /// Called once per instant, before any pin writes or `eval()` calls for
    /// that instant. Models without internal scheduling can ignore it.
    fn set_time(&mut self, _time: SimTime) {}

    /// Reads the current value of a model-exposed memory cell.
    fn read_pin(&self, pin: PinId) -> u64;

    /// Writes a value into a model-exposed memory cell.
    fn write_pin(&mut self, pin: PinId, value: u64);
}
