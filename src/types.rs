//! Core type definitions for the testbench scheduler.
//!
//! This module defines the fundamental identifier types used throughout the
//! scheduler kernel.

/// Simulation time unit (e.g., nanoseconds or timeprecision ticks).
///
/// The time wheel, the model's internal event schedule, and the run budget
/// all use the same `SimTime` representation, giving one unified timeline.
pub type SimTime = u64;

/// Index of a process in the scheduler's process table.
///
/// Assigned in registration order; firing order within a delta cycle is
/// ascending `ProcessId`.
pub type ProcessId = usize;

/// Index of an observable (input port, output port, or signal) in the
/// scheduler's slot arena.
pub type ObservableId = usize;

/// Identifier of a model-exposed memory cell.
///
/// Each input or output port binds to exactly one pin at setup time and is
/// never rebound.
pub type PinId = u32;
