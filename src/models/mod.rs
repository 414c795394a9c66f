//! Built-in model implementations.
//!
//! These are small, self-contained [`Model`](crate::Model) implementations
//! used by the tests, benchmarks, and demos. They double as reference
//! material for binding a real generated model behind the pin-accessor
//! contract.

pub mod combo;
pub mod stream_fifo;
pub mod timer;

pub use combo::{Adder, Wire};
pub use stream_fifo::StreamFifo;
pub use timer::Metronome;
