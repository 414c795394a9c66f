//! Purely combinational models.
//!
//! No internal state beyond the pin cells: every `eval()` recomputes the
//! outputs from the inputs, which makes these the simplest way to exercise
//! the commit/eval/sample pipeline in isolation.

use crate::model::Model;
use crate::types::PinId;

/// A wire: the output pin mirrors the input pin after every `eval()`.
#[derive(Clone, Debug, Default)]
pub struct Wire {
    input: u64,
    output: u64,
}

impl Wire {
    pub const IN: PinId = 0;
    pub const OUT: PinId = 1;

    pub fn new() -> Self {
        Self::default()
    }
}

impl Model for Wire {
    fn eval(&mut self) {
        self.output = self.input;
    }

    fn read_pin(&self, pin: PinId) -> u64 {
        match pin {
            Self::IN => self.input,
            Self::OUT => self.output,
            _ => panic!("wire has no pin {pin}"),
        }
    }

    fn write_pin(&mut self, pin: PinId, value: u64) {
        match pin {
            Self::IN => self.input = value,
            _ => panic!("wire pin {pin} is not writable"),
        }
    }
}

/// A wrapping adder: `SUM = A + B` after every `eval()`.
#[derive(Clone, Debug, Default)]
pub struct Adder {
    a: u64,
    b: u64,
    sum: u64,
}

impl Adder {
    pub const A: PinId = 0;
    pub const B: PinId = 1;
    pub const SUM: PinId = 2;

    pub fn new() -> Self {
        Self::default()
    }
}

impl Model for Adder {
    fn eval(&mut self) {
        self.sum = self.a.wrapping_add(self.b);
    }

    fn read_pin(&self, pin: PinId) -> u64 {
        match pin {
            Self::A => self.a,
            Self::B => self.b,
            Self::SUM => self.sum,
            _ => panic!("adder has no pin {pin}"),
        }
    }

    fn write_pin(&mut self, pin: PinId, value: u64) {
        match pin {
            Self::A => self.a = value,
            Self::B => self.b = value,
            _ => panic!("adder pin {pin} is not writable"),
        }
    }
}
