//! A model with an internally scheduled event stream.
//!
//! The [`Metronome`] toggles its output pin on a fixed period using the
//! model-side event schedule (`events_pending`/`next_time_slot`) rather
//! than testbench stimulus, so it exercises the scheduler's second event
//! domain.

use crate::model::Model;
use crate::types::{PinId, SimTime};

/// Toggles its output every `period` time units, a fixed number of times.
#[derive(Clone, Debug)]
pub struct Metronome {
    period: SimTime,
    next_fire: SimTime,
    now: SimTime,
    cycles_left: u32,
    level: bool,
}

impl Metronome {
    pub const OUT: PinId = 0;

    /// A metronome whose first toggle lands at `period` and which toggles
    /// `cycles` times in total.
    pub fn new(period: SimTime, cycles: u32) -> Self {
        Self {
            period,
            next_fire: period,
            now: 0,
            cycles_left: cycles,
            level: false,
        }
    }

    pub fn level(&self) -> bool {
        self.level
    }
}

impl Model for Metronome {
    fn eval(&mut self) {
        while self.cycles_left > 0 && self.next_fire <= self.now {
            self.level = !self.level;
            self.next_fire += self.period;
            self.cycles_left -= 1;
        }
    }

    fn events_pending(&self) -> bool {
        self.cycles_left > 0
    }

    fn next_time_slot(&self) -> SimTime {
        self.next_fire
    }

    fn set_time(&mut self, time: SimTime) {
        self.now = time;
    }

    fn read_pin(&self, pin: PinId) -> u64 {
        match pin {
            Self::OUT => self.level as u64,
            _ => panic!("metronome has no pin {pin}"),
        }
    }

    fn write_pin(&mut self, pin: PinId, _value: u64) {
        panic!("metronome pin {pin} is not writable");
    }
}
