//! A clocked stream register slice.
//!
//! [`StreamFifo`] is a single-slot valid/ready handshake stage: data beats
//! presented on the `s_*` pins are captured on the rising clock edge when
//! the slot can accept them, and drained through the `m_*` pins when the
//! consumer asserts ready. An optional event output pulses high for one
//! clock cycle each time the accepted-beat count reaches a multiple of a
//! configured threshold.
//!
//! Edge detection lives inside `eval()`: the model keeps the clock level it
//! saw last and performs its sequential update only on a low-to-high
//! transition, so repeated `eval()` calls with unchanged inputs are no-ops
//! apart from recomputing the combinational outputs.

use crate::model::Model;
use crate::types::PinId;

/// Single-slot AXI-stream-style register slice.
#[derive(Clone, Debug, Default)]
pub struct StreamFifo {
    // Input pin cells.
    clk: bool,
    rst: bool,
    s_tvalid: bool,
    s_tdata: u64,
    m_tready: bool,

    // Registered state.
    last_clk: bool,
    full: bool,
    data: u64,
    accepted: u64,
    event_out: bool,

    /// Pulse `EVENT_OUT` each time `accepted` hits a multiple of this;
    /// zero disables the pulse output.
    threshold: u64,
    /// Report `finished()` once this many beats were accepted.
    finish_after: Option<u64>,
}

impl StreamFifo {
    pub const CLK: PinId = 0;
    pub const RST: PinId = 1;
    pub const S_TVALID: PinId = 2;
    pub const S_TDATA: PinId = 3;
    pub const S_TREADY: PinId = 4;
    pub const M_TVALID: PinId = 5;
    pub const M_TDATA: PinId = 6;
    pub const M_TREADY: PinId = 7;
    pub const EVENT_OUT: PinId = 8;

    pub fn new() -> Self {
        Self::default()
    }

    /// Pulses `EVENT_OUT` for one clock cycle every `beats` accepted beats.
    pub fn with_event_every(mut self, beats: u64) -> Self {
        self.threshold = beats;
        self
    }

    /// Reports `finished()` after accepting `beats` beats.
    pub fn with_finish_after(mut self, beats: u64) -> Self {
        self.finish_after = Some(beats);
        self
    }

    /// Total beats accepted since the last reset.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    fn s_tready(&self) -> bool {
        // Can accept when empty, or when the slot drains this cycle.
        !self.full || self.m_tready
    }
}

impl Model for StreamFifo {
    fn eval(&mut self) {
        let rising = self.clk && !self.last_clk;
        self.last_clk = self.clk;

        if self.rst {
            self.full = false;
            self.data = 0;
            self.accepted = 0;
            self.event_out = false;
        } else if rising {
            if self.full && self.m_tready {
                self.full = false;
            }
            self.event_out = false;
            if !self.full && self.s_tvalid {
                self.data = self.s_tdata;
                self.full = true;
                self.accepted += 1;
                if self.threshold != 0 && self.accepted % self.threshold == 0 {
                    self.event_out = true;
                }
            }
        }
    }

    fn finished(&self) -> bool {
        self.finish_after
            .map(|beats| self.accepted >= beats)
            .unwrap_or(false)
    }

    fn read_pin(&self, pin: PinId) -> u64 {
        match pin {
            Self::CLK => self.clk as u64,
            Self::RST => self.rst as u64,
            Self::S_TVALID => self.s_tvalid as u64,
            Self::S_TDATA => self.s_tdata,
            Self::S_TREADY => self.s_tready() as u64,
            Self::M_TVALID => self.full as u64,
            Self::M_TDATA => self.data,
            Self::M_TREADY => self.m_tready as u64,
            Self::EVENT_OUT => self.event_out as u64,
            _ => panic!("stream fifo has no pin {pin}"),
        }
    }

    fn write_pin(&mut self, pin: PinId, value: u64) {
        match pin {
            Self::CLK => self.clk = value != 0,
            Self::RST => self.rst = value != 0,
            Self::S_TVALID => self.s_tvalid = value != 0,
            Self::S_TDATA => self.s_tdata = value,
            Self::M_TREADY => self.m_tready = value != 0,
            _ => panic!("stream fifo pin {pin} is not writable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_edge(fifo: &mut StreamFifo) {
        fifo.write_pin(StreamFifo::CLK, 0);
        fifo.eval();
        fifo.write_pin(StreamFifo::CLK, 1);
        fifo.eval();
    }

    #[test]
    fn test_accepts_on_rising_edge() {
        let mut fifo = StreamFifo::new();
        fifo.write_pin(StreamFifo::S_TVALID, 1);
        fifo.write_pin(StreamFifo::S_TDATA, 0x42);

        assert_eq!(fifo.read_pin(StreamFifo::M_TVALID), 0);
        clock_edge(&mut fifo);

        assert_eq!(fifo.read_pin(StreamFifo::M_TVALID), 1);
        assert_eq!(fifo.read_pin(StreamFifo::M_TDATA), 0x42);
        assert_eq!(fifo.accepted(), 1);
    }

    #[test]
    fn test_eval_without_edge_is_idempotent() {
        let mut fifo = StreamFifo::new();
        fifo.write_pin(StreamFifo::S_TVALID, 1);
        fifo.write_pin(StreamFifo::S_TDATA, 7);
        clock_edge(&mut fifo);

        fifo.eval();
        fifo.eval();
        assert_eq!(fifo.accepted(), 1);
    }

    #[test]
    fn test_backpressure() {
        let mut fifo = StreamFifo::new();
        fifo.write_pin(StreamFifo::S_TVALID, 1);
        fifo.write_pin(StreamFifo::S_TDATA, 1);
        clock_edge(&mut fifo);

        // Slot full, consumer not ready: tready low, next beat not taken.
        assert_eq!(fifo.read_pin(StreamFifo::S_TREADY), 0);
        fifo.write_pin(StreamFifo::S_TDATA, 2);
        clock_edge(&mut fifo);
        assert_eq!(fifo.read_pin(StreamFifo::M_TDATA), 1);
        assert_eq!(fifo.accepted(), 1);

        // Consumer drains; the pending beat lands on the same edge.
        fifo.write_pin(StreamFifo::M_TREADY, 1);
        assert_eq!(fifo.read_pin(StreamFifo::S_TREADY), 1);
        clock_edge(&mut fifo);
        assert_eq!(fifo.read_pin(StreamFifo::M_TDATA), 2);
        assert_eq!(fifo.accepted(), 2);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut fifo = StreamFifo::new();
        fifo.write_pin(StreamFifo::S_TVALID, 1);
        fifo.write_pin(StreamFifo::S_TDATA, 9);
        clock_edge(&mut fifo);
        assert_eq!(fifo.accepted(), 1);

        fifo.write_pin(StreamFifo::RST, 1);
        fifo.eval();
        assert_eq!(fifo.read_pin(StreamFifo::M_TVALID), 0);
        assert_eq!(fifo.accepted(), 0);
    }

    #[test]
    fn test_event_pulses_every_threshold_beats() {
        let mut fifo = StreamFifo::new().with_event_every(2);
        fifo.write_pin(StreamFifo::S_TVALID, 1);
        fifo.write_pin(StreamFifo::M_TREADY, 1);

        let mut pulses = Vec::new();
        for beat in 1..=4u64 {
            fifo.write_pin(StreamFifo::S_TDATA, beat);
            clock_edge(&mut fifo);
            if fifo.read_pin(StreamFifo::EVENT_OUT) != 0 {
                pulses.push(beat);
            }
        }
        assert_eq!(pulses, vec![2, 4]);
    }

    #[test]
    fn test_finish_after() {
        let mut fifo = StreamFifo::new().with_finish_after(2);
        fifo.write_pin(StreamFifo::S_TVALID, 1);
        fifo.write_pin(StreamFifo::M_TREADY, 1);

        clock_edge(&mut fifo);
        assert!(!fifo.finished());
        clock_edge(&mut fifo);
        assert!(fifo.finished());
    }
}
