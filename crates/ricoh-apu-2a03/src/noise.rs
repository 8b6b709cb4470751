//! Noise channel ($400C-$400F).

use crate::envelope::Envelope;
use crate::length_counter::LengthCounter;

/// Pseudo-random noise from a 15-bit LFSR. Feedback is bit 0 XOR bit 1, or
/// bit 0 XOR bit 6 in short mode, shifted in at bit 14.
#[derive(Debug)]
pub(crate) struct Noise {
    timer: u16,
    period: u16,
    shift: u16,
    short_mode: bool,
    periods: &'static [u16; 16],
    envelope: Envelope,
    pub(crate) length: LengthCounter,
}

impl Noise {
    pub(crate) fn new(periods: &'static [u16; 16]) -> Self {
        Self {
            timer: 0,
            period: periods[0],
            shift: 1,
            short_mode: false,
            periods,
            envelope: Envelope::default(),
            length: LengthCounter::default(),
        }
    }

    pub(crate) fn write(&mut self, reg: u16, value: u8) {
        match reg & 0x03 {
            0 => {
                self.length.set_halt(value & 0x20 != 0);
                self.envelope.write_control(value);
            }
            1 => log::trace!("write ${value:02X} to unused $400D ignored"),
            2 => {
                self.short_mode = value & 0x80 != 0;
                self.period = self.periods[usize::from(value & 0x0F)];
            }
            _ => {
                self.length.load(value >> 3);
                self.envelope.restart();
            }
        }
    }

    /// One APU cycle.
    pub(crate) fn clock_timer(&mut self) {
        if self.timer == 0 {
            self.timer = self.period;
            let tap = if self.short_mode { 6 } else { 1 };
            let feedback = (self.shift ^ (self.shift >> tap)) & 1;
            self.shift = (self.shift >> 1) | (feedback << 14);
        } else {
            self.timer -= 1;
        }
    }

    pub(crate) fn quarter_frame(&mut self) {
        self.envelope.clock();
    }

    pub(crate) fn half_frame(&mut self) {
        self.length.clock();
    }

    pub(crate) fn output(&self) -> u8 {
        if self.shift & 1 != 0 || !self.length.active() {
            0
        } else {
            self.envelope.output()
        }
    }

    pub(crate) fn period(&self) -> u16 {
        self.period
    }

    pub(crate) fn volume(&self) -> u8 {
        self.envelope.output()
    }
}
