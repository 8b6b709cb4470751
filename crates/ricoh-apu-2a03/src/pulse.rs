//! Pulse channels ($4000-$4007).

use crate::envelope::Envelope;
use crate::length_counter::LengthCounter;
use crate::tables::PULSE_DUTY;

/// Which of the two pulse channels; they differ only in sweep negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PulseId {
    One,
    Two,
}

/// `EPPP NSSS` sweep unit.
#[derive(Debug)]
struct Sweep {
    enabled: bool,
    negate: bool,
    shift: u8,
    period: u8,
    divider: u8,
    reload: bool,
    /// Pulse 1 negates with one's complement (subtracts an extra 1).
    ones_complement: bool,
}

impl Sweep {
    fn new(id: PulseId) -> Self {
        Self {
            enabled: false,
            negate: false,
            shift: 0,
            period: 0,
            divider: 0,
            reload: false,
            ones_complement: id == PulseId::One,
        }
    }

    fn write(&mut self, value: u8) {
        self.enabled = value & 0x80 != 0;
        self.period = (value >> 4) & 0x07;
        self.negate = value & 0x08 != 0;
        self.shift = value & 0x07;
        self.reload = true;
    }

    fn target_period(&self, current: u16) -> u16 {
        let change = current >> self.shift;
        match (self.negate, self.ones_complement) {
            (false, _) => current + change,
            (true, true) => current.wrapping_sub(change).wrapping_sub(1),
            (true, false) => current.wrapping_sub(change),
        }
    }

    /// The target is computed continuously, so an overflowing target mutes
    /// the channel even while the sweep is disabled.
    fn muting(&self, current: u16) -> bool {
        current < 8 || (!self.negate && self.target_period(current) > 0x7FF)
    }

    fn clock(&mut self, current: u16) -> u16 {
        let mut period = current;
        if self.divider == 0 && self.enabled && self.shift > 0 && !self.muting(current) {
            period = self.target_period(current);
        }
        if self.divider == 0 || self.reload {
            self.divider = self.period;
            self.reload = false;
        } else {
            self.divider -= 1;
        }
        period
    }
}

#[derive(Debug)]
pub(crate) struct Pulse {
    duty: u8,
    step: u8,
    timer: u16,
    period: u16,
    envelope: Envelope,
    sweep: Sweep,
    pub(crate) length: LengthCounter,
}

impl Pulse {
    pub(crate) fn new(id: PulseId) -> Self {
        Self {
            duty: 0,
            step: 0,
            timer: 0,
            period: 0,
            envelope: Envelope::default(),
            sweep: Sweep::new(id),
            length: LengthCounter::default(),
        }
    }

    /// Register write, `reg` 0-3.
    pub(crate) fn write(&mut self, reg: u16, value: u8) {
        match reg & 0x03 {
            0 => {
                self.duty = value >> 6;
                self.length.set_halt(value & 0x20 != 0);
                self.envelope.write_control(value);
            }
            1 => self.sweep.write(value),
            2 => self.period = (self.period & 0x0700) | u16::from(value),
            _ => {
                self.period = (self.period & 0x00FF) | (u16::from(value & 0x07) << 8);
                self.length.load(value >> 3);
                self.envelope.restart();
                self.step = 0;
            }
        }
    }

    /// One APU cycle (every other CPU cycle).
    pub(crate) fn clock_timer(&mut self) {
        if self.timer == 0 {
            self.timer = self.period;
            self.step = (self.step + 1) & 0x07;
        } else {
            self.timer -= 1;
        }
    }

    pub(crate) fn quarter_frame(&mut self) {
        self.envelope.clock();
    }

    pub(crate) fn half_frame(&mut self) {
        self.length.clock();
        self.period = self.sweep.clock(self.period);
    }

    pub(crate) fn output(&self) -> u8 {
        let high = PULSE_DUTY[usize::from(self.duty)] & (0x80 >> self.step) != 0;
        if !high || !self.length.active() || self.sweep.muting(self.period) {
            return 0;
        }
        self.envelope.output()
    }

    pub(crate) fn period(&self) -> u16 {
        self.period
    }

    pub(crate) fn volume(&self) -> u8 {
        self.envelope.output()
    }
}
