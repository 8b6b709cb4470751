//! Triangle channel ($4008-$400B).

use crate::length_counter::LengthCounter;
use crate::tables::TRIANGLE_SEQUENCE;

/// Triangle wave. The timer runs at CPU rate and the 32-step sequencer
/// only advances while both the length and linear counters are non-zero,
/// so a silenced triangle holds its last level.
#[derive(Debug, Default)]
pub(crate) struct Triangle {
    timer: u16,
    period: u16,
    step: u8,
    linear: u8,
    linear_reload: u8,
    reload_flag: bool,
    /// Also the length counter halt.
    control: bool,
    pub(crate) length: LengthCounter,
}

impl Triangle {
    pub(crate) fn write(&mut self, reg: u16, value: u8) {
        match reg & 0x03 {
            0 => {
                self.control = value & 0x80 != 0;
                self.length.set_halt(self.control);
                self.linear_reload = value & 0x7F;
            }
            1 => log::trace!("write ${value:02X} to unused $4009 ignored"),
            2 => self.period = (self.period & 0x0700) | u16::from(value),
            _ => {
                self.period = (self.period & 0x00FF) | (u16::from(value & 0x07) << 8);
                self.length.load(value >> 3);
                self.reload_flag = true;
            }
        }
    }

    /// One CPU cycle.
    pub(crate) fn clock_timer(&mut self) {
        if self.timer == 0 {
            self.timer = self.period;
            if self.length.active() && self.linear > 0 {
                self.step = (self.step + 1) & 0x1F;
            }
        } else {
            self.timer -= 1;
        }
    }

    /// Quarter frame: linear counter.
    pub(crate) fn quarter_frame(&mut self) {
        if self.reload_flag {
            self.linear = self.linear_reload;
        } else if self.linear > 0 {
            self.linear -= 1;
        }
        if !self.control {
            self.reload_flag = false;
        }
    }

    pub(crate) fn half_frame(&mut self) {
        self.length.clock();
    }

    pub(crate) fn output(&self) -> u8 {
        TRIANGLE_SEQUENCE[usize::from(self.step)]
    }

    pub(crate) fn period(&self) -> u16 {
        self.period
    }

    pub(crate) fn linear(&self) -> u8 {
        self.linear
    }
}
