//! Channel length counter with the 2A03's delayed reload and halt.

use crate::tables::LENGTH_TABLE;

/// Counts down at half-frame rate and silences the channel at zero.
///
/// A load is latched and committed at the end of the next APU tick, after
/// that tick's half-frame clock. If the clock changed the counter in the
/// meantime, the load is dropped. Halt writes take effect at the same
/// point.
#[derive(Debug, Default)]
pub(crate) struct LengthCounter {
    counter: u8,
    halt: bool,
    new_halt: bool,
    enabled: bool,
    reload: u8,
    previous: u8,
}

impl LengthCounter {
    pub(crate) fn load(&mut self, index: u8) {
        if self.enabled {
            self.reload = LENGTH_TABLE[usize::from(index & 0x1F)];
            self.previous = self.counter;
        }
    }

    pub(crate) fn set_halt(&mut self, halt: bool) {
        self.new_halt = halt;
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.counter = 0;
            self.reload = 0;
        }
    }

    pub(crate) fn clock(&mut self) {
        if !self.halt && self.counter > 0 {
            self.counter -= 1;
        }
    }

    /// Apply the latched load and halt.
    pub(crate) fn commit(&mut self) {
        if self.reload != 0 {
            if self.counter == self.previous {
                self.counter = self.reload;
            }
            self.reload = 0;
        }
        self.halt = self.new_halt;
    }

    pub(crate) fn active(&self) -> bool {
        self.counter > 0
    }

    pub(crate) fn value(&self) -> u8 {
        self.counter
    }
}
