//! Standard NES controller (joypad).
//!
//! The pad is an 8-bit parallel-in shift register behind $4016/$4017.
//! While the strobe bit written to $4016 is high the register keeps
//! reloading from the buttons; once it drops, each read shifts one button
//! out, A first.

/// Controller buttons in shift-out order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    A,
    B,
    Select,
    Start,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    /// Bit position in the shift register.
    #[must_use]
    pub const fn bit(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Default)]
pub struct Controller {
    /// Live button state, one bit per [`Button`].
    buttons: u8,
    shift: u8,
    strobe: bool,
}

impl Controller {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        let mask = 1 << button.bit();
        if pressed {
            self.buttons |= mask;
        } else {
            self.buttons &= !mask;
        }
        if self.strobe {
            self.shift = self.buttons;
        }
    }

    /// $4016 write: bit 0 is the strobe, shared by both ports.
    pub fn write_strobe(&mut self, value: u8) {
        self.strobe = value & 1 != 0;
        if self.strobe {
            self.shift = self.buttons;
        }
    }

    /// Serial read. Returns the next button in bit 0. After eight reads an
    /// official pad shifts in ones.
    pub fn read(&mut self) -> u8 {
        if self.strobe {
            return self.buttons & 1;
        }
        let bit = self.shift & 1;
        self.shift = (self.shift >> 1) | 0x80;
        bit
    }

    /// Next serial bit without shifting.
    #[must_use]
    pub fn peek(&self) -> u8 {
        if self.strobe {
            self.buttons & 1
        } else {
            self.shift & 1
        }
    }

    #[must_use]
    pub fn buttons(&self) -> u8 {
        self.buttons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(pad: &mut Controller) -> Vec<u8> {
        (0..8).map(|_| pad.read()).collect()
    }

    #[test]
    fn strobe_latch_and_read() {
        let mut pad = Controller::new();
        pad.set_button(Button::A, true);
        pad.set_button(Button::Start, true);

        pad.write_strobe(1);
        pad.write_strobe(0);

        assert_eq!(read_all(&mut pad), vec![1, 0, 0, 1, 0, 0, 0, 0]);
        assert_eq!(pad.read(), 1);
    }

    #[test]
    fn strobe_high_keeps_returning_a() {
        let mut pad = Controller::new();
        pad.set_button(Button::A, true);
        pad.write_strobe(1);
        assert_eq!(pad.read(), 1);
        assert_eq!(pad.read(), 1);
        pad.set_button(Button::A, false);
        assert_eq!(pad.read(), 0);
    }

    #[test]
    fn presses_after_latch_wait_for_next_strobe() {
        let mut pad = Controller::new();
        pad.write_strobe(1);
        pad.write_strobe(0);
        pad.set_button(Button::Right, true);
        assert_eq!(read_all(&mut pad), vec![0; 8]);

        pad.write_strobe(1);
        pad.write_strobe(0);
        assert_eq!(read_all(&mut pad)[7], 1);
    }

    #[test]
    fn buttons_byte() {
        let mut pad = Controller::new();
        pad.set_button(Button::A, true);
        pad.set_button(Button::B, true);
        pad.set_button(Button::Left, true);
        assert_eq!(pad.buttons(), 0x43);
    }
}
