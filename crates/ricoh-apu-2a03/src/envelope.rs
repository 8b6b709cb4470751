/// Decay envelope, clocked at quarter-frame rate.
///
/// When the loop flag is clear, the envelope counts down from 15 to 0 and
/// stays there. When loop is set, it wraps from 0 back to 15.
#[derive(Debug, Default)]
pub(crate) struct Envelope {
    start: bool,
    divider: u8,
    decay: u8,
    /// Volume, or the divider period when not constant.
    volume: u8,
    constant: bool,
    looping: bool,
}

impl Envelope {
    /// `--LC VVVV` of the channel's first register.
    pub(crate) fn write_control(&mut self, value: u8) {
        self.looping = value & 0x20 != 0;
        self.constant = value & 0x10 != 0;
        self.volume = value & 0x0F;
    }

    pub(crate) fn restart(&mut self) {
        self.start = true;
    }

    pub(crate) fn clock(&mut self) {
        if self.start {
            self.start = false;
            self.decay = 15;
            self.divider = self.volume;
        } else if self.divider == 0 {
            self.divider = self.volume;
            if self.decay > 0 {
                self.decay -= 1;
            } else if self.looping {
                self.decay = 15;
            }
        } else {
            self.divider -= 1;
        }
    }

    pub(crate) fn output(&self) -> u8 {
        if self.constant { self.volume } else { self.decay }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decays_once_per_divider_period() {
        let mut env = Envelope::default();
        env.write_control(0x01);
        env.restart();
        env.clock();
        assert_eq!(env.output(), 15);
        env.clock();
        assert_eq!(env.output(), 15);
        env.clock();
        assert_eq!(env.output(), 14);
    }

    #[test]
    fn loops_back_to_15() {
        let mut env = Envelope::default();
        env.write_control(0x20);
        env.restart();
        for _ in 0..16 {
            env.clock();
        }
        assert_eq!(env.output(), 0);
        env.clock();
        assert_eq!(env.output(), 15);
    }

    #[test]
    fn constant_volume_ignores_decay() {
        let mut env = Envelope::default();
        env.write_control(0x1A);
        env.restart();
        env.clock();
        assert_eq!(env.output(), 0x0A);
    }
}
