//! Frame sequencer ($4017).

use emu_core::Region;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    FourStep,
    FiveStep,
}

/// Events produced by one sequencer tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Clocks {
    /// Envelopes and the triangle's linear counter.
    pub quarter: bool,
    /// Length counters and sweeps.
    pub half: bool,
}

impl Clocks {
    const QUARTER: Self = Self {
        quarter: true,
        half: false,
    };
    const BOTH: Self = Self {
        quarter: true,
        half: true,
    };
}

/// Step positions in CPU cycles since the sequencer was reset.
#[derive(Debug)]
struct Schedule {
    steps: [u32; 5],
    four_step_period: u32,
    five_step_period: u32,
}

const NTSC: Schedule = Schedule {
    steps: [7456, 14912, 22370, 29828, 37280],
    four_step_period: 29830,
    five_step_period: 37282,
};

const PAL: Schedule = Schedule {
    steps: [8312, 16626, 24938, 33252, 41564],
    four_step_period: 33254,
    five_step_period: 41566,
};

#[derive(Debug)]
pub(crate) struct FrameCounter {
    schedule: &'static Schedule,
    pub(crate) mode: Mode,
    pub(crate) cycle: u32,
    irq_inhibit: bool,
    pub(crate) irq_flag: bool,
    /// CPU cycles until a $4017 write resets the sequence.
    reset_delay: Option<u8>,
    /// The 4-step sequence just wrapped, as opposed to being reset.
    wrapped: bool,
}

impl FrameCounter {
    pub(crate) fn new(region: Region) -> Self {
        Self {
            schedule: match region {
                Region::Ntsc => &NTSC,
                Region::Pal => &PAL,
            },
            mode: Mode::FourStep,
            cycle: 0,
            irq_inhibit: false,
            irq_flag: false,
            reset_delay: None,
            wrapped: false,
        }
    }

    /// `MI-- ----`. The sequence restarts 3 CPU cycles later if the write
    /// lands on an APU cycle boundary (`odd_cycle`), otherwise 4.
    pub(crate) fn write(&mut self, value: u8, odd_cycle: bool) {
        self.mode = if value & 0x80 != 0 {
            Mode::FiveStep
        } else {
            Mode::FourStep
        };
        self.irq_inhibit = value & 0x40 != 0;
        if self.irq_inhibit {
            self.irq_flag = false;
        }
        self.reset_delay = Some(if odd_cycle { 4 } else { 3 });
    }

    /// One CPU cycle.
    pub(crate) fn tick(&mut self) -> Clocks {
        let mut clocks = Clocks::default();

        if let Some(remaining) = self.reset_delay {
            if remaining <= 1 {
                self.reset_delay = None;
                self.cycle = 0;
                self.wrapped = false;
                if self.mode == Mode::FiveStep {
                    clocks = Clocks::BOTH;
                }
            } else {
                self.reset_delay = Some(remaining - 1);
            }
        }

        let [q1, h1, q2, h2, h5] = self.schedule.steps;
        let period = match self.mode {
            Mode::FourStep => {
                match self.cycle {
                    0 if self.wrapped => self.raise_irq(),
                    c if c == q1 || c == q2 => clocks = Clocks::QUARTER,
                    c if c == h1 => clocks = Clocks::BOTH,
                    c if c == h2 => {
                        clocks = Clocks::BOTH;
                        self.raise_irq();
                    }
                    c if c == h2 + 1 => self.raise_irq(),
                    _ => {}
                }
                self.schedule.four_step_period
            }
            Mode::FiveStep => {
                match self.cycle {
                    c if c == q1 || c == q2 => clocks = Clocks::QUARTER,
                    c if c == h1 || c == h5 => clocks = Clocks::BOTH,
                    _ => {}
                }
                self.schedule.five_step_period
            }
        };

        self.wrapped = false;
        self.cycle += 1;
        if self.cycle >= period {
            self.cycle = 0;
            self.wrapped = self.mode == Mode::FourStep;
        }
        clocks
    }

    fn raise_irq(&mut self) {
        if !self.irq_inhibit {
            self.irq_flag = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(fc: &mut FrameCounter, cycles: u32) -> Vec<(u32, Clocks)> {
        (0..cycles)
            .filter_map(|i| {
                let clocks = fc.tick();
                (clocks != Clocks::default()).then_some((i, clocks))
            })
            .collect()
    }

    #[test]
    fn four_step_schedule_and_irq() {
        let mut fc = FrameCounter::new(Region::Ntsc);
        let events = run(&mut fc, 29_828);
        assert_eq!(
            events,
            [
                (7456, Clocks::QUARTER),
                (14912, Clocks::BOTH),
                (22370, Clocks::QUARTER),
            ]
        );
        assert!(!fc.irq_flag);

        assert_eq!(fc.tick(), Clocks::BOTH);
        assert!(fc.irq_flag);
        fc.tick();
        assert_eq!(fc.cycle, 0, "sequence wraps after 29830 cycles");
    }

    #[test]
    fn frame_irq_asserted_for_three_cycles() {
        let mut fc = FrameCounter::new(Region::Ntsc);
        run(&mut fc, 29_828);
        // 29828, 29829 and the wrap back to 0 each raise the flag.
        for _ in 0..3 {
            fc.irq_flag = false;
            fc.tick();
            assert!(fc.irq_flag);
        }
        fc.irq_flag = false;
        fc.tick();
        assert!(!fc.irq_flag);
        assert_eq!(fc.cycle, 2);
    }

    #[test]
    fn reset_to_zero_does_not_raise_irq() {
        let mut fc = FrameCounter::new(Region::Ntsc);
        fc.cycle = 100;
        fc.write(0x00, false);
        run(&mut fc, 5);
        assert_eq!(fc.cycle, 3);
        assert!(!fc.irq_flag);
    }

    #[test]
    fn five_step_never_raises_irq() {
        let mut fc = FrameCounter::new(Region::Ntsc);
        fc.write(0x80, false);
        let events = run(&mut fc, 40_000);
        assert!(!fc.irq_flag);
        // Immediate clock on reset, then the regular steps.
        assert_eq!(events[0], (2, Clocks::BOTH));
        assert_eq!(events[4], (2 + 37280, Clocks::BOTH));
    }

    #[test]
    fn reset_delay_depends_on_parity() {
        let mut even = FrameCounter::new(Region::Ntsc);
        let mut odd = FrameCounter::new(Region::Ntsc);
        even.cycle = 100;
        odd.cycle = 100;
        even.write(0x00, false);
        odd.write(0x00, true);
        for _ in 0..3 {
            even.tick();
            odd.tick();
        }
        assert_eq!(even.cycle, 1);
        assert_eq!(odd.cycle, 103);
        odd.tick();
        assert_eq!(odd.cycle, 1);
    }

    #[test]
    fn inhibit_clears_pending_irq() {
        let mut fc = FrameCounter::new(Region::Ntsc);
        run(&mut fc, 29_830);
        assert!(fc.irq_flag);
        fc.write(0x40, false);
        assert!(!fc.irq_flag);
    }
}
