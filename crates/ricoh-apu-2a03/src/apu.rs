//! Register decode, clocking and mixing for the five channels.

#![allow(clippy::cast_precision_loss)]

use emu_core::{Observable, Region, Value};

use crate::dmc::Dmc;
use crate::frame_counter::{FrameCounter, Mode};
use crate::noise::Noise;
use crate::pulse::{Pulse, PulseId};
use crate::tables::{dmc_rates, noise_periods};
use crate::triangle::Triangle;

/// NES APU.
///
/// Ticked once per CPU cycle. The triangle and DMC timers run at CPU
/// rate; pulse and noise timers run on every other cycle.
pub struct Apu {
    region: Region,
    pulse1: Pulse,
    pulse2: Pulse,
    triangle: Triangle,
    noise: Noise,
    dmc: Dmc,
    frame_counter: FrameCounter,
    /// True on the second CPU cycle of each APU cycle.
    odd_cycle: bool,
    sample: f32,
}

impl Apu {
    #[must_use]
    pub fn new(region: Region) -> Self {
        Self {
            region,
            pulse1: Pulse::new(PulseId::One),
            pulse2: Pulse::new(PulseId::Two),
            triangle: Triangle::default(),
            noise: Noise::new(noise_periods(region)),
            dmc: Dmc::new(dmc_rates(region)),
            frame_counter: FrameCounter::new(region),
            odd_cycle: false,
            sample: 0.0,
        }
    }

    /// Reset line: silences every channel and restarts the frame sequencer
    /// in its current mode.
    pub fn reset(&mut self) {
        self.write(0x4015, 0x00);
        let mode = match self.frame_counter.mode {
            Mode::FourStep => 0x00,
            Mode::FiveStep => 0x80,
        };
        self.write(0x4017, mode);
    }

    #[must_use]
    pub fn region(&self) -> Region {
        self.region
    }

    /// $4015 read. Clears the frame interrupt flag.
    pub fn read_status(&mut self) -> u8 {
        let status = self.peek_status();
        self.frame_counter.irq_flag = false;
        status
    }

    /// $4015 without the read side effect.
    #[must_use]
    pub fn peek_status(&self) -> u8 {
        let mut status = 0;
        if self.pulse1.length.active() {
            status |= 0x01;
        }
        if self.pulse2.length.active() {
            status |= 0x02;
        }
        if self.triangle.length.active() {
            status |= 0x04;
        }
        if self.noise.length.active() {
            status |= 0x08;
        }
        if self.dmc.bytes_remaining > 0 {
            status |= 0x10;
        }
        if self.frame_counter.irq_flag {
            status |= 0x40;
        }
        if self.dmc.irq_flag {
            status |= 0x80;
        }
        status
    }

    /// Write an APU register ($4000-$4013, $4015, $4017).
    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x4000..=0x4003 => self.pulse1.write(addr, value),
            0x4004..=0x4007 => self.pulse2.write(addr, value),
            0x4008..=0x400B => self.triangle.write(addr, value),
            0x400C..=0x400F => self.noise.write(addr, value),
            0x4010..=0x4013 => self.dmc.write(addr, value),
            0x4015 => {
                self.pulse1.length.set_enabled(value & 0x01 != 0);
                self.pulse2.length.set_enabled(value & 0x02 != 0);
                self.triangle.length.set_enabled(value & 0x04 != 0);
                self.noise.length.set_enabled(value & 0x08 != 0);
                self.dmc.set_enabled(value & 0x10 != 0);
            }
            0x4017 => self.frame_counter.write(value, self.odd_cycle),
            _ => log::warn!("write ${value:02X} to unmapped APU address ${addr:04X} ignored"),
        }
    }

    /// Advance one CPU cycle.
    pub fn tick(&mut self) {
        let clocks = self.frame_counter.tick();
        if clocks.quarter {
            self.pulse1.quarter_frame();
            self.pulse2.quarter_frame();
            self.triangle.quarter_frame();
            self.noise.quarter_frame();
        }
        if clocks.half {
            self.pulse1.half_frame();
            self.pulse2.half_frame();
            self.triangle.half_frame();
            self.noise.half_frame();
        }

        self.triangle.clock_timer();
        if self.odd_cycle {
            self.pulse1.clock_timer();
            self.pulse2.clock_timer();
            self.noise.clock_timer();
        }
        self.odd_cycle = !self.odd_cycle;
        self.dmc.tick();

        // Length loads written since the last tick land after this tick's
        // half-frame clock.
        self.pulse1.length.commit();
        self.pulse2.length.commit();
        self.triangle.length.commit();
        self.noise.length.commit();

        self.sample = self.mix();
    }

    /// Linear approximation of the 2A03's two resistor-ladder DACs.
    fn mix(&self) -> f32 {
        let pulse = f32::from(self.pulse1.output()) + f32::from(self.pulse2.output());
        0.007_52 * pulse
            + 0.008_51 * f32::from(self.triangle.output())
            + 0.004_94 * f32::from(self.noise.output())
            + 0.003_35 * f32::from(self.dmc.output())
    }

    /// Mixed output for the last tick, 0.0 to about 1.0.
    #[must_use]
    pub fn output(&self) -> f32 {
        self.sample
    }

    /// Frame or DMC interrupt asserted.
    #[must_use]
    pub fn irq_line(&self) -> bool {
        self.frame_counter.irq_flag || self.dmc.irq_flag
    }

    /// Address the DMC wants fetched, if its sample buffer is empty.
    #[must_use]
    pub fn dmc_dma_request(&self) -> Option<u16> {
        self.dmc.dma_request()
    }

    /// Complete a DMC DMA started from [`Apu::dmc_dma_request`].
    pub fn receive_dma_byte(&mut self, byte: u8) {
        self.dmc.receive_dma_byte(byte);
    }
}

impl Observable for Apu {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pulse1.period" => Some(self.pulse1.period().into()),
            "pulse1.length" => Some(self.pulse1.length.value().into()),
            "pulse1.volume" => Some(self.pulse1.volume().into()),
            "pulse2.period" => Some(self.pulse2.period().into()),
            "pulse2.length" => Some(self.pulse2.length.value().into()),
            "pulse2.volume" => Some(self.pulse2.volume().into()),
            "triangle.period" => Some(self.triangle.period().into()),
            "triangle.length" => Some(self.triangle.length.value().into()),
            "triangle.linear" => Some(self.triangle.linear().into()),
            "noise.period" => Some(self.noise.period().into()),
            "noise.length" => Some(self.noise.length.value().into()),
            "noise.volume" => Some(self.noise.volume().into()),
            "dmc.level" => Some(self.dmc.output().into()),
            "dmc.address" => Some(self.dmc.current_address().into()),
            "dmc.remaining" => Some(self.dmc.bytes_remaining.into()),
            "frame_counter.mode" => Some(match self.frame_counter.mode {
                Mode::FourStep => "4-step".into(),
                Mode::FiveStep => "5-step".into(),
            }),
            "frame_counter.cycle" => Some(self.frame_counter.cycle.into()),
            "status" => Some(self.peek_status().into()),
            "irq" => Some(self.irq_line().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pulse1.period",
            "pulse1.length",
            "pulse1.volume",
            "pulse2.period",
            "pulse2.length",
            "pulse2.volume",
            "triangle.period",
            "triangle.length",
            "triangle.linear",
            "noise.period",
            "noise.length",
            "noise.volume",
            "dmc.level",
            "dmc.address",
            "dmc.remaining",
            "frame_counter.mode",
            "frame_counter.cycle",
            "status",
            "irq",
        ]
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new(Region::Ntsc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks(apu: &mut Apu, n: u32) {
        for _ in 0..n {
            apu.tick();
        }
    }

    #[test]
    fn status_reflects_length_after_a_tick() {
        let mut apu = Apu::default();
        apu.write(0x4015, 0x05);
        apu.write(0x4003, 0x08);
        apu.write(0x4008, 0xFF);
        apu.write(0x400B, 0x08);
        assert_eq!(apu.peek_status() & 0x0F, 0, "loads are still latched");

        apu.tick();
        assert_eq!(apu.peek_status() & 0x0F, 0x05);
    }

    #[test]
    fn disabling_channel_clears_length() {
        let mut apu = Apu::default();
        apu.write(0x4015, 0x01);
        apu.write(0x4003, 0x08);
        apu.tick();
        apu.write(0x4015, 0x00);
        assert_eq!(apu.read_status() & 0x01, 0);
    }

    #[test]
    fn reload_racing_half_frame_keeps_running_note() {
        let mut apu = Apu::default();
        apu.write(0x4015, 0x01);
        apu.write(0x4003, 0x00); // length 10
        apu.tick();
        assert_eq!(apu.query("pulse1.length"), Some(Value::U8(10)));

        // Advance to the cycle before the first half-frame clock.
        ticks(&mut apu, 14_912 - 1);
        apu.write(0x4003, 0x08); // length 254, lands on the clocking tick
        apu.tick();
        assert_eq!(apu.query("pulse1.length"), Some(Value::U8(9)));
    }

    #[test]
    fn reload_between_clocks_takes_effect() {
        let mut apu = Apu::default();
        apu.write(0x4015, 0x01);
        apu.write(0x4003, 0x00);
        ticks(&mut apu, 100);
        apu.write(0x4003, 0x08);
        apu.tick();
        assert_eq!(apu.query("pulse1.length"), Some(Value::U8(254)));
    }

    #[test]
    fn frame_irq_and_status_read() {
        let mut apu = Apu::default();
        ticks(&mut apu, 29_829);
        assert!(apu.irq_line());
        assert_eq!(apu.read_status() & 0x40, 0x40);
        assert!(!apu.irq_line(), "reading $4015 acknowledges");
    }

    #[test]
    fn five_step_mode_has_no_irq() {
        let mut apu = Apu::default();
        apu.write(0x4017, 0x80);
        ticks(&mut apu, 40_000);
        assert!(!apu.irq_line());
    }

    #[test]
    fn dmc_dma_round_trip() {
        let mut apu = Apu::default();
        apu.write(0x4010, 0x80);
        apu.write(0x4012, 0x01);
        apu.write(0x4013, 0x00);
        apu.write(0x4015, 0x10);
        assert_eq!(apu.peek_status() & 0x10, 0x10);
        assert_eq!(apu.dmc_dma_request(), Some(0xC040));

        apu.receive_dma_byte(0x00);
        assert_eq!(apu.dmc_dma_request(), None);
        assert!(apu.irq_line());
        assert_eq!(apu.peek_status() & 0x90, 0x80);
    }

    #[test]
    fn mixer_weights() {
        let mut apu = Apu::default();
        apu.write(0x4011, 100);
        apu.tick();
        // Triangle idles at step 0 (level 15).
        let expected = 0.008_51 * 15.0 + 0.003_35 * 100.0;
        assert!((apu.output() - expected).abs() < 1e-6);
    }

    #[test]
    fn pulse_output_reaches_mixer() {
        let mut apu = Apu::default();
        apu.write(0x4015, 0x01);
        apu.write(0x4000, 0xBF);
        apu.write(0x4002, 0x40);
        apu.write(0x4003, 0x08);

        let base = 0.008_51 * 15.0;
        let mut peak = 0.0f32;
        for _ in 0..2_000 {
            apu.tick();
            peak = peak.max(apu.output() - base);
        }
        assert!((peak - 0.007_52 * 15.0).abs() < 1e-6);
    }

    #[test]
    fn reserved_registers_are_ignored() {
        let mut apu = Apu::default();
        apu.write(0x4009, 0xFF);
        apu.write(0x4018, 0xFF);
        assert_eq!(apu.peek_status(), 0);
    }
}
