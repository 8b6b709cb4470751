//! Top-level NES system.
//!
//! The CPU drives the machine: `Nes` calls `step()` and the CPU ticks the
//! bus once per cycle, which in turn advances the PPU and APU. Control only
//! comes back here between instructions, so every entry point stops on an
//! instruction boundary.
//!
//! One NTSC frame = 341 PPU dots × 262 scanlines = 89,342 dots, or
//! 29,780.67 CPU cycles.

use emu_core::{Bus, Cpu, Observable, Region, Value, parse_address};
use mos_6502::Mos6502;
use nes_cartridge::Cartridge;

use crate::bus::NesBus;
use crate::config::NesConfig;
use crate::controller::{Button, Controller};
use crate::error::NesError;

/// NES system.
pub struct Nes {
    cpu: Mos6502,
    bus: NesBus,
    region: Region,
    entry_point: Option<u16>,
}

impl Nes {
    /// Load a cartridge and power the machine on.
    ///
    /// # Errors
    ///
    /// Returns [`NesError::Cartridge`] if the image cannot be loaded.
    pub fn new(config: &NesConfig) -> Result<Self, NesError> {
        let cartridge = Cartridge::from_ines(&config.rom_data)?;
        let mut nes = Self {
            cpu: Mos6502::new(),
            bus: NesBus::new(cartridge, config.region),
            region: config.region,
            entry_point: config.entry_point,
        };
        nes.boot();
        log::debug!("{} NES powered on, PC=${:04X}", nes.region, nes.cpu.pc());
        Ok(nes)
    }

    /// Press the reset button.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.boot();
    }

    fn boot(&mut self) {
        self.cpu.reset(&mut self.bus);
        if let Some(pc) = self.entry_point {
            self.cpu.regs.pc = pc;
        }
    }

    /// Run one instruction, or one interrupt sequence. Returns the cycles
    /// it took, including any DMA stall paid first.
    ///
    /// # Errors
    ///
    /// Returns [`NesError::Cpu`] if the CPU hits an unimplemented opcode.
    pub fn step(&mut self) -> Result<u32, NesError> {
        Ok(self.cpu.step(&mut self.bus)?)
    }

    /// Run whole instructions until at least `budget` cycles have passed.
    /// Returns the cycles actually consumed.
    pub fn advance(&mut self, budget: u64) -> Result<u64, NesError> {
        let start = self.cpu.cycles();
        while self.cpu.cycles() - start < budget {
            self.step()?;
        }
        Ok(self.cpu.cycles() - start)
    }

    /// Run until the PPU next enters vblank. Returns the cycles consumed.
    pub fn advance_to_next_vblank(&mut self) -> Result<u64, NesError> {
        let start = self.cpu.cycles();
        self.bus.take_vblank_entered();
        loop {
            self.step()?;
            if self.bus.take_vblank_entered() {
                return Ok(self.cpu.cycles() - start);
            }
        }
    }

    /// Conformance log line for the instruction about to execute.
    #[must_use]
    pub fn trace_line(&self) -> String {
        let ppu = self.bus.ppu();
        format!(
            "{} PPU:{:>3},{:>3} CYC:{}",
            self.cpu.disassemble(&self.bus),
            ppu.scanline(),
            ppu.dot(),
            self.cpu.cycles()
        )
    }

    /// Completed PPU frames.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.bus.ppu().frame()
    }

    /// Palette indices, 256x240, row-major.
    #[must_use]
    pub fn framebuffer(&self) -> &[u8] {
        self.bus.ppu().framebuffer()
    }

    /// Mixed APU output for the last CPU cycle.
    #[must_use]
    pub fn audio_sample(&self) -> f32 {
        self.bus.apu().output()
    }

    /// Press or release a button on controller `port` (0 or 1).
    pub fn set_button(&mut self, port: usize, button: Button, pressed: bool) {
        if let Some(pad) = self.bus.controllers.get_mut(port) {
            pad.set_button(button, pressed);
        }
    }

    #[must_use]
    pub fn controller(&self, port: usize) -> Option<&Controller> {
        self.bus.controllers.get(port)
    }

    #[must_use]
    pub fn region(&self) -> Region {
        self.region
    }

    #[must_use]
    pub fn cpu(&self) -> &Mos6502 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Mos6502 {
        &mut self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &NesBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut NesBus {
        &mut self.bus
    }
}

impl Observable for Nes {
    fn query(&self, path: &str) -> Option<Value> {
        if let Some(rest) = path.strip_prefix("cpu.") {
            self.cpu.query(rest)
        } else if let Some(rest) = path.strip_prefix("ppu.") {
            self.bus.ppu().query(rest)
        } else if let Some(rest) = path.strip_prefix("apu.") {
            self.bus.apu().query(rest)
        } else if let Some(rest) = path.strip_prefix("memory.") {
            parse_address(rest).map(|addr| Value::U8(self.bus.peek(addr)))
        } else {
            match path {
                "frame" => Some(self.frame().into()),
                "cycles" => Some(self.cpu.cycles().into()),
                "region" => Some(self.region.to_string().into()),
                _ => None,
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "cpu.<6502_paths>",
            "ppu.<2c02_paths>",
            "apu.<2a03_paths>",
            "memory.<address>",
            "frame",
            "cycles",
            "region",
        ]
    }
}
