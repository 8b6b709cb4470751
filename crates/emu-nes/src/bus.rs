//! NES bus: CPU address decoding and the per-cycle clock fan-out.
//!
//! Implements `emu_core::Bus` and `emu_core::Tickable`. Every CPU cycle
//! ticks the PPU three times (plus one extra dot every fifth cycle on PAL)
//! and the APU once. DMA is charged to the CPU as stall cycles, which it
//! burns at the start of its next step.
//!
//! | Range         | Device                                   |
//! |---------------|------------------------------------------|
//! | $0000-$1FFF   | 2 KiB internal RAM, mirrored every $0800 |
//! | $2000-$3FFF   | PPU registers, mirrored every 8 bytes    |
//! | $4000-$4013   | APU channels                             |
//! | $4014         | OAM DMA                                  |
//! | $4015         | APU status / channel enable              |
//! | $4016/$4017   | Controllers ($4017 write: frame counter) |
//! | $4018-$401F   | APU test registers (disabled)            |
//! | $4020-$FFFF   | Cartridge                                |

use emu_core::{Bus, Region, Tickable};
use nes_cartridge::Cartridge;
use ricoh_apu_2a03::Apu;
use ricoh_ppu_2c02::Ppu;

use crate::controller::Controller;

/// OAM DMA length before the alignment cycle.
const OAM_DMA_CYCLES: u32 = 513;

pub struct NesBus {
    ram: [u8; 0x0800],
    pub(crate) ppu: Ppu,
    pub(crate) apu: Apu,
    pub(crate) cartridge: Cartridge,
    pub(crate) controllers: [Controller; 2],
    /// Last value driven on the CPU data bus.
    open_bus: u8,
    /// CPU cycles ticked since power-on.
    cycles: u64,
    /// PAL dot-ratio accumulator.
    dot_phase: u32,
    extra_dot_interval: Option<u32>,
    /// DMA cycles the CPU has not yet paid for.
    stall: u32,
    vblank_entered: bool,
}

impl NesBus {
    #[must_use]
    pub fn new(cartridge: Cartridge, region: Region) -> Self {
        Self {
            ram: [0; 0x0800],
            ppu: Ppu::new(),
            apu: Apu::new(region),
            cartridge,
            controllers: [Controller::new(), Controller::new()],
            open_bus: 0,
            cycles: 0,
            dot_phase: 0,
            extra_dot_interval: region.extra_dot_interval(),
            stall: 0,
            vblank_entered: false,
        }
    }

    /// Console reset button: PPU and APU return to their reset state, RAM
    /// and the cartridge keep their contents.
    pub fn reset(&mut self) {
        self.ppu.reset();
        self.apu.reset();
        self.stall = 0;
    }

    #[must_use]
    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    #[must_use]
    pub fn apu(&self) -> &Apu {
        &self.apu
    }

    #[must_use]
    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    /// CPU cycles ticked since power-on.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Whether the PPU has entered vblank since the last call.
    pub fn take_vblank_entered(&mut self) -> bool {
        std::mem::take(&mut self.vblank_entered)
    }

    /// Copy a 256-byte page into OAM through $2004.
    ///
    /// The bytes move immediately; the 513 cycles the transfer takes (514
    /// when it starts on an odd cycle) are charged as stall.
    fn oam_dma(&mut self, page: u8) {
        let base = u16::from(page) << 8;
        log::debug!("OAM DMA from ${base:04X} at cycle {}", self.cycles);
        for offset in 0..=0xFF {
            let value = self.read(base | offset);
            self.ppu.write_oam_data(value);
        }
        self.stall += OAM_DMA_CYCLES + u32::from(self.cycles % 2 == 1);
    }

    fn dmc_dma(&mut self, addr: u16) {
        let value = self.cartridge.cpu_read(addr).unwrap_or(self.open_bus);
        self.apu.receive_dma_byte(value);
        self.stall += 1;
    }
}

impl Bus for NesBus {
    fn read(&mut self, addr: u16) -> u8 {
        let value = match addr {
            0x0000..=0x1FFF => self.ram[usize::from(addr & 0x07FF)],
            0x2000..=0x3FFF => self.ppu.cpu_read(addr & 0x0007, &mut self.cartridge),
            // Bit 5 is not driven.
            0x4015 => self.apu.read_status() | (self.open_bus & 0x20),
            0x4016 | 0x4017 => {
                let port = usize::from(addr & 1);
                self.controllers[port].read() | (self.open_bus & 0xE0)
            }
            0x4000..=0x401F => self.open_bus,
            0x4020..=0xFFFF => self.cartridge.cpu_read(addr).unwrap_or(self.open_bus),
        };
        self.open_bus = value;
        value
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.open_bus = value;
        match addr {
            0x0000..=0x1FFF => self.ram[usize::from(addr & 0x07FF)] = value,
            0x2000..=0x3FFF => self.ppu.cpu_write(addr & 0x0007, value, &mut self.cartridge),
            0x4014 => self.oam_dma(value),
            0x4016 => {
                for pad in &mut self.controllers {
                    pad.write_strobe(value);
                }
            }
            0x4000..=0x4013 | 0x4015 | 0x4017 => self.apu.write(addr, value),
            0x4018..=0x401F => {
                log::warn!("write ${value:02X} to disabled APU test register ${addr:04X} ignored");
            }
            0x4020..=0xFFFF => self.cartridge.cpu_write(addr, value),
        }
    }

    fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[usize::from(addr & 0x07FF)],
            0x4015 => self.apu.peek_status(),
            0x4016 | 0x4017 => self.controllers[usize::from(addr & 1)].peek(),
            0x2000..=0x401F => self.open_bus,
            0x4020..=0xFFFF => self.cartridge.peek(addr).unwrap_or(self.open_bus),
        }
    }

    fn poll_nmi(&mut self) -> bool {
        self.ppu.take_nmi()
    }

    fn irq_line(&self) -> bool {
        self.apu.irq_line() || self.cartridge.irq_pending()
    }

    fn take_stall_cycles(&mut self) -> u32 {
        std::mem::take(&mut self.stall)
    }
}

impl Tickable for NesBus {
    fn tick(&mut self) {
        self.cycles += 1;

        let mut dots = 3;
        if let Some(interval) = self.extra_dot_interval {
            self.dot_phase += 1;
            if self.dot_phase == interval {
                self.dot_phase = 0;
                dots += 1;
            }
        }
        for _ in 0..dots {
            self.ppu.tick(&mut self.cartridge);
            if self.ppu.take_vblank_entered() {
                self.vblank_entered = true;
            }
        }

        self.apu.tick();
        if let Some(addr) = self.apu.dmc_dma_request() {
            self.dmc_dma(addr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// NROM with 16K of NOPs and 8K of CHR ROM.
    fn make_bus(region: Region) -> NesBus {
        let mut data = vec![0u8; 16 + 0x4000 + 0x2000];
        data[..6].copy_from_slice(b"NES\x1A\x01\x01");
        data[16..16 + 0x4000].fill(0xEA);
        let cartridge = Cartridge::from_ines(&data).expect("valid image");
        NesBus::new(cartridge, region)
    }

    #[test]
    fn ram_mirrors_every_2k() {
        let mut bus = make_bus(Region::Ntsc);
        bus.write(0x0000, 0xAB);
        for mirror in [0x0800, 0x1000, 0x1800] {
            assert_eq!(bus.read(mirror), 0xAB);
        }
        bus.write(0x1FFF, 0x12);
        assert_eq!(bus.read(0x07FF), 0x12);
    }

    #[test]
    fn ppu_registers_mirror_every_8() {
        let mut bus = make_bus(Region::Ntsc);
        // $3F00 via the $2006 mirror at $3FFE, data via $2007's at $200F.
        bus.write(0x3FFE, 0x3F);
        bus.write(0x3FFE, 0x00);
        bus.write(0x200F, 0x21);
        assert_eq!(bus.ppu.read_palette(0x3F00), 0x21);
    }

    #[test]
    fn cartridge_space_reads_prg() {
        let mut bus = make_bus(Region::Ntsc);
        assert_eq!(bus.read(0x8000), 0xEA);
        assert_eq!(bus.peek(0xFFFC), 0xEA);
    }

    #[test]
    fn unmapped_reads_return_open_bus() {
        let mut bus = make_bus(Region::Ntsc);
        bus.read(0x8000);
        assert_eq!(bus.read(0x5000), 0xEA);
        assert_eq!(bus.read(0x4018), 0xEA);
    }

    #[test]
    fn controller_reads_keep_open_bus_high_bits() {
        let mut bus = make_bus(Region::Ntsc);
        bus.controllers[0].set_button(crate::Button::A, true);
        bus.write(0x4016, 1);
        bus.write(0x4016, 0);
        bus.write(0x0000, 0x40);
        bus.read(0x0000);
        assert_eq!(bus.read(0x4016), 0x41);
        assert_eq!(bus.read(0x4016), 0x40);
    }

    #[test]
    fn oam_dma_copies_page_and_stalls() {
        let mut bus = make_bus(Region::Ntsc);
        for i in 0..=0xFFu16 {
            bus.write(0x0200 + i, i as u8);
        }
        bus.write(0x2003, 0x00);
        bus.tick();
        bus.tick();
        bus.write(0x4014, 0x02);
        assert_eq!(bus.take_stall_cycles(), 513);
        assert_eq!(bus.take_stall_cycles(), 0);
        for i in 0..=0xFFu8 {
            assert_eq!(bus.ppu.read_oam(i), i);
        }

        bus.tick();
        bus.write(0x4014, 0x02);
        assert_eq!(bus.take_stall_cycles(), 514);
    }

    #[test]
    fn oam_dma_starts_at_oam_addr() {
        let mut bus = make_bus(Region::Ntsc);
        bus.write(0x0300, 0x77);
        bus.write(0x2003, 0x10);
        bus.write(0x4014, 0x03);
        assert_eq!(bus.ppu.read_oam(0x10), 0x77);
    }

    #[test]
    fn ntsc_ticks_three_dots_per_cycle() {
        let mut bus = make_bus(Region::Ntsc);
        bus.tick_n(10);
        assert_eq!(bus.ppu.dot(), 30);
        assert_eq!(bus.cycles(), 10);
    }

    #[test]
    fn pal_adds_a_dot_every_fifth_cycle() {
        let mut bus = make_bus(Region::Pal);
        bus.tick_n(10);
        assert_eq!(bus.ppu.dot(), 32);
    }

    #[test]
    fn vblank_entry_is_reported_once() {
        let mut bus = make_bus(Region::Ntsc);
        // 241 scanlines of 341 dots, plus dot 1.
        let dots: u32 = 241 * 341 + 2;
        bus.tick_n(dots.div_ceil(3));
        assert!(bus.take_vblank_entered());
        assert!(!bus.take_vblank_entered());
    }

    #[test]
    fn apu_status_read_clears_frame_irq() {
        let mut bus = make_bus(Region::Ntsc);
        bus.tick_n(29_833);
        assert!(bus.irq_line());
        assert_ne!(bus.read(0x4015) & 0x40, 0);
        assert!(!bus.irq_line());
    }
}
