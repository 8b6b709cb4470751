//! Memory common to every supported board.

use ricoh_ppu_2c02::Mirroring;

use crate::bank::BankedMemory;
use crate::rom::Rom;

const PRG_WINDOW: usize = 0x8000;
const CHR_WINDOW: usize = 0x2000;
const PRG_RAM_SIZE: usize = 0x2000;

/// PRG ROM at $8000-$FFFF, 8 KiB of PRG RAM at $6000-$7FFF, and CHR ROM
/// (or 8 KiB of CHR RAM) on the PPU bus. Boards differ only in how they
/// bank these and in what their registers do.
#[derive(Debug, Clone)]
pub(crate) struct Board {
    pub(crate) prg: BankedMemory,
    pub(crate) chr: BankedMemory,
    prg_ram: Vec<u8>,
    pub(crate) mirroring: Mirroring,
}

impl Board {
    /// `prg_page` and `chr_page` are the bank granularities of the board.
    pub(crate) fn new(rom: Rom, prg_page: usize, chr_page: usize) -> Self {
        let chr = if rom.chr.is_empty() {
            BankedMemory::ram(CHR_WINDOW, chr_page, CHR_WINDOW / chr_page)
        } else {
            BankedMemory::new(rom.chr, chr_page, CHR_WINDOW / chr_page, false)
        };
        Self {
            prg: BankedMemory::new(rom.prg, prg_page, PRG_WINDOW / prg_page, false),
            chr,
            prg_ram: vec![0; PRG_RAM_SIZE],
            mirroring: rom.header.mirroring,
        }
    }

    /// `None` where the cartridge leaves the data bus floating.
    pub(crate) fn peek(&self, addr: u16) -> Option<u8> {
        match addr {
            0x6000..=0x7FFF => Some(self.prg_ram[usize::from(addr - 0x6000)]),
            0x8000..=0xFFFF => Some(self.prg.read(usize::from(addr - 0x8000))),
            _ => None,
        }
    }

    /// Handle a CPU write that does not hit a mapper register. Returns
    /// false for ROM space so the caller can decode it.
    pub(crate) fn write_ram(&mut self, addr: u16, value: u8) -> bool {
        match addr {
            0x6000..=0x7FFF => {
                self.prg_ram[usize::from(addr - 0x6000)] = value;
                true
            }
            0x8000..=0xFFFF => false,
            _ => {
                log::warn!("write ${value:02X} to unmapped cartridge address ${addr:04X}");
                true
            }
        }
    }

    pub(crate) fn chr_read(&self, addr: u16) -> u8 {
        self.chr.read(usize::from(addr & 0x1FFF))
    }

    pub(crate) fn chr_write(&mut self, addr: u16, value: u8) {
        self.chr.write(usize::from(addr & 0x1FFF), value);
    }

    /// Value after a bus conflict: the ROM drives the bus during the write,
    /// so the board latches the AND of both.
    pub(crate) fn bus_conflict(&self, addr: u16, value: u8) -> u8 {
        value & self.peek(addr).unwrap_or(0xFF)
    }
}
