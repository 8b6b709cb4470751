use ricoh_ppu_2c02::Mirroring;

use crate::board::Board;
use crate::mapper::Mapper;
use crate::rom::Rom;

/// CNROM (Mapper 3): 8K CHR bank switching.
///
/// Used by Gradius, Paperboy, and Arkanoid. PRG ROM is unbanked (16K
/// mirrored or 32K). Writes to $8000-$FFFF select the CHR bank, subject
/// to bus conflicts.
pub struct CnRom {
    board: Board,
}

impl CnRom {
    #[must_use]
    pub fn new(rom: Rom) -> Self {
        Self {
            board: Board::new(rom, 0x4000, 0x2000),
        }
    }
}

impl Mapper for CnRom {
    fn peek(&self, addr: u16) -> Option<u8> {
        self.board.peek(addr)
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if !self.board.write_ram(addr, value) {
            let bank = self.board.bus_conflict(addr, value);
            self.board.chr.map(0, usize::from(bank & 0x03));
        }
    }

    fn chr_read(&mut self, addr: u16) -> u8 {
        self.board.chr_read(addr)
    }

    fn chr_write(&mut self, addr: u16, value: u8) {
        self.board.chr_write(addr, value);
    }

    fn mirroring(&self) -> Mirroring {
        self.board.mirroring
    }
}
