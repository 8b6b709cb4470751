use ricoh_ppu_2c02::Mirroring;

use crate::board::Board;
use crate::mapper::Mapper;
use crate::rom::Rom;

/// NROM (Mapper 0): no bank switching.
///
/// - PRG: 16K mirrored at $8000-$FFFF, or 32K at $8000-$FFFF
/// - CHR: 8K at PPU $0000-$1FFF (ROM, or RAM when the image has none)
pub struct Nrom {
    board: Board,
}

impl Nrom {
    #[must_use]
    pub fn new(rom: Rom) -> Self {
        Self {
            board: Board::new(rom, 0x4000, 0x2000),
        }
    }
}

impl Mapper for Nrom {
    fn peek(&self, addr: u16) -> Option<u8> {
        self.board.peek(addr)
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        // No registers; ROM writes are dropped.
        self.board.write_ram(addr, value);
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
