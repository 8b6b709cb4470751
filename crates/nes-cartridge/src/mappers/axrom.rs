use ricoh_ppu_2c02::Mirroring;

use crate::board::Board;
use crate::mapper::Mapper;
use crate::rom::Rom;

/// AxROM (Mapper 7): 32K PRG bank switching with single-screen mirroring.
///
/// Used by Battletoads, Marble Madness, and Wizards & Warriors.
///
/// - PRG: 32K switchable at $8000-$FFFF (bits 0-2)
/// - CHR: 8K RAM
/// - Mirroring: single-screen, page selected by bit 4
pub struct AxRom {
    board: Board,
}

impl AxRom {
    #[must_use]
    pub fn new(rom: Rom) -> Self {
        let mut board = Board::new(rom, 0x8000, 0x2000);
        board.mirroring = Mirroring::SingleScreenLower;
        Self { board }
    }
}

impl Mapper for AxRom {
    fn peek(&self, addr: u16) -> Option<u8> {
        self.board.peek(addr)
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if self.board.write_ram(addr, value) {
            return;
        }
        self.board.prg.map(0, usize::from(value & 0x07));
        self.board.mirroring = if value & 0x10 == 0 {
            Mirroring::SingleScreenLower
        } else {
            Mirroring::SingleScreenUpper
        };
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
