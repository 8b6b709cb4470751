use ricoh_ppu_2c02::Mirroring;

use crate::board::Board;
use crate::mapper::Mapper;
use crate::rom::Rom;

/// UxROM (Mapper 2): 16K PRG bank switching in the lower half.
///
/// Used by Mega Man, Castlevania, Contra, and DuckTales.
///
/// - PRG: 16K switchable at $8000-$BFFF, last bank fixed at $C000-$FFFF
/// - CHR: 8K, usually RAM
/// - Mirroring: fixed from header
/// - Bus conflicts on register writes
pub struct UxRom {
    board: Board,
}

impl UxRom {
    #[must_use]
    pub fn new(rom: Rom) -> Self {
        let mut board = Board::new(rom, 0x4000, 0x2000);
        board.prg.map(0, 0);
        board.prg.map_last(1);
        Self { board }
    }
}

impl Mapper for UxRom {
    fn peek(&self, addr: u16) -> Option<u8> {
        self.board.peek(addr)
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if !self.board.write_ram(addr, value) {
            let bank = self.board.bus_conflict(addr, value);
            self.board.prg.map(0, usize::from(bank & 0x0F));
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
