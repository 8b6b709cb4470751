use ricoh_ppu_2c02::Mirroring;

use crate::board::Board;
use crate::mapper::Mapper;
use crate::rom::Rom;

/// UNROM-180 (Mapper 180): UxROM wired to bank the upper half instead.
///
/// Used by Crazy Climber.
///
/// - PRG: first bank fixed at $8000-$BFFF, 16K switchable at $C000-$FFFF
/// - CHR: 8K RAM
/// - Mirroring: fixed from header
pub struct Unrom180 {
    board: Board,
}

impl Unrom180 {
    #[must_use]
    pub fn new(rom: Rom) -> Self {
        let mut board = Board::new(rom, 0x4000, 0x2000);
        board.prg.map(0, 0);
        board.prg.map(1, 0);
        Self { board }
    }
}

impl Mapper for Unrom180 {
    fn peek(&self, addr: u16) -> Option<u8> {
        self.board.peek(addr)
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if !self.board.write_ram(addr, value) {
            let bank = self.board.bus_conflict(addr, value);
            self.board.prg.map(1, usize::from(bank & 0x07));
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
