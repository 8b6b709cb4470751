use ricoh_ppu_2c02::Mirroring;

use crate::board::Board;
use crate::mapper::Mapper;
use crate::rom::Rom;

/// GxROM (Mapper 66): one register selecting both PRG and CHR banks.
///
/// Used by Super Mario Bros. / Duck Hunt and Dragon Power.
///
/// - PRG: 32K switchable at $8000-$FFFF (bits 4-5 of bank register)
/// - CHR: 8K switchable (bits 0-1 of bank register)
/// - Mirroring: fixed from header
pub struct GxRom {
    board: Board,
}

impl GxRom {
    #[must_use]
    pub fn new(rom: Rom) -> Self {
        Self {
            board: Board::new(rom, 0x8000, 0x2000),
        }
    }
}

impl Mapper for GxRom {
    fn peek(&self, addr: u16) -> Option<u8> {
        self.board.peek(addr)
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if !self.board.write_ram(addr, value) {
            let value = self.board.bus_conflict(addr, value);
            self.board.prg.map(0, usize::from((value >> 4) & 0x03));
            self.board.chr.map(0, usize::from(value & 0x03));
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
