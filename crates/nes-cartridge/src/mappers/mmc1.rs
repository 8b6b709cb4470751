use ricoh_ppu_2c02::Mirroring;

use crate::board::Board;
use crate::mapper::Mapper;
use crate::rom::Rom;

/// MMC1 (Mapper 1, SxROM): serial shift register bank switching.
///
/// - 5-bit shift register loaded one bit at a time via writes to $8000-$FFFF,
///   least significant bit first
/// - After 5 writes, the value goes to the register picked by address bits 13-14
/// - Writing with bit 7 set resets the shift register and sets PRG mode 3
/// - PRG: 32K, or 16K with either half fixed
/// - CHR: one 8K or two 4K banks
/// - PRG RAM: 8K at $6000-$7FFF
pub struct Mmc1 {
    board: Board,
    shift: u8,
    shift_count: u8,
    control: u8,
    chr_bank_0: u8,
    chr_bank_1: u8,
    prg_bank: u8,
}

impl Mmc1 {
    #[must_use]
    pub fn new(rom: Rom) -> Self {
        let mut mapper = Self {
            board: Board::new(rom, 0x4000, 0x1000),
            shift: 0,
            shift_count: 0,
            // PRG mode 3 (fix last bank) on power-up
            control: 0x0C,
            chr_bank_0: 0,
            chr_bank_1: 0,
            prg_bank: 0,
        };
        mapper.update_banks();
        mapper
    }

    fn write_register(&mut self, addr: u16, value: u8) {
        if value & 0x80 != 0 {
            self.shift = 0;
            self.shift_count = 0;
            self.control |= 0x0C;
            self.update_banks();
            return;
        }

        self.shift |= (value & 1) << self.shift_count;
        self.shift_count += 1;
        if self.shift_count < 5 {
            return;
        }

        let data = self.shift;
        match (addr >> 13) & 0x03 {
            0 => self.control = data,
            1 => self.chr_bank_0 = data,
            2 => self.chr_bank_1 = data,
            _ => self.prg_bank = data & 0x0F,
        }
        self.shift = 0;
        self.shift_count = 0;
        self.update_banks();
    }

    fn update_banks(&mut self) {
        let prg = usize::from(self.prg_bank);
        match (self.control >> 2) & 0x03 {
            // 32K: low bit of the bank number ignored
            0 | 1 => {
                self.board.prg.map(0, prg & !1);
                self.board.prg.map(1, prg | 1);
            }
            2 => {
                self.board.prg.map(0, 0);
                self.board.prg.map(1, prg);
            }
            _ => {
                self.board.prg.map(0, prg);
                self.board.prg.map_last(1);
            }
        }

        if self.control & 0x10 == 0 {
            let bank = usize::from(self.chr_bank_0 & 0x1E);
            self.board.chr.map(0, bank);
            self.board.chr.map(1, bank | 1);
        } else {
            self.board.chr.map(0, usize::from(self.chr_bank_0));
            self.board.chr.map(1, usize::from(self.chr_bank_1));
        }

        self.board.mirroring = match self.control & 0x03 {
            0 => Mirroring::SingleScreenLower,
            1 => Mirroring::SingleScreenUpper,
            2 => Mirroring::Vertical,
            _ => Mirroring::Horizontal,
        };
    }
}

impl Mapper for Mmc1 {
    fn peek(&self, addr: u16) -> Option<u8> {
        self.board.peek(addr)
    }

    fn cpu_write(&mut self, addr: u16, value: u8) {
        if !self.board.write_ram(addr, value) {
            self.write_register(addr, value);
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
