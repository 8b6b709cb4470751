//! Mapper trait and registry.

use ricoh_ppu_2c02::Mirroring;

use crate::CartridgeError;
use crate::mappers::{AxRom, CnRom, GxRom, Mmc1, Nrom, Unrom180, UxRom};
use crate::rom::Rom;

/// Translates CPU and PPU addresses to cartridge ROM/RAM.
///
/// Construction maps the power-on windows. CPU reads return `None` where
/// the board does not drive the data bus. `chr_read` takes `&mut self` so
/// boards that watch the PPU address bus can update latches.
pub trait Mapper {
    fn peek(&self, addr: u16) -> Option<u8>;

    fn cpu_read(&mut self, addr: u16) -> Option<u8> {
        self.peek(addr)
    }

    fn cpu_write(&mut self, addr: u16, value: u8);
    fn chr_read(&mut self, addr: u16) -> u8;
    fn chr_write(&mut self, addr: u16, value: u8);
    fn mirroring(&self) -> Mirroring;

    /// Whether the mapper is asserting an IRQ. Default: no IRQ.
    fn irq_pending(&self) -> bool {
        false
    }
}

type Constructor = fn(Rom) -> Box<dyn Mapper>;

/// Supported boards by iNES mapper number.
const REGISTRY: &[(u16, &str, Constructor)] = &[
    (0, "NROM", |rom| Box::new(Nrom::new(rom))),
    (1, "MMC1", |rom| Box::new(Mmc1::new(rom))),
    (2, "UxROM", |rom| Box::new(UxRom::new(rom))),
    (3, "CNROM", |rom| Box::new(CnRom::new(rom))),
    (7, "AxROM", |rom| Box::new(AxRom::new(rom))),
    (66, "GxROM", |rom| Box::new(GxRom::new(rom))),
    (180, "UNROM-180", |rom| Box::new(Unrom180::new(rom))),
];

/// Board name for a mapper number, if supported.
#[must_use]
pub fn mapper_name(id: u16) -> Option<&'static str> {
    REGISTRY
        .iter()
        .find(|(number, _, _)| *number == id)
        .map(|(_, name, _)| *name)
}

/// Build the board a ROM's header asks for.
pub fn create_mapper(rom: Rom) -> Result<Box<dyn Mapper>, CartridgeError> {
    let id = rom.header.mapper;
    REGISTRY
        .iter()
        .find(|(number, _, _)| *number == id)
        .map(|(_, _, construct)| construct(rom))
        .ok_or(CartridgeError::UnsupportedMapper(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_names() {
        assert_eq!(mapper_name(1), Some("MMC1"));
        assert_eq!(mapper_name(180), Some("UNROM-180"));
        assert_eq!(mapper_name(4), None);
    }
}
