//! NES cartridges: iNES image parsing and the mapper boards that sit
//! between the console buses and the cartridge ROM/RAM.
//!
//! A [`Cartridge`] answers CPU accesses at $4020-$FFFF and implements
//! [`ChrBus`] for the PPU's pattern tables and nametable mirroring.

#![allow(clippy::cast_possible_truncation)]

mod bank;
mod board;
mod error;
mod header;
mod mapper;
mod mappers;
mod rom;

pub use error::CartridgeError;
pub use header::{CHR_PAGE_SIZE, HEADER_SIZE, Header, PRG_PAGE_SIZE, TRAINER_SIZE};
pub use mapper::{Mapper, create_mapper, mapper_name};
pub use mappers::{AxRom, CnRom, GxRom, Mmc1, Nrom, Unrom180, UxRom};
pub use ricoh_ppu_2c02::{ChrBus, Mirroring};
pub use rom::Rom;

/// A loaded cartridge: the parsed header and the board built for it.
pub struct Cartridge {
    header: Header,
    name: &'static str,
    mapper: Box<dyn Mapper>,
}

impl Cartridge {
    /// Parse an iNES image and build its board.
    ///
    /// # Errors
    ///
    /// Fails on a bad header, a truncated image, or a mapper number with
    /// no board implementation.
    pub fn from_ines(data: &[u8]) -> Result<Self, CartridgeError> {
        let rom = Rom::from_ines(data)?;
        let header = rom.header.clone();
        let name = mapper_name(header.mapper).unwrap_or("unknown");
        let mapper = create_mapper(rom)?;
        log::info!(
            "cartridge: mapper {} ({name}), {}K PRG, {}, {:?} mirroring{}",
            header.mapper,
            header.prg_rom_size() / 1024,
            if header.chr_pages == 0 {
                "8K CHR RAM".to_string()
            } else {
                format!("{}K CHR", header.chr_rom_size() / 1024)
            },
            header.mirroring,
            if header.battery { ", battery" } else { "" },
        );
        Ok(Self {
            header,
            name,
            mapper,
        })
    }

    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Board name, e.g. "MMC1".
    #[must_use]
    pub fn mapper_name(&self) -> &'static str {
        self.name
    }

    /// CPU read. `None` means the cartridge leaves the bus open.
    pub fn cpu_read(&mut self, addr: u16) -> Option<u8> {
        self.mapper.cpu_read(addr)
    }

    pub fn cpu_write(&mut self, addr: u16, value: u8) {
        self.mapper.cpu_write(addr, value);
    }

    /// Side-effect-free read for debuggers and trace output.
    #[must_use]
    pub fn peek(&self, addr: u16) -> Option<u8> {
        self.mapper.peek(addr)
    }

    #[must_use]
    pub fn irq_pending(&self) -> bool {
        self.mapper.irq_pending()
    }
}

impl ChrBus for Cartridge {
    fn chr_read(&mut self, addr: u16) -> u8 {
        self.mapper.chr_read(addr)
    }

    fn chr_write(&mut self, addr: u16, value: u8) {
        self.mapper.chr_write(addr, value);
    }

    fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring()
    }
}
