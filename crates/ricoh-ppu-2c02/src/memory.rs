//! PPU address space: pattern tables on the cartridge, nametables in the
//! console's 2 KiB of VRAM, and 32 bytes of palette RAM.

/// Nametable arrangement selected by the cartridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    /// $2000/$2400 share a page, as do $2800/$2C00 (vertical scrolling).
    Horizontal,
    /// $2000/$2800 share a page, as do $2400/$2C00 (horizontal scrolling).
    Vertical,
    /// Every nametable maps to the first page.
    SingleScreenLower,
    /// Every nametable maps to the second page.
    SingleScreenUpper,
    /// Four distinct nametables. Needs cartridge VRAM, which no supported
    /// board provides, so the PPU treats it as vertical.
    FourScreen,
}

/// The cartridge side of the PPU bus.
///
/// Pattern-table accesses ($0000-$1FFF) go through here, and the board
/// decides how the console's VRAM backs the four nametables.
pub trait ChrBus {
    fn chr_read(&mut self, addr: u16) -> u8;
    fn chr_write(&mut self, addr: u16, value: u8);
    fn mirroring(&self) -> Mirroring;
}

/// Offset into the 2 KiB VRAM for a nametable address ($2000-$3EFF).
#[must_use]
pub fn nametable_offset(addr: u16, mirroring: Mirroring) -> usize {
    let offset = addr & 0x0FFF;
    let page = offset / 0x0400;
    let physical = match mirroring {
        Mirroring::Horizontal => page / 2,
        Mirroring::Vertical | Mirroring::FourScreen => page & 1,
        Mirroring::SingleScreenLower => 0,
        Mirroring::SingleScreenUpper => 1,
    };
    usize::from(physical * 0x0400 + (offset & 0x03FF))
}

/// Index into palette RAM for an address in $3F00-$3FFF.
///
/// The sprite palettes' colour-0 entries ($3F10/$3F14/$3F18/$3F1C) alias
/// the background entries below them.
#[must_use]
pub fn palette_offset(addr: u16) -> usize {
    let index = usize::from(addr & 0x1F);
    if index & 0x13 == 0x10 { index & 0x0F } else { index }
}

/// Console-side PPU memory.
pub(crate) struct Vram {
    pub(crate) nametables: [u8; 0x0800],
    pub(crate) palette: [u8; 32],
    four_screen_warned: bool,
}

impl Vram {
    pub(crate) fn new() -> Self {
        Self {
            nametables: [0; 0x0800],
            palette: [0; 32],
            four_screen_warned: false,
        }
    }

    fn nametable_index<C: ChrBus + ?Sized>(&mut self, addr: u16, chr: &C) -> usize {
        let mirroring = chr.mirroring();
        if mirroring == Mirroring::FourScreen && !self.four_screen_warned {
            log::warn!("four-screen mirroring is not supported, using vertical");
            self.four_screen_warned = true;
        }
        nametable_offset(addr, mirroring)
    }

    pub(crate) fn read<C: ChrBus + ?Sized>(&mut self, addr: u16, chr: &mut C) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => chr.chr_read(addr),
            0x2000..=0x3EFF => {
                let index = self.nametable_index(addr, chr);
                self.nametables[index]
            }
            _ => self.palette[palette_offset(addr)],
        }
    }

    pub(crate) fn write<C: ChrBus + ?Sized>(&mut self, addr: u16, value: u8, chr: &mut C) {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => chr.chr_write(addr, value),
            0x2000..=0x3EFF => {
                let index = self.nametable_index(addr, chr);
                self.nametables[index] = value;
            }
            _ => self.palette[palette_offset(addr)] = value & 0x3F,
        }
    }
}
