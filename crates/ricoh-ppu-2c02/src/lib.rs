//! Ricoh 2C02 picture processing unit.
//!
//! The PPU owns its 2 KiB of nametable VRAM, palette RAM and OAM. Pattern
//! tables live on the cartridge and are reached through [`ChrBus`], which
//! every PPU-side access is handed so the board can watch the address bus.
//! Output is a 256x240 buffer of 6-bit palette indices.

mod memory;
mod ppu;
mod registers;
mod sprites;

pub use memory::{ChrBus, Mirroring, nametable_offset, palette_offset};
pub use ppu::{DOTS_PER_SCANLINE, FB_HEIGHT, FB_WIDTH, Ppu, RenderState, SCANLINES_PER_FRAME};
pub use registers::{Ctrl, Mask, VramAddress, status};
