//! CPU-visible register types and the loopy VRAM address.

/// PPUCTRL ($2000).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Ctrl(pub u8);

impl Ctrl {
    /// Base nametable select, bits 0-1.
    #[must_use]
    pub const fn nametable(self) -> u8 {
        self.0 & 0x03
    }

    /// VRAM address step after a $2007 access.
    #[must_use]
    pub const fn vram_increment(self) -> u16 {
        if self.0 & 0x04 != 0 { 32 } else { 1 }
    }

    /// Pattern table for 8x8 sprites.
    #[must_use]
    pub const fn sprite_table(self) -> u16 {
        if self.0 & 0x08 != 0 { 0x1000 } else { 0 }
    }

    #[must_use]
    pub const fn background_table(self) -> u16 {
        if self.0 & 0x10 != 0 { 0x1000 } else { 0 }
    }

    #[must_use]
    pub const fn sprite_height(self) -> u16 {
        if self.0 & 0x20 != 0 { 16 } else { 8 }
    }

    #[must_use]
    pub const fn nmi_enabled(self) -> bool {
        self.0 & 0x80 != 0
    }
}

/// PPUMASK ($2001).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Mask(pub u8);

impl Mask {
    #[must_use]
    pub const fn greyscale(self) -> bool {
        self.0 & 0x01 != 0
    }

    /// Background visible in the leftmost 8 pixels.
    #[must_use]
    pub const fn background_left(self) -> bool {
        self.0 & 0x02 != 0
    }

    /// Sprites visible in the leftmost 8 pixels.
    #[must_use]
    pub const fn sprites_left(self) -> bool {
        self.0 & 0x04 != 0
    }

    #[must_use]
    pub const fn show_background(self) -> bool {
        self.0 & 0x08 != 0
    }

    #[must_use]
    pub const fn show_sprites(self) -> bool {
        self.0 & 0x10 != 0
    }

    /// Either layer on: the fetch pipeline and scroll counters run.
    #[must_use]
    pub const fn rendering_enabled(self) -> bool {
        self.0 & 0x18 != 0
    }
}

/// PPUSTATUS bits.
pub mod status {
    pub const SPRITE_OVERFLOW: u8 = 0x20;
    pub const SPRITE_ZERO_HIT: u8 = 0x40;
    pub const VBLANK: u8 = 0x80;
}

/// 15-bit VRAM address in the loopy layout:
///
/// ```text
/// yyy NN YYYYY XXXXX
/// ||| || ||||| +++++-- coarse X scroll
/// ||| || +++++-------- coarse Y scroll
/// ||| ++-------------- nametable select
/// +++----------------- fine Y scroll
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VramAddress(pub u16);

impl VramAddress {
    const COARSE_X: u16 = 0x001F;
    const COARSE_Y: u16 = 0x03E0;
    const NAMETABLE: u16 = 0x0C00;
    const NAMETABLE_X: u16 = 0x0400;
    const NAMETABLE_Y: u16 = 0x0800;
    const FINE_Y: u16 = 0x7000;

    #[must_use]
    pub const fn coarse_x(self) -> u16 {
        self.0 & Self::COARSE_X
    }

    #[must_use]
    pub const fn coarse_y(self) -> u16 {
        (self.0 & Self::COARSE_Y) >> 5
    }

    #[must_use]
    pub const fn nametable(self) -> u16 {
        (self.0 & Self::NAMETABLE) >> 10
    }

    #[must_use]
    pub const fn fine_y(self) -> u16 {
        (self.0 & Self::FINE_Y) >> 12
    }

    /// Nametable byte address for the current tile.
    #[must_use]
    pub const fn tile_address(self) -> u16 {
        0x2000 | (self.0 & 0x0FFF)
    }

    /// Attribute byte address for the current tile.
    #[must_use]
    pub const fn attribute_address(self) -> u16 {
        0x23C0 | (self.0 & Self::NAMETABLE) | ((self.0 >> 4) & 0x38) | ((self.0 >> 2) & 0x07)
    }

    /// Shift selecting this tile's 2-bit palette from its attribute byte.
    #[must_use]
    pub const fn attribute_shift(self) -> u16 {
        ((self.0 >> 4) & 0x04) | (self.0 & 0x02)
    }

    /// Coarse X + 1, wrapping from 31 to 0 into the neighbouring nametable.
    pub fn increment_x(&mut self) {
        if self.coarse_x() == 31 {
            self.0 &= !Self::COARSE_X;
            self.0 ^= Self::NAMETABLE_X;
        } else {
            self.0 += 1;
        }
    }

    /// Fine Y + 1, carrying into coarse Y. Coarse Y wraps at 29 into the
    /// other nametable; rows 30 and 31 (attribute memory) wrap to 0 without
    /// switching.
    pub fn increment_y(&mut self) {
        if self.0 & Self::FINE_Y != Self::FINE_Y {
            self.0 += 0x1000;
            return;
        }
        self.0 &= !Self::FINE_Y;
        let coarse_y = match self.coarse_y() {
            29 => {
                self.0 ^= Self::NAMETABLE_Y;
                0
            }
            31 => 0,
            y => y + 1,
        };
        self.0 = (self.0 & !Self::COARSE_Y) | (coarse_y << 5);
    }

    /// Copy coarse X and the horizontal nametable bit from `t`.
    pub fn copy_horizontal(&mut self, t: Self) {
        let bits = Self::COARSE_X | Self::NAMETABLE_X;
        self.0 = (self.0 & !bits) | (t.0 & bits);
    }

    /// Copy fine Y, coarse Y and the vertical nametable bit from `t`.
    pub fn copy_vertical(&mut self, t: Self) {
        let bits = Self::FINE_Y | Self::COARSE_Y | Self::NAMETABLE_Y;
        self.0 = (self.0 & !bits) | (t.0 & bits);
    }
}
