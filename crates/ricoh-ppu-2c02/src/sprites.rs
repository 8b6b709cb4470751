//! Per-scanline sprite evaluation and pixel selection.

/// A sprite pixel ready for compositing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SpritePixel {
    /// 2-bit pattern value, never 0.
    pub pattern: u8,
    /// Palette 4-7.
    pub palette: u8,
    pub behind_background: bool,
    pub sprite_zero: bool,
}

/// Sprites selected for the next scanline and their fetched patterns.
pub(crate) struct SpriteLine {
    pub secondary_oam: [u8; 32],
    pub count: u8,
    pub zero_on_line: bool,
    pattern_lo: [u8; 8],
    pattern_hi: [u8; 8],
    attributes: [u8; 8],
    x: [u8; 8],
}

impl SpriteLine {
    pub(crate) fn new() -> Self {
        Self {
            secondary_oam: [0xFF; 32],
            count: 0,
            zero_on_line: false,
            pattern_lo: [0; 8],
            pattern_hi: [0; 8],
            attributes: [0; 8],
            x: [0; 8],
        }
    }

    pub(crate) fn clear(&mut self) {
        self.count = 0;
        self.zero_on_line = false;
        self.pattern_lo = [0; 8];
        self.pattern_hi = [0; 8];
    }

    /// Copy up to eight sprites in range of `line` into secondary OAM.
    /// Returns the sprite-overflow flag as the 2C02 computes it.
    ///
    /// After eight hits the hardware keeps scanning, but every miss steps
    /// the byte offset within an entry along with the sprite index (without
    /// carry), so tile, attribute and X bytes get compared as if they were
    /// Y. That misses real overflows and reports false ones.
    pub(crate) fn evaluate(&mut self, oam: &[u8; 256], line: u16, height: u16) -> bool {
        self.secondary_oam = [0xFF; 32];
        self.count = 0;
        self.zero_on_line = false;

        let in_range = |y: u8| line.wrapping_sub(u16::from(y)) < height;

        let mut n = 0usize;
        while n < 64 && self.count < 8 {
            if in_range(oam[n * 4]) {
                let slot = usize::from(self.count) * 4;
                self.secondary_oam[slot..slot + 4].copy_from_slice(&oam[n * 4..n * 4 + 4]);
                if n == 0 {
                    self.zero_on_line = true;
                }
                self.count += 1;
            }
            n += 1;
        }

        let mut m = 0usize;
        while n < 64 {
            if in_range(oam[n * 4 + m]) {
                return true;
            }
            n += 1;
            m = (m + 1) & 3;
        }
        false
    }

    /// Pattern address for the selected sprite's row on `line`. Returns the
    /// low-plane address; the high plane is 8 bytes above it.
    pub(crate) fn pattern_address(&self, index: usize, line: u16, height: u16, table: u16) -> u16 {
        let entry = &self.secondary_oam[index * 4..index * 4 + 4];
        let tile = entry[1];
        let flip_v = entry[2] & 0x80 != 0;
        let mut row = line.wrapping_sub(u16::from(entry[0])) & (height - 1);
        if flip_v {
            row = height - 1 - row;
        }

        if height == 16 {
            // 8x16: bit 0 picks the table, the top half uses the even tile.
            let table = u16::from(tile & 1) * 0x1000;
            let tile = u16::from(tile & 0xFE) + row / 8;
            table + tile * 16 + (row & 7)
        } else {
            table + u16::from(tile) * 16 + row
        }
    }

    /// Latch fetched pattern bytes for sprite `index`.
    pub(crate) fn load(&mut self, index: usize, lo: u8, hi: u8) {
        let attributes = self.secondary_oam[index * 4 + 2];
        let (lo, hi) = if attributes & 0x40 != 0 {
            (flip_byte(lo), flip_byte(hi))
        } else {
            (lo, hi)
        };
        self.pattern_lo[index] = lo;
        self.pattern_hi[index] = hi;
        self.attributes[index] = attributes;
        self.x[index] = self.secondary_oam[index * 4 + 3];
    }

    /// First opaque sprite pixel at screen column `x`.
    pub(crate) fn pixel(&self, x: u16) -> Option<SpritePixel> {
        for i in 0..usize::from(self.count) {
            let offset = x.wrapping_sub(u16::from(self.x[i]));
            if offset > 7 {
                continue;
            }
            let shift = 7 - offset;
            let lo = (self.pattern_lo[i] >> shift) & 1;
            let hi = (self.pattern_hi[i] >> shift) & 1;
            let pattern = (hi << 1) | lo;
            if pattern == 0 {
                continue;
            }
            return Some(SpritePixel {
                pattern,
                palette: (self.attributes[i] & 0x03) + 4,
                behind_background: self.attributes[i] & 0x20 != 0,
                sprite_zero: self.zero_on_line && i == 0,
            });
        }
        None
    }
}

/// Reverse the bits in a byte (for horizontal sprite flip).
pub(crate) fn flip_byte(mut b: u8) -> u8 {
    b = (b & 0xF0) >> 4 | (b & 0x0F) << 4;
    b = (b & 0xCC) >> 2 | (b & 0x33) << 2;
    (b & 0xAA) >> 1 | (b & 0x55) << 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_byte_works() {
        assert_eq!(flip_byte(0b1000_0000), 0b0000_0001);
        assert_eq!(flip_byte(0b1010_0101), 0b1010_0101);
        assert_eq!(flip_byte(0xFF), 0xFF);
        assert_eq!(flip_byte(0x00), 0x00);
    }

    /// Sprites 0-7 on line 50; every other OAM byte is out of range.
    fn line_with_eight_on_50() -> [u8; 256] {
        let mut oam = [200u8; 256];
        for i in 0..8 {
            oam[i * 4] = 50;
        }
        oam
    }

    #[test]
    fn eight_sprite_limit() {
        let mut line = SpriteLine::new();
        let oam = line_with_eight_on_50();
        assert!(!line.evaluate(&oam, 50, 8));
        assert_eq!(line.count, 8);
        assert!(line.zero_on_line);
        assert_eq!(&line.secondary_oam[28..32], &[50, 200, 200, 200]);
    }

    #[test]
    fn ninth_sprite_sets_overflow() {
        let mut oam = [0xFFu8; 256];
        for i in 0..9 {
            oam[i * 4] = 50;
        }
        let mut line = SpriteLine::new();
        assert!(line.evaluate(&oam, 50, 8));
        assert_eq!(line.count, 8);
    }

    #[test]
    fn overflow_found_after_misses_on_later_sprite() {
        // Misses at n=8..=11 walk m back round to 0 for sprite 12.
        let mut oam = line_with_eight_on_50();
        oam[12 * 4] = 50;
        let mut line = SpriteLine::new();
        assert!(line.evaluate(&oam, 50, 8));
    }

    #[test]
    fn overflow_reads_tile_byte_as_y() {
        // Sprite 8 misses, so sprite 9 is checked at m=1: its tile byte.
        let mut oam = line_with_eight_on_50();
        oam[9 * 4 + 1] = 50;
        let mut line = SpriteLine::new();
        assert!(line.evaluate(&oam, 50, 8), "tile byte in range");
    }

    #[test]
    fn overflow_reads_attribute_byte_as_y() {
        // Sprites 8 and 9 miss, so sprite 10 is checked at m=2.
        let mut oam = line_with_eight_on_50();
        oam[10 * 4 + 2] = 50;
        let mut line = SpriteLine::new();
        assert!(line.evaluate(&oam, 50, 8));
    }

    #[test]
    fn real_overflow_missed_after_diagonal_read() {
        // Sprite 8 misses. Sprites 9-11 really are on line 50, but they are
        // checked at m=1, 2 and 3, where their bytes are out of range.
        let mut oam = line_with_eight_on_50();
        for i in 9..12 {
            oam[i * 4] = 50;
        }
        let mut line = SpriteLine::new();
        assert!(!line.evaluate(&oam, 50, 8), "overflow flag set despite bug");
        assert_eq!(line.count, 8);
    }

    #[test]
    fn flipped_pattern_row_addresses() {
        let mut line = SpriteLine::new();
        // Y=10, tile 3, flip vertical.
        line.secondary_oam[..4].copy_from_slice(&[10, 3, 0x80, 0]);
        line.count = 1;
        assert_eq!(line.pattern_address(0, 10, 8, 0x1000), 0x1000 + 3 * 16 + 7);

        // 8x16, tile 5 (odd: table $1000, tiles 4/5), row 9 → bottom tile.
        line.secondary_oam[..4].copy_from_slice(&[10, 5, 0x00, 0]);
        assert_eq!(line.pattern_address(0, 19, 16, 0), 0x1000 + 5 * 16 + 1);
    }

    #[test]
    fn first_opaque_sprite_wins() {
        let mut line = SpriteLine::new();
        line.secondary_oam[..8].copy_from_slice(&[0, 0, 0x01, 10, 0, 0, 0x22, 10]);
        line.count = 2;
        line.zero_on_line = true;
        line.load(0, 0x00, 0x00);
        line.load(1, 0x80, 0x80);

        let pixel = line.pixel(10).expect("sprite 1 is opaque at x=10");
        assert_eq!(pixel.pattern, 3);
        assert_eq!(pixel.palette, 6);
        assert!(pixel.behind_background);
        assert!(!pixel.sprite_zero);
        assert_eq!(line.pixel(11), None);
    }
}
