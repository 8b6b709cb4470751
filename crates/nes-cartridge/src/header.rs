//! iNES / NES 2.0 header.

use ricoh_ppu_2c02::Mirroring;

use crate::CartridgeError;

pub const HEADER_SIZE: usize = 16;
pub const TRAINER_SIZE: usize = 512;
pub const PRG_PAGE_SIZE: usize = 0x4000;
pub const CHR_PAGE_SIZE: usize = 0x2000;

const MAGIC: &[u8; 4] = b"NES\x1A";

/// The 16-byte header at the front of an iNES image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// PRG ROM size in 16 KiB pages.
    pub prg_pages: u16,
    /// CHR ROM size in 8 KiB pages; 0 means the board has CHR RAM.
    pub chr_pages: u16,
    pub mapper: u16,
    /// NES 2.0 submapper, 0 for iNES 1.0 images.
    pub submapper: u8,
    pub mirroring: Mirroring,
    pub battery: bool,
    pub trainer: bool,
    pub nes2: bool,
}

impl Header {
    pub fn parse(data: &[u8]) -> Result<Self, CartridgeError> {
        let Some(bytes) = data.get(..HEADER_SIZE) else {
            return Err(CartridgeError::Truncated {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        };
        if &bytes[..4] != MAGIC {
            return Err(CartridgeError::InvalidHeader {
                reason: "missing NES<EOF> magic",
            });
        }

        let flags6 = bytes[6];
        let flags7 = bytes[7];
        let nes2 = flags7 & 0x0C == 0x08;

        let mirroring = if flags6 & 0x08 != 0 {
            Mirroring::FourScreen
        } else if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        let mut mapper = u16::from(flags6 >> 4);
        let mut submapper = 0;
        let mut prg_pages = u16::from(bytes[4]);
        let mut chr_pages = u16::from(bytes[5]);

        if nes2 {
            mapper |= u16::from(flags7 & 0xF0) | (u16::from(bytes[8] & 0x0F) << 8);
            submapper = bytes[8] >> 4;
            let (prg_hi, chr_hi) = (bytes[9] & 0x0F, bytes[9] >> 4);
            if prg_hi == 0x0F || chr_hi == 0x0F {
                return Err(CartridgeError::InvalidHeader {
                    reason: "exponent-multiplier ROM sizes are not supported",
                });
            }
            prg_pages |= u16::from(prg_hi) << 8;
            chr_pages |= u16::from(chr_hi) << 8;
        } else if bytes[12..16].iter().all(|&b| b == 0) {
            mapper |= u16::from(flags7 & 0xF0);
        } else {
            // Old dumping tools wrote signatures into bytes 7-15; only the
            // low nibble of the mapper number can be trusted.
            log::warn!("iNES header has junk in bytes 12-15, ignoring mapper high nibble");
        }

        if prg_pages == 0 {
            return Err(CartridgeError::InvalidHeader {
                reason: "image declares no PRG ROM",
            });
        }

        Ok(Self {
            prg_pages,
            chr_pages,
            mapper,
            submapper,
            mirroring,
            battery: flags6 & 0x02 != 0,
            trainer: flags6 & 0x04 != 0,
            nes2,
        })
    }

    #[must_use]
    pub fn prg_rom_size(&self) -> usize {
        usize::from(self.prg_pages) * PRG_PAGE_SIZE
    }

    #[must_use]
    pub fn chr_rom_size(&self) -> usize {
        usize::from(self.chr_pages) * CHR_PAGE_SIZE
    }

    /// Offset of the first PRG byte in the image.
    #[must_use]
    pub fn prg_offset(&self) -> usize {
        HEADER_SIZE + if self.trainer { TRAINER_SIZE } else { 0 }
    }

    /// Total image length the header promises.
    #[must_use]
    pub fn image_size(&self) -> usize {
        self.prg_offset() + self.prg_rom_size() + self.chr_rom_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(bytes: [u8; 12]) -> [u8; 16] {
        let mut data = [0; 16];
        data[..4].copy_from_slice(MAGIC);
        data[4..].copy_from_slice(&bytes);
        data
    }

    #[test]
    fn ines_fields() {
        let data = header([2, 1, 0x13, 0x40, 0, 0, 0, 0, 0, 0, 0, 0]);
        let h = Header::parse(&data).expect("valid header");
        assert_eq!(h.prg_pages, 2);
        assert_eq!(h.chr_pages, 1);
        assert_eq!(h.mapper, 0x41);
        assert_eq!(h.mirroring, Mirroring::Vertical);
        assert!(h.battery);
        assert!(!h.trainer);
        assert!(!h.nes2);
        assert_eq!(h.image_size(), 16 + 0x8000 + 0x2000);
    }

    #[test]
    fn trainer_moves_prg() {
        let data = header([1, 0, 0x04, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let h = Header::parse(&data).expect("valid header");
        assert_eq!(h.prg_offset(), 16 + 512);
    }

    #[test]
    fn four_screen_bit_wins() {
        let data = header([1, 0, 0x09, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let h = Header::parse(&data).expect("valid header");
        assert_eq!(h.mirroring, Mirroring::FourScreen);
    }

    #[test]
    fn nes2_mapper_and_size_high_bits() {
        let data = header([1, 2, 0x40, 0xB8, 0x31, 0x10, 0, 0, 0, 0, 0, 0]);
        let h = Header::parse(&data).expect("valid header");
        assert!(h.nes2);
        assert_eq!(h.mapper, 0x1B4);
        assert_eq!(h.submapper, 3);
        assert_eq!(h.chr_pages, 0x102);
    }

    #[test]
    fn junk_in_tail_masks_mapper_high_nibble() {
        let mut data = header([1, 1, 0x10, 0x40, 0, 0, 0, 0, 0, 0, 0, 0]);
        data[12..16].copy_from_slice(b"Dude");
        let h = Header::parse(&data).expect("valid header");
        assert_eq!(h.mapper, 1);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut data = header([1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        data[3] = 0;
        assert!(matches!(
            Header::parse(&data),
            Err(CartridgeError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn rejects_short_input() {
        assert_eq!(
            Header::parse(b"NES\x1A"),
            Err(CartridgeError::Truncated {
                expected: 16,
                actual: 4
            })
        );
    }

    #[test]
    fn rejects_empty_prg() {
        let data = header([0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert!(Header::parse(&data).is_err());
    }
}
