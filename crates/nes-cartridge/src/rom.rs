use crate::CartridgeError;
use crate::header::Header;

/// A parsed image: header plus its PRG and CHR ROM.
#[derive(Debug, Clone)]
pub struct Rom {
    pub header: Header,
    pub prg: Vec<u8>,
    /// Empty when the board uses CHR RAM.
    pub chr: Vec<u8>,
}

impl Rom {
    /// Split an iNES image into its pages. The trainer, if any, is skipped.
    /// Bytes past the declared CHR ROM are ignored.
    pub fn from_ines(data: &[u8]) -> Result<Self, CartridgeError> {
        let header = Header::parse(data)?;
        let expected = header.image_size();
        if data.len() < expected {
            return Err(CartridgeError::Truncated {
                expected,
                actual: data.len(),
            });
        }

        let prg_start = header.prg_offset();
        let chr_start = prg_start + header.prg_rom_size();
        let prg = data[prg_start..chr_start].to_vec();
        let chr = data[chr_start..expected].to_vec();
        Ok(Self { header, prg, chr })
    }
}
