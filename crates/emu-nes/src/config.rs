//! NES configuration.

use emu_core::Region;

/// Machine configuration.
#[derive(Debug, Clone, Default)]
pub struct NesConfig {
    /// iNES file contents.
    pub rom_data: Vec<u8>,
    /// Video region. Defaults to NTSC.
    pub region: Region,
    /// Start here instead of at the reset vector. The nestest ROM's
    /// automated mode begins at $C000.
    pub entry_point: Option<u16>,
}

impl NesConfig {
    /// NTSC machine booting through the reset vector.
    #[must_use]
    pub fn new(rom_data: Vec<u8>) -> Self {
        Self {
            rom_data,
            ..Self::default()
        }
    }
}
