use thiserror::Error;

/// Why a cartridge image could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartridgeError {
    #[error("invalid iNES header: {reason}")]
    InvalidHeader { reason: &'static str },
    #[error("image truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u16),
}
