use mos_6502::CpuError;
use nes_cartridge::CartridgeError;
use thiserror::Error;

/// Failure loading or running a machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NesError {
    #[error("cartridge: {0}")]
    Cartridge(#[from] CartridgeError),
    #[error("CPU: {0}")]
    Cpu(#[from] CpuError),
}

impl NesError {
    /// Process exit status for the command-line runner.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Cartridge(CartridgeError::UnsupportedMapper(_)) => 3,
            Self::Cartridge(_) => 2,
            Self::Cpu(_) => 4,
        }
    }
}
