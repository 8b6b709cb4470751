//! Board implementations.

mod axrom;
mod cnrom;
mod gxrom;
mod mmc1;
mod nrom;
mod unrom180;
mod uxrom;

pub use axrom::AxRom;
pub use cnrom::CnRom;
pub use gxrom::GxRom;
pub use mmc1::Mmc1;
pub use nrom::Nrom;
pub use unrom180::Unrom180;
pub use uxrom::UxRom;
