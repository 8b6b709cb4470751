//! Cycle-accurate NES emulator.
//!
//! Wires the 2A03's CPU and APU, the 2C02 PPU and a cartridge board onto
//! one bus. The CPU is the clock source: each CPU cycle ticks the PPU three
//! times (3.2 on average for PAL) and the APU once.
//!
//! One frame = 341 PPU dots × 262 scanlines = 89,342 PPU cycles.

mod bus;
mod config;
mod controller;
mod error;
mod nes;

pub use bus::NesBus;
pub use config::NesConfig;
pub use controller::{Button, Controller};
pub use emu_core::Region;
pub use error::NesError;
pub use nes::Nes;
pub use ricoh_ppu_2c02::{FB_HEIGHT, FB_WIDTH};
