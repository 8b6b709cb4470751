//! Ricoh 2A03 audio processing unit.
//!
//! Two pulse channels, a triangle, a noise generator and a delta
//! modulation channel, clocked by a shared frame sequencer. The APU
//! produces one mixed sample per CPU cycle; resampling and playback are
//! left to the host.
//!
//! The DMC fetches sample bytes from CPU memory. The APU only reports the
//! address it wants through [`Apu::dmc_dma_request`]; the machine's bus
//! performs the read and charges the CPU the stall cycle.

mod apu;
mod dmc;
mod envelope;
mod frame_counter;
mod length_counter;
mod noise;
mod pulse;
mod tables;
mod triangle;

pub use apu::Apu;
