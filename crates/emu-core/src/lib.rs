//! Core traits and types for cycle-accurate emulation.
//!
//! The CPU drives everything. Each CPU clock pulse is forwarded to a
//! [`Tickable`] clock sink, which advances every other chip on the
//! machine in lockstep. Memory traffic goes through a [`Bus`].

mod bus;
mod cpu;
mod observable;
mod region;
mod simple_bus;
mod tickable;

pub use bus::Bus;
pub use cpu::Cpu;
pub use observable::{Observable, Value, parse_address};
pub use region::Region;
pub use simple_bus::SimpleBus;
pub use tickable::Tickable;
