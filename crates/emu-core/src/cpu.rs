//! CPU core trait.

use crate::{Bus, Tickable};

/// A CPU core that executes whole instructions.
///
/// The bus is passed in, not owned, so the machine can keep the chips it
/// routes to. Every internal clock pulse of an instruction ticks the bus
/// exactly once, so other chips see the same interleaving as hardware.
pub trait Cpu {
    /// The type used for register inspection.
    type Registers;

    /// Failure raised by an instruction that cannot be executed.
    type Error;

    /// Execute one instruction (or service one interrupt).
    ///
    /// Returns the number of CPU cycles consumed, including DMA stalls.
    fn step<B: Bus + Tickable>(&mut self, bus: &mut B) -> Result<u32, Self::Error>;

    /// Run the reset sequence, loading PC from the reset vector.
    fn reset<B: Bus + Tickable>(&mut self, bus: &mut B);

    /// Returns the current program counter.
    fn pc(&self) -> u16;

    /// Returns a snapshot of all registers for inspection.
    fn registers(&self) -> Self::Registers;

    /// Returns true if the CPU has jammed and needs a reset.
    fn is_halted(&self) -> bool;

    /// Total cycles executed since power-on.
    fn cycles(&self) -> u64;
}
