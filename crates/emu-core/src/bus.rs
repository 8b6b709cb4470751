//! Memory bus interface.

/// Memory bus interface.
///
/// Components access memory and peripherals through this trait. The bus
/// handles address decoding and routing to the appropriate device.
///
/// Reads and writes do not advance time on their own. The CPU pairs every
/// access with exactly one [`crate::Tickable::tick`] so that the order of
/// clock and access within a cycle stays under its control.
pub trait Bus {
    /// Read a byte, with any side effects the device attaches to reads.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte.
    fn write(&mut self, address: u16, value: u8);

    /// Read a byte without side effects (for tracing and observation).
    fn peek(&self, address: u16) -> u8;

    /// Consume a latched non-maskable interrupt edge.
    ///
    /// Returns true at most once per edge.
    fn poll_nmi(&mut self) -> bool {
        false
    }

    /// Current level of the shared IRQ line.
    fn irq_line(&self) -> bool {
        false
    }

    /// Take the number of CPU cycles stolen by DMA since the last call.
    fn take_stall_cycles(&mut self) -> u32 {
        0
    }
}
