//! Flat 64K RAM bus for CPU tests.

use crate::{Bus, Tickable};

/// 64 KiB of RAM with no devices attached.
///
/// Counts ticks and exposes the interrupt lines as plain fields, which is
/// all a CPU test needs.
pub struct SimpleBus {
    memory: Box<[u8; 0x10000]>,
    /// Cycles ticked since creation.
    pub ticks: u64,
    /// Pending NMI edge, consumed by [`Bus::poll_nmi`].
    pub nmi: bool,
    /// IRQ line level.
    pub irq: bool,
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: Box::new([0; 0x10000]),
            ticks: 0,
            nmi: false,
            irq: false,
        }
    }

    /// Copy `data` into memory starting at `address`, wrapping at $FFFF.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let mut addr = address;
        for &byte in data {
            self.memory[addr as usize] = byte;
            addr = addr.wrapping_add(1);
        }
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    fn write(&mut self, address: u16, value: u8) {
        self.memory[address as usize] = value;
    }

    fn peek(&self, address: u16) -> u8 {
        self.memory[address as usize]
    }

    fn poll_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi)
    }

    fn irq_line(&self) -> bool {
        self.irq
    }
}

impl Tickable for SimpleBus {
    fn tick(&mut self) {
        self.ticks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_wraps_at_top_of_memory() {
        let mut bus = SimpleBus::new();
        bus.load(0xFFFF, &[0x11, 0x22]);
        assert_eq!(bus.peek(0xFFFF), 0x11);
        assert_eq!(bus.peek(0x0000), 0x22);
    }

    #[test]
    fn nmi_is_consumed_once() {
        let mut bus = SimpleBus::new();
        bus.nmi = true;
        assert!(bus.poll_nmi());
        assert!(!bus.poll_nmi());
    }

    #[test]
    fn tick_n_counts() {
        let mut bus = SimpleBus::new();
        bus.tick_n(7);
        assert_eq!(bus.ticks, 7);
    }
}
