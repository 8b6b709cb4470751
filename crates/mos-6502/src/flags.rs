//! 6502 processor status register (P).
//!
//! Bits 4 and 5 form the break field. Neither exists as a latch inside the
//! CPU: bit 5 always reads as 1, and bit 4 only appears in the copy pushed
//! to the stack, where it tells BRK/PHP apart from IRQ/NMI.

/// Carry.
pub const C: u8 = 0x01;

/// Zero.
pub const Z: u8 = 0x02;

/// Interrupt disable. When set, the IRQ line is ignored.
pub const I: u8 = 0x04;

/// Decimal mode. Stored but ignored by the 2A03's ALU.
pub const D: u8 = 0x08;

/// Break (pushed copies only).
pub const B: u8 = 0x10;

/// Unused, always reads as 1.
pub const U: u8 = 0x20;

/// Overflow.
pub const V: u8 = 0x40;

/// Negative.
pub const N: u8 = 0x80;

/// Processor status register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status(pub u8);

impl Status {
    /// Status with only the unused bit set.
    #[must_use]
    pub const fn new() -> Self {
        Self(U)
    }

    /// Status as restored by PLP/RTI: break cleared, unused set.
    #[must_use]
    pub const fn from_stack(value: u8) -> Self {
        Self((value | U) & !B)
    }

    /// Byte pushed to the stack. `brk` is true for BRK/PHP.
    #[must_use]
    pub const fn to_stack(self, brk: bool) -> u8 {
        if brk { self.0 | U | B } else { (self.0 | U) & !B }
    }

    /// Raw value as shown in traces.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    pub fn set(&mut self, flag: u8) {
        self.0 |= flag;
    }

    pub fn clear(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    /// Set or clear a flag based on condition.
    pub fn set_if(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    /// Update N and Z from a result.
    pub fn update_nz(&mut self, value: u8) {
        self.set_if(N, value & 0x80 != 0);
        self.set_if(Z, value == 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushed_copies_differ_only_in_break() {
        let p = Status(C | N);
        assert_eq!(p.to_stack(true), C | N | U | B);
        assert_eq!(p.to_stack(false), C | N | U);
    }

    #[test]
    fn restore_drops_break_and_keeps_unused() {
        assert_eq!(Status::from_stack(0xFF).bits(), 0xEF);
        assert_eq!(Status::from_stack(0x00).bits(), U);
    }

    #[test]
    fn update_nz() {
        let mut p = Status::new();
        p.update_nz(0);
        assert!(p.is_set(Z) && !p.is_set(N));
        p.update_nz(0x80);
        assert!(!p.is_set(Z) && p.is_set(N));
    }
}
