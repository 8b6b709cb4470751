//! Operand resolution for the 6502 addressing modes.
//!
//! Each mode performs exactly the bus cycles hardware does, including the
//! discarded reads:
//! - Implied/Accumulator: a read of the byte after the opcode
//! - Zero Page,X/Y: a read of the unindexed zero-page address
//! - Absolute,X/Y and (zp),Y: a read of the address before the high byte
//!   is fixed up, taken only on page cross for reads but always for writes
//!   and read-modify-writes
//! - (zp,X): a read of the unindexed pointer

use emu_core::{Bus, Tickable};

use crate::Mos6502;
use crate::opcodes::{Access, Mode};

/// A resolved operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operand {
    /// No operand (implied mode).
    None,
    /// The accumulator register.
    Accumulator,
    /// Literal byte (immediate mode, or a branch offset).
    Immediate(u8),
    /// Effective address, plus the address before indexing.
    Memory { addr: u16, base: u16 },
}

impl Operand {
    const fn memory(addr: u16) -> Self {
        Self::Memory { addr, base: addr }
    }
}

impl Mos6502 {
    /// Resolve the operand for `mode`, ticking the bus for every cycle.
    pub(crate) fn resolve<B: Bus + Tickable>(
        &mut self,
        bus: &mut B,
        mode: Mode,
        access: Access,
    ) -> Operand {
        match mode {
            Mode::Implied => {
                self.dummy_read_pc(bus);
                Operand::None
            }
            Mode::Accumulator => {
                self.dummy_read_pc(bus);
                Operand::Accumulator
            }
            Mode::Immediate | Mode::Relative => Operand::Immediate(self.fetch(bus)),
            Mode::ZeroPage => Operand::memory(u16::from(self.fetch(bus))),
            Mode::ZeroPageX => self.zero_page_indexed(bus, self.regs.x),
            Mode::ZeroPageY => self.zero_page_indexed(bus, self.regs.y),
            Mode::Absolute => Operand::memory(self.fetch_word(bus)),
            Mode::AbsoluteX => {
                let base = self.fetch_word(bus);
                self.indexed(bus, base, self.regs.x, access)
            }
            Mode::AbsoluteY => {
                let base = self.fetch_word(bus);
                self.indexed(bus, base, self.regs.y, access)
            }
            Mode::Indirect => {
                let pointer = self.fetch_word(bus);
                let lo = self.read(bus, pointer);
                // The high byte never carries into the next page: a pointer at
                // $02FF takes its high byte from $0200.
                let hi = self.read(bus, page_wrapped(pointer));
                Operand::Memory {
                    addr: u16::from_le_bytes([lo, hi]),
                    base: pointer,
                }
            }
            Mode::IndirectX => {
                let pointer = self.fetch(bus);
                self.read(bus, u16::from(pointer));
                let pointer = pointer.wrapping_add(self.regs.x);
                let lo = self.read(bus, u16::from(pointer));
                let hi = self.read(bus, u16::from(pointer.wrapping_add(1)));
                Operand::memory(u16::from_le_bytes([lo, hi]))
            }
            Mode::IndirectY => {
                let pointer = self.fetch(bus);
                let lo = self.read(bus, u16::from(pointer));
                let hi = self.read(bus, u16::from(pointer.wrapping_add(1)));
                let base = u16::from_le_bytes([lo, hi]);
                self.indexed(bus, base, self.regs.y, access)
            }
        }
    }

    fn zero_page_indexed<B: Bus + Tickable>(&mut self, bus: &mut B, index: u8) -> Operand {
        let base = self.fetch(bus);
        self.read(bus, u16::from(base));
        Operand::Memory {
            addr: u16::from(base.wrapping_add(index)),
            base: u16::from(base),
        }
    }

    /// 16-bit indexing with the fix-up cycle.
    fn indexed<B: Bus + Tickable>(
        &mut self,
        bus: &mut B,
        base: u16,
        index: u8,
        access: Access,
    ) -> Operand {
        let addr = base.wrapping_add(u16::from(index));
        let crossed = (base ^ addr) & 0xFF00 != 0;
        if crossed || access != Access::Read {
            self.read(bus, (base & 0xFF00) | (addr & 0x00FF));
        }
        Operand::Memory { addr, base }
    }

    /// Conditional branch. One extra cycle when taken, another when the
    /// target is on a different page.
    pub(crate) fn branch<B: Bus + Tickable>(&mut self, bus: &mut B, taken: bool) {
        let offset = self.fetch(bus) as i8;
        if !taken {
            return;
        }
        self.dummy_read_pc(bus);
        let target = self.regs.pc.wrapping_add_signed(i16::from(offset));
        if (target ^ self.regs.pc) & 0xFF00 != 0 {
            self.read(bus, (self.regs.pc & 0xFF00) | (target & 0x00FF));
        }
        self.regs.pc = target;
    }

    /// Load the operand value for a read instruction.
    pub(crate) fn load<B: Bus + Tickable>(
        &mut self,
        bus: &mut B,
        operand: Operand,
    ) -> Result<u8, crate::CpuError> {
        match operand {
            Operand::Immediate(value) => Ok(value),
            Operand::Accumulator => Ok(self.regs.a),
            Operand::Memory { addr, .. } => Ok(self.read(bus, addr)),
            Operand::None => Err(self.unresolved()),
        }
    }

    /// Store through the operand.
    pub(crate) fn store<B: Bus + Tickable>(
        &mut self,
        bus: &mut B,
        operand: Operand,
        value: u8,
    ) -> Result<(), crate::CpuError> {
        match operand {
            Operand::Memory { addr, .. } => {
                self.write(bus, addr, value);
                Ok(())
            }
            Operand::Accumulator => {
                self.regs.a = value;
                Ok(())
            }
            Operand::None | Operand::Immediate(_) => Err(self.unresolved()),
        }
    }

    /// Read-modify-write: read, write the old value back, write the result.
    pub(crate) fn modify<B: Bus + Tickable>(
        &mut self,
        bus: &mut B,
        operand: Operand,
        f: impl FnOnce(&mut Self, u8) -> u8,
    ) -> Result<u8, crate::CpuError> {
        match operand {
            Operand::Accumulator => {
                let result = f(self, self.regs.a);
                self.regs.a = result;
                Ok(result)
            }
            Operand::Memory { addr, .. } => {
                let value = self.read(bus, addr);
                self.write(bus, addr, value);
                let result = f(self, value);
                self.write(bus, addr, result);
                Ok(result)
            }
            Operand::None | Operand::Immediate(_) => Err(self.unresolved()),
        }
    }
}

/// Address of the second pointer byte with the 6502's page wrap.
pub(crate) const fn page_wrapped(pointer: u16) -> u16 {
    (pointer & 0xFF00) | (pointer.wrapping_add(1) & 0x00FF)
}
