//! Instruction execution.
//!
//! Dispatch is by [`Access`] class first: the addressing stage resolves the
//! operand with the right dummy cycles, then the operation runs on the value.
//! Stack, jump and interrupt instructions drive their own bus cycles.

#![allow(clippy::enum_glob_use)]

use emu_core::{Bus, Tickable};

use crate::addressing::Operand;
use crate::cpu::Interrupt;
use crate::flags::{C, D, I, N, V, Z};
use crate::opcodes::{Access, Instruction, Opcode};
use crate::{CpuError, Mos6502, Status};

use Instruction::*;

impl Mos6502 {
    /// Execute a decoded opcode. The opcode byte has already been fetched.
    pub(crate) fn execute<B: Bus + Tickable>(
        &mut self,
        bus: &mut B,
        entry: &Opcode,
    ) -> Result<(), CpuError> {
        let op = entry.instruction;
        if op.is_branch() {
            let taken = op.branch_taken(self.regs.p);
            self.branch(bus, taken);
            return Ok(());
        }

        match op.access() {
            Access::Custom => {
                self.execute_custom(bus, op);
                Ok(())
            }
            Access::Address => match self.resolve(bus, entry.mode, Access::Address) {
                Operand::Memory { addr, .. } => {
                    self.regs.pc = addr;
                    Ok(())
                }
                _ => Err(self.unresolved()),
            },
            Access::Write => {
                let operand = self.resolve(bus, entry.mode, Access::Write);
                self.execute_write(bus, op, operand)
            }
            Access::Modify => {
                let operand = self.resolve(bus, entry.mode, Access::Modify);
                self.execute_modify(bus, op, operand)
            }
            Access::Read => {
                let operand = self.resolve(bus, entry.mode, Access::Read);
                if operand == Operand::None {
                    return if self.execute_implied(op) || op == Nop {
                        Ok(())
                    } else {
                        Err(self.unresolved())
                    };
                }
                let value = self.load(bus, operand)?;
                self.execute_read(op, value);
                Ok(())
            }
        }
    }

    // =========================================================================
    // Self-timed instructions
    // =========================================================================

    fn execute_custom<B: Bus + Tickable>(&mut self, bus: &mut B, op: Instruction) {
        match op {
            Brk => self.interrupt(bus, Interrupt::Brk),
            Jam => self.jam(bus),
            Pha => {
                self.dummy_read_pc(bus);
                self.push(bus, self.regs.a);
            }
            Php => {
                self.dummy_read_pc(bus);
                let status = self.regs.p.to_stack(true);
                self.push(bus, status);
            }
            Pla => {
                self.dummy_read_pc(bus);
                self.read(bus, self.regs.stack_addr());
                self.regs.a = self.pull(bus);
                self.regs.p.update_nz(self.regs.a);
            }
            Plp => {
                self.dummy_read_pc(bus);
                self.read(bus, self.regs.stack_addr());
                let value = self.pull(bus);
                self.regs.p = Status::from_stack(value);
            }
            Jsr => {
                let lo = self.fetch(bus);
                self.read(bus, self.regs.stack_addr());
                let [pcl, pch] = self.regs.pc.to_le_bytes();
                self.push(bus, pch);
                self.push(bus, pcl);
                let hi = self.read(bus, self.regs.pc);
                self.regs.pc = u16::from_le_bytes([lo, hi]);
            }
            Rts => {
                self.dummy_read_pc(bus);
                self.read(bus, self.regs.stack_addr());
                let lo = self.pull(bus);
                let hi = self.pull(bus);
                self.regs.pc = u16::from_le_bytes([lo, hi]);
                self.dummy_read_pc(bus);
                self.regs.pc = self.regs.pc.wrapping_add(1);
            }
            Rti => {
                self.dummy_read_pc(bus);
                self.read(bus, self.regs.stack_addr());
                let value = self.pull(bus);
                self.regs.p = Status::from_stack(value);
                let lo = self.pull(bus);
                let hi = self.pull(bus);
                self.regs.pc = u16::from_le_bytes([lo, hi]);
            }
            _ => unreachable!("{op:?} is not self-timed"),
        }
    }

    // =========================================================================
    // Register and flag instructions
    // =========================================================================

    /// Single-byte register/flag operations. Returns false for anything that
    /// needs an operand value.
    fn execute_implied(&mut self, op: Instruction) -> bool {
        let r = &mut self.regs;
        match op {
            Clc => r.p.clear(C),
            Sec => r.p.set(C),
            Cli => r.p.clear(I),
            Sei => r.p.set(I),
            Cld => r.p.clear(D),
            Sed => r.p.set(D),
            Clv => r.p.clear(V),
            Tax => {
                r.x = r.a;
                r.p.update_nz(r.x);
            }
            Tay => {
                r.y = r.a;
                r.p.update_nz(r.y);
            }
            Txa => {
                r.a = r.x;
                r.p.update_nz(r.a);
            }
            Tya => {
                r.a = r.y;
                r.p.update_nz(r.a);
            }
            Tsx => {
                r.x = r.s;
                r.p.update_nz(r.x);
            }
            Txs => r.s = r.x,
            Inx => {
                r.x = r.x.wrapping_add(1);
                r.p.update_nz(r.x);
            }
            Iny => {
                r.y = r.y.wrapping_add(1);
                r.p.update_nz(r.y);
            }
            Dex => {
                r.x = r.x.wrapping_sub(1);
                r.p.update_nz(r.x);
            }
            Dey => {
                r.y = r.y.wrapping_sub(1);
                r.p.update_nz(r.y);
            }
            _ => return false,
        }
        true
    }

    // =========================================================================
    // Read instructions
    // =========================================================================

    fn execute_read(&mut self, op: Instruction, value: u8) {
        match op {
            Lda => self.set_a(value),
            Ldx => self.set_x(value),
            Ldy => self.set_y(value),
            Lax => {
                self.regs.x = value;
                self.set_a(value);
            }
            And => self.set_a(self.regs.a & value),
            Ora => self.set_a(self.regs.a | value),
            Eor => self.set_a(self.regs.a ^ value),
            Adc => self.adc(value),
            Sbc => self.adc(!value),
            Cmp => self.compare(self.regs.a, value),
            Cpx => self.compare(self.regs.x, value),
            Cpy => self.compare(self.regs.y, value),
            Bit => {
                let p = &mut self.regs.p;
                p.set_if(Z, self.regs.a & value == 0);
                p.set_if(N, value & 0x80 != 0);
                p.set_if(V, value & 0x40 != 0);
            }
            Nop => {}
            Anc => {
                self.set_a(self.regs.a & value);
                self.regs.p.set_if(C, self.regs.a & 0x80 != 0);
            }
            Alr => {
                let masked = self.regs.a & value;
                self.regs.a = self.lsr(masked);
                self.regs.p.update_nz(self.regs.a);
            }
            Arr => {
                let masked = self.regs.a & value;
                let carry_in = if self.regs.p.is_set(C) { 0x80 } else { 0 };
                let result = (masked >> 1) | carry_in;
                self.set_a(result);
                let p = &mut self.regs.p;
                p.set_if(C, result & 0x40 != 0);
                p.set_if(V, ((result >> 6) ^ (result >> 5)) & 1 != 0);
            }
            Sbx => {
                let masked = self.regs.a & self.regs.x;
                self.regs.p.set_if(C, masked >= value);
                self.set_x(masked.wrapping_sub(value));
            }
            Las => {
                let result = value & self.regs.s;
                self.regs.s = result;
                self.regs.x = result;
                self.set_a(result);
            }
            _ => unreachable!("{op:?} is not a read instruction"),
        }
    }

    // =========================================================================
    // Write instructions
    // =========================================================================

    fn execute_write<B: Bus + Tickable>(
        &mut self,
        bus: &mut B,
        op: Instruction,
        operand: Operand,
    ) -> Result<(), CpuError> {
        match op {
            Sta => self.store(bus, operand, self.regs.a),
            Stx => self.store(bus, operand, self.regs.x),
            Sty => self.store(bus, operand, self.regs.y),
            Sax => self.store(bus, operand, self.regs.a & self.regs.x),
            Sha => self.store_high_and(bus, operand, self.regs.a & self.regs.x),
            Shx => self.store_high_and(bus, operand, self.regs.x),
            Shy => self.store_high_and(bus, operand, self.regs.y),
            Tas => {
                self.regs.s = self.regs.a & self.regs.x;
                self.store_high_and(bus, operand, self.regs.s)
            }
            _ => unreachable!("{op:?} is not a write instruction"),
        }
    }

    /// SHA/SHX/SHY/TAS: store `value & (H + 1)`, where H is the high byte of
    /// the unindexed address. When indexing crosses a page the stored value
    /// also replaces the high byte of the target address.
    fn store_high_and<B: Bus + Tickable>(
        &mut self,
        bus: &mut B,
        operand: Operand,
        value: u8,
    ) -> Result<(), CpuError> {
        let Operand::Memory { addr, base } = operand else {
            return Err(self.unresolved());
        };
        let [_, base_hi] = base.to_le_bytes();
        let data = value & base_hi.wrapping_add(1);
        let target = if (base ^ addr) & 0xFF00 != 0 {
            (u16::from(data) << 8) | (addr & 0x00FF)
        } else {
            addr
        };
        self.write(bus, target, data);
        Ok(())
    }

    // =========================================================================
    // Read-modify-write instructions
    // =========================================================================

    fn execute_modify<B: Bus + Tickable>(
        &mut self,
        bus: &mut B,
        op: Instruction,
        operand: Operand,
    ) -> Result<(), CpuError> {
        match op {
            Asl => {
                let result = self.modify(bus, operand, Self::asl)?;
                self.regs.p.update_nz(result);
            }
            Lsr => {
                let result = self.modify(bus, operand, Self::lsr)?;
                self.regs.p.update_nz(result);
            }
            Rol => {
                let result = self.modify(bus, operand, Self::rol)?;
                self.regs.p.update_nz(result);
            }
            Ror => {
                let result = self.modify(bus, operand, Self::ror)?;
                self.regs.p.update_nz(result);
            }
            Inc => {
                let result = self.modify(bus, operand, |_, v| v.wrapping_add(1))?;
                self.regs.p.update_nz(result);
            }
            Dec => {
                let result = self.modify(bus, operand, |_, v| v.wrapping_sub(1))?;
                self.regs.p.update_nz(result);
            }
            Slo => {
                let result = self.modify(bus, operand, Self::asl)?;
                self.set_a(self.regs.a | result);
            }
            Rla => {
                let result = self.modify(bus, operand, Self::rol)?;
                self.set_a(self.regs.a & result);
            }
            Sre => {
                let result = self.modify(bus, operand, Self::lsr)?;
                self.set_a(self.regs.a ^ result);
            }
            Rra => {
                let result = self.modify(bus, operand, Self::ror)?;
                self.adc(result);
            }
            Dcp => {
                let result = self.modify(bus, operand, |_, v| v.wrapping_sub(1))?;
                self.compare(self.regs.a, result);
            }
            Isb => {
                let result = self.modify(bus, operand, |_, v| v.wrapping_add(1))?;
                self.adc(!result);
            }
            _ => unreachable!("{op:?} is not a read-modify-write instruction"),
        }
        Ok(())
    }

    // =========================================================================
    // ALU
    // =========================================================================

    fn set_a(&mut self, value: u8) {
        self.regs.a = value;
        self.regs.p.update_nz(value);
    }

    fn set_x(&mut self, value: u8) {
        self.regs.x = value;
        self.regs.p.update_nz(value);
    }

    fn set_y(&mut self, value: u8) {
        self.regs.y = value;
        self.regs.p.update_nz(value);
    }

    /// Binary add with carry. The 2A03 has no decimal mode, so D is ignored.
    fn adc(&mut self, value: u8) {
        let a = self.regs.a;
        let carry = u16::from(self.regs.p.is_set(C));
        let sum = u16::from(a) + u16::from(value) + carry;
        let result = sum as u8;
        self.regs.p.set_if(C, sum > 0xFF);
        self.regs.p.set_if(V, (!(a ^ value) & (a ^ result)) & 0x80 != 0);
        self.set_a(result);
    }

    fn compare(&mut self, register: u8, value: u8) {
        self.regs.p.set_if(C, register >= value);
        self.regs.p.update_nz(register.wrapping_sub(value));
    }

    fn asl(&mut self, value: u8) -> u8 {
        self.regs.p.set_if(C, value & 0x80 != 0);
        value << 1
    }

    fn lsr(&mut self, value: u8) -> u8 {
        self.regs.p.set_if(C, value & 0x01 != 0);
        value >> 1
    }

    fn rol(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.regs.p.is_set(C));
        self.regs.p.set_if(C, value & 0x80 != 0);
        (value << 1) | carry_in
    }

    fn ror(&mut self, value: u8) -> u8 {
        let carry_in = if self.regs.p.is_set(C) { 0x80 } else { 0 };
        self.regs.p.set_if(C, value & 0x01 != 0);
        (value >> 1) | carry_in
    }
}

