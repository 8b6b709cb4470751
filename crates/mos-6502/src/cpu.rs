//! CPU state, bus cycles and the instruction/interrupt loop.

use emu_core::{Bus, Cpu, Observable, Tickable, Value};

use crate::flags::{C, D, I, N, V, Z};
use crate::opcodes::{Instruction, decode};
use crate::{CpuError, Registers};

/// Interrupt sequence kind. All three share the same seven-cycle push
/// sequence and differ in vector and pushed break bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interrupt {
    Nmi,
    Irq,
    Brk,
}

const NMI_VECTOR: u16 = 0xFFFA;
const RESET_VECTOR: u16 = 0xFFFC;
const IRQ_VECTOR: u16 = 0xFFFE;

/// The 2A03's 6502 core.
///
/// `step()` runs one whole instruction. Every bus access and every internal
/// cycle ticks the bus once before the access happens, so chips hanging off
/// the bus observe accesses at the correct dot.
pub struct Mos6502 {
    /// Register file.
    pub regs: Registers,
    /// Total cycles since power-on.
    cycles: u64,
    /// Cycles consumed by the last `step()`.
    delta: u32,
    /// NMI edge seen at the last poll.
    nmi_pending: bool,
    /// IRQ line asserted and unmasked at the last poll.
    irq_pending: bool,
    /// Set by a JAM opcode; only a reset clears it.
    trapped: bool,
    /// Address of the opcode currently executing.
    pub(crate) opcode_pc: u16,
    pub(crate) opcode: u8,
}

impl Default for Mos6502 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mos6502 {
    /// CPU in its power-on state. Call [`Cpu::reset`] before running.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            cycles: 0,
            delta: 0,
            nmi_pending: false,
            irq_pending: false,
            trapped: false,
            opcode_pc: 0,
            opcode: 0,
        }
    }

    /// Cycles consumed by the most recent `step()`.
    #[must_use]
    pub fn last_step_cycles(&self) -> u32 {
        self.delta
    }

    /// Whether an interrupt will be serviced on the next `step()`.
    #[must_use]
    pub fn interrupt_pending(&self) -> bool {
        self.nmi_pending || self.irq_pending
    }

    // =========================================================================
    // Bus cycles
    // =========================================================================

    /// One internal clock pulse.
    pub(crate) fn clock<B: Tickable>(&mut self, bus: &mut B) {
        bus.tick();
        self.cycles += 1;
    }

    pub(crate) fn read<B: Bus + Tickable>(&mut self, bus: &mut B, addr: u16) -> u8 {
        self.clock(bus);
        bus.read(addr)
    }

    pub(crate) fn write<B: Bus + Tickable>(&mut self, bus: &mut B, addr: u16, value: u8) {
        self.clock(bus);
        bus.write(addr, value);
    }

    /// Read at PC and advance PC.
    pub(crate) fn fetch<B: Bus + Tickable>(&mut self, bus: &mut B) -> u8 {
        let value = self.read(bus, self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    pub(crate) fn fetch_word<B: Bus + Tickable>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch(bus);
        let hi = self.fetch(bus);
        u16::from_le_bytes([lo, hi])
    }

    /// Discarded read of the byte after the opcode.
    pub(crate) fn dummy_read_pc<B: Bus + Tickable>(&mut self, bus: &mut B) {
        self.read(bus, self.regs.pc);
    }

    pub(crate) fn push<B: Bus + Tickable>(&mut self, bus: &mut B, value: u8) {
        let addr = self.regs.push();
        self.write(bus, addr, value);
    }

    pub(crate) fn pull<B: Bus + Tickable>(&mut self, bus: &mut B) -> u8 {
        let addr = self.regs.pull();
        self.read(bus, addr)
    }

    // =========================================================================
    // Instruction loop
    // =========================================================================

    fn execute_next<B: Bus + Tickable>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("{}", self.disassemble(&*bus));
        }

        self.opcode_pc = self.regs.pc;
        self.opcode = self.fetch(bus);
        let entry = decode(self.opcode);
        if entry.is_unimplemented() {
            return Err(CpuError::UnimplementedOpcode {
                opcode: self.opcode,
                pc: self.opcode_pc,
            });
        }

        let masked_before = self.regs.p.is_set(I);
        self.execute(bus, entry)?;
        if self.trapped {
            return Ok(());
        }

        // CLI, SEI and PLP change I after the poll, so the old value decides
        // whether an IRQ is taken after them. RTI restores I before the poll.
        let masked = if entry.instruction.delays_irq_mask() {
            masked_before
        } else {
            self.regs.p.is_set(I)
        };
        self.poll_interrupts(bus, masked);
        Ok(())
    }

    fn poll_interrupts<B: Bus>(&mut self, bus: &mut B, masked: bool) {
        if bus.poll_nmi() {
            self.nmi_pending = true;
        }
        self.irq_pending = !masked && bus.irq_line();
    }

    /// Seven-cycle interrupt sequence shared by NMI, IRQ and BRK.
    ///
    /// An NMI that arrives before the vector fetch hijacks an IRQ or BRK:
    /// the pushed status keeps its break bit but the NMI vector is used.
    pub(crate) fn interrupt<B: Bus + Tickable>(&mut self, bus: &mut B, kind: Interrupt) {
        if kind == Interrupt::Brk {
            // Padding byte after BRK is read and skipped.
            self.fetch(bus);
        } else {
            self.dummy_read_pc(bus);
            self.dummy_read_pc(bus);
        }

        let [lo, hi] = self.regs.pc.to_le_bytes();
        self.push(bus, hi);
        self.push(bus, lo);
        let status = self.regs.p.to_stack(kind == Interrupt::Brk);
        self.push(bus, status);
        self.regs.p.set(I);

        let vector = match kind {
            Interrupt::Nmi => NMI_VECTOR,
            Interrupt::Irq | Interrupt::Brk => {
                if bus.poll_nmi() {
                    log::trace!("NMI hijacked {kind:?} at ${:04X}", self.regs.pc);
                    NMI_VECTOR
                } else {
                    IRQ_VECTOR
                }
            }
        };
        let lo = self.read(bus, vector);
        let hi = self.read(bus, vector.wrapping_add(1));
        self.regs.pc = u16::from_le_bytes([lo, hi]);
    }

    /// Halt on a JAM opcode.
    pub(crate) fn jam<B: Bus + Tickable>(&mut self, bus: &mut B) {
        self.dummy_read_pc(bus);
        self.trapped = true;
        self.nmi_pending = false;
        self.irq_pending = false;
        log::warn!(
            "CPU jammed on opcode ${:02X} at ${:04X}",
            self.opcode,
            self.opcode_pc
        );
    }

    pub(crate) fn unresolved(&self) -> CpuError {
        CpuError::UnresolvedOperand {
            opcode: self.opcode,
            pc: self.opcode_pc,
        }
    }
}

impl Cpu for Mos6502 {
    type Registers = Registers;
    type Error = CpuError;

    fn step<B: Bus + Tickable>(&mut self, bus: &mut B) -> Result<u32, CpuError> {
        let start = self.cycles;

        let stall = bus.take_stall_cycles();
        for _ in 0..stall {
            self.clock(bus);
        }

        if self.trapped {
            self.clock(bus);
        } else if self.nmi_pending {
            self.nmi_pending = false;
            self.interrupt(bus, Interrupt::Nmi);
        } else if self.irq_pending {
            self.irq_pending = false;
            self.interrupt(bus, Interrupt::Irq);
        } else {
            self.execute_next(bus)?;
        }

        self.delta = (self.cycles - start) as u32;
        Ok(self.delta)
    }

    /// Reset sequence: two discarded reads at PC, three stack reads that
    /// decrement S without writing, then the vector fetch. Seven cycles.
    fn reset<B: Bus + Tickable>(&mut self, bus: &mut B) {
        self.trapped = false;
        self.nmi_pending = false;
        self.irq_pending = false;

        self.dummy_read_pc(bus);
        self.dummy_read_pc(bus);
        for _ in 0..3 {
            let addr = self.regs.push();
            self.read(bus, addr);
        }
        self.regs.p.set(I);

        let lo = self.read(bus, RESET_VECTOR);
        let hi = self.read(bus, RESET_VECTOR + 1);
        self.regs.pc = u16::from_le_bytes([lo, hi]);
        log::debug!("CPU reset: PC=${:04X} after {} cycles", self.regs.pc, self.cycles);
    }

    fn pc(&self) -> u16 {
        self.regs.pc
    }

    fn registers(&self) -> Registers {
        self.regs
    }

    fn is_halted(&self) -> bool {
        self.trapped
    }

    fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl Observable for Mos6502 {
    fn query(&self, path: &str) -> Option<Value> {
        let flag = |mask| Some(Value::Bool(self.regs.p.is_set(mask)));
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "sp" => Some(self.regs.s.into()),
            "p" => Some(self.regs.p.bits().into()),
            "flags.c" => flag(C),
            "flags.z" => flag(Z),
            "flags.i" => flag(I),
            "flags.d" => flag(D),
            "flags.v" => flag(V),
            "flags.n" => flag(N),
            "cycles" => Some(self.cycles.into()),
            "trapped" => Some(self.trapped.into()),
            "opcode" => Some(decode(self.opcode).instruction.mnemonic().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc", "a", "x", "y", "sp", "p", "flags.c", "flags.z", "flags.i", "flags.d",
            "flags.v", "flags.n", "cycles", "trapped", "opcode",
        ]
    }
}

impl Instruction {
    /// Conditional branch test against a status byte.
    pub(crate) fn branch_taken(self, p: crate::Status) -> bool {
        match self {
            Self::Bpl => !p.is_set(N),
            Self::Bmi => p.is_set(N),
            Self::Bvc => !p.is_set(V),
            Self::Bvs => p.is_set(V),
            Self::Bcc => !p.is_set(C),
            Self::Bcs => p.is_set(C),
            Self::Bne => !p.is_set(Z),
            Self::Beq => p.is_set(Z),
            _ => false,
        }
    }
}
