//! Instruction disassembly in the nestest log layout.
//!
//! ```text
//! C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD
//! ```
//!
//! Operands show the effective address and the value found there, both
//! taken with side-effect-free `peek` reads before the instruction runs.

use std::fmt;

use emu_core::Bus;

use crate::addressing::page_wrapped;
use crate::opcodes::{Instruction, Mode, decode};
use crate::{Mos6502, Registers};

/// One decoded instruction, ready for printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disassembly {
    pub pc: u16,
    /// Opcode plus operand bytes.
    pub bytes: Vec<u8>,
    pub mnemonic: &'static str,
    pub official: bool,
    /// Rendered operand, empty for implied instructions.
    pub operand: String,
    /// Registers before the instruction executes.
    pub registers: Registers,
}

impl Disassembly {
    /// Mnemonic and operand, e.g. `LDA ($80),Y = 0200 @ 0204 = 5A`.
    #[must_use]
    pub fn instruction_text(&self) -> String {
        if self.operand.is_empty() {
            self.mnemonic.to_string()
        } else {
            format!("{} {}", self.mnemonic, self.operand)
        }
    }
}

impl fmt::Display for Disassembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self
            .bytes
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ");
        let marker = if self.official { ' ' } else { '*' };
        let r = &self.registers;
        write!(
            f,
            "{:04X}  {:<8} {}{:<31} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X}",
            self.pc,
            bytes,
            marker,
            self.instruction_text(),
            r.a,
            r.x,
            r.y,
            r.p.bits(),
            r.s
        )
    }
}

impl Mos6502 {
    /// Disassemble the instruction at PC without disturbing the bus.
    pub fn disassemble<B: Bus + ?Sized>(&self, bus: &B) -> Disassembly {
        let pc = self.regs.pc;
        let entry = decode(bus.peek(pc));
        let bytes = (0..entry.size())
            .map(|i| bus.peek(pc.wrapping_add(i)))
            .collect::<Vec<_>>();
        let operand = render_operand(bus, &self.regs, entry.instruction, entry.mode, &bytes);
        Disassembly {
            pc,
            bytes,
            mnemonic: entry.instruction.mnemonic(),
            official: entry.official,
            operand,
            registers: self.regs,
        }
    }
}

fn render_operand<B: Bus + ?Sized>(
    bus: &B,
    regs: &Registers,
    instruction: Instruction,
    mode: Mode,
    bytes: &[u8],
) -> String {
    let b1 = bytes.get(1).copied().unwrap_or(0);
    let word = u16::from_le_bytes([b1, bytes.get(2).copied().unwrap_or(0)]);
    let zp_word = |ptr: u8| {
        u16::from_le_bytes([bus.peek(u16::from(ptr)), bus.peek(u16::from(ptr.wrapping_add(1)))])
    };

    match mode {
        Mode::Implied => String::new(),
        Mode::Accumulator => "A".to_string(),
        Mode::Immediate => format!("#${b1:02X}"),
        Mode::ZeroPage => format!("${b1:02X} = {:02X}", bus.peek(u16::from(b1))),
        Mode::ZeroPageX | Mode::ZeroPageY => {
            let (index, name) = if mode == Mode::ZeroPageX {
                (regs.x, 'X')
            } else {
                (regs.y, 'Y')
            };
            let addr = b1.wrapping_add(index);
            format!(
                "${b1:02X},{name} @ {addr:02X} = {:02X}",
                bus.peek(u16::from(addr))
            )
        }
        Mode::Absolute => {
            if matches!(instruction, Instruction::Jmp | Instruction::Jsr) {
                format!("${word:04X}")
            } else {
                format!("${word:04X} = {:02X}", bus.peek(word))
            }
        }
        Mode::AbsoluteX | Mode::AbsoluteY => {
            let (index, name) = if mode == Mode::AbsoluteX {
                (regs.x, 'X')
            } else {
                (regs.y, 'Y')
            };
            let addr = word.wrapping_add(u16::from(index));
            format!("${word:04X},{name} @ {addr:04X} = {:02X}", bus.peek(addr))
        }
        Mode::Indirect => {
            let target = u16::from_le_bytes([bus.peek(word), bus.peek(page_wrapped(word))]);
            format!("(${word:04X}) = {target:04X}")
        }
        Mode::IndirectX => {
            let ptr = b1.wrapping_add(regs.x);
            let addr = zp_word(ptr);
            format!(
                "(${b1:02X},X) @ {ptr:02X} = {addr:04X} = {:02X}",
                bus.peek(addr)
            )
        }
        Mode::IndirectY => {
            let base = zp_word(b1);
            let addr = base.wrapping_add(u16::from(regs.y));
            format!(
                "(${b1:02X}),Y = {base:04X} @ {addr:04X} = {:02X}",
                bus.peek(addr)
            )
        }
        Mode::Relative => {
            let target = regs
                .pc
                .wrapping_add(2)
                .wrapping_add_signed(i16::from(b1 as i8));
            format!("${target:04X}")
        }
    }
}

#[cfg(test)]
mod tests {
    use emu_core::SimpleBus;

    use super::*;

    fn cpu_at(pc: u16) -> Mos6502 {
        let mut cpu = Mos6502::new();
        cpu.regs.pc = pc;
        cpu.regs.s = 0xFD;
        cpu
    }

    #[test]
    fn jump_line_matches_nestest() {
        let mut bus = SimpleBus::new();
        bus.load(0xC000, &[0x4C, 0xF5, 0xC5]);
        let line = cpu_at(0xC000).disassemble(&bus).to_string();
        assert_eq!(
            line,
            "C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD"
        );
    }

    #[test]
    fn unofficial_opcodes_are_starred() {
        let mut bus = SimpleBus::new();
        bus.load(0xC6BD, &[0x04, 0xA9]);
        let line = cpu_at(0xC6BD).disassemble(&bus).to_string();
        assert!(line.starts_with("C6BD  04 A9    *NOP $A9 = 00"), "{line}");
    }

    #[test]
    fn indirect_y_shows_base_and_effective_address() {
        let mut bus = SimpleBus::new();
        bus.load(0x0400, &[0xB1, 0x80]);
        bus.load(0x0080, &[0x00, 0x02]);
        bus.load(0x0204, &[0x5A]);
        let mut cpu = cpu_at(0x0400);
        cpu.regs.y = 4;
        let dis = cpu.disassemble(&bus);
        assert_eq!(dis.instruction_text(), "LDA ($80),Y = 0200 @ 0204 = 5A");
    }

    #[test]
    fn indirect_jump_wraps_within_page() {
        let mut bus = SimpleBus::new();
        bus.load(0x0400, &[0x6C, 0xFF, 0x02]);
        bus.load(0x02FF, &[0x34]);
        bus.load(0x0200, &[0x12]);
        let dis = cpu_at(0x0400).disassemble(&bus);
        assert_eq!(dis.operand, "($02FF) = 1234");
    }

    #[test]
    fn branch_target_is_absolute() {
        let mut bus = SimpleBus::new();
        bus.load(0x0400, &[0xD0, 0xFE]);
        let dis = cpu_at(0x0400).disassemble(&bus);
        assert_eq!(dis.instruction_text(), "BNE $0400");
    }
}
