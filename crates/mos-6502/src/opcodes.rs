//! Opcode dispatch table.
//!
//! All 256 opcode values map to an (instruction, addressing mode) pair plus
//! the documented base cycle count. Page-cross and branch penalties are
//! charged on top of the base count at run time.

#![allow(clippy::enum_glob_use)]

use Instruction::*;
use Mode::*;

/// Addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// `JMP ($nnnn)`, with the page-wrap bug on the high byte fetch.
    Indirect,
    /// `($nn,X)`: pre-indexed indirect.
    IndirectX,
    /// `($nn),Y`: post-indexed indirect.
    IndirectY,
    Relative,
}

impl Mode {
    /// Operand bytes following the opcode.
    #[must_use]
    pub const fn operand_len(self) -> u16 {
        match self {
            Implied | Accumulator => 0,
            Immediate | ZeroPage | ZeroPageX | ZeroPageY | IndirectX | IndirectY | Relative => 1,
            Absolute | AbsoluteX | AbsoluteY | Indirect => 2,
        }
    }
}

/// How an instruction uses its memory operand.
///
/// This decides which dummy accesses the addressing stage performs: reads
/// skip the fix-up cycle unless the index crosses a page, while writes and
/// read-modify-writes always take it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Read,
    Write,
    Modify,
    /// Address only, no data access (jumps).
    Address,
    /// The instruction performs its own bus cycles.
    Custom,
}

/// Operation, independent of addressing mode.
#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
    // Undocumented
    Alr, Anc, Arr, Dcp, Isb, Jam, Las, Lax, Lxa, Rla, Rra, Sax, Sbx, Sha,
    Shx, Shy, Slo, Sre, Tas, Xaa,
}

impl Instruction {
    /// Three-letter mnemonic as printed in traces.
    #[rustfmt::skip]
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Adc => "ADC", And => "AND", Asl => "ASL", Bcc => "BCC", Bcs => "BCS",
            Beq => "BEQ", Bit => "BIT", Bmi => "BMI", Bne => "BNE", Bpl => "BPL",
            Brk => "BRK", Bvc => "BVC", Bvs => "BVS", Clc => "CLC", Cld => "CLD",
            Cli => "CLI", Clv => "CLV", Cmp => "CMP", Cpx => "CPX", Cpy => "CPY",
            Dec => "DEC", Dex => "DEX", Dey => "DEY", Eor => "EOR", Inc => "INC",
            Inx => "INX", Iny => "INY", Jmp => "JMP", Jsr => "JSR", Lda => "LDA",
            Ldx => "LDX", Ldy => "LDY", Lsr => "LSR", Nop => "NOP", Ora => "ORA",
            Pha => "PHA", Php => "PHP", Pla => "PLA", Plp => "PLP", Rol => "ROL",
            Ror => "ROR", Rti => "RTI", Rts => "RTS", Sbc => "SBC", Sec => "SEC",
            Sed => "SED", Sei => "SEI", Sta => "STA", Stx => "STX", Sty => "STY",
            Tax => "TAX", Tay => "TAY", Tsx => "TSX", Txa => "TXA", Txs => "TXS",
            Tya => "TYA", Alr => "ALR", Anc => "ANC", Arr => "ARR", Dcp => "DCP",
            Isb => "ISB", Jam => "JAM", Las => "LAS", Lax => "LAX", Lxa => "LXA",
            Rla => "RLA", Rra => "RRA", Sax => "SAX", Sbx => "SBX", Sha => "SHA",
            Shx => "SHX", Shy => "SHY", Slo => "SLO", Sre => "SRE", Tas => "TAS",
            Xaa => "XAA",
        }
    }

    pub(crate) const fn access(self) -> Access {
        match self {
            Sta | Stx | Sty | Sax | Sha | Shx | Shy | Tas => Access::Write,
            Asl | Lsr | Rol | Ror | Inc | Dec | Slo | Rla | Sre | Rra | Dcp | Isb => {
                Access::Modify
            }
            Jmp => Access::Address,
            Jsr | Brk | Rti | Rts | Pha | Php | Pla | Plp | Jam => Access::Custom,
            _ => Access::Read,
        }
    }

    /// Conditional branches.
    #[must_use]
    pub const fn is_branch(self) -> bool {
        matches!(self, Bcc | Bcs | Beq | Bmi | Bne | Bpl | Bvc | Bvs)
    }

    /// Instructions whose interrupt-disable change lands after the IRQ poll.
    pub(crate) const fn delays_irq_mask(self) -> bool {
        matches!(self, Cli | Sei | Plp)
    }
}

/// One dispatch table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub instruction: Instruction,
    pub mode: Mode,
    /// Base cycles, before page-cross and branch penalties.
    pub cycles: u8,
    /// False for undocumented opcodes (marked `*` in traces).
    pub official: bool,
}

impl Opcode {
    /// Instruction length in bytes, including the opcode.
    #[must_use]
    pub const fn size(&self) -> u16 {
        1 + self.mode.operand_len()
    }

    /// True for the two opcodes whose result depends on analogue bus effects.
    #[must_use]
    pub const fn is_unimplemented(&self) -> bool {
        matches!(self.instruction, Xaa | Lxa)
    }
}

const fn op(instruction: Instruction, mode: Mode, cycles: u8) -> Opcode {
    Opcode { instruction, mode, cycles, official: true }
}

const fn un(instruction: Instruction, mode: Mode, cycles: u8) -> Opcode {
    Opcode { instruction, mode, cycles, official: false }
}

/// Look up an opcode.
#[must_use]
pub const fn decode(opcode: u8) -> &'static Opcode {
    &OPCODES[opcode as usize]
}

/// The full 256-entry table, indexed by opcode.
#[rustfmt::skip]
pub static OPCODES: [Opcode; 256] = [
    // $00
    op(Brk, Implied, 7),
    op(Ora, IndirectX, 6),
    un(Jam, Implied, 2),
    un(Slo, IndirectX, 8),
    un(Nop, ZeroPage, 3),
    op(Ora, ZeroPage, 3),
    op(Asl, ZeroPage, 5),
    un(Slo, ZeroPage, 5),
    op(Php, Implied, 3),
    op(Ora, Immediate, 2),
    op(Asl, Accumulator, 2),
    un(Anc, Immediate, 2),
    un(Nop, Absolute, 4),
    op(Ora, Absolute, 4),
    op(Asl, Absolute, 6),
    un(Slo, Absolute, 6),
    // $10
    op(Bpl, Relative, 2),
    op(Ora, IndirectY, 5),
    un(Jam, Implied, 2),
    un(Slo, IndirectY, 8),
    un(Nop, ZeroPageX, 4),
    op(Ora, ZeroPageX, 4),
    op(Asl, ZeroPageX, 6),
    un(Slo, ZeroPageX, 6),
    op(Clc, Implied, 2),
    op(Ora, AbsoluteY, 4),
    un(Nop, Implied, 2),
    un(Slo, AbsoluteY, 7),
    un(Nop, AbsoluteX, 4),
    op(Ora, AbsoluteX, 4),
    op(Asl, AbsoluteX, 7),
    un(Slo, AbsoluteX, 7),
    // $20
    op(Jsr, Absolute, 6),
    op(And, IndirectX, 6),
    un(Jam, Implied, 2),
    un(Rla, IndirectX, 8),
    op(Bit, ZeroPage, 3),
    op(And, ZeroPage, 3),
    op(Rol, ZeroPage, 5),
    un(Rla, ZeroPage, 5),
    op(Plp, Implied, 4),
    op(And, Immediate, 2),
    op(Rol, Accumulator, 2),
    un(Anc, Immediate, 2),
    op(Bit, Absolute, 4),
    op(And, Absolute, 4),
    op(Rol, Absolute, 6),
    un(Rla, Absolute, 6),
    // $30
    op(Bmi, Relative, 2),
    op(And, IndirectY, 5),
    un(Jam, Implied, 2),
    un(Rla, IndirectY, 8),
    un(Nop, ZeroPageX, 4),
    op(And, ZeroPageX, 4),
    op(Rol, ZeroPageX, 6),
    un(Rla, ZeroPageX, 6),
    op(Sec, Implied, 2),
    op(And, AbsoluteY, 4),
    un(Nop, Implied, 2),
    un(Rla, AbsoluteY, 7),
    un(Nop, AbsoluteX, 4),
    op(And, AbsoluteX, 4),
    op(Rol, AbsoluteX, 7),
    un(Rla, AbsoluteX, 7),
    // $40
    op(Rti, Implied, 6),
    op(Eor, IndirectX, 6),
    un(Jam, Implied, 2),
    un(Sre, IndirectX, 8),
    un(Nop, ZeroPage, 3),
    op(Eor, ZeroPage, 3),
    op(Lsr, ZeroPage, 5),
    un(Sre, ZeroPage, 5),
    op(Pha, Implied, 3),
    op(Eor, Immediate, 2),
    op(Lsr, Accumulator, 2),
    un(Alr, Immediate, 2),
    op(Jmp, Absolute, 3),
    op(Eor, Absolute, 4),
    op(Lsr, Absolute, 6),
    un(Sre, Absolute, 6),
    // $50
    op(Bvc, Relative, 2),
    op(Eor, IndirectY, 5),
    un(Jam, Implied, 2),
    un(Sre, IndirectY, 8),
    un(Nop, ZeroPageX, 4),
    op(Eor, ZeroPageX, 4),
    op(Lsr, ZeroPageX, 6),
    un(Sre, ZeroPageX, 6),
    op(Cli, Implied, 2),
    op(Eor, AbsoluteY, 4),
    un(Nop, Implied, 2),
    un(Sre, AbsoluteY, 7),
    un(Nop, AbsoluteX, 4),
    op(Eor, AbsoluteX, 4),
    op(Lsr, AbsoluteX, 7),
    un(Sre, AbsoluteX, 7),
    // $60
    op(Rts, Implied, 6),
    op(Adc, IndirectX, 6),
    un(Jam, Implied, 2),
    un(Rra, IndirectX, 8),
    un(Nop, ZeroPage, 3),
    op(Adc, ZeroPage, 3),
    op(Ror, ZeroPage, 5),
    un(Rra, ZeroPage, 5),
    op(Pla, Implied, 4),
    op(Adc, Immediate, 2),
    op(Ror, Accumulator, 2),
    un(Arr, Immediate, 2),
    op(Jmp, Indirect, 5),
    op(Adc, Absolute, 4),
    op(Ror, Absolute, 6),
    un(Rra, Absolute, 6),
    // $70
    op(Bvs, Relative, 2),
    op(Adc, IndirectY, 5),
    un(Jam, Implied, 2),
    un(Rra, IndirectY, 8),
    un(Nop, ZeroPageX, 4),
    op(Adc, ZeroPageX, 4),
    op(Ror, ZeroPageX, 6),
    un(Rra, ZeroPageX, 6),
    op(Sei, Implied, 2),
    op(Adc, AbsoluteY, 4),
    un(Nop, Implied, 2),
    un(Rra, AbsoluteY, 7),
    un(Nop, AbsoluteX, 4),
    op(Adc, AbsoluteX, 4),
    op(Ror, AbsoluteX, 7),
    un(Rra, AbsoluteX, 7),
    // $80
    un(Nop, Immediate, 2),
    op(Sta, IndirectX, 6),
    un(Nop, Immediate, 2),
    un(Sax, IndirectX, 6),
    op(Sty, ZeroPage, 3),
    op(Sta, ZeroPage, 3),
    op(Stx, ZeroPage, 3),
    un(Sax, ZeroPage, 3),
    op(Dey, Implied, 2),
    un(Nop, Immediate, 2),
    op(Txa, Implied, 2),
    un(Xaa, Immediate, 2),
    op(Sty, Absolute, 4),
    op(Sta, Absolute, 4),
    op(Stx, Absolute, 4),
    un(Sax, Absolute, 4),
    // $90
    op(Bcc, Relative, 2),
    op(Sta, IndirectY, 6),
    un(Jam, Implied, 2),
    un(Sha, IndirectY, 6),
    op(Sty, ZeroPageX, 4),
    op(Sta, ZeroPageX, 4),
    op(Stx, ZeroPageY, 4),
    un(Sax, ZeroPageY, 4),
    op(Tya, Implied, 2),
    op(Sta, AbsoluteY, 5),
    op(Txs, Implied, 2),
    un(Tas, AbsoluteY, 5),
    un(Shy, AbsoluteX, 5),
    op(Sta, AbsoluteX, 5),
    un(Shx, AbsoluteY, 5),
    un(Sha, AbsoluteY, 5),
    // $A0
    op(Ldy, Immediate, 2),
    op(Lda, IndirectX, 6),
    op(Ldx, Immediate, 2),
    un(Lax, IndirectX, 6),
    op(Ldy, ZeroPage, 3),
    op(Lda, ZeroPage, 3),
    op(Ldx, ZeroPage, 3),
    un(Lax, ZeroPage, 3),
    op(Tay, Implied, 2),
    op(Lda, Immediate, 2),
    op(Tax, Implied, 2),
    un(Lxa, Immediate, 2),
    op(Ldy, Absolute, 4),
    op(Lda, Absolute, 4),
    op(Ldx, Absolute, 4),
    un(Lax, Absolute, 4),
    // $B0
    op(Bcs, Relative, 2),
    op(Lda, IndirectY, 5),
    un(Jam, Implied, 2),
    un(Lax, IndirectY, 5),
    op(Ldy, ZeroPageX, 4),
    op(Lda, ZeroPageX, 4),
    op(Ldx, ZeroPageY, 4),
    un(Lax, ZeroPageY, 4),
    op(Clv, Implied, 2),
    op(Lda, AbsoluteY, 4),
    op(Tsx, Implied, 2),
    un(Las, AbsoluteY, 4),
    op(Ldy, AbsoluteX, 4),
    op(Lda, AbsoluteX, 4),
    op(Ldx, AbsoluteY, 4),
    un(Lax, AbsoluteY, 4),
    // $C0
    op(Cpy, Immediate, 2),
    op(Cmp, IndirectX, 6),
    un(Nop, Immediate, 2),
    un(Dcp, IndirectX, 8),
    op(Cpy, ZeroPage, 3),
    op(Cmp, ZeroPage, 3),
    op(Dec, ZeroPage, 5),
    un(Dcp, ZeroPage, 5),
    op(Iny, Implied, 2),
    op(Cmp, Immediate, 2),
    op(Dex, Implied, 2),
    un(Sbx, Immediate, 2),
    op(Cpy, Absolute, 4),
    op(Cmp, Absolute, 4),
    op(Dec, Absolute, 6),
    un(Dcp, Absolute, 6),
    // $D0
    op(Bne, Relative, 2),
    op(Cmp, IndirectY, 5),
    un(Jam, Implied, 2),
    un(Dcp, IndirectY, 8),
    un(Nop, ZeroPageX, 4),
    op(Cmp, ZeroPageX, 4),
    op(Dec, ZeroPageX, 6),
    un(Dcp, ZeroPageX, 6),
    op(Cld, Implied, 2),
    op(Cmp, AbsoluteY, 4),
    un(Nop, Implied, 2),
    un(Dcp, AbsoluteY, 7),
    un(Nop, AbsoluteX, 4),
    op(Cmp, AbsoluteX, 4),
    op(Dec, AbsoluteX, 7),
    un(Dcp, AbsoluteX, 7),
    // $E0
    op(Cpx, Immediate, 2),
    op(Sbc, IndirectX, 6),
    un(Nop, Immediate, 2),
    un(Isb, IndirectX, 8),
    op(Cpx, ZeroPage, 3),
    op(Sbc, ZeroPage, 3),
    op(Inc, ZeroPage, 5),
    un(Isb, ZeroPage, 5),
    op(Inx, Implied, 2),
    op(Sbc, Immediate, 2),
    op(Nop, Implied, 2),
    un(Sbc, Immediate, 2),
    op(Cpx, Absolute, 4),
    op(Sbc, Absolute, 4),
    op(Inc, Absolute, 6),
    un(Isb, Absolute, 6),
    // $F0
    op(Beq, Relative, 2),
    op(Sbc, IndirectY, 5),
    un(Jam, Implied, 2),
    un(Isb, IndirectY, 8),
    un(Nop, ZeroPageX, 4),
    op(Sbc, ZeroPageX, 4),
    op(Inc, ZeroPageX, 6),
    un(Isb, ZeroPageX, 6),
    op(Sed, Implied, 2),
    op(Sbc, AbsoluteY, 4),
    un(Nop, Implied, 2),
    un(Isb, AbsoluteY, 7),
    un(Nop, AbsoluteX, 4),
    op(Sbc, AbsoluteX, 4),
    op(Inc, AbsoluteX, 7),
    un(Isb, AbsoluteX, 7),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn official_count() {
        assert_eq!(OPCODES.iter().filter(|op| op.official).count(), 151);
    }

    #[test]
    fn twelve_jams() {
        let jams: Vec<usize> = OPCODES
            .iter()
            .enumerate()
            .filter(|(_, op)| op.instruction == Jam)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(
            jams,
            vec![0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2]
        );
    }

    #[test]
    fn spot_check_entries() {
        assert_eq!(decode(0x6C).mode, Indirect);
        assert_eq!(decode(0x6C).cycles, 5);
        assert_eq!(decode(0xB1).mode, IndirectY);
        assert_eq!(decode(0xEB).instruction, Sbc);
        assert!(!decode(0xEB).official);
        assert_eq!(decode(0x96).mode, ZeroPageY);
        assert!(decode(0x8B).is_unimplemented());
        assert!(decode(0xAB).is_unimplemented());
    }

    #[test]
    fn rmw_absolute_indexed_is_seven_cycles() {
        for opcode in [0x1E, 0x3E, 0x5E, 0x7E, 0xDE, 0xFE, 0x1F, 0xFF] {
            assert_eq!(decode(opcode).cycles, 7, "opcode {opcode:02X}");
        }
    }
}
