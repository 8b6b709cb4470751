//! CPU execution failures.

use thiserror::Error;

/// A fatal condition raised while executing an instruction.
///
/// JAM opcodes are not errors: they halt the CPU, which is reported through
/// [`emu_core::Cpu::is_halted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    /// The opcode's behaviour depends on analogue effects and is not modelled.
    #[error("unimplemented opcode ${opcode:02X} at ${pc:04X}")]
    UnimplementedOpcode { opcode: u8, pc: u16 },
    /// An instruction tried to store through an operand with no address.
    #[error("opcode ${opcode:02X} at ${pc:04X} wrote through an unresolved operand")]
    UnresolvedOperand { opcode: u8, pc: u16 },
}
