//! Cycle-accurate 6502 CPU emulator, as found in the Ricoh 2A03.
//!
//! `step()` executes one instruction (or one interrupt sequence) and ticks
//! the bus once per cycle, before each access. Dummy reads and writes land
//! on the bus exactly as the hardware performs them. Decimal mode is absent
//! on the 2A03, so D is stored but ADC/SBC stay binary.
//!
//! All 151 documented opcodes and the stable undocumented ones are
//! implemented. `$8B` (XAA) and `$AB` (LXA) return
//! [`CpuError::UnimplementedOpcode`]; the twelve JAM opcodes halt until reset.

mod addressing;
mod cpu;
mod error;
pub mod flags;
mod instructions;
pub mod opcodes;
mod registers;
mod trace;
pub mod vector;

pub use cpu::Mos6502;
pub use error::CpuError;
pub use flags::Status;
pub use registers::Registers;
pub use trace::Disassembly;
