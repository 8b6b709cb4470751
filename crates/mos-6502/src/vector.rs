//! Single-instruction test vectors in the `SingleStepTests` JSON format.
//!
//! Each vector gives a starting CPU/RAM state, the expected state after one
//! instruction, and the expected bus activity cycle by cycle.

use emu_core::{Bus, Cpu, Tickable};
use serde::{Deserialize, Serialize};

use crate::flags::{B, U};
use crate::{CpuError, Mos6502, Status};

/// CPU registers plus the RAM bytes that matter to one vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuState {
    pub pc: u16,
    pub s: u8,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub p: u8,
    pub ram: Vec<(u16, u8)>,
}

/// One test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestVector {
    pub name: String,
    pub initial: CpuState,
    #[serde(rename = "final")]
    pub expected: CpuState,
    /// `(address, value, "read" | "write")` per cycle.
    #[serde(default)]
    pub cycles: Vec<(u16, u8, String)>,
}

/// Result of running one vector.
#[derive(Debug, Clone)]
pub struct VectorOutcome {
    /// State after the instruction, covering the addresses in `expected.ram`.
    pub state: CpuState,
    /// Cycles the instruction took.
    pub cycles: u32,
    pub error: Option<CpuError>,
    /// Human-readable differences from the expected state. Empty on pass.
    pub mismatches: Vec<String>,
}

impl VectorOutcome {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.mismatches.is_empty()
    }
}

/// Sparse 64K RAM that logs every access.
struct RecordingBus {
    memory: Box<[u8; 0x10000]>,
    accesses: Vec<(u16, u8, &'static str)>,
}

impl Bus for RecordingBus {
    fn read(&mut self, address: u16) -> u8 {
        let value = self.memory[address as usize];
        self.accesses.push((address, value, "read"));
        value
    }

    fn write(&mut self, address: u16, value: u8) {
        self.memory[address as usize] = value;
        self.accesses.push((address, value, "write"));
    }

    fn peek(&self, address: u16) -> u8 {
        self.memory[address as usize]
    }
}

impl Tickable for RecordingBus {
    fn tick(&mut self) {}
}

/// Run one vector: load the initial state, execute one instruction, compare.
///
/// P is compared with B and the unused bit masked, since neither exists in
/// the register itself.
#[must_use]
pub fn run_vector(vector: &TestVector) -> VectorOutcome {
    let mut bus = RecordingBus {
        memory: Box::new([0; 0x10000]),
        accesses: Vec::with_capacity(8),
    };
    for &(addr, value) in &vector.initial.ram {
        bus.memory[addr as usize] = value;
    }

    let mut cpu = Mos6502::new();
    let init = &vector.initial;
    cpu.regs.pc = init.pc;
    cpu.regs.s = init.s;
    cpu.regs.a = init.a;
    cpu.regs.x = init.x;
    cpu.regs.y = init.y;
    cpu.regs.p = Status::from_stack(init.p);

    let (cycles, error) = match cpu.step(&mut bus) {
        Ok(cycles) => (cycles, None),
        // A failed step never records its count, so take it off the clock.
        Err(err) => (cpu.cycles() as u32, Some(err)),
    };

    let state = CpuState {
        pc: cpu.regs.pc,
        s: cpu.regs.s,
        a: cpu.regs.a,
        x: cpu.regs.x,
        y: cpu.regs.y,
        p: cpu.regs.p.bits(),
        ram: vector
            .expected
            .ram
            .iter()
            .map(|&(addr, _)| (addr, bus.memory[addr as usize]))
            .collect(),
    };

    let mut mismatches = compare_state(&state, &vector.expected);
    if !vector.cycles.is_empty() {
        compare_cycles(&bus.accesses, &vector.cycles, &mut mismatches);
    }

    VectorOutcome {
        state,
        cycles,
        error,
        mismatches,
    }
}

fn compare_state(actual: &CpuState, expected: &CpuState) -> Vec<String> {
    let mut errors = Vec::new();
    let mut check = |name: &str, got: u16, want: u16| {
        if got != want {
            errors.push(format!("{name}: got ${got:02X}, want ${want:02X}"));
        }
    };
    check("PC", actual.pc, expected.pc);
    check("S", actual.s.into(), expected.s.into());
    check("A", actual.a.into(), expected.a.into());
    check("X", actual.x.into(), expected.x.into());
    check("Y", actual.y.into(), expected.y.into());
    let mask = !(B | U);
    check("P", (actual.p & mask).into(), (expected.p & mask).into());

    for (&(addr, got), &(_, want)) in actual.ram.iter().zip(&expected.ram) {
        if got != want {
            errors.push(format!("RAM[${addr:04X}]: got ${got:02X}, want ${want:02X}"));
        }
    }
    errors
}

fn compare_cycles(
    actual: &[(u16, u8, &'static str)],
    expected: &[(u16, u8, String)],
    errors: &mut Vec<String>,
) {
    if actual.len() != expected.len() {
        errors.push(format!(
            "cycles: got {}, want {}",
            actual.len(),
            expected.len()
        ));
    }
    for (i, (got, want)) in actual.iter().zip(expected).enumerate() {
        if got.0 != want.0 || got.1 != want.1 || got.2 != want.2 {
            errors.push(format!(
                "cycle {i}: got ${:04X} ${:02X} {}, want ${:04X} ${:02X} {}",
                got.0, got.1, got.2, want.0, want.1, want.2
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(pc: u16, a: u8, p: u8, ram: Vec<(u16, u8)>) -> CpuState {
        CpuState {
            pc,
            s: 0xFD,
            a,
            x: 0,
            y: 0,
            p,
            ram,
        }
    }

    #[test]
    fn lda_immediate_vector_passes() {
        let vector = TestVector {
            name: "a9 42".into(),
            initial: state(0x0200, 0, 0x24, vec![(0x0200, 0xA9), (0x0201, 0x42)]),
            expected: state(0x0202, 0x42, 0x24, vec![(0x0200, 0xA9), (0x0201, 0x42)]),
            cycles: vec![
                (0x0200, 0xA9, "read".into()),
                (0x0201, 0x42, "read".into()),
            ],
        };
        let outcome = run_vector(&vector);
        assert!(outcome.passed(), "{:?}", outcome.mismatches);
        assert_eq!(outcome.cycles, 2);
    }

    #[test]
    fn wrong_expectation_reports_mismatch() {
        let vector = TestVector {
            name: "a9 42 bad".into(),
            initial: state(0x0200, 0, 0x24, vec![(0x0200, 0xA9), (0x0201, 0x42)]),
            expected: state(0x0202, 0x41, 0x24, vec![]),
            cycles: vec![],
        };
        let outcome = run_vector(&vector);
        assert!(!outcome.passed());
        assert_eq!(outcome.mismatches, vec!["A: got $42, want $41".to_string()]);
    }

    #[test]
    fn unimplemented_opcode_is_reported() {
        let vector = TestVector {
            name: "8b".into(),
            initial: state(0x0200, 0, 0x24, vec![(0x0200, 0x8B), (0x0201, 0x00)]),
            expected: state(0x0202, 0, 0x24, vec![]),
            cycles: vec![],
        };
        let outcome = run_vector(&vector);
        assert_eq!(
            outcome.error,
            Some(CpuError::UnimplementedOpcode {
                opcode: 0x8B,
                pc: 0x0200
            })
        );
        // Only the opcode fetch ran.
        assert_eq!(outcome.cycles, 1);
    }

    #[test]
    fn parses_json() {
        let json = r#"{
            "name": "ea",
            "initial": {"pc": 512, "s": 253, "a": 0, "x": 0, "y": 0, "p": 36, "ram": [[512, 234], [513, 0]]},
            "final": {"pc": 513, "s": 253, "a": 0, "x": 0, "y": 0, "p": 36, "ram": [[512, 234]]},
            "cycles": [[512, 234, "read"], [513, 0, "read"]]
        }"#;
        let vector: TestVector = serde_json::from_str(json).expect("valid vector");
        assert!(run_vector(&vector).passed());
    }
}
