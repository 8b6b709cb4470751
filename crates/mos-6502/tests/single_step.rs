//! Integration tests using Tom Harte's `SingleStepTests` for the 2A03.
//!
//! Runs every opcode file in `test-data/nes6502/v1/XX.json` (override with
//! `SINGLE_STEP_DIR`), comparing registers, RAM and per-cycle bus activity.

use std::fs;
use std::path::PathBuf;

use mos_6502::opcodes::{Instruction, decode};
use mos_6502::vector::{TestVector, run_vector};

fn test_dir() -> PathBuf {
    std::env::var_os("SINGLE_STEP_DIR").map_or_else(
        || {
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("../../test-data/nes6502/v1")
        },
        PathBuf::from,
    )
}

#[test]
#[ignore = "requires test-data/nes6502; run with --ignored"]
fn run_all() {
    let dir = test_dir();
    if !dir.exists() {
        eprintln!("Test data not found at {}", dir.display());
        return;
    }

    let mut total_pass = 0u64;
    let mut total_fail = 0u64;

    for opcode in 0..=0xFF_u8 {
        let entry = decode(opcode);
        if entry.is_unimplemented() || matches!(entry.instruction, Instruction::Jam) {
            continue;
        }
        let path = dir.join(format!("{opcode:02x}.json"));
        if !path.exists() {
            continue;
        }

        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
        let vectors: Vec<TestVector> = serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()));

        let mut first_failures = Vec::new();
        for vector in &vectors {
            let outcome = run_vector(vector);
            if outcome.passed() {
                total_pass += 1;
            } else {
                total_fail += 1;
                if first_failures.len() < 3 {
                    first_failures.push(format!("{}: {:?}", vector.name, outcome.mismatches));
                }
            }
        }
        for failure in &first_failures {
            eprintln!("  ${opcode:02X} {failure}");
        }
    }

    eprintln!("SingleStepTests: {total_pass} passed, {total_fail} failed");
    assert_eq!(total_fail, 0, "{total_fail} vectors failed");
}
