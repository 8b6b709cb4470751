//! Conformance log checks against the nestest layout.
//!
//! `opening_lines_match_reference` rebuilds the first instructions of
//! nestest's automated mode in a synthetic image. `full_log` runs the real
//! ROM against its reference log when `NESTEST_ROM` and `NESTEST_LOG` are
//! set.

use std::path::PathBuf;

use emu_core::{Cpu, Observable, Value};
use emu_nes::{Nes, NesConfig, NesError};

/// First lines of the reference log, from power-on at $C000.
const REFERENCE: &[&str] = &[
    "C000  4C F5 C5  JMP $C5F5                       A:00 X:00 Y:00 P:24 SP:FD PPU:  0, 21 CYC:7",
    "C5F5  A2 00     LDX #$00                        A:00 X:00 Y:00 P:24 SP:FD PPU:  0, 30 CYC:10",
    "C5F7  86 00     STX $00 = 00                    A:00 X:00 Y:00 P:26 SP:FD PPU:  0, 36 CYC:12",
    "C5F9  86 10     STX $10 = 00                    A:00 X:00 Y:00 P:26 SP:FD PPU:  0, 45 CYC:15",
    "C5FB  86 11     STX $11 = 00                    A:00 X:00 Y:00 P:26 SP:FD PPU:  0, 54 CYC:18",
    "C5FD  20 2D C7  JSR $C72D                       A:00 X:00 Y:00 P:26 SP:FD PPU:  0, 63 CYC:21",
    "C72D  EA        NOP                             A:00 X:00 Y:00 P:26 SP:FB PPU:  0, 81 CYC:27",
];

/// 16K NROM image, mirrored so $C000 is PRG offset 0.
fn opening_image() -> Vec<u8> {
    let mut data = vec![0u8; 16 + 0x4000 + 0x2000];
    data[..6].copy_from_slice(b"NES\x1A\x01\x01");
    let prg = &mut data[16..16 + 0x4000];
    prg[0x0000..0x0003].copy_from_slice(&[0x4C, 0xF5, 0xC5]);
    prg[0x05F5..0x0600].copy_from_slice(&[
        0xA2, 0x00, // LDX #$00
        0x86, 0x00, // STX $00
        0x86, 0x10, // STX $10
        0x86, 0x11, // STX $11
        0x20, 0x2D, 0xC7, // JSR $C72D
    ]);
    prg[0x072D] = 0xEA;
    data
}

fn boot_at_c000(rom_data: Vec<u8>) -> Result<Nes, NesError> {
    Nes::new(&NesConfig {
        rom_data,
        entry_point: Some(0xC000),
        ..NesConfig::default()
    })
}

#[test]
fn opening_lines_match_reference() {
    let mut nes = boot_at_c000(opening_image()).expect("valid image");
    for expected in REFERENCE {
        assert_eq!(nes.trace_line(), *expected);
        nes.step().expect("official opcodes only");
    }
}

#[test]
fn trace_line_does_not_disturb_state() {
    let nes = boot_at_c000(opening_image()).expect("valid image");
    let before = nes.cpu().cycles();
    let _ = nes.trace_line();
    let _ = nes.trace_line();
    assert_eq!(nes.cpu().cycles(), before);
    assert_eq!(nes.trace_line(), REFERENCE[0]);
}

#[test]
#[ignore = "requires NESTEST_ROM and NESTEST_LOG"]
fn full_log() {
    let (Some(rom), Some(log)) = (
        std::env::var_os("NESTEST_ROM").map(PathBuf::from),
        std::env::var_os("NESTEST_LOG").map(PathBuf::from),
    ) else {
        eprintln!("NESTEST_ROM / NESTEST_LOG not set");
        return;
    };
    let rom_data = std::fs::read(&rom).expect("read nestest ROM");
    let reference = std::fs::read_to_string(&log).expect("read nestest log");
    let mut nes = boot_at_c000(rom_data).expect("valid image");

    for (number, expected) in reference.lines().enumerate() {
        let actual = nes.trace_line();
        assert_eq!(
            actual.trim_end(),
            expected.trim_end(),
            "line {} diverged",
            number + 1
        );
        nes.step().expect("no unimplemented opcodes in nestest");
    }

    // The ROM stores its result codes at $02 and $03.
    assert_eq!(nes.query("memory.$02"), Some(Value::U8(0)), "official opcode failures");
    assert_eq!(nes.query("memory.$03"), Some(Value::U8(0)), "unofficial opcode failures");
}
