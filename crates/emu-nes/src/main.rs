//! Headless NES runner.
//!
//! Loads an iNES image and runs it for a number of frames or CPU cycles.
//! `--trace` prints one nestest-format line per instruction to stdout.
//! Logging goes through `env_logger`; set `RUST_LOG=debug` for more.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use emu_core::{Cpu, Observable, parse_address};
use emu_nes::{Nes, NesConfig, NesError, Region};

#[derive(Parser, Debug)]
#[command(name = "emu-nes", version, about = "Cycle-accurate NES emulator")]
struct Args {
    /// iNES ROM file (.nes)
    #[arg(short, long)]
    rom: PathBuf,

    /// Number of frames to run
    #[arg(short, long, default_value_t = 60)]
    frames: u64,

    /// Run this many CPU cycles instead of whole frames
    #[arg(short, long)]
    cycles: Option<u64>,

    /// Print a conformance log line before each instruction
    #[arg(short, long)]
    trace: bool,

    /// Start execution here instead of at the reset vector (e.g. C000)
    #[arg(short, long, value_parser = parse_entry)]
    entry: Option<u16>,

    /// Run as a PAL console
    #[arg(long)]
    pal: bool,

    /// Print the CPU registers when finished
    #[arg(long)]
    dump_cpu: bool,
}

fn parse_entry(text: &str) -> Result<u16, String> {
    parse_address(text)
        .or_else(|| u16::from_str_radix(text, 16).ok())
        .ok_or_else(|| format!("invalid address: {text}"))
}

fn run(args: &Args, rom_data: Vec<u8>) -> Result<(), NesError> {
    let config = NesConfig {
        rom_data,
        region: if args.pal { Region::Pal } else { Region::Ntsc },
        entry_point: args.entry,
    };
    let mut nes = Nes::new(&config)?;

    if args.trace {
        let budget = args.cycles.unwrap_or(u64::MAX);
        let start = nes.cpu().cycles();
        while nes.cpu().cycles() - start < budget && !nes.cpu().is_halted() {
            println!("{}", nes.trace_line());
            nes.step()?;
        }
    } else if let Some(budget) = args.cycles {
        nes.advance(budget)?;
    } else {
        for _ in 0..args.frames {
            nes.advance_to_next_vblank()?;
        }
    }

    log::info!(
        "stopped after {} frames, {} CPU cycles",
        nes.frame(),
        nes.cpu().cycles()
    );
    if args.dump_cpu {
        dump_cpu(&nes);
    }
    Ok(())
}

fn dump_cpu(nes: &Nes) {
    println!("CPU state:");
    for path in ["pc", "a", "x", "y", "sp", "p", "cycles", "trapped"] {
        if let Some(value) = nes.query(&format!("cpu.{path}")) {
            println!("  {path:<8} {value}");
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let rom_data = match std::fs::read(&args.rom) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read ROM file {}: {e}", args.rom.display());
            process::exit(1);
        }
    };

    if let Err(e) = run(&args, rom_data) {
        eprintln!("{e}");
        process::exit(e.exit_code());
    }
}
