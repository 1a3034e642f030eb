//! Stand-alone 6502 interpreter entry point.
//!
//! Loads a flat ROM image, positions the CPU, and runs it one frame's worth
//! of cycles at a time, sleeping to the next frame deadline between budget
//! donations. Halts when the program executes BRK or an undocumented opcode.
//!
//! Usage: `talos -r <rom> [-ip <hex>] [-sp <hex>]`

use std::env;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use talos::{
    bus::FlatBus,
    cpu::cpu::{RunResult, CPU},
};

/// Nominal CPU clock in Hz. Budgets are donated at this rate, 60 times per
/// second; emulation speed then converges on the clock rate even though
/// individual instructions overshoot their frame.
const CPU_FREQUENCY: i32 = 1_790_000;

/// Budget donations per second.
const FRAME_RATE: i32 = 60;

/// Cycles donated per frame (29 833).
const CYCLES_PER_FRAME: i32 = CPU_FREQUENCY / FRAME_RATE;

/// Real-time interval between donations. We target 16.67 ms per frame.
const FRAME_DURATION: Duration = Duration::from_nanos(16_666_667);

struct Options {
    rom: String,
    initial_pc: Option<u16>,
    initial_sp: Option<u16>,
}

fn print_usage(program: &str) {
    println!("Usage: {} -r <rom> [options]", program);
    println!();
    println!("Options:");
    println!("  -r <path>   ROM image copied into memory at address 0 (required)");
    println!("  -ip <hex>   initial program counter (default 0000)");
    println!("  -sp <hex>   initial stack pointer; low byte is used (default 01FF)");
    println!("  -h, -help   print this message");
}

/// Parse the fixed option surface by hand. Returns `None` after printing
/// usage, either on request or on malformed input.
fn parse_args(args: &[String]) -> Option<Options> {
    let program = &args[0];
    let mut rom = None;
    let mut initial_pc = None;
    let mut initial_sp = None;

    let mut iter = args[1..].iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "-help" => {
                print_usage(program);
                return None;
            }
            "-r" => match iter.next() {
                Some(path) => rom = Some(path.clone()),
                None => {
                    print_usage(program);
                    return None;
                }
            },
            "-ip" => match iter.next().and_then(|v| parse_hex(v)) {
                Some(pc) => initial_pc = Some(pc),
                None => {
                    print_usage(program);
                    return None;
                }
            },
            "-sp" => match iter.next().and_then(|v| parse_hex(v)) {
                Some(sp) => initial_sp = Some(sp),
                None => {
                    print_usage(program);
                    return None;
                }
            },
            _ => {
                print_usage(program);
                return None;
            }
        }
    }

    match rom {
        Some(rom) => Some(Options {
            rom,
            initial_pc,
            initial_sp,
        }),
        None => {
            print_usage(program);
            None
        }
    }
}

fn parse_hex(value: &str) -> Option<u16> {
    let digits = value.trim_start_matches("0x").trim_start_matches('$');
    u16::from_str_radix(digits, 16).ok()
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let opts = match parse_args(&args) {
        Some(opts) => opts,
        None => process::exit(0),
    };

    let mut bus = FlatBus::new();
    let loaded = bus.load_rom(&opts.rom)?;
    log::info!("loaded {} bytes from {}", loaded, opts.rom);

    let mut cpu = CPU::new(bus);
    if let Some(pc) = opts.initial_pc {
        cpu.set_instruction_pointer(pc);
    }
    if let Some(sp) = opts.initial_sp {
        cpu.set_stack_pointer(sp);
    }

    // Donate one frame of cycles, then sleep to the frame deadline. The CPU
    // keeps any overdraft, so the long-run rate stays at CPU_FREQUENCY.
    let mut next_frame = Instant::now() + FRAME_DURATION;
    while cpu.run(CYCLES_PER_FRAME) == RunResult::Continue {
        let now = Instant::now();
        if next_frame > now {
            thread::sleep(next_frame - now);
        }
        next_frame += FRAME_DURATION;
    }

    log::info!("program halted at ${:04X}", cpu.pc);
    log::debug!("zero page:\n{}", cpu.bus.hexdump(0x0000, 256));
    log::debug!("stack page:\n{}", cpu.bus.hexdump(0x0100, 256));

    Ok(())
}
