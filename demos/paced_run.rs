//! Paced execution example
//!
//! Runs a small program at a fixed emulated frequency and prints the clock
//! and CPU statistics once per second.
//!
//! This example shows:
//! - Building the instruction table once and sharing it
//! - Loading a program image into memory
//! - Pacing the CPU with a `Clock`
//! - Stopping the run from a completion predicate
//!
//! Run with: `cargo run --example paced_run -- [frequency_hz] [seconds]`

use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use paced6502::{Clock, ClockConfig, InstructionTable, Memory, CPU};

fn main() {
    let mut args = env::args().skip(1);
    let target_frequency = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1_000_000);
    let seconds = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);

    println!("Paced 6502 Example");
    println!("==================\n");

    let table = match InstructionTable::mos6502() {
        Ok(table) => Arc::new(table),
        Err(e) => {
            eprintln!("Failed to build instruction table: {}", e);
            std::process::exit(1);
        }
    };
    println!("Instruction table: {} opcodes\n", table.len());

    // 0200  LDA #$01
    // 0202  ADC $10
    // 0204  STA $10
    // 0206  ASL A
    // 0207  AND #$7F
    // 0209  NOP
    // 020A  JMP $0202
    let program = [
        0xA9, 0x01, 0x65, 0x10, 0x85, 0x10, 0x0A, 0x29, 0x7F, 0xEA, 0x4C, 0x02, 0x02,
    ];
    let mut memory = Memory::new();
    memory.load(0x0200, &program);

    let mut cpu = CPU::new(memory, table);
    cpu.set_pc(0x0200);

    let clock = match Clock::new(ClockConfig {
        target_frequency,
        tick_frequency: 60,
    }) {
        Ok(clock) => clock,
        Err(e) => {
            eprintln!("Invalid clock configuration: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Target {} Hz: {} cycles every {} ms for {} s\n",
        target_frequency,
        clock.cycles_per_frame(),
        clock.frame_interval_ms(),
        seconds
    );

    let started = Instant::now();
    let deadline = started + Duration::from_secs(seconds);
    let mut next_report = started + Duration::from_secs(1);

    let result = cpu.execute_until(&clock, |cpu| {
        let now = Instant::now();
        if now >= next_report {
            next_report += Duration::from_secs(1);
            let stats = clock.stats();
            println!(
                "frames={:<6} dropped={:<4} clock={:>12.0} Hz  usage={:>5.1}%  cpu={:>12.0} Hz  instructions={}",
                stats.frames,
                stats.dropped_frames,
                stats.actual_frequency,
                stats.usage,
                cpu.stats().frequency().unwrap_or(0.0),
                cpu.stats().total_instructions,
            );
        }
        now >= deadline
    });

    println!();
    match result {
        Ok(()) => println!("Stopped after {:?}", started.elapsed()),
        Err(e) => println!("Execution failed: {}", e),
    }
    println!("Final state: {}", cpu.registers());
    println!("Total cycles: {}", cpu.cycles());
}
