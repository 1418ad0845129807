//! Core dump example
//!
//! Runs a program into an undefined opcode and prints the core dump the
//! engine produces when it halts.
//!
//! Run with: `cargo run --example core_dump`

use std::sync::Arc;

use paced6502::{ExecutionError, InstructionTable, Memory, CPU};

fn main() {
    println!("Core Dump Example");
    println!("=================\n");

    let table = match InstructionTable::mos6502() {
        Ok(table) => Arc::new(table),
        Err(e) => {
            eprintln!("Failed to build instruction table: {}", e);
            std::process::exit(1);
        }
    };

    // A 64-byte machine keeps the dump short
    let mut memory = match Memory::with_size(64) {
        Ok(memory) => memory,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    // 00  LDA #$80
    // 02  ADC #$80    ; overflow into carry
    // 04  STA $20
    // 06  .byte $FF   ; not an instruction
    memory.load(0x00, &[0xA9, 0x80, 0x69, 0x80, 0x85, 0x20, 0xFF]);

    let mut cpu = CPU::new(memory, table);

    loop {
        match cpu.step() {
            Ok(()) => println!("  {}", cpu.registers()),
            Err(ExecutionError::InvalidOpcode { opcode, pc, dump }) => {
                println!("\nHalted on opcode ${:02X} at ${:04X}\n", opcode, pc);
                println!("{}", dump);
                break;
            }
            Err(e) => {
                println!("\nHalted: {}", e);
                break;
            }
        }
    }

    println!("CPU halted: {}", cpu.is_halted());
}
