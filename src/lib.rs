//! # Paced 6502 Instruction Engine
//!
//! A 6502 instruction engine driven by a frame-paced clock.
//!
//! This crate provides the register file and flag protocol, a fixed-size
//! wrapping memory, a table-driven opcode dispatcher with addressing-mode
//! resolution, and a cooperative scheduler that runs the CPU in frames at a
//! target frequency.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use paced6502::{InstructionTable, Memory, CPU};
//!
//! let table = Arc::new(InstructionTable::mos6502().unwrap());
//!
//! // ADC #$01 ; JMP $0000
//! let mut memory = Memory::new();
//! memory.load(0x0000, &[0x69, 0x01, 0x4C, 0x00, 0x00]);
//!
//! let mut cpu = CPU::new(memory, table);
//! cpu.step().unwrap();
//! cpu.step().unwrap();
//!
//! assert_eq!(cpu.a(), 0x01);
//! assert_eq!(cpu.pc(), 0x0000);
//! assert_eq!(cpu.stats().total_cycles, 5);
//! ```
//!
//! ## Paced Execution
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use paced6502::{Clock, ClockConfig, InstructionTable, Memory, CPU};
//!
//! let table = Arc::new(InstructionTable::mos6502().unwrap());
//! let mut memory = Memory::new();
//! memory.load(0x0000, &[0x69, 0x01, 0x4C, 0x00, 0x00]);
//!
//! let clock = Clock::new(ClockConfig::default()).unwrap();
//! let mut cpu = CPU::new(memory, table);
//!
//! // Runs until the program hits an unknown opcode or the clock is stopped
//! let result = cpu.execute(&clock);
//! ```
//!
//! ## Modules
//!
//! - `memory` - MemoryBus trait and the flat `Memory` implementation
//! - `registers` - Register file and status flag protocol
//! - `addressing` - Addressing modes and operand resolution
//! - `opcodes` - Instruction definitions and the opcode table
//! - `cpu` - Fetch-decode-execute engine and run statistics
//! - `clock` - Frame-paced scheduler
//! - `dump` - Diagnostic state dumps for fatal decode errors
//!
//! ## Logging
//!
//! The crate logs through the `log` facade and never installs a logger.

pub mod addressing;
pub mod clock;
pub mod cpu;
pub mod dump;
pub mod memory;
pub mod opcodes;
pub mod registers;

// Internal instruction implementations (not part of public API)
mod instructions;

// Re-export public API
pub use addressing::{AddressingMode, Operand};
pub use clock::{Clock, ClockConfig, ClockStats};
pub use cpu::{RunStats, CPU};
pub use dump::CoreDump;
pub use memory::{Memory, MemoryBus, DEFAULT_MEMORY_SIZE};
pub use opcodes::{InstructionDefinition, InstructionTable, InstructionTableBuilder, Operation};
pub use registers::{Flag, Register, RegisterFile};

use thiserror::Error;

/// Errors raised while assembling the emulator. All of them are fatal: the
/// system must not start with a bad configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Two definitions were registered for one opcode.
    #[error("opcode ${opcode:02X} already defined as: {existing}")]
    DuplicateOpcode {
        /// The contested opcode.
        opcode: u8,
        /// The definition that was registered first.
        existing: String,
    },

    /// An operation was paired with an addressing mode it cannot use.
    #[error("opcode ${opcode:02X}: {mnemonic} does not support {mode} addressing")]
    UnsupportedAddressingMode {
        /// Opcode being registered.
        opcode: u8,
        /// Its mnemonic.
        mnemonic: &'static str,
        /// The rejected mode.
        mode: AddressingMode,
    },

    /// Memory capacity outside 1..=65536 bytes.
    #[error("invalid memory size {0}: must be between 1 and 65536 bytes")]
    InvalidMemorySize(usize),

    /// A clock frequency of zero.
    #[error("invalid clock configuration: target {target_frequency} Hz, tick {tick_frequency} Hz")]
    InvalidFrequency {
        /// Target instruction-execution frequency in Hz.
        target_frequency: u64,
        /// Frame (tick) frequency in Hz.
        tick_frequency: u64,
    },
}

/// Internal consistency violations in the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClockError {
    /// The clock claims to be running but has no frame timer armed.
    #[error("clock is running but its frame timer is not armed")]
    TimerNotArmed,
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    /// The fetched byte has no definition in the instruction table.
    ///
    /// Carries a dump of the machine state taken at the failed fetch.
    #[error("invalid opcode ${opcode:02X} at ${pc:04X}")]
    InvalidOpcode {
        /// Fetched opcode byte.
        opcode: u8,
        /// Address it was fetched from.
        pc: u16,
        /// Machine state at the failed fetch.
        dump: Box<CoreDump>,
    },

    /// The CPU already stopped on a fatal error.
    #[error("CPU is halted")]
    Halted,

    /// The scheduler driving the CPU failed.
    #[error(transparent)]
    Clock(#[from] ClockError),
}
