//! # CPU State and Execution
//!
//! This module contains the CPU struct, the fetch-decode-execute step and the
//! per-CPU run statistics.
//!
//! ## CPU State
//!
//! The CPU maintains:
//! - **Registers**: A, Y, X, S, P and the 16-bit program counter
//! - **Memory**: exclusively owned, accessed through `MemoryBus`
//! - **Instruction table**: shared, read-only
//! - **Run statistics**: cycle and instruction counters plus timestamps
//!
//! ## Execution Model
//!
//! - `step()`: Execute one instruction
//! - `run_for_cycles()`: Execute unpaced until a cycle budget is exhausted
//! - `execute()`: Hand the CPU to a `Clock` and run paced
//!
//! An opcode with no table entry is fatal. The CPU logs a core dump, halts,
//! and refuses to step again.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::addressing::{self, AddressingMode, Operand};
use crate::clock::Clock;
use crate::dump::CoreDump;
use crate::instructions;
use crate::memory::{Memory, MemoryBus};
use crate::opcodes::{InstructionDefinition, InstructionTable};
use crate::registers::{Flag, Register, RegisterFile};
use crate::ExecutionError;

/// Counters accumulated by one CPU since it was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Cycles consumed by executed instructions.
    pub total_cycles: u64,
    /// Instructions executed.
    pub total_instructions: u64,
    /// When execution began: clock start, or the first step if stepped by hand.
    pub start_time: Option<Instant>,
    /// When the most recent instruction finished.
    pub last_step_time: Option<Instant>,
}

impl RunStats {
    /// Time between the start and the last step.
    pub fn elapsed(&self) -> Duration {
        match (self.start_time, self.last_step_time) {
            (Some(start), Some(last)) => last.saturating_duration_since(start),
            _ => Duration::ZERO,
        }
    }

    /// Effective execution speed in cycles per second.
    ///
    /// Returns `None` until some time has elapsed between the start and the
    /// last step.
    pub fn frequency(&self) -> Option<f64> {
        let seconds = self.elapsed().as_secs_f64();
        (seconds > 0.0).then(|| self.total_cycles as f64 / seconds)
    }
}

/// 6502 CPU state and execution context.
///
/// Generic over the memory implementation via the `MemoryBus` trait. The
/// memory's `size()` must not exceed 65536 bytes, the reach of the 16-bit
/// program counter.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use paced6502::{Flag, InstructionTable, Memory, CPU};
///
/// let table = Arc::new(InstructionTable::mos6502().unwrap());
/// let mut memory = Memory::new();
/// memory.load(0x0000, &[0x69, 0x0A]); // ADC #$0A
///
/// let mut cpu = CPU::new(memory, table);
/// cpu.set_a(120);
/// cpu.step().unwrap();
///
/// assert_eq!(cpu.a(), 0x82);
/// assert!(cpu.flag(Flag::Overflow));
/// assert!(cpu.flag(Flag::Negative));
/// assert!(!cpu.flag(Flag::Carry));
/// ```
pub struct CPU<M: MemoryBus = Memory> {
    /// Register file
    pub(crate) registers: RegisterFile,

    /// Memory bus implementation
    pub(crate) memory: M,

    /// Opcode lookup
    table: Arc<InstructionTable>,

    stats: RunStats,

    /// Set by a fatal decode error
    halted: bool,
}

impl<M: MemoryBus> CPU<M> {
    /// Creates a CPU with zeroed registers, PC at 0x0000, and empty stats.
    pub fn new(memory: M, table: Arc<InstructionTable>) -> Self {
        Self {
            registers: RegisterFile::new(),
            memory,
            table,
            stats: RunStats::default(),
            halted: false,
        }
    }

    /// Executes one instruction.
    ///
    /// 1. Fetch the opcode byte at PC
    /// 2. Look it up in the instruction table
    /// 3. Run its operation (which resolves operands, updates flags and PC)
    /// 4. Add its cycle cost and count the instruction
    ///
    /// # Errors
    ///
    /// - `ExecutionError::InvalidOpcode` if the opcode has no definition. The
    ///   CPU halts; registers and memory are left exactly as fetched.
    /// - `ExecutionError::Halted` on any call after a fatal error.
    pub fn step(&mut self) -> Result<(), ExecutionError> {
        if self.halted {
            return Err(ExecutionError::Halted);
        }

        let pc = self.registers.pc();
        let opcode = self.memory.read(pc as usize);

        let Some(&definition) = self.table.get(opcode) else {
            let dump = self.core_dump();
            log::error!(
                "invalid opcode ${:02X} at ${:04X}, halting\n{}",
                opcode,
                pc,
                dump
            );
            self.halted = true;
            return Err(ExecutionError::InvalidOpcode {
                opcode,
                pc,
                dump: Box::new(dump),
            });
        };

        if log::log_enabled!(log::Level::Trace) {
            log::trace!("{}", self.trace_line(&definition));
        }

        instructions::execute(self, &definition);

        self.stats.total_cycles += definition.cycles as u64;
        self.stats.total_instructions += 1;

        let now = Instant::now();
        self.stats.start_time.get_or_insert(now);
        self.stats.last_step_time = Some(now);

        Ok(())
    }

    /// Runs the CPU unpaced for a number of cycles.
    ///
    /// Returns the cycles actually consumed, which may overshoot the budget
    /// by part of one instruction.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error from [`step`](Self::step).
    pub fn run_for_cycles(&mut self, cycle_budget: u64) -> Result<u64, ExecutionError> {
        let start_cycles = self.stats.total_cycles;
        let target_cycles = start_cycles + cycle_budget;

        while self.stats.total_cycles < target_cycles {
            self.step()?;
        }

        Ok(self.stats.total_cycles - start_cycles)
    }

    /// Runs the CPU paced by `clock` until a fatal error halts it.
    ///
    /// Every clock handler invocation is one `step()`.
    ///
    /// # Errors
    ///
    /// Returns the error that halted the CPU, or a `ClockError` if the clock
    /// could not be stopped cleanly.
    pub fn execute(&mut self, clock: &Clock) -> Result<(), ExecutionError> {
        self.execute_until(clock, |_| false)
    }

    /// Runs the CPU paced by `clock` until `done` returns true or a fatal
    /// error halts it.
    ///
    /// `done` is checked after every successful step. Once it returns true
    /// the clock is stopped; the frame in progress runs its remaining steps
    /// as no-ops.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub fn execute_until<F>(&mut self, clock: &Clock, mut done: F) -> Result<(), ExecutionError>
    where
        F: FnMut(&Self) -> bool,
    {
        let mut outcome: Option<Result<(), ExecutionError>> = None;
        self.stats.start_time.get_or_insert_with(Instant::now);

        clock.run(|| {
            if outcome.is_some() {
                return;
            }

            let result = match self.step() {
                Ok(()) if !done(self) => return,
                Ok(()) => Ok(()),
                Err(err) => Err(err),
            };

            outcome = Some(match clock.stop() {
                Ok(()) => result,
                Err(clock_err) => {
                    if let Err(err) = result {
                        log::error!("{} while stopping after: {}", clock_err, err);
                    }
                    Err(clock_err.into())
                }
            });
        })?;

        outcome.unwrap_or(Ok(()))
    }

    /// Captures registers, counters, and a full memory copy.
    pub fn core_dump(&self) -> CoreDump {
        CoreDump {
            registers: self.registers,
            total_cycles: self.stats.total_cycles,
            total_instructions: self.stats.total_instructions,
            memory: (0..self.memory.size())
                .map(|addr| self.memory.read(addr))
                .collect(),
        }
    }

    /// Formats the instruction at PC as a trace line.
    fn trace_line(&self, definition: &InstructionDefinition) -> String {
        let pc = self.registers.pc() as usize;
        let operand: Vec<u8> = (1..definition.size_bytes as usize)
            .map(|offset| self.memory.read(pc + offset))
            .collect();

        let mut bytes = format!("{:02X}", definition.opcode);
        for byte in &operand {
            bytes.push_str(&format!(" {:02X}", byte));
        }

        format!(
            "{:04X}  {:<8}  {} {:<10}  {}",
            pc,
            bytes,
            definition.mnemonic,
            definition.addressing_mode.format_operand(&operand),
            self.registers
        )
    }

    // ========== Helpers for Instruction Implementations ==========

    /// Resolves the operand location for `mode` at the current PC.
    pub(crate) fn operand(&self, mode: AddressingMode) -> Operand {
        addressing::resolve(mode, &self.registers, &self.memory)
    }

    /// Reads the value at an operand location. `Operand::None` reads as zero.
    pub(crate) fn load(&self, operand: Operand) -> u8 {
        match operand {
            Operand::None => 0,
            Operand::Accumulator => self.registers.get(Register::A),
            Operand::Address(addr) => self.memory.read(addr),
        }
    }

    /// Writes a value to an operand location. `Operand::None` discards it.
    pub(crate) fn store(&mut self, operand: Operand, value: u8) {
        match operand {
            Operand::None => {}
            Operand::Accumulator => self.registers.set(Register::A, value),
            Operand::Address(addr) => self.memory.write(addr, value),
        }
    }

    /// Moves PC past an instruction of `size_bytes`, wrapping at the end of
    /// memory.
    pub(crate) fn advance_pc(&mut self, size_bytes: u8) {
        let next = self.registers.pc() as usize + size_bytes as usize;
        self.registers.set_pc(self.memory.wrap(next) as u16);
    }

    /// Transfers control to `target`, wrapped into the address space.
    pub(crate) fn jump(&mut self, target: u16) {
        self.registers
            .set_pc(self.memory.wrap(target as usize) as u16);
    }

    // ========== Register Access ==========

    /// Returns the accumulator register value.
    pub fn a(&self) -> u8 {
        self.registers.get(Register::A)
    }

    /// Returns the X index register value.
    pub fn x(&self) -> u8 {
        self.registers.get(Register::X)
    }

    /// Returns the Y index register value.
    pub fn y(&self) -> u8 {
        self.registers.get(Register::Y)
    }

    /// Returns the stack pointer value.
    pub fn sp(&self) -> u8 {
        self.registers.get(Register::S)
    }

    /// Returns the packed status register.
    pub fn status(&self) -> u8 {
        self.registers.status()
    }

    /// Returns the program counter value.
    pub fn pc(&self) -> u16 {
        self.registers.pc()
    }

    /// Returns true if `flag` is set.
    pub fn flag(&self, flag: Flag) -> bool {
        self.registers.flag(flag)
    }

    /// Sets the accumulator.
    pub fn set_a(&mut self, value: u8) {
        self.registers.set(Register::A, value);
    }

    /// Sets the X index register.
    pub fn set_x(&mut self, value: u8) {
        self.registers.set(Register::X, value);
    }

    /// Sets the Y index register.
    pub fn set_y(&mut self, value: u8) {
        self.registers.set(Register::Y, value);
    }

    /// Sets the program counter, wrapped into the address space.
    pub fn set_pc(&mut self, pc: u16) {
        self.jump(pc);
    }

    /// Sets or clears a status flag.
    pub fn set_flag(&mut self, flag: Flag, on: bool) {
        self.registers.set_flag(flag, on);
    }

    /// Returns the register file.
    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Returns the register file for direct modification.
    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    // ========== Memory, Table, Statistics ==========

    /// Returns a reference to the memory bus.
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Returns a mutable reference to the memory bus, e.g. to load a program.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// Returns the instruction table this CPU decodes with.
    pub fn table(&self) -> &Arc<InstructionTable> {
        &self.table
    }

    /// Returns the total number of cycles executed.
    pub fn cycles(&self) -> u64 {
        self.stats.total_cycles
    }

    /// Returns a snapshot of the run statistics.
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Returns true once a fatal error has stopped the CPU.
    pub fn is_halted(&self) -> bool {
        self.halted
    }
}
