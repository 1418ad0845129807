//! # Instruction Implementations
//!
//! Each instruction is a standalone function taking the CPU and the decoded
//! definition. Implementations resolve their own operand, update registers,
//! flags and memory, then move PC. Cycle accounting is done by `CPU::step`.
//!
//! ## Categories
//!
//! - **alu**: ADC, AND
//! - **shifts**: ASL
//! - **load_store**: LDA, STA
//! - **control**: JMP, NOP

mod alu;
mod control;
mod load_store;
mod shifts;

use crate::opcodes::{InstructionDefinition, Operation};
use crate::{MemoryBus, CPU};

/// Runs the operation attached to `definition`.
pub(crate) fn execute<M: MemoryBus>(cpu: &mut CPU<M>, definition: &InstructionDefinition) {
    match definition.operation {
        Operation::Adc => alu::execute_adc(cpu, definition),
        Operation::And => alu::execute_and(cpu, definition),
        Operation::Asl => shifts::execute_asl(cpu, definition),
        Operation::Jmp => control::execute_jmp(cpu, definition),
        Operation::Lda => load_store::execute_lda(cpu, definition),
        Operation::Nop => control::execute_nop(cpu, definition),
        Operation::Sta => load_store::execute_sta(cpu, definition),
    }
}
