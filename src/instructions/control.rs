//! # Control Flow Instructions
//!
//! - JMP: Jump to absolute address
//! - NOP: No operation

use crate::opcodes::InstructionDefinition;
use crate::{MemoryBus, CPU};

/// Executes the JMP (Jump) instruction.
///
/// Loads PC from the two operand bytes (low, then high). This replaces the
/// usual length-based PC advance. No flags are affected.
pub(crate) fn execute_jmp<M: MemoryBus>(cpu: &mut CPU<M>, _definition: &InstructionDefinition) {
    let pc = cpu.registers.pc() as usize;
    let lo = cpu.memory.read(pc + 1);
    let hi = cpu.memory.read(pc + 2);

    cpu.jump(u16::from_le_bytes([lo, hi]));
}

/// Executes the NOP (No Operation) instruction.
pub(crate) fn execute_nop<M: MemoryBus>(cpu: &mut CPU<M>, definition: &InstructionDefinition) {
    cpu.advance_pc(definition.size_bytes);
}
