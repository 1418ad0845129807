//! # Load and Store Instructions
//!
//! This module implements:
//! - LDA: Load Accumulator
//! - STA: Store Accumulator

use crate::opcodes::InstructionDefinition;
use crate::{MemoryBus, Register, CPU};

/// Executes the LDA (Load Accumulator) instruction.
///
/// # Flag Behavior
///
/// - Zero (Z): Set if A = 0
/// - Negative (N): Set if bit 7 of A is set
/// - Other flags: Not affected
pub(crate) fn execute_lda<M: MemoryBus>(cpu: &mut CPU<M>, definition: &InstructionDefinition) {
    let operand = cpu.operand(definition.addressing_mode);
    let value = cpu.load(operand);

    cpu.registers.set(Register::A, value);
    cpu.registers.update_zero_negative(value);

    cpu.advance_pc(definition.size_bytes);
}

/// Executes the STA (Store Accumulator) instruction.
///
/// Writes A to the effective address. No flags affected.
pub(crate) fn execute_sta<M: MemoryBus>(cpu: &mut CPU<M>, definition: &InstructionDefinition) {
    let operand = cpu.operand(definition.addressing_mode);
    let a = cpu.registers.get(Register::A);

    cpu.store(operand, a);

    cpu.advance_pc(definition.size_bytes);
}
