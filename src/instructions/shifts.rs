//! # Shift Instructions
//!
//! - ASL: Arithmetic Shift Left

use crate::opcodes::InstructionDefinition;
use crate::{Flag, MemoryBus, CPU};

/// Executes the ASL (Arithmetic Shift Left) instruction.
///
/// Shifts the accumulator or a memory byte one bit left. Bit 0 becomes 0 and
/// the old bit 7 goes to carry. Updates C, Z and N.
pub(crate) fn execute_asl<M: MemoryBus>(cpu: &mut CPU<M>, definition: &InstructionDefinition) {
    // Read-modify-write on the same location
    let operand = cpu.operand(definition.addressing_mode);
    let value = cpu.load(operand);
    let result = value << 1;

    cpu.registers.set_flag(Flag::Carry, value & 0x80 != 0);
    cpu.registers.update_zero_negative(result);
    cpu.store(operand, result);

    cpu.advance_pc(definition.size_bytes);
}
