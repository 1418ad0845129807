//! # ALU (Arithmetic Logic Unit) Instructions
//!
//! This module implements arithmetic and logical operations:
//! - ADC: Add with Carry
//! - AND: Logical AND

use crate::opcodes::InstructionDefinition;
use crate::{Flag, MemoryBus, Register, CPU};

/// Executes the ADC (Add with Carry) instruction.
///
/// A <- A + M + C. Updates C, Z, V and N.
///
/// Decimal mode is not emulated; the D flag does not change the result.
pub(crate) fn execute_adc<M: MemoryBus>(cpu: &mut CPU<M>, definition: &InstructionDefinition) {
    let operand = cpu.operand(definition.addressing_mode);
    let value = cpu.load(operand);

    let a = cpu.registers.get(Register::A);
    let carry_in = cpu.registers.flag(Flag::Carry) as u16;

    let sum = a as u16 + value as u16 + carry_in;
    let result = sum as u8;

    let regs = &mut cpu.registers;
    regs.update_carry(sum);
    regs.update_overflow(a, value, result);
    regs.update_zero_negative(result);
    regs.set(Register::A, result);

    cpu.advance_pc(definition.size_bytes);
}

/// Executes the AND (Logical AND) instruction.
///
/// A <- A & M. Updates Z and N; C and V are untouched.
pub(crate) fn execute_and<M: MemoryBus>(cpu: &mut CPU<M>, definition: &InstructionDefinition) {
    let operand = cpu.operand(definition.addressing_mode);
    let result = cpu.registers.get(Register::A) & cpu.load(operand);

    cpu.registers.update_zero_negative(result);
    cpu.registers.set(Register::A, result);

    cpu.advance_pc(definition.size_bytes);
}
