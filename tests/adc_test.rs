//! Tests for the ADC (Add with Carry) instruction.
//!
//! Tests cover:
//! - All 8 addressing modes
//! - Flag updates (C, Z, V, N)
//! - Carry-in and wraparound
//! - Cycle counts and PC advance

use std::sync::Arc;

use paced6502::{Flag, InstructionTable, Memory, MemoryBus, CPU};

/// Helper function to create a CPU with PC at 0x8000
fn setup_cpu() -> CPU<Memory> {
    let table = Arc::new(InstructionTable::mos6502().unwrap());
    let mut cpu = CPU::new(Memory::new(), table);
    cpu.set_pc(0x8000);
    cpu
}

// ========== Basic ADC Operation Tests ==========

#[test]
fn test_adc_immediate_basic() {
    let mut cpu = setup_cpu();

    // ADC #$05
    cpu.memory_mut().load(0x8000, &[0x69, 0x05]);
    cpu.set_a(0x10);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x15);
    assert!(!cpu.flag(Flag::Carry));
    assert!(!cpu.flag(Flag::Zero));
    assert!(!cpu.flag(Flag::Overflow));
    assert!(!cpu.flag(Flag::Negative));
    assert_eq!(cpu.pc(), 0x8002);
    assert_eq!(cpu.cycles(), 2);
}

#[test]
fn test_adc_with_carry_in() {
    let mut cpu = setup_cpu();

    cpu.memory_mut().load(0x8000, &[0x69, 0x05]);
    cpu.set_a(0x10);
    cpu.set_flag(Flag::Carry, true);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x16); // 0x10 + 0x05 + 1
    assert!(!cpu.flag(Flag::Carry));
}

// ========== Flag Tests ==========

#[test]
fn test_adc_signed_overflow_example() {
    let mut cpu = setup_cpu();

    // 120 + 10 = 130: two positives give a negative
    cpu.memory_mut().load(0x8000, &[0x69, 10]);
    cpu.set_a(120);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x82);
    assert!(!cpu.flag(Flag::Carry));
    assert!(!cpu.flag(Flag::Zero));
    assert!(cpu.flag(Flag::Negative));
    assert!(cpu.flag(Flag::Overflow));
}

#[test]
fn test_adc_carry_and_zero() {
    let mut cpu = setup_cpu();

    cpu.memory_mut().load(0x8000, &[0x69, 0xFF]);
    cpu.set_a(0x01);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x00); // 0x100 wrapped
    assert!(cpu.flag(Flag::Carry));
    assert!(cpu.flag(Flag::Zero));
    assert!(!cpu.flag(Flag::Overflow));
}

#[test]
fn test_adc_carry_in_pushes_past_byte() {
    let mut cpu = setup_cpu();

    // 0x80 + 0x7F + 1 = 0x100
    cpu.memory_mut().load(0x8000, &[0x69, 0x7F]);
    cpu.set_a(0x80);
    cpu.set_flag(Flag::Carry, true);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag(Flag::Carry));
    assert!(cpu.flag(Flag::Zero));
}

#[test]
fn test_adc_negative_overflow() {
    let mut cpu = setup_cpu();

    // 0x80 + 0xFF = 0x17F: two negatives give a positive
    cpu.memory_mut().load(0x8000, &[0x69, 0xFF]);
    cpu.set_a(0x80);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x7F);
    assert!(cpu.flag(Flag::Carry));
    assert!(cpu.flag(Flag::Overflow));
    assert!(!cpu.flag(Flag::Negative));
}

#[test]
fn test_adc_leaves_unrelated_flags_alone() {
    let mut cpu = setup_cpu();

    cpu.memory_mut().load(0x8000, &[0x69, 0x01]);
    cpu.set_flag(Flag::Decimal, true);
    cpu.set_flag(Flag::IrqDisable, true);
    cpu.set_flag(Flag::Break, true);

    cpu.step().unwrap();

    assert!(cpu.flag(Flag::Decimal));
    assert!(cpu.flag(Flag::IrqDisable));
    assert!(cpu.flag(Flag::Break));
}

// ========== Addressing Mode Tests ==========

#[test]
fn test_adc_zero_page() {
    let mut cpu = setup_cpu();

    cpu.memory_mut().load(0x8000, &[0x65, 0x42]);
    cpu.memory_mut().write(0x0042, 0x30);
    cpu.set_a(0x12);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x42);
    assert_eq!(cpu.pc(), 0x8002);
    assert_eq!(cpu.cycles(), 3);
}

#[test]
fn test_adc_zero_page_x_wraps() {
    let mut cpu = setup_cpu();

    cpu.memory_mut().load(0x8000, &[0x75, 0xF0]);
    cpu.memory_mut().write(0x0010, 0x05); // 0xF0 + 0x20 wraps to 0x10
    cpu.memory_mut().write(0x0110, 0x99);
    cpu.set_x(0x20);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x05);
    assert_eq!(cpu.cycles(), 4);
}

#[test]
fn test_adc_absolute() {
    let mut cpu = setup_cpu();

    cpu.memory_mut().load(0x8000, &[0x6D, 0x34, 0x12]);
    cpu.memory_mut().write(0x1234, 0x21);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x21);
    assert_eq!(cpu.pc(), 0x8003);
    assert_eq!(cpu.cycles(), 4);
}

#[test]
fn test_adc_absolute_x_crosses_page_without_penalty() {
    let mut cpu = setup_cpu();

    cpu.memory_mut().load(0x8000, &[0x7D, 0xFF, 0x12]);
    cpu.memory_mut().write(0x1300, 0x07);
    cpu.set_x(0x01);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x07);
    assert_eq!(cpu.cycles(), 4);
}

#[test]
fn test_adc_absolute_y() {
    let mut cpu = setup_cpu();

    cpu.memory_mut().load(0x8000, &[0x79, 0x00, 0x20]);
    cpu.memory_mut().write(0x2005, 0x09);
    cpu.set_y(0x05);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x09);
    assert_eq!(cpu.pc(), 0x8003);
}

#[test]
fn test_adc_indirect_x() {
    let mut cpu = setup_cpu();

    // Operand at ($40 + X) & 0xFF, read directly
    cpu.memory_mut().load(0x8000, &[0x61, 0x40]);
    cpu.memory_mut().write(0x0044, 0x0C);
    cpu.set_x(0x04);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x0C);
    assert_eq!(cpu.cycles(), 6);
}

#[test]
fn test_adc_indirect_x_wraps_index() {
    let mut cpu = setup_cpu();

    cpu.memory_mut().load(0x8000, &[0x61, 0xFF]);
    cpu.memory_mut().write(0x0001, 0x0D);
    cpu.set_x(0x02);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x0D);
}

#[test]
fn test_adc_indirect_y() {
    let mut cpu = setup_cpu();

    cpu.memory_mut().load(0x8000, &[0x71, 0x40]);
    cpu.memory_mut().load(0x0040, &[0x00, 0x30]); // pointer = 0x3000
    cpu.memory_mut().write(0x3010, 0x0E);
    cpu.set_y(0x10);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x0E);
    assert_eq!(cpu.pc(), 0x8002);
    assert_eq!(cpu.cycles(), 5);
}

#[test]
fn test_adc_indirect_y_wraps_address_space() {
    let mut cpu = setup_cpu();

    cpu.memory_mut().load(0x8000, &[0x71, 0x40]);
    cpu.memory_mut().load(0x0040, &[0xFF, 0xFF]); // pointer = 0xFFFF
    cpu.memory_mut().write(0x0002, 0x0F);
    cpu.set_y(0x03);

    cpu.step().unwrap();

    assert_eq!(cpu.a(), 0x0F);
}
