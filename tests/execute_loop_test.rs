//! Execution loop tests
//!
//! Verifies fetch-decode-execute, fatal decode errors, paced execution through
//! a `Clock`, and sharing one instruction table between CPUs.

use std::sync::Arc;
use std::thread;

use paced6502::{Clock, ClockConfig, ExecutionError, InstructionTable, Memory, MemoryBus, CPU};

fn table() -> Arc<InstructionTable> {
    Arc::new(InstructionTable::mos6502().unwrap())
}

fn cpu_with_program(program: &[u8]) -> CPU<Memory> {
    let mut memory = Memory::new();
    memory.load(0x0000, program);
    CPU::new(memory, table())
}

#[test]
fn test_step_rejects_unknown_opcode() {
    let mut cpu = cpu_with_program(&[0x02]);

    match cpu.step() {
        Err(ExecutionError::InvalidOpcode {
            opcode: 0x02,
            pc: 0x0000,
            ..
        }) => {}
        Ok(()) => panic!("Expected InvalidOpcode error, got Ok"),
        Err(e) => panic!("Expected InvalidOpcode(0x02), got {:?}", e),
    }

    assert!(cpu.is_halted());
    assert_eq!(cpu.pc(), 0x0000);
    assert_eq!(cpu.cycles(), 0);
}

#[test]
fn test_halted_cpu_stays_halted() {
    let mut cpu = cpu_with_program(&[0x02]);
    let _ = cpu.step();

    // Even with a valid opcode in place, the CPU refuses to continue
    cpu.memory_mut().write(0x0000, 0xEA);
    assert_eq!(cpu.step(), Err(ExecutionError::Halted));
    assert_eq!(cpu.stats().total_instructions, 0);
}

#[test]
fn test_dump_describes_machine_state() {
    let mut cpu = cpu_with_program(&[0x69, 0x05, 0xFF]);
    cpu.step().unwrap();

    let dump = match cpu.step() {
        Err(ExecutionError::InvalidOpcode { dump, .. }) => dump,
        other => panic!("Expected InvalidOpcode, got {:?}", other),
    };

    assert_eq!(dump.registers.pc(), 0x0002);
    assert_eq!(dump.total_cycles, 2);
    assert_eq!(dump.total_instructions, 1);
    assert_eq!(&dump.memory[..3], &[0x69, 0x05, 0xFF]);

    let text = dump.to_string();
    assert!(text.starts_with("PC=0002 A=05"), "{}", text);
    assert!(text.contains("0000: 69 05 FF"), "{}", text);
}

#[test]
fn test_execute_halts_on_invalid_opcode() {
    // ADC #$01 ; invalid
    let mut cpu = cpu_with_program(&[0x69, 0x01, 0xFF]);
    let clock = Clock::new(ClockConfig {
        target_frequency: 100,
        tick_frequency: 50,
    })
    .unwrap();

    let result = cpu.execute(&clock);

    assert!(matches!(
        result,
        Err(ExecutionError::InvalidOpcode {
            opcode: 0xFF,
            pc: 0x0002,
            ..
        })
    ));
    assert!(cpu.is_halted());
    assert!(!clock.is_running());
    assert_eq!(cpu.a(), 0x01);
    assert_eq!(clock.stats().frames, 1);
}

#[test]
fn test_execute_until_stops_clock() {
    // NOP ; JMP $0000
    let mut cpu = cpu_with_program(&[0xEA, 0x4C, 0x00, 0x00]);
    let clock = Clock::new(ClockConfig {
        target_frequency: 1000,
        tick_frequency: 100,
    })
    .unwrap();
    assert_eq!(clock.cycles_per_frame(), 10);

    cpu.execute_until(&clock, |cpu| cpu.stats().total_instructions == 25)
        .unwrap();

    let stats = cpu.stats();
    assert_eq!(stats.total_instructions, 25);
    assert!(stats.start_time.is_some());
    assert!(stats.last_step_time >= stats.start_time);
    assert!(!clock.is_running());
    assert_eq!(clock.stats().frames, 3);
}

#[test]
fn test_cpus_share_one_table() {
    let table = table();

    let handles: Vec<_> = (0..4u8)
        .map(|n| {
            let table = Arc::clone(&table);
            thread::spawn(move || {
                let mut memory = Memory::new();
                memory.load(0x0000, &[0x69, n]);
                let mut cpu = CPU::new(memory, table);
                cpu.step().unwrap();
                cpu.a()
            })
        })
        .collect();

    let results: Vec<u8> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![0, 1, 2, 3]);
    assert_eq!(Arc::strong_count(&table), 1);
}
