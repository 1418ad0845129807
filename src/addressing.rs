//! # Addressing Modes
//!
//! This module defines the addressing modes understood by the instruction
//! engine and the rules that turn the bytes following an opcode into an
//! operand location.
//!
//! Every formula reads the operand bytes relative to the PC of the opcode
//! itself, before the instruction's length is added to it.
//!
//! ## Wraparound
//!
//! - Full addresses wrap modulo the memory size
//! - Zero-page addresses (including index additions) wrap within 0x00-0xFF
//! - Zero-page pointer reads wrap within the zero page: a pointer stored at
//!   0xFF takes its high byte from 0x00

use std::fmt;

use crate::memory::MemoryBus;
use crate::registers::{Register, RegisterFile};

/// Addressing mode of an instruction.
///
/// # Operand Sizes
///
/// - **0 bytes**: Implied, Accumulator
/// - **1 byte**: Immediate, ZeroPage, ZeroPageX, IndirectX, IndirectY
/// - **2 bytes**: Absolute, AbsoluteX, AbsoluteY
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// No operand, operation implied by instruction.
    ///
    /// Example: NOP
    Implied,

    /// Operates directly on the accumulator register.
    ///
    /// Example: ASL A
    Accumulator,

    /// 8-bit constant stored right after the opcode.
    ///
    /// Example: ADC #$10
    Immediate,

    /// 8-bit address in zero page (0x00-0xFF).
    ///
    /// Example: ADC $80
    ZeroPage,

    /// Zero page address indexed by X, wrapping within zero page.
    ///
    /// Example: ADC $80,X
    ZeroPageX,

    /// Full 16-bit little-endian address.
    ///
    /// Example: JMP $1234
    Absolute,

    /// 16-bit address indexed by X. No page-crossing penalty is modeled.
    ///
    /// Example: ADC $1234,X
    AbsoluteX,

    /// 16-bit address indexed by Y. No page-crossing penalty is modeled.
    ///
    /// Example: ADC $1234,Y
    AbsoluteY,

    /// Zero page operand plus X, masked to one byte, used directly as the
    /// operand address.
    ///
    /// Example: ADC ($40,X)
    IndirectX,

    /// 16-bit pointer read from the zero page, then Y added to it.
    ///
    /// Example: ADC ($40),Y
    IndirectY,
}

impl AddressingMode {
    /// Number of operand bytes following the opcode.
    pub const fn operand_len(self) -> u8 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 0,
            AddressingMode::Immediate
            | AddressingMode::ZeroPage
            | AddressingMode::ZeroPageX
            | AddressingMode::IndirectX
            | AddressingMode::IndirectY => 1,
            AddressingMode::Absolute | AddressingMode::AbsoluteX | AddressingMode::AbsoluteY => 2,
        }
    }

    /// Formats the operand field of an instruction for trace output.
    ///
    /// `operand` holds the bytes that follow the opcode; missing bytes are
    /// rendered as `??`.
    pub fn format_operand(self, operand: &[u8]) -> String {
        let byte = || {
            operand
                .first()
                .map_or_else(|| "??".to_string(), |b| format!("{:02X}", b))
        };
        let word = || match operand {
            [lo, hi, ..] => format!("{:04X}", u16::from_le_bytes([*lo, *hi])),
            _ => "????".to_string(),
        };

        match self {
            AddressingMode::Implied => String::new(),
            AddressingMode::Accumulator => "A".to_string(),
            AddressingMode::Immediate => format!("#${}", byte()),
            AddressingMode::ZeroPage => format!("${}", byte()),
            AddressingMode::ZeroPageX => format!("${},X", byte()),
            AddressingMode::Absolute => format!("${}", word()),
            AddressingMode::AbsoluteX => format!("${},X", word()),
            AddressingMode::AbsoluteY => format!("${},Y", word()),
            AddressingMode::IndirectX => format!("(${},X)", byte()),
            AddressingMode::IndirectY => format!("(${}),Y", byte()),
        }
    }
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AddressingMode::Implied => "implied",
            AddressingMode::Accumulator => "accumulator",
            AddressingMode::Immediate => "immediate",
            AddressingMode::ZeroPage => "zeropage",
            AddressingMode::ZeroPageX => "zeropage,X",
            AddressingMode::Absolute => "absolute",
            AddressingMode::AbsoluteX => "absolute,X",
            AddressingMode::AbsoluteY => "absolute,Y",
            AddressingMode::IndirectX => "indirect,X",
            AddressingMode::IndirectY => "indirect,Y",
        };
        f.write_str(name)
    }
}

/// Where an instruction's operand lives once its addressing mode is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// No operand.
    None,
    /// The accumulator register.
    Accumulator,
    /// A memory location, already wrapped into the address space.
    Address(usize),
}

/// Resolves the operand location for `mode` at the current PC.
pub fn resolve<M: MemoryBus>(mode: AddressingMode, regs: &RegisterFile, memory: &M) -> Operand {
    let pc = regs.pc() as usize;
    let arg = |offset: usize| memory.read(pc + offset);
    let absolute = || u16::from_le_bytes([arg(1), arg(2)]) as usize;

    let address = match mode {
        AddressingMode::Implied => return Operand::None,
        AddressingMode::Accumulator => return Operand::Accumulator,
        AddressingMode::Immediate => pc + 1,
        AddressingMode::ZeroPage => arg(1) as usize,
        AddressingMode::ZeroPageX => arg(1).wrapping_add(regs.get(Register::X)) as usize,
        AddressingMode::Absolute => absolute(),
        AddressingMode::AbsoluteX => absolute() + regs.get(Register::X) as usize,
        AddressingMode::AbsoluteY => absolute() + regs.get(Register::Y) as usize,
        AddressingMode::IndirectX => arg(1).wrapping_add(regs.get(Register::X)) as usize,
        AddressingMode::IndirectY => {
            let zp = arg(1);
            let lo = memory.read_zero_page(zp);
            let hi = memory.read_zero_page(zp.wrapping_add(1));
            u16::from_le_bytes([lo, hi]) as usize + regs.get(Register::Y) as usize
        }
    };

    Operand::Address(memory.wrap(address))
}
