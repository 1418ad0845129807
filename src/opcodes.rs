//! # Instruction Table
//!
//! Maps each opcode byte to an [`InstructionDefinition`]: its mnemonic,
//! addressing mode, cycle cost, byte length and the operation that executes
//! it.
//!
//! Tables are assembled once through [`InstructionTableBuilder`] and are
//! read-only afterwards. Registering the same opcode twice is a defect in the
//! emulator itself, so the builder refuses to produce a table at all.
//!
//! Adding an instruction means adding an [`Operation`] variant, its
//! implementation in `instructions`, and one `define` line per addressing mode
//! in [`InstructionTable::mos6502`].

use std::fmt;

use crate::addressing::AddressingMode;
use crate::ConfigError;

/// Behavior attached to an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Add with carry
    Adc,
    /// Logical AND with accumulator
    And,
    /// Arithmetic shift left
    Asl,
    /// Jump
    Jmp,
    /// Load accumulator
    Lda,
    /// No operation
    Nop,
    /// Store accumulator
    Sta,
}

impl Operation {
    /// Returns true if this operation can be encoded with `mode`.
    pub fn supports(self, mode: AddressingMode) -> bool {
        use AddressingMode::*;

        match self {
            Operation::Adc | Operation::And | Operation::Lda => matches!(
                mode,
                Immediate
                    | ZeroPage
                    | ZeroPageX
                    | Absolute
                    | AbsoluteX
                    | AbsoluteY
                    | IndirectX
                    | IndirectY
            ),
            Operation::Sta => matches!(
                mode,
                ZeroPage | ZeroPageX | Absolute | AbsoluteX | AbsoluteY | IndirectX | IndirectY
            ),
            Operation::Asl => matches!(
                mode,
                Accumulator | ZeroPage | ZeroPageX | Absolute | AbsoluteX
            ),
            Operation::Jmp => mode == Absolute,
            Operation::Nop => mode == Implied,
        }
    }
}

/// Static description of one opcode.
///
/// # Examples
///
/// ```
/// use paced6502::{AddressingMode, InstructionTable};
///
/// let table = InstructionTable::mos6502().unwrap();
/// let adc = table.get(0x69).unwrap();
/// assert_eq!(adc.mnemonic, "ADC");
/// assert_eq!(adc.addressing_mode, AddressingMode::Immediate);
/// assert_eq!(adc.cycles, 2);
/// assert_eq!(adc.size_bytes, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionDefinition {
    /// Opcode byte; unique within a table.
    pub opcode: u8,

    /// Display name (e.g. "ADC").
    pub mnemonic: &'static str,

    /// How the operand bytes are interpreted.
    pub addressing_mode: AddressingMode,

    /// Cycles consumed per execution.
    pub cycles: u8,

    /// Total instruction size including the opcode.
    pub size_bytes: u8,

    /// Operation to run.
    pub operation: Operation,
}

impl InstructionDefinition {
    /// Builds a definition whose size follows from its addressing mode.
    pub const fn new(
        opcode: u8,
        mnemonic: &'static str,
        addressing_mode: AddressingMode,
        cycles: u8,
        operation: Operation,
    ) -> Self {
        Self {
            opcode,
            mnemonic,
            addressing_mode,
            cycles,
            size_bytes: 1 + addressing_mode.operand_len(),
            operation,
        }
    }
}

impl fmt::Display for InstructionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${:02X} {} {} ({} cycles, {} bytes)",
            self.opcode, self.mnemonic, self.addressing_mode, self.cycles, self.size_bytes
        )
    }
}

/// Collects definitions and rejects duplicate opcodes.
#[derive(Debug)]
pub struct InstructionTableBuilder {
    entries: [Option<InstructionDefinition>; 256],
}

impl InstructionTableBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            entries: [None; 256],
        }
    }

    /// Registers one definition.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DuplicateOpcode` if the opcode already has a
    /// definition, or `ConfigError::UnsupportedAddressingMode` if the
    /// operation cannot use the definition's addressing mode. The builder
    /// should then be discarded.
    pub fn register(
        &mut self,
        definition: InstructionDefinition,
    ) -> Result<&mut Self, ConfigError> {
        if !definition.operation.supports(definition.addressing_mode) {
            return Err(ConfigError::UnsupportedAddressingMode {
                opcode: definition.opcode,
                mnemonic: definition.mnemonic,
                mode: definition.addressing_mode,
            });
        }

        let slot = &mut self.entries[definition.opcode as usize];
        if let Some(existing) = slot {
            return Err(ConfigError::DuplicateOpcode {
                opcode: definition.opcode,
                existing: existing.to_string(),
            });
        }
        *slot = Some(definition);
        Ok(self)
    }

    /// Shorthand for [`register`](Self::register) with
    /// [`InstructionDefinition::new`].
    pub fn define(
        &mut self,
        opcode: u8,
        mnemonic: &'static str,
        addressing_mode: AddressingMode,
        cycles: u8,
        operation: Operation,
    ) -> Result<&mut Self, ConfigError> {
        self.register(InstructionDefinition::new(
            opcode,
            mnemonic,
            addressing_mode,
            cycles,
            operation,
        ))
    }

    /// Freezes the collected definitions into a table.
    pub fn build(self) -> InstructionTable {
        InstructionTable {
            entries: self.entries,
        }
    }
}

impl Default for InstructionTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable opcode lookup table.
///
/// A table holds no interior mutability, so one instance can be shared by any
/// number of CPUs (typically behind an `Arc`).
#[derive(Debug, Clone)]
pub struct InstructionTable {
    entries: [Option<InstructionDefinition>; 256],
}

impl InstructionTable {
    /// Builds the table of implemented 6502 instructions.
    ///
    /// # Errors
    ///
    /// Fails only if the registration list below contains a duplicate
    /// opcode.
    pub fn mos6502() -> Result<Self, ConfigError> {
        use AddressingMode::*;
        use Operation::*;

        let mut builder = InstructionTableBuilder::new();
        builder
            // ADC
            .define(0x69, "ADC", Immediate, 2, Adc)?
            .define(0x65, "ADC", ZeroPage, 3, Adc)?
            .define(0x75, "ADC", ZeroPageX, 4, Adc)?
            .define(0x6D, "ADC", Absolute, 4, Adc)?
            .define(0x7D, "ADC", AbsoluteX, 4, Adc)?
            .define(0x79, "ADC", AbsoluteY, 4, Adc)?
            .define(0x61, "ADC", IndirectX, 6, Adc)?
            .define(0x71, "ADC", IndirectY, 5, Adc)?
            // AND
            .define(0x29, "AND", Immediate, 2, And)?
            .define(0x25, "AND", ZeroPage, 3, And)?
            .define(0x35, "AND", ZeroPageX, 4, And)?
            .define(0x2D, "AND", Absolute, 4, And)?
            .define(0x3D, "AND", AbsoluteX, 4, And)?
            .define(0x39, "AND", AbsoluteY, 4, And)?
            .define(0x21, "AND", IndirectX, 6, And)?
            .define(0x31, "AND", IndirectY, 5, And)?
            // ASL
            .define(0x0A, "ASL", Accumulator, 2, Asl)?
            .define(0x06, "ASL", ZeroPage, 5, Asl)?
            .define(0x16, "ASL", ZeroPageX, 6, Asl)?
            .define(0x0E, "ASL", Absolute, 6, Asl)?
            .define(0x1E, "ASL", AbsoluteX, 7, Asl)?
            // LDA
            .define(0xA9, "LDA", Immediate, 2, Lda)?
            .define(0xA5, "LDA", ZeroPage, 3, Lda)?
            .define(0xB5, "LDA", ZeroPageX, 4, Lda)?
            .define(0xAD, "LDA", Absolute, 4, Lda)?
            .define(0xBD, "LDA", AbsoluteX, 4, Lda)?
            .define(0xB9, "LDA", AbsoluteY, 4, Lda)?
            .define(0xA1, "LDA", IndirectX, 6, Lda)?
            .define(0xB1, "LDA", IndirectY, 5, Lda)?
            // STA
            .define(0x85, "STA", ZeroPage, 3, Sta)?
            .define(0x95, "STA", ZeroPageX, 4, Sta)?
            .define(0x8D, "STA", Absolute, 4, Sta)?
            .define(0x9D, "STA", AbsoluteX, 5, Sta)?
            .define(0x99, "STA", AbsoluteY, 5, Sta)?
            .define(0x81, "STA", IndirectX, 6, Sta)?
            .define(0x91, "STA", IndirectY, 6, Sta)?
            // Control
            .define(0x4C, "JMP", Absolute, 3, Jmp)?
            .define(0xEA, "NOP", Implied, 2, Nop)?;

        Ok(builder.build())
    }

    /// Looks up the definition for `opcode`.
    pub fn get(&self, opcode: u8) -> Option<&InstructionDefinition> {
        self.entries[opcode as usize].as_ref()
    }

    /// Finds the opcode encoding `mnemonic` in `mode`, if one is registered.
    pub fn find(&self, mnemonic: &str, mode: AddressingMode) -> Option<&InstructionDefinition> {
        self.iter()
            .find(|def| def.addressing_mode == mode && def.mnemonic.eq_ignore_ascii_case(mnemonic))
    }

    /// Iterates over registered definitions in opcode order.
    pub fn iter(&self) -> impl Iterator<Item = &InstructionDefinition> {
        self.entries.iter().flatten()
    }

    /// Number of registered opcodes.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns true if no opcode is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_rejects_duplicate_opcode() {
        let mut builder = InstructionTableBuilder::new();
        builder
            .define(0x69, "ADC", AddressingMode::Immediate, 2, Operation::Adc)
            .unwrap();

        let err = builder
            .define(0x69, "AND", AddressingMode::Immediate, 2, Operation::And)
            .unwrap_err();

        match err {
            ConfigError::DuplicateOpcode { opcode, existing } => {
                assert_eq!(opcode, 0x69);
                assert!(existing.contains("ADC"), "{}", existing);
            }
            other => panic!("Expected DuplicateOpcode, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_keeps_first_definition() {
        let mut builder = InstructionTableBuilder::new();
        builder
            .define(0xEA, "NOP", AddressingMode::Implied, 2, Operation::Nop)
            .unwrap();
        let _ = builder.define(0xEA, "JMP", AddressingMode::Absolute, 3, Operation::Jmp);

        let table = builder.build();
        assert_eq!(table.get(0xEA).unwrap().mnemonic, "NOP");
    }

    #[test]
    fn test_builder_rejects_unsupported_mode() {
        let mut builder = InstructionTableBuilder::new();
        let err = builder
            .define(0x89, "STA", AddressingMode::Immediate, 2, Operation::Sta)
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnsupportedAddressingMode {
                opcode: 0x89,
                mnemonic: "STA",
                mode: AddressingMode::Immediate,
            }
        );
    }

    #[test]
    fn test_sizes_follow_addressing_mode() {
        let table = InstructionTable::mos6502().unwrap();
        for def in table.iter() {
            assert_eq!(
                def.size_bytes,
                1 + def.addressing_mode.operand_len(),
                "{}",
                def
            );
            assert!(def.cycles > 0, "{}", def);
        }
    }

    #[test]
    fn test_find_by_mnemonic_and_mode() {
        let table = InstructionTable::mos6502().unwrap();
        assert_eq!(
            table
                .find("and", AddressingMode::IndirectY)
                .map(|d| d.opcode),
            Some(0x31)
        );
        assert_eq!(table.find("JMP", AddressingMode::Immediate), None);
    }

    #[test]
    fn test_unregistered_opcodes_are_absent() {
        let table = InstructionTable::mos6502().unwrap();
        assert!(table.get(0x02).is_none());
        assert!(table.get(0xFF).is_none());
        assert_eq!(table.len(), 38);
    }

    #[test]
    fn test_definition_display() {
        let def =
            InstructionDefinition::new(0x4C, "JMP", AddressingMode::Absolute, 3, Operation::Jmp);
        assert_eq!(def.to_string(), "$4C JMP absolute (3 cycles, 3 bytes)");
    }
}
