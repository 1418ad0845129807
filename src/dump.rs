//! Diagnostic snapshots of a halted CPU.
//!
//! A [`CoreDump`] is captured when the CPU fetches an opcode it cannot decode.
//! Its `Display` output is a register line followed by a hexdump of memory in
//! 16-byte rows; runs of identical rows are collapsed to a single `*`.

use std::fmt;

use crate::registers::RegisterFile;

const ROW: usize = 16;

/// Full observable machine state at the moment of a fatal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreDump {
    /// Register file, including the PC of the failed fetch.
    pub registers: RegisterFile,
    /// Cycles executed before the failure.
    pub total_cycles: u64,
    /// Instructions executed before the failure.
    pub total_instructions: u64,
    /// Copy of every memory byte.
    pub memory: Vec<u8>,
}

impl fmt::Display for CoreDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.registers)?;
        writeln!(
            f,
            "cycles={} instructions={} memory={} bytes",
            self.total_cycles,
            self.total_instructions,
            self.memory.len()
        )?;

        let mut previous: Option<&[u8]> = None;
        let mut collapsed = false;
        for (index, row) in self.memory.chunks(ROW).enumerate() {
            if previous == Some(row) {
                if !collapsed {
                    writeln!(f, "*")?;
                    collapsed = true;
                }
                continue;
            }
            collapsed = false;
            previous = Some(row);

            write!(f, "{:04X}:", index * ROW)?;
            for byte in row {
                write!(f, " {:02X}", byte)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_rows_collapse() {
        let mut memory = vec![0u8; 64];
        memory[0x31] = 0xAB;

        let dump = CoreDump {
            registers: RegisterFile::new(),
            total_cycles: 5,
            total_instructions: 2,
            memory,
        };
        let text = dump.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[1], "cycles=5 instructions=2 memory=64 bytes");
        assert!(lines[2].starts_with("0000: 00 00"));
        assert_eq!(lines[3], "*");
        assert!(lines[4].starts_with("0030: 00 AB"));
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_short_final_row() {
        let dump = CoreDump {
            registers: RegisterFile::new(),
            total_cycles: 0,
            total_instructions: 0,
            memory: vec![0x11, 0x22, 0x33],
        };
        assert!(dump.to_string().ends_with("0000: 11 22 33\n"));
    }
}
