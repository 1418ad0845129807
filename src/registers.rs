//! # Register File and Status Flags
//!
//! The 6502 register file: five 8-bit cells (A, Y, X, S, P) and a 16-bit
//! program counter.
//!
//! The status register P is kept as a packed byte, exactly as the hardware
//! stores it. Instructions never touch its bits directly; they go through the
//! flag accessors here, which set a bit by OR-ing it in and clear it by AND-ing
//! with its complement, so one update never disturbs another flag.
//!
//! ```text
//! bit  7 6 5 4 3 2 1 0
//!      N V - B D I Z C
//! ```

use std::fmt;

/// Names of the 8-bit register cells, in register-file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Accumulator
    A = 0,
    /// Y index register
    Y = 1,
    /// X index register
    X = 2,
    /// Stack pointer
    S = 3,
    /// Processor status
    P = 4,
}

impl Register {
    /// All cells in storage order.
    pub const ALL: [Register; 5] = [
        Register::A,
        Register::Y,
        Register::X,
        Register::S,
        Register::P,
    ];
}

/// Status register flags and their fixed bit positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    /// C: carry out of bit 7.
    Carry,
    /// Z: last result was zero.
    Zero,
    /// I: maskable interrupts disabled.
    IrqDisable,
    /// D: decimal mode (stored, not emulated).
    Decimal,
    /// B: break.
    Break,
    /// V: signed overflow.
    Overflow,
    /// N: bit 7 of the last result.
    Negative,
}

impl Flag {
    /// Bit mask of this flag within P.
    pub const fn mask(self) -> u8 {
        match self {
            Flag::Carry => 0b0000_0001,
            Flag::Zero => 0b0000_0010,
            Flag::IrqDisable => 0b0000_0100,
            Flag::Decimal => 0b0000_1000,
            Flag::Break => 0b0001_0000,
            Flag::Overflow => 0b0100_0000,
            Flag::Negative => 0b1000_0000,
        }
    }
}

/// Sign bit of an 8-bit value.
const SIGN_MASK: u8 = 0x80;

/// The CPU register file.
///
/// # Examples
///
/// ```
/// use paced6502::{Flag, Register, RegisterFile};
///
/// let mut regs = RegisterFile::new();
/// regs.set(Register::A, 0x80);
/// regs.update_zero_negative(regs.get(Register::A));
///
/// assert!(regs.flag(Flag::Negative));
/// assert!(!regs.flag(Flag::Zero));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterFile {
    cells: [u8; 5],
    pc: u16,
}

impl RegisterFile {
    /// Creates a zeroed register file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads an 8-bit cell.
    pub fn get(&self, register: Register) -> u8 {
        self.cells[register as usize]
    }

    /// Writes an 8-bit cell.
    pub fn set(&mut self, register: Register, value: u8) {
        self.cells[register as usize] = value;
    }

    /// Returns the program counter.
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Sets the program counter.
    ///
    /// Callers are responsible for wrapping the value into the memory's
    /// address space; see `CPU::advance_pc`.
    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    /// Returns the packed status register.
    pub fn status(&self) -> u8 {
        self.get(Register::P)
    }

    // ========== Flag Protocol ==========

    /// Returns true if `flag` is set.
    pub fn flag(&self, flag: Flag) -> bool {
        self.cells[Register::P as usize] & flag.mask() != 0
    }

    /// Sets or clears a single flag, leaving every other bit of P untouched.
    pub fn set_flag(&mut self, flag: Flag, on: bool) {
        let p = &mut self.cells[Register::P as usize];
        if on {
            *p |= flag.mask();
        } else {
            *p &= !flag.mask();
        }
    }

    /// Z is set iff `result` is zero; N mirrors bit 7 of `result`.
    pub fn update_zero_negative(&mut self, result: u8) {
        self.set_flag(Flag::Zero, result == 0);
        self.set_flag(Flag::Negative, result & SIGN_MASK != 0);
    }

    /// C is set iff the unsigned 9-bit `sum` exceeded one byte.
    pub fn update_carry(&mut self, sum: u16) {
        self.set_flag(Flag::Carry, sum > 0xFF);
    }

    /// V is set iff both operands share a sign and `result` does not.
    ///
    /// Signs are taken from the input operands, so a result that wrapped
    /// around the byte boundary is still caught.
    pub fn update_overflow(&mut self, lhs: u8, rhs: u8, result: u8) {
        let lhs_sign = lhs & SIGN_MASK;
        let rhs_sign = rhs & SIGN_MASK;
        let result_sign = result & SIGN_MASK;
        self.set_flag(
            Flag::Overflow,
            lhs_sign == rhs_sign && lhs_sign != result_sign,
        );
    }
}

impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PC={:04X} A={:02X} X={:02X} Y={:02X} S={:02X} P={:02X} [",
            self.pc,
            self.get(Register::A),
            self.get(Register::X),
            self.get(Register::Y),
            self.get(Register::S),
            self.status(),
        )?;
        let p = self.status();
        for (bit, name) in "NV-BDIZC".chars().enumerate() {
            let set = p & (0x80 >> bit) != 0;
            write!(f, "{}", if set { name } else { '.' })?;
        }
        write!(f, "]")
    }
}
