//! # Memory Bus Abstraction
//!
//! This module provides the `MemoryBus` trait that decouples the CPU from its
//! backing store, and `Memory`, a fixed-capacity byte buffer implementation.
//!
//! ## Addressing Rules
//!
//! The emulated hardware has no bus errors, so neither does this module:
//! - Full addresses are reduced modulo the memory capacity
//! - Zero-page addresses are masked to a single byte
//! - Reads and writes never fail and never panic

use crate::ConfigError;

/// Default memory capacity: the full 16-bit address space.
pub const DEFAULT_MEMORY_SIZE: usize = 1 << 16;

/// Memory bus trait for CPU to read/write bytes.
///
/// Implementations receive raw, unreduced addresses and are responsible for
/// wrapping them into their address space. The CPU relies on this: effective
/// address calculations may overflow the capacity and must wrap, not fail.
///
/// # Examples
///
/// ```
/// use paced6502::{Memory, MemoryBus};
///
/// let mut mem = Memory::with_size(16).unwrap();
///
/// // Address 0x12 wraps to 0x02 in a 16-byte memory
/// mem.write(0x12, 0x42);
/// assert_eq!(mem.read(0x02), 0x42);
/// ```
pub trait MemoryBus {
    /// Number of addressable bytes.
    fn size(&self) -> usize;

    /// Reads a byte, wrapping `addr` modulo [`size`](MemoryBus::size).
    fn read(&self, addr: usize) -> u8;

    /// Writes a byte, wrapping `addr` modulo [`size`](MemoryBus::size).
    fn write(&mut self, addr: usize, value: u8);

    /// Reads a byte from the zero page. The address is already one byte wide,
    /// so it can never leave the first 256 bytes.
    fn read_zero_page(&self, addr: u8) -> u8 {
        self.read(addr as usize)
    }

    /// Writes a byte to the zero page.
    fn write_zero_page(&mut self, addr: u8, value: u8) {
        self.write(addr as usize, value);
    }

    /// Reduces an arbitrary address into this memory's address space.
    fn wrap(&self, addr: usize) -> usize {
        addr % self.size()
    }
}

/// Fixed-capacity flat memory.
///
/// All addresses map to a single contiguous buffer initialized to zero. The
/// capacity is chosen once and never changes.
///
/// # Examples
///
/// ```
/// use paced6502::{Memory, MemoryBus};
///
/// let mut memory = Memory::new();
/// assert_eq!(memory.size(), 65536);
///
/// // Load a program image at 0x0200
/// memory.load(0x0200, &[0x69, 0x01, 0x4C, 0x00, 0x02]);
/// assert_eq!(memory.read(0x0202), 0x4C);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    data: Vec<u8>,
}

impl Memory {
    /// Creates a 64KB memory with every byte set to zero.
    pub fn new() -> Self {
        Self {
            data: vec![0; DEFAULT_MEMORY_SIZE],
        }
    }

    /// Creates a memory of `size` bytes.
    ///
    /// The program counter is 16 bits wide, so capacities above 65536 bytes
    /// would leave memory the CPU can never fetch from.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidMemorySize` if `size` is zero or larger
    /// than [`DEFAULT_MEMORY_SIZE`].
    pub fn with_size(size: usize) -> Result<Self, ConfigError> {
        if size == 0 || size > DEFAULT_MEMORY_SIZE {
            return Err(ConfigError::InvalidMemorySize(size));
        }

        Ok(Self {
            data: vec![0; size],
        })
    }

    /// Copies `bytes` into memory starting at `start`.
    ///
    /// Each byte's address wraps independently, so an image that runs past
    /// the end of memory continues at address 0.
    pub fn load(&mut self, start: usize, bytes: &[u8]) {
        for (offset, &byte) in bytes.iter().enumerate() {
            self.write(start.wrapping_add(offset), byte);
        }
    }

    /// Raw view of the whole buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for Memory {
    fn size(&self) -> usize {
        self.data.len()
    }

    fn read(&self, addr: usize) -> u8 {
        self.data[addr % self.data.len()]
    }

    fn write(&mut self, addr: usize, value: u8) {
        let len = self.data.len();
        self.data[addr % len] = value;
    }
}
