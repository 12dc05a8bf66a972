//! Memory and I/O bus interface.

use std::fmt;

use thiserror::Error;

/// Direction of a faulting bus access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Write => f.write_str("write"),
        }
    }
}

/// A bus access that fell outside every mapped region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bus {kind} fault at ${addr:04X}")]
pub struct BusFault {
    pub kind: AccessKind,
    pub addr: u16,
}

impl BusFault {
    #[must_use]
    pub fn read(addr: u16) -> Self {
        Self {
            kind: AccessKind::Read,
            addr,
        }
    }

    #[must_use]
    pub fn write(addr: u16) -> Self {
        Self {
            kind: AccessKind::Write,
            addr,
        }
    }
}

/// Byte-addressed memory and I/O bus.
///
/// Components access memory and peripherals through this trait. The bus
/// handles address decoding and routing to the appropriate device. Reads
/// take `&mut self` because several NES registers have read side effects
/// (the PPU status latch, the joypad shift register).
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, addr: u16) -> Result<u8, BusFault>;

    /// Write a byte to the given address.
    fn write(&mut self, addr: u16, value: u8) -> Result<(), BusFault>;
}

/// Flat 64 KiB of RAM with no decoding. Test scaffolding for CPU-level
/// tests that do not need a real machine behind the bus.
pub struct SimpleBus {
    mem: Vec<u8>,
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            mem: vec![0; 0x10000],
        }
    }

    /// Copy `bytes` into memory starting at `addr`.
    pub fn load(&mut self, addr: u16, bytes: &[u8]) {
        let start = addr as usize;
        self.mem[start..start + bytes.len()].copy_from_slice(bytes);
    }

    /// Read without side effects.
    #[must_use]
    pub fn peek(&self, addr: u16) -> u8 {
        self.mem[addr as usize]
    }
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, addr: u16) -> Result<u8, BusFault> {
        Ok(self.mem[addr as usize])
    }

    fn write(&mut self, addr: u16, value: u8) -> Result<(), BusFault> {
        self.mem[addr as usize] = value;
        Ok(())
    }
}
