//! Addressing-mode resolution and stack access.

use ferricom_core::{page_crossed, read16, read16_page_wrap, read16_zero_page, Bus, BusFault};

use crate::opcodes::AddrMode;
use crate::{Cpu, CpuError};

const STACK_BASE: u16 = 0x0100;

impl Cpu {
    /// Fetch the byte at PC and advance PC.
    pub(crate) fn fetch<B: Bus>(&mut self, bus: &mut B) -> Result<u8, BusFault> {
        let value = bus.read(self.pc)?;
        self.pc = self.pc.wrapping_add(1);
        Ok(value)
    }

    /// Fetch a little-endian word at PC.
    pub(crate) fn fetch16<B: Bus>(&mut self, bus: &mut B) -> Result<u16, BusFault> {
        let low = self.fetch(bus)?;
        let high = self.fetch(bus)?;
        Ok(u16::from_le_bytes([low, high]))
    }

    /// Resolve the operand address for an addressing mode.
    ///
    /// Advances PC past the operand bytes. When `page_penalty` is set
    /// (read-class indexed opcodes), crossing a page during indexing
    /// charges one extra cycle.
    pub(crate) fn resolve<B: Bus>(
        &mut self,
        bus: &mut B,
        mode: AddrMode,
        page_penalty: bool,
    ) -> Result<u16, CpuError> {
        let addr = match mode {
            AddrMode::Accumulator | AddrMode::Implied => 0,
            AddrMode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                addr
            }
            AddrMode::ZeroPage => u16::from(self.fetch(bus)?),
            AddrMode::ZeroPageX => u16::from(self.fetch(bus)?.wrapping_add(self.x)),
            AddrMode::ZeroPageY => u16::from(self.fetch(bus)?.wrapping_add(self.y)),
            AddrMode::Absolute => self.fetch16(bus)?,
            AddrMode::AbsoluteX => {
                let base = self.fetch16(bus)?;
                let addr = base.wrapping_add(u16::from(self.x));
                if page_penalty && page_crossed(base, addr) {
                    self.cycles += 1;
                }
                addr
            }
            AddrMode::AbsoluteY => {
                let base = self.fetch16(bus)?;
                let addr = base.wrapping_add(u16::from(self.y));
                if page_penalty && page_crossed(base, addr) {
                    self.cycles += 1;
                }
                addr
            }
            AddrMode::Indirect => {
                let ptr = self.fetch16(bus)?;
                read16_page_wrap(bus, ptr)?
            }
            AddrMode::IndirectX => {
                let ptr = self.fetch(bus)?.wrapping_add(self.x);
                read16_zero_page(bus, ptr)?
            }
            AddrMode::IndirectY => {
                let ptr = self.fetch(bus)?;
                let base = read16_zero_page(bus, ptr)?;
                let addr = base.wrapping_add(u16::from(self.y));
                if page_penalty && page_crossed(base, addr) {
                    self.cycles += 1;
                }
                addr
            }
            AddrMode::Relative => {
                let offset = self.fetch(bus)? as i8;
                self.pc.wrapping_add(offset as u16)
            }
        };
        Ok(addr)
    }

    pub(crate) fn push<B: Bus>(&mut self, bus: &mut B, value: u8) -> Result<(), BusFault> {
        bus.write(STACK_BASE + u16::from(self.s), value)?;
        self.s = self.s.wrapping_sub(1);
        Ok(())
    }

    pub(crate) fn pull<B: Bus>(&mut self, bus: &mut B) -> Result<u8, BusFault> {
        self.s = self.s.wrapping_add(1);
        bus.read(STACK_BASE + u16::from(self.s))
    }

    /// Push a word, high byte first.
    pub(crate) fn push16<B: Bus>(&mut self, bus: &mut B, value: u16) -> Result<(), BusFault> {
        self.push(bus, (value >> 8) as u8)?;
        self.push(bus, value as u8)
    }

    /// Pull a word, low byte first.
    pub(crate) fn pull16<B: Bus>(&mut self, bus: &mut B) -> Result<u16, BusFault> {
        let low = self.pull(bus)?;
        let high = self.pull(bus)?;
        Ok(u16::from_le_bytes([low, high]))
    }

    pub(crate) fn read_vector<B: Bus>(&mut self, bus: &mut B, vector: u16) -> Result<u16, BusFault> {
        read16(bus, vector)
    }
}
