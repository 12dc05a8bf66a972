//! Ricoh 2A03 CPU core — the NES variant of the MOS 6502.
//!
//! Implements the 151 documented opcodes. The 2A03 has no BCD unit, so
//! the D flag is storable but never affects arithmetic. Undocumented
//! opcodes decode as [`CpuError::IllegalInstruction`].
//!
//! The CPU is instruction-stepped: [`Cpu::step`] executes one
//! instruction (plus any trailing interrupt service) and returns the
//! cycle count, which the machine uses to advance the PPU at the fixed
//! 3-dots-per-cycle ratio.

use ferricom_core::{page_crossed, Bus, BusFault};
use thiserror::Error;

mod addressing;
mod flags;
mod opcodes;

pub use flags::{FLAG_B, FLAG_C, FLAG_D, FLAG_I, FLAG_N, FLAG_U, FLAG_V, FLAG_Z};
pub use opcodes::{AddrMode, Instruction, Op, INSTRUCTION_SET};

/// Interrupt and reset vectors.
pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Cycles charged for servicing an NMI or IRQ.
const INTERRUPT_CYCLES: u64 = 7;

/// Decode or bus failure surfaced by [`Cpu::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuError {
    /// The opcode byte has no entry in the instruction table.
    #[error("illegal opcode ${opcode:02X} at ${pc:04X}")]
    IllegalInstruction { opcode: u8, pc: u16 },
    /// A memory access fell outside every mapped region.
    #[error(transparent)]
    Bus(#[from] BusFault),
}

/// The 2A03 register file and interrupt latches.
#[derive(Debug)]
pub struct Cpu {
    pc: u16,
    a: u8,
    x: u8,
    y: u8,
    s: u8,
    p: u8,
    cycles: u64,
    /// Level-sensitive IRQ line, sampled on instruction boundaries.
    irq_line: bool,
    /// Edge-latched NMI, cleared when serviced.
    nmi_pending: bool,
}

impl Cpu {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pc: 0,
            a: 0,
            x: 0,
            y: 0,
            s: 0xFD,
            p: FLAG_I | FLAG_U,
            cycles: 0,
            irq_line: false,
            nmi_pending: false,
        }
    }

    /// Load PC from the reset vector and restore the power-on register
    /// state (S = $FD, P = $24 with I set).
    pub fn reset<B: Bus>(&mut self, bus: &mut B) -> Result<(), BusFault> {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.s = 0xFD;
        self.p = FLAG_I | FLAG_U;
        self.irq_line = false;
        self.nmi_pending = false;
        self.pc = self.read_vector(bus, RESET_VECTOR)?;
        Ok(())
    }

    /// Execute one instruction, then service any pending interrupt.
    ///
    /// Returns the cycles consumed, including page-cross and branch
    /// penalties and the 7-cycle cost of a serviced interrupt.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<u64, CpuError> {
        let start = self.cycles;

        let pc = self.pc;
        let opcode = bus.read(pc)?;
        let instr = INSTRUCTION_SET[opcode as usize]
            .ok_or(CpuError::IllegalInstruction { opcode, pc })?;
        self.pc = self.pc.wrapping_add(1);

        let addr = self.resolve(bus, instr.mode, instr.page_penalty)?;
        self.cycles += u64::from(instr.cycles);
        self.execute(bus, instr, addr)?;

        // NMI wins over IRQ; IRQ is masked by the I flag, NMI never is.
        if self.nmi_pending {
            self.nmi_pending = false;
            self.service_interrupt(bus, NMI_VECTOR)?;
        } else if self.irq_line && !self.flag(FLAG_I) {
            self.service_interrupt(bus, IRQ_VECTOR)?;
        }

        Ok(self.cycles - start)
    }

    /// Set the level of the IRQ line. Sampled after each instruction.
    pub fn set_irq(&mut self, level: bool) {
        self.irq_line = level;
    }

    /// Latch an NMI edge. Cleared when the interrupt is serviced.
    pub fn trigger_nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Charge cycles that pass outside instruction execution (DMA stalls).
    pub fn add_cycles(&mut self, cycles: u64) {
        self.cycles += cycles;
    }

    fn service_interrupt<B: Bus>(&mut self, bus: &mut B, vector: u16) -> Result<(), BusFault> {
        self.cycles += INTERRUPT_CYCLES;
        self.push16(bus, self.pc)?;
        self.push(bus, self.status_for_push(false))?;
        self.set_flag(FLAG_I, true);
        self.pc = self.read_vector(bus, vector)?;
        Ok(())
    }

    fn execute<B: Bus>(
        &mut self,
        bus: &mut B,
        instr: Instruction,
        addr: u16,
    ) -> Result<(), CpuError> {
        match instr.op {
            // Arithmetic. SBC is ADC of the complemented operand; the
            // carry/overflow flags fall out of the same 9-bit sum.
            Op::Adc => {
                let value = bus.read(addr)?;
                self.add_with_carry(value);
            }
            Op::Sbc => {
                let value = bus.read(addr)?;
                self.add_with_carry(!value);
            }

            // Logic
            Op::And => {
                self.a &= bus.read(addr)?;
                self.set_zn(self.a);
            }
            Op::Ora => {
                self.a |= bus.read(addr)?;
                self.set_zn(self.a);
            }
            Op::Eor => {
                self.a ^= bus.read(addr)?;
                self.set_zn(self.a);
            }
            Op::Bit => {
                let value = bus.read(addr)?;
                self.set_flag(FLAG_Z, self.a & value == 0);
                self.set_flag(FLAG_N, value & 0x80 != 0);
                self.set_flag(FLAG_V, value & 0x40 != 0);
            }

            // Compares
            Op::Cmp => {
                let value = bus.read(addr)?;
                self.compare(self.a, value);
            }
            Op::Cpx => {
                let value = bus.read(addr)?;
                self.compare(self.x, value);
            }
            Op::Cpy => {
                let value = bus.read(addr)?;
                self.compare(self.y, value);
            }

            // Shifts and rotates
            Op::Asl => {
                if instr.mode == AddrMode::Accumulator {
                    self.a = self.asl(self.a);
                } else {
                    let result = self.asl(bus.read(addr)?);
                    bus.write(addr, result)?;
                }
            }
            Op::Lsr => {
                if instr.mode == AddrMode::Accumulator {
                    self.a = self.lsr(self.a);
                } else {
                    let result = self.lsr(bus.read(addr)?);
                    bus.write(addr, result)?;
                }
            }
            Op::Rol => {
                if instr.mode == AddrMode::Accumulator {
                    self.a = self.rol(self.a);
                } else {
                    let result = self.rol(bus.read(addr)?);
                    bus.write(addr, result)?;
                }
            }
            Op::Ror => {
                if instr.mode == AddrMode::Accumulator {
                    self.a = self.ror(self.a);
                } else {
                    let result = self.ror(bus.read(addr)?);
                    bus.write(addr, result)?;
                }
            }

            // Memory increments
            Op::Inc => {
                let result = bus.read(addr)?.wrapping_add(1);
                self.set_zn(result);
                bus.write(addr, result)?;
            }
            Op::Dec => {
                let result = bus.read(addr)?.wrapping_sub(1);
                self.set_zn(result);
                bus.write(addr, result)?;
            }

            // Register increments
            Op::Inx => {
                self.x = self.x.wrapping_add(1);
                self.set_zn(self.x);
            }
            Op::Iny => {
                self.y = self.y.wrapping_add(1);
                self.set_zn(self.y);
            }
            Op::Dex => {
                self.x = self.x.wrapping_sub(1);
                self.set_zn(self.x);
            }
            Op::Dey => {
                self.y = self.y.wrapping_sub(1);
                self.set_zn(self.y);
            }

            // Loads and stores
            Op::Lda => {
                self.a = bus.read(addr)?;
                self.set_zn(self.a);
            }
            Op::Ldx => {
                self.x = bus.read(addr)?;
                self.set_zn(self.x);
            }
            Op::Ldy => {
                self.y = bus.read(addr)?;
                self.set_zn(self.y);
            }
            Op::Sta => bus.write(addr, self.a)?,
            Op::Stx => bus.write(addr, self.x)?,
            Op::Sty => bus.write(addr, self.y)?,

            // Branches
            Op::Bcc => {
                if !self.flag(FLAG_C) {
                    self.branch(addr);
                }
            }
            Op::Bcs => {
                if self.flag(FLAG_C) {
                    self.branch(addr);
                }
            }
            Op::Beq => {
                if self.flag(FLAG_Z) {
                    self.branch(addr);
                }
            }
            Op::Bne => {
                if !self.flag(FLAG_Z) {
                    self.branch(addr);
                }
            }
            Op::Bmi => {
                if self.flag(FLAG_N) {
                    self.branch(addr);
                }
            }
            Op::Bpl => {
                if !self.flag(FLAG_N) {
                    self.branch(addr);
                }
            }
            Op::Bvs => {
                if self.flag(FLAG_V) {
                    self.branch(addr);
                }
            }
            Op::Bvc => {
                if !self.flag(FLAG_V) {
                    self.branch(addr);
                }
            }

            // Jumps and subroutines
            Op::Jmp => self.pc = addr,
            Op::Jsr => {
                self.push16(bus, self.pc.wrapping_sub(1))?;
                self.pc = addr;
            }
            Op::Rts => {
                self.pc = self.pull16(bus)?.wrapping_add(1);
            }
            Op::Rti => {
                let status = self.pull(bus)?;
                self.set_status_from_pull(status);
                self.pc = self.pull16(bus)?;
            }
            Op::Brk => {
                // The byte after the opcode is a padding/signature byte;
                // the pushed return address points past it.
                self.pc = self.pc.wrapping_add(1);
                self.push16(bus, self.pc)?;
                self.push(bus, self.status_for_push(true))?;
                self.set_flag(FLAG_I, true);
                self.pc = self.read_vector(bus, IRQ_VECTOR)?;
            }

            // Stack
            Op::Pha => self.push(bus, self.a)?,
            Op::Php => self.push(bus, self.status_for_push(true))?,
            Op::Pla => {
                self.a = self.pull(bus)?;
                self.set_zn(self.a);
            }
            Op::Plp => {
                let status = self.pull(bus)?;
                self.set_status_from_pull(status);
            }

            // Flag operations
            Op::Clc => self.set_flag(FLAG_C, false),
            Op::Cld => self.set_flag(FLAG_D, false),
            Op::Cli => self.set_flag(FLAG_I, false),
            Op::Clv => self.set_flag(FLAG_V, false),
            Op::Sec => self.set_flag(FLAG_C, true),
            Op::Sed => self.set_flag(FLAG_D, true),
            Op::Sei => self.set_flag(FLAG_I, true),

            // Transfers
            Op::Tax => {
                self.x = self.a;
                self.set_zn(self.x);
            }
            Op::Tay => {
                self.y = self.a;
                self.set_zn(self.y);
            }
            Op::Tsx => {
                self.x = self.s;
                self.set_zn(self.x);
            }
            Op::Txa => {
                self.a = self.x;
                self.set_zn(self.a);
            }
            Op::Tya => {
                self.a = self.y;
                self.set_zn(self.a);
            }
            Op::Txs => self.s = self.x,

            Op::Nop => {}
        }
        Ok(())
    }

    // === ALU helpers ===

    fn add_with_carry(&mut self, value: u8) {
        let sum = u16::from(self.a) + u16::from(value) + u16::from(self.flag(FLAG_C));
        let result = sum as u8;
        self.set_flag(FLAG_C, sum > 0xFF);
        self.set_flag(FLAG_V, (self.a ^ result) & (value ^ result) & 0x80 != 0);
        self.set_zn(result);
        self.a = result;
    }

    /// Compare: C is set when `value <= reg` (unsigned).
    fn compare(&mut self, reg: u8, value: u8) {
        self.set_flag(FLAG_C, reg >= value);
        self.set_zn(reg.wrapping_sub(value));
    }

    fn asl(&mut self, value: u8) -> u8 {
        self.set_flag(FLAG_C, value & 0x80 != 0);
        let result = value << 1;
        self.set_zn(result);
        result
    }

    fn lsr(&mut self, value: u8) -> u8 {
        self.set_flag(FLAG_C, value & 0x01 != 0);
        let result = value >> 1;
        self.set_zn(result);
        result
    }

    fn rol(&mut self, value: u8) -> u8 {
        let carry_in = u8::from(self.flag(FLAG_C));
        self.set_flag(FLAG_C, value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.set_zn(result);
        result
    }

    fn ror(&mut self, value: u8) -> u8 {
        let carry_in = if self.flag(FLAG_C) { 0x80 } else { 0 };
        self.set_flag(FLAG_C, value & 0x01 != 0);
        let result = (value >> 1) | carry_in;
        self.set_zn(result);
        result
    }

    /// Taken branch: one extra cycle, one more when the target leaves the
    /// page of the branch's operand byte.
    fn branch(&mut self, target: u16) {
        self.cycles += 1;
        if page_crossed(self.pc.wrapping_sub(1), target) {
            self.cycles += 1;
        }
        self.pc = target;
    }

    // === Register accessors ===

    #[must_use]
    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    #[must_use]
    pub fn a(&self) -> u8 {
        self.a
    }

    #[must_use]
    pub fn x(&self) -> u8 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> u8 {
        self.y
    }

    #[must_use]
    pub fn s(&self) -> u8 {
        self.s
    }

    /// The status register; bit 5 always reads as 1.
    #[must_use]
    pub fn status(&self) -> u8 {
        self.p | FLAG_U
    }

    /// Total cycles executed since power-on. Strictly non-decreasing.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
