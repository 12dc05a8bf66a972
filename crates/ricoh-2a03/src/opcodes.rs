//! The 2A03 instruction table.
//!
//! 151 documented opcodes in a sparse 256-entry array keyed by opcode
//! byte. Each row carries the operation, the addressing mode, the base
//! cycle cost, and whether indexed addressing pays one extra cycle on a
//! page crossing. Store and read-modify-write rows never pay the
//! penalty — their base cost already includes the fix-up cycle.

/// Addressing modes of the 2A03.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    Accumulator,
    Implied,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// JMP only; the vector read wraps within its page.
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
}

/// Operations, one per documented mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
}

/// One row of the instruction table.
#[derive(Debug, Clone, Copy)]
pub struct Instruction {
    pub op: Op,
    pub mode: AddrMode,
    pub cycles: u8,
    /// Pay one extra cycle when indexed addressing crosses a page.
    pub page_penalty: bool,
}

const fn row(op: Op, mode: AddrMode, cycles: u8, page_penalty: bool) -> Option<Instruction> {
    Some(Instruction {
        op,
        mode,
        cycles,
        page_penalty,
    })
}

/// The documented instruction set. Unassigned entries are illegal.
pub static INSTRUCTION_SET: [Option<Instruction>; 256] = build_table();

#[rustfmt::skip]
const fn build_table() -> [Option<Instruction>; 256] {
    use AddrMode::*;
    use Op::*;

    let mut t: [Option<Instruction>; 256] = [None; 256];

    // ADC
    t[0x69] = row(Adc, Immediate, 2, false);
    t[0x65] = row(Adc, ZeroPage,  3, false);
    t[0x75] = row(Adc, ZeroPageX, 4, false);
    t[0x6D] = row(Adc, Absolute,  4, false);
    t[0x7D] = row(Adc, AbsoluteX, 4, true);
    t[0x79] = row(Adc, AbsoluteY, 4, true);
    t[0x61] = row(Adc, IndirectX, 6, false);
    t[0x71] = row(Adc, IndirectY, 5, true);

    // AND
    t[0x29] = row(And, Immediate, 2, false);
    t[0x25] = row(And, ZeroPage,  3, false);
    t[0x35] = row(And, ZeroPageX, 4, false);
    t[0x2D] = row(And, Absolute,  4, false);
    t[0x3D] = row(And, AbsoluteX, 4, true);
    t[0x39] = row(And, AbsoluteY, 4, true);
    t[0x21] = row(And, IndirectX, 6, false);
    t[0x31] = row(And, IndirectY, 5, true);

    // ASL
    t[0x0A] = row(Asl, Accumulator, 2, false);
    t[0x06] = row(Asl, ZeroPage,    5, false);
    t[0x16] = row(Asl, ZeroPageX,   6, false);
    t[0x0E] = row(Asl, Absolute,    6, false);
    t[0x1E] = row(Asl, AbsoluteX,   7, false);

    // Branches
    t[0x90] = row(Bcc, Relative, 2, false);
    t[0xB0] = row(Bcs, Relative, 2, false);
    t[0xF0] = row(Beq, Relative, 2, false);
    t[0x30] = row(Bmi, Relative, 2, false);
    t[0xD0] = row(Bne, Relative, 2, false);
    t[0x10] = row(Bpl, Relative, 2, false);
    t[0x50] = row(Bvc, Relative, 2, false);
    t[0x70] = row(Bvs, Relative, 2, false);

    // BIT
    t[0x24] = row(Bit, ZeroPage, 3, false);
    t[0x2C] = row(Bit, Absolute, 4, false);

    // BRK
    t[0x00] = row(Brk, Implied, 7, false);

    // Flag clears
    t[0x18] = row(Clc, Implied, 2, false);
    t[0xD8] = row(Cld, Implied, 2, false);
    t[0x58] = row(Cli, Implied, 2, false);
    t[0xB8] = row(Clv, Implied, 2, false);

    // CMP
    t[0xC9] = row(Cmp, Immediate, 2, false);
    t[0xC5] = row(Cmp, ZeroPage,  3, false);
    t[0xD5] = row(Cmp, ZeroPageX, 4, false);
    t[0xCD] = row(Cmp, Absolute,  4, false);
    t[0xDD] = row(Cmp, AbsoluteX, 4, true);
    t[0xD9] = row(Cmp, AbsoluteY, 4, true);
    t[0xC1] = row(Cmp, IndirectX, 6, false);
    t[0xD1] = row(Cmp, IndirectY, 5, true);

    // CPX
    t[0xE0] = row(Cpx, Immediate, 2, false);
    t[0xE4] = row(Cpx, ZeroPage,  3, false);
    t[0xEC] = row(Cpx, Absolute,  4, false);

    // CPY
    t[0xC0] = row(Cpy, Immediate, 2, false);
    t[0xC4] = row(Cpy, ZeroPage,  3, false);
    t[0xCC] = row(Cpy, Absolute,  4, false);

    // DEC
    t[0xC6] = row(Dec, ZeroPage,  5, false);
    t[0xD6] = row(Dec, ZeroPageX, 6, false);
    t[0xCE] = row(Dec, Absolute,  6, false);
    t[0xDE] = row(Dec, AbsoluteX, 7, false);

    // DEX / DEY
    t[0xCA] = row(Dex, Implied, 2, false);
    t[0x88] = row(Dey, Implied, 2, false);

    // EOR
    t[0x49] = row(Eor, Immediate, 2, false);
    t[0x45] = row(Eor, ZeroPage,  3, false);
    t[0x55] = row(Eor, ZeroPageX, 4, false);
    t[0x4D] = row(Eor, Absolute,  4, false);
    t[0x5D] = row(Eor, AbsoluteX, 4, true);
    t[0x59] = row(Eor, AbsoluteY, 4, true);
    t[0x41] = row(Eor, IndirectX, 6, false);
    t[0x51] = row(Eor, IndirectY, 5, true);

    // INC
    t[0xE6] = row(Inc, ZeroPage,  5, false);
    t[0xF6] = row(Inc, ZeroPageX, 6, false);
    t[0xEE] = row(Inc, Absolute,  6, false);
    t[0xFE] = row(Inc, AbsoluteX, 7, false);

    // INX / INY
    t[0xE8] = row(Inx, Implied, 2, false);
    t[0xC8] = row(Iny, Implied, 2, false);

    // JMP
    t[0x4C] = row(Jmp, Absolute, 3, false);
    t[0x6C] = row(Jmp, Indirect, 5, false);

    // JSR
    t[0x20] = row(Jsr, Absolute, 6, false);

    // LDA
    t[0xA9] = row(Lda, Immediate, 2, false);
    t[0xA5] = row(Lda, ZeroPage,  3, false);
    t[0xB5] = row(Lda, ZeroPageX, 4, false);
    t[0xAD] = row(Lda, Absolute,  4, false);
    t[0xBD] = row(Lda, AbsoluteX, 4, true);
    t[0xB9] = row(Lda, AbsoluteY, 4, true);
    t[0xA1] = row(Lda, IndirectX, 6, false);
    t[0xB1] = row(Lda, IndirectY, 5, true);

    // LDX
    t[0xA2] = row(Ldx, Immediate, 2, false);
    t[0xA6] = row(Ldx, ZeroPage,  3, false);
    t[0xB6] = row(Ldx, ZeroPageY, 4, false);
    t[0xAE] = row(Ldx, Absolute,  4, false);
    t[0xBE] = row(Ldx, AbsoluteY, 4, true);

    // LDY
    t[0xA0] = row(Ldy, Immediate, 2, false);
    t[0xA4] = row(Ldy, ZeroPage,  3, false);
    t[0xB4] = row(Ldy, ZeroPageX, 4, false);
    t[0xAC] = row(Ldy, Absolute,  4, false);
    t[0xBC] = row(Ldy, AbsoluteX, 4, true);

    // LSR
    t[0x4A] = row(Lsr, Accumulator, 2, false);
    t[0x46] = row(Lsr, ZeroPage,    5, false);
    t[0x56] = row(Lsr, ZeroPageX,   6, false);
    t[0x4E] = row(Lsr, Absolute,    6, false);
    t[0x5E] = row(Lsr, AbsoluteX,   7, false);

    // NOP
    t[0xEA] = row(Nop, Implied, 2, false);

    // ORA
    t[0x09] = row(Ora, Immediate, 2, false);
    t[0x05] = row(Ora, ZeroPage,  3, false);
    t[0x15] = row(Ora, ZeroPageX, 4, false);
    t[0x0D] = row(Ora, Absolute,  4, false);
    t[0x1D] = row(Ora, AbsoluteX, 4, true);
    t[0x19] = row(Ora, AbsoluteY, 4, true);
    t[0x01] = row(Ora, IndirectX, 6, false);
    t[0x11] = row(Ora, IndirectY, 5, true);

    // Stack pushes / pulls
    t[0x48] = row(Pha, Implied, 3, false);
    t[0x08] = row(Php, Implied, 3, false);
    t[0x68] = row(Pla, Implied, 4, false);
    t[0x28] = row(Plp, Implied, 4, false);

    // ROL
    t[0x2A] = row(Rol, Accumulator, 2, false);
    t[0x26] = row(Rol, ZeroPage,    5, false);
    t[0x36] = row(Rol, ZeroPageX,   6, false);
    t[0x2E] = row(Rol, Absolute,    6, false);
    t[0x3E] = row(Rol, AbsoluteX,   7, false);

    // ROR
    t[0x6A] = row(Ror, Accumulator, 2, false);
    t[0x66] = row(Ror, ZeroPage,    5, false);
    t[0x76] = row(Ror, ZeroPageX,   6, false);
    t[0x6E] = row(Ror, Absolute,    6, false);
    t[0x7E] = row(Ror, AbsoluteX,   7, false);

    // RTI / RTS
    t[0x40] = row(Rti, Implied, 6, false);
    t[0x60] = row(Rts, Implied, 6, false);

    // SBC
    t[0xE9] = row(Sbc, Immediate, 2, false);
    t[0xE5] = row(Sbc, ZeroPage,  3, false);
    t[0xF5] = row(Sbc, ZeroPageX, 4, false);
    t[0xED] = row(Sbc, Absolute,  4, false);
    t[0xFD] = row(Sbc, AbsoluteX, 4, true);
    t[0xF9] = row(Sbc, AbsoluteY, 4, true);
    t[0xE1] = row(Sbc, IndirectX, 6, false);
    t[0xF1] = row(Sbc, IndirectY, 5, true);

    // Flag sets
    t[0x38] = row(Sec, Implied, 2, false);
    t[0xF8] = row(Sed, Implied, 2, false);
    t[0x78] = row(Sei, Implied, 2, false);

    // STA — indexed stores always pay the fix-up cycle, baked into the base cost
    t[0x85] = row(Sta, ZeroPage,  3, false);
    t[0x95] = row(Sta, ZeroPageX, 4, false);
    t[0x8D] = row(Sta, Absolute,  4, false);
    t[0x9D] = row(Sta, AbsoluteX, 5, false);
    t[0x99] = row(Sta, AbsoluteY, 5, false);
    t[0x81] = row(Sta, IndirectX, 6, false);
    t[0x91] = row(Sta, IndirectY, 6, false);

    // STX
    t[0x86] = row(Stx, ZeroPage,  3, false);
    t[0x96] = row(Stx, ZeroPageY, 4, false);
    t[0x8E] = row(Stx, Absolute,  4, false);

    // STY
    t[0x84] = row(Sty, ZeroPage,  3, false);
    t[0x94] = row(Sty, ZeroPageX, 4, false);
    t[0x8C] = row(Sty, Absolute,  4, false);

    // Transfers
    t[0xAA] = row(Tax, Implied, 2, false);
    t[0xA8] = row(Tay, Implied, 2, false);
    t[0xBA] = row(Tsx, Implied, 2, false);
    t[0x8A] = row(Txa, Implied, 2, false);
    t[0x9A] = row(Txs, Implied, 2, false);
    t[0x98] = row(Tya, Implied, 2, false);

    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_all_documented_opcodes() {
        let count = INSTRUCTION_SET.iter().filter(|e| e.is_some()).count();
        assert_eq!(count, 151);
    }

    #[test]
    fn page_penalty_only_on_read_class_indexed_rows() {
        for (opcode, entry) in INSTRUCTION_SET.iter().enumerate() {
            let Some(instr) = entry else { continue };
            if instr.page_penalty {
                assert!(
                    matches!(
                        instr.mode,
                        AddrMode::AbsoluteX | AddrMode::AbsoluteY | AddrMode::IndirectY
                    ),
                    "opcode {opcode:02X} pays a penalty in a non-indexed mode"
                );
                assert!(
                    !matches!(instr.op, Op::Sta | Op::Stx | Op::Sty),
                    "store opcode {opcode:02X} must bake the penalty into its base cost"
                );
            }
        }
    }

    #[test]
    fn store_indexed_rows_cost_the_fixup() {
        // STA abs,X / abs,Y cost 5; STA (zp),Y costs 6 — unconditionally.
        assert_eq!(INSTRUCTION_SET[0x9D].unwrap().cycles, 5);
        assert_eq!(INSTRUCTION_SET[0x99].unwrap().cycles, 5);
        assert_eq!(INSTRUCTION_SET[0x91].unwrap().cycles, 6);
    }
}
