//! Per-opcode timing and disassembly metadata.
//!
//! Cycle costs live here rather than in the dispatch arms so that an
//! instruction's debit is a single table lookup keyed by the opcode byte plus
//! the three penalty conditions the fetchers and branch helper record
//! (page crossed, branch taken, taken branch crossed a page). Counts follow
//! the [6502.org opcode reference](http://www.6502.org/tutorials/6502opcodes.html).

/// Base machine-cycle cost for every documented opcode, indexed by the opcode
/// byte. Undocumented slots hold 0; the dispatcher halts before charging them.
pub(crate) const BASE_CYCLES: [u8; 256] = [
    //  x0 x1 x2 x3 x4 x5 x6 x7 x8 x9 xA xB xC xD xE xF
    7, 6, 0, 0, 0, 3, 5, 0, 3, 2, 2, 0, 0, 4, 6, 0, // 0x
    2, 5, 0, 0, 0, 4, 6, 0, 2, 4, 0, 0, 0, 4, 7, 0, // 1x
    6, 6, 0, 0, 3, 3, 5, 0, 4, 2, 2, 0, 4, 4, 6, 0, // 2x
    2, 5, 0, 0, 0, 4, 6, 0, 2, 4, 0, 0, 0, 4, 7, 0, // 3x
    0, 6, 0, 0, 0, 3, 5, 0, 3, 2, 2, 0, 3, 4, 6, 0, // 4x
    2, 5, 0, 0, 0, 4, 6, 0, 2, 4, 0, 0, 0, 4, 7, 0, // 5x
    6, 6, 0, 0, 0, 3, 5, 0, 4, 2, 2, 0, 5, 4, 6, 0, // 6x
    2, 5, 0, 0, 0, 4, 6, 0, 2, 4, 0, 0, 0, 4, 7, 0, // 7x
    0, 6, 0, 0, 3, 3, 3, 0, 2, 0, 2, 0, 4, 4, 4, 0, // 8x
    2, 6, 0, 0, 4, 4, 4, 0, 2, 5, 2, 0, 0, 5, 0, 0, // 9x
    2, 6, 2, 0, 3, 3, 3, 0, 2, 2, 2, 0, 4, 4, 4, 0, // Ax
    2, 5, 0, 0, 4, 4, 4, 0, 2, 4, 2, 0, 4, 4, 4, 0, // Bx
    2, 6, 0, 0, 3, 3, 5, 0, 2, 2, 2, 0, 4, 4, 6, 0, // Cx
    2, 5, 0, 0, 0, 4, 6, 0, 2, 4, 0, 0, 0, 4, 7, 0, // Dx
    2, 6, 0, 0, 3, 3, 5, 0, 2, 2, 2, 0, 4, 4, 6, 0, // Ex
    2, 5, 0, 0, 0, 4, 6, 0, 2, 4, 0, 0, 0, 4, 7, 0, // Fx
];

/// Mnemonic and addressing mode for every opcode byte, for execution traces
/// and the unknown-opcode diagnostic. `---` marks bytes the dispatcher halts on.
pub(crate) const INSTRUCTION_NAMES: [&str; 256] = [
    "BRK impl", "ORA X,ind", "---", "---", "---", "ORA zpg", "ASL zpg", "---", "PHP impl", "ORA #", "ASL A", "---", "---", "ORA abs", "ASL abs", "---",
    "BPL rel", "ORA ind,Y", "---", "---", "---", "ORA zpg,X", "ASL zpg,X", "---", "CLC impl", "ORA abs,Y", "---", "---", "---", "ORA abs,X", "ASL abs,X", "---",
    "JSR abs", "AND X,ind", "---", "---", "BIT zpg", "AND zpg", "ROL zpg", "---", "PLP impl", "AND #", "ROL A", "---", "BIT abs", "AND abs", "ROL abs", "---",
    "BMI rel", "AND ind,Y", "---", "---", "---", "AND zpg,X", "ROL zpg,X", "---", "SEC impl", "AND abs,Y", "---", "---", "---", "AND abs,X", "ROL abs,X", "---",
    "---", "EOR X,ind", "---", "---", "---", "EOR zpg", "LSR zpg", "---", "PHA impl", "EOR #", "LSR A", "---", "JMP abs", "EOR abs", "LSR abs", "---",
    "BVC rel", "EOR ind,Y", "---", "---", "---", "EOR zpg,X", "LSR zpg,X", "---", "CLI impl", "EOR abs,Y", "---", "---", "---", "EOR abs,X", "LSR abs,X", "---",
    "RTS impl", "ADC X,ind", "---", "---", "---", "ADC zpg", "ROR zpg", "---", "PLA impl", "ADC #", "ROR A", "---", "JMP ind", "ADC abs", "ROR abs", "---",
    "BVS rel", "ADC ind,Y", "---", "---", "---", "ADC zpg,X", "ROR zpg,X", "---", "SEI impl", "ADC abs,Y", "---", "---", "---", "ADC abs,X", "ROR abs,X", "---",
    "---", "STA X,ind", "---", "---", "STY zpg", "STA zpg", "STX zpg", "---", "DEY impl", "---", "TXA impl", "---", "STY abs", "STA abs", "STX abs", "---",
    "BCC rel", "STA ind,Y", "---", "---", "STY zpg,X", "STA zpg,X", "STX zpg,Y", "---", "TYA impl", "STA abs,Y", "TXS impl", "---", "---", "STA abs,X", "---", "---",
    "LDY #", "LDA X,ind", "LDX #", "---", "LDY zpg", "LDA zpg", "LDX zpg", "---", "TAY impl", "LDA #", "TAX impl", "---", "LDY abs", "LDA abs", "LDX abs", "---",
    "BCS rel", "LDA ind,Y", "---", "---", "LDY zpg,X", "LDA zpg,X", "LDX zpg,Y", "---", "CLV impl", "LDA abs,Y", "TSX impl", "---", "LDY abs,X", "LDA abs,X", "LDX abs,Y", "---",
    "CPY #", "CMP X,ind", "---", "---", "CPY zpg", "CMP zpg", "DEC zpg", "---", "INY impl", "CMP #", "DEX impl", "---", "CPY abs", "CMP abs", "DEC abs", "---",
    "BNE rel", "CMP ind,Y", "---", "---", "---", "CMP zpg,X", "DEC zpg,X", "---", "CLD impl", "CMP abs,Y", "---", "---", "---", "CMP abs,X", "DEC abs,X", "---",
    "CPX #", "SBC X,ind", "---", "---", "CPX zpg", "SBC zpg", "INC zpg", "---", "INX impl", "SBC #", "NOP impl", "---", "CPX abs", "SBC abs", "INC abs", "---",
    "BEQ rel", "SBC ind,Y", "---", "---", "---", "SBC zpg,X", "INC zpg,X", "---", "SED impl", "SBC abs,Y", "---", "---", "---", "SBC abs,X", "INC abs,X", "---",
];

/// Indexed-read variants that pay one extra cycle when the effective address
/// lands in a different page than its base. Store and read-modify-write
/// variants absorb the crossing in their fixed cost.
pub(crate) fn has_page_penalty(opcode: u8) -> bool {
    matches!(
        opcode,
        0x11 | 0x19 | 0x1D // ORA
            | 0x31 | 0x39 | 0x3D // AND
            | 0x51 | 0x59 | 0x5D // EOR
            | 0x71 | 0x79 | 0x7D // ADC
            | 0xB1 | 0xB9 | 0xBD // LDA
            | 0xBC // LDY abs,X
            | 0xBE // LDX abs,Y
            | 0xD1 | 0xD9 | 0xDD // CMP
            | 0xF1 | 0xF9 | 0xFD // SBC
    )
}

/// Full debit for one executed instruction.
///
/// Taken branches cost one extra cycle, and one more on top of that when the
/// target page differs from the page of the instruction after the branch.
pub(crate) fn cost(
    opcode: u8,
    page_crossed: bool,
    branch_taken: bool,
    branch_page_crossed: bool,
) -> i32 {
    let mut cycles = BASE_CYCLES[opcode as usize] as i32;

    if page_crossed && has_page_penalty(opcode) {
        cycles += 1;
    }

    if branch_taken {
        cycles += 1;
        if branch_page_crossed {
            cycles += 1;
        }
    }

    cycles
}

#[cfg(test)]
mod tests {
    use super::{cost, has_page_penalty, BASE_CYCLES, INSTRUCTION_NAMES};

    #[test]
    fn documented_opcodes_have_nonzero_cost() {
        for (opcode, name) in INSTRUCTION_NAMES.iter().enumerate() {
            if *name == "---" {
                assert_eq!(BASE_CYCLES[opcode], 0, "{:02X} is undocumented", opcode);
            } else {
                assert!(BASE_CYCLES[opcode] > 0, "{:02X} {} has no cost", opcode, name);
            }
        }
    }

    #[test]
    fn penalty_applies_only_to_marked_reads() {
        // LDA abs,X pays for a crossing; STA abs,X never does.
        assert_eq!(cost(0xBD, true, false, false), 5);
        assert_eq!(cost(0xBD, false, false, false), 4);
        assert_eq!(cost(0x9D, true, false, false), 5);
        assert!(!has_page_penalty(0x9D));
    }

    #[test]
    fn branch_costs_two_three_or_four() {
        assert_eq!(cost(0xD0, false, false, false), 2);
        assert_eq!(cost(0xD0, false, true, false), 3);
        assert_eq!(cost(0xD0, false, true, true), 4);
    }
}
