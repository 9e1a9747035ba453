//! 6502 opcode decoder.
//!
//! The documented 6502 opcode space decodes by nibble and bit patterns
//! rather than a 256-entry table. The recognizer tries each addressing-mode
//! family in a fixed priority order and returns at the first match; the
//! order matters because the patterns overlap (`brk` would otherwise fall
//! into the implied family, `jmp ($xxxx)` into the indirect ALU family).
//!
//! Decoding is pure: the result depends only on the bytes passed in.
//! Anything that matches no pattern — including every undocumented
//! opcode — is reported as not decodable and ends up classified as data.

use crate::types::{AddrMode, Indexing};

/// ALU family, selected by bits 7:5.
const ALU: [&str; 8] = ["ora", "and", "eor", "adc", "sta", "lda", "cmp", "sbc"];

/// Read-modify-write family plus the X-register loads/stores, bits 7:5.
const RMW: [&str; 8] = ["asl", "rol", "lsr", "ror", "stx", "ldx", "dec", "inc"];

/// Immediate ALU family: `sta #imm` does not exist, hence the hole.
const ALU_IMMEDIATE: [&str; 8] = ["ora", "and", "eor", "adc", "", "lda", "cmp", "sbc"];

/// Implied instructions at `opcode & 0x0F == 0x08`, indexed by the high nibble.
const IMPLIED_08: [&str; 16] = [
    "php", "clc", "plp", "sec", "pha", "cli", "pla", "sei", "dey", "tya", "tay", "clv", "iny",
    "cld", "inx", "sed",
];

/// Implied instructions at `opcode & 0x8F == 0x8A`, indexed by high nibble - 8.
/// The holes are undocumented opcodes.
const IMPLIED_8A: [&str; 8] = ["txa", "txs", "tax", "tsx", "dex", "", "nop", ""];

/// Accumulator shifts/rotates at `opcode & 0x9F == 0x0A`, bits 7:5.
const ACCUMULATOR: [&str; 4] = ["asl", "rol", "lsr", "ror"];

/// Branches at `opcode & 0x1F == 0x10`, bits 7:5.
const BRANCHES: [&str; 8] = ["bpl", "bmi", "bvc", "bvs", "bcc", "bcs", "bne", "beq"];

/// The Y/X index-register family (`sty`/`ldy`/`cpy`/`cpx`), bits 7:6.
/// `cpx` shares the row because `stx`/`ldx` live in the RMW column.
const INDEX_FAMILY: [&str; 4] = ["sty", "ldy", "cpy", "cpx"];

/// Immediate family at `opcode & 0x9F == 0x80`: $80 itself is undocumented.
const IMMEDIATE_80: [&str; 4] = ["", "ldy", "cpy", "cpx"];

/// A decoded instruction: mnemonic, addressing mode, indexing, byte length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// Lowercase mnemonic.
    pub mnemonic: &'static str,
    /// Addressing mode.
    pub mode: AddrMode,
    /// Index register applied to the operand.
    pub indexing: Indexing,
    /// Total length in bytes, operand included.
    pub length: u8,
}

impl Decoded {
    const fn new(mnemonic: &'static str, mode: AddrMode, indexing: Indexing, length: u8) -> Self {
        Self {
            mnemonic,
            mode,
            indexing,
            length,
        }
    }
}

/// Decode up to three bytes as a single instruction.
///
/// Returns `None` when the first byte is not a documented opcode or when
/// the slice is too short for the operand the mode requires. `dq_brk`
/// makes `brk` consume three bytes instead of two.
pub fn decode(bytes: &[u8], dq_brk: bool) -> Option<Decoded> {
    let opcode = *bytes.first()?;
    let has_b1 = bytes.len() >= 2;
    let has_b2 = bytes.len() >= 3;

    // jmp ($xxxx) would otherwise match the indirect ALU family.
    if has_b2 && opcode == 0x6C {
        return Some(Decoded::new("jmp", AddrMode::Indirect, Indexing::None, 3));
    }

    // brk consumes a signature byte the CPU skips on return.
    if has_b2 && opcode == 0x00 {
        let length = if dq_brk { 3 } else { 2 };
        return Some(Decoded::new("brk", AddrMode::Implied, Indexing::None, length));
    }

    if let Some(mnemonic) = implied(opcode) {
        return Some(Decoded::new(mnemonic, AddrMode::Implied, Indexing::None, 1));
    }

    if opcode & 0x9F == 0x0A {
        let mnemonic = ACCUMULATOR[usize::from(opcode >> 5)];
        return Some(Decoded::new(
            mnemonic,
            AddrMode::Accumulator,
            Indexing::None,
            1,
        ));
    }

    if has_b1 {
        if let Some(mnemonic) = immediate(opcode) {
            return Some(Decoded::new(mnemonic, AddrMode::Immediate, Indexing::None, 2));
        }
        if let Some((mnemonic, indexing)) = zeropage(opcode) {
            return Some(Decoded::new(mnemonic, AddrMode::ZeroPage, indexing, 2));
        }
        if opcode & 0x0F == 0x01 {
            let mnemonic = ALU[usize::from(opcode >> 5)];
            let indexing = if opcode & 0x10 != 0 {
                Indexing::Y
            } else {
                Indexing::X
            };
            return Some(Decoded::new(mnemonic, AddrMode::Indirect, indexing, 2));
        }
        if opcode & 0x1F == 0x10 {
            let mnemonic = BRANCHES[usize::from(opcode >> 5)];
            return Some(Decoded::new(mnemonic, AddrMode::Branch, Indexing::None, 2));
        }
    }

    if has_b2 {
        if let Some((mnemonic, indexing)) = absolute(opcode) {
            return Some(Decoded::new(mnemonic, AddrMode::Absolute, indexing, 3));
        }
    }

    None
}

/// Implied (no-operand) recognizer.
fn implied(opcode: u8) -> Option<&'static str> {
    if opcode & 0x0F == 0x08 {
        return Some(IMPLIED_08[usize::from(opcode >> 4)]);
    }
    match opcode {
        0x40 => Some("rti"),
        0x60 => Some("rts"),
        _ if opcode & 0x8F == 0x8A => {
            let mnemonic = IMPLIED_8A[usize::from(opcode >> 4) - 8];
            if mnemonic.is_empty() {
                None
            } else {
                Some(mnemonic)
            }
        }
        _ => None,
    }
}

/// Immediate recognizer.
fn immediate(opcode: u8) -> Option<&'static str> {
    if opcode & 0x1F == 0x09 {
        let mnemonic = ALU_IMMEDIATE[usize::from(opcode >> 5)];
        if !mnemonic.is_empty() {
            return Some(mnemonic);
        }
    }
    if opcode & 0x9F == 0x80 {
        let mnemonic = IMMEDIATE_80[usize::from(opcode >> 5) - 4];
        if !mnemonic.is_empty() {
            return Some(mnemonic);
        }
    }
    if opcode == 0xA2 {
        return Some("ldx");
    }
    None
}

/// Zero-page recognizer, including the X/Y-indexed rows.
fn zeropage(opcode: u8) -> Option<(&'static str, Indexing)> {
    let mnemonic = if opcode & 0x0F == 0x05 {
        ALU[usize::from(opcode >> 5)]
    } else if opcode & 0x0F == 0x06 {
        RMW[usize::from(opcode >> 5)]
    } else if opcode == 0x24 {
        "bit"
    } else if matches!(opcode, 0x84 | 0x94 | 0xA4 | 0xB4 | 0xC4 | 0xE4) {
        INDEX_FAMILY[usize::from(opcode >> 5) - 4]
    } else {
        return None;
    };
    // stx/ldx zero-page indexes by Y, everything else by X.
    let indexing = if matches!(opcode, 0x96 | 0xB6) {
        Indexing::Y
    } else if opcode & 0x10 != 0 {
        Indexing::X
    } else {
        Indexing::None
    };
    Some((mnemonic, indexing))
}

/// Absolute recognizer.
///
/// $9C (`shy`) and $9E (`shx`) fall in the absolute rows but are
/// undocumented, so they are rejected up front.
fn absolute(opcode: u8) -> Option<(&'static str, Indexing)> {
    if matches!(opcode, 0x9C | 0x9E) {
        return None;
    }
    let mnemonic = if opcode == 0x20 {
        "jsr"
    } else if opcode == 0x4C {
        "jmp"
    } else if opcode & 0x1F == 0x19 || opcode & 0x0F == 0x0D {
        ALU[usize::from(opcode >> 5)]
    } else if opcode & 0x0F == 0x0E {
        RMW[usize::from(opcode >> 5)]
    } else if opcode == 0x2C {
        "bit"
    } else if matches!(opcode, 0x8C | 0xAC | 0xBC | 0xCC | 0xEC) {
        INDEX_FAMILY[usize::from(opcode >> 5) - 4]
    } else {
        return None;
    };
    let indexing = if opcode == 0xBE || opcode & 0x1F == 0x19 {
        Indexing::Y
    } else if opcode & 0x10 != 0 {
        Indexing::X
    } else {
        Indexing::None
    };
    Some((mnemonic, indexing))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(bytes: &[u8]) -> Option<Decoded> {
        decode(bytes, false)
    }

    #[test]
    fn test_jmp_indirect() {
        let d = dec(&[0x6C, 0x34, 0x12]).unwrap();
        assert_eq!(d.mnemonic, "jmp");
        assert_eq!(d.mode, AddrMode::Indirect);
        assert_eq!(d.length, 3);
    }

    #[test]
    fn test_brk_length() {
        let d = dec(&[0x00, 0xFF, 0xFF]).unwrap();
        assert_eq!(d.mnemonic, "brk");
        assert_eq!(d.length, 2);

        let d = decode(&[0x00, 0xFF, 0xFF], true).unwrap();
        assert_eq!(d.length, 3);

        // brk needs three bytes of lookahead even at length 2.
        assert!(dec(&[0x00, 0xFF]).is_none());
    }

    #[test]
    fn test_implied() {
        assert_eq!(dec(&[0xEA]).unwrap().mnemonic, "nop");
        assert_eq!(dec(&[0x60]).unwrap().mnemonic, "rts");
        assert_eq!(dec(&[0x40]).unwrap().mnemonic, "rti");
        assert_eq!(dec(&[0x78]).unwrap().mnemonic, "sei");
        assert_eq!(dec(&[0x18]).unwrap().mnemonic, "clc");
        assert_eq!(dec(&[0x9A]).unwrap().mnemonic, "txs");
        assert_eq!(dec(&[0xCA]).unwrap().mnemonic, "dex");
        assert_eq!(dec(&[0xEA]).unwrap().length, 1);
    }

    #[test]
    fn test_accumulator() {
        let d = dec(&[0x0A]).unwrap();
        assert_eq!((d.mnemonic, d.mode), ("asl", AddrMode::Accumulator));
        assert_eq!(dec(&[0x2A]).unwrap().mnemonic, "rol");
        assert_eq!(dec(&[0x4A]).unwrap().mnemonic, "lsr");
        assert_eq!(dec(&[0x6A]).unwrap().mnemonic, "ror");
    }

    #[test]
    fn test_immediate() {
        let d = dec(&[0xA9, 0x42]).unwrap();
        assert_eq!((d.mnemonic, d.mode, d.length), ("lda", AddrMode::Immediate, 2));
        assert_eq!(dec(&[0xA2, 0x00]).unwrap().mnemonic, "ldx");
        assert_eq!(dec(&[0xA0, 0x00]).unwrap().mnemonic, "ldy");
        assert_eq!(dec(&[0xC0, 0x00]).unwrap().mnemonic, "cpy");
        assert_eq!(dec(&[0xE0, 0x00]).unwrap().mnemonic, "cpx");
        assert_eq!(dec(&[0x69, 0x01]).unwrap().mnemonic, "adc");
        // $89 would be sta #imm, which does not exist.
        assert!(dec(&[0x89, 0x00]).is_none());
        // $80 is an undocumented nop.
        assert!(dec(&[0x80, 0x00]).is_none());
    }

    #[test]
    fn test_zeropage() {
        let d = dec(&[0x85, 0x10]).unwrap();
        assert_eq!((d.mnemonic, d.mode), ("sta", AddrMode::ZeroPage));
        assert_eq!(d.indexing, Indexing::None);

        let d = dec(&[0xB5, 0x10]).unwrap();
        assert_eq!((d.mnemonic, d.indexing), ("lda", Indexing::X));

        // stx/ldx zero-page index by Y.
        let d = dec(&[0x96, 0x10]).unwrap();
        assert_eq!((d.mnemonic, d.indexing), ("stx", Indexing::Y));
        let d = dec(&[0xB6, 0x10]).unwrap();
        assert_eq!((d.mnemonic, d.indexing), ("ldx", Indexing::Y));

        assert_eq!(dec(&[0x24, 0x10]).unwrap().mnemonic, "bit");
        assert_eq!(dec(&[0x84, 0x10]).unwrap().mnemonic, "sty");
        assert_eq!(dec(&[0xC4, 0x10]).unwrap().mnemonic, "cpy");
        assert_eq!(dec(&[0xE4, 0x10]).unwrap().mnemonic, "cpx");
    }

    #[test]
    fn test_indirect() {
        let d = dec(&[0xA1, 0x10]).unwrap();
        assert_eq!((d.mnemonic, d.mode, d.indexing), ("lda", AddrMode::Indirect, Indexing::X));
        let d = dec(&[0xB1, 0x10]).unwrap();
        assert_eq!((d.mnemonic, d.indexing), ("lda", Indexing::Y));
        let d = dec(&[0x91, 0x10]).unwrap();
        assert_eq!((d.mnemonic, d.indexing), ("sta", Indexing::Y));
    }

    #[test]
    fn test_branches() {
        let d = dec(&[0xF0, 0x02]).unwrap();
        assert_eq!((d.mnemonic, d.mode, d.length), ("beq", AddrMode::Branch, 2));
        assert_eq!(dec(&[0x10, 0x00]).unwrap().mnemonic, "bpl");
        assert_eq!(dec(&[0x30, 0x00]).unwrap().mnemonic, "bmi");
        assert_eq!(dec(&[0x50, 0x00]).unwrap().mnemonic, "bvc");
        assert_eq!(dec(&[0x70, 0x00]).unwrap().mnemonic, "bvs");
        assert_eq!(dec(&[0x90, 0x00]).unwrap().mnemonic, "bcc");
        assert_eq!(dec(&[0xB0, 0x00]).unwrap().mnemonic, "bcs");
        assert_eq!(dec(&[0xD0, 0x00]).unwrap().mnemonic, "bne");
    }

    #[test]
    fn test_absolute() {
        let d = dec(&[0xAD, 0x00, 0x20]).unwrap();
        assert_eq!((d.mnemonic, d.mode, d.length), ("lda", AddrMode::Absolute, 3));

        let d = dec(&[0x8D, 0x00, 0x20]).unwrap();
        assert_eq!(d.mnemonic, "sta");

        let d = dec(&[0x20, 0x00, 0xC0]).unwrap();
        assert_eq!(d.mnemonic, "jsr");
        let d = dec(&[0x4C, 0x00, 0xC0]).unwrap();
        assert_eq!(d.mnemonic, "jmp");

        let d = dec(&[0xBD, 0x00, 0xC0]).unwrap();
        assert_eq!((d.mnemonic, d.indexing), ("lda", Indexing::X));
        let d = dec(&[0xB9, 0x00, 0xC0]).unwrap();
        assert_eq!((d.mnemonic, d.indexing), ("lda", Indexing::Y));
        let d = dec(&[0xBE, 0x00, 0xC0]).unwrap();
        assert_eq!((d.mnemonic, d.indexing), ("ldx", Indexing::Y));
        let d = dec(&[0xBC, 0x00, 0xC0]).unwrap();
        assert_eq!((d.mnemonic, d.indexing), ("ldy", Indexing::X));

        assert_eq!(dec(&[0x2C, 0x00, 0x20]).unwrap().mnemonic, "bit");
        assert_eq!(dec(&[0xEE, 0x00, 0x03]).unwrap().mnemonic, "inc");

        // Undocumented shy/shx are rejected.
        assert!(dec(&[0x9C, 0x00, 0x20]).is_none());
        assert!(dec(&[0x9E, 0x00, 0x20]).is_none());
    }

    #[test]
    fn test_undecodable() {
        assert!(dec(&[0x02, 0x00, 0x00]).is_none());
        assert!(dec(&[0xFF, 0x00, 0x00]).is_none());
        assert!(dec(&[0x04, 0x00, 0x00]).is_none());
        assert!(dec(&[]).is_none());
    }

    #[test]
    fn test_short_input() {
        // Multi-byte modes refuse to decode without their operand bytes.
        assert!(dec(&[0xA9]).is_none());
        assert!(dec(&[0xAD, 0x00]).is_none());
        assert!(dec(&[0x6C, 0x00]).is_none());
        // Single-byte modes still decode.
        assert!(dec(&[0xEA]).is_some());
    }

    #[test]
    fn test_purity() {
        // Surrounding bytes must not influence the result.
        let a = dec(&[0xA9, 0x01, 0xFF]);
        let b = dec(&[0xA9, 0x01, 0x00]);
        assert_eq!(a, b);
    }

    /// Every decodable opcode's length must match its addressing-mode
    /// contract across the whole opcode space.
    #[test]
    fn test_length_law() {
        for opcode in 0..=255u8 {
            let bytes = [opcode, 0x00, 0x00];
            if let Some(d) = decode(&bytes, false) {
                let expected = match d.mode {
                    AddrMode::Implied => {
                        if opcode == 0x00 {
                            2
                        } else {
                            1
                        }
                    }
                    AddrMode::Accumulator => 1,
                    AddrMode::Immediate | AddrMode::ZeroPage | AddrMode::Branch => 2,
                    AddrMode::Indirect => {
                        if opcode == 0x6C {
                            3
                        } else {
                            2
                        }
                    }
                    AddrMode::Absolute => 3,
                };
                assert_eq!(d.length, expected, "opcode {opcode:#04x}");
            }
        }
    }

    /// dq-brk only ever changes the length of brk itself.
    #[test]
    fn test_dq_brk_isolated() {
        for opcode in 1..=255u8 {
            let bytes = [opcode, 0x00, 0x00];
            assert_eq!(decode(&bytes, false), decode(&bytes, true));
        }
    }
}
