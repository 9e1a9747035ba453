//! Core types for the disassembler.
//!
//! This module defines the addressing-mode and indexing vocabulary shared by
//! the opcode decoder, the classifier, and the formatter, plus the options
//! record that surfaces every tunable of the analysis.

use serde::Serialize;
use std::fmt;

/// 6502 addressing modes recognized by the decoder.
///
/// The byte length of an instruction is fully determined by its mode (with
/// the single exception of `brk`, which consumes a signature byte and under
/// the Dragon Quest quirk a second one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddrMode {
    /// No operand (1 byte). `brk` is Implied but 2 or 3 bytes long.
    Implied,
    /// Operates on the accumulator (1 byte).
    Accumulator,
    /// Literal 8-bit operand (2 bytes).
    Immediate,
    /// 8-bit address in page zero (2 bytes).
    ZeroPage,
    /// Full 16-bit address (3 bytes).
    Absolute,
    /// Signed relative displacement (2 bytes).
    Branch,
    /// Address read through a pointer (2 bytes, or 3 for `jmp ($xxxx)`).
    Indirect,
}

/// Index register applied to an operand, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Indexing {
    /// No indexing.
    #[default]
    None,
    /// Indexed by X.
    X,
    /// Indexed by Y.
    Y,
}

impl fmt::Display for Indexing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Indexing::None => Ok(()),
            Indexing::X => write!(f, "x"),
            Indexing::Y => write!(f, "y"),
        }
    }
}

/// Options controlling ROM interpretation and subroutine analysis.
///
/// All tunables are explicit here; nothing in the crate reads global state.
/// Sizes are in kilobytes, matching the CLI surface.
#[derive(Debug, Clone)]
pub struct DisasmOptions {
    /// Switchable bank size in KB. `None` auto-detects from the mapper table.
    pub bank_size: Option<u32>,
    /// Number of fixed banks at the end of PRG space. `None` auto-detects.
    pub fixed_banks: Option<u32>,
    /// Minimum instruction count for a valid subroutine.
    pub min_sub_size: usize,
    /// Extra substrings accepted as subroutine terminators, beyond
    /// `rts`, `rti`, and `jmp`.
    pub terminators: Vec<String>,
    /// Accept every complete subroutine without the validity check.
    pub no_sub_check: bool,
    /// The ROM image has no 16-byte header.
    pub no_header: bool,
    /// Override the mapper number from the header.
    pub mapper: Option<u16>,
    /// Override the PRG ROM size in KB.
    pub prg_size: Option<u32>,
    /// Override the CHR ROM size in KB.
    pub chr_size: Option<u32>,
    /// Restrict disassembly to a single bank.
    pub bank: Option<usize>,
    /// Treat `brk` as a 3-byte instruction (Dragon Quest quirk).
    pub dq_brk: bool,
}

impl Default for DisasmOptions {
    fn default() -> Self {
        Self {
            bank_size: None,
            fixed_banks: None,
            min_sub_size: 2,
            terminators: Vec::new(),
            no_sub_check: false,
            no_header: false,
            mapper: None,
            prg_size: None,
            chr_size: None,
            bank: None,
            dq_brk: false,
        }
    }
}

impl DisasmOptions {
    /// Create options with the default analysis settings.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Facts about a ROM derived from its header and the mapper table.
///
/// This is what `--info` reports, as text or JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RomInfo {
    /// iNES mapper number.
    pub mapper: u16,
    /// Display name from the mapper table, if known.
    pub mapper_name: Option<String>,
    /// PRG ROM size in KB.
    pub prg_kb: u32,
    /// CHR ROM size in KB.
    pub chr_kb: u32,
    /// Switchable bank size in KB.
    pub bank_size_kb: u32,
    /// Number of PRG banks at that bank size.
    pub prg_banks: u32,
    /// Number of 8 KB CHR banks.
    pub chr_banks: u32,
    /// Banks fixed at the top of CPU address space.
    pub fixed_banks: u32,
    /// Nametable mirroring is vertical.
    pub vertical_mirroring: bool,
    /// Cartridge has battery-backed PRG RAM.
    pub battery: bool,
    /// A 512-byte trainer precedes PRG ROM.
    pub trainer: bool,
    /// Four-screen VRAM layout.
    pub four_screen: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexing_display() {
        assert_eq!(Indexing::None.to_string(), "");
        assert_eq!(Indexing::X.to_string(), "x");
        assert_eq!(Indexing::Y.to_string(), "y");
    }

    #[test]
    fn test_default_options() {
        let opts = DisasmOptions::new();
        assert_eq!(opts.min_sub_size, 2);
        assert!(!opts.no_sub_check);
        assert!(opts.terminators.is_empty());
        assert!(opts.bank_size.is_none());
    }
}
