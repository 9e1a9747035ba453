//! NES ROM disassembler.
//!
//! This library turns an iNES ROM image into assembler-ready source. The
//! disassembly core walks each PRG bank once, decoding 6502 opcodes,
//! classifying byte runs as subroutines or data tables, inferring the CPU
//! base address each bank was built for, and resolving branch and jump
//! targets to symbolic labels. The emitted layout reassembles to the same
//! bytes.
//!
//! # Features
//!
//! - **Opcode decoding**: documented 6502 opcodes by nibble/bit pattern
//! - **Code/data classification**: invalid instruction runs demote to data
//! - **Base inference**: jump-target density picks the bank's CPU base
//! - **Label resolution**: branch and jump targets become `bN_xxxx` labels
//! - **Cartridge dumping**: an INLRetro driver with MD5 verification and
//!   PRG/CHR size auto-detection, over an abstract USB control transfer
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use nes_disasm::{disassemble_file, formatter, DisasmOptions};
//!
//! fn main() -> nes_disasm::Result<()> {
//!     let options = DisasmOptions::new();
//!     let disassembly = disassemble_file("game.nes", &options)?;
//!     for bank in &disassembly.banks {
//!         print!("{}", formatter::render_bank(bank));
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]

pub mod bank;
pub mod component;
pub mod dumper;
pub mod error;
pub mod formatter;
pub mod header;
pub mod mappers;
pub mod mmio;
pub mod opcode;
pub mod types;

pub use bank::Bank;
pub use component::{Component, Instruction, Subroutine, Table, Word};
pub use dumper::{Board, ControlDevice, InlRetro};
pub use error::{DisasmError, Result};
pub use header::{Flags6, Header};
pub use opcode::{decode, Decoded};
pub use types::{AddrMode, DisasmOptions, Indexing, RomInfo};

use std::path::Path;

/// A fully classified ROM: header, per-bank components, and CHR data.
#[derive(Debug, Clone)]
pub struct Disassembly {
    /// The (possibly overridden) header.
    pub header: Header,
    /// Derived ROM facts.
    pub info: RomInfo,
    /// The classified PRG banks, in image order.
    pub banks: Vec<Bank>,
    /// Raw CHR ROM bytes following the PRG banks.
    pub chr: Vec<u8>,
}

/// Disassemble a ROM file.
///
/// This is the primary entry point for file-based use: it reads the file
/// and runs the full classification over every PRG bank.
pub fn disassemble_file<P: AsRef<Path>>(path: P, options: &DisasmOptions) -> Result<Disassembly> {
    let data = std::fs::read(path)?;
    disassemble_bytes(&data, options)
}

/// Disassemble a ROM image from a byte slice.
///
/// The image is an optional 16-byte iNES header followed by the PRG banks
/// and CHR data. Header values can be overridden through `options`; with
/// `options.no_header` the caller must supply at least the mapper or an
/// explicit bank size.
pub fn disassemble_bytes(data: &[u8], options: &DisasmOptions) -> Result<Disassembly> {
    let mut offset = 0;
    let mut header = if options.no_header {
        Header::default()
    } else {
        let header = Header::parse(data)?;
        offset = Header::SIZE;
        header
    };
    if let Some(mapper) = options.mapper {
        header.set_mapper(mapper);
    }
    if let Some(kb) = options.prg_size {
        header.set_prg_size(kb);
    }
    if let Some(kb) = options.chr_size {
        header.set_chr_size(kb);
    }

    let mapper_info = mappers::lookup(header.mapper());
    let bank_kb = match options.bank_size {
        Some(kb) => {
            if !matches!(kb, 4 | 8 | 16 | 32) {
                return Err(DisasmError::InvalidBankSize { kb });
            }
            kb
        }
        None => match mapper_info {
            Some(info) if info.bank_kb > 0 => {
                tracing::info!(
                    "ROM uses mapper {} - {}",
                    header.mapper(),
                    info.name
                );
                info.bank_kb as u32
            }
            Some(info) => {
                return Err(DisasmError::AmbiguousBankSize {
                    mapper: header.mapper(),
                    name: info.name,
                })
            }
            None => return Err(DisasmError::UnknownMapper {
                mapper: header.mapper(),
            }),
        },
    };
    let bank_size = bank_kb as usize * 1024;
    tracing::info!("bank size: {bank_kb}KB");

    let fixed_banks = options
        .fixed_banks
        .unwrap_or_else(|| mapper_info.map_or(0, |info| info.fixed_banks.max(0) as u32));
    let bank_count = header.prg_size() as usize * 1024 / bank_size;
    let chr_banks = header.chr_size() / 8;
    tracing::info!(
        "ROM has {} PRG banks ({}KB) and {} CHR banks ({}KB), {} fixed",
        bank_count,
        header.prg_size(),
        chr_banks,
        header.chr_size(),
        fixed_banks
    );

    let expected = offset + bank_count * bank_size;
    if data.len() < expected {
        return Err(DisasmError::TruncatedRom {
            expected: expected - offset,
            actual: data.len().saturating_sub(offset),
        });
    }

    let fixed_start = bank_count.saturating_sub(fixed_banks as usize);
    let mut banks = Vec::new();
    for number in 0..bank_count {
        if let Some(only) = options.bank {
            if only != number {
                continue;
            }
        }
        let start = offset + number * bank_size;
        let bytes = data[start..start + bank_size].to_vec();
        let base = bank_base(number, bank_count, bank_size, fixed_start);
        banks.push(Bank::new(
            number,
            base,
            bytes,
            fixed_banks as usize,
            options,
        ));
    }
    let chr = data[expected..].to_vec();

    let info = rom_info(&header, bank_kb, bank_count, fixed_banks);
    Ok(Disassembly {
        header,
        info,
        banks,
        chr,
    })
}

/// The fixed base for a bank, or `None` when it should be inferred.
///
/// 32K banks can only load at $8000; banks in the fixed region at the end
/// of PRG space sit at their hardware-assigned address.
fn bank_base(
    number: usize,
    bank_count: usize,
    bank_size: usize,
    fixed_start: usize,
) -> Option<u16> {
    if bank_size == 0x8000 {
        return Some(0x8000);
    }
    if number >= fixed_start {
        let span = bank_size * (bank_count - number);
        if span <= 0x8000 {
            return Some((0x1_0000 - span) as u16);
        }
    }
    None
}

/// Assemble the `--info` facts.
fn rom_info(header: &Header, bank_kb: u32, bank_count: usize, fixed_banks: u32) -> RomInfo {
    let flags = header.flags();
    RomInfo {
        mapper: header.mapper(),
        mapper_name: mappers::lookup(header.mapper()).map(|info| info.name.to_string()),
        prg_kb: header.prg_size(),
        chr_kb: header.chr_size(),
        bank_size_kb: bank_kb,
        prg_banks: bank_count as u32,
        chr_banks: header.chr_size() / 8,
        fixed_banks,
        vertical_mirroring: flags.contains(Flags6::VERTICAL_MIRRORING),
        battery: flags.contains(Flags6::BATTERY),
        trainer: flags.contains(Flags6::TRAINER),
        four_screen: flags.contains(Flags6::FOUR_SCREEN),
    }
}

/// Get version information for this library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
