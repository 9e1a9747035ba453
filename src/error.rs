//! Error types for the disassembler and the cartridge dumper.
//!
//! This module defines all error types used throughout the crate. The
//! disassembly core itself never fails on ROM content — undecodable bytes
//! are classified as data — so the taxonomy here covers input validation,
//! dumper transport failures, and dump verification.

use thiserror::Error;

/// Primary error type for the disassembler.
#[derive(Debug, Error)]
pub enum DisasmError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The ROM is too small to contain an iNES header.
    #[error("ROM too small for an iNES header: expected at least {expected} bytes, got {actual}")]
    HeaderTooSmall { expected: usize, actual: usize },

    /// The header does not start with the `NES\x1A` signature.
    #[error("invalid iNES signature: {actual:02X?}")]
    InvalidMagic { actual: [u8; 4] },

    /// The ROM data ends before the PRG banks declared by the header.
    #[error("truncated ROM: expected {expected} bytes of PRG data, got {actual}")]
    TruncatedRom { expected: usize, actual: usize },

    /// A bank size that is not one of the sizes real mappers switch.
    #[error("invalid bank size {kb}KB: should be 4, 8, 16, or 32")]
    InvalidBankSize { kb: u32 },

    /// The mapper is not in the static table and no bank size was supplied.
    #[error("unknown mapper {mapper}: please specify a bank size")]
    UnknownMapper { mapper: u16 },

    /// The mapper has too many submapper variants to pick a bank size.
    #[error("mapper {mapper} ({name}) is submapper-dependent: please specify a bank size")]
    AmbiguousBankSize { mapper: u16, name: &'static str },

    /// No input filename was given on the command line.
    #[error("filename must be specified")]
    MissingFilename,

    /// The dumper has no board driver for this mapper.
    #[error("mapper {mapper} is not yet supported by the dumper")]
    UnsupportedMapper { mapper: u16 },

    /// The dumper device answered a control transfer with an error status.
    #[error("dumper device responded with error code {code}")]
    Transport { code: u8 },

    /// Two successive full dumps disagreed.
    #[error("second read did not match the first: please make sure the cartridge is seated properly and try again")]
    HashMismatch,

    /// Two successive full dumps agreed but matched no known digest.
    #[error("hash {digest} matches the previous read but no known hash: the cartridge may be miscatalogued")]
    UnknownHash { digest: String },
}

/// Result type alias for disassembler operations.
pub type Result<T> = std::result::Result<T, DisasmError>;
