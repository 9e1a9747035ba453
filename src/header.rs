//! iNES header model.
//!
//! The 16-byte descriptor at the front of a ROM image: the `NES\x1A`
//! signature, PRG and CHR sizes in bank counts, and the mapper number split
//! across the high nibbles of bytes 6 and 7. The model keeps the raw bytes
//! authoritative so overrides round-trip exactly.

use crate::error::{DisasmError, Result};
use crate::mappers;
use std::fmt;

bitflags::bitflags! {
    /// Flag bits in the low nibble of header byte 6.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Flags6: u8 {
        /// Vertical nametable mirroring (horizontal when clear).
        const VERTICAL_MIRRORING = 0x01;
        /// Battery-backed PRG RAM at $6000-$7FFF.
        const BATTERY = 0x02;
        /// A 512-byte trainer precedes PRG ROM.
        const TRAINER = 0x04;
        /// Four-screen VRAM layout, ignoring mirroring.
        const FOUR_SCREEN = 0x08;
    }
}

/// The 16-byte iNES ROM header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    bytes: [u8; 16],
}

/// The `NES\x1A` signature.
const MAGIC: [u8; 4] = [b'N', b'E', b'S', 0x1A];

impl Default for Header {
    /// An empty header: valid signature, zero sizes, mapper 0. Used for
    /// headerless ROMs, where the caller supplies every value.
    fn default() -> Self {
        let mut bytes = [0u8; 16];
        bytes[..4].copy_from_slice(&MAGIC);
        Self { bytes }
    }
}

impl Header {
    /// Header length in bytes.
    pub const SIZE: usize = 16;

    /// Parse and validate a header from the front of a ROM image.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(DisasmError::HeaderTooSmall {
                expected: Self::SIZE,
                actual: data.len(),
            });
        }
        if data[..4] != MAGIC {
            let mut actual = [0u8; 4];
            actual.copy_from_slice(&data[..4]);
            return Err(DisasmError::InvalidMagic { actual });
        }
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&data[..Self::SIZE]);
        Ok(Self { bytes })
    }

    /// Build a header describing a finished cartridge dump, so the dump
    /// can be written back out as a `.nes` file.
    pub fn for_dump(mapper: u16, prg_kb: u32, chr_kb: u32) -> Self {
        let mut header = Self::default();
        header.set_mapper(mapper);
        header.set_prg_size(prg_kb);
        header.set_chr_size(chr_kb);
        header
    }

    /// The raw 16 bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.bytes
    }

    /// iNES mapper number.
    pub fn mapper(&self) -> u16 {
        u16::from(self.bytes[6] >> 4) | u16::from(self.bytes[7] & 0xF0)
    }

    /// Override the mapper number.
    pub fn set_mapper(&mut self, mapper: u16) {
        self.bytes[6] &= 0x0F;
        self.bytes[6] |= ((mapper & 0x0F) << 4) as u8;
        self.bytes[7] &= 0x0F;
        self.bytes[7] |= (mapper & 0xF0) as u8;
    }

    /// PRG ROM size in KB.
    pub fn prg_size(&self) -> u32 {
        u32::from(self.bytes[4]) * 16
    }

    /// Override the PRG ROM size in KB.
    pub fn set_prg_size(&mut self, kb: u32) {
        self.bytes[4] = (kb / 16) as u8;
    }

    /// CHR ROM size in KB.
    pub fn chr_size(&self) -> u32 {
        u32::from(self.bytes[5]) * 8
    }

    /// Override the CHR ROM size in KB.
    pub fn set_chr_size(&mut self, kb: u32) {
        self.bytes[5] = (kb / 8) as u8;
    }

    /// Flag bits from the low nibble of byte 6.
    pub fn flags(&self) -> Flags6 {
        Flags6::from_bits_truncate(self.bytes[6] & 0x0F)
    }
}

impl fmt::Display for Header {
    /// The header as an assembler comment block plus `.db` directives.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mapper = self.mapper();
        match mappers::lookup(mapper) {
            Some(info) => writeln!(f, ";  HEADER - MAPPER {} - {}", mapper, info.name)?,
            None => writeln!(f, ";  HEADER - MAPPER {mapper}")?,
        }
        writeln!(f, "        .db \"NES\", $1a")?;
        writeln!(f, "        .db {}  ; PRG ROM banks", self.bytes[4])?;
        writeln!(f, "        .db {}  ; CHR ROM banks", self.bytes[5])?;
        writeln!(
            f,
            "        .db ${:02x} ; Mapper, mirroring, battery, trainer",
            self.bytes[6]
        )?;
        writeln!(
            f,
            "        .db ${:02x} ; Mapper, VS/Playchoice, NES 2.0 Header",
            self.bytes[7]
        )?;
        writeln!(f, "        .db {}  ; PRG-RAM size (rarely used)", self.bytes[8])?;
        writeln!(f, "        .db {}  ; TV system (rarely used)", self.bytes[9])?;
        writeln!(
            f,
            "        .db {}  ; TV system, PRG-RAM presence (unofficial, rarely used)",
            self.bytes[10]
        )?;
        let padding = self.bytes[11..16]
            .iter()
            .map(|b| format!("${b:02X}"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "        .db {padding} ; Unused padding")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[..4].copy_from_slice(&MAGIC);
        bytes[4] = 8; // 128 KB PRG
        bytes[5] = 16; // 128 KB CHR
        bytes[6] = 0x42; // mapper low nibble 4, battery
        bytes[7] = 0x00;
        bytes
    }

    #[test]
    fn test_parse() {
        let header = Header::parse(&sample()).unwrap();
        assert_eq!(header.prg_size(), 128);
        assert_eq!(header.chr_size(), 128);
        assert_eq!(header.mapper(), 4);
        assert!(header.flags().contains(Flags6::BATTERY));
        assert!(!header.flags().contains(Flags6::TRAINER));
    }

    #[test]
    fn test_parse_rejects_bad_magic() {
        let mut bytes = sample();
        bytes[3] = 0x00;
        match Header::parse(&bytes) {
            Err(DisasmError::InvalidMagic { .. }) => {}
            other => panic!("expected InvalidMagic, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_short_input() {
        match Header::parse(&[0x4E, 0x45]) {
            Err(DisasmError::HeaderTooSmall { actual: 2, .. }) => {}
            other => panic!("expected HeaderTooSmall, got {other:?}"),
        }
    }

    #[test]
    fn test_mapper_nibbles() {
        let mut bytes = sample();
        bytes[6] = 0x50; // low nibble of mapper 0x45
        bytes[7] = 0x40; // high nibble
        let header = Header::parse(&bytes).unwrap();
        assert_eq!(header.mapper(), 0x45);
    }

    #[test]
    fn test_set_mapper_roundtrip() {
        let mut header = Header::parse(&sample()).unwrap();
        header.set_mapper(69);
        assert_eq!(header.mapper(), 69);
        // Flag bits in the low nibbles survive the override.
        assert!(header.flags().contains(Flags6::BATTERY));
    }

    #[test]
    fn test_size_overrides() {
        let mut header = Header::default();
        header.set_prg_size(256);
        header.set_chr_size(64);
        assert_eq!(header.as_bytes()[4], 16);
        assert_eq!(header.as_bytes()[5], 8);
        assert_eq!(header.prg_size(), 256);
        assert_eq!(header.chr_size(), 64);
    }

    #[test]
    fn test_for_dump() {
        let header = Header::for_dump(2, 128, 0);
        assert_eq!(header.mapper(), 2);
        assert_eq!(header.prg_size(), 128);
        assert_eq!(header.chr_size(), 0);
        assert_eq!(&header.as_bytes()[..4], &MAGIC);
    }

    #[test]
    fn test_display_block() {
        let header = Header::parse(&sample()).unwrap();
        let text = header.to_string();
        assert!(text.starts_with(";  HEADER - MAPPER 4 - TxROM"));
        assert!(text.contains(".db \"NES\", $1a"));
        assert!(text.contains(".db 8  ; PRG ROM banks"));
        assert!(text.contains(".db 16  ; CHR ROM banks"));
        assert!(text.contains(".db $42 ; Mapper, mirroring"));
        assert!(text.ends_with("; Unused padding"));
    }
}
