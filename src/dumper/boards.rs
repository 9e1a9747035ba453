//! Per-mapper bank-select drivers.
//!
//! Each supported board family knows its switchable bank sizes and the
//! register writes that swap a bank in. The dumper driver dispatches on
//! the [`Board`] variant; adding a board means adding a variant and its
//! three operations here.

use crate::dumper::protocol::{nes, with_data, Category};
use crate::dumper::{command, ControlDevice};
use crate::error::{DisasmError, Result};

/// A cartridge board family the dumper can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Board {
    /// Mapper 0: no bank switching at all.
    Nrom,
    /// MMC1 boards (mappers 1, 105).
    Sxrom,
    /// Discrete PRG switching (mappers 2, 94, 180).
    Uxrom,
    /// Discrete CHR switching (mappers 3, 185).
    Cnrom,
    /// MMC3 family (mappers 4, 64, 118, 119).
    Txrom,
    /// MMC5 (mapper 5).
    Exrom,
}

impl Board {
    /// Resolve a mapper number to its board driver.
    pub fn for_mapper(mapper: u16) -> Result<Self> {
        match mapper {
            0 => Ok(Board::Nrom),
            1 | 105 => Ok(Board::Sxrom),
            2 | 94 | 180 => Ok(Board::Uxrom),
            3 | 185 => Ok(Board::Cnrom),
            4 | 64 | 118 | 119 => Ok(Board::Txrom),
            5 => Ok(Board::Exrom),
            _ => Err(DisasmError::UnsupportedMapper { mapper }),
        }
    }

    /// Board family name.
    pub fn name(self) -> &'static str {
        match self {
            Board::Nrom => "NROM",
            Board::Sxrom => "SxROM",
            Board::Uxrom => "UxROM",
            Board::Cnrom => "CNROM",
            Board::Txrom => "TxROM",
            Board::Exrom => "ExROM",
        }
    }

    /// (PRG, CHR) bank sizes in KB.
    pub fn banks(self) -> (u32, u32) {
        match self {
            Board::Nrom | Board::Cnrom => (32, 8),
            Board::Sxrom => (16, 4),
            Board::Uxrom => (16, 8),
            Board::Txrom | Board::Exrom => (8, 1),
        }
    }

    /// One-time mapper setup after bus init.
    pub fn post_init<D: ControlDevice>(self, device: &mut D) -> Result<()> {
        match self {
            // Put the MMC1 in 16K PRG / 4K CHR mode.
            Board::Sxrom => command(
                device,
                Category::Nes,
                with_data(nes::NES_MMC1_WR, 0x1C),
                0x9FFF,
                1,
            ),
            _ => Ok(()),
        }
    }

    /// Swap a PRG bank into the switchable window.
    pub fn set_prg_bank<D: ControlDevice>(self, device: &mut D, bank: u16) -> Result<()> {
        tracing::debug!("swapping in PRG bank {bank}");
        let data = (bank & 0xFF) as u8;
        match self {
            Board::Nrom | Board::Cnrom => Ok(()),
            Board::Sxrom => command(
                device,
                Category::Nes,
                with_data(nes::NES_MMC1_WR, data),
                0xFFFF,
                1,
            ),
            Board::Uxrom => command(
                device,
                Category::Nes,
                with_data(nes::NES_CPU_WR, data),
                0xFFFF,
                1,
            ),
            Board::Txrom => {
                command(
                    device,
                    Category::Nes,
                    with_data(nes::NES_CPU_WR, 0b1000_0110),
                    0x9FFE,
                    1,
                )?;
                command(
                    device,
                    Category::Nes,
                    with_data(nes::NES_CPU_WR, data),
                    0x9FFF,
                    1,
                )
            }
            Board::Exrom => {
                // PRG mode 3, then the bank with the ROM select bit.
                command(
                    device,
                    Category::Nes,
                    with_data(nes::NES_CPU_WR, 3),
                    0x5100,
                    1,
                )?;
                command(
                    device,
                    Category::Nes,
                    with_data(nes::NES_CPU_WR, 0x80 | data),
                    0x5114,
                    1,
                )
            }
        }
    }

    /// Swap a CHR bank into the switchable window.
    pub fn set_chr_bank<D: ControlDevice>(self, device: &mut D, bank: u16) -> Result<()> {
        tracing::debug!("swapping in CHR bank {bank}");
        let data = (bank & 0xFF) as u8;
        match self {
            Board::Nrom | Board::Uxrom => Ok(()),
            Board::Sxrom => command(
                device,
                Category::Nes,
                with_data(nes::NES_MMC1_WR, data),
                0xBFFF,
                1,
            ),
            Board::Cnrom => command(
                device,
                Category::Nes,
                with_data(nes::NES_CPU_WR, data),
                0xFFFF,
                1,
            ),
            Board::Txrom => {
                command(
                    device,
                    Category::Nes,
                    with_data(nes::NES_CPU_WR, 0b1000_0010),
                    0x9FFE,
                    1,
                )?;
                command(
                    device,
                    Category::Nes,
                    with_data(nes::NES_CPU_WR, data),
                    0x9FFF,
                    1,
                )
            }
            Board::Exrom => {
                // CHR mode 3, then the bank high and low bytes.
                command(
                    device,
                    Category::Nes,
                    with_data(nes::NES_CPU_WR, 3),
                    0x5101,
                    1,
                )?;
                command(
                    device,
                    Category::Nes,
                    with_data(nes::NES_CPU_WR, (bank >> 8) as u8),
                    0x5130,
                    1,
                )?;
                command(
                    device,
                    Category::Nes,
                    with_data(nes::NES_CPU_WR, data),
                    0x5120,
                    1,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapper_resolution() {
        assert_eq!(Board::for_mapper(0).unwrap(), Board::Nrom);
        assert_eq!(Board::for_mapper(1).unwrap(), Board::Sxrom);
        assert_eq!(Board::for_mapper(105).unwrap(), Board::Sxrom);
        assert_eq!(Board::for_mapper(2).unwrap(), Board::Uxrom);
        assert_eq!(Board::for_mapper(180).unwrap(), Board::Uxrom);
        assert_eq!(Board::for_mapper(185).unwrap(), Board::Cnrom);
        assert_eq!(Board::for_mapper(4).unwrap(), Board::Txrom);
        assert_eq!(Board::for_mapper(119).unwrap(), Board::Txrom);
        assert_eq!(Board::for_mapper(5).unwrap(), Board::Exrom);
    }

    #[test]
    fn test_unsupported_mapper() {
        match Board::for_mapper(7) {
            Err(DisasmError::UnsupportedMapper { mapper: 7 }) => {}
            other => panic!("expected UnsupportedMapper, got {other:?}"),
        }
    }

    #[test]
    fn test_bank_sizes() {
        assert_eq!(Board::Nrom.banks(), (32, 8));
        assert_eq!(Board::Sxrom.banks(), (16, 4));
        assert_eq!(Board::Uxrom.banks(), (16, 8));
        assert_eq!(Board::Cnrom.banks(), (32, 8));
        assert_eq!(Board::Txrom.banks(), (8, 1));
        assert_eq!(Board::Exrom.banks(), (8, 1));
    }

    /// Records every transfer and answers success.
    struct Recorder {
        calls: Vec<(u8, u16, u16, u16)>,
    }

    impl ControlDevice for Recorder {
        fn control_transfer(
            &mut self,
            request: u8,
            value: u16,
            index: u16,
            length: u16,
        ) -> Result<Vec<u8>> {
            self.calls.push((request, value, index, length));
            Ok(vec![0; usize::from(length)])
        }
    }

    #[test]
    fn test_uxrom_prg_select() {
        let mut device = Recorder { calls: Vec::new() };
        Board::Uxrom.set_prg_bank(&mut device, 3).unwrap();
        assert_eq!(device.calls, vec![(3, 0x0302, 0xFFFF, 1)]);
    }

    #[test]
    fn test_txrom_prg_select() {
        let mut device = Recorder { calls: Vec::new() };
        Board::Txrom.set_prg_bank(&mut device, 5).unwrap();
        assert_eq!(
            device.calls,
            vec![(3, 0x8602, 0x9FFE, 1), (3, 0x0502, 0x9FFF, 1)]
        );
    }

    #[test]
    fn test_exrom_chr_select() {
        let mut device = Recorder { calls: Vec::new() };
        Board::Exrom.set_chr_bank(&mut device, 0x0123).unwrap();
        assert_eq!(
            device.calls,
            vec![
                (3, 0x0302, 0x5101, 1),
                (3, 0x0102, 0x5130, 1),
                (3, 0x2302, 0x5120, 1),
            ]
        );
    }

    #[test]
    fn test_sxrom_post_init() {
        let mut device = Recorder { calls: Vec::new() };
        Board::Sxrom.post_init(&mut device).unwrap();
        assert_eq!(device.calls, vec![(3, 0x1C04, 0x9FFF, 1)]);
    }

    #[test]
    fn test_nrom_selects_are_noops() {
        let mut device = Recorder { calls: Vec::new() };
        Board::Nrom.set_prg_bank(&mut device, 1).unwrap();
        Board::Nrom.set_chr_bank(&mut device, 1).unwrap();
        assert!(device.calls.is_empty());
    }
}
