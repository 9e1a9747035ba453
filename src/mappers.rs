//! Static iNES mapper table.
//!
//! Maps a mapper number to its display name, the size of its switchable
//! bank, and how many banks sit fixed at the top of CPU address space.
//! A bank size of -1 means the mapper has too many submapper variants for
//! a single answer and the user must supply `--bank-size`.

/// Facts about one mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperInfo {
    /// Board family name.
    pub name: &'static str,
    /// Switchable bank size in KB, or -1 when submapper-dependent.
    pub bank_kb: i32,
    /// Banks fixed (non-swappable) at the end of PRG-ROM space.
    pub fixed_banks: i32,
}

const fn m(name: &'static str, bank_kb: i32, fixed_banks: i32) -> MapperInfo {
    MapperInfo {
        name,
        bank_kb,
        fixed_banks,
    }
}

/// Mapper table in mapper-number order.
pub const MAPPERS: &[(u16, MapperInfo)] = &[
    (0, m("NROM", 16, 2)),
    // Technically 0 fixed, but most configurations use 1
    (1, m("SxROM, MMC1", 16, 1)),
    (2, m("UxROM", 16, 1)),
    (3, m("CNROM", 16, 2)),
    (4, m("TxROM, MMC3, MMC6", 8, 2)),
    (5, m("ExROM, MMC5", 8, 0)),
    (7, m("AxROM", 32, 0)),
    (9, m("PxROM, MMC2", 8, 3)),
    (10, m("FxROM, MMC4", 16, 1)),
    (11, m("Color Dreams", 32, 0)),
    (13, m("CPROM", 16, 2)),
    (15, m("100-in-1 Contra Function 16 Multicart", 8, 0)),
    // Too many submappers
    (16, m("Bandai EPROM (24C02)", -1, 0)),
    (18, m("Jaleco SS8806", 8, 1)),
    (19, m("Namco 163", 8, 1)),
    (21, m("VRC4a, VRC4c", 8, 2)),
    (22, m("VRC2a", 8, 2)),
    (23, m("VRC2b, VRC4e", 8, 2)),
    (24, m("VRC6a", 8, 1)),
    (25, m("VRC4b, VRC4d", 8, 2)),
    (26, m("VRC6b", 8, 1)),
    (34, m("BNROM, NINA-001", 32, 0)),
    (64, m("RAMBO-1 (MMC3 clone with extra features)", 8, 1)),
    (66, m("GxROM, MxROM", 32, 0)),
    (68, m("After Burner", 16, 1)),
    (69, m("FME-7, Sunsoft 5B", 8, 1)),
    (71, m("Camerica/Codemasters (Similar to UNROM)", 16, 1)),
    (73, m("VRC3", 16, 1)),
    (74, m("Pirate MMC3 derivative", 8, 2)),
    (75, m("VRC1", 8, 1)),
    (76, m("Namco 109 variant", 8, 2)),
    (79, m("NINA-03/NINA-06", 32, 0)),
    (85, m("VRC7", 8, 1)),
    (86, m("JALECO-JF-13", 32, 0)),
    (94, m("Senjou no Ookami", 16, 1)),
    (105, m("NES-EVENT (Similar to MMC1)", 16, 0)),
    (113, m("NINA-03/NINA-06?? (For multicarts including mapper 79 games.)", 32, 0)),
    (118, m("TxSROM, MMC3 (MMC3 with independent mirroring control)", 8, 2)),
    (119, m("TQROM, MMC3 (Has both CHR ROM and CHR RAM)", 8, 2)),
    (159, m("Bandai EPROM (24C01)", -1, -1)),
    (166, m("SUBOR", 8, 0)),
    (167, m("SUBOR", 8, 0)),
    // Fixed first bank
    (180, m("Crazy Climber", 16, 1)),
    (185, m("CNROM with protection diodes", 16, 2)),
    (192, m("Pirate MMC3 derivative", 8, 2)),
    (206, m("DxROM, Namco 118 / MIMIC-1", 8, 2)),
    (210, m("Namco 175 and 340 (Namco 163 with different mirroring)", 8, 1)),
    (228, m("Action 52", 16, 0)),
    (232, m("Camerica/Codemasters Quattro (Multicarts)", 16, 0)),
];

/// Look up a mapper by number.
pub fn lookup(mapper: u16) -> Option<&'static MapperInfo> {
    MAPPERS
        .binary_search_by_key(&mapper, |&(n, _)| n)
        .ok()
        .map(|i| &MAPPERS[i].1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sorted() {
        for pair in MAPPERS.windows(2) {
            assert!(pair[0].0 < pair[1].0);
        }
    }

    #[test]
    fn test_common_mappers() {
        let nrom = lookup(0).unwrap();
        assert_eq!(nrom.name, "NROM");
        assert_eq!(nrom.bank_kb, 16);
        assert_eq!(nrom.fixed_banks, 2);

        let mmc3 = lookup(4).unwrap();
        assert_eq!(mmc3.bank_kb, 8);
        assert_eq!(mmc3.fixed_banks, 2);

        let axrom = lookup(7).unwrap();
        assert_eq!(axrom.bank_kb, 32);
        assert_eq!(axrom.fixed_banks, 0);
    }

    #[test]
    fn test_submapper_dependent() {
        assert_eq!(lookup(16).unwrap().bank_kb, -1);
        assert_eq!(lookup(159).unwrap().bank_kb, -1);
    }

    #[test]
    fn test_unknown_mapper() {
        assert!(lookup(6).is_none());
        assert!(lookup(255).is_none());
    }
}
