//! INLRetro cartridge dumper driver.
//!
//! The driver speaks to the dumper hardware through a single primitive, a
//! vendor control transfer, abstracted as [`ControlDevice`] so the USB
//! stack stays outside this crate and tests can substitute a simulated
//! cartridge. The device handle is an explicit value owned by the driver;
//! there is no process-wide state.
//!
//! Dumping is strictly sequential: select a bank on the mapper, prime the
//! firmware's streaming buffers, then read 128-byte payloads until the
//! bank is drained. A full dump is verified by MD5 against a caller-
//! supplied set of known digests, with one re-read to tell a bad seat
//! from a miscatalogued cartridge.

pub mod boards;
pub mod protocol;

pub use boards::Board;

use crate::error::{DisasmError, Result};
use crate::header::Header;
use protocol::{buffer, io, oper, with_data, Category, PAYLOAD_SIZE};
use std::collections::HashSet;

/// Upper bound on PRG banks when the size is unknown.
const PRG_BANK_CEILING: u32 = 256;

/// Upper bound on CHR banks when the size is unknown.
const CHR_BANK_CEILING: u32 = 1024;

/// Buffer partition address for PRG dumps.
const PRG_PARTITION: u16 = 0x20DD;

/// Buffer partition address for CHR dumps.
const CHR_PARTITION: u16 = 0x21DD;

/// Mapper-variable address for PRG dumps.
const PRG_MAPVAR: u16 = 0x0800;

/// Mapper-variable address for CHR dumps.
const CHR_MAPVAR: u16 = 0x0000;

/// The dumper's one hardware primitive: a vendor device-to-host control
/// transfer (bmRequestType 0xC0). `request` selects the operation
/// category, `value` and `index` carry the operation and its address, and
/// `length` is the expected response size. Implementations return the raw
/// response bytes; the first byte is the device status.
pub trait ControlDevice {
    /// Issue one control transfer and return the response.
    fn control_transfer(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        length: u16,
    ) -> Result<Vec<u8>>;
}

/// Issue a command transfer and check the status byte.
pub(crate) fn command<D: ControlDevice>(
    device: &mut D,
    category: Category,
    value: u16,
    index: u16,
    length: u16,
) -> Result<()> {
    let response = device.control_transfer(category as u8, value, index, length)?;
    match response.first().copied() {
        Some(0) => Ok(()),
        Some(code) => Err(DisasmError::Transport { code }),
        None => Err(DisasmError::Transport { code: u8::MAX }),
    }
}

/// Driver for one attached cartridge.
#[derive(Debug)]
pub struct InlRetro<D: ControlDevice> {
    device: D,
    board: Board,
    mapper: u16,
    prg_size: Option<u32>,
    chr_size: Option<u32>,
}

impl<D: ControlDevice> InlRetro<D> {
    /// Initialize the dumper for a cartridge on the given mapper.
    ///
    /// `prg_size` and `chr_size` are in KB; pass `None` to auto-detect
    /// during the dump. Fails when no board driver exists for the mapper.
    pub fn new(
        device: D,
        mapper: u16,
        prg_size: Option<u32>,
        chr_size: Option<u32>,
    ) -> Result<Self> {
        let board = Board::for_mapper(mapper)?;
        let mut dumper = Self {
            device,
            board,
            mapper,
            prg_size,
            chr_size,
        };
        command(
            &mut dumper.device,
            Category::Io,
            with_data(io::IO_RESET, 0),
            0x0000,
            1,
        )?;
        command(
            &mut dumper.device,
            Category::Io,
            with_data(io::NES_INIT, 0),
            0x0000,
            1,
        )?;
        board.post_init(&mut dumper.device)?;
        tracing::info!("ready to read {} board", board.name());
        Ok(dumper)
    }

    /// The board driver in use.
    pub fn board(&self) -> Board {
        self.board
    }

    /// PRG size in KB, once known.
    pub fn prg_size(&self) -> Option<u32> {
        self.prg_size
    }

    /// CHR size in KB, once known.
    pub fn chr_size(&self) -> Option<u32> {
        self.chr_size
    }

    /// An iNES header describing the dumped cartridge.
    pub fn header(&self) -> Header {
        Header::for_dump(
            self.mapper,
            self.prg_size.unwrap_or(0),
            self.chr_size.unwrap_or(0),
        )
    }

    /// Prime the firmware's two streaming buffers for a bank read.
    fn init_dump(&mut self, partition: u16, mapvar: u16) -> Result<()> {
        let device = &mut self.device;
        command(device, Category::Oper, u16::from(oper::SET_OPERATION), oper::STATE_SETUP, 1)?;
        command(device, Category::Buffer, with_data(buffer::RAW_BUFFER_RESET, 0), 0x0000, 1)?;
        command(device, Category::Buffer, with_data(buffer::ALLOCATE_BUFFER0, 4), 0x0000, 1)?;
        command(device, Category::Buffer, with_data(buffer::ALLOCATE_BUFFER1, 4), 0x8004, 1)?;
        command(device, Category::Buffer, with_data(buffer::SET_RELOAD_PAGENUM0, 1), 0x0000, 1)?;
        command(device, Category::Buffer, with_data(buffer::SET_RELOAD_PAGENUM1, 1), 0x0000, 1)?;
        command(device, Category::Buffer, with_data(buffer::SET_MEM_N_PART, 0), partition, 1)?;
        command(device, Category::Buffer, with_data(buffer::SET_MEM_N_PART, 1), partition, 1)?;
        command(device, Category::Buffer, with_data(buffer::SET_MAP_N_MAPVAR, 0), mapvar, 1)?;
        command(device, Category::Buffer, with_data(buffer::SET_MAP_N_MAPVAR, 1), mapvar, 1)?;
        command(device, Category::Oper, u16::from(oper::SET_OPERATION), oper::STATE_STREAMING, 1)?;
        Ok(())
    }

    /// Read one 128-byte payload from the buffer endpoint.
    fn read_payload(&mut self) -> Result<Vec<u8>> {
        self.device.control_transfer(
            Category::Buffer as u8,
            with_data(buffer::BUFF_PAYLOAD, 0),
            0x0000,
            PAYLOAD_SIZE as u16,
        )
    }

    /// Drain one bank's worth of payloads into `out`.
    fn stream(&mut self, out: &mut Vec<u8>, bank_kb: u32) -> Result<()> {
        for _ in 0..bank_kb * 8 {
            command(
                &mut self.device,
                Category::Buffer,
                with_data(buffer::GET_CUR_BUFF_STATUS, 0),
                0x0000,
                3,
            )?;
            let payload = self.read_payload()?;
            out.extend_from_slice(&payload);
        }
        Ok(())
    }

    /// Dump one PRG bank.
    pub fn dump_prg_bank(&mut self, bank: u16) -> Result<Vec<u8>> {
        let (prg_kb, _) = self.board.banks();
        let board = self.board;
        board.set_prg_bank(&mut self.device, bank)?;
        self.init_dump(PRG_PARTITION, PRG_MAPVAR)?;
        let mut out = Vec::with_capacity(prg_kb as usize * 1024);
        self.stream(&mut out, prg_kb)?;
        Ok(out)
    }

    /// Dump one CHR bank.
    pub fn dump_chr_bank(&mut self, bank: u16) -> Result<Vec<u8>> {
        let (_, chr_kb) = self.board.banks();
        let board = self.board;
        board.set_chr_bank(&mut self.device, bank)?;
        self.init_dump(CHR_PARTITION, CHR_MAPVAR)?;
        let mut out = Vec::with_capacity(chr_kb as usize * 1024);
        self.stream(&mut out, chr_kb)?;
        Ok(out)
    }

    /// Dump the whole cartridge: PRG then CHR.
    ///
    /// When a size was not supplied, banks are dumped up to a ceiling and
    /// the dump truncates at the first power-of-two bank index whose hash
    /// repeats an earlier bank: bank counts on real hardware are powers of
    /// two, so unmapped select bits alias back to bank zero.
    pub fn dump_full(&mut self) -> Result<Vec<u8>> {
        let (prg_kb, chr_kb) = self.board.banks();
        let mut image = Vec::new();
        let mut seen: HashSet<[u8; 16]> = HashSet::new();

        let prg_banks = match self.prg_size {
            Some(kb) => kb / prg_kb,
            None => PRG_BANK_CEILING,
        };
        tracing::info!("dumping PRG ROM");
        for bank in 0..prg_banks {
            let bytes = self.dump_prg_bank(bank as u16)?;
            let digest = md5_digest(&bytes);
            if self.prg_size.is_none() && bank.is_power_of_two() && seen.contains(&digest) {
                tracing::info!("duplicated bank, stopping PRG dump");
                self.prg_size = Some(bank * prg_kb);
                break;
            }
            seen.insert(digest);
            image.extend_from_slice(&bytes);
        }
        if self.prg_size.is_none() {
            self.prg_size = Some(prg_banks * prg_kb);
        }

        if self.chr_size == Some(0) {
            return Ok(image);
        }
        let chr_banks = match self.chr_size {
            Some(kb) => kb / chr_kb,
            None => CHR_BANK_CEILING,
        };
        seen.clear();
        tracing::info!("dumping CHR ROM");
        for bank in 0..chr_banks {
            let bytes = self.dump_chr_bank(bank as u16)?;
            let digest = md5_digest(&bytes);
            if self.chr_size.is_none() && bank.is_power_of_two() && seen.contains(&digest) {
                tracing::info!("duplicated bank, stopping CHR dump");
                self.chr_size = Some(bank * chr_kb);
                break;
            }
            seen.insert(digest);
            image.extend_from_slice(&bytes);
        }
        if self.chr_size.is_none() {
            self.chr_size = Some(chr_banks * chr_kb);
        }
        Ok(image)
    }

    /// Dump the cartridge and verify the image against known digests.
    ///
    /// On a digest miss the cartridge is read a second time: two agreeing
    /// reads mean an unknown (possibly miscatalogued) image, two
    /// disagreeing reads mean the cartridge is not seated properly.
    pub fn dump_and_verify(&mut self, known: &HashSet<String>) -> Result<Vec<u8>> {
        let image = self.dump_full()?;
        let digest = hex::encode(md5_digest(&image));
        tracing::info!("hash: {digest}");
        if known.contains(&digest) {
            tracing::info!("matched known hash");
            return Ok(image);
        }
        tracing::warn!("did not match a known hash, rereading");
        let reread = self.dump_full()?;
        let reread_digest = hex::encode(md5_digest(&reread));
        tracing::info!("hash: {reread_digest}");
        if reread_digest == digest {
            Err(DisasmError::UnknownHash { digest })
        } else {
            Err(DisasmError::HashMismatch)
        }
    }
}

/// MD5 of a byte slice.
fn md5_digest(data: &[u8]) -> [u8; 16] {
    use md5::{Digest, Md5};
    let mut hasher = Md5::new();
    hasher.update(data);
    hasher.finalize().into()
}
