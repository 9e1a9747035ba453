//! INLRetro control-transfer protocol constants.
//!
//! Every exchange with the dumper is a vendor device-to-host control
//! transfer: bRequest selects an operation category, wValue carries the
//! sub-operation in its low byte with an optional 8-bit operand
//! piggy-backed in the high byte, and wIndex carries an address. The first
//! byte of the response is a status code (0 = success); anything after it
//! is payload.

/// bmRequestType for every dumper transfer: device-to-host, vendor, device.
pub const REQUEST_TYPE: u8 = 0xC0;

/// Payload size of one buffer read.
pub const PAYLOAD_SIZE: usize = 128;

/// Operation categories, sent as bRequest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Category {
    /// Pin-level IO and console-family init.
    Io = 2,
    /// NES cartridge bus operations.
    Nes = 3,
    /// SNES cartridge bus operations.
    Snes = 4,
    /// Streaming-buffer management.
    Buffer = 5,
    /// USB housekeeping.
    Usb = 6,
    /// Firmware operation state.
    Oper = 7,
}

/// Pack a sub-operation id and its 8-bit operand into wValue.
pub fn with_data(op: u8, data: u8) -> u16 {
    u16::from(op) | (u16::from(data) << 8)
}

/// IO category sub-operations.
pub mod io {
    /// Reset all pins to an idle state.
    pub const IO_RESET: u8 = 0x00;
    /// Configure the bus for an NES cartridge.
    pub const NES_INIT: u8 = 0x01;
}

/// NES category sub-operations.
pub mod nes {
    /// Discrete-board PRG-ROM write latched on EXP0.
    pub const DISCRETE_EXP0_PRGROM_WR: u8 = 0x00;
    /// PPU bus write.
    pub const NES_PPU_WR: u8 = 0x01;
    /// Generic CPU write with M2 toggling, A15 decoded to /ROMSEL.
    pub const NES_CPU_WR: u8 = 0x02;
    /// Serial write to an MMC1 register.
    pub const NES_MMC1_WR: u8 = 0x04;
    /// Dual-port RAM write.
    pub const NES_DUALPORT_WR: u8 = 0x05;
    /// CPU bus read, paced like the console.
    pub const EMULATE_NES_CPU_RD: u8 = 0x80;
    /// CPU bus read.
    pub const NES_CPU_RD: u8 = 0x81;
    /// PPU bus read.
    pub const NES_PPU_RD: u8 = 0x82;
    /// Sense CIRAM A10 mirroring.
    pub const CIRAM_A10_MIRROR: u8 = 0x83;
}

/// Buffer category sub-operations.
pub mod buffer {
    /// Clear the raw buffer state.
    pub const RAW_BUFFER_RESET: u8 = 0x00;
    /// Set a buffer's memory type and partition address.
    pub const SET_MEM_N_PART: u8 = 0x30;
    /// Set a buffer's address multiplier.
    pub const SET_MULT_N_ADDMULT: u8 = 0x31;
    /// Set a buffer's mapper and mapper-variable address.
    pub const SET_MAP_N_MAPVAR: u8 = 0x32;
    /// Poll the current buffer status.
    pub const GET_CUR_BUFF_STATUS: u8 = 0x61;
    /// Read one payload from the buffer endpoint.
    pub const BUFF_PAYLOAD: u8 = 0x70;
    /// Allocate buffer 0; operand carries the payload id.
    pub const ALLOCATE_BUFFER0: u8 = 0x80;
    /// Allocate buffer 1.
    pub const ALLOCATE_BUFFER1: u8 = 0x81;
    /// Set buffer 0's reload page count.
    pub const SET_RELOAD_PAGENUM0: u8 = 0x90;
    /// Set buffer 1's reload page count.
    pub const SET_RELOAD_PAGENUM1: u8 = 0x91;
}

/// Oper category sub-operations.
pub mod oper {
    /// Set the firmware operation state; the state goes in wIndex.
    pub const SET_OPERATION: u8 = 0x00;
    /// Operation state: idle, accepting buffer configuration.
    pub const STATE_SETUP: u16 = 0x0001;
    /// Operation state: streaming the configured buffers.
    pub const STATE_STREAMING: u16 = 0x00D2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_data_packing() {
        assert_eq!(with_data(buffer::ALLOCATE_BUFFER0, 4), 0x0480);
        assert_eq!(with_data(nes::NES_MMC1_WR, 0x1C), 0x1C04);
        assert_eq!(with_data(io::IO_RESET, 0), 0x0000);
        assert_eq!(with_data(0xFF, 0xFF), 0xFFFF);
    }

    #[test]
    fn test_category_codes() {
        assert_eq!(Category::Io as u8, 2);
        assert_eq!(Category::Nes as u8, 3);
        assert_eq!(Category::Buffer as u8, 5);
        assert_eq!(Category::Oper as u8, 7);
    }
}
