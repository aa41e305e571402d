use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::error::CartridgeError;

/// This struct represents a ROM header. Per the Pan Docs, the header of the ROM occupies the
/// region between `0x100` and `0x14F`.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartridgeHeader {
    /// The memory region between `0x134` and `0x143`, with trailing NULs removed. Newer carts
    /// reuse the tail of this region for other codes, so non-printable bytes are dropped as well.
    pub title: String,
    /// The unsigned byte at `0x143`.
    pub cgb: u8,
    /// The unsigned byte at `0x146`.
    pub sgb: u8,
    /// The unsigned byte at `0x147`. Identifies the MBC and what is wired up to it.
    pub cartridge_type: u8,
    /// The unsigned byte at `0x148`. Communicates the length of the ROM as a multiple of 32 KiB,
    /// i.e. `32 KiB << rom_size`.
    pub rom_size: u8,
    /// The unsigned byte at `0x149`.
    pub ram_size: u8,
    /// The unsigned byte at `0x14A`. Zero is "Japan-only" and one is "overseas".
    pub destination: u8,
    /// The unsigned byte at `0x14C`.
    pub mask_rom_version: u8,
    /// The unsigned byte at `0x14D`. On start, the boot ROM checksums `0x134..=0x14C` and refuses
    /// to start the cart if it does not match this.
    pub header_checksum: u8,
    /// The big endian word at `0x14E`. Nothing checks this.
    pub global_checksum: u16,
}

/// The MBC chip on a cartridge.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum MbcKind {
    #[display("ROM only")]
    Direct,
    MBC1,
    MBC2,
    MBC3,
    MBC5,
}

/// What the cartridge type byte says is on the board.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartridgeKind {
    pub mbc: MbcKind,
    pub ram: bool,
    pub battery: bool,
    pub rtc: bool,
    pub rumble: bool,
}

impl CartridgeKind {
    const fn new(mbc: MbcKind) -> Self {
        Self {
            mbc,
            ram: false,
            battery: false,
            rtc: false,
            rumble: false,
        }
    }

    const fn ram(mut self) -> Self {
        self.ram = true;
        self
    }

    const fn battery(mut self) -> Self {
        self.battery = true;
        self
    }

    const fn rtc(mut self) -> Self {
        self.rtc = true;
        self
    }

    const fn rumble(mut self) -> Self {
        self.rumble = true;
        self
    }

    /// Decodes the cartridge type byte at `0x147`.
    pub fn from_code(code: u8) -> Result<Self, CartridgeError> {
        use MbcKind::*;

        let kind = match code {
            0x00 => Self::new(Direct),
            0x08 => Self::new(Direct).ram(),
            0x09 => Self::new(Direct).ram().battery(),
            0x01 => Self::new(MBC1),
            0x02 => Self::new(MBC1).ram(),
            0x03 => Self::new(MBC1).ram().battery(),
            // MBC2 RAM is built into the chip
            0x05 => Self::new(MBC2).ram(),
            0x06 => Self::new(MBC2).ram().battery(),
            0x0F => Self::new(MBC3).rtc().battery(),
            0x10 => Self::new(MBC3).rtc().ram().battery(),
            0x11 => Self::new(MBC3),
            0x12 => Self::new(MBC3).ram(),
            0x13 => Self::new(MBC3).ram().battery(),
            0x19 => Self::new(MBC5),
            0x1A => Self::new(MBC5).ram(),
            0x1B => Self::new(MBC5).ram().battery(),
            0x1C => Self::new(MBC5).rumble(),
            0x1D => Self::new(MBC5).rumble().ram(),
            0x1E => Self::new(MBC5).rumble().ram().battery(),
            code => return Err(CartridgeError::UnsupportedType { code }),
        };
        Ok(kind)
    }
}

impl CartridgeHeader {
    pub const START_ADDR: usize = 0x100;
    pub const END_ADDR: usize = 0x14F;
    pub const LENGTH: usize = Self::END_ADDR - Self::START_ADDR + 1;

    pub fn extract_from_rom(rom: &[u8]) -> Result<Self, CartridgeError> {
        if rom.len() <= Self::END_ADDR {
            return Err(CartridgeError::RomTooSmall { len: rom.len() });
        }
        let title = rom[0x134..=0x143]
            .iter()
            .take_while(|&&b| b != 0)
            .filter(|b| b.is_ascii_graphic() || **b == b' ')
            .map(|&b| b as char)
            .collect();
        let header = Self {
            title,
            cgb: rom[0x143],
            sgb: rom[0x146],
            cartridge_type: rom[0x147],
            rom_size: rom[0x148],
            ram_size: rom[0x149],
            destination: rom[0x14A],
            mask_rom_version: rom[0x14C],
            header_checksum: rom[0x14D],
            global_checksum: u16::from_be_bytes([rom[0x14E], rom[0x14F]]),
        };
        let computed = Self::compute_checksum(rom);
        if computed != header.header_checksum {
            warn!(
                "Header checksum mismatch: expected 0x{:0>2X}, computed 0x{computed:0>2X}",
                header.header_checksum
            );
        }
        Ok(header)
    }

    /// The boot ROM's header checksum over `0x134..=0x14C`.
    pub fn compute_checksum(rom: &[u8]) -> u8 {
        rom[0x134..=0x14C]
            .iter()
            .fold(0u8, |acc, b| acc.wrapping_sub(*b).wrapping_sub(1))
    }

    pub fn kind(&self) -> Result<CartridgeKind, CartridgeError> {
        CartridgeKind::from_code(self.cartridge_type)
    }

    /// The number of bytes of ROM the header declares.
    pub fn rom_len(&self) -> Result<usize, CartridgeError> {
        match self.rom_size {
            code @ 0x00..=0x08 => Ok((32 * 1024) << code),
            code => Err(CartridgeError::UnknownRomSize { code }),
        }
    }

    /// The number of bytes of external RAM the header declares. MBC2 always reports zero here.
    pub fn ram_len(&self) -> Result<usize, CartridgeError> {
        match self.ram_size {
            0x00 => Ok(0),
            0x01 => Ok(2 * 1024),
            0x02 => Ok(8 * 1024),
            0x03 => Ok(32 * 1024),
            0x04 => Ok(128 * 1024),
            0x05 => Ok(64 * 1024),
            code => Err(CartridgeError::UnknownRamSize { code }),
        }
    }
}
