use derive_more::{Display, Error};

/// Problems found while turning a ROM image into a [`Cartridge`](crate::mem::mbc::Cartridge).
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Display, Error)]
pub enum CartridgeError {
    #[display("unsupported cartridge type 0x{code:0>2X}")]
    UnsupportedType { code: u8 },
    #[display("ROM image is {len} bytes, too small to hold a cartridge header")]
    RomTooSmall { len: usize },
    #[display("unknown ROM size code 0x{code:0>2X}")]
    UnknownRomSize { code: u8 },
    #[display("unknown RAM size code 0x{code:0>2X}")]
    UnknownRamSize { code: u8 },
}

/// Conditions that stop the CPU. Both are fatal for the running program; the core does not try to
/// recover from them.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Display, Error)]
pub enum EmulationError {
    #[display("illegal opcode 0x{opcode:0>2X} at 0x{pc:0>4X}")]
    IllegalOpcode { opcode: u8, pc: u16 },
    #[display("illegal prefixed opcode 0xCB 0x{opcode:0>2X} at 0x{pc:0>4X}")]
    IllegalPrefixedOpcode { opcode: u8, pc: u16 },
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Display, Error)]
pub enum SaveError {
    #[display("save data is {found} bytes but the cartridge has {expected} bytes of RAM")]
    WrongLength { expected: usize, found: usize },
}
