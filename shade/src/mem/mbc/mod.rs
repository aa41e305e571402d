use serde::Deserialize;
use serde::Serialize;
use tracing::info;

mod direct;
mod mbc1;
mod mbc2;
mod mbc3;
mod mbc5;

pub use direct::*;
pub use mbc1::*;
pub use mbc2::*;
pub use mbc3::*;
pub use mbc5::*;

use crate::error::CartridgeError;
use crate::error::SaveError;
use crate::rom::CartridgeHeader;
use crate::rom::CartridgeKind;
use crate::rom::MbcKind;

/// The size of a ROM banks, 16 KiB.
pub const ROM_BANK_SIZE: usize = 16 * 1024;

/// The size of a RAM banks, 8 KiB.
pub const RAM_BANK_SIZE: usize = 8 * 1024;

/// The interface every bank controller presents to the cartridge slot.
trait Controller {
    /// Reads from 0x0000-0x3FFF.
    fn read_rom(&self, addr: u16) -> u8;

    /// Reads from 0x4000-0x7FFF.
    fn read_upper_rom(&self, addr: u16) -> u8;

    /// Reads from 0xA000-0xBFFF.
    fn read_external(&self, addr: u16) -> u8;

    /// Writes to 0xA000-0xBFFF.
    fn write_external(&mut self, addr: u16, val: u8);

    /// Writes to 0x0000-0x7FFF, which land in the controller's registers.
    fn write_control(&mut self, addr: u16, val: u8);

    fn ram(&self) -> &[u8];

    fn ram_mut(&mut self) -> &mut [u8];
}

#[derive(Debug, Hash, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryBankController {
    /// There is no external MBC. The game ROM is mapped into the 32 KiB that starts at 0x0000 and
    /// extends to 0x7FFF. An additional 8 KiB of RAM could be connected. This 8 KiB starts at
    /// 0xA000 and extends to 0xBFFF.
    ///
    /// See the Pan Docs [here](https://gbdev.io/pandocs/nombc.html).
    Direct(Direct),
    /// This memory controller is the first MBC chip. It supports up to 2 MiB of ROM and 32 KiB of
    /// RAM, but not both at once.
    ///
    /// See the Pan Docs [here](https://gbdev.io/pandocs/MBC1.html).
    MBC1(MBC1),
    /// A small controller with 512 half-bytes of RAM built in.
    ///
    /// See the Pan Docs [here](https://gbdev.io/pandocs/MBC2.html).
    MBC2(MBC2),
    /// Up to 2 MiB of ROM, 32 KiB of RAM, and optionally a real time clock.
    ///
    /// See the Pan Docs [here](https://gbdev.io/pandocs/MBC3.html).
    MBC3(MBC3),
    /// Up to 8 MiB of ROM and 128 KiB of RAM.
    ///
    /// See the Pan Docs [here](https://gbdev.io/pandocs/MBC5.html).
    MBC5(MBC5),
}

impl MemoryBankController {
    fn controller(&self) -> &dyn Controller {
        match self {
            MemoryBankController::Direct(c) => c,
            MemoryBankController::MBC1(c) => c,
            MemoryBankController::MBC2(c) => c,
            MemoryBankController::MBC3(c) => c,
            MemoryBankController::MBC5(c) => c,
        }
    }

    fn controller_mut(&mut self) -> &mut dyn Controller {
        match self {
            MemoryBankController::Direct(c) => c,
            MemoryBankController::MBC1(c) => c,
            MemoryBankController::MBC2(c) => c,
            MemoryBankController::MBC3(c) => c,
            MemoryBankController::MBC5(c) => c,
        }
    }
}

/// A cartridge: the parsed header plus the bank controller that owns the ROM and external RAM.
#[derive(Debug, Hash, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cartridge {
    header: CartridgeHeader,
    kind: CartridgeKind,
    mbc: MemoryBankController,
}

impl Cartridge {
    /// Builds a cartridge from a ROM image. Images shorter than the header declares are padded
    /// with zeros.
    pub fn new(mut rom: Vec<u8>) -> Result<Self, CartridgeError> {
        let header = CartridgeHeader::extract_from_rom(&rom)?;
        let kind = header.kind()?;
        let rom_len = header.rom_len()?;
        let ram_len = if kind.ram { header.ram_len()? } else { 0 };
        // Never less than the two banks the address space shows at once.
        let banks = rom_len.max(rom.len()).div_ceil(ROM_BANK_SIZE).max(2);
        rom.resize(banks * ROM_BANK_SIZE, 0);
        info!(
            "Loaded \"{}\": {} with {banks} ROM banks and {ram_len} bytes of RAM",
            header.title, kind.mbc
        );
        let mbc = match kind.mbc {
            MbcKind::Direct => MemoryBankController::Direct(Direct::new(rom, ram_len)),
            MbcKind::MBC1 => MemoryBankController::MBC1(MBC1::new(rom, ram_len)),
            MbcKind::MBC2 => MemoryBankController::MBC2(MBC2::new(rom)),
            MbcKind::MBC3 => MemoryBankController::MBC3(MBC3::new(rom, ram_len, kind.rtc)),
            MbcKind::MBC5 => MemoryBankController::MBC5(MBC5::new(rom, ram_len, kind.rumble)),
        };
        Ok(Self { header, kind, mbc })
    }

    pub fn header(&self) -> &CartridgeHeader {
        &self.header
    }

    pub fn kind(&self) -> CartridgeKind {
        self.kind
    }

    pub fn mbc(&self) -> &MemoryBankController {
        &self.mbc
    }

    /// Whether external RAM survives power off, i.e. should be saved.
    pub fn has_battery(&self) -> bool {
        self.kind.battery
    }

    pub fn read_rom(&self, addr: u16) -> u8 {
        self.mbc.controller().read_rom(addr)
    }

    pub fn read_upper_rom(&self, addr: u16) -> u8 {
        self.mbc.controller().read_upper_rom(addr)
    }

    /// Reads external RAM (or RTC registers). Returns 0xFF when RAM is disabled or missing.
    pub fn read_external(&self, addr: u16) -> u8 {
        self.mbc.controller().read_external(addr)
    }

    /// Writes external RAM (or RTC registers). Ignored when RAM is disabled or missing.
    pub fn write_external(&mut self, addr: u16, val: u8) {
        self.mbc.controller_mut().write_external(addr, val)
    }

    /// Writes into the ROM address space, which programs the controller's registers.
    pub fn write_to_rom(&mut self, addr: u16, val: u8) {
        self.mbc.controller_mut().write_control(addr, val)
    }

    /// The full contents of external RAM.
    pub fn external_ram(&self) -> &[u8] {
        self.mbc.controller().ram()
    }

    /// Restores external RAM from save data. The data must be the exact size of the cart's RAM.
    pub fn load_external_ram(&mut self, data: &[u8]) -> Result<(), SaveError> {
        let ram = self.mbc.controller_mut().ram_mut();
        if ram.len() != data.len() {
            return Err(SaveError::WrongLength {
                expected: ram.len(),
                found: data.len(),
            });
        }
        ram.copy_from_slice(data);
        Ok(())
    }
}

/// Reads a byte out of the given ROM bank. Bank numbers past the end of the ROM wrap.
fn rom_byte(rom: &[u8], bank: usize, addr: u16) -> u8 {
    let banks = rom.len() / ROM_BANK_SIZE;
    rom[(bank % banks) * ROM_BANK_SIZE + (addr as usize & (ROM_BANK_SIZE - 1))]
}

/// The index into external RAM for an address in the given bank, or `None` if there is no RAM.
/// Banks and addresses past the end of RAM wrap.
fn ram_index(ram: &[u8], bank: usize, addr: u16) -> Option<usize> {
    (!ram.is_empty())
        .then(|| (bank * RAM_BANK_SIZE + (addr as usize & (RAM_BANK_SIZE - 1))) % ram.len())
}

/// The RAM enable register on every MBC. RAM is enabled when the lower 4 bits are 0xA.
fn ram_enable_value(val: u8) -> bool {
    val & 0x0F == 0x0A
}
