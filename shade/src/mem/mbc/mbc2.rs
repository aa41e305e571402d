use serde::Deserialize;
use serde::Serialize;
use serde_with::serde_as;

use super::Controller;
use super::ram_enable_value;
use super::rom_byte;

/// The number of half-bytes built into the chip.
const MBC2_RAM_SIZE: usize = 512;

#[serde_as]
#[derive(Debug, Hash, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MBC2 {
    #[serde_as(as = "serde_with::Bytes")]
    rom: Vec<u8>,
    /// Only the low nibble of each byte is wired up.
    #[serde_as(as = "serde_with::Bytes")]
    ram: Vec<u8>,
    ram_enabled: bool,
    /// Four bits, never zero
    rom_bank: u8,
}

impl MBC2 {
    pub fn new(rom: Vec<u8>) -> Self {
        Self {
            rom,
            ram: vec![0; MBC2_RAM_SIZE],
            ram_enabled: false,
            rom_bank: 1,
        }
    }

    pub fn rom_bank(&self) -> usize {
        self.rom_bank as usize
    }
}

impl Controller for MBC2 {
    fn read_rom(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, 0, addr)
    }

    fn read_upper_rom(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, self.rom_bank(), addr)
    }

    fn read_external(&self, addr: u16) -> u8 {
        if self.ram_enabled {
            0xF0 | self.ram[addr as usize % MBC2_RAM_SIZE]
        } else {
            0xFF
        }
    }

    fn write_external(&mut self, addr: u16, val: u8) {
        if self.ram_enabled {
            self.ram[addr as usize % MBC2_RAM_SIZE] = val & 0x0F;
        }
    }

    fn write_control(&mut self, addr: u16, val: u8) {
        // The upper half of the ROM space has no registers
        if addr >= 0x4000 {
            return;
        }
        // Bit 8 of the address picks the register
        if addr & 0x0100 == 0 {
            self.ram_enabled = ram_enable_value(val);
        } else {
            self.rom_bank = std::cmp::max(val & 0x0F, 1);
        }
    }

    fn ram(&self) -> &[u8] {
        &self.ram
    }

    fn ram_mut(&mut self) -> &mut [u8] {
        &mut self.ram
    }
}
