use serde::Deserialize;
use serde::Serialize;
use serde_with::serde_as;

use super::Controller;
use super::ram_index;
use super::rom_byte;

/// A cartridge with no bank switching. Writes to the ROM region go nowhere.
#[serde_as]
#[derive(Debug, Hash, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Direct {
    /// At least 32 KiB
    #[serde_as(as = "serde_with::Bytes")]
    rom: Vec<u8>,
    /// Zero or 8 KiB, always accessible
    #[serde_as(as = "serde_with::Bytes")]
    ram: Vec<u8>,
}

impl Direct {
    pub fn new(rom: Vec<u8>, ram_size: usize) -> Self {
        Self {
            rom,
            ram: vec![0; ram_size],
        }
    }
}

impl Controller for Direct {
    fn read_rom(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, 0, addr)
    }

    fn read_upper_rom(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, 1, addr)
    }

    fn read_external(&self, addr: u16) -> u8 {
        ram_index(&self.ram, 0, addr).map_or(0xFF, |i| self.ram[i])
    }

    fn write_external(&mut self, addr: u16, val: u8) {
        if let Some(i) = ram_index(&self.ram, 0, addr) {
            self.ram[i] = val;
        }
    }

    fn write_control(&mut self, _addr: u16, _val: u8) {}

    fn ram(&self) -> &[u8] {
        &self.ram
    }

    fn ram_mut(&mut self) -> &mut [u8] {
        &mut self.ram
    }
}
