use serde::Deserialize;
use serde::Serialize;
use serde_with::serde_as;
use tracing::trace;

use super::Controller;
use super::ram_enable_value;
use super::ram_index;
use super::rom_byte;

#[serde_as]
#[derive(Debug, Hash, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MBC5 {
    #[serde_as(as = "serde_with::Bytes")]
    rom: Vec<u8>,
    #[serde_as(as = "serde_with::Bytes")]
    ram: Vec<u8>,
    ram_enabled: bool,
    /// Nine bits. Unlike the older controllers, bank zero can be mapped into 0x4000-0x7FFF.
    rom_bank: u16,
    ram_bank: u8,
    /// Rumble carts wire bit 3 of the RAM bank register to the motor instead.
    rumble: bool,
    motor: bool,
}

impl MBC5 {
    pub fn new(rom: Vec<u8>, ram_size: usize, rumble: bool) -> Self {
        Self {
            rom,
            ram: vec![0; ram_size],
            ram_enabled: false,
            rom_bank: 1,
            ram_bank: 0,
            rumble,
            motor: false,
        }
    }

    pub fn rom_bank(&self) -> usize {
        self.rom_bank as usize
    }

    pub fn ram_bank(&self) -> usize {
        self.ram_bank as usize
    }

    /// Whether the rumble motor is currently on. Always false for carts without one.
    pub fn motor(&self) -> bool {
        self.motor
    }
}

impl Controller for MBC5 {
    fn read_rom(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, 0, addr)
    }

    fn read_upper_rom(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, self.rom_bank(), addr)
    }

    fn read_external(&self, addr: u16) -> u8 {
        match ram_index(&self.ram, self.ram_bank(), addr) {
            Some(i) if self.ram_enabled => self.ram[i],
            _ => 0xFF,
        }
    }

    fn write_external(&mut self, addr: u16, val: u8) {
        match ram_index(&self.ram, self.ram_bank(), addr) {
            Some(i) if self.ram_enabled => self.ram[i] = val,
            _ => {}
        }
    }

    fn write_control(&mut self, addr: u16, val: u8) {
        match addr {
            0x0000..0x2000 => self.ram_enabled = ram_enable_value(val),
            0x2000..0x3000 => self.rom_bank = (self.rom_bank & 0x100) | val as u16,
            0x3000..0x4000 => self.rom_bank = (self.rom_bank & 0xFF) | ((val as u16 & 0x01) << 8),
            0x4000..0x6000 if self.rumble => {
                self.ram_bank = val & 0x07;
                self.motor = val & 0x08 != 0;
                trace!("MBC5 rumble motor: {}", self.motor);
            }
            0x4000..0x6000 => self.ram_bank = val & 0x0F,
            _ => {}
        }
    }

    fn ram(&self) -> &[u8] {
        &self.ram
    }

    fn ram_mut(&mut self) -> &mut [u8] {
        &mut self.ram
    }
}
