use std::fmt::Display;

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
pub struct MBC1 {
    #[serde_as(as = "serde_with::Bytes")]
    rom: Vec<u8>,
    #[serde_as(as = "serde_with::Bytes")]
    ram: Vec<u8>,
    /// BANK1: the lower five bits of the ROM bank number. Writing zero selects one, which is how
    /// banks 0x00, 0x20, 0x40, and 0x60 become unreachable from 0x4000-0x7FFF.
    bank_index_one: u8,
    /// BANK2: two bits that are either the upper bits of the ROM bank number or the RAM bank
    /// number, depending on the banking mode.
    bank_index_two: u8,
    /// Determines if RAM can be read from and written to. The actual hardware uses an 8-bit
    /// register, so RAM is enabled when the lower 4 bits are 0xA.
    ///
    /// Initially set to `false`, any writes to the memory addresses 0x0000 through 0x1FFF write to
    /// this register.
    ram_enabled: bool,
    /// Any writes to the memory addresses 0x6000 through 0x7FFF write to this register.
    banking_mode: BankingMode,
}

impl Display for MBC1 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "MBC1 {{")?;
        writeln!(f, "  MODE:  {}", self.banking_mode)?;
        writeln!(f, "  RAMG:  {}", self.ram_enabled)?;
        writeln!(f, "  BANK1: 0b{:0>5b}", self.bank_index_one)?;
        writeln!(f, "  BANK2: 0b{:0>2b}", self.bank_index_two)?;
        writeln!(f, "  rom_bank: 0x{:0>2X}", self.rom_bank())?;
        writeln!(f, "}}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum BankingMode {
    Simple = 0,
    Advanced = 1,
}

impl BankingMode {
    fn from_byte(value: u8) -> Self {
        if (value & 0x1) == 0 {
            Self::Simple
        } else {
            Self::Advanced
        }
    }
}

impl MBC1 {
    pub fn new(rom: Vec<u8>, ram_size: usize) -> Self {
        Self {
            rom,
            ram: vec![0; ram_size],
            bank_index_one: 1,
            bank_index_two: 0,
            ram_enabled: false,
            banking_mode: BankingMode::Simple,
        }
    }

    pub fn ram_enabled(&self) -> bool {
        self.ram_enabled
    }

    /// The bank mapped at 0x0000-0x3FFF. Only advanced mode moves it.
    #[inline]
    pub fn first_rom_bank(&self) -> usize {
        match self.banking_mode {
            BankingMode::Simple => 0,
            BankingMode::Advanced => (self.bank_index_two << 5) as usize,
        }
    }

    /// The bank mapped at 0x4000-0x7FFF, before wrapping to the size of the ROM.
    #[inline]
    pub fn rom_bank(&self) -> usize {
        ((self.bank_index_two << 5) | self.bank_index_one) as usize
    }

    /// NOTE: This does *not* take RAM enablement into consideration.
    #[inline]
    pub fn ram_bank(&self) -> usize {
        match self.banking_mode {
            BankingMode::Simple => 0,
            BankingMode::Advanced => self.bank_index_two as usize,
        }
    }
}

impl Controller for MBC1 {
    fn read_rom(&self, addr: u16) -> u8 {
        rom_byte(&self.rom, self.first_rom_bank(), addr)
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
            0x2000..0x4000 => {
                self.bank_index_one = std::cmp::max(0x1F & val, 1);
                trace!("MBC1 ROM bank 0x{:0>2X}", self.rom_bank());
            }
            0x4000..0x6000 => self.bank_index_two = 0x3 & val,
            _ => self.banking_mode = BankingMode::from_byte(val),
        }
    }

    fn ram(&self) -> &[u8] {
        &self.ram
    }

    fn ram_mut(&mut self) -> &mut [u8] {
        &mut self.ram
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::mbc::test_rom::banked_rom;

    // This test comes from the complete technical reference
    #[test]
    fn rom_bank_example_one() {
        let mut mbc = MBC1::new(banked_rom(128), 0);
        mbc.write_control(0x2000, 0x12);
        mbc.write_control(0x4000, 0x01);

        // While in simple mode
        assert_eq!(mbc.read_rom(0x0000), 0);
        assert_eq!(mbc.read_rom(0x3FFF), 0);
        assert_eq!(mbc.read_upper_rom(0x4000), 0x32);
        assert_eq!(mbc.read_upper_rom(0x7FFF), 0x32);

        // While in advanced mode
        mbc.write_control(0x6000, 0x01);
        assert_eq!(mbc.read_rom(0x0000), 0x20);
        assert_eq!(mbc.read_rom(0x3FFF), 0x20);
        assert_eq!(mbc.read_upper_rom(0x4000), 0x32);
        assert_eq!(mbc.read_upper_rom(0x7FFF), 0x32);
    }

    // This test comes from the complete technical reference
    #[test]
    fn rom_bank_example_two() {
        let mut mbc = MBC1::new(banked_rom(128), 0);
        mbc.write_control(0x2000, 0b00100);
        mbc.write_control(0x4000, 0b10);
        assert_eq!(mbc.rom_bank(), 0x44);
        assert_eq!(mbc.read_rom(0x0000), 0);
        assert_eq!(mbc.read_upper_rom(0x4000), 0x44);
    }

    #[test]
    fn bank_zero_is_bumped() {
        let mut mbc = MBC1::new(banked_rom(128), 0);
        for upper in 0..4u8 {
            mbc.write_control(0x4000, upper);
            mbc.write_control(0x2000, 0x00);
            let expected = (upper << 5) + 1;
            assert_eq!(mbc.read_upper_rom(0x4000), expected);
            // Only the lower five bits are wired up
            mbc.write_control(0x2000, 0xE0);
            assert_eq!(mbc.read_upper_rom(0x4000), expected);
        }
    }

    #[test]
    fn banks_wrap_to_rom_size() {
        let mut mbc = MBC1::new(banked_rom(4), 0);
        mbc.write_control(0x2000, 0x05);
        assert_eq!(mbc.read_upper_rom(0x4000), 1);
        mbc.write_control(0x2000, 0x03);
        assert_eq!(mbc.read_upper_rom(0x4000), 3);
    }

    #[test]
    fn ram_enable_and_banking() {
        let mut mbc = MBC1::new(banked_rom(4), 0x8000);
        mbc.write_external(0xA000, 0x11);
        assert_eq!(mbc.read_external(0xA000), 0xFF);

        mbc.write_control(0x0000, 0x0A);
        assert!(mbc.ram_enabled());
        mbc.write_external(0xA000, 0x11);
        assert_eq!(mbc.read_external(0xA000), 0x11);

        // Switch to RAM bank 2, which only happens in advanced mode
        mbc.write_control(0x4000, 0x02);
        assert_eq!(mbc.read_external(0xA000), 0x11);
        mbc.write_control(0x6000, 0x01);
        assert_eq!(mbc.read_external(0xA000), 0x00);
        mbc.write_external(0xA000, 0x22);
        mbc.write_control(0x6000, 0x00);
        assert_eq!(mbc.read_external(0xA000), 0x11);

        mbc.write_control(0x0000, 0x00);
        assert_eq!(mbc.read_external(0xA000), 0xFF);
        mbc.write_control(0x0000, 0x0A);
        assert_eq!(mbc.read_external(0xA000), 0x11);
        assert_eq!(mbc.ram()[2 * 0x2000], 0x22);
    }

    #[test]
    fn bank_mode_creation() {
        (0..u8::MAX).for_each(|i| assert_eq!(BankingMode::from_byte(i) as u8, 0x1 & i))
    }
}
