#![allow(dead_code)]

use shade::rom::CartridgeHeader;

pub const ROM_BANK_SIZE: usize = 0x4000;

/// Assembles a cartridge image by hand. The entry point jumps to 0x0150, which is where `main`
/// puts the program.
pub struct RomBuilder {
    rom: Vec<u8>,
}

impl RomBuilder {
    /// An image of `32 KiB << rom_size` bytes with the given header codes.
    pub fn new(kind: u8, rom_size: u8, ram_size: u8) -> Self {
        let mut rom = vec![0; (32 * 1024) << rom_size];
        rom[0x134..0x13F].copy_from_slice(b"SHADE TESTS");
        rom[0x147] = kind;
        rom[0x148] = rom_size;
        rom[0x149] = ram_size;
        // NOP; JP 0x0150
        rom[0x100..0x104].copy_from_slice(&[0x00, 0xC3, 0x50, 0x01]);
        Self { rom }
    }

    /// A plain 32 KiB cartridge.
    pub fn rom_only() -> Self {
        Self::new(0x00, 0x00, 0x00)
    }

    /// Places bytes at an offset into the image.
    pub fn at(mut self, offset: usize, bytes: &[u8]) -> Self {
        self.rom[offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    /// Places the program at 0x0150.
    pub fn main(self, code: &[u8]) -> Self {
        self.at(0x150, code)
    }

    /// Places bytes at an address in the given ROM bank's switchable window.
    pub fn in_bank(self, bank: usize, addr: u16, bytes: &[u8]) -> Self {
        let offset = bank * ROM_BANK_SIZE + (addr as usize - 0x4000);
        self.at(offset, bytes)
    }

    pub fn build(mut self) -> Vec<u8> {
        self.rom[0x14D] = CartridgeHeader::compute_checksum(&self.rom);
        self.rom
    }
}

/// Prints the string at 0x0200 over the serial port one byte at a time, then spins.
pub const SERIAL_PRINT: &[u8] = &[
    0x21, 0x00, 0x02, // LD HL, 0x0200
    0x2A, // LD A, (HL+)
    0xA7, // AND A
    0x28, 0x0E, // JR Z, done
    0xE0, 0x01, // LDH (SB), A
    0x3E, 0x81, // LD A, 0x81
    0xE0, 0x02, // LDH (SC), A
    0xF0, 0x02, // wait: LDH A, (SC)
    0xCB, 0x7F, // BIT 7, A
    0x20, 0xFA, // JR NZ, wait
    0x18, 0xEE, // JR next
    0x18, 0xFE, // done: JR done
];

/// A test ROM that reports the given verdict over serial.
pub fn reporting_rom(message: &str) -> Vec<u8> {
    let mut text = message.as_bytes().to_vec();
    text.push(0);
    RomBuilder::rom_only()
        .main(SERIAL_PRINT)
        .at(0x200, &text)
        .build()
}
