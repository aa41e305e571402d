mod common;

use common::RomBuilder;
use shade::Gameboy;
use shade::cpu::Cpu;
use shade::error::{CartridgeError, SaveError};
use shade::mem::mbc::{Cartridge, MemoryBankController};
use shade::rom::MbcKind;

/// LD A, 0x0A; LD (0x0000), A; LD A, 0x5A; LD (0xA010), A; JR self
const WRITE_SAVE: &[u8] = &[
    0x3E, 0x0A, 0xEA, 0x00, 0x00, 0x3E, 0x5A, 0xEA, 0x10, 0xA0, 0x18, 0xFE,
];

#[test]
fn loading_selects_the_controller() {
    for (kind, mbc) in [
        (0x00, MbcKind::Direct),
        (0x03, MbcKind::MBC1),
        (0x06, MbcKind::MBC2),
        (0x10, MbcKind::MBC3),
        (0x1E, MbcKind::MBC5),
    ] {
        let cart = Cartridge::new(RomBuilder::new(kind, 0x01, 0x03).build()).unwrap();
        assert_eq!(cart.kind().mbc, mbc);
        assert_eq!(cart.header().title, "SHADE TESTS");
    }
}

#[test]
fn bad_images_are_rejected() {
    assert_eq!(
        Gameboy::load_cartridge(vec![0; 0x100]).unwrap_err(),
        CartridgeError::RomTooSmall { len: 0x100 }
    );
    assert_eq!(
        Gameboy::load_cartridge(RomBuilder::new(0x22, 0, 0).build()).unwrap_err(),
        CartridgeError::UnsupportedType { code: 0x22 }
    );
    let mut rom = RomBuilder::rom_only().build();
    rom[0x148] = 0x0A;
    assert_eq!(
        Cartridge::new(rom).unwrap_err(),
        CartridgeError::UnknownRomSize { code: 0x0A }
    );
}

#[test]
fn external_ram_needs_enabling() {
    let rom = RomBuilder::new(0x03, 0x00, 0x02).build();
    let mut cart = Cartridge::new(rom).unwrap();
    cart.write_external(0xA000, 0x12);
    assert_eq!(cart.read_external(0xA000), 0xFF);

    cart.write_to_rom(0x1FFF, 0x0A);
    cart.write_external(0xA000, 0x12);
    assert_eq!(cart.read_external(0xA000), 0x12);

    cart.write_to_rom(0x0000, 0x00);
    assert_eq!(cart.read_external(0xA000), 0xFF);
    cart.write_external(0xA000, 0x34);
    cart.write_to_rom(0x0000, 0x0A);
    assert_eq!(cart.read_external(0xA000), 0x12);
}

#[test]
fn mbc1_skips_bank_zero_aliases() {
    let mut builder = RomBuilder::new(0x01, 0x06, 0x00);
    for bank in 1..128 {
        builder = builder.in_bank(bank, 0x4000, &[bank as u8]);
    }
    let mut cart = Cartridge::new(builder.build()).unwrap();
    for (upper, expected) in [(0, 0x01), (1, 0x21), (2, 0x41), (3, 0x61)] {
        cart.write_to_rom(0x4000, upper);
        cart.write_to_rom(0x2000, 0x00);
        assert_eq!(cart.read_upper_rom(0x4000), expected);
    }
}

#[test]
fn save_file_round_trip() {
    let rom = RomBuilder::new(0x03, 0x00, 0x02).main(WRITE_SAVE).build();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.sav");

    let mut gb = Gameboy::load_cartridge(rom.clone()).unwrap();
    gb.run_frame().unwrap();
    assert!(gb.cartridge().has_battery());
    std::fs::write(&path, gb.cartridge().external_ram()).unwrap();

    let mut gb = Gameboy::load_cartridge(rom).unwrap();
    let save = std::fs::read(&path).unwrap();
    assert_eq!(save.len(), 8 * 1024);
    gb.cartridge_mut().load_external_ram(&save).unwrap();
    assert_eq!(gb.cartridge().external_ram()[0x10], 0x5A);
    gb.cartridge_mut().write_to_rom(0x0000, 0x0A);
    assert_eq!(gb.mem.peek(0xA010), 0x5A);
}

#[test]
fn short_save_is_rejected() {
    let rom = RomBuilder::new(0x03, 0x00, 0x02).build();
    let mut cart = Cartridge::new(rom).unwrap();
    assert_eq!(
        cart.load_external_ram(&[0xAA; 512]),
        Err(SaveError::WrongLength {
            expected: 8 * 1024,
            found: 512
        })
    );
    assert!(cart.external_ram().iter().all(|b| *b == 0));
}

#[test]
fn reset_keeps_cartridge_ram() {
    let rom = RomBuilder::new(0x03, 0x00, 0x02).main(WRITE_SAVE).build();
    let mut gb = Gameboy::load_cartridge(rom).unwrap();
    gb.run_frame().unwrap();
    gb.reset();
    assert_eq!(gb.cartridge().external_ram()[0x10], 0x5A);
}

#[test]
fn cartridge_snapshot() {
    let rom = RomBuilder::new(0x13, 0x02, 0x03).build();
    let mut cart = Cartridge::new(rom).unwrap();
    cart.write_to_rom(0x0000, 0x0A);
    cart.write_to_rom(0x2000, 0x05);
    cart.write_to_rom(0x4000, 0x02);
    cart.write_external(0xA000, 0x42);

    let bytes = postcard::to_allocvec(&cart).unwrap();
    let restored: Cartridge = postcard::from_bytes(&bytes).unwrap();
    assert_eq!(restored, cart);
    assert_eq!(restored.read_external(0xA000), 0x42);
    assert!(matches!(restored.mbc(), MemoryBankController::MBC3(mbc) if mbc.rom_bank() == 5));
}

#[test]
fn cpu_snapshot() {
    let rom = RomBuilder::rom_only().main(WRITE_SAVE).build();
    let mut gb = Gameboy::load_cartridge(rom).unwrap();
    for _ in 0..4 {
        gb.clock_cpu().unwrap();
    }
    let bytes = postcard::to_allocvec(&gb.cpu).unwrap();
    let restored: Cpu = postcard::from_bytes(&bytes).unwrap();
    assert_eq!(restored.to_string(), gb.cpu.to_string());
    assert_eq!(restored.af(), gb.cpu.af());
    assert_eq!(restored.pc, 0x0155);
}
