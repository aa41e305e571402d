mod common;

use common::{RomBuilder, reporting_rom};
use shade::cpu::CpuState;
use shade::error::EmulationError;
use shade::instruction::Interrupt;
use shade::{Gameboy, TICKS_PER_FRAME};

fn load(rom: Vec<u8>) -> Gameboy {
    Gameboy::load_cartridge(rom).unwrap()
}

fn run_frames(gb: &mut Gameboy, frames: usize) {
    for _ in 0..frames {
        gb.run_frame().unwrap();
    }
}

#[test_log::test]
fn serial_output_is_captured() {
    let mut gb = load(reporting_rom("Passed"));
    run_frames(&mut gb, 2);
    let serial = gb.serial_output().unwrap();
    assert_eq!(serial.text(), "Passed");
    assert_eq!(gb.cpu.pc, 0x0165);
}

#[test]
fn run_frame_spends_a_frame() {
    let mut gb = load(reporting_rom(""));
    let ticks = gb.run_frame().unwrap();
    assert!(ticks >= TICKS_PER_FRAME);
    assert!(ticks < TICKS_PER_FRAME + 24);
}

#[test_log::test]
fn timer_interrupt_wakes_halt() {
    let rom = RomBuilder::rom_only()
        .main(&[
            0x3E, 0x05, // LD A, 0x05
            0xE0, 0x07, // LDH (TAC), A
            0x3E, 0x04, // LD A, 0x04
            0xE0, 0xFF, // LDH (IE), A
            0xAF, // XOR A
            0xE0, 0x0F, // LDH (IF), A
            0xFB, // EI
            0x76, // loop: HALT
            0x18, 0xFD, // JR loop
        ])
        .at(
            0x50,
            &[
                0x21, 0x00, 0xC0, // LD HL, 0xC000
                0x34, // INC (HL)
                0xD9, // RETI
            ],
        )
        .build();
    let mut gb = load(rom);
    run_frames(&mut gb, 1);
    // TIMA overflows every 256 * 16 ticks
    let count = gb.mem.peek(0xC000);
    assert!((16..=17).contains(&count), "{count}");
}

#[test]
fn one_vblank_per_frame() {
    let rom = RomBuilder::rom_only()
        .main(&[
            0x3E, 0x01, // LD A, 0x01
            0xE0, 0xFF, // LDH (IE), A
            0xAF, // XOR A
            0xE0, 0x0F, // LDH (IF), A
            0xFB, // EI
            0x76, // loop: HALT
            0x18, 0xFD, // JR loop
        ])
        .at(
            0x40,
            &[
                0x21, 0x00, 0xC0, // LD HL, 0xC000
                0x34, // INC (HL)
                0xD9, // RETI
            ],
        )
        .build();
    let mut gb = load(rom);
    run_frames(&mut gb, 10);
    assert_eq!(gb.mem.peek(0xC000), 10);
    assert_eq!(gb.cpu.state, CpuState::Halted);
}

#[test]
fn program_switches_rom_banks() {
    let rom = RomBuilder::new(0x01, 0x02, 0x00)
        .main(&[
            0x3E, 0x03, // LD A, 0x03
            0xEA, 0x00, 0x20, // LD (0x2000), A
            0xFA, 0x00, 0x40, // LD A, (0x4000)
            0xEA, 0x00, 0xC0, // LD (0xC000), A
            0x18, 0xFE, // JR self
        ])
        .in_bank(1, 0x4000, &[0x11])
        .in_bank(3, 0x4000, &[0x33])
        .build();
    let mut gb = load(rom);
    assert_eq!(gb.mem.peek(0x4000), 0x11);
    run_frames(&mut gb, 1);
    assert_eq!(gb.mem.peek(0xC000), 0x33);
}

#[test]
fn program_starts_oam_dma() {
    let rom = RomBuilder::rom_only()
        .main(&[
            0x21, 0x00, 0xC1, // LD HL, 0xC100
            0x3E, 0x99, // LD A, 0x99
            0x22, // LD (HL+), A
            0x22, // LD (HL+), A
            0x3E, 0xC1, // LD A, 0xC1
            0xE0, 0x46, // LDH (DMA), A
            0x18, 0xFE, // JR self
        ])
        .build();
    let mut gb = load(rom);
    run_frames(&mut gb, 1);
    assert_eq!(gb.mem.peek(0xFE00), 0x99);
    assert_eq!(gb.mem.peek(0xFE01), 0x99);
    assert_eq!(gb.mem.peek(0xFE02), 0x00);
    assert_eq!(gb.mem.peek(0xFF46), 0xC1);
}

#[test_log::test]
fn illegal_opcode_stops_emulation() {
    let rom = RomBuilder::rom_only().main(&[0x00, 0xFC]).build();
    let mut gb = load(rom);
    assert_eq!(
        gb.run_frame(),
        Err(EmulationError::IllegalOpcode {
            opcode: 0xFC,
            pc: 0x0151
        })
    );
}

#[test]
fn requested_interrupt_is_serviced() {
    let rom = RomBuilder::rom_only()
        .main(&[
            0x3E, 0x10, // LD A, 0x10
            0xE0, 0xFF, // LDH (IE), A
            0xFB, // EI
            0x18, 0xFE, // JR self
        ])
        .at(0x60, &[0x3E, 0x77, 0xEA, 0x00, 0xC0, 0x18, 0xFE])
        .build();
    let mut gb = load(rom);
    // NOP; JP; LD; LDH; EI
    for _ in 0..5 {
        gb.clock_cpu().unwrap();
        gb.handle_interrupts();
    }
    assert!(gb.cpu.ime);
    gb.request_interrupt(Interrupt::Joypad);
    run_frames(&mut gb, 1);
    assert_eq!(gb.mem.peek(0xC000), 0x77);
    assert!(!gb.cpu.ime);
}

#[test]
fn reset_restarts_the_program() {
    let mut gb = load(reporting_rom("Failed"));
    run_frames(&mut gb, 2);
    assert_eq!(gb.serial_output().unwrap().text(), "Failed");
    gb.reset();
    assert_eq!(gb.cpu.pc, 0x0100);
    assert_eq!(gb.mem.peek(0xFF40), 0x91);
    run_frames(&mut gb, 2);
    assert_eq!(gb.serial_output().unwrap().text(), "FailedFailed");
}

#[test]
fn reset_rewinds_the_scanline() {
    let rom = RomBuilder::rom_only().main(&[0x18, 0xFE]).build();
    let mut gb = load(rom);
    for _ in 0..500 {
        gb.clock_cpu().unwrap();
    }
    assert_ne!(gb.mem.peek(0xFF44), 0);
    gb.reset();
    assert_eq!(gb.mem.peek(0xFF44), 0);
}
