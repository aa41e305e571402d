use std::fmt::Debug;

use tracing::debug;
use tracing::trace;

use crate::cpu::TICKS_PER_M_CYCLE;
use crate::instruction::Interrupt;

pub mod io;
pub mod mbc;

use io::InterruptFlags;
use io::InterruptTarget;
use io::Peripherals;
use io::SerialCapture;
use mbc::Cartridge;

/// The number of bytes an OAM DMA copies.
const OAM_DMA_LENGTH: u16 = 0xA0;

/// The I/O register values left behind by the boot ROM, in the order they are written on reset.
const POWER_UP_REGISTERS: &[(u16, u8)] = &[
    (0xFF00, 0xCF),
    (0xFF01, 0x00),
    (0xFF02, 0x7E),
    (0xFF04, 0xAB),
    (0xFF05, 0x00),
    (0xFF06, 0x00),
    (0xFF07, 0xF8),
    (0xFF0F, 0xE1),
    (0xFF10, 0x80),
    (0xFF11, 0xBF),
    (0xFF12, 0xF3),
    (0xFF13, 0xFF),
    (0xFF14, 0xBF),
    (0xFF16, 0x3F),
    (0xFF17, 0x00),
    (0xFF18, 0xFF),
    (0xFF19, 0xBF),
    (0xFF1A, 0x7F),
    (0xFF1B, 0xFF),
    (0xFF1C, 0x9F),
    (0xFF1D, 0xFF),
    (0xFF1E, 0xBF),
    (0xFF20, 0xFF),
    (0xFF21, 0x00),
    (0xFF22, 0x00),
    (0xFF23, 0xBF),
    (0xFF24, 0x77),
    (0xFF25, 0xF3),
    (0xFF26, 0xF1),
    (0xFF40, 0x91),
    (0xFF41, 0x85),
    (0xFF42, 0x00),
    (0xFF43, 0x00),
    (0xFF45, 0x00),
    (0xFF47, 0xFC),
    (0xFF48, 0xFF),
    (0xFF49, 0xFF),
    (0xFF4A, 0x00),
    (0xFF4B, 0x00),
    (0xFFFF, 0x00),
];

/// This trait is used to abstract over the memory map. The CPU only ever talks to memory through
/// it, which lets the CPU tests run against a flat array.
///
/// Every access through this trait is timed: the rest of the system is advanced by one M-cycle
/// before the access happens.
pub trait MemoryLike {
    fn read_byte(&mut self, addr: u16) -> u8;

    fn write_byte(&mut self, addr: u16, val: u8);

    /// An M-cycle where the CPU does not touch the bus.
    fn idle(&mut self);

    /// The interrupts that are both requested and enabled (IF & IE).
    fn pending_interrupts(&self) -> u8;

    /// Clears the request bit of an interrupt that is being serviced.
    fn acknowledge(&mut self, interrupt: Interrupt);
}

/// The full 64 KiB address space.
pub struct MemoryMap {
    cart: Cartridge,
    peripherals: Peripherals,
    /// 0xC000-0xDFFF, echoed at 0xE000-0xFDFF
    wram: Vec<u8>,
    /// 0xFF80-0xFFFE
    hram: [u8; 0x7F],
    /// The I/O registers that no peripheral claims
    io: [u8; 0x80],
    /// ADDR FF0F. Only the lower five bits are stored.
    if_reg: u8,
    /// The interrupt enable register. Bits 0-4 flag where or not certain interrupt handlers can be
    /// called.
    ///  - Bit 0 corresponds to the VBlank interrupt
    ///  - Bit 1 corresponds to the LCD interrupt
    ///  - Bit 2 corresponds to the timer interrupt
    ///  - Bit 3 corresponds to the serial interrupt
    ///  - Bit 4 corresponds to the joypad interrupt
    /// When indexed, this register is at 0xFFFF.
    ie: u8,
    /// ADDR FF46
    dma: u8,
}

impl Debug for MemoryMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryMap")
            .field("cart", &self.cart.header().title)
            .field("peripherals", &self.peripherals)
            .field("if", &format_args!("0x{:0>2X}", self.if_reg))
            .field("ie", &format_args!("0x{:0>2X}", self.ie))
            .field("dma", &format_args!("0x{:0>2X}", self.dma))
            .finish_non_exhaustive()
    }
}

impl MemoryMap {
    /// Builds a memory map with the headless peripherals. The returned handle collects everything
    /// sent over the serial port.
    pub fn new(cart: Cartridge) -> (Self, SerialCapture) {
        let (peripherals, capture) = Peripherals::headless();
        (Self::with_peripherals(cart, peripherals), capture)
    }

    /// Builds a memory map around a set of host supplied peripherals. The I/O registers are set to
    /// their power-up values.
    pub fn with_peripherals(cart: Cartridge, peripherals: Peripherals) -> Self {
        let mut this = Self {
            cart,
            peripherals,
            wram: vec![0; 0x2000],
            hram: [0; 0x7F],
            io: [0; 0x80],
            if_reg: 0,
            ie: 0,
            dma: 0,
        };
        this.reset();
        this
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cart
    }

    pub fn cartridge_mut(&mut self) -> &mut Cartridge {
        &mut self.cart
    }

    pub fn peripherals(&self) -> &Peripherals {
        &self.peripherals
    }

    pub fn peripherals_mut(&mut self) -> &mut Peripherals {
        &mut self.peripherals
    }

    /// Zeroes the internal RAM and writes the power-up value of every I/O register. The cartridge
    /// is left alone.
    pub fn reset(&mut self) {
        self.wram.fill(0);
        self.hram.fill(0);
        self.io.fill(0);
        self.peripherals.reset();
        for &(addr, val) in POWER_UP_REGISTERS {
            self.poke(addr, val);
        }
        // Setting the DMA register through `poke` would start a transfer.
        self.dma = 0xFF;
    }

    /// Reads a byte without advancing any peripheral.
    pub fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x3FFF => self.cart.read_rom(addr),
            0x4000..=0x7FFF => self.cart.read_upper_rom(addr),
            0x8000..=0x9FFF => self.peripherals.video.read(addr),
            0xA000..=0xBFFF => self.cart.read_external(addr),
            0xC000..=0xDFFF => self.wram[addr as usize - 0xC000],
            // Echo RAM
            0xE000..=0xFDFF => self.wram[addr as usize - 0xE000],
            0xFE00..=0xFE9F => self.peripherals.video.read(addr),
            // NOTE: This region *should not* actually be accessed
            0xFEA0..=0xFEFF => 0x00,
            0xFF00 => self.peripherals.joypad.read(addr),
            0xFF01..=0xFF02 => self.peripherals.serial.read(addr),
            0xFF04..=0xFF07 => self.peripherals.timer.read(addr),
            0xFF0F => 0xE0 | self.if_reg,
            0xFF10..=0xFF3F => self.peripherals.audio.read(addr),
            0xFF46 => self.dma,
            0xFF40..=0xFF4B => self.peripherals.video.read(addr),
            // KEY1 only exists on the GBC
            0xFF4D => 0xFF,
            0xFF00..=0xFF7F => self.io[addr as usize - 0xFF00],
            0xFF80..=0xFFFE => self.hram[addr as usize - 0xFF80],
            0xFFFF => self.ie,
        }
    }

    /// Writes a byte without advancing any peripheral. Writes into the ROM go to the cartridge's
    /// bank controller.
    pub fn poke(&mut self, addr: u16, val: u8) {
        match addr {
            0x0000..=0x7FFF => {
                debug!("MBC control write: 0x{val:0>2X} to 0x{addr:0>4X}");
                self.cart.write_to_rom(addr, val)
            }
            0x8000..=0x9FFF => self.peripherals.video.write(addr, val),
            0xA000..=0xBFFF => self.cart.write_external(addr, val),
            0xC000..=0xDFFF => self.wram[addr as usize - 0xC000] = val,
            0xE000..=0xFDFF => self.wram[addr as usize - 0xE000] = val,
            0xFE00..=0xFE9F => self.peripherals.video.write(addr, val),
            0xFEA0..=0xFEFF => {}
            0xFF00 => self.peripherals.joypad.write(addr, val),
            0xFF01..=0xFF02 => self.peripherals.serial.write(addr, val),
            0xFF04..=0xFF07 => self.peripherals.timer.write(addr, val),
            0xFF0F => self.if_reg = val & 0x1F,
            0xFF10..=0xFF3F => self.peripherals.audio.write(addr, val),
            0xFF46 => self.oam_dma(val),
            0xFF40..=0xFF4B => self.peripherals.video.write(addr, val),
            0xFF4D => {}
            0xFF00..=0xFF7F => self.io[addr as usize - 0xFF00] = val,
            0xFF80..=0xFFFE => self.hram[addr as usize - 0xFF80] = val,
            0xFFFF => self.ie = val,
        }
    }

    /// Copies 160 bytes from `val << 8` into OAM in one go.
    fn oam_dma(&mut self, val: u8) {
        self.dma = val;
        let src = (val as u16) << 8;
        debug!("OAM DMA from 0x{src:0>4X}");
        for i in 0..OAM_DMA_LENGTH {
            let byte = self.peek(src.wrapping_add(i));
            self.peripherals.video.write(0xFE00 + i, byte);
        }
    }

    /// Advances every peripheral by one M-cycle.
    fn tick(&mut self) {
        self.peripherals
            .clock(TICKS_PER_M_CYCLE, &mut InterruptFlags(&mut self.if_reg));
    }
}

impl InterruptTarget for MemoryMap {
    fn request_interrupt(&mut self, interrupt: Interrupt) {
        self.if_reg |= interrupt.mask();
    }
}

impl MemoryLike for MemoryMap {
    fn read_byte(&mut self, addr: u16) -> u8 {
        self.tick();
        self.peek(addr)
    }

    fn write_byte(&mut self, addr: u16, val: u8) {
        self.tick();
        trace!("Write 0x{val:0>2X} to 0x{addr:0>4X}");
        self.poke(addr, val)
    }

    fn idle(&mut self) {
        self.tick();
    }

    fn pending_interrupts(&self) -> u8 {
        self.ie & self.if_reg & 0x1F
    }

    fn acknowledge(&mut self, interrupt: Interrupt) {
        self.if_reg &= !interrupt.mask();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::mbc::test_rom::cartridge_rom;

    fn memory_map() -> (MemoryMap, SerialCapture) {
        let cart = Cartridge::new(cartridge_rom(0x03, 2, 2)).unwrap();
        MemoryMap::new(cart)
    }

    #[test]
    fn power_up_values() {
        let (mem, _) = memory_map();
        assert_eq!(mem.peek(0xFF00), 0xCF);
        assert_eq!(mem.peek(0xFF04), 0x00);
        assert_eq!(mem.peek(0xFF07), 0xF8);
        assert_eq!(mem.peek(0xFF0F), 0xE1);
        assert_eq!(mem.peek(0xFF26), 0xF0);
        assert_eq!(mem.peek(0xFF40), 0x91);
        assert_eq!(mem.peek(0xFF46), 0xFF);
        assert_eq!(mem.peek(0xFF47), 0xFC);
        assert_eq!(mem.peek(0xFFFF), 0x00);
    }

    #[test]
    fn internal_ram_routing() {
        let (mut mem, _) = memory_map();
        mem.poke(0xC123, 0x11);
        assert_eq!(mem.peek(0xE123), 0x11);
        mem.poke(0xFDFF, 0x22);
        assert_eq!(mem.peek(0xDDFF), 0x22);
        mem.poke(0xFF80, 0x33);
        assert_eq!(mem.peek(0xFF80), 0x33);
        mem.poke(0xFEA0, 0x44);
        assert_eq!(mem.peek(0xFEA0), 0x00);
        mem.poke(0xFF4D, 0x01);
        assert_eq!(mem.peek(0xFF4D), 0xFF);
        // Unclaimed registers are plain storage
        mem.poke(0xFF7F, 0x55);
        assert_eq!(mem.peek(0xFF7F), 0x55);
        mem.poke(0xFF0F, 0xFF);
        assert_eq!(mem.peek(0xFF0F), 0xFF);
        mem.poke(0xFF0F, 0x04);
        assert_eq!(mem.peek(0xFF0F), 0xE4);
    }

    #[test]
    fn rom_writes_switch_banks() {
        let (mut mem, _) = memory_map();
        assert_eq!(mem.peek(0x4000), 1);
        mem.poke(0x2000, 0x05);
        assert_eq!(mem.peek(0x4000), 5);
        assert_eq!(mem.peek(0x0000), 0);

        mem.poke(0xA000, 0x12);
        assert_eq!(mem.peek(0xA000), 0xFF);
        mem.poke(0x0000, 0x0A);
        mem.poke(0xA000, 0x12);
        assert_eq!(mem.peek(0xA000), 0x12);
        assert_eq!(mem.cartridge().external_ram()[0], 0x12);
    }

    #[test]
    fn oam_dma_copies_160_bytes() {
        let (mut mem, _) = memory_map();
        for i in 0..0xA0u16 {
            mem.poke(0xC000 + i, i as u8 ^ 0x5A);
        }
        mem.poke(0xC0A0, 0xEE);
        mem.write_byte(0xFF46, 0xC0);
        assert_eq!(mem.peek(0xFF46), 0xC0);
        for i in 0..0xA0u16 {
            assert_eq!(mem.peek(0xFE00 + i), i as u8 ^ 0x5A);
        }
    }

    #[test]
    fn timed_accesses_clock_peripherals() {
        let (mut mem, _) = memory_map();
        mem.poke(0xFF04, 0);
        // DIV ticks every 256 ticks
        for _ in 0..63 {
            mem.idle();
        }
        assert_eq!(mem.peek(0xFF04), 0);
        assert_eq!(mem.read_byte(0xFF04), 1);
        // Untimed accesses do not
        for _ in 0..1000 {
            mem.peek(0xC000);
            mem.poke(0xC000, 0);
        }
        assert_eq!(mem.peek(0xFF04), 1);
    }

    #[test]
    fn peripherals_raise_interrupts() {
        let (mut mem, capture) = memory_map();
        mem.poke(0xFF0F, 0);
        mem.poke(0xFFFF, 0x1F);
        mem.write_byte(0xFF01, b'!');
        mem.write_byte(0xFF02, 0x81);
        assert_eq!(capture.text(), "!");
        for _ in 0..1023 {
            mem.idle();
        }
        assert_eq!(mem.pending_interrupts() & Interrupt::Serial.mask(), 0);
        mem.idle();
        assert_eq!(mem.pending_interrupts(), Interrupt::Serial.mask());

        mem.acknowledge(Interrupt::Serial);
        assert_eq!(mem.pending_interrupts(), 0);
        mem.request_interrupt(Interrupt::Timer);
        mem.poke(0xFFFF, 0x01);
        assert_eq!(mem.pending_interrupts(), 0);
        assert_eq!(mem.peek(0xFF0F), 0xE4);
    }

    #[test]
    fn reset_clears_ram_not_cartridge() {
        let (mut mem, _) = memory_map();
        mem.poke(0x0000, 0x0A);
        mem.poke(0xA000, 0x77);
        mem.poke(0xC000, 0x77);
        mem.poke(0xFF80, 0x77);
        mem.poke(0xFF40, 0x00);
        mem.reset();
        assert_eq!(mem.peek(0xC000), 0);
        assert_eq!(mem.peek(0xFF80), 0);
        assert_eq!(mem.peek(0xFF40), 0x91);
        assert_eq!(mem.cartridge().external_ram()[0], 0x77);
    }

    #[test]
    fn reset_restarts_peripherals() {
        let (mut mem, capture) = memory_map();
        for _ in 0..500 {
            mem.idle();
        }
        assert_eq!(mem.peek(0xFF44), 4);
        mem.write_byte(0xFF01, b'X');
        mem.write_byte(0xFF02, 0x81);

        mem.reset();
        assert_eq!(mem.peek(0xFF44), 0);
        assert_eq!(mem.peek(0xFF02), 0x7E);
        assert_eq!(mem.peek(0xFF05), 0x00);
        mem.poke(0xFF0F, 0x00);
        for _ in 0..2000 {
            mem.idle();
        }
        // 8000 ticks in: line 17, and the old serial transfer never finishes
        assert_eq!(mem.peek(0xFF44), 17);
        assert_eq!(mem.peek(0xFF0F), 0xE0);
        assert_eq!(capture.text(), "X");
    }
}
