//! The devices that hang off the bus. The core only drives them through [`Peripheral`]: each one
//! owns a fixed set of addresses, is clocked on every M-cycle, and may raise interrupts while it
//! is being clocked.
//!
//! The implementations in this module are headless: enough of each device to keep timing-driven
//! software running, with nothing that renders or plays audio. Hosts that want the real thing
//! swap them out via [`MemoryMap::with_peripherals`](crate::mem::MemoryMap::with_peripherals).

use std::fmt::Debug;

use crate::instruction::Interrupt;

mod headless;
mod serial;
mod timers;

pub use headless::{HeadlessAudio, HeadlessVideo, Joypad};
pub use serial::{Serial, SerialCapture};
pub use timers::Timer;

/// Something that can be told an interrupt was requested.
pub trait InterruptTarget {
    fn request_interrupt(&mut self, interrupt: Interrupt);
}

/// A device on the bus.
pub trait Peripheral: Debug {
    /// Advances the device by the given number of ticks.
    fn clock(&mut self, ticks: u8, irq: &mut dyn InterruptTarget);

    /// Reads one of the addresses this device owns.
    fn read(&self, addr: u16) -> u8;

    /// Writes one of the addresses this device owns.
    fn write(&mut self, addr: u16, val: u8);

    /// Returns the device to its power-on state, internal counters included.
    fn reset(&mut self);
}

/// The IF register, viewed as an interrupt sink.
pub(crate) struct InterruptFlags<'a>(pub(crate) &'a mut u8);

impl InterruptTarget for InterruptFlags<'_> {
    fn request_interrupt(&mut self, interrupt: Interrupt) {
        *self.0 |= interrupt.mask();
    }
}

/// Every device the bus routes to.
///
/// Address ownership:
///  - video: 0x8000-0x9FFF, 0xFE00-0xFE9F, 0xFF40-0xFF45, 0xFF47-0xFF4B
///  - audio: 0xFF10-0xFF3F
///  - timer: 0xFF04-0xFF07
///  - serial: 0xFF01-0xFF02
///  - joypad: 0xFF00
#[derive(Debug)]
pub struct Peripherals {
    pub video: Box<dyn Peripheral>,
    pub audio: Box<dyn Peripheral>,
    pub timer: Box<dyn Peripheral>,
    pub serial: Box<dyn Peripheral>,
    pub joypad: Box<dyn Peripheral>,
}

impl Peripherals {
    /// The headless set of devices. The returned handle collects every byte sent over the serial
    /// port.
    pub fn headless() -> (Self, SerialCapture) {
        let capture = SerialCapture::default();
        let this = Self {
            video: Box::new(HeadlessVideo::new()),
            audio: Box::new(HeadlessAudio::new()),
            timer: Box::new(Timer::new()),
            serial: Box::new(Serial::new(capture.clone())),
            joypad: Box::new(Joypad::new()),
        };
        (this, capture)
    }

    /// Clocks every device, in a fixed order.
    pub(crate) fn clock(&mut self, ticks: u8, irq: &mut dyn InterruptTarget) {
        self.timer.clock(ticks, irq);
        self.serial.clock(ticks, irq);
        self.video.clock(ticks, irq);
        self.audio.clock(ticks, irq);
        self.joypad.clock(ticks, irq);
    }

    pub(crate) fn reset(&mut self) {
        self.timer.reset();
        self.serial.reset();
        self.video.reset();
        self.audio.reset();
        self.joypad.reset();
    }
}
