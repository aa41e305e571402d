use tracing::error;

use crate::cpu::Cpu;
use crate::error::CartridgeError;
use crate::error::EmulationError;
use crate::instruction::Interrupt;
use crate::mem::MemoryMap;
use crate::mem::io::InterruptTarget;
use crate::mem::io::Peripherals;
use crate::mem::io::SerialCapture;
use crate::mem::mbc::Cartridge;

/// The number of ticks in one frame: 154 lines of 456 dots.
pub const TICKS_PER_FRAME: u32 = 70224;

/// This is the core emulation primative. It contains the entire state machine of the emulated
/// handheld and is agnostic to how it is presented (if at all). It must be ticked forward by the
/// host, one instruction at a time or one frame at a time.
#[derive(Debug)]
pub struct Gameboy {
    pub cpu: Cpu,
    pub mem: MemoryMap,
    /// Present when the headless serial port is plugged in
    serial: Option<SerialCapture>,
}

impl Gameboy {
    /// A console in its post-boot state with the headless peripherals.
    pub fn new(cart: Cartridge) -> Self {
        let (mem, capture) = MemoryMap::new(cart);
        Self {
            cpu: Cpu::power_on(),
            mem,
            serial: Some(capture),
        }
    }

    /// Parses a ROM image and inserts it.
    pub fn load_cartridge(rom: Vec<u8>) -> Result<Self, CartridgeError> {
        Cartridge::new(rom).map(Self::new)
    }

    /// A console in its post-boot state with host supplied peripherals.
    pub fn with_peripherals(cart: Cartridge, peripherals: Peripherals) -> Self {
        Self {
            cpu: Cpu::power_on(),
            mem: MemoryMap::with_peripherals(cart, peripherals),
            serial: None,
        }
    }

    /// Runs the next instruction (or a single idle M-cycle while halted). Returns the number of
    /// ticks that passed.
    pub fn clock_cpu(&mut self) -> Result<u8, EmulationError> {
        self.cpu.step(&mut self.mem).inspect_err(|err| error!("{err}"))
    }

    /// Wakes the CPU and dispatches an interrupt if one is pending. Returns the number of ticks
    /// that passed.
    pub fn handle_interrupts(&mut self) -> u8 {
        self.cpu.handle_interrupts(&mut self.mem)
    }

    pub fn request_interrupt(&mut self, interrupt: Interrupt) {
        self.mem.request_interrupt(interrupt)
    }

    /// Runs whole instructions until at least a frame's worth of ticks have passed. Returns the
    /// number of ticks that actually passed, which can overshoot by part of an instruction.
    pub fn run_frame(&mut self) -> Result<u32, EmulationError> {
        let mut ticks = 0;
        while ticks < TICKS_PER_FRAME {
            ticks += self.clock_cpu()? as u32;
            ticks += self.handle_interrupts() as u32;
        }
        Ok(ticks)
    }

    /// Returns the console to its post-boot state. The cartridge, including its RAM, is kept.
    pub fn reset(&mut self) {
        self.mem.reset();
        self.cpu = Cpu::power_on();
    }

    /// Everything the game has sent over the serial port. `None` with host supplied peripherals.
    pub fn serial_output(&self) -> Option<&SerialCapture> {
        self.serial.as_ref()
    }

    pub fn cartridge(&self) -> &Cartridge {
        self.mem.cartridge()
    }

    pub fn cartridge_mut(&mut self) -> &mut Cartridge {
        self.mem.cartridge_mut()
    }
}
