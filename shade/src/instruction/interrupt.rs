use serde::Deserialize;
use serde::Serialize;

use crate::cpu::Cpu;
use crate::mem::MemoryLike;

/// The five interrupt sources. The discriminant is the address of the source's handler.
#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display, Serialize, Deserialize,
)]
#[display("{_variant}")]
#[repr(u16)]
pub enum Interrupt {
    #[display("VBlank")]
    VBlank = 0x0040,
    #[display("LCD")]
    LCD = 0x0048,
    #[display("Timer")]
    Timer = 0x0050,
    #[display("Serial")]
    Serial = 0x0058,
    #[display("Joypad")]
    Joypad = 0x0060,
}

impl Interrupt {
    /// In priority order, highest first.
    pub const ALL: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::LCD,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    pub const fn vector(self) -> u16 {
        self as u16
    }

    /// The bit index of this source in IE and IF.
    pub const fn bit(self) -> u8 {
        ((self as u16 - 0x40) / 8) as u8
    }

    pub const fn mask(self) -> u8 {
        1 << self.bit()
    }

    /// Picks the highest priority source out of a set of pending interrupt bits.
    pub fn highest_priority(pending: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|int| pending & int.mask() != 0)
    }

    /// Services the interrupt: two idle M-cycles, PC is pushed high byte first, then the jump to
    /// the vector. Takes 20 ticks in total.
    pub(crate) fn dispatch(self, cpu: &mut Cpu, mem: &mut impl MemoryLike) {
        cpu.ime = false;
        cpu.idle(mem);
        cpu.idle(mem);
        cpu.push16(mem, cpu.pc);
        mem.acknowledge(self);
        cpu.idle(mem);
        cpu.pc = self.vector();
    }
}
