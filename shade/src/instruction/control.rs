use super::*;
use crate::cpu::CpuState;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
#[display("{_variant}")]
pub enum ControlOp {
    #[display("NOP")]
    Noop,
    #[display("HALT")]
    Halt,
    #[display("STOP")]
    Stop,
}

impl ControlOp {
    pub(crate) fn execute(self, cpu: &mut Cpu, mem: &mut impl MemoryLike) {
        match self {
            ControlOp::Noop => {}
            // With IME clear and an interrupt already waiting, HALT does not halt. Instead, the
            // next op code is read without moving PC past it.
            ControlOp::Halt if !cpu.ime && mem.pending_interrupts() != 0 => {
                cpu.halt_bug_pending = true;
            }
            ControlOp::Halt => cpu.state = CpuState::Halted,
            ControlOp::Stop => {
                // STOP is followed by a padding byte that is skipped without being read.
                cpu.pc = cpu.pc.wrapping_add(1);
                cpu.state = CpuState::Stopped;
            }
        }
    }

    pub fn length(&self) -> u8 {
        4
    }

    pub const fn size(&self) -> u8 {
        match self {
            ControlOp::Stop => 2,
            _ => 1,
        }
    }

    pub fn mnemonic(&self) -> Mnemonic {
        match self {
            ControlOp::Noop => Mnemonic::NOP,
            ControlOp::Halt => Mnemonic::HALT,
            ControlOp::Stop => Mnemonic::STOP,
        }
    }
}
