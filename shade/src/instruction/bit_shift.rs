use super::*;

/// The prefixed rotate, shift, and swap operations.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
#[display("{_variant}")]
pub enum BitShiftOp {
    #[display("RLC {_0}")]
    Rlc(RegOrPointer),
    #[display("RRC {_0}")]
    Rrc(RegOrPointer),
    #[display("RL {_0}")]
    Rl(RegOrPointer),
    #[display("RR {_0}")]
    Rr(RegOrPointer),
    #[display("SLA {_0}")]
    Sla(RegOrPointer),
    #[display("SRA {_0}")]
    Sra(RegOrPointer),
    #[display("SWAP {_0}")]
    Swap(RegOrPointer),
    #[display("SRL {_0}")]
    Srl(RegOrPointer),
}

impl BitShiftOp {
    /// Decodes bits 3-5 of a prefixed op code in the 0x00..=0x3F block.
    pub(crate) const fn from_bits(bits: u8, reg: RegOrPointer) -> Self {
        match bits & 0x07 {
            0 => Self::Rlc(reg),
            1 => Self::Rrc(reg),
            2 => Self::Rl(reg),
            3 => Self::Rr(reg),
            4 => Self::Sla(reg),
            5 => Self::Sra(reg),
            6 => Self::Swap(reg),
            _ => Self::Srl(reg),
        }
    }

    const fn reg(self) -> RegOrPointer {
        match self {
            BitShiftOp::Rlc(reg)
            | BitShiftOp::Rrc(reg)
            | BitShiftOp::Rl(reg)
            | BitShiftOp::Rr(reg)
            | BitShiftOp::Sla(reg)
            | BitShiftOp::Sra(reg)
            | BitShiftOp::Swap(reg)
            | BitShiftOp::Srl(reg) => reg,
        }
    }

    fn apply(self, flags: &mut Flags, val: u8) -> u8 {
        match self {
            BitShiftOp::Rlc(_) => alu::rlc(flags, val),
            BitShiftOp::Rrc(_) => alu::rrc(flags, val),
            BitShiftOp::Rl(_) => alu::rl(flags, val),
            BitShiftOp::Rr(_) => alu::rr(flags, val),
            BitShiftOp::Sla(_) => alu::sla(flags, val),
            BitShiftOp::Sra(_) => alu::sra(flags, val),
            BitShiftOp::Swap(_) => alu::swap(flags, val),
            BitShiftOp::Srl(_) => alu::srl(flags, val),
        }
    }

    pub(crate) fn execute(self, cpu: &mut Cpu, mem: &mut impl MemoryLike) {
        let reg = self.reg();
        let val = cpu.read_operand(mem, reg);
        let val = self.apply(&mut cpu.f, val);
        cpu.write_operand(mem, reg, val);
    }

    /// Includes the fetch of the 0xCB prefix.
    pub fn length(&self) -> u8 {
        if self.reg().is_pointer() {
            16
        } else {
            8
        }
    }

    pub fn mnemonic(&self) -> Mnemonic {
        match self {
            BitShiftOp::Rlc(_) => Mnemonic::RLC,
            BitShiftOp::Rrc(_) => Mnemonic::RRC,
            BitShiftOp::Rl(_) => Mnemonic::RL,
            BitShiftOp::Rr(_) => Mnemonic::RR,
            BitShiftOp::Sla(_) => Mnemonic::SLA,
            BitShiftOp::Sra(_) => Mnemonic::SRA,
            BitShiftOp::Swap(_) => Mnemonic::SWAP,
            BitShiftOp::Srl(_) => Mnemonic::SRL,
        }
    }
}
