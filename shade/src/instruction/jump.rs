use super::*;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
#[display("{_variant}")]
pub enum JumpOp {
    #[display("JR {_0}, e8")]
    ConditionalRelative(Condition),
    #[display("JR e8")]
    Relative,
    #[display("JP {_0}, a16")]
    ConditionalAbsolute(Condition),
    #[display("JP a16")]
    Absolute,
    #[display("JP HL")]
    JumpToHL,
    #[display("CALL a16")]
    Call,
    #[display("CALL {_0}, a16")]
    ConditionalCall(Condition),
    #[display("RET")]
    Return,
    #[display("RET {_0}")]
    ConditionalReturn(Condition),
    /// RET, then enable interrupts the same way EI does.
    #[display("RETI")]
    ReturnAndEnable,
    #[display("RST $00")]
    RST00,
    #[display("RST $08")]
    RST08,
    #[display("RST $10")]
    RST10,
    #[display("RST $18")]
    RST18,
    #[display("RST $20")]
    RST20,
    #[display("RST $28")]
    RST28,
    #[display("RST $30")]
    RST30,
    #[display("RST $38")]
    RST38,
}

impl JumpOp {
    /// Decodes an RST op code into its variant.
    pub(crate) const fn restart(op: u8) -> Self {
        match op & 0x38 {
            0x00 => Self::RST00,
            0x08 => Self::RST08,
            0x10 => Self::RST10,
            0x18 => Self::RST18,
            0x20 => Self::RST20,
            0x28 => Self::RST28,
            0x30 => Self::RST30,
            _ => Self::RST38,
        }
    }

    /// The address jumped to by an RST.
    pub const fn restart_target(&self) -> Option<u16> {
        match self {
            JumpOp::RST00 => Some(0x00),
            JumpOp::RST08 => Some(0x08),
            JumpOp::RST10 => Some(0x10),
            JumpOp::RST18 => Some(0x18),
            JumpOp::RST20 => Some(0x20),
            JumpOp::RST28 => Some(0x28),
            JumpOp::RST30 => Some(0x30),
            JumpOp::RST38 => Some(0x38),
            _ => None,
        }
    }

    pub(crate) fn execute(self, cpu: &mut Cpu, mem: &mut impl MemoryLike) {
        match self {
            JumpOp::ConditionalRelative(cond) => {
                let offset = cpu.fetch8(mem) as i8;
                if cpu.condition_passed(cond) {
                    cpu.idle(mem);
                    cpu.pc = cpu.pc.wrapping_add_signed(offset as i16);
                }
            }
            JumpOp::Relative => {
                let offset = cpu.fetch8(mem) as i8;
                cpu.idle(mem);
                cpu.pc = cpu.pc.wrapping_add_signed(offset as i16);
            }
            JumpOp::ConditionalAbsolute(cond) => {
                let addr = cpu.fetch16(mem);
                if cpu.condition_passed(cond) {
                    cpu.idle(mem);
                    cpu.pc = addr;
                }
            }
            JumpOp::Absolute => {
                let addr = cpu.fetch16(mem);
                cpu.idle(mem);
                cpu.pc = addr;
            }
            JumpOp::JumpToHL => cpu.pc = cpu.hl(),
            JumpOp::Call => {
                let addr = cpu.fetch16(mem);
                cpu.call(mem, addr);
            }
            JumpOp::ConditionalCall(cond) => {
                let addr = cpu.fetch16(mem);
                if cpu.condition_passed(cond) {
                    cpu.call(mem, addr);
                }
            }
            JumpOp::Return => cpu.ret(mem),
            JumpOp::ConditionalReturn(cond) => {
                cpu.idle(mem);
                if cpu.condition_passed(cond) {
                    cpu.ret(mem);
                }
            }
            JumpOp::ReturnAndEnable => {
                cpu.ret(mem);
                cpu.pending_enable_interrupts = true;
            }
            JumpOp::RST00
            | JumpOp::RST08
            | JumpOp::RST10
            | JumpOp::RST18
            | JumpOp::RST20
            | JumpOp::RST28
            | JumpOp::RST30
            | JumpOp::RST38 => {
                let target = self.restart_target().unwrap_or_default();
                cpu.call(mem, target);
            }
        }
    }

    pub const fn condition(&self) -> Option<Condition> {
        match self {
            JumpOp::ConditionalRelative(cond)
            | JumpOp::ConditionalAbsolute(cond)
            | JumpOp::ConditionalCall(cond)
            | JumpOp::ConditionalReturn(cond) => Some(*cond),
            _ => None,
        }
    }

    /// Returns the number of ticks it takes to complete this instruction if its condition (if any)
    /// passes.
    pub fn length(&self) -> u8 {
        match self {
            JumpOp::ConditionalRelative(_) | JumpOp::Relative => 12,
            JumpOp::ConditionalAbsolute(_) | JumpOp::Absolute => 16,
            JumpOp::JumpToHL => 4,
            JumpOp::Call | JumpOp::ConditionalCall(_) => 24,
            JumpOp::Return | JumpOp::ReturnAndEnable => 16,
            JumpOp::ConditionalReturn(_) => 20,
            _ => 16,
        }
    }

    /// Returns the number of ticks it takes to complete this instruction if its condition fails.
    pub fn length_not_taken(&self) -> u8 {
        match self {
            JumpOp::ConditionalRelative(_) => 8,
            JumpOp::ConditionalAbsolute(_) | JumpOp::ConditionalCall(_) => 12,
            JumpOp::ConditionalReturn(_) => 8,
            op => op.length(),
        }
    }

    /// Returns the size of the bytes to took to construct this instruction
    pub const fn size(&self) -> u8 {
        match self {
            JumpOp::ConditionalRelative(_) | JumpOp::Relative => 2,
            JumpOp::ConditionalAbsolute(_)
            | JumpOp::Absolute
            | JumpOp::Call
            | JumpOp::ConditionalCall(_) => 3,
            _ => 1,
        }
    }

    pub fn mnemonic(&self) -> Mnemonic {
        match self {
            JumpOp::ConditionalRelative(_) | JumpOp::Relative => Mnemonic::JR,
            JumpOp::ConditionalAbsolute(_) | JumpOp::Absolute | JumpOp::JumpToHL => Mnemonic::JP,
            JumpOp::Call | JumpOp::ConditionalCall(_) => Mnemonic::CALL,
            JumpOp::Return | JumpOp::ConditionalReturn(_) => Mnemonic::RET,
            JumpOp::ReturnAndEnable => Mnemonic::RETI,
            _ => Mnemonic::RST,
        }
    }
}
