use super::*;

/// BIT, RES, and SET. All three are prefixed.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
#[display("{op} {bit}, {reg}")]
pub struct BitOp {
    pub bit: u8,
    pub reg: RegOrPointer,
    pub op: BitOpInner,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
#[display("{_variant}")]
pub enum BitOpInner {
    #[display("BIT")]
    Bit,
    #[display("RES")]
    Res,
    #[display("SET")]
    Set,
}

impl BitOp {
    pub(crate) fn execute(self, cpu: &mut Cpu, mem: &mut impl MemoryLike) {
        let BitOp { bit, reg, op } = self;
        debug_assert!(bit < 8);
        let val = cpu.read_operand(mem, reg);
        match op {
            BitOpInner::Bit => {
                cpu.f.z = val & (1 << bit) == 0;
                cpu.f.n = false;
                cpu.f.h = true;
            }
            BitOpInner::Res => cpu.write_operand(mem, reg, val & !(1 << bit)),
            BitOpInner::Set => cpu.write_operand(mem, reg, val | (1 << bit)),
        }
    }

    /// Includes the fetch of the 0xCB prefix.
    pub fn length(&self) -> u8 {
        match (self.op, self.reg) {
            (_, RegOrPointer::Reg(_)) => 8,
            (BitOpInner::Bit, RegOrPointer::Pointer) => 12,
            (_, RegOrPointer::Pointer) => 16,
        }
    }

    pub fn mnemonic(&self) -> Mnemonic {
        match self.op {
            BitOpInner::Bit => Mnemonic::BIT,
            BitOpInner::Res => Mnemonic::RES,
            BitOpInner::Set => Mnemonic::SET,
        }
    }
}
