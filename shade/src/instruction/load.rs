use super::*;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
#[display("{_variant}")]
pub enum LoadOp {
    /// LD r, r'. The pointer-to-pointer case is HALT.
    #[display("LD {dest}, {src}")]
    Basic {
        dest: RegOrPointer,
        src: RegOrPointer,
    },
    #[display("LD {_0}, n16")]
    Direct16(WideReg),
    #[display("LD {_0}, n8")]
    Direct(RegOrPointer),
    #[display("LD A, {_0}")]
    LoadIntoA(LoadAPointer),
    #[display("LD {_0}, A")]
    StoreFromA(LoadAPointer),
    /// Store SP at a 16 bit address.
    #[display("LD (a16), SP")]
    StoreSP,
    #[display("LD SP, HL")]
    HLIntoSP,
    #[display("LD HL, SP+e8")]
    SPIntoHL,
    #[display("POP {_0}")]
    Pop(WideRegWithoutSP),
    #[display("PUSH {_0}")]
    Push(WideRegWithoutSP),
    /// Store A into the high page.
    #[display("LDH (a8), A")]
    StoreHigh,
    /// Load A from the high page.
    #[display("LDH A, (a8)")]
    LoadHigh,
    #[display("LDH (C), A")]
    Ldhca,
    #[display("LDH A, (C)")]
    Ldhac,
    #[display("LD (a16), A")]
    StoreA,
    #[display("LD A, (a16)")]
    LoadA,
}

impl LoadOp {
    pub(crate) fn execute(self, cpu: &mut Cpu, mem: &mut impl MemoryLike) {
        match self {
            LoadOp::Basic { dest, src } => {
                let val = cpu.read_operand(mem, src);
                cpu.write_operand(mem, dest, val);
            }
            LoadOp::Direct16(reg) => {
                let val = cpu.fetch16(mem);
                cpu.set_wide(reg, val);
            }
            LoadOp::Direct(reg) => {
                let val = cpu.fetch8(mem);
                cpu.write_operand(mem, reg, val);
            }
            LoadOp::LoadIntoA(ptr) => {
                let addr = cpu.a_pointer(ptr);
                cpu.a = cpu.read8(mem, addr);
            }
            LoadOp::StoreFromA(ptr) => {
                let addr = cpu.a_pointer(ptr);
                cpu.write8(mem, addr, cpu.a);
            }
            LoadOp::StoreSP => {
                let addr = cpu.fetch16(mem);
                let [lo, hi] = cpu.sp.to_le_bytes();
                cpu.write8(mem, addr, lo);
                cpu.write8(mem, addr.wrapping_add(1), hi);
            }
            LoadOp::HLIntoSP => {
                cpu.sp = cpu.hl();
                cpu.idle(mem);
            }
            LoadOp::SPIntoHL => {
                let offset = cpu.fetch8(mem);
                let val = alu::add_sp_offset(&mut cpu.f, cpu.sp, offset);
                cpu.idle(mem);
                cpu.set_hl(val);
            }
            LoadOp::Pop(reg) => {
                let val = cpu.pop16(mem);
                cpu.set_wide_without_sp(reg, val);
            }
            LoadOp::Push(reg) => {
                cpu.idle(mem);
                let val = cpu.wide_without_sp(reg);
                cpu.push16(mem, val);
            }
            LoadOp::StoreHigh => {
                let addr = 0xFF00 | cpu.fetch8(mem) as u16;
                cpu.write8(mem, addr, cpu.a);
            }
            LoadOp::LoadHigh => {
                let addr = 0xFF00 | cpu.fetch8(mem) as u16;
                cpu.a = cpu.read8(mem, addr);
            }
            LoadOp::Ldhca => cpu.write8(mem, 0xFF00 | cpu.c as u16, cpu.a),
            LoadOp::Ldhac => cpu.a = cpu.read8(mem, 0xFF00 | cpu.c as u16),
            LoadOp::StoreA => {
                let addr = cpu.fetch16(mem);
                cpu.write8(mem, addr, cpu.a);
            }
            LoadOp::LoadA => {
                let addr = cpu.fetch16(mem);
                cpu.a = cpu.read8(mem, addr);
            }
        }
    }

    /// Returns the number of ticks to will take to complete this instruction.
    pub fn length(&self) -> u8 {
        match self {
            LoadOp::Basic {
                dest: RegOrPointer::Reg(_),
                src: RegOrPointer::Reg(_),
            } => 4,
            LoadOp::Basic { .. } => 8,
            LoadOp::Direct16(_) => 12,
            LoadOp::Direct(RegOrPointer::Pointer) => 12,
            LoadOp::Direct(RegOrPointer::Reg(_)) => 8,
            LoadOp::LoadIntoA(_) | LoadOp::StoreFromA(_) => 8,
            LoadOp::StoreSP => 20,
            LoadOp::HLIntoSP => 8,
            LoadOp::SPIntoHL => 12,
            LoadOp::Pop(_) => 12,
            LoadOp::Push(_) => 16,
            LoadOp::StoreHigh | LoadOp::LoadHigh => 12,
            LoadOp::Ldhca | LoadOp::Ldhac => 8,
            LoadOp::StoreA | LoadOp::LoadA => 16,
        }
    }

    /// Returns the size of the bytes to took to construct this instruction
    pub const fn size(&self) -> u8 {
        match self {
            LoadOp::Basic { .. } => 1,
            LoadOp::Direct16(_) => 3,
            LoadOp::Direct(_) => 2,
            LoadOp::LoadIntoA(_) | LoadOp::StoreFromA(_) => 1,
            LoadOp::StoreSP => 3,
            LoadOp::HLIntoSP => 1,
            LoadOp::SPIntoHL => 2,
            LoadOp::Pop(_) | LoadOp::Push(_) => 1,
            LoadOp::StoreHigh | LoadOp::LoadHigh => 2,
            LoadOp::Ldhca | LoadOp::Ldhac => 1,
            LoadOp::StoreA | LoadOp::LoadA => 3,
        }
    }

    pub fn mnemonic(&self) -> Mnemonic {
        match self {
            LoadOp::Pop(_) => Mnemonic::POP,
            LoadOp::Push(_) => Mnemonic::PUSH,
            LoadOp::StoreHigh | LoadOp::LoadHigh | LoadOp::Ldhca | LoadOp::Ldhac => Mnemonic::LDH,
            _ => Mnemonic::LD,
        }
    }
}
