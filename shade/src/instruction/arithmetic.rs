use super::*;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
#[display("{_variant}")]
pub enum ArithmeticOp {
    #[display("ADD A, {_0}")]
    Add(SomeByte),
    #[display("ADD HL, {_0}")]
    Add16(WideReg),
    #[display("ADD SP, e8")]
    AddSP,
    #[display("ADC A, {_0}")]
    Adc(SomeByte),
    #[display("SUB A, {_0}")]
    Sub(SomeByte),
    #[display("SBC A, {_0}")]
    Sbc(SomeByte),
    #[display("AND A, {_0}")]
    And(SomeByte),
    #[display("XOR A, {_0}")]
    Xor(SomeByte),
    #[display("OR A, {_0}")]
    Or(SomeByte),
    #[display("CP A, {_0}")]
    Cp(SomeByte),
    #[display("INC {_0}")]
    Inc(RegOrPointer),
    #[display("INC {_0}")]
    Inc16(WideReg),
    #[display("DEC {_0}")]
    Dec(RegOrPointer),
    #[display("DEC {_0}")]
    Dec16(WideReg),
}

impl ArithmeticOp {
    /// Decodes the accumulator ops (ADD through CP) from bits 3-5 of their op code.
    pub(crate) const fn accumulator(bits: u8, src: SomeByte) -> Self {
        match bits & 0x07 {
            0 => Self::Add(src),
            1 => Self::Adc(src),
            2 => Self::Sub(src),
            3 => Self::Sbc(src),
            4 => Self::And(src),
            5 => Self::Xor(src),
            6 => Self::Or(src),
            _ => Self::Cp(src),
        }
    }

    pub(crate) fn execute(self, cpu: &mut Cpu, mem: &mut impl MemoryLike) {
        match self {
            ArithmeticOp::Add(src) => {
                let val = cpu.some_byte(mem, src);
                cpu.a = alu::add(&mut cpu.f, cpu.a, val, false);
            }
            ArithmeticOp::Adc(src) => {
                let val = cpu.some_byte(mem, src);
                let carry = cpu.f.c;
                cpu.a = alu::add(&mut cpu.f, cpu.a, val, carry);
            }
            ArithmeticOp::Sub(src) => {
                let val = cpu.some_byte(mem, src);
                cpu.a = alu::sub(&mut cpu.f, cpu.a, val, false);
            }
            ArithmeticOp::Sbc(src) => {
                let val = cpu.some_byte(mem, src);
                let carry = cpu.f.c;
                cpu.a = alu::sub(&mut cpu.f, cpu.a, val, carry);
            }
            ArithmeticOp::And(src) => {
                let val = cpu.some_byte(mem, src);
                cpu.a = alu::and(&mut cpu.f, cpu.a, val);
            }
            ArithmeticOp::Xor(src) => {
                let val = cpu.some_byte(mem, src);
                cpu.a = alu::xor(&mut cpu.f, cpu.a, val);
            }
            ArithmeticOp::Or(src) => {
                let val = cpu.some_byte(mem, src);
                cpu.a = alu::or(&mut cpu.f, cpu.a, val);
            }
            ArithmeticOp::Cp(src) => {
                let val = cpu.some_byte(mem, src);
                alu::sub(&mut cpu.f, cpu.a, val, false);
            }
            ArithmeticOp::Add16(reg) => {
                let (hl, operand) = (cpu.hl(), cpu.wide(reg));
                let val = alu::add16(&mut cpu.f, hl, operand);
                cpu.idle(mem);
                cpu.set_hl(val);
            }
            ArithmeticOp::AddSP => {
                let offset = cpu.fetch8(mem);
                cpu.sp = alu::add_sp_offset(&mut cpu.f, cpu.sp, offset);
                cpu.idle(mem);
                cpu.idle(mem);
            }
            ArithmeticOp::Inc(reg) => {
                let val = cpu.read_operand(mem, reg);
                let val = alu::inc(&mut cpu.f, val);
                cpu.write_operand(mem, reg, val);
            }
            ArithmeticOp::Dec(reg) => {
                let val = cpu.read_operand(mem, reg);
                let val = alu::dec(&mut cpu.f, val);
                cpu.write_operand(mem, reg, val);
            }
            ArithmeticOp::Inc16(reg) => {
                cpu.set_wide(reg, cpu.wide(reg).wrapping_add(1));
                cpu.idle(mem);
            }
            ArithmeticOp::Dec16(reg) => {
                cpu.set_wide(reg, cpu.wide(reg).wrapping_sub(1));
                cpu.idle(mem);
            }
        }
    }

    /// Returns the number of ticks to will take to complete this instruction.
    pub fn length(&self) -> u8 {
        match self {
            ArithmeticOp::Add(src)
            | ArithmeticOp::Adc(src)
            | ArithmeticOp::Sub(src)
            | ArithmeticOp::Sbc(src)
            | ArithmeticOp::And(src)
            | ArithmeticOp::Xor(src)
            | ArithmeticOp::Or(src)
            | ArithmeticOp::Cp(src) => match src {
                SomeByte::Referenced(RegOrPointer::Reg(_)) => 4,
                _ => 8,
            },
            ArithmeticOp::Inc(reg) | ArithmeticOp::Dec(reg) => {
                if reg.is_pointer() {
                    12
                } else {
                    4
                }
            }
            ArithmeticOp::Add16(_) | ArithmeticOp::Inc16(_) | ArithmeticOp::Dec16(_) => 8,
            ArithmeticOp::AddSP => 16,
        }
    }

    /// Returns the size of the bytes to took to construct this instruction
    pub const fn size(&self) -> u8 {
        match self {
            ArithmeticOp::Add(SomeByte::Direct)
            | ArithmeticOp::Adc(SomeByte::Direct)
            | ArithmeticOp::Sub(SomeByte::Direct)
            | ArithmeticOp::Sbc(SomeByte::Direct)
            | ArithmeticOp::And(SomeByte::Direct)
            | ArithmeticOp::Xor(SomeByte::Direct)
            | ArithmeticOp::Or(SomeByte::Direct)
            | ArithmeticOp::Cp(SomeByte::Direct)
            | ArithmeticOp::AddSP => 2,
            _ => 1,
        }
    }

    pub fn mnemonic(&self) -> Mnemonic {
        match self {
            ArithmeticOp::Add(_) | ArithmeticOp::Add16(_) | ArithmeticOp::AddSP => Mnemonic::ADD,
            ArithmeticOp::Adc(_) => Mnemonic::ADC,
            ArithmeticOp::Sub(_) => Mnemonic::SUB,
            ArithmeticOp::Sbc(_) => Mnemonic::SBC,
            ArithmeticOp::And(_) => Mnemonic::AND,
            ArithmeticOp::Xor(_) => Mnemonic::XOR,
            ArithmeticOp::Or(_) => Mnemonic::OR,
            ArithmeticOp::Cp(_) => Mnemonic::CP,
            ArithmeticOp::Inc(_) | ArithmeticOp::Inc16(_) => Mnemonic::INC,
            ArithmeticOp::Dec(_) | ArithmeticOp::Dec16(_) => Mnemonic::DEC,
        }
    }
}
