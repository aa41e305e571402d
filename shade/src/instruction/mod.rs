use derive_more::From;
use derive_more::IsVariant;

use crate::cpu::Cpu;
use crate::cpu::alu;
use crate::cpu::Flags;
use crate::mem::MemoryLike;

mod arithmetic;
mod bit;
mod bit_shift;
mod control;
mod interrupt;
mod jump;
mod load;

pub use arithmetic::*;
pub use bit::*;
pub use bit_shift::*;
pub use control::*;
pub use interrupt::*;
pub use jump::*;
pub use load::*;

/// A fully decoded instruction. Immediate operands are not part of the instruction: they are
/// fetched from the instruction stream while the instruction executes, which is also where their
/// bus timing comes from.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, IsVariant, derive_more::Display)]
#[display("{_variant}")]
pub enum Instruction {
    #[display("{_0}")]
    Load(LoadOp),
    #[display("{_0}")]
    ControlOp(ControlOp),
    #[display("{_0}")]
    Jump(JumpOp),
    #[display("{_0}")]
    Arithmetic(ArithmeticOp),
    #[display("{_0}")]
    BitShift(BitShiftOp),
    #[display("{_0}")]
    Bit(BitOp),
    #[display("DAA")]
    Daa,
    /// Set Carry.
    #[display("SCF")]
    Scf,
    /// ComPLement accumulator.
    #[display("CPL")]
    Cpl,
    /// CompLement carry flag.
    #[display("CCF")]
    Ccf,
    /// Disable interupts
    #[display("DI")]
    Di,
    /// Enable interupts, one instruction late
    #[display("EI")]
    Ei,
    /// The RLA, RLCA, RRA, RRCA are, in a sense, bit shift operations. However, they are the only
    /// shifting ops that are not prefixed, and they always clear Z.
    #[display("RLA")]
    Rla,
    #[display("RLCA")]
    Rlca,
    #[display("RRA")]
    Rra,
    #[display("RRCA")]
    Rrca,
    /// Load the next byte as an op code for a prefixed instruction
    #[display("PREFIX CB")]
    Prefixed,
}

/// The operation name of an instruction, without its operands.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
pub enum Mnemonic {
    LD,
    LDH,
    PUSH,
    POP,
    ADD,
    ADC,
    SUB,
    SBC,
    AND,
    XOR,
    OR,
    CP,
    INC,
    DEC,
    DAA,
    CPL,
    CCF,
    SCF,
    NOP,
    HALT,
    STOP,
    DI,
    EI,
    RLCA,
    RLA,
    RRCA,
    RRA,
    JP,
    JR,
    CALL,
    RET,
    RETI,
    RST,
    PREFIX,
    RLC,
    RRC,
    RL,
    RR,
    SLA,
    SRA,
    SWAP,
    SRL,
    BIT,
    RES,
    SET,
}

impl Instruction {
    pub(crate) fn execute(self, cpu: &mut Cpu, mem: &mut impl MemoryLike) {
        match self {
            Instruction::Load(op) => op.execute(cpu, mem),
            Instruction::ControlOp(op) => op.execute(cpu, mem),
            Instruction::Jump(op) => op.execute(cpu, mem),
            Instruction::Arithmetic(op) => op.execute(cpu, mem),
            Instruction::BitShift(op) => op.execute(cpu, mem),
            Instruction::Bit(op) => op.execute(cpu, mem),
            Instruction::Daa => cpu.a = alu::daa(&mut cpu.f, cpu.a),
            Instruction::Scf => {
                cpu.f.n = false;
                cpu.f.h = false;
                cpu.f.c = true;
            }
            Instruction::Cpl => {
                cpu.a = !cpu.a;
                cpu.f.n = true;
                cpu.f.h = true;
            }
            Instruction::Ccf => {
                cpu.f.n = false;
                cpu.f.h = false;
                cpu.f.c = !cpu.f.c;
            }
            Instruction::Di => {
                cpu.ime = false;
                cpu.pending_enable_interrupts = false;
            }
            Instruction::Ei => cpu.pending_enable_interrupts = true,
            Instruction::Rla => {
                cpu.a = alu::rl(&mut cpu.f, cpu.a);
                cpu.f.z = false;
            }
            Instruction::Rlca => {
                cpu.a = alu::rlc(&mut cpu.f, cpu.a);
                cpu.f.z = false;
            }
            Instruction::Rra => {
                cpu.a = alu::rr(&mut cpu.f, cpu.a);
                cpu.f.z = false;
            }
            Instruction::Rrca => {
                cpu.a = alu::rrc(&mut cpu.f, cpu.a);
                cpu.f.z = false;
            }
            // The CPU resolves the prefix before executing anything.
            Instruction::Prefixed => {}
        }
    }

    /// Returns the number of ticks it takes to complete this instruction when any branch it
    /// contains is taken.
    pub fn length(&self) -> u8 {
        match self {
            Instruction::Load(op) => op.length(),
            Instruction::ControlOp(op) => op.length(),
            Instruction::Jump(op) => op.length(),
            Instruction::Arithmetic(op) => op.length(),
            Instruction::BitShift(op) => op.length(),
            Instruction::Bit(op) => op.length(),
            Instruction::Daa
            | Instruction::Scf
            | Instruction::Cpl
            | Instruction::Ccf
            | Instruction::Di
            | Instruction::Ei
            | Instruction::Rla
            | Instruction::Rlca
            | Instruction::Rra
            | Instruction::Rrca
            | Instruction::Prefixed => 4,
        }
    }

    /// Returns the number of ticks when a conditional branch is not taken. For everything else,
    /// this is the same as [`length`](Self::length).
    pub fn length_not_taken(&self) -> u8 {
        match self {
            Instruction::Jump(op) => op.length_not_taken(),
            op => op.length(),
        }
    }

    /// The condition this instruction branches on, if any.
    pub fn condition(&self) -> Option<Condition> {
        match self {
            Instruction::Jump(op) => op.condition(),
            _ => None,
        }
    }

    /// Returns the size of the bytes to took to construct this instruction
    pub const fn size(&self) -> u8 {
        match self {
            Instruction::Load(op) => op.size(),
            Instruction::ControlOp(op) => op.size(),
            Instruction::Jump(op) => op.size(),
            Instruction::Arithmetic(op) => op.size(),
            Instruction::BitShift(_) | Instruction::Bit(_) | Instruction::Prefixed => 2,
            Instruction::Daa
            | Instruction::Scf
            | Instruction::Cpl
            | Instruction::Ccf
            | Instruction::Di
            | Instruction::Ei
            | Instruction::Rla
            | Instruction::Rlca
            | Instruction::Rra
            | Instruction::Rrca => 1,
        }
    }

    pub fn mnemonic(&self) -> Mnemonic {
        match self {
            Instruction::Load(op) => op.mnemonic(),
            Instruction::ControlOp(op) => op.mnemonic(),
            Instruction::Jump(op) => op.mnemonic(),
            Instruction::Arithmetic(op) => op.mnemonic(),
            Instruction::BitShift(op) => op.mnemonic(),
            Instruction::Bit(op) => op.mnemonic(),
            Instruction::Daa => Mnemonic::DAA,
            Instruction::Scf => Mnemonic::SCF,
            Instruction::Cpl => Mnemonic::CPL,
            Instruction::Ccf => Mnemonic::CCF,
            Instruction::Di => Mnemonic::DI,
            Instruction::Ei => Mnemonic::EI,
            Instruction::Rla => Mnemonic::RLA,
            Instruction::Rlca => Mnemonic::RLCA,
            Instruction::Rra => Mnemonic::RRA,
            Instruction::Rrca => Mnemonic::RRCA,
            Instruction::Prefixed => Mnemonic::PREFIX,
        }
    }
}

/// Either an 8-bit operand held in a register/the memory that HL points to or an immediate byte
/// that follows the op code.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, From, IsVariant, derive_more::Display)]
#[display("{_variant}")]
pub enum SomeByte {
    #[display("{_0}")]
    Referenced(RegOrPointer),
    #[display("n8")]
    Direct,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
#[display("{_variant}")]
pub enum WideReg {
    #[display("BC")]
    BC,
    #[display("DE")]
    DE,
    #[display("HL")]
    HL,
    #[display("SP")]
    SP,
}

/// The register pairs used by PUSH and POP, which swap SP for AF.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
#[display("{_variant}")]
pub enum WideRegWithoutSP {
    #[display("BC")]
    BC,
    #[display("DE")]
    DE,
    #[display("HL")]
    HL,
    #[display("AF")]
    AF,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
#[display("{_variant}")]
pub enum HalfRegister {
    #[display("A")]
    A,
    #[display("B")]
    B,
    #[display("C")]
    C,
    #[display("D")]
    D,
    #[display("E")]
    E,
    #[display("H")]
    H,
    #[display("L")]
    L,
}

/// An 8-bit operand: one of the half registers or the byte HL points to.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, From, IsVariant, derive_more::Display)]
#[display("{_variant}")]
pub enum RegOrPointer {
    #[display("{_0}")]
    Reg(HalfRegister),
    #[display("(HL)")]
    Pointer,
}

impl RegOrPointer {
    /// Decodes the three bit register field used throughout the op code table.
    pub(crate) const fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Self::Reg(HalfRegister::B),
            1 => Self::Reg(HalfRegister::C),
            2 => Self::Reg(HalfRegister::D),
            3 => Self::Reg(HalfRegister::E),
            4 => Self::Reg(HalfRegister::H),
            5 => Self::Reg(HalfRegister::L),
            6 => Self::Pointer,
            _ => Self::Reg(HalfRegister::A),
        }
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
#[display("{_variant}")]
pub enum Condition {
    #[display("Z")]
    Zero,
    #[display("NZ")]
    NotZero,
    #[display("C")]
    Carry,
    #[display("NC")]
    NotCarry,
}

impl Condition {
    pub(crate) const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::NotZero,
            1 => Self::Zero,
            2 => Self::NotCarry,
            _ => Self::Carry,
        }
    }
}

/// The pointers that A can be loaded from/stored to in a single byte instruction.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, derive_more::Display)]
#[display("{_variant}")]
pub enum LoadAPointer {
    #[display("(BC)")]
    BC,
    #[display("(DE)")]
    DE,
    /// Use HL and then increment it.
    #[display("(HL+)")]
    Hli,
    /// Use HL and then decrement it.
    #[display("(HL-)")]
    Hld,
}

impl LoadAPointer {
    pub(crate) const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::BC,
            1 => Self::DE,
            2 => Self::Hli,
            _ => Self::Hld,
        }
    }
}
