//! The op code tables. Both tables are decoded once, on first use, from the bit fields of the op
//! codes rather than listed out by hand.

use std::sync::LazyLock;

use crate::instruction::*;

/// Everything the CPU needs to know about an op code before running it.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Opcode {
    pub code: u8,
    /// Whether this op code lives in the 0xCB table.
    pub prefixed: bool,
    pub instruction: Instruction,
    /// The cost in ticks. For conditional instructions, this is the cost when the branch is taken.
    pub cycles: u8,
    /// The cost in ticks when a conditional branch is not taken.
    pub cycles_not_taken: u8,
}

impl Opcode {
    fn new(code: u8, prefixed: bool, instruction: Instruction) -> Self {
        Self {
            code,
            prefixed,
            instruction,
            cycles: instruction.length(),
            cycles_not_taken: instruction.length_not_taken(),
        }
    }

    pub fn mnemonic(&self) -> Mnemonic {
        self.instruction.mnemonic()
    }

    /// The number of bytes the instruction occupies, op code included.
    pub fn size(&self) -> u8 {
        self.instruction.size()
    }
}

static OP_LOOKUP: LazyLock<[Option<Opcode>; 256]> = LazyLock::new(|| {
    std::array::from_fn(|code| {
        let code = code as u8;
        decode(code).map(|instr| Opcode::new(code, false, instr))
    })
});

static PREFIXED_OP_LOOKUP: LazyLock<[Option<Opcode>; 256]> = LazyLock::new(|| {
    std::array::from_fn(|code| {
        let code = code as u8;
        Some(Opcode::new(code, true, decode_prefixed(code)))
    })
});

/// Looks up an op code in the primary table. `None` means the op code is one of the eleven that do
/// not exist.
pub fn lookup(code: u8) -> Option<Opcode> {
    OP_LOOKUP[code as usize]
}

/// Looks up the byte that follows a 0xCB prefix.
pub fn lookup_prefixed(code: u8) -> Option<Opcode> {
    PREFIXED_OP_LOOKUP[code as usize]
}

fn decode(op: u8) -> Option<Instruction> {
    use ArithmeticOp as A;
    use Instruction as I;
    use JumpOp as J;
    use LoadOp as L;

    let reg = RegOrPointer::from_bits;
    let wide = |bits: u8| match bits & 0x03 {
        0 => WideReg::BC,
        1 => WideReg::DE,
        2 => WideReg::HL,
        _ => WideReg::SP,
    };
    let stacked = |bits: u8| match bits & 0x03 {
        0 => WideRegWithoutSP::BC,
        1 => WideRegWithoutSP::DE,
        2 => WideRegWithoutSP::HL,
        _ => WideRegWithoutSP::AF,
    };
    let cond = |op: u8| Condition::from_bits(op >> 3);

    let instr = match op {
        0x00 => I::ControlOp(ControlOp::Noop),
        0x10 => I::ControlOp(ControlOp::Stop),
        0x76 => I::ControlOp(ControlOp::Halt),
        0x07 => I::Rlca,
        0x0F => I::Rrca,
        0x17 => I::Rla,
        0x1F => I::Rra,
        0x27 => I::Daa,
        0x2F => I::Cpl,
        0x37 => I::Scf,
        0x3F => I::Ccf,
        0xF3 => I::Di,
        0xFB => I::Ei,
        0xCB => I::Prefixed,
        0x08 => I::Load(L::StoreSP),
        0x01 | 0x11 | 0x21 | 0x31 => I::Load(L::Direct16(wide(op >> 4))),
        0x02 | 0x12 | 0x22 | 0x32 => I::Load(L::StoreFromA(LoadAPointer::from_bits(op >> 4))),
        0x0A | 0x1A | 0x2A | 0x3A => I::Load(L::LoadIntoA(LoadAPointer::from_bits(op >> 4))),
        0x03 | 0x13 | 0x23 | 0x33 => I::Arithmetic(A::Inc16(wide(op >> 4))),
        0x0B | 0x1B | 0x2B | 0x3B => I::Arithmetic(A::Dec16(wide(op >> 4))),
        0x09 | 0x19 | 0x29 | 0x39 => I::Arithmetic(A::Add16(wide(op >> 4))),
        0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => {
            I::Arithmetic(A::Inc(reg(op >> 3)))
        }
        0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => {
            I::Arithmetic(A::Dec(reg(op >> 3)))
        }
        0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => I::Load(L::Direct(reg(op >> 3))),
        0x18 => I::Jump(J::Relative),
        0x20 | 0x28 | 0x30 | 0x38 => I::Jump(J::ConditionalRelative(cond(op))),
        0x40..=0x7F => I::Load(L::Basic {
            dest: reg(op >> 3),
            src: reg(op),
        }),
        0x80..=0xBF => I::Arithmetic(A::accumulator(op >> 3, reg(op).into())),
        0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => {
            I::Arithmetic(A::accumulator(op >> 3, SomeByte::Direct))
        }
        0xC0 | 0xC8 | 0xD0 | 0xD8 => I::Jump(J::ConditionalReturn(cond(op))),
        0xC9 => I::Jump(J::Return),
        0xD9 => I::Jump(J::ReturnAndEnable),
        0xC2 | 0xCA | 0xD2 | 0xDA => I::Jump(J::ConditionalAbsolute(cond(op))),
        0xC3 => I::Jump(J::Absolute),
        0xE9 => I::Jump(J::JumpToHL),
        0xC4 | 0xCC | 0xD4 | 0xDC => I::Jump(J::ConditionalCall(cond(op))),
        0xCD => I::Jump(J::Call),
        0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => I::Jump(J::restart(op)),
        0xC1 | 0xD1 | 0xE1 | 0xF1 => I::Load(L::Pop(stacked(op >> 4))),
        0xC5 | 0xD5 | 0xE5 | 0xF5 => I::Load(L::Push(stacked(op >> 4))),
        0xE0 => I::Load(L::StoreHigh),
        0xF0 => I::Load(L::LoadHigh),
        0xE2 => I::Load(L::Ldhca),
        0xF2 => I::Load(L::Ldhac),
        0xEA => I::Load(L::StoreA),
        0xFA => I::Load(L::LoadA),
        0xE8 => I::Arithmetic(A::AddSP),
        0xF8 => I::Load(L::SPIntoHL),
        0xF9 => I::Load(L::HLIntoSP),
        0xD3 | 0xDB | 0xDD | 0xE3 | 0xE4 | 0xEB | 0xEC | 0xED | 0xF4 | 0xFC | 0xFD => return None,
    };
    Some(instr)
}

fn decode_prefixed(op: u8) -> Instruction {
    let reg = RegOrPointer::from_bits(op);
    let bit = (op >> 3) & 0x07;
    match op >> 6 {
        0 => Instruction::BitShift(BitShiftOp::from_bits(bit, reg)),
        1 => Instruction::Bit(BitOp {
            bit,
            reg,
            op: BitOpInner::Bit,
        }),
        2 => Instruction::Bit(BitOp {
            bit,
            reg,
            op: BitOpInner::Res,
        }),
        _ => Instruction::Bit(BitOp {
            bit,
            reg,
            op: BitOpInner::Set,
        }),
    }
}
