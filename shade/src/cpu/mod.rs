use std::ops::Index;
use std::ops::IndexMut;

use serde::Deserialize;
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::EmulationError;
use crate::instruction::Condition;
use crate::instruction::HalfRegister;
use crate::instruction::Interrupt;
use crate::instruction::LoadAPointer;
use crate::instruction::RegOrPointer;
use crate::instruction::SomeByte;
use crate::instruction::WideReg;
use crate::instruction::WideRegWithoutSP;
use crate::lookup;
use crate::mem::MemoryLike;

pub(crate) mod alu;

/// The number of ticks (T-cycles) in one M-cycle, which is the granularity of every bus access.
pub const TICKS_PER_M_CYCLE: u8 = 4;

#[derive(
    Debug, Default, Hash, Clone, PartialEq, Eq, derive_more::Display, Serialize, Deserialize,
)]
#[display(
    "CPU {{ A=0x{:0>2X} F={} B=0x{:0>2X} C=0x{:0>2X} D=0x{:0>2X} E=0x{:0>2X} H=0x{:0>2X} L=0x{:0>2X} SP=0x{:0>4X} PC=0x{:0>4X} IME={} State={} }}",
    a,
    f,
    b,
    c,
    d,
    e,
    h,
    l,
    sp,
    pc,
    ime,
    state
)]
pub struct Cpu {
    pub a: u8,
    pub f: Flags,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    /// The SP register
    pub sp: u16,
    /// The PC register
    pub pc: u16,
    pub ime: bool,
    /// Set by EI and RETI. IME is set at the end of the next interrupt check, which gives the one
    /// instruction delay.
    pub pending_enable_interrupts: bool,
    /// Set when HALT is executed with IME clear and an interrupt pending. The next op code fetch
    /// does not increment PC, so that byte is executed twice.
    pub halt_bug_pending: bool,
    /// While halted or stopped, the CPU can continue to be clocked, but nothing is fetched.
    pub state: CpuState,
    /// Ticks charged so far for the instruction (or interrupt dispatch) in progress. Every bus
    /// access and idle M-cycle adds to this.
    #[serde(skip)]
    spent: u8,
}

#[derive(
    Debug, Default, Hash, Clone, Copy, PartialEq, Eq, derive_more::Display, Serialize, Deserialize,
)]
pub enum CpuState {
    #[default]
    Running,
    Halted,
    Stopped,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Hash, derive_more::Display, Serialize, Deserialize,
)]
#[display(
    "Flags(Z={} N={} H={} C={})",
    *z as u8,
    *n as u8,
    *h as u8,
    *c as u8
)]
pub struct Flags {
    /// The zero flag
    pub z: bool,
    /// The substraction flag
    pub n: bool,
    /// The half-carry flag
    pub h: bool,
    /// The full carry flag
    pub c: bool,
}

impl From<u8> for Flags {
    /// The low nibble of F does not exist, so it is dropped.
    fn from(value: u8) -> Self {
        Self {
            z: check_bit_const::<7>(value),
            n: check_bit_const::<6>(value),
            h: check_bit_const::<5>(value),
            c: check_bit_const::<4>(value),
        }
    }
}

impl Flags {
    pub fn set_from_byte(&mut self, val: u8) {
        *self = val.into();
    }

    pub fn set_for_byte_shift_op(&mut self, z: bool, c: bool) {
        self.z = z;
        self.n = false;
        self.h = false;
        self.c = c;
    }

    pub fn as_byte(&self) -> u8 {
        bool_to_mask::<7>(self.z)
            | bool_to_mask::<6>(self.n)
            | bool_to_mask::<5>(self.h)
            | bool_to_mask::<4>(self.c)
    }
}

const fn bit_select<const B: u8>() -> u8 {
    const {
        match B {
            n @ 0..=7 => 0x1 << n,
            _ => panic!("bit index out of range"),
        }
    }
}

const fn bool_to_mask<const B: u8>(val: bool) -> u8 {
    (val as u8) << B
}

pub const fn check_bit_const<const B: u8>(src: u8) -> bool {
    (src & bit_select::<B>()) == bit_select::<B>()
}

impl Cpu {
    /// A CPU with every register cleared.
    pub fn new() -> Self {
        Self {
            ..Default::default()
        }
    }

    /// Constructs a CPU with the register values the boot ROM leaves behind, ready to start the
    /// cartridge at 0x0100.
    pub fn power_on() -> Self {
        Self {
            a: 0x01,
            f: Flags::from(0xB0),
            b: 0x00,
            c: 0x13,
            d: 0x00,
            e: 0xD8,
            h: 0x01,
            l: 0x4D,
            sp: 0xFFFE,
            pc: 0x0100,
            ..Default::default()
        }
    }

    /// The flag half of AF.
    pub fn flags(&self) -> &Flags {
        &self.f
    }

    pub fn flags_mut(&mut self) -> &mut Flags {
        &mut self.f
    }

    /// Z
    pub fn zero_flag(&self) -> bool {
        self.f.z
    }

    /// N
    pub fn subtraction_flag(&self) -> bool {
        self.f.n
    }

    /// H
    pub fn half_carry_flag(&self) -> bool {
        self.f.h
    }

    /// Returns the value of the C flag
    pub fn carry_flag(&self) -> bool {
        self.f.c
    }

    pub fn af(&self) -> u16 {
        u16::from_be_bytes([self.a, self.f.as_byte()])
    }

    pub fn bc(&self) -> u16 {
        u16::from_be_bytes([self.b, self.c])
    }

    pub fn de(&self) -> u16 {
        u16::from_be_bytes([self.d, self.e])
    }

    pub fn hl(&self) -> u16 {
        u16::from_be_bytes([self.h, self.l])
    }

    pub fn set_af(&mut self, val: u16) {
        let [a, f] = val.to_be_bytes();
        self.a = a;
        self.f.set_from_byte(f);
    }

    pub fn set_bc(&mut self, val: u16) {
        [self.b, self.c] = val.to_be_bytes();
    }

    pub fn set_de(&mut self, val: u16) {
        [self.d, self.e] = val.to_be_bytes();
    }

    pub fn set_hl(&mut self, val: u16) {
        [self.h, self.l] = val.to_be_bytes();
    }

    pub fn wide(&self, reg: WideReg) -> u16 {
        match reg {
            WideReg::BC => self.bc(),
            WideReg::DE => self.de(),
            WideReg::HL => self.hl(),
            WideReg::SP => self.sp,
        }
    }

    pub fn set_wide(&mut self, reg: WideReg, val: u16) {
        match reg {
            WideReg::BC => self.set_bc(val),
            WideReg::DE => self.set_de(val),
            WideReg::HL => self.set_hl(val),
            WideReg::SP => self.sp = val,
        }
    }

    pub fn wide_without_sp(&self, reg: WideRegWithoutSP) -> u16 {
        match reg {
            WideRegWithoutSP::BC => self.bc(),
            WideRegWithoutSP::DE => self.de(),
            WideRegWithoutSP::HL => self.hl(),
            WideRegWithoutSP::AF => self.af(),
        }
    }

    pub fn set_wide_without_sp(&mut self, reg: WideRegWithoutSP, val: u16) {
        match reg {
            WideRegWithoutSP::BC => self.set_bc(val),
            WideRegWithoutSP::DE => self.set_de(val),
            WideRegWithoutSP::HL => self.set_hl(val),
            WideRegWithoutSP::AF => self.set_af(val),
        }
    }

    pub fn condition_passed(&self, cond: Condition) -> bool {
        match cond {
            Condition::Zero => self.f.z,
            Condition::NotZero => !self.f.z,
            Condition::Carry => self.f.c,
            Condition::NotCarry => !self.f.c,
        }
    }

    /// Fetches, decodes, and executes one instruction. Returns the number of ticks it took.
    ///
    /// Every memory access advances the rest of the system by one M-cycle before it happens, as
    /// does every internal cycle of the instruction. Once the instruction is done, any cycles left
    /// in its cost are spent idling, so the system always advances by exactly the returned amount.
    ///
    /// While halted or stopped, this idles for a single M-cycle.
    pub fn step(&mut self, mem: &mut impl MemoryLike) -> Result<u8, EmulationError> {
        self.spent = 0;
        if self.state != CpuState::Running {
            self.idle(mem);
            return Ok(self.spent);
        }
        let pc = self.pc;
        let op = self.fetch_op_code(mem);
        let mut opcode = lookup::lookup(op).ok_or(EmulationError::IllegalOpcode { opcode: op, pc })?;
        if opcode.instruction.is_prefixed() {
            let op = self.fetch8(mem);
            opcode = lookup::lookup_prefixed(op)
                .ok_or(EmulationError::IllegalPrefixedOpcode { opcode: op, pc })?;
        }
        trace!("0x{pc:0>4X}: {}", opcode.instruction);
        let cost = match opcode.instruction.condition() {
            Some(cond) if !self.condition_passed(cond) => opcode.cycles_not_taken,
            _ => opcode.cycles,
        };
        opcode.instruction.execute(self, mem);
        self.finish(mem, cost);
        Ok(cost)
    }

    /// Checks for pending interrupts (IE & IF). Any pending interrupt wakes a halted CPU, even with
    /// IME clear. If IME is set, the highest priority one is dispatched. Afterwards, an EI/RETI
    /// executed by the previous instruction takes effect.
    ///
    /// Returns the number of ticks spent, which is zero when nothing was done.
    pub fn handle_interrupts(&mut self, mem: &mut impl MemoryLike) -> u8 {
        self.spent = 0;
        let enable = std::mem::take(&mut self.pending_enable_interrupts);
        let pending = mem.pending_interrupts();
        let mut dispatched = false;
        if let Some(interrupt) = Interrupt::highest_priority(pending) {
            let awake = match self.state {
                CpuState::Running => true,
                CpuState::Halted => {
                    debug!("Waking from HALT for {interrupt}");
                    self.state = CpuState::Running;
                    self.idle(mem);
                    true
                }
                CpuState::Stopped if pending & Interrupt::Joypad.mask() != 0 => {
                    debug!("Waking from STOP");
                    self.state = CpuState::Running;
                    true
                }
                CpuState::Stopped => false,
            };
            if awake && self.ime {
                debug!("Dispatching {interrupt} interrupt from 0x{:0>4X}", self.pc);
                interrupt.dispatch(self, mem);
                dispatched = true;
            }
        }
        if enable && !dispatched {
            self.ime = true;
        }
        self.spent
    }

    /// Idles out whatever is left of the instruction's cost.
    fn finish(&mut self, mem: &mut impl MemoryLike, cost: u8) {
        let remaining = cost.saturating_sub(self.spent) / TICKS_PER_M_CYCLE;
        for _ in 0..remaining {
            self.idle(mem);
        }
    }

    /// Reads the op code at PC. PC is not moved if the HALT bug was just triggered.
    fn fetch_op_code(&mut self, mem: &mut impl MemoryLike) -> u8 {
        let op = self.read8(mem, self.pc);
        if self.halt_bug_pending {
            self.halt_bug_pending = false;
        } else {
            self.pc = self.pc.wrapping_add(1);
        }
        op
    }

    pub(crate) fn read8(&mut self, mem: &mut impl MemoryLike, addr: u16) -> u8 {
        self.spent = self.spent.saturating_add(TICKS_PER_M_CYCLE);
        mem.read_byte(addr)
    }

    pub(crate) fn write8(&mut self, mem: &mut impl MemoryLike, addr: u16, val: u8) {
        self.spent = self.spent.saturating_add(TICKS_PER_M_CYCLE);
        mem.write_byte(addr, val)
    }

    /// An M-cycle with no bus access.
    pub(crate) fn idle(&mut self, mem: &mut impl MemoryLike) {
        self.spent = self.spent.saturating_add(TICKS_PER_M_CYCLE);
        mem.idle()
    }

    /// Reads the byte at PC and moves PC past it.
    pub(crate) fn fetch8(&mut self, mem: &mut impl MemoryLike) -> u8 {
        let val = self.read8(mem, self.pc);
        self.pc = self.pc.wrapping_add(1);
        val
    }

    /// Reads a little endian word at PC and moves PC past it.
    pub(crate) fn fetch16(&mut self, mem: &mut impl MemoryLike) -> u16 {
        let lo = self.fetch8(mem);
        let hi = self.fetch8(mem);
        u16::from_le_bytes([lo, hi])
    }

    /// Pushes the high byte then the low byte.
    pub(crate) fn push16(&mut self, mem: &mut impl MemoryLike, val: u16) {
        let [hi, lo] = val.to_be_bytes();
        self.sp = self.sp.wrapping_sub(1);
        self.write8(mem, self.sp, hi);
        self.sp = self.sp.wrapping_sub(1);
        self.write8(mem, self.sp, lo);
    }

    pub(crate) fn pop16(&mut self, mem: &mut impl MemoryLike) -> u16 {
        let lo = self.read8(mem, self.sp);
        self.sp = self.sp.wrapping_add(1);
        let hi = self.read8(mem, self.sp);
        self.sp = self.sp.wrapping_add(1);
        u16::from_le_bytes([lo, hi])
    }

    /// Shared by CALL and RST: an internal cycle, PC is pushed, then the jump.
    pub(crate) fn call(&mut self, mem: &mut impl MemoryLike, addr: u16) {
        self.idle(mem);
        self.push16(mem, self.pc);
        self.pc = addr;
    }

    /// Shared by RET and RETI: PC is popped, then an internal cycle.
    pub(crate) fn ret(&mut self, mem: &mut impl MemoryLike) {
        self.pc = self.pop16(mem);
        self.idle(mem);
    }

    pub(crate) fn read_operand(&mut self, mem: &mut impl MemoryLike, reg: RegOrPointer) -> u8 {
        match reg {
            RegOrPointer::Reg(reg) => self[reg],
            RegOrPointer::Pointer => self.read8(mem, self.hl()),
        }
    }

    pub(crate) fn write_operand(&mut self, mem: &mut impl MemoryLike, reg: RegOrPointer, val: u8) {
        match reg {
            RegOrPointer::Reg(reg) => self[reg] = val,
            RegOrPointer::Pointer => self.write8(mem, self.hl(), val),
        }
    }

    pub(crate) fn some_byte(&mut self, mem: &mut impl MemoryLike, src: SomeByte) -> u8 {
        match src {
            SomeByte::Referenced(reg) => self.read_operand(mem, reg),
            SomeByte::Direct => self.fetch8(mem),
        }
    }

    /// Resolves the address used by the single byte A loads/stores, applying the HL
    /// increment/decrement.
    pub(crate) fn a_pointer(&mut self, ptr: LoadAPointer) -> u16 {
        match ptr {
            LoadAPointer::BC => self.bc(),
            LoadAPointer::DE => self.de(),
            LoadAPointer::Hli => {
                let hl = self.hl();
                self.set_hl(hl.wrapping_add(1));
                hl
            }
            LoadAPointer::Hld => {
                let hl = self.hl();
                self.set_hl(hl.wrapping_sub(1));
                hl
            }
        }
    }
}

impl Index<HalfRegister> for Cpu {
    type Output = u8;

    fn index(&self, index: HalfRegister) -> &Self::Output {
        match index {
            HalfRegister::A => &self.a,
            HalfRegister::B => &self.b,
            HalfRegister::C => &self.c,
            HalfRegister::D => &self.d,
            HalfRegister::E => &self.e,
            HalfRegister::H => &self.h,
            HalfRegister::L => &self.l,
        }
    }
}

impl IndexMut<HalfRegister> for Cpu {
    fn index_mut(&mut self, index: HalfRegister) -> &mut Self::Output {
        match index {
            HalfRegister::A => &mut self.a,
            HalfRegister::B => &mut self.b,
            HalfRegister::C => &mut self.c,
            HalfRegister::D => &mut self.d,
            HalfRegister::E => &mut self.e,
            HalfRegister::H => &mut self.h,
            HalfRegister::L => &mut self.l,
        }
    }
}
