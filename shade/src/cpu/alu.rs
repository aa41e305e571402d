//! The arithmetic half of the CPU. Every function here takes the operand(s) and the flag register
//! and returns the result, so the instruction families only need to decide where the bytes come
//! from and where they go.

use super::Flags;

/// ADD and ADC. `carry_in` is only ever true for ADC.
pub(crate) fn add(flags: &mut Flags, a: u8, b: u8, carry_in: bool) -> u8 {
    let carry = carry_in as u8;
    let result = a.wrapping_add(b).wrapping_add(carry);
    flags.z = result == 0;
    flags.n = false;
    flags.h = (a & 0x0F) + (b & 0x0F) + carry > 0x0F;
    flags.c = a as u16 + b as u16 + carry as u16 > 0xFF;
    result
}

/// SUB, SBC, and CP. CP is a SUB that throws the result away.
pub(crate) fn sub(flags: &mut Flags, a: u8, b: u8, carry_in: bool) -> u8 {
    let carry = carry_in as u8;
    let result = a.wrapping_sub(b).wrapping_sub(carry);
    flags.z = result == 0;
    flags.n = true;
    flags.h = (a & 0x0F) < (b & 0x0F) + carry;
    flags.c = (a as u16) < b as u16 + carry as u16;
    result
}

pub(crate) fn and(flags: &mut Flags, a: u8, b: u8) -> u8 {
    let result = a & b;
    *flags = Flags {
        z: result == 0,
        n: false,
        h: true,
        c: false,
    };
    result
}

pub(crate) fn or(flags: &mut Flags, a: u8, b: u8) -> u8 {
    let result = a | b;
    *flags = Flags {
        z: result == 0,
        ..Flags::default()
    };
    result
}

pub(crate) fn xor(flags: &mut Flags, a: u8, b: u8) -> u8 {
    let result = a ^ b;
    *flags = Flags {
        z: result == 0,
        ..Flags::default()
    };
    result
}

/// 8-bit INC. The carry flag is left alone.
pub(crate) fn inc(flags: &mut Flags, val: u8) -> u8 {
    let result = val.wrapping_add(1);
    flags.z = result == 0;
    flags.n = false;
    flags.h = val & 0x0F == 0x0F;
    result
}

/// 8-bit DEC. The carry flag is left alone.
pub(crate) fn dec(flags: &mut Flags, val: u8) -> u8 {
    let result = val.wrapping_sub(1);
    flags.z = result == 0;
    flags.n = true;
    flags.h = val & 0x0F == 0x00;
    result
}

/// ADD HL, rr. Carries come out of bits 11 and 15 and Z is preserved.
pub(crate) fn add16(flags: &mut Flags, a: u16, b: u16) -> u16 {
    flags.n = false;
    flags.h = (a & 0x0FFF) + (b & 0x0FFF) > 0x0FFF;
    flags.c = a as u32 + b as u32 > 0xFFFF;
    a.wrapping_add(b)
}

/// SP plus a signed offset, shared by ADD SP, e8 and LD HL, SP+e8. Both carries are computed on
/// the low byte as an unsigned addition.
pub(crate) fn add_sp_offset(flags: &mut Flags, sp: u16, offset: u8) -> u16 {
    flags.z = false;
    flags.n = false;
    flags.h = (sp & 0x000F) + (offset as u16 & 0x000F) > 0x000F;
    flags.c = (sp & 0x00FF) + offset as u16 > 0x00FF;
    sp.wrapping_add_signed(offset as i8 as i16)
}

/// Takes a byte that is the result of a BCD addition or subtraction and corrects it back into
/// binary coded decimal.
pub(crate) fn daa(flags: &mut Flags, mut val: u8) -> u8 {
    if !flags.n {
        if flags.c || val > 0x99 {
            val = val.wrapping_add(0x60);
            flags.c = true;
        }
        if flags.h || (val & 0x0F) > 0x09 {
            val = val.wrapping_add(0x06);
        }
    } else {
        if flags.c {
            val = val.wrapping_sub(0x60);
        }
        if flags.h {
            val = val.wrapping_sub(0x06);
        }
    }
    flags.z = val == 0;
    flags.h = false;
    val
}

pub(crate) fn rlc(flags: &mut Flags, val: u8) -> u8 {
    let result = val.rotate_left(1);
    flags.set_for_byte_shift_op(result == 0, val & 0x80 != 0);
    result
}

pub(crate) fn rrc(flags: &mut Flags, val: u8) -> u8 {
    let result = val.rotate_right(1);
    flags.set_for_byte_shift_op(result == 0, val & 0x01 != 0);
    result
}

pub(crate) fn rl(flags: &mut Flags, val: u8) -> u8 {
    let result = (val << 1) | flags.c as u8;
    flags.set_for_byte_shift_op(result == 0, val & 0x80 != 0);
    result
}

pub(crate) fn rr(flags: &mut Flags, val: u8) -> u8 {
    let result = (val >> 1) | ((flags.c as u8) << 7);
    flags.set_for_byte_shift_op(result == 0, val & 0x01 != 0);
    result
}

pub(crate) fn sla(flags: &mut Flags, val: u8) -> u8 {
    let result = val << 1;
    flags.set_for_byte_shift_op(result == 0, val & 0x80 != 0);
    result
}

/// Arithmetic right shift. Bit 7 is kept.
pub(crate) fn sra(flags: &mut Flags, val: u8) -> u8 {
    let result = (val >> 1) | (val & 0x80);
    flags.set_for_byte_shift_op(result == 0, val & 0x01 != 0);
    result
}

pub(crate) fn srl(flags: &mut Flags, val: u8) -> u8 {
    let result = val >> 1;
    flags.set_for_byte_shift_op(result == 0, val & 0x01 != 0);
    result
}

pub(crate) fn swap(flags: &mut Flags, val: u8) -> u8 {
    let result = val.rotate_left(4);
    flags.set_for_byte_shift_op(result == 0, false);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sets_every_flag() {
        let mut flags = Flags::default();
        assert_eq!(add(&mut flags, 0x3A, 0xC6, false), 0x00);
        assert_eq!(flags, Flags { z: true, n: false, h: true, c: true });
    }

    #[test]
    fn adc_folds_in_the_carry() {
        let mut flags = Flags { c: true, ..Flags::default() };
        let carry = flags.c;
        assert_eq!(add(&mut flags, 0xE1, 0x0F, carry), 0xF1);
        assert_eq!(flags, Flags { z: false, n: false, h: true, c: false });
    }

    #[test]
    fn sub_and_sbc_borrows() {
        let mut flags = Flags::default();
        assert_eq!(sub(&mut flags, 0x3E, 0x3E, false), 0x00);
        assert_eq!(flags, Flags { z: true, n: true, h: false, c: false });

        let mut flags = Flags::default();
        assert_eq!(sub(&mut flags, 0x3E, 0x40, false), 0xFE);
        assert_eq!(flags, Flags { z: false, n: true, h: false, c: true });

        let mut flags = Flags { c: true, ..Flags::default() };
        assert_eq!(sub(&mut flags, 0x3B, 0x2A, true), 0x10);
        assert_eq!(flags, Flags { z: false, n: true, h: false, c: false });

        let mut flags = Flags { c: true, ..Flags::default() };
        assert_eq!(sub(&mut flags, 0x3B, 0x4F, true), 0xEB);
        assert_eq!(flags, Flags { z: false, n: true, h: true, c: true });
    }

    #[test]
    fn add16_preserves_zero() {
        let mut flags = Flags { z: true, ..Flags::default() };
        assert_eq!(add16(&mut flags, 0x8A23, 0x8A23), 0x1446);
        assert_eq!(flags, Flags { z: true, n: false, h: true, c: true });
    }

    #[test]
    fn sp_offset_carries_from_low_byte() {
        let mut flags = Flags::default();
        assert_eq!(add_sp_offset(&mut flags, 0xFFF8, 0x02), 0xFFFA);
        assert_eq!(flags, Flags::default());

        let mut flags = Flags::default();
        assert_eq!(add_sp_offset(&mut flags, 0x00FF, 0xFF), 0x00FE);
        assert_eq!(flags, Flags { z: false, n: false, h: true, c: true });
    }

    #[test]
    fn inc_dec_leave_carry() {
        let mut flags = Flags { c: true, ..Flags::default() };
        assert_eq!(inc(&mut flags, 0xFF), 0x00);
        assert_eq!(flags, Flags { z: true, n: false, h: true, c: true });
        assert_eq!(dec(&mut flags, 0x10), 0x0F);
        assert_eq!(flags, Flags { z: false, n: true, h: true, c: true });
    }

    #[test]
    fn shifts() {
        let mut flags = Flags::default();
        assert_eq!(sla(&mut flags, 0x80), 0x00);
        assert_eq!(flags, Flags { z: true, n: false, h: false, c: true });

        let mut flags = Flags::default();
        assert_eq!(sra(&mut flags, 0x8A), 0xC5);
        assert_eq!(flags, Flags::default());

        let mut flags = Flags::default();
        assert_eq!(srl(&mut flags, 0x01), 0x00);
        assert_eq!(flags, Flags { z: true, n: false, h: false, c: true });

        let mut flags = Flags { c: true, ..Flags::default() };
        assert_eq!(rl(&mut flags, 0x80), 0x01);
        assert!(flags.c);
        assert_eq!(rr(&mut flags, 0x01), 0x80);
        assert!(flags.c);

        let mut flags = Flags::default();
        assert_eq!(swap(&mut flags, 0xF1), 0x1F);
        assert_eq!(swap(&mut flags, 0x00), 0x00);
        assert!(flags.z);
    }

    #[test]
    fn daa_after_add_and_sub() {
        // 0x45 + 0x38 = 0x7D, corrected to 0x83
        let mut flags = Flags::default();
        let sum = add(&mut flags, 0x45, 0x38, false);
        assert_eq!(daa(&mut flags, sum), 0x83);
        assert!(!flags.c);

        // 0x83 - 0x38 = 0x4B, corrected to 0x45
        let diff = sub(&mut flags, 0x83, 0x38, false);
        assert_eq!(daa(&mut flags, diff), 0x45);
        assert!(flags.n);

        // 0x99 + 0x01 wraps to 0x00 with carry
        let mut flags = Flags::default();
        let sum = add(&mut flags, 0x99, 0x01, false);
        assert_eq!(daa(&mut flags, sum), 0x00);
        assert!(flags.z && flags.c);
    }
}
