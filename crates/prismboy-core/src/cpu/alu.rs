//! Flag-producing arithmetic shared by the instruction handlers.

use super::registers::{FLAG_C, FLAG_H, FLAG_N, FLAG_Z, Registers};

#[inline]
fn zero(val: u8) -> u8 {
    if val == 0 { FLAG_Z } else { 0 }
}

/// `base + offset` for signed 8-bit displacements, with the H and C flags
/// the SP-relative instructions produce: carries out of bit 3 and bit 7,
/// read from `base ^ offset ^ result`.
pub fn offset_add(base: u16, offset: i8) -> (u16, u8) {
    let offset = offset as i16 as u16;
    let result = base.wrapping_add(offset);
    let carries = base ^ offset ^ result;
    let mut flags = 0;
    if carries & 0x0010 != 0 {
        flags |= FLAG_H;
    }
    if carries & 0x0100 != 0 {
        flags |= FLAG_C;
    }
    (result, flags)
}

impl Registers {
    /// `alu` table: ADD ADC SUB SBC AND XOR OR CP.
    pub fn alu(&mut self, op: u8, val: u8) {
        match op & 7 {
            0 => self.add8(val, false),
            1 => self.add8(val, true),
            2 => self.sub8(val, false, true),
            3 => self.sub8(val, true, true),
            4 => {
                self.a &= val;
                self.set_f(zero(self.a) | FLAG_H);
            }
            5 => {
                self.a ^= val;
                self.set_f(zero(self.a));
            }
            6 => {
                self.a |= val;
                self.set_f(zero(self.a));
            }
            _ => self.sub8(val, false, false),
        }
    }

    fn add8(&mut self, val: u8, with_carry: bool) {
        let carry = u8::from(with_carry && self.flag(FLAG_C));
        let a = self.a;
        let sum = a as u16 + val as u16 + carry as u16;
        let res = sum as u8;
        self.set_f(
            zero(res)
                | if (a & 0x0F) + (val & 0x0F) + carry > 0x0F {
                    FLAG_H
                } else {
                    0
                }
                | if sum > 0xFF { FLAG_C } else { 0 },
        );
        self.a = res;
    }

    fn sub8(&mut self, val: u8, with_carry: bool, store: bool) {
        let carry = u8::from(with_carry && self.flag(FLAG_C));
        let a = self.a;
        let diff = a as i16 - val as i16 - carry as i16;
        let res = diff as u8;
        self.set_f(
            zero(res)
                | FLAG_N
                | if (a & 0x0F) < (val & 0x0F) + carry {
                    FLAG_H
                } else {
                    0
                }
                | if diff < 0 { FLAG_C } else { 0 },
        );
        if store {
            self.a = res;
        }
    }

    pub fn inc8(&mut self, val: u8) -> u8 {
        let res = val.wrapping_add(1);
        self.set_f(
            (self.f() & FLAG_C) | zero(res) | if val & 0x0F == 0x0F { FLAG_H } else { 0 },
        );
        res
    }

    pub fn dec8(&mut self, val: u8) -> u8 {
        let res = val.wrapping_sub(1);
        self.set_f(
            (self.f() & FLAG_C)
                | zero(res)
                | FLAG_N
                | if val & 0x0F == 0 { FLAG_H } else { 0 },
        );
        res
    }

    pub fn add_hl(&mut self, val: u16) {
        let hl = self.hl();
        let (res, carry) = hl.overflowing_add(val);
        self.set_f(
            (self.f() & FLAG_Z)
                | if (hl & 0x0FFF) + (val & 0x0FFF) > 0x0FFF {
                    FLAG_H
                } else {
                    0
                }
                | if carry { FLAG_C } else { 0 },
        );
        self.set_hl(res);
    }

    /// SP plus a signed displacement; Z and N are cleared.
    pub fn sp_offset(&mut self, offset: i8) -> u16 {
        let (res, flags) = offset_add(self.sp, offset);
        self.set_f(flags);
        res
    }

    pub fn daa(&mut self) {
        let mut a = self.a;
        let mut carry = self.flag(FLAG_C);
        if !self.flag(FLAG_N) {
            if carry || a > 0x99 {
                a = a.wrapping_add(0x60);
                carry = true;
            }
            if self.flag(FLAG_H) || a & 0x0F > 0x09 {
                a = a.wrapping_add(0x06);
            }
        } else {
            if carry {
                a = a.wrapping_sub(0x60);
            }
            if self.flag(FLAG_H) {
                a = a.wrapping_sub(0x06);
            }
        }
        self.set_f(zero(a) | (self.f() & FLAG_N) | if carry { FLAG_C } else { 0 });
        self.a = a;
    }

    /// `rot` table: RLC RRC RL RR SLA SRA SWAP SRL. Sets Z from the result.
    pub fn rotate(&mut self, op: u8, val: u8) -> u8 {
        let carry_in = u8::from(self.flag(FLAG_C));
        let (res, carry_out) = match op & 7 {
            0 => (val.rotate_left(1), val & 0x80 != 0),
            1 => (val.rotate_right(1), val & 0x01 != 0),
            2 => ((val << 1) | carry_in, val & 0x80 != 0),
            3 => ((val >> 1) | (carry_in << 7), val & 0x01 != 0),
            4 => (val << 1, val & 0x80 != 0),
            5 => ((val >> 1) | (val & 0x80), val & 0x01 != 0),
            6 => (val.rotate_left(4), false),
            _ => (val >> 1, val & 0x01 != 0),
        };
        self.set_f(zero(res) | if carry_out { FLAG_C } else { 0 });
        res
    }

    pub fn bit(&mut self, bit: u8, val: u8) {
        self.set_f((self.f() & FLAG_C) | FLAG_H | zero(val & (1 << (bit & 7))));
    }
}
