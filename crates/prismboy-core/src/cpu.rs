mod alu;
pub mod decode;
pub mod registers;

pub use alu::offset_add;
pub use registers::{FLAG_C, FLAG_H, FLAG_N, FLAG_Z, Registers};

use decode::{Instruction, MAIN_PAGE, Op, PREFIXED_PAGE};
use log::warn;

use crate::{hardware::Model, mmu::Mmu};

/// Cost of pushing PC and jumping to an interrupt vector.
pub const INTERRUPT_DISPATCH_CYCLES: u32 = 20;
/// Cost of a step spent halted.
pub const HALT_CYCLES: u32 = 4;

/// `r` table index of the `(HL)` operand.
const HL_INDIRECT: u8 = 6;

type Handler = fn(&mut Cpu, &mut Mmu, Instruction) -> u32;

/// Indexed by `Op as usize`; entries follow the declaration order of [`Op`].
static HANDLERS: [Handler; Op::COUNT] = [
    Cpu::nop,
    Cpu::store_sp,
    Cpu::stop,
    Cpu::jr,
    Cpu::jr_cond,
    Cpu::load_pair_imm,
    Cpu::add_hl_pair,
    Cpu::store_a_indirect,
    Cpu::load_a_indirect,
    Cpu::inc_pair,
    Cpu::dec_pair,
    Cpu::inc,
    Cpu::dec,
    Cpu::load_imm,
    Cpu::rotate_a,
    Cpu::daa,
    Cpu::cpl,
    Cpu::scf,
    Cpu::ccf,
    Cpu::halt,
    Cpu::load,
    Cpu::alu,
    Cpu::ret_cond,
    Cpu::store_high_imm,
    Cpu::add_sp_imm,
    Cpu::load_high_imm,
    Cpu::load_hl_sp_imm,
    Cpu::pop_pair,
    Cpu::ret,
    Cpu::reti,
    Cpu::jp_hl,
    Cpu::load_sp_hl,
    Cpu::jp_cond,
    Cpu::store_high_c,
    Cpu::store_a_abs,
    Cpu::load_high_c,
    Cpu::load_a_abs,
    Cpu::jp,
    Cpu::prefix,
    Cpu::di,
    Cpu::ei,
    Cpu::call_cond,
    Cpu::push_pair,
    Cpu::call,
    Cpu::alu_imm,
    Cpu::rst,
    Cpu::rotate,
    Cpu::bit,
    Cpu::res,
    Cpu::set,
    Cpu::illegal,
];

pub struct Cpu {
    pub regs: Registers,
    pub cycles: u64,
    pub ime: bool,
    pub halted: bool,
    /// EI was executed; IME turns on after the next instruction.
    ime_pending: bool,
    /// HALT was skipped with an interrupt already pending; the next fetch
    /// does not advance PC.
    halt_bug: bool,
    illegal_reported: bool,
}

impl Cpu {
    pub fn new() -> Self {
        Self::new_with_model(Model::Dmg)
    }

    /// CPU in the post-boot register state for `model`.
    pub fn new_with_model(model: Model) -> Self {
        Self {
            regs: Registers::post_boot(model),
            cycles: 0,
            ime: false,
            halted: false,
            ime_pending: false,
            halt_bug: false,
            illegal_reported: false,
        }
    }

    /// Runs one step: services an interrupt, idles while halted, or executes
    /// one instruction. Returns the elapsed CPU cycles.
    pub fn step(&mut self, mmu: &mut Mmu) -> u32 {
        let cycles = if let Some(cycles) = self.service_interrupts(mmu) {
            cycles
        } else if self.halted {
            HALT_CYCLES
        } else {
            self.execute(mmu)
        };
        self.cycles += cycles as u64;
        cycles
    }

    fn execute(&mut self, mmu: &mut Mmu) -> u32 {
        let enable_after = self.ime_pending;
        #[cfg(feature = "cpu-trace")]
        let pc = self.regs.pc;
        let opcode = self.fetch8(mmu);
        let instr = MAIN_PAGE[opcode as usize];

        #[cfg(feature = "cpu-trace")]
        log::trace!(
            "PC={pc:04X} OP={opcode:02X} {:?} AF={:04X} BC={:04X} DE={:04X} HL={:04X} SP={:04X}",
            instr.op,
            self.regs.af(),
            self.regs.bc(),
            self.regs.de(),
            self.regs.hl(),
            self.regs.sp
        );

        let cycles = HANDLERS[instr.op as usize](self, mmu, instr);
        if enable_after && self.ime_pending {
            self.ime = true;
            self.ime_pending = false;
        }
        cycles
    }

    /// Any enabled and requested source ends HALT, even with IME clear.
    /// With IME set the highest-priority source is dispatched.
    fn service_interrupts(&mut self, mmu: &mut Mmu) -> Option<u32> {
        if mmu.interrupts.pending() == 0 {
            return None;
        }
        self.halted = false;
        if !self.ime {
            return None;
        }
        let irq = mmu.interrupts.next_dispatch()?;
        mmu.interrupts.clear(irq);
        self.ime = false;
        self.ime_pending = false;
        let pc = self.regs.pc;
        self.push(mmu, pc);
        self.regs.pc = irq.vector();
        Some(INTERRUPT_DISPATCH_CYCLES)
    }

    pub fn debug_state(&self) -> String {
        format!(
            "A:{:02X} F:{:02X} B:{:02X} C:{:02X} D:{:02X} E:{:02X} H:{:02X} L:{:02X} SP:{:04X} PC:{:04X} IME:{} HALT:{}",
            self.regs.a,
            self.regs.f(),
            self.regs.b,
            self.regs.c,
            self.regs.d,
            self.regs.e,
            self.regs.h,
            self.regs.l,
            self.regs.sp,
            self.regs.pc,
            self.ime,
            self.halted
        )
    }

    fn fetch8(&mut self, mmu: &mut Mmu) -> u8 {
        let val = mmu.read_byte(self.regs.pc);
        if self.halt_bug {
            self.halt_bug = false;
        } else {
            self.regs.pc = self.regs.pc.wrapping_add(1);
        }
        val
    }

    fn fetch16(&mut self, mmu: &mut Mmu) -> u16 {
        let lo = self.fetch8(mmu);
        let hi = self.fetch8(mmu);
        u16::from_le_bytes([lo, hi])
    }

    fn push(&mut self, mmu: &mut Mmu, val: u16) {
        let [lo, hi] = val.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        mmu.write_byte(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        mmu.write_byte(self.regs.sp, lo);
    }

    fn pop(&mut self, mmu: &mut Mmu) -> u16 {
        let lo = mmu.read_byte(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let hi = mmu.read_byte(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        u16::from_le_bytes([lo, hi])
    }

    /// `r` table: B C D E H L (HL) A.
    fn read_reg(&mut self, mmu: &mut Mmu, index: u8) -> u8 {
        match index & 7 {
            0 => self.regs.b,
            1 => self.regs.c,
            2 => self.regs.d,
            3 => self.regs.e,
            4 => self.regs.h,
            5 => self.regs.l,
            6 => mmu.read_byte(self.regs.hl()),
            _ => self.regs.a,
        }
    }

    fn write_reg(&mut self, mmu: &mut Mmu, index: u8, val: u8) {
        match index & 7 {
            0 => self.regs.b = val,
            1 => self.regs.c = val,
            2 => self.regs.d = val,
            3 => self.regs.e = val,
            4 => self.regs.h = val,
            5 => self.regs.l = val,
            6 => mmu.write_byte(self.regs.hl(), val),
            _ => self.regs.a = val,
        }
    }

    /// Address for the `(BC)`, `(DE)`, `(HL+)`, `(HL-)` forms.
    fn indirect_address(&mut self, p: u8) -> u16 {
        match p {
            0 => self.regs.bc(),
            1 => self.regs.de(),
            2 => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_add(1));
                hl
            }
            _ => {
                let hl = self.regs.hl();
                self.regs.set_hl(hl.wrapping_sub(1));
                hl
            }
        }
    }

    fn nop(&mut self, _mmu: &mut Mmu, _instr: Instruction) -> u32 {
        4
    }

    fn store_sp(&mut self, mmu: &mut Mmu, _instr: Instruction) -> u32 {
        let addr = self.fetch16(mmu);
        let [lo, hi] = self.regs.sp.to_le_bytes();
        mmu.write_byte(addr, lo);
        mmu.write_byte(addr.wrapping_add(1), hi);
        20
    }

    fn stop(&mut self, mmu: &mut Mmu, _instr: Instruction) -> u32 {
        // STOP is encoded with a padding byte.
        self.fetch8(mmu);
        if mmu.take_speed_switch().is_none() {
            self.halted = true;
        }
        4
    }

    fn jr(&mut self, mmu: &mut Mmu, _instr: Instruction) -> u32 {
        let offset = self.fetch8(mmu) as i8;
        self.regs.pc = offset_add(self.regs.pc, offset).0;
        12
    }

    fn jr_cond(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let offset = self.fetch8(mmu) as i8;
        if self.regs.condition(instr.y - 4) {
            self.regs.pc = offset_add(self.regs.pc, offset).0;
            12
        } else {
            8
        }
    }

    fn load_pair_imm(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let val = self.fetch16(mmu);
        self.regs.set_pair(instr.p, val);
        12
    }

    fn add_hl_pair(&mut self, _mmu: &mut Mmu, instr: Instruction) -> u32 {
        let val = self.regs.pair(instr.p);
        self.regs.add_hl(val);
        8
    }

    fn store_a_indirect(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let addr = self.indirect_address(instr.p);
        mmu.write_byte(addr, self.regs.a);
        8
    }

    fn load_a_indirect(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let addr = self.indirect_address(instr.p);
        self.regs.a = mmu.read_byte(addr);
        8
    }

    fn inc_pair(&mut self, _mmu: &mut Mmu, instr: Instruction) -> u32 {
        let val = self.regs.pair(instr.p).wrapping_add(1);
        self.regs.set_pair(instr.p, val);
        8
    }

    fn dec_pair(&mut self, _mmu: &mut Mmu, instr: Instruction) -> u32 {
        let val = self.regs.pair(instr.p).wrapping_sub(1);
        self.regs.set_pair(instr.p, val);
        8
    }

    fn inc(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let val = self.read_reg(mmu, instr.y);
        let res = self.regs.inc8(val);
        self.write_reg(mmu, instr.y, res);
        if instr.y == HL_INDIRECT { 12 } else { 4 }
    }

    fn dec(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let val = self.read_reg(mmu, instr.y);
        let res = self.regs.dec8(val);
        self.write_reg(mmu, instr.y, res);
        if instr.y == HL_INDIRECT { 12 } else { 4 }
    }

    fn load_imm(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let val = self.fetch8(mmu);
        self.write_reg(mmu, instr.y, val);
        if instr.y == HL_INDIRECT { 12 } else { 8 }
    }

    /// RLCA, RRCA, RLA, RRA: the CB rotates with Z forced clear.
    fn rotate_a(&mut self, _mmu: &mut Mmu, instr: Instruction) -> u32 {
        self.regs.a = self.regs.rotate(instr.y, self.regs.a);
        self.regs.set_flag(FLAG_Z, false);
        4
    }

    fn daa(&mut self, _mmu: &mut Mmu, _instr: Instruction) -> u32 {
        self.regs.daa();
        4
    }

    fn cpl(&mut self, _mmu: &mut Mmu, _instr: Instruction) -> u32 {
        self.regs.a = !self.regs.a;
        self.regs.set_f(self.regs.f() | FLAG_N | FLAG_H);
        4
    }

    fn scf(&mut self, _mmu: &mut Mmu, _instr: Instruction) -> u32 {
        self.regs.set_f((self.regs.f() & FLAG_Z) | FLAG_C);
        4
    }

    fn ccf(&mut self, _mmu: &mut Mmu, _instr: Instruction) -> u32 {
        let carry = if self.regs.flag(FLAG_C) { 0 } else { FLAG_C };
        self.regs.set_f((self.regs.f() & FLAG_Z) | carry);
        4
    }

    fn halt(&mut self, mmu: &mut Mmu, _instr: Instruction) -> u32 {
        if !self.ime && mmu.interrupts.pending() != 0 {
            self.halt_bug = true;
        } else {
            self.halted = true;
        }
        4
    }

    fn load(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let val = self.read_reg(mmu, instr.z);
        self.write_reg(mmu, instr.y, val);
        if instr.y == HL_INDIRECT || instr.z == HL_INDIRECT {
            8
        } else {
            4
        }
    }

    fn alu(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let val = self.read_reg(mmu, instr.z);
        self.regs.alu(instr.y, val);
        if instr.z == HL_INDIRECT { 8 } else { 4 }
    }

    fn ret_cond(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        if self.regs.condition(instr.y) {
            self.regs.pc = self.pop(mmu);
            20
        } else {
            8
        }
    }

    fn store_high_imm(&mut self, mmu: &mut Mmu, _instr: Instruction) -> u32 {
        let offset = self.fetch8(mmu);
        mmu.write_byte(0xFF00 | offset as u16, self.regs.a);
        12
    }

    fn add_sp_imm(&mut self, mmu: &mut Mmu, _instr: Instruction) -> u32 {
        let offset = self.fetch8(mmu) as i8;
        self.regs.sp = self.regs.sp_offset(offset);
        16
    }

    fn load_high_imm(&mut self, mmu: &mut Mmu, _instr: Instruction) -> u32 {
        let offset = self.fetch8(mmu);
        self.regs.a = mmu.read_byte(0xFF00 | offset as u16);
        12
    }

    fn load_hl_sp_imm(&mut self, mmu: &mut Mmu, _instr: Instruction) -> u32 {
        let offset = self.fetch8(mmu) as i8;
        let val = self.regs.sp_offset(offset);
        self.regs.set_hl(val);
        12
    }

    fn pop_pair(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let val = self.pop(mmu);
        self.regs.set_stack_pair(instr.p, val);
        12
    }

    fn ret(&mut self, mmu: &mut Mmu, _instr: Instruction) -> u32 {
        self.regs.pc = self.pop(mmu);
        16
    }

    fn reti(&mut self, mmu: &mut Mmu, _instr: Instruction) -> u32 {
        self.regs.pc = self.pop(mmu);
        self.ime = true;
        16
    }

    fn jp_hl(&mut self, _mmu: &mut Mmu, _instr: Instruction) -> u32 {
        self.regs.pc = self.regs.hl();
        4
    }

    fn load_sp_hl(&mut self, _mmu: &mut Mmu, _instr: Instruction) -> u32 {
        self.regs.sp = self.regs.hl();
        8
    }

    fn jp_cond(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let addr = self.fetch16(mmu);
        if self.regs.condition(instr.y) {
            self.regs.pc = addr;
            16
        } else {
            12
        }
    }

    fn store_high_c(&mut self, mmu: &mut Mmu, _instr: Instruction) -> u32 {
        mmu.write_byte(0xFF00 | self.regs.c as u16, self.regs.a);
        8
    }

    fn store_a_abs(&mut self, mmu: &mut Mmu, _instr: Instruction) -> u32 {
        let addr = self.fetch16(mmu);
        mmu.write_byte(addr, self.regs.a);
        16
    }

    fn load_high_c(&mut self, mmu: &mut Mmu, _instr: Instruction) -> u32 {
        self.regs.a = mmu.read_byte(0xFF00 | self.regs.c as u16);
        8
    }

    fn load_a_abs(&mut self, mmu: &mut Mmu, _instr: Instruction) -> u32 {
        let addr = self.fetch16(mmu);
        self.regs.a = mmu.read_byte(addr);
        16
    }

    fn jp(&mut self, mmu: &mut Mmu, _instr: Instruction) -> u32 {
        self.regs.pc = self.fetch16(mmu);
        16
    }

    /// Fetches the second byte and runs it from the prefixed page. The
    /// prefixed handlers' costs include the prefix fetch.
    fn prefix(&mut self, mmu: &mut Mmu, _instr: Instruction) -> u32 {
        let opcode = self.fetch8(mmu);
        let instr = PREFIXED_PAGE[opcode as usize];
        HANDLERS[instr.op as usize](self, mmu, instr)
    }

    fn di(&mut self, _mmu: &mut Mmu, _instr: Instruction) -> u32 {
        self.ime = false;
        self.ime_pending = false;
        4
    }

    fn ei(&mut self, _mmu: &mut Mmu, _instr: Instruction) -> u32 {
        if !self.ime {
            self.ime_pending = true;
        }
        4
    }

    fn call_cond(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let addr = self.fetch16(mmu);
        if self.regs.condition(instr.y) {
            let pc = self.regs.pc;
            self.push(mmu, pc);
            self.regs.pc = addr;
            24
        } else {
            12
        }
    }

    fn push_pair(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let val = self.regs.stack_pair(instr.p);
        self.push(mmu, val);
        16
    }

    fn call(&mut self, mmu: &mut Mmu, _instr: Instruction) -> u32 {
        let addr = self.fetch16(mmu);
        let pc = self.regs.pc;
        self.push(mmu, pc);
        self.regs.pc = addr;
        24
    }

    fn alu_imm(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let val = self.fetch8(mmu);
        self.regs.alu(instr.y, val);
        8
    }

    fn rst(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let pc = self.regs.pc;
        self.push(mmu, pc);
        self.regs.pc = (instr.y as u16) * 8;
        16
    }

    fn rotate(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let val = self.read_reg(mmu, instr.z);
        let res = self.regs.rotate(instr.y, val);
        self.write_reg(mmu, instr.z, res);
        if instr.z == HL_INDIRECT { 16 } else { 8 }
    }

    fn bit(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let val = self.read_reg(mmu, instr.z);
        self.regs.bit(instr.y, val);
        if instr.z == HL_INDIRECT { 12 } else { 8 }
    }

    fn res(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let val = self.read_reg(mmu, instr.z) & !(1 << instr.y);
        self.write_reg(mmu, instr.z, val);
        if instr.z == HL_INDIRECT { 16 } else { 8 }
    }

    fn set(&mut self, mmu: &mut Mmu, instr: Instruction) -> u32 {
        let val = self.read_reg(mmu, instr.z) | (1 << instr.y);
        self.write_reg(mmu, instr.z, val);
        if instr.z == HL_INDIRECT { 16 } else { 8 }
    }

    /// Unassigned opcodes lock real hardware up; here they behave as NOP.
    fn illegal(&mut self, _mmu: &mut Mmu, instr: Instruction) -> u32 {
        if !self.illegal_reported {
            warn!(
                "Illegal opcode {:02X} at {:04X}; treating as NOP",
                instr.opcode,
                self.regs.pc.wrapping_sub(1)
            );
            self.illegal_reported = true;
        }
        4
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_table_covers_every_op() {
        assert_eq!(HANDLERS.len(), Op::COUNT);
        assert_eq!(Op::Illegal as usize, Op::COUNT - 1);
    }
}
