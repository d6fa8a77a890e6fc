//! I/O port dispatch for 0xFF00-0xFF7F.
//!
//! Each port address maps to a pair of read/write hooks. Ports without
//! special behavior store into the plain I/O byte array.

use crate::mmu::Mmu;

pub const IO_PORT_COUNT: usize = 0x80;

pub(crate) type ReadHook = fn(&mut Mmu, u16) -> u8;
pub(crate) type WriteHook = fn(&mut Mmu, u16, u8);

#[derive(Clone, Copy)]
pub(crate) struct Port {
    pub read: ReadHook,
    pub write: WriteHook,
}

impl Port {
    const fn new(read: ReadHook, write: WriteHook) -> Self {
        Self { read, write }
    }
}

const GENERIC: Port = Port::new(read_generic, write_generic);
const JOYPAD: Port = Port::new(read_joypad, write_joypad);
const TIMER: Port = Port::new(read_timer, write_timer);
const INTERRUPT_FLAGS: Port = Port::new(read_if, write_if);
const SOUND: Port = Port::new(read_generic, write_sound);
const LCD: Port = Port::new(read_lcd, write_lcd);
const OAM_DMA: Port = Port::new(read_generic, write_oam_dma);
const KEY1: Port = Port::new(read_key1, write_key1);
const VRAM_BANK: Port = Port::new(read_vram_bank, write_vram_bank);
const HDMA: Port = Port::new(read_hdma, write_hdma);
const WRAM_BANK: Port = Port::new(read_wram_bank, write_wram_bank);

pub(crate) static PORTS: [Port; IO_PORT_COUNT] = build_ports();

const fn fill(ports: &mut [Port; IO_PORT_COUNT], first: usize, last: usize, port: Port) {
    let mut i = first;
    while i <= last {
        ports[i] = port;
        i += 1;
    }
}

const fn build_ports() -> [Port; IO_PORT_COUNT] {
    let mut ports = [GENERIC; IO_PORT_COUNT];
    ports[0x00] = JOYPAD;
    fill(&mut ports, 0x04, 0x07, TIMER);
    ports[0x0F] = INTERRUPT_FLAGS;
    fill(&mut ports, 0x10, 0x3F, SOUND);
    fill(&mut ports, 0x40, 0x45, LCD);
    ports[0x46] = OAM_DMA;
    fill(&mut ports, 0x47, 0x4B, LCD);
    ports[0x4D] = KEY1;
    ports[0x4F] = VRAM_BANK;
    fill(&mut ports, 0x51, 0x55, HDMA);
    // Palette index/data ports and OPRI are CGB-only inside the PPU.
    fill(&mut ports, 0x68, 0x6C, LCD);
    ports[0x70] = WRAM_BANK;
    ports
}

#[inline]
fn index(addr: u16) -> usize {
    addr as usize & (IO_PORT_COUNT - 1)
}

fn read_generic(mmu: &mut Mmu, addr: u16) -> u8 {
    mmu.io[index(addr)]
}

fn write_generic(mmu: &mut Mmu, addr: u16, val: u8) {
    mmu.io[index(addr)] = val;
}

fn read_joypad(mmu: &mut Mmu, _addr: u16) -> u8 {
    mmu.joypad.read()
}

fn write_joypad(mmu: &mut Mmu, _addr: u16, val: u8) {
    mmu.joypad.write(val);
}

fn read_timer(mmu: &mut Mmu, addr: u16) -> u8 {
    mmu.timer.read(addr)
}

fn write_timer(mmu: &mut Mmu, addr: u16, val: u8) {
    mmu.timer.write(addr, val, &mut mmu.interrupts);
}

fn read_if(mmu: &mut Mmu, _addr: u16) -> u8 {
    mmu.interrupts.flags()
}

fn write_if(mmu: &mut Mmu, _addr: u16, val: u8) {
    mmu.interrupts.set_flags(val);
}

fn write_sound(mmu: &mut Mmu, addr: u16, val: u8) {
    mmu.io[index(addr)] = val;
    mmu.sound.write(addr, val);
}

fn read_lcd(mmu: &mut Mmu, addr: u16) -> u8 {
    mmu.ppu.read_reg(addr, &mmu.interrupts)
}

fn write_lcd(mmu: &mut Mmu, addr: u16, val: u8) {
    mmu.ppu.write_reg(addr, val, &mut mmu.interrupts);
}

fn write_oam_dma(mmu: &mut Mmu, addr: u16, val: u8) {
    mmu.io[index(addr)] = val;
    mmu.start_oam_dma(val);
}

fn read_key1(mmu: &mut Mmu, _addr: u16) -> u8 {
    if !mmu.model().is_cgb() {
        return 0xFF;
    }
    mmu.read_key1()
}

fn write_key1(mmu: &mut Mmu, _addr: u16, val: u8) {
    if mmu.model().is_cgb() {
        mmu.arm_speed_switch(val & 0x01 != 0);
    }
}

fn read_vram_bank(mmu: &mut Mmu, _addr: u16) -> u8 {
    if !mmu.model().is_cgb() {
        return 0xFF;
    }
    0xFE | mmu.video.bank() as u8
}

fn write_vram_bank(mmu: &mut Mmu, _addr: u16, val: u8) {
    if mmu.model().is_cgb() {
        mmu.video.select_bank(val);
    }
}

fn read_hdma(mmu: &mut Mmu, addr: u16) -> u8 {
    match addr {
        0xFF55 if mmu.model().is_cgb() => mmu.hdma_status(),
        _ => 0xFF,
    }
}

fn write_hdma(mmu: &mut Mmu, addr: u16, val: u8) {
    if mmu.model().is_cgb() {
        mmu.write_hdma(addr, val);
    }
}

fn read_wram_bank(mmu: &mut Mmu, _addr: u16) -> u8 {
    if !mmu.model().is_cgb() {
        return 0xFF;
    }
    0xF8 | mmu.wram_bank as u8
}

fn write_wram_bank(mmu: &mut Mmu, _addr: u16, val: u8) {
    if mmu.model().is_cgb() {
        let bank = (val & 0x07) as usize;
        mmu.wram_bank = if bank == 0 { 1 } else { bank };
    }
}
