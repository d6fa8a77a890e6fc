use std::io;

use log::debug;

use crate::{
    cartridge::Cartridge,
    hardware::Model,
    interrupts::InterruptRegisters,
    io::{IO_PORT_COUNT, PORTS},
    joypad::Joypad,
    ppu::{Mode, OAM_SIZE, Ppu, PpuEvents, VideoMemory},
    sound::SoundRegisterHandle,
    timer::Timer,
};

const WRAM_BANK_SIZE: usize = 0x1000;
const HDMA_BLOCK_SIZE: u16 = 0x10;

#[derive(Debug, Default)]
struct HdmaState {
    /// Source pointer (low nibble forced to zero)
    src: u16,
    /// Destination in VRAM (0x8000 | (dst & 0x1FF0))
    dst: u16,
    /// Blocks left in an HBlank transfer
    remaining: u8,
    /// HBlank transfer in progress
    active: bool,
    /// Whether the previous transfer was cancelled by a write with bit 7 clear
    cancelled: bool,
}

/// The system bus: decodes every CPU address to the component that owns it.
pub struct Mmu {
    pub wram: Vec<[u8; WRAM_BANK_SIZE]>,
    pub wram_bank: usize,
    pub hram: [u8; 0x7F],
    /// Backing store for ports without dedicated behavior.
    pub io: [u8; IO_PORT_COUNT],
    pub cart: Option<Cartridge>,
    pub interrupts: InterruptRegisters,
    pub ppu: Ppu,
    pub video: VideoMemory,
    pub timer: Timer,
    pub joypad: Joypad,
    pub(crate) sound: SoundRegisterHandle,
    hdma: HdmaState,
    speed_armed: bool,
    double_speed: bool,
    model: Model,
}

impl Mmu {
    /// Bus in the state the boot program leaves behind.
    pub fn new(model: Model) -> Self {
        let mut interrupts = InterruptRegisters::new();
        interrupts.set_flags(0xE1);
        let mut ppu = Ppu::new(model);
        ppu.sync_status(&mut interrupts);

        Self {
            wram: vec![[0; WRAM_BANK_SIZE]; model.wram_banks()],
            wram_bank: 1,
            hram: [0; 0x7F],
            io: [0; IO_PORT_COUNT],
            cart: None,
            interrupts,
            ppu,
            video: VideoMemory::new(model),
            timer: Timer::new(),
            joypad: Joypad::default(),
            sound: SoundRegisterHandle::new(),
            hdma: HdmaState {
                dst: Self::sanitize_vram_dma_dest(0),
                ..HdmaState::default()
            },
            speed_armed: false,
            double_speed: false,
            model,
        }
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn load_cart(&mut self, cart: Cartridge) {
        let is_dmg = !cart.header.model().is_cgb();
        self.cart = Some(cart);
        if self.model.is_cgb() && is_dmg {
            self.ppu.load_compatibility_palettes();
        }
    }

    pub fn save_cart_ram(&self) -> io::Result<()> {
        match &self.cart {
            Some(cart) => cart.save_ram(),
            None => Ok(()),
        }
    }

    pub fn sound_handle(&self) -> SoundRegisterHandle {
        self.sound.clone()
    }

    pub fn double_speed(&self) -> bool {
        self.double_speed
    }

    pub fn read_byte(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF | 0xA000..=0xBFFF => {
                self.cart.as_ref().map_or(0xFF, |cart| cart.read(addr))
            }
            0x8000..=0x9FFF => self.video.read_vram(addr),
            0xC000..=0xCFFF => self.wram[0][(addr - 0xC000) as usize],
            0xD000..=0xDFFF => self.wram[self.wram_bank][(addr - 0xD000) as usize],
            // Echo RAM
            0xE000..=0xFDFF => self.read_byte(addr - 0x2000),
            0xFE00..=0xFE9F => self.video.read_oam(addr),
            0xFEA0..=0xFEFF => 0xFF,
            0xFF00..=0xFF7F => (PORTS[(addr - 0xFF00) as usize].read)(self, addr),
            0xFF80..=0xFFFE => self.hram[(addr - 0xFF80) as usize],
            0xFFFF => self.interrupts.enable(),
        }
    }

    pub fn write_byte(&mut self, addr: u16, val: u8) {
        match addr {
            0x0000..=0x7FFF | 0xA000..=0xBFFF => {
                if let Some(cart) = self.cart.as_mut() {
                    cart.write(addr, val);
                }
            }
            0x8000..=0x9FFF => self.video.write_vram(addr, val),
            0xC000..=0xCFFF => self.wram[0][(addr - 0xC000) as usize] = val,
            0xD000..=0xDFFF => self.wram[self.wram_bank][(addr - 0xD000) as usize] = val,
            0xE000..=0xFDFF => self.write_byte(addr - 0x2000, val),
            0xFE00..=0xFE9F => self.video.write_oam(addr, val),
            0xFEA0..=0xFEFF => {}
            0xFF00..=0xFF7F => (PORTS[(addr - 0xFF00) as usize].write)(self, addr, val),
            0xFF80..=0xFFFE => self.hram[(addr - 0xFF80) as usize] = val,
            0xFFFF => self.interrupts.set_enable(val),
        }
    }

    /// Advance the peripherals by `cycles` CPU cycles.
    ///
    /// In double speed the PPU sees half as many cycles; the timer always
    /// runs at the CPU rate.
    pub fn tick(&mut self, cycles: u32) -> PpuEvents {
        self.joypad.poll(&mut self.interrupts);

        let dots = if self.double_speed { cycles / 2 } else { cycles };
        let events = self.ppu.step(dots, &self.video, &mut self.interrupts);
        for _ in 0..events.hblank_entries {
            self.hdma_hblank_transfer();
        }

        self.timer.step(cycles, &mut self.interrupts);
        events
    }

    /// Reads used by DMA engines. Sources at or above 0xE000 fold onto
    /// work RAM.
    fn dma_read_byte(&mut self, addr: u16) -> u8 {
        let addr = if addr >= 0xE000 {
            addr.wrapping_sub(0x2000)
        } else {
            addr
        };
        self.read_byte(addr)
    }

    /// Copies 160 bytes from `val << 8` into OAM.
    pub(crate) fn start_oam_dma(&mut self, val: u8) {
        let src = (val as u16) << 8;
        debug!("OAM DMA from {src:04X}");
        for i in 0..OAM_SIZE {
            self.video.oam[i] = self.dma_read_byte(src.wrapping_add(i as u16));
        }
    }

    pub(crate) fn read_key1(&self) -> u8 {
        0x7E | (u8::from(self.double_speed) << 7) | u8::from(self.speed_armed)
    }

    pub(crate) fn arm_speed_switch(&mut self, armed: bool) {
        self.speed_armed = armed;
    }

    /// Consumes an armed speed switch, returning the new double-speed state.
    pub fn take_speed_switch(&mut self) -> Option<bool> {
        if !(self.model.is_cgb() && self.speed_armed) {
            return None;
        }
        self.speed_armed = false;
        self.double_speed = !self.double_speed;
        debug!(
            "speed switch: {}",
            if self.double_speed { "double" } else { "normal" }
        );
        Some(self.double_speed)
    }

    #[inline]
    fn sanitize_vram_dma_dest(addr: u16) -> u16 {
        0x8000 | (addr & 0x1FF0)
    }

    pub(crate) fn write_hdma(&mut self, addr: u16, val: u8) {
        match addr {
            0xFF51 => self.hdma.src = (val as u16) << 8 | (self.hdma.src & 0x00F0),
            0xFF52 => self.hdma.src = (self.hdma.src & 0xFF00) | (val & 0xF0) as u16,
            0xFF53 => {
                let raw = ((val & 0x1F) as u16) << 8 | (self.hdma.dst & 0x00F0);
                self.hdma.dst = Self::sanitize_vram_dma_dest(raw);
            }
            0xFF54 => {
                let raw = (self.hdma.dst & 0x1F00) | (val & 0xF0) as u16;
                self.hdma.dst = Self::sanitize_vram_dma_dest(raw);
            }
            0xFF55 => self.start_vram_dma(val),
            _ => {}
        }
    }

    fn start_vram_dma(&mut self, val: u8) {
        let blocks = (val & 0x7F) + 1;

        if val & 0x80 == 0 {
            if self.hdma.active {
                debug!("HDMA cancelled with {} blocks left", self.hdma.remaining);
                self.hdma.active = false;
                self.hdma.cancelled = true;
                return;
            }
            debug!(
                "GDMA {:04X} -> {:04X}, {} blocks",
                self.hdma.src, self.hdma.dst, blocks
            );
            for _ in 0..blocks {
                self.copy_hdma_block();
            }
            self.hdma.remaining = 0;
            self.hdma.cancelled = false;
            return;
        }

        debug!(
            "HDMA {:04X} -> {:04X}, {} blocks",
            self.hdma.src, self.hdma.dst, blocks
        );
        self.hdma.remaining = blocks;
        self.hdma.active = true;
        self.hdma.cancelled = false;
        if !self.ppu.lcd_enabled() || self.ppu.mode() == Mode::HBlank {
            self.hdma_hblank_transfer();
        }
    }

    /// FF55 readback.
    pub(crate) fn hdma_status(&self) -> u8 {
        let left = self.hdma.remaining.wrapping_sub(1) & 0x7F;
        if self.hdma.active {
            left
        } else if self.hdma.cancelled {
            0x80 | left
        } else {
            0xFF
        }
    }

    /// Execute a single 0x10-byte HDMA burst during H-Blank.
    pub fn hdma_hblank_transfer(&mut self) {
        if !self.hdma.active {
            return;
        }
        self.copy_hdma_block();
        self.hdma.remaining = self.hdma.remaining.saturating_sub(1);
        if self.hdma.remaining == 0 {
            self.hdma.active = false;
        }
    }

    fn copy_hdma_block(&mut self) {
        for _ in 0..HDMA_BLOCK_SIZE {
            let byte = self.dma_read_byte(self.hdma.src);
            self.video.write_vram(self.hdma.dst, byte);
            self.hdma.src = self.hdma.src.wrapping_add(1);
            self.hdma.dst = 0x8000 | (self.hdma.dst.wrapping_add(1) & 0x1FFF);
        }
    }
}

impl Default for Mmu {
    fn default() -> Self {
        Self::new(Model::Dmg)
    }
}
