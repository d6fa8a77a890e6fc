use log::{info, warn};

use crate::{
    cartridge::Cartridge,
    cpu::Cpu,
    hardware::{Model, ModelOverride},
    joypad::{InputHandle, Joypad},
    mmu::Mmu,
    ppu::FRAME_CYCLES,
    sound::SoundRegisterHandle,
};

/// Outcome of [`GameBoy::run_frame`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameResult {
    /// CPU cycles executed.
    pub cycles: u64,
    /// False when the cycle cap was hit without the PPU finishing a frame,
    /// which happens while the LCD is off.
    pub completed: bool,
}

pub struct GameBoy {
    pub cpu: Cpu,
    pub mmu: Mmu,
    model: Model,
}

impl GameBoy {
    /// A machine in the post-boot state with no cartridge inserted.
    pub fn new(model: Model) -> Self {
        Self {
            cpu: Cpu::new_with_model(model),
            mmu: Mmu::new(model),
            model,
        }
    }

    /// Builds a machine for `cart`, picking the model from its header
    /// unless `mode` forces one.
    pub fn with_cartridge(cart: Cartridge, mode: ModelOverride) -> Self {
        let model = mode.resolve(cart.header.model());
        info!("Emulating {model:?} (requested {:?})", cart.header.model());
        let mut gb = Self::new(model);
        gb.mmu.load_cart(cart);
        gb
    }

    pub fn model(&self) -> Model {
        self.model
    }

    /// Executes one CPU step and advances the peripherals by the same
    /// number of cycles. Returns the cycles elapsed.
    pub fn step(&mut self) -> u32 {
        let cycles = self.cpu.step(&mut self.mmu);
        self.mmu.tick(cycles);
        cycles
    }

    /// Runs until the PPU completes a frame, or for one frame's worth of
    /// cycles if it never does.
    pub fn run_frame(&mut self) -> FrameResult {
        let cap = if self.mmu.double_speed() {
            FRAME_CYCLES as u64 * 2
        } else {
            FRAME_CYCLES as u64
        };
        self.mmu.ppu.take_frame_ready();

        let mut result = FrameResult::default();
        while result.cycles < cap {
            result.cycles += self.step() as u64;
            if self.mmu.ppu.take_frame_ready() {
                result.completed = true;
                break;
            }
        }
        result
    }

    pub fn framebuffer(&self) -> &[u32] {
        self.mmu.ppu.framebuffer()
    }

    pub fn frames(&self) -> u64 {
        self.mmu.ppu.frames()
    }

    pub fn input(&self) -> InputHandle {
        self.mmu.joypad.handle()
    }

    pub fn sound(&self) -> SoundRegisterHandle {
        self.mmu.sound_handle()
    }

    /// Persists battery RAM. Failures are logged, not returned, so a
    /// shutdown path can always call this.
    pub fn save_ram(&self) -> bool {
        match self.mmu.save_cart_ram() {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save RAM: {e}");
                false
            }
        }
    }

    /// Reset to the post-boot state while preserving the loaded cartridge
    /// and the handles already given out to the frontend.
    pub fn reset(&mut self) {
        let cart = self.mmu.cart.take();
        let input = self.input();
        let sound = self.sound();
        self.cpu = Cpu::new_with_model(self.model);
        self.mmu = Mmu::new(self.model);
        self.mmu.joypad = Joypad::new(input);
        self.mmu.sound = sound;
        if let Some(c) = cart {
            self.mmu.load_cart(c);
        }
    }
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new(Model::Dmg)
    }
}
