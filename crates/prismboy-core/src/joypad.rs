use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};

use crate::interrupts::{Interrupt, InterruptRegisters};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Button {
    /// Bit in the input-state mask: directions in the low nibble, buttons
    /// in the high nibble, each in P1 bit order.
    pub const fn mask(self) -> u8 {
        match self {
            Button::Right => 0x01,
            Button::Left => 0x02,
            Button::Up => 0x04,
            Button::Down => 0x08,
            Button::A => 0x10,
            Button::B => 0x20,
            Button::Select => 0x40,
            Button::Start => 0x80,
        }
    }
}

/// Pressed-button mask shared with the frontend. A set bit means pressed.
#[derive(Clone, Debug, Default)]
pub struct InputHandle {
    state: Arc<AtomicU8>,
}

impl InputHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, button: Button, pressed: bool) {
        if pressed {
            self.state.fetch_or(button.mask(), Ordering::Relaxed);
        } else {
            self.state.fetch_and(!button.mask(), Ordering::Relaxed);
        }
    }

    pub fn set_state(&self, mask: u8) {
        self.state.store(mask, Ordering::Relaxed);
    }

    pub fn state(&self) -> u8 {
        self.state.load(Ordering::Relaxed)
    }
}

/// The P1 register.
#[derive(Debug)]
pub struct Joypad {
    select: u8,
    state: u8,
    handle: InputHandle,
}

impl Joypad {
    pub fn new(handle: InputHandle) -> Self {
        Self {
            select: 0x30,
            state: 0,
            handle,
        }
    }

    pub fn handle(&self) -> InputHandle {
        self.handle.clone()
    }

    /// Samples the shared mask. Any changed bit raises the joypad
    /// interrupt.
    pub fn poll(&mut self, irq: &mut InterruptRegisters) {
        let state = self.handle.state();
        if state != self.state {
            self.state = state;
            irq.raise(Interrupt::Joypad);
        }
    }

    pub fn read(&self) -> u8 {
        let mut low = 0x0F;
        if self.select & 0x10 == 0 {
            low &= !self.state & 0x0F;
        }
        if self.select & 0x20 == 0 {
            low &= !(self.state >> 4) & 0x0F;
        }
        0xC0 | self.select | low
    }

    pub fn write(&mut self, val: u8) {
        self.select = val & 0x30;
    }
}

impl Default for Joypad {
    fn default() -> Self {
        Self::new(InputHandle::new())
    }
}
