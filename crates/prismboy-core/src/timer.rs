use crate::interrupts::{Interrupt, InterruptRegisters};

/// DIV/TIMA/TMA/TAC.
///
/// TIMA counts falling edges of one bit of the 16-bit divider, chosen by
/// TAC: bit 9, 3, 5 or 7 for 1024, 16, 64 or 256 cycles per tick.
pub struct Timer {
    /// Internal divider. DIV is the upper byte.
    pub div: u16,
    pub tima: u8,
    pub tma: u8,
    pub tac: u8,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            div: 0,
            tima: 0,
            tma: 0,
            tac: 0,
        }
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            0xFF04 => (self.div >> 8) as u8,
            0xFF05 => self.tima,
            0xFF06 => self.tma,
            0xFF07 => self.tac | 0xF8,
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, addr: u16, val: u8, irq: &mut InterruptRegisters) {
        match addr {
            0xFF04 => self.set_counter(0, self.tac, irq),
            0xFF05 => self.tima = val,
            0xFF06 => self.tma = val,
            0xFF07 => self.set_counter(self.div, val & 0x07, irq),
            _ => {}
        }
    }

    /// Advance by `cycles` CPU cycles.
    pub fn step(&mut self, cycles: u32, irq: &mut InterruptRegisters) {
        for _ in 0..cycles {
            self.set_counter(self.div.wrapping_add(1), self.tac, irq);
        }
    }

    /// Moves the divider and TAC together; a falling edge of the selected
    /// signal ticks TIMA. Writing DIV or TAC can produce such an edge.
    fn set_counter(&mut self, div: u16, tac: u8, irq: &mut InterruptRegisters) {
        let before = Self::signal(self.div, self.tac);
        self.div = div;
        self.tac = tac;
        if before && !Self::signal(self.div, self.tac) {
            self.increment(irq);
        }
    }

    fn increment(&mut self, irq: &mut InterruptRegisters) {
        let (tima, overflow) = self.tima.overflowing_add(1);
        if overflow {
            self.tima = self.tma;
            irq.raise(Interrupt::Timer);
        } else {
            self.tima = tima;
        }
    }

    fn signal(div: u16, tac: u8) -> bool {
        if tac & 0x04 == 0 {
            return false;
        }
        let bit = match tac & 0x03 {
            0x00 => 9,
            0x01 => 3,
            0x02 => 5,
            _ => 7,
        };
        (div >> bit) & 1 != 0
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
