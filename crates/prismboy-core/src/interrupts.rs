/// Interrupt sources in IF/IE bit order.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    VBlank = 0,
    Stat = 1,
    Timer = 2,
    Serial = 3,
    Joypad = 4,
}

impl Interrupt {
    #[inline]
    pub const fn bit(self) -> u8 {
        1 << self as u8
    }

    /// Fixed handler address.
    #[inline]
    pub const fn vector(self) -> u16 {
        0x0040 + 8 * self as u16
    }
}

/// Order in which pending sources are serviced. Serial is never dispatched.
pub const DISPATCH_ORDER: [Interrupt; 4] = [
    Interrupt::VBlank,
    Interrupt::Stat,
    Interrupt::Timer,
    Interrupt::Joypad,
];

pub const STAT_MODE_MASK: u8 = 0x03;
pub const STAT_COINCIDENCE: u8 = 0x04;
pub const STAT_HBLANK_IRQ: u8 = 0x08;
pub const STAT_VBLANK_IRQ: u8 = 0x10;
pub const STAT_OAM_IRQ: u8 = 0x20;
pub const STAT_LYC_IRQ: u8 = 0x40;

const IRQ_MASK: u8 = 0x1F;

/// IE, IF and the LCD status register.
///
/// The CPU consumes these; the PPU, timer and joypad raise into them. The
/// PPU owns the low three STAT bits, software owns the enable bits.
#[derive(Clone, Debug, Default)]
pub struct InterruptRegisters {
    enable: u8,
    flags: u8,
    stat: u8,
}

impl InterruptRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&mut self, irq: Interrupt) {
        self.flags |= irq.bit();
    }

    pub fn clear(&mut self, irq: Interrupt) {
        self.flags &= !irq.bit();
    }

    pub fn is_raised(&self, irq: Interrupt) -> bool {
        self.flags & irq.bit() != 0
    }

    pub fn enable(&self) -> u8 {
        self.enable
    }

    pub fn set_enable(&mut self, val: u8) {
        self.enable = val;
    }

    /// IF as the CPU reads it: the unused top bits read back set.
    pub fn flags(&self) -> u8 {
        self.flags | !IRQ_MASK
    }

    pub fn set_flags(&mut self, val: u8) {
        self.flags = val & IRQ_MASK;
    }

    /// Sources both requested and enabled.
    pub fn pending(&self) -> u8 {
        self.enable & self.flags & IRQ_MASK
    }

    /// Highest-priority source that would be dispatched now.
    pub fn next_dispatch(&self) -> Option<Interrupt> {
        let pending = self.pending();
        DISPATCH_ORDER
            .iter()
            .copied()
            .find(|irq| pending & irq.bit() != 0)
    }

    /// STAT as the CPU reads it.
    pub fn stat(&self) -> u8 {
        self.stat | 0x80
    }

    /// CPU write to STAT; mode and coincidence bits are read-only.
    pub fn write_stat(&mut self, val: u8) {
        self.stat = (self.stat & (STAT_MODE_MASK | STAT_COINCIDENCE)) | (val & 0x78);
    }

    pub fn mode(&self) -> u8 {
        self.stat & STAT_MODE_MASK
    }

    pub fn set_mode(&mut self, mode: u8) {
        self.stat = (self.stat & !STAT_MODE_MASK) | (mode & STAT_MODE_MASK);
    }

    pub fn set_coincidence(&mut self, on: bool) {
        if on {
            self.stat |= STAT_COINCIDENCE;
        } else {
            self.stat &= !STAT_COINCIDENCE;
        }
    }

    pub fn stat_irq_enabled(&self, mask: u8) -> bool {
        self.stat & mask != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vectors_follow_bit_order() {
        assert_eq!(Interrupt::VBlank.vector(), 0x40);
        assert_eq!(Interrupt::Stat.vector(), 0x48);
        assert_eq!(Interrupt::Timer.vector(), 0x50);
        assert_eq!(Interrupt::Joypad.vector(), 0x60);
        assert_eq!(Interrupt::Joypad.bit(), 0x10);
    }

    #[test]
    fn dispatch_priority_skips_serial() {
        let mut irq = InterruptRegisters::new();
        irq.set_enable(0xFF);
        irq.raise(Interrupt::Serial);
        assert_eq!(irq.pending(), 0x08);
        assert_eq!(irq.next_dispatch(), None);

        irq.raise(Interrupt::Joypad);
        irq.raise(Interrupt::Timer);
        assert_eq!(irq.next_dispatch(), Some(Interrupt::Timer));
        irq.raise(Interrupt::VBlank);
        assert_eq!(irq.next_dispatch(), Some(Interrupt::VBlank));
    }

    #[test]
    fn stat_write_preserves_read_only_bits() {
        let mut irq = InterruptRegisters::new();
        irq.set_mode(3);
        irq.set_coincidence(true);
        irq.write_stat(0xFF);
        assert_eq!(irq.stat(), 0xFF);
        irq.write_stat(0x00);
        assert_eq!(irq.stat(), 0x87);
    }
}
