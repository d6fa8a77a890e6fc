use std::sync::{Arc, Mutex, MutexGuard};

pub const SOUND_REG_START: u16 = 0xFF10;
pub const SOUND_REG_END: u16 = 0xFF3F;
pub const WAVE_RAM_START: u16 = 0xFF30;
const SOUND_REG_COUNT: usize = (SOUND_REG_END - SOUND_REG_START + 1) as usize;

/// Copy of the sound registers (NR10-NR52) and wave RAM as last written
/// by the CPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SoundSnapshot {
    regs: [u8; SOUND_REG_COUNT],
    /// Incremented on every register write.
    pub writes: u64,
}

impl Default for SoundSnapshot {
    fn default() -> Self {
        Self {
            regs: [0; SOUND_REG_COUNT],
            writes: 0,
        }
    }
}

impl SoundSnapshot {
    /// Register value at `addr` (0xFF10-0xFF3F). Other addresses read 0xFF.
    pub fn reg(&self, addr: u16) -> u8 {
        match addr {
            SOUND_REG_START..=SOUND_REG_END => self.regs[(addr - SOUND_REG_START) as usize],
            _ => 0xFF,
        }
    }

    pub fn wave_ram(&self) -> &[u8] {
        &self.regs[(WAVE_RAM_START - SOUND_REG_START) as usize..]
    }

    /// NR52 bit 7.
    pub fn master_enabled(&self) -> bool {
        self.reg(0xFF26) & 0x80 != 0
    }
}

/// Shared handle to the sound register snapshot.
///
/// The emulation thread writes through it on every sound register store;
/// an audio thread clones the handle and copies consistent snapshots out
/// at its own pace.
#[derive(Clone, Debug, Default)]
pub struct SoundRegisterHandle {
    inner: Arc<Mutex<SoundSnapshot>>,
}

impl SoundRegisterHandle {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SoundSnapshot> {
        // A panicked reader cannot leave a register file half-written.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> SoundSnapshot {
        *self.lock()
    }

    pub(crate) fn write(&self, addr: u16, val: u8) {
        if !(SOUND_REG_START..=SOUND_REG_END).contains(&addr) {
            return;
        }
        let mut snap = self.lock();
        snap.regs[(addr - SOUND_REG_START) as usize] = val;
        snap.writes += 1;
    }
}
