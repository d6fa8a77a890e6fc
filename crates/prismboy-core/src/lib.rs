//! Game Boy / Game Boy Color emulation core.
//!
//! This crate contains the platform-agnostic emulator logic (CPU, bus,
//! PPU, timer, mappers). The `prismboy` binary drives it through the
//! [`gameboy`] facade and the [`session`] frame loop.

/// Cartridge header parsing and mappers (MBC1/2/3/5).
pub mod cartridge;

/// SM83 CPU core.
pub mod cpu;

/// High-level facade that wires the CPU and MMU into a single machine.
pub mod gameboy;

/// Hardware models and the user's model override.
pub mod hardware;

/// Interrupt enable/flag registers and the shared STAT register.
pub mod interrupts;

/// I/O port dispatch table.
pub mod io;

/// Joypad register and the shared input handle.
pub mod joypad;

/// Memory map and hardware plumbing.
pub mod mmu;

/// Pixel Processing Unit (PPU) emulation.
pub mod ppu;

/// Frame loop, pacing and shutdown.
pub mod session;

/// Sound register snapshot shared with an audio thread.
pub mod sound;

/// Divider/timer unit.
pub mod timer;

pub use cartridge::{Cartridge, CartridgeError};
pub use gameboy::{FrameResult, GameBoy};
pub use hardware::{Model, ModelOverride};
