//! Command-line frontend for the `prismboy-core` emulator.

/// Persistent settings loaded from `prismboy.toml`.
pub mod config;

/// PNG export of emulator frames.
pub mod screenshot;
