#![allow(dead_code)]

use prismboy_core::{Cartridge, GameBoy, Model, ModelOverride};

/// Image sized for `rom_code` with the given header bytes. Each ROM bank
/// starts with its own bank number (little endian) so tests can tell which
/// bank is mapped.
pub fn rom_image(cart_type: u8, rom_code: u8, ram_code: u8) -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000 << rom_code];
    for (bank, chunk) in rom.chunks_mut(0x4000).enumerate().skip(1) {
        chunk[0] = bank as u8;
        chunk[1] = (bank >> 8) as u8;
    }
    rom[0x0147] = cart_type;
    rom[0x0148] = rom_code;
    rom[0x0149] = ram_code;
    rom
}

pub fn cartridge(cart_type: u8, rom_code: u8, ram_code: u8) -> Cartridge {
    Cartridge::from_bytes(rom_image(cart_type, rom_code, ram_code)).unwrap()
}

/// Machine whose cartridge holds `program` at the entry point 0x0100.
pub fn machine_with_program(model: Model, program: &[u8]) -> GameBoy {
    assert!(program.len() <= 0x34, "program would overlap the header");
    let mut rom = rom_image(0x00, 0x00, 0x00);
    if model.is_cgb() {
        rom[0x0143] = 0x80;
    }
    rom[0x0100..0x0100 + program.len()].copy_from_slice(program);
    let cart = Cartridge::from_bytes(rom).unwrap();
    GameBoy::with_cartridge(cart, ModelOverride::Auto)
}
