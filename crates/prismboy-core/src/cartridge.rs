use log::{info, warn};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::hardware::Model;

pub const ROM_BANK_SIZE: usize = 0x4000;
pub const RAM_BANK_SIZE: usize = 0x2000;
const HEADER_END: usize = 0x0150;
const MBC2_RAM_SIZE: usize = 0x0200;
const SAVE_EXTENSION: &str = "sav";

/// Reasons a cartridge image is rejected before emulation starts.
#[derive(Error, Debug)]
pub enum CartridgeError {
    #[error("image is {0} bytes, too short to hold a cartridge header")]
    HeaderTooShort(usize),
    #[error("unrecognized ROM size code {0:#04X}")]
    UnknownRomSize(u8),
    #[error("unrecognized RAM size code {0:#04X}")]
    UnknownRamSize(u8),
    #[error("image is {actual} bytes but the header declares {expected}")]
    Truncated { expected: usize, actual: usize },
    #[error("failed to read cartridge: {0}")]
    Io(#[from] io::Error),
}

/// Bank controller family selected by the cartridge type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbcKind {
    Mbc1,
    Mbc2,
    Mbc3,
    Mbc5,
}

impl MbcKind {
    /// Maps the type byte at 0x0147 onto the nearest supported controller.
    /// ROM-only and MMM01 boards are approximated by their neighbours.
    pub const fn from_type_byte(byte: u8) -> Self {
        match byte {
            0x00..=0x03 => MbcKind::Mbc1,
            0x04..=0x0D => MbcKind::Mbc2,
            0x0E..=0x13 => MbcKind::Mbc3,
            _ => MbcKind::Mbc5,
        }
    }
}

/// Decoded fixed-offset header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartridgeHeader {
    pub title: String,
    pub cgb_flag: u8,
    pub cartridge_type: u8,
    pub mbc: MbcKind,
    pub rom_size: usize,
    pub ram_size: usize,
}

impl CartridgeHeader {
    pub fn parse(data: &[u8]) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_END {
            return Err(CartridgeError::HeaderTooShort(data.len()));
        }

        let cartridge_type = data[0x0147];
        let mbc = MbcKind::from_type_byte(cartridge_type);
        let rom_size = rom_size_from_code(data[0x0148])?;
        let ram_size = if matches!(cartridge_type, 0x05 | 0x06) {
            MBC2_RAM_SIZE
        } else {
            ram_size_from_code(data[0x0149])?
        };

        let mut title = &data[0x0134..0x0143];
        if let Some(end) = title.iter().position(|&b| b == 0) {
            title = &title[..end];
        }

        Ok(Self {
            title: String::from_utf8_lossy(title).trim().to_string(),
            cgb_flag: data[0x0143],
            cartridge_type,
            mbc,
            rom_size,
            ram_size,
        })
    }

    pub fn model(&self) -> Model {
        Model::from_cgb_flag(self.cgb_flag)
    }

    pub fn rom_banks(&self) -> usize {
        self.rom_size / ROM_BANK_SIZE
    }

    /// Number of 8 KiB RAM banks. Carts with less than a full bank count as one.
    pub fn ram_banks(&self) -> usize {
        if self.ram_size == 0 {
            0
        } else {
            self.ram_size.div_ceil(RAM_BANK_SIZE)
        }
    }
}

fn rom_size_from_code(code: u8) -> Result<usize, CartridgeError> {
    match code {
        0x00..=0x08 => Ok(0x8000 << code),
        _ => Err(CartridgeError::UnknownRomSize(code)),
    }
}

fn ram_size_from_code(code: u8) -> Result<usize, CartridgeError> {
    match code {
        0x00 => Ok(0),
        0x01 => Ok(0x800),   // 2KB
        0x02 => Ok(0x2000),  // 8KB
        0x03 => Ok(0x8000),  // 32KB (4 banks)
        0x04 => Ok(0x20000), // 128KB (16 banks)
        0x05 => Ok(0x10000), // 64KB (8 banks)
        0x06 => Ok(0x20000),
        _ => Err(CartridgeError::UnknownRamSize(code)),
    }
}

#[derive(Debug, Default)]
struct BankState {
    /// MBC1: low five bits of the ROM bank. Others: the whole bank register.
    rom_low: u16,
    /// MBC1 only: the shared two-bit register.
    upper: u8,
    ram_bank: u8,
    ram_enable: bool,
    advanced_mode: bool,
    rtc_selected: bool,
}

#[derive(Debug)]
pub struct Cartridge {
    rom: Vec<u8>,
    pub ram: Vec<u8>,
    pub header: CartridgeHeader,
    banks: BankState,
    rom_bank: usize,
    ram_offset: usize,
    save_path: Option<PathBuf>,
    rtc_warned: bool,
}

impl Cartridge {
    /// Validates the header and builds a cartridge with zeroed RAM.
    pub fn from_bytes(mut data: Vec<u8>) -> Result<Self, CartridgeError> {
        let header = CartridgeHeader::parse(&data)?;
        if data.len() < header.rom_size {
            return Err(CartridgeError::Truncated {
                expected: header.rom_size,
                actual: data.len(),
            });
        }
        data.truncate(header.rom_size);

        let mut cart = Self {
            rom: data,
            ram: vec![0; header.ram_size],
            header,
            banks: BankState {
                rom_low: 1,
                ..BankState::default()
            },
            rom_bank: 1,
            ram_offset: 0,
            save_path: None,
            rtc_warned: false,
        };
        cart.update_rom_bank();
        Ok(cart)
    }

    /// Loads an image from disk and restores RAM from the sibling `.sav`
    /// file when one exists.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
        let data = fs::read(&path)?;
        let mut cart = Self::from_bytes(data)?;
        let save = path.as_ref().with_extension(SAVE_EXTENSION);

        if !cart.ram.is_empty() {
            match fs::read(&save) {
                Ok(bytes) => {
                    for (d, s) in cart.ram.iter_mut().zip(bytes.iter()) {
                        *d = *s;
                    }
                    info!("Restored {} bytes of RAM from {}", bytes.len(), save.display());
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("Ignoring unreadable save {}: {e}", save.display()),
            }
        }
        cart.save_path = Some(save);

        info!(
            "Loaded ROM: {} ({:?}, {} ROM banks, {} RAM bytes, {:?})",
            cart.header.title,
            cart.header.mbc,
            cart.header.rom_banks(),
            cart.ram.len(),
            cart.header.model()
        );
        Ok(cart)
    }

    pub fn mbc(&self) -> MbcKind {
        self.header.mbc
    }

    /// Bank currently mapped at 0x4000-0x7FFF.
    pub fn rom_bank(&self) -> usize {
        self.rom_bank
    }

    /// Bank currently mapped at 0xA000-0xBFFF.
    pub fn ram_bank(&self) -> usize {
        self.ram_offset / RAM_BANK_SIZE
    }

    pub fn ram_enabled(&self) -> bool {
        self.banks.ram_enable
    }

    pub fn save_path(&self) -> Option<&Path> {
        self.save_path.as_deref()
    }

    pub fn set_save_path<P: Into<PathBuf>>(&mut self, path: P) {
        self.save_path = Some(path.into());
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x3FFF => self.rom.get(addr as usize).copied().unwrap_or(0xFF),
            0x4000..=0x7FFF => {
                let offset = self.rom_bank * ROM_BANK_SIZE + (addr as usize - 0x4000);
                self.rom.get(offset).copied().unwrap_or(0xFF)
            }
            0xA000..=0xBFFF => self.read_ram(addr),
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, addr: u16, val: u8) {
        match addr {
            0x0000..=0x7FFF => self.write_control(addr, val),
            0xA000..=0xBFFF => self.write_ram(addr, val),
            _ => {}
        }
    }

    fn write_control(&mut self, addr: u16, val: u8) {
        match (self.header.mbc, addr) {
            (MbcKind::Mbc2, 0x0000..=0x3FFF) => {
                if addr & 0x0100 == 0 {
                    if addr < 0x2000 {
                        self.set_ram_enable(val);
                    }
                } else {
                    self.banks.rom_low = (val & 0x0F) as u16;
                    self.update_rom_bank();
                }
            }
            (MbcKind::Mbc2, _) => {}
            (_, 0x0000..=0x1FFF) => self.set_ram_enable(val),
            (MbcKind::Mbc1, 0x2000..=0x3FFF) => {
                self.banks.rom_low = (val & 0x1F) as u16;
                self.update_rom_bank();
            }
            (MbcKind::Mbc1, 0x4000..=0x5FFF) => {
                if self.banks.advanced_mode {
                    self.banks.ram_bank = val & 0x03;
                    self.update_ram_offset();
                } else {
                    self.banks.upper = val & 0x03;
                    self.update_rom_bank();
                }
            }
            (MbcKind::Mbc1, 0x6000..=0x7FFF) => {
                self.banks.advanced_mode = val & 0x01 != 0;
                if !self.banks.advanced_mode {
                    self.banks.ram_bank = 0;
                    self.update_ram_offset();
                }
            }
            (MbcKind::Mbc3, 0x2000..=0x3FFF) => {
                self.banks.rom_low = (val & 0x7F) as u16;
                self.update_rom_bank();
            }
            (MbcKind::Mbc3, 0x4000..=0x5FFF) => {
                if (0x08..=0x0C).contains(&val) {
                    self.banks.rtc_selected = true;
                    self.warn_rtc();
                } else {
                    self.banks.rtc_selected = false;
                    self.banks.ram_bank = val & 0x0F;
                    self.update_ram_offset();
                }
            }
            // Clock latch; there is no clock to latch.
            (MbcKind::Mbc3, 0x6000..=0x7FFF) => {}
            (MbcKind::Mbc5, 0x2000..=0x2FFF) => {
                self.banks.rom_low = (self.banks.rom_low & 0x100) | val as u16;
                self.update_rom_bank();
            }
            (MbcKind::Mbc5, 0x3000..=0x3FFF) => {
                self.banks.rom_low = (self.banks.rom_low & 0xFF) | (((val & 0x01) as u16) << 8);
                self.update_rom_bank();
            }
            (MbcKind::Mbc5, 0x4000..=0x5FFF) => {
                self.banks.ram_bank = val & 0x0F;
                self.update_ram_offset();
            }
            _ => {}
        }
    }

    fn set_ram_enable(&mut self, val: u8) {
        // Boards without RAM never latch the enable.
        if self.ram.is_empty() {
            return;
        }
        self.banks.ram_enable = val & 0x0F == 0x0A;
    }

    fn update_rom_bank(&mut self) {
        let raw = match self.header.mbc {
            MbcKind::Mbc1 => ((self.banks.upper as usize) << 5) | self.banks.rom_low as usize,
            _ => self.banks.rom_low as usize,
        };
        let count = (self.rom.len() / ROM_BANK_SIZE).max(1);
        let mut bank = raw & (count - 1);
        if bank == 0 && self.header.mbc != MbcKind::Mbc5 {
            bank = 1;
        }
        self.rom_bank = bank;
    }

    fn update_ram_offset(&mut self) {
        let count = self.header.ram_banks().max(1);
        self.ram_offset = (self.banks.ram_bank as usize & (count - 1)) * RAM_BANK_SIZE;
    }

    fn ram_index(&self, addr: u16) -> Option<usize> {
        if !self.banks.ram_enable || self.banks.rtc_selected || self.ram.is_empty() {
            return None;
        }
        let local = addr as usize - 0xA000;
        let index = match self.header.mbc {
            MbcKind::Mbc2 => local & (MBC2_RAM_SIZE - 1),
            _ => (self.ram_offset + local) % self.ram.len(),
        };
        Some(index)
    }

    fn read_ram(&self, addr: u16) -> u8 {
        match self.ram_index(addr) {
            Some(i) if self.header.mbc == MbcKind::Mbc2 => self.ram[i] | 0xF0,
            Some(i) => self.ram[i],
            None => 0xFF,
        }
    }

    fn write_ram(&mut self, addr: u16, val: u8) {
        let nibble_only = self.header.mbc == MbcKind::Mbc2;
        if let Some(i) = self.ram_index(addr) {
            self.ram[i] = if nibble_only { val & 0x0F } else { val };
        }
    }

    fn warn_rtc(&mut self) {
        if !self.rtc_warned {
            warn!("MBC3 clock registers are not emulated; reads return 0xFF");
            self.rtc_warned = true;
        }
    }

    /// Writes external RAM to the save path. Carts without RAM or without a
    /// save path are skipped.
    pub fn save_ram(&self) -> io::Result<()> {
        if let Some(path) = &self.save_path
            && !self.ram.is_empty()
        {
            fs::write(path, &self.ram)?;
            info!("Wrote {} bytes of RAM to {}", self.ram.len(), path.display());
        }
        Ok(())
    }
}
