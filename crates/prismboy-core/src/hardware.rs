#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
/// Hardware generation being emulated.
///
/// Decides bank counts, which CGB-only ports respond, the post-boot
/// register values and which compositing rules the PPU applies.
pub enum Model {
    /// Original monochrome Game Boy.
    #[default]
    Dmg,
    /// Game Boy Color.
    Cgb,
}

impl Model {
    #[inline]
    /// Generation requested by the header byte at 0x0143.
    pub const fn from_cgb_flag(flag: u8) -> Self {
        match flag {
            0x80 | 0xC0 => Model::Cgb,
            _ => Model::Dmg,
        }
    }

    #[inline]
    pub const fn is_cgb(self) -> bool {
        matches!(self, Model::Cgb)
    }

    #[inline]
    pub const fn vram_banks(self) -> usize {
        match self {
            Model::Dmg => 1,
            Model::Cgb => 2,
        }
    }

    #[inline]
    /// Number of 4 KiB work RAM banks, including the fixed bank 0.
    pub const fn wram_banks(self) -> usize {
        match self {
            Model::Dmg => 2,
            Model::Cgb => 8,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
/// User choice layered over the cartridge's own request.
pub enum ModelOverride {
    #[default]
    Auto,
    ForceDmg,
    ForceCgb,
}

impl ModelOverride {
    pub const fn resolve(self, requested: Model) -> Model {
        match self {
            ModelOverride::Auto => requested,
            ModelOverride::ForceDmg => Model::Dmg,
            ModelOverride::ForceCgb => Model::Cgb,
        }
    }
}
