use crate::{
    hardware::Model,
    interrupts::{
        Interrupt, InterruptRegisters, STAT_HBLANK_IRQ, STAT_LYC_IRQ, STAT_OAM_IRQ,
        STAT_VBLANK_IRQ,
    },
};

// Screen resolution used by the Game Boy PPU
pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

pub const LINE_CYCLES: u32 = 456;
pub const FRAME_CYCLES: u32 = LINE_CYCLES * 154;

const VBLANK_START_LINE: u8 = 144;
const LAST_LINE: u8 = 153;

// Sprite limits
const MAX_SPRITES_PER_LINE: usize = 10;
const TOTAL_SPRITES: usize = 40;

// Internal memory sizes
pub const VRAM_BANK_SIZE: usize = 0x2000;
pub const OAM_SIZE: usize = 0xA0;
const PAL_RAM_SIZE: usize = 0x40;
const PAL_INDEX_MASK: u8 = 0x3F;
const PAL_UNUSED_BIT: u8 = 0x40;
const PAL_AUTO_INCREMENT_BIT: u8 = 0x80;

// VRAM layout constants
const BG_MAP_0_BASE: usize = 0x1800;
const BG_MAP_1_BASE: usize = 0x1C00;
const SIGNED_TILE_BASE: i32 = 0x1000;

// LCDC bits
const LCDC_BG_ENABLE: u8 = 0x01;
const LCDC_OBJ_ENABLE: u8 = 0x02;
const LCDC_OBJ_TALL: u8 = 0x04;
const LCDC_BG_MAP: u8 = 0x08;
const LCDC_TILE_DATA: u8 = 0x10;
const LCDC_WINDOW_ENABLE: u8 = 0x20;
const LCDC_WINDOW_MAP: u8 = 0x40;
const LCDC_LCD_ENABLE: u8 = 0x80;

// Tile attribute / sprite flag bits
const ATTR_PALETTE: u8 = 0x07;
const ATTR_BANK: u8 = 0x08;
const ATTR_DMG_PALETTE: u8 = 0x10;
const ATTR_XFLIP: u8 = 0x20;
const ATTR_YFLIP: u8 = 0x40;
const ATTR_PRIORITY: u8 = 0x80;

/// Default DMG palette colors in 0x00RRGGBB order.
const DMG_PALETTE: [u32; 4] = [0x009BBC0F, 0x008BAC0F, 0x00306230, 0x000F380F];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    HBlank,
    VBlank,
    OamSearch,
    Drawing,
}

impl Mode {
    /// Cycles spent in this mode; VBlank's cost is per line.
    pub const fn cycles(self) -> i32 {
        match self {
            Mode::HBlank => 204,
            Mode::VBlank => 456,
            Mode::OamSearch => 80,
            Mode::Drawing => 172,
        }
    }

    /// STAT bits 0-1.
    pub const fn bits(self) -> u8 {
        match self {
            Mode::HBlank => 0,
            Mode::VBlank => 1,
            Mode::OamSearch => 2,
            Mode::Drawing => 3,
        }
    }
}

/// VRAM banks and OAM. Owned by the bus and lent to the PPU while it
/// scans and renders.
pub struct VideoMemory {
    vram: Vec<[u8; VRAM_BANK_SIZE]>,
    bank: usize,
    pub oam: [u8; OAM_SIZE],
}

impl VideoMemory {
    pub fn new(model: Model) -> Self {
        Self {
            vram: vec![[0; VRAM_BANK_SIZE]; model.vram_banks()],
            bank: 0,
            oam: [0; OAM_SIZE],
        }
    }

    pub fn read_vram(&self, addr: u16) -> u8 {
        self.vram[self.bank][addr as usize & (VRAM_BANK_SIZE - 1)]
    }

    pub fn write_vram(&mut self, addr: u16, val: u8) {
        self.vram[self.bank][addr as usize & (VRAM_BANK_SIZE - 1)] = val;
    }

    pub fn bank(&self) -> usize {
        self.bank
    }

    pub fn select_bank(&mut self, val: u8) {
        self.bank = (val as usize & 1).min(self.vram.len() - 1);
    }

    pub fn bank_data(&self, bank: usize) -> &[u8; VRAM_BANK_SIZE] {
        &self.vram[bank.min(self.vram.len() - 1)]
    }

    pub fn read_oam(&self, addr: u16) -> u8 {
        self.oam[addr as usize - 0xFE00]
    }

    pub fn write_oam(&mut self, addr: u16, val: u8) {
        self.oam[addr as usize - 0xFE00] = val;
    }
}

/// What happened during one call to [`Ppu::step`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PpuEvents {
    pub hblank_entries: u32,
    pub frame_complete: bool,
}

/// A CGB palette RAM (64 bytes, eight palettes of four RGB555 colors) and
/// its 32 decoded colors.
#[derive(Clone)]
struct ColorTable {
    index: u8,
    data: [u8; PAL_RAM_SIZE],
    colors: [u32; PAL_RAM_SIZE / 2],
}

impl ColorTable {
    fn new() -> Self {
        Self {
            index: 0,
            data: [0xFF; PAL_RAM_SIZE],
            colors: [decode_cgb_color(0xFF, 0xFF); PAL_RAM_SIZE / 2],
        }
    }

    fn read_index(&self) -> u8 {
        self.index | PAL_UNUSED_BIT
    }

    fn write_index(&mut self, val: u8) {
        self.index = val & (PAL_AUTO_INCREMENT_BIT | PAL_INDEX_MASK);
    }

    fn read_data(&self) -> u8 {
        self.data[(self.index & PAL_INDEX_MASK) as usize]
    }

    fn write_data(&mut self, val: u8) {
        let i = (self.index & PAL_INDEX_MASK) as usize;
        self.data[i] = val;
        let entry = i / 2;
        self.colors[entry] = decode_cgb_color(self.data[entry * 2], self.data[entry * 2 + 1]);
        if self.index & PAL_AUTO_INCREMENT_BIT != 0 {
            self.index = PAL_AUTO_INCREMENT_BIT | ((self.index + 1) & PAL_INDEX_MASK);
        }
    }

    fn load(&mut self, palette: usize, colors: [u16; 4]) {
        for (i, &c) in colors.iter().enumerate() {
            let entry = palette * 4 + i;
            let [lo, hi] = c.to_le_bytes();
            self.data[entry * 2] = lo;
            self.data[entry * 2 + 1] = hi;
            self.colors[entry] = decode_cgb_color(lo, hi);
        }
    }

    fn color(&self, palette: u8, color_id: u8) -> u32 {
        self.colors[(palette & ATTR_PALETTE) as usize * 4 + (color_id & 3) as usize]
    }
}

/// RGB555 to 0x00RRGGBB, widening each channel as `(c << 3) | (c >> 2)`.
fn decode_cgb_color(lo: u8, hi: u8) -> u32 {
    let raw = u16::from_le_bytes([lo, hi]);
    let expand = |c: u16| -> u32 {
        let c = (c & 0x1F) as u32;
        (c << 3) | (c >> 2)
    };
    (expand(raw) << 16) | (expand(raw >> 5) << 8) | expand(raw >> 10)
}

#[inline]
fn tile_pixel(lo: u8, hi: u8, col: u8) -> u8 {
    let bit = 7 - col;
    (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1)
}

#[inline]
fn dmg_shade(palette: u8, color_id: u8) -> usize {
    ((palette >> (color_id * 2)) & 0x03) as usize
}

#[derive(Copy, Clone, Default)]
struct Sprite {
    x: i16,
    y: i16,
    tile: u8,
    flags: u8,
    oam_index: usize,
}

#[derive(Copy, Clone, Default)]
struct BgPixel {
    color: u8,
    palette: u8,
    priority: bool,
}

#[derive(Copy, Clone)]
struct ObjPixel {
    color: u8,
    palette: u8,
    behind_bg: bool,
}

pub struct Ppu {
    cgb: bool,

    lcdc: u8,
    scy: u8,
    scx: u8,
    ly: u8,
    lyc: u8,
    bgp: u8,
    obp0: u8,
    obp1: u8,
    wy: u8,
    wx: u8,

    /// Internal window line counter
    window_line: u8,

    bg_colors: ColorTable,
    obj_colors: ColorTable,
    /// Object priority mode register (OPRI)
    opri: u8,

    mode: Mode,
    /// Cycles left in the current mode.
    counter: i32,
    lyc_match: bool,

    framebuffer: [u32; SCREEN_WIDTH * SCREEN_HEIGHT],
    bg_line: [BgPixel; SCREEN_WIDTH],
    obj_line: [Option<ObjPixel>; SCREEN_WIDTH],
    /// Sprites selected for the current line, in drawing order.
    line_sprites: [Sprite; MAX_SPRITES_PER_LINE],
    sprite_count: usize,
    frame_ready: bool,
    frame_counter: u64,
}

impl Ppu {
    /// PPU in the state the boot program leaves: LCD on, line 0, OAM search.
    pub fn new(model: Model) -> Self {
        Self {
            cgb: model.is_cgb(),
            lcdc: 0x91,
            scy: 0,
            scx: 0,
            ly: 0,
            lyc: 0,
            bgp: 0xFC,
            obp0: 0xFF,
            obp1: 0xFF,
            wy: 0,
            wx: 0,
            window_line: 0,
            bg_colors: ColorTable::new(),
            obj_colors: ColorTable::new(),
            opri: 0,
            mode: Mode::OamSearch,
            counter: Mode::OamSearch.cycles(),
            lyc_match: false,
            framebuffer: [DMG_PALETTE[0]; SCREEN_WIDTH * SCREEN_HEIGHT],
            bg_line: [BgPixel::default(); SCREEN_WIDTH],
            obj_line: [None; SCREEN_WIDTH],
            line_sprites: [Sprite::default(); MAX_SPRITES_PER_LINE],
            sprite_count: 0,
            frame_ready: false,
            frame_counter: 0,
        }
    }

    /// Fixed colors a CGB gives a monochrome cartridge.
    pub fn load_compatibility_palettes(&mut self) {
        const OBJ_PAL: [u16; 4] = [0x7FFF, 0x421F, 0x1CF2, 0x0000];
        const BG_PAL: [u16; 4] = [0x7FFF, 0x1BEF, 0x6180, 0x0000];

        self.bg_colors.load(0, BG_PAL);
        self.obj_colors.load(0, OBJ_PAL);
        self.obj_colors.load(1, OBJ_PAL);
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn ly(&self) -> u8 {
        self.ly
    }

    pub fn lcd_enabled(&self) -> bool {
        self.lcdc & LCDC_LCD_ENABLE != 0
    }

    pub fn window_line_counter(&self) -> u8 {
        self.window_line
    }

    /// Returns the current framebuffer (0x00RRGGBB, row-major).
    pub fn framebuffer(&self) -> &[u32] {
        &self.framebuffer
    }

    pub fn frame_ready(&self) -> bool {
        self.frame_ready
    }

    /// Returns and clears the completed-frame flag.
    pub fn take_frame_ready(&mut self) -> bool {
        std::mem::take(&mut self.frame_ready)
    }

    /// Returns the number of frames that have been completed since power on.
    pub fn frames(&self) -> u64 {
        self.frame_counter
    }

    pub fn bg_palette_color(&self, palette: u8, color_id: u8) -> u32 {
        self.bg_colors.color(palette, color_id)
    }

    pub fn obj_palette_color(&self, palette: u8, color_id: u8) -> u32 {
        self.obj_colors.color(palette, color_id)
    }

    pub fn read_reg(&self, addr: u16, irq: &InterruptRegisters) -> u8 {
        match addr {
            0xFF40 => self.lcdc,
            0xFF41 => irq.stat(),
            0xFF42 => self.scy,
            0xFF43 => self.scx,
            0xFF44 => self.ly,
            0xFF45 => self.lyc,
            0xFF47 => self.bgp,
            0xFF48 => self.obp0,
            0xFF49 => self.obp1,
            0xFF4A => self.wy,
            0xFF4B => self.wx,
            0xFF68 if self.cgb => self.bg_colors.read_index(),
            0xFF69 if self.cgb => self.bg_colors.read_data(),
            0xFF6A if self.cgb => self.obj_colors.read_index(),
            0xFF6B if self.cgb => self.obj_colors.read_data(),
            0xFF6C if self.cgb => 0xFE | self.opri,
            _ => 0xFF,
        }
    }

    pub fn write_reg(&mut self, addr: u16, val: u8, irq: &mut InterruptRegisters) {
        match addr {
            0xFF40 => self.write_lcdc(val, irq),
            0xFF41 => irq.write_stat(val),
            0xFF42 => self.scy = val,
            0xFF43 => self.scx = val,
            // LY is read-only.
            0xFF44 => {}
            0xFF45 => {
                self.lyc = val;
                if self.lcd_enabled() {
                    self.compare_lyc(irq);
                }
            }
            0xFF47 => self.bgp = val,
            0xFF48 => self.obp0 = val,
            0xFF49 => self.obp1 = val,
            0xFF4A => self.wy = val,
            0xFF4B => self.wx = val,
            0xFF68 if self.cgb => self.bg_colors.write_index(val),
            0xFF69 if self.cgb => self.bg_colors.write_data(val),
            0xFF6A if self.cgb => self.obj_colors.write_index(val),
            0xFF6B if self.cgb => self.obj_colors.write_data(val),
            0xFF6C if self.cgb => self.opri = val & 0x01,
            _ => {}
        }
    }

    /// Mirrors the current mode and LY=LYC state into STAT.
    pub fn sync_status(&mut self, irq: &mut InterruptRegisters) {
        if self.lcd_enabled() {
            irq.set_mode(self.mode.bits());
            self.compare_lyc(irq);
        } else {
            irq.set_mode(Mode::HBlank.bits());
        }
    }

    fn write_lcdc(&mut self, val: u8, irq: &mut InterruptRegisters) {
        let was_enabled = self.lcd_enabled();
        self.lcdc = val;
        match (was_enabled, self.lcd_enabled()) {
            (true, false) => {
                self.ly = 0;
                self.window_line = 0;
                self.mode = Mode::OamSearch;
                self.counter = Mode::OamSearch.cycles();
                self.lyc_match = false;
                irq.set_mode(Mode::HBlank.bits());
            }
            (false, true) => {
                self.mode = Mode::OamSearch;
                self.counter = Mode::OamSearch.cycles();
                irq.set_mode(Mode::OamSearch.bits());
                self.compare_lyc(irq);
            }
            _ => {}
        }
    }

    fn compare_lyc(&mut self, irq: &mut InterruptRegisters) {
        let matched = self.ly == self.lyc;
        irq.set_coincidence(matched);
        if matched && !self.lyc_match && irq.stat_irq_enabled(STAT_LYC_IRQ) {
            irq.raise(Interrupt::Stat);
        }
        self.lyc_match = matched;
    }

    fn set_ly(&mut self, ly: u8, irq: &mut InterruptRegisters) {
        self.ly = ly;
        self.compare_lyc(irq);
    }

    fn enter(&mut self, mode: Mode, irq: &mut InterruptRegisters) {
        self.mode = mode;
        self.counter += mode.cycles();
        irq.set_mode(mode.bits());
        let stat_source = match mode {
            Mode::HBlank => STAT_HBLANK_IRQ,
            Mode::VBlank => {
                irq.raise(Interrupt::VBlank);
                STAT_VBLANK_IRQ
            }
            Mode::OamSearch => STAT_OAM_IRQ,
            Mode::Drawing => 0,
        };
        if irq.stat_irq_enabled(stat_source) {
            irq.raise(Interrupt::Stat);
        }
    }

    /// Advance the mode machine by `cycles` dots.
    pub fn step(
        &mut self,
        cycles: u32,
        video: &VideoMemory,
        irq: &mut InterruptRegisters,
    ) -> PpuEvents {
        let mut events = PpuEvents::default();
        if !self.lcd_enabled() {
            return events;
        }

        self.counter -= cycles as i32;
        while self.counter <= 0 {
            match self.mode {
                Mode::OamSearch => {
                    self.oam_scan(video);
                    self.enter(Mode::Drawing, irq);
                }
                Mode::Drawing => {
                    self.render_scanline(video);
                    self.enter(Mode::HBlank, irq);
                    events.hblank_entries += 1;
                }
                Mode::HBlank => {
                    self.set_ly(self.ly + 1, irq);
                    if self.ly >= VBLANK_START_LINE {
                        self.enter(Mode::VBlank, irq);
                    } else {
                        self.enter(Mode::OamSearch, irq);
                    }
                }
                Mode::VBlank => {
                    if self.ly >= LAST_LINE {
                        self.window_line = 0;
                        self.frame_ready = true;
                        self.frame_counter += 1;
                        events.frame_complete = true;
                        self.set_ly(0, irq);
                        self.enter(Mode::OamSearch, irq);
                    } else {
                        self.set_ly(self.ly + 1, irq);
                        self.counter += Mode::VBlank.cycles();
                    }
                }
            }
        }
        events
    }

    fn sprite_height(&self) -> i16 {
        if self.lcdc & LCDC_OBJ_TALL != 0 { 16 } else { 8 }
    }

    /// Picks the first ten sprites covering LY and orders them so that the
    /// highest-priority sprite is drawn last.
    fn oam_scan(&mut self, video: &VideoMemory) {
        let height = self.sprite_height();
        let ly = self.ly as i16;
        self.sprite_count = 0;
        for i in 0..TOTAL_SPRITES {
            if self.sprite_count >= MAX_SPRITES_PER_LINE {
                break;
            }
            let base = i * 4;
            let y = video.oam[base] as i16 - 16;
            if ly >= y && ly < y + height {
                self.line_sprites[self.sprite_count] = Sprite {
                    x: video.oam[base + 1] as i16 - 8,
                    y,
                    tile: video.oam[base + 2],
                    flags: video.oam[base + 3],
                    oam_index: i,
                };
                self.sprite_count += 1;
            }
        }

        let sprites = &mut self.line_sprites[..self.sprite_count];
        if self.cgb && self.opri & 0x01 == 0 {
            sprites.sort_by(|a, b| b.oam_index.cmp(&a.oam_index));
        } else {
            sprites.sort_by(|a, b| b.x.cmp(&a.x).then(b.oam_index.cmp(&a.oam_index)));
        }
    }

    fn render_scanline(&mut self, video: &VideoMemory) {
        self.bg_line = [BgPixel::default(); SCREEN_WIDTH];
        self.obj_line = [None; SCREEN_WIDTH];

        // On DMG, LCDC bit 0 blanks both background and window.
        if self.cgb || self.lcdc & LCDC_BG_ENABLE != 0 {
            self.render_background(video);
            self.render_window(video);
        }
        if self.lcdc & LCDC_OBJ_ENABLE != 0 {
            self.render_sprites(video);
        }
        self.compose_line();
    }

    fn render_background(&mut self, video: &VideoMemory) {
        let map = if self.lcdc & LCDC_BG_MAP != 0 {
            BG_MAP_1_BASE
        } else {
            BG_MAP_0_BASE
        };
        let y = self.ly.wrapping_add(self.scy);
        for x in 0..SCREEN_WIDTH {
            let px = (x as u8).wrapping_add(self.scx);
            self.bg_line[x] = self.fetch_bg_pixel(video, map, px, y);
        }
    }

    fn render_window(&mut self, video: &VideoMemory) {
        if self.lcdc & LCDC_WINDOW_ENABLE == 0 || self.ly < self.wy {
            return;
        }
        let start = self.wx as i16 - 7;
        if start >= SCREEN_WIDTH as i16 {
            return;
        }
        let map = if self.lcdc & LCDC_WINDOW_MAP != 0 {
            BG_MAP_1_BASE
        } else {
            BG_MAP_0_BASE
        };
        let y = self.window_line;
        for x in start.max(0)..SCREEN_WIDTH as i16 {
            let wx = (x - start) as u8;
            self.bg_line[x as usize] = self.fetch_bg_pixel(video, map, wx, y);
        }
        self.window_line = self.window_line.wrapping_add(1);
    }

    fn fetch_bg_pixel(&self, video: &VideoMemory, map: usize, x: u8, y: u8) -> BgPixel {
        let index = map + (y as usize / 8) * 32 + x as usize / 8;
        let tile = video.bank_data(0)[index];
        let attr = if self.cgb {
            video.bank_data(1)[index]
        } else {
            0
        };

        let mut row = (y % 8) as usize;
        let mut col = x % 8;
        if attr & ATTR_YFLIP != 0 {
            row = 7 - row;
        }
        if attr & ATTR_XFLIP != 0 {
            col = 7 - col;
        }

        let base = if self.lcdc & LCDC_TILE_DATA != 0 {
            tile as usize * 16
        } else {
            (SIGNED_TILE_BASE + (tile as i8 as i32) * 16) as usize
        };
        let bank = video.bank_data(usize::from(attr & ATTR_BANK != 0));
        BgPixel {
            color: tile_pixel(bank[base + row * 2], bank[base + row * 2 + 1], col),
            palette: attr & ATTR_PALETTE,
            priority: attr & ATTR_PRIORITY != 0,
        }
    }

    fn render_sprites(&mut self, video: &VideoMemory) {
        let height = self.sprite_height();
        for i in 0..self.sprite_count {
            let sprite = self.line_sprites[i];
            // LCDC.2 may change between the OAM scan and here.
            let mut row = (self.ly as i16 - sprite.y) & (height - 1);
            if sprite.flags & ATTR_YFLIP != 0 {
                row = height - 1 - row;
            }
            let tile = if height == 16 {
                sprite.tile & 0xFE
            } else {
                sprite.tile
            };
            let addr = tile as usize * 16 + row as usize * 2;
            let bank = video.bank_data(usize::from(self.cgb && sprite.flags & ATTR_BANK != 0));
            let (lo, hi) = (bank[addr], bank[addr + 1]);
            let palette = if self.cgb {
                sprite.flags & ATTR_PALETTE
            } else {
                u8::from(sprite.flags & ATTR_DMG_PALETTE != 0)
            };

            for col in 0..8u8 {
                let x = sprite.x + col as i16;
                if !(0..SCREEN_WIDTH as i16).contains(&x) {
                    continue;
                }
                let bit_col = if sprite.flags & ATTR_XFLIP != 0 {
                    7 - col
                } else {
                    col
                };
                let color = tile_pixel(lo, hi, bit_col);
                if color == 0 {
                    continue;
                }
                self.obj_line[x as usize] = Some(ObjPixel {
                    color,
                    palette,
                    behind_bg: sprite.flags & ATTR_PRIORITY != 0,
                });
            }
        }
    }

    fn compose_line(&mut self) {
        let row = self.ly as usize * SCREEN_WIDTH;
        let master_priority = self.lcdc & LCDC_BG_ENABLE != 0;
        for x in 0..SCREEN_WIDTH {
            let bg = self.bg_line[x];
            let obj = self.obj_line[x];
            let color = if self.cgb {
                match obj {
                    Some(o) if !(master_priority && bg.color != 0 && (bg.priority || o.behind_bg)) => {
                        self.obj_colors.color(o.palette, o.color)
                    }
                    _ => self.bg_colors.color(bg.palette, bg.color),
                }
            } else {
                match obj {
                    Some(o) if !(o.behind_bg && bg.color != 0) => {
                        let palette = if o.palette == 0 { self.obp0 } else { self.obp1 };
                        DMG_PALETTE[dmg_shade(palette, o.color)]
                    }
                    _ if !master_priority => DMG_PALETTE[0],
                    _ => DMG_PALETTE[dmg_shade(self.bgp, bg.color)],
                }
            };
            self.framebuffer[row + x] = color;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb555_expands_to_full_range() {
        assert_eq!(decode_cgb_color(0xFF, 0x7F), 0x00FF_FFFF);
        assert_eq!(decode_cgb_color(0x00, 0x00), 0);
        assert_eq!(decode_cgb_color(0x1F, 0x00), 0x00FF_0000);
        assert_eq!(decode_cgb_color(0x10, 0x00), 0x0084_0000);
    }

    #[test]
    fn palette_data_auto_increments() {
        let mut table = ColorTable::new();
        table.write_index(0x80 | 0x3E);
        table.write_data(0x1F);
        assert_eq!(table.read_index(), 0xFF);
        table.write_data(0x00);
        // wrapped to index 0
        assert_eq!(table.read_index(), 0xC0);
        assert_eq!(table.color(7, 3), 0x00FF_0000);
        assert_eq!(table.data[0], 0xFF);

        table.write_index(0x02);
        table.write_data(0xE0);
        assert_eq!(table.read_index(), 0x42);
        table.write_data(0x03);
        assert_eq!(table.read_index(), 0x42);
        assert_eq!(table.read_data(), 0x03);
    }

    #[test]
    fn tile_pixels_are_planar() {
        assert_eq!(tile_pixel(0b1000_0000, 0b1000_0000, 0), 3);
        assert_eq!(tile_pixel(0b0100_0000, 0b0000_0000, 1), 1);
        assert_eq!(tile_pixel(0b0000_0000, 0b0000_0001, 7), 2);
    }
}
