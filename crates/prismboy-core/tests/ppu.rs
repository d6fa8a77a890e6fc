use prismboy_core::{
    Model,
    interrupts::Interrupt,
    mmu::Mmu,
    ppu::{FRAME_CYCLES, LINE_CYCLES, Mode, SCREEN_WIDTH},
};

const WHITE: u32 = 0x009BBC0F;
const LIGHT: u32 = 0x008BAC0F;
const DARK: u32 = 0x00306230;
const BLACK: u32 = 0x000F380F;

fn fresh(model: Model) -> Mmu {
    let mut mmu = Mmu::new(model);
    mmu.write_byte(0xFF0F, 0x00);
    mmu
}

/// Writes an 8x8 tile whose every row uses the same two bit planes.
fn solid_tile(mmu: &mut Mmu, tile: u16, lo: u8, hi: u8) {
    let base = 0x8000 + tile * 16;
    for row in 0..8 {
        mmu.write_byte(base + row * 2, lo);
        mmu.write_byte(base + row * 2 + 1, hi);
    }
}

fn sprite(mmu: &mut Mmu, index: u16, y: u8, x: u8, tile: u8, flags: u8) {
    let base = 0xFE00 + index * 4;
    mmu.write_byte(base, y);
    mmu.write_byte(base + 1, x);
    mmu.write_byte(base + 2, tile);
    mmu.write_byte(base + 3, flags);
}

/// Runs until line 0 has been drawn.
fn draw_first_line(mmu: &mut Mmu) {
    mmu.tick(252);
}

#[test]
fn modes_follow_line_timing() {
    let mut mmu = fresh(Model::Dmg);
    assert_eq!(mmu.ppu.mode(), Mode::OamSearch);

    mmu.tick(80);
    assert_eq!(mmu.ppu.mode(), Mode::Drawing);
    assert_eq!(mmu.read_byte(0xFF41) & 0x03, 3);

    mmu.tick(172);
    assert_eq!(mmu.ppu.mode(), Mode::HBlank);
    assert_eq!(mmu.read_byte(0xFF41) & 0x03, 0);

    mmu.tick(204);
    assert_eq!(mmu.ppu.mode(), Mode::OamSearch);
    assert_eq!(mmu.read_byte(0xFF44), 1);
}

#[test]
fn frame_takes_70224_cycles() {
    let mut mmu = fresh(Model::Dmg);
    let steps = FRAME_CYCLES / 4;
    let mut completions = 0;
    for i in 0..steps {
        let events = mmu.tick(4);
        if events.frame_complete {
            completions += 1;
            assert_eq!(i, steps - 1);
        }
        if i == 144 * LINE_CYCLES / 4 - 1 {
            assert_eq!(mmu.ppu.mode(), Mode::VBlank);
            assert_eq!(mmu.ppu.ly(), 144);
            assert!(mmu.interrupts.is_raised(Interrupt::VBlank));
        }
    }
    assert_eq!(completions, 1);
    assert_eq!(mmu.ppu.frames(), 1);
    assert!(mmu.ppu.take_frame_ready());
    assert!(!mmu.ppu.frame_ready());
    assert_eq!(mmu.ppu.ly(), 0);
    assert_eq!(mmu.ppu.mode(), Mode::OamSearch);
}

#[test]
fn lyc_interrupt_fires_once_per_match() {
    let mut mmu = fresh(Model::Dmg);
    mmu.write_byte(0xFF45, 2);
    mmu.write_byte(0xFF41, 0x40);
    assert_eq!(mmu.read_byte(0xFF41) & 0x04, 0);

    mmu.tick(2 * LINE_CYCLES);
    assert_eq!(mmu.read_byte(0xFF44), 2);
    assert!(mmu.interrupts.is_raised(Interrupt::Stat));
    assert_eq!(mmu.read_byte(0xFF41) & 0x04, 0x04);

    mmu.interrupts.clear(Interrupt::Stat);
    mmu.tick(100);
    mmu.write_byte(0xFF45, 2);
    assert!(!mmu.interrupts.is_raised(Interrupt::Stat));

    mmu.write_byte(0xFF45, 3);
    assert_eq!(mmu.read_byte(0xFF41) & 0x04, 0);
    mmu.tick(LINE_CYCLES);
    assert!(mmu.interrupts.is_raised(Interrupt::Stat));
}

#[test]
fn lyc_write_matching_current_line_fires() {
    let mut mmu = fresh(Model::Dmg);
    mmu.write_byte(0xFF41, 0x40);
    mmu.write_byte(0xFF45, 5);
    mmu.tick(LINE_CYCLES);
    assert!(!mmu.interrupts.is_raised(Interrupt::Stat));

    mmu.write_byte(0xFF45, 1);
    assert!(mmu.interrupts.is_raised(Interrupt::Stat));
}

#[test]
fn stat_mode_sources_raise_when_enabled() {
    let mut mmu = fresh(Model::Dmg);
    mmu.write_byte(0xFF41, 0x08);
    mmu.tick(80);
    assert!(!mmu.interrupts.is_raised(Interrupt::Stat));
    mmu.tick(172);
    assert!(mmu.interrupts.is_raised(Interrupt::Stat));

    mmu.interrupts.clear(Interrupt::Stat);
    mmu.write_byte(0xFF41, 0x20);
    mmu.tick(204);
    assert!(mmu.interrupts.is_raised(Interrupt::Stat));
}

#[test]
fn lcd_off_parks_ppu() {
    let mut mmu = fresh(Model::Dmg);
    mmu.tick(3 * LINE_CYCLES + 100);
    assert_eq!(mmu.read_byte(0xFF44), 3);

    mmu.write_byte(0xFF40, 0x11);
    assert_eq!(mmu.read_byte(0xFF44), 0);
    assert_eq!(mmu.read_byte(0xFF41) & 0x03, 0);

    let events = mmu.tick(FRAME_CYCLES);
    assert_eq!(events.hblank_entries, 0);
    assert!(!events.frame_complete);
    assert_eq!(mmu.read_byte(0xFF44), 0);
    assert_eq!(mmu.ppu.frames(), 0);

    mmu.write_byte(0xFF40, 0x91);
    assert_eq!(mmu.ppu.mode(), Mode::OamSearch);
    assert_eq!(mmu.read_byte(0xFF41) & 0x03, 2);
    mmu.tick(80);
    assert_eq!(mmu.ppu.mode(), Mode::Drawing);
}

#[test]
fn ly_is_read_only() {
    let mut mmu = fresh(Model::Dmg);
    mmu.tick(LINE_CYCLES);
    mmu.write_byte(0xFF44, 0x40);
    assert_eq!(mmu.read_byte(0xFF44), 1);
}

#[test]
fn dmg_background_uses_bgp() {
    let mut mmu = fresh(Model::Dmg);
    solid_tile(&mut mmu, 1, 0xFF, 0xFF);
    solid_tile(&mut mmu, 2, 0x00, 0xFF);
    mmu.write_byte(0x9800, 1);
    mmu.write_byte(0x9801, 2);
    mmu.write_byte(0xFF47, 0xE4);
    draw_first_line(&mut mmu);

    let fb = mmu.ppu.framebuffer();
    assert_eq!(fb[0], BLACK);
    assert_eq!(fb[7], BLACK);
    assert_eq!(fb[8], DARK);
    assert_eq!(fb[16], WHITE);
}

#[test]
fn scroll_and_signed_tile_addressing() {
    let mut mmu = fresh(Model::Dmg);
    // Tile -1 in the 0x8800 block lives at 0x8FF0.
    for row in 0..8 {
        mmu.write_byte(0x8FF0 + row * 2, 0xFF);
    }
    mmu.write_byte(0x9801, 0xFF);
    mmu.write_byte(0xFF47, 0xE4);
    mmu.write_byte(0xFF40, 0x81);
    mmu.write_byte(0xFF43, 4);
    draw_first_line(&mut mmu);

    let fb = mmu.ppu.framebuffer();
    assert_eq!(fb[3], WHITE);
    assert_eq!(fb[4], LIGHT);
    assert_eq!(fb[11], LIGHT);
    assert_eq!(fb[12], WHITE);
}

#[test]
fn dmg_bg_disable_blanks_background_and_window() {
    let mut mmu = fresh(Model::Dmg);
    solid_tile(&mut mmu, 1, 0xFF, 0xFF);
    mmu.write_byte(0x9800, 1);
    mmu.write_byte(0x9C00, 1);
    mmu.write_byte(0xFF47, 0xE4);
    mmu.write_byte(0xFF4B, 7);
    mmu.write_byte(0xFF40, 0xF0);
    draw_first_line(&mut mmu);
    assert!(
        mmu.ppu.framebuffer()[..SCREEN_WIDTH]
            .iter()
            .all(|&c| c == WHITE)
    );
}

#[test]
fn window_uses_its_own_map_and_line_counter() {
    let mut mmu = fresh(Model::Dmg);
    solid_tile(&mut mmu, 1, 0xFF, 0x00);
    mmu.write_byte(0x9C00, 1);
    mmu.write_byte(0xFF47, 0xE4);
    mmu.write_byte(0xFF4A, 0);
    mmu.write_byte(0xFF4B, 7 + 80);
    mmu.write_byte(0xFF40, 0xF1);
    draw_first_line(&mut mmu);

    let fb = mmu.ppu.framebuffer();
    assert_eq!(fb[79], WHITE);
    assert_eq!(fb[80], LIGHT);
    assert_eq!(fb[88], WHITE);
    assert_eq!(mmu.ppu.window_line_counter(), 1);

    // Off-screen window does not advance the counter.
    mmu.write_byte(0xFF4B, 167);
    mmu.tick(LINE_CYCLES);
    assert_eq!(mmu.ppu.window_line_counter(), 1);
}

#[test]
fn sprites_draw_over_background_unless_behind() {
    let mut mmu = fresh(Model::Dmg);
    solid_tile(&mut mmu, 1, 0xFF, 0xFF);
    solid_tile(&mut mmu, 2, 0xFF, 0x00);
    mmu.write_byte(0x9801, 1);
    mmu.write_byte(0xFF47, 0xE4);
    mmu.write_byte(0xFF48, 0xE4);
    mmu.write_byte(0xFF40, 0x93);
    sprite(&mut mmu, 0, 16, 8, 2, 0x00);
    sprite(&mut mmu, 1, 16, 16, 2, 0x80);
    draw_first_line(&mut mmu);

    let fb = mmu.ppu.framebuffer();
    // Over color 0.
    assert_eq!(fb[0], LIGHT);
    // Behind a non-zero background pixel.
    assert_eq!(fb[8], BLACK);
}

#[test]
fn sprite_color_zero_is_transparent() {
    let mut mmu = fresh(Model::Dmg);
    solid_tile(&mut mmu, 1, 0xFF, 0xFF);
    solid_tile(&mut mmu, 2, 0x0F, 0x00);
    mmu.write_byte(0x9800, 1);
    mmu.write_byte(0xFF47, 0xE4);
    mmu.write_byte(0xFF48, 0xE4);
    mmu.write_byte(0xFF40, 0x93);
    sprite(&mut mmu, 0, 16, 8, 2, 0x00);
    draw_first_line(&mut mmu);

    let fb = mmu.ppu.framebuffer();
    assert_eq!(fb[0], BLACK);
    assert_eq!(fb[4], LIGHT);
}

#[test]
fn only_ten_sprites_per_line() {
    let mut mmu = fresh(Model::Dmg);
    solid_tile(&mut mmu, 2, 0xFF, 0x00);
    mmu.write_byte(0xFF48, 0xE4);
    mmu.write_byte(0xFF40, 0x93);
    for i in 0..11u16 {
        sprite(&mut mmu, i, 16, 8 + i as u8 * 8, 2, 0x00);
    }
    draw_first_line(&mut mmu);

    let fb = mmu.ppu.framebuffer();
    assert_eq!(fb[72], LIGHT);
    assert_eq!(fb[80], WHITE);
}

#[test]
fn dmg_overlap_prefers_lower_x() {
    let mut mmu = fresh(Model::Dmg);
    solid_tile(&mut mmu, 2, 0xFF, 0x00);
    mmu.write_byte(0xFF48, 0xE4);
    mmu.write_byte(0xFF49, 0x0C);
    mmu.write_byte(0xFF40, 0x93);
    // Index 0 sits further right than index 1.
    sprite(&mut mmu, 0, 16, 12, 2, 0x00);
    sprite(&mut mmu, 1, 16, 8, 2, 0x10);
    draw_first_line(&mut mmu);

    let fb = mmu.ppu.framebuffer();
    assert_eq!(fb[4], BLACK);
    assert_eq!(fb[8], LIGHT);
}

#[test]
fn sprite_size_change_during_drawing_uses_short_rows() {
    let mut mmu = fresh(Model::Dmg);
    solid_tile(&mut mmu, 2, 0xFF, 0x00);
    mmu.write_byte(0xFF48, 0xE4);
    mmu.write_byte(0xFF40, 0x97);
    // Y-flipped 8x16 sprite whose last row sits on line 0.
    sprite(&mut mmu, 0, 1, 8, 2, 0x40);

    mmu.tick(80);
    assert_eq!(mmu.ppu.mode(), Mode::Drawing);
    mmu.write_byte(0xFF40, 0x93);
    mmu.tick(172);

    assert_eq!(mmu.ppu.mode(), Mode::HBlank);
    assert_eq!(mmu.ppu.framebuffer()[0], LIGHT);
}

#[test]
fn tall_sprites_ignore_low_tile_bit() {
    let mut mmu = fresh(Model::Dmg);
    solid_tile(&mut mmu, 2, 0xFF, 0x00);
    solid_tile(&mut mmu, 3, 0x00, 0xFF);
    mmu.write_byte(0xFF48, 0xE4);
    mmu.write_byte(0xFF40, 0x97);
    // Top row of the sprite is on line 0; its bottom half starts on line 8.
    sprite(&mut mmu, 0, 16, 8, 3, 0x00);
    draw_first_line(&mut mmu);
    assert_eq!(mmu.ppu.framebuffer()[0], LIGHT);

    mmu.tick(8 * LINE_CYCLES);
    assert_eq!(mmu.ppu.framebuffer()[8 * SCREEN_WIDTH], DARK);
}

fn write_color(mmu: &mut Mmu, index_port: u16, palette: u8, color: u8, rgb555: u16) {
    mmu.write_byte(index_port, 0x80 | (palette * 8 + color * 2));
    mmu.write_byte(index_port + 1, rgb555 as u8);
    mmu.write_byte(index_port + 1, (rgb555 >> 8) as u8);
}

#[test]
fn cgb_background_uses_attribute_palette_and_bank() {
    let mut mmu = fresh(Model::Cgb);
    solid_tile(&mut mmu, 1, 0xFF, 0x00);
    write_color(&mut mmu, 0xFF68, 0, 1, 0x001F);
    write_color(&mut mmu, 0xFF68, 2, 1, 0x03E0);
    mmu.write_byte(0x9800, 1);
    mmu.write_byte(0x9801, 1);

    // Second tile uses palette 2 and data from VRAM bank 1.
    mmu.write_byte(0xFF4F, 1);
    solid_tile(&mut mmu, 1, 0xFF, 0x00);
    mmu.write_byte(0x9801, 0x0A);
    mmu.write_byte(0xFF4F, 0);
    draw_first_line(&mut mmu);

    let fb = mmu.ppu.framebuffer();
    assert_eq!(fb[0], 0x00FF0000);
    assert_eq!(fb[8], 0x0000FF00);
}

#[test]
fn cgb_palette_ports_round_trip() {
    let mut mmu = fresh(Model::Cgb);
    write_color(&mut mmu, 0xFF6A, 7, 3, 0x7C00);
    assert_eq!(mmu.ppu.obj_palette_color(7, 3), 0x000000FF);

    mmu.write_byte(0xFF6A, 0x3E);
    assert_eq!(mmu.read_byte(0xFF6A), 0x7E);
    assert_eq!(mmu.read_byte(0xFF6B), 0x00);
    mmu.write_byte(0xFF6A, 0x3F);
    assert_eq!(mmu.read_byte(0xFF6B), 0x7C);

    mmu.write_byte(0xFF6C, 0x01);
    assert_eq!(mmu.read_byte(0xFF6C), 0xFF);
}

#[test]
fn cgb_sprites_win_when_master_priority_off() {
    let mut mmu = fresh(Model::Cgb);
    solid_tile(&mut mmu, 1, 0xFF, 0x00);
    write_color(&mut mmu, 0xFF68, 0, 1, 0x001F);
    write_color(&mut mmu, 0xFF6A, 0, 1, 0x7C00);
    mmu.write_byte(0x9800, 1);
    sprite(&mut mmu, 0, 16, 8, 1, 0x80);

    mmu.write_byte(0xFF40, 0x93);
    draw_first_line(&mut mmu);
    assert_eq!(mmu.ppu.framebuffer()[0], 0x00FF0000);

    mmu.tick(LINE_CYCLES * 154 - 252);
    mmu.write_byte(0xFF40, 0x92);
    draw_first_line(&mut mmu);
    assert_eq!(mmu.ppu.framebuffer()[0], 0x000000FF);
}

#[test]
fn cgb_sprite_order_follows_oam_index_unless_opri_set() {
    let mut mmu = fresh(Model::Cgb);
    solid_tile(&mut mmu, 2, 0xFF, 0x00);
    write_color(&mut mmu, 0xFF6A, 0, 1, 0x001F);
    write_color(&mut mmu, 0xFF6A, 1, 1, 0x7C00);
    // Index 0 sits further right than index 1 and overlaps it.
    sprite(&mut mmu, 0, 16, 12, 2, 0x00);
    sprite(&mut mmu, 1, 16, 8, 2, 0x01);
    mmu.write_byte(0xFF40, 0x93);
    draw_first_line(&mut mmu);

    let fb = mmu.ppu.framebuffer();
    assert_eq!(fb[0], 0x000000FF);
    assert_eq!(fb[4], 0x00FF0000);
    assert_eq!(fb[11], 0x00FF0000);

    // X ordering: the leftmost sprite wins the overlap.
    mmu.tick(LINE_CYCLES * 154 - 252);
    mmu.write_byte(0xFF6C, 0x01);
    draw_first_line(&mut mmu);

    let fb = mmu.ppu.framebuffer();
    assert_eq!(fb[4], 0x000000FF);
    assert_eq!(fb[11], 0x00FF0000);
}

#[test]
fn cgb_master_priority_combines_bg_and_sprite_flags() {
    let mut mmu = fresh(Model::Cgb);
    solid_tile(&mut mmu, 1, 0xFF, 0x00);
    write_color(&mut mmu, 0xFF68, 0, 0, 0x0000);
    write_color(&mut mmu, 0xFF68, 0, 1, 0x001F);
    write_color(&mut mmu, 0xFF6A, 0, 1, 0x7C00);

    mmu.write_byte(0x9800, 1);
    mmu.write_byte(0x9801, 1);
    mmu.write_byte(0x9802, 0);
    mmu.write_byte(0x9803, 1);
    mmu.write_byte(0xFF4F, 1);
    mmu.write_byte(0x9801, 0x80);
    mmu.write_byte(0x9802, 0x80);
    mmu.write_byte(0xFF4F, 0);

    sprite(&mut mmu, 0, 16, 8, 1, 0x00);
    sprite(&mut mmu, 1, 16, 16, 1, 0x00);
    sprite(&mut mmu, 2, 16, 24, 1, 0x00);
    sprite(&mut mmu, 3, 16, 32, 1, 0x80);
    mmu.write_byte(0xFF40, 0x93);
    draw_first_line(&mut mmu);

    let fb = mmu.ppu.framebuffer();
    // No priority bits: sprite over a non-zero background.
    assert_eq!(fb[0], 0x000000FF);
    // BG attribute priority keeps a non-zero background on top.
    assert_eq!(fb[8], 0x00FF0000);
    // Background color 0 never hides a sprite.
    assert_eq!(fb[16], 0x000000FF);
    // Sprite behind-background flag yields to a non-zero background.
    assert_eq!(fb[24], 0x00FF0000);
}

#[test]
fn cgb_bg_attributes_flip_tiles() {
    let mut mmu = fresh(Model::Cgb);
    // Row 0: leftmost pixel color 1. Row 7: rightmost pixel color 3.
    mmu.write_byte(0x8010, 0x80);
    mmu.write_byte(0x801E, 0x01);
    mmu.write_byte(0x801F, 0x01);
    write_color(&mut mmu, 0xFF68, 0, 0, 0x0000);
    write_color(&mut mmu, 0xFF68, 0, 1, 0x001F);
    write_color(&mut mmu, 0xFF68, 0, 3, 0x03E0);

    for addr in 0x9800..0x9803 {
        mmu.write_byte(addr, 1);
    }
    mmu.write_byte(0xFF4F, 1);
    mmu.write_byte(0x9801, 0x20);
    mmu.write_byte(0x9802, 0x40);
    mmu.write_byte(0xFF4F, 0);
    draw_first_line(&mut mmu);

    let fb = mmu.ppu.framebuffer();
    assert_eq!(fb[0], 0x00FF0000);
    assert_eq!(fb[7], 0x00000000);
    // X flip mirrors the row.
    assert_eq!(fb[8], 0x00000000);
    assert_eq!(fb[15], 0x00FF0000);
    // Y flip reads row 7 on line 0.
    assert_eq!(fb[16], 0x00000000);
    assert_eq!(fb[23], 0x0000FF00);
}
