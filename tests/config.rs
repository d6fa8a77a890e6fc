use std::fs;

use prismboy::config::{self, EmulationMode, EmulatorConfig};
use prismboy_core::ModelOverride;
use tempfile::tempdir;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let cfg = config::load_from_file(&dir.path().join("absent.toml"));
    assert_eq!(cfg, EmulatorConfig::default());
    assert!(cfg.frame_pacing);
    assert!(cfg.save_on_exit);
    assert_eq!(cfg.frame_limit, None);
}

#[test]
fn partial_file_keeps_other_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prismboy.toml");
    fs::write(&path, "emulation_mode = \"force-cgb\"\nframe_limit = 600\n").unwrap();

    let cfg = config::load_from_file(&path);
    assert_eq!(cfg.emulation_mode, EmulationMode::ForceCgb);
    assert_eq!(cfg.frame_limit, Some(600));
    assert!(cfg.frame_pacing);
    assert_eq!(ModelOverride::from(cfg.emulation_mode), ModelOverride::ForceCgb);
}

#[test]
fn unparsable_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("prismboy.toml");
    fs::write(&path, "emulation_mode = 12\n").unwrap();
    assert_eq!(config::load_from_file(&path), EmulatorConfig::default());
}

#[test]
fn save_then_load_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("prismboy.toml");
    let cfg = EmulatorConfig {
        emulation_mode: EmulationMode::ForceDmg,
        frame_pacing: false,
        save_on_exit: false,
        frame_limit: Some(10),
    };
    config::save_to_file(&path, &cfg).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("force-dmg"));
    assert_eq!(config::load_from_file(&path), cfg);
}
