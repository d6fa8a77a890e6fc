use log::warn;
use prismboy_core::ModelOverride;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EmulationMode {
    #[default]
    Auto,
    ForceDmg,
    ForceCgb,
}

impl From<EmulationMode> for ModelOverride {
    fn from(mode: EmulationMode) -> Self {
        match mode {
            EmulationMode::Auto => ModelOverride::Auto,
            EmulationMode::ForceDmg => ModelOverride::ForceDmg,
            EmulationMode::ForceCgb => ModelOverride::ForceCgb,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    pub emulation_mode: EmulationMode,
    /// Sleep between frames to run at hardware speed.
    pub frame_pacing: bool,
    /// Write battery RAM to the `.sav` file on exit.
    pub save_on_exit: bool,
    pub frame_limit: Option<u64>,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            emulation_mode: EmulationMode::Auto,
            frame_pacing: true,
            save_on_exit: true,
            frame_limit: None,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata)
                .join("prismboy")
                .join("prismboy.toml");
        }
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("prismboy").join("prismboy.toml");
    }

    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("prismboy")
            .join("prismboy.toml");
    }

    PathBuf::from("prismboy.toml")
}

/// Reads the config file. A missing file yields defaults silently; an
/// unparsable one yields defaults with a warning.
pub fn load_from_file(path: &Path) -> EmulatorConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return EmulatorConfig::default(),
    };

    match toml::from_str::<EmulatorConfig>(&text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(
                "Failed to parse config {}: {e}; using defaults",
                path.display()
            );
            EmulatorConfig::default()
        }
    }
}

pub fn save_to_file(path: &Path, cfg: &EmulatorConfig) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let text = toml::to_string_pretty(cfg).map_err(std::io::Error::other)?;
    std::fs::write(path, text)
}
