use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use waveform::{Palette, Rgba};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Root of the appliance's HTTP API.
    pub server_url: String,
    pub request_timeout_secs: u64,
    /// Appended to every seconds value shown to the user.
    pub unit_suffix: String,
    pub waveform: WaveformConfig,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000/".to_owned(),
            request_timeout_secs: 10,
            unit_suffix: "seconds".to_owned(),
            waveform: WaveformConfig::default(),
        }
    }
}

impl PanelConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Size and colors of the rendered waveform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveformConfig {
    pub width: u32,
    pub height: u32,
    pub bar_color: String,
    pub start_color: String,
    pub end_color: String,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        let palette = Palette::default();
        Self {
            width: 800,
            height: 150,
            bar_color: palette.bars.to_string(),
            start_color: palette.start_marker.to_string(),
            end_color: palette.end_marker.to_string(),
        }
    }
}

impl WaveformConfig {
    /// Unparsable colors fall back to the default for that slot.
    pub fn palette(&self) -> Palette {
        let defaults = Palette::default();
        Palette {
            bars: color_or(&self.bar_color, defaults.bars, "bar_color"),
            start_marker: color_or(&self.start_color, defaults.start_marker, "start_color"),
            end_marker: color_or(&self.end_color, defaults.end_marker, "end_color"),
        }
    }
}

fn color_or(raw: &str, fallback: Rgba, field: &str) -> Rgba {
    raw.parse().unwrap_or_else(|e| {
        log::warn!("waveform.{field}: {e}, using {fallback}");
        fallback
    })
}

/// `~/.config/bellpanel/config.yaml` or the platform equivalent.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("bellpanel")
        .join("config.yaml")
}

/// Loads the configuration.
///
/// A missing file gives the defaults. So does an unreadable or invalid one,
/// after a warning.
pub fn load_config(path: &Path) -> PanelConfig {
    log::debug!("load_config: loading from {}", path.display());

    if !path.exists() {
        log::debug!("load_config: no config file, using defaults");
        return PanelConfig::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<PanelConfig>(&contents) {
            Ok(config) => {
                log::debug!(
                    "load_config: server {}, timeout {}s",
                    config.server_url,
                    config.request_timeout_secs
                );
                config
            }
            Err(e) => {
                log::warn!("load_config: failed to parse config: {e}, using defaults");
                PanelConfig::default()
            }
        },
        Err(e) => {
            log::warn!("load_config: failed to read config file: {e}, using defaults");
            PanelConfig::default()
        }
    }
}

pub fn save_config(config: &PanelConfig, path: &Path) -> Result<()> {
    log::info!("save_config: saving to {}", path.display());

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }

    let yaml = serde_yaml::to_string(config).context("failed to serialize config to YAML")?;
    std::fs::write(path, yaml)
        .with_context(|| format!("failed to write config file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PanelConfig::default();
        assert_eq!(config.server_url, "http://127.0.0.1:8000/");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.unit_suffix, "seconds");
        assert_eq!((config.waveform.width, config.waveform.height), (800, 150));
        assert_eq!(config.waveform.palette(), Palette::default());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.yaml"));
        assert_eq!(config, PanelConfig::default());
    }

    #[test]
    fn invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "server_url: [unterminated").unwrap();
        assert_eq!(load_config(&path), PanelConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "server_url: http://bell.local:8000/\nwaveform:\n  width: 400\n",
        )
        .unwrap();
        let config = load_config(&path);
        assert_eq!(config.server_url, "http://bell.local:8000/");
        assert_eq!(config.waveform.width, 400);
        assert_eq!(config.waveform.height, 150);
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let mut config = PanelConfig::default();
        config.unit_suffix = "שניות".to_owned();
        config.waveform.bar_color = "#000000".to_owned();
        save_config(&config, &path).unwrap();
        assert_eq!(load_config(&path), config);
    }

    #[test]
    fn bad_color_falls_back() {
        let waveform = WaveformConfig {
            start_color: "crimson".to_owned(),
            end_color: "#0000ff".to_owned(),
            ..WaveformConfig::default()
        };
        let palette = waveform.palette();
        assert_eq!(palette.start_marker, Palette::default().start_marker);
        assert_eq!(palette.end_marker, Rgba::rgb(0, 0, 0xff));
    }
}
