use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audio::analysis::{BarCount, SpectrumConfig};
use crate::render::{CanvasWidth, RenderConfig, VerticalAlign};

pub const CONFIG_FILE_NAME: &str = "spectrum-svg.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub audio: AudioSection,
    #[serde(default)]
    pub spectrum: SpectrumSection,
    #[serde(default)]
    pub svg: SvgSection,
    #[serde(default)]
    pub alignment: AlignmentSection,
}

#[derive(Debug, Deserialize)]
pub struct AudioSection {
    #[serde(default)]
    pub input_file: String,
    #[serde(default = "default_output_file")]
    pub output_file: String,
    #[serde(default)]
    pub use_audio_name: bool,
    #[serde(default)]
    pub input_folder: String,
    #[serde(default)]
    pub output_folder: String,
}

#[derive(Debug, Deserialize)]
pub struct SpectrumSection {
    #[serde(default = "default_time_window")]
    pub time_window: f64,
    #[serde(default = "default_freq_min")]
    pub freq_min: f64,
    #[serde(default = "default_freq_max")]
    pub freq_max: f64,
    #[serde(default)]
    pub num_bars: usize,
    #[serde(default = "default_bars_per_second")]
    pub bars_per_second: f64,
    #[serde(default)]
    pub log_scale: bool,
}

#[derive(Debug, Deserialize)]
pub struct SvgSection {
    #[serde(default)]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default = "default_bar_width")]
    pub bar_width: f64,
    #[serde(default = "default_bar_spacing")]
    pub bar_spacing: f64,
    #[serde(default = "default_bar_color")]
    pub bar_color: String,
    #[serde(default = "default_border_radius")]
    pub border_radius: f64,
    #[serde(default = "default_min_bar_height")]
    pub min_bar_height: f64,
    #[serde(default = "default_max_bar_height_percent")]
    pub max_bar_height_percent: f64,
    #[serde(default)]
    pub background_color: String,
}

#[derive(Debug, Deserialize)]
pub struct AlignmentSection {
    #[serde(default = "default_vertical_align")]
    pub vertical_align: String,
}

impl Default for AudioSection {
    fn default() -> Self {
        Self {
            input_file: String::new(),
            output_file: default_output_file(),
            use_audio_name: false,
            input_folder: String::new(),
            output_folder: String::new(),
        }
    }
}

impl Default for SpectrumSection {
    fn default() -> Self {
        Self {
            time_window: default_time_window(),
            freq_min: default_freq_min(),
            freq_max: default_freq_max(),
            num_bars: 0,
            bars_per_second: default_bars_per_second(),
            log_scale: false,
        }
    }
}

impl Default for SvgSection {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: default_height(),
            bar_width: default_bar_width(),
            bar_spacing: default_bar_spacing(),
            bar_color: default_bar_color(),
            border_radius: default_border_radius(),
            min_bar_height: default_min_bar_height(),
            max_bar_height_percent: default_max_bar_height_percent(),
            background_color: String::new(),
        }
    }
}

impl Default for AlignmentSection {
    fn default() -> Self {
        Self {
            vertical_align: default_vertical_align(),
        }
    }
}

fn default_output_file() -> String { "spectrum.svg".into() }
fn default_time_window() -> f64 { 0.05 }
fn default_freq_min() -> f64 { 20.0 }
fn default_freq_max() -> f64 { 20000.0 }
fn default_bars_per_second() -> f64 { 10.0 }
fn default_height() -> f64 { 150.0 }
fn default_bar_width() -> f64 { 6.0 }
fn default_bar_spacing() -> f64 { 7.0 }
fn default_bar_color() -> String { "#000000".into() }
fn default_border_radius() -> f64 { 2.0 }
fn default_min_bar_height() -> f64 { 15.0 }
fn default_max_bar_height_percent() -> f64 { 95.0 }
fn default_vertical_align() -> String { "center".into() }

impl Config {
    pub fn spectrum_config(&self) -> SpectrumConfig {
        let s = &self.spectrum;
        SpectrumConfig {
            time_window: s.time_window,
            freq_min: s.freq_min,
            freq_max: s.freq_max,
            bar_count: BarCount::from_config(s.num_bars),
            bars_per_second: s.bars_per_second,
            log_scale: s.log_scale,
        }
    }

    pub fn render_config(&self) -> RenderConfig {
        let s = &self.svg;
        let background_color = if s.background_color.trim().is_empty() {
            None
        } else {
            Some(s.background_color.clone())
        };
        RenderConfig {
            width: CanvasWidth::from_config(s.width),
            height: s.height,
            bar_width: s.bar_width,
            bar_spacing: s.bar_spacing,
            bar_color: s.bar_color.clone(),
            border_radius: s.border_radius,
            min_bar_height: s.min_bar_height,
            max_bar_height_percent: s.max_bar_height_percent,
            background_color,
            vertical_align: VerticalAlign::parse_or_center(&self.alignment.vertical_align),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
}

pub fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

/// Auto-detect a config file: working directory first, then the user config dirs.
pub fn discover_config() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("spectrum-svg").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("spectrum-svg").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.audio.output_file, "spectrum.svg");
        assert_eq!(cfg.spectrum.time_window, 0.05);
        assert_eq!(cfg.spectrum.num_bars, 0);
        assert_eq!(cfg.svg.height, 150.0);
        assert_eq!(cfg.svg.bar_color, "#000000");
        assert_eq!(cfg.alignment.vertical_align, "center");

        let spectrum = cfg.spectrum_config();
        assert_eq!(spectrum.bar_count, BarCount::Auto);
        assert_eq!(spectrum.freq_min, 20.0);
        assert_eq!(spectrum.freq_max, 20000.0);
        assert_eq!(spectrum.bars_per_second, 10.0);

        let render = cfg.render_config();
        assert_eq!(render.width, CanvasWidth::Auto);
        assert_eq!(render.bar_width, 6.0);
        assert_eq!(render.bar_spacing, 7.0);
        assert_eq!(render.border_radius, 2.0);
        assert_eq!(render.min_bar_height, 15.0);
        assert_eq!(render.max_bar_height_percent, 95.0);
        assert_eq!(render.background_color, None);
        assert_eq!(render.vertical_align, VerticalAlign::Center);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let cfg = parse_config(
            r##"
            [spectrum]
            num_bars = 64
            freq_max = 8000

            [svg]
            width = 800
            bar_color = "#ff8800"
            background_color = "#101010"

            [alignment]
            vertical_align = "bottom"
            "##,
        )
        .unwrap();

        let spectrum = cfg.spectrum_config();
        assert_eq!(spectrum.bar_count, BarCount::Explicit(64));
        assert_eq!(spectrum.freq_max, 8000.0);
        assert_eq!(spectrum.time_window, 0.05);

        let render = cfg.render_config();
        assert_eq!(render.width, CanvasWidth::Explicit(800.0));
        assert_eq!(render.bar_color, "#ff8800");
        assert_eq!(render.background_color.as_deref(), Some("#101010"));
        assert_eq!(render.vertical_align, VerticalAlign::Bottom);
        assert_eq!(render.height, 150.0);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let cfg = parse_config(
            r#"
            colour_scheme = "dark"

            [svg]
            height = 200
            shadow = true

            [extras]
            anything = 1
            "#,
        )
        .unwrap();
        assert_eq!(cfg.svg.height, 200.0);
    }

    #[test]
    fn unknown_alignment_falls_back_to_center() {
        let cfg = parse_config("[alignment]\nvertical_align = \"diagonal\"\n").unwrap();
        assert_eq!(cfg.render_config().vertical_align, VerticalAlign::Center);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(parse_config("[svg\nheight = ").is_err());
        assert!(parse_config("[svg]\nheight = \"tall\"").is_err());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[audio]\nuse_audio_name = true\n").unwrap();
        let cfg = load_config(&path).unwrap();
        assert!(cfg.audio.use_audio_name);

        assert!(load_config(&dir.path().join("missing.toml")).is_err());
    }
}
