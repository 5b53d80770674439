use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "spectrum-svg", about = "Render an audio clip as an SVG bar spectrum")]
pub struct Cli {
    /// Input audio file (WAV, MP3, OGG, FLAC, M4A)
    pub input: Option<PathBuf>,

    /// Output SVG file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// TOML config file (default: spectrum-svg.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Batch mode: process every audio file in this folder
    #[arg(short, long, value_name = "DIR")]
    pub batch: Option<PathBuf>,

    /// Output folder for batch mode (default: the input folder)
    #[arg(long, value_name = "DIR")]
    pub output_folder: Option<PathBuf>,

    /// Fixed number of bars (0 = derive from duration)
    #[arg(long)]
    pub num_bars: Option<usize>,

    /// Bars per second of audio when the bar count is derived
    #[arg(long)]
    pub bars_per_second: Option<f64>,

    /// Bar fill color
    #[arg(long)]
    pub bar_color: Option<String>,

    /// Vertical alignment of bars (center, top, bottom)
    #[arg(long)]
    pub vertical_align: Option<String>,
}

impl Cli {
    /// Command-line values win over the config file.
    pub fn apply_overrides(&self, config: &mut crate::config::Config) {
        if let Some(n) = self.num_bars {
            config.spectrum.num_bars = n;
        }
        if let Some(bps) = self.bars_per_second {
            config.spectrum.bars_per_second = bps;
        }
        if let Some(ref color) = self.bar_color {
            config.svg.bar_color = color.clone();
        }
        if let Some(ref align) = self.vertical_align {
            config.alignment.vertical_align = align.clone();
        }
    }
}
