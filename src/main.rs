mod audio;
mod batch;
mod cli;
mod config;
mod error;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use cli::Cli;
use config::Config;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect spectrum-svg.toml / global config
    let config_path = cli.config.clone().or_else(config::discover_config);
    let mut cfg = match config_path {
        Some(ref path) => {
            let cfg = config::load_config(path)?;
            log::info!("Loaded config from {}", path.display());
            cfg
        }
        None => {
            log::info!("No config file found, using defaults");
            Config::default()
        }
    };
    cli.apply_overrides(&mut cfg);

    // Batch mode: --batch, or a configured input folder when no input file is given
    let batch_dir = cli.batch.clone().or_else(|| {
        if cli.input.is_none() && !cfg.audio.input_folder.is_empty() {
            Some(PathBuf::from(&cfg.audio.input_folder))
        } else {
            None
        }
    });
    if let Some(dir) = batch_dir {
        let output_dir = cli.output_folder.clone().or_else(|| {
            (!cfg.audio.output_folder.is_empty()).then(|| PathBuf::from(&cfg.audio.output_folder))
        });
        let summary = batch::process_batch(&dir, output_dir.as_deref(), &cfg)?;
        if !summary.failed.is_empty() {
            for (name, err) in &summary.failed {
                log::error!("  - {}: {}", name, err);
            }
            anyhow::bail!(
                "{} of {} files failed",
                summary.failed.len(),
                summary.total
            );
        }
        return Ok(());
    }

    let input = match cli.input {
        Some(ref path) => path.clone(),
        None if !cfg.audio.input_file.is_empty() => PathBuf::from(&cfg.audio.input_file),
        None => anyhow::bail!("Input audio file is required (argument or [audio].input_file)"),
    };
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let output = resolve_output(cli.output.as_deref(), &input, &cfg);

    log::info!("Input: {}", input.display());
    log::info!("Output: {}", output.display());

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} bars {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let result = batch::process_file_with_progress(&input, &output, &cfg, &pb);
    if result.is_ok() {
        pb.finish_with_message("complete");
    } else {
        pb.abandon();
    }
    result.with_context(|| format!("Failed to render {}", input.display()))?;

    log::info!("Done! Output: {}", output.display());
    Ok(())
}

/// `--output`, else `<stem>.svg` when `use_audio_name` is set, else `[audio].output_file`.
fn resolve_output(cli_output: Option<&Path>, input: &Path, cfg: &Config) -> PathBuf {
    if let Some(path) = cli_output {
        return path.to_path_buf();
    }
    if cfg.audio.use_audio_name {
        return batch::svg_name_for(input, Path::new(""));
    }
    PathBuf::from(&cfg.audio.output_file)
}
