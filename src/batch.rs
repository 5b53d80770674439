use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::audio::{analysis, decode};
use crate::config::Config;
use crate::render::{layout, svg};

/// Outcome of a folder run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    /// (file name, error message)
    pub failed: Vec<(String, String)>,
}

/// Run the whole chain for one file. Nothing is written unless every stage succeeds.
pub fn process_file(input: &Path, output: &Path, config: &Config) -> Result<()> {
    process_file_with_progress(input, output, config, &ProgressBar::hidden())
}

/// Same as [`process_file`]; `progress` tracks analyzed bars and shows the current stage.
pub fn process_file_with_progress(
    input: &Path,
    output: &Path,
    config: &Config,
    progress: &ProgressBar,
) -> Result<()> {
    progress.set_message("decoding");
    let waveform = decode::decode_audio(input)
        .with_context(|| format!("Failed to decode {}", input.display()))?;

    progress.set_message("analyzing");
    let energies = analysis::analyze_with_progress(&waveform, &config.spectrum_config(), progress)
        .with_context(|| format!("Failed to analyze {}", input.display()))?;

    progress.set_message("rendering");
    let render_config = config.render_config();
    let bar_layout = layout::map_to_geometry(&energies, &render_config)?;
    let markup = svg::render(&bar_layout.bars, bar_layout.canvas_width, &render_config);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    std::fs::write(output, markup)
        .with_context(|| format!("Failed to write SVG: {}", output.display()))?;
    progress.set_message("done");

    log::info!(
        "Wrote {} ({} bars, {}x{})",
        output.display(),
        bar_layout.bars.len(),
        bar_layout.canvas_width,
        bar_layout.canvas_height
    );
    Ok(())
}

/// Output path used when only the audio file is known: `<stem>.svg` in `dir`.
pub fn svg_name_for(input: &Path, dir: &Path) -> PathBuf {
    let mut name = input
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "spectrum".into());
    name.push(".svg");
    dir.join(name)
}

/// Supported audio files directly inside `dir`, sorted by path.
pub fn collect_audio_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read folder: {}", dir.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_file() && decode::is_supported(&entry.path()) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Process every supported file in `input_dir` in parallel. Per-file failures
/// are collected in the summary rather than aborting the run.
pub fn process_batch(input_dir: &Path, output_dir: Option<&Path>, config: &Config) -> Result<BatchSummary> {
    if !input_dir.is_dir() {
        anyhow::bail!("Input folder not found: {}", input_dir.display());
    }
    let output_dir = output_dir.unwrap_or(input_dir);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output folder: {}", output_dir.display()))?;

    let files = collect_audio_files(input_dir)?;
    if files.is_empty() {
        log::warn!("No supported audio files found in {}", input_dir.display());
        return Ok(BatchSummary::default());
    }

    log::info!("Found {} audio files", files.len());
    log::info!("Input folder: {}", input_dir.display());
    log::info!("Output folder: {}", output_dir.display());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files ({eta} remaining)")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let results: Vec<(String, Result<()>)> = files
        .par_iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let output = svg_name_for(path, output_dir);
            let result = process_file(path, &output, config);
            pb.inc(1);
            (name, result)
        })
        .collect();

    pb.finish_and_clear();

    let mut summary = BatchSummary {
        total: results.len(),
        ..BatchSummary::default()
    };
    for (name, result) in results {
        match result {
            Ok(()) => summary.succeeded += 1,
            Err(err) => {
                log::warn!("Failed to process {}: {:#}", name, err);
                summary.failed.push((name, format!("{:#}", err)));
            }
        }
    }

    log::info!("Batch complete: {}/{} succeeded", summary.succeeded, summary.total);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpectrumError;

    fn write_tone(path: &Path, seconds: f32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let len = (8000.0 * seconds) as usize;
        for i in 0..len {
            let t = i as f32 / 8000.0;
            let s = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5;
            writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn svg_name_uses_stem() {
        assert_eq!(
            svg_name_for(Path::new("/music/take.one.flac"), Path::new("out")),
            PathBuf::from("out/take.one.svg")
        );
    }

    #[test]
    fn processes_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tone.wav");
        write_tone(&input, 1.0);
        let output = dir.path().join("nested").join("tone.svg");

        process_file(&input, &output, &Config::default()).unwrap();

        let svg = std::fs::read_to_string(&output).unwrap();
        // 1 s at 10 bars/s → 10 bars → 10*6 + 9*7 = 123 wide
        assert!(svg.contains(r#"width="123" height="150""#));
        assert_eq!(svg.matches("<rect id=\"bar_").count(), 10);
    }

    #[test]
    fn failed_decode_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.wav");
        std::fs::write(&input, b"RIFF nonsense").unwrap();
        let output = dir.path().join("broken.svg");

        assert!(process_file(&input, &output, &Config::default()).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn empty_audio_is_rejected_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.wav");
        write_tone(&input, 0.0);
        let output = dir.path().join("empty.svg");

        let err = process_file(&input, &output, &Config::default()).unwrap_err();
        let empty_input = err.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<SpectrumError>(),
                Some(SpectrumError::EmptyInput(_))
            )
        });
        assert!(empty_input, "{:#}", err);
        assert!(!output.exists());
    }

    #[test]
    fn progress_covers_every_bar() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tone.wav");
        write_tone(&input, 2.0);
        let output = dir.path().join("tone.svg");

        let pb = ProgressBar::hidden();
        process_file_with_progress(&input, &output, &Config::default(), &pb).unwrap();
        assert_eq!(pb.length(), Some(20));
        assert_eq!(pb.position(), 20);
        assert!(output.exists());
    }

    #[test]
    fn collects_only_supported_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.WAV", "a.mp3", "notes.txt", "c.flac"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.wav")).unwrap();

        let files = collect_audio_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.mp3", "b.WAV", "c.flac"]);
    }

    #[test]
    fn batch_reports_successes_and_failures() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        write_tone(&input_dir.path().join("one.wav"), 0.5);
        write_tone(&input_dir.path().join("two.wav"), 1.5);
        std::fs::write(input_dir.path().join("bad.wav"), b"not a wav").unwrap();

        let summary = process_batch(input_dir.path(), Some(output_dir.path()), &Config::default()).unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, "bad.wav");

        assert!(output_dir.path().join("one.svg").exists());
        assert!(output_dir.path().join("two.svg").exists());
        assert!(!output_dir.path().join("bad.svg").exists());
    }

    #[test]
    fn batch_defaults_output_to_input_folder() {
        let dir = tempfile::tempdir().unwrap();
        write_tone(&dir.path().join("clip.wav"), 0.3);
        let summary = process_batch(dir.path(), None, &Config::default()).unwrap();
        assert_eq!(summary.succeeded, 1);
        assert!(dir.path().join("clip.svg").exists());
    }

    #[test]
    fn missing_batch_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(process_batch(&dir.path().join("nope"), None, &Config::default()).is_err());
    }
}
