use indicatif::ProgressBar;
use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};

use super::decode::Waveform;
use crate::error::SpectrumError;

/// How many bars the spectrum is split into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BarCount {
    /// Derived from clip duration and `bars_per_second`.
    Auto,
    Explicit(usize),
}

impl BarCount {
    /// `0` is the config-file spelling of `Auto`.
    pub fn from_config(num_bars: usize) -> Self {
        if num_bars == 0 {
            BarCount::Auto
        } else {
            BarCount::Explicit(num_bars)
        }
    }

    /// Never returns 0.
    pub fn resolve(self, duration: f64, bars_per_second: f64) -> usize {
        match self {
            BarCount::Explicit(n) => n.max(1),
            BarCount::Auto => ((duration * bars_per_second).round() as usize).max(1),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SpectrumConfig {
    /// Length of one FFT frame in seconds
    pub time_window: f64,
    /// Lower band edge (Hz, inclusive)
    pub freq_min: f64,
    /// Upper band edge (Hz, inclusive), clamped to Nyquist
    pub freq_max: f64,
    pub bar_count: BarCount,
    pub bars_per_second: f64,
    /// Compress dynamic range with log1p after peak normalization
    pub log_scale: bool,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            time_window: 0.05,
            freq_min: 20.0,
            freq_max: 20000.0,
            bar_count: BarCount::Auto,
            bars_per_second: 10.0,
            log_scale: false,
        }
    }
}

/// Compute one band-energy scalar per bar, in temporal order.
///
/// Each bar covers an equal share of the clip. Its span is cut into frames of
/// `time_window` seconds; a shorter leftover at the end of the span is
/// transformed at its own length and counts as one more frame. Every frame is
/// windowed and transformed, and the mean magnitude of the bins inside
/// `[freq_min, freq_max]` is averaged over the frames of the bar.
pub fn analyze(waveform: &Waveform, config: &SpectrumConfig) -> Result<Vec<f32>, SpectrumError> {
    analyze_with_progress(waveform, config, &ProgressBar::hidden())
}

/// Same as [`analyze`], advancing `progress` by one per finished bar.
pub fn analyze_with_progress(
    waveform: &Waveform,
    config: &SpectrumConfig,
    progress: &ProgressBar,
) -> Result<Vec<f32>, SpectrumError> {
    let samples = &waveform.samples;
    if samples.is_empty() {
        return Err(SpectrumError::EmptyInput("waveform has no samples"));
    }
    let sr = waveform.sample_rate;
    if sr == 0 {
        return Err(SpectrumError::InvalidConfig("sample rate must be positive".into()));
    }
    if !(config.time_window > 0.0) || !config.time_window.is_finite() {
        return Err(SpectrumError::InvalidConfig(format!(
            "time_window must be positive, got {}",
            config.time_window
        )));
    }
    if !(config.bars_per_second > 0.0) || !config.bars_per_second.is_finite() {
        return Err(SpectrumError::InvalidConfig(format!(
            "bars_per_second must be positive, got {}",
            config.bars_per_second
        )));
    }

    let (freq_min, freq_max) = clamp_band(config.freq_min, config.freq_max, sr)?;

    let duration = waveform.duration();
    let total = samples.len();
    let num_bars = config.bar_count.resolve(duration, config.bars_per_second);
    if num_bars > total {
        return Err(SpectrumError::InvalidConfig(format!(
            "{} bars requested for {} samples (at most one bar per sample)",
            num_bars, total
        )));
    }
    let frame_len = ((config.time_window * sr as f64).round() as usize).max(1);

    log::info!(
        "Analyzing {} bars over {:.2}s (band {:.0}-{:.0} Hz)",
        num_bars,
        duration,
        freq_min,
        freq_max
    );
    log::debug!("Frame length: {} samples", frame_len);

    progress.set_length(num_bars as u64);
    let mut energies: Vec<f32> = (0..num_bars)
        .into_par_iter()
        // Per-thread FFT planner (rayon-safe)
        .map_init(FrameAnalyzer::new, |analyzer, bar| {
            let start = span_bound(bar, total, num_bars);
            let end = span_bound(bar + 1, total, num_bars);
            let energy = analyzer.bar_energy(&samples[start..end], frame_len, sr, freq_min, freq_max);
            progress.inc(1);
            energy
        })
        .collect();

    if config.log_scale {
        compress_dynamic_range(&mut energies);
    }

    Ok(energies)
}

/// Clamp the band to Nyquist and reject degenerate ranges.
pub fn clamp_band(freq_min: f64, freq_max: f64, sample_rate: u32) -> Result<(f64, f64), SpectrumError> {
    if !(freq_min >= 0.0) || !freq_min.is_finite() {
        return Err(SpectrumError::InvalidConfig(format!(
            "freq_min must be a non-negative frequency, got {}",
            freq_min
        )));
    }
    let nyquist = sample_rate as f64 / 2.0;
    let clamped_max = if freq_max > nyquist {
        log::debug!("Clamping freq_max {:.0} Hz to Nyquist {:.0} Hz", freq_max, nyquist);
        nyquist
    } else {
        freq_max
    };
    if !(freq_min < clamped_max) {
        return Err(SpectrumError::InvalidRange {
            min: freq_min,
            max: clamped_max,
        });
    }
    Ok((freq_min, clamped_max))
}

/// Peak-normalize, then `ln(1 + 10x) / ln(11)`. Ordering is preserved.
pub fn compress_dynamic_range(energies: &mut [f32]) {
    let peak = energies.iter().copied().fold(0.0f32, f32::max);
    if peak <= 0.0 {
        return;
    }
    let denom = 11.0f32.ln();
    for e in energies.iter_mut() {
        *e = (*e / peak * 10.0).ln_1p() / denom;
    }
}

fn span_bound(index: usize, total: usize, parts: usize) -> usize {
    (index as u64 * total as u64 / parts as u64) as usize
}

/// Frames shorter than this are left unwindowed; a Hann taper would zero
/// most of their samples.
const MIN_HANN_LEN: usize = 16;

/// FFT planner plus a cached analysis window, one per worker thread.
struct FrameAnalyzer {
    planner: FftPlanner<f32>,
    window: Vec<f32>,
    window_sum: f32,
}

impl FrameAnalyzer {
    fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            window: Vec::new(),
            window_sum: 0.0,
        }
    }

    fn bar_energy(&mut self, span: &[f32], frame_len: usize, sr: u32, freq_min: f64, freq_max: f64) -> f32 {
        if span.is_empty() {
            return 0.0;
        }

        // The last chunk may be shorter than frame_len; it is still a frame.
        let frames = span.chunks(frame_len);
        let count = frames.len();
        let sum: f32 = frames
            .map(|frame| self.band_energy(frame, sr, freq_min, freq_max))
            .sum();
        sum / count as f32
    }

    fn band_energy(&mut self, frame: &[f32], sr: u32, freq_min: f64, freq_max: f64) -> f32 {
        let n = frame.len();
        if self.window.len() != n {
            self.window = analysis_window(n);
            self.window_sum = self.window.iter().sum();
        }

        let mut buffer: Vec<Complex<f32>> = frame
            .iter()
            .zip(self.window.iter())
            .map(|(&s, &w)| Complex::new(s * w, 0.0))
            .collect();
        let fft = self.planner.plan_fft_forward(n);
        fft.process(&mut buffer);

        let half = n / 2;
        let freq_resolution = sr as f64 / n as f64;
        let low_bin = (freq_min / freq_resolution).ceil() as usize;
        let high_bin = ((freq_max / freq_resolution).floor() as usize).min(half);
        if low_bin > high_bin {
            return 0.0;
        }

        // Normalizing by the window sum keeps Hann and rectangular frames on one scale.
        let scale = 1.0 / self.window_sum;
        let sum: f32 = buffer[low_bin..=high_bin].iter().map(|c| c.norm() * scale).sum();
        sum / (high_bin - low_bin + 1) as f32
    }
}

/// Hann window, or a rectangular one for very short frames.
fn analysis_window(size: usize) -> Vec<f32> {
    if size < MIN_HANN_LEN {
        return vec![1.0; size];
    }
    (0..size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
        })
        .collect()
}
