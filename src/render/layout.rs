use super::{CanvasWidth, RenderConfig, VerticalAlign};
use crate::error::SpectrumError;

/// One bar rectangle in canvas coordinates (origin top-left).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Bars in input order plus the resolved canvas size.
#[derive(Clone, Debug, PartialEq)]
pub struct BarLayout {
    pub bars: Vec<BarGeometry>,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

/// Map an energy sequence onto bar rectangles.
///
/// Energies are divided by the sequence maximum (1 when everything is zero),
/// scaled to `max_bar_height_percent` of the canvas height, raised to
/// `min_bar_height` and finally capped at the canvas height.
pub fn map_to_geometry(energies: &[f32], config: &RenderConfig) -> Result<BarLayout, SpectrumError> {
    if energies.is_empty() {
        return Err(SpectrumError::EmptyInput("energy sequence is empty"));
    }
    validate(config)?;

    let n = energies.len();
    let canvas_height = config.height;
    let canvas_width = match config.width {
        CanvasWidth::Auto => auto_width(n, config.bar_width, config.bar_spacing),
        CanvasWidth::Explicit(w) => w,
    };

    let peak = energies.iter().copied().fold(0.0f32, f32::max);
    let max_energy = if peak > 0.0 { peak as f64 } else { 1.0 };
    let max_allowed = canvas_height * (config.max_bar_height_percent / 100.0);
    let pitch = config.bar_width + config.bar_spacing;

    let bars = energies
        .iter()
        .enumerate()
        .map(|(i, &e)| {
            let ratio = (e.max(0.0) as f64 / max_energy).min(1.0);
            let height = bar_height(ratio, max_allowed, config.min_bar_height, canvas_height);
            BarGeometry {
                x: i as f64 * pitch,
                y: align_y(config.vertical_align, canvas_height, height),
                width: config.bar_width,
                height,
            }
        })
        .collect();

    Ok(BarLayout {
        bars,
        canvas_width,
        canvas_height,
    })
}

pub fn auto_width(num_bars: usize, bar_width: f64, bar_spacing: f64) -> f64 {
    if num_bars == 0 {
        return 0.0;
    }
    num_bars as f64 * bar_width + (num_bars - 1) as f64 * bar_spacing
}

/// min_bar_height wins over the ratio, the canvas height wins over both.
fn bar_height(ratio: f64, max_allowed: f64, min_bar_height: f64, canvas_height: f64) -> f64 {
    (ratio * max_allowed).max(min_bar_height).min(canvas_height)
}

fn align_y(align: VerticalAlign, canvas_height: f64, bar_height: f64) -> f64 {
    match align {
        VerticalAlign::Top => 0.0,
        VerticalAlign::Bottom => canvas_height - bar_height,
        VerticalAlign::Center => (canvas_height - bar_height) / 2.0,
    }
}

fn validate(config: &RenderConfig) -> Result<(), SpectrumError> {
    let positive = |name: &str, v: f64| {
        if v > 0.0 && v.is_finite() {
            Ok(())
        } else {
            Err(SpectrumError::InvalidConfig(format!("{} must be positive, got {}", name, v)))
        }
    };
    let non_negative = |name: &str, v: f64| {
        if v >= 0.0 && v.is_finite() {
            Ok(())
        } else {
            Err(SpectrumError::InvalidConfig(format!("{} must not be negative, got {}", name, v)))
        }
    };

    positive("height", config.height)?;
    positive("bar_width", config.bar_width)?;
    non_negative("bar_spacing", config.bar_spacing)?;
    non_negative("border_radius", config.border_radius)?;
    non_negative("min_bar_height", config.min_bar_height)?;
    if let CanvasWidth::Explicit(w) = config.width {
        positive("width", w)?;
    }

    let pct = config.max_bar_height_percent;
    if !(pct > 0.0 && pct <= 100.0) {
        return Err(SpectrumError::InvalidConfig(format!(
            "max_bar_height_percent must be in (0, 100], got {}",
            pct
        )));
    }
    Ok(())
}
