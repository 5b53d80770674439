pub mod layout;
pub mod svg;

/// Canvas width policy. `0` in the config file means `Auto`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CanvasWidth {
    /// Exactly wide enough for every bar and the gaps between them.
    Auto,
    Explicit(f64),
}

impl CanvasWidth {
    pub fn from_config(width: f64) -> Self {
        if width == 0.0 {
            CanvasWidth::Auto
        } else {
            CanvasWidth::Explicit(width)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum VerticalAlign {
    #[default]
    Center,
    Top,
    Bottom,
}

impl VerticalAlign {
    /// Unknown names fall back to `Center`.
    pub fn parse_or_center(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "center" | "centre" | "middle" => VerticalAlign::Center,
            "top" => VerticalAlign::Top,
            "bottom" => VerticalAlign::Bottom,
            other => {
                log::warn!("Unknown vertical_align '{}', using center", other);
                VerticalAlign::Center
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct RenderConfig {
    pub width: CanvasWidth,
    pub height: f64,
    pub bar_width: f64,
    pub bar_spacing: f64,
    pub bar_color: String,
    pub border_radius: f64,
    pub min_bar_height: f64,
    /// Share of the canvas height the loudest bar may occupy, in (0, 100]
    pub max_bar_height_percent: f64,
    pub background_color: Option<String>,
    pub vertical_align: VerticalAlign,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: CanvasWidth::Auto,
            height: 150.0,
            bar_width: 6.0,
            bar_spacing: 7.0,
            bar_color: "#000000".into(),
            border_radius: 2.0,
            min_bar_height: 15.0,
            max_bar_height_percent: 95.0,
            background_color: None,
            vertical_align: VerticalAlign::Center,
        }
    }
}
