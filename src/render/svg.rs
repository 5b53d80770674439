use std::fmt::Write;

use super::layout::BarGeometry;
use super::RenderConfig;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Serialize bars to an SVG document. Pure and deterministic: the same
/// inputs always produce the same bytes.
pub fn render(bars: &[BarGeometry], canvas_width: f64, config: &RenderConfig) -> String {
    let w = fmt_num(canvas_width);
    let h = fmt_num(config.height);

    let mut out = String::with_capacity(128 + bars.len() * 96);
    let _ = writeln!(
        out,
        r#"<svg xmlns="{}" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        SVG_NS, w, h, w, h
    );

    if let Some(bg) = config.background_color.as_deref().filter(|c| !c.is_empty()) {
        let _ = writeln!(
            out,
            r#"  <rect width="{}" height="{}" fill="{}"/>"#,
            w,
            h,
            escape_attr(bg)
        );
    }

    let fill = escape_attr(&config.bar_color);
    out.push_str("  <g id=\"spectrum\">\n");
    for (i, bar) in bars.iter().enumerate() {
        let _ = write!(
            out,
            r#"    <rect id="bar_{}" x="{}" y="{}" width="{}" height="{}" fill="{}""#,
            i,
            fmt_num(bar.x),
            fmt_num(bar.y),
            fmt_num(bar.width),
            fmt_num(bar.height),
            fill
        );
        let radius = corner_radius(config.border_radius, bar);
        if radius > 0.0 {
            let r = fmt_num(radius);
            let _ = write!(out, r#" rx="{}" ry="{}""#, r, r);
        }
        out.push_str("/>\n");
    }
    out.push_str("  </g>\n");
    out.push_str("</svg>\n");
    out
}

/// Radius never exceeds half the shorter side of the bar.
pub fn corner_radius(border_radius: f64, bar: &BarGeometry) -> f64 {
    let limit = bar.width.min(bar.height) / 2.0;
    border_radius.min(limit).max(0.0)
}

/// At most two decimals, trailing zeros dropped: `6`, `67.5`, `33.33`.
fn fmt_num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
