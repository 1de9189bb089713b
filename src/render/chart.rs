// src/render/chart.rs
//
// Student Distribution bar chart as inline SVG.

use std::fmt::Write as _;

use super::html_escape;
use crate::models::LevelCounts;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 256;
const PAD_LEFT: u32 = 48;
const PAD_RIGHT: u32 = 16;
const PAD_TOP: u32 = 16;
const PAD_BOTTOM: u32 = 40;
const BAR_FILL: &str = "#059669";
const TICKS: u64 = 4;

/// Rounds the tallest bar up to a value that divides evenly into the ticks.
/// Computed in `u64` so the largest counts cannot overflow.
fn axis_max(max: u32) -> u64 {
    if max == 0 {
        return TICKS;
    }
    u64::from(max).div_ceil(TICKS) * TICKS
}

pub fn render_bar_chart(counts: &LevelCounts) -> String {
    let bars: Vec<_> = counts.iter().collect();
    let top = axis_max(bars.iter().map(|(_, n)| *n).max().unwrap_or(0));

    let plot_w = WIDTH - PAD_LEFT - PAD_RIGHT;
    let plot_h = HEIGHT - PAD_TOP - PAD_BOTTOM;
    let slot = plot_w as f64 / bars.len() as f64;
    let bar_w = slot * 0.6;
    let baseline = (PAD_TOP + plot_h) as f64;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="chart" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="Student distribution">"#
    );

    // grid + y ticks
    for i in 0..=TICKS {
        let value = top / TICKS * i;
        let y = baseline - plot_h as f64 * i as f64 / TICKS as f64;
        let _ = write!(
            svg,
            r##"<line x1="{PAD_LEFT}" y1="{y:.1}" x2="{x2}" y2="{y:.1}" stroke="#e5e7eb" stroke-dasharray="3 3"/><text x="{tx}" y="{ty:.1}" font-size="11" text-anchor="end" fill="#6b7280">{value}</text>"##,
            x2 = WIDTH - PAD_RIGHT,
            tx = PAD_LEFT - 6,
            ty = y + 4.0,
        );
    }

    for (i, (level, count)) in bars.iter().enumerate() {
        let h = plot_h as f64 * f64::from(*count) / top as f64;
        let x = PAD_LEFT as f64 + slot * i as f64 + (slot - bar_w) / 2.0;
        let cx = PAD_LEFT as f64 + slot * (i as f64 + 0.5);
        let _ = write!(
            svg,
            r##"<rect class="bar" x="{x:.1}" y="{y:.1}" width="{bar_w:.1}" height="{h:.1}" fill="{BAR_FILL}"><title>{label}: {count}</title></rect><text x="{cx:.1}" y="{ly:.1}" font-size="12" text-anchor="middle" fill="#374151">{label}</text>"##,
            y = baseline - h,
            ly = baseline + 18.0,
            label = html_escape(level.label()),
        );
    }

    svg.push_str("</svg>");
    svg
}
