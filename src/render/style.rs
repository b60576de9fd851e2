use crate::foundation::core::{Canvas, Rgba8};

/// Words whose start time is within this many seconds of playback are already highlighted.
pub const HIGHLIGHT_OFFSET: f64 = 0.5;

/// Height the base metrics are designed for.
const BASE_HEIGHT: f64 = 1080.0;

/// Visual constants for one output size.
///
/// Metrics scale linearly with the output height against a 1080p base, so the same lyrics lay
/// out identically (up to scale) at every resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderStyle {
    /// Output size.
    pub canvas: Canvas,
    /// Font size in pixels.
    pub font_size: f32,
    /// Vertical distance between line tops.
    pub line_spacing: f64,
    /// Largest drop-shadow offset in pixels.
    pub shadow_offset: f64,
    /// Loading bar thickness.
    pub bar_height: f64,
    /// Loading bar top edge.
    pub bar_y: f64,
    /// Left/right padding for wrapped text and the loading bar.
    pub horizontal_padding: f64,
    /// Solid background when no background asset is available.
    pub background: Rgba8,
    /// Regular word color.
    pub text: Rgba8,
    /// Highlighted word and loading bar fill color.
    pub highlight: Rgba8,
    /// Drop shadow color.
    pub shadow: Rgba8,
    /// Loading bar track color.
    pub bar_track: Rgba8,
}

impl RenderStyle {
    /// Style scaled for `canvas`.
    pub fn for_canvas(canvas: Canvas) -> Self {
        let px = |v: f64| (v * f64::from(canvas.height) / BASE_HEIGHT).floor();
        Self {
            canvas,
            font_size: px(72.0).max(1.0) as f32,
            line_spacing: px(120.0).max(1.0),
            shadow_offset: px(4.0).max(2.0),
            bar_height: px(20.0).max(10.0),
            bar_y: px(40.0),
            horizontal_padding: px(100.0),
            background: Rgba8::rgb(18, 18, 18),
            text: Rgba8::rgb(255, 255, 255),
            highlight: Rgba8::rgb(255, 200, 50),
            shadow: Rgba8::rgba(0, 0, 0, 150),
            bar_track: Rgba8::rgba(255, 255, 255, 50),
        }
    }

    /// Width available to a wrapped line.
    pub fn content_width(&self) -> f64 {
        (f64::from(self.canvas.width) - 2.0 * self.horizontal_padding).max(1.0)
    }

    /// Shadow passes as diagonal offsets, drawn back to front.
    pub fn shadow_offsets(&self) -> impl Iterator<Item = f64> {
        let max = self.shadow_offset.max(1.0) as u32;
        let min = (max / 2).max(1);
        (min..=max).rev().map(f64::from)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/style.rs"]
mod tests;
