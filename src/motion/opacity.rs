//! Per-line opacity from screen position and distance to the current line.

use crate::motion::scroll::LinePosition;

/// Lines above this screen Y (pixels from the top) start fading out.
pub const FADE_ZONE_TOP: f64 = 150.0;

/// Fade applied as a line scrolls into the top band of the frame.
pub fn position_opacity(y: f64) -> f64 {
    if y < 0.0 {
        0.0
    } else if y < FADE_ZONE_TOP {
        y / FADE_ZONE_TOP
    } else {
        1.0
    }
}

/// Fade based on how many lines above the current line `line` is.
///
/// The current line, the one before it and every line below stay opaque; the line two above
/// fades out with the current line's progress; anything further up is hidden.
pub fn line_distance_opacity(line: usize, current: LinePosition) -> f64 {
    let d = current.line as i64 - line as i64;
    if d < 2 {
        1.0
    } else if d == 2 {
        1.0 - current.progress
    } else {
        0.0
    }
}

/// Combined opacity: the minimum of the position and line-distance fades.
///
/// Before any line is current only the position fade applies.
pub fn line_opacity(line: usize, current: Option<LinePosition>, y: f64) -> f64 {
    let by_position = position_opacity(y);
    match current {
        Some(current) => by_position.min(line_distance_opacity(line, current)),
        None => by_position,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/opacity.rs"]
mod tests;
