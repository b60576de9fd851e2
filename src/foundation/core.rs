use crate::foundation::error::{KaraokeError, KaraokeResult};

/// Absolute 0-based output frame index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> KaraokeResult<Self> {
        if start.0 > end.0 {
            return Err(KaraokeError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 30, den: 1 }
    }
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> KaraokeResult<Self> {
        if den == 0 {
            return Err(KaraokeError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(KaraokeError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Playback time of frame `idx` in seconds.
    pub fn frame_time_secs(self, idx: FrameIndex) -> f64 {
        (idx.0 as f64) * f64::from(self.den) / f64::from(self.num)
    }

    /// Number of frames needed to cover `secs`, rounding partial frames up.
    pub fn frames_covering(self, secs: f64) -> u64 {
        if !secs.is_finite() || secs <= 0.0 {
            return 0;
        }
        (secs * self.as_f64()).ceil() as u64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas. Both sides must fit the rasterizer's `u16` surfaces.
    pub fn new(width: u32, height: u32) -> KaraokeResult<Self> {
        if width == 0 || height == 0 {
            return Err(KaraokeError::validation("canvas width/height must be non-zero"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(KaraokeError::validation("canvas width/height exceeds u16"));
        }
        Ok(Self { width, height })
    }
}

/// Named output resolution presets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Resolution {
    /// 854x480.
    #[value(name = "480p")]
    P480,
    /// 1280x720.
    #[value(name = "720p")]
    P720,
    /// 1920x1080.
    #[default]
    #[value(name = "1080p")]
    P1080,
}

impl Resolution {
    /// Pixel dimensions of the preset.
    pub fn canvas(self) -> Canvas {
        let (width, height) = match self {
            Self::P480 => (854, 480),
            Self::P720 => (1280, 720),
            Self::P1080 => (1920, 1080),
        };
        Canvas { width, height }
    }

    /// Look up a preset by key (`"720p"`), falling back to 1080p for unknown keys.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "480p" => Self::P480,
            "720p" => Self::P720,
            _ => Self::P1080,
        }
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
