//! Optional frame source drawn behind the lyrics.
//!
//! Video backgrounds loop: playback time `t` samples source time `t mod duration`. Still
//! images are scaled once at load. Any load or decode problem degrades to the solid style
//! color; it never fails a render.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::assets::media::{self, VideoSourceInfo};
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{KaraokeError, KaraokeResult};
use crate::foundation::math::premultiply_rgba8_in_place;

const STILL_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp"];
const DEFAULT_CACHE_CAPACITY: usize = 64;
const DECODE_BATCH_FRAMES: u32 = 32;

/// A loaded background, shared read-only between frame workers.
#[derive(Clone)]
pub enum Background {
    /// Looping video clip, decoded on demand.
    Video(Arc<VideoSourceInfo>),
    /// Single image already scaled to the output canvas.
    Still(Arc<vello_cpu::Pixmap>),
}

impl Background {
    /// Load `path` as a background for `canvas`.
    ///
    /// Image extensions load through `image`; everything else is probed as video.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path, canvas: Canvas) -> KaraokeResult<Self> {
        if !path.exists() {
            return Err(KaraokeError::resource(format!(
                "background '{}' does not exist",
                path.display()
            )));
        }
        if is_still_image(path) {
            return load_still(path, canvas).map(|p| Self::Still(Arc::new(p)));
        }

        let info = media::probe_video(path)?;
        if !(info.duration_sec > 0.0) {
            return Err(KaraokeError::resource(format!(
                "background video '{}' has no usable duration",
                path.display()
            )));
        }
        tracing::debug!(
            width = info.width,
            height = info.height,
            fps = info.source_fps(),
            duration = info.duration_sec,
            has_audio = info.has_audio,
            "loaded background video"
        );
        Ok(Self::Video(Arc::new(info)))
    }

    /// Load `path`, logging and returning `None` on failure.
    pub fn load_or_warn(path: &Path, canvas: Canvas) -> Option<Self> {
        match Self::load(path, canvas) {
            Ok(bg) => Some(bg),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "background unavailable, using solid color");
                None
            }
        }
    }

    /// Loop length in seconds; `None` for stills.
    pub fn duration_sec(&self) -> Option<f64> {
        match self {
            Self::Video(info) => Some(info.duration_sec),
            Self::Still(_) => None,
        }
    }

    /// Source path for video backgrounds.
    pub fn source_path(&self) -> Option<&PathBuf> {
        match self {
            Self::Video(info) => Some(&info.source_path),
            Self::Still(_) => None,
        }
    }
}

impl std::fmt::Debug for Background {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Video(info) => f.debug_tuple("Video").field(&info.source_path).finish(),
            Self::Still(p) => f
                .debug_struct("Still")
                .field("width", &p.width())
                .field("height", &p.height())
                .finish(),
        }
    }
}

fn is_still_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| STILL_EXTENSIONS.contains(&e.as_str()))
}

fn load_still(path: &Path, canvas: Canvas) -> KaraokeResult<vello_cpu::Pixmap> {
    use anyhow::Context as _;

    let img = image::open(path)
        .with_context(|| format!("failed to decode background image '{}'", path.display()))?;
    let scaled = img
        .resize_exact(
            canvas.width,
            canvas.height,
            image::imageops::FilterType::Triangle,
        )
        .to_rgba8();
    rgba_to_pixmap(scaled.into_raw(), canvas)
}

/// Build a pixmap from straight RGBA8 bytes of exactly `canvas` size.
pub(crate) fn rgba_to_pixmap(
    mut rgba: Vec<u8>,
    canvas: Canvas,
) -> KaraokeResult<vello_cpu::Pixmap> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| KaraokeError::evaluation("background width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| KaraokeError::evaluation("background height exceeds u16"))?;
    if rgba.len() != canvas.width as usize * canvas.height as usize * 4 {
        return Err(KaraokeError::evaluation("background byte length mismatch"));
    }

    premultiply_rgba8_in_place(&mut rgba);
    let mut may_have_opacities = false;
    let pixels = rgba
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

/// Map playback time onto a looping clip of `duration` seconds.
pub fn loop_time(time: f64, duration: f64) -> f64 {
    if !(duration > 0.0) || !time.is_finite() {
        return 0.0;
    }
    time.max(0.0).rem_euclid(duration)
}

/// Per-worker sampler with a bounded LRU of decoded frames.
pub(crate) struct BackgroundSampler {
    background: Background,
    canvas: Canvas,
    fps: Fps,
    frame_cache: HashMap<u64, Arc<vello_cpu::Pixmap>>,
    lru: VecDeque<u64>,
    capacity: usize,
    failed: bool,
}

impl BackgroundSampler {
    pub(crate) fn new(background: Background, canvas: Canvas, fps: Fps) -> Self {
        let capacity = std::env::var("KARAOKE_BG_CACHE_CAPACITY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_CACHE_CAPACITY);
        Self {
            background,
            canvas,
            fps,
            frame_cache: HashMap::new(),
            lru: VecDeque::new(),
            capacity,
            failed: false,
        }
    }

    /// Frame to draw at playback `time`, or `None` to fall back to the solid color.
    pub(crate) fn frame_at(&mut self, time: f64) -> Option<Arc<vello_cpu::Pixmap>> {
        if self.failed {
            return None;
        }
        let info = match &self.background {
            Background::Still(pixmap) => return Some(pixmap.clone()),
            Background::Video(info) => info.clone(),
        };

        let source_time = loop_time(time, info.duration_sec);
        let key = key_for_time(source_time);
        if let Some(frame) = self.frame_cache.get(&key).cloned() {
            self.touch(key);
            return Some(frame);
        }

        match self.prefetch(&info, source_time) {
            Ok(()) => {}
            Err(e) => {
                tracing::warn!(
                    path = %info.source_path.display(),
                    error = %e,
                    "background decode failed, using solid color"
                );
                self.failed = true;
                return None;
            }
        }
        let frame = self.frame_cache.get(&key).cloned();
        if frame.is_some() {
            self.touch(key);
        }
        frame
    }

    fn prefetch(&mut self, info: &VideoSourceInfo, source_time: f64) -> KaraokeResult<()> {
        let fps = self.fps.as_f64();
        let remaining = ((info.duration_sec - source_time) * fps).floor().max(1.0);
        // A batch larger than the cache would evict the frame being requested.
        let max_batch = u32::try_from(self.capacity)
            .unwrap_or(u32::MAX)
            .min(DECODE_BATCH_FRAMES);
        let count = (remaining as u32).clamp(1, max_batch);
        let frames =
            media::decode_video_frames_rgba8(info, source_time, count, self.canvas, self.fps)?;
        if frames.is_empty() {
            tracing::debug!(source_time, "no background frame decoded near clip end");
        }

        for (offset, rgba) in frames.into_iter().enumerate() {
            let key = key_for_time(source_time + offset as f64 / fps);
            if self.frame_cache.contains_key(&key) {
                self.touch(key);
                continue;
            }
            let pixmap = rgba_to_pixmap(rgba, self.canvas)?;
            self.insert_frame(key, Arc::new(pixmap));
        }
        Ok(())
    }

    fn insert_frame(&mut self, key: u64, frame: Arc<vello_cpu::Pixmap>) {
        self.frame_cache.insert(key, frame);
        self.touch(key);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.frame_cache.remove(&old);
            }
        }
    }

    fn touch(&mut self, key: u64) {
        if let Some(pos) = self.lru.iter().position(|x| *x == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }
}

fn key_for_time(source_time_s: f64) -> u64 {
    (source_time_s.max(0.0) * 1000.0).round() as u64
}

#[cfg(test)]
#[path = "../../tests/unit/assets/background.rs"]
mod tests;
