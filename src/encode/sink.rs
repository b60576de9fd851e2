use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::KaraokeResult;
use crate::render::cpu::FrameRgb;
use std::path::PathBuf;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Audio to mux alongside the frames.
    pub audio: Option<AudioInputConfig>,
}

/// Audio input for sinks that mux sound.
#[derive(Debug, Clone)]
pub struct AudioInputConfig {
    /// Any container/codec ffmpeg can read.
    pub path: PathBuf,
}

/// Sink contract for consuming rendered frames in playback order.
///
/// `push_frame` is called in strictly increasing `FrameIndex` order. Exactly one of `end` or
/// `abort` follows a successful `begin`.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> KaraokeResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb) -> KaraokeResult<()>;
    /// Finalize the output after the last frame.
    fn end(&mut self) -> KaraokeResult<()>;
    /// Discard everything written so far. Used on cancellation and failure.
    fn abort(&mut self) {}
}

/// In-memory sink for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRgb)>,
    finished: bool,
    aborted: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg.clone()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRgb)] {
        &self.frames
    }

    /// `true` once `end` ran.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// `true` once `abort` ran.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> KaraokeResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        self.aborted = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb) -> KaraokeResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> KaraokeResult<()> {
        self.finished = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}
