//! Karaoke is a deterministic lyric video compositor.
//!
//! It turns a timed lyric sequence (words with optional start times and explicit line breaks)
//! plus the song's audio into an MP4 with smoothly scrolling, progressively highlighted lyrics.
//! The public API is session-oriented:
//!
//! - Load a [`TimingStore`] from timing JSON or plain lyrics
//! - Create a [`RenderSession`] for an output size
//! - Preview single frames, or stream every frame into a [`FrameSink`] such as [`FfmpegSink`]
//!
//! Every frame is a pure function of `(timing store, output size, playback time)`, so previews
//! and exports make identical layout, opacity and highlight decisions.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;

pub(crate) mod layout;
pub(crate) mod motion;
/// Frame planning and CPU rasterization.
pub(crate) mod render;
pub(crate) mod text;
pub(crate) mod timing;

/// Encoding sinks.
pub mod encode;
/// Session-oriented rendering API.
pub mod session;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Resolution, Rgba8};
pub use crate::foundation::error::{KaraokeError, KaraokeResult};

pub use crate::assets::audio::AudioTrack;
pub use crate::assets::background::{Background, loop_time};
pub use crate::assets::media::{
    AudioSourceInfo, VideoSourceInfo, is_tool_on_path, probe_audio, probe_video,
};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};
pub use crate::layout::lines::{Line, TextMeasure, layout_lines};
pub use crate::motion::opacity::{
    FADE_ZONE_TOP, line_distance_opacity, line_opacity, position_opacity,
};
pub use crate::motion::scroll::{LinePosition, LineTiming, ScrollCalculator, line_timings};
pub use crate::render::cpu::FrameRgb;
pub use crate::render::plan::{FramePlan, PlannedLine, PlannedWord, Scene, is_highlighted};
pub use crate::render::style::{HIGHLIGHT_OFFSET, RenderStyle};
pub use crate::session::control::{RenderControl, RenderProgress};
pub use crate::session::render_session::{
    RenderOutcome, RenderSession, RenderSessionOpts, RenderStats, render, render_preview_frame,
};
pub use crate::text::font::{FontCandidate, default_font_candidates};
pub use crate::timing::index::{GAP_THRESHOLD, Gap, TimingIndex};
pub use crate::timing::store::{BREAK_MARKER, Token, TimingStore, TimingStoreBuilder, Word};
