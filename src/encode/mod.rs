//! Encoding sinks.
//!
//! Sinks consume rendered frames in playback order and are driven by `RenderSession`.

/// `ffmpeg`-based MP4 sink that muxes the song audio.
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
