use std::path::{Path, PathBuf};

use crate::assets::media;
use crate::foundation::error::{KaraokeError, KaraokeResult};

/// The song's audio: the source of the render duration and the stream muxed into the output.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioTrack {
    path: PathBuf,
    duration_secs: f64,
}

impl AudioTrack {
    /// Wrap a track whose duration is already known.
    pub fn new(path: impl Into<PathBuf>, duration_secs: f64) -> KaraokeResult<Self> {
        if !(duration_secs.is_finite() && duration_secs > 0.0) {
            return Err(KaraokeError::resource(format!(
                "audio duration must be positive, got {duration_secs}"
            )));
        }
        Ok(Self {
            path: path.into(),
            duration_secs,
        })
    }

    /// Probe `path` with ffprobe.
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn probe(path: &Path) -> KaraokeResult<Self> {
        if !path.is_file() {
            return Err(KaraokeError::resource(format!(
                "audio file '{}' is not readable",
                path.display()
            )));
        }
        let info = media::probe_audio(path)?;
        tracing::debug!(duration = info.duration_sec, codec = ?info.codec_name, "probed audio");
        Self::new(info.source_path, info.duration_sec)
    }

    /// Source file, muxed as-is into the output.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Playback length; the render covers exactly this span.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/audio.rs"]
mod tests;
