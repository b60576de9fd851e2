use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{KaraokeError, KaraokeResult};

/// Probed facts about a video source.
#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    /// Probed file.
    pub source_path: PathBuf,
    /// Native width in pixels.
    pub width: u32,
    /// Native height in pixels.
    pub height: u32,
    /// Frame rate numerator.
    pub fps_num: u32,
    /// Frame rate denominator.
    pub fps_den: u32,
    /// Container duration; 0 when unknown.
    pub duration_sec: f64,
    /// Whether the file also carries sound.
    pub has_audio: bool,
}

impl VideoSourceInfo {
    /// Native frames per second, 0 when unknown.
    pub fn source_fps(&self) -> f64 {
        if self.fps_den == 0 {
            0.0
        } else {
            f64::from(self.fps_num) / f64::from(self.fps_den)
        }
    }
}

/// Probed facts about an audio source.
#[derive(Clone, Debug)]
pub struct AudioSourceInfo {
    /// Probed file.
    pub source_path: PathBuf,
    /// Container duration, falling back to the stream duration; 0 when unknown.
    pub duration_sec: f64,
    /// ffprobe codec name of the first audio stream.
    pub codec_name: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(serde::Deserialize)]
struct ProbeOut {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

impl ProbeOut {
    fn stream(&self, kind: &str) -> Option<&ProbeStream> {
        self.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(kind))
    }

    fn duration_sec(&self, stream: Option<&ProbeStream>) -> f64 {
        self.format
            .as_ref()
            .and_then(|f| f.duration.as_deref())
            .or_else(|| stream.and_then(|s| s.duration.as_deref()))
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|d| d.is_finite())
            .unwrap_or(0.0)
    }
}

fn run_ffprobe(source_path: &Path) -> KaraokeResult<ProbeOut> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| KaraokeError::resource(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(KaraokeError::resource(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    serde_json::from_slice(&out.stdout)
        .map_err(|e| KaraokeError::serde(format!("ffprobe json parse failed: {e}")))
}

/// Probe dimensions, frame rate and duration of a video file.
pub fn probe_video(source_path: &Path) -> KaraokeResult<VideoSourceInfo> {
    let parsed = run_ffprobe(source_path)?;
    let video_stream = parsed
        .stream("video")
        .ok_or_else(|| KaraokeError::resource("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| KaraokeError::resource("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| KaraokeError::resource("missing video height from ffprobe"))?;
    let (fps_num, fps_den) = parse_ff_ratio(video_stream.r_frame_rate.as_deref().unwrap_or("0/1"))
        .ok_or_else(|| KaraokeError::resource("invalid video r_frame_rate"))?;

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps_num,
        fps_den,
        duration_sec: parsed.duration_sec(Some(video_stream)),
        has_audio: parsed.stream("audio").is_some(),
    })
}

/// Probe the duration of the first audio stream of a file.
pub fn probe_audio(source_path: &Path) -> KaraokeResult<AudioSourceInfo> {
    let parsed = run_ffprobe(source_path)?;
    let audio_stream = parsed.stream("audio").ok_or_else(|| {
        KaraokeError::resource(format!(
            "no audio stream found in '{}'",
            source_path.display()
        ))
    })?;

    Ok(AudioSourceInfo {
        source_path: source_path.to_path_buf(),
        duration_sec: parsed.duration_sec(Some(audio_stream)),
        codec_name: audio_stream.codec_name.clone(),
    })
}

/// Decode up to `frame_count` frames starting at `start_time_sec`, resampled to `fps` and
/// scaled to `canvas`, as straight RGBA8.
pub(crate) fn decode_video_frames_rgba8(
    source: &VideoSourceInfo,
    start_time_sec: f64,
    frame_count: u32,
    canvas: Canvas,
    fps: Fps,
) -> KaraokeResult<Vec<Vec<u8>>> {
    if frame_count == 0 {
        return Ok(Vec::new());
    }

    let filter = format!(
        "fps={}/{},scale={}:{}:flags=bicubic",
        fps.num, fps.den, canvas.width, canvas.height
    );
    let out = Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{start_time_sec:.9}")])
        .arg("-i")
        .arg(&source.source_path)
        .args([
            "-an",
            "-vf",
            &filter,
            "-frames:v",
            &frame_count.to_string(),
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .stdin(Stdio::null())
        .output()
        .map_err(|e| {
            KaraokeError::evaluation(format!("failed to run ffmpeg for video decode: {e}"))
        })?;

    if !out.status.success() {
        return Err(KaraokeError::evaluation(format!(
            "ffmpeg video decode batch failed for '{}': {}",
            source.source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let expected_len = canvas.width as usize * canvas.height as usize * 4;
    if out.stdout.len() < expected_len || !out.stdout.len().is_multiple_of(expected_len) {
        return Err(KaraokeError::evaluation(format!(
            "decoded video batch has invalid size: got {} bytes, expected multiples of {expected_len}",
            out.stdout.len()
        )));
    }

    let available = (out.stdout.len() / expected_len).min(frame_count as usize);
    Ok(out
        .stdout
        .chunks_exact(expected_len)
        .take(available)
        .map(<[u8]>::to_vec)
        .collect())
}

/// Return `true` when `tool -version` runs successfully from `PATH`.
pub fn is_tool_on_path(tool: &str) -> bool {
    Command::new(tool)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next().unwrap_or("1").parse::<u32>().ok()?;
    if b == 0 {
        return None;
    }
    Some((a, b))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/media.rs"]
mod tests;
