use crate::assets::media::is_tool_on_path;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{KaraokeError, KaraokeResult};
use crate::render::cpu::FrameRgb;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

/// Options for [`FfmpegSink`] MP4 output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 file path.
    pub out_path: PathBuf,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Video encoder passed to `-c:v`.
    pub video_codec: String,
    /// Audio encoder passed to `-c:a`.
    pub audio_codec: String,
    /// x264 speed/quality preset.
    pub preset: String,
    /// Encoder thread count.
    pub threads: u32,
}

impl FfmpegSinkOpts {
    /// Create options for outputting an MP4 to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "medium".to_string(),
            threads: 4,
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw RGB frames to its stdin.
///
/// Audio from `SinkConfig.audio` is muxed with `-shortest`. If the sink is aborted or dropped
/// before `end` succeeds, the encoder is killed and the partial file removed.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Create a new sink that streams into `ffmpeg`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            last_idx: None,
        }
    }

    fn build_command(&self, cfg: &SinkConfig) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.args(encoder_args(&self.opts, cfg));
        cmd
    }

    fn join_stderr(&mut self) -> KaraokeResult<Vec<u8>> {
        match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| KaraokeError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| KaraokeError::encode(format!("ffmpeg stderr read failed: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    fn discard_output(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        let _ = self.join_stderr();
        if self.cfg.take().is_some() && self.opts.out_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.opts.out_path) {
                tracing::warn!(
                    path = %self.opts.out_path.display(),
                    error = %e,
                    "failed to remove partial output"
                );
            }
        }
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> KaraokeResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(KaraokeError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(KaraokeError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(KaraokeError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(KaraokeError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if let Some(audio) = cfg.audio.as_ref()
            && !audio.path.is_file()
        {
            return Err(KaraokeError::resource(format!(
                "audio file '{}' is not readable",
                audio.path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(KaraokeError::encode(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut child = self.build_command(&cfg).spawn().map_err(|e| {
            KaraokeError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| KaraokeError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| KaraokeError::encode("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            out = %self.opts.out_path.display(),
            width = cfg.width,
            height = cfg.height,
            "spawned ffmpeg"
        );
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRgb) -> KaraokeResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| KaraokeError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(KaraokeError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(KaraokeError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != cfg.width as usize * cfg.height as usize * 3 {
            return Err(KaraokeError::validation(
                "frame.data size mismatch with width*height*3",
            ));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(KaraokeError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&frame.data).map_err(|e| {
            KaraokeError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> KaraokeResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| KaraokeError::encode("ffmpeg sink not started"))?;

        let status = child.wait().map_err(|e| {
            KaraokeError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = self.join_stderr()?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            let err = KaraokeError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            ));
            self.discard_output();
            return Err(err);
        }

        self.cfg = None;
        Ok(())
    }

    fn abort(&mut self) {
        self.discard_output();
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.cfg.is_some() {
            self.discard_output();
        }
    }
}

fn encoder_args(opts: &FfmpegSinkOpts, cfg: &SinkConfig) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();
    args.push(if opts.overwrite { "-y" } else { "-n" }.to_string());

    // Input 0: raw packed RGB frames on stdin.
    args.extend(
        [
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
        ]
        .map(String::from),
    );
    args.push(format!("{}x{}", cfg.width, cfg.height));
    args.extend(input_fps_args(cfg.fps));
    args.extend(["-i", "pipe:0"].map(String::from));

    if let Some(audio) = cfg.audio.as_ref() {
        args.push("-i".to_string());
        args.push(audio.path.display().to_string());
        args.extend(["-map", "0:v:0", "-map", "1:a:0"].map(String::from));
    } else {
        args.push("-an".to_string());
    }

    args.extend(["-c:v".to_string(), opts.video_codec.clone()]);
    args.extend(["-preset".to_string(), opts.preset.clone()]);
    args.extend(["-threads".to_string(), opts.threads.max(1).to_string()]);
    args.extend(["-pix_fmt", "yuv420p"].map(String::from));
    if cfg.audio.is_some() {
        args.extend(["-c:a".to_string(), opts.audio_codec.clone()]);
        args.push("-shortest".to_string());
    }
    args.extend(["-movflags", "+faststart"].map(String::from));
    args.push(opts.out_path.display().to_string());
    args
}

fn input_fps_args(fps: Fps) -> [String; 2] {
    // For rawvideo input, `-r` before `-i` sets the input frame rate.
    ["-r".to_string(), format!("{}/{}", fps.num, fps.den)]
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> KaraokeResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    is_tool_on_path("ffmpeg")
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
