use crate::assets::audio::AudioTrack;
use crate::assets::background::Background;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Resolution};
use crate::foundation::error::{KaraokeError, KaraokeResult};
use crate::render::cpu::{FrameRenderer, FrameRgb};
use crate::render::plan::{FramePlan, Scene};
use crate::render::style::RenderStyle;
use crate::session::control::{RenderControl, RenderProgress};
use crate::text::font::{FontCandidate, LoadedFont, default_font_candidates, resolve_font};
use crate::text::shaper::TextShaper;
use crate::timing::store::TimingStore;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const MAX_REORDER_BUFFER_BYTES: u64 = 128 * 1024 * 1024;

/// Options controlling a [`RenderSession`].
#[derive(Clone, Debug)]
pub struct RenderSessionOpts {
    /// Output frame rate.
    pub fps: Fps,
    /// Looping video or still image drawn behind the lyrics. Unusable paths fall back to the
    /// solid background color.
    pub background: Option<PathBuf>,
    /// Fonts tried in order before the system sans-serif.
    pub font_candidates: Vec<FontCandidate>,
    /// Render frames on a dedicated rayon pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Frames rendered per parallel batch before in-order delivery.
    pub chunk_size: usize,
}

impl Default for RenderSessionOpts {
    fn default() -> Self {
        Self {
            fps: Fps::default(),
            background: None,
            font_candidates: default_font_candidates(),
            parallel: false,
            threads: None,
            chunk_size: 64,
        }
    }
}

/// Statistics of a completed render.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderStats {
    /// Frames covering the audio duration.
    pub frames_total: u64,
    /// Frames delivered to the sink.
    pub frames_rendered: u64,
    /// Rendered span in seconds.
    pub duration_secs: f64,
}

/// How a render ended when it did not fail.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderOutcome {
    /// Every frame was delivered and the output finalized.
    Completed(RenderStats),
    /// The cancel predicate fired; the sink was aborted and no output is kept.
    Cancelled {
        /// Frames delivered before cancellation.
        frames_rendered: u64,
    },
}

impl RenderOutcome {
    /// `true` for [`RenderOutcome::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

enum Delivery {
    Completed(u64),
    Cancelled(u64),
}

/// A timing store bound to an output size.
///
/// Construction lays out the lyrics, derives the timing index and resolves the font and
/// background once; frames are then pure functions of playback time.
pub struct RenderSession {
    scene: Arc<Scene>,
    font: Option<LoadedFont>,
    background: Option<Background>,
    opts: RenderSessionOpts,
    renderer: FrameRenderer,
}

impl RenderSession {
    /// Build a session rendering `store` at `canvas`.
    #[tracing::instrument(skip(store, opts), fields(words = store.total_words()))]
    pub fn new(
        store: TimingStore,
        canvas: Canvas,
        opts: RenderSessionOpts,
    ) -> KaraokeResult<Self> {
        if opts.fps.num == 0 || opts.fps.den == 0 {
            return Err(KaraokeError::validation("fps must be non-zero"));
        }
        let canvas = Canvas::new(canvas.width, canvas.height)?;
        let style = RenderStyle::for_canvas(canvas);

        let font = resolve_font(&opts.font_candidates);
        let mut measure = TextShaper::new(font.as_ref(), style.font_size);
        let scene = Arc::new(Scene::build(store, style, &mut measure));
        let background = opts
            .background
            .as_deref()
            .and_then(|p| Background::load_or_warn(p, canvas));

        let renderer =
            FrameRenderer::new(scene.clone(), font.as_ref(), background.clone(), opts.fps)?;
        tracing::debug!(
            lines = scene.lines().len(),
            font = ?font.as_ref().map(|f| f.origin.as_str()),
            background = background.is_some(),
            "render session ready"
        );

        Ok(Self {
            scene,
            font,
            background,
            opts,
            renderer,
        })
    }

    /// Output canvas.
    pub fn canvas(&self) -> Canvas {
        self.scene.style().canvas
    }

    /// Options the session was built with.
    pub fn opts(&self) -> &RenderSessionOpts {
        &self.opts
    }

    /// Laid-out scene shared by every frame.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Layout, opacity and highlight decisions for playback `time`.
    pub fn plan_frame(&self, time: f64) -> FramePlan {
        self.scene.plan_frame(time)
    }

    /// Render the frame at playback `time`.
    pub fn render_frame(&mut self, time: f64) -> FrameRgb {
        self.renderer.render(time)
    }

    /// Render `duration_secs` of frames into `sink`.
    ///
    /// Frames reach the sink in index order whether or not rendering is parallel. On
    /// cancellation or failure the sink is aborted.
    #[tracing::instrument(skip(self, audio, sink, control))]
    pub fn render_to_sink(
        &mut self,
        duration_secs: f64,
        audio: Option<&Path>,
        sink: &mut dyn FrameSink,
        control: &mut RenderControl<'_>,
    ) -> KaraokeResult<RenderOutcome> {
        let total = self.opts.fps.frames_covering(duration_secs);
        if total == 0 {
            return Err(KaraokeError::validation(format!(
                "render duration must be positive, got {duration_secs}"
            )));
        }

        let canvas = self.canvas();
        sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.opts.fps,
            audio: audio.map(|p| AudioInputConfig {
                path: p.to_path_buf(),
            }),
        })?;
        tracing::info!(
            frames = total,
            duration = duration_secs,
            parallel = self.opts.parallel,
            "render started"
        );

        let delivered = if self.opts.parallel {
            self.deliver_parallel(total, duration_secs, sink, control)
        } else {
            self.deliver_sequential(total, duration_secs, sink, control)
        };

        match delivered {
            Ok(Delivery::Completed(frames_rendered)) => {
                sink.end()?;
                tracing::info!(frames = frames_rendered, "render completed");
                Ok(RenderOutcome::Completed(RenderStats {
                    frames_total: total,
                    frames_rendered,
                    duration_secs,
                }))
            }
            Ok(Delivery::Cancelled(frames_rendered)) => {
                sink.abort();
                tracing::info!(frames = frames_rendered, "render cancelled");
                Ok(RenderOutcome::Cancelled { frames_rendered })
            }
            Err(e) => {
                sink.abort();
                Err(e)
            }
        }
    }

    /// Encode the full song to MP4 with `audio` muxed in.
    pub fn render(
        &mut self,
        audio: &AudioTrack,
        out: FfmpegSinkOpts,
        control: &mut RenderControl<'_>,
    ) -> KaraokeResult<RenderOutcome> {
        let mut sink = FfmpegSink::new(out);
        self.render_to_sink(
            audio.duration_secs(),
            Some(audio.path()),
            &mut sink,
            control,
        )
    }

    fn deliver_sequential(
        &mut self,
        total: u64,
        duration_secs: f64,
        sink: &mut dyn FrameSink,
        control: &mut RenderControl<'_>,
    ) -> KaraokeResult<Delivery> {
        let fps = self.opts.fps;
        for f in 0..total {
            if control.is_cancelled() {
                return Ok(Delivery::Cancelled(f));
            }
            let t = fps.frame_time_secs(FrameIndex(f));
            let frame = self.renderer.render(t);
            sink.push_frame(FrameIndex(f), &frame)?;
            control.report(&RenderProgress::new(f, total, duration_secs, fps.as_f64(), t));
        }
        Ok(Delivery::Completed(total))
    }

    fn deliver_parallel(
        &self,
        total: u64,
        duration_secs: f64,
        sink: &mut dyn FrameSink,
        control: &mut RenderControl<'_>,
    ) -> KaraokeResult<Delivery> {
        let pool = build_thread_pool(self.opts.threads)?;
        let canvas = self.canvas();
        let bytes_per_frame = u64::from(canvas.width)
            .saturating_mul(u64::from(canvas.height))
            .saturating_mul(3)
            .max(1);
        let max_chunk_by_mem = (MAX_REORDER_BUFFER_BYTES / bytes_per_frame).max(1);
        let chunk_size = normalized_chunk_size(self.opts.chunk_size)
            .min(max_chunk_by_mem)
            .min(total);

        let fps = self.opts.fps;
        let ctx = ParallelChunkCtx {
            scene: &self.scene,
            font: self.font.as_ref(),
            background: self.background.as_ref(),
            fps,
            pool: &pool,
        };

        let mut chunk_start = 0;
        while chunk_start < total {
            if control.is_cancelled() {
                return Ok(Delivery::Cancelled(chunk_start));
            }
            let chunk_end = (chunk_start + chunk_size).min(total);
            let range = FrameRange::new(FrameIndex(chunk_start), FrameIndex(chunk_end))?;
            let frames = render_chunk(&ctx, range)?;

            for (f, frame) in (chunk_start..chunk_end).zip(&frames) {
                if f > chunk_start && control.is_cancelled() {
                    return Ok(Delivery::Cancelled(f));
                }
                sink.push_frame(FrameIndex(f), frame)?;
                let t = fps.frame_time_secs(FrameIndex(f));
                control.report(&RenderProgress::new(f, total, duration_secs, fps.as_f64(), t));
            }
            chunk_start = chunk_end;
        }
        Ok(Delivery::Completed(total))
    }
}

#[derive(Clone, Copy)]
struct ParallelChunkCtx<'a> {
    scene: &'a Arc<Scene>,
    font: Option<&'a LoadedFont>,
    background: Option<&'a Background>,
    fps: Fps,
    pool: &'a rayon::ThreadPool,
}

fn render_chunk(ctx: &ParallelChunkCtx<'_>, range: FrameRange) -> KaraokeResult<Vec<FrameRgb>> {
    ctx.pool.install(|| {
        (range.start.0..range.end.0)
            .into_par_iter()
            .map_init(
                || {
                    let background = ctx.background.cloned();
                    FrameRenderer::new(ctx.scene.clone(), ctx.font, background, ctx.fps)
                        .map_err(|e| e.to_string())
                },
                |worker, f| -> KaraokeResult<FrameRgb> {
                    let renderer = worker
                        .as_mut()
                        .map_err(|msg| KaraokeError::evaluation(msg.clone()))?;
                    Ok(renderer.render(ctx.fps.frame_time_secs(FrameIndex(f))))
                },
            )
            .collect()
    })
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

fn build_thread_pool(threads: Option<usize>) -> KaraokeResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(KaraokeError::validation(
            "render 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| KaraokeError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

/// Render the whole song at a preset resolution into an MP4 at `out_path`.
///
/// The audio track is probed before any frame work; an unreadable track is a
/// [`KaraokeError::Resource`] error.
#[tracing::instrument(skip(store, opts, control))]
pub fn render(
    store: &TimingStore,
    audio_path: &Path,
    out_path: &Path,
    resolution: Resolution,
    opts: RenderSessionOpts,
    control: &mut RenderControl<'_>,
) -> KaraokeResult<RenderOutcome> {
    let audio = AudioTrack::probe(audio_path)?;
    let mut session = RenderSession::new(store.clone(), resolution.canvas(), opts)?;
    session.render(&audio, FfmpegSinkOpts::new(out_path), control)
}

/// Render a single frame at an arbitrary preview size, without encoding.
///
/// Goes through the same layout and planning as [`render`], scaled to the preview height.
/// Each call lays out the lyrics and resolves fonts and background again; a UI previewing many
/// times at one size should keep a [`RenderSession`] and call [`RenderSession::render_frame`].
pub fn render_preview_frame(
    store: &TimingStore,
    time: f64,
    preview_width: u32,
    preview_height: u32,
    opts: &RenderSessionOpts,
) -> KaraokeResult<FrameRgb> {
    let canvas = Canvas::new(preview_width, preview_height)?;
    let mut session = RenderSession::new(store.clone(), canvas, opts.clone())?;
    Ok(session.render_frame(time))
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;
