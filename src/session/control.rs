use crate::foundation::math::clamp01;

/// Progress snapshot reported after each frame reaches the sink.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderProgress {
    /// Index of the frame just delivered.
    pub frame: u64,
    /// Frames in the whole render.
    pub total_frames: u64,
    /// `frame / (duration * fps)`, clamped to `[0, 1]`.
    pub fraction: f64,
    /// Playback time of the delivered frame in seconds.
    pub time_secs: f64,
}

impl RenderProgress {
    pub(crate) fn new(
        frame: u64,
        total_frames: u64,
        duration_secs: f64,
        fps: f64,
        time_secs: f64,
    ) -> Self {
        let span = duration_secs * fps;
        let fraction = if span > 0.0 {
            clamp01(frame as f64 / span)
        } else {
            0.0
        };
        Self {
            frame,
            total_frames,
            fraction,
            time_secs,
        }
    }
}

type ProgressFn<'a> = Box<dyn FnMut(&RenderProgress) + 'a>;
type CancelFn<'a> = Box<dyn Fn() -> bool + 'a>;

/// Caller hooks consulted by the render driver between frames.
///
/// Both hooks run on the thread that called `render`, never mid-frame. Cancellation is
/// cooperative: the predicate is polled before each frame is delivered.
#[derive(Default)]
pub struct RenderControl<'a> {
    progress: Option<ProgressFn<'a>>,
    cancel: Option<CancelFn<'a>>,
}

impl<'a> RenderControl<'a> {
    /// Control with no hooks: never cancels, reports nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report progress to `f` after every delivered frame.
    pub fn with_progress(mut self, f: impl FnMut(&RenderProgress) + 'a) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    /// Stop the render at the next frame boundary once `f` returns `true`.
    pub fn with_cancel(mut self, f: impl Fn() -> bool + 'a) -> Self {
        self.cancel = Some(Box::new(f));
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|f| f())
    }

    pub(crate) fn report(&mut self, progress: &RenderProgress) {
        if let Some(f) = self.progress.as_mut() {
            f(progress);
        }
    }
}

impl std::fmt::Debug for RenderControl<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderControl")
            .field("progress", &self.progress.is_some())
            .field("cancel", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/control.rs"]
mod tests;
