//! Per-frame render decisions, computed without touching pixels.
//!
//! A [`Scene`] is built once per session from the timing store and output style; planning a
//! frame is then a pure function of playback time. Preview and export both go through
//! [`Scene::plan_frame`], so their layout, opacity and highlight decisions cannot diverge.

use crate::layout::lines::{Line, TextMeasure, layout_lines};
use crate::motion::opacity::line_opacity;
use crate::motion::scroll::{LinePosition, ScrollCalculator, line_timings};
use crate::render::style::{HIGHLIGHT_OFFSET, RenderStyle};
use crate::timing::index::TimingIndex;
use crate::timing::store::{Token, TimingStore, Word};

/// `true` when a word with `start_time` shows as highlighted at playback `time`.
///
/// Monotone in `time`: once highlighted, a word stays highlighted.
pub fn is_highlighted(start_time: Option<f64>, time: f64) -> bool {
    start_time.is_some_and(|s| s <= time + HIGHLIGHT_OFFSET)
}

/// Measured horizontal metrics of one line.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct LineMetrics {
    pub(crate) width: f64,
    /// Advance of each word including its trailing space.
    pub(crate) advances: Vec<f64>,
}

/// Read-only state shared by every frame of a session.
#[derive(Clone, Debug)]
pub struct Scene {
    pub(crate) store: TimingStore,
    pub(crate) style: RenderStyle,
    pub(crate) lines: Vec<Line>,
    pub(crate) metrics: Vec<LineMetrics>,
    pub(crate) index: TimingIndex,
    pub(crate) scroll: ScrollCalculator,
}

/// A word placed on a planned line.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedWord {
    /// Position of the word token in the store.
    pub position: usize,
    /// Word index.
    pub index: usize,
    /// Left edge in pixels.
    pub x: f64,
    /// Highlight state at the planned time.
    pub highlighted: bool,
}

/// A line that will be drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedLine {
    /// Line index in the layout.
    pub line: usize,
    /// Top edge in pixels after scrolling.
    pub y: f64,
    /// Opacity in `(0, 1]`.
    pub opacity: f64,
    /// Words left to right.
    pub words: Vec<PlannedWord>,
}

/// Everything the rasterizer needs for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FramePlan {
    /// Playback time in seconds.
    pub time: f64,
    /// Vertical camera translation in pixels.
    pub scroll_offset: f64,
    /// Current line and its progress, once singing has started.
    pub current: Option<LinePosition>,
    /// Intro loading bar fill fraction, only before the first timed word.
    pub loading_bar: Option<f64>,
    /// Visible lines (opacity > 0, inside the vertical draw band).
    pub lines: Vec<PlannedLine>,
}

impl Scene {
    /// Lay out `store` for `style` and derive timing state.
    #[tracing::instrument(skip_all, fields(width = style.canvas.width, height = style.canvas.height))]
    pub(crate) fn build(
        store: TimingStore,
        style: RenderStyle,
        measure: &mut dyn TextMeasure,
    ) -> Self {
        let lines = layout_lines(&store, style.content_width() as f32, measure);
        let metrics = lines
            .iter()
            .map(|line| LineMetrics {
                width: f64::from(measure.measure(&line.text(&store))),
                advances: line
                    .words(&store)
                    .map(|w| f64::from(measure.measure(&format!("{} ", w.text))))
                    .collect(),
            })
            .collect();

        let index = TimingIndex::build(&store);
        tracing::debug!(
            first_word_time = ?index.first_word_time,
            last_word_time = ?index.last_word_time,
            gaps = index.gaps.len(),
            "derived timing index"
        );
        let scroll = ScrollCalculator::new(
            line_timings(&lines, &store),
            &index,
            style.line_spacing,
            f64::from(style.canvas.height),
        );

        Self {
            store,
            style,
            lines,
            metrics,
            index,
            scroll,
        }
    }

    /// Output style.
    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Wrapped lines.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Derived timing index.
    pub fn timing_index(&self) -> &TimingIndex {
        &self.index
    }

    /// Token store the scene was built from.
    pub fn store(&self) -> &TimingStore {
        &self.store
    }

    pub(crate) fn word_at(&self, position: usize) -> Option<&Word> {
        self.store.tokens().get(position).and_then(Token::as_word)
    }

    /// Plan the frame at playback `time`.
    pub fn plan_frame(&self, time: f64) -> FramePlan {
        let style = &self.style;
        let width = f64::from(style.canvas.width);
        let height = f64::from(style.canvas.height);
        let font_size = f64::from(style.font_size);

        let scroll_offset = self.scroll.offset(time);
        let current = self.scroll.current_line(time);
        let center_y = (height / 2.0).floor();

        let mut lines = Vec::new();
        for (i, (line, metrics)) in self.lines.iter().zip(&self.metrics).enumerate() {
            if line.is_empty() {
                continue;
            }
            let y = center_y + (i as f64) * style.line_spacing - scroll_offset;
            if y < -2.0 * font_size || y > height + font_size {
                continue;
            }
            let opacity = line_opacity(i, current, y);
            if opacity <= 0.0 {
                continue;
            }

            let mut x = ((width - metrics.width) / 2.0).floor();
            let mut words = Vec::with_capacity(line.positions().len());
            for (&position, advance) in line.positions().iter().zip(&metrics.advances) {
                let Some(word) = self.word_at(position) else {
                    continue;
                };
                words.push(PlannedWord {
                    position,
                    index: word.index,
                    x,
                    highlighted: is_highlighted(word.start_time, time),
                });
                x += advance;
            }

            lines.push(PlannedLine {
                line: i,
                y,
                opacity,
                words,
            });
        }

        FramePlan {
            time,
            scroll_offset,
            current,
            loading_bar: self.index.intro_progress(time),
            lines,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
