//! Playback time to vertical scroll offset.

use crate::layout::lines::Line;
use crate::timing::index::TimingIndex;
use crate::timing::store::TimingStore;

/// Timing window of one laid-out line.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineTiming {
    /// Earliest timestamp among the line's words.
    pub start: Option<f64>,
    /// Timestamp of the line's last timed word (sequence order).
    pub end: Option<f64>,
}

/// Derive the timing window of every line.
pub fn line_timings(lines: &[Line], store: &TimingStore) -> Vec<LineTiming> {
    lines
        .iter()
        .map(|line| {
            let mut timing = LineTiming::default();
            for t in line.words(store).filter_map(|w| w.start_time) {
                timing.start = Some(timing.start.map_or(t, |s: f64| s.min(t)));
                timing.end = Some(t);
            }
            timing
        })
        .collect()
}

/// The line currently being sung and how far playback is through it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinePosition {
    /// Index of the current line.
    pub line: usize,
    /// Fraction of the way to the next timed line, in `[0, 1]`.
    pub progress: f64,
}

/// Maps playback time to a continuous vertical offset.
///
/// Before the first timed word the lyrics slide up from one frame height below the view;
/// afterwards the offset tracks the current line plus its progress, in units of line spacing.
#[derive(Clone, Debug)]
pub struct ScrollCalculator {
    timings: Vec<LineTiming>,
    next_start: Vec<Option<f64>>,
    first_word_time: Option<f64>,
    line_spacing: f64,
    frame_height: f64,
}

impl ScrollCalculator {
    /// Build a calculator for the given per-line timings.
    pub fn new(
        timings: Vec<LineTiming>,
        index: &TimingIndex,
        line_spacing: f64,
        frame_height: f64,
    ) -> Self {
        let mut next_start = vec![None; timings.len()];
        let mut upcoming = None;
        for (i, t) in timings.iter().enumerate().rev() {
            next_start[i] = upcoming;
            if t.start.is_some() {
                upcoming = t.start;
            }
        }
        Self {
            timings,
            next_start,
            first_word_time: index.first_word_time,
            line_spacing,
            frame_height,
        }
    }

    /// Per-line timing windows.
    pub fn timings(&self) -> &[LineTiming] {
        &self.timings
    }

    /// Last line whose start is `<= time`, with its progress. Untimed lines are skipped.
    pub fn current_line(&self, time: f64) -> Option<LinePosition> {
        let mut current = None;
        for (i, timing) in self.timings.iter().enumerate() {
            let Some(start) = timing.start else {
                continue;
            };
            if time >= start {
                current = Some(LinePosition {
                    line: i,
                    progress: self.progress_in_line(i, start, timing.end, time),
                });
            }
        }
        current
    }

    fn progress_in_line(&self, i: usize, start: f64, end: Option<f64>, time: f64) -> f64 {
        if let Some(next) = self.next_start[i]
            && next > start
        {
            return ((time - start) / (next - start)).min(1.0);
        }
        if let Some(end) = end
            && end > start
        {
            return ((time - start) / (end - start + 1.0).max(1.0)).min(1.0);
        }
        0.5
    }

    /// Vertical offset in pixels at `time`.
    pub fn offset(&self, time: f64) -> f64 {
        let Some(first) = self.first_word_time else {
            return 0.0;
        };
        if self.timings.is_empty() {
            return 0.0;
        }
        if time < first {
            if first > 0.0 {
                let progress = time / first;
                return -self.frame_height + self.frame_height * progress;
            }
            return 0.0;
        }
        self.current_line(time)
            .map(|p| (p.line as f64 + p.progress) * self.line_spacing)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/motion/scroll.rs"]
mod tests;
