use crate::timing::store::TimingStore;

/// Silence longer than this (seconds) between two timed words is recorded as a gap.
pub const GAP_THRESHOLD: f64 = 5.0;

/// Interval between two chronologically adjacent timed words.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gap {
    /// Timestamp of the earlier word.
    pub start: f64,
    /// Timestamp of the later word.
    pub end: f64,
}

impl Gap {
    /// Gap length in seconds.
    pub fn duration(self) -> f64 {
        self.end - self.start
    }
}

/// Session-wide timing facts derived once from a [`TimingStore`].
///
/// Timed words are sorted by timestamp, not sequence position, so manually corrected
/// out-of-order timings still yield sensible first/last times and gaps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimingIndex {
    /// Earliest timestamp, `None` when nothing is timed.
    pub first_word_time: Option<f64>,
    /// Latest timestamp, `None` when nothing is timed.
    pub last_word_time: Option<f64>,
    /// Gaps longer than [`GAP_THRESHOLD`], in chronological order.
    pub gaps: Vec<Gap>,
}

impl TimingIndex {
    /// Build the index with the default [`GAP_THRESHOLD`].
    pub fn build(store: &TimingStore) -> Self {
        Self::build_with_threshold(store, GAP_THRESHOLD)
    }

    /// Build the index with a custom gap threshold.
    pub fn build_with_threshold(store: &TimingStore, gap_threshold: f64) -> Self {
        let mut timed: Vec<(f64, usize)> = store
            .words()
            .filter_map(|w| w.start_time.map(|t| (t, w.index)))
            .collect();
        timed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let gaps = timed
            .windows(2)
            .filter(|pair| pair[1].0 - pair[0].0 > gap_threshold)
            .map(|pair| Gap {
                start: pair[0].0,
                end: pair[1].0,
            })
            .collect();

        Self {
            first_word_time: timed.first().map(|(t, _)| *t),
            last_word_time: timed.last().map(|(t, _)| *t),
            gaps,
        }
    }

    /// Intro indicator fill fraction at `time`.
    ///
    /// Only defined while `time` precedes a strictly positive first word time.
    pub fn intro_progress(&self, time: f64) -> Option<f64> {
        let first = self.first_word_time?;
        if first > 0.0 && time < first {
            Some((time / first).max(0.0))
        } else {
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/index.rs"]
mod tests;
