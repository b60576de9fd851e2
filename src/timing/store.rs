//! Immutable sequence of timed lyric tokens.
//!
//! The store is what the timing-capture side hands over: words (with an optional start time) and
//! explicit line breaks, in sequence order. It is never mutated during a render; every derived
//! view (lines, timing index) is recomputed from it.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{KaraokeError, KaraokeResult};

/// Marker used by the timing interchange format for an explicit line break.
pub const BREAK_MARKER: &str = "\n";

/// A lyric word with its capture-assigned timing.
#[derive(Clone, Debug, PartialEq)]
pub struct Word {
    /// Display text (never contains whitespace).
    pub text: String,
    /// Start time in seconds, `None` when the word has not been timed.
    pub start_time: Option<f64>,
    /// Dense, increasing word index.
    pub index: usize,
}

/// One element of the lyric sequence.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// A renderable word.
    Word(Word),
    /// Explicit line boundary.
    Break,
}

impl Token {
    /// Borrow the word, if this token is one.
    pub fn as_word(&self) -> Option<&Word> {
        match self {
            Self::Word(w) => Some(w),
            Self::Break => None,
        }
    }
}

/// Read-only token sequence plus the lookups the renderer needs.
#[derive(Clone, Debug, Default)]
pub struct TimingStore {
    tokens: Arc<[Token]>,
    by_index: Arc<HashMap<usize, usize>>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct TimingRecord {
    word: String,
    start_time: Option<f64>,
    #[serde(default)]
    index: usize,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct TimingFile {
    words: Vec<TimingRecord>,
}

impl TimingStore {
    /// Wrap an already-indexed token sequence.
    pub fn new(tokens: Vec<Token>) -> Self {
        let by_index = tokens
            .iter()
            .enumerate()
            .filter_map(|(pos, t)| t.as_word().map(|w| (w.index, pos)))
            .collect();
        Self {
            tokens: tokens.into(),
            by_index: Arc::new(by_index),
        }
    }

    /// Start building a store with densely assigned word indices.
    pub fn builder() -> TimingStoreBuilder {
        TimingStoreBuilder::default()
    }

    /// Split plain lyrics into words and breaks.
    ///
    /// Every non-empty line is followed by a break, every blank line contributes one break, and
    /// trailing breaks are dropped. No word is timed.
    pub fn from_lyrics_text(text: &str) -> Self {
        let mut b = Self::builder();
        for line in text.split('\n') {
            for word in line.split_whitespace() {
                b = b.word(word, None);
            }
            b = b.line_break();
        }
        b.trim_trailing_breaks().build()
    }

    /// Parse the timing interchange JSON (`{"words": [{"word", "start_time", "index"}]}`).
    pub fn from_json_str(json: &str) -> KaraokeResult<Self> {
        let file: TimingFile = serde_json::from_str(json)
            .map_err(|e| KaraokeError::serde(format!("invalid timing json: {e}")))?;

        let mut tokens = Vec::with_capacity(file.words.len());
        for rec in file.words {
            if rec.word == BREAK_MARKER {
                tokens.push(Token::Break);
                continue;
            }
            if let Some(t) = rec.start_time
                && !(t.is_finite() && t >= 0.0)
            {
                return Err(KaraokeError::validation(format!(
                    "word {} ('{}') has invalid start_time {t}",
                    rec.index, rec.word
                )));
            }
            tokens.push(Token::Word(Word {
                text: rec.word,
                start_time: rec.start_time,
                index: rec.index,
            }));
        }
        Ok(Self::new(tokens))
    }

    /// Read and parse a timing interchange file.
    pub fn from_path(path: impl AsRef<Path>) -> KaraokeResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read timing file '{}'", path.display()))?;
        Self::from_json_str(&json)
    }

    /// Serialize back into the interchange JSON.
    ///
    /// Word records keep their stored index. A break has no index of its own: its record gets
    /// one past the preceding word's index, which is the break's position for stores loaded from
    /// position-indexed files and equals the following word's index for densely indexed stores.
    /// Loading identifies breaks by their text and ignores their index.
    pub fn to_json_string(&self) -> KaraokeResult<String> {
        let mut next_index = 0usize;
        let words = self
            .tokens
            .iter()
            .map(|t| match t {
                Token::Word(w) => {
                    next_index = w.index + 1;
                    TimingRecord {
                        word: w.text.clone(),
                        start_time: w.start_time,
                        index: w.index,
                    }
                }
                Token::Break => TimingRecord {
                    word: BREAK_MARKER.to_string(),
                    start_time: None,
                    index: next_index,
                },
            })
            .collect();
        serde_json::to_string_pretty(&TimingFile { words })
            .map_err(|e| KaraokeError::serde(e.to_string()))
    }

    /// The full ordered token sequence.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Words in sequence order, skipping breaks.
    pub fn words(&self) -> impl Iterator<Item = &Word> + '_ {
        self.tokens.iter().filter_map(Token::as_word)
    }

    /// Timestamp of the word with index `index`, if it exists and is timed.
    pub fn word_time(&self, index: usize) -> Option<f64> {
        let pos = *self.by_index.get(&index)?;
        self.tokens[pos].as_word()?.start_time
    }

    /// First timed word in sequence order.
    pub fn first_timed_word(&self) -> Option<&Word> {
        self.words().find(|w| w.start_time.is_some())
    }

    /// Last timed word in sequence order.
    pub fn last_timed_word(&self) -> Option<&Word> {
        self.words().filter(|w| w.start_time.is_some()).last()
    }

    /// Number of words carrying a timestamp.
    pub fn timed_count(&self) -> usize {
        self.words().filter(|w| w.start_time.is_some()).count()
    }

    /// Number of words, breaks excluded.
    pub fn total_words(&self) -> usize {
        self.words().count()
    }

    /// `true` when every word is timed.
    pub fn is_complete(&self) -> bool {
        self.timed_count() == self.total_words()
    }

    /// The word being sung at `time` and the progress (0..=1) toward the next timed word.
    ///
    /// Scans timed words in sequence order and stops at the first one starting after `time`.
    /// The last timed word is assumed to last one second.
    pub fn word_at_time(&self, time: f64) -> Option<(&Word, f64)> {
        let timed: Vec<(f64, &Word)> = self
            .words()
            .filter_map(|w| w.start_time.map(|t| (t, w)))
            .collect();

        let mut current = None;
        for (i, (start, _)) in timed.iter().enumerate() {
            if *start <= time {
                current = Some(i);
            } else {
                break;
            }
        }
        let i = current?;
        let (start, word) = timed[i];

        let progress = match timed.get(i + 1) {
            Some((next, _)) => {
                let dur = next - start;
                if dur > 0.0 {
                    ((time - start) / dur).min(1.0)
                } else {
                    1.0
                }
            }
            None => (time - start).min(1.0),
        };
        Some((word, progress))
    }
}

/// Incremental constructor assigning dense word indices.
#[derive(Debug, Default)]
pub struct TimingStoreBuilder {
    tokens: Vec<Token>,
    next_index: usize,
}

impl TimingStoreBuilder {
    /// Append a word with an optional start time.
    pub fn word(mut self, text: impl Into<String>, start_time: Option<f64>) -> Self {
        self.tokens.push(Token::Word(Word {
            text: text.into(),
            start_time,
            index: self.next_index,
        }));
        self.next_index += 1;
        self
    }

    /// Append an explicit line break.
    pub fn line_break(mut self) -> Self {
        self.tokens.push(Token::Break);
        self
    }

    fn trim_trailing_breaks(mut self) -> Self {
        while matches!(self.tokens.last(), Some(Token::Break)) {
            self.tokens.pop();
        }
        self
    }

    /// Finish the store.
    pub fn build(self) -> TimingStore {
        TimingStore::new(self.tokens)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/store.rs"]
mod tests;
