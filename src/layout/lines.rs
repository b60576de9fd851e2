//! Wrapping the token sequence into visual lines.

use crate::timing::store::{Token, TimingStore, Word};

/// Text width measurement in pixels.
pub trait TextMeasure {
    /// Rendered width of `text` in pixels.
    fn measure(&mut self, text: &str) -> f32;
}

impl<F: FnMut(&str) -> f32> TextMeasure for F {
    fn measure(&mut self, text: &str) -> f32 {
        self(text)
    }
}

/// A wrapped line: positions of consecutive word tokens in the store.
///
/// An empty line carries no words and only occupies vertical space.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    positions: Vec<usize>,
}

impl Line {
    /// Token positions of the words on this line.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// `true` for a spacing-only line.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Resolve the words of this line against the store it was laid out from.
    pub fn words<'a>(&'a self, store: &'a TimingStore) -> impl Iterator<Item = &'a Word> + 'a {
        self.positions
            .iter()
            .filter_map(move |&p| store.tokens().get(p).and_then(Token::as_word))
    }

    /// Words joined by single spaces.
    pub fn text(&self, store: &TimingStore) -> String {
        join_words(self.words(store))
    }
}

fn join_words<'a>(words: impl Iterator<Item = &'a Word>) -> String {
    let mut out = String::new();
    for (i, w) in words.enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&w.text);
    }
    out
}

/// Wrap `store` into lines no wider than `content_width`.
///
/// Explicit breaks end the current line; a break directly after another break yields a single
/// empty spacing line, however long the run of breaks is. A word is moved to a new line when
/// appending it would exceed the width, unless it is the first word of the line (an overlong
/// word overflows instead of being dropped).
#[tracing::instrument(skip(store, measure), fields(tokens = store.tokens().len()))]
pub fn layout_lines(
    store: &TimingStore,
    content_width: f32,
    measure: &mut dyn TextMeasure,
) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut candidate: Vec<usize> = Vec::new();
    let mut prev_was_break = false;
    let mut spacer_emitted = false;

    for (pos, token) in store.tokens().iter().enumerate() {
        match token {
            Token::Break => {
                if !candidate.is_empty() {
                    lines.push(Line {
                        positions: std::mem::take(&mut candidate),
                    });
                } else if prev_was_break && !spacer_emitted {
                    lines.push(Line::default());
                    spacer_emitted = true;
                }
                prev_was_break = true;
            }
            Token::Word(_) => {
                prev_was_break = false;
                spacer_emitted = false;

                candidate.push(pos);
                if candidate.len() > 1 {
                    let text = join_words(
                        candidate
                            .iter()
                            .filter_map(|&p| store.tokens()[p].as_word()),
                    );
                    if measure.measure(&text) > content_width {
                        candidate.pop();
                        lines.push(Line {
                            positions: std::mem::replace(&mut candidate, vec![pos]),
                        });
                    }
                }
            }
        }
    }

    if !candidate.is_empty() {
        lines.push(Line {
            positions: candidate,
        });
    }

    tracing::debug!(lines = lines.len(), "laid out lyric lines");
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/layout/lines.rs"]
mod tests;
