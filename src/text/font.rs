//! Font resolution with an ordered fallback chain.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use usvg::fontdb;

/// A font file to try, with the face index for collections (`.ttc`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontCandidate {
    /// Font file path.
    pub path: PathBuf,
    /// Face index inside a collection; `None` means the first face.
    pub index: Option<u32>,
}

impl FontCandidate {
    /// Candidate for a single-face font file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            index: None,
        }
    }

    /// Candidate for face `index` of a font collection.
    pub fn with_index(path: impl Into<PathBuf>, index: u32) -> Self {
        Self {
            path: path.into(),
            index: Some(index),
        }
    }
}

/// Bold sans-serif fonts commonly present on macOS, Linux and Windows.
pub fn default_font_candidates() -> Vec<FontCandidate> {
    vec![
        FontCandidate::new("/System/Library/Fonts/Supplemental/Arial Bold.ttf"),
        FontCandidate::with_index("/System/Library/Fonts/Helvetica.ttc", 1),
        FontCandidate::new("/Library/Fonts/Arial Bold.ttf"),
        FontCandidate::with_index("/System/Library/Fonts/Avenir Next.ttc", 10),
        FontCandidate::new("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
        FontCandidate::new("C:/Windows/Fonts/arialbd.ttf"),
    ]
}

/// Raw bytes of the face chosen for rendering.
#[derive(Clone, Debug)]
pub(crate) struct LoadedFont {
    pub(crate) bytes: Arc<Vec<u8>>,
    pub(crate) index: u32,
    pub(crate) origin: String,
}

/// Pick the first usable font: explicit candidates, then a bold system sans-serif.
///
/// Returns `None` when nothing usable exists; callers fall back to metrics-only text.
pub(crate) fn resolve_font(candidates: &[FontCandidate]) -> Option<LoadedFont> {
    for c in candidates {
        if let Some(font) = load_candidate(c) {
            tracing::debug!(origin = %font.origin, "using font candidate");
            return Some(font);
        }
    }

    if let Some(font) = system_font() {
        tracing::debug!(origin = %font.origin, "using system font");
        return Some(font);
    }

    tracing::warn!("no usable font found; text will be measured but not drawn");
    None
}

fn load_candidate(c: &FontCandidate) -> Option<LoadedFont> {
    if !c.path.exists() {
        return None;
    }
    let bytes = match std::fs::read(&c.path) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(path = %c.path.display(), error = %e, "font candidate unreadable");
            return None;
        }
    };
    let index = c.index.unwrap_or(0);

    let mut db = fontdb::Database::new();
    db.load_font_data(bytes.clone());
    if db.faces().count() <= index as usize {
        tracing::warn!(path = %c.path.display(), index, "font candidate has no such face");
        return None;
    }

    Some(LoadedFont {
        bytes: Arc::new(bytes),
        index,
        origin: c.path.display().to_string(),
    })
}

/// System font lookup, scanned once per process.
fn system_font() -> Option<LoadedFont> {
    static SYSTEM_FONT: OnceLock<Option<LoadedFont>> = OnceLock::new();
    SYSTEM_FONT.get_or_init(load_system_font).clone()
}

fn load_system_font() -> Option<LoadedFont> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    let families = [
        fontdb::Family::SansSerif,
        fontdb::Family::Name("DejaVu Sans"),
        fontdb::Family::Name("Liberation Sans"),
        fontdb::Family::Name("Noto Sans"),
    ];
    let id = families
        .iter()
        .find_map(|family| {
            db.query(&fontdb::Query {
                families: std::slice::from_ref(family),
                weight: fontdb::Weight::BOLD,
                ..fontdb::Query::default()
            })
        })
        .or_else(|| db.faces().next().map(|f| f.id))?;

    let origin = db
        .face(id)
        .map(|f| {
            f.families
                .first()
                .map(|(name, _)| name.clone())
                .unwrap_or_else(|| "system".to_string())
        })
        .unwrap_or_else(|| "system".to_string());
    let (bytes, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;
    Some(LoadedFont {
        bytes: Arc::new(bytes),
        index,
        origin,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/text/font.rs"]
mod tests;
