use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::core::Rgba8;
use crate::layout::lines::TextMeasure;
use crate::text::font::LoadedFont;

/// Average advance of the metrics-only fallback, as a fraction of the font size.
const FALLBACK_ADVANCE_EM: f32 = 0.55;

struct ShaperFace {
    family: String,
    weight: parley::style::FontWeight,
    style: parley::style::FontStyle,
    width: parley::style::FontWidth,
    font: vello_cpu::peniko::FontData,
}

/// Shapes, measures and draws single-style text runs with one font at one size.
///
/// Shaped layouts are cached by text, so repeated words and lines are shaped once per shaper.
/// Without a usable font the shaper still measures (with a fixed per-character advance) but
/// draws nothing.
pub(crate) struct TextShaper {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    face: Option<ShaperFace>,
    size_px: f32,
    cache: HashMap<String, Arc<parley::Layout<()>>>,
}

impl TextShaper {
    pub(crate) fn new(font: Option<&LoadedFont>, size_px: f32) -> Self {
        let mut font_ctx = parley::FontContext::default();
        let face = font.and_then(|f| register_face(&mut font_ctx, f));

        Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            face,
            size_px: size_px.max(1.0),
            cache: HashMap::new(),
        }
    }

    /// `false` when running on the metrics-only fallback.
    pub(crate) fn can_draw(&self) -> bool {
        self.face.is_some()
    }

    fn layout(&mut self, text: &str) -> Option<Arc<parley::Layout<()>>> {
        let face = self.face.as_ref()?;
        if let Some(l) = self.cache.get(text) {
            return Some(l.clone());
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(face.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontWeight(face.weight));
        builder.push_default(parley::style::StyleProperty::FontStyle(face.style));
        builder.push_default(parley::style::StyleProperty::FontWidth(face.width));
        builder.push_default(parley::style::StyleProperty::FontSize(self.size_px));
        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        let layout = Arc::new(layout);
        self.cache.insert(text.to_string(), layout.clone());
        Some(layout)
    }

    /// Fill `text` with its top-left corner at `(x, y)`.
    pub(crate) fn draw(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        x: f64,
        y: f64,
        color: Rgba8,
    ) {
        let Some(layout) = self.layout(text) else {
            return;
        };
        let Some(face) = self.face.as_ref() else {
            return;
        };

        ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&face.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }
}

/// Register `font` and describe the exact face at `font.index`.
///
/// Shaping selects a face by family plus weight, style and width, so all four are taken from
/// the registered face. Collections (`.ttc`) otherwise resolve to their regular face while glyphs
/// are drawn from `font.index`.
fn register_face(font_ctx: &mut parley::FontContext, font: &LoadedFont) -> Option<ShaperFace> {
    let registered = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(font.bytes.to_vec()), None);
    let Some((family_id, info)) = registered.iter().find_map(|(id, faces)| {
        faces
            .iter()
            .find(|info| info.index() == font.index)
            .map(|info| (*id, info.clone()))
    }) else {
        tracing::warn!(origin = %font.origin, index = font.index, "font registered no matching face");
        return None;
    };
    let family = font_ctx.collection.family_name(family_id)?.to_string();

    Some(ShaperFace {
        family,
        weight: info.weight(),
        style: info.style(),
        width: info.width(),
        font: vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font.bytes.to_vec()),
            font.index,
        ),
    })
}

impl TextMeasure for TextShaper {
    fn measure(&mut self, text: &str) -> f32 {
        match self.layout(text) {
            Some(layout) => layout.full_width(),
            None => text.chars().count() as f32 * self.size_px * FALLBACK_ADVANCE_EM,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/shaper.rs"]
mod tests;
