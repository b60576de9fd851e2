use std::sync::Arc;

use vello_cpu::kurbo::{Affine, Rect};

use crate::assets::background::{Background, BackgroundSampler};
use crate::foundation::core::{Fps, Rgba8};
use crate::foundation::error::{KaraokeError, KaraokeResult};
use crate::foundation::math::{clamp01, rgba_to_rgb};
use crate::render::plan::{FramePlan, PlannedLine, Scene};
use crate::text::font::LoadedFont;
use crate::text::shaper::TextShaper;

/// A rendered frame: packed RGB8, row-major, no padding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgb {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 3` bytes.
    pub data: Vec<u8>,
}

impl FrameRgb {
    /// RGB of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let off = (y as usize * self.width as usize + x as usize) * 3;
        self.data.get(off..off + 3).map(|p| [p[0], p[1], p[2]])
    }
}

/// Executes [`FramePlan`]s on the CPU.
///
/// Owns the mutable per-worker state (raster context, glyph layout cache, background frame
/// cache); the shared [`Scene`] stays read-only.
pub(crate) struct FrameRenderer {
    scene: Arc<Scene>,
    shaper: TextShaper,
    background: Option<BackgroundSampler>,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
}

impl FrameRenderer {
    pub(crate) fn new(
        scene: Arc<Scene>,
        font: Option<&LoadedFont>,
        background: Option<Background>,
        fps: Fps,
    ) -> KaraokeResult<Self> {
        let canvas = scene.style.canvas;
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| KaraokeError::evaluation("frame width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| KaraokeError::evaluation("frame height exceeds u16"))?;

        Ok(Self {
            shaper: TextShaper::new(font, scene.style.font_size),
            background: background.map(|bg| BackgroundSampler::new(bg, canvas, fps)),
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
            scene,
        })
    }

    /// Plan and rasterize the frame at playback `time`.
    pub(crate) fn render(&mut self, time: f64) -> FrameRgb {
        let plan = self.scene.plan_frame(time);
        self.rasterize(&plan)
    }

    pub(crate) fn rasterize(&mut self, plan: &FramePlan) -> FrameRgb {
        self.ctx.reset();
        self.draw_background(plan.time);
        if let Some(progress) = plan.loading_bar {
            self.draw_loading_bar(progress);
        }
        for line in &plan.lines {
            self.draw_line(line);
        }
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);

        let canvas = self.scene.style.canvas;
        let mut data = Vec::new();
        rgba_to_rgb(self.pixmap.data_as_u8_slice(), &mut data);
        FrameRgb {
            width: canvas.width,
            height: canvas.height,
            data,
        }
    }

    fn full_rect(&self) -> Rect {
        let canvas = self.scene.style.canvas;
        Rect::new(0.0, 0.0, f64::from(canvas.width), f64::from(canvas.height))
    }

    fn draw_background(&mut self, time: f64) {
        let rect = self.full_rect();
        self.ctx.set_transform(Affine::IDENTITY);
        self.ctx.set_paint_transform(Affine::IDENTITY);

        // Frames must stay opaque under translucent stills.
        set_color(&mut self.ctx, self.scene.style.background);
        self.ctx.fill_rect(&rect);

        if let Some(frame) = self.background.as_mut().and_then(|s| s.frame_at(time)) {
            self.ctx.set_paint(vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(frame),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            });
            self.ctx.fill_rect(&rect);
        }
    }

    fn draw_loading_bar(&mut self, progress: f64) {
        let style = &self.scene.style;
        let left = style.horizontal_padding;
        let right = f64::from(style.canvas.width) - style.horizontal_padding;
        let top = style.bar_y;
        let bottom = style.bar_y + style.bar_height;
        let fill_right = left + ((right - left) * clamp01(progress)).floor();

        self.ctx.set_transform(Affine::IDENTITY);
        set_color(&mut self.ctx, style.bar_track);
        self.ctx.fill_rect(&Rect::new(left, top, right, bottom));
        if fill_right > left {
            set_color(&mut self.ctx, style.highlight);
            self.ctx.fill_rect(&Rect::new(left, top, fill_right, bottom));
        }
    }

    fn draw_line(&mut self, line: &PlannedLine) {
        let Self {
            scene, shaper, ctx, ..
        } = self;
        if !shaper.can_draw() {
            return;
        }
        let style = &scene.style;

        let layered = line.opacity < 1.0;
        if layered {
            ctx.push_opacity_layer(line.opacity as f32);
        }
        for word in &line.words {
            let Some(w) = scene.word_at(word.position) else {
                continue;
            };
            for offset in style.shadow_offsets() {
                shaper.draw(ctx, &w.text, word.x + offset, line.y + offset, style.shadow);
            }
            let color = if word.highlighted {
                style.highlight
            } else {
                style.text
            };
            shaper.draw(ctx, &w.text, word.x, line.y, color);
        }
        if layered {
            ctx.pop_layer();
        }
    }
}

fn set_color(ctx: &mut vello_cpu::RenderContext, c: Rgba8) {
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
