//! Frame compositor: turns one resolved timeline position into pixels.
//!
//! Layers, bottom to top: background clear, cover-fit image with slow zoom and color boost,
//! bottom scrim, inset border, fading scene text, progress bar with elapsed readout.
//! Layout coordinates are authored against a 1280x720 reference frame and scaled uniformly.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context as _;

use crate::animation::motion::{ZoomMotion, cover_transform, text_opacity};
use crate::assets::decode::PreparedImage;
use crate::eval::timeline::ResolvedFrame;
use crate::foundation::core::{Affine, Canvas, Rect, Rgba8, Vec2};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::color::{
    ColorAdjust, Scrim, affine_to_cpu, cpu_color, flatten_over_in_place, premul_bytes_to_image,
};
use crate::render::surface::Surface;
use crate::render::text::{TextLayoutEngine, TextLine, wrap_words};

const REF_WIDTH: f64 = 1280.0;
const REF_HEIGHT: f64 = 720.0;

const TEXT_LEFT: f64 = 72.0;
const TEXT_MAX_WIDTH: f64 = 760.0;
const TITLE_TOP: f64 = 404.0;
const TITLE_SIZE: f64 = 54.0;
const SUBTITLE_SIZE: f64 = 26.0;
const SUBTITLE_LINE: f64 = 34.0;
const DESCRIPTION_SIZE: f64 = 18.0;
const DESCRIPTION_LINE: f64 = 26.0;
const BLOCK_GAP: f64 = 10.0;

const BAR_LEFT: f64 = 72.0;
const BAR_RIGHT: f64 = REF_WIDTH - 72.0;
const BAR_TOP: f64 = 676.0;
const BAR_HEIGHT: f64 = 4.0;
const READOUT_SIZE: f64 = 15.0;
const READOUT_GAP: f64 = 8.0;

/// Visual parameters of the compositor.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompositorStyle {
    /// Color the surface is cleared to before drawing.
    pub background: Rgba8,
    /// Per-scene slow zoom.
    pub zoom: ZoomMotion,
    /// Color boost applied to scene images only.
    pub adjust: ColorAdjust,
    /// Text legibility gradient.
    pub scrim: Scrim,
    /// Border inset from the frame edge, reference pixels.
    pub border_inset: f64,
    /// Border stroke width, reference pixels.
    pub border_width: f64,
    /// Border color.
    pub border_color: Rgba8,
    /// Title color (before text opacity).
    pub title_color: Rgba8,
    /// Subtitle color (before text opacity).
    pub subtitle_color: Rgba8,
    /// Description color (before text opacity).
    pub description_color: Rgba8,
    /// Progress track color.
    pub track_color: Rgba8,
    /// Progress fill color.
    pub fill_color: Rgba8,
    /// Elapsed readout color.
    pub readout_color: Rgba8,
    /// Font file used for all text. Text layers are skipped when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for CompositorStyle {
    fn default() -> Self {
        Self {
            background: Rgba8::new(11, 11, 16, 255),
            zoom: ZoomMotion::default(),
            adjust: ColorAdjust::default(),
            scrim: Scrim::default(),
            border_inset: 20.0,
            border_width: 2.0,
            border_color: Rgba8::new(255, 255, 255, 72),
            title_color: Rgba8::new(255, 255, 255, 255),
            subtitle_color: Rgba8::new(255, 214, 150, 255),
            description_color: Rgba8::new(226, 228, 236, 225),
            track_color: Rgba8::new(255, 255, 255, 56),
            fill_color: Rgba8::new(255, 196, 92, 240),
            readout_color: Rgba8::new(255, 255, 255, 200),
            font_path: None,
        }
    }
}

#[derive(Clone)]
struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

struct SceneText {
    title: Vec<TextLine>,
    subtitle: Vec<TextLine>,
    description: Vec<TextLine>,
}

/// Draws frames onto a [`Surface`].
///
/// Owns per-scene caches (color-adjusted image paints, shaped text) that are filled on first
/// use. Drawing mutates only the target surface and these caches.
pub struct FrameCompositor {
    canvas: Canvas,
    style: CompositorStyle,
    total_duration: f64,
    scale: f64,
    ctx_size: (u16, u16),
    ctx: Option<vello_cpu::RenderContext>,
    text: Option<TextLayoutEngine>,
    image_paints: HashMap<usize, ImagePaint>,
    scene_text: HashMap<usize, SceneText>,
    scrim: Option<(vello_cpu::Image, f64)>,
    warned_no_font: bool,
}

impl FrameCompositor {
    /// Build a compositor for `canvas`, loading `style.font_path` if set.
    pub fn new(canvas: Canvas, style: CompositorStyle, total_duration: f64) -> ReelResult<Self> {
        let font = match &style.font_path {
            Some(path) => Some(
                std::fs::read(path)
                    .with_context(|| format!("read font '{}'", path.display()))?,
            ),
            None => None,
        };
        Self::with_font_bytes(canvas, style, total_duration, font)
    }

    /// Build a compositor with explicit font bytes (`None` disables text layers).
    pub fn with_font_bytes(
        canvas: Canvas,
        style: CompositorStyle,
        total_duration: f64,
        font: Option<Vec<u8>>,
    ) -> ReelResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(ReelError::configuration("canvas width/height must be non-zero"));
        }
        let ctx_size: (u16, u16) = (
            canvas
                .width
                .try_into()
                .map_err(|_| ReelError::configuration("canvas width exceeds u16"))?,
            canvas
                .height
                .try_into()
                .map_err(|_| ReelError::configuration("canvas height exceeds u16"))?,
        );
        let text = font.map(TextLayoutEngine::from_font_bytes).transpose()?;
        let scale = (f64::from(canvas.width) / REF_WIDTH).min(f64::from(canvas.height) / REF_HEIGHT);
        Ok(Self {
            canvas,
            style,
            total_duration,
            scale,
            ctx_size,
            ctx: None,
            text,
            image_paints: HashMap::new(),
            scene_text: HashMap::new(),
            scrim: None,
            warned_no_font: false,
        })
    }

    /// Canvas this compositor lays out for.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Color every frame is cleared to.
    pub fn background(&self) -> Rgba8 {
        self.style.background
    }

    /// Whether text layers are drawn.
    pub fn has_font(&self) -> bool {
        self.text.is_some()
    }

    /// Fully overwrite `surface` with the frame for `frame`, drawing `image` as its backdrop.
    ///
    /// Every pixel of the result is opaque; edge coverage is flattened over the background.
    pub fn draw(
        &mut self,
        surface: &mut Surface,
        frame: &ResolvedFrame<'_>,
        image: &PreparedImage,
    ) -> ReelResult<()> {
        if surface.canvas() != self.canvas {
            return Err(ReelError::surface_unavailable(format!(
                "surface is {}x{}, compositor expects {}x{}",
                surface.canvas().width,
                surface.canvas().height,
                self.canvas.width,
                self.canvas.height
            )));
        }

        let paint = self.image_paint_for(frame.scene_index, image)?;
        let (scrim, scrim_top) = self.scrim_paint()?;
        let opacity = text_opacity(frame.scene_elapsed, frame.scene.duration) as f32;
        self.ensure_scene_text(frame)?;
        let readout = self.readout_line(frame.overall_progress)?;

        let w = f64::from(self.canvas.width);
        let h = f64::from(self.canvas.height);
        let s = self.scale;
        let style = &self.style;

        let (cw, ch) = (self.ctx_size.0, self.ctx_size.1);
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == cw && ctx.height() == ch => ctx,
            _ => vello_cpu::RenderContext::new(cw, ch),
        };
        ctx.reset();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        // 1. clear
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(cpu_color(style.background));
        fill(&mut ctx, Rect::new(0.0, 0.0, w, h));

        // 2-3. cover-fit image with eased zoom; color boost is baked into the paint
        let zoom = style.zoom.zoom_at(frame.scene_progress);
        let tr = cover_transform(f64::from(paint.w), f64::from(paint.h), w, h, zoom);
        ctx.set_transform(affine_to_cpu(tr));
        ctx.set_paint(paint.paint.clone());
        fill(&mut ctx, Rect::new(0.0, 0.0, f64::from(paint.w), f64::from(paint.h)));

        // 4. scrim
        ctx.set_transform(affine_to_cpu(Affine::translate(Vec2::new(0.0, scrim_top))));
        ctx.set_paint(scrim);
        fill(&mut ctx, Rect::new(0.0, 0.0, w, h - scrim_top));

        // 5. border
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(cpu_color(style.border_color));
        for r in border_rects(w, h, style.border_inset * s, style.border_width * s) {
            fill(&mut ctx, r);
        }

        // 6-7. text
        if opacity > 0.0
            && let (Some(engine), Some(text)) = (&self.text, self.scene_text.get(&frame.scene_index))
        {
            let x = TEXT_LEFT * s;
            let mut y = TITLE_TOP * s;
            for line in &text.title {
                draw_line(&mut ctx, engine, line, x, y, style.title_color.with_opacity(opacity));
                y += f64::from(line.height);
            }
            y += BLOCK_GAP * s;
            for line in &text.subtitle {
                draw_line(&mut ctx, engine, line, x, y, style.subtitle_color.with_opacity(opacity));
                y += SUBTITLE_LINE * s;
            }
            if !text.subtitle.is_empty() {
                y += BLOCK_GAP * s;
            }
            for line in &text.description {
                draw_line(
                    &mut ctx,
                    engine,
                    line,
                    x,
                    y,
                    style.description_color.with_opacity(opacity),
                );
                y += DESCRIPTION_LINE * s;
            }
        }

        // 8. progress bar
        let (track, filled) = progress_rects(w, s, frame.overall_progress);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(cpu_color(style.track_color));
        fill(&mut ctx, track);
        if filled.width() > 0.0 {
            ctx.set_paint(cpu_color(style.fill_color));
            fill(&mut ctx, filled);
        }
        if let (Some(engine), Some(line)) = (&self.text, readout.as_ref()) {
            let x = BAR_RIGHT * s - f64::from(line.width);
            let y = BAR_TOP * s - READOUT_GAP * s - f64::from(line.height);
            draw_line(&mut ctx, engine, line, x, y, style.readout_color);
        }

        ctx.flush();
        ctx.render_to_pixmap(surface.pixmap_mut());
        flatten_over_in_place(surface.pixmap_mut().data_as_u8_slice_mut(), style.background);
        self.ctx = Some(ctx);
        tracing::trace!(
            scene = frame.scene_index,
            progress = frame.overall_progress,
            "frame composed"
        );
        Ok(())
    }

    fn image_paint_for(&mut self, scene_index: usize, image: &PreparedImage) -> ReelResult<ImagePaint> {
        if let Some(p) = self.image_paints.get(&scene_index) {
            return Ok(p.clone());
        }
        let adjusted = self.style.adjust.apply_premul(image.rgba8_premul());
        let out = ImagePaint {
            paint: premul_bytes_to_image(&adjusted, image.width(), image.height())?,
            w: image.width(),
            h: image.height(),
        };
        self.image_paints.insert(scene_index, out.clone());
        Ok(out)
    }

    fn scrim_paint(&mut self) -> ReelResult<(vello_cpu::Image, f64)> {
        if let Some(s) = &self.scrim {
            return Ok(s.clone());
        }
        let h = self.canvas.height;
        let top = (f64::from(h) * self.style.scrim.start.clamp(0.0, 1.0)).floor();
        let span = (h - top as u32).max(1);
        let bytes = self.style.scrim.premul_bytes(self.canvas.width, span);
        let image = premul_bytes_to_image(&bytes, self.canvas.width, span)?;
        self.scrim = Some((image.clone(), top));
        Ok((image, top))
    }

    fn ensure_scene_text(&mut self, frame: &ResolvedFrame<'_>) -> ReelResult<()> {
        let Some(engine) = self.text.as_mut() else {
            if !self.warned_no_font {
                tracing::warn!("no font configured; text layers are skipped");
                self.warned_no_font = true;
            }
            return Ok(());
        };
        if self.scene_text.contains_key(&frame.scene_index) {
            return Ok(());
        }

        let s = self.scale;
        let max_width = TEXT_MAX_WIDTH * s;
        let title = if frame.scene.title.trim().is_empty() {
            Vec::new()
        } else {
            vec![engine.layout_line(frame.scene.title.trim(), (TITLE_SIZE * s) as f32)?]
        };
        let subtitle = layout_wrapped(engine, &frame.scene.subtitle, (SUBTITLE_SIZE * s) as f32, max_width)?;
        let description =
            layout_wrapped(engine, &frame.scene.description, (DESCRIPTION_SIZE * s) as f32, max_width)?;

        self.scene_text.insert(
            frame.scene_index,
            SceneText {
                title,
                subtitle,
                description,
            },
        );
        Ok(())
    }

    fn readout_line(&mut self, overall_progress: f64) -> ReelResult<Option<TextLine>> {
        let Some(engine) = self.text.as_mut() else {
            return Ok(None);
        };
        let label = readout_label(overall_progress, self.total_duration);
        Ok(Some(engine.layout_line(&label, (READOUT_SIZE * self.scale) as f32)?))
    }
}

fn layout_wrapped(
    engine: &mut TextLayoutEngine,
    text: &str,
    size_px: f32,
    max_width: f64,
) -> ReelResult<Vec<TextLine>> {
    let mut measure_err = None;
    let lines = wrap_words(text, max_width, |candidate| {
        match engine.measure(candidate, size_px) {
            Ok(w) => f64::from(w),
            Err(e) => {
                measure_err.get_or_insert(e);
                0.0
            }
        }
    });
    if let Some(e) = measure_err {
        return Err(e);
    }
    lines
        .iter()
        .map(|line| engine.layout_line(line, size_px))
        .collect()
}

fn draw_line(
    ctx: &mut vello_cpu::RenderContext,
    engine: &TextLayoutEngine,
    line: &TextLine,
    x: f64,
    y: f64,
    color: Rgba8,
) {
    if color.a == 0 {
        return;
    }
    ctx.set_transform(affine_to_cpu(Affine::translate(Vec2::new(x, y))));
    ctx.set_paint(cpu_color(color));
    for layout_line in line.layout.lines() {
        for item in layout_line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(engine.font())
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

fn fill(ctx: &mut vello_cpu::RenderContext, r: Rect) {
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1));
}

/// Four edge strips of an inset frame.
pub(crate) fn border_rects(w: f64, h: f64, inset: f64, width: f64) -> [Rect; 4] {
    let (x0, y0, x1, y1) = (inset, inset, w - inset, h - inset);
    [
        Rect::new(x0, y0, x1, y0 + width),
        Rect::new(x0, y1 - width, x1, y1),
        Rect::new(x0, y0 + width, x0 + width, y1 - width),
        Rect::new(x1 - width, y0 + width, x1, y1 - width),
    ]
}

/// Track and filled rects of the progress bar for `progress` in `[0, 1]`.
pub(crate) fn progress_rects(w: f64, scale: f64, progress: f64) -> (Rect, Rect) {
    let left = BAR_LEFT * scale;
    let right = (BAR_RIGHT * scale).min(w);
    let top = BAR_TOP * scale;
    let bottom = top + (BAR_HEIGHT * scale).max(1.0);
    let p = progress.clamp(0.0, 1.0);
    let track = Rect::new(left, top, right, bottom);
    let filled = Rect::new(left, top, left + (right - left) * p, bottom);
    (track, filled)
}

/// Elapsed-seconds readout, e.g. `12.3s / 30.0s`.
pub(crate) fn readout_label(overall_progress: f64, total_duration: f64) -> String {
    let elapsed = overall_progress.clamp(0.0, 1.0) * total_duration;
    format!("{elapsed:.1}s / {total_duration:.1}s")
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
