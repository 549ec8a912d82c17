use std::collections::HashMap;
use std::sync::Arc;

use kurbo::{Affine, BezPath, Rect, Shape, Stroke, StrokeOpts};

use crate::foundation::color::Color;
use crate::foundation::core::RasterImage;
use crate::foundation::error::{PosterError, PosterResult};
use crate::render::blur::blur_rgba8_premul;
use crate::render::surface::{RenderSurface, TextMetrics, TextStyle};
use crate::render::text::{
    FALLBACK_FAMILY, FontSet, LoadedFont, TextBrushRgba8, TextLayoutEngine, fallback_font,
};

const STROKE_TOLERANCE: f64 = 0.25;

/// Blurs run on a mask downsampled so the kernel stays around this many pixels.
const BLUR_MASK_RADIUS: f64 = 8.0;

/// Raster surface backed by `vello_cpu`, with text shaped by Parley.
pub struct CpuSurface {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    fonts: FontSet,
    text: TextLayoutEngine,
    font_data: HashMap<String, vello_cpu::peniko::FontData>,
    clip_depth: usize,
    warned_fallback: bool,
}

impl CpuSurface {
    pub fn new(width: u32, height: u32, fonts: FontSet) -> PosterResult<Self> {
        let (width, height) = surface_dims(width, height)?;
        Ok(Self {
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
            fonts,
            text: TextLayoutEngine::new(),
            font_data: HashMap::new(),
            clip_depth: 0,
            warned_fallback: false,
        })
    }

    /// Rasterize everything drawn so far into a premultiplied RGBA8 image.
    pub fn finish(mut self) -> PosterResult<RasterImage> {
        while self.clip_depth > 0 {
            self.pop_clip();
        }
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        RasterImage::new(
            u32::from(self.width),
            u32::from(self.height),
            pixmap.data_as_u8_slice().to_vec(),
        )
        .ok_or_else(|| PosterError::encoding("surface readback has unexpected length"))
    }

    fn shape(
        &mut self,
        text: &str,
        style: &TextStyle,
    ) -> Option<(parley::Layout<TextBrushRgba8>, vello_cpu::peniko::FontData)> {
        let font = match self.fonts.resolve(&style.font_family) {
            Some(font) => {
                if !font.family.eq_ignore_ascii_case(&style.font_family) {
                    tracing::debug!(
                        requested = %style.font_family,
                        fallback = %font.family,
                        "font family not loaded; using fallback"
                    );
                }
                font.clone()
            }
            None => {
                self.note_bundled_fallback(&style.font_family, "no fonts loaded");
                fallback_font()
            }
        };

        let size = style.font_size as f32;
        let spacing = style.letter_spacing as f32;
        let brush = TextBrushRgba8::from(style.color);
        let (layout, font) = match self.text.layout_line(text, &font, size, spacing, brush) {
            Ok(layout) => (layout, font),
            Err(err) if !is_bundled(&font) => {
                tracing::warn!(family = %font.family, error = %err, "text layout failed");
                self.note_bundled_fallback(&style.font_family, "font unusable");
                let bundled = fallback_font();
                match self.text.layout_line(text, &bundled, size, spacing, brush) {
                    Ok(layout) => (layout, bundled),
                    Err(err) => {
                        tracing::warn!(error = %err, "bundled font layout failed");
                        return None;
                    }
                }
            }
            Err(err) => {
                tracing::warn!(family = %font.family, error = %err, "text layout failed");
                return None;
            }
        };
        let data = self
            .font_data
            .entry(font.family.clone())
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(font.bytes.as_ref().clone()),
                    0,
                )
            })
            .clone();
        Some((layout, data))
    }

    fn note_bundled_fallback(&mut self, requested: &str, why: &str) {
        if !self.warned_fallback {
            tracing::warn!(family = %requested, reason = why, fallback = FALLBACK_FAMILY, "drawing text with the bundled font");
            self.warned_fallback = true;
        }
    }

    fn blit(&mut self, pixmap: vello_cpu::Pixmap, transform: Affine) {
        let (w, h) = (f64::from(pixmap.width()), f64::from(pixmap.height()));
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint(paint);
        self.ctx
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }

    fn try_fill_blurred(&mut self, path: &BezPath, color: Color, radius: f64) -> PosterResult<()> {
        let factor = (radius / BLUR_MASK_RADIUS).ceil().max(1.0);
        let kernel_radius = (radius / factor).ceil() as u32;
        let sigma = (radius / factor / 2.0).max(0.5) as f32;

        let pad = f64::from(kernel_radius) * factor * 1.5;
        let canvas = Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height));
        let region = path.bounding_box().inflate(pad, pad).intersect(canvas);
        if region.is_zero_area() {
            return Ok(());
        }
        let (mw, mh) = surface_dims(
            (region.width() / factor).ceil() as u32,
            (region.height() / factor).ceil() as u32,
        )?;

        let mut mask_ctx = vello_cpu::RenderContext::new(mw, mh);
        let to_mask =
            Affine::scale(1.0 / factor) * Affine::translate(-region.origin().to_vec2());
        mask_ctx.set_transform(affine_to_cpu(to_mask));
        mask_ctx.set_paint(paint_color(color));
        mask_ctx.fill_path(&bezpath_to_cpu(path));
        mask_ctx.flush();
        let mut mask = vello_cpu::Pixmap::new(mw, mh);
        mask_ctx.render_to_pixmap(&mut mask);

        let blurred = blur_rgba8_premul(
            mask.data_as_u8_slice(),
            u32::from(mw),
            u32::from(mh),
            kernel_radius,
            sigma,
        )?;
        let pixmap = premul_bytes_to_pixmap(&blurred, u32::from(mw), u32::from(mh))?;
        self.blit(
            pixmap,
            Affine::translate(region.origin().to_vec2()) * Affine::scale(factor),
        );
        Ok(())
    }
}

impl RenderSurface for CpuSurface {
    fn width(&self) -> u32 {
        u32::from(self.width)
    }

    fn height(&self) -> u32 {
        u32::from(self.height)
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint_color(color));
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    fn stroke_path(&mut self, path: &BezPath, stroke: &Stroke, color: Color) {
        let outline = kurbo::stroke(path.iter(), stroke, &StrokeOpts::default(), STROKE_TOLERANCE);
        self.fill_path(&outline, color);
    }

    fn push_clip(&mut self, path: &BezPath) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.push_clip_layer(&bezpath_to_cpu(path));
        self.clip_depth += 1;
    }

    fn pop_clip(&mut self) {
        if self.clip_depth == 0 {
            tracing::warn!("pop_clip without matching push_clip");
            return;
        }
        self.ctx.pop_layer();
        self.clip_depth -= 1;
    }

    fn draw_image(&mut self, image: &RasterImage, dest: Rect) {
        if image.width == 0 || image.height == 0 {
            return;
        }
        let pixmap = match premul_bytes_to_pixmap(&image.rgba8_premul, image.width, image.height)
        {
            Ok(p) => p,
            Err(err) => {
                tracing::warn!(error = %err, "skipping image");
                return;
            }
        };
        let fit = Affine::translate(dest.origin().to_vec2())
            * Affine::scale_non_uniform(
                dest.width() / f64::from(image.width),
                dest.height() / f64::from(image.height),
            );
        self.blit(pixmap, fit);
    }

    fn measure_text(&mut self, text: &str, style: &TextStyle) -> TextMetrics {
        let Some((layout, _)) = self.shape(text, style) else {
            return TextMetrics::default();
        };
        let (ascent, descent) = layout
            .lines()
            .next()
            .map(|l| (f64::from(l.metrics().ascent), f64::from(l.metrics().descent)))
            .unwrap_or_default();
        TextMetrics {
            width: f64::from(layout.width()),
            ascent,
            descent,
        }
    }

    fn draw_text(&mut self, text: &str, transform: Affine, style: &TextStyle) {
        let Some((layout, font)) = self.shape(text, style) else {
            return;
        };
        // Glyph positions are relative to the layout's top edge.
        let baseline = layout
            .lines()
            .next()
            .map(|l| f64::from(l.metrics().baseline))
            .unwrap_or_default();
        self.ctx
            .set_transform(affine_to_cpu(transform * Affine::translate((0.0, -baseline))));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }

    fn fill_path_blurred(&mut self, path: &BezPath, color: Color, radius: f64) {
        if radius <= 0.0 {
            self.fill_path(path, color);
            return;
        }
        if let Err(err) = self.try_fill_blurred(path, color, radius) {
            tracing::warn!(error = %err, "blur failed; drawing unblurred");
            self.fill_path(path, color);
        }
    }
}

fn surface_dims(width: u32, height: u32) -> PosterResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PosterError::validation(format!("surface width {width} exceeds u16")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PosterError::validation(format!("surface height {height} exceeds u16")))?;
    if w == 0 || h == 0 {
        return Err(PosterError::validation("surface must be at least 1x1"));
    }
    Ok((w, h))
}

fn is_bundled(font: &LoadedFont) -> bool {
    Arc::ptr_eq(&font.bytes, &fallback_font().bytes)
}

fn paint_color(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> PosterResult<vello_cpu::Pixmap> {
    let (w, h) = surface_dims(width, height)?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(PosterError::validation("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels: Vec<_> = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
