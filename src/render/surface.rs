use kurbo::{Affine, BezPath, Rect, Stroke};

use crate::foundation::color::Color;
use crate::foundation::core::RasterImage;

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f64,
    pub letter_spacing: f64,
    pub color: Color,
}

/// Extents of a single shaped line, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub width: f64,
    pub ascent: f64,
    pub descent: f64,
}

/// Drawing capability the compositor is written against.
///
/// All coordinates are surface pixels. Text is positioned by `transform`, which maps the
/// left end of the alphabetic baseline to the origin of local space.
pub trait RenderSurface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn fill_path(&mut self, path: &BezPath, color: Color);

    fn stroke_path(&mut self, path: &BezPath, stroke: &Stroke, color: Color);

    /// Restrict subsequent drawing to the inside of `path` until the matching `pop_clip`.
    fn push_clip(&mut self, path: &BezPath);

    fn pop_clip(&mut self);

    /// Draw `image` stretched over `dest`.
    fn draw_image(&mut self, image: &RasterImage, dest: Rect);

    fn measure_text(&mut self, text: &str, style: &TextStyle) -> TextMetrics;

    fn draw_text(&mut self, text: &str, transform: Affine, style: &TextStyle);

    /// Soft fill whose edge fades out over roughly `radius` pixels.
    ///
    /// The default builds the falloff from concentric translucent strokes; backends with
    /// pixel access can do a real blur.
    fn fill_path_blurred(&mut self, path: &BezPath, color: Color, radius: f64) {
        if radius <= 0.0 {
            self.fill_path(path, color);
            return;
        }
        let rings = 8;
        let ring_color = color.with_opacity(1.0 / rings as f32);
        for i in (1..=rings).rev() {
            let width = 2.0 * radius * f64::from(i) / f64::from(rings);
            self.stroke_path(path, &Stroke::new(width), ring_color);
        }
        self.fill_path(path, ring_color);
    }
}
