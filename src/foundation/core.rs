pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Scale factors from the base canvas into a target raster.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleFactor {
    pub sx: f64,
    pub sy: f64,
}

impl ScaleFactor {
    pub const IDENTITY: Self = Self { sx: 1.0, sy: 1.0 };

    pub fn between(base: Size, target: Size) -> Self {
        Self {
            sx: target.width / base.width,
            sy: target.height / base.height,
        }
    }

    pub fn point(self, p: Point) -> Point {
        Point::new(p.x * self.sx, p.y * self.sy)
    }

    pub fn rect(self, r: Rect) -> Rect {
        Rect::new(r.x0 * self.sx, r.y0 * self.sy, r.x1 * self.sx, r.y1 * self.sy)
    }

    /// Lengths that must stay isotropic (font sizes, stroke widths) follow the vertical axis.
    pub fn length(self, v: f64) -> f64 {
        v * self.sy
    }
}

/// A raster image in premultiplied RGBA8, tightly packed, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: std::sync::Arc<Vec<u8>>,
}

impl RasterImage {
    pub fn new(width: u32, height: u32, rgba8_premul: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if rgba8_premul.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            rgba8_premul: std::sync::Arc::new(rgba8_premul),
        })
    }

    pub fn filled(width: u32, height: u32, premul: [u8; 4]) -> Self {
        Self {
            width,
            height,
            rgba8_premul: std::sync::Arc::new(premul.repeat(width as usize * height as usize)),
        }
    }

    /// Decode any format supported by `image` into premultiplied RGBA8.
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self::from_straight(width, height, rgba.into_raw()))
    }

    pub fn from_straight(width: u32, height: u32, mut rgba8: Vec<u8>) -> Self {
        premultiply_in_place(&mut rgba8);
        Self {
            width,
            height,
            rgba8_premul: std::sync::Arc::new(rgba8),
        }
    }

    pub fn to_straight(&self) -> Vec<u8> {
        let mut out = self.rgba8_premul.as_ref().clone();
        unpremultiply_in_place(&mut out);
        out
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = &self.rgba8_premul[i..i + 4];
        Some([px[0], px[1], px[2], px[3]])
    }
}

pub fn premultiply_in_place(rgba8: &mut [u8]) {
    for px in rgba8.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
}

pub fn unpremultiply_in_place(rgba8: &mut [u8]) {
    for px in rgba8.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}
