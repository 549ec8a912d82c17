use crate::foundation::core::RasterImage;
use crate::style::definition::StyleFilter;

/// Apply a style filter to an image, returning a new buffer.
pub fn apply_filter(image: &RasterImage, filter: &StyleFilter) -> RasterImage {
    let mut rgba = image.to_straight();
    for px in rgba.chunks_exact_mut(4) {
        let [r, g, b] = filter_rgb(filter, [px[0], px[1], px[2]]);
        px[0] = r;
        px[1] = g;
        px[2] = b;
    }
    RasterImage::from_straight(image.width, image.height, rgba)
}

fn filter_rgb(filter: &StyleFilter, [r, g, b]: [u8; 3]) -> [u8; 3] {
    let (rf, gf, bf) = (f32::from(r), f32::from(g), f32::from(b));
    let luma = 0.2126 * rf + 0.7152 * gf + 0.0722 * bf;
    match *filter {
        StyleFilter::Grayscale => [to_u8(luma); 3],
        StyleFilter::Sepia { amount } => {
            let t = amount.clamp(0.0, 1.0);
            let sepia = [
                0.393 * rf + 0.769 * gf + 0.189 * bf,
                0.349 * rf + 0.686 * gf + 0.168 * bf,
                0.272 * rf + 0.534 * gf + 0.131 * bf,
            ];
            [
                to_u8(lerp(rf, sepia[0], t)),
                to_u8(lerp(gf, sepia[1], t)),
                to_u8(lerp(bf, sepia[2], t)),
            ]
        }
        StyleFilter::Tint { color, strength } => {
            let t = strength.clamp(0.0, 1.0);
            let shade = luma / 255.0;
            [
                to_u8(lerp(rf, f32::from(color.r) * shade, t)),
                to_u8(lerp(gf, f32::from(color.g) * shade, t)),
                to_u8(lerp(bf, f32::from(color.b) * shade, t)),
            ]
        }
        StyleFilter::Invert => [255 - r, 255 - g, 255 - b],
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/filter.rs"]
mod tests;
