use super::*;
use crate::foundation::color::Color;

fn one_pixel(rgba: [u8; 4]) -> RasterImage {
    RasterImage::from_straight(1, 1, rgba.to_vec())
}

#[test]
fn grayscale_equalizes_channels() {
    let out = apply_filter(&one_pixel([200, 40, 90, 255]), &StyleFilter::Grayscale);
    let [r, g, b, a] = out.pixel(0, 0).unwrap();
    assert_eq!((r, a), (g, 255));
    assert_eq!(g, b);
}

#[test]
fn invert_flips_opaque_pixels() {
    let out = apply_filter(&one_pixel([0, 100, 255, 255]), &StyleFilter::Invert);
    assert_eq!(out.pixel(0, 0), Some([255, 155, 0, 255]));
}

#[test]
fn zero_strength_filters_are_identity() {
    let src = one_pixel([12, 34, 56, 255]);
    let sepia = apply_filter(&src, &StyleFilter::Sepia { amount: 0.0 });
    assert_eq!(sepia, src);
    let tint = apply_filter(
        &src,
        &StyleFilter::Tint {
            color: Color::rgb(0, 0, 255),
            strength: 0.0,
        },
    );
    assert_eq!(tint, src);
}

#[test]
fn full_tint_maps_white_to_the_tint_color() {
    let out = apply_filter(
        &one_pixel([255, 255, 255, 255]),
        &StyleFilter::Tint {
            color: Color::rgb(10, 60, 200),
            strength: 1.0,
        },
    );
    let [r, g, b, _] = out.pixel(0, 0).unwrap();
    assert!(r.abs_diff(10) <= 1 && g.abs_diff(60) <= 1 && b.abs_diff(200) <= 1);
}

#[test]
fn transparent_pixels_stay_transparent() {
    let out = apply_filter(&one_pixel([0, 0, 0, 0]), &StyleFilter::Invert);
    assert_eq!(out.pixel(0, 0).unwrap()[3], 0);
    assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 0]));
}
