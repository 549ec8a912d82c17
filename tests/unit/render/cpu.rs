use super::*;

fn rect_path(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
    Rect::new(x0, y0, x1, y1).to_path(0.1)
}

#[test]
fn fill_path_paints_interior_pixels() {
    let mut s = CpuSurface::new(16, 16, FontSet::new()).unwrap();
    s.fill_path(&rect_path(0.0, 0.0, 8.0, 16.0), Color::rgb(255, 0, 0));
    let img = s.finish().unwrap();
    assert_eq!((img.width, img.height), (16, 16));
    assert_eq!(img.pixel(2, 5), Some([255, 0, 0, 255]));
    assert_eq!(img.pixel(12, 5), Some([0, 0, 0, 0]));
}

#[test]
fn clip_restricts_drawing() {
    let mut s = CpuSurface::new(16, 16, FontSet::new()).unwrap();
    s.push_clip(&rect_path(0.0, 0.0, 16.0, 8.0));
    s.fill_path(&rect_path(0.0, 0.0, 16.0, 16.0), Color::rgb(0, 0, 255));
    s.pop_clip();
    let img = s.finish().unwrap();
    assert_eq!(img.pixel(4, 2), Some([0, 0, 255, 255]));
    assert_eq!(img.pixel(4, 12), Some([0, 0, 0, 0]));
}

#[test]
fn draw_image_stretches_into_destination() {
    let src = RasterImage::filled(2, 2, [0, 255, 0, 255]);
    let mut s = CpuSurface::new(20, 20, FontSet::new()).unwrap();
    s.draw_image(&src, Rect::new(0.0, 0.0, 10.0, 20.0));
    let img = s.finish().unwrap();
    assert_eq!(img.pixel(5, 10), Some([0, 255, 0, 255]));
    assert_eq!(img.pixel(15, 10), Some([0, 0, 0, 0]));
}

fn style(family: &str, size: f64) -> TextStyle {
    TextStyle {
        font_family: family.to_string(),
        font_size: size,
        letter_spacing: 0.0,
        color: Color::BLACK,
    }
}

fn mono_set(family: &str) -> FontSet {
    let mut set = FontSet::new();
    set.push(
        family,
        Arc::new(std::fs::read("tests/data/fonts/DejaVuSansMono.ttf").unwrap()),
    );
    set
}

/// Bounding box of pixels with any coverage: (x0, y0, x1, y1) inclusive.
fn ink_bounds(img: &RasterImage) -> Option<(u32, u32, u32, u32)> {
    let mut out: Option<(u32, u32, u32, u32)> = None;
    for y in 0..img.height {
        for x in 0..img.width {
            if img.pixel(x, y).unwrap()[3] == 0 {
                continue;
            }
            out = Some(match out {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
    }
    out
}

#[test]
fn text_without_fonts_uses_the_bundled_face() {
    let mut s = CpuSurface::new(96, 32, FontSet::new()).unwrap();
    let style = style("Inter", 16.0);
    assert!(s.measure_text("Paris", &style).width > 0.0);
    s.draw_text("Paris", Affine::translate((2.0, 24.0)), &style);
    let img = s.finish().unwrap();
    assert!(ink_bounds(&img).is_some());
}

#[test]
fn unparseable_font_falls_back_to_the_bundled_face() {
    let mut fonts = FontSet::new();
    fonts.push("Inter", Arc::new(vec![0u8; 16]));
    let mut s = CpuSurface::new(96, 32, fonts).unwrap();
    s.draw_text("Paris", Affine::translate((2.0, 24.0)), &style("Inter", 16.0));
    assert!(ink_bounds(&s.finish().unwrap()).is_some());
}

#[test]
fn draw_text_sits_on_the_baseline() {
    let mut s = CpuSurface::new(120, 80, mono_set("Mono")).unwrap();
    let style = style("Mono", 40.0);
    let m = s.measure_text("HH", &style);
    assert!((m.width - 2.0 * 40.0 * 1233.0 / 2048.0).abs() < 1.0, "{}", m.width);
    assert!(m.ascent > 0.0 && m.descent > 0.0);

    s.draw_text("HH", Affine::translate((10.0, 60.0)), &style);
    let (x0, y0, x1, y1) = ink_bounds(&s.finish().unwrap()).unwrap();
    // Cap height is 0.729 em; `H` has no descender.
    assert!((57..=60).contains(&y1), "bottom {y1}");
    assert!((28..=34).contains(&y0), "top {y0}");
    assert!(x0 >= 10 && x0 < 20, "left {x0}");
    assert!(x1 < 10 + m.width.ceil() as u32, "right {x1}");
}

#[test]
fn blurred_fill_bleeds_past_the_edge() {
    let mut s = CpuSurface::new(64, 64, FontSet::new()).unwrap();
    s.fill_path_blurred(&rect_path(24.0, 24.0, 40.0, 40.0), Color::WHITE, 6.0);
    let img = s.finish().unwrap();
    let alpha = |x, y| img.pixel(x, y).unwrap()[3];
    assert!(alpha(32, 32) > 200, "centre {}", alpha(32, 32));
    assert!(alpha(20, 32) > 0, "halo missing");
    assert!(alpha(20, 32) < alpha(32, 32));
    assert_eq!(alpha(0, 0), 0);
}

#[test]
fn rejects_degenerate_and_oversized_surfaces() {
    assert!(CpuSurface::new(0, 10, FontSet::new()).is_err());
    assert!(CpuSurface::new(70_000, 10, FontSet::new()).is_err());
}

#[test]
fn unbalanced_pop_is_ignored() {
    let mut s = CpuSurface::new(4, 4, FontSet::new()).unwrap();
    s.pop_clip();
    s.push_clip(&rect_path(0.0, 0.0, 2.0, 2.0));
    // finish closes the open clip.
    assert!(s.finish().is_ok());
}
