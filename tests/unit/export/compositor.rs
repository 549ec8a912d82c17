use super::*;
use crate::export::request::Watermark;
use std::sync::Arc;

use crate::render::cpu::CpuSurface;
use crate::render::recording::{DrawCommand, RecordingSurface};
use crate::render::text::FontSet;
use crate::state::poster::{ExportSize, PosterState};
use crate::style::cache::StyleCacheOpts;
use crate::style::converter::StyleConverter;
use crate::style::registry::StyleRegistry;

fn state_at(width: u32, height: u32) -> PosterState {
    let mut s = PosterState::default();
    s.export.size = ExportSize::Pixels {
        width,
        height,
        pixel_ratio: 1.0,
    };
    s
}

fn plan_for(state: &PosterState, options: &ExportOptions) -> ComposePlan {
    let conv = StyleConverter::new(StyleRegistry::shared(), StyleCacheOpts::default());
    let resolved = conv
        .resolve(&state.style.map_style, &state.style.features)
        .unwrap();
    let (def, _) = conv.definition(&resolved.style_id).unwrap();
    let req = ExportRequest::snapshot(state).unwrap();
    plan_composition(&req, &resolved, def, options)
}

#[test]
fn base_canvas_plan_uses_table_values() {
    let plan = plan_for(&state_at(1200, 1600), &ExportOptions::default());
    assert_eq!(plan.layout.viewport, Rect::new(100.0, 100.0, 1100.0, 1100.0));
    assert_eq!((plan.map_request.width, plan.map_request.height), (1000, 1000));
    assert_eq!(plan.map_request.pixel_ratio, 1.0);
    let texts: Vec<&str> = plan.texts.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, ["Paris", "48.8566°N / 2.3522°E", "France"]);
}

#[test]
fn doubling_the_canvas_doubles_everything() {
    let base = plan_for(&state_at(1200, 1600), &ExportOptions::default());
    let big = plan_for(&state_at(2400, 3200), &ExportOptions::default());
    assert_eq!(big.layout.viewport, base.layout.viewport.scale_from_origin(2.0));
    assert_eq!(big.map_request.width, 2 * base.map_request.width);
    assert_eq!(big.map_request.pixel_ratio, 2.0);
    assert_eq!(big.map_request.zoom, base.map_request.zoom);
    for (a, b) in base.texts.iter().zip(&big.texts) {
        assert_eq!(b.baseline, 2.0 * a.baseline);
        assert_eq!(b.style.font_size, 2.0 * a.style.font_size);
        assert_eq!(b.style.letter_spacing, 2.0 * a.style.letter_spacing);
    }
}

#[test]
fn field_overrides_flow_into_text_styles() {
    let mut state = state_at(2400, 3200);
    state.text.city.size = crate::layout::SizeTier::L;
    state.text.city.letter_spacing = Some(10.0);
    state.style.font_color.use_custom = true;
    state.style.font_color.color = Some(Color::rgb(200, 10, 10));
    let plan = plan_for(&state, &ExportOptions::default());
    let city = plan.texts.iter().find(|t| t.slot == TextSlot::City).unwrap();
    assert_eq!(city.style.font_size, 112.0 * 2.0 * 1.25);
    assert_eq!(city.style.letter_spacing, 20.0);
    assert_eq!(city.style.color, Color::rgb(200, 10, 10));
    assert_eq!(city.style.font_family, "Playfair Display");
}

#[test]
fn compose_draws_background_then_clipped_map_then_text() {
    let plan = plan_for(&state_at(1200, 1600), &ExportOptions::default());
    let map = RasterImage::filled(1000, 1000, [0, 0, 0, 255]);
    let mut surface = RecordingSurface::new(1200, 1600);
    compose(&mut surface, &plan, Some(&map));

    let cmds = surface.commands();
    assert!(matches!(&cmds[0], DrawCommand::Fill { color, .. } if *color == plan.background));
    assert!(matches!(&cmds[1], DrawCommand::PushClip { .. }));
    assert!(
        matches!(&cmds[2], DrawCommand::Image { dest, width: 1000, .. } if *dest == plan.layout.viewport)
    );
    assert!(matches!(&cmds[3], DrawCommand::PopClip));
    assert_eq!(surface.clip_depth(), 0);
    assert_eq!(surface.texts().count(), 3);

    // Lines are centred on the canvas.
    let (text, transform, style) = surface.texts().next().unwrap();
    let width = text.chars().count() as f64 * (0.6 * style.font_size + style.letter_spacing);
    let x = transform.translation().x;
    assert!((x + width / 2.0 - 600.0).abs() < 1e-9);
}

#[test]
fn missing_map_fills_viewport_with_fallback() {
    let plan = plan_for(&state_at(1200, 1600), &ExportOptions::default());
    let mut surface = RecordingSurface::new(1200, 1600);
    compose(&mut surface, &plan, None);
    let filled = surface.commands().iter().any(|c| {
        matches!(c, DrawCommand::Fill { path, color }
            if *color == plan.map_fallback && path.bounding_box() == plan.layout.viewport)
    });
    assert!(filled);
    assert!(
        !surface
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::Image { .. }))
    );
}

#[test]
fn glow_is_drawn_behind_the_frame() {
    let mut state = state_at(1200, 1600);
    state.style.frame = FrameShape::Circle;
    state.style.glow.enabled = true;
    let plan = plan_for(&state, &ExportOptions::default());
    let glow = plan.glow.unwrap();
    assert_eq!(glow.radius, 40.0);

    let mut surface = RecordingSurface::new(1200, 1600);
    compose(&mut surface, &plan, None);
    let blur = surface
        .commands()
        .iter()
        .position(|c| matches!(c, DrawCommand::BlurredFill { .. }))
        .unwrap();
    let clip = surface
        .commands()
        .iter()
        .position(|c| matches!(c, DrawCommand::PushClip { .. }))
        .unwrap();
    assert!(blur < clip);
}

#[test]
fn dot_pin_follows_map_offset() {
    let mut state = state_at(1200, 1600);
    state.style.pin.enabled = true;
    state.style.pin.style = PinStyle::Dot;
    state.location.offset_x = 50.0;
    let plan = plan_for(&state, &ExportOptions::default());
    let pin = plan.pin.unwrap();
    assert_eq!(pin.at, Point::new(650.0, 600.0));
    assert_eq!(plan.map_request.offset, Vec2::new(50.0, 0.0));

    let mut surface = RecordingSurface::new(1200, 1600);
    compose(&mut surface, &plan, None);
    let dot = surface
        .commands()
        .iter()
        .rev()
        .find_map(|c| match c {
            DrawCommand::Fill { path, color } if *color == pin.color => Some(path.bounding_box()),
            _ => None,
        })
        .unwrap();
    assert!((dot.center().x - 650.0).abs() < 1e-6);
    assert!((dot.center().y - 600.0).abs() < 1e-6);
}

#[test]
fn watermark_tiles_the_canvas() {
    let options = ExportOptions {
        watermark: Some(Watermark::default()),
    };
    let plan = plan_for(&state_at(1200, 1600), &options);
    let mut surface = RecordingSurface::new(1200, 1600);
    compose(&mut surface, &plan, None);
    let marks: Vec<_> = surface
        .texts()
        .filter(|(text, _, _)| *text == "PREVIEW")
        .collect();
    assert!(marks.len() >= 4, "{}", marks.len());
    assert!(marks.iter().all(|(_, _, s)| s.color.a < 255));
    assert!(plan.font_families().contains(&"Montserrat".to_owned()));
}

#[test]
fn collapsed_watermark_spacing_keeps_one_line_between_repeats() {
    let options = ExportOptions {
        watermark: Some(Watermark {
            spacing: Some(-1000.0),
            ..Watermark::default()
        }),
    };
    let plan = plan_for(&state_at(600, 800), &options);
    let mut surface = RecordingSurface::new(600, 800);
    compose(&mut surface, &plan, None);
    let marks = surface
        .texts()
        .filter(|(text, _, _)| *text == "PREVIEW")
        .count();
    assert!(marks > 0);
    assert!(marks < 2_000, "{marks} watermark draws");
}

#[test]
fn blank_watermark_is_skipped() {
    let options = ExportOptions {
        watermark: Some(Watermark {
            text: "   ".into(),
            ..Watermark::default()
        }),
    };
    assert!(plan_for(&state_at(1200, 1600), &options).watermark.is_none());
}

#[test]
fn style_filter_and_hidden_layers_reach_the_plan() {
    let mut state = state_at(1200, 1600);
    state.style.map_style = "noir".into();
    let plan = plan_for(&state, &ExportOptions::default());
    assert_eq!(plan.filter, Some(StyleFilter::Grayscale));

    state.style.map_style = "blueprint2".into();
    let plan = plan_for(&state, &ExportOptions::default());
    assert!(
        plan.map_request
            .layers
            .iter()
            .all(|l| l.bucket != LayerBucket::Water)
    );
}

fn mono_fonts() -> FontSet {
    let bytes = Arc::new(std::fs::read("tests/data/fonts/DejaVuSansMono.ttf").unwrap());
    let mut set = FontSet::new();
    set.push("Montserrat", bytes.clone());
    set.push("Playfair Display", bytes);
    set
}

fn plain_state() -> PosterState {
    let mut s = state_at(600, 800);
    s.style.background.color = Some(Color::WHITE);
    s.style.glow.enabled = false;
    s.style.pin.enabled = false;
    s
}

/// Draws `state` with real glyphs and returns the city line's ink span `(x0, x1)`.
fn city_ink(state: &PosterState) -> (PlacedText, u32, u32) {
    let plan = plan_for(state, &ExportOptions::default());
    let mut surface = CpuSurface::new(plan.width, plan.height, mono_fonts()).unwrap();
    compose(&mut surface, &plan, None);
    let img = surface.finish().unwrap();

    let city = plan
        .texts
        .iter()
        .find(|t| t.slot == TextSlot::City)
        .unwrap()
        .clone();
    let top = (city.baseline - 0.9 * city.style.font_size).floor() as u32;
    let bottom = city.baseline.ceil() as u32 + 1;
    assert!(f64::from(top) > plan.layout.viewport.y1);

    let mut span: Option<(u32, u32)> = None;
    for y in top..bottom {
        for x in 0..img.width {
            if img.pixel(x, y) != Some([255, 255, 255, 255]) {
                span = Some(span.map_or((x, x), |(a, b)| (a.min(x), b.max(x))));
            }
        }
    }
    let (x0, x1) = span.unwrap();
    (city, x0, x1)
}

#[test]
fn city_line_is_drawn_centred_on_its_baseline() {
    let (city, x0, x1) = city_ink(&plain_state());
    assert_eq!(city.text, "Paris");
    let centre = f64::from(x0 + x1) / 2.0;
    // Trailing letter spacing shifts the ink left by half a spacing at most.
    assert!((centre - 300.0).abs() <= city.style.letter_spacing / 2.0 + 3.0, "{centre}");
    let expected = 5.0 * city.style.font_size * 1233.0 / 2048.0;
    assert!(f64::from(x1 - x0) < expected + 5.0 * city.style.letter_spacing);
}

#[test]
fn letter_spacing_override_widens_the_drawn_line() {
    let (_, x0, x1) = city_ink(&plain_state());
    let mut spaced = plain_state();
    spaced.text.city.letter_spacing = Some(80.0);
    let (city, sx0, sx1) = city_ink(&spaced);
    assert_eq!(city.style.letter_spacing, 40.0);
    assert!(sx1 - sx0 > x1 - x0 + 100, "{} vs {}", sx1 - sx0, x1 - x0);
}

#[test]
fn size_tier_scales_the_drawn_line() {
    let (_, x0, x1) = city_ink(&plain_state());
    let mut large = plain_state();
    large.text.city.size = crate::layout::SizeTier::L;
    let (city, lx0, lx1) = city_ink(&large);
    assert_eq!(city.style.font_size, 56.0 * 1.25);
    assert!(lx1 - lx0 > x1 - x0, "{} vs {}", lx1 - lx0, x1 - x0);
}
