use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape, Vec2};

use crate::export::request::{ExportOptions, ExportRequest};
use crate::foundation::color::Color;
use crate::foundation::core::RasterImage;
use crate::frame::{ClipGeometry, FrameShape, clip_path_for};
use crate::layout::{ScaledLayout, TextSlot, layout_for};
use crate::provider::MapRenderRequest;
use crate::render::filter::apply_filter;
use crate::render::surface::{RenderSurface, TextStyle};
use crate::state::poster::PinStyle;
use crate::style::converter::ResolvedStyle;
use crate::style::definition::{StyleDefinition, StyleFilter};
use crate::style::layers::LayerBucket;

const TOLERANCE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub slot: TextSlot,
    pub text: String,
    pub style: TextStyle,
    /// Baseline y in output pixels; lines are centred horizontally on the canvas.
    pub baseline: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowPlan {
    pub color: Color,
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinPlan {
    pub style: PinStyle,
    pub color: Color,
    /// The marked location in output pixels.
    pub at: Point,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkPlan {
    pub text: String,
    pub style: TextStyle,
    /// Radians, counter-clockwise on screen.
    pub angle: f64,
    pub spacing: f64,
}

/// Everything `compose` draws, resolved to output pixels.
///
/// Planning is pure; the only input `compose` still needs is the map image.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposePlan {
    pub width: u32,
    pub height: u32,
    pub layout: ScaledLayout,
    pub clip: ClipGeometry,
    pub background: Color,
    /// Viewport fill when no map image arrived.
    pub map_fallback: Color,
    pub filter: Option<StyleFilter>,
    pub glow: Option<GlowPlan>,
    pub texts: Vec<PlacedText>,
    pub pin: Option<PinPlan>,
    pub watermark: Option<WatermarkPlan>,
    pub map_request: MapRenderRequest,
}

impl ComposePlan {
    /// Font families the plan draws with, first use first.
    pub fn font_families(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let styles = self
            .texts
            .iter()
            .map(|t| &t.style)
            .chain(self.watermark.iter().map(|w| &w.style));
        for style in styles {
            if !out.contains(&style.font_family) {
                out.push(style.font_family.clone());
            }
        }
        out
    }
}

/// Resolve layout, colours, and effects for one export.
pub fn plan_composition(
    request: &ExportRequest,
    style: &ResolvedStyle,
    definition: &StyleDefinition,
    options: &ExportOptions,
) -> ComposePlan {
    let state = &request.state;
    let (width, height) = request.output_size();
    let frame = state.style.frame;

    let layout = layout_for(frame, state.has_headline())
        .reflowed(|slot| state.display_text(slot).is_some())
        .scaled(f64::from(width), f64::from(height));
    let scale = layout.scale;
    let viewport = layout.viewport;

    let clip = clip_path_for(frame, viewport.width(), viewport.height()).placed_in(viewport);

    let map_background = style
        .layer(LayerBucket::Background)
        .map(|l| l.color)
        .unwrap_or(definition.background);
    let map_fallback = style
        .layer(LayerBucket::Water)
        .map(|l| l.color)
        .unwrap_or(map_background);

    let background = state.style.background.color.unwrap_or(definition.background);
    let font_color = &state.style.font_color;
    let text_color = match (font_color.use_custom, font_color.color) {
        (true, Some(c)) => c,
        _ => definition.text,
    };

    let texts = layout
        .text
        .iter()
        .filter_map(|spec| {
            let text = state.display_text(spec.slot)?;
            let field = state.text.field(spec.slot);
            let letter_spacing = field
                .letter_spacing
                .map(|v| scale.length(v))
                .unwrap_or(spec.letter_spacing);
            Some(PlacedText {
                slot: spec.slot,
                text,
                style: TextStyle {
                    font_family: state.text.font_for(spec.slot).to_owned(),
                    font_size: spec.font_size * field.size.factor(),
                    letter_spacing,
                    color: text_color,
                },
                baseline: spec.baseline,
            })
        })
        .collect();

    let glow_settings = &state.style.glow;
    let glow = glow_settings.enabled.then(|| {
        let intensity = glow_settings.intensity.clamp(0.0, 1.0);
        GlowPlan {
            color: glow_settings
                .color
                .unwrap_or(text_color)
                .with_opacity(intensity as f32),
            radius: layout.glow_radius * (0.5 + intensity),
        }
    });

    let loc = &state.location;
    let offset = Vec2::new(loc.offset_x * scale.sx, loc.offset_y * scale.sy);

    let pin_settings = &state.style.pin;
    let pin = pin_settings.enabled.then(|| PinPlan {
        style: pin_settings.style,
        color: pin_settings.color.unwrap_or(text_color),
        at: viewport.center() + offset,
        size: layout.pin_size * pin_settings.size.max(0.0),
    });

    let watermark = options
        .watermark
        .as_ref()
        .filter(|w| !w.text.trim().is_empty())
        .map(|w| WatermarkPlan {
            text: w.text.clone(),
            style: TextStyle {
                font_family: state.text.typography.body_font.clone(),
                font_size: layout.watermark_font_size,
                letter_spacing: 0.0,
                color: text_color.with_opacity(w.opacity.clamp(0.0, 1.0)),
            },
            angle: w.angle.to_radians(),
            spacing: w
                .spacing
                .map(|s| scale.length(s))
                .unwrap_or(layout.watermark_spacing),
        });

    let map_request = MapRenderRequest {
        lat: loc.lat,
        lng: loc.lng,
        zoom: loc.zoom,
        width: (viewport.width().round() as u32).max(1),
        height: (viewport.height().round() as u32).max(1),
        pixel_ratio: scale.sy,
        offset,
        layers: style.layers.clone(),
        background: map_background,
    };

    ComposePlan {
        width,
        height,
        layout,
        clip,
        background,
        map_fallback,
        filter: definition.filter,
        glow,
        texts,
        pin,
        watermark,
        map_request,
    }
}

/// Draw a planned poster. Synchronous; every asset must already be at hand.
#[tracing::instrument(skip_all, fields(w = plan.width, h = plan.height, map = map.is_some()))]
pub fn compose(surface: &mut dyn RenderSurface, plan: &ComposePlan, map: Option<&RasterImage>) {
    let canvas = Rect::new(0.0, 0.0, f64::from(plan.width), f64::from(plan.height));
    surface.fill_path(&canvas.to_path(TOLERANCE), plan.background);

    let frame = plan.clip.to_path();
    if let Some(glow) = plan.glow {
        surface.fill_path_blurred(&frame, glow.color, glow.radius);
    }

    surface.push_clip(&frame);
    match map {
        Some(image) => {
            let filtered;
            let image = match &plan.filter {
                Some(filter) => {
                    filtered = apply_filter(image, filter);
                    &filtered
                }
                None => image,
            };
            surface.draw_image(image, plan.layout.viewport);
        }
        None => surface.fill_path(&plan.layout.viewport.to_path(TOLERANCE), plan.map_fallback),
    }
    surface.pop_clip();

    if let Some(pin) = &plan.pin {
        draw_pin(surface, pin);
    }

    let center_x = plan.layout.center_x();
    for t in &plan.texts {
        let metrics = surface.measure_text(&t.text, &t.style);
        let x = center_x - metrics.width / 2.0;
        surface.draw_text(&t.text, Affine::translate((x, t.baseline)), &t.style);
    }

    if let Some(wm) = &plan.watermark {
        draw_watermark(surface, wm, canvas);
    }
}

fn draw_pin(surface: &mut dyn RenderSurface, pin: &PinPlan) {
    if pin.size <= 0.0 {
        return;
    }
    let s = pin.size;
    let Point { x, y } = pin.at;
    match pin.style {
        PinStyle::Classic => {
            let r = s * 0.35;
            let head = Point::new(x, y - s + r);
            let mut tail = BezPath::new();
            tail.move_to((x - r * 0.8, head.y + r * 0.6));
            tail.line_to((x + r * 0.8, head.y + r * 0.6));
            tail.line_to((x, y));
            tail.close_path();
            surface.fill_path(&tail, pin.color);
            surface.fill_path(&Circle::new(head, r).to_path(TOLERANCE), pin.color);
            surface.fill_path(&Circle::new(head, r * 0.4).to_path(TOLERANCE), Color::WHITE);
        }
        PinStyle::Dot => {
            surface.fill_path(&Circle::new(pin.at, s * 0.3).to_path(TOLERANCE), Color::WHITE);
            surface.fill_path(&Circle::new(pin.at, s * 0.22).to_path(TOLERANCE), pin.color);
        }
        PinStyle::Heart => {
            // Tip of the heart sits on the location.
            let heart = clip_path_for(FrameShape::Heart, s, s)
                .translated(Vec2::new(x - s / 2.0, y - s))
                .to_path();
            surface.fill_path(&heart, pin.color);
        }
    }
}

/// Staggered rows of rotated text covering the whole canvas.
fn draw_watermark(surface: &mut dyn RenderSurface, wm: &WatermarkPlan, canvas: Rect) {
    let metrics = surface.measure_text(&wm.text, &wm.style);
    // Repeats never sit closer than one line of watermark text.
    let gap = wm.spacing.max(wm.style.font_size).max(1.0);
    if !gap.is_finite() || !wm.angle.is_finite() {
        tracing::warn!(spacing = wm.spacing, angle = wm.angle, "skipping malformed watermark");
        return;
    }
    let step_y = gap;
    let step_x = metrics.width + gap;
    let center = canvas.center();
    let half = canvas.width().hypot(canvas.height()) / 2.0;
    let rotate = Affine::rotate_about(-wm.angle, center);

    let rows = (2.0 * half / step_y).ceil() as i64;
    let cols = (2.0 * half / step_x).ceil() as i64 + 1;
    for row in 0..=rows {
        let y = center.y - half + row as f64 * step_y;
        let stagger = if row % 2 == 1 { step_x / 2.0 } else { 0.0 };
        for col in 0..=cols {
            let x = center.x - half - stagger + col as f64 * step_x;
            let anchor = rotate * Point::new(x + metrics.width / 2.0, y);
            if !canvas.inflate(step_x, step_y).contains(anchor) {
                continue;
            }
            surface.draw_text(&wm.text, rotate * Affine::translate((x, y)), &wm.style);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/compositor.rs"]
mod tests;
