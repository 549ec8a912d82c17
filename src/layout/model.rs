use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};

use crate::foundation::core::ScaleFactor;
use crate::frame::FrameShape;

/// Reference coordinate system every layout value is authored in.
pub const BASE_CANVAS: Size = Size::new(1200.0, 1600.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSlot {
    Headline,
    City,
    Coordinates,
    Country,
    Custom,
}

impl TextSlot {
    pub const ALL: [TextSlot; 5] = [
        TextSlot::Headline,
        TextSlot::City,
        TextSlot::Coordinates,
        TextSlot::Country,
        TextSlot::Custom,
    ];
}

/// Slots re-flow only within their own block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextBlock {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SizeTier {
    S,
    #[default]
    M,
    L,
}

impl SizeTier {
    pub fn factor(self) -> f64 {
        match self {
            SizeTier::S => 0.8,
            SizeTier::M => 1.0,
            SizeTier::L => 1.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextSlotSpec {
    pub slot: TextSlot,
    pub block: TextBlock,
    /// Alphabetic baseline, horizontally centred on the canvas.
    pub baseline: f64,
    pub font_size: f64,
    pub letter_spacing: f64,
}

const fn slot(
    slot: TextSlot,
    block: TextBlock,
    baseline: f64,
    font_size: f64,
    letter_spacing: f64,
) -> TextSlotSpec {
    TextSlotSpec {
        slot,
        block,
        baseline,
        font_size,
        letter_spacing,
    }
}

/// Geometry for one (frame shape, headline) combination in base-canvas units.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSpec {
    pub frame: FrameShape,
    pub has_headline: bool,
    pub viewport: Rect,
    /// Ordered top to bottom.
    pub text: Vec<TextSlotSpec>,
    pub pin_size: f64,
    pub glow_radius: f64,
    pub watermark_font_size: f64,
    pub watermark_spacing: f64,
}

struct BottomBlock {
    city: f64,
    coordinates: f64,
    country: f64,
    custom: f64,
    city_size: f64,
}

const fn bottom(baselines: [f64; 4], city_size: f64) -> BottomBlock {
    BottomBlock {
        city: baselines[0],
        coordinates: baselines[1],
        country: baselines[2],
        custom: baselines[3],
        city_size,
    }
}

/// Look up the layout for a frame shape and content mode.
pub fn layout_for(frame: FrameShape, has_headline: bool) -> LayoutSpec {
    use FrameShape::*;

    let (viewport, block) = match (frame, has_headline) {
        (Square, true) => (
            Rect::new(120.0, 240.0, 1080.0, 1200.0),
            bottom([1330.0, 1405.0, 1460.0, 1525.0], 104.0),
        ),
        (Square, false) => (
            Rect::new(100.0, 100.0, 1100.0, 1100.0),
            bottom([1260.0, 1340.0, 1400.0, 1470.0], 112.0),
        ),
        (Circle, true) => (
            Rect::new(150.0, 250.0, 1050.0, 1150.0),
            bottom([1310.0, 1385.0, 1440.0, 1505.0], 104.0),
        ),
        (Circle, false) => (
            Rect::new(125.0, 130.0, 1075.0, 1080.0),
            bottom([1240.0, 1320.0, 1380.0, 1450.0], 112.0),
        ),
        (Heart | House, true) => (
            Rect::new(100.0, 220.0, 1100.0, 1220.0),
            bottom([1335.0, 1408.0, 1462.0, 1527.0], 100.0),
        ),
        (Heart | House, false) => (
            Rect::new(100.0, 110.0, 1100.0, 1110.0),
            bottom([1255.0, 1335.0, 1395.0, 1465.0], 108.0),
        ),
    };

    let mut text = Vec::with_capacity(5);
    if has_headline {
        text.push(slot(TextSlot::Headline, TextBlock::Top, 170.0, 60.0, 12.0));
    }
    text.extend([
        slot(TextSlot::City, TextBlock::Bottom, block.city, block.city_size, 20.0),
        slot(TextSlot::Coordinates, TextBlock::Bottom, block.coordinates, 30.0, 6.0),
        slot(TextSlot::Country, TextBlock::Bottom, block.country, 34.0, 10.0),
        slot(TextSlot::Custom, TextBlock::Bottom, block.custom, 28.0, 4.0),
    ]);

    LayoutSpec {
        frame,
        has_headline,
        viewport,
        text,
        pin_size: 48.0,
        glow_radius: 40.0,
        watermark_font_size: 56.0,
        watermark_spacing: 360.0,
    }
}

impl LayoutSpec {
    /// Identifies the clip silhouette; the geometry itself comes from `frame::clip_path_for`.
    pub fn clip_geometry_id(&self) -> FrameShape {
        self.frame
    }

    pub fn slot(&self, slot: TextSlot) -> Option<&TextSlotSpec> {
        self.text.iter().find(|s| s.slot == slot)
    }

    /// Project every geometric field onto a `width x height` raster.
    pub fn scaled(&self, width: f64, height: f64) -> ScaledLayout {
        let scale = ScaleFactor::between(BASE_CANVAS, Size::new(width, height));
        ScaledLayout {
            scale,
            canvas: Size::new(width, height),
            frame: self.frame,
            viewport: scale.rect(self.viewport),
            text: self
                .text
                .iter()
                .map(|s| TextSlotSpec {
                    baseline: s.baseline * scale.sy,
                    font_size: scale.length(s.font_size),
                    letter_spacing: scale.length(s.letter_spacing),
                    ..*s
                })
                .collect(),
            pin_size: scale.length(self.pin_size),
            glow_radius: scale.length(self.glow_radius),
            watermark_font_size: scale.length(self.watermark_font_size),
            watermark_spacing: scale.length(self.watermark_spacing),
        }
    }
}

/// A [`LayoutSpec`] in target pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledLayout {
    pub scale: ScaleFactor,
    pub canvas: Size,
    pub frame: FrameShape,
    pub viewport: Rect,
    pub text: Vec<TextSlotSpec>,
    pub pin_size: f64,
    pub glow_radius: f64,
    pub watermark_font_size: f64,
    pub watermark_spacing: f64,
}

impl ScaledLayout {
    pub fn slot(&self, slot: TextSlot) -> Option<&TextSlotSpec> {
        self.text.iter().find(|s| s.slot == slot)
    }

    pub fn center_x(&self) -> f64 {
        self.canvas.width / 2.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/model.rs"]
mod tests;
