use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::frame::FrameShape;
use crate::layout::{SizeTier, TextSlot};
use crate::style::definition::FeatureToggles;
use crate::style::registry::DEFAULT_STYLE_ID;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosterState {
    pub version: u32,
    pub location: Location,
    #[serde(default)]
    pub text: TextContent,
    #[serde(default)]
    pub style: PosterStyle,
    #[serde(default)]
    pub export: ExportSettings,
}

impl Default for PosterState {
    fn default() -> Self {
        Self {
            version: crate::state::migrate::CURRENT_VERSION,
            location: Location::default(),
            text: TextContent::default(),
            style: PosterStyle::default(),
            export: ExportSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub city: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub country: String,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    /// Pan of the map centre in viewport pixels at the base canvas size.
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
}

fn default_zoom() -> f64 {
    12.0
}

impl Default for Location {
    fn default() -> Self {
        Self {
            city: "Paris".to_owned(),
            lat: 48.8566,
            lng: 2.3522,
            country: "France".to_owned(),
            zoom: default_zoom(),
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextField {
    pub text: String,
    pub visible: bool,
    /// Overrides the typography default for this field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    pub size: SizeTier,
    /// Base-canvas pixels; absent means the layout's default tracking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
}

impl Default for TextField {
    fn default() -> Self {
        Self {
            text: String::new(),
            visible: true,
            font: None,
            size: SizeTier::M,
            letter_spacing: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Typography {
    pub title_font: String,
    pub body_font: String,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            title_font: "Playfair Display".to_owned(),
            body_font: "Montserrat".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextContent {
    pub headline: TextField,
    pub city: TextField,
    pub coordinates: TextField,
    pub country: TextField,
    pub custom: TextField,
    pub typography: Typography,
}

impl Default for TextContent {
    fn default() -> Self {
        Self {
            headline: TextField {
                visible: false,
                ..TextField::default()
            },
            city: TextField::default(),
            coordinates: TextField::default(),
            country: TextField::default(),
            custom: TextField {
                visible: false,
                ..TextField::default()
            },
            typography: Typography::default(),
        }
    }
}

impl TextContent {
    pub fn field(&self, slot: TextSlot) -> &TextField {
        match slot {
            TextSlot::Headline => &self.headline,
            TextSlot::City => &self.city,
            TextSlot::Coordinates => &self.coordinates,
            TextSlot::Country => &self.country,
            TextSlot::Custom => &self.custom,
        }
    }

    /// Font family a slot renders with.
    pub fn font_for(&self, slot: TextSlot) -> &str {
        if let Some(font) = self.field(slot).font.as_deref() {
            return font;
        }
        match slot {
            TextSlot::Headline | TextSlot::City => &self.typography.title_font,
            _ => &self.typography.body_font,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlowSettings {
    pub enabled: bool,
    /// Absent means the style's text colour.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// `0..=1`.
    pub intensity: f64,
}

impl Default for GlowSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            color: None,
            intensity: 0.5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackgroundSettings {
    /// Absent means the style's recommended background.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinStyle {
    #[default]
    Classic,
    Dot,
    Heart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PinSettings {
    pub enabled: bool,
    pub style: PinStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Multiplier on the layout's pin size.
    pub size: f64,
}

impl Default for PinSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            style: PinStyle::Classic,
            color: None,
            size: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FontColor {
    pub use_custom: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PosterStyle {
    pub map_style: String,
    pub frame: FrameShape,
    pub glow: GlowSettings,
    pub background: BackgroundSettings,
    pub features: FeatureToggles,
    pub pin: PinSettings,
    pub font_color: FontColor,
}

impl Default for PosterStyle {
    fn default() -> Self {
        Self {
            map_style: DEFAULT_STYLE_ID.to_owned(),
            frame: FrameShape::Square,
            glow: GlowSettings::default(),
            background: BackgroundSettings::default(),
            features: FeatureToggles::default(),
            pin: PinSettings::default(),
            font_color: FontColor::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpg,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpg => "jpg",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpg => "image/jpeg",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

/// Print sizes at 300 DPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaperPreset {
    #[serde(rename = "a4")]
    A4,
    #[serde(rename = "a3")]
    A3,
    #[serde(rename = "a2")]
    A2,
    #[serde(rename = "30x40")]
    Cm30x40,
    #[serde(rename = "50x70")]
    Cm50x70,
}

impl PaperPreset {
    pub fn pixels(self) -> (u32, u32) {
        match self {
            PaperPreset::A4 => (2480, 3508),
            PaperPreset::A3 => (3508, 4961),
            PaperPreset::A2 => (4961, 7016),
            PaperPreset::Cm30x40 => (3543, 4724),
            PaperPreset::Cm50x70 => (5906, 8268),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExportSize {
    Preset(PaperPreset),
    #[serde(rename_all = "camelCase")]
    Pixels {
        width: u32,
        height: u32,
        #[serde(default = "unit_ratio")]
        pixel_ratio: f64,
    },
}

fn unit_ratio() -> f64 {
    1.0
}

impl Default for ExportSize {
    fn default() -> Self {
        ExportSize::Preset(PaperPreset::A4)
    }
}

impl ExportSize {
    /// Target dimensions before the pixel-ratio multiplier.
    pub fn target(self) -> (u32, u32) {
        match self {
            ExportSize::Preset(p) => p.pixels(),
            ExportSize::Pixels { width, height, .. } => (width, height),
        }
    }

    pub fn pixel_ratio(self) -> f64 {
        match self {
            ExportSize::Preset(_) => 1.0,
            ExportSize::Pixels { pixel_ratio, .. } => pixel_ratio,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportSettings {
    pub format: ExportFormat,
    pub size: ExportSize,
    /// `0..=1`; only JPEG (and JPEG inside PDF) uses it.
    pub quality: f64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            size: ExportSize::default(),
            quality: 0.92,
        }
    }
}

impl PosterState {
    /// Text a slot should show, or `None` when hidden or empty.
    ///
    /// City, coordinates and country fall back to values derived from the location.
    pub fn display_text(&self, slot: TextSlot) -> Option<String> {
        let field = self.text.field(slot);
        if !field.visible {
            return None;
        }
        let text = field.text.trim();
        let text = if !text.is_empty() {
            text.to_owned()
        } else {
            match slot {
                TextSlot::City => self.location.city.trim().to_owned(),
                TextSlot::Country => self.location.country.trim().to_owned(),
                TextSlot::Coordinates => format_coordinates(self.location.lat, self.location.lng),
                TextSlot::Headline | TextSlot::Custom => String::new(),
            }
        };
        (!text.is_empty()).then_some(text)
    }

    pub fn has_headline(&self) -> bool {
        self.display_text(TextSlot::Headline).is_some()
    }

    /// Distinct font families referenced by visible text, in slot order.
    pub fn font_families(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for slot in TextSlot::ALL {
            if self.display_text(slot).is_none() {
                continue;
            }
            let family = self.text.font_for(slot);
            if !out.iter().any(|f| f == family) {
                out.push(family.to_owned());
            }
        }
        out
    }
}

/// `48.8566°N / 2.3522°E`
pub fn format_coordinates(lat: f64, lng: f64) -> String {
    let ns = if lat < 0.0 { 'S' } else { 'N' };
    let ew = if lng < 0.0 { 'W' } else { 'E' };
    format!("{:.4}°{ns} / {:.4}°{ew}", lat.abs(), lng.abs())
}

#[cfg(test)]
#[path = "../../tests/unit/state/poster.rs"]
mod tests;
