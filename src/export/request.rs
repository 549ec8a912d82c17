use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{PosterError, PosterResult};
use crate::state::poster::{ExportFormat, PosterState};

/// Largest edge the CPU surface can rasterize.
pub const MAX_EDGE_PX: u32 = u16::MAX as u32;

/// Immutable snapshot of everything one export needs.
///
/// The poster state is cloned at construction; later edits to the caller's state are
/// never observed by the render.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub format: ExportFormat,
    /// Target size before the pixel-ratio multiplier.
    pub target_width: u32,
    pub target_height: u32,
    pub pixel_ratio: f64,
    pub quality: f64,
    pub state: Arc<PosterState>,
}

impl ExportRequest {
    /// Snapshot `state` using its own export settings.
    pub fn snapshot(state: &PosterState) -> PosterResult<Self> {
        let (target_width, target_height) = state.export.size.target();
        let req = Self {
            format: state.export.format,
            target_width,
            target_height,
            pixel_ratio: state.export.size.pixel_ratio(),
            quality: state.export.quality,
            state: Arc::new(state.clone()),
        };
        req.validate()?;
        Ok(req)
    }

    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    pub fn validate(&self) -> PosterResult<()> {
        if !(self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0) {
            return Err(PosterError::validation(format!(
                "pixel ratio must be positive, got {}",
                self.pixel_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(PosterError::validation(format!(
                "quality must be within 0..=1, got {}",
                self.quality
            )));
        }
        let (w, h) = self.output_size();
        if w == 0 || h == 0 || self.target_width == 0 || self.target_height == 0 {
            return Err(PosterError::validation("export size must be non-zero"));
        }
        if w > MAX_EDGE_PX || h > MAX_EDGE_PX {
            return Err(PosterError::validation(format!(
                "export size {w}x{h} exceeds {MAX_EDGE_PX}px"
            )));
        }
        let loc = &self.state.location;
        if !(loc.lat.is_finite() && loc.lng.is_finite() && loc.zoom.is_finite()) {
            return Err(PosterError::validation("location must be finite"));
        }
        Ok(())
    }

    /// Pixel size of the produced raster.
    pub fn output_size(&self) -> (u32, u32) {
        let scale = |v: u32| (f64::from(v) * self.pixel_ratio).round().max(0.0) as u32;
        (scale(self.target_width), scale(self.target_height))
    }
}

/// Repeated diagonal text laid over the finished poster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Watermark {
    pub text: String,
    pub opacity: f32,
    /// Degrees, counter-clockwise.
    pub angle: f64,
    /// Base-canvas pixels between repeats; absent uses the layout default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f64>,
}

impl Default for Watermark {
    fn default() -> Self {
        Self {
            text: "PREVIEW".to_owned(),
            opacity: 0.15,
            angle: 30.0,
            spacing: None,
        }
    }
}

impl Watermark {
    pub fn validate(&self) -> PosterResult<()> {
        if !(self.opacity.is_finite() && self.angle.is_finite()) {
            return Err(PosterError::validation(
                "watermark opacity and angle must be finite",
            ));
        }
        if let Some(spacing) = self.spacing
            && !(spacing.is_finite() && spacing > 0.0)
        {
            return Err(PosterError::validation(format!(
                "watermark spacing must be positive, got {spacing}"
            )));
        }
        Ok(())
    }
}

/// Per-export knobs that are not part of the poster design.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark: Option<Watermark>,
}

impl ExportOptions {
    pub fn validate(&self) -> PosterResult<()> {
        match &self.watermark {
            Some(w) => w.validate(),
            None => Ok(()),
        }
    }
}

/// Encoded export output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAsset {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
#[path = "../../tests/unit/export/request.rs"]
mod tests;
