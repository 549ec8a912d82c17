//! Collaborators the exporter waits on: map imagery and fonts.

pub mod fonts;
#[cfg(feature = "http-tiles")]
pub mod http;
pub mod mercator;
pub mod retry;
pub mod tiles;
pub mod vector;

use std::sync::Arc;

use async_trait::async_trait;
use kurbo::Vec2;

use crate::foundation::color::Color;
use crate::foundation::core::RasterImage;
use crate::foundation::error::PosterResult;
use crate::render::text::FontSet;
use crate::style::layers::RenderLayer;

pub use fonts::{DirFontProvider, StaticFontProvider};
#[cfg(feature = "http-tiles")]
pub use http::HttpTileSource;
pub use retry::RetryPolicy;
pub use tiles::{DirTileSource, TileMapProvider, TileSource, UrlTemplate};
pub use vector::{FeatureSource, GeoJsonSource, VectorMapProvider};

/// What the compositor needs drawn into the map viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct MapRenderRequest {
    pub lat: f64,
    pub lng: f64,
    /// Zoom as seen in the preview; resolution changes go through `pixel_ratio`.
    pub zoom: f64,
    pub width: u32,
    pub height: u32,
    /// Output pixels per preview pixel.
    pub pixel_ratio: f64,
    /// Pan of the map centre in output pixels.
    pub offset: Vec2,
    pub layers: Arc<[RenderLayer]>,
    /// Fill for areas without data.
    pub background: Color,
}

/// Source of rendered map imagery.
///
/// `render` resolves once the image is complete; the caller bounds it with a timeout.
#[async_trait]
pub trait MapImageProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Fails with a configuration error when required settings (e.g. an API key) are
    /// missing. Called before any asset is requested.
    fn check_config(&self) -> PosterResult<()> {
        Ok(())
    }

    /// True when `render` already retries transient failures; callers then invoke it
    /// once instead of wrapping it in a retry policy of their own.
    fn retries_internally(&self) -> bool {
        false
    }

    async fn render(&self, request: &MapRenderRequest) -> PosterResult<RasterImage>;
}

/// Makes font families available for layout. Best effort: whatever could not be
/// loaded is simply absent from the returned set.
#[async_trait]
pub trait FontProvider: Send + Sync {
    async fn ensure_loaded(&self, families: &[String]) -> FontSet;
}
