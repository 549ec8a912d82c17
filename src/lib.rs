#![forbid(unsafe_code)]
//! Map poster style resolution and WYSIWYG export.
//!
//! A [`PosterState`] snapshot is resolved against the built-in style registry, laid
//! out on a 1200x1600 base canvas, scaled to the export size, composited over a map
//! image from a [`MapImageProvider`], and encoded as PNG, JPEG, or PDF.

pub mod export;
pub mod foundation;
pub mod frame;
pub mod layout;
pub mod provider;
pub mod render;
pub mod scheduler;
pub mod state;
pub mod style;

pub use export::{
    EngineConfig, ExportEngine, ExportOptions, ExportPhase, ExportReport, ExportRequest,
    ProviderConfig, RenderedAsset, Watermark,
};
pub use foundation::color::Color;
pub use foundation::core::{RasterImage, ScaleFactor};
pub use foundation::error::{PosterError, PosterResult};
pub use frame::{ClipGeometry, FrameShape, clip_path_for};
pub use layout::{BASE_CANVAS, LayoutSpec, ScaledLayout, SizeTier, TextSlot, layout_for};
pub use provider::{FontProvider, MapImageProvider, MapRenderRequest};
pub use render::{CpuSurface, FontSet, RecordingSurface, RenderSurface};
pub use scheduler::{Delivery, GenerationToken, RenderOutcome, RenderScheduler};
pub use state::{PosterState, export_file_name};
pub use style::converter::{ResolvedStyle, StyleConverter};
pub use style::definition::{FeatureToggleSet, FeatureToggles, StyleDefinition};
pub use style::layers::{LayerBucket, RenderLayer};
pub use style::registry::{DEFAULT_STYLE_ID, StyleRegistry};
