//! Snapshot, composite, and encode a poster.

pub mod compositor;
pub mod config;
pub mod encode;
pub mod engine;
pub mod phase;
pub mod request;

pub use compositor::{ComposePlan, compose, plan_composition};
pub use config::{EngineConfig, ProviderConfig};
pub use engine::{AssetKind, Degraded, ExportEngine, ExportReport};
pub use phase::{ExportPhase, PhaseTracker};
pub use request::{ExportOptions, ExportRequest, RenderedAsset, Watermark};
