use std::fmt;
use std::sync::Arc;

use crate::export::compositor::{ComposePlan, compose, plan_composition};
use crate::export::config::EngineConfig;
use crate::export::encode::encode;
use crate::export::phase::{ExportPhase, PhaseTracker};
use crate::export::request::{ExportOptions, ExportRequest, RenderedAsset};
use crate::foundation::core::RasterImage;
use crate::foundation::error::{PosterError, PosterResult};
use crate::provider::{FontProvider, MapImageProvider, RetryPolicy};
use crate::render::cpu::CpuSurface;
use crate::render::text::{FALLBACK_FAMILY, FontSet};
use crate::scheduler::GenerationToken;
use crate::state::poster::PosterState;
use crate::style::converter::{ResolvedStyle, StyleConverter};
use crate::style::registry::StyleRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Map,
    Fonts,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetKind::Map => "map",
            AssetKind::Fonts => "fonts",
        })
    }
}

/// An asset the export went ahead without.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Degraded {
    pub asset: AssetKind,
    pub reason: String,
}

/// Result of a completed export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub asset: RenderedAsset,
    /// Every phase visited, starting at `Idle`.
    pub phases: Vec<ExportPhase>,
    pub degraded: Vec<Degraded>,
    /// Style actually rendered; differs from the requested one after a fallback.
    pub style_id: String,
}

/// Turns poster snapshots into encoded assets.
///
/// Owns its style cache; map imagery and fonts come from the injected providers.
pub struct ExportEngine {
    config: EngineConfig,
    converter: StyleConverter,
    map: Arc<dyn MapImageProvider>,
    fonts: Arc<dyn FontProvider>,
}

impl ExportEngine {
    pub fn new(
        config: EngineConfig,
        map: Arc<dyn MapImageProvider>,
        fonts: Arc<dyn FontProvider>,
    ) -> Self {
        let converter = StyleConverter::new(StyleRegistry::shared(), config.cache_opts())
            .with_default_style(config.default_style.clone());
        Self {
            config,
            converter,
            map,
            fonts,
        }
    }

    /// Swap in a converter, e.g. one over a custom registry or a manual clock.
    pub fn with_converter(mut self, converter: StyleConverter) -> Self {
        self.converter = converter;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn converter(&self) -> &StyleConverter {
        &self.converter
    }

    /// Export `state` with its own export settings.
    pub async fn export(
        &self,
        state: &PosterState,
        options: &ExportOptions,
    ) -> PosterResult<ExportReport> {
        let request = ExportRequest::snapshot(state)?;
        self.run(request, options, &GenerationToken::detached())
            .await
    }

    /// Run one export, abandoning it at the next checkpoint once `token` goes stale.
    #[tracing::instrument(
        skip_all,
        fields(style = %request.state.style.map_style, w = request.target_width, h = request.target_height, generation = token.generation())
    )]
    pub async fn run(
        &self,
        request: ExportRequest,
        options: &ExportOptions,
        token: &GenerationToken,
    ) -> PosterResult<ExportReport> {
        let mut phases = PhaseTracker::new();
        match self.run_phases(&request, options, token, &mut phases).await {
            Ok((asset, degraded, style_id)) => {
                tracing::info!(
                    bytes = asset.bytes.len(),
                    width = asset.width,
                    height = asset.height,
                    degraded = degraded.len(),
                    "export done"
                );
                Ok(ExportReport {
                    asset,
                    phases: phases.into_trail(),
                    degraded,
                    style_id,
                })
            }
            Err(err) => {
                phases.fail();
                match &err {
                    PosterError::Superseded(_) => tracing::debug!(%err, "export abandoned"),
                    _ => tracing::warn!(%err, trail = ?phases.trail(), "export failed"),
                }
                Err(err)
            }
        }
    }

    async fn run_phases(
        &self,
        request: &ExportRequest,
        options: &ExportOptions,
        token: &GenerationToken,
        phases: &mut PhaseTracker,
    ) -> PosterResult<(RenderedAsset, Vec<Degraded>, String)> {
        phases.advance(ExportPhase::Preparing)?;
        request.validate()?;
        options.validate()?;
        self.map.check_config()?;
        let style = self.resolve_style(&request.state)?;
        let (definition, _) = self.converter.definition(&style.style_id)?;
        let plan = plan_composition(request, &style, definition, options);

        phases.advance(ExportPhase::WaitingForAssets)?;
        let (map, fonts, degraded) = self.acquire_assets(&plan).await?;
        token.check()?;

        phases.advance(ExportPhase::Compositing)?;
        let mut surface = CpuSurface::new(plan.width, plan.height, fonts)?;
        compose(&mut surface, &plan, map.as_ref());
        let image = surface.finish()?;
        token.check()?;

        phases.advance(ExportPhase::Encoding)?;
        let asset = encode(&image, request.format, request.quality, self.config.pdf_dpi)?;
        phases.advance(ExportPhase::Done)?;
        Ok((asset, degraded, style.style_id))
    }

    fn resolve_style(&self, state: &PosterState) -> PosterResult<ResolvedStyle> {
        let id = state.style.map_style.as_str();
        if self.config.strict_styles && !self.converter.registry().contains(id) {
            return Err(PosterError::unknown_style(id));
        }
        self.converter.resolve(id, &state.style.features)
    }

    /// Wait for map and fonts together, each bounded by its own timeout.
    ///
    /// Late or failed assets degrade the export; only having nothing at all fails it.
    /// Requested font families that did not load are reported too, since their text is
    /// drawn with a substitute face.
    async fn acquire_assets(
        &self,
        plan: &ComposePlan,
    ) -> PosterResult<(Option<RasterImage>, FontSet, Vec<Degraded>)> {
        let families = plan.font_families();
        let retry = if self.map.retries_internally() {
            RetryPolicy::NONE
        } else {
            self.config.retry
        };
        let map_fut = tokio::time::timeout(
            self.config.map_timeout(),
            retry.run("map render", || self.map.render(&plan.map_request)),
        );
        let font_fut = tokio::time::timeout(
            self.config.font_timeout(),
            self.fonts.ensure_loaded(&families),
        );
        let (map_res, font_res) = tokio::join!(map_fut, font_fut);

        let mut degraded = Vec::new();
        let map = match map_res {
            Ok(Ok(image)) => Some(image),
            Ok(Err(err @ PosterError::Configuration(_))) => return Err(err),
            Ok(Err(err)) => {
                tracing::warn!(provider = self.map.name(), %err, "map unavailable; drawing fallback");
                degraded.push(Degraded {
                    asset: AssetKind::Map,
                    reason: err.to_string(),
                });
                None
            }
            Err(_) => {
                let err = PosterError::asset_timeout(format!(
                    "map not ready after {}ms",
                    self.config.map_timeout_ms
                ));
                tracing::warn!(provider = self.map.name(), %err, "continuing without map");
                degraded.push(Degraded {
                    asset: AssetKind::Map,
                    reason: err.to_string(),
                });
                None
            }
        };
        let fonts = match font_res {
            Ok(set) => {
                let missing = set.missing(&families);
                if !missing.is_empty() {
                    let reason = format!(
                        "font families not loaded: {}; text drawn with {}",
                        missing.join(", "),
                        set.families().next().unwrap_or(FALLBACK_FAMILY),
                    );
                    tracing::warn!(%reason, "continuing with fallback fonts");
                    degraded.push(Degraded {
                        asset: AssetKind::Fonts,
                        reason,
                    });
                }
                set
            }
            Err(_) => {
                let err = PosterError::asset_timeout(format!(
                    "fonts not ready after {}ms",
                    self.config.font_timeout_ms
                ));
                tracing::warn!(%err, "continuing with fallback fonts");
                degraded.push(Degraded {
                    asset: AssetKind::Fonts,
                    reason: err.to_string(),
                });
                FontSet::new()
            }
        };

        if map.is_none() && fonts.is_empty() {
            return Err(PosterError::asset_timeout(
                "neither the map image nor any font became available",
            ));
        }
        Ok((map, fonts, degraded))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/engine.rs"]
mod tests;
