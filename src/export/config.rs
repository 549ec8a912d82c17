use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{PosterError, PosterResult};
use crate::provider::retry::RetryPolicy;
use crate::provider::tiles::{DirTileSource, TileMapProvider};
use crate::provider::vector::{GeoJsonSource, VectorMapProvider};
use crate::provider::MapImageProvider;
use crate::render::text::FontSet;
use crate::style::cache::StyleCacheOpts;
use crate::style::registry::DEFAULT_STYLE_ID;

pub const ENV_MAP_TIMEOUT_MS: &str = "POSTERFORGE_MAP_TIMEOUT_MS";
pub const ENV_FONT_TIMEOUT_MS: &str = "POSTERFORGE_FONT_TIMEOUT_MS";
pub const ENV_STYLE_CACHE_CAPACITY: &str = "POSTERFORGE_STYLE_CACHE_CAPACITY";
pub const ENV_DEFAULT_STYLE: &str = "POSTERFORGE_DEFAULT_STYLE";

/// Engine settings, loaded from camelCase JSON with every field optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Style used when a poster names one that is not registered.
    pub default_style: String,
    /// Fail on unknown styles instead of falling back.
    pub strict_styles: bool,
    pub style_cache_capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_cache_ttl_ms: Option<u64>,
    pub map_timeout_ms: u64,
    pub font_timeout_ms: u64,
    pub retry: RetryPolicy,
    pub pdf_dpi: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_style: DEFAULT_STYLE_ID.to_owned(),
            strict_styles: false,
            style_cache_capacity: StyleCacheOpts::default().capacity,
            style_cache_ttl_ms: None,
            map_timeout_ms: 30_000,
            font_timeout_ms: 10_000,
            retry: RetryPolicy::default(),
            pdf_dpi: 300.0,
            provider: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> PosterResult<Self> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|e| PosterError::serde(format!("engine config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> PosterResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PosterError::configuration(format!("read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// Apply `POSTERFORGE_*` overrides using `lookup` to read variables.
    ///
    /// Pass `|k| std::env::var(k).ok()` for the process environment.
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> PosterResult<Self> {
        if let Some(v) = lookup(ENV_MAP_TIMEOUT_MS) {
            self.map_timeout_ms = parse_env(ENV_MAP_TIMEOUT_MS, &v)?;
        }
        if let Some(v) = lookup(ENV_FONT_TIMEOUT_MS) {
            self.font_timeout_ms = parse_env(ENV_FONT_TIMEOUT_MS, &v)?;
        }
        if let Some(v) = lookup(ENV_STYLE_CACHE_CAPACITY) {
            self.style_cache_capacity = parse_env(ENV_STYLE_CACHE_CAPACITY, &v)?;
        }
        if let Some(v) = lookup(ENV_DEFAULT_STYLE) {
            let v = v.trim();
            if !v.is_empty() {
                self.default_style = v.to_owned();
            }
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> PosterResult<()> {
        if self.style_cache_capacity == 0 {
            return Err(PosterError::configuration("styleCacheCapacity must be > 0"));
        }
        if self.map_timeout_ms == 0 || self.font_timeout_ms == 0 {
            return Err(PosterError::configuration("asset timeouts must be > 0"));
        }
        if !(self.pdf_dpi.is_finite() && self.pdf_dpi > 0.0) {
            return Err(PosterError::configuration("pdfDpi must be positive"));
        }
        if self.default_style.trim().is_empty() {
            return Err(PosterError::configuration("defaultStyle must not be empty"));
        }
        Ok(())
    }

    pub fn cache_opts(&self) -> StyleCacheOpts {
        StyleCacheOpts {
            capacity: self.style_cache_capacity,
            ttl: self.style_cache_ttl_ms.map(Duration::from_millis),
        }
    }

    pub fn map_timeout(&self) -> Duration {
        Duration::from_millis(self.map_timeout_ms)
    }

    pub fn font_timeout(&self) -> Duration {
        Duration::from_millis(self.font_timeout_ms)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> PosterResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| PosterError::configuration(format!("{key}={raw:?}: {e}")))
}

/// Which map imagery strategy the engine renders with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProviderConfig {
    /// Draw styled vector features from a GeoJSON file.
    Vector { features: PathBuf },
    /// Stitch raster tiles from a directory or a URL template.
    #[serde(rename_all = "camelCase")]
    Tiles {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dir: Option<PathBuf>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
    },
}

impl ProviderConfig {
    /// Instantiate the configured provider. `label_fonts` feeds vector map labels.
    pub async fn build(
        &self,
        retry: RetryPolicy,
        label_fonts: FontSet,
    ) -> PosterResult<Arc<dyn MapImageProvider>> {
        match self {
            ProviderConfig::Vector { features } => {
                let source = GeoJsonSource::from_path(features).await?;
                tracing::info!(path = %features.display(), features = source.len(), "vector source loaded");
                Ok(Arc::new(
                    VectorMapProvider::new(source).with_label_fonts(label_fonts),
                ))
            }
            ProviderConfig::Tiles { dir: Some(dir), .. } => Ok(Arc::new(
                TileMapProvider::new(DirTileSource::new(dir)).with_retry(retry),
            )),
            ProviderConfig::Tiles {
                url: Some(url),
                api_key,
                ..
            } => build_http(url, api_key.clone(), retry),
            ProviderConfig::Tiles { .. } => Err(PosterError::configuration(
                "tiles provider needs either `dir` or `url`",
            )),
        }
    }
}

#[cfg(feature = "http-tiles")]
fn build_http(
    url: &str,
    api_key: Option<String>,
    retry: RetryPolicy,
) -> PosterResult<Arc<dyn MapImageProvider>> {
    use crate::provider::http::HttpTileSource;
    use crate::provider::tiles::UrlTemplate;

    let source = HttpTileSource::new(UrlTemplate::new(url, api_key))?;
    Ok(Arc::new(TileMapProvider::new(source).with_retry(retry)))
}

#[cfg(not(feature = "http-tiles"))]
fn build_http(
    url: &str,
    _api_key: Option<String>,
    _retry: RetryPolicy,
) -> PosterResult<Arc<dyn MapImageProvider>> {
    Err(PosterError::configuration(format!(
        "tile url '{url}' needs the `http-tiles` feature"
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/export/config.rs"]
mod tests;
