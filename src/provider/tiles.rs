use std::path::PathBuf;

use async_trait::async_trait;
use futures::StreamExt;
use kurbo::{Rect, Shape};

use crate::foundation::core::RasterImage;
use crate::foundation::error::{PosterError, PosterResult};
use crate::provider::mercator::MapViewport;
use crate::provider::retry::RetryPolicy;
use crate::provider::{MapImageProvider, MapRenderRequest};
use crate::render::cpu::CpuSurface;
use crate::render::surface::RenderSurface;
use crate::render::text::FontSet;

/// Slippy-map tile address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

/// Where raster tiles come from.
#[async_trait]
pub trait TileSource: Send + Sync {
    fn check_config(&self) -> PosterResult<()> {
        Ok(())
    }

    fn max_zoom(&self) -> u8 {
        19
    }

    /// Encoded image bytes, or `None` when the source has no tile at that address.
    async fn fetch(&self, tile: TileId) -> PosterResult<Option<Vec<u8>>>;
}

/// Tile URL with `{z}`, `{x}`, `{y}` and optional `{key}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    template: String,
    api_key: Option<String>,
}

impl UrlTemplate {
    pub fn new(template: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            template: template.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn requires_key(&self) -> bool {
        self.template.contains("{key}")
    }

    pub fn check(&self) -> PosterResult<()> {
        if self.requires_key() && self.api_key.is_none() {
            return Err(PosterError::configuration(
                "tile URL template needs {key} but no API key is configured",
            ));
        }
        Ok(())
    }

    pub fn expand(&self, tile: TileId) -> PosterResult<String> {
        self.check()?;
        let url = self
            .template
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string());
        Ok(match &self.api_key {
            Some(key) => url.replace("{key}", key),
            None => url,
        })
    }
}

/// Reads `{root}/{z}/{x}/{y}.png`.
#[derive(Debug, Clone)]
pub struct DirTileSource {
    root: PathBuf,
}

impl DirTileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn tile_path(&self, tile: TileId) -> PathBuf {
        self.root
            .join(tile.z.to_string())
            .join(tile.x.to_string())
            .join(format!("{}.png", tile.y))
    }
}

#[async_trait]
impl TileSource for DirTileSource {
    async fn fetch(&self, tile: TileId) -> PosterResult<Option<Vec<u8>>> {
        let path = self.tile_path(tile);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(PosterError::provider(format!(
                "read tile {}: {err}",
                path.display()
            ))),
        }
    }
}

/// A tile plus where it lands on the output, in output pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub tile: TileId,
    pub dest: Rect,
}

/// Tiles covering the request, at the zoom level closest to its output resolution.
pub fn plan_tiles(request: &MapRenderRequest, max_zoom: u8) -> Vec<TilePlacement> {
    let (w, h) = (f64::from(request.width), f64::from(request.height));
    let viewport = MapViewport::new(
        request.lat,
        request.lng,
        request.zoom,
        request.pixel_ratio,
        w,
        h,
        request.offset,
    );
    let ideal = request.zoom + request.pixel_ratio.max(f64::MIN_POSITIVE).log2();
    let z = ideal.round().clamp(0.0, f64::from(max_zoom)) as u8;
    let count = 1u64 << z;
    let tile_px = viewport.world / count as f64;

    let x0 = (viewport.origin.x / tile_px).floor() as i64;
    let x1 = ((viewport.origin.x + w) / tile_px).ceil() as i64;
    let y0 = ((viewport.origin.y / tile_px).floor() as i64).max(0);
    let y1 = (((viewport.origin.y + h) / tile_px).ceil() as i64).min(count as i64);

    let mut out = Vec::new();
    for ty in y0..y1 {
        for tx in x0..x1 {
            let wrapped = tx.rem_euclid(count as i64) as u32;
            let dest = Rect::new(
                tx as f64 * tile_px - viewport.origin.x,
                ty as f64 * tile_px - viewport.origin.y,
                (tx + 1) as f64 * tile_px - viewport.origin.x,
                (ty + 1) as f64 * tile_px - viewport.origin.y,
            );
            out.push(TilePlacement {
                tile: TileId {
                    z,
                    x: wrapped,
                    y: ty as u32,
                },
                dest,
            });
        }
    }
    out
}

/// Stitches raster tiles into the requested viewport.
///
/// Tiles are fetched concurrently with per-tile retries. Absent or undecodable tiles
/// leave the background showing; the render fails only when nothing could be drawn
/// and some fetch errored.
pub struct TileMapProvider<T> {
    source: T,
    retry: RetryPolicy,
    concurrency: usize,
}

impl<T: TileSource> TileMapProvider<T> {
    pub fn new(source: T) -> Self {
        Self {
            source,
            retry: RetryPolicy::default(),
            concurrency: 8,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }
}

#[async_trait]
impl<T: TileSource> MapImageProvider for TileMapProvider<T> {
    fn name(&self) -> &str {
        "tiles"
    }

    fn check_config(&self) -> PosterResult<()> {
        self.source.check_config()
    }

    fn retries_internally(&self) -> bool {
        self.retry.max_attempts > 1
    }

    #[tracing::instrument(skip(self, request), fields(w = request.width, h = request.height))]
    async fn render(&self, request: &MapRenderRequest) -> PosterResult<RasterImage> {
        let plan = plan_tiles(request, self.source.max_zoom());
        let fetched: Vec<(TilePlacement, PosterResult<Option<Vec<u8>>>)> =
            futures::stream::iter(plan)
                .map(|placement| async move {
                    let TileId { z, x, y } = placement.tile;
                    let what = format!("tile {z}/{x}/{y}");
                    let res = self
                        .retry
                        .run(&what, || self.source.fetch(placement.tile))
                        .await;
                    (placement, res)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;

        let mut surface = CpuSurface::new(request.width, request.height, FontSet::new())?;
        let full = Rect::new(0.0, 0.0, f64::from(request.width), f64::from(request.height));
        surface.fill_path(&full.to_path(0.1), request.background);

        let total = fetched.len();
        let mut drawn = 0usize;
        let mut last_err = None;
        for (placement, res) in fetched {
            match res {
                Ok(Some(bytes)) => match RasterImage::decode(&bytes) {
                    Ok(img) => {
                        surface.draw_image(&img, placement.dest);
                        drawn += 1;
                    }
                    Err(err) => {
                        tracing::warn!(tile = ?placement.tile, error = %err, "undecodable tile")
                    }
                },
                Ok(None) => tracing::debug!(tile = ?placement.tile, "no tile"),
                Err(err) => {
                    tracing::warn!(tile = ?placement.tile, error = %err, "tile fetch failed");
                    last_err = Some(err);
                }
            }
        }
        tracing::debug!(total, drawn, "tiles stitched");

        if drawn == 0
            && let Some(err) = last_err
        {
            return Err(err);
        }
        surface.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/provider/tiles.rs"]
mod tests;
