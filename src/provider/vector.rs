use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use kurbo::{Affine, BezPath, Point, Stroke, Vec2};
use serde::Deserialize;

use crate::foundation::color::Color;
use crate::foundation::core::RasterImage;
use crate::foundation::error::{PosterError, PosterResult};
use crate::provider::mercator::{GeoBounds, MapViewport};
use crate::provider::{MapImageProvider, MapRenderRequest};
use crate::render::cpu::CpuSurface;
use crate::render::surface::{RenderSurface, TextStyle};
use crate::render::text::FontSet;
use crate::style::layers::{FeatureClass, LayerBucket, LayerKind, RenderLayer};

/// `[lng, lat]`
pub type LngLat = [f64; 2];

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(LngLat),
    Line(Vec<LngLat>),
    /// Outer ring followed by holes.
    Polygon(Vec<Vec<LngLat>>),
}

impl Geometry {
    fn points(&self) -> Box<dyn Iterator<Item = &LngLat> + '_> {
        match self {
            Geometry::Point(p) => Box::new(std::iter::once(p)),
            Geometry::Line(l) => Box::new(l.iter()),
            Geometry::Polygon(rings) => Box::new(rings.iter().flatten()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapFeature {
    pub class: FeatureClass,
    pub name: Option<String>,
    pub geometry: Geometry,
}

/// Supplies vector features for a geographic window.
#[async_trait]
pub trait FeatureSource: Send + Sync {
    async fn features(&self, bounds: GeoBounds) -> PosterResult<Arc<[MapFeature]>>;
}

/// In-memory features parsed from a GeoJSON `FeatureCollection`.
///
/// Supported geometries are `Point`, `LineString`, `MultiLineString`, `Polygon` and
/// `MultiPolygon`. Each feature needs a `class` property naming a [`FeatureClass`];
/// `name` is used for labels.
#[derive(Debug, Clone)]
pub struct GeoJsonSource {
    features: Arc<[MapFeature]>,
}

#[derive(Deserialize)]
struct Collection {
    features: Vec<RawFeature>,
}

#[derive(Deserialize)]
struct RawFeature {
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: RawProperties,
}

#[derive(Deserialize, Default)]
struct RawProperties {
    class: Option<String>,
    name: Option<String>,
}

type Position = Vec<f64>;

#[derive(Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Point { coordinates: Position },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    #[serde(other)]
    Unsupported,
}

fn lnglat(p: &Position) -> Option<LngLat> {
    match p.as_slice() {
        [lng, lat, ..] if lng.is_finite() && lat.is_finite() => Some([*lng, *lat]),
        _ => None,
    }
}

fn line(ps: &[Position]) -> Vec<LngLat> {
    ps.iter().filter_map(lnglat).collect()
}

fn rings(rs: &[Vec<Position>]) -> Vec<Vec<LngLat>> {
    rs.iter().map(|r| line(r)).collect()
}

impl GeoJsonSource {
    pub fn new(features: Vec<MapFeature>) -> Self {
        Self {
            features: features.into(),
        }
    }

    pub fn from_json(json: &str) -> PosterResult<Self> {
        let collection: Collection = serde_json::from_str(json)
            .map_err(|e| PosterError::serde(format!("geojson: {e}")))?;

        let mut features = Vec::new();
        let mut skipped = 0usize;
        for raw in collection.features {
            let class = raw.properties.class.as_deref().and_then(|c| {
                serde_json::from_value::<FeatureClass>(serde_json::Value::String(c.to_owned()))
                    .ok()
            });
            let (Some(class), Some(geometry)) = (class, raw.geometry) else {
                skipped += 1;
                continue;
            };
            let name = raw.properties.name;
            let mut push = |geometry| {
                features.push(MapFeature {
                    class,
                    name: name.clone(),
                    geometry,
                })
            };
            match geometry {
                RawGeometry::Point { coordinates } => match lnglat(&coordinates) {
                    Some(p) => push(Geometry::Point(p)),
                    None => skipped += 1,
                },
                RawGeometry::LineString { coordinates } => push(Geometry::Line(line(&coordinates))),
                RawGeometry::MultiLineString { coordinates } => {
                    for l in &coordinates {
                        push(Geometry::Line(line(l)));
                    }
                }
                RawGeometry::Polygon { coordinates } => push(Geometry::Polygon(rings(&coordinates))),
                RawGeometry::MultiPolygon { coordinates } => {
                    for p in &coordinates {
                        push(Geometry::Polygon(rings(p)));
                    }
                }
                RawGeometry::Unsupported => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::debug!(skipped, kept = features.len(), "geojson features skipped");
        }
        Ok(Self::new(features))
    }

    pub async fn from_path(path: impl AsRef<Path>) -> PosterResult<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            PosterError::configuration(format!("read geojson {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[async_trait]
impl FeatureSource for GeoJsonSource {
    async fn features(&self, bounds: GeoBounds) -> PosterResult<Arc<[MapFeature]>> {
        let hits: Vec<MapFeature> = self
            .features
            .iter()
            .filter(|f| bounds.intersects_points(f.geometry.points()))
            .cloned()
            .collect();
        Ok(hits.into())
    }
}

/// Draws resolved style layers over vector features.
pub struct VectorMapProvider<S> {
    source: S,
    label_fonts: FontSet,
}

impl<S: FeatureSource> VectorMapProvider<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            label_fonts: FontSet::new(),
        }
    }

    /// Fonts for symbol layers; without them labels are skipped.
    pub fn with_label_fonts(mut self, fonts: FontSet) -> Self {
        self.label_fonts = fonts;
        self
    }

    /// Rasterize `features` for `request` onto any surface.
    pub fn draw(
        &self,
        surface: &mut dyn RenderSurface,
        request: &MapRenderRequest,
        features: &[MapFeature],
    ) {
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
        let full = kurbo::Rect::new(0.0, 0.0, w, h);
        let background = request
            .layers
            .iter()
            .find(|l| l.kind == LayerKind::Background)
            .map_or(request.background, |l| l.color);
        surface.fill_path(&kurbo::Shape::to_path(&full, 0.1), background);

        for layer in request.layers.iter() {
            let opacity = layer.opacity_at(request.zoom);
            if layer.kind == LayerKind::Background || opacity <= 0.0 {
                continue;
            }
            let color = layer.color.with_opacity(opacity);
            for feature in features.iter().filter(|f| feeds(layer.bucket, f.class)) {
                match layer.kind {
                    LayerKind::Fill => fill_feature(surface, &viewport, feature, color),
                    LayerKind::Line => {
                        let width = layer.width_at(request.zoom) * request.pixel_ratio;
                        stroke_feature(surface, &viewport, feature, width, color);
                    }
                    LayerKind::Symbol => {
                        label_feature(surface, &viewport, feature, layer, request, color)
                    }
                    LayerKind::Background => {}
                }
            }
        }
    }
}

/// Road labels come from every road class.
fn feeds(bucket: LayerBucket, class: FeatureClass) -> bool {
    if bucket == LayerBucket::LabelRoad {
        return matches!(
            class,
            FeatureClass::RoadLocal | FeatureClass::RoadArterial | FeatureClass::RoadHighway
        );
    }
    bucket.source_class() == Some(class)
}

fn screen_path(viewport: &MapViewport, pts: &[LngLat], close: bool) -> Option<BezPath> {
    let mut it = pts.iter().map(|[lng, lat]| viewport.to_screen(*lat, *lng));
    let first = it.next()?;
    let mut path = BezPath::new();
    path.move_to(first);
    for p in it {
        path.line_to(p);
    }
    if close {
        path.close_path();
    }
    Some(path)
}

fn fill_feature(s: &mut dyn RenderSurface, vp: &MapViewport, f: &MapFeature, color: Color) {
    if let Geometry::Polygon(rings) = &f.geometry {
        let mut path = BezPath::new();
        for ring in rings {
            if let Some(r) = screen_path(vp, ring, true) {
                path.extend(r);
            }
        }
        s.fill_path(&path, color);
    }
}

fn stroke_feature(
    s: &mut dyn RenderSurface,
    vp: &MapViewport,
    f: &MapFeature,
    width: f64,
    color: Color,
) {
    let stroke = Stroke::new(width);
    match &f.geometry {
        Geometry::Line(pts) => {
            if let Some(path) = screen_path(vp, pts, false) {
                s.stroke_path(&path, &stroke, color);
            }
        }
        Geometry::Polygon(rings) => {
            for ring in rings {
                if let Some(path) = screen_path(vp, ring, true) {
                    s.stroke_path(&path, &stroke, color);
                }
            }
        }
        Geometry::Point(_) => {}
    }
}

fn label_feature(
    s: &mut dyn RenderSurface,
    vp: &MapViewport,
    f: &MapFeature,
    layer: &RenderLayer,
    request: &MapRenderRequest,
    color: Color,
) {
    let Some(name) = f.name.as_deref().filter(|n| !n.is_empty()) else {
        return;
    };
    let anchor = match &f.geometry {
        Geometry::Point([lng, lat]) => vp.to_screen(*lat, *lng),
        Geometry::Line(pts) => match pts.get(pts.len() / 2) {
            Some([lng, lat]) => vp.to_screen(*lat, *lng),
            None => return,
        },
        Geometry::Polygon(rings) => match rings.first().and_then(|r| centroid(vp, r)) {
            Some(p) => p,
            None => return,
        },
    };
    let style = TextStyle {
        font_family: String::new(),
        font_size: layer.width_at(request.zoom) * request.pixel_ratio,
        letter_spacing: 0.0,
        color,
    };
    let width = s.measure_text(name, &style).width;
    let origin = Affine::translate(anchor.to_vec2() - Vec2::new(width / 2.0, 0.0));
    if let Some(halo) = layer.halo {
        let halo_style = TextStyle {
            color: halo,
            ..style.clone()
        };
        let d = request.pixel_ratio;
        for off in [(-d, 0.0), (d, 0.0), (0.0, -d), (0.0, d)] {
            s.draw_text(name, Affine::translate(off) * origin, &halo_style);
        }
    }
    s.draw_text(name, origin, &style);
}

fn centroid(vp: &MapViewport, ring: &[LngLat]) -> Option<Point> {
    if ring.is_empty() {
        return None;
    }
    let sum = ring
        .iter()
        .map(|[lng, lat]| vp.to_screen(*lat, *lng).to_vec2())
        .fold(Vec2::ZERO, |a, b| a + b);
    Some((sum / ring.len() as f64).to_point())
}

#[async_trait]
impl<S: FeatureSource> MapImageProvider for VectorMapProvider<S> {
    fn name(&self) -> &str {
        "vector"
    }

    #[tracing::instrument(skip(self, request), fields(w = request.width, h = request.height))]
    async fn render(&self, request: &MapRenderRequest) -> PosterResult<RasterImage> {
        let viewport = MapViewport::new(
            request.lat,
            request.lng,
            request.zoom,
            request.pixel_ratio,
            f64::from(request.width),
            f64::from(request.height),
            request.offset,
        );
        let features = self.source.features(viewport.bounds()).await?;
        tracing::debug!(features = features.len(), "vector features in view");

        let mut surface = CpuSurface::new(request.width, request.height, self.label_fonts.clone())?;
        self.draw(&mut surface, request, &features);
        surface.finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/provider/vector.rs"]
mod tests;
