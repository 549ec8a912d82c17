use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::clock::{Clock, SystemClock};
use crate::foundation::color::Color;
use crate::foundation::error::{PosterError, PosterResult};
use crate::style::cache::{CacheKey, CacheStats, StyleCache, StyleCacheOpts};
use crate::style::definition::{
    FeatureToggleSet, FeatureToggles, StyleDefinition, StyleRule, Visibility,
};
use crate::style::layers::{LayerBucket, RenderLayer, ZoomFunction};
use crate::style::registry::{DEFAULT_STYLE_ID, StyleRegistry};

/// Outcome of resolving a style id plus toggle overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    /// The id the caller asked for.
    pub requested_id: String,
    /// The id actually used (differs from `requested_id` after a fallback).
    pub style_id: String,
    pub fell_back: bool,
    pub toggles: FeatureToggleSet,
    pub layers: Arc<[RenderLayer]>,
}

impl ResolvedStyle {
    pub fn layer(&self, bucket: LayerBucket) -> Option<&RenderLayer> {
        self.layers.iter().find(|l| l.bucket == bucket)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConverterStats {
    /// How many times the layer list was actually built.
    pub builds: u64,
    pub cache: CacheStats,
}

/// Turns declarative style rules into an ordered, toggle-filtered layer list; memoized.
pub struct StyleConverter {
    registry: Arc<StyleRegistry>,
    default_style_id: String,
    cache: StyleCache,
    builds: AtomicU64,
}

impl std::fmt::Debug for StyleConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleConverter")
            .field("default_style_id", &self.default_style_id)
            .field("stats", &self.stats())
            .finish()
    }
}

impl StyleConverter {
    pub fn new(registry: Arc<StyleRegistry>, cache_opts: StyleCacheOpts) -> Self {
        Self::with_clock(registry, cache_opts, Arc::new(SystemClock))
    }

    pub fn with_clock(
        registry: Arc<StyleRegistry>,
        cache_opts: StyleCacheOpts,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            default_style_id: DEFAULT_STYLE_ID.to_owned(),
            cache: StyleCache::with_clock(cache_opts, clock),
            builds: AtomicU64::new(0),
        }
    }

    pub fn with_default_style(mut self, id: impl Into<String>) -> Self {
        self.default_style_id = id.into();
        self
    }

    pub fn registry(&self) -> &StyleRegistry {
        &self.registry
    }

    pub fn default_style_id(&self) -> &str {
        &self.default_style_id
    }

    /// Look up a definition, falling back to the default style for unknown ids.
    pub fn definition(&self, style_id: &str) -> PosterResult<(&StyleDefinition, bool)> {
        match self.registry.get(style_id) {
            Ok(def) => Ok((def, false)),
            Err(PosterError::UnknownStyle(_)) => {
                tracing::warn!(
                    requested = style_id,
                    fallback = %self.default_style_id,
                    "unknown map style, using default"
                );
                let def = self.registry.get(&self.default_style_id)?;
                Ok((def, true))
            }
            Err(e) => Err(e),
        }
    }

    #[tracing::instrument(level = "debug", skip(self, overrides))]
    pub fn resolve(&self, style_id: &str, overrides: &FeatureToggles) -> PosterResult<ResolvedStyle> {
        let (def, fell_back) = self.definition(style_id)?;
        let toggles = FeatureToggleSet::merged(overrides, &def.toggles);
        let key = CacheKey {
            style_id: def.id.clone(),
            toggles: toggles.normalized(),
        };

        let layers = match self.cache.get(&key) {
            Some(hit) => hit,
            None => {
                self.builds.fetch_add(1, Ordering::Relaxed);
                let built: Arc<[RenderLayer]> = Arc::from(build_layers(def, &toggles));
                tracing::debug!(style = %def.id, layers = built.len(), "built style layers");
                self.cache.insert_if_absent(key, built)
            }
        };

        Ok(ResolvedStyle {
            requested_id: style_id.to_owned(),
            style_id: def.id.clone(),
            fell_back,
            toggles,
            layers,
        })
    }

    pub fn stats(&self) -> ConverterStats {
        ConverterStats {
            builds: self.builds.load(Ordering::Relaxed),
            cache: self.cache.stats(),
        }
    }
}

#[derive(Debug, Clone)]
struct BucketState {
    color: Color,
    halo: Option<Color>,
    visibility: Visibility,
    weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Color,
    Halo,
}

/// Fold rules in declaration order (later rules win per bucket), then drop hidden buckets.
pub(crate) fn build_layers(def: &StyleDefinition, toggles: &FeatureToggleSet) -> Vec<RenderLayer> {
    let mut states: Vec<BucketState> = LayerBucket::ORDERED
        .iter()
        .map(|&b| BucketState {
            color: base_color(b),
            halo: b.is_label().then_some(Color::WHITE),
            visibility: Visibility::On,
            weight: 1.0,
        })
        .collect();

    for rule in &def.rules {
        apply_rule(&mut states, rule);
    }

    LayerBucket::ORDERED
        .iter()
        .zip(states)
        .filter(|(b, st)| {
            st.visibility != Visibility::Off && b.required_features().iter().all(|f| toggles.get(*f))
        })
        .map(|(&bucket, st)| {
            let mut weight = st.weight;
            if st.visibility == Visibility::Simplified && !bucket.is_label() {
                weight *= 0.5;
            }
            RenderLayer {
                id: bucket.id().to_owned(),
                bucket,
                kind: bucket.kind(),
                color: st.color,
                halo: st.halo,
                width: base_width(bucket).map(|w| w.scaled(weight)),
                opacity: base_opacity(bucket),
            }
        })
        .collect()
}

fn apply_rule(states: &mut [BucketState], rule: &StyleRule) {
    let targets = select_buckets(rule.feature_type.trim());
    if targets.is_empty() {
        tracing::debug!(feature_type = %rule.feature_type, "style rule matches no layer");
        return;
    }
    for (i, bucket) in LayerBucket::ORDERED.iter().enumerate() {
        if !targets.contains(bucket) {
            continue;
        }
        let Some(part) = element_part(*bucket, rule.element_type.trim()) else {
            continue;
        };
        let st = &mut states[i];
        match part {
            Part::Color => {
                if let Some(c) = rule.color {
                    st.color = c;
                }
                if let Some(v) = rule.visibility {
                    st.visibility = v;
                }
                if let Some(w) = rule.weight {
                    st.weight = w;
                }
            }
            Part::Halo => {
                if let Some(c) = rule.color {
                    st.halo = Some(c);
                }
                if rule.visibility == Some(Visibility::Off) {
                    st.halo = None;
                }
            }
        }
    }
}

const ROADS: &[LayerBucket] = &[
    LayerBucket::RoadLocalStroke,
    LayerBucket::RoadLocalFill,
    LayerBucket::RoadArterialStroke,
    LayerBucket::RoadArterialFill,
    LayerBucket::RoadHighwayStroke,
    LayerBucket::RoadHighwayFill,
    LayerBucket::LabelRoad,
];

fn select_buckets(feature_type: &str) -> &'static [LayerBucket] {
    match feature_type {
        "all" => &LayerBucket::ORDERED,
        "landscape" | "landscape.natural" | "landscape.natural.landcover"
        | "landscape.natural.terrain" => &[LayerBucket::Background],
        "landscape.man_made" => &[LayerBucket::Buildings],
        "water" => &[LayerBucket::Water, LayerBucket::LabelWater],
        "poi" => &[LayerBucket::Poi, LayerBucket::Parks, LayerBucket::LabelPoi],
        "poi.park" => &[LayerBucket::Parks, LayerBucket::LabelPoi],
        "road" => ROADS,
        "road.highway" | "road.highway.controlled_access" => {
            &[LayerBucket::RoadHighwayStroke, LayerBucket::RoadHighwayFill]
        }
        "road.arterial" => &[LayerBucket::RoadArterialStroke, LayerBucket::RoadArterialFill],
        "road.local" => &[LayerBucket::RoadLocalStroke, LayerBucket::RoadLocalFill],
        "administrative"
        | "administrative.country"
        | "administrative.province"
        | "administrative.neighborhood"
        | "administrative.land_parcel" => &[LayerBucket::Boundaries, LayerBucket::LabelPlace],
        "administrative.locality" => &[LayerBucket::LabelPlace],
        "transit" | "transit.line" | "transit.station" | "transit.station.rail" => {
            &[LayerBucket::Transit]
        }
        _ => &[],
    }
}

fn element_part(bucket: LayerBucket, element_type: &str) -> Option<Part> {
    let label = bucket.is_label();
    let stroke = bucket.is_stroke();
    match element_type {
        "all" => Some(Part::Color),
        "geometry" => (!label).then_some(Part::Color),
        "geometry.fill" => (!label && !stroke).then_some(Part::Color),
        "geometry.stroke" => (!label && stroke).then_some(Part::Color),
        "labels" | "labels.text" | "labels.text.fill" => label.then_some(Part::Color),
        "labels.text.stroke" => label.then_some(Part::Halo),
        _ => None,
    }
}

fn base_color(bucket: LayerBucket) -> Color {
    match bucket {
        LayerBucket::Background => Color::rgb(0xf2, 0xef, 0xe9),
        LayerBucket::Water => Color::rgb(0xaa, 0xd3, 0xdf),
        LayerBucket::Parks => Color::rgb(0xc8, 0xe6, 0xc0),
        LayerBucket::Buildings => Color::rgb(0xd9, 0xd0, 0xc9),
        LayerBucket::Poi => Color::rgb(0xe8, 0xe4, 0xdc),
        LayerBucket::Boundaries => Color::rgb(0x9e, 0x9c, 0xab),
        LayerBucket::Transit => Color::rgb(0xb0, 0xa8, 0xc8),
        LayerBucket::RoadLocalStroke
        | LayerBucket::RoadArterialStroke
        | LayerBucket::RoadHighwayStroke => Color::rgb(0xc9, 0xc2, 0xb6),
        LayerBucket::RoadLocalFill => Color::WHITE,
        LayerBucket::RoadArterialFill => Color::rgb(0xfd, 0xfc, 0xf8),
        LayerBucket::RoadHighwayFill => Color::rgb(0xf9, 0xd2, 0x9c),
        LayerBucket::LabelWater
        | LayerBucket::LabelPoi
        | LayerBucket::LabelRoad
        | LayerBucket::LabelPlace => Color::rgb(0x55, 0x55, 0x55),
    }
}

fn base_width(bucket: LayerBucket) -> Option<ZoomFunction> {
    let stops: &[(f64, f64)] = match bucket {
        LayerBucket::Boundaries => &[(2.0, 0.5), (10.0, 1.2), (16.0, 2.0)],
        LayerBucket::Transit => &[(10.0, 0.5), (16.0, 2.0)],
        LayerBucket::RoadLocalStroke => &[(11.0, 0.8), (14.0, 2.2), (18.0, 10.0)],
        LayerBucket::RoadLocalFill => &[(11.0, 0.3), (14.0, 1.2), (18.0, 8.0)],
        LayerBucket::RoadArterialStroke => &[(8.0, 0.8), (12.0, 2.5), (16.0, 8.0), (18.0, 15.0)],
        LayerBucket::RoadArterialFill => &[(8.0, 0.4), (12.0, 1.5), (16.0, 6.0), (18.0, 12.0)],
        LayerBucket::RoadHighwayStroke => &[(5.0, 1.0), (10.0, 3.0), (14.0, 8.0), (18.0, 24.0)],
        LayerBucket::RoadHighwayFill => &[(5.0, 0.6), (10.0, 2.0), (14.0, 6.0), (18.0, 20.0)],
        // Symbol layers use width as the label font size.
        LayerBucket::LabelPlace => &[(4.0, 10.0), (12.0, 16.0)],
        LayerBucket::LabelWater | LayerBucket::LabelPoi | LayerBucket::LabelRoad => {
            &[(12.0, 9.0), (18.0, 13.0)]
        }
        _ => return None,
    };
    Some(ZoomFunction::stops(stops))
}

fn base_opacity(bucket: LayerBucket) -> Option<ZoomFunction> {
    match bucket {
        LayerBucket::Buildings => Some(ZoomFunction::stops(&[(13.0, 0.0), (15.0, 1.0)])),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/converter.rs"]
mod tests;
