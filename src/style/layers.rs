use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::style::definition::Feature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Background,
    Fill,
    Line,
    Symbol,
}

/// Geometry classes a map data source can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureClass {
    Water,
    Park,
    Building,
    Poi,
    Boundary,
    Transit,
    RoadLocal,
    RoadArterial,
    RoadHighway,
    Place,
}

/// Canonical layer slots every style is folded into, in paint order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerBucket {
    Background,
    Water,
    Parks,
    Buildings,
    Poi,
    Boundaries,
    Transit,
    RoadLocalStroke,
    RoadLocalFill,
    RoadArterialStroke,
    RoadArterialFill,
    RoadHighwayStroke,
    RoadHighwayFill,
    LabelWater,
    LabelPoi,
    LabelRoad,
    LabelPlace,
}

impl LayerBucket {
    pub const ORDERED: [LayerBucket; 17] = [
        LayerBucket::Background,
        LayerBucket::Water,
        LayerBucket::Parks,
        LayerBucket::Buildings,
        LayerBucket::Poi,
        LayerBucket::Boundaries,
        LayerBucket::Transit,
        LayerBucket::RoadLocalStroke,
        LayerBucket::RoadLocalFill,
        LayerBucket::RoadArterialStroke,
        LayerBucket::RoadArterialFill,
        LayerBucket::RoadHighwayStroke,
        LayerBucket::RoadHighwayFill,
        LayerBucket::LabelWater,
        LayerBucket::LabelPoi,
        LayerBucket::LabelRoad,
        LayerBucket::LabelPlace,
    ];

    pub fn id(self) -> &'static str {
        match self {
            LayerBucket::Background => "background",
            LayerBucket::Water => "water",
            LayerBucket::Parks => "parks",
            LayerBucket::Buildings => "buildings",
            LayerBucket::Poi => "poi",
            LayerBucket::Boundaries => "boundaries",
            LayerBucket::Transit => "transit",
            LayerBucket::RoadLocalStroke => "road-local-stroke",
            LayerBucket::RoadLocalFill => "road-local-fill",
            LayerBucket::RoadArterialStroke => "road-arterial-stroke",
            LayerBucket::RoadArterialFill => "road-arterial-fill",
            LayerBucket::RoadHighwayStroke => "road-highway-stroke",
            LayerBucket::RoadHighwayFill => "road-highway-fill",
            LayerBucket::LabelWater => "label-water",
            LayerBucket::LabelPoi => "label-poi",
            LayerBucket::LabelRoad => "label-road",
            LayerBucket::LabelPlace => "label-place",
        }
    }

    pub fn kind(self) -> LayerKind {
        match self {
            LayerBucket::Background => LayerKind::Background,
            LayerBucket::Water | LayerBucket::Parks | LayerBucket::Buildings | LayerBucket::Poi => {
                LayerKind::Fill
            }
            LayerBucket::LabelWater
            | LayerBucket::LabelPoi
            | LayerBucket::LabelRoad
            | LayerBucket::LabelPlace => LayerKind::Symbol,
            _ => LayerKind::Line,
        }
    }

    /// Road casings, boundaries and transit lines are strokes; road fills are the inner line.
    pub fn is_stroke(self) -> bool {
        matches!(
            self,
            LayerBucket::Boundaries
                | LayerBucket::Transit
                | LayerBucket::RoadLocalStroke
                | LayerBucket::RoadArterialStroke
                | LayerBucket::RoadHighwayStroke
        )
    }

    pub fn is_label(self) -> bool {
        self.kind() == LayerKind::Symbol
    }

    /// Toggles that must all be on for the bucket to survive.
    pub fn required_features(self) -> &'static [Feature] {
        match self {
            LayerBucket::Water => &[Feature::Water],
            LayerBucket::Parks => &[Feature::Parks],
            LayerBucket::Buildings => &[Feature::Buildings],
            LayerBucket::RoadLocalStroke
            | LayerBucket::RoadLocalFill
            | LayerBucket::RoadArterialStroke
            | LayerBucket::RoadArterialFill
            | LayerBucket::RoadHighwayStroke
            | LayerBucket::RoadHighwayFill => &[Feature::Roads],
            LayerBucket::LabelWater => &[Feature::Labels, Feature::Water],
            LayerBucket::LabelRoad => &[Feature::Labels, Feature::Roads],
            LayerBucket::LabelPoi | LayerBucket::LabelPlace => &[Feature::Labels],
            LayerBucket::Background
            | LayerBucket::Poi
            | LayerBucket::Boundaries
            | LayerBucket::Transit => &[],
        }
    }

    pub fn source_class(self) -> Option<FeatureClass> {
        match self {
            LayerBucket::Background => None,
            LayerBucket::Water | LayerBucket::LabelWater => Some(FeatureClass::Water),
            LayerBucket::Parks => Some(FeatureClass::Park),
            LayerBucket::Buildings => Some(FeatureClass::Building),
            LayerBucket::Poi | LayerBucket::LabelPoi => Some(FeatureClass::Poi),
            LayerBucket::Boundaries => Some(FeatureClass::Boundary),
            LayerBucket::Transit => Some(FeatureClass::Transit),
            LayerBucket::RoadLocalStroke | LayerBucket::RoadLocalFill => {
                Some(FeatureClass::RoadLocal)
            }
            LayerBucket::RoadArterialStroke | LayerBucket::RoadArterialFill => {
                Some(FeatureClass::RoadArterial)
            }
            LayerBucket::RoadHighwayStroke | LayerBucket::RoadHighwayFill => {
                Some(FeatureClass::RoadHighway)
            }
            // Road names come from every road class; the provider widens this itself.
            LayerBucket::LabelRoad => Some(FeatureClass::RoadArterial),
            LayerBucket::LabelPlace => Some(FeatureClass::Place),
        }
    }
}

/// Piecewise-linear function of zoom, clamped outside its first and last stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomFunction {
    pub stops: Vec<(f64, f64)>,
}

impl ZoomFunction {
    pub fn constant(v: f64) -> Self {
        Self {
            stops: vec![(0.0, v)],
        }
    }

    pub fn stops(stops: &[(f64, f64)]) -> Self {
        Self {
            stops: stops.to_vec(),
        }
    }

    pub fn eval(&self, zoom: f64) -> f64 {
        let Some(&(z0, v0)) = self.stops.first() else {
            return 0.0;
        };
        if zoom <= z0 {
            return v0;
        }
        for pair in self.stops.windows(2) {
            let (za, va) = pair[0];
            let (zb, vb) = pair[1];
            if zoom <= zb {
                if zb <= za {
                    return vb;
                }
                let t = (zoom - za) / (zb - za);
                return va + (vb - va) * t;
            }
        }
        self.stops.last().map(|s| s.1).unwrap_or(v0)
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            stops: self.stops.iter().map(|&(z, v)| (z, v * factor)).collect(),
        }
    }
}

/// A fully resolved, drawable layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderLayer {
    pub id: String,
    pub bucket: LayerBucket,
    pub kind: LayerKind,
    pub color: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halo: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<ZoomFunction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<ZoomFunction>,
}

impl RenderLayer {
    pub fn width_at(&self, zoom: f64) -> f64 {
        self.width.as_ref().map(|f| f.eval(zoom)).unwrap_or(1.0)
    }

    pub fn opacity_at(&self, zoom: f64) -> f32 {
        self.opacity
            .as_ref()
            .map(|f| f.eval(zoom).clamp(0.0, 1.0) as f32)
            .unwrap_or(1.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/layers.rs"]
mod tests;
