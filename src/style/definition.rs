use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;

/// Semantic map features that can be switched on or off per poster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    Labels,
    Buildings,
    Parks,
    Water,
    Roads,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::Buildings,
        Feature::Labels,
        Feature::Parks,
        Feature::Roads,
        Feature::Water,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Feature::Labels => "labels",
            Feature::Buildings => "buildings",
            Feature::Parks => "parks",
            Feature::Water => "water",
            Feature::Roads => "roads",
        }
    }
}

/// Effective visibility of every [`Feature`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureToggleSet {
    pub labels: bool,
    pub buildings: bool,
    pub parks: bool,
    pub water: bool,
    pub roads: bool,
}

impl FeatureToggleSet {
    /// Global fallback used when neither the request nor the style says anything.
    pub const FALLBACK: Self = Self {
        labels: true,
        buildings: true,
        parks: true,
        water: true,
        roads: true,
    };

    pub fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::Labels => self.labels,
            Feature::Buildings => self.buildings,
            Feature::Parks => self.parks,
            Feature::Water => self.water,
            Feature::Roads => self.roads,
        }
    }

    fn set(&mut self, feature: Feature, on: bool) {
        match feature {
            Feature::Labels => self.labels = on,
            Feature::Buildings => self.buildings = on,
            Feature::Parks => self.parks = on,
            Feature::Water => self.water = on,
            Feature::Roads => self.roads = on,
        }
    }

    /// Merge with precedence `overrides > style_defaults > FALLBACK`.
    pub fn merged(overrides: &FeatureToggles, style_defaults: &FeatureToggles) -> Self {
        let mut out = Self::FALLBACK;
        for f in Feature::ALL {
            if let Some(on) = overrides.get(f).or(style_defaults.get(f)) {
                out.set(f, on);
            }
        }
        out
    }

    /// Stable textual form used in cache keys, e.g. `buildings=1,labels=0,...`.
    pub fn normalized(&self) -> String {
        Feature::ALL
            .iter()
            .map(|f| format!("{}={}", f.key(), u8::from(self.get(*f))))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for FeatureToggleSet {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// Partially specified toggles: style defaults and per-request overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureToggles {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buildings: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roads: Option<bool>,
}

impl FeatureToggles {
    pub fn get(&self, feature: Feature) -> Option<bool> {
        match feature {
            Feature::Labels => self.labels,
            Feature::Buildings => self.buildings,
            Feature::Parks => self.parks,
            Feature::Water => self.water,
            Feature::Roads => self.roads,
        }
    }

    pub fn with(mut self, feature: Feature, on: bool) -> Self {
        let slot = match feature {
            Feature::Labels => &mut self.labels,
            Feature::Buildings => &mut self.buildings,
            Feature::Parks => &mut self.parks,
            Feature::Water => &mut self.water,
            Feature::Roads => &mut self.roads,
        };
        *slot = Some(on);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    On,
    Off,
    Simplified,
}

/// One declarative styling directive: `(featureType, elementType) -> color/visibility`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRule {
    #[serde(default = "all_selector")]
    pub feature_type: String,
    #[serde(default = "all_selector")]
    pub element_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

fn all_selector() -> String {
    "all".to_owned()
}

/// Whole-image treatment applied to the rendered map before compositing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StyleFilter {
    Grayscale,
    Sepia { amount: f32 },
    Tint { color: Color, strength: f32 },
    Invert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDefinition {
    pub id: String,
    pub name: String,
    pub background: Color,
    pub text: Color,
    #[serde(default)]
    pub toggles: FeatureToggles,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<StyleFilter>,
    #[serde(default)]
    pub rules: Vec<StyleRule>,
}
