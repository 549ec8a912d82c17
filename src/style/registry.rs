use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use serde::Deserialize;

use crate::foundation::error::{PosterError, PosterResult};
use crate::style::definition::StyleDefinition;

/// Style id used when a requested style is not registered.
pub const DEFAULT_STYLE_ID: &str = "classic";

const BUILTIN_STYLES_JSON: &str = include_str!("data/styles.json");

#[derive(Deserialize)]
struct StyleTable {
    styles: Vec<StyleDefinition>,
}

/// Immutable, validated table of style definitions keyed by id.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    styles: Vec<StyleDefinition>,
    index: HashMap<String, usize>,
}

impl StyleRegistry {
    /// The process-wide registry of bundled styles, parsed on first use.
    pub fn builtin() -> &'static StyleRegistry {
        builtin_cell().as_ref()
    }

    /// Shared handle to [`StyleRegistry::builtin`].
    pub fn shared() -> Arc<StyleRegistry> {
        Arc::clone(builtin_cell())
    }

    pub fn from_json(json: &str) -> PosterResult<Self> {
        let table: StyleTable = serde_json::from_str(json)
            .map_err(|e| PosterError::serde(format!("parse style table: {e}")))?;
        Self::new(table.styles)
    }

    pub fn new(styles: Vec<StyleDefinition>) -> PosterResult<Self> {
        let mut index = HashMap::with_capacity(styles.len());
        for (i, s) in styles.iter().enumerate() {
            validate_definition(s)?;
            if index.insert(s.id.clone(), i).is_some() {
                return Err(PosterError::validation(format!(
                    "duplicate style id '{}'",
                    s.id
                )));
            }
        }
        Ok(Self { styles, index })
    }

    pub fn get(&self, id: &str) -> PosterResult<&StyleDefinition> {
        self.index
            .get(id)
            .map(|&i| &self.styles[i])
            .ok_or_else(|| PosterError::unknown_style(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Ids in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.styles.iter().map(|s| s.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &StyleDefinition> {
        self.styles.iter()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

fn builtin_cell() -> &'static Arc<StyleRegistry> {
    static BUILTIN: OnceLock<Arc<StyleRegistry>> = OnceLock::new();
    BUILTIN.get_or_init(|| match StyleRegistry::from_json(BUILTIN_STYLES_JSON) {
        Ok(r) => Arc::new(r),
        Err(e) => panic!("bundled style table is invalid: {e}"),
    })
}

fn validate_definition(s: &StyleDefinition) -> PosterResult<()> {
    let well_formed = !s.id.is_empty()
        && s.id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');
    if !well_formed {
        return Err(PosterError::validation(format!(
            "malformed style id '{}' (expected [a-z0-9_-]+)",
            s.id
        )));
    }
    if s.name.trim().is_empty() {
        return Err(PosterError::validation(format!(
            "style '{}' has an empty display name",
            s.id
        )));
    }
    for (i, rule) in s.rules.iter().enumerate() {
        if rule.feature_type.trim().is_empty() || rule.element_type.trim().is_empty() {
            return Err(PosterError::validation(format!(
                "style '{}' rule {i} has an empty selector",
                s.id
            )));
        }
        if let Some(w) = rule.weight
            && (!w.is_finite() || w < 0.0)
        {
            return Err(PosterError::validation(format!(
                "style '{}' rule {i} weight must be finite and >= 0",
                s.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/style/registry.rs"]
mod tests;
