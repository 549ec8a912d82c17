use serde_json::{Map, Value, json};

use crate::foundation::error::{PosterError, PosterResult};
use crate::state::poster::PosterState;

pub const CURRENT_VERSION: u32 = 3;

/// Parse a snapshot of any known version, upgrading it to [`CURRENT_VERSION`].
///
/// Snapshots without a `version` are treated as version 1. Unknown versions are read
/// as-is with a warning.
#[tracing::instrument(skip(json), fields(bytes = json.len()))]
pub fn from_json(json: &str) -> PosterResult<PosterState> {
    let mut value: Value = serde_json::from_str(json)
        .map_err(|e| PosterError::serde(format!("poster state: {e}")))?;
    let root = value
        .as_object_mut()
        .ok_or_else(|| PosterError::serde("poster state must be a JSON object"))?;

    let version = root
        .get("version")
        .and_then(Value::as_u64)
        .map_or(1, |v| v.min(u64::from(u32::MAX)) as u32);

    match version {
        1 => {
            upgrade_v1(root);
            upgrade_v2(root);
            root.insert("version".to_owned(), json!(CURRENT_VERSION));
        }
        2 => {
            upgrade_v2(root);
            root.insert("version".to_owned(), json!(CURRENT_VERSION));
        }
        CURRENT_VERSION => {}
        other => {
            tracing::warn!(version = other, "unknown poster state version; reading as-is");
        }
    }

    serde_json::from_value(value).map_err(|e| PosterError::serde(format!("poster state: {e}")))
}

pub fn to_json(state: &PosterState) -> PosterResult<String> {
    serde_json::to_string_pretty(state)
        .map_err(|e| PosterError::serde(format!("poster state: {e}")))
}

/// Version 1 predates the glow effect.
fn upgrade_v1(root: &mut Map<String, Value>) {
    if let Some(style) = style_object(root)
        && !style.contains_key("glow")
    {
        tracing::debug!("v1 snapshot: defaulting style.glow");
        style.insert(
            "glow".to_owned(),
            json!({ "enabled": false, "intensity": 0.5 }),
        );
    }
}

/// Version 2 predates custom font colours.
fn upgrade_v2(root: &mut Map<String, Value>) {
    if let Some(style) = style_object(root)
        && !style.contains_key("fontColor")
    {
        tracing::debug!("v2 snapshot: defaulting style.fontColor");
        style.insert("fontColor".to_owned(), json!({ "useCustom": false }));
    }
}

fn style_object(root: &mut Map<String, Value>) -> Option<&mut Map<String, Value>> {
    let style = root
        .entry("style")
        .or_insert_with(|| Value::Object(Map::new()));
    if !style.is_object() {
        *style = Value::Object(Map::new());
    }
    style.as_object_mut()
}

#[cfg(test)]
#[path = "../../tests/unit/state/migrate.rs"]
mod tests;
