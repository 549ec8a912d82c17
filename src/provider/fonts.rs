use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::provider::FontProvider;
use crate::render::text::FontSet;

/// Looks fonts up as `<dir>/<family>.{ttf,otf}`, also trying the family name without
/// spaces and with spaces replaced by dashes.
#[derive(Debug, Clone)]
pub struct DirFontProvider {
    dir: PathBuf,
}

impl DirFontProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn candidates(&self, family: &str) -> Vec<PathBuf> {
        let mut stems = vec![family.to_owned()];
        for alt in [family.replace(' ', ""), family.replace(' ', "-")] {
            if !stems.contains(&alt) {
                stems.push(alt);
            }
        }
        stems
            .iter()
            .flat_map(|stem| ["ttf", "otf"].map(|ext| self.dir.join(format!("{stem}.{ext}"))))
            .collect()
    }
}

#[async_trait]
impl FontProvider for DirFontProvider {
    #[tracing::instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn ensure_loaded(&self, families: &[String]) -> FontSet {
        let mut set = FontSet::new();
        for family in families {
            let mut found = false;
            for path in self.candidates(family) {
                match tokio::fs::read(&path).await {
                    Ok(bytes) => {
                        tracing::debug!(%family, path = %path.display(), "font loaded");
                        set.push(family.clone(), Arc::new(bytes));
                        found = true;
                        break;
                    }
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                    Err(err) => {
                        tracing::warn!(%family, path = %path.display(), error = %err, "font read failed");
                    }
                }
            }
            if !found {
                tracing::warn!(%family, "font family not available; text will use a fallback");
            }
        }
        set
    }
}

/// Serves fonts that are already in memory.
///
/// Requested families come first so they win the fallback; everything else follows.
#[derive(Debug, Clone, Default)]
pub struct StaticFontProvider {
    fonts: FontSet,
}

impl StaticFontProvider {
    pub fn new(fonts: FontSet) -> Self {
        Self { fonts }
    }
}

#[async_trait]
impl FontProvider for StaticFontProvider {
    async fn ensure_loaded(&self, families: &[String]) -> FontSet {
        let mut out = FontSet::new();
        for family in families {
            if let Some(font) = self.fonts.resolve(family)
                && font.family.eq_ignore_ascii_case(family)
            {
                out.push(font.family.clone(), font.bytes.clone());
            }
        }
        for family in self.fonts.families() {
            if !out.contains(family)
                && let Some(font) = self.fonts.resolve(family)
            {
                out.push(font.family.clone(), font.bytes.clone());
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/provider/fonts.rs"]
mod tests;
