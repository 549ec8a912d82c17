use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::foundation::color::Color;
use crate::foundation::error::{PosterError, PosterResult};

/// Family of the face compiled into the crate.
pub const FALLBACK_FAMILY: &str = "DejaVu Sans";

static FALLBACK_FONT_BYTES: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// The bundled face text is drawn with when no loaded font can shape it.
pub fn fallback_font() -> LoadedFont {
    static BYTES: OnceLock<Arc<Vec<u8>>> = OnceLock::new();
    LoadedFont {
        family: FALLBACK_FAMILY.to_owned(),
        bytes: BYTES
            .get_or_init(|| Arc::new(FALLBACK_FONT_BYTES.to_vec()))
            .clone(),
    }
}

/// A font family's raw bytes as handed over by a font provider.
#[derive(Clone)]
pub struct LoadedFont {
    pub family: String,
    pub bytes: Arc<Vec<u8>>,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("family", &self.family)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

/// Fonts that are ready for layout. Lookups fall back to the first loaded font; drawing
/// falls back further to [`fallback_font`].
#[derive(Clone, Debug, Default)]
pub struct FontSet {
    fonts: Vec<LoadedFont>,
}

impl FontSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a family; a later push for the same family replaces the bytes.
    pub fn push(&mut self, family: impl Into<String>, bytes: Arc<Vec<u8>>) {
        let family = family.into();
        match self.position(&family) {
            Some(i) => self.fonts[i].bytes = bytes,
            None => self.fonts.push(LoadedFont { family, bytes }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn contains(&self, family: &str) -> bool {
        self.position(family).is_some()
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.fonts.iter().map(|f| f.family.as_str())
    }

    /// Requested families this set has no exact match for.
    pub fn missing<'a>(&self, requested: &'a [String]) -> Vec<&'a str> {
        requested
            .iter()
            .map(String::as_str)
            .filter(|f| !self.contains(f))
            .collect()
    }

    /// Exact (case-insensitive) match, else the first loaded font.
    pub fn resolve(&self, family: &str) -> Option<&LoadedFont> {
        self.position(family)
            .map(|i| &self.fonts[i])
            .or_else(|| self.fonts.first())
    }

    fn position(&self, family: &str) -> Option<usize> {
        self.fonts
            .iter()
            .position(|f| f.family.eq_ignore_ascii_case(family))
    }
}

/// RGBA8 brush carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Color> for TextBrushRgba8 {
    fn from(c: Color) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Parley contexts plus the family names fonts were registered under.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    registered: HashMap<String, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
        }
    }

    /// Shape a single line of text in `font`.
    pub fn layout_line(
        &mut self,
        text: &str,
        font: &LoadedFont,
        size_px: f32,
        letter_spacing_px: f32,
        brush: TextBrushRgba8,
    ) -> PosterResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(PosterError::validation(
                "text size must be finite and > 0",
            ));
        }
        let family_name = self.register(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::LetterSpacing(
            letter_spacing_px,
        ));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    fn register(&mut self, font: &LoadedFont) -> PosterResult<String> {
        if let Some(name) = self.registered.get(&font.family) {
            return Ok(name.clone());
        }
        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.bytes.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            PosterError::validation(format!("no font families in bytes for '{}'", font.family))
        })?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PosterError::validation("registered font family has no name"))?
            .to_string();
        self.registered.insert(font.family.clone(), name.clone());
        Ok(name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
