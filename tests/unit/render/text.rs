use super::*;

fn font(bytes: &[u8]) -> Arc<Vec<u8>> {
    Arc::new(bytes.to_vec())
}

fn mono() -> LoadedFont {
    LoadedFont {
        family: "Mono".to_string(),
        bytes: Arc::new(std::fs::read("tests/data/fonts/DejaVuSansMono.ttf").unwrap()),
    }
}

#[test]
fn resolve_prefers_exact_family_then_first() {
    let mut set = FontSet::new();
    assert!(set.resolve("Inter").is_none());

    set.push("Playfair Display", font(b"a"));
    set.push("Inter", font(b"b"));
    assert_eq!(set.resolve("inter").unwrap().family, "Inter");
    assert_eq!(set.resolve("Missing").unwrap().family, "Playfair Display");
    assert!(set.contains("INTER"));
    assert!(!set.contains("Missing"));
}

#[test]
fn push_replaces_existing_family() {
    let mut set = FontSet::new();
    set.push("Inter", font(b"old"));
    set.push("Inter", font(b"new"));
    assert_eq!(set.len(), 1);
    assert_eq!(set.resolve("Inter").unwrap().bytes.as_slice(), b"new");
    assert_eq!(set.families().collect::<Vec<_>>(), ["Inter"]);
}

#[test]
fn layout_rejects_garbage_font_bytes() {
    let mut engine = TextLayoutEngine::new();
    let bogus = LoadedFont {
        family: "Bogus".to_string(),
        bytes: font(b"not a font"),
    };
    assert!(
        engine
            .layout_line("Paris", &bogus, 24.0, 0.0, TextBrushRgba8::default())
            .is_err()
    );
}

#[test]
fn layout_rejects_non_positive_sizes() {
    let mut engine = TextLayoutEngine::new();
    let any = LoadedFont {
        family: "Any".to_string(),
        bytes: font(b""),
    };
    let err = engine
        .layout_line("x", &any, 0.0, 0.0, TextBrushRgba8::default())
        .err()
        .unwrap();
    assert!(err.to_string().contains("text size"));
}

#[test]
fn brush_from_color() {
    let b = TextBrushRgba8::from(Color::rgba(1, 2, 3, 4));
    assert_eq!((b.r, b.g, b.b, b.a), (1, 2, 3, 4));
}

#[test]
fn real_font_lays_out_with_its_advances() {
    let mut engine = TextLayoutEngine::new();
    let layout = engine
        .layout_line("Paris", &mono(), 32.0, 0.0, TextBrushRgba8::default())
        .unwrap();
    // DejaVu Sans Mono advances are 1233/2048 em.
    let expected = 5.0 * 32.0 * 1233.0 / 2048.0;
    assert!((layout.width() - expected).abs() < 1.0, "{}", layout.width());
    assert_eq!(layout.lines().count(), 1);
}

#[test]
fn letter_spacing_widens_the_line() {
    let mut engine = TextLayoutEngine::new();
    let font = mono();
    let tight = engine
        .layout_line("Paris", &font, 32.0, 0.0, TextBrushRgba8::default())
        .unwrap()
        .width();
    let loose = engine
        .layout_line("Paris", &font, 32.0, 10.0, TextBrushRgba8::default())
        .unwrap()
        .width();
    let added = loose - tight;
    assert!((39.0..=51.0).contains(&added), "{added}");
}

#[test]
fn bundled_font_always_shapes() {
    let fallback = fallback_font();
    assert_eq!(fallback.family, FALLBACK_FAMILY);
    assert!(Arc::ptr_eq(&fallback.bytes, &fallback_font().bytes));

    let mut engine = TextLayoutEngine::new();
    let layout = engine
        .layout_line("Paris", &fallback, 24.0, 0.0, TextBrushRgba8::default())
        .unwrap();
    assert!(layout.width() > 0.0);
}

#[test]
fn missing_lists_requested_families_without_a_match() {
    let mut set = FontSet::new();
    set.push("Inter", font(b"a"));
    let requested = ["inter".to_owned(), "Lora".to_owned(), "Playfair".to_owned()];
    assert_eq!(set.missing(&requested), ["Lora", "Playfair"]);
    assert!(set.missing(&requested[..1]).is_empty());
}
