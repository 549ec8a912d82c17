use super::*;

#[test]
fn coordinates_use_hemisphere_letters() {
    assert_eq!(format_coordinates(48.8566, 2.3522), "48.8566°N / 2.3522°E");
    assert_eq!(format_coordinates(-33.8688, -70.0), "33.8688°S / 70.0000°W");
}

#[test]
fn empty_fields_fall_back_to_location() {
    let state = PosterState::default();
    assert_eq!(state.display_text(TextSlot::City).as_deref(), Some("Paris"));
    assert_eq!(state.display_text(TextSlot::Country).as_deref(), Some("France"));
    assert_eq!(
        state.display_text(TextSlot::Coordinates).as_deref(),
        Some("48.8566°N / 2.3522°E")
    );
    assert_eq!(state.display_text(TextSlot::Headline), None);
    assert!(!state.has_headline());
}

#[test]
fn hidden_or_blank_headline_is_absent() {
    let mut state = PosterState::default();
    state.text.headline.visible = true;
    assert!(!state.has_headline());
    state.text.headline.text = "  Where we met ".into();
    assert_eq!(
        state.display_text(TextSlot::Headline).as_deref(),
        Some("Where we met")
    );
    state.text.city.visible = false;
    assert_eq!(state.display_text(TextSlot::City), None);
}

#[test]
fn font_families_are_deduplicated_in_slot_order() {
    let mut state = PosterState::default();
    state.text.headline.visible = true;
    state.text.headline.text = "Hi".into();
    state.text.country.font = Some("Inter".into());
    assert_eq!(
        state.font_families(),
        ["Playfair Display", "Montserrat", "Inter"]
    );
}

#[test]
fn export_size_accepts_presets_and_pixels() {
    let preset: ExportSize = serde_json::from_str(r#""30x40""#).unwrap();
    assert_eq!(preset.target(), (3543, 4724));
    let px: ExportSize = serde_json::from_str(r#"{ "width": 800, "height": 600 }"#).unwrap();
    assert_eq!(px.target(), (800, 600));
    assert_eq!(px.pixel_ratio(), 1.0);
    assert_eq!(ExportFormat::Jpg.mime_type(), "image/jpeg");
}
