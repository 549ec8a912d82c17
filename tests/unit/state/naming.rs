use super::*;

fn state_in(city: &str) -> PosterState {
    let mut s = PosterState::default();
    s.location.city = city.to_owned();
    s
}

#[test]
fn name_is_derived_from_city_and_date() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
    assert_eq!(
        export_file_name(&state_in("São Paulo"), date, ExportFormat::Png),
        "map-poster-sao-paulo-2024-03-09.png"
    );
    assert_eq!(
        export_file_name(&state_in("New York"), date, ExportFormat::Pdf),
        "map-poster-new-york-2024-03-09.pdf"
    );
}

#[test]
fn blank_city_gets_a_placeholder() {
    let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
    assert_eq!(
        export_file_name(&state_in("  "), date, ExportFormat::Jpg),
        "map-poster-untitled-2025-12-31.jpg"
    );
}
