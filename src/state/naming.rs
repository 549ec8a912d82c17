use chrono::NaiveDate;

use crate::state::poster::{ExportFormat, PosterState};

/// `map-poster-<city-slug>-<YYYY-MM-DD>.<ext>`
pub fn export_file_name(state: &PosterState, date: NaiveDate, format: ExportFormat) -> String {
    let city = slug::slugify(&state.location.city);
    let city = if city.is_empty() { "untitled".to_owned() } else { city };
    format!(
        "map-poster-{city}-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

#[cfg(test)]
#[path = "../../tests/unit/state/naming.rs"]
mod tests;
