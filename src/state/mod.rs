//! The serializable poster snapshot the editor hands to the exporter.

pub mod migrate;
pub mod naming;
pub mod poster;

pub use migrate::{CURRENT_VERSION, from_json, to_json};
pub use naming::export_file_name;
pub use poster::{
    BackgroundSettings, ExportFormat, ExportSettings, ExportSize, FontColor, GlowSettings,
    Location, PaperPreset, PinSettings, PinStyle, PosterState, PosterStyle, TextContent,
    TextField, Typography, format_coordinates,
};
