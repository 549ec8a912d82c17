//! Frame silhouettes used to clip the map viewport.

pub mod clip;
mod shapes;

pub use clip::{ClipGeometry, clip_path_for};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameShape {
    #[default]
    Square,
    Circle,
    Heart,
    House,
}

impl FrameShape {
    pub const ALL: [FrameShape; 4] = [
        FrameShape::Square,
        FrameShape::Circle,
        FrameShape::Heart,
        FrameShape::House,
    ];
}
