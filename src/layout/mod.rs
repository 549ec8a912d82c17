//! Base-canvas layout tables and their projection onto export sizes.

pub mod flow;
pub mod model;

pub use model::{
    BASE_CANVAS, LayoutSpec, ScaledLayout, SizeTier, TextBlock, TextSlot, TextSlotSpec, layout_for,
};
