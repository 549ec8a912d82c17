//! Drawing backends behind the `RenderSurface` capability.

pub mod blur;
pub mod cpu;
pub mod filter;
pub mod recording;
pub mod surface;
pub mod text;

pub use cpu::CpuSurface;
pub use recording::{DrawCommand, RecordingSurface};
pub use surface::{RenderSurface, TextMetrics, TextStyle};
pub use text::{FontSet, LoadedFont};
