use kurbo::{Affine, BezPath, Rect, Shape, Stroke};

use crate::foundation::color::Color;
use crate::foundation::core::RasterImage;
use crate::render::surface::{RenderSurface, TextMetrics, TextStyle};

/// Average advance of a glyph relative to the font size.
const APPROX_ADVANCE: f64 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Fill {
        path: BezPath,
        color: Color,
    },
    Stroke {
        path: BezPath,
        width: f64,
        color: Color,
    },
    PushClip {
        path: BezPath,
    },
    PopClip,
    Image {
        dest: Rect,
        width: u32,
        height: u32,
    },
    Text {
        text: String,
        transform: Affine,
        style: TextStyle,
    },
    BlurredFill {
        path: BezPath,
        color: Color,
        radius: f64,
    },
}

impl DrawCommand {
    /// Bounds of the geometry a command touches, if it has any.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            DrawCommand::Fill { path, .. }
            | DrawCommand::Stroke { path, .. }
            | DrawCommand::PushClip { path }
            | DrawCommand::BlurredFill { path, .. } => Some(path.bounding_box()),
            DrawCommand::Image { dest, .. } => Some(*dest),
            DrawCommand::PopClip | DrawCommand::Text { .. } => None,
        }
    }
}

/// Surface that records draw calls instead of rasterizing them.
///
/// Text is measured with a fixed per-glyph advance, so layouts are reproducible without
/// font files.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
    clip_depth: usize,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    pub fn texts(&self) -> impl Iterator<Item = (&str, &Affine, &TextStyle)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text {
                text,
                transform,
                style,
            } => Some((text.as_str(), transform, style)),
            _ => None,
        })
    }

    pub fn clip_depth(&self) -> usize {
        self.clip_depth
    }
}

impl RenderSurface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.commands.push(DrawCommand::Fill {
            path: path.clone(),
            color,
        });
    }

    fn stroke_path(&mut self, path: &BezPath, stroke: &Stroke, color: Color) {
        self.commands.push(DrawCommand::Stroke {
            path: path.clone(),
            width: stroke.width,
            color,
        });
    }

    fn push_clip(&mut self, path: &BezPath) {
        self.clip_depth += 1;
        self.commands
            .push(DrawCommand::PushClip { path: path.clone() });
    }

    fn pop_clip(&mut self) {
        self.clip_depth = self.clip_depth.saturating_sub(1);
        self.commands.push(DrawCommand::PopClip);
    }

    fn draw_image(&mut self, image: &RasterImage, dest: Rect) {
        self.commands.push(DrawCommand::Image {
            dest,
            width: image.width,
            height: image.height,
        });
    }

    fn measure_text(&mut self, text: &str, style: &TextStyle) -> TextMetrics {
        let glyphs = text.chars().count() as f64;
        TextMetrics {
            width: glyphs * (style.font_size * APPROX_ADVANCE + style.letter_spacing),
            ascent: style.font_size * 0.8,
            descent: style.font_size * 0.2,
        }
    }

    fn draw_text(&mut self, text: &str, transform: Affine, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            transform,
            style: style.clone(),
        });
    }

    fn fill_path_blurred(&mut self, path: &BezPath, color: Color, radius: f64) {
        self.commands.push(DrawCommand::BlurredFill {
            path: path.clone(),
            color,
            radius,
        });
    }
}
