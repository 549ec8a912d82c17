use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape, Vec2};

use crate::frame::FrameShape;
use crate::frame::shapes;

const CURVE_TOLERANCE: f64 = 0.1;

/// Clip region for a frame at a concrete pixel size.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipGeometry {
    /// No clipping beyond the rectangle itself.
    Full(Rect),
    Circle { center: Point, radius: f64 },
    Path(BezPath),
}

impl ClipGeometry {
    pub fn to_path(&self) -> BezPath {
        match self {
            ClipGeometry::Full(r) => r.to_path(CURVE_TOLERANCE),
            ClipGeometry::Circle { center, radius } => {
                Circle::new(*center, *radius).to_path(CURVE_TOLERANCE)
            }
            ClipGeometry::Path(p) => p.clone(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            ClipGeometry::Full(r) => *r,
            ClipGeometry::Circle { center, radius } => Rect::new(
                center.x - radius,
                center.y - radius,
                center.x + radius,
                center.y + radius,
            ),
            ClipGeometry::Path(p) => p.bounding_box(),
        }
    }

    pub fn translated(&self, by: Vec2) -> Self {
        match self {
            ClipGeometry::Full(r) => ClipGeometry::Full(*r + by),
            ClipGeometry::Circle { center, radius } => ClipGeometry::Circle {
                center: *center + by,
                radius: *radius,
            },
            ClipGeometry::Path(p) => {
                let mut p = p.clone();
                p.apply_affine(Affine::translate(by));
                ClipGeometry::Path(p)
            }
        }
    }

    /// Place a clip computed for a viewport-sized box at the viewport's origin.
    pub fn placed_in(&self, viewport: Rect) -> Self {
        self.translated(viewport.origin().to_vec2())
    }
}

/// Clip geometry for `shape` in a `width x height` box whose origin is `(0, 0)`.
pub fn clip_path_for(shape: FrameShape, width: f64, height: f64) -> ClipGeometry {
    match shape {
        FrameShape::Square => ClipGeometry::Full(Rect::new(0.0, 0.0, width, height)),
        FrameShape::Circle => ClipGeometry::Circle {
            center: Point::new(width / 2.0, height / 2.0),
            radius: width.min(height) / 2.0,
        },
        FrameShape::Heart => ClipGeometry::Path(fit_viewbox(shapes::heart(), width, height)),
        FrameShape::House => ClipGeometry::Path(fit_viewbox(shapes::house(), width, height)),
    }
}

/// Uniformly scale a viewBox-space path to fit `width x height`, centered.
fn fit_viewbox(mut path: BezPath, width: f64, height: f64) -> BezPath {
    let s = width.min(height) / shapes::VIEWBOX;
    let offset = Vec2::new(
        (width - shapes::VIEWBOX * s) / 2.0,
        (height - shapes::VIEWBOX * s) / 2.0,
    );
    path.apply_affine(Affine::translate(offset) * Affine::scale(s));
    path
}

#[cfg(test)]
#[path = "../../tests/unit/frame/clip.rs"]
mod tests;
