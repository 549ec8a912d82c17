use kurbo::BezPath;

/// Side of the square reference viewBox the silhouettes are authored in.
pub(crate) const VIEWBOX: f64 = 375.0;

const HEART_D: &str = "M187.5 340 C120 285 20 220 20 125 C20 65 65 25 115 25 \
     C150 25 175 45 187.5 75 C200 45 225 25 260 25 C310 25 355 65 355 125 \
     C355 220 255 285 187.5 340 Z";

const HOUSE_D: &str = "M187.5 25 L355 170 L315 170 L315 350 L60 350 L60 170 L20 170 Z";

pub(crate) fn heart() -> BezPath {
    parse(HEART_D)
}

pub(crate) fn house() -> BezPath {
    parse(HOUSE_D)
}

fn parse(d: &str) -> BezPath {
    // Both paths are compile-time constants covered by unit tests.
    BezPath::from_svg(d).unwrap_or_default()
}
