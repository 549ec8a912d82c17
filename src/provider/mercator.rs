//! Spherical Web Mercator in "world pixels" (256px tiles).

use std::f64::consts::PI;

use kurbo::{Point, Vec2};

pub const TILE_SIZE: f64 = 256.0;
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Side of the square world in pixels at `zoom`, times the device pixel ratio.
pub fn world_size(zoom: f64, pixel_ratio: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom) * pixel_ratio
}

pub fn project(lat: f64, lng: f64, world: f64) -> Point {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (lng + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    Point::new(x * world, y * world)
}

pub fn unproject(p: Point, world: f64) -> (f64, f64) {
    let lng = p.x / world * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * p.y / world);
    let lat = n.sinh().atan().to_degrees();
    (lat, lng)
}

/// Geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.south && lat <= self.north && lng >= self.west && lng <= self.east
    }

    /// Whether the box spanned by the given points overlaps this one.
    pub fn intersects_points<'a>(&self, points: impl IntoIterator<Item = &'a [f64; 2]>) -> bool {
        let mut any = false;
        let (mut s, mut w, mut n, mut e) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for [lng, lat] in points {
            any = true;
            s = s.min(*lat);
            n = n.max(*lat);
            w = w.min(*lng);
            e = e.max(*lng);
        }
        any && s <= self.north && n >= self.south && w <= self.east && e >= self.west
    }
}

/// A screen-sized window onto the world centred on a coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    pub world: f64,
    /// World-pixel position of the screen's top-left corner.
    pub origin: Point,
    pub width: f64,
    pub height: f64,
}

impl MapViewport {
    /// `offset` pans the centre in screen pixels.
    pub fn new(
        lat: f64,
        lng: f64,
        zoom: f64,
        pixel_ratio: f64,
        width: f64,
        height: f64,
        offset: Vec2,
    ) -> Self {
        let world = world_size(zoom, pixel_ratio);
        let center = project(lat, lng, world) - offset;
        Self {
            world,
            origin: center - Vec2::new(width / 2.0, height / 2.0),
            width,
            height,
        }
    }

    pub fn to_screen(&self, lat: f64, lng: f64) -> Point {
        let p = project(lat, lng, self.world);
        Point::new(p.x - self.origin.x, p.y - self.origin.y)
    }

    pub fn bounds(&self) -> GeoBounds {
        let (north, west) = unproject(self.origin, self.world);
        let (south, east) = unproject(
            self.origin + Vec2::new(self.width, self.height),
            self.world,
        );
        GeoBounds {
            south,
            west,
            north,
            east,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/provider/mercator.rs"]
mod tests;
