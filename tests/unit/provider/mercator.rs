use super::*;

#[test]
fn origin_projects_to_world_centre() {
    let world = world_size(0.0, 1.0);
    assert_eq!(world, 256.0);
    let p = project(0.0, 0.0, world);
    assert!((p.x - 128.0).abs() < 1e-9 && (p.y - 128.0).abs() < 1e-9);
}

#[test]
fn project_and_unproject_agree() {
    let world = world_size(12.0, 2.0);
    for (lat, lng) in [(48.8566, 2.3522), (-33.8688, 151.2093), (64.1466, -21.9426)] {
        let (lat2, lng2) = unproject(project(lat, lng, world), world);
        assert!((lat - lat2).abs() < 1e-9, "{lat} vs {lat2}");
        assert!((lng - lng2).abs() < 1e-9, "{lng} vs {lng2}");
    }
}

#[test]
fn viewport_centres_the_location() {
    let vp = MapViewport::new(48.8566, 2.3522, 13.0, 1.0, 800.0, 600.0, Vec2::ZERO);
    let c = vp.to_screen(48.8566, 2.3522);
    assert!((c.x - 400.0).abs() < 1e-6 && (c.y - 300.0).abs() < 1e-6);

    let b = vp.bounds();
    assert!(b.contains(48.8566, 2.3522));
    assert!(b.north > b.south && b.east > b.west);
}

#[test]
fn offset_pans_the_map() {
    let vp = MapViewport::new(0.0, 0.0, 4.0, 1.0, 100.0, 100.0, Vec2::new(10.0, -5.0));
    let c = vp.to_screen(0.0, 0.0);
    assert!((c.x - 60.0).abs() < 1e-9 && (c.y - 45.0).abs() < 1e-9);
}

#[test]
fn bounds_intersection_by_points() {
    let b = GeoBounds {
        south: 0.0,
        west: 0.0,
        north: 10.0,
        east: 10.0,
    };
    assert!(b.intersects_points(&[[-5.0, 5.0], [5.0, 5.0]]));
    assert!(!b.intersects_points(&[[20.0, 20.0], [30.0, 30.0]]));
    assert!(!b.intersects_points(std::iter::empty()));
}
