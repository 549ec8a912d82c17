use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use kurbo::Vec2;

use super::*;
use crate::foundation::color::Color;

fn request(lat: f64, lng: f64, zoom: f64, size: u32, ratio: f64) -> MapRenderRequest {
    MapRenderRequest {
        lat,
        lng,
        zoom,
        width: size,
        height: size,
        pixel_ratio: ratio,
        offset: Vec2::ZERO,
        layers: Arc::from(Vec::new()),
        background: Color::rgb(0, 0, 255),
    }
}

#[test]
fn url_template_expands_placeholders() {
    let t = UrlTemplate::new(
        "https://tiles.example/{z}/{x}/{y}.png?key={key}",
        Some("abc".into()),
    );
    assert_eq!(
        t.expand(TileId { z: 3, x: 4, y: 5 }).unwrap(),
        "https://tiles.example/3/4/5.png?key=abc"
    );
    let open = UrlTemplate::new("https://tiles.example/{z}/{x}/{y}.png", None);
    assert!(!open.requires_key());
    assert!(open.check().is_ok());
}

#[test]
fn missing_key_is_a_configuration_error() {
    for key in [None, Some("  ".to_owned())] {
        let t = UrlTemplate::new("https://t/{z}/{x}/{y}?k={key}", key);
        assert!(matches!(t.check(), Err(PosterError::Configuration(_))));
        assert!(t.expand(TileId { z: 0, x: 0, y: 0 }).is_err());
    }
}

#[test]
fn plan_covers_viewport_and_wraps_longitude() {
    // Centre on the antimeridian at z1: the view straddles x=1 and x=0 (wrapped).
    let plan = plan_tiles(&request(10.0, 180.0, 1.0, 128, 1.0), 19);
    let xs: Vec<u32> = plan.iter().map(|p| p.tile.x).collect();
    assert!(xs.contains(&0) && xs.contains(&1), "{xs:?}");
    assert!(plan.iter().all(|p| p.tile.z == 1));
    for p in &plan {
        assert_eq!(p.dest.width(), 256.0);
    }
}

#[test]
fn pixel_ratio_selects_a_sharper_zoom() {
    let plan = plan_tiles(&request(0.0, 0.0, 3.0, 64, 4.0), 19);
    assert!(plan.iter().all(|p| p.tile.z == 5));
    // World size is the same either way, so tiles stay 256px.
    assert!(plan.iter().all(|p| (p.dest.width() - 256.0).abs() < 1e-9));

    let capped = plan_tiles(&request(0.0, 0.0, 18.0, 64, 4.0), 19);
    assert!(capped.iter().all(|p| p.tile.z == 19));
}

fn scratch_tiles(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("posterforge-tiles-{name}-{}", std::process::id()));
    std::fs::create_dir_all(dir.join("1/0")).unwrap();
    let red = image::RgbaImage::from_pixel(256, 256, image::Rgba([255, 0, 0, 255]));
    red.save(dir.join("1/0/0.png")).unwrap();
    dir
}

#[tokio::test]
async fn dir_tiles_are_stitched_with_gaps_as_background() {
    let dir = scratch_tiles("stitch");
    let provider = TileMapProvider::new(DirTileSource::new(&dir)).with_retry(RetryPolicy::NONE);

    // lat 40 / lng -90 sits well inside tile 1/0/0.
    let img = provider.render(&request(40.0, -90.0, 1.0, 64, 1.0)).await.unwrap();
    assert_eq!((img.width, img.height), (64, 64));
    assert_eq!(img.pixel(32, 32), Some([255, 0, 0, 255]));

    // Southern hemisphere tile 1/0/1 is missing: background shows.
    let img = provider.render(&request(-40.0, -90.0, 1.0, 64, 1.0)).await.unwrap();
    assert_eq!(img.pixel(32, 32), Some([0, 0, 255, 255]));

    std::fs::remove_dir_all(&dir).ok();
}

struct Flaky {
    calls: AtomicU32,
}

#[async_trait]
impl TileSource for Flaky {
    async fn fetch(&self, _tile: TileId) -> PosterResult<Option<Vec<u8>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(PosterError::provider("503"))
    }
}

#[tokio::test(start_paused = true)]
async fn all_failed_fetches_fail_the_render() {
    let provider = TileMapProvider::new(Flaky {
        calls: AtomicU32::new(0),
    })
    .with_concurrency(2);
    let req = request(0.0, 0.0, 0.0, 32, 1.0);
    let err = provider.render(&req).await.unwrap_err();
    assert!(err.is_transient());
    let tiles = plan_tiles(&req, 19).len() as u32;
    assert_eq!(provider.source.calls.load(Ordering::SeqCst), tiles * 3);
}

#[test]
fn tile_retries_are_advertised_to_callers() {
    let source = || Flaky {
        calls: AtomicU32::new(0),
    };
    assert!(TileMapProvider::new(source()).retries_internally());
    assert!(
        !TileMapProvider::new(source())
            .with_retry(RetryPolicy::NONE)
            .retries_internally()
    );
}
