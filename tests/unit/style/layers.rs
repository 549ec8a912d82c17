use super::*;

#[test]
fn zoom_function_clamps_and_interpolates() {
    let f = ZoomFunction::stops(&[(10.0, 2.0), (14.0, 6.0)]);
    assert_eq!(f.eval(5.0), 2.0);
    assert_eq!(f.eval(10.0), 2.0);
    assert_eq!(f.eval(12.0), 4.0);
    assert_eq!(f.eval(14.0), 6.0);
    assert_eq!(f.eval(20.0), 6.0);
    assert_eq!(ZoomFunction::constant(3.0).eval(99.0), 3.0);
    assert_eq!(ZoomFunction { stops: vec![] }.eval(1.0), 0.0);
}

#[test]
fn bucket_kinds_and_toggles_are_consistent() {
    for b in LayerBucket::ORDERED {
        if b.is_stroke() {
            assert_eq!(b.kind(), LayerKind::Line, "{b:?}");
        }
        if b.is_label() {
            assert!(b.required_features().contains(&Feature::Labels), "{b:?}");
        }
    }
    assert_eq!(LayerBucket::Background.source_class(), None);
    assert_eq!(
        LayerBucket::RoadHighwayFill.source_class(),
        Some(FeatureClass::RoadHighway)
    );
}

#[test]
fn layer_defaults_without_functions() {
    let layer = RenderLayer {
        id: "x".into(),
        bucket: LayerBucket::Water,
        kind: LayerKind::Fill,
        color: Color::BLACK,
        halo: None,
        width: None,
        opacity: Some(ZoomFunction::constant(1.7)),
    };
    assert_eq!(layer.width_at(12.0), 1.0);
    assert_eq!(layer.opacity_at(12.0), 1.0);
}
