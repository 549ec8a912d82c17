use super::*;
use serde_json::json;

#[test]
fn parses_hex_rgb_and_rgba() {
    let c: Color = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, Color::rgb(255, 0, 0));

    let c: Color = serde_json::from_value(json!("#0000ff80")).unwrap();
    assert_eq!(c, Color::rgba(0, 0, 255, 128));

    let c: Color = serde_json::from_value(json!("#abc")).unwrap();
    assert_eq!(c, Color::rgb(0xaa, 0xbb, 0xcc));
}

#[test]
fn parses_rgba_object_and_array() {
    let c: Color = serde_json::from_value(json!({"r": 1.0, "g": 0.5, "b": 0.0})).unwrap();
    assert_eq!(c, Color::rgb(255, 128, 0));

    let c: Color = serde_json::from_value(json!([0.0, 0.0, 1.0, 0.5])).unwrap();
    assert_eq!(c, Color::rgba(0, 0, 255, 128));
}

#[test]
fn parses_hsla_object() {
    let c: Color = serde_json::from_value(json!({"h": 0.0, "s": 1.0, "l": 0.5})).unwrap();
    assert_eq!(c, Color::rgb(255, 0, 0));
}

#[test]
fn serializes_as_hex_and_round_trips() {
    for c in [Color::rgb(18, 52, 86), Color::rgba(1, 2, 3, 4)] {
        let v = serde_json::to_value(c).unwrap();
        let back: Color = serde_json::from_value(v).unwrap();
        assert_eq!(back, c);
    }
    assert_eq!(serde_json::to_value(Color::WHITE).unwrap(), json!("#ffffff"));
}

#[test]
fn rejects_malformed_hex() {
    assert!(serde_json::from_value::<Color>(json!("#12345")).is_err());
    assert!(serde_json::from_value::<Color>(json!("#gg0000")).is_err());
}

#[test]
fn premultiplies_by_alpha() {
    assert_eq!(Color::rgba(255, 255, 255, 128).to_premul(), [128, 128, 128, 128]);
    assert_eq!(Color::rgb(10, 20, 30).to_premul(), [10, 20, 30, 255]);
    assert_eq!(Color::rgb(10, 20, 30).with_opacity(0.0).a, 0);
}
