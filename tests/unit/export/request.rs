use super::*;
use crate::state::poster::{ExportSize, PaperPreset};

#[test]
fn snapshot_is_detached_from_the_live_state() {
    let mut live = PosterState::default();
    let req = ExportRequest::snapshot(&live).unwrap();
    live.location.city = "Lyon".to_owned();
    live.export.quality = 0.1;
    assert_eq!(req.state.location.city, "Paris");
    assert_eq!(req.quality, 0.92);
}

#[test]
fn preset_sizes_have_unit_ratio() {
    let req = ExportRequest::snapshot(&PosterState::default()).unwrap();
    assert_eq!((req.target_width, req.target_height), PaperPreset::A4.pixels());
    assert_eq!(req.output_size(), (2480, 3508));
}

#[test]
fn pixel_ratio_multiplies_output() {
    let mut state = PosterState::default();
    state.export.size = ExportSize::Pixels {
        width: 600,
        height: 800,
        pixel_ratio: 2.0,
    };
    let req = ExportRequest::snapshot(&state).unwrap();
    assert_eq!(req.output_size(), (1200, 1600));
}

#[test]
fn invalid_requests_are_rejected() {
    let mut state = PosterState::default();
    state.export.quality = 1.5;
    assert!(matches!(
        ExportRequest::snapshot(&state),
        Err(PosterError::Validation(_))
    ));

    let mut state = PosterState::default();
    state.export.size = ExportSize::Pixels {
        width: 0,
        height: 10,
        pixel_ratio: 1.0,
    };
    assert!(ExportRequest::snapshot(&state).is_err());

    let mut state = PosterState::default();
    state.export.size = ExportSize::Pixels {
        width: 40_000,
        height: 10,
        pixel_ratio: 2.0,
    };
    assert!(ExportRequest::snapshot(&state).is_err());
}

#[test]
fn watermark_options_parse_with_defaults() {
    let opts: ExportOptions = serde_json::from_str(r#"{"watermark":{"text":"DRAFT"}}"#).unwrap();
    let wm = opts.watermark.unwrap();
    assert_eq!(wm.text, "DRAFT");
    assert_eq!(wm.angle, 30.0);
    assert!(wm.spacing.is_none());
}

#[test]
fn watermark_spacing_must_be_positive() {
    for spacing in [0.0, -1000.0, f64::NAN, f64::INFINITY] {
        let opts = ExportOptions {
            watermark: Some(Watermark {
                spacing: Some(spacing),
                ..Watermark::default()
            }),
        };
        assert!(
            matches!(opts.validate(), Err(PosterError::Validation(_))),
            "spacing {spacing}"
        );
    }
    let opts = ExportOptions {
        watermark: Some(Watermark {
            spacing: Some(120.0),
            ..Watermark::default()
        }),
    };
    assert!(opts.validate().is_ok());
    assert!(ExportOptions::default().validate().is_ok());
}
