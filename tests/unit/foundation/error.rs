use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PosterError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        PosterError::unknown_style("x")
            .to_string()
            .contains("unknown style:")
    );
    assert!(
        PosterError::asset_timeout("x")
            .to_string()
            .contains("asset timeout:")
    );
    assert!(
        PosterError::encoding("x")
            .to_string()
            .contains("encoding error:")
    );
    assert!(
        PosterError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn only_provider_errors_are_transient() {
    assert!(PosterError::provider("503").is_transient());
    assert!(!PosterError::asset_timeout("map").is_transient());
    assert!(!PosterError::configuration("key").is_transient());
    assert!(!PosterError::encoding("png").is_transient());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PosterError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
