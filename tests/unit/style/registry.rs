use super::*;

fn one_style(id: &str) -> String {
    format!(
        r##"{{ "id": "{id}", "name": "N", "background": "#ffffff", "text": "#000000", "rules": [] }}"##
    )
}

#[test]
fn builtin_table_loads_and_has_default() {
    let reg = StyleRegistry::builtin();
    assert!(reg.len() >= 5);
    assert!(reg.contains(DEFAULT_STYLE_ID));
    assert!(reg.contains("blueprint2"));
}

#[test]
fn unknown_id_is_a_classified_error() {
    let err = StyleRegistry::builtin().get("does-not-exist").unwrap_err();
    assert!(matches!(err, PosterError::UnknownStyle(ref id) if id == "does-not-exist"));
}

#[test]
fn duplicate_ids_are_rejected_at_load() {
    let json = format!(r#"{{ "styles": [{}, {}] }}"#, one_style("a"), one_style("a"));
    let err = StyleRegistry::from_json(&json).unwrap_err();
    assert!(err.to_string().contains("duplicate style id"));
}

#[test]
fn malformed_ids_are_rejected_at_load() {
    for bad in ["", "Has Space", "UPPER"] {
        let json = format!(r#"{{ "styles": [{}] }}"#, one_style(bad));
        assert!(StyleRegistry::from_json(&json).is_err(), "accepted {bad:?}");
    }
}

#[test]
fn unknown_visibility_fails_to_parse() {
    let json = r##"{ "styles": [{ "id": "x", "name": "X", "background": "#fff", "text": "#000",
        "rules": [{ "featureType": "water", "visibility": "sometimes" }] }] }"##;
    assert!(matches!(
        StyleRegistry::from_json(json),
        Err(PosterError::Serde(_))
    ));
}

#[test]
fn ids_keep_declaration_order() {
    let json = format!(r#"{{ "styles": [{}, {}] }}"#, one_style("zeta"), one_style("alpha"));
    let reg = StyleRegistry::from_json(&json).unwrap();
    assert_eq!(reg.ids().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
}
