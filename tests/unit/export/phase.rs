use super::*;

#[test]
fn happy_path_trail() {
    let mut t = PhaseTracker::new();
    for p in [
        ExportPhase::Preparing,
        ExportPhase::WaitingForAssets,
        ExportPhase::Compositing,
        ExportPhase::Encoding,
        ExportPhase::Done,
    ] {
        t.advance(p).unwrap();
    }
    assert_eq!(t.current(), ExportPhase::Done);
    assert_eq!(t.trail().len(), 6);
    assert_eq!(t.trail()[0], ExportPhase::Idle);
}

#[test]
fn skipping_a_phase_is_rejected() {
    let mut t = PhaseTracker::new();
    t.advance(ExportPhase::Preparing).unwrap();
    let err = t.advance(ExportPhase::Compositing).unwrap_err();
    assert!(err.to_string().contains("preparing -> compositing"), "{err}");
    assert_eq!(t.current(), ExportPhase::Preparing);
}

#[test]
fn failure_is_reachable_from_any_live_phase_and_final() {
    let mut t = PhaseTracker::new();
    t.advance(ExportPhase::Preparing).unwrap();
    t.fail();
    assert_eq!(t.current(), ExportPhase::Failed);
    t.fail();
    assert_eq!(t.trail(), &[ExportPhase::Idle, ExportPhase::Preparing, ExportPhase::Failed]);
    assert!(t.advance(ExportPhase::WaitingForAssets).is_err());
    assert!(!ExportPhase::Done.can_transition_to(ExportPhase::Failed));
}
