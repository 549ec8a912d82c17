use super::*;
use crate::frame::FrameShape;
use crate::layout::model::layout_for;

fn baselines(spec: &LayoutSpec, block: TextBlock) -> Vec<(TextSlot, f64)> {
    spec.text
        .iter()
        .filter(|s| s.block == block)
        .map(|s| (s.slot, s.baseline))
        .collect()
}

#[test]
fn all_visible_reproduces_the_table() {
    for frame in FrameShape::ALL {
        for headline in [true, false] {
            let spec = layout_for(frame, headline);
            assert_eq!(spec.reflowed(|_| true), spec);
        }
    }
}

#[test]
fn hidden_middle_slot_leaves_no_gap() {
    let spec = layout_for(FrameShape::Square, true);
    let out = spec.reflowed(|s| s != TextSlot::Coordinates);
    let bottom = baselines(&out, TextBlock::Bottom);
    let slots: Vec<_> = bottom.iter().map(|(s, _)| *s).collect();
    assert_eq!(slots, [TextSlot::City, TextSlot::Country, TextSlot::Custom]);

    // Table: 1330, 1405, 1460, 1525. Remaining steps are 55 (country) and 65 (custom).
    let b: Vec<f64> = bottom.iter().map(|(_, b)| *b).collect();
    assert_eq!(b[1] - b[0], 55.0);
    assert_eq!(b[2] - b[1], 65.0);
    let center = (1330.0 + 1525.0) / 2.0;
    assert_eq!((b[0] + b[2]) / 2.0, center);
}

#[test]
fn single_visible_slot_sits_at_the_block_centre() {
    let spec = layout_for(FrameShape::Circle, false);
    let out = spec.reflowed(|s| s == TextSlot::Custom);
    assert_eq!(out.text.len(), 1);
    assert_eq!(out.text[0].slot, TextSlot::Custom);
    assert_eq!(out.text[0].baseline, (1240.0 + 1450.0) / 2.0);
}

#[test]
fn blocks_reflow_independently() {
    let spec = layout_for(FrameShape::Heart, true);
    let out = spec.reflowed(|s| s != TextSlot::City);
    assert_eq!(out.slot(TextSlot::Headline), spec.slot(TextSlot::Headline));
    assert!(out.slot(TextSlot::City).is_none());
}

#[test]
fn nothing_visible_yields_no_text() {
    let spec = layout_for(FrameShape::House, true);
    let out = spec.reflowed(|_| false);
    assert!(out.text.is_empty());
    assert_eq!(out.viewport, spec.viewport);
}
