use crate::layout::model::{LayoutSpec, TextBlock, TextSlot, TextSlotSpec};

impl LayoutSpec {
    /// Drop hidden slots and close the gaps they leave.
    ///
    /// Within each block the remaining slots keep the baseline steps they had in the
    /// table and the block stays centred where it was.
    pub fn reflowed(&self, visible: impl Fn(TextSlot) -> bool) -> LayoutSpec {
        let mut text = Vec::with_capacity(self.text.len());
        for block in [TextBlock::Top, TextBlock::Bottom] {
            let all: Vec<&TextSlotSpec> = self.text.iter().filter(|s| s.block == block).collect();
            text.extend(reflow_block(&all, &visible));
        }
        LayoutSpec {
            text,
            ..self.clone()
        }
    }
}

fn reflow_block(all: &[&TextSlotSpec], visible: &impl Fn(TextSlot) -> bool) -> Vec<TextSlotSpec> {
    let (Some(first), Some(last)) = (all.first(), all.last()) else {
        return Vec::new();
    };
    let center = (first.baseline + last.baseline) / 2.0;

    // Offset of each visible slot relative to the first visible one.
    let mut offsets = Vec::with_capacity(all.len());
    let mut acc = 0.0;
    for (i, spec) in all.iter().enumerate() {
        if !visible(spec.slot) {
            continue;
        }
        if !offsets.is_empty() {
            acc += spec.baseline - all[i - 1].baseline;
        }
        offsets.push((**spec, acc));
    }

    let top = center - acc / 2.0;
    offsets
        .into_iter()
        .map(|(spec, offset)| TextSlotSpec {
            baseline: top + offset,
            ..spec
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/layout/flow.rs"]
mod tests;
