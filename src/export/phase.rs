use std::fmt;

use crate::foundation::error::{PosterError, PosterResult};

/// Stages of one export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportPhase {
    Idle,
    Preparing,
    WaitingForAssets,
    Compositing,
    Encoding,
    Done,
    Failed,
}

impl ExportPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExportPhase::Done | ExportPhase::Failed)
    }

    /// The single forward step, or `None` from a terminal phase.
    pub fn next(self) -> Option<ExportPhase> {
        use ExportPhase::*;
        match self {
            Idle => Some(Preparing),
            Preparing => Some(WaitingForAssets),
            WaitingForAssets => Some(Compositing),
            Compositing => Some(Encoding),
            Encoding => Some(Done),
            Done | Failed => None,
        }
    }

    pub fn can_transition_to(self, to: ExportPhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == ExportPhase::Failed || self.next() == Some(to)
    }
}

impl fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExportPhase::Idle => "idle",
            ExportPhase::Preparing => "preparing",
            ExportPhase::WaitingForAssets => "waiting-for-assets",
            ExportPhase::Compositing => "compositing",
            ExportPhase::Encoding => "encoding",
            ExportPhase::Done => "done",
            ExportPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Current phase plus every phase visited, with transitions checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTracker {
    trail: Vec<ExportPhase>,
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            trail: vec![ExportPhase::Idle],
        }
    }

    pub fn current(&self) -> ExportPhase {
        self.trail.last().copied().unwrap_or(ExportPhase::Idle)
    }

    pub fn trail(&self) -> &[ExportPhase] {
        &self.trail
    }

    pub fn advance(&mut self, to: ExportPhase) -> PosterResult<()> {
        let from = self.current();
        if !from.can_transition_to(to) {
            return Err(PosterError::validation(format!(
                "illegal export transition {from} -> {to}"
            )));
        }
        tracing::debug!(%from, %to, "export phase");
        self.trail.push(to);
        Ok(())
    }

    /// Record failure from whatever non-terminal phase is current.
    pub fn fail(&mut self) {
        if !self.current().is_terminal() {
            self.trail.push(ExportPhase::Failed);
        }
    }

    pub fn into_trail(self) -> Vec<ExportPhase> {
        self.trail
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/phase.rs"]
mod tests;
