//! Latest-request-wins wrapper around [`ExportEngine`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::export::engine::{ExportEngine, ExportReport};
use crate::export::request::{ExportOptions, ExportRequest, RenderedAsset};
use crate::foundation::error::{PosterError, PosterResult};
use crate::state::poster::PosterState;

/// Identifies one export attempt against the scheduler's latest generation.
#[derive(Debug, Clone)]
pub struct GenerationToken {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl GenerationToken {
    pub(crate) fn new(generation: u64, latest: Arc<AtomicU64>) -> Self {
        Self { generation, latest }
    }

    /// A token nothing can supersede.
    pub fn detached() -> Self {
        Self {
            generation: 0,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.generation
    }

    /// `Err(Superseded)` once a newer export has started.
    pub fn check(&self) -> PosterResult<()> {
        if self.is_current() {
            Ok(())
        } else {
            Err(PosterError::Superseded(self.latest.load(Ordering::Acquire)))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Delivered(ExportReport),
    /// A newer export started before this one finished; its result was dropped.
    Superseded { generation: u64 },
}

/// The most recent asset handed to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub generation: u64,
    pub asset: Arc<RenderedAsset>,
}

/// Runs exports so that only the most recently started one is ever delivered.
///
/// Requests are not queued. Starting an export makes every in-flight one stale; stale
/// exports stop at their next checkpoint and report [`RenderOutcome::Superseded`].
pub struct RenderScheduler {
    engine: Arc<ExportEngine>,
    latest: Arc<AtomicU64>,
    delivered: watch::Sender<Option<Delivery>>,
}

impl RenderScheduler {
    pub fn new(engine: Arc<ExportEngine>) -> Self {
        let (delivered, _) = watch::channel(None);
        Self {
            engine,
            latest: Arc::new(AtomicU64::new(0)),
            delivered,
        }
    }

    pub fn engine(&self) -> &ExportEngine {
        &self.engine
    }

    pub fn current_generation(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// Watch the latest delivered asset. Only current generations ever write to it.
    pub fn subscribe(&self) -> watch::Receiver<Option<Delivery>> {
        self.delivered.subscribe()
    }

    fn begin(&self) -> GenerationToken {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        GenerationToken::new(generation, Arc::clone(&self.latest))
    }

    /// Snapshot `state` and export it, superseding anything still in flight.
    pub async fn export(
        &self,
        state: &PosterState,
        options: &ExportOptions,
    ) -> PosterResult<RenderOutcome> {
        let request = ExportRequest::snapshot(state)?;
        let token = self.begin();
        let generation = token.generation();
        tracing::debug!(generation, "export started");

        match self.engine.run(request, options, &token).await {
            Ok(report) => {
                if !self.publish(&token, &report.asset) {
                    return Ok(self.superseded(generation));
                }
                Ok(RenderOutcome::Delivered(report))
            }
            Err(PosterError::Superseded(_)) => Ok(self.superseded(generation)),
            Err(_) if !token.is_current() => Ok(self.superseded(generation)),
            Err(err) => Err(err),
        }
    }

    /// Hand `asset` to subscribers if `token` is still the latest generation.
    ///
    /// The currency check runs under the channel's write lock.
    fn publish(&self, token: &GenerationToken, asset: &RenderedAsset) -> bool {
        let generation = token.generation();
        self.delivered.send_if_modified(|slot| {
            if !token.is_current() || slot.as_ref().is_some_and(|d| d.generation > generation) {
                return false;
            }
            *slot = Some(Delivery {
                generation,
                asset: Arc::new(asset.clone()),
            });
            true
        })
    }

    fn superseded(&self, generation: u64) -> RenderOutcome {
        tracing::debug!(
            generation,
            latest = self.current_generation(),
            "stale export discarded"
        );
        RenderOutcome::Superseded { generation }
    }
}

#[cfg(test)]
#[path = "../tests/unit/scheduler.rs"]
mod tests;
