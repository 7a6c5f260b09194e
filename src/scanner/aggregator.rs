//! Collects probe results from concurrent workers.
use super::ProbeResult;
use std::sync::{Mutex, PoisonError};

/// Append-only result list for one scan.
///
/// Workers push through a shared reference; the full list is only handed
/// out by consuming the aggregator, which the engine does after every worker
/// has been joined.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    results: Mutex<Vec<ProbeResult>>,
}

impl ResultAggregator {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    pub fn push(&self, result: ProbeResult) {
        // A worker that panicked mid-push cannot leave a half-written entry,
        // so a poisoned lock is still safe to use.
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result);
    }

    /// Consumes the aggregator and returns results in append order.
    pub fn finish(self) -> Vec<ProbeResult> {
        self.results
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the results out through a shared reference. Only for callers
    /// that can prove no worker still holds the aggregator.
    pub(crate) fn take(&self) -> Vec<ProbeResult> {
        std::mem::take(
            &mut *self
                .results
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}
