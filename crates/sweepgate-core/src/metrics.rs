//! Global atomic counters for campaign observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. at the end of a campaign).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters; no allocations, no locking.
pub struct Metrics {
    files_assessed: AtomicU64,
    batches_planned: AtomicU64,
    batches_validated: AtomicU64,
    rollbacks_performed: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            files_assessed: AtomicU64::new(0),
            batches_planned: AtomicU64::new(0),
            batches_validated: AtomicU64::new(0),
            rollbacks_performed: AtomicU64::new(0),
        }
    }

    /// Increment the files-assessed counter by one.
    pub fn inc_files_assessed(&self) {
        self.files_assessed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "files_assessed", "counter incremented");
    }

    /// Increment the batches-planned counter by one.
    pub fn inc_batches_planned(&self) {
        self.batches_planned.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "batches_planned", "counter incremented");
    }

    /// Increment the batches-validated counter by one.
    pub fn inc_batches_validated(&self) {
        self.batches_validated.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "batches_validated", "counter incremented");
    }

    /// Increment the rollbacks-performed counter by one.
    pub fn inc_rollbacks(&self) {
        self.rollbacks_performed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "rollbacks_performed", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    ///
    /// Call this at natural boundaries (end of a campaign) rather than
    /// on every increment.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            files_assessed = self.files_assessed(),
            batches_planned = self.batches_planned(),
            batches_validated = self.batches_validated(),
            rollbacks_performed = self.rollbacks_performed(),
        );
    }

    /// Read the current files-assessed count.
    pub fn files_assessed(&self) -> u64 {
        self.files_assessed.load(Ordering::Relaxed)
    }

    /// Read the current batches-planned count.
    pub fn batches_planned(&self) -> u64 {
        self.batches_planned.load(Ordering::Relaxed)
    }

    /// Read the current batches-validated count.
    pub fn batches_validated(&self) -> u64 {
        self.batches_validated.load(Ordering::Relaxed)
    }

    /// Read the current rollbacks-performed count.
    pub fn rollbacks_performed(&self) -> u64 {
        self.rollbacks_performed.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.files_assessed.store(0, Ordering::Relaxed);
        self.batches_planned.store(0, Ordering::Relaxed);
        self.batches_validated.store(0, Ordering::Relaxed);
        self.rollbacks_performed.store(0, Ordering::Relaxed);
    }
}
