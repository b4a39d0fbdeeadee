use std::sync::atomic::{AtomicU64, Ordering};

/// Estimated cost per operation, in whole cents rounded up. These are
/// coarse on purpose: the ledger exists to compare strategies and flag
/// runaway runs, not to reconcile invoices.
pub struct OperationCost;

impl OperationCost {
    /// Proxy fetch with JS rendering (~0.2¢, rounded up).
    pub const RENDERED_FETCH: u64 = 1;
    /// Text-model extraction call on a few KB of content.
    pub const TEXT_EXTRACTION: u64 = 1;
    /// Full-page screenshot render.
    pub const SCREENSHOT_CAPTURE: u64 = 2;
    /// Vision-model extraction. Roughly 50x the text tier, which is why
    /// the router only reaches it after the traditional loop fails.
    pub const VISION_EXTRACTION: u64 = 10;
}

/// Run-wide cost accumulator, shared across concurrent source workers.
#[derive(Debug, Default)]
pub struct CostLedger {
    total_cents: AtomicU64,
}

impl CostLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, cents: u64) {
        self.total_cents.fetch_add(cents, Ordering::Relaxed);
    }

    pub fn total_cents(&self) -> u64 {
        self.total_cents.load(Ordering::Relaxed)
    }
}
