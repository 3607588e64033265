//! Per-lot monotonic sequence source
//!
//! Every bid draws a strictly increasing 64-bit sequence for its lot; the
//! valid-bid projection orders by sequence, so this is the total order that
//! makes bid determination deterministic. Gaps are permitted - a commit that
//! fails after drawing a sequence simply leaves a hole.

use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use uuid::Uuid;

/// Source of strictly monotonic per-lot sequence numbers
///
/// Implementations must be thread-safe under arbitrary parallelism. The
/// in-process implementation below is the reference; a centralized
/// remote-increment variant (key `bid:seq:{lot_id}`) slots in behind this
/// trait for multi-instance deployments, and is the only variant that
/// preserves ordering across instances.
pub trait SequenceSource: Send + Sync {
    /// Next sequence for the lot; first call returns 1
    fn next(&self, lot_id: Uuid) -> i64;

    /// Last issued sequence for the lot, 0 if never issued (diagnostic)
    fn current(&self, lot_id: Uuid) -> i64;
}

/// In-process sequence source: one atomic counter per lot
#[derive(Default)]
pub struct InProcessSequence {
    counters: DashMap<Uuid, AtomicI64>,
}

impl InProcessSequence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SequenceSource for InProcessSequence {
    fn next(&self, lot_id: Uuid) -> i64 {
        self.counters
            .entry(lot_id)
            .or_default()
            .fetch_add(1, Ordering::SeqCst)
            + 1
    }

    fn current(&self, lot_id: Uuid) -> i64 {
        self.counters
            .get(&lot_id)
            .map(|counter| counter.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}
