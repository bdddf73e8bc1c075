pub mod types;
pub mod tiers;
pub mod classify;
pub mod allocate;
pub mod clear;

use tracing::info;

pub use types::{
    Allocation, Deficit, DeficitStatus, MoveRecord, Outcome, Pool, PoolEntry, PoolKind, SlotEntry,
    Snapshot,
};
pub use tiers::{TierConfig, TierSpec};
pub use classify::{classify, Classified};
pub use allocate::{allocate, allocate_in_place};
pub use clear::{clear_defaults, ClearOutcome};

/// Classifies a snapshot and allocates surplus to its shortfalls in one pass
pub fn rebalance(snapshot: &Snapshot, config: &TierConfig) -> Allocation {
    let classified = classify(&snapshot.entries, config);
    let allocation = allocate(&classified.deficits, &classified.pools, &snapshot.sku);

    info!(
        sku = %snapshot.sku,
        deficits = allocation.deficits.len(),
        moves = allocation.moves.len(),
        moved = allocation.total_moved(),
        unresolved = allocation.unresolved.len(),
        outcome = ?allocation.outcome(),
        "Rebalanced snapshot"
    );

    allocation
}
