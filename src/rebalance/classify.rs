use tracing::debug;
use serde::{Deserialize, Serialize};
use super::tiers::TierConfig;
use super::types::{Deficit, Pool, PoolEntry, SlotEntry};

/// Deficits in snapshot order and one pool per tier (two for split tiers),
/// in search order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classified {
    pub deficits: Vec<Deficit>,
    pub pools: Vec<Pool>,
}

/// Partitions a snapshot into shortfalls and tiered surplus pools.
///
/// Negative entries become deficits, zero entries are dropped, positive
/// entries go to the pool of the tier that claims their name. Positive
/// entries no tier claims are dropped. The input is not modified.
pub fn classify(entries: &[SlotEntry], config: &TierConfig) -> Classified {
    let (mut pools, routes) = config.pool_layout();
    let mut deficits = Vec::new();

    for entry in entries {
        if entry.quantity < 0 {
            deficits.push(Deficit::new(&entry.name, entry.quantity.unsigned_abs()));
            continue;
        }
        if entry.quantity == 0 {
            continue;
        }

        let Some(tier_idx) = config.tier_for(&entry.name) else {
            debug!(slot = %entry.name, quantity = entry.quantity, "Surplus slot matches no tier, skipping");
            continue;
        };

        let (non_primary, primary) = routes[tier_idx];
        let pool_idx = if entry.is_primary { primary } else { non_primary };
        pools[pool_idx]
            .entries
            .push(PoolEntry::new(&entry.name, entry.quantity.unsigned_abs()));
    }

    debug!(
        deficits = deficits.len(),
        pools = pools.len(),
        "Classified snapshot"
    );

    Classified { deficits, pools }
}
