use tracing::debug;
use super::types::{Allocation, Deficit, DeficitStatus, MoveRecord, Pool};

/// Greedy tier-ordered matcher over working copies of the inputs
pub fn allocate(deficits: &[Deficit], pools: &[Pool], sku: &str) -> Allocation {
    let mut deficits = deficits.to_vec();
    let mut pools = pools.to_vec();
    allocate_in_place(&mut deficits, &mut pools, sku)
}

/// Same as [`allocate`] but leaves the post-move state in `deficits` and
/// `pools`. Running it again on that state yields no moves.
///
/// Deficits are served in order. Each one walks the pools in search order and
/// each pool in entry order, taking `min(deficit, surplus)` from every source
/// that still has stock, until it is closed or every pool is drained. A source
/// never feeds a deficit with the same slot name.
pub fn allocate_in_place(deficits: &mut [Deficit], pools: &mut [Pool], sku: &str) -> Allocation {
    let mut moves = Vec::new();
    let mut statuses = Vec::with_capacity(deficits.len());

    for deficit in deficits.iter_mut() {
        let requested = deficit.remaining;

        'pools: for pool in pools.iter_mut() {
            for source in pool.entries.iter_mut() {
                if deficit.remaining == 0 {
                    break 'pools;
                }
                if source.remaining == 0 || source.slot_name == deficit.slot_name {
                    continue;
                }

                let amount = deficit.remaining.min(source.remaining);
                deficit.remaining -= amount;
                source.remaining -= amount;

                debug!(
                    from = %source.slot_name,
                    to = %deficit.slot_name,
                    amount,
                    pool = %pool.tier,
                    "Planned move"
                );
                moves.push(MoveRecord::new(sku, &source.slot_name, &deficit.slot_name, amount));
            }
        }

        statuses.push(DeficitStatus {
            slot_name: deficit.slot_name.clone(),
            requested,
            remaining: deficit.remaining,
            resolved: deficit.remaining == 0,
        });
    }

    let unresolved = deficits
        .iter()
        .filter(|d| d.remaining > 0)
        .cloned()
        .collect();

    Allocation {
        moves,
        deficits: statuses,
        unresolved,
    }
}
