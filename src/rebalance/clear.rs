use std::collections::BTreeSet;
use tracing::{debug, info};
use serde::{Deserialize, Serialize};
use crate::error::ClearError;
use super::types::{MoveRecord, SlotEntry};

/// Successful result of clearing the default locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "moves", rename_all = "snake_case")]
pub enum ClearOutcome {
    Cleared(Vec<MoveRecord>),
    /// No default location holds positive stock
    NothingToMove,
}

impl ClearOutcome {
    pub fn moves(&self) -> &[MoveRecord] {
        match self {
            ClearOutcome::Cleared(moves) => moves,
            ClearOutcome::NothingToMove => &[],
        }
    }
}

/// Moves the whole balance of every default location into the first primary slot.
///
/// Sources are the positive entries whose name is in `exact_names`, in
/// snapshot order. The target is the first entry flagged primary, whatever
/// its quantity. Fails with [`ClearError::NoTarget`] when the snapshot has no
/// primary slot, which is checked before looking for sources.
pub fn clear_defaults(
    entries: &[SlotEntry],
    exact_names: &BTreeSet<String>,
    sku: &str,
) -> Result<ClearOutcome, ClearError> {
    let target = entries
        .iter()
        .find(|e| e.is_primary)
        .ok_or_else(|| ClearError::NoTarget {
            sku: sku.to_string(),
        })?;

    let moves: Vec<MoveRecord> = entries
        .iter()
        .filter(|e| e.quantity > 0 && exact_names.contains(&e.name))
        .filter(|e| {
            let same = e.name == target.name;
            if same {
                debug!(slot = %e.name, "Default location is also the target, skipping");
            }
            !same
        })
        .map(|e| MoveRecord::new(sku, &e.name, &target.name, e.quantity.unsigned_abs()))
        .collect();

    if moves.is_empty() {
        debug!(sku, "No default stock to clear");
        return Ok(ClearOutcome::NothingToMove);
    }

    info!(
        sku,
        target = %target.name,
        moves = moves.len(),
        "Cleared default locations"
    );
    Ok(ClearOutcome::Cleared(moves))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> BTreeSet<String> {
        ["CAMP0000", "FISH0000"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_moves_whole_balance_into_first_primary() {
        let entries = vec![
            SlotEntry::new("CAMP0000", 7, false),
            SlotEntry::new("A1", -2, false),
            SlotEntry::new("P1", 0, true),
            SlotEntry::new("P2", 5, true),
            SlotEntry::new("FISH0000", 2, false),
        ];
        let outcome = clear_defaults(&entries, &defaults(), "42").unwrap();
        assert_eq!(
            outcome,
            ClearOutcome::Cleared(vec![
                MoveRecord::new("42", "CAMP0000", "P1", 7),
                MoveRecord::new("42", "FISH0000", "P1", 2),
            ])
        );
    }

    #[test]
    fn test_no_target() {
        let entries = vec![SlotEntry::new("CAMP0000", 7, false)];
        let err = clear_defaults(&entries, &defaults(), "42").unwrap_err();
        assert!(matches!(err, ClearError::NoTarget { .. }));
    }

    #[test]
    fn test_no_target_checked_before_sources() {
        let err = clear_defaults(&[], &defaults(), "42").unwrap_err();
        assert!(matches!(err, ClearError::NoTarget { .. }));
    }

    #[test]
    fn test_nothing_to_move() {
        let entries = vec![
            SlotEntry::new("CAMP0000", 0, false),
            SlotEntry::new("FISH0000", -1, false),
            SlotEntry::new("P1", 3, true),
        ];
        let outcome = clear_defaults(&entries, &defaults(), "42").unwrap();
        assert_eq!(outcome, ClearOutcome::NothingToMove);
        assert!(outcome.moves().is_empty());
    }

    #[test]
    fn test_primary_default_location_is_not_its_own_source() {
        let entries = vec![
            SlotEntry::new("CAMP0000", 4, true),
            SlotEntry::new("FISH0000", 1, false),
        ];
        let outcome = clear_defaults(&entries, &defaults(), "42").unwrap();
        assert_eq!(outcome.moves(), &[MoveRecord::new("42", "FISH0000", "CAMP0000", 1)]);
    }
}
