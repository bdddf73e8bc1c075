use serde::{Deserialize, Serialize};

/// One storage location for one SKU at the moment the snapshot was taken
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEntry {
    pub name: String,
    pub quantity: i64, // negative = shortfall, positive = surplus
    #[serde(default)]
    pub is_primary: bool,
}

impl SlotEntry {
    pub fn new(name: impl Into<String>, quantity: i64, is_primary: bool) -> Self {
        Self {
            name: name.into(),
            quantity,
            is_primary,
        }
    }
}

/// An ordered list of slot entries for a single SKU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub sku: String,
    pub entries: Vec<SlotEntry>,
}

/// A slot that is short, with the amount still needed to close it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deficit {
    pub slot_name: String,
    pub remaining: u64,
}

impl Deficit {
    pub fn new(slot_name: impl Into<String>, remaining: u64) -> Self {
        Self {
            slot_name: slot_name.into(),
            remaining,
        }
    }
}

/// A surplus slot inside a pool, with the amount still available to draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    pub slot_name: String,
    pub remaining: u64,
}

impl PoolEntry {
    pub fn new(slot_name: impl Into<String>, remaining: u64) -> Self {
        Self {
            slot_name: slot_name.into(),
            remaining,
        }
    }
}

/// Which part of a tier a pool holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    All,
    NonPrimary,
    Primary,
}

/// Surplus entries of one tier (or one half of a split tier), in snapshot order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub tier: String,
    pub kind: PoolKind,
    pub entries: Vec<PoolEntry>,
}

impl Pool {
    pub fn new(tier: impl Into<String>, kind: PoolKind) -> Self {
        Self {
            tier: tier.into(),
            kind,
            entries: Vec::new(),
        }
    }

    /// Label used in logs and summaries, e.g. `floor/non-primary`
    pub fn label(&self) -> String {
        match self.kind {
            PoolKind::All => self.tier.clone(),
            PoolKind::NonPrimary => format!("{}/non-primary", self.tier),
            PoolKind::Primary => format!("{}/primary", self.tier),
        }
    }

    /// Total quantity still available in this pool
    pub fn available(&self) -> u64 {
        self.entries.iter().map(|e| e.remaining).sum()
    }
}

/// A single instruction to transfer stock between two slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub sku: String,
    pub source_slot: String,
    pub dest_slot: String,
    pub amount: u64,
}

impl MoveRecord {
    pub fn new(sku: &str, source_slot: &str, dest_slot: &str, amount: u64) -> Self {
        Self {
            sku: sku.to_string(),
            source_slot: source_slot.to_string(),
            dest_slot: dest_slot.to_string(),
            amount,
        }
    }

    /// Serializes the record as one line with the given field delimiter
    pub fn to_line(&self, delimiter: &str) -> String {
        format!(
            "{}{d}{}{d}{}{d}{}",
            self.sku,
            self.source_slot,
            self.dest_slot,
            self.amount,
            d = delimiter
        )
    }
}

/// How a single deficit ended up after allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeficitStatus {
    pub slot_name: String,
    pub requested: u64,
    pub remaining: u64,
    pub resolved: bool,
}

/// Result of one allocation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub moves: Vec<MoveRecord>,
    pub deficits: Vec<DeficitStatus>, // one per input deficit, input order
    pub unresolved: Vec<Deficit>,
}

impl Allocation {
    pub fn outcome(&self) -> Outcome {
        if self.deficits.is_empty() {
            Outcome::NoMoves
        } else if self.unresolved.is_empty() {
            Outcome::Resolved
        } else if self.moves.is_empty() {
            Outcome::Unresolved
        } else {
            Outcome::Partial
        }
    }

    pub fn total_moved(&self) -> u64 {
        self.moves.iter().map(|m| m.amount).sum()
    }
}

/// Summary status handed to whoever presents the result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Nothing was short, so there is nothing to move
    NoMoves,
    Resolved,
    Partial,
    /// Shortfalls exist but no surplus could be found for any of them
    Unresolved,
}

impl Outcome {
    /// User-facing message for this category
    pub fn notification(self) -> &'static str {
        match self {
            Outcome::NoMoves => "No moves needed",
            Outcome::Resolved => "All shortfalls resolved",
            Outcome::Partial => "Some shortfalls could not be resolved",
            Outcome::Unresolved => "No solution found",
        }
    }
}
