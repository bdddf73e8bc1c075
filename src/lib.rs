//! Stock reallocation planning for slotted inventory.
//!
//! Given a snapshot of storage slots for one SKU (negative quantity = short,
//! positive = surplus) this crate computes the move instructions that close
//! every shortfall it can, drawing from surplus in a fixed tier order.
//!
//! - [`rebalance`]: classification, allocation and default-location clearing, pure
//! - [`display`]: serialized move lines and readable summaries
//! - [`parser`]: CSV/JSON snapshot loading and quantity normalization
//! - [`config`]: TOML tier tables
//! - [`web`] / [`clipboard`]: outer surfaces

pub mod clipboard;
pub mod config;
pub mod display;
pub mod error;
pub mod parser;
pub mod rebalance;
pub mod web;

pub use display::{format_moves, Formatted};
pub use rebalance::{allocate, classify, clear_defaults, rebalance, Allocation, MoveRecord, SlotEntry};
