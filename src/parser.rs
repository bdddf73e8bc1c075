use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use csv::{ReaderBuilder, Trim};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::rebalance::SlotEntry;

static SKU_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+$").expect("SKU pattern is a valid regex"));

/// Quantity as it arrives from the scanning layer: a number or raw on-screen text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawQuantity {
    Number(i64),
    Text(String),
    Other(serde_json::Value),
}

/// Slot row before its quantity has been normalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    pub name: String,
    pub quantity: RawQuantity,
    #[serde(default)]
    pub is_primary: bool,
}

/// JSON snapshot file / request body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub sku: Option<String>,
    /// Card title text the SKU can be extracted from when `sku` is absent
    #[serde(default)]
    pub title: Option<String>,
    pub entries: Vec<RawEntry>,
}

impl RawSnapshot {
    /// The explicit SKU if it is not blank, otherwise the one in the title
    pub fn resolve_sku(&self) -> Option<String> {
        self.sku
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| self.title.as_deref().and_then(extract_sku))
    }

    pub fn into_loaded(self) -> LoadedSnapshot {
        let sku = self.resolve_sku();
        let (entries, report) = normalize_entries(self.entries);
        LoadedSnapshot { sku, entries, report }
    }
}

/// What happened to the input rows while loading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_dropped: usize,
}

/// Normalized snapshot entries plus whatever SKU the source carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSnapshot {
    pub sku: Option<String>,
    pub entries: Vec<SlotEntry>,
    pub report: LoadReport,
}

/// Parses on-screen quantity text such as "-5", "+3" or "1,200".
/// Accepts one optional leading sign, then ASCII digits with `,` only between
/// digits. Returns None for anything else.
pub fn parse_quantity(value: &str) -> Option<i64> {
    let value = value.trim();
    let (sign, body) = match value.as_bytes().first()? {
        b'-' => ("-", &value[1..]),
        b'+' => ("", &value[1..]),
        _ => ("", value),
    };

    let bytes = body.as_bytes();
    if !bytes.first()?.is_ascii_digit() {
        return None;
    }

    let mut digits = String::with_capacity(body.len() + 1);
    digits.push_str(sign);
    for (idx, &b) in bytes.iter().enumerate() {
        match b {
            b'0'..=b'9' => digits.push(char::from(b)),
            // the byte before is always a digit: the body starts with one and
            // a comma needs a digit after it
            b',' if bytes.get(idx + 1).is_some_and(u8::is_ascii_digit) => {}
            _ => return None,
        }
    }
    digits.parse().ok()
}

/// Parses a boolean value from various string representations
pub fn parse_bool(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    matches!(lower.as_str(), "yes" | "y" | "true" | "1" | "primary")
}

/// Pulls the SKU out of a product card title: the trailing run of digits
pub fn extract_sku(title: &str) -> Option<String> {
    SKU_SUFFIX
        .find(title.trim_end())
        .map(|m| m.as_str().to_string())
}

/// Normalizes raw rows into slot entries.
///
/// Rows whose quantity is not a whole number are dropped entirely, so they
/// count as neither a shortfall nor a surplus. Rows without a name are dropped
/// as well.
pub fn normalize_entries(raw: Vec<RawEntry>) -> (Vec<SlotEntry>, LoadReport) {
    let mut report = LoadReport::default();
    let mut entries = Vec::with_capacity(raw.len());

    for row in raw {
        report.rows_read += 1;
        let name = row.name.trim();
        if name.is_empty() {
            report.rows_dropped += 1;
            continue;
        }

        let quantity = match &row.quantity {
            RawQuantity::Number(n) => Some(*n),
            RawQuantity::Text(text) => parse_quantity(text),
            RawQuantity::Other(_) => None,
        };
        let Some(quantity) = quantity else {
            warn!(slot = %name, quantity = ?row.quantity, "Malformed quantity, dropping slot");
            report.rows_dropped += 1;
            continue;
        };

        entries.push(SlotEntry::new(name, quantity, row.is_primary));
    }

    (entries, report)
}

/// Reads a snapshot from CSV with `slot`, `quantity` and `primary` columns
pub fn read_csv_snapshot<R: Read>(reader: R) -> Result<LoadedSnapshot, ParseError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if headers.len() < 2 {
        return Err(ParseError::MissingColumn("quantity"));
    }

    let column = |needles: &[&str], fallback: usize| {
        headers
            .iter()
            .position(|h| {
                let h = h.to_lowercase();
                needles.iter().any(|n| h.contains(n))
            })
            .unwrap_or(fallback)
    };
    let name_col = column(&["slot", "name", "location"][..], 0);
    let qty_col = column(&["qty", "quantity", "count"][..], 1);
    let primary_col = column(&["primary"][..], 2);

    let mut raw = Vec::new();
    let mut short_rows = 0;
    for result in reader.records() {
        let record = result?;
        let (Some(name), Some(quantity)) = (record.get(name_col), record.get(qty_col)) else {
            short_rows += 1;
            continue; // Skip incomplete records
        };
        raw.push(RawEntry {
            name: name.to_string(),
            quantity: RawQuantity::Text(quantity.to_string()),
            is_primary: record.get(primary_col).map(parse_bool).unwrap_or(false),
        });
    }

    let (entries, mut report) = normalize_entries(raw);
    report.rows_read += short_rows;
    report.rows_dropped += short_rows;
    debug!(rows = report.rows_read, dropped = report.rows_dropped, "Read CSV snapshot");

    Ok(LoadedSnapshot {
        sku: None,
        entries,
        report,
    })
}

/// Reads a JSON snapshot (see [`RawSnapshot`])
pub fn read_json_snapshot<R: Read>(reader: R) -> Result<LoadedSnapshot, ParseError> {
    let raw: RawSnapshot = serde_json::from_reader(reader)?;
    let loaded = raw.into_loaded();
    debug!(rows = loaded.report.rows_read, dropped = loaded.report.rows_dropped, "Read JSON snapshot");
    Ok(loaded)
}

/// Loads a snapshot file, picking the format from its extension
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<LoadedSnapshot, ParseError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" | "txt" => read_csv_snapshot(file),
        "json" => read_json_snapshot(file),
        other => Err(ParseError::UnsupportedFormat(other.to_string())),
    }
}
