use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading a slot snapshot
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot is missing the `{0}` column")]
    MissingColumn(&'static str),
    #[error("unsupported snapshot format: {0}")]
    UnsupportedFormat(String),
}

/// Failures while loading the tier configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "failed to parse config{}: {source}",
        .path.as_ref().map(|p| format!(" {}", p.display())).unwrap_or_default()
    )]
    Parse {
        /// None when the TOML did not come from a file
        path: Option<PathBuf>,
        #[source]
        source: toml::de::Error,
    },
    #[error("config defines no tiers")]
    NoTiers,
    #[error("tier #{0} has an empty name")]
    UnnamedTier(usize),
    #[error("tier `{0}` is defined more than once")]
    DuplicateTier(String),
}

/// Hard precondition failure of `clear_defaults`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClearError {
    #[error("no primary slot to move default stock into for SKU {sku}")]
    NoTarget { sku: String },
}

/// Failures writing a result to an external sink
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(#[from] arboard::Error),
    #[error("failed to write {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
