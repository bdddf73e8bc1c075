use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};
use super::types::{Pool, PoolKind};

/// Classification rule and search position for one class of surplus slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSpec {
    pub name: String,
    #[serde(default)]
    pub exact_names: BTreeSet<String>,
    #[serde(default)]
    pub prefixes: Vec<String>,
    #[serde(default)]
    pub split_by_primary: bool,
}

impl TierSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exact_names: BTreeSet::new(),
            prefixes: Vec::new(),
            split_by_primary: false,
        }
    }

    pub fn with_exact<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exact_names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefixes.extend(prefixes.into_iter().map(Into::into));
        self
    }

    pub fn split_by_primary(mut self) -> Self {
        self.split_by_primary = true;
        self
    }

    /// Length of the longest configured prefix that `name` starts with,
    /// compared case-insensitively
    fn longest_prefix_match(&self, name: &str) -> Option<usize> {
        self.prefixes
            .iter()
            .filter(|p| {
                name.get(..p.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(p))
            })
            .map(|p| p.len())
            .max()
    }
}

/// Ordered table of tiers. Position in the table is search priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    pub tiers: Vec<TierSpec>,
}

impl Default for TierConfig {
    /// Default/clearance locations first, then floor stock (non-primary before
    /// primary), then backroom stock as a last resort
    fn default() -> Self {
        Self {
            tiers: vec![
                TierSpec::new("default").with_exact(["CAMP0000", "FISH0000"]),
                TierSpec::new("floor").with_prefixes([""]).split_by_primary(),
                TierSpec::new("backroom").with_prefixes(["BR", "BKRM"]),
            ],
        }
    }
}

impl TierConfig {
    pub fn new(tiers: Vec<TierSpec>) -> Self {
        Self { tiers }
    }

    /// Exact-name set of the first tier that has one; this is the "default"
    /// location set cleared by `clear_defaults`
    pub fn default_exact_names(&self) -> BTreeSet<String> {
        self.tiers
            .iter()
            .find(|t| !t.exact_names.is_empty())
            .map(|t| t.exact_names.clone())
            .unwrap_or_default()
    }

    /// Finds the tier a surplus slot belongs to.
    ///
    /// Exact names are checked against every tier before any prefix is
    /// considered. Among prefix matches the longest prefix wins, and on equal
    /// length the earlier tier wins, so an empty prefix only catches what no
    /// other tier claims.
    pub fn tier_for(&self, name: &str) -> Option<usize> {
        if let Some(idx) = self.tiers.iter().position(|t| t.exact_names.contains(name)) {
            return Some(idx);
        }

        let mut best: Option<(usize, usize)> = None; // (tier index, prefix length)
        for (idx, tier) in self.tiers.iter().enumerate() {
            if let Some(len) = tier.longest_prefix_match(name) {
                if best.map_or(true, |(_, best_len)| len > best_len) {
                    best = Some((idx, len));
                }
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// Builds the empty pools in search order, along with where each tier's
    /// entries land: `(pool for non-primary or all, pool for primary)`
    pub fn pool_layout(&self) -> (Vec<Pool>, Vec<(usize, usize)>) {
        let mut pools = Vec::new();
        let mut routes = Vec::with_capacity(self.tiers.len());

        for tier in &self.tiers {
            if tier.split_by_primary {
                let non_primary = pools.len();
                pools.push(Pool::new(&tier.name, PoolKind::NonPrimary));
                pools.push(Pool::new(&tier.name, PoolKind::Primary));
                routes.push((non_primary, non_primary + 1));
            } else {
                let all = pools.len();
                pools.push(Pool::new(&tier.name, PoolKind::All));
                routes.push((all, all));
            }
        }

        (pools, routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_beats_prefix() {
        let config = TierConfig::new(vec![
            TierSpec::new("backroom").with_prefixes(["CAMP"]),
            TierSpec::new("default").with_exact(["CAMP0000"]),
        ]);
        assert_eq!(config.tier_for("CAMP0000"), Some(1));
        assert_eq!(config.tier_for("CAMP0001"), Some(0));
    }

    #[test]
    fn test_prefix_is_case_insensitive() {
        let config = TierConfig::default();
        assert_eq!(config.tier_for("br-12"), Some(2));
        assert_eq!(config.tier_for("Bkrm04"), Some(2));
    }

    #[test]
    fn test_exact_is_case_sensitive() {
        let config = TierConfig::default();
        // falls through to the catch-all floor tier
        assert_eq!(config.tier_for("camp0000"), Some(1));
    }

    #[test]
    fn test_catch_all_only_when_nothing_longer_matches() {
        let config = TierConfig::default();
        assert_eq!(config.tier_for("A12-03"), Some(1));
        assert_eq!(config.tier_for("BR0001"), Some(2));
    }

    #[test]
    fn test_no_match() {
        let config = TierConfig::new(vec![TierSpec::new("backroom").with_prefixes(["BR"])]);
        assert_eq!(config.tier_for("A12"), None);
        assert_eq!(config.tier_for("B"), None);
    }

    #[test]
    fn test_equal_prefix_length_prefers_earlier_tier() {
        let config = TierConfig::new(vec![
            TierSpec::new("first").with_prefixes(["AB"]),
            TierSpec::new("second").with_prefixes(["ab"]),
        ]);
        assert_eq!(config.tier_for("ABC"), Some(0));
    }

    #[test]
    fn test_prefix_on_multibyte_name() {
        let config = TierConfig::new(vec![TierSpec::new("t").with_prefixes(["AB"])]);
        assert_eq!(config.tier_for("Aé"), None);
    }

    #[test]
    fn test_pool_layout_splits() {
        let (pools, routes) = TierConfig::default().pool_layout();
        let labels: Vec<String> = pools.iter().map(Pool::label).collect();
        assert_eq!(
            labels,
            vec!["default", "floor/non-primary", "floor/primary", "backroom"]
        );
        assert_eq!(routes, vec![(0, 0), (1, 2), (3, 3)]);
    }

    #[test]
    fn test_default_exact_names() {
        let names = TierConfig::default().default_exact_names();
        assert!(names.contains("CAMP0000"));
        assert!(names.contains("FISH0000"));
        assert!(TierConfig::new(vec![]).default_exact_names().is_empty());
    }
}
