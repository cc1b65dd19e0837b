//! Threshold tables — per-status settings keyed by battery percentage.
//!
//! A threshold is the upper bound (inclusive) of the battery range an entry
//! applies to. Entries are kept in ascending order and [`ThresholdTable::lookup`]
//! returns the first entry whose threshold is at or above the percentage.
//!
//! ```text
//! thresholds [20, 60, 100]
//!   0..=20  → entry 20
//!  21..=60  → entry 60
//!  61..=100 → entry 100
//! ```

use std::collections::BTreeMap;

use crate::DsLedError;
use crate::setting::Setting;

/// Highest battery percentage.
pub const MAX_PERCENTAGE: u8 = 100;

/// One (threshold, setting) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdEntry {
    pub threshold: u8,
    pub setting: Setting,
}

/// Settings for one status, ascending by threshold, no duplicate thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThresholdTable {
    entries: Vec<ThresholdEntry>,
}

impl ThresholdTable {
    /// Build a table from entries in any order.
    ///
    /// Thresholds above 100 are rejected. When a threshold repeats, the last
    /// entry wins and a warning is logged.
    pub fn new(entries: impl IntoIterator<Item = (u8, Setting)>) -> crate::error::Result<Self> {
        let mut by_threshold = BTreeMap::new();
        for (threshold, setting) in entries {
            if threshold > MAX_PERCENTAGE {
                return Err(DsLedError::InvalidConfiguration(format!(
                    "threshold {threshold}% is above {MAX_PERCENTAGE}%"
                )));
            }
            if by_threshold.insert(threshold, setting).is_some() {
                log::warn!("duplicate threshold {threshold}%, the later entry wins");
            }
        }
        Ok(ThresholdTable {
            entries: by_threshold
                .into_iter()
                .map(|(threshold, setting)| ThresholdEntry { threshold, setting })
                .collect(),
        })
    }

    /// A single catch-all entry at 100%.
    pub fn catch_all(setting: Setting) -> Self {
        ThresholdTable {
            entries: vec![ThresholdEntry {
                threshold: MAX_PERCENTAGE,
                setting,
            }],
        }
    }

    /// Setting of the first entry with `threshold >= percentage`, or `None`
    /// when the percentage is above every threshold.
    ///
    /// # Panics
    ///
    /// If `percentage` is above 100. Callers validate battery readings first.
    pub fn lookup(&self, percentage: u8) -> Option<&Setting> {
        assert!(
            percentage <= MAX_PERCENTAGE,
            "battery percentage {percentage} out of range 0..=100"
        );
        self.entries
            .iter()
            .find(|e| e.threshold >= percentage)
            .map(|e| &e.setting)
    }

    pub fn entries(&self) -> &[ThresholdEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
