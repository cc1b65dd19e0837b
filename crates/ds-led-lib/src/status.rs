//! Charge status and the fixed fallback chain between statuses.
//!
//! `Full → Charging → Discharging → Default`. A status consults its own
//! threshold table first and inherits every field it leaves unset from the
//! status it falls back to.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::DsLedError;

/// Operating status of the controller's power supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Synthetic universal fallback.
    Default,
    Discharging,
    Charging,
    /// Charging complete. Uses the charging table.
    Full,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Default,
        Status::Discharging,
        Status::Charging,
        Status::Full,
    ];

    /// The status this one falls back to, `None` for `Default`.
    pub fn fallback(self) -> Option<Status> {
        match self {
            Status::Full => Some(Status::Charging),
            Status::Charging => Some(Status::Discharging),
            Status::Discharging => Some(Status::Default),
            Status::Default => None,
        }
    }

    /// This status followed by every ancestor, ending with `Default`.
    pub fn chain(self) -> impl DoubleEndedIterator<Item = Status> {
        // Longest chain is Full's; shorter ones are its suffixes
        const FULL_CHAIN: [Status; 4] = [
            Status::Full,
            Status::Charging,
            Status::Discharging,
            Status::Default,
        ];
        let start = FULL_CHAIN.iter().position(|s| *s == self).unwrap_or(0);
        FULL_CHAIN.into_iter().skip(start)
    }

    /// Interpret the kernel's `status` attribute of a power supply.
    ///
    /// `Charging` and `Full` map to themselves; anything else ("Discharging",
    /// "Not charging", "Unknown") is treated as discharging.
    pub fn from_power_supply(raw: &str) -> Status {
        let raw = raw.trim();
        if raw.starts_with("Charging") {
            Status::Charging
        } else if raw.starts_with("Full") {
            Status::Full
        } else {
            Status::Discharging
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Default => "default",
            Status::Discharging => "discharging",
            Status::Charging => "charging",
            Status::Full => "full",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = DsLedError;

    /// Strict, case-insensitive parse of a status name.
    fn from_str(s: &str) -> crate::error::Result<Self> {
        Status::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DsLedError::InvalidStatus(format!(
                    "\"{s}\" (expected default, discharging, charging or full)"
                ))
            })
    }
}
