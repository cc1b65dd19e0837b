//! Setting resolution — battery percentage + status → complete setting.
//!
//! Each status in the fallback chain may contribute a partial setting from
//! its own table. Results are merged from `Default` upwards, so a field set
//! by a status overrides whatever its ancestors would have produced for the
//! same percentage, and a field it leaves unset is inherited.
//!
//! The model is immutable after construction. A [`Resolver`] can be shared
//! between threads as-is; to reload, build a new model and swap the resolver.

use crate::setting::Setting;
use crate::status::Status;
use crate::table::{MAX_PERCENTAGE, ThresholdTable};

/// Parsed controller configuration: the default table plus optional
/// per-status tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationModel {
    default: ThresholdTable,
    discharging: Option<ThresholdTable>,
    charging: Option<ThresholdTable>,
}

impl ConfigurationModel {
    /// Build a model. `default` becomes a single catch-all entry at 100%.
    pub fn new(
        default: Setting,
        discharging: Option<ThresholdTable>,
        charging: Option<ThresholdTable>,
    ) -> Self {
        ConfigurationModel {
            default: ThresholdTable::catch_all(default),
            discharging,
            charging,
        }
    }

    /// The table consulted for `status`. `Full` shares the charging table.
    pub fn table_for(&self, status: Status) -> Option<&ThresholdTable> {
        match status {
            Status::Default => Some(&self.default),
            Status::Discharging => self.discharging.as_ref(),
            Status::Charging | Status::Full => self.charging.as_ref(),
        }
    }

    /// The explicit default setting (possibly partially absent).
    pub fn default_setting(&self) -> Setting {
        self.default
            .entries()
            .first()
            .map(|e| e.setting)
            .unwrap_or(Setting::EMPTY)
    }
}

impl Default for ConfigurationModel {
    fn default() -> Self {
        ConfigurationModel::new(Setting::EMPTY, None, None)
    }
}

/// Resolves settings against one [`ConfigurationModel`].
#[derive(Debug, Clone)]
pub struct Resolver {
    model: ConfigurationModel,
    terminal: Setting,
}

impl Resolver {
    /// Resolver whose last-resort fallback is [`Setting::OFF`].
    pub fn new(model: ConfigurationModel) -> Self {
        Self::with_terminal(model, Setting::OFF)
    }

    /// Resolver with a custom last-resort fallback.
    pub fn with_terminal(model: ConfigurationModel, terminal: Setting) -> Self {
        Resolver { model, terminal }
    }

    /// Resolve the setting for `percentage` (0..=100) in `status`.
    ///
    /// Never fails. With the default terminal fallback the result is always
    /// complete.
    ///
    /// # Panics
    ///
    /// If `percentage` is above 100.
    pub fn resolve(&self, percentage: u8, status: Status) -> Setting {
        assert!(
            percentage <= MAX_PERCENTAGE,
            "battery percentage {percentage} out of range 0..=100"
        );
        let resolved = status.chain().rev().fold(self.terminal, |inherited, st| {
            match self.model.table_for(st).and_then(|t| t.lookup(percentage)) {
                Some(own) => own.merge(&inherited),
                None => inherited,
            }
        });
        log::debug!("resolved {percentage}% {status}: {resolved}");
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::led::{Colour, parse_colour};

    fn colour(hex: &str) -> Option<Colour> {
        Some(parse_colour(hex).unwrap())
    }

    fn setting(c: Option<Colour>, b: Option<u8>, m: Option<u8>) -> Setting {
        Setting::new(c, b, m).unwrap()
    }

    /// Default white/128/00000, a two-step discharging table and a charging
    /// table that only sets player LEDs.
    fn example_model() -> ConfigurationModel {
        let default = setting(colour("#FFFFFF"), Some(128), Some(0b00000));
        let discharging = ThresholdTable::new([
            (100, setting(colour("#001000"), None, None)),
            (10, setting(colour("#FF0000"), Some(255), None)),
        ])
        .unwrap();
        let charging = ThresholdTable::new([
            (0, setting(None, None, Some(0b00100))),
            (100, setting(None, None, Some(0b11111))),
        ])
        .unwrap();
        ConfigurationModel::new(default, Some(discharging), Some(charging))
    }

    // ── model ──

    #[test]
    fn full_shares_charging_table() {
        let m = example_model();
        assert_eq!(m.table_for(Status::Full), m.table_for(Status::Charging));
    }

    #[test]
    fn default_table_is_catch_all() {
        let m = example_model();
        let t = m.table_for(Status::Default).unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.entries()[0].threshold, 100);
        assert_eq!(m.default_setting().brightness(), Some(128));
    }

    // ── resolve ──

    #[test]
    fn discharging_inherits_from_default() {
        let r = Resolver::new(example_model());
        assert_eq!(
            r.resolve(50, Status::Discharging),
            setting(colour("#001000"), Some(128), Some(0))
        );
    }

    #[test]
    fn discharging_low_battery_bucket() {
        let r = Resolver::new(example_model());
        assert_eq!(
            r.resolve(5, Status::Discharging),
            setting(colour("#FF0000"), Some(255), Some(0))
        );
        assert_eq!(r.resolve(10, Status::Discharging).brightness(), Some(255));
        assert_eq!(r.resolve(11, Status::Discharging).brightness(), Some(128));
    }

    #[test]
    fn charging_inherits_across_statuses() {
        let r = Resolver::new(example_model());
        // Colour and brightness come from discharging's 50% bucket, LEDs from
        // charging's own table. Charging thresholds are upper bounds too, so
        // 50% lands in the 100% entry, not the 0% one.
        assert_eq!(
            r.resolve(50, Status::Charging),
            setting(colour("#001000"), Some(128), Some(0b11111))
        );
        assert_eq!(
            r.resolve(0, Status::Charging),
            setting(colour("#FF0000"), Some(255), Some(0b00100))
        );
    }

    #[test]
    fn full_equals_charging() {
        let r = Resolver::new(example_model());
        for p in 0..=100 {
            assert_eq!(r.resolve(p, Status::Full), r.resolve(p, Status::Charging));
        }
    }

    #[test]
    fn default_status_ignores_other_tables() {
        let r = Resolver::new(example_model());
        assert_eq!(
            r.resolve(5, Status::Default),
            setting(colour("#FFFFFF"), Some(128), Some(0))
        );
    }

    #[test]
    fn no_tables_resolves_to_default_everywhere() {
        let default = setting(colour("#123456"), Some(7), Some(0b10001));
        let r = Resolver::new(ConfigurationModel::new(default, None, None));
        for status in Status::ALL {
            for p in [0, 1, 50, 99, 100] {
                assert_eq!(r.resolve(p, status), default);
            }
        }
    }

    #[test]
    fn gap_above_table_defers_to_fallback() {
        let discharging =
            ThresholdTable::new([(30, setting(colour("#FF0000"), None, None))]).unwrap();
        let default = setting(colour("#00FF00"), Some(50), Some(1));
        let r = Resolver::new(ConfigurationModel::new(default, Some(discharging), None));
        assert_eq!(r.resolve(31, Status::Discharging), default);
        assert_eq!(r.resolve(30, Status::Discharging).colour(), colour("#FF0000"));
    }

    #[test]
    fn missing_default_fields_use_terminal() {
        let r = Resolver::new(ConfigurationModel::default());
        for status in Status::ALL {
            assert_eq!(r.resolve(42, status), Setting::OFF);
        }
    }

    #[test]
    fn partial_default_is_completed_by_terminal() {
        let default = setting(colour("#ABCDEF"), None, None);
        let r = Resolver::new(ConfigurationModel::new(default, None, None));
        let s = r.resolve(80, Status::Charging);
        assert!(s.is_complete());
        assert_eq!(s.colour(), colour("#ABCDEF"));
        assert_eq!(s.brightness(), Some(0));
        assert_eq!(s.player_leds(), Some(0));
    }

    #[test]
    fn custom_terminal_can_leave_fields_absent() {
        let r = Resolver::with_terminal(ConfigurationModel::default(), Setting::EMPTY);
        assert!(r.resolve(10, Status::Full).is_empty());
    }

    #[test]
    fn resolve_is_idempotent() {
        let r = Resolver::new(example_model());
        for status in Status::ALL {
            assert_eq!(r.resolve(37, status), r.resolve(37, status));
        }
    }

    #[test]
    fn resolve_always_complete_with_off_terminal() {
        let r = Resolver::new(example_model());
        for status in Status::ALL {
            for p in 0..=100 {
                assert!(r.resolve(p, status).is_complete());
            }
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn resolve_above_100_panics() {
        Resolver::new(example_model()).resolve(101, Status::Discharging);
    }

    #[test]
    fn resolver_shared_across_threads() {
        let r = std::sync::Arc::new(Resolver::new(example_model()));
        let expected = r.resolve(50, Status::Charging);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let r = std::sync::Arc::clone(&r);
                std::thread::spawn(move || r.resolve(50, Status::Charging))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    }
}
