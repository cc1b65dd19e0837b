//! Config builder — validates the generic config tree and turns the
//! `controller` section into a [`ConfigurationModel`].
//!
//! Expected shape (shown as JSON; TOML files produce the same tree):
//!
//! ```json
//! { "controller": {
//!     "default":     { "colour": "#FFFFFF", "brightness": 128, "player-leds": "00000" },
//!     "discharging": [ { "100": { "colour": "#001000" } }, { "10": { "colour": "#FF0000" } } ],
//!     "charging":    [ { "100": { "player-leds": "11111" } } ] } }
//! ```
//!
//! Everything is checked here, in one pass, so resolution never sees a
//! malformed value.

use serde_json::Value;

use crate::DsLedError;
use crate::led::{parse_colour, parse_player_leds};
use crate::resolver::ConfigurationModel;
use crate::setting::Setting;
use crate::table::ThresholdTable;

const KEY_COLOUR: &str = "colour";
const KEY_BRIGHTNESS: &str = "brightness";
const KEY_PLAYER_LEDS: &str = "player-leds";

fn config_err(msg: impl Into<String>) -> DsLedError {
    DsLedError::InvalidConfiguration(msg.into())
}

/// Build the model from the root of a parsed config file.
pub fn build_model(root: &Value) -> crate::error::Result<ConfigurationModel> {
    let controller = match root.get("controller") {
        None | Some(Value::Null) => return Err(config_err("missing [controller] section")),
        Some(c) => c
            .as_object()
            .ok_or_else(|| config_err("[controller] must be a table"))?,
    };

    for key in controller.keys() {
        if !matches!(key.as_str(), "default" | "discharging" | "charging") {
            return Err(config_err(format!(
                "unknown key controller.{key} (expected default, discharging or charging)"
            )));
        }
    }

    let default = match controller.get("default") {
        None | Some(Value::Null) => Setting::EMPTY,
        Some(v) => parse_setting(v, "controller.default")?,
    };
    let discharging = optional_table(controller.get("discharging"), "controller.discharging")?;
    let charging = optional_table(controller.get("charging"), "controller.charging")?;

    Ok(ConfigurationModel::new(default, discharging, charging))
}

fn optional_table(
    value: Option<&Value>,
    context: &str,
) -> crate::error::Result<Option<ThresholdTable>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => parse_table(v, context).map(Some),
    }
}

/// Parse a sequence of one-key `{ threshold: setting }` mappings.
pub fn parse_table(value: &Value, context: &str) -> crate::error::Result<ThresholdTable> {
    let items = value
        .as_array()
        .ok_or_else(|| config_err(format!("{context} must be a list of {{threshold = setting}}")))?;

    let mut entries = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let map = item
            .as_object()
            .ok_or_else(|| config_err(format!("{context}[{i}] must be a table")))?;
        let mut iter = map.iter();
        let (key, setting) = match (iter.next(), iter.next()) {
            (Some(entry), None) => entry,
            _ => {
                return Err(config_err(format!(
                    "{context}[{i}] must have exactly one threshold key, found {}",
                    map.len()
                )));
            }
        };
        let threshold = parse_threshold(key)
            .ok_or_else(|| config_err(format!("{context}[{i}]: threshold \"{key}\" is not 0-100")))?;
        let setting = parse_setting(setting, &format!("{context}.{key}"))?;
        entries.push((threshold, setting));
    }
    ThresholdTable::new(entries)
}

fn parse_threshold(key: &str) -> Option<u8> {
    key.trim()
        .trim_end_matches('%')
        .parse::<u8>()
        .ok()
        .filter(|t| *t <= crate::table::MAX_PERCENTAGE)
}

/// Parse one `{ colour?, brightness?, player-leds? }` mapping.
pub fn parse_setting(value: &Value, context: &str) -> crate::error::Result<Setting> {
    let map = value
        .as_object()
        .ok_or_else(|| config_err(format!("{context} must be a table")))?;

    for key in map.keys() {
        if !matches!(key.as_str(), KEY_COLOUR | KEY_BRIGHTNESS | KEY_PLAYER_LEDS) {
            return Err(config_err(format!(
                "unknown key {context}.{key} (expected {KEY_COLOUR}, {KEY_BRIGHTNESS} or {KEY_PLAYER_LEDS})"
            )));
        }
    }

    let colour = match map.get(KEY_COLOUR) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(parse_colour(s)?),
        Some(other) => {
            return Err(DsLedError::InvalidColour(format!(
                "{context}.{KEY_COLOUR}: expected a string, got {other}"
            )));
        }
    };

    let brightness = match map.get(KEY_BRIGHTNESS) {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            v.as_u64()
                .and_then(|b| u8::try_from(b).ok())
                .ok_or_else(|| {
                    DsLedError::InvalidSetting(format!(
                        "{context}.{KEY_BRIGHTNESS}: {v} is not an integer 0-255"
                    ))
                })?,
        ),
    };

    let player_leds = match map.get(KEY_PLAYER_LEDS) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(parse_player_leds(s)?),
        Some(other) => {
            return Err(DsLedError::InvalidSetting(format!(
                "{context}.{KEY_PLAYER_LEDS}: expected a string like \"00100\", got {other}"
            )));
        }
    };

    Setting::new(colour, brightness, player_leds)
}
