//! Controller setting — a partially specified lightbar/player LED state.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::DsLedError;
use crate::led::{Colour, MAX_MASK, format_player_leds};

/// Colour, brightness and player LED mask, each independently optional.
///
/// Absent fields are filled in by [`Setting::merge`] from a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Setting {
    colour: Option<Colour>,
    brightness: Option<u8>,
    #[serde(rename = "player-leds", serialize_with = "serialize_player_leds")]
    player_leds: Option<u8>,
}

/// Serialize the mask the way config files write it, e.g. `"00100"`.
fn serialize_player_leds<S: Serializer>(mask: &Option<u8>, s: S) -> Result<S::Ok, S::Error> {
    match mask {
        Some(mask) => s.serialize_str(&format_player_leds(*mask)),
        None => s.serialize_none(),
    }
}

impl Setting {
    /// Every field absent.
    pub const EMPTY: Setting = Setting {
        colour: None,
        brightness: None,
        player_leds: None,
    };

    /// Black, zero brightness, all player LEDs off. Terminal fallback of the
    /// resolver.
    pub const OFF: Setting = Setting {
        colour: Some(Colour::BLACK),
        brightness: Some(0),
        player_leds: Some(0),
    };

    /// Build a setting, rejecting a player LED mask wider than five bits.
    pub fn new(
        colour: Option<Colour>,
        brightness: Option<u8>,
        player_leds: Option<u8>,
    ) -> crate::error::Result<Self> {
        if let Some(mask) = player_leds
            && mask > MAX_MASK
        {
            return Err(DsLedError::InvalidSetting(format!(
                "player LED mask {mask:#b} has more than 5 bits"
            )));
        }
        Ok(Setting {
            colour,
            brightness,
            player_leds,
        })
    }

    pub fn colour(&self) -> Option<Colour> {
        self.colour
    }

    pub fn brightness(&self) -> Option<u8> {
        self.brightness
    }

    pub fn player_leds(&self) -> Option<u8> {
        self.player_leds
    }

    /// True when all three fields are present.
    pub fn is_complete(&self) -> bool {
        self.colour.is_some() && self.brightness.is_some() && self.player_leds.is_some()
    }

    /// True when all three fields are absent.
    pub fn is_empty(&self) -> bool {
        *self == Setting::EMPTY
    }

    /// Field-wise merge: keep each present field of `self`, take the rest
    /// from `fallback`.
    pub fn merge(&self, fallback: &Setting) -> Setting {
        Setting {
            colour: self.colour.or(fallback.colour),
            brightness: self.brightness.or(fallback.brightness),
            player_leds: self.player_leds.or(fallback.player_leds),
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let colour = self.colour.map_or("-".into(), |c| c.to_string());
        let brightness = self.brightness.map_or("-".into(), |b| b.to_string());
        let leds = self.player_leds.map_or("-".into(), format_player_leds);
        write!(
            f,
            "colour={colour} brightness={brightness} player-leds={leds}"
        )
    }
}
