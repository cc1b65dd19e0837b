//! Player LED mask — five indicator LEDs packed into the low bits of a byte.
//!
//! The text form is five `0`/`1` characters. The leftmost character is
//! player LED 1 and maps to the most significant bit (`0b10000`).

use crate::DsLedError;

/// Number of player indicator LEDs on the controller.
pub const PLAYER_LED_COUNT: usize = 5;

/// Largest valid mask value (all five LEDs on).
pub const MAX_MASK: u8 = 0b1_1111;

/// Parse a `"00100"`-style string into a mask.
pub fn parse_player_leds(s: &str) -> crate::error::Result<u8> {
    if s.len() != PLAYER_LED_COUNT || !s.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(DsLedError::InvalidSetting(format!(
            "player-leds \"{s}\" must be {PLAYER_LED_COUNT} binary digits, e.g. \"00100\""
        )));
    }
    Ok(s.bytes().fold(0, |acc, b| (acc << 1) | (b - b'0')))
}

/// Format a mask as five binary digits.
pub fn format_player_leds(mask: u8) -> String {
    format!("{:05b}", mask & MAX_MASK)
}

/// Whether player LED `n` (1-based) is lit in `mask`.
pub fn player_led_on(mask: u8, n: usize) -> bool {
    debug_assert!((1..=PLAYER_LED_COUNT).contains(&n));
    (mask >> (PLAYER_LED_COUNT - n)) & 1 == 1
}
