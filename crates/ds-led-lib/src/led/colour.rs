//! Colour parsing and formatting for the lightbar.
//!
//! Colours are written as six hex digits in red, green, blue order, with an
//! optional leading `#`.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::DsLedError;

/// An RGB colour, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Colour {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Colour {
    pub const BLACK: Colour = Colour::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Colour { red, green, blue }
    }
}

/// Parse a colour string such as `"#FF8000"` or `"ff8000"`.
///
/// Anything other than exactly six hex digits after the optional `#` is
/// rejected. Values are never clamped.
pub fn parse_colour(s: &str) -> crate::error::Result<Colour> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 {
        return Err(DsLedError::InvalidColour(format!(
            "{s} (expected 6 hex digits, e.g. #RRGGBB)"
        )));
    }
    // from_str_radix tolerates a leading '+', so check the digits first
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DsLedError::InvalidColour(format!("{s} (not hexadecimal)")));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|e| DsLedError::InvalidColour(format!("{s}: {e}")))
    };
    Ok(Colour::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Format a colour as six uppercase hex digits, without the `#`.
pub fn format_colour(c: Colour) -> String {
    format!("{:02X}{:02X}{:02X}", c.red, c.green, c.blue)
}

impl FromStr for Colour {
    type Err = DsLedError;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        parse_colour(s)
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", format_colour(*self))
    }
}

impl Serialize for Colour {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse_colour ──

    #[test]
    fn parse_hex_with_hash() {
        assert_eq!(parse_colour("#FF0000").unwrap(), Colour::new(255, 0, 0));
        assert_eq!(parse_colour("#00FF00").unwrap(), Colour::new(0, 255, 0));
        assert_eq!(parse_colour("#0000FF").unwrap(), Colour::new(0, 0, 255));
    }

    #[test]
    fn parse_hex_without_hash() {
        assert_eq!(parse_colour("001000").unwrap(), Colour::new(0, 16, 0));
        assert_eq!(parse_colour("ABCDEF").unwrap(), Colour::new(0xAB, 0xCD, 0xEF));
    }

    #[test]
    fn parse_hex_lowercase() {
        assert_eq!(parse_colour("#ff8000").unwrap(), Colour::new(255, 128, 0));
    }

    #[test]
    fn parse_channel_order_is_rgb() {
        let c = parse_colour("#123456").unwrap();
        assert_eq!((c.red, c.green, c.blue), (0x12, 0x34, 0x56));
    }

    #[test]
    fn parse_invalid_short() {
        assert!(matches!(
            parse_colour("#FFF"),
            Err(DsLedError::InvalidColour(_))
        ));
    }

    #[test]
    fn parse_invalid_long() {
        assert!(parse_colour("#FF000000").is_err());
        assert!(parse_colour("FF00000").is_err());
    }

    #[test]
    fn parse_invalid_hex_chars() {
        assert!(parse_colour("#GGHHII").is_err());
    }

    #[test]
    fn parse_rejects_sign_prefix() {
        assert!(parse_colour("+F0000").is_err());
        assert!(parse_colour("FF+F00").is_err());
    }

    #[test]
    fn parse_rejects_names_and_whitespace() {
        assert!(parse_colour("red").is_err());
        assert!(parse_colour(" FF0000").is_err());
    }

    #[test]
    fn parse_empty() {
        assert!(parse_colour("").is_err());
        assert!(parse_colour("#").is_err());
    }

    // ── format_colour ──

    #[test]
    fn format_is_six_uppercase_digits() {
        assert_eq!(format_colour(Colour::new(0xAB, 0x01, 0xFF)), "AB01FF");
    }

    #[test]
    fn format_zero_pads_channels() {
        assert_eq!(format_colour(Colour::new(0, 16, 0)), "001000");
        assert_eq!(format_colour(Colour::BLACK), "000000");
    }

    #[test]
    fn display_adds_hash() {
        assert_eq!(Colour::new(255, 0, 0).to_string(), "#FF0000");
    }

    #[test]
    fn serializes_as_hex_string() {
        let json = serde_json::to_string(&Colour::new(0, 16, 0)).unwrap();
        assert_eq!(json, "\"#001000\"");
    }

    // ── round-trip ──

    #[test]
    fn parse_format_roundtrip_uppercases() {
        for s in ["ff0000", "AbCdEf", "001000", "7f7f7f", "FFFFFF", "#a1b2c3"] {
            let c = parse_colour(s).unwrap();
            let canonical = s.trim_start_matches('#').to_uppercase();
            assert_eq!(format_colour(c), canonical, "round-trip failed for {s}");
        }
    }

    #[test]
    fn from_str_matches_parse() {
        let c: Colour = "#102030".parse().unwrap();
        assert_eq!(c, parse_colour("102030").unwrap());
    }
}
