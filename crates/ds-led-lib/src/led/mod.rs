//! LED value codecs — lightbar colour and player LED mask.

mod colour;
mod mask;

pub use colour::{Colour, format_colour, parse_colour};
pub use mask::{
    MAX_MASK, PLAYER_LED_COUNT, format_player_leds, parse_player_leds, player_led_on,
};
