//! `resolve` subcommand — preview what the daemon would write.

use std::path::Path;

use super::{Config, ResolveOutput, Resolver, Result, Setting, Status, kv, kv_width, led};

/// Human-readable lines for one setting, absent fields shown as "(unchanged)".
fn describe(setting: &Setting) -> [(&'static str, String); 3] {
    let unchanged = || "(unchanged)".to_string();
    [
        (
            "Colour:",
            setting.colour().map_or_else(unchanged, |c| c.to_string()),
        ),
        (
            "Brightness:",
            setting.brightness().map_or_else(unchanged, |b| b.to_string()),
        ),
        (
            "Player LEDs:",
            setting
                .player_leds()
                .map_or_else(unchanged, led::format_player_leds),
        ),
    ]
}

pub(super) fn cmd_resolve(
    config_path: Option<&Path>,
    percentage: u8,
    status: &str,
    json: bool,
) -> Result<()> {
    let status: Status = status.parse()?;
    let (path, config) = Config::load(config_path)?;
    let setting = Resolver::new(config.controller).resolve(percentage, status);

    if json {
        return super::print_json(&ResolveOutput {
            percentage,
            status,
            setting,
        });
    }

    let lines = describe(&setting);
    let keys: Vec<&str> = lines.iter().map(|(k, _)| *k).collect();
    let w = kv_width(&["Config file:", "Battery:", "Status:"], &[])
        .max(kv_width(&keys, &[]));
    kv("Config file:", path.display(), w);
    kv("Battery:", format_args!("{percentage}%"), w);
    kv("Status:", status, w);
    println!();
    for (key, value) in &lines {
        kv(key, value, w);
    }
    Ok(())
}
