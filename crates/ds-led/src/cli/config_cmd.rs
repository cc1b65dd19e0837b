//! `config` subcommand — show the config file in use and its parsed tables.

use std::path::Path;

use super::{
    Config, ConfigOutput, EntryJson, Result, Status, TableJson, kv, kv_indent, kv_width,
};

/// Statuses that own a table. `Full` reuses the charging one.
const TABLE_STATUSES: [Status; 2] = [Status::Discharging, Status::Charging];

fn tables(config: &Config) -> Vec<TableJson> {
    TABLE_STATUSES
        .into_iter()
        .filter_map(|status| {
            config.controller.table_for(status).map(|t| TableJson {
                status,
                entries: t
                    .entries()
                    .iter()
                    .map(|e| EntryJson {
                        threshold: e.threshold,
                        setting: e.setting,
                    })
                    .collect(),
            })
        })
        .collect()
}

pub(super) fn cmd_config(custom_path: Option<&Path>, json: bool) -> Result<()> {
    let (path, config) = Config::load(custom_path)?;
    let tables = tables(&config);

    if json {
        return super::print_json(&ConfigOutput {
            config_file: path.display().to_string(),
            daemon: config.daemon.clone(),
            default: config.controller.default_setting(),
            tables,
        });
    }

    let w = kv_width(
        &["Config file:"],
        &["interval:", "require_battery_change:", "default:", "<= 100%:"],
    );
    kv("Config file:", path.display(), w);
    println!();

    println!("Daemon:");
    kv_indent("interval:", format_args!("{}s", config.daemon.interval), w);
    kv_indent(
        "require_battery_change:",
        config.daemon.require_battery_change,
        w,
    );
    println!();

    println!("Controller:");
    kv_indent("default:", config.controller.default_setting(), w);
    for table in &tables {
        println!();
        println!("{} (thresholds are upper bounds):", table.status);
        if table.entries.is_empty() {
            kv_indent("(empty)", "", w);
        }
        for entry in &table.entries {
            kv_indent(&format!("<= {}%:", entry.threshold), entry.setting, w);
        }
    }
    Ok(())
}
