//! CLI subcommands — daemon loop, resolution preview, config and device info.

mod config_cmd;
mod devices;
mod init;
mod resolve;
mod run;

use std::path::{Path, PathBuf};

use clap::Subcommand;
use serde::Serialize;

pub(super) use crate::RUNNING;
pub(super) use ds_led_lib::config::{Config, DaemonConfig};
pub(super) use ds_led_lib::device::{self, Controller, SysfsController};
pub(super) use ds_led_lib::error::Result;
pub(super) use ds_led_lib::led;
pub(super) use ds_led_lib::monitor::{ControllerSet, PollOutcome};
pub(super) use ds_led_lib::resolver::Resolver;
pub(super) use ds_led_lib::setting::Setting;
pub(super) use ds_led_lib::status::Status;

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn format_kv(key: &str, value: impl std::fmt::Display, w: usize) -> String {
    format!("{key:<width$}{value}", width = w)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{}", format_kv(key, value, w));
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w - 2);
}

/// Print `value` as pretty JSON.
pub(super) fn print_json(value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        ds_led_lib::DsLedError::InvalidConfiguration(format!("JSON serialization failed: {e}"))
    })?;
    println!("{json}");
    Ok(())
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct ResolveOutput {
    pub percentage: u8,
    pub status: Status,
    pub setting: Setting,
}

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: String,
    pub daemon: DaemonConfig,
    pub default: Setting,
    pub tables: Vec<TableJson>,
}

#[derive(Serialize)]
pub(super) struct TableJson {
    pub status: Status,
    pub entries: Vec<EntryJson>,
}

#[derive(Serialize)]
pub(super) struct EntryJson {
    pub threshold: u8,
    pub setting: Setting,
}

#[derive(Serialize)]
pub(super) struct DevicesOutput {
    pub count: usize,
    pub devices: Vec<DeviceJson>,
}

#[derive(Serialize)]
pub(super) struct DeviceJson {
    pub id: String,
    pub path: String,
    pub battery: Option<u8>,
    pub status: Option<Status>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the daemon: poll controllers and update their LEDs
    Run {
        /// Poll once and exit instead of looping
        #[arg(long)]
        once: bool,
        /// Power supply class directory
        #[arg(long, hide = true, default_value = device::POWER_SUPPLY_ROOT)]
        sysfs_root: PathBuf,
    },

    /// Print the setting for a battery level and charge status
    Resolve {
        /// Battery level in percent (0-100)
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        percentage: u8,
        /// default, discharging, charging or full
        status: String,
    },

    /// Show the config file and its parsed tables
    Config,

    /// List connected controllers with battery level and status
    Devices {
        /// Power supply class directory
        #[arg(long, hide = true, default_value = device::POWER_SUPPLY_ROOT)]
        sysfs_root: PathBuf,
    },

    /// Write a starter config file
    Init {
        /// Where to write (default: the user config dir)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Warn if `--json` was passed to a command that doesn't support it.
fn warn_json_unsupported(cmd_name: &str) {
    log::warn!("--json is not supported for `{cmd_name}` (ignored)");
}

pub fn run(cmd: Command, json: bool, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        Command::Run { once, sysfs_root } => {
            if json {
                warn_json_unsupported("run");
            }
            run::cmd_run(config_path, &sysfs_root, once)
        }
        Command::Resolve { percentage, status } => {
            resolve::cmd_resolve(config_path, percentage, &status, json)
        }
        Command::Config => config_cmd::cmd_config(config_path, json),
        Command::Devices { sysfs_root } => devices::cmd_devices(&sysfs_root, json),
        Command::Init { path, force } => {
            if json {
                warn_json_unsupported("init");
            }
            init::cmd_init(path.as_deref().or(config_path), force)
        }
    }
}
