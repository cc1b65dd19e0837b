//! `init` subcommand — write a commented starter config file.

use std::path::{Path, PathBuf};

use ds_led_lib::config::SYSTEM_CONFIG_PATH;

use super::{Config, Result};

/// Per-user config file, or the system one when there is no config dir.
fn default_target() -> PathBuf {
    Config::user_path().unwrap_or_else(|| PathBuf::from(SYSTEM_CONFIG_PATH))
}

pub(super) fn cmd_init(path: Option<&Path>, force: bool) -> Result<()> {
    let target = path.map(Path::to_path_buf).unwrap_or_else(default_target);
    Config::write_default(&target, force)?;
    println!("Wrote {}", target.display());
    println!("Edit it, then start the daemon with `ds-led run`.");
    Ok(())
}
