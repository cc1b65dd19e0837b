//! Configuration file — location, loading (TOML or JSON) and scaffolding.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::DsLedError;
use crate::builder;
use crate::resolver::ConfigurationModel;

/// System-wide config file, checked before the per-user one.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/ds-led.conf";

/// Longest accepted poll interval, one day.
pub const MAX_INTERVAL: u64 = 86_400;

/// Header comment prepended to generated config files.
const CONFIG_HEADER: &str = "# ds-led configuration\n\n";

/// Commented starter configuration written by `ds-led init`.
pub const DEFAULT_CONFIG: &str = r##"[daemon]
# Seconds between two polls of the connected controllers.
interval = 5
# Only write LED values when the battery level has changed.
require_battery_change = true

# Used for any field a status table leaves unset.
[controller.default]
colour = "#FFFFFF"
brightness = 128
player-leds = "00000"

# Each entry applies up to and including its threshold (battery %).
[[controller.discharging]]
10 = { colour = "#FF0000", brightness = 255 }
[[controller.discharging]]
30 = { colour = "#FF8000" }
[[controller.discharging]]
100 = { colour = "#001000" }

# Also used while the battery reports "Full". Unset fields are inherited
# from the discharging table for the same battery level.
[[controller.charging]]
20 = { player-leds = "00100" }
[[controller.charging]]
40 = { player-leds = "01110" }
[[controller.charging]]
100 = { player-leds = "11111" }
"##;

/// Settings for the polling loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Seconds between polls. Default: 5.
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Only write LED values when the battery level changed. Default: true.
    #[serde(default = "default_true")]
    pub require_battery_change: bool,
}

fn default_interval() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for DaemonConfig {
    fn default() -> Self {
        DaemonConfig {
            interval: default_interval(),
            require_battery_change: true,
        }
    }
}

impl DaemonConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

/// A fully validated configuration file.
#[derive(Debug, Clone)]
pub struct Config {
    pub daemon: DaemonConfig,
    pub controller: ConfigurationModel,
}

/// On-disk format of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    /// `.json` files and text starting with `{` are JSON, everything else TOML.
    pub fn detect(path: Option<&Path>, contents: &str) -> Format {
        let by_ext = path
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if by_ext || contents.trim_start().starts_with('{') {
            Format::Json
        } else {
            Format::Toml
        }
    }
}

impl Config {
    /// Per-user config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ds-led"))
    }

    /// Per-user config file.
    pub fn user_path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Candidate locations, highest priority first.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
        paths.extend(Self::user_path());
        paths
    }

    /// First existing config file from [`Config::search_paths`].
    pub fn locate() -> Option<PathBuf> {
        Self::search_paths().into_iter().find(|p| p.is_file())
    }

    /// Parse config text into the generic tree.
    pub fn parse_tree(contents: &str, format: Format) -> crate::error::Result<serde_json::Value> {
        match format {
            Format::Toml => toml::from_str(contents)
                .map_err(|e| DsLedError::InvalidConfiguration(format!("TOML parse failed: {e}"))),
            Format::Json => serde_json::from_str(contents)
                .map_err(|e| DsLedError::InvalidConfiguration(format!("JSON parse failed: {e}"))),
        }
    }

    /// Validate a generic tree into a config.
    pub fn from_tree(root: &serde_json::Value) -> crate::error::Result<Self> {
        let daemon = match root.get("daemon") {
            None | Some(serde_json::Value::Null) => DaemonConfig::default(),
            Some(v) => DaemonConfig::deserialize(v)
                .map_err(|e| DsLedError::InvalidConfiguration(format!("[daemon]: {e}")))?,
        };
        if !(1..=MAX_INTERVAL).contains(&daemon.interval) {
            return Err(DsLedError::InvalidConfiguration(format!(
                "daemon.interval must be between 1 and {MAX_INTERVAL} seconds, got {}",
                daemon.interval
            )));
        }
        let controller = builder::build_model(root)?;
        Ok(Config { daemon, controller })
    }

    /// Parse and validate config text.
    pub fn parse(contents: &str, format: Format) -> crate::error::Result<Self> {
        Self::from_tree(&Self::parse_tree(contents, format)?)
    }

    /// Load and validate a config file. A missing file is an error.
    pub fn load_from(path: &Path) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DsLedError::InvalidConfiguration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&contents, Format::detect(Some(path), &contents)).map_err(|e| match e {
            DsLedError::InvalidConfiguration(msg) => {
                DsLedError::InvalidConfiguration(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Load from `path` if given, otherwise from the first search location.
    ///
    /// Returns the path actually used alongside the config.
    pub fn load(path: Option<&Path>) -> crate::error::Result<(PathBuf, Self)> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::locate().ok_or_else(|| {
                let tried: Vec<String> = Self::search_paths()
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                DsLedError::InvalidConfiguration(format!(
                    "no config file found (tried {}); run `ds-led init` to create one",
                    tried.join(", ")
                ))
            })?,
        };
        let config = Self::load_from(&path)?;
        log::debug!("loaded config from {}", path.display());
        Ok((path, config))
    }

    /// Write [`DEFAULT_CONFIG`] to `path` atomically (temp file, then rename).
    ///
    /// Refuses to replace an existing file unless `force` is set.
    pub fn write_default(path: &Path, force: bool) -> crate::error::Result<()> {
        if path.exists() && !force {
            return Err(DsLedError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists (use --force to overwrite)", path.display()),
            )));
        }
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }
        let contents = format!("{CONFIG_HEADER}{DEFAULT_CONFIG}");
        let mut tmp_name = path.as_os_str().to_os_string();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);
        std::fs::write(&tmp, &contents)?;
        match std::fs::rename(&tmp, path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct write + cleanup
                let result = std::fs::write(path, &contents);
                let _ = std::fs::remove_file(&tmp);
                result.map_err(DsLedError::from)
            }
        }
    }
}
