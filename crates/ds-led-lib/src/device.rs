//! Controller I/O — trait + Linux sysfs backend.
//!
//! The hid-playstation driver exposes each controller as a power supply
//! (`/sys/class/power_supply/ps-controller-battery-<mac>`) whose `device/leds`
//! directory holds the lightbar (`*:rgb:indicator`) and the five player LEDs
//! (`*:white:player-N`).

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::led::{Colour, PLAYER_LED_COUNT, player_led_on};
use crate::setting::Setting;
use crate::status::Status;
use crate::table::MAX_PERCENTAGE;

/// Where the kernel lists power supplies.
pub const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

/// Name prefix of DualSense / DualShock 4 battery power supplies.
pub const BATTERY_PREFIX: &str = "ps-controller-battery-";

// ── Error type ──

/// Controller I/O errors.
///
/// String payloads follow the convention **"context: details"** where
/// *context* names the attribute or step (e.g. `"capacity"`,
/// `"multi_intensity"`) and *details* describes what went wrong.
#[derive(Debug)]
pub enum DeviceError {
    /// Battery or status could not be read; the controller is gone.
    Disconnected(String),
    /// An attribute was read but its contents made no sense.
    ReadFailed(String),
    /// Writing an LED attribute failed.
    WriteFailed(String),
    /// The value is outside what the hardware accepts.
    InvalidValue(String),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Disconnected(e) => write!(f, "Controller disconnected: {e}"),
            DeviceError::ReadFailed(e) => write!(f, "Read failed: {e}"),
            DeviceError::WriteFailed(e) => write!(f, "Write failed: {e}"),
            DeviceError::InvalidValue(e) => write!(f, "Invalid value: {e}"),
        }
    }
}

impl std::error::Error for DeviceError {}

pub type Result<T> = std::result::Result<T, DeviceError>;

// ── Trait ──

pub trait Controller {
    /// Stable identifier, e.g. the power supply name.
    fn id(&self) -> &str;
    /// Battery level, 0..=100.
    fn read_battery_percentage(&self) -> Result<u8>;
    fn read_charge_status(&self) -> Result<Status>;
    fn set_colour(&self, colour: Colour) -> Result<()>;
    fn set_brightness(&self, brightness: u8) -> Result<()>;
    fn set_player_leds(&self, mask: u8) -> Result<()>;
}

/// Write every present field of `setting` to the controller.
///
/// Absent fields are skipped. All present fields are attempted even if an
/// earlier write fails; the first error is returned.
pub fn apply(controller: &impl Controller, setting: &Setting) -> Result<()> {
    let mut first_err = None;
    let mut note = |r: Result<()>| {
        if let Err(e) = r {
            log::warn!("[{}] {e}", controller.id());
            first_err.get_or_insert(e);
        }
    };
    if let Some(colour) = setting.colour() {
        note(controller.set_colour(colour));
    }
    if let Some(brightness) = setting.brightness() {
        note(controller.set_brightness(brightness));
    }
    if let Some(mask) = setting.player_leds() {
        note(controller.set_player_leds(mask));
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

// ── Discovery ──

/// Power supply directories of connected controllers under `root`, sorted.
pub fn discover(root: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(root) else {
        log::debug!("cannot list {}", root.display());
        return Vec::new();
    };
    let mut found: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(BATTERY_PREFIX))
        .map(|e| e.path())
        .collect();
    found.sort();
    found
}

// ── sysfs backend ──

/// A controller driven through sysfs attribute files.
#[derive(Debug, Clone)]
pub struct SysfsController {
    id: String,
    power_supply: PathBuf,
    rgb_led: Option<PathBuf>,
    /// Player LED directories keyed by player number, ascending.
    player_leds: Vec<(usize, PathBuf)>,
}

impl SysfsController {
    /// Bind to a power supply directory and locate its LED directories.
    pub fn open(power_supply: &Path) -> Self {
        let id = power_supply
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| power_supply.display().to_string());
        let leds_dir = power_supply.join("device").join("leds");

        let mut rgb_led = None;
        let mut players: Vec<(usize, PathBuf)> = Vec::new();
        if let Ok(entries) = fs::read_dir(&leds_dir) {
            for entry in entries.filter_map(|e| e.ok()) {
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.ends_with(":rgb:indicator") {
                    rgb_led = Some(entry.path());
                } else if let Some(n) = player_number(&name) {
                    players.push((n, entry.path()));
                }
            }
        }
        players.sort();
        if rgb_led.is_none() {
            log::warn!("[{id}] no lightbar LED under {}", leds_dir.display());
        }
        if players.len() != PLAYER_LED_COUNT {
            log::debug!("[{id}] found {} player LEDs", players.len());
        }

        SysfsController {
            id,
            power_supply: power_supply.to_path_buf(),
            rgb_led,
            player_leds: players,
        }
    }

    pub fn power_supply(&self) -> &Path {
        &self.power_supply
    }

    fn rgb_led(&self) -> Result<&Path> {
        self.rgb_led
            .as_deref()
            .ok_or_else(|| DeviceError::WriteFailed(format!("{}: no lightbar LED", self.id)))
    }

    fn read_attr(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .map_err(|e| DeviceError::Disconnected(format!("{}: {e}", path.display())))
    }
}

/// `input12:white:player-3` → 3.
fn player_number(led_name: &str) -> Option<usize> {
    led_name
        .rsplit_once(":white:player-")
        .and_then(|(_, n)| n.parse().ok())
        .filter(|n| (1..=PLAYER_LED_COUNT).contains(n))
}

fn write_attr(path: &Path, value: &str) -> Result<()> {
    fs::write(path, value).map_err(|e| DeviceError::WriteFailed(format!("{}: {e}", path.display())))
}

impl Controller for SysfsController {
    fn id(&self) -> &str {
        &self.id
    }

    fn read_battery_percentage(&self) -> Result<u8> {
        let path = self.power_supply.join("capacity");
        let raw = self.read_attr(&path)?;
        let value: u32 = raw.trim().parse().map_err(|e| {
            DeviceError::ReadFailed(format!("{}: \"{}\": {e}", path.display(), raw.trim()))
        })?;
        Ok(value.min(MAX_PERCENTAGE as u32) as u8)
    }

    fn read_charge_status(&self) -> Result<Status> {
        let raw = self.read_attr(&self.power_supply.join("status"))?;
        Ok(Status::from_power_supply(&raw))
    }

    fn set_colour(&self, colour: Colour) -> Result<()> {
        let led = self.rgb_led()?;
        // Channel order of multi_intensity is given by multi_index
        let order = fs::read_to_string(led.join("multi_index"))
            .unwrap_or_else(|_| "red green blue".into());
        let values: Vec<String> = order
            .split_whitespace()
            .map(|channel| match channel {
                "red" => Ok(colour.red),
                "green" => Ok(colour.green),
                "blue" => Ok(colour.blue),
                other => Err(DeviceError::ReadFailed(format!(
                    "multi_index: unknown channel \"{other}\""
                ))),
            })
            .map(|v| v.map(|v| v.to_string()))
            .collect::<Result<_>>()?;
        write_attr(&led.join("multi_intensity"), &values.join(" "))
    }

    fn set_brightness(&self, brightness: u8) -> Result<()> {
        let led = self.rgb_led()?;
        let max = fs::read_to_string(led.join("max_brightness"))
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(u8::MAX as u32);
        if brightness as u32 > max {
            return Err(DeviceError::InvalidValue(format!(
                "brightness: {brightness} above max_brightness {max}"
            )));
        }
        write_attr(&led.join("brightness"), &brightness.to_string())
    }

    fn set_player_leds(&self, mask: u8) -> Result<()> {
        if self.player_leds.is_empty() {
            return Err(DeviceError::WriteFailed(format!(
                "{}: no player LEDs",
                self.id
            )));
        }
        let mut first_err = None;
        for (n, led) in &self.player_leds {
            let on = player_led_on(mask, *n);
            if let Err(e) = write_attr(&led.join("brightness"), if on { "1" } else { "0" }) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// In-memory mock controller for unit and integration tests.
///
/// Always compiled, hidden from public docs.
#[doc(hidden)]
pub mod mock {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// One recorded LED write.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Write {
        Colour(Colour),
        Brightness(u8),
        PlayerLeds(u8),
    }

    /// Controller whose battery and status are set by the test and whose
    /// writes are recorded.
    pub struct MockController {
        id: String,
        pub battery: Cell<u8>,
        pub status: Cell<Status>,
        /// When true, battery/status reads fail with `Disconnected`.
        pub disconnected: Cell<bool>,
        /// When true, every LED write fails.
        pub fail_writes: Cell<bool>,
        pub writes: RefCell<Vec<Write>>,
    }

    impl MockController {
        pub fn new(id: &str, battery: u8, status: Status) -> Self {
            MockController {
                id: id.into(),
                battery: Cell::new(battery),
                status: Cell::new(status),
                disconnected: Cell::new(false),
                fail_writes: Cell::new(false),
                writes: RefCell::new(Vec::new()),
            }
        }

        /// Take and clear the recorded writes.
        pub fn take_writes(&self) -> Vec<Write> {
            self.writes.take()
        }

        fn record(&self, w: Write) -> Result<()> {
            if self.fail_writes.get() {
                return Err(DeviceError::WriteFailed(format!(
                    "{}: mock write failure injected",
                    self.id
                )));
            }
            self.writes.borrow_mut().push(w);
            Ok(())
        }

        fn check_connected(&self) -> Result<()> {
            if self.disconnected.get() {
                Err(DeviceError::Disconnected(format!("{}: unplugged", self.id)))
            } else {
                Ok(())
            }
        }
    }

    impl Controller for MockController {
        fn id(&self) -> &str {
            &self.id
        }

        fn read_battery_percentage(&self) -> Result<u8> {
            self.check_connected()?;
            Ok(self.battery.get())
        }

        fn read_charge_status(&self) -> Result<Status> {
            self.check_connected()?;
            Ok(self.status.get())
        }

        fn set_colour(&self, colour: Colour) -> Result<()> {
            self.record(Write::Colour(colour))
        }

        fn set_brightness(&self, brightness: u8) -> Result<()> {
            self.record(Write::Brightness(brightness))
        }

        fn set_player_leds(&self, mask: u8) -> Result<()> {
            self.record(Write::PlayerLeds(mask))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockController, Write};
    use super::*;

    /// Build a fake power supply with an RGB LED and five player LEDs.
    fn fake_sysfs(root: &Path, name: &str) -> PathBuf {
        let ps = root.join(name);
        let leds = ps.join("device").join("leds");
        let rgb = leds.join("input7:rgb:indicator");
        fs::create_dir_all(&rgb).unwrap();
        fs::write(ps.join("capacity"), "55\n").unwrap();
        fs::write(ps.join("status"), "Discharging\n").unwrap();
        fs::write(rgb.join("multi_index"), "red green blue\n").unwrap();
        fs::write(rgb.join("multi_intensity"), "0 0 0\n").unwrap();
        fs::write(rgb.join("max_brightness"), "255\n").unwrap();
        fs::write(rgb.join("brightness"), "0\n").unwrap();
        for n in 1..=5 {
            let p = leds.join(format!("input7:white:player-{n}"));
            fs::create_dir_all(&p).unwrap();
            fs::write(p.join("brightness"), "0\n").unwrap();
        }
        ps
    }

    fn read(path: PathBuf) -> String {
        fs::read_to_string(path).unwrap()
    }

    fn player_brightness(ps: &Path, n: usize) -> String {
        read(
            ps.join("device/leds")
                .join(format!("input7:white:player-{n}"))
                .join("brightness"),
        )
    }

    // ── apply ──

    #[test]
    fn apply_writes_present_fields_only() {
        let dev = MockController::new("c", 50, Status::Discharging);
        let s = Setting::new(Some(Colour::new(1, 2, 3)), None, Some(0b00100)).unwrap();
        apply(&dev, &s).unwrap();
        assert_eq!(
            dev.take_writes(),
            vec![Write::Colour(Colour::new(1, 2, 3)), Write::PlayerLeds(0b00100)]
        );
    }

    #[test]
    fn apply_empty_setting_writes_nothing() {
        let dev = MockController::new("c", 50, Status::Discharging);
        apply(&dev, &Setting::EMPTY).unwrap();
        assert!(dev.take_writes().is_empty());
    }

    #[test]
    fn apply_reports_write_failure() {
        let dev = MockController::new("c", 50, Status::Discharging);
        dev.fail_writes.set(true);
        let err = apply(&dev, &Setting::OFF).unwrap_err();
        assert!(matches!(err, DeviceError::WriteFailed(_)));
    }

    // ── discover ──

    #[test]
    fn discover_filters_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        fake_sysfs(dir.path(), "ps-controller-battery-aa:bb");
        fake_sysfs(dir.path(), "ps-controller-battery-00:11");
        fs::create_dir_all(dir.path().join("BAT0")).unwrap();
        let found = discover(dir.path());
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["ps-controller-battery-00:11", "ps-controller-battery-aa:bb"]
        );
    }

    #[test]
    fn discover_missing_root_is_empty() {
        assert!(discover(Path::new("/nonexistent/power_supply")).is_empty());
    }

    // ── sysfs reads ──

    #[test]
    fn sysfs_reads_battery_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let ps = fake_sysfs(dir.path(), "ps-controller-battery-x");
        let dev = SysfsController::open(&ps);
        assert_eq!(dev.id(), "ps-controller-battery-x");
        assert_eq!(dev.read_battery_percentage().unwrap(), 55);
        assert_eq!(dev.read_charge_status().unwrap(), Status::Discharging);
        fs::write(ps.join("status"), "Full\n").unwrap();
        assert_eq!(dev.read_charge_status().unwrap(), Status::Full);
    }

    #[test]
    fn sysfs_battery_clamped_to_100() {
        let dir = tempfile::tempdir().unwrap();
        let ps = fake_sysfs(dir.path(), "ps-controller-battery-x");
        fs::write(ps.join("capacity"), "104\n").unwrap();
        assert_eq!(SysfsController::open(&ps).read_battery_percentage().unwrap(), 100);
    }

    #[test]
    fn sysfs_garbage_capacity_is_read_failure() {
        let dir = tempfile::tempdir().unwrap();
        let ps = fake_sysfs(dir.path(), "ps-controller-battery-x");
        fs::write(ps.join("capacity"), "lots\n").unwrap();
        assert!(matches!(
            SysfsController::open(&ps).read_battery_percentage(),
            Err(DeviceError::ReadFailed(_))
        ));
    }

    #[test]
    fn sysfs_removed_device_is_disconnected() {
        let dir = tempfile::tempdir().unwrap();
        let ps = fake_sysfs(dir.path(), "ps-controller-battery-x");
        let dev = SysfsController::open(&ps);
        fs::remove_dir_all(&ps).unwrap();
        assert!(matches!(
            dev.read_battery_percentage(),
            Err(DeviceError::Disconnected(_))
        ));
        assert!(matches!(
            dev.read_charge_status(),
            Err(DeviceError::Disconnected(_))
        ));
    }

    // ── sysfs writes ──

    #[test]
    fn sysfs_colour_follows_multi_index() {
        let dir = tempfile::tempdir().unwrap();
        let ps = fake_sysfs(dir.path(), "ps-controller-battery-x");
        let rgb = ps.join("device/leds/input7:rgb:indicator");
        fs::write(rgb.join("multi_index"), "blue green red\n").unwrap();
        let dev = SysfsController::open(&ps);
        dev.set_colour(Colour::new(10, 20, 30)).unwrap();
        assert_eq!(read(rgb.join("multi_intensity")), "30 20 10");
    }

    #[test]
    fn sysfs_colour_default_order_without_multi_index() {
        let dir = tempfile::tempdir().unwrap();
        let ps = fake_sysfs(dir.path(), "ps-controller-battery-x");
        let rgb = ps.join("device/leds/input7:rgb:indicator");
        fs::remove_file(rgb.join("multi_index")).unwrap();
        SysfsController::open(&ps)
            .set_colour(Colour::new(1, 2, 3))
            .unwrap();
        assert_eq!(read(rgb.join("multi_intensity")), "1 2 3");
    }

    #[test]
    fn sysfs_brightness_respects_max() {
        let dir = tempfile::tempdir().unwrap();
        let ps = fake_sysfs(dir.path(), "ps-controller-battery-x");
        let rgb = ps.join("device/leds/input7:rgb:indicator");
        fs::write(rgb.join("max_brightness"), "100\n").unwrap();
        let dev = SysfsController::open(&ps);
        dev.set_brightness(100).unwrap();
        assert_eq!(read(rgb.join("brightness")), "100");
        assert!(matches!(
            dev.set_brightness(101),
            Err(DeviceError::InvalidValue(_))
        ));
        assert_eq!(read(rgb.join("brightness")), "100");
    }

    #[test]
    fn sysfs_player_leds_leftmost_is_player_1() {
        let dir = tempfile::tempdir().unwrap();
        let ps = fake_sysfs(dir.path(), "ps-controller-battery-x");
        let dev = SysfsController::open(&ps);
        dev.set_player_leds(0b10010).unwrap();
        let states: Vec<String> = (1..=5).map(|n| player_brightness(&ps, n)).collect();
        assert_eq!(states, vec!["1", "0", "0", "1", "0"]);
    }

    #[test]
    fn sysfs_player_leds_follow_led_number_with_gap() {
        let dir = tempfile::tempdir().unwrap();
        let ps = fake_sysfs(dir.path(), "ps-controller-battery-x");
        fs::remove_dir_all(ps.join("device/leds/input7:white:player-2")).unwrap();
        let dev = SysfsController::open(&ps);
        dev.set_player_leds(0b00100).unwrap();
        assert_eq!(player_brightness(&ps, 1), "0");
        assert_eq!(player_brightness(&ps, 3), "1");
        assert_eq!(player_brightness(&ps, 4), "0");
        assert_eq!(player_brightness(&ps, 5), "0");
    }

    #[test]
    fn sysfs_without_leds_fails_writes() {
        let dir = tempfile::tempdir().unwrap();
        let ps = dir.path().join("ps-controller-battery-bare");
        fs::create_dir_all(&ps).unwrap();
        let dev = SysfsController::open(&ps);
        assert!(matches!(
            dev.set_colour(Colour::BLACK),
            Err(DeviceError::WriteFailed(_))
        ));
        assert!(dev.set_player_leds(0).is_err());
    }

    #[test]
    fn player_number_parsing() {
        assert_eq!(player_number("input12:white:player-3"), Some(3));
        assert_eq!(player_number("input12:rgb:indicator"), None);
        assert_eq!(player_number("input12:white:player-x"), None);
        assert_eq!(player_number("input12:white:player-0"), None);
        assert_eq!(player_number("input12:white:player-6"), None);
    }
}
