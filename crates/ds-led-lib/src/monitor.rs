//! Polling state machine — battery-change tracking decoupled from the loop.
//!
//! [`ControllerMonitor`] wraps one controller: each [`poll`](ControllerMonitor::poll)
//! reads battery and status, decides whether the LEDs need writing, resolves
//! the setting and applies it. [`ControllerSet`] keeps the monitors of all
//! connected controllers and drops the ones that stop answering. The binary
//! only adds discovery and sleeping around these.

use std::path::{Path, PathBuf};

use crate::device::{self, Controller, DeviceError};
use crate::resolver::Resolver;
use crate::setting::Setting;
use crate::status::Status;

/// Result of one successful poll.
#[derive(Debug)]
pub enum PollOutcome {
    /// The resolved setting was written (or attempted).
    Applied {
        battery: u8,
        status: Status,
        setting: Setting,
        /// Set when an LED write failed. The controller stays monitored.
        write_error: Option<DeviceError>,
    },
    /// Battery level unchanged and writes are suppressed.
    Unchanged { battery: u8 },
}

/// Monitor for one controller.
pub struct ControllerMonitor<C: Controller> {
    controller: C,
    last_battery: Option<u8>,
}

impl<C: Controller> ControllerMonitor<C> {
    pub fn new(controller: C) -> Self {
        ControllerMonitor {
            controller,
            last_battery: None,
        }
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Battery level seen by the previous poll.
    pub fn last_battery(&self) -> Option<u8> {
        self.last_battery
    }

    /// Record `battery` and report whether it differs from the last reading.
    /// The first reading always counts as a change.
    pub fn battery_changed(&mut self, battery: u8) -> bool {
        let changed = self.last_battery != Some(battery);
        self.last_battery = Some(battery);
        changed
    }

    /// Read battery + status and apply the resolved setting.
    ///
    /// With `require_change` set, nothing is written unless the battery level
    /// changed since the previous poll. Read failures are returned as errors
    /// (the controller is gone); write failures are logged and reported in
    /// the outcome.
    pub fn poll(&mut self, resolver: &Resolver, require_change: bool) -> device::Result<PollOutcome> {
        let battery = self.controller.read_battery_percentage()?;
        let changed = self.battery_changed(battery);
        if changed {
            log::info!("[{}] battery level: {battery}%", self.controller.id());
        }
        if require_change && !changed {
            return Ok(PollOutcome::Unchanged { battery });
        }

        let status = self.controller.read_charge_status()?;
        let setting = resolver.resolve(battery, status);
        log::debug!("[{}] applying {setting} ({status})", self.controller.id());
        let write_error = device::apply(&self.controller, &setting).err();
        Ok(PollOutcome::Applied {
            battery,
            status,
            setting,
            write_error,
        })
    }
}

/// Monitors for every connected controller, keyed by power supply path.
pub struct ControllerSet<C: Controller> {
    monitors: Vec<(PathBuf, ControllerMonitor<C>)>,
}

impl<C: Controller> Default for ControllerSet<C> {
    fn default() -> Self {
        ControllerSet {
            monitors: Vec::new(),
        }
    }
}

impl<C: Controller> ControllerSet<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.monitors.iter().any(|(p, _)| p == path)
    }

    /// Start monitoring every path in `found` that is not monitored yet.
    /// Returns how many were added.
    pub fn add_new(&mut self, found: &[PathBuf], mut open: impl FnMut(&Path) -> C) -> usize {
        let mut added = 0;
        for path in found {
            if self.contains(path) {
                continue;
            }
            let controller = open(path);
            log::info!("[{}] controller connected", controller.id());
            self.monitors
                .push((path.clone(), ControllerMonitor::new(controller)));
            added += 1;
        }
        added
    }

    /// Poll every controller. Controllers whose reads fail are dropped.
    ///
    /// Returns the outcome per controller id, in monitoring order.
    pub fn poll_all(
        &mut self,
        resolver: &Resolver,
        require_change: bool,
    ) -> Vec<(String, PollOutcome)> {
        let mut outcomes = Vec::with_capacity(self.monitors.len());
        self.monitors.retain_mut(|(_, monitor)| {
            let id = monitor.controller().id().to_string();
            match monitor.poll(resolver, require_change) {
                Ok(outcome) => {
                    outcomes.push((id, outcome));
                    true
                }
                Err(e) => {
                    log::info!("[{id}] controller disconnected ({e})");
                    false
                }
            }
        });
        outcomes
    }
}
