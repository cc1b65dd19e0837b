//! `devices` subcommand — list connected controllers.

use std::path::Path;

use super::{Controller, DeviceJson, DevicesOutput, Result, SysfsController, device};

fn scan(sysfs_root: &Path) -> Vec<DeviceJson> {
    device::discover(sysfs_root)
        .iter()
        .map(|path| {
            let controller = SysfsController::open(path);
            DeviceJson {
                id: controller.id().to_string(),
                path: controller.power_supply().display().to_string(),
                battery: controller
                    .read_battery_percentage()
                    .map_err(|e| log::debug!("[{}] {e}", controller.id()))
                    .ok(),
                status: controller.read_charge_status().ok(),
            }
        })
        .collect()
}

pub(super) fn cmd_devices(sysfs_root: &Path, json: bool) -> Result<()> {
    let devices = scan(sysfs_root);

    if json {
        return super::print_json(&DevicesOutput {
            count: devices.len(),
            devices,
        });
    }

    if devices.is_empty() {
        println!("No controllers found.");
        return Ok(());
    }

    println!(
        "Found {} controller{}:",
        devices.len(),
        if devices.len() == 1 { "" } else { "s" }
    );
    println!();

    for (i, dev) in devices.iter().enumerate() {
        println!("  [{}] {}", i + 1, dev.id);
        match (dev.battery, dev.status) {
            (Some(battery), Some(status)) => println!("      Battery: {battery}% ({status})"),
            (Some(battery), None) => println!("      Battery: {battery}%"),
            _ => println!("      Battery: (unreadable)"),
        }
    }

    Ok(())
}
