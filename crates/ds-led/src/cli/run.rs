//! `run` subcommand — the daemon: watch controllers and keep their LEDs in sync.

use std::path::Path;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use super::{
    Config, ControllerSet, DaemonConfig, PollOutcome, RUNNING, Resolver, Result, SysfsController,
    device,
};

/// Granularity of the interruptible sleep between polls.
const SLEEP_SLICE: Duration = Duration::from_millis(250);

/// One discovery + poll pass over all controllers.
fn poll_once(
    controllers: &mut ControllerSet<SysfsController>,
    resolver: &Resolver,
    daemon: &DaemonConfig,
    sysfs_root: &Path,
) {
    let found = device::discover(sysfs_root);
    controllers.add_new(&found, SysfsController::open);

    for (id, outcome) in controllers.poll_all(resolver, daemon.require_battery_change) {
        if let PollOutcome::Applied {
            battery,
            status,
            setting,
            write_error,
        } = outcome
        {
            println!("  [{id}] {battery}% {status} -> {setting}");
            if let Some(e) = write_error {
                log::warn!("[{id}] some LEDs were not updated: {e}");
            }
        }
    }
}

/// Sleep for `total`, waking early when Ctrl+C clears [`RUNNING`].
///
/// A `total` too large to represent as an instant sleeps until stopped.
fn interruptible_sleep(total: Duration) {
    let deadline = Instant::now().checked_add(total);
    while RUNNING.load(Ordering::SeqCst) {
        let slice = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                SLEEP_SLICE.min(deadline - now)
            }
            None => SLEEP_SLICE,
        };
        std::thread::sleep(slice);
    }
}

pub(super) fn cmd_run(config_path: Option<&Path>, sysfs_root: &Path, once: bool) -> Result<()> {
    let (path, config) = Config::load(config_path)?;
    println!("[config] {}", path.display());
    println!(
        "[daemon] polling every {}s{}",
        config.daemon.interval,
        if config.daemon.require_battery_change {
            ", updating on battery change"
        } else {
            ""
        }
    );

    let daemon = config.daemon;
    let resolver = Resolver::new(config.controller);
    let mut controllers = ControllerSet::new();

    if !once {
        println!("Monitoring... (Ctrl+C to stop)");
    }

    while RUNNING.load(Ordering::SeqCst) {
        poll_once(&mut controllers, &resolver, &daemon, sysfs_root);
        if once {
            break;
        }
        interruptible_sleep(daemon.interval());
    }

    if controllers.is_empty() {
        log::debug!("no controllers connected at exit");
    }
    Ok(())
}
