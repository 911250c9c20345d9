//! The reminder loop, delivering notifications to stdout.

use cadence::config::Config;
use cadence::reminder::{self, CHECK_INTERVAL, NotificationPermission, Notifier, ReminderScheduler};
use cadence::storage::Storage;

const NOT_ARMED: &str = "reminders are not armed: enable them with \
    `cadence settings set --reminders true` and set notifications = \"granted\" \
    in the config file";

/// Prints each notification as `[title] body`.
struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&self, title: &str, body: &str) {
        println!("[{title}] {body}");
    }
}

pub(super) fn cmd_remind(config: &Config, storage: Storage, once: bool) -> Result<(), String> {
    let settings = storage
        .load_settings()
        .map_err(|e| format!("failed to load settings: {e}"))?;

    if once {
        if !settings.reminders_enabled || config.notifications != NotificationPermission::Granted {
            return Err(NOT_ARMED.to_string());
        }
        let scheduler = ReminderScheduler::new(settings, storage, StdoutNotifier);
        let fired = scheduler
            .tick(reminder::local_now())
            .map_err(|e| format!("reminder check failed: {e}"))?;
        if fired.is_empty() {
            eprintln!("No reminders due");
        }
        return Ok(());
    }

    let handle = reminder::start(
        &settings,
        config.notifications,
        storage,
        StdoutNotifier,
        reminder::local_now,
        CHECK_INTERVAL,
    );
    if !handle.is_armed() {
        return Err(NOT_ARMED.to_string());
    }

    eprintln!("Reminders running; press Ctrl-C to stop.");
    handle.wait();
    Ok(())
}
