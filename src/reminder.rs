//! Local reminders: a once-a-minute check for daily and weekly-review nudges.
//!
//! Firing is idempotent through persisted markers, one key per calendar day
//! (`daily-reminder:YYYY-MM-DD`) and one per week start
//! (`weekly-review:YYYY-MM-DD`). A tick that finds its marker does nothing.
//! Markers are never cleared; a new day or week simply produces a new key.
//!
//! The marker store and the notification sink are injected so the
//! scheduling decision stays deterministic under test.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use jiff::Zoned;
use jiff::civil::{Date, DateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::model::Settings;
use crate::week::{week_start, weekday_number};

/// How often the scheduler wakes to check the clock.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Key-value store for "already fired" markers.
pub trait MarkerStore {
    type Error: fmt::Display;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;
}

/// Delivers a notification now.
pub trait Notifier {
    fn notify(&self, title: &str, body: &str);
}

/// Whether the user has allowed notifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPermission {
    Granted,
    Denied,
    /// Never asked.
    #[default]
    Default,
}

/// Which reminder fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    Daily,
    WeeklyReview,
}

impl ReminderKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Daily => "Daily output reminder",
            Self::WeeklyReview => "Weekly review reminder",
        }
    }

    pub fn body(self) -> &'static str {
        match self {
            Self::Daily => "Log today's outputs.",
            Self::WeeklyReview => "Open your weekly review and reflect on the week.",
        }
    }
}

/// Marker key for the daily reminder on `date`.
pub fn daily_key(date: Date) -> String {
    format!("daily-reminder:{date}")
}

/// Marker key for the weekly review of the week starting `week_start`.
pub fn weekly_key(week_start: Date) -> String {
    format!("weekly-review:{week_start}")
}

/// The per-tick decision logic, independent of any timer.
pub struct ReminderScheduler<M, N> {
    settings: Settings,
    markers: M,
    notifier: N,
}

impl<M: MarkerStore, N: Notifier> ReminderScheduler<M, N> {
    pub fn new(settings: Settings, markers: M, notifier: N) -> Self {
        Self {
            settings,
            markers,
            notifier,
        }
    }

    /// Evaluates both reminders at local time `now`, firing each at most
    /// once per key. Returns what fired.
    pub fn tick(&self, now: DateTime) -> Result<Vec<ReminderKind>, M::Error> {
        let mut fired = Vec::new();
        let today = now.date();

        if let Some(at) = self.settings.daily_reminder_time
            && at.matches(now.time())
            && self.fire_once(ReminderKind::Daily, &daily_key(today))?
        {
            fired.push(ReminderKind::Daily);
        }

        let week_start_day = self.settings.week_start;
        if let Some(at) = self.settings.weekly_review_time
            && at.matches(now.time())
            && weekday_number(today) == week_start_day.last_weekday()
        {
            let key = weekly_key(week_start(today, week_start_day));
            if self.fire_once(ReminderKind::WeeklyReview, &key)? {
                fired.push(ReminderKind::WeeklyReview);
            }
        }

        Ok(fired)
    }

    fn fire_once(&self, kind: ReminderKind, key: &str) -> Result<bool, M::Error> {
        if self.markers.get(key)?.is_some() {
            debug!(key, "reminder marker present, skipping");
            return Ok(false);
        }
        self.notifier.notify(kind.title(), kind.body());
        self.markers.set(key, "1")?;
        info!(key, ?kind, "reminder fired");
        Ok(true)
    }
}

/// Current local wall-clock time.
pub fn local_now() -> DateTime {
    Zoned::now().datetime()
}

#[derive(Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    /// Sleeps up to `timeout`; returns `true` once stopped.
    fn wait(&self, timeout: Duration) -> bool {
        let guard = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = self
            .wake
            .wait_timeout_while(guard, timeout, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }

    fn stop(&self) {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.wake.notify_all();
    }
}

/// Handle to a running scheduler. Cancelling is the only way to stop it;
/// dropping the handle leaves the loop running.
pub struct ReminderHandle {
    running: Option<(Arc<StopSignal>, JoinHandle<()>)>,
}

impl ReminderHandle {
    fn noop() -> Self {
        Self { running: None }
    }

    /// Whether a polling loop was started.
    pub fn is_armed(&self) -> bool {
        self.running.is_some()
    }

    /// Stops the polling loop and waits for it to exit. No-op when unarmed.
    pub fn cancel(self) {
        if let Some((signal, worker)) = self.running {
            signal.stop();
            if worker.join().is_err() {
                warn!("reminder loop panicked");
            }
            info!("reminder scheduler cancelled");
        }
    }

    /// Blocks until the loop exits. Returns immediately when unarmed.
    pub fn wait(self) {
        if let Some((_signal, worker)) = self.running
            && worker.join().is_err()
        {
            warn!("reminder loop panicked");
        }
    }
}

/// Starts polling every `interval`, ticking once immediately.
///
/// Does nothing (and returns an unarmed handle) unless reminders are
/// enabled and notification permission is granted. Marker store errors
/// are logged and the loop carries on.
pub fn start<M, N, C>(
    settings: &Settings,
    permission: NotificationPermission,
    markers: M,
    notifier: N,
    clock: C,
    interval: Duration,
) -> ReminderHandle
where
    M: MarkerStore + Send + 'static,
    N: Notifier + Send + 'static,
    C: Fn() -> DateTime + Send + 'static,
{
    if !settings.reminders_enabled || permission != NotificationPermission::Granted {
        info!(
            enabled = settings.reminders_enabled,
            ?permission,
            "reminders not armed"
        );
        return ReminderHandle::noop();
    }

    let scheduler = ReminderScheduler::new(settings.clone(), markers, notifier);
    let signal = Arc::new(StopSignal::default());
    let loop_signal = Arc::clone(&signal);

    let worker = thread::spawn(move || {
        loop {
            if let Err(e) = scheduler.tick(clock()) {
                warn!(error = %e, "reminder tick failed");
            }
            if loop_signal.wait(interval) {
                break;
            }
        }
    });

    info!(interval_secs = interval.as_secs(), "reminder scheduler armed");
    ReminderHandle {
        running: Some((signal, worker)),
    }
}

/// In-process marker store.
#[derive(Debug, Default)]
pub struct MemoryMarkers {
    entries: Mutex<HashMap<String, String>>,
}

impl MarkerStore for MemoryMarkers {
    type Error = std::convert::Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<T: MarkerStore> MarkerStore for Arc<T> {
    type Error = T::Error;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        (**self).set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    use crate::model::ReminderTime;
    use crate::week::WeekStart;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Notifier for Recorder {
        fn notify(&self, title: &str, _body: &str) {
            self.0.lock().unwrap().push(title.to_string());
        }
    }

    impl Recorder {
        fn titles(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    fn settings() -> Settings {
        Settings {
            week_start: WeekStart::Monday,
            reminders_enabled: true,
            daily_reminder_time: Some("20:00".parse::<ReminderTime>().unwrap()),
            weekly_review_time: Some("18:30".parse::<ReminderTime>().unwrap()),
        }
    }

    fn scheduler() -> (ReminderScheduler<Arc<MemoryMarkers>, Recorder>, Arc<MemoryMarkers>, Recorder) {
        let markers = Arc::new(MemoryMarkers::default());
        let recorder = Recorder::default();
        let s = ReminderScheduler::new(settings(), Arc::clone(&markers), recorder.clone());
        (s, markers, recorder)
    }

    #[test]
    fn daily_fires_once_per_day() {
        let (s, markers, recorder) = scheduler();
        let now = date(2026, 2, 24).at(20, 0, 5, 0);

        assert_eq!(s.tick(now).unwrap(), vec![ReminderKind::Daily]);
        assert_eq!(s.tick(now).unwrap(), vec![]);
        assert_eq!(recorder.titles(), vec!["Daily output reminder"]);
        assert_eq!(
            markers.get("daily-reminder:2026-02-24").unwrap().as_deref(),
            Some("1")
        );

        // Next day gets a fresh key.
        let tomorrow = date(2026, 2, 25).at(20, 0, 0, 0);
        assert_eq!(s.tick(tomorrow).unwrap(), vec![ReminderKind::Daily]);
    }

    #[test]
    fn nothing_fires_outside_the_configured_minute() {
        let (s, _markers, recorder) = scheduler();
        assert!(s.tick(date(2026, 2, 24).at(20, 1, 0, 0)).unwrap().is_empty());
        assert!(s.tick(date(2026, 2, 24).at(19, 59, 59, 0)).unwrap().is_empty());
        assert!(recorder.titles().is_empty());
    }

    #[test]
    fn weekly_fires_on_last_day_of_week_only() {
        let (s, markers, _recorder) = scheduler();

        // Saturday is not the last day of a Monday week.
        assert!(s.tick(date(2026, 2, 28).at(18, 30, 0, 0)).unwrap().is_empty());

        // Sunday 2026-03-01 closes the week starting Monday 2026-02-23.
        let sunday = date(2026, 3, 1).at(18, 30, 0, 0);
        assert_eq!(s.tick(sunday).unwrap(), vec![ReminderKind::WeeklyReview]);
        assert_eq!(s.tick(sunday).unwrap(), vec![]);
        assert!(markers.get("weekly-review:2026-02-23").unwrap().is_some());
    }

    #[test]
    fn weekly_uses_sunday_weeks_when_configured() {
        let markers = Arc::new(MemoryMarkers::default());
        let mut config = settings();
        config.week_start = WeekStart::Sunday;
        let s = ReminderScheduler::new(config, Arc::clone(&markers), Recorder::default());

        // Saturday 2026-02-28 closes the week starting Sunday 2026-02-22.
        let saturday = date(2026, 2, 28).at(18, 30, 0, 0);
        assert_eq!(s.tick(saturday).unwrap(), vec![ReminderKind::WeeklyReview]);
        assert!(markers.get("weekly-review:2026-02-22").unwrap().is_some());
    }

    #[test]
    fn both_reminders_can_fire_in_the_same_tick() {
        let markers = Arc::new(MemoryMarkers::default());
        let mut config = settings();
        config.weekly_review_time = config.daily_reminder_time;
        let s = ReminderScheduler::new(config, markers, Recorder::default());

        let fired = s.tick(date(2026, 3, 1).at(20, 0, 0, 0)).unwrap();
        assert_eq!(fired, vec![ReminderKind::Daily, ReminderKind::WeeklyReview]);
    }

    #[test]
    fn existing_marker_suppresses_firing() {
        let (s, markers, recorder) = scheduler();
        markers.set(&daily_key(date(2026, 2, 24)), "1").unwrap();

        assert!(s.tick(date(2026, 2, 24).at(20, 0, 0, 0)).unwrap().is_empty());
        assert!(recorder.titles().is_empty());
    }

    #[test]
    fn start_is_noop_when_disabled_or_not_permitted() {
        let mut disabled = settings();
        disabled.reminders_enabled = false;
        let handle = start(
            &disabled,
            NotificationPermission::Granted,
            MemoryMarkers::default(),
            Recorder::default(),
            local_now,
            CHECK_INTERVAL,
        );
        assert!(!handle.is_armed());
        handle.cancel();

        for permission in [NotificationPermission::Denied, NotificationPermission::default()] {
            let handle = start(
                &settings(),
                permission,
                MemoryMarkers::default(),
                Recorder::default(),
                local_now,
                CHECK_INTERVAL,
            );
            assert!(!handle.is_armed(), "{permission:?} should not arm");
        }
        assert_eq!(NotificationPermission::default(), NotificationPermission::Default);
    }

    #[test]
    fn started_loop_ticks_immediately_and_cancels() {
        let recorder = Recorder::default();
        let handle = start(
            &settings(),
            NotificationPermission::Granted,
            MemoryMarkers::default(),
            recorder.clone(),
            || date(2026, 2, 24).at(20, 0, 0, 0),
            Duration::from_millis(5),
        );
        assert!(handle.is_armed());

        // Let it tick a few times; the marker keeps it to one notification.
        thread::sleep(Duration::from_millis(50));
        handle.cancel();

        assert_eq!(recorder.titles(), vec!["Daily output reminder"]);
    }
}
