//! User settings read by weekly aggregation and the reminder scheduler.

use std::fmt;
use std::str::FromStr;

use jiff::civil::Time;
use serde::{Deserialize, Serialize};

use crate::week::WeekStart;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid time {0:?}: expected HH:MM")]
    InvalidTime(String),

    #[error("invalid week start {0}: expected 0 (Sunday) or 1 (Monday)")]
    InvalidWeekStart(u8),
}

/// A reminder time of day, minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReminderTime(Time);

impl ReminderTime {
    pub fn new(hour: i8, minute: i8) -> Result<Self, SettingsError> {
        Time::new(hour, minute, 0, 0)
            .map(Self)
            .map_err(|_| SettingsError::InvalidTime(format!("{hour}:{minute}")))
    }

    pub fn hour(self) -> i8 {
        self.0.hour()
    }

    pub fn minute(self) -> i8 {
        self.0.minute()
    }

    /// True when `time` falls within this reminder's minute.
    pub fn matches(self, time: Time) -> bool {
        time.hour() == self.hour() && time.minute() == self.minute()
    }
}

impl FromStr for ReminderTime {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SettingsError::InvalidTime(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: i8 = hour.parse().map_err(|_| invalid())?;
        let minute: i8 = minute.parse().map_err(|_| invalid())?;
        Time::new(hour, minute, 0, 0).map(Self).map_err(|_| invalid())
    }
}

impl fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl TryFrom<String> for ReminderTime {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReminderTime> for String {
    fn from(value: ReminderTime) -> Self {
        value.to_string()
    }
}

/// Per-user settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub week_start: WeekStart,
    pub reminders_enabled: bool,
    pub daily_reminder_time: Option<ReminderTime>,
    pub weekly_review_time: Option<ReminderTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::time;

    #[test]
    fn parses_and_displays_hh_mm() {
        let t: ReminderTime = "07:05".parse().unwrap();
        assert_eq!(t.hour(), 7);
        assert_eq!(t.minute(), 5);
        assert_eq!(t.to_string(), "07:05");

        assert_eq!("9:30".parse::<ReminderTime>().unwrap().to_string(), "09:30");
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["", "7", "24:00", "12:60", "12:5", "ab:cd", "12:30:00"] {
            assert!(bad.parse::<ReminderTime>().is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn matches_ignores_seconds() {
        let t: ReminderTime = "20:15".parse().unwrap();
        assert!(t.matches(time(20, 15, 42, 0)));
        assert!(!t.matches(time(20, 16, 0, 0)));
    }

    #[test]
    fn defaults_are_monday_and_disabled() {
        let settings = Settings::default();
        assert_eq!(settings.week_start, WeekStart::Monday);
        assert!(!settings.reminders_enabled);
        assert!(settings.daily_reminder_time.is_none());
    }
}
