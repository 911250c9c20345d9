//! Schedule evaluation: is an output due on a given day?

use jiff::civil::Date;

use crate::model::Frequency;
use crate::week::weekday_number;

/// Whether a recurrence is due on `date`.
///
/// Flexible weekly outputs have no due day, so they are never scheduled at
/// day granularity; they are judged per week by
/// [`week_summary`](crate::accounting::week_summary).
pub fn is_scheduled(frequency: &Frequency, date: Date) -> bool {
    match frequency {
        Frequency::Daily => true,
        Frequency::FixedWeekly { weekdays } => weekdays.contains(&weekday_number(date)),
        Frequency::FlexibleWeekly { .. } => false,
    }
}

/// Number of days in `days` on which the recurrence is due.
pub fn scheduled_days(frequency: &Frequency, days: &[Date]) -> u32 {
    let count = days.iter().filter(|d| is_scheduled(frequency, **d)).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}
