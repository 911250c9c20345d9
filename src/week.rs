//! Week windows: the 7-day span used for weekly aggregation.
//!
//! All arithmetic is on civil dates. A day is one calendar day, never
//! 24 hours, so DST transitions cannot shift a boundary.

use std::fmt;

use jiff::ToSpan;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// Which weekday a week begins on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Sunday,
    #[default]
    Monday,
}

impl WeekStart {
    /// Weekday number: 0 = Sunday, 1 = Monday.
    pub fn number(self) -> u8 {
        match self {
            Self::Sunday => 0,
            Self::Monday => 1,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            0 => Some(Self::Sunday),
            1 => Some(Self::Monday),
            _ => None,
        }
    }

    /// The last weekday of a week starting here.
    pub fn last_weekday(self) -> u8 {
        (self.number() + 6) % 7
    }
}

impl fmt::Display for WeekStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sunday => f.write_str("sunday"),
            Self::Monday => f.write_str("monday"),
        }
    }
}

/// Weekday number of a date: 0 = Sunday .. 6 = Saturday.
pub fn weekday_number(date: Date) -> u8 {
    // `to_sunday_zero_offset` is always in 0..=6.
    u8::try_from(date.weekday().to_sunday_zero_offset()).unwrap_or(0)
}

/// Start of the week containing `anchor`.
pub fn week_start(anchor: Date, start: WeekStart) -> Date {
    let offset = (weekday_number(anchor) + 7 - start.number()) % 7;
    anchor.saturating_sub(i64::from(offset).days())
}

/// Last day (inclusive) of the week containing `anchor`.
pub fn week_end(anchor: Date, start: WeekStart) -> Date {
    week_start(anchor, start).saturating_add(6.days())
}

/// The seven consecutive dates beginning at `first`.
pub fn week_days(first: Date) -> [Date; 7] {
    let mut days = [first; 7];
    for (offset, day) in (0_i64..).zip(days.iter_mut()) {
        *day = first.saturating_add(offset.days());
    }
    days
}

/// A derived `{start, end}` week, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekWindow {
    pub start: Date,
    pub end: Date,
}

impl WeekWindow {
    /// The window containing `anchor` for the given week start.
    pub fn containing(anchor: Date, start: WeekStart) -> Self {
        let first = week_start(anchor, start);
        Self {
            start: first,
            end: first.saturating_add(6.days()),
        }
    }

    pub fn days(&self) -> [Date; 7] {
        week_days(self.start)
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for WeekWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}
