//! Event signal adapter
//!
//! Maps a calendar date to a sales multiplier: fixed-date events, moveable
//! feasts derived from Easter, one derived sporting date, then a generic
//! regional holiday calendar. First match wins; most days match nothing and
//! that is the normal outcome, not a failure.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Event lookup result. `label` is `None` on an ordinary day and the
/// multiplier is then exactly 1.0.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSignal {
    pub label: Option<String>,
    pub multiplier: f64,
}

impl EventSignal {
    fn none() -> Self {
        Self {
            label: None,
            multiplier: 1.0,
        }
    }

    fn named(label: &str, multiplier: f64) -> Self {
        Self {
            label: Some(label.to_string()),
            multiplier,
        }
    }
}

/// Regional holiday source, owned by the web layer. A pure function of the
/// date with no failure path.
pub trait HolidayCalendar {
    /// Name of the holiday falling on `date`, if any.
    fn holiday_name(&self, date: NaiveDate) -> Option<String>;
}

/// Calendar with no regional holidays.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHolidays;

impl HolidayCalendar for NoHolidays {
    fn holiday_name(&self, _date: NaiveDate) -> Option<String> {
        None
    }
}

/// Fixed (month, day) events, checked before everything else.
const FIXED_EVENTS: [(u32, u32, &str, f64); 6] = [
    (2, 14, "Valentine's Day", 1.4),
    (6, 24, "National Day", 1.5),
    (7, 1, "Canada Day", 1.3),
    (10, 31, "Halloween", 1.3),
    (12, 24, "Christmas Eve", 2.0),
    (12, 31, "New Year's Eve", 1.8),
];

/// Gregorian Easter Sunday for `year` (Meeus/Jones/Butcher computus).
pub fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
        .expect("computus always yields a valid date")
}

/// Second Sunday of February for `year`.
fn second_sunday_of_february(year: i32) -> NaiveDate {
    let feb_first = NaiveDate::from_ymd_opt(year, 2, 1)
        .expect("February 1st always exists");
    let offset = (7 - feb_first.weekday().num_days_from_sunday()) % 7;
    feb_first + Duration::days(i64::from(offset) + 7)
}

/// Event calendar combining the built-in rules with a regional holiday
/// source.
#[derive(Debug)]
pub struct EventCalendar<C: HolidayCalendar> {
    holidays: C,
}

impl Default for EventCalendar<NoHolidays> {
    fn default() -> Self {
        Self::new(NoHolidays)
    }
}

impl<C: HolidayCalendar> EventCalendar<C> {
    pub fn new(holidays: C) -> Self {
        Self { holidays }
    }

    /// Resolve the event signal for `date`. Total: an ordinary day yields
    /// `(None, 1.0)`.
    pub fn lookup(&self, date: NaiveDate) -> EventSignal {
        for (month, day, label, multiplier) in FIXED_EVENTS {
            if date.month() == month && date.day() == day {
                return EventSignal::named(label, multiplier);
            }
        }

        let easter = easter_sunday(date.year());
        if date == easter {
            return EventSignal::named("Easter Sunday", 1.6);
        }
        if date == easter - Duration::days(1) {
            return EventSignal::named("Easter Saturday", 1.5);
        }

        if date.month() == 2
            && date.weekday() == Weekday::Sun
            && date == second_sunday_of_february(date.year())
        {
            return EventSignal::named("Super Bowl Sunday", 1.5);
        }

        if let Some(name) = self.holidays.holiday_name(date) {
            // Christmas and New Year are already covered by the fixed table;
            // skip them to avoid stacking multipliers.
            if !name.contains("Christmas") && !name.contains("New Year") {
                return EventSignal::named(&name, 1.2);
            }
        }

        EventSignal::none()
    }
}
