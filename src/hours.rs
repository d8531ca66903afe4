//! Operating-hours policy
//!
//! One canonical weekly table keyed by [`chrono::Weekday`]. The model's
//! 0=Sunday feature convention is produced by [`model_weekday`], the single
//! place where the conversion happens; nothing else re-derives the table.

use chrono::Weekday;

/// Open window of a trading day, in whole hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenWindow {
    /// First open hour (inclusive).
    pub open: u32,
    /// Closing hour (exclusive).
    pub close: u32,
}

impl OpenWindow {
    /// Length of the open window in hours.
    pub fn span_hours(&self) -> u32 {
        self.close.saturating_sub(self.open)
    }
}

/// Opening hours for `weekday`, or `None` on a closed day.
///
/// Monday is always closed. Tuesday and Wednesday run 10-17, Thursday and
/// Friday 10-18, the weekend 10-17.
pub fn opening_hours(weekday: Weekday) -> Option<OpenWindow> {
    match weekday {
        Weekday::Mon => None,
        Weekday::Thu | Weekday::Fri => Some(OpenWindow { open: 10, close: 18 }),
        Weekday::Tue | Weekday::Wed | Weekday::Sat | Weekday::Sun => {
            Some(OpenWindow { open: 10, close: 17 })
        }
    }
}

/// Weekday as the demand model's input feature (0 = Sunday .. 6 = Saturday).
pub fn model_weekday(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}
