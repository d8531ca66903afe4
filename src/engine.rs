//! Forecast engine
//!
//! Turns {elapsed sales, weather, calendar, time of day} into the remaining
//! production per bag format for the current day, and a 7-day-ahead
//! production outlook.
//!
//! Intraday prediction runs one of two branches. With a loaded model, the
//! per-hour demand curve for the rest of the open window is summed per
//! format and corrected by a trend ratio: how much faster or slower today
//! actually runs versus the model's own retrospective estimate of the
//! elapsed hours. Without a usable model, the observed sales velocity is
//! extrapolated over the remaining hours and scaled by the weather factor
//! and the event multiplier. Forecasts never fail outright on signal or
//! model problems; they degrade to the fallback branch or to zeros.

use crate::data::{BagFormat, Ledger};
use crate::error::Result;
use crate::events::{EventCalendar, EventSignal, HolidayCalendar};
use crate::hours::{model_weekday, opening_hours, OpenWindow};
use crate::models::{DemandFeatures, DemandModel};
use crate::store::{ModelState, ModelStore};
use crate::weather::WeatherClass;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use std::collections::BTreeMap;
use std::fmt;

/// Minimum elapsed time before the trend ratio is trusted.
const TREND_MIN_ELAPSED_HOURS: f64 = 0.5;
/// Retrospective sums at or below this are noise; the trend stays 1.0.
const TREND_NOISE_FLOOR: f64 = 5.0;
const TREND_RATIO_MIN: f64 = 0.5;
const TREND_RATIO_MAX: f64 = 2.0;
/// Minimum elapsed time before the velocity fallback has a usable signal.
const FALLBACK_MIN_ELAPSED_HOURS: f64 = 0.1;

/// Where the current time falls relative to the open window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPhase {
    /// Closed all day; nothing to forecast.
    Closed,
    /// Before opening: the forecast covers the full open window.
    Planning,
    /// Within (or past) the open window. Past close, hours remaining is
    /// floored to zero but elapsed sales still count.
    Live,
}

/// Which reasoning produced the intraday predictions.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastMode {
    Closed,
    /// Learned demand curve, corrected by the trend ratio.
    Model { trend_ratio: f64 },
    /// Velocity extrapolation; no usable model.
    Fallback,
}

impl fmt::Display for ForecastMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastMode::Closed => write!(f, "Closed"),
            ForecastMode::Model { trend_ratio } => {
                write!(f, "Model (trend {:.0}%)", trend_ratio * 100.0)
            }
            ForecastMode::Fallback => write!(f, "Fallback (no usable model)"),
        }
    }
}

/// Remaining-production forecast for the current day.
#[derive(Debug, Clone, PartialEq)]
pub struct IntradayForecast {
    /// Hours until close, rounded to one decimal.
    pub hours_remaining: f64,
    pub weather: WeatherClass,
    /// Units still to produce, per format. Ceiling of the raw estimate:
    /// producing under is worse than producing over.
    pub predictions: BTreeMap<BagFormat, u32>,
    /// Event label for today, if any.
    pub event: Option<String>,
    pub mode: ForecastMode,
    pub phase: DayPhase,
}

/// One day of the week-ahead outlook.
#[derive(Debug, Clone, PartialEq)]
pub struct DayOutlook {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub weather: WeatherClass,
    pub closed: bool,
    pub event: Option<String>,
    pub multiplier: f64,
    /// Units to produce per format; `None` when no model is trained (there
    /// is no live-sales signal to drive a fallback for future days).
    pub totals: Option<BTreeMap<BagFormat, u64>>,
}

/// The forecast engine, wired to its collaborators.
#[derive(Debug)]
pub struct ForecastEngine<'a, C: HolidayCalendar> {
    ledger: &'a Ledger,
    store: &'a ModelStore,
    events: &'a EventCalendar<C>,
}

impl<'a, C: HolidayCalendar> ForecastEngine<'a, C> {
    pub fn new(ledger: &'a Ledger, store: &'a ModelStore, events: &'a EventCalendar<C>) -> Self {
        Self {
            ledger,
            store,
            events,
        }
    }

    /// Remaining-production forecast for the day containing `now`.
    pub fn intraday(&self, now: NaiveDateTime, weather: WeatherClass) -> Result<IntradayForecast> {
        let date = now.date();
        let window = match opening_hours(date.weekday()) {
            Some(window) => window,
            None => {
                return Ok(IntradayForecast {
                    hours_remaining: 0.0,
                    weather,
                    predictions: zero_predictions(),
                    event: None,
                    mode: ForecastMode::Closed,
                    phase: DayPhase::Closed,
                })
            }
        };

        let open_dt = date
            .and_hms_opt(window.open, 0, 0)
            .expect("open hour is a valid time of day");
        let close_dt = date
            .and_hms_opt(window.close, 0, 0)
            .expect("close hour is a valid time of day");

        let (phase, hours_left, elapsed_hours) = if now < open_dt {
            (DayPhase::Planning, f64::from(window.span_hours()), 0.0)
        } else {
            let left = (close_dt - now).num_minutes().max(0) as f64 / 60.0;
            let elapsed = (now - open_dt).num_minutes() as f64 / 60.0;
            (DayPhase::Live, left, elapsed)
        };

        let sales = self.ledger.sales_for_date(date)?;
        let event = self.events.lookup(date);

        let (predictions, mode) = match self.store.load() {
            ModelState::Loaded(model) => {
                let (predictions, trend_ratio) =
                    model_branch(&model, now, window, phase, elapsed_hours, weather, &sales);
                (predictions, ForecastMode::Model { trend_ratio })
            }
            // Absent is the normal no-model state; Corrupt degrades the same
            // way instead of failing the request.
            ModelState::Absent | ModelState::Corrupt => (
                fallback_branch(phase, elapsed_hours, hours_left, weather, &event, &sales),
                ForecastMode::Fallback,
            ),
        };

        Ok(IntradayForecast {
            hours_remaining: (hours_left * 10.0).round() / 10.0,
            weather,
            predictions,
            event: event.label,
            mode,
            phase,
        })
    }

    /// Production outlook for up to 7 future days, driven entirely by the
    /// learned model (no trend correction: future days have no live sales).
    ///
    /// `weekly_codes` is the weather feed's daily horizon; entries up to and
    /// including `today` are skipped.
    pub fn week_ahead(
        &self,
        today: NaiveDate,
        weekly_codes: &[(NaiveDate, i64)],
    ) -> Vec<DayOutlook> {
        let model = match self.store.load() {
            ModelState::Loaded(model) => Some(model),
            ModelState::Absent | ModelState::Corrupt => None,
        };

        weekly_codes
            .iter()
            .filter(|(date, _)| *date > today)
            .take(7)
            .map(|&(date, code)| {
                let weather = WeatherClass::from_code(code);
                let event = self.events.lookup(date);
                let weekday = date.weekday();
                let window = opening_hours(weekday);

                let totals = match (&model, window) {
                    (Some(model), Some(window)) => {
                        Some(day_totals(model, weekday, window, weather, event.multiplier))
                    }
                    // Closed day: an all-zero row, flagged below.
                    (Some(_), None) => {
                        Some(BagFormat::ALL.iter().map(|f| (*f, 0)).collect())
                    }
                    (None, _) => None,
                };

                DayOutlook {
                    date,
                    weekday,
                    weather,
                    closed: window.is_none(),
                    event: event.label,
                    multiplier: event.multiplier,
                    totals,
                }
            })
            .collect()
    }
}

/// Model branch: per-hour demand sums for the rest of the window, trend
/// corrected. The event multiplier is deliberately not applied here. The
/// model already saw event days in training; only the fallback branch
/// scales by it.
fn model_branch(
    model: &DemandModel,
    now: NaiveDateTime,
    window: OpenWindow,
    phase: DayPhase,
    elapsed_hours: f64,
    weather: WeatherClass,
    sales: &BTreeMap<BagFormat, u32>,
) -> (BTreeMap<BagFormat, u32>, f64) {
    let weekday = model_weekday(now.date().weekday());
    let weather_score = weather.score();

    let mut trend_ratio = 1.0;
    if phase == DayPhase::Live && elapsed_hours > TREND_MIN_ELAPSED_HOURS {
        let mut retrospective = 0.0;
        for hour in window.open..now.hour() {
            for format in BagFormat::ALL {
                let features = DemandFeatures {
                    weekday,
                    hour: hour as u8,
                    weather_score,
                };
                if let Some(value) = model.predict(format, &features) {
                    retrospective += value;
                }
            }
        }
        if retrospective > TREND_NOISE_FLOOR {
            let actual: u32 = sales.values().sum();
            trend_ratio =
                (f64::from(actual) / retrospective).clamp(TREND_RATIO_MIN, TREND_RATIO_MAX);
        }
    }

    let hour_range = match phase {
        DayPhase::Live => now.hour()..window.close,
        _ => window.open..window.close,
    };
    let minute = now.minute();

    let mut predictions = BTreeMap::new();
    for format in BagFormat::ALL {
        let mut total = 0.0;
        for hour in hour_range.clone() {
            let features = DemandFeatures {
                weekday,
                hour: hour as u8,
                weather_score,
            };
            let Some(mut value) = model.predict(format, &features) else {
                // Format absent from the model: predicts zero, not an error.
                continue;
            };
            if phase == DayPhase::Live && hour == now.hour() {
                // Prorate the current partial hour by minutes remaining.
                value *= f64::from(60 - minute) / 60.0;
            }
            total += value;
        }
        predictions.insert(format, ceil_units(total * trend_ratio));
    }

    (predictions, trend_ratio)
}

/// Fallback branch: observed velocity times remaining hours, scaled by the
/// weather factor and the event multiplier. Before the shop has meaningfully
/// opened there is no velocity signal and everything stays zero.
fn fallback_branch(
    phase: DayPhase,
    elapsed_hours: f64,
    hours_left: f64,
    weather: WeatherClass,
    event: &EventSignal,
    sales: &BTreeMap<BagFormat, u32>,
) -> BTreeMap<BagFormat, u32> {
    let mut predictions = zero_predictions();
    if phase != DayPhase::Live || elapsed_hours <= FALLBACK_MIN_ELAPSED_HOURS {
        return predictions;
    }
    for format in BagFormat::ALL {
        let sold = f64::from(sales.get(&format).copied().unwrap_or(0));
        let rate = sold / elapsed_hours;
        let projection = rate * hours_left * weather.factor() * event.multiplier;
        predictions.insert(format, ceil_units(projection));
    }
    predictions
}

/// Per-format totals for one future day: hourly sums over the open window,
/// scaled by the event multiplier, floored.
fn day_totals(
    model: &DemandModel,
    weekday: Weekday,
    window: OpenWindow,
    weather: WeatherClass,
    multiplier: f64,
) -> BTreeMap<BagFormat, u64> {
    let weekday = model_weekday(weekday);
    let weather_score = weather.score();
    let mut totals = BTreeMap::new();
    for format in BagFormat::ALL {
        let sum: f64 = (window.open..window.close)
            .map(|hour| {
                let features = DemandFeatures {
                    weekday,
                    hour: hour as u8,
                    weather_score,
                };
                model.predict(format, &features).unwrap_or(0.0)
            })
            .sum();
        totals.insert(format, (sum * multiplier).max(0.0).floor() as u64);
    }
    totals
}

fn zero_predictions() -> BTreeMap<BagFormat, u32> {
    BagFormat::ALL.iter().map(|f| (*f, 0)).collect()
}

fn ceil_units(value: f64) -> u32 {
    value.max(0.0).ceil() as u32
}
