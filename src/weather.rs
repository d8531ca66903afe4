//! Weather signal adapter
//!
//! Maps WMO weather codes to a single shared vocabulary of weather classes.
//! Every consumer of a weather bucket (sales factor, model feature score,
//! ledger row label) goes through [`WeatherClass`], so the three views can
//! never drift apart.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse weather bucket shared by the ledger, the trainer and the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeatherClass {
    Sunny,
    Cloudy,
    Fog,
    Rain,
    Showers,
    Snow,
    Storm,
    /// Code outside every known band
    Variable,
    /// The weather feed could not be reached
    Unavailable,
}

impl WeatherClass {
    /// Classify a WMO weather code. Total over all integers; unknown codes
    /// map to [`WeatherClass::Variable`].
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => WeatherClass::Sunny,
            1..=3 => WeatherClass::Cloudy,
            45..=48 => WeatherClass::Fog,
            51..=67 => WeatherClass::Rain,
            80..=82 => WeatherClass::Showers,
            71..=77 => WeatherClass::Snow,
            c if c >= 95 => WeatherClass::Storm,
            _ => WeatherClass::Variable,
        }
    }

    /// Multiplicative sales impact of this weather class.
    pub fn factor(&self) -> f64 {
        match self {
            WeatherClass::Sunny => 1.2,
            WeatherClass::Cloudy => 1.0,
            WeatherClass::Fog => 0.9,
            WeatherClass::Rain => 0.7,
            WeatherClass::Showers => 0.7,
            WeatherClass::Snow => 0.6,
            WeatherClass::Storm => 0.5,
            WeatherClass::Variable => 1.0,
            WeatherClass::Unavailable => 1.0,
        }
    }

    /// 3-level model feature: 0 = bad, 1 = average, 2 = good.
    pub fn score(&self) -> u8 {
        match self {
            WeatherClass::Sunny => 2,
            WeatherClass::Cloudy | WeatherClass::Fog => 1,
            WeatherClass::Rain
            | WeatherClass::Showers
            | WeatherClass::Snow
            | WeatherClass::Storm => 0,
            WeatherClass::Variable | WeatherClass::Unavailable => 1,
        }
    }

    /// Display label, also used as the denormalized string on ledger rows.
    pub fn label(&self) -> &'static str {
        match self {
            WeatherClass::Sunny => "Sunny",
            WeatherClass::Cloudy => "Cloudy",
            WeatherClass::Fog => "Fog",
            WeatherClass::Rain => "Rain",
            WeatherClass::Showers => "Showers",
            WeatherClass::Snow => "Snow",
            WeatherClass::Storm => "Storm",
            WeatherClass::Variable => "Variable",
            WeatherClass::Unavailable => "Unavailable",
        }
    }

    /// Parse a stored label back into a class. Unknown labels fall back to
    /// the average bucket so stale ledger rows never poison training.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Sunny" => WeatherClass::Sunny,
            "Cloudy" => WeatherClass::Cloudy,
            "Fog" => WeatherClass::Fog,
            "Rain" => WeatherClass::Rain,
            "Showers" => WeatherClass::Showers,
            "Snow" => WeatherClass::Snow,
            "Storm" => WeatherClass::Storm,
            "Unavailable" => WeatherClass::Unavailable,
            _ => WeatherClass::Variable,
        }
    }
}

impl fmt::Display for WeatherClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// External weather source, owned by the web layer.
///
/// Failures are represented in-band: a missing current code or an empty
/// weekly list, never an error the core has to handle.
pub trait WeatherFeed {
    /// Current WMO weather code, or `None` when the feed is unreachable.
    fn current_code(&self) -> Option<i64>;

    /// Daily weather codes for up to the next 8 days, today included.
    /// May be shorter or empty on feed failure.
    fn weekly_codes(&self) -> Vec<(NaiveDate, i64)>;
}

/// Resolve the current weather class from a feed, substituting the neutral
/// [`WeatherClass::Unavailable`] when the feed has no code.
pub fn current_class(feed: &dyn WeatherFeed) -> WeatherClass {
    feed.current_code()
        .map(WeatherClass::from_code)
        .unwrap_or(WeatherClass::Unavailable)
}
