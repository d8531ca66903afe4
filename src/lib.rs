//! # Fournil Forecast
//!
//! A Rust library for bakehouse demand forecasting and daily production
//! planning.
//!
//! ## Features
//!
//! - Sales ledger handling (append, undo-last, per-day stats)
//! - Weather and calendar-event signal adapters with neutral degradation
//! - Per-format demand model (seeded regression forests over weekday, hour
//!   and weather score) with batch retraining
//! - Intraday remaining-production forecasts with live trend correction and
//!   a velocity fallback when no model is trained
//! - 7-day-ahead production outlook
//!
//! ## Quick Start
//!
//! ```no_run
//! use fournil_forecast::data::Ledger;
//! use fournil_forecast::engine::ForecastEngine;
//! use fournil_forecast::events::EventCalendar;
//! use fournil_forecast::store::ModelStore;
//! use fournil_forecast::training::Trainer;
//! use fournil_forecast::weather::WeatherClass;
//!
//! fn main() -> fournil_forecast::Result<()> {
//!     let ledger = Ledger::open("ledger.csv")?;
//!     let store = ModelStore::new("model.json");
//!     let events = EventCalendar::default();
//!
//!     // Retrain from the full ledger history
//!     let outcome = Trainer::new().retrain(&ledger, &store)?;
//!     println!("{outcome:?}");
//!
//!     // Forecast the rest of today
//!     let engine = ForecastEngine::new(&ledger, &store, &events);
//!     let now = chrono::Local::now().naive_local();
//!     let forecast = engine.intraday(now, WeatherClass::Sunny)?;
//!     println!("{}: {:?}", forecast.mode, forecast.predictions);
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod engine;
pub mod error;
pub mod events;
pub mod hours;
pub mod models;
pub mod store;
pub mod training;
pub mod weather;

// Re-export commonly used types
pub use crate::data::{ActionKind, BagFormat, Ledger, LogEntry};
pub use crate::engine::{DayOutlook, ForecastEngine, ForecastMode, IntradayForecast};
pub use crate::error::{DemandError, Result};
pub use crate::models::{DemandFeatures, DemandModel};
pub use crate::store::{ModelState, ModelStore};
pub use crate::training::{TrainOutcome, Trainer};
pub use crate::weather::WeatherClass;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
