//! Demand model trainer
//!
//! Batch pipeline from raw sale rows to a fitted [`DemandModel`]: filter out
//! incomplete days, bucket sales by (weekday, hour, weather score, format)
//! and fit one forest per format. Too little data is a distinguishable
//! outcome, not an error, and never touches an existing model artifact.

use crate::data::{ActionKind, BagFormat, Ledger, LogEntry};
use crate::error::Result;
use crate::hours::model_weekday;
use crate::models::{DemandModel, ForestParams, ForestRegressor, FEATURE_COUNT};
use crate::store::ModelStore;
use chrono::{Datelike, NaiveDate, Timelike};
use std::collections::{BTreeMap, BTreeSet};

/// Days with fewer sale rows than this are discarded wholesale: a
/// half-logged day biases the demand curve downward.
pub const MIN_LOGS_THRESHOLD: usize = 10;

/// Outcome of a training run.
#[derive(Debug)]
pub enum TrainOutcome {
    /// A new model was fitted from the surviving data.
    Trained(DemandModel),
    /// No day met the completeness threshold; nothing was fitted and any
    /// previous model is left untouched.
    NotEnoughData {
        /// Number of days that met the threshold (always 0 here).
        valid_days: usize,
    },
}

/// Batch trainer for the per-format demand model.
#[derive(Debug, Clone)]
pub struct Trainer {
    params: ForestParams,
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Trainer {
    pub fn new() -> Self {
        Self {
            params: ForestParams::default(),
        }
    }

    pub fn with_params(params: ForestParams) -> Self {
        Self { params }
    }

    /// Fit a model from historical ledger rows.
    ///
    /// Only sale rows whose detail parses as a [`BagFormat`] participate.
    /// A format with no surviving rows is simply omitted from the model.
    pub fn train(&self, records: &[LogEntry]) -> Result<TrainOutcome> {
        let sales: Vec<(&LogEntry, BagFormat)> = records
            .iter()
            .filter(|e| e.action == ActionKind::Sale)
            .filter_map(|e| e.format().map(|f| (e, f)))
            .collect();

        let mut rows_per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for (entry, _) in &sales {
            *rows_per_day.entry(entry.timestamp.date()).or_insert(0) += 1;
        }
        let valid_days: BTreeSet<NaiveDate> = rows_per_day
            .into_iter()
            .filter(|(_, count)| *count >= MIN_LOGS_THRESHOLD)
            .map(|(date, _)| date)
            .collect();

        if valid_days.is_empty() {
            return Ok(TrainOutcome::NotEnoughData { valid_days: 0 });
        }

        // Units sold per (format, weekday 0=Sun, hour, weather score).
        let mut buckets: BTreeMap<(BagFormat, u8, u8, u8), f64> = BTreeMap::new();
        for (entry, format) in &sales {
            if !valid_days.contains(&entry.timestamp.date()) {
                continue;
            }
            let key = (
                *format,
                model_weekday(entry.timestamp.weekday()),
                entry.timestamp.hour() as u8,
                entry.weather.score(),
            );
            *buckets.entry(key).or_insert(0.0) += 1.0;
        }

        let mut regressors = BTreeMap::new();
        for format in BagFormat::ALL {
            let mut rows: Vec<[f64; FEATURE_COUNT]> = Vec::new();
            let mut targets: Vec<f64> = Vec::new();
            for ((f, weekday, hour, score), count) in &buckets {
                if *f != format {
                    continue;
                }
                rows.push([f64::from(*weekday), f64::from(*hour), f64::from(*score)]);
                targets.push(*count);
            }
            if rows.is_empty() {
                continue;
            }
            let forest = ForestRegressor::fit(&rows, &targets, &self.params)?;
            regressors.insert(format, forest);
        }

        Ok(TrainOutcome::Trained(DemandModel::new(regressors)))
    }

    /// Full retrain against the ledger, holding the store's exclusive
    /// training slot. The artifact is replaced only when a model was
    /// actually fitted; an insufficient-data run leaves it alone.
    pub fn retrain(&self, ledger: &Ledger, store: &ModelStore) -> Result<TrainOutcome> {
        let _guard = store.begin_training()?;
        let records = ledger.sale_records()?;
        let outcome = self.train(&records)?;
        if let TrainOutcome::Trained(model) = &outcome {
            store.replace(model)?;
        }
        Ok(outcome)
    }
}
