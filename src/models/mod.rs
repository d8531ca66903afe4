//! Demand model: per-format regressors over (weekday, hour, weather score)

use crate::data::BagFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod forest;

pub use forest::{ForestParams, ForestRegressor, FEATURE_COUNT};

/// One feature row for the demand model.
///
/// `weekday` uses the model's 0=Sunday convention, produced by
/// [`crate::hours::model_weekday`], not the 0=Monday convention of the
/// operating-hours policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemandFeatures {
    pub weekday: u8,
    pub hour: u8,
    pub weather_score: u8,
}

impl DemandFeatures {
    /// The features as a regressor input row.
    pub fn row(&self) -> [f64; FEATURE_COUNT] {
        [
            f64::from(self.weekday),
            f64::from(self.hour),
            f64::from(self.weather_score),
        ]
    }
}

/// Trained demand model: one independent regressor per bag format.
///
/// A format with no historical sales has no regressor; that is an expected
/// state and such formats predict nothing rather than failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandModel {
    regressors: BTreeMap<BagFormat, ForestRegressor>,
}

impl DemandModel {
    pub fn new(regressors: BTreeMap<BagFormat, ForestRegressor>) -> Self {
        Self { regressors }
    }

    /// The regressor for `format`, if that format had training data.
    pub fn regressor(&self, format: BagFormat) -> Option<&ForestRegressor> {
        self.regressors.get(&format)
    }

    /// Expected unit count for `format` under `features`, or `None` when the
    /// format has no regressor.
    pub fn predict(&self, format: BagFormat, features: &DemandFeatures) -> Option<f64> {
        self.regressors
            .get(&format)
            .map(|r| r.predict(&features.row()))
    }

    /// Formats covered by this model.
    pub fn formats(&self) -> impl Iterator<Item = BagFormat> + '_ {
        self.regressors.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.regressors.is_empty()
    }
}
