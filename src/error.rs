//! Error types for the fournil_forecast crate

use thiserror::Error;

/// Custom error types for the fournil_forecast crate
#[derive(Debug, Error)]
pub enum DemandError {
    /// Error related to ledger data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to model fitting
    #[error("Training error: {0}")]
    TrainingError(String),

    /// Another retrain is already holding the training slot
    #[error("Training already in progress")]
    TrainingInProgress,

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from ledger CSV operations
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from model artifact serialization
    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, DemandError>;
