//! Error types for the rental insights engine

use thiserror::Error;

/// Result type alias for rental insights operations
pub type Result<T> = std::result::Result<T, InsightsError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Failed to load {dataset} dataset: {reason}")]
    DatasetError { dataset: String, reason: String },

    #[error("Missing required column '{column}' in {dataset} dataset")]
    MissingColumn { dataset: String, column: String },

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Optimization error: {0}")]
    OptimizationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl InsightsError {
    /// Build a dataset load error for `dataset`
    pub fn dataset(dataset: impl Into<String>, reason: impl ToString) -> Self {
        InsightsError::DatasetError {
            dataset: dataset.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a missing column error for `dataset`
    pub fn missing_column(dataset: impl Into<String>, column: impl Into<String>) -> Self {
        InsightsError::MissingColumn {
            dataset: dataset.into(),
            column: column.into(),
        }
    }
}

impl From<polars::error::PolarsError> for InsightsError {
    fn from(err: polars::error::PolarsError) -> Self {
        InsightsError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for InsightsError {
    fn from(err: serde_json::Error) -> Self {
        InsightsError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for InsightsError {
    fn from(err: ndarray::ShapeError) -> Self {
        InsightsError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InsightsError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_dataset_error_names_dataset() {
        let err = InsightsError::dataset("listings", "file not found");
        assert_eq!(err.to_string(), "Failed to load listings dataset: file not found");

        let err = InsightsError::missing_column("listings", "price");
        assert!(err.to_string().contains("'price'"));
        assert!(err.to_string().contains("listings"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: InsightsError = io_err.into();
        assert!(matches!(err, InsightsError::IoError(_)));
    }
}
