//! Data preprocessing module
//!
//! Turns raw listing tables into model inputs:
//! - Schema negotiation against the candidate feature lists
//! - Numeric fallbacks parsed from free text (`bathrooms_text`)
//! - IQR outlier removal on price
//! - One-hot encoding with a dropped reference category
//! - Standard scaling of numeric features
//! - Importance-driven feature selection

mod config;
mod encoder;
mod pipeline;
mod scaler;
pub mod feature_selection;
pub mod outlier;
pub mod schema;

pub use config::PreparerConfig;
pub use encoder::{indicator_name, CategoricalGroup, OneHotEncoder};
pub use feature_selection::{FeatureImportance, FeatureSelection, FeatureSelector, SelectorConfig};
pub use outlier::{remove_iqr_outliers, IqrBounds};
pub use pipeline::{extract_leading_number, FeaturePreparer, PreparedData};
pub use scaler::{ScalerParams, StandardScaler};
pub use schema::{negotiate, NegotiatedSchema};

use crate::error::{InsightsError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Read one column as `f64` values. Missing values are an error.
pub fn column_to_array(df: &DataFrame, column: &str) -> Result<Array1<f64>> {
    let series = df
        .column(column)
        .map_err(|_| InsightsError::FeatureNotFound(column.to_string()))?
        .as_materialized_series()
        .cast(&DataType::Float64)?;

    series
        .f64()?
        .into_iter()
        .map(|v| {
            v.ok_or_else(|| InsightsError::DataError(format!("Missing value in column '{}'", column)))
        })
        .collect::<Result<Vec<f64>>>()
        .map(Array1::from_vec)
}

/// Row-major matrix over `columns`, in the given column order
pub fn frame_to_array(df: &DataFrame, columns: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let data: Vec<Array1<f64>> = columns
        .iter()
        .map(|name| column_to_array(df, name))
        .collect::<Result<_>>()?;

    Ok(Array2::from_shape_fn((n_rows, columns.len()), |(i, j)| data[j][i]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_to_array_column_order() {
        let df = df! {
            "a" => [1.0, 2.0],
            "b" => [3i64, 4],
        }
        .unwrap();

        let x = frame_to_array(&df, &["b".to_string(), "a".to_string()]).unwrap();
        assert_eq!(x, ndarray::array![[3.0, 1.0], [4.0, 2.0]]);
    }

    #[test]
    fn test_missing_values_rejected() {
        let df = df! { "a" => [Some(1.0), None] }.unwrap();
        assert!(column_to_array(&df, "a").is_err());
        assert!(matches!(
            column_to_array(&df, "zzz"),
            Err(InsightsError::FeatureNotFound(_))
        ));
    }
}
