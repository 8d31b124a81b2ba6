//! IQR outlier removal
//!
//! Quartiles come from polars' linear quantile, the same interpolation as
//! the usual `quantile(0.25)` / `quantile(0.75)` of dataframe libraries.

use crate::error::{InsightsError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fitted bounds for a column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IqrBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    /// Compute bounds from unsorted values; `None` when there are none.
    pub fn fit(values: &[f64], factor: f64) -> Option<Self> {
        let ca = Float64Chunked::from_slice("values".into(), values);
        Self::fit_chunked(&ca, factor).ok().flatten()
    }

    /// Bounds over the present, non-NaN values of a column
    pub fn fit_chunked(ca: &Float64Chunked, factor: f64) -> Result<Option<Self>> {
        let present: Float64Chunked = ca.into_iter().map(|v| v.filter(|x| !x.is_nan())).collect();

        let q1 = present.quantile(0.25, QuantileMethod::Linear)?;
        let q3 = present.quantile(0.75, QuantileMethod::Linear)?;

        Ok(q1.zip(q3).map(|(q1, q3)| {
            let iqr = q3 - q1;
            Self {
                q1,
                q3,
                lower: q1 - factor * iqr,
                upper: q3 + factor * iqr,
            }
        }))
    }

    /// Inclusive on both ends
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Drop rows whose `column` value falls outside the IQR bounds.
///
/// Rows with a missing value are dropped too, as they cannot be compared.
/// Returns the filtered frame and the bounds used (`None` if the column had
/// no values at all, in which case every row is dropped).
pub fn remove_iqr_outliers(
    df: &DataFrame,
    column: &str,
    factor: f64,
) -> Result<(DataFrame, Option<IqrBounds>)> {
    let series = df
        .column(column)
        .map_err(|_| InsightsError::FeatureNotFound(column.to_string()))?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let ca = series.f64()?;

    let bounds = IqrBounds::fit_chunked(ca, factor)?;

    let mask: Vec<bool> = match &bounds {
        Some(b) => ca.into_iter().map(|v| v.is_some_and(|x| b.contains(x))).collect(),
        None => vec![false; df.height()],
    };
    let filtered = df.filter(&BooleanChunked::from_slice("keep".into(), &mask))?;

    if let Some(b) = &bounds {
        debug!(
            column,
            lower = b.lower,
            upper = b.upper,
            removed = df.height() - filtered.height(),
            "Removed IQR outliers"
        );
    }

    Ok((filtered, bounds))
}
