//! Standard scaling for numeric features

use crate::error::{InsightsError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Parameters for one fitted column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: f64,
    /// Population standard deviation, 1.0 for constant columns
    pub scale: f64,
}

/// Z-score scaler: (x - mean) / std with the population std (ddof = 0)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    params: Vec<(String, ScalerParams)>,
    is_fitted: bool,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit the scaler to the given columns of `df`
    pub fn fit(&mut self, df: &DataFrame, columns: &[String]) -> Result<&mut Self> {
        let mut params = Vec::with_capacity(columns.len());

        for col_name in columns {
            let series = df
                .column(col_name)
                .map_err(|_| InsightsError::FeatureNotFound(col_name.clone()))?
                .as_materialized_series()
                .cast(&DataType::Float64)?;
            let ca = series.f64()?;

            let mean = ca.mean().unwrap_or(0.0);
            let std = ca.std(0).unwrap_or(0.0);
            params.push((
                col_name.clone(),
                ScalerParams {
                    mean,
                    scale: if std > 0.0 && std.is_finite() { std } else { 1.0 },
                },
            ));
        }

        self.params = params;
        self.is_fitted = true;
        Ok(self)
    }

    /// Scale the fitted columns present in `df`; other columns pass through.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(InsightsError::ModelNotFitted);
        }

        let replacements: Vec<Series> = self
            .params
            .iter()
            .filter_map(|(col_name, params)| {
                df.column(col_name).ok().map(|column| -> Result<Series> {
                    let series = column.as_materialized_series().cast(&DataType::Float64)?;
                    let scaled: Float64Chunked = series
                        .f64()?
                        .into_iter()
                        .map(|opt| opt.map(|v| params.apply(v)))
                        .collect();
                    Ok(scaled.with_name(col_name.as_str().into()).into_series())
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for scaled in replacements {
            result.with_column(scaled)?;
        }

        Ok(result)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Fitted columns with their parameters, in fit order
    pub fn params(&self) -> &[(String, ScalerParams)] {
        &self.params
    }

    pub fn get(&self, column: &str) -> Option<&ScalerParams> {
        self.params.iter().find(|(name, _)| name == column).map(|(_, p)| p)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(name, _)| name.as_str())
    }
}

impl ScalerParams {
    pub fn apply(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }
}
