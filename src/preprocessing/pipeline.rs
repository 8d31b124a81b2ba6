//! Listing preparation: text fallbacks, outlier removal, completeness
//! filtering and one-hot encoding, in that order.

use super::config::PreparerConfig;
use super::encoder::{CategoricalGroup, OneHotEncoder};
use super::outlier::{remove_iqr_outliers, IqrBounds};
use super::schema::{negotiate, NegotiatedSchema};
use super::{column_to_array, frame_to_array};
use crate::error::Result;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use regex::Regex;
use tracing::{debug, info};

/// A cleaned, fully numeric listings table ready for modeling
#[derive(Debug, Clone)]
pub struct PreparedData {
    /// Numeric features, then indicator columns, then the target
    pub frame: DataFrame,
    pub numeric_features: Vec<String>,
    pub groups: Vec<CategoricalGroup>,
    pub target: String,
    pub outlier_bounds: Option<IqrBounds>,
}

impl PreparedData {
    pub fn n_rows(&self) -> usize {
        self.frame.height()
    }

    /// Every model input column, in frame order
    pub fn feature_names(&self) -> Vec<String> {
        self.numeric_features
            .iter()
            .cloned()
            .chain(self.groups.iter().flat_map(|g| g.columns.iter().cloned()))
            .collect()
    }

    /// Feature matrix over `columns`, optionally restricted to `rows`
    pub fn features(&self, columns: &[String], rows: Option<&[usize]>) -> Result<Array2<f64>> {
        match rows {
            Some(rows) => frame_to_array(&self.rows(rows)?, columns),
            None => frame_to_array(&self.frame, columns),
        }
    }

    pub fn target_values(&self, rows: Option<&[usize]>) -> Result<Array1<f64>> {
        match rows {
            Some(rows) => column_to_array(&self.rows(rows)?, &self.target),
            None => column_to_array(&self.frame, &self.target),
        }
    }

    /// Subset of the frame in the given row order
    pub fn rows(&self, rows: &[usize]) -> Result<DataFrame> {
        let idx: Vec<IdxSize> = rows.iter().map(|&i| i as IdxSize).collect();
        Ok(self.frame.take(&IdxCa::from_vec("idx".into(), idx))?)
    }
}

/// Turns a raw listings table into [`PreparedData`]
#[derive(Debug, Clone, Default)]
pub struct FeaturePreparer {
    config: PreparerConfig,
}

impl FeaturePreparer {
    pub fn new(config: PreparerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreparerConfig {
        &self.config
    }

    pub fn prepare(&self, listings: &DataFrame) -> Result<PreparedData> {
        self.config.validate()?;
        let schema = negotiate(listings, &self.config)?;
        info!(
            rows = listings.height(),
            numeric = schema.numeric.len(),
            categorical = schema.categorical.len(),
            "Preparing listings"
        );

        let df = self.apply_text_fallbacks(listings, &schema)?;
        let df = cast_numeric(&df, &schema)?;

        let (df, outlier_bounds) = remove_iqr_outliers(&df, &schema.target, self.config.iqr_factor)?;
        let df = drop_incomplete(&df, &schema)?;
        debug!(rows = df.height(), "Rows after cleaning");

        let mut encoder = OneHotEncoder::new();
        let encoded = encoder.fit_transform(&df, &schema.categorical)?;

        let mut columns: Vec<String> = schema.numeric.clone();
        columns.extend(encoder.encoded_columns());
        columns.push(schema.target.clone());
        let frame = encoded.select(columns)?;

        Ok(PreparedData {
            frame,
            numeric_features: schema.numeric,
            groups: encoder.groups().to_vec(),
            target: schema.target,
            outlier_bounds,
        })
    }

    /// Fill missing numeric values from their free-text companion column.
    fn apply_text_fallbacks(&self, df: &DataFrame, schema: &NegotiatedSchema) -> Result<DataFrame> {
        let mut result = df.clone();

        for field in &schema.numeric {
            let Some(source) = self.config.text_fallbacks.get(field) else {
                continue;
            };
            let Ok(text) = df.column(source) else {
                continue;
            };
            let text = text.as_materialized_series().cast(&DataType::String)?;
            let text = text.str()?;

            let current: Vec<Option<f64>> = match df.column(field) {
                Ok(column) => column
                    .as_materialized_series()
                    .cast(&DataType::Float64)?
                    .f64()?
                    .into_iter()
                    .collect(),
                Err(_) => vec![None; df.height()],
            };

            let mut filled = 0usize;
            let values: Float64Chunked = current
                .into_iter()
                .zip(text.into_iter())
                .map(|(value, text)| match value {
                    Some(v) if !v.is_nan() => Some(v),
                    _ => {
                        let parsed = text.and_then(extract_leading_number);
                        if parsed.is_some() {
                            filled += 1;
                        }
                        parsed
                    }
                })
                .collect();

            if filled > 0 {
                debug!(field = %field, source = %source, filled, "Filled values from text");
            }
            result.with_column(values.with_name(field.as_str().into()).into_series())?;
        }

        Ok(result)
    }
}

/// First decimal number in a free-text field: "1.5 baths" -> 1.5,
/// "Half-bath" -> None.
pub fn extract_leading_number(text: &str) -> Option<f64> {
    thread_local! {
        static NUMBER: Option<Regex> = Regex::new(r"\d+(?:\.\d+)?").ok();
    }
    NUMBER.with(|re| {
        re.as_ref()
            .and_then(|re| re.find(text))
            .and_then(|m| m.as_str().parse::<f64>().ok())
    })
}

fn cast_numeric(df: &DataFrame, schema: &NegotiatedSchema) -> Result<DataFrame> {
    let mut result = df.clone();
    for name in schema.numeric.iter().chain(std::iter::once(&schema.target)) {
        let cast = df.column(name)?.as_materialized_series().cast(&DataType::Float64)?;
        result.with_column(cast)?;
    }
    Ok(result)
}

/// Keep rows where every schema column is present (and finite, for numbers).
fn drop_incomplete(df: &DataFrame, schema: &NegotiatedSchema) -> Result<DataFrame> {
    let mut keep = vec![true; df.height()];

    for name in schema.numeric.iter().chain(std::iter::once(&schema.target)) {
        let series = df.column(name)?.as_materialized_series().clone();
        for (flag, value) in keep.iter_mut().zip(series.f64()?.into_iter()) {
            *flag &= value.is_some_and(f64::is_finite);
        }
    }
    for name in &schema.categorical {
        let nulls = df.column(name)?.as_materialized_series().is_null();
        for (flag, is_null) in keep.iter_mut().zip(&nulls) {
            *flag &= !is_null.unwrap_or(true);
        }
    }

    Ok(df.filter(&BooleanChunked::from_slice("keep".into(), &keep))?)
}
