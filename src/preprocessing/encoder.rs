//! One-hot encoding of categorical listing fields

use crate::error::{InsightsError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The indicator columns produced from one categorical field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalGroup {
    /// Source field, e.g. `room_type`
    pub field: String,
    /// Encoded columns, e.g. `room_type_Private room`; the reference
    /// category has no column
    pub columns: Vec<String>,
    /// All categories seen during fit, sorted
    pub categories: Vec<String>,
}

impl CategoricalGroup {
    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// The category encoded as all zeros
    pub fn reference(&self) -> Option<&str> {
        self.categories.first().map(String::as_str)
    }
}

/// Name of the indicator column for a category
pub fn indicator_name(field: &str, category: &str) -> String {
    format!("{}_{}", field, category)
}

/// One-hot encoder with sorted categories and the first category dropped
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    groups: Vec<CategoricalGroup>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn string_values(df: &DataFrame, field: &str) -> Result<Series> {
        let series = df
            .column(field)
            .map_err(|_| InsightsError::FeatureNotFound(field.to_string()))?
            .as_materialized_series()
            .cast(&DataType::String)?;
        Ok(series)
    }

    /// Learn the categories of each field. Missing values are not a category.
    pub fn fit(&mut self, df: &DataFrame, fields: &[String]) -> Result<&mut Self> {
        let mut groups = Vec::with_capacity(fields.len());

        for field in fields {
            let values = Self::string_values(df, field)?;
            let categories: BTreeSet<String> = values
                .str()?
                .into_iter()
                .flatten()
                .map(str::to_string)
                .collect();
            let categories: Vec<String> = categories.into_iter().collect();
            let columns = categories
                .iter()
                .skip(1)
                .map(|c| indicator_name(field, c))
                .collect();

            groups.push(CategoricalGroup {
                field: field.clone(),
                columns,
                categories,
            });
        }

        self.groups = groups;
        self.is_fitted = true;
        Ok(self)
    }

    /// Replace each fitted field with its indicator columns (0.0 / 1.0).
    ///
    /// Indicator columns are appended in group order; unseen categories encode
    /// as all zeros.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(InsightsError::ModelNotFitted);
        }

        let mut result = df.clone();
        for group in &self.groups {
            let values = Self::string_values(df, &group.field)?;
            let values = values.str()?;

            for (column, category) in group.columns.iter().zip(group.categories.iter().skip(1)) {
                let indicator: Float64Chunked = values
                    .into_iter()
                    .map(|v| Some(if v == Some(category.as_str()) { 1.0 } else { 0.0 }))
                    .collect();
                result.with_column(indicator.with_name(column.as_str().into()).into_series())?;
            }
            result = result.drop(&group.field)?;
        }

        Ok(result)
    }

    pub fn fit_transform(&mut self, df: &DataFrame, fields: &[String]) -> Result<DataFrame> {
        self.fit(df, fields)?;
        self.transform(df)
    }

    pub fn groups(&self) -> &[CategoricalGroup] {
        &self.groups
    }

    /// All indicator column names, in output order
    pub fn encoded_columns(&self) -> Vec<String> {
        self.groups.iter().flat_map(|g| g.columns.iter().cloned()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listings() -> DataFrame {
        df! {
            "room_type" => ["Private room", "Entire home/apt", "Shared room", "Entire home/apt"],
            "accommodates" => [1.0, 4.0, 1.0, 3.0],
        }
        .unwrap()
    }

    #[test]
    fn test_sorted_categories_drop_first() {
        let mut encoder = OneHotEncoder::new();
        let out = encoder
            .fit_transform(&listings(), &["room_type".to_string()])
            .unwrap();

        let group = &encoder.groups()[0];
        assert_eq!(group.reference(), Some("Entire home/apt"));
        assert_eq!(group.columns, vec!["room_type_Private room", "room_type_Shared room"]);

        assert!(out.column("room_type").is_err());
        let private: Vec<f64> = out
            .column("room_type_Private room")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(private, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_boolean_flags() {
        let df = df! { "instant_bookable" => ["t", "f", "t"] }.unwrap();
        let mut encoder = OneHotEncoder::new();
        let out = encoder
            .fit_transform(&df, &["instant_bookable".to_string()])
            .unwrap();

        assert_eq!(encoder.encoded_columns(), vec!["instant_bookable_t"]);
        assert_eq!(out.width(), 1);
    }

    #[test]
    fn test_single_category_has_no_columns() {
        let df = df! { "room_type" => ["Private room", "Private room"] }.unwrap();
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&df, &["room_type".to_string()]).unwrap();
        assert!(encoder.groups()[0].columns.is_empty());
    }

    #[test]
    fn test_transform_before_fit() {
        assert!(OneHotEncoder::new().transform(&listings()).is_err());
    }
}
