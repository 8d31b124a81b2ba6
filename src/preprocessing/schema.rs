//! Schema negotiation
//!
//! Intersects the configured candidate features with the columns a listings
//! table actually has, so exports that lack optional fields still train.

use super::config::PreparerConfig;
use crate::error::{InsightsError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Columns the preparer will work with for a given table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiatedSchema {
    /// Numeric features present, or derivable from a text fallback
    pub numeric: Vec<String>,
    /// Categorical features present
    pub categorical: Vec<String>,
    pub target: String,
}

impl NegotiatedSchema {
    /// Every column a complete row must have
    pub fn required_columns(&self) -> Vec<&str> {
        self.numeric
            .iter()
            .chain(self.categorical.iter())
            .map(String::as_str)
            .chain(std::iter::once(self.target.as_str()))
            .collect()
    }
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

/// Negotiate the schema for `df`. Only a missing target is an error.
pub fn negotiate(df: &DataFrame, config: &PreparerConfig) -> Result<NegotiatedSchema> {
    if !has_column(df, &config.target) {
        return Err(InsightsError::missing_column("listings", &config.target));
    }

    let numeric: Vec<String> = config
        .numeric_features
        .iter()
        .filter(|name| {
            let present = has_column(df, name)
                || config
                    .text_fallbacks
                    .get(name.as_str())
                    .is_some_and(|source| has_column(df, source));
            if !present {
                debug!(feature = %name, "Numeric feature not in table, skipping");
            }
            present
        })
        .cloned()
        .collect();

    let categorical: Vec<String> = config
        .categorical_features
        .iter()
        .filter(|name| {
            let present = has_column(df, name);
            if !present {
                debug!(feature = %name, "Categorical feature not in table, skipping");
            }
            present
        })
        .cloned()
        .collect();

    Ok(NegotiatedSchema {
        numeric,
        categorical,
        target: config.target.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_candidates_dropped() {
        let df = df! {
            "price" => [100.0, 120.0],
            "accommodates" => [2i64, 4],
            "room_type" => ["Private room", "Entire home/apt"],
        }
        .unwrap();

        let schema = negotiate(&df, &PreparerConfig::default()).unwrap();
        assert_eq!(schema.numeric, vec!["accommodates"]);
        assert_eq!(schema.categorical, vec!["room_type"]);
        assert_eq!(schema.required_columns(), vec!["accommodates", "room_type", "price"]);
    }

    #[test]
    fn test_text_fallback_counts_as_present() {
        let df = df! {
            "price" => [100.0],
            "bathrooms_text" => ["1 bath"],
        }
        .unwrap();

        let schema = negotiate(&df, &PreparerConfig::default()).unwrap();
        assert_eq!(schema.numeric, vec!["bathrooms"]);
    }

    #[test]
    fn test_missing_target_is_error() {
        let df = df! { "accommodates" => [2i64] }.unwrap();
        let err = negotiate(&df, &PreparerConfig::default()).unwrap_err();
        assert!(matches!(err, InsightsError::MissingColumn { .. }));
    }
}
