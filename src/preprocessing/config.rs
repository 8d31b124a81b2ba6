//! Preparer configuration

use crate::error::{InsightsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for listing preparation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreparerConfig {
    /// Candidate numeric features; absent columns are skipped
    pub numeric_features: Vec<String>,

    /// Candidate categorical features; absent columns are skipped
    pub categorical_features: Vec<String>,

    /// Column holding the nightly price
    pub target: String,

    /// Numeric field -> free-text column its missing values are parsed from
    pub text_fallbacks: BTreeMap<String, String>,

    /// Multiplier on the interquartile range for price outlier bounds
    pub iqr_factor: f64,
}

impl Default for PreparerConfig {
    fn default() -> Self {
        let mut text_fallbacks = BTreeMap::new();
        text_fallbacks.insert("bathrooms".to_string(), "bathrooms_text".to_string());

        Self {
            numeric_features: [
                "accommodates",
                "bedrooms",
                "bathrooms",
                "number_of_reviews",
                "review_scores_rating",
                "review_scores_value",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            categorical_features: [
                "room_type",
                "neighbourhood_cleansed",
                "property_type",
                "instant_bookable",
                "host_is_superhost",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            target: "price".to_string(),
            text_fallbacks,
            iqr_factor: 1.5,
        }
    }
}

impl PreparerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the candidate numeric features
    pub fn with_numeric_features<S: Into<String>>(mut self, features: impl IntoIterator<Item = S>) -> Self {
        self.numeric_features = features.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the candidate categorical features
    pub fn with_categorical_features<S: Into<String>>(mut self, features: impl IntoIterator<Item = S>) -> Self {
        self.categorical_features = features.into_iter().map(Into::into).collect();
        self
    }

    /// Set the target column
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Set the IQR factor
    pub fn with_iqr_factor(mut self, factor: f64) -> Self {
        self.iqr_factor = factor;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.iqr_factor.is_finite() && self.iqr_factor >= 0.0) {
            return Err(InsightsError::ConfigError(format!(
                "iqr_factor must be a non-negative number, got {}",
                self.iqr_factor
            )));
        }
        if self.target.is_empty() {
            return Err(InsightsError::ConfigError("target column must be named".to_string()));
        }
        if self.numeric_features.contains(&self.target) || self.categorical_features.contains(&self.target) {
            return Err(InsightsError::ConfigError(format!(
                "target '{}' cannot also be a feature",
                self.target
            )));
        }
        Ok(())
    }
}
