//! The trained artifact handed from the pipeline to the predictor

use crate::error::{InsightsError, Result};
use crate::preprocessing::{frame_to_array, StandardScaler};
use crate::training::{ModelFamily, TrainedModel};
use ndarray::Array1;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Best model, scaling parameters and the feature order it was trained on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    model: TrainedModel,
    scaler: StandardScaler,
    feature_names: Vec<String>,
    numeric_features: Vec<String>,
}

impl ModelBundle {
    /// Assemble a bundle. Every numeric feature must be a model feature and
    /// have scaling parameters.
    pub fn new(
        model: TrainedModel,
        scaler: StandardScaler,
        feature_names: Vec<String>,
        numeric_features: Vec<String>,
    ) -> Result<Self> {
        if feature_names.is_empty() {
            return Err(InsightsError::ValidationError(
                "A model bundle needs at least one feature".to_string(),
            ));
        }
        for name in &numeric_features {
            if !feature_names.contains(name) {
                return Err(InsightsError::ValidationError(format!(
                    "Numeric feature '{}' is not a model feature",
                    name
                )));
            }
            if scaler.get(name).is_none() {
                return Err(InsightsError::ValidationError(format!(
                    "No scaling parameters for '{}'",
                    name
                )));
            }
        }

        Ok(Self {
            model,
            scaler,
            feature_names,
            numeric_features,
        })
    }

    pub fn family(&self) -> ModelFamily {
        self.model.family()
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Model input columns, in training order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// The scaled subset of the features
    pub fn numeric_features(&self) -> &[String] {
        &self.numeric_features
    }

    /// Project `df` onto the model features; absent features become 0.0.
    pub fn reindex(&self, df: &DataFrame) -> Result<DataFrame> {
        let n_rows = df.height();
        let columns: Vec<Column> = self
            .feature_names
            .iter()
            .map(|name| -> Result<Column> {
                match df.column(name) {
                    Ok(column) => Ok(column.as_materialized_series().cast(&DataType::Float64)?.into()),
                    Err(_) => Ok(Series::new(name.as_str().into(), vec![0.0f64; n_rows]).into()),
                }
            })
            .collect::<Result<_>>()?;

        Ok(DataFrame::new(columns)?)
    }

    /// Predict prices for raw (unscaled) feature rows
    pub fn predict_frame(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let aligned = self.reindex(df)?;
        let scaled = self.scaler.transform(&aligned)?;
        let x = frame_to_array(&scaled, &self.feature_names)?;
        self.model.predict(&x)
    }

    /// Save the bundle as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a bundle from JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let bundle: Self = serde_json::from_str(&json)?;
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::RandomForest;
    use ndarray::{array, Array2};

    fn bundle() -> ModelBundle {
        let train = df! {
            "bedrooms" => [1.0, 2.0, 3.0, 4.0],
            "room_type_Private room" => [1.0, 0.0, 1.0, 0.0],
        }
        .unwrap();

        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&train, &["bedrooms".to_string()]).unwrap();
        let features = vec!["bedrooms".to_string(), "room_type_Private room".to_string()];
        let x: Array2<f64> = frame_to_array(&scaled, &features).unwrap();
        let y = array![50.0, 80.0, 110.0, 140.0];

        let mut model = TrainedModel::RandomForest(RandomForest::new_regressor(5).with_random_state(1));
        model.fit(&x, &y).unwrap();

        ModelBundle::new(model, scaler, features, vec!["bedrooms".to_string()]).unwrap()
    }

    #[test]
    fn test_reindex_fills_missing_with_zero() {
        let input = df! { "bedrooms" => [2.0], "unknown" => [9.0] }.unwrap();
        let aligned = bundle().reindex(&input).unwrap();

        let names: Vec<String> = aligned.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["bedrooms", "room_type_Private room"]);
        let filled = aligned
            .column("room_type_Private room")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .get(0);
        assert_eq!(filled, Some(0.0));
    }

    #[test]
    fn test_unknown_numeric_feature_rejected() {
        let b = bundle();
        let result = ModelBundle::new(
            b.model().clone(),
            b.scaler().clone(),
            b.feature_names().to_vec(),
            vec!["accommodates".to_string()],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let b = bundle();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");
        b.save(&path).unwrap();

        let loaded = ModelBundle::load(&path).unwrap();
        let input = df! { "bedrooms" => [1.0, 3.5], "room_type_Private room" => [1.0, 0.0] }.unwrap();
        assert_eq!(b.predict_frame(&input).unwrap(), loaded.predict_frame(&input).unwrap());
        assert_eq!(loaded.family(), ModelFamily::RandomForest);
    }
}
