//! Single-listing price prediction

use super::bundle::ModelBundle;
use crate::error::{InsightsError, Result};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Holds the current bundle read-only and answers price queries
#[derive(Debug, Clone, Default)]
pub struct PricePredictor {
    bundle: Option<Arc<ModelBundle>>,
}

impl PricePredictor {
    /// A predictor with no model; every query fails with `ModelNotFitted`
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundle(bundle: ModelBundle) -> Self {
        Self {
            bundle: Some(Arc::new(bundle)),
        }
    }

    /// Load a bundle saved by the training pipeline
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_bundle(ModelBundle::load(path)?))
    }

    /// Supersede the held bundle, e.g. after a new pipeline run
    pub fn replace_bundle(&mut self, bundle: ModelBundle) {
        self.bundle = Some(Arc::new(bundle));
    }

    pub fn bundle(&self) -> Option<&Arc<ModelBundle>> {
        self.bundle.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.bundle.is_some()
    }

    /// Predict a nightly price. Names the model does not know are ignored;
    /// model features missing from `features` count as 0.
    pub fn predict(&self, features: &HashMap<String, f64>) -> Result<f64> {
        let bundle = self.bundle.as_ref().ok_or(InsightsError::ModelNotFitted)?;

        if let Some((name, value)) = features.iter().find(|(_, v)| !v.is_finite()) {
            return Err(InsightsError::InvalidInput(format!(
                "Feature '{}' must be a finite number, got {}",
                name, value
            )));
        }

        let columns: Vec<Column> = bundle
            .feature_names()
            .iter()
            .filter_map(|name| {
                features
                    .get(name)
                    .map(|&v| Series::new(name.as_str().into(), [v]).into())
            })
            .collect();
        let ignored = features.len() - columns.len();
        if ignored > 0 {
            debug!(ignored, "Ignoring features the model was not trained on");
        }

        let row = if columns.is_empty() {
            DataFrame::new(vec![Series::new("__row".into(), [0.0f64]).into()])?
        } else {
            DataFrame::new(columns)?
        };

        let prediction = bundle.predict_frame(&row)?;
        prediction
            .first()
            .copied()
            .ok_or_else(|| InsightsError::InferenceError("Model returned no prediction".to_string()))
    }

    /// Predict from `name=value` pairs
    pub fn predict_text<S: AsRef<str>>(&self, pairs: &[S]) -> Result<f64> {
        let features = parse_feature_pairs(pairs)?;
        self.predict(&features)
    }
}

/// Parse `name=value` pairs into a feature map. Later duplicates win.
pub fn parse_feature_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<HashMap<String, f64>> {
    pairs
        .iter()
        .map(|pair| {
            let pair = pair.as_ref();
            let (name, value) = pair.split_once('=').ok_or_else(|| {
                InsightsError::InvalidInput(format!("Expected name=value, got '{}'", pair))
            })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(InsightsError::InvalidInput(format!("Missing feature name in '{}'", pair)));
            }
            let value: f64 = value.trim().parse().map_err(|_| {
                InsightsError::InvalidInput(format!("Feature '{}' is not numeric: '{}'", name, value.trim()))
            })?;
            Ok((name.to_string(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::{frame_to_array, StandardScaler};
    use crate::training::{RandomForest, TrainedModel};
    use ndarray::array;

    fn predictor() -> PricePredictor {
        let train = df! {
            "accommodates" => [1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            "room_type_Private room" => [1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
        }
        .unwrap();
        let features = vec!["accommodates".to_string(), "room_type_Private room".to_string()];

        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&train, &features[..1]).unwrap();
        let x = frame_to_array(&scaled, &features).unwrap();
        let y = array![40.0, 60.0, 90.0, 110.0, 100.0, 150.0];

        let mut model = TrainedModel::RandomForest(RandomForest::new_regressor(8).with_random_state(3));
        model.fit(&x, &y).unwrap();

        let bundle = ModelBundle::new(model, scaler, features, vec!["accommodates".to_string()]).unwrap();
        PricePredictor::with_bundle(bundle)
    }

    #[test]
    fn test_not_fitted() {
        let result = PricePredictor::new().predict(&HashMap::new());
        assert!(matches!(result, Err(InsightsError::ModelNotFitted)));
    }

    #[test]
    fn test_prediction_is_finite() {
        let mut features = HashMap::new();
        features.insert("accommodates".to_string(), 3.0);
        let price = predictor().predict(&features).unwrap();
        assert!(price.is_finite());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let p = predictor();
        let mut base = HashMap::new();
        base.insert("accommodates".to_string(), 4.0);
        base.insert("room_type_Private room".to_string(), 1.0);

        let mut extra = base.clone();
        extra.insert("square_feet".to_string(), 900.0);

        assert_eq!(p.predict(&base).unwrap(), p.predict(&extra).unwrap());
    }

    #[test]
    fn test_empty_input_uses_zeros() {
        let p = predictor();
        let mut zeros = HashMap::new();
        zeros.insert("accommodates".to_string(), 0.0);
        zeros.insert("room_type_Private room".to_string(), 0.0);
        assert_eq!(p.predict(&HashMap::new()).unwrap(), p.predict(&zeros).unwrap());
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut features = HashMap::new();
        features.insert("accommodates".to_string(), f64::NAN);
        assert!(matches!(predictor().predict(&features), Err(InsightsError::InvalidInput(_))));
    }

    #[test]
    fn test_predict_text() {
        let p = predictor();
        let from_text = p.predict_text(&["accommodates=2", " room_type_Private room = 1 "]).unwrap();

        let mut features = HashMap::new();
        features.insert("accommodates".to_string(), 2.0);
        features.insert("room_type_Private room".to_string(), 1.0);
        assert_eq!(from_text, p.predict(&features).unwrap());

        assert!(matches!(p.predict_text(&["accommodates"]), Err(InsightsError::InvalidInput(_))));
        assert!(matches!(p.predict_text(&["accommodates=two"]), Err(InsightsError::InvalidInput(_))));
    }

    #[test]
    fn test_replace_bundle() {
        let source = predictor();
        let mut p = PricePredictor::new();
        assert!(!p.is_loaded());
        p.replace_bundle(source.bundle().unwrap().as_ref().clone());
        assert!(p.is_loaded());
    }
}
