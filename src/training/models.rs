//! Model families, the trained-model wrapper and regression metrics

use crate::error::Result;
use super::gradient_boosting::GradientBoostingRegressor;
use super::random_forest::RandomForest;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Candidate model families, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFamily {
    RandomForest,
    GradientBoosting,
}

impl ModelFamily {
    /// All families in the order the comparator evaluates them
    pub const ALL: [ModelFamily; 2] = [ModelFamily::RandomForest, ModelFamily::GradientBoosting];

    pub fn name(&self) -> &'static str {
        match self {
            ModelFamily::RandomForest => "Random Forest",
            ModelFamily::GradientBoosting => "Gradient Boosting",
        }
    }
}

impl fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for the regressors the tuner can search over
pub trait Model: Send + Sync {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Make predictions
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Get feature importances (if available)
    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }
}

impl Model for RandomForest {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        RandomForest::fit(self, x, y).map(|_| ())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        RandomForest::predict(self, x)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        RandomForest::feature_importances(self).cloned()
    }
}

impl Model for GradientBoostingRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        GradientBoostingRegressor::fit(self, x, y)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        GradientBoostingRegressor::predict(self, x)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        Some(Array1::from_vec(GradientBoostingRegressor::feature_importances(self).to_vec()))
    }
}

/// A model of either family, fitted once it leaves the comparator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    RandomForest(RandomForest),
    GradientBoosting(GradientBoostingRegressor),
}

impl TrainedModel {
    pub fn family(&self) -> ModelFamily {
        match self {
            TrainedModel::RandomForest(_) => ModelFamily::RandomForest,
            TrainedModel::GradientBoosting(_) => ModelFamily::GradientBoosting,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            TrainedModel::RandomForest(m) => Model::fit(m, x, y),
            TrainedModel::GradientBoosting(m) => Model::fit(m, x, y),
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            TrainedModel::RandomForest(m) => m.predict(x),
            TrainedModel::GradientBoosting(m) => m.predict(x),
        }
    }

    pub fn feature_importances(&self) -> Option<Array1<f64>> {
        match self {
            TrainedModel::RandomForest(m) => Model::feature_importances(m),
            TrainedModel::GradientBoosting(m) => Model::feature_importances(m),
        }
    }
}

/// Metrics for regression evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Number of evaluated samples
    pub n_samples: usize,
}

impl RegressionMetrics {
    /// Compute regression metrics
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let n = y_true.len();
        if n == 0 {
            return Self { mse: 0.0, rmse: 0.0, mae: 0.0, r2: 0.0, n_samples: 0 };
        }

        let errors: Vec<f64> = y_true.iter().zip(y_pred.iter()).map(|(t, p)| t - p).collect();
        let ss_res: f64 = errors.iter().map(|e| e * e).sum();
        let mse = ss_res / n as f64;
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n as f64;

        Self {
            mse,
            rmse: mse.sqrt(),
            mae,
            r2: r2_score(y_true, y_pred),
            n_samples: n,
        }
    }
}

/// Coefficient of determination.
///
/// A constant target gives 1.0 for a perfect fit and 0.0 otherwise.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len();
    if n == 0 {
        return 0.0;
    }
    let mean = y_true.sum() / n as f64;
    let ss_tot: f64 = y_true.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = y_true.iter().zip(y_pred.iter()).map(|(t, p)| (t - p).powi(2)).sum();

    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    }
}
