//! Model comparison engine
//!
//! Tunes each model family with a randomized, cross-validated search, refits
//! the winning configuration on the full training split and scores it on the
//! held-out split.

use super::cross_validation::{CVResults, CVSplit, CrossValidator};
use super::gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
use super::models::{r2_score, ModelFamily, RegressionMetrics, TrainedModel};
use super::random_forest::RandomForest;
use crate::error::{InsightsError, Result};
use crate::optimizer::{
    format_params, Parameter, ParameterValue, RandomizedSearch, SearchConfig, SearchSpace, Study, TrialParams,
};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Evaluation of one model family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub family: ModelFamily,
    /// R² on the held-out split
    pub r2: f64,
    /// RMSE on the held-out split
    pub rmse: f64,
    /// MAE on the held-out split
    pub mae: f64,
    /// Mean cross-validated R² of the chosen configuration
    pub cv_score: f64,
    pub best_params: TrialParams,
    pub training_time_secs: f64,
}

/// Outcome of comparing every family
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    /// One record per family, in evaluation order
    pub records: Vec<PerformanceRecord>,
    pub best_family: ModelFamily,
    /// The winning model, fitted on the full training split
    pub best_model: TrainedModel,
}

impl ComparisonResult {
    pub fn best_record(&self) -> Option<&PerformanceRecord> {
        self.records.iter().find(|r| r.family == self.best_family)
    }
}

/// Tunes and compares the candidate model families
#[derive(Debug, Clone, Default)]
pub struct ModelComparator {
    config: SearchConfig,
}

impl ModelComparator {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Hyperparameter grid searched for a family
    pub fn search_space(family: ModelFamily) -> SearchSpace {
        match family {
            ModelFamily::RandomForest => SearchSpace::new()
                .ints("n_estimators", &[50, 100, 200])
                .add(Parameter::new(
                    "max_depth",
                    vec![
                        ParameterValue::Unbounded,
                        ParameterValue::Int(10),
                        ParameterValue::Int(20),
                        ParameterValue::Int(30),
                    ],
                ))
                .ints("min_samples_split", &[2, 5, 10])
                .ints("min_samples_leaf", &[1, 2, 4]),
            ModelFamily::GradientBoosting => SearchSpace::new()
                .ints("n_estimators", &[50, 100, 200])
                .floats("learning_rate", &[0.01, 0.05, 0.1, 0.2])
                .ints("max_depth", &[3, 5, 7])
                .floats("subsample", &[0.7, 0.8, 1.0])
                .floats("colsample_bytree", &[0.7, 0.8, 1.0]),
        }
    }

    /// Instantiate an unfitted model from a sampled configuration
    pub fn build_model(family: ModelFamily, params: &TrialParams, seed: u64) -> Result<TrainedModel> {
        match family {
            ModelFamily::RandomForest => {
                let max_depth = match lookup(params, "max_depth")? {
                    ParameterValue::Unbounded => None,
                    other => Some(as_count(other, "max_depth")?),
                };
                let forest = RandomForest::new_regressor(count(params, "n_estimators")?)
                    .with_max_depth(max_depth)
                    .with_min_samples_split(count(params, "min_samples_split")?)
                    .with_min_samples_leaf(count(params, "min_samples_leaf")?)
                    .with_random_state(seed);
                Ok(TrainedModel::RandomForest(forest))
            }
            ModelFamily::GradientBoosting => {
                let config = GradientBoostingConfig {
                    n_estimators: count(params, "n_estimators")?,
                    learning_rate: ratio(params, "learning_rate")?,
                    max_depth: count(params, "max_depth")?,
                    subsample: ratio(params, "subsample")?,
                    colsample_bytree: ratio(params, "colsample_bytree")?,
                    random_state: Some(seed),
                    ..Default::default()
                };
                Ok(TrainedModel::GradientBoosting(GradientBoostingRegressor::new(config)))
            }
        }
    }

    /// Mean R² of one configuration across the given folds
    pub fn cross_val_score(
        &self,
        family: ModelFamily,
        params: &TrialParams,
        x: &Array2<f64>,
        y: &Array1<f64>,
        splits: &[CVSplit],
    ) -> Result<CVResults> {
        let mut scores = Vec::with_capacity(splits.len());
        for split in splits {
            let x_train = x.select(Axis(0), &split.train_indices);
            let y_train = y.select(Axis(0), &split.train_indices);
            let x_val = x.select(Axis(0), &split.test_indices);
            let y_val = y.select(Axis(0), &split.test_indices);

            let mut model = Self::build_model(family, params, self.config.random_state)?;
            model.fit(&x_train, &y_train)?;
            let preds = model.predict(&x_val)?;
            scores.push(r2_score(&y_val, &preds));
        }
        Ok(CVResults::from_scores(scores))
    }

    /// Run the randomized search for one family on the training split
    pub fn tune(&self, family: ModelFamily, x: &Array2<f64>, y: &Array1<f64>) -> Result<Study> {
        let n_samples = x.nrows();
        let folds = self.config.cv_folds.min(n_samples);
        if folds < 2 {
            return Err(InsightsError::TrainingError(format!(
                "Need at least 2 training rows for cross-validation, got {}",
                n_samples
            )));
        }
        if folds < self.config.cv_folds {
            warn!(
                requested = self.config.cv_folds,
                used = folds,
                "Fewer training rows than folds, reducing fold count"
            );
        }

        let splits = CrossValidator::k_fold(folds)
            .with_random_state(self.config.random_state)
            .split(n_samples)?;

        let search = RandomizedSearch::new(self.config.clone(), Self::search_space(family));
        search.run(|params| {
            self.cross_val_score(family, params, x, y, &splits)
                .map(|cv| cv.mean_score)
        })
    }

    /// Tune every family, refit on the training split and score on the test split.
    ///
    /// The best family has strictly the highest test R²; on a tie the family
    /// evaluated first is kept.
    pub fn compare(
        &self,
        x_train: &Array2<f64>,
        y_train: &Array1<f64>,
        x_test: &Array2<f64>,
        y_test: &Array1<f64>,
    ) -> Result<ComparisonResult> {
        self.config.validate()?;

        let mut records = Vec::with_capacity(ModelFamily::ALL.len());
        let mut best: Option<(f64, TrainedModel)> = None;

        for family in ModelFamily::ALL {
            let start = Instant::now();
            info!(model = %family, n_iter = self.config.n_iter, "Tuning hyperparameters");

            let study = self.tune(family, x_train, y_train)?;
            let best_trial = study.best_trial().ok_or_else(|| {
                InsightsError::OptimizationError(format!("No usable configuration for {}", family))
            })?;
            debug!(model = %family, params = %format_params(&best_trial.params), "Best configuration");

            let mut model = Self::build_model(family, &best_trial.params, self.config.random_state)?;
            model.fit(x_train, y_train)?;
            let preds = model.predict(x_test)?;
            let metrics = RegressionMetrics::compute(y_test, &preds);

            info!(
                model = %family,
                r2 = metrics.r2,
                rmse = metrics.rmse,
                cv_r2 = best_trial.value,
                "Model evaluated"
            );

            records.push(PerformanceRecord {
                family,
                r2: metrics.r2,
                rmse: metrics.rmse,
                mae: metrics.mae,
                cv_score: best_trial.value,
                best_params: best_trial.params.clone(),
                training_time_secs: start.elapsed().as_secs_f64(),
            });

            let takes_over = match &best {
                None => true,
                Some((best_r2, _)) => metrics.r2 > *best_r2,
            };
            if takes_over {
                best = Some((metrics.r2, model));
            }
        }

        let (_, best_model) = best.ok_or_else(|| {
            InsightsError::TrainingError("No model family was evaluated".to_string())
        })?;
        let best_family = best_model.family();
        info!(model = %best_family, "Selected best model");

        Ok(ComparisonResult {
            records,
            best_family,
            best_model,
        })
    }
}

fn lookup<'a>(params: &'a TrialParams, name: &str) -> Result<&'a ParameterValue> {
    params
        .get(name)
        .ok_or_else(|| InsightsError::OptimizationError(format!("Missing parameter '{}'", name)))
}

fn as_count(value: &ParameterValue, name: &str) -> Result<usize> {
    value.as_usize().ok_or_else(|| {
        InsightsError::OptimizationError(format!("Parameter '{}' must be a count, got {}", name, value))
    })
}

fn count(params: &TrialParams, name: &str) -> Result<usize> {
    as_count(lookup(params, name)?, name)
}

fn ratio(params: &TrialParams, name: &str) -> Result<f64> {
    let value = lookup(params, name)?;
    value.as_float().ok_or_else(|| {
        InsightsError::OptimizationError(format!("Parameter '{}' must be numeric, got {}", name, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::s;

    fn linear_data(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((n, 3), |(i, j)| ((i * (j + 3) + j * 7) % 17) as f64);
        let y: Array1<f64> = x
            .rows()
            .into_iter()
            .map(|r| 3.0 * r[0] + 0.5 * r[1] + 10.0)
            .collect();
        (x, y)
    }

    fn small_config() -> SearchConfig {
        SearchConfig::new().with_n_iter(2).with_cv_folds(3)
    }

    #[test]
    fn test_grid_sizes() {
        assert_eq!(ModelComparator::search_space(ModelFamily::RandomForest).grid_size(), 108);
        assert_eq!(ModelComparator::search_space(ModelFamily::GradientBoosting).grid_size(), 324);
    }

    #[test]
    fn test_build_model_from_grid_point() {
        let space = ModelComparator::search_space(ModelFamily::RandomForest);
        let params = space.grid_point(0).unwrap();
        match ModelComparator::build_model(ModelFamily::RandomForest, &params, 42).unwrap() {
            TrainedModel::RandomForest(rf) => {
                assert_eq!(rf.n_estimators, 50);
                assert_eq!(rf.max_depth, None);
                assert_eq!(rf.random_state, Some(42));
            }
            other => panic!("unexpected model {:?}", other.family()),
        }
    }

    #[test]
    fn test_build_model_missing_parameter() {
        let params = TrialParams::new();
        assert!(ModelComparator::build_model(ModelFamily::GradientBoosting, &params, 1).is_err());
    }

    #[test]
    fn test_compare_records_both_families() {
        let (x, y) = linear_data(60);
        let x_train = x.slice(s![..48, ..]).to_owned();
        let x_test = x.slice(s![48.., ..]).to_owned();
        let y_train = y.slice(s![..48]).to_owned();
        let y_test = y.slice(s![48..]).to_owned();

        let result = ModelComparator::new(small_config())
            .compare(&x_train, &y_train, &x_test, &y_test)
            .unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].family, ModelFamily::RandomForest);
        assert_eq!(result.records[1].family, ModelFamily::GradientBoosting);

        let best = result.best_record().unwrap();
        for record in &result.records {
            assert!(record.rmse >= 0.0);
            assert!(best.r2 >= record.r2);
        }
        assert_eq!(result.best_model.family(), result.best_family);
    }

    #[test]
    fn test_equal_scores_keep_random_forest() {
        let (x, _) = linear_data(30);
        let y = Array1::from_elem(30, 150.0);
        let x_train = x.slice(s![..24, ..]).to_owned();
        let x_test = x.slice(s![24.., ..]).to_owned();
        let y_train = y.slice(s![..24]).to_owned();
        let y_test = y.slice(s![24..]).to_owned();

        let result = ModelComparator::new(small_config())
            .compare(&x_train, &y_train, &x_test, &y_test)
            .unwrap();

        // a constant target is fit exactly by both families
        assert_eq!(result.records[0].r2, 1.0);
        assert_eq!(result.records[1].r2, 1.0);
        assert_eq!(result.best_family, ModelFamily::RandomForest);
        assert_eq!(result.best_model.family(), ModelFamily::RandomForest);
    }

    #[test]
    fn test_compare_is_deterministic() {
        let (x, y) = linear_data(40);
        let comparator = ModelComparator::new(small_config());
        let a = comparator.compare(&x, &y, &x, &y).unwrap();
        let b = comparator.compare(&x, &y, &x, &y).unwrap();

        for (ra, rb) in a.records.iter().zip(b.records.iter()) {
            assert_eq!(ra.r2, rb.r2);
            assert_eq!(ra.best_params, rb.best_params);
        }
        assert_eq!(a.best_family, b.best_family);
    }

    #[test]
    fn test_tune_needs_two_rows() {
        let x = Array2::zeros((1, 2));
        let y = Array1::zeros(1);
        assert!(ModelComparator::default().tune(ModelFamily::RandomForest, &x, &y).is_err());
    }
}
