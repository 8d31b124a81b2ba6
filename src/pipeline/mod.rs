//! Price model pipeline
//!
//! Prepare → hold-out split → feature selection → scaling → tuning and
//! comparison → bundle. Everything is recomputed on each run; only the
//! resulting [`ModelBundle`] is meant to outlive it.

mod config;

pub use config::PipelineConfig;

use crate::error::{InsightsError, Result};
use crate::inference::ModelBundle;
use crate::preprocessing::{
    column_to_array, frame_to_array, FeatureImportance, FeaturePreparer, FeatureSelector, StandardScaler,
};
use crate::training::{holdout_sizes, r2_score, train_test_split, ModelComparator, ModelFamily, PerformanceRecord};
use polars::prelude::*;
use std::time::Instant;
use tracing::{info, warn};

/// Everything a successful run produces
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub bundle: ModelBundle,
    /// One record per model family, in evaluation order
    pub performance: Vec<PerformanceRecord>,
    pub best_family: ModelFamily,
    /// Importance of every prepared feature, descending
    pub importance: Vec<FeatureImportance>,
    /// Rows left after preparation
    pub prepared_rows: usize,
    pub train_rows: usize,
    /// Held-out rows: raw selected features plus the target
    pub holdout: DataFrame,
    pub target: String,
    pub elapsed_secs: f64,
}

impl PipelineReport {
    pub fn best_record(&self) -> Option<&PerformanceRecord> {
        self.performance.iter().find(|r| r.family == self.best_family)
    }

    /// R² of `bundle` on the held-out rows
    pub fn holdout_r2(&self, bundle: &ModelBundle) -> Result<f64> {
        let y = column_to_array(&self.holdout, &self.target)?;
        let preds = bundle.predict_frame(&self.holdout)?;
        Ok(r2_score(&y, &preds))
    }
}

/// Result of a pipeline run
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Trained(Box<PipelineReport>),
    /// Too few usable rows after preparation; not an error
    InsufficientData { rows: usize, required: usize },
}

impl PipelineOutcome {
    pub fn report(&self) -> Option<&PipelineReport> {
        match self {
            PipelineOutcome::Trained(report) => Some(report.as_ref()),
            PipelineOutcome::InsufficientData { .. } => None,
        }
    }

    pub fn into_report(self) -> Option<PipelineReport> {
        match self {
            PipelineOutcome::Trained(report) => Some(*report),
            PipelineOutcome::InsufficientData { .. } => None,
        }
    }
}

/// Runs the full training pipeline on a listings table
#[derive(Debug, Clone, Default)]
pub struct PricePipeline {
    config: PipelineConfig,
}

impl PricePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self, listings: &DataFrame) -> Result<PipelineOutcome> {
        let start = Instant::now();
        self.config.validate()?;

        let prepared = FeaturePreparer::new(self.config.preparer.clone()).prepare(listings)?;
        let rows = prepared.n_rows();
        let required = self.config.min_rows.max(min_trainable_rows(self.config.test_size));
        if rows < required {
            warn!(rows, required, "Not enough usable listings to train");
            return Ok(PipelineOutcome::InsufficientData { rows, required });
        }

        let candidates = prepared.feature_names();
        if candidates.is_empty() {
            return Err(InsightsError::PreprocessingError(
                "No candidate features present in the listings".to_string(),
            ));
        }

        let (train_idx, test_idx) =
            train_test_split(rows, self.config.test_size, Some(self.config.random_state))?;
        info!(train = train_idx.len(), test = test_idx.len(), "Split prepared listings");

        let selector = FeatureSelector::new(self.config.selector.clone());
        let selection = selector.select(
            &prepared.features(&candidates, Some(&train_idx))?,
            &prepared.target_values(Some(&train_idx))?,
            &candidates,
            &prepared.groups,
        )?;
        let selected = selection.selected;
        let numeric: Vec<String> = selected
            .iter()
            .filter(|name| prepared.numeric_features.contains(name))
            .cloned()
            .collect();

        let train_df = prepared.rows(&train_idx)?;
        let test_df = prepared.rows(&test_idx)?;

        let mut scaler = StandardScaler::new();
        scaler.fit(&train_df, &numeric)?;
        let x_train = frame_to_array(&scaler.transform(&train_df)?, &selected)?;
        let x_test = frame_to_array(&scaler.transform(&test_df)?, &selected)?;
        let y_train = column_to_array(&train_df, &prepared.target)?;
        let y_test = column_to_array(&test_df, &prepared.target)?;

        let comparison = ModelComparator::new(self.config.search.clone())
            .compare(&x_train, &y_train, &x_test, &y_test)?;

        let mut holdout_columns = selected.clone();
        holdout_columns.push(prepared.target.clone());
        let holdout = test_df.select(holdout_columns)?;

        let bundle = ModelBundle::new(comparison.best_model, scaler, selected, numeric)?;
        let elapsed_secs = start.elapsed().as_secs_f64();
        info!(
            model = %comparison.best_family,
            features = bundle.feature_names().len(),
            elapsed_secs,
            "Pipeline finished"
        );

        Ok(PipelineOutcome::Trained(Box::new(PipelineReport {
            bundle,
            performance: comparison.records,
            best_family: comparison.best_family,
            importance: selection.ranking,
            prepared_rows: rows,
            train_rows: train_idx.len(),
            holdout,
            target: prepared.target,
            elapsed_secs,
        })))
    }
}

/// Fewest rows whose hold-out split leaves two training rows for k-fold search
fn min_trainable_rows(test_size: f64) -> usize {
    (3..)
        .find(|&n| holdout_sizes(n, test_size).0 >= 2)
        .unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::SearchConfig;

    fn tiny_listings(n: usize) -> DataFrame {
        let accommodates: Vec<f64> = (0..n).map(|i| (i % 6 + 1) as f64).collect();
        let price: Vec<f64> = accommodates.iter().map(|a| 40.0 + 25.0 * a).collect();
        df! {
            "accommodates" => accommodates,
            "price" => price,
        }
        .unwrap()
    }

    fn fast_config() -> PipelineConfig {
        PipelineConfig::default().with_search(SearchConfig::new().with_n_iter(1).with_cv_folds(2))
    }

    #[test]
    fn test_insufficient_data() {
        let outcome = PricePipeline::new(fast_config()).run(&tiny_listings(5)).unwrap();
        assert!(matches!(
            outcome,
            PipelineOutcome::InsufficientData { rows: 5, required: 10 }
        ));
        assert!(outcome.report().is_none());
    }

    #[test]
    fn test_trains_on_single_feature() {
        let outcome = PricePipeline::new(fast_config()).run(&tiny_listings(30)).unwrap();
        let report = outcome.into_report().unwrap();

        assert_eq!(report.prepared_rows, 30);
        assert_eq!(report.train_rows, 24);
        assert_eq!(report.holdout.height(), 6);
        assert_eq!(report.bundle.feature_names(), ["accommodates".to_string()]);
        assert_eq!(report.performance.len(), 2);
    }

    #[test]
    fn test_min_rows_floor_leaves_two_training_rows() {
        assert_eq!(min_trainable_rows(0.2), 3);
        assert_eq!(min_trainable_rows(0.5), 4);

        let config = fast_config().with_min_rows(2);
        let outcome = PricePipeline::new(config).run(&tiny_listings(2)).unwrap();
        assert!(matches!(
            outcome,
            PipelineOutcome::InsufficientData { rows: 2, required: 3 }
        ));

        let config = fast_config().with_min_rows(2);
        assert!(PricePipeline::new(config).run(&tiny_listings(3)).unwrap().report().is_some());
    }

    #[test]
    fn test_no_features_is_error() {
        let df = df! { "price" => (0..20).map(|i| 50.0 + i as f64).collect::<Vec<_>>() }.unwrap();
        assert!(PricePipeline::new(fast_config()).run(&df).is_err());
    }
}
