//! Randomized search over a discrete grid

use super::config::SearchConfig;
use super::search_space::{format_params, SearchSpace, TrialParams};
use crate::error::{InsightsError, Result};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Result of a single trial
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialResult {
    /// Trial number, in draw order
    pub trial_id: usize,
    /// Parameters used
    pub params: TrialParams,
    /// Objective value (higher is better)
    pub value: f64,
    /// Trial duration in seconds
    pub duration_secs: f64,
}

/// All trials of one search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Study {
    pub trials: Vec<TrialResult>,
    pub best_trial_idx: Option<usize>,
    pub total_duration_secs: f64,
}

impl Study {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn best_trial(&self) -> Option<&TrialResult> {
        self.best_trial_idx.map(|idx| &self.trials[idx])
    }

    pub fn best_value(&self) -> Option<f64> {
        self.best_trial().map(|t| t.value)
    }

    pub fn best_params(&self) -> Option<&TrialParams> {
        self.best_trial().map(|t| &t.params)
    }

    /// Add a trial result. A later trial only takes over with a strictly
    /// higher value; NaN scores never win.
    pub fn add_trial(&mut self, result: TrialResult) {
        let idx = self.trials.len();

        let is_better = match self.best_trial_idx {
            None => !result.value.is_nan(),
            Some(best_idx) => result.value > self.trials[best_idx].value,
        };

        if is_better {
            self.best_trial_idx = Some(idx);
        }

        self.trials.push(result);
    }
}

/// Samples configurations from a grid and scores each with an objective
pub struct RandomizedSearch {
    config: SearchConfig,
    search_space: SearchSpace,
}

impl RandomizedSearch {
    pub fn new(config: SearchConfig, search_space: SearchSpace) -> Self {
        Self { config, search_space }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The configurations this search will evaluate, in trial order
    pub fn candidates(&self) -> Result<Vec<TrialParams>> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.config.random_state);
        self.search_space
            .sample_without_replacement(self.config.n_iter, &mut rng)
    }

    /// Evaluate every candidate and collect them into a study.
    ///
    /// Trials may run concurrently, but they are recorded in draw order, so
    /// the chosen best is independent of scheduling.
    pub fn run<F>(&self, objective: F) -> Result<Study>
    where
        F: Fn(&TrialParams) -> Result<f64> + Sync,
    {
        self.config.validate()?;
        let start = Instant::now();
        let candidates = self.candidates()?;

        let evaluate = |(trial_id, params): (usize, &TrialParams)| -> Result<TrialResult> {
            let trial_start = Instant::now();
            let value = objective(params)?;
            debug!(trial_id, score = value, params = %format_params(params), "Trial finished");
            Ok(TrialResult {
                trial_id,
                params: params.clone(),
                value,
                duration_secs: trial_start.elapsed().as_secs_f64(),
            })
        };

        let results: Vec<TrialResult> = if self.config.parallel {
            candidates
                .par_iter()
                .enumerate()
                .map(evaluate)
                .collect::<Result<Vec<_>>>()?
        } else {
            candidates
                .iter()
                .enumerate()
                .map(evaluate)
                .collect::<Result<Vec<_>>>()?
        };

        let mut study = Study::new();
        for result in results {
            study.add_trial(result);
        }
        study.total_duration_secs = start.elapsed().as_secs_f64();

        if study.best_trial_idx.is_none() {
            return Err(InsightsError::OptimizationError(
                "No trial produced a usable score".to_string(),
            ));
        }

        Ok(study)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::search_space::ParameterValue;

    fn space() -> SearchSpace {
        SearchSpace::new()
            .ints("a", &[1, 2, 3, 4])
            .ints("b", &[10, 20, 30])
    }

    fn objective(params: &TrialParams) -> Result<f64> {
        let a = params["a"].as_float().unwrap_or(0.0);
        let b = params["b"].as_float().unwrap_or(0.0);
        Ok(-(a - 3.0).powi(2) - (b - 20.0).powi(2))
    }

    #[test]
    fn test_full_grid_finds_optimum() {
        let config = SearchConfig::new().with_n_iter(100);
        let study = RandomizedSearch::new(config, space()).run(objective).unwrap();

        assert_eq!(study.trials.len(), 12);
        let best = study.best_params().unwrap();
        assert_eq!(best["a"], ParameterValue::Int(3));
        assert_eq!(best["b"], ParameterValue::Int(20));
        assert_eq!(study.best_value(), Some(0.0));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let par = RandomizedSearch::new(SearchConfig::new().with_n_iter(5), space())
            .run(objective)
            .unwrap();
        let seq = RandomizedSearch::new(SearchConfig::new().with_n_iter(5).with_parallel(false), space())
            .run(objective)
            .unwrap();

        let par_params: Vec<_> = par.trials.iter().map(|t| t.params.clone()).collect();
        let seq_params: Vec<_> = seq.trials.iter().map(|t| t.params.clone()).collect();
        assert_eq!(par_params, seq_params);
        assert_eq!(par.best_trial_idx, seq.best_trial_idx);
    }

    #[test]
    fn test_ties_keep_first_trial() {
        let study = RandomizedSearch::new(SearchConfig::new().with_n_iter(12), space())
            .run(|_| Ok(1.0))
            .unwrap();
        assert_eq!(study.best_trial_idx, Some(0));
    }

    #[test]
    fn test_objective_error_propagates() {
        let result = RandomizedSearch::new(SearchConfig::new().with_n_iter(3), space())
            .run(|_| Err(InsightsError::TrainingError("boom".to_string())));
        assert!(result.is_err());
    }

    #[test]
    fn test_all_nan_is_error() {
        let result = RandomizedSearch::new(SearchConfig::new().with_n_iter(3), space())
            .run(|_| Ok(f64::NAN));
        assert!(result.is_err());
    }
}
