//! Search configuration

use crate::error::{InsightsError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the randomized hyperparameter search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of configurations drawn per model family
    pub n_iter: usize,

    /// Cross-validation folds for scoring each configuration
    pub cv_folds: usize,

    /// Seed for sampling, fold assignment and model randomness
    pub random_state: u64,

    /// Evaluate configurations on the rayon pool
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            n_iter: 10,
            cv_folds: 5,
            random_state: 42,
            parallel: true,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of sampled configurations
    pub fn with_n_iter(mut self, n: usize) -> Self {
        self.n_iter = n;
        self
    }

    /// Set number of CV folds
    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    /// Set random seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Toggle parallel evaluation
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_iter == 0 {
            return Err(InsightsError::ConfigError("n_iter must be at least 1".to_string()));
        }
        if self.cv_folds < 2 {
            return Err(InsightsError::ConfigError(format!(
                "cv_folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.n_iter, 10);
        assert_eq!(config.cv_folds, 5);
        assert_eq!(config.random_state, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_single_fold() {
        assert!(SearchConfig::new().with_cv_folds(1).validate().is_err());
        assert!(SearchConfig::new().with_n_iter(0).validate().is_err());
    }

    #[test]
    fn test_partial_json() {
        let config: SearchConfig = serde_json::from_str(r#"{"n_iter": 3}"#).unwrap();
        assert_eq!(config.n_iter, 3);
        assert_eq!(config.cv_folds, 5);
    }
}
