//! Pipeline configuration

use crate::error::{InsightsError, Result};
use crate::optimizer::SearchConfig;
use crate::preprocessing::{PreparerConfig, SelectorConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// End-to-end training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub preparer: PreparerConfig,
    pub selector: SelectorConfig,
    pub search: SearchConfig,

    /// Share of prepared rows held out for evaluation
    pub test_size: f64,

    /// Seed for the train/test split
    pub random_state: u64,

    /// Fewer prepared rows than this and no model is trained
    pub min_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            preparer: PreparerConfig::default(),
            selector: SelectorConfig::default(),
            search: SearchConfig::default(),
            test_size: 0.2,
            random_state: 42,
            min_rows: 10,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from a JSON file; omitted fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| InsightsError::ConfigError(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| InsightsError::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_preparer(mut self, preparer: PreparerConfig) -> Self {
        self.preparer = preparer;
        self
    }

    pub fn with_selector(mut self, selector: SelectorConfig) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(InsightsError::ConfigError(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.selector.top_n == 0 {
            return Err(InsightsError::ConfigError("selector.top_n must be at least 1".to_string()));
        }
        self.preparer.validate()?;
        self.search.validate()
    }
}
