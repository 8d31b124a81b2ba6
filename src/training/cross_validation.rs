//! Cross-validation and hold-out splitting

use crate::error::{InsightsError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// A single train/test split
#[derive(Debug, Clone, PartialEq)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
    pub fold_idx: usize,
}

/// K-fold splitter
#[derive(Debug, Clone)]
pub struct CrossValidator {
    n_splits: usize,
    shuffle: bool,
    random_state: Option<u64>,
}

impl CrossValidator {
    /// Shuffled k-fold, the strategy used by the hyperparameter search
    pub fn k_fold(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: true,
            random_state: None,
        }
    }

    /// Keep rows in order instead of shuffling before folding
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Set random state for reproducibility
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Generate train/test splits
    pub fn split(&self, n_samples: usize) -> Result<Vec<CVSplit>> {
        Self::k_fold_split(n_samples, self.n_splits, self.shuffle, self.random_state)
    }

    fn k_fold_split(
        n_samples: usize,
        n_splits: usize,
        shuffle: bool,
        random_state: Option<u64>,
    ) -> Result<Vec<CVSplit>> {
        if n_splits < 2 {
            return Err(InsightsError::ValidationError(
                "n_splits must be at least 2".to_string(),
            ));
        }
        if n_samples < n_splits {
            return Err(InsightsError::ValidationError(format!(
                "n_samples ({}) must be >= n_splits ({})",
                n_samples, n_splits
            )));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        if shuffle {
            let mut rng = seeded_rng(random_state);
            indices.shuffle(&mut rng);
        }

        let base = n_samples / n_splits;
        let remainder = n_samples % n_splits;

        let mut splits = Vec::with_capacity(n_splits);
        let mut current = 0;

        for fold_idx in 0..n_splits {
            let fold_size = if fold_idx < remainder { base + 1 } else { base };
            let test_indices = indices[current..current + fold_size].to_vec();
            let train_indices: Vec<usize> = indices[..current]
                .iter()
                .chain(indices[current + fold_size..].iter())
                .copied()
                .collect();

            splits.push(CVSplit {
                train_indices,
                test_indices,
                fold_idx,
            });

            current += fold_size;
        }

        Ok(splits)
    }
}

/// Shuffle row indices with a seed and cut off `test_size` of them for hold-out.
///
/// The test share is rounded up, so any dataset with at least two rows keeps
/// one row on each side.
pub fn train_test_split(
    n_samples: usize,
    test_size: f64,
    random_state: Option<u64>,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if !(0.0..1.0).contains(&test_size) || test_size == 0.0 {
        return Err(InsightsError::ValidationError(format!(
            "test_size must be in (0, 1), got {}",
            test_size
        )));
    }
    if n_samples < 2 {
        return Err(InsightsError::ValidationError(format!(
            "Need at least 2 samples to split, got {}",
            n_samples
        )));
    }

    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = seeded_rng(random_state);
    indices.shuffle(&mut rng);

    let (_, n_test) = holdout_sizes(n_samples, test_size);
    let train = indices.split_off(n_test);

    Ok((train, indices))
}

/// `(train, test)` row counts `train_test_split` produces for `n_samples >= 2`
pub fn holdout_sizes(n_samples: usize, test_size: f64) -> (usize, usize) {
    let n_test = ((n_samples as f64) * test_size).ceil() as usize;
    let n_test = n_test.clamp(1, n_samples.saturating_sub(1).max(1));
    (n_samples.saturating_sub(n_test), n_test)
}

fn seeded_rng(random_state: Option<u64>) -> ChaCha8Rng {
    match random_state {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Cross-validation results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CVResults {
    /// Scores for each fold
    pub scores: Vec<f64>,
    /// Mean score across folds
    pub mean_score: f64,
    /// Standard deviation of scores
    pub std_score: f64,
    /// Number of folds
    pub n_folds: usize,
}

impl CVResults {
    /// Create CV results from fold scores
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n_folds = scores.len();
        if n_folds == 0 {
            return Self { scores, mean_score: f64::NEG_INFINITY, std_score: 0.0, n_folds };
        }
        let mean_score = scores.iter().sum::<f64>() / n_folds as f64;
        let variance = scores.iter().map(|s| (s - mean_score).powi(2)).sum::<f64>() / n_folds as f64;

        Self {
            scores,
            mean_score,
            std_score: variance.sqrt(),
            n_folds,
        }
    }
}
