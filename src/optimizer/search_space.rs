//! Discrete hyperparameter grids

use crate::error::{InsightsError, Result};
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single grid value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterValue {
    Float(f64),
    Int(i64),
    /// No limit, e.g. an unbounded tree depth
    Unbounded,
}

impl ParameterValue {
    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParameterValue::Float(v) => Some(*v),
            ParameterValue::Int(v) => Some(*v as f64),
            ParameterValue::Unbounded => None,
        }
    }

    /// Get as a non-negative count
    pub fn as_usize(&self) -> Option<usize> {
        match self {
            ParameterValue::Int(v) if *v >= 0 => Some(*v as usize),
            _ => None,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Float(v) => write!(f, "{}", v),
            ParameterValue::Int(v) => write!(f, "{}", v),
            ParameterValue::Unbounded => f.write_str("None"),
        }
    }
}

/// A named parameter with its admissible values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub choices: Vec<ParameterValue>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, choices: Vec<ParameterValue>) -> Self {
        Self {
            name: name.into(),
            choices,
        }
    }

    /// Integer choices
    pub fn ints(name: impl Into<String>, values: &[i64]) -> Self {
        Self::new(name, values.iter().map(|&v| ParameterValue::Int(v)).collect())
    }

    /// Float choices
    pub fn floats(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(name, values.iter().map(|&v| ParameterValue::Float(v)).collect())
    }
}

/// One configuration drawn from the grid
pub type TrialParams = BTreeMap<String, ParameterValue>;

/// Render a configuration as `name=value` pairs
pub fn format_params(params: &TrialParams) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Cartesian grid of discrete parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchSpace {
    parameters: Vec<Parameter>,
}

impl SearchSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter to the search space
    pub fn add(mut self, param: Parameter) -> Self {
        self.parameters.push(param);
        self
    }

    /// Add an integer parameter
    pub fn ints(self, name: impl Into<String>, values: &[i64]) -> Self {
        self.add(Parameter::ints(name, values))
    }

    /// Add a float parameter
    pub fn floats(self, name: impl Into<String>, values: &[f64]) -> Self {
        self.add(Parameter::floats(name, values))
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Number of distinct configurations in the grid
    pub fn grid_size(&self) -> usize {
        if self.parameters.is_empty() {
            return 0;
        }
        self.parameters.iter().map(|p| p.choices.len()).product()
    }

    /// Decode a flat grid index; the last parameter varies fastest.
    pub fn grid_point(&self, mut idx: usize) -> Result<TrialParams> {
        let size = self.grid_size();
        if idx >= size {
            return Err(InsightsError::OptimizationError(format!(
                "Grid index {} out of range for grid of size {}",
                idx, size
            )));
        }

        let mut params = TrialParams::new();
        for param in self.parameters.iter().rev() {
            let n = param.choices.len();
            params.insert(param.name.clone(), param.choices[idx % n].clone());
            idx /= n;
        }
        Ok(params)
    }

    /// Every configuration in grid order
    pub fn grid(&self) -> Result<Vec<TrialParams>> {
        (0..self.grid_size()).map(|i| self.grid_point(i)).collect()
    }

    /// Draw `n` distinct configurations. Asking for the whole grid or more
    /// returns the full grid in grid order.
    pub fn sample_without_replacement(&self, n: usize, rng: &mut impl Rng) -> Result<Vec<TrialParams>> {
        let size = self.grid_size();
        if size == 0 {
            return Err(InsightsError::OptimizationError(
                "Search space has no configurations".to_string(),
            ));
        }
        if n >= size {
            return self.grid();
        }

        index::sample(rng, size, n)
            .into_iter()
            .map(|i| self.grid_point(i))
            .collect()
    }
}
