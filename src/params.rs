//! Hyperparameter schema
//!
//! Grids are an explicit immutable schema: an ordered list of
//! (parameter name, finite value set). The cartesian product of a grid
//! defines the search space for one candidate; an empty grid yields exactly
//! one default (empty) combination.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single hyperparameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Str(_) => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match self {
            Self::Int(v) if *v >= 0 => Some(*v as usize),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Str(s) => write!(f, "{}", s),
        }
    }
}

/// One concrete hyperparameter assignment, ordered by parameter name
pub type ParamMap = BTreeMap<String, ParamValue>;

/// An ordered hyperparameter grid for one candidate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParamGrid {
    dims: Vec<(String, Vec<ParamValue>)>,
}

impl ParamGrid {
    /// Create an empty grid (one default combination)
    pub fn new() -> Self {
        Self { dims: Vec::new() }
    }

    /// Add a parameter dimension with its finite value set
    pub fn with_dim(mut self, name: impl Into<String>, values: Vec<ParamValue>) -> Self {
        self.dims.push((name.into(), values));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    /// Size of the search space (>= 1: the empty grid has one combination)
    pub fn n_combinations(&self) -> usize {
        self.dims.iter().map(|(_, v)| v.len()).product()
    }

    /// Enumerate the cartesian product in deterministic order.
    ///
    /// The first dimension varies slowest, so repeated runs visit identical
    /// combinations in identical order.
    pub fn combinations(&self) -> Vec<ParamMap> {
        let mut combos = vec![ParamMap::new()];
        for (name, values) in &self.dims {
            let mut next = Vec::with_capacity(combos.len() * values.len());
            for combo in &combos {
                for value in values {
                    let mut extended = combo.clone();
                    extended.insert(name.clone(), value.clone());
                    next.push(extended);
                }
            }
            combos = next;
        }
        combos
    }
}

/// Render a combination as stable "k=v" pairs for logging
pub fn format_params(params: &ParamMap) -> String {
    if params.is_empty() {
        return "defaults".to_string();
    }
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grid_single_combination() {
        let grid = ParamGrid::new();
        assert_eq!(grid.n_combinations(), 1);
        let combos = grid.combinations();
        assert_eq!(combos.len(), 1);
        assert!(combos[0].is_empty());
    }

    #[test]
    fn test_cartesian_product_size() {
        let grid = ParamGrid::new()
            .with_dim("a", vec![ParamValue::Int(1), ParamValue::Int(2)])
            .with_dim(
                "b",
                vec![
                    ParamValue::Float(0.1),
                    ParamValue::Float(0.2),
                    ParamValue::Float(0.3),
                ],
            );
        assert_eq!(grid.n_combinations(), 6);
        assert_eq!(grid.combinations().len(), 6);
    }

    #[test]
    fn test_deterministic_order() {
        let grid = ParamGrid::new()
            .with_dim("x", vec![ParamValue::Int(1), ParamValue::Int(2)])
            .with_dim("y", vec![ParamValue::Int(10), ParamValue::Int(20)]);
        let combos = grid.combinations();
        // First dimension varies slowest
        assert_eq!(combos[0]["x"], ParamValue::Int(1));
        assert_eq!(combos[0]["y"], ParamValue::Int(10));
        assert_eq!(combos[1]["x"], ParamValue::Int(1));
        assert_eq!(combos[1]["y"], ParamValue::Int(20));
        assert_eq!(combos[3]["x"], ParamValue::Int(2));
        assert_eq!(combos[3]["y"], ParamValue::Int(20));
    }

    #[test]
    fn test_value_coercions() {
        assert_eq!(ParamValue::Int(8).as_usize(), Some(8));
        assert_eq!(ParamValue::Int(-1).as_usize(), None);
        assert_eq!(ParamValue::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(ParamValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(ParamValue::Str("abc".into()).as_f64(), None);
    }

    #[test]
    fn test_format_params() {
        let mut params = ParamMap::new();
        assert_eq!(format_params(&params), "defaults");
        params.insert("n_estimators".into(), ParamValue::Int(64));
        params.insert("learning_rate".into(), ParamValue::Float(0.1));
        // BTreeMap ordering: alphabetical by key
        assert_eq!(format_params(&params), "learning_rate=0.1, n_estimators=64");
    }
}
