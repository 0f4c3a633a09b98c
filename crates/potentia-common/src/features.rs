//! Ordered feature vector handed from the descriptor pipeline to the model.

use serde::{Deserialize, Serialize};

use crate::error::{PotencyError, Result};

/// A fixed-order sequence of named numeric columns.
///
/// Column order is load-bearing: the predictor was trained on one exact
/// ordering, and a silent mismatch would yield a meaningless prediction.
/// Both the assembler and the model validate against the names carried
/// here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(names: Vec<String>, values: Vec<f64>) -> Result<Self> {
        if names.len() != values.len() {
            return Err(PotencyError::InvalidFeatureVector(format!(
                "{} names but {} values",
                names.len(),
                values.len()
            )));
        }
        Ok(Self { names, values })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_lengths() {
        let err = FeatureVector::new(vec!["a".into(), "b".into()], vec![1.0]);
        assert!(matches!(err, Err(PotencyError::InvalidFeatureVector(_))));
    }

    #[test]
    fn keeps_declared_order() {
        let fv = FeatureVector::new(
            vec!["x".into(), "y".into()],
            vec![0.0, 1.0],
        )
        .unwrap();
        assert_eq!(fv.names(), &["x".to_string(), "y".to_string()]);
        assert_eq!(fv.values(), &[0.0, 1.0]);
    }
}
