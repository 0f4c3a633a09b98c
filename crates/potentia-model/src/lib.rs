//! potentia-model — Pretrained gradient-boosting regression for pIC50.
//!
//! The artifact is a JSON export of the trained ensemble: the feature
//! schema, a base prediction, a learning rate, and array-encoded
//! regression trees. It is loaded once at startup and read-only
//! afterwards, safe to share across request handlers.

pub mod potency;

use std::path::Path;

use potentia_common::error::{PotencyError, Result};
use potentia_common::features::FeatureVector;
use serde::Deserialize;
use tracing::info;

pub use potency::PotencyEstimate;

/// One node of an array-encoded regression tree. Internal nodes carry a
/// feature index and threshold; leaves carry `feature = -1` and a value.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeNode {
    pub feature: i32,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub left: usize,
    #[serde(default)]
    pub right: usize,
    #[serde(default)]
    pub value: f64,
}

impl TreeNode {
    fn is_leaf(&self) -> bool {
        self.feature < 0
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Walk from the root; `x` is indexed by the model's feature order.
    fn predict(&self, x: &[f64]) -> f64 {
        let mut node = &self.nodes[0];
        while !node.is_leaf() {
            let value = x[node.feature as usize];
            node = if value <= node.threshold {
                &self.nodes[node.left]
            } else {
                &self.nodes[node.right]
            };
        }
        node.value
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GradientBoostingModel {
    feature_names: Vec<String>,
    init: f64,
    learning_rate: f64,
    trees: Vec<DecisionTree>,
}

impl GradientBoostingModel {
    /// Load and validate the artifact. Any failure here is
    /// `ModelUnavailable`: the server must refuse to start without a
    /// usable model.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PotencyError::ModelUnavailable(format!("cannot read {}: {e}", path.display()))
        })?;
        let model: GradientBoostingModel = serde_json::from_str(&raw).map_err(|e| {
            PotencyError::ModelUnavailable(format!("cannot parse {}: {e}", path.display()))
        })?;
        model.validate()?;
        info!(
            path = %path.display(),
            features = model.feature_names.len(),
            trees = model.trees.len(),
            "loaded potency model"
        );
        Ok(model)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let model: GradientBoostingModel = serde_json::from_str(raw)
            .map_err(|e| PotencyError::ModelUnavailable(format!("cannot parse artifact: {e}")))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.feature_names.is_empty() {
            return Err(PotencyError::ModelUnavailable(
                "artifact declares no features".to_string(),
            ));
        }
        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(PotencyError::ModelUnavailable(format!(
                    "tree {t} has no nodes"
                )));
            }
            for (n, node) in tree.nodes.iter().enumerate() {
                if node.is_leaf() {
                    continue;
                }
                if node.feature as usize >= self.feature_names.len() {
                    return Err(PotencyError::ModelUnavailable(format!(
                        "tree {t} node {n} splits on unknown feature {}",
                        node.feature
                    )));
                }
                if node.left >= tree.nodes.len() || node.right >= tree.nodes.len() {
                    return Err(PotencyError::ModelUnavailable(format!(
                        "tree {t} node {n} has out-of-range children"
                    )));
                }
                // Array-encoded trees point strictly forward; a backward
                // edge would loop forever at prediction time.
                if node.left <= n || node.right <= n {
                    return Err(PotencyError::ModelUnavailable(format!(
                        "tree {t} node {n} has non-forward children"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Predict pIC50 for one feature vector.
    ///
    /// The vector's column names must match the training schema exactly,
    /// in order; anything else is an internal consistency bug surfaced
    /// as `InvalidFeatureVector` rather than a silently wrong number.
    pub fn predict(&self, features: &FeatureVector) -> Result<f64> {
        if features.len() != self.feature_names.len() {
            return Err(PotencyError::InvalidFeatureVector(format!(
                "expected {} columns, got {}",
                self.feature_names.len(),
                features.len()
            )));
        }
        if let Some((position, (got, want))) = features
            .names()
            .iter()
            .zip(self.feature_names.iter())
            .enumerate()
            .find(|(_, (a, b))| a != b)
        {
            return Err(PotencyError::InvalidFeatureVector(format!(
                "column {position} is '{got}', model expects '{want}'"
            )));
        }

        let boost: f64 = self
            .trees
            .iter()
            .map(|tree| tree.predict(features.values()))
            .sum();
        Ok(self.init + self.learning_rate * boost)
    }
}
