//! LightGBM adapter: Implementation of `Regressor` over a LightGBM model dump.
//!
//! Reads the JSON emitted by `Booster.dump_model()` in the Python package and
//! evaluates the tree ensemble natively.
//!
//! # Decision rules
//!
//! Splits are evaluated exactly like LightGBM's `Tree::Decision`:
//!
//! - Numerical (`<=`): NaN is treated as 0 unless `missing_type` is `NaN`.
//!   Missing values (`NaN` for `missing_type=NaN`, |x| <= 1e-35 for
//!   `missing_type=Zero`) follow `default_left`; otherwise `x <= threshold`
//!   goes left.
//! - Categorical (`==`): NaN and negative values go right; otherwise the value
//!   is truncated to an integer and goes left if listed in the threshold set
//!   (`"1||4||7"`).
//!
//! The raw score is the sum of reached leaves (averaged for random-forest
//! dumps), mapped through the objective's inverse link.

use serde::{Deserialize, Serialize};

use crate::ports::{ModelError, Regressor};

/// LightGBM's `kZeroThreshold`.
const ZERO_THRESHOLD: f64 = 1e-35;

/// Top-level structure of `Booster.dump_model()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightGbmDump {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default = "one")]
    pub num_class: usize,
    #[serde(default = "one")]
    pub num_tree_per_iteration: usize,
    pub max_feature_idx: usize,
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub average_output: bool,
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub tree_info: Vec<DumpTree>,
}

fn one() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpTree {
    #[serde(default)]
    pub tree_index: usize,
    pub tree_structure: DumpNode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DumpNode {
    Split(DumpSplit),
    Leaf(DumpLeaf),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpSplit {
    pub split_feature: usize,
    pub threshold: DumpThreshold,
    pub decision_type: DecisionType,
    #[serde(default)]
    pub default_left: bool,
    #[serde(default)]
    pub missing_type: MissingType,
    pub left_child: Box<DumpNode>,
    pub right_child: Box<DumpNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DumpLeaf {
    pub leaf_value: f64,
}

/// Numerical thresholds are numbers, categorical ones are `||`-joined strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DumpThreshold {
    Numeric(f64),
    Categories(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionType {
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "==")]
    Equal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingType {
    #[default]
    None,
    Zero,
    NaN,
}

/// Inverse link applied to the raw ensemble score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputTransform {
    Identity,
    Exp,
}

impl OutputTransform {
    fn from_objective(objective: Option<&str>) -> Result<Self, String> {
        // e.g. "tweedie tweedie_variance_power:1.5"
        let name = objective
            .and_then(|o| o.split_whitespace().next())
            .unwrap_or("regression");
        match name {
            "regression" | "regression_l2" | "l2" | "mean_squared_error" | "mse"
            | "regression_l1" | "l1" | "mean_absolute_error" | "mae" | "huber" | "fair"
            | "quantile" | "mape" | "custom" | "none" => Ok(Self::Identity),
            "poisson" | "gamma" | "tweedie" => Ok(Self::Exp),
            other => Err(format!("objective {other:?} is not a regression objective")),
        }
    }

    fn apply(self, raw: f64) -> f64 {
        match self {
            Self::Identity => raw,
            Self::Exp => raw.exp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Decision {
    Threshold(f64),
    Categories(Vec<i64>),
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        feature: usize,
        decision: Decision,
        default_left: bool,
        missing: MissingType,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

/// A tree flattened into an arena; node 0 is the root.
#[derive(Debug, Clone, PartialEq)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn compile(root: &DumpNode, num_features: usize) -> Result<Self, String> {
        let mut nodes = Vec::new();
        Self::push_node(root, num_features, &mut nodes)?;
        Ok(Self { nodes })
    }

    fn push_node(node: &DumpNode, num_features: usize, nodes: &mut Vec<Node>) -> Result<usize, String> {
        let idx = nodes.len();
        match node {
            DumpNode::Leaf(leaf) => {
                nodes.push(Node::Leaf(leaf.leaf_value));
            }
            DumpNode::Split(split) => {
                if split.split_feature >= num_features {
                    return Err(format!(
                        "split on feature {} but model has {} features",
                        split.split_feature, num_features
                    ));
                }
                let decision = match (split.decision_type, &split.threshold) {
                    (DecisionType::LessOrEqual, DumpThreshold::Numeric(t)) => Decision::Threshold(*t),
                    (DecisionType::Equal, DumpThreshold::Categories(s)) => {
                        Decision::Categories(parse_categories(s)?)
                    }
                    (DecisionType::Equal, DumpThreshold::Numeric(t)) if t.fract() == 0.0 => {
                        Decision::Categories(vec![*t as i64])
                    }
                    (decision, threshold) => {
                        return Err(format!(
                            "decision {decision:?} cannot use threshold {threshold:?}"
                        ))
                    }
                };
                // Reserve the slot, children are appended after it.
                nodes.push(Node::Leaf(0.0));
                let left = Self::push_node(&split.left_child, num_features, nodes)?;
                let right = Self::push_node(&split.right_child, num_features, nodes)?;
                nodes[idx] = Node::Split {
                    feature: split.split_feature,
                    decision,
                    default_left: split.default_left,
                    missing: split.missing_type,
                    left,
                    right,
                };
            }
        }
        Ok(idx)
    }

    fn leaf_value(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(v) => return *v,
                Node::Split {
                    feature,
                    decision,
                    default_left,
                    missing,
                    left,
                    right,
                } => {
                    let go_left = match decision {
                        Decision::Threshold(t) => {
                            numerical_goes_left(row[*feature], *t, *missing, *default_left)
                        }
                        Decision::Categories(cats) => categorical_goes_left(row[*feature], cats),
                    };
                    idx = if go_left { *left } else { *right };
                }
            }
        }
    }
}

fn parse_categories(s: &str) -> Result<Vec<i64>, String> {
    s.split("||")
        .map(|c| {
            c.trim()
                .parse::<i64>()
                .map_err(|_| format!("invalid categorical threshold {s:?}"))
        })
        .collect()
}

fn numerical_goes_left(value: f64, threshold: f64, missing: MissingType, default_left: bool) -> bool {
    let value = if value.is_nan() && missing != MissingType::NaN {
        0.0
    } else {
        value
    };
    let is_missing = match missing {
        MissingType::Zero => (-ZERO_THRESHOLD..=ZERO_THRESHOLD).contains(&value),
        MissingType::NaN => value.is_nan(),
        MissingType::None => false,
    };
    if is_missing {
        return default_left;
    }
    value <= threshold
}

fn categorical_goes_left(value: f64, categories: &[i64]) -> bool {
    if value.is_nan() || value < 0.0 {
        return false;
    }
    categories.contains(&(value as i64))
}

/// A loaded LightGBM regression ensemble.
#[derive(Debug, Clone)]
pub struct LightGbmModel {
    trees: Vec<Tree>,
    num_features: usize,
    feature_names: Vec<String>,
    average_output: bool,
    transform: OutputTransform,
}

impl LightGbmModel {
    /// Parse a `dump_model()` JSON document.
    ///
    /// # Errors
    /// Returns a message if the JSON does not deserialize or describes a model
    /// this adapter cannot evaluate (multi-output, non-regression objective,
    /// out-of-range split features).
    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let dump: LightGbmDump = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Self::from_dump(&dump)
    }

    /// Compile a deserialized dump.
    ///
    /// # Errors
    /// See [`LightGbmModel::from_json_str`].
    pub fn from_dump(dump: &LightGbmDump) -> Result<Self, String> {
        if dump.num_class != 1 || dump.num_tree_per_iteration != 1 {
            return Err(format!(
                "expected a single-output model, got num_class={} num_tree_per_iteration={}",
                dump.num_class, dump.num_tree_per_iteration
            ));
        }
        if dump.tree_info.is_empty() {
            return Err("model contains no trees".to_string());
        }

        let transform = OutputTransform::from_objective(dump.objective.as_deref())?;
        let num_features = dump.max_feature_idx + 1;
        if !dump.feature_names.is_empty() && dump.feature_names.len() != num_features {
            return Err(format!(
                "feature_names has {} entries but max_feature_idx implies {}",
                dump.feature_names.len(),
                num_features
            ));
        }

        let trees = dump
            .tree_info
            .iter()
            .map(|t| {
                Tree::compile(&t.tree_structure, num_features)
                    .map_err(|e| format!("tree {}: {e}", t.tree_index))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trees,
            num_features,
            feature_names: dump.feature_names.clone(),
            average_output: dump.average_output,
            transform,
        })
    }

    /// Feature names recorded in the dump (may be empty).
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    #[must_use]
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Sum of leaf outputs before the objective's inverse link.
    fn raw_score(&self, row: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.leaf_value(row)).sum();
        if self.average_output {
            sum / self.trees.len() as f64
        } else {
            sum
        }
    }
}

impl Regressor for LightGbmModel {
    fn num_features(&self) -> usize {
        self.num_features
    }

    fn predict(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.num_features {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.num_features,
                got: row.len(),
            });
        }
        let prediction = self.transform.apply(self.raw_score(row));
        if !prediction.is_finite() {
            return Err(ModelError::NonFiniteOutput(prediction));
        }
        Ok(prediction)
    }

    fn describe(&self) -> String {
        format!(
            "LightGBM ({} trees, {} features)",
            self.trees.len(),
            self.num_features
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> serde_json::Value {
        serde_json::json!({
            "tree_index": 0,
            "num_leaves": 2,
            "shrinkage": 1,
            "tree_structure": {
                "split_index": 0,
                "split_feature": feature,
                "split_gain": 10.0,
                "threshold": threshold,
                "decision_type": "<=",
                "default_left": true,
                "missing_type": "None",
                "internal_value": 0,
                "left_child": {"leaf_index": 0, "leaf_value": left, "leaf_count": 10},
                "right_child": {"leaf_index": 1, "leaf_value": right, "leaf_count": 10}
            }
        })
    }

    fn dump(trees: Vec<serde_json::Value>, objective: &str) -> String {
        serde_json::json!({
            "name": "tree",
            "version": "v4",
            "num_class": 1,
            "num_tree_per_iteration": 1,
            "label_index": 0,
            "max_feature_idx": 1,
            "objective": objective,
            "average_output": false,
            "feature_names": ["a", "b"],
            "tree_info": trees
        })
        .to_string()
    }

    #[test]
    fn test_sums_leaves_across_trees() {
        let json = dump(
            vec![stump(0, 1.5, 100.0, 200.0), stump(1, 0.5, -1.0, 1.0)],
            "regression",
        );
        let model = LightGbmModel::from_json_str(&json).expect("model should parse");
        assert_eq!(model.num_trees(), 2);
        assert_eq!(model.num_features(), 2);
        assert_eq!(model.predict(&[1.0, 0.0]).unwrap(), 99.0);
        assert_eq!(model.predict(&[1.5, 1.0]).unwrap(), 101.0);
        assert_eq!(model.predict(&[2.0, 1.0]).unwrap(), 201.0);
    }

    #[test]
    fn test_poisson_objective_applies_exp() {
        let json = dump(vec![stump(0, 0.5, 0.0, 1.0)], "poisson");
        let model = LightGbmModel::from_json_str(&json).unwrap();
        assert!((model.predict(&[1.0, 0.0]).unwrap() - std::f64::consts::E).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_classification_objective() {
        let json = dump(vec![stump(0, 0.5, 0.0, 1.0)], "binary sigmoid:1");
        assert!(LightGbmModel::from_json_str(&json).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_split_feature() {
        let json = dump(vec![stump(5, 0.5, 0.0, 1.0)], "regression");
        let err = LightGbmModel::from_json_str(&json).unwrap_err();
        assert!(err.contains("feature 5"));
    }

    #[test]
    fn test_wrong_row_width_is_an_error() {
        let json = dump(vec![stump(0, 0.5, 0.0, 1.0)], "regression");
        let model = LightGbmModel::from_json_str(&json).unwrap();
        assert_eq!(
            model.predict(&[1.0]),
            Err(ModelError::FeatureCountMismatch {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_single_leaf_tree() {
        let json = serde_json::json!({
            "max_feature_idx": 0,
            "objective": "regression",
            "tree_info": [{"tree_index": 0, "tree_structure": {"leaf_value": 42.5}}]
        })
        .to_string();
        let model = LightGbmModel::from_json_str(&json).unwrap();
        assert_eq!(model.predict(&[0.0]).unwrap(), 42.5);
    }

    #[test]
    fn test_average_output() {
        let json = serde_json::json!({
            "max_feature_idx": 1,
            "objective": "regression",
            "average_output": true,
            "tree_info": [stump(0, 0.5, 10.0, 20.0), stump(0, 0.5, 30.0, 40.0)]
        })
        .to_string();
        let model = LightGbmModel::from_json_str(&json).unwrap();
        assert_eq!(model.predict(&[0.0, 0.0]).unwrap(), 20.0);
    }

    #[test]
    fn test_missing_value_rules() {
        // NaN without NaN missing type is treated as zero.
        assert!(numerical_goes_left(f64::NAN, 0.5, MissingType::None, false));
        assert!(!numerical_goes_left(f64::NAN, -0.5, MissingType::None, true));
        // NaN missing type follows the default branch.
        assert!(numerical_goes_left(f64::NAN, -10.0, MissingType::NaN, true));
        assert!(!numerical_goes_left(f64::NAN, 10.0, MissingType::NaN, false));
        // Zero missing type routes exact zeros by default_left.
        assert!(!numerical_goes_left(0.0, 1.0, MissingType::Zero, false));
        assert!(numerical_goes_left(0.5, 1.0, MissingType::Zero, false));
    }

    #[test]
    fn test_categorical_split() {
        let json = serde_json::json!({
            "max_feature_idx": 0,
            "objective": "regression",
            "tree_info": [{
                "tree_index": 0,
                "tree_structure": {
                    "split_feature": 0,
                    "threshold": "1||3",
                    "decision_type": "==",
                    "default_left": false,
                    "missing_type": "NaN",
                    "left_child": {"leaf_value": 1.0},
                    "right_child": {"leaf_value": 2.0}
                }
            }]
        })
        .to_string();
        let model = LightGbmModel::from_json_str(&json).unwrap();
        assert_eq!(model.predict(&[1.0]).unwrap(), 1.0);
        assert_eq!(model.predict(&[3.0]).unwrap(), 1.0);
        assert_eq!(model.predict(&[2.0]).unwrap(), 2.0);
        assert_eq!(model.predict(&[-1.0]).unwrap(), 2.0);
        assert_eq!(model.predict(&[f64::NAN]).unwrap(), 2.0);
    }

    #[test]
    fn test_non_finite_output_is_an_error() {
        let json = dump(vec![stump(0, 0.5, 1000.0, 1000.0)], "gamma");
        let model = LightGbmModel::from_json_str(&json).unwrap();
        assert!(matches!(
            model.predict(&[0.0, 0.0]),
            Err(ModelError::NonFiniteOutput(_))
        ));
    }
}
