//! Model artifact schema and prediction runtime for agroyield.
//!
//! This crate provides the fundamental types for serving a pre-trained
//! production-regression model:
//!
//! - [`Pipeline`] — Validated model loaded from a JSON artifact
//! - [`Row`] and [`FeatureValue`] — A single tabular input record
//! - [`Encoder`] — Per-feature preprocessing (ordinal categories, numerics)
//! - [`Forest`] and [`Tree`] — Regression-forest evaluation
//! - [`ModelError`] — Error type for loading and prediction
//!
//! # Example
//!
//! ```rust,ignore
//! use agroyield_core::{FeatureValue, Pipeline, Row};
//!
//! let pipeline = Pipeline::from_file("model/crop_production.json")?;
//! let row = Row::new()
//!     .with("Crop", FeatureValue::text("Rice"))
//!     .with("State", FeatureValue::text("Odisha"))
//!     .with("Season", FeatureValue::text("Kharif"))
//!     .with("Area", FeatureValue::number(1200.0));
//! let tonnes = pipeline.predict(&row)?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The artifact schema version this runtime understands.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors that can occur while loading an artifact or running a prediction.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Failed to read the artifact file.
    #[error("Failed to read model artifact '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the artifact JSON.
    #[error("Failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    /// The artifact was written for a different schema version.
    #[error("Unsupported artifact schema version {0} (expected {SCHEMA_VERSION})")]
    UnsupportedSchema(u32),

    /// The artifact is structurally invalid.
    #[error("Invalid model artifact: {0}")]
    Invalid(String),

    /// A categorical feature received a value outside the trained categories.
    #[error("Unknown category '{value}' for feature '{feature}'")]
    UnknownCategory { feature: String, value: String },

    /// A required feature was absent and the encoder has no stand-in.
    #[error("Missing value for feature '{feature}'")]
    MissingValue { feature: String },

    /// A numeric feature received a non-numeric value.
    #[error("Feature '{feature}' expects a number, got '{value}'")]
    NotNumeric { feature: String, value: String },
}

impl ModelError {
    /// Creates an IO error with path context.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

// ============================================================================
// Input Rows
// ============================================================================

/// A single cell in a tabular input row.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FeatureValue {
    /// A categorical/text value.
    Text(String),
    /// A numeric value.
    Number(f64),
    /// No value supplied for this column.
    #[default]
    Missing,
}

impl FeatureValue {
    /// Creates a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Creates a numeric value.
    pub fn number(n: f64) -> Self {
        Self::Number(n)
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Missing => write!(f, "<missing>"),
        }
    }
}

/// A single tabular record keyed by column name.
///
/// Columns the model does not list are ignored at prediction time; listed
/// columns absent from the row encode as [`FeatureValue::Missing`].
#[derive(Debug, Clone, Default)]
pub struct Row {
    values: HashMap<String, FeatureValue>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a column value.
    pub fn set(&mut self, name: impl Into<String>, value: FeatureValue) {
        self.values.insert(name.into(), value);
    }

    /// Sets a column value, consuming and returning the row.
    pub fn with(mut self, name: impl Into<String>, value: FeatureValue) -> Self {
        self.set(name, value);
        self
    }

    /// Gets a column value, treating absent columns as missing.
    pub fn get(&self, name: &str) -> &FeatureValue {
        self.values.get(name).unwrap_or(&FeatureValue::Missing)
    }
}

// ============================================================================
// Preprocessing
// ============================================================================

/// Per-feature preprocessing applied before forest evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Encoder {
    /// Maps a category string to its index in the trained category list.
    ///
    /// A value outside the list is a prediction error, mirroring the
    /// training library's behavior on unseen categories. When `missing` is
    /// set, an absent value encodes to it; otherwise an absent value is a
    /// prediction error too.
    Ordinal {
        categories: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        missing: Option<f64>,
    },
    /// Passes a numeric value through unchanged.
    Numeric,
}

impl Encoder {
    /// Encodes one cell to a float, or explains why it cannot.
    fn encode(&self, feature: &str, value: &FeatureValue) -> Result<f64, ModelError> {
        match (self, value) {
            (Self::Ordinal { categories, .. }, FeatureValue::Text(s)) => categories
                .iter()
                .position(|c| c == s)
                .map(|i| i as f64)
                .ok_or_else(|| ModelError::UnknownCategory {
                    feature: feature.to_string(),
                    value: s.clone(),
                }),
            (Self::Ordinal { missing, .. }, FeatureValue::Missing) => {
                missing.ok_or_else(|| ModelError::MissingValue { feature: feature.to_string() })
            }
            (Self::Ordinal { .. }, FeatureValue::Number(n)) => Err(ModelError::UnknownCategory {
                feature: feature.to_string(),
                value: n.to_string(),
            }),
            (Self::Numeric, FeatureValue::Number(n)) => Ok(*n),
            (Self::Numeric, FeatureValue::Text(s)) => Err(ModelError::NotNumeric {
                feature: feature.to_string(),
                value: s.clone(),
            }),
            (Self::Numeric, FeatureValue::Missing) => {
                Err(ModelError::MissingValue { feature: feature.to_string() })
            }
        }
    }
}

/// One input column: its name and how to encode it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    pub encoder: Encoder,
}

// ============================================================================
// Regression Forest
// ============================================================================

/// A node in a flat-array decision tree.
///
/// Branches compare `x[feature] <= threshold` and descend `left` on true,
/// `right` on false. Child indices always point forward in the array, which
/// load-time validation enforces.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Branch {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A single regression tree, evaluated from node 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    /// Walks the tree for one encoded feature vector.
    ///
    /// Only called on validated trees, where every branch points forward and
    /// every path ends in a leaf.
    fn eval(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Branch { feature, threshold, left, right } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

/// An ensemble of regression trees; the prediction is the mean of the
/// per-tree outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forest {
    pub trees: Vec<Tree>,
}

impl Forest {
    fn predict(&self, x: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.eval(x)).sum();
        sum / self.trees.len() as f64
    }
}

// ============================================================================
// Artifact & Pipeline
// ============================================================================

/// The raw serialized form of a trained model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub schema_version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<String>,
    pub features: Vec<FeatureSpec>,
    pub forest: Forest,
}

/// A validated model ready to serve predictions.
///
/// Construction validates the artifact once so that [`Pipeline::predict`]
/// can index features and tree nodes without further checks.
#[derive(Debug, Clone)]
pub struct Pipeline {
    artifact: ModelArtifact,
}

impl Pipeline {
    /// Validates an artifact and wraps it for serving.
    pub fn new(artifact: ModelArtifact) -> Result<Self, ModelError> {
        validate_artifact(&artifact)?;
        Ok(Self { artifact })
    }

    /// Parses and validates an artifact from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Reads, parses, and validates an artifact file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ModelError::io(path.display().to_string(), e))?;
        Self::from_json(&content)
    }

    /// The model's display name.
    pub fn name(&self) -> &str {
        &self.artifact.name
    }

    /// The input columns the model expects, in artifact order.
    pub fn feature_names(&self) -> Vec<&str> {
        self.artifact.features.iter().map(|f| f.name.as_str()).collect()
    }

    /// Number of trees in the ensemble.
    pub fn num_trees(&self) -> usize {
        self.artifact.forest.trees.len()
    }

    /// Encodes one row and evaluates the forest.
    pub fn predict(&self, row: &Row) -> Result<f64, ModelError> {
        let mut x = Vec::with_capacity(self.artifact.features.len());
        for spec in &self.artifact.features {
            x.push(spec.encoder.encode(&spec.name, row.get(&spec.name))?);
        }
        Ok(self.artifact.forest.predict(&x))
    }
}

/// Structural checks run once at load time.
fn validate_artifact(artifact: &ModelArtifact) -> Result<(), ModelError> {
    if artifact.schema_version != SCHEMA_VERSION {
        return Err(ModelError::UnsupportedSchema(artifact.schema_version));
    }
    if artifact.features.is_empty() {
        return Err(ModelError::Invalid("feature list is empty".into()));
    }
    for spec in &artifact.features {
        if let Encoder::Ordinal { categories, .. } = &spec.encoder {
            if categories.is_empty() {
                return Err(ModelError::Invalid(format!(
                    "ordinal feature '{}' has no categories",
                    spec.name
                )));
            }
        }
    }
    if artifact.forest.trees.is_empty() {
        return Err(ModelError::Invalid("forest has no trees".into()));
    }
    for (t, tree) in artifact.forest.trees.iter().enumerate() {
        if tree.nodes.is_empty() {
            return Err(ModelError::Invalid(format!("tree {t} has no nodes")));
        }
        for (i, node) in tree.nodes.iter().enumerate() {
            let TreeNode::Branch { feature, left, right, .. } = node else {
                continue;
            };
            if *feature >= artifact.features.len() {
                return Err(ModelError::Invalid(format!(
                    "tree {t} node {i} references feature {feature}, but only {} features exist",
                    artifact.features.len()
                )));
            }
            // Forward-only children guarantee termination.
            for child in [*left, *right] {
                if child <= i || child >= tree.nodes.len() {
                    return Err(ModelError::Invalid(format!(
                        "tree {t} node {i} has out-of-order child index {child}"
                    )));
                }
            }
        }
    }
    Ok(())
}
