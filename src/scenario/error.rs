use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a scenario document.
///
/// All of them are fatal: a scenario is either fully valid or rejected.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("malformed scenario document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed YAML scenario: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("cannot read scenario file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("scenario is missing required key '{0}'")]
    MissingKey(String),

    #[error("scenario key '{key}' must be {expected}")]
    InvalidType { key: String, expected: &'static str },

    #[error("group '{group}': list '{key}' has {got} entries, expected {expected}")]
    ListLength {
        group: String,
        key: String,
        expected: usize,
        got: usize,
    },

    #[error("group '{group}': 'num' must be a positive integer")]
    InvalidGroupSize { group: String },

    #[error("field range [{min_x}, {max_x}] x [{min_y}, {max_y}] is empty or not finite")]
    InvalidFieldRange {
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
    },

    #[error("time limit {0} is not finite")]
    InvalidTimeLimit(f64),
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;
