//! Error types for the scoring pipeline.
//!
//! None of these escape a scoring request: input errors become the failure
//! payload, model errors degrade a predictor to its fallback.

use std::path::PathBuf;
use thiserror::Error;

/// A request that cannot be scored.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("request is not valid JSON: {0}")]
    Json(String),

    #[error("request must be a JSON object")]
    NotAnObject,

    #[error("{field} is missing")]
    MissingToken { field: &'static str },

    #[error("{field} must be an array of 6 integers")]
    TokenNotArray { field: &'static str },

    #[error("{field} must have exactly 6 values, got {len}")]
    TokenLength { field: &'static str, len: usize },

    #[error("{field}[{index}] is not numeric: {value}")]
    NonNumeric {
        field: &'static str,
        index: usize,
        value: String,
    },

    #[error("{field} is not numeric: {value}")]
    NonNumericGender { field: &'static str, value: String },
}

/// Failure to load a predictor model file.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no model path configured")]
    NotConfigured,

    #[error("failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid format_version '{0}'")]
    InvalidVersion(String),

    #[error("unsupported model format_version {found} (need {required})")]
    UnsupportedVersion { found: String, required: String },

    #[error("model is for {found} codes, expected {expected}")]
    KindMismatch { expected: String, found: String },

    #[error("model has no layers")]
    Empty,

    #[error("layer {layer}: {reason}")]
    Shape { layer: usize, reason: String },

    #[error("{0}")]
    Tensor(String),
}

/// Failure while running a loaded model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("expected {expected} input features, got {actual}")]
    InputWidth { expected: usize, actual: usize },

    #[error("model produced {0} outputs, expected 1")]
    OutputWidth(usize),

    #[error("model produced a non-finite value")]
    NonFinite,

    #[error("{0}")]
    Inference(String),
}
