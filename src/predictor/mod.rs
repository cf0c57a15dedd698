pub mod features;
pub mod model;
pub mod registry;

pub use features::{encode_pair, one_hot};
pub use model::{Activation, DenseLayer, DenseModel, ModelFile};
pub use registry::{LoadStatus, PredictorRegistry, PredictorSlot};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::chart::{BRANCH_COUNT, STEM_COUNT};
use crate::error::PredictError;

/// Raw prediction used when a model is missing or fails. Rescales to a
/// sub-score of 25 out of 50.
pub const NEUTRAL_PREDICTION: f64 = 0.5;

/// Which category codes a predictor scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictorKind {
    Stem,
    Branch,
}

impl PredictorKind {
    /// Number of one-hot classes per code.
    pub fn classes(self) -> usize {
        match self {
            PredictorKind::Stem => STEM_COUNT,
            PredictorKind::Branch => BRANCH_COUNT,
        }
    }

    /// Width of the concatenated feature vector.
    pub fn input_size(self) -> usize {
        self.classes() * 2
    }
}

impl fmt::Display for PredictorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictorKind::Stem => write!(f, "stem"),
            PredictorKind::Branch => write!(f, "branch"),
        }
    }
}

/// A scalar regression over an encoded code pair.
///
/// Implementations are loaded once and shared read-only, hence `Send + Sync`.
pub trait AffinityModel: Send + Sync + fmt::Debug {
    fn input_size(&self) -> usize;

    fn predict(&self, features: &[f64]) -> Result<f64, PredictError>;
}

/// Affinity predictor for one kind of code.
///
/// `predict` never fails: without a model, or when the model errors, it
/// returns the fallback value.
#[derive(Debug, Clone)]
pub struct AffinityPredictor {
    kind: PredictorKind,
    model: Option<Arc<dyn AffinityModel>>,
    fallback: f64,
}

impl AffinityPredictor {
    pub fn new(kind: PredictorKind, model: Arc<dyn AffinityModel>) -> Self {
        Self {
            kind,
            model: Some(model),
            fallback: NEUTRAL_PREDICTION,
        }
    }

    /// Predictor with no model behind it.
    pub fn unavailable(kind: PredictorKind) -> Self {
        Self {
            kind,
            model: None,
            fallback: NEUTRAL_PREDICTION,
        }
    }

    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn kind(&self) -> PredictorKind {
        self.kind
    }

    pub fn fallback(&self) -> f64 {
        self.fallback
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn predict(&self, code_a: i64, code_b: i64) -> f64 {
        let Some(model) = &self.model else {
            tracing::debug!(kind = %self.kind, "no model loaded, using fallback");
            return self.fallback;
        };

        let features = encode_pair(code_a, code_b, self.kind.classes());
        match model.predict(&features) {
            Ok(value) if value.is_finite() => value,
            Ok(_) => {
                tracing::warn!(
                    kind = %self.kind,
                    "model returned a non-finite value, using fallback"
                );
                self.fallback
            }
            Err(e) => {
                tracing::warn!(kind = %self.kind, error = %e, "prediction failed, using fallback");
                self.fallback
            }
        }
    }
}
