use candle_core::{Device, Module, Tensor};
use candle_nn::Linear;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::{AffinityModel, PredictorKind};
use crate::error::{ModelError, PredictError};

/// Major version of the model file layout this build understands.
pub const MODEL_FORMAT_MAJOR: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Linear,
    Relu,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(self, xs: Tensor) -> candle_core::Result<Tensor> {
        match self {
            Activation::Linear => Ok(xs),
            Activation::Relu => xs.relu(),
            Activation::Sigmoid => candle_nn::ops::sigmoid(&xs),
            Activation::Tanh => xs.tanh(),
        }
    }
}

/// Fully connected layer. `weights` is `[outputs][inputs]`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    #[serde(default)]
    pub activation: Activation,
}

/// On-disk model description.
///
/// Example:
/// ```json
/// {
///   "format_version": "1.0.0",
///   "kind": "stem",
///   "layers": [
///     { "weights": [[0.1, ...]], "bias": [0.0], "activation": "sigmoid" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelFile {
    pub format_version: String,
    #[serde(default)]
    pub kind: Option<PredictorKind>,
    pub layers: Vec<DenseLayer>,
}

/// Map Candle errors into a model load failure.
fn map_candle_load_err(e: candle_core::Error) -> ModelError {
    ModelError::Tensor(format!("Candle tensor error: {e}"))
}

/// Map Candle errors into a prediction failure.
fn map_candle_err(e: candle_core::Error) -> PredictError {
    PredictError::Inference(format!("Candle inference error: {e}"))
}

#[derive(Debug, Clone)]
struct LoadedLayer {
    linear: Linear,
    activation: Activation,
}

/// Feed-forward regression network evaluated on the CPU with Candle.
#[derive(Debug, Clone)]
pub struct DenseModel {
    input_size: usize,
    layers: Vec<LoadedLayer>,
    device: Device,
}

impl DenseModel {
    /// Read and validate a model file for the given predictor kind.
    pub fn load(path: &Path, kind: PredictorKind) -> Result<Self, ModelError> {
        let content = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ModelFile =
            serde_json::from_str(&content).map_err(|source| ModelError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_file(file, kind)
    }

    /// Validate shapes and version, then build the model.
    pub fn from_file(file: ModelFile, kind: PredictorKind) -> Result<Self, ModelError> {
        let version = semver::Version::parse(file.format_version.trim())
            .map_err(|_| ModelError::InvalidVersion(file.format_version.clone()))?;
        if version.major != MODEL_FORMAT_MAJOR {
            return Err(ModelError::UnsupportedVersion {
                found: version.to_string(),
                required: format!("^{}", MODEL_FORMAT_MAJOR),
            });
        }

        if let Some(declared) = file.kind {
            if declared != kind {
                return Err(ModelError::KindMismatch {
                    expected: kind.to_string(),
                    found: declared.to_string(),
                });
            }
        }

        if file.layers.is_empty() {
            return Err(ModelError::Empty);
        }

        let input_size = kind.input_size();
        let mut width = input_size;
        for (i, layer) in file.layers.iter().enumerate() {
            if layer.weights.is_empty() {
                return Err(ModelError::Shape {
                    layer: i,
                    reason: "no output units".to_string(),
                });
            }
            if layer.weights.len() != layer.bias.len() {
                return Err(ModelError::Shape {
                    layer: i,
                    reason: format!(
                        "{} weight rows but {} biases",
                        layer.weights.len(),
                        layer.bias.len()
                    ),
                });
            }
            if let Some(row) = layer.weights.iter().find(|row| row.len() != width) {
                return Err(ModelError::Shape {
                    layer: i,
                    reason: format!("expected {} inputs per unit, got {}", width, row.len()),
                });
            }
            let finite = layer
                .weights
                .iter()
                .flatten()
                .chain(layer.bias.iter())
                .all(|w| w.is_finite());
            if !finite {
                return Err(ModelError::Shape {
                    layer: i,
                    reason: "non-finite parameter".to_string(),
                });
            }
            width = layer.weights.len();
        }
        if width != 1 {
            return Err(ModelError::Shape {
                layer: file.layers.len() - 1,
                reason: format!("final layer must have 1 output, has {}", width),
            });
        }

        let device = Device::Cpu;
        let layers = file
            .layers
            .into_iter()
            .map(|layer| build_layer(layer, &device))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            input_size,
            layers,
            device,
        })
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

/// Turn a validated layer into a `[outputs, inputs]` weight tensor and bias.
fn build_layer(layer: DenseLayer, device: &Device) -> Result<LoadedLayer, ModelError> {
    let outputs = layer.weights.len();
    let inputs = layer.weights.first().map_or(0, Vec::len);
    let flat: Vec<f64> = layer.weights.into_iter().flatten().collect();

    let weight =
        Tensor::from_vec(flat, (outputs, inputs), device).map_err(map_candle_load_err)?;
    let bias = Tensor::from_vec(layer.bias, outputs, device).map_err(map_candle_load_err)?;

    Ok(LoadedLayer {
        linear: Linear::new(weight, Some(bias)),
        activation: layer.activation,
    })
}

impl AffinityModel for DenseModel {
    fn input_size(&self) -> usize {
        self.input_size
    }

    fn predict(&self, features: &[f64]) -> Result<f64, PredictError> {
        if features.len() != self.input_size {
            return Err(PredictError::InputWidth {
                expected: self.input_size,
                actual: features.len(),
            });
        }

        let mut xs = Tensor::from_slice(features, (1, features.len()), &self.device)
            .map_err(map_candle_err)?;
        for layer in &self.layers {
            xs = layer.linear.forward(&xs).map_err(map_candle_err)?;
            xs = layer.activation.apply(xs).map_err(map_candle_err)?;
        }

        let outputs = xs
            .flatten_all()
            .and_then(|t| t.to_vec1::<f64>())
            .map_err(map_candle_err)?;
        match outputs.as_slice() {
            [value] if value.is_finite() => Ok(*value),
            [_] => Err(PredictError::NonFinite),
            other => Err(PredictError::OutputWidth(other.len())),
        }
    }
}
