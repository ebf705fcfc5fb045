//! AIDA-X model parsing and validation
//!
//! Parses the recurrent-plus-dense JSON description exported by AIDA-X
//! trainers, flattens the five weight tensors, and enforces the embedded
//! runtime's supported architecture subset.
//!
//! Parsing is architecture-agnostic and gate-count-parameterized (4 gates
//! for LSTM, 3 for GRU); the LSTM-12 restriction lives in
//! [`validate_model`] alone so relaxing it later touches no parser code.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{ConvertError, Result};
use crate::tensor::{flatten, validate_rectangular};

/// External input width of the amp models (single audio sample per step)
pub const INPUT_SIZE: usize = 1;

/// Recurrent cell type of the model's first layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Architecture {
    Lstm,
    Gru,
}

impl Architecture {
    /// Number of concatenated gates in the weight layout
    pub fn gate_count(&self) -> usize {
        match self {
            Architecture::Lstm => 4,
            Architecture::Gru => 3,
        }
    }

    /// Uppercase label used in generated headers and reports
    pub fn label(&self) -> &'static str {
        match self {
            Architecture::Lstm => "LSTM",
            Architecture::Gru => "GRU",
        }
    }

    fn from_type_field(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lstm" => Some(Architecture::Lstm),
            "gru" => Some(Architecture::Gru),
            _ => None,
        }
    }
}

/// A parsed recurrent amp model: five flat weight tensors plus topology.
///
/// Constructed once from a JSON document and immutable thereafter.
#[derive(Debug, Clone)]
pub struct RecurrentModel {
    /// Display name from `metadata.name`, or the filename stem
    pub name: String,
    pub architecture: Architecture,
    pub hidden_size: usize,
    /// Input kernel, length `INPUT_SIZE * gates * hidden`
    pub kernel: Vec<f32>,
    /// Recurrent kernel, length `hidden * gates * hidden`
    pub recurrent: Vec<f32>,
    /// Gate bias, length `gates * hidden`
    pub bias: Vec<f32>,
    /// Dense output weights, length `hidden`
    pub dense_weight: Vec<f32>,
    /// Dense output bias, length 1
    pub dense_bias: Vec<f32>,
}

/// Parse a model from a JSON file on disk.
///
/// The filename stem is the fallback display name when `metadata.name` is
/// absent.
pub fn parse_model_file(path: &Path) -> Result<RecurrentModel> {
    if !path.exists() {
        return Err(ConvertError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let text = fs::read_to_string(path)?;
    let fallback = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    parse_model(&text, &fallback)
}

/// Parse a model from JSON text.
///
/// # Errors
/// * `MalformedModel` - Wrong layer count, layer types, or weight counts
/// * `MalformedTensor` - Ragged nesting or non-numeric weight leaves
/// * `TensorSizeMismatch` - Flattened lengths disagree with the
///   gate-count/hidden-size formula
pub fn parse_model(json_text: &str, fallback_name: &str) -> Result<RecurrentModel> {
    let doc: Value = serde_json::from_str(json_text)?;

    let name = doc
        .pointer("/metadata/name")
        .and_then(Value::as_str)
        .unwrap_or(fallback_name)
        .to_string();

    let layers = doc
        .get("layers")
        .and_then(Value::as_array)
        .ok_or_else(|| ConvertError::MalformedModel {
            reason: "missing 'layers' array".to_string(),
        })?;

    if layers.len() < 2 {
        return Err(ConvertError::MalformedModel {
            reason: format!("expected at least 2 layers, got {}", layers.len()),
        });
    }

    // Layer 0: recurrent cell
    let rnn_layer = &layers[0];
    let rnn_type = rnn_layer
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let architecture =
        Architecture::from_type_field(rnn_type).ok_or_else(|| ConvertError::MalformedModel {
            reason: format!("first layer must be LSTM or GRU, got: '{}'", rnn_type),
        })?;

    // Hidden width is the last element of the declared output shape
    let hidden_size = rnn_layer
        .get("shape")
        .and_then(Value::as_array)
        .and_then(|s| s.last())
        .and_then(Value::as_u64)
        .ok_or_else(|| ConvertError::MalformedModel {
            reason: "first layer has no output shape".to_string(),
        })? as usize;

    let rnn_weights = layer_weights(rnn_layer, 0, 3)?;

    // Layer 1: dense output
    let dense_layer = &layers[1];
    let dense_type = dense_layer
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if !dense_type.eq_ignore_ascii_case("dense") {
        return Err(ConvertError::MalformedModel {
            reason: format!("second layer must be Dense, got: '{}'", dense_type),
        });
    }

    let dense_weights = layer_weights(dense_layer, 1, 2)?;

    let kernel = flatten_checked(rnn_weights[0])?;
    let recurrent = flatten_checked(rnn_weights[1])?;
    let bias = flatten_checked(rnn_weights[2])?;
    let dense_weight = flatten_checked(dense_weights[0])?;
    let dense_bias = flatten_checked(dense_weights[1])?;

    let model = RecurrentModel {
        name,
        architecture,
        hidden_size,
        kernel,
        recurrent,
        bias,
        dense_weight,
        dense_bias,
    };
    check_tensor_sizes(&model)?;

    Ok(model)
}

/// Fetch a layer's `weights` array, enforcing the exact tensor count.
fn layer_weights(layer: &Value, index: usize, expected: usize) -> Result<Vec<&Value>> {
    let weights = layer
        .get("weights")
        .and_then(Value::as_array)
        .ok_or_else(|| ConvertError::MalformedModel {
            reason: format!("layer {} has no 'weights' array", index),
        })?;

    if weights.len() != expected {
        return Err(ConvertError::MalformedModel {
            reason: format!(
                "layer {} must own exactly {} weight tensors, got {}",
                index,
                expected,
                weights.len()
            ),
        });
    }

    Ok(weights.iter().collect())
}

fn flatten_checked(value: &Value) -> Result<Vec<f32>> {
    validate_rectangular(value)?;
    flatten(value)
}

/// Enforce the `product(shape)` invariants from the gate-count formula.
fn check_tensor_sizes(model: &RecurrentModel) -> Result<()> {
    let gates = model.architecture.gate_count();
    let hidden = model.hidden_size;

    let checks = [
        ("kernel", model.kernel.len(), INPUT_SIZE * gates * hidden),
        ("recurrent", model.recurrent.len(), hidden * gates * hidden),
        ("bias", model.bias.len(), gates * hidden),
        ("dense_weight", model.dense_weight.len(), hidden),
        ("dense_bias", model.dense_bias.len(), 1),
    ];

    for (tensor, actual, expected) in checks {
        if actual != expected {
            return Err(ConvertError::TensorSizeMismatch {
                tensor: tensor.to_string(),
                actual,
                expected,
            });
        }
    }

    Ok(())
}

/// Hidden width the embedded runtime is compiled for
pub const SUPPORTED_HIDDEN_SIZE: usize = 12;

/// Reject any model the embedded runtime cannot load.
///
/// This is a product constraint (the firmware ships a fixed LSTM-12
/// inference path), not a limitation of the conversion machinery.
pub fn validate_model(model: &RecurrentModel) -> Result<()> {
    if model.architecture != Architecture::Lstm {
        return Err(ConvertError::UnsupportedArchitecture {
            reason: format!(
                "only LSTM architecture supported, got: {}",
                model.architecture.label()
            ),
        });
    }

    if model.hidden_size != SUPPORTED_HIDDEN_SIZE {
        return Err(ConvertError::UnsupportedArchitecture {
            reason: format!(
                "only hidden_size={} supported, got: {}",
                SUPPORTED_HIDDEN_SIZE, model.hidden_size
            ),
        });
    }

    Ok(())
}
