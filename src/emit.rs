//! Constexpr header generation
//!
//! Renders flat float sequences as C++ constexpr array declarations the
//! embedded build consumes directly. Every array is paired with a size
//! constant derived from the array itself (`sizeof` division), so the count
//! can never drift from the data.
//!
//! Formatting is fixed-point with 8 decimal digits; that rounding is the
//! only information loss in the whole conversion and is what the verifier's
//! 1e-6 tolerance absorbs.

use crate::ir::ImpulseResponse;
use crate::model::RecurrentModel;

// ============================================================================
// Constants
// ============================================================================

/// Values per row for model weight arrays
pub const WEIGHTS_PER_ROW: usize = 8;

/// Values per row for IR sample arrays
pub const IR_SAMPLES_PER_ROW: usize = 6;

// ============================================================================
// Array formatting
// ============================================================================

/// Layout options for [`format_array`].
#[derive(Debug, Clone, Copy)]
pub struct ArrayStyle {
    /// Values per emitted row
    pub per_row: usize,
    /// Print an explicit `+` on non-negative values (IR convention, keeps
    /// columns aligned)
    pub explicit_sign: bool,
}

impl ArrayStyle {
    /// Style used for model weight tensors
    pub fn weights() -> Self {
        ArrayStyle {
            per_row: WEIGHTS_PER_ROW,
            explicit_sign: false,
        }
    }

    /// Style used for IR sample data
    pub fn ir_samples() -> Self {
        ArrayStyle {
            per_row: IR_SAMPLES_PER_ROW,
            explicit_sign: true,
        }
    }
}

/// Format a flat float sequence as a `constexpr float` array declaration.
///
/// Rows hold `style.per_row` comma-separated values at 8 decimal digits with
/// an `f` suffix; every row but the last ends with a trailing comma.
pub fn format_array(values: &[f32], name: &str, style: &ArrayStyle) -> String {
    let mut lines = vec![format!("constexpr float {}[] = {{", name)];

    for (i, chunk) in values.chunks(style.per_row).enumerate() {
        let formatted: Vec<String> = chunk
            .iter()
            .map(|v| {
                if style.explicit_sign {
                    format!("{:+.8}f", v)
                } else {
                    format!("{:.8}f", v)
                }
            })
            .collect();
        let mut row = format!("    {}", formatted.join(", "));
        if (i + 1) * style.per_row < values.len() {
            row.push(',');
        }
        lines.push(row);
    }

    lines.push("};".to_string());
    lines.join("\n")
}

/// Emit an array plus its paired element-count constant.
fn array_with_size(values: &[f32], name: &str, style: &ArrayStyle) -> String {
    format!(
        "{}\nconstexpr size_t {}Size = sizeof({}) / sizeof({}[0]);",
        format_array(values, name, style),
        name,
        name,
        name
    )
}

// ============================================================================
// Model headers
// ============================================================================

/// Generate the complete header for a converted model.
///
/// The five weight tensors land in a per-model namespace under
/// `EmbeddedModels`, alongside name/architecture/topology constants.
pub fn generate_model_header(model: &RecurrentModel, identifier: &str) -> String {
    let arch = model.architecture.label();
    let gates = model.architecture.gate_count();
    let style = ArrayStyle::weights();

    format!(
        r#"#pragma once
// Auto-generated from AIDA-X model: {name}
// Architecture: {arch}-{hidden}
// DO NOT EDIT - regenerate using embedgen convert-model

#include <cstddef>

namespace EmbeddedModels {{
namespace {identifier} {{

constexpr const char* kName = "{name}";
constexpr const char* kArchitecture = "{arch}";
constexpr int kHiddenSize = {hidden};
constexpr int kInputSize = 1;
constexpr int kOutputSize = 1;

// Input kernel weights: shape (input_size, {gates} * hidden_size)
{kernel}

// Recurrent kernel weights: shape (hidden_size, {gates} * hidden_size)
{recurrent}

// Bias: shape ({gates} * hidden_size,)
{bias}

// Dense output weights: shape (hidden_size, output_size)
{dense_w}

// Dense output bias: shape (output_size,)
{dense_b}

}} // namespace {identifier}
}} // namespace EmbeddedModels
"#,
        name = model.name,
        arch = arch,
        hidden = model.hidden_size,
        gates = gates,
        identifier = identifier,
        kernel = array_with_size(&model.kernel, "kKernel", &style),
        recurrent = array_with_size(&model.recurrent, "kRecurrent", &style),
        bias = array_with_size(&model.bias, "kBias", &style),
        dense_w = array_with_size(&model.dense_weight, "kDenseW", &style),
        dense_b = array_with_size(&model.dense_bias, "kDenseB", &style),
    )
}

// ============================================================================
// IR headers
// ============================================================================

/// Generate the complete header for a processed impulse response.
pub fn generate_ir_header(ir: &ImpulseResponse, identifier: &str, source_file: &str) -> String {
    format!(
        r#"#pragma once
// Auto-generated from IR file: {source}
// Original: {orig_rate}Hz, {orig_ch}ch, {orig_len} samples
// Processed: {rate}Hz, mono, {len} samples, normalized
// DO NOT EDIT - regenerate using embedgen convert-ir

#include <cstddef>

namespace EmbeddedIRs {{
namespace {identifier} {{

constexpr const char* kName = "{name}";
constexpr int kSampleRate = {rate};
constexpr int kLength = {len};

// Impulse response samples (mono, normalized)
{samples}

}} // namespace {identifier}
}} // namespace EmbeddedIRs
"#,
        source = source_file,
        orig_rate = ir.original_rate,
        orig_ch = ir.original_channels,
        orig_len = ir.original_frames,
        rate = ir.sample_rate,
        len = ir.samples.len(),
        name = ir.name,
        identifier = identifier,
        samples = format_array(&ir.samples, "kSamples", &ArrayStyle::ir_samples()),
    )
}

// ============================================================================
// Registries
// ============================================================================

/// Generate a registry header aggregating all converted models in a bundle.
///
/// Each entry namespace must correspond to a generated per-model header in
/// the same output directory. The lookup accessor is bounds-checked and
/// returns `nullptr` out of range.
pub fn generate_model_registry(identifiers: &[String]) -> String {
    let includes: Vec<String> = identifiers
        .iter()
        .map(|id| format!("#include \"{}.h\"", id))
        .collect();

    let entries: Vec<String> = identifiers
        .iter()
        .map(|id| {
            format!(
                "    {{\n        {id}::kName,\n        {id}::kHiddenSize,\n        \
                 {id}::kKernel, {id}::kKernelSize,\n        \
                 {id}::kRecurrent, {id}::kRecurrentSize,\n        \
                 {id}::kBias, {id}::kBiasSize,\n        \
                 {id}::kDenseW, {id}::kDenseWSize,\n        \
                 {id}::kDenseB, {id}::kDenseBSize,\n    }},",
                id = id
            )
        })
        .collect();

    format!(
        r#"#pragma once
// Auto-generated registry of embedded neural amp models
// DO NOT EDIT - regenerate using embedgen convert-model --batch --registry

#include <cstddef>

{includes}

namespace EmbeddedModels {{

struct ModelInfo {{
    const char* name;
    int hiddenSize;
    const float* kernel;
    size_t kernelSize;
    const float* recurrent;
    size_t recurrentSize;
    const float* bias;
    size_t biasSize;
    const float* denseW;
    size_t denseWSize;
    const float* denseB;
    size_t denseBSize;
}};

constexpr size_t kNumModels = {count};

inline const ModelInfo kModelRegistry[] = {{
{entries}
}};

inline const ModelInfo* model_at(size_t index) {{
    return index < kNumModels ? &kModelRegistry[index] : nullptr;
}}

}} // namespace EmbeddedModels
"#,
        includes = includes.join("\n"),
        count = identifiers.len(),
        entries = entries.join("\n"),
    )
}

/// Generate a registry header aggregating all converted IRs in a bundle.
pub fn generate_ir_registry(identifiers: &[String]) -> String {
    let includes: Vec<String> = identifiers
        .iter()
        .map(|id| format!("#include \"{}.h\"", id))
        .collect();

    let entries: Vec<String> = identifiers
        .iter()
        .map(|id| {
            format!(
                "    {{ {id}::kName, {id}::kSampleRate, {id}::kLength, {id}::kSamples }},",
                id = id
            )
        })
        .collect();

    format!(
        r#"#pragma once
// Auto-generated registry of embedded cabinet impulse responses
// DO NOT EDIT - regenerate using embedgen convert-ir --batch --registry

#include <cstddef>

{includes}

namespace EmbeddedIRs {{

struct IRInfo {{
    const char* name;
    int sampleRate;
    int length;
    const float* samples;
}};

constexpr size_t kNumIRs = {count};

inline const IRInfo kIRRegistry[] = {{
{entries}
}};

inline const IRInfo* ir_at(size_t index) {{
    return index < kNumIRs ? &kIRRegistry[index] : nullptr;
}}

}} // namespace EmbeddedIRs
"#,
        includes = includes.join("\n"),
        count = identifiers.len(),
        entries = entries.join("\n"),
    )
}
