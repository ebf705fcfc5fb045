//! Conversion verification
//!
//! Re-extracts the five weight tensors from both the source JSON and the
//! generated header and diffs them element-by-element under an absolute
//! tolerance. Discrepancies never raise; they accumulate into a
//! [`VerifyReport`] and the caller maps pass/fail to an exit status.
//!
//! The header side is a textual pattern match: any emitter whose numeric
//! literals appear between a named array's braces is compatible.

use std::fmt;

use regex::Regex;

use crate::error::{ConvertError, Result};
use crate::model::{parse_model, RecurrentModel};

/// Default absolute tolerance for value comparison.
///
/// The emitter rounds to 8 decimal digits, so faithful conversions differ
/// by well under 1e-6.
pub const DEFAULT_TOLERANCE: f32 = 1e-6;

/// The five named tensors, paired with their header array names.
const TENSOR_NAMES: [(&str, &str); 5] = [
    ("kernel", "kKernel"),
    ("recurrent", "kRecurrent"),
    ("bias", "kBias"),
    ("dense_weight", "kDenseW"),
    ("dense_bias", "kDenseB"),
];

/// One verification discrepancy.
#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    /// Tensor lengths differ; elements were not compared.
    Size {
        tensor: String,
        expected: usize,
        actual: usize,
    },
    /// One element exceeded tolerance.
    Value {
        tensor: String,
        index: usize,
        expected: f32,
        actual: f32,
        delta: f32,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Size {
                tensor,
                expected,
                actual,
            } => write!(
                f,
                "{}: SIZE MISMATCH - source has {}, header has {}",
                tensor, expected, actual
            ),
            Mismatch::Value {
                tensor,
                index,
                expected,
                actual,
                delta,
            } => write!(
                f,
                "{}[{}]: source={:.8}, header={:.8}, delta={:.2e}",
                tensor, index, expected, actual, delta
            ),
        }
    }
}

/// Aggregated outcome of one verification run.
#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    /// Every discrepancy found, in tensor order
    pub mismatches: Vec<Mismatch>,
    /// Total element count compared (or declared, on size mismatch)
    pub total_values: usize,
}

impl VerifyReport {
    /// Verification passes iff no record was produced.
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Discrepancies belonging to one tensor.
    pub fn for_tensor<'a>(&'a self, tensor: &'a str) -> impl Iterator<Item = &'a Mismatch> {
        self.mismatches.iter().filter(move |m| match m {
            Mismatch::Size { tensor: t, .. } | Mismatch::Value { tensor: t, .. } => t == tensor,
        })
    }
}

/// Verify that a generated header matches its source model document.
///
/// Both sides are re-extracted independently: the JSON through the normal
/// tensor-extraction path, the header through [`extract_array`].
pub fn verify_conversion(json_text: &str, header_text: &str, tolerance: f32) -> Result<VerifyReport> {
    let model = parse_model(json_text, "verify")?;
    verify_model_against_header(&model, header_text, tolerance)
}

/// Verify an already-parsed model against header text.
pub fn verify_model_against_header(
    model: &RecurrentModel,
    header_text: &str,
    tolerance: f32,
) -> Result<VerifyReport> {
    let mut report = VerifyReport::default();

    for (tensor, array_name) in TENSOR_NAMES {
        let expected = source_tensor(model, tensor);
        let actual = extract_array(header_text, array_name)?;
        report.total_values += expected.len();
        compare_tensors(tensor, expected, &actual, tolerance, &mut report);
    }

    Ok(report)
}

fn source_tensor<'a>(model: &'a RecurrentModel, tensor: &str) -> &'a [f32] {
    match tensor {
        "kernel" => &model.kernel,
        "recurrent" => &model.recurrent,
        "bias" => &model.bias,
        "dense_weight" => &model.dense_weight,
        "dense_bias" => &model.dense_bias,
        _ => unreachable!("unknown tensor name: {}", tensor),
    }
}

/// Recover one named constexpr float array from header text.
///
/// Matches `constexpr float <name>[] = { ... };` and parses every numeric
/// token between the braces, stripping the trailing `f` suffix.
pub fn extract_array(header_text: &str, name: &str) -> Result<Vec<f32>> {
    let array_re = Regex::new(&format!(
        r"(?s)constexpr\s+float\s+{}\[\]\s*=\s*\{{\s*(.*?)\s*\}};",
        regex::escape(name)
    ))
    .expect("static array pattern");

    let body = array_re
        .captures(header_text)
        .and_then(|c| c.get(1))
        .ok_or_else(|| ConvertError::ArrayNotFound {
            name: name.to_string(),
        })?
        .as_str();

    let token_re = Regex::new(r"[-+]?\d*\.?\d+(?:[eE][-+]?\d+)?").expect("static token pattern");
    Ok(token_re
        .find_iter(body)
        .map(|m| m.as_str().parse::<f32>().unwrap_or(f32::NAN))
        .collect())
}

fn compare_tensors(
    tensor: &str,
    expected: &[f32],
    actual: &[f32],
    tolerance: f32,
    report: &mut VerifyReport,
) {
    if expected.len() != actual.len() {
        report.mismatches.push(Mismatch::Size {
            tensor: tensor.to_string(),
            expected: expected.len(),
            actual: actual.len(),
        });
        return;
    }

    for (index, (e, a)) in expected.iter().zip(actual.iter()).enumerate() {
        let delta = (e - a).abs();
        if delta > tolerance {
            report.mismatches.push(Mismatch::Value {
                tensor: tensor.to_string(),
                index,
                expected: *e,
                actual: *a,
                delta,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::generate_model_header;
    use crate::model::tests::lstm_json;

    fn emitted(fill: f64) -> (String, String) {
        let json = lstm_json(12, fill);
        let model = parse_model(&json, "t").unwrap();
        let header = generate_model_header(&model, "t");
        (json, header)
    }

    #[test]
    fn test_extract_array_basic() {
        let header = "constexpr float kBias[] = {\n    0.12345678f, -0.50000000f,\n    1.0e-3f\n};";
        let values = extract_array(header, "kBias").unwrap();
        assert_eq!(values.len(), 3);
        assert!((values[0] - 0.12345678).abs() < 1e-7);
        assert_eq!(values[1], -0.5);
        assert!((values[2] - 0.001).abs() < 1e-9);
    }

    #[test]
    fn test_extract_array_missing() {
        let err = extract_array("nothing here", "kKernel").unwrap_err();
        assert_eq!(err.error_code(), "ARRAY_NOT_FOUND");
    }

    #[test]
    fn test_extract_array_stops_at_first_close_brace() {
        let header = "constexpr float kA[] = {\n    1.0f\n};\nconstexpr float kB[] = {\n    2.0f\n};";
        assert_eq!(extract_array(header, "kA").unwrap(), vec![1.0]);
        assert_eq!(extract_array(header, "kB").unwrap(), vec![2.0]);
    }

    #[test]
    fn test_round_trip_passes() {
        let (json, header) = emitted(0.37);
        let report = verify_conversion(&json, &header, DEFAULT_TOLERANCE).unwrap();
        assert!(report.passed(), "mismatches: {:?}", report.mismatches);
        // 48 + 576 + 48 + 12 + 1
        assert_eq!(report.total_values, 685);
    }

    #[test]
    fn test_single_altered_value_is_one_mismatch() {
        let (json, header) = emitted(0.25);
        // Corrupt exactly one emitted value
        let corrupted = header.replacen("0.25000000f", "0.26000000f", 1);
        assert_ne!(header, corrupted);

        let report = verify_conversion(&json, &corrupted, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(report.mismatches.len(), 1);
        match &report.mismatches[0] {
            Mismatch::Value { index, delta, .. } => {
                assert_eq!(*index, 0);
                assert!((delta - 0.01).abs() < 1e-4);
            }
            other => panic!("expected ValueMismatch, got: {:?}", other),
        }
    }

    #[test]
    fn test_size_mismatch_stops_tensor_comparison() {
        let (json, header) = emitted(0.25);
        // Drop one value row from kBias: sizes now differ
        let start = header.find("constexpr float kBias[] = {").unwrap();
        let row_start = header[start..].find("    0.25000000f").unwrap() + start;
        let row_end = header[row_start..].find('\n').unwrap() + row_start + 1;
        let corrupted = format!("{}{}", &header[..row_start], &header[row_end..]);

        let report = verify_conversion(&json, &corrupted, DEFAULT_TOLERANCE).unwrap();
        let bias_records: Vec<_> = report.for_tensor("bias").collect();
        assert_eq!(bias_records.len(), 1);
        assert!(matches!(bias_records[0], Mismatch::Size { .. }));
        // Other tensors still compared clean
        assert!(report.for_tensor("kernel").next().is_none());
    }

    #[test]
    fn test_tolerance_absorbs_rounding() {
        // A value that rounds at the 8th decimal digit still verifies
        let json = lstm_json(12, 0.123456789);
        let model = parse_model(&json, "t").unwrap();
        let header = generate_model_header(&model, "t");
        let report = verify_conversion(&json, &header, DEFAULT_TOLERANCE).unwrap();
        assert!(report.passed());
    }

    #[test]
    fn test_mismatch_display() {
        let m = Mismatch::Size {
            tensor: "kernel".to_string(),
            expected: 48,
            actual: 40,
        };
        assert_eq!(
            m.to_string(),
            "kernel: SIZE MISMATCH - source has 48, header has 40"
        );
    }
}
