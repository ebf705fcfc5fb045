//! Nested weight array flattening and shape inference
//!
//! Model weight tensors arrive as arbitrarily-nested JSON number arrays with
//! no schema. This module recovers a flat f32 sequence in depth-first,
//! left-to-right order, and infers the tensor shape without flattening.
//!
//! The traversal is an explicit walk over `serde_json::Value` so the
//! "non-numeric leaf" error path is exhaustive: a value is either a number,
//! an array, or malformed.

use serde_json::Value;

use crate::error::{ConvertError, Result};

/// Flatten an arbitrarily-nested JSON number array to a 1D f32 sequence.
///
/// Traversal order is depth-first, left-to-right (row-major), matching the
/// layout the embedded runtime expects when it reinterprets the flat array.
///
/// # Arguments
/// * `value` - Nested array of numbers (any depth)
///
/// # Returns
/// * `Ok(Vec<f32>)` - Flat sequence of leaf values in traversal order
/// * `Err(MalformedTensor)` - If any leaf is not a number
pub fn flatten(value: &Value) -> Result<Vec<f32>> {
    let mut out = Vec::new();
    flatten_into(value, &mut out)?;
    Ok(out)
}

fn flatten_into(value: &Value, out: &mut Vec<f32>) -> Result<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, out)?;
            }
            Ok(())
        }
        Value::Number(n) => {
            let v = n.as_f64().ok_or_else(|| ConvertError::MalformedTensor {
                reason: format!("numeric leaf out of f64 range: {}", n),
            })?;
            out.push(v as f32);
            Ok(())
        }
        other => Err(ConvertError::MalformedTensor {
            reason: format!("non-numeric leaf: {}", type_name(other)),
        }),
    }
}

/// Infer the shape of a nested array without flattening it.
///
/// Each shape element is the length of the nesting at that depth, taken from
/// the first sub-array. Rectangularity is assumed, not checked; call
/// [`validate_rectangular`] first when the input is untrusted.
///
/// A non-array value has shape `()`; an empty array has shape `(0,)`.
pub fn shape_of(value: &Value) -> Vec<usize> {
    let mut shape = Vec::new();
    let mut cursor = value;

    while let Value::Array(items) = cursor {
        shape.push(items.len());
        match items.first() {
            Some(first) => cursor = first,
            None => break,
        }
    }

    shape
}

/// Check that a nested array is rectangular: at every depth, all siblings
/// are arrays of the same length, or all are non-arrays.
///
/// A ragged array flattened as if rectangular yields numerically undefined
/// tensor contents, so the parser rejects it up front.
///
/// # Returns
/// * `Ok(())` - If the nesting is rectangular
/// * `Err(MalformedTensor)` - On ragged or mixed array/scalar levels
pub fn validate_rectangular(value: &Value) -> Result<()> {
    let Value::Array(items) = value else {
        return Ok(());
    };

    let mut expected: Option<Option<usize>> = None;
    for item in items {
        let len = match item {
            Value::Array(sub) => Some(sub.len()),
            _ => None,
        };
        match expected {
            None => expected = Some(len),
            Some(e) if e != len => {
                return Err(ConvertError::MalformedTensor {
                    reason: format!(
                        "ragged nesting: sibling lengths {:?} vs {:?}",
                        e, len
                    ),
                });
            }
            Some(_) => {}
        }
        validate_rectangular(item)?;
    }

    Ok(())
}

/// Total element count implied by a shape (product of dimensions).
pub fn element_count(shape: &[usize]) -> usize {
    shape.iter().product()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_flat_array() {
        let v = json!([1.0, 2.0, 3.0]);
        assert_eq!(flatten(&v).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_flatten_depth_first_order() {
        // Depth-first, left-to-right: rows are contiguous
        let v = json!([[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        assert_eq!(flatten(&v).unwrap(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_flatten_three_levels() {
        let v = json!([[[1.0], [2.0]], [[3.0], [4.0]]]);
        assert_eq!(flatten(&v).unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_flatten_single_number() {
        let v = json!(0.5);
        assert_eq!(flatten(&v).unwrap(), vec![0.5]);
    }

    #[test]
    fn test_flatten_rejects_string_leaf() {
        let v = json!([1.0, "oops", 3.0]);
        let err = flatten(&v).unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_TENSOR");
    }

    #[test]
    fn test_flatten_rejects_null_leaf() {
        let v = json!([[1.0], [null]]);
        assert!(flatten(&v).is_err());
    }

    #[test]
    fn test_shape_of_vector() {
        assert_eq!(shape_of(&json!([1.0, 2.0, 3.0])), vec![3]);
    }

    #[test]
    fn test_shape_of_matrix() {
        let v = json!([[1.0, 2.0, 3.0, 4.0], [5.0, 6.0, 7.0, 8.0]]);
        assert_eq!(shape_of(&v), vec![2, 4]);
    }

    #[test]
    fn test_shape_of_scalar_and_empty() {
        assert_eq!(shape_of(&json!(1.0)), Vec::<usize>::new());
        assert_eq!(shape_of(&json!([])), vec![0]);
    }

    #[test]
    fn test_shape_matches_flat_length() {
        let v = json!([[[1, 2], [3, 4]], [[5, 6], [7, 8]], [[9, 10], [11, 12]]]);
        let shape = shape_of(&v);
        assert_eq!(shape, vec![3, 2, 2]);
        assert_eq!(element_count(&shape), flatten(&v).unwrap().len());
    }

    #[test]
    fn test_validate_rectangular_accepts_well_formed() {
        let v = json!([[1.0, 2.0], [3.0, 4.0]]);
        assert!(validate_rectangular(&v).is_ok());
    }

    #[test]
    fn test_validate_rectangular_rejects_ragged() {
        let v = json!([[1.0, 2.0], [3.0]]);
        let err = validate_rectangular(&v).unwrap_err();
        assert_eq!(err.error_code(), "MALFORMED_TENSOR");
    }

    #[test]
    fn test_validate_rectangular_rejects_mixed_levels() {
        let v = json!([[1.0, 2.0], 3.0]);
        assert!(validate_rectangular(&v).is_err());
    }
}
