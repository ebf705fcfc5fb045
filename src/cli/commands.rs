//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command. Printed reports mirror
//! the converter's role as a build-time tool: terse per-file lines for
//! conversions, a detailed diff report for verification.

use std::fs;
use std::path::Path;

use log::info;
use serde_json::Value;

use crate::convert::{
    convert_ir_file, convert_model_file, run_batch, BatchKind, ConvertOptions,
};
use crate::error::{ConvertError, Result};
use crate::ir::IrConfig;
use crate::lstm::ReferenceLstm;
use crate::model::parse_model_file;
use crate::tensor::{flatten, shape_of};
use crate::verify::{verify_model_against_header, Mismatch, DEFAULT_TOLERANCE};

/// Convert a model file, or a directory of model files with `batch`.
pub fn convert_model(
    input: &Path,
    output_dir: &Path,
    batch: bool,
    registry: bool,
    force: bool,
) -> Result<()> {
    let options = ConvertOptions { force };
    let config = IrConfig::default();

    if batch {
        let summary = run_batch(
            input,
            output_dir,
            BatchKind::Model,
            &config,
            &options,
            registry,
        )?;
        println!(
            "Converted {}/{} models -> {}",
            summary.converted,
            summary.total,
            output_dir.display()
        );
        if !summary.all_ok() {
            return Err(ConvertError::BatchIncomplete {
                converted: summary.converted,
                total: summary.total,
            });
        }
        Ok(())
    } else {
        let output = convert_model_file(input, output_dir, &options)?;
        println!("OK {} -> {}", input.display(), output.display());
        Ok(())
    }
}

/// Convert an IR file, or a directory of IR files with `batch`.
pub fn convert_ir(
    input: &Path,
    output_dir: &Path,
    batch: bool,
    registry: bool,
    force: bool,
) -> Result<()> {
    let options = ConvertOptions { force };
    let config = IrConfig::default();

    if batch {
        let summary = run_batch(
            input,
            output_dir,
            BatchKind::Ir,
            &config,
            &options,
            registry,
        )?;
        println!(
            "Converted {}/{} IRs -> {}",
            summary.converted,
            summary.total,
            output_dir.display()
        );
        if !summary.all_ok() {
            return Err(ConvertError::BatchIncomplete {
                converted: summary.converted,
                total: summary.total,
            });
        }
        Ok(())
    } else {
        let output = convert_ir_file(input, output_dir, &config, &options)?;
        println!("OK {} -> {}", input.display(), output.display());
        Ok(())
    }
}

/// Verify a generated header against its source model document.
///
/// Prints a per-tensor report; the first five value mismatches of each
/// tensor are shown in full. Fails with `VerificationFailed` when any
/// record was produced.
pub fn verify(model_path: &Path, header_path: &Path) -> Result<()> {
    let model = parse_model_file(model_path)?;
    if !header_path.exists() {
        return Err(ConvertError::FileNotFound {
            path: header_path.display().to_string(),
        });
    }
    let header = fs::read_to_string(header_path)?;

    println!("{}", "=".repeat(70));
    println!("Neural Amp Model Conversion Verification");
    println!("{}", "=".repeat(70));
    println!("\n  JSON:   {}", model_path.display());
    println!("  Header: {}\n", header_path.display());

    let report = verify_model_against_header(&model, &header, DEFAULT_TOLERANCE)?;

    let tensors = [
        ("kernel", model.kernel.len()),
        ("recurrent", model.recurrent.len()),
        ("bias", model.bias.len()),
        ("dense_weight", model.dense_weight.len()),
        ("dense_bias", model.dense_bias.len()),
    ];

    for (tensor, len) in tensors {
        let records: Vec<&Mismatch> = report.for_tensor(tensor).collect();
        if records.is_empty() {
            println!("  ok {}: {} values match", tensor, len);
        } else if let Mismatch::Size { .. } = records[0] {
            println!("  FAIL {}", records[0]);
        } else {
            println!("  FAIL {}: {} value mismatches out of {}", tensor, records.len(), len);
            for record in records.iter().take(5) {
                println!("      {}", record);
            }
            if records.len() > 5 {
                println!("      ... and {} more mismatches", records.len() - 5);
            }
        }
    }

    println!("\n{}", "=".repeat(70));
    if report.passed() {
        println!("PASS: All {} values match!", report.total_values);
        println!("{}", "=".repeat(70));
        Ok(())
    } else {
        println!(
            "FAIL: {} mismatches found out of {} values",
            report.mismatches.len(),
            report.total_values
        );
        println!("{}", "=".repeat(70));
        Err(ConvertError::VerificationFailed {
            mismatches: report.mismatches.len(),
            total_values: report.total_values,
        })
    }
}

/// Print the structure and sample values of a model JSON file.
pub fn inspect(model_path: &Path) -> Result<()> {
    if !model_path.exists() {
        return Err(ConvertError::FileNotFound {
            path: model_path.display().to_string(),
        });
    }
    let text = fs::read_to_string(model_path)?;
    let doc: Value = serde_json::from_str(&text)?;

    println!("{}", "=".repeat(70));
    println!(
        "Model Inspector: {}",
        model_path.file_name().unwrap_or_default().to_string_lossy()
    );
    println!("{}", "=".repeat(70));

    println!("\n[METADATA]");
    match doc.get("metadata").and_then(Value::as_object) {
        Some(metadata) if !metadata.is_empty() => {
            for (key, value) in metadata {
                println!("  {}: {}", key, value);
            }
        }
        _ => println!("  (no metadata found)"),
    }

    println!("\n[INPUT SHAPE]");
    println!("  in_shape: {}", doc.get("in_shape").unwrap_or(&Value::Null));

    let layers = doc
        .get("layers")
        .and_then(Value::as_array)
        .ok_or_else(|| ConvertError::MalformedModel {
            reason: "missing 'layers' array".to_string(),
        })?;

    println!("\n[LAYERS] ({} total)", layers.len());
    for (i, layer) in layers.iter().enumerate() {
        let layer_type = layer.get("type").and_then(Value::as_str).unwrap_or("unknown");
        let activation = layer.get("activation").and_then(Value::as_str).unwrap_or("");
        let shape = layer.get("shape").unwrap_or(&Value::Null);
        let weights = layer
            .get("weights")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        println!("\n  Layer {}: {}", i, layer_type.to_uppercase());
        println!("    activation: '{}'", activation);
        println!("    output shape: {}", shape);
        println!("    num weight arrays: {}", weights.len());

        for (w, tensor) in weights.iter().enumerate() {
            let flat = flatten(tensor)?;
            let preview = 4.min(flat.len());
            println!(
                "    weights[{}]: shape {:?}, flat size {}, first {:?}, last {:?}",
                w,
                shape_of(tensor),
                flat.len(),
                &flat[..preview],
                &flat[flat.len() - preview..],
            );
        }
    }

    Ok(())
}

/// Run the reference LSTM oracle over standard test signals and print the
/// expected outputs for cross-checking the embedded runtime.
pub fn test_inference(model_path: &Path) -> Result<()> {
    let model = parse_model_file(model_path)?;
    info!(
        "loaded model '{}' ({}-{})",
        model.name,
        model.architecture.label(),
        model.hidden_size
    );
    let mut lstm = ReferenceLstm::from_model(&model);

    println!("{}", "=".repeat(70));
    println!(
        "Model Inference Test: {}",
        model_path.file_name().unwrap_or_default().to_string_lossy()
    );
    println!("{}", "=".repeat(70));

    // Test 1: impulse response
    println!("\n[Test 1: Impulse Response]");
    let impulse = [1.0, 0.0, 0.0, 0.0, 0.0];
    lstm.reset();
    let outputs = lstm.process(&impulse);
    println!("  Input: {:?}", impulse);
    println!("  Output: {:?}", outputs);
    println!("  Output[0] (impulse): {:.8}", outputs[0]);

    // Test 2: DC input
    println!("\n[Test 2: DC Input (0.5)]");
    lstm.reset();
    let outputs = lstm.process(&[0.5; 10]);
    println!("  Last 5 outputs: {:?}", &outputs[5..]);

    // Test 3: sine wave
    println!("\n[Test 3: 440Hz Sine Wave (first 20 samples)]");
    lstm.reset();
    let sine: Vec<f32> = (0..20)
        .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 48000.0).sin())
        .collect();
    let outputs = lstm.process(&sine);
    println!("  Input[0..5]: {:?}", &sine[..5]);
    println!("  Output[0..5]: {:?}", &outputs[..5]);
    println!("  Output[15..20]: {:?}", &outputs[15..]);

    // Summary for embedded cross-check
    println!("\n{}", "=".repeat(70));
    println!("Expected values for embedded verification:");
    println!("{}", "=".repeat(70));

    lstm.reset();
    let y_impulse = lstm.step(1.0);
    println!("  Impulse response first sample: {:.8}", y_impulse);

    lstm.reset();
    let dc = lstm.process(&[0.5; 10]);
    println!("  DC (0.5) after 10 samples: {:.8}", dc[9]);

    Ok(())
}
