//! Per-file conversion drivers and batch processing
//!
//! Single-file conversion surfaces its error; batch conversion catches each
//! file's error at the batch boundary, logs it with the offending path, and
//! keeps going. Files are independent units of work with no cross-file
//! state.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use walkdir::WalkDir;

use crate::emit::{
    generate_ir_header, generate_ir_registry, generate_model_header, generate_model_registry,
};
use crate::error::{ConvertError, Result};
use crate::ir::{process_ir, IrConfig};
use crate::model::{parse_model_file, validate_model};
use crate::verify::{verify_model_against_header, DEFAULT_TOLERANCE};
use crate::wav::decode_wav;

/// Options shared by the conversion commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// Overwrite existing output files
    pub force: bool,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Files converted successfully
    pub converted: usize,
    /// Files attempted
    pub total: usize,
    /// Identifiers of successfully converted units, in input order
    pub identifiers: Vec<String>,
}

impl BatchSummary {
    /// A batch fails overall if any item failed.
    pub fn all_ok(&self) -> bool {
        self.converted == self.total
    }
}

// ============================================================================
// Identifier handling
// ============================================================================

/// Derive a valid C++ identifier from a source filename.
///
/// Non-alphanumeric characters become `_`; a leading digit gets a `_`
/// prefix.
pub fn sanitize_identifier(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string());

    let mut out: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    if out.chars().next().map_or(true, |c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }

    out
}

/// Derive a human-readable display name from a source filename.
pub fn display_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().replace(['_', '-'], " "))
        .unwrap_or_else(|| "unnamed".to_string())
}

// ============================================================================
// Single-file conversion
// ============================================================================

/// Convert one model JSON file to a header in `output_dir`.
///
/// The emitted header is verified against the source document before being
/// reported as success; a discrepancy is a fatal conversion error here
/// because it means the emitter itself misbehaved.
pub fn convert_model_file(
    input: &Path,
    output_dir: &Path,
    options: &ConvertOptions,
) -> Result<PathBuf> {
    let model = parse_model_file(input)?;
    validate_model(&model)?;

    let identifier = sanitize_identifier(input);
    let header = generate_model_header(&model, &identifier);

    let report = verify_model_against_header(&model, &header, DEFAULT_TOLERANCE)?;
    if !report.passed() {
        return Err(ConvertError::MalformedModel {
            reason: format!(
                "emitted header failed self-verification ({} mismatches)",
                report.mismatches.len()
            ),
        });
    }

    let output_path = write_header(output_dir, &identifier, &header, options)?;
    info!(
        "converted model '{}' ({}-{}) -> {}",
        model.name,
        model.architecture.label(),
        model.hidden_size,
        output_path.display()
    );
    Ok(output_path)
}

/// Convert one WAV impulse response file to a header in `output_dir`.
pub fn convert_ir_file(
    input: &Path,
    output_dir: &Path,
    config: &IrConfig,
    options: &ConvertOptions,
) -> Result<PathBuf> {
    if !input.exists() {
        return Err(ConvertError::FileNotFound {
            path: input.display().to_string(),
        });
    }

    let bytes = fs::read(input)?;
    let audio = decode_wav(&bytes)?;
    let ir = process_ir(&audio, &display_name(input), config);

    if ir.original_frames > config.max_length {
        info!(
            "truncating IR from {} to {} samples",
            ir.original_frames, config.max_length
        );
    }

    let identifier = sanitize_identifier(input);
    let source_file = input
        .file_name()
        .unwrap_or(OsStr::new("unknown"))
        .to_string_lossy();
    let header = generate_ir_header(&ir, &identifier, &source_file);

    let output_path = write_header(output_dir, &identifier, &header, options)?;
    info!(
        "converted IR '{}' ({}Hz/{}ch -> {} samples) -> {}",
        ir.name,
        ir.original_rate,
        ir.original_channels,
        ir.samples.len(),
        output_path.display()
    );
    Ok(output_path)
}

fn write_header(
    output_dir: &Path,
    identifier: &str,
    header: &str,
    options: &ConvertOptions,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join(format!("{}.h", identifier));

    if output_path.exists() && !options.force {
        return Err(ConvertError::OutputExists {
            path: output_path.display().to_string(),
        });
    }

    fs::write(&output_path, header)?;
    Ok(output_path)
}

// ============================================================================
// Batch conversion
// ============================================================================

/// Kind of artifact a batch run produces, selecting the per-file converter
/// and the registry emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Model,
    Ir,
}

impl BatchKind {
    fn extension(&self) -> &'static str {
        match self {
            BatchKind::Model => "json",
            BatchKind::Ir => "wav",
        }
    }

    fn registry_file(&self) -> &'static str {
        match self {
            BatchKind::Model => "model_registry.h",
            BatchKind::Ir => "ir_registry.h",
        }
    }
}

/// List the matching input files in a directory (non-recursive, sorted).
pub fn batch_inputs(input_dir: &Path, kind: BatchKind) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(ConvertError::FileNotFound {
            path: input_dir.display().to_string(),
        });
    }

    let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .map(|ext| ext.eq_ignore_ascii_case(kind.extension()))
                .unwrap_or(false)
        })
        .collect();

    files.sort();
    Ok(files)
}

/// Convert every matching file in a directory.
///
/// Per-file errors are logged and counted; one bad file never aborts the
/// batch. With `emit_registry` a registry header aggregating the successful
/// conversions is written alongside the per-file headers.
pub fn run_batch(
    input_dir: &Path,
    output_dir: &Path,
    kind: BatchKind,
    config: &IrConfig,
    options: &ConvertOptions,
    emit_registry: bool,
) -> Result<BatchSummary> {
    let files = batch_inputs(input_dir, kind)?;
    if files.is_empty() {
        return Err(ConvertError::FileNotFound {
            path: format!(
                "no .{} files found in {}",
                kind.extension(),
                input_dir.display()
            ),
        });
    }

    let mut summary = BatchSummary {
        total: files.len(),
        ..Default::default()
    };

    for file in &files {
        let result = match kind {
            BatchKind::Model => convert_model_file(file, output_dir, options),
            BatchKind::Ir => convert_ir_file(file, output_dir, config, options),
        };
        match result {
            Ok(_) => {
                summary.converted += 1;
                summary.identifiers.push(sanitize_identifier(file));
            }
            Err(e) => warn!("skipping {}: {}", file.display(), e),
        }
    }

    if emit_registry && !summary.identifiers.is_empty() {
        let registry = match kind {
            BatchKind::Model => generate_model_registry(&summary.identifiers),
            BatchKind::Ir => generate_ir_registry(&summary.identifiers),
        };
        let registry_path = output_dir.join(kind.registry_file());
        fs::write(&registry_path, registry)?;
        info!("wrote registry: {}", registry_path.display());
    }

    Ok(summary)
}
