//! CLI Module
//!
//! Command-line interface for the embedded weight/IR converter.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// embedgen - converts neural amp models and cabinet IRs to embeddable headers
#[derive(Parser, Debug)]
#[command(name = "embedgen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert AIDA-X model JSON files to constexpr headers
    #[command(name = "convert-model")]
    ConvertModel {
        /// Input JSON file, or directory with --batch
        input: PathBuf,

        /// Output directory
        #[arg(default_value = "embedded/models")]
        output_dir: PathBuf,

        /// Process all .json files in the input directory
        #[arg(long)]
        batch: bool,

        /// Emit a model_registry.h aggregating the batch (requires --batch)
        #[arg(long, requires = "batch")]
        registry: bool,

        /// Overwrite existing output files
        #[arg(short, long)]
        force: bool,
    },

    /// Convert WAV impulse responses to constexpr headers
    #[command(name = "convert-ir")]
    ConvertIr {
        /// Input WAV file, or directory with --batch
        input: PathBuf,

        /// Output directory
        #[arg(default_value = "embedded/irs")]
        output_dir: PathBuf,

        /// Process all .wav files in the input directory
        #[arg(long)]
        batch: bool,

        /// Emit an ir_registry.h aggregating the batch (requires --batch)
        #[arg(long, requires = "batch")]
        registry: bool,

        /// Overwrite existing output files
        #[arg(short, long)]
        force: bool,
    },

    /// Verify a generated header against its source model JSON
    #[command(name = "verify")]
    Verify {
        /// Source model JSON file
        model: PathBuf,

        /// Generated header file
        header: PathBuf,
    },

    /// Print the structure and sample values of a model JSON file
    #[command(name = "inspect")]
    Inspect {
        /// Model JSON file
        model: PathBuf,
    },

    /// Print reference LSTM outputs for cross-checking the embedded runtime
    #[command(name = "test-inference")]
    TestInference {
        /// Model JSON file
        model: PathBuf,
    },
}
