//! embedgen - Embedded Weight and IR Converter
//!
//! Converts externally-authored neural amp models (AIDA-X JSON) and cabinet
//! impulse response recordings (WAV) into constexpr C++ headers consumed at
//! build time by a resource-constrained target, and verifies that the
//! conversion preserved every value within floating-point tolerance.
//!
//! # Pipeline
//!
//! - JSON models: [`model`] parses and validates, [`tensor`] flattens the
//!   nested weight arrays, [`emit`] renders the header.
//! - WAV IRs: [`wav`] decodes the container, [`resample`] and [`ir`]
//!   produce a fixed-size normalized mono lookup array, [`emit`] renders
//!   the header.
//! - [`verify`] re-extracts tensors from both sides of a conversion and
//!   diffs them; [`lstm`] is the numeric oracle for cross-checking the
//!   embedded inference path.

pub mod cli;
pub mod convert;
pub mod emit;
pub mod error;
pub mod ir;
pub mod lstm;
pub mod model;
pub mod resample;
pub mod tensor;
pub mod verify;
pub mod wav;

pub use error::{ConvertError, Result};
