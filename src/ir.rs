//! Impulse response processing pipeline
//!
//! Turns decoded WAV audio into a fixed-size mono lookup array ready for
//! embedding: channel mixdown, resample to the target rate, peak
//! normalization, then truncation with a linear fade-out.
//!
//! The stage order is mandatory. Normalizing before truncation would let a
//! discarded tail's energy set the kept prefix's amplitude, and the fade
//! must apply only to the kept region.

use crate::resample::resample;
use crate::wav::WavAudio;

/// Processing limits for IR conversion.
///
/// Carried explicitly through the pipeline rather than read from module
/// globals so tests can exercise different limits.
#[derive(Debug, Clone, Copy)]
pub struct IrConfig {
    /// Sample rate every IR is converted to
    pub target_sample_rate: u32,
    /// Maximum embedded IR length in samples
    pub max_length: usize,
}

impl Default for IrConfig {
    fn default() -> Self {
        IrConfig {
            target_sample_rate: 48000,
            max_length: 2048,
        }
    }
}

/// A processed impulse response plus provenance for the generated header.
#[derive(Debug, Clone)]
pub struct ImpulseResponse {
    /// Display name (derived from the source filename)
    pub name: String,
    /// Sample rate of the processed data
    pub sample_rate: u32,
    /// Mono, normalized, length-bounded samples
    pub samples: Vec<f32>,
    /// Source sample rate before processing
    pub original_rate: u32,
    /// Source channel count before mixdown
    pub original_channels: u16,
    /// Source length in frames before resampling/truncation
    pub original_frames: usize,
}

/// Run the full IR pipeline: mixdown, resample, normalize, truncate.
pub fn process_ir(audio: &WavAudio, name: &str, config: &IrConfig) -> ImpulseResponse {
    let mono = mix_to_mono(&audio.samples, audio.channels as usize);
    let resampled = resample(&mono, audio.sample_rate, config.target_sample_rate);
    let normalized = normalize_peak(&resampled);
    let samples = truncate_with_fade(normalized, config.max_length);

    ImpulseResponse {
        name: name.to_string(),
        sample_rate: config.target_sample_rate,
        samples,
        original_rate: audio.sample_rate,
        original_channels: audio.channels,
        original_frames: audio.frames(),
    }
}

/// Mix interleaved multi-channel samples down to mono by arithmetic mean
/// across channels per frame.
pub fn mix_to_mono(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Scale samples so the maximum absolute value is 1.0.
///
/// An all-zero (silent) input is returned unchanged.
pub fn normalize_peak(samples: &[f32]) -> Vec<f32> {
    let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak > 0.0 {
        samples.iter().map(|s| s / peak).collect()
    } else {
        samples.to_vec()
    }
}

/// Truncate to `max_length` samples, applying a linear fade-out over the
/// final `min(64, max_length / 8)` kept samples so the cut point does not
/// produce an audible discontinuity.
///
/// Sequences already within the limit pass through untouched, fade included.
pub fn truncate_with_fade(mut samples: Vec<f32>, max_length: usize) -> Vec<f32> {
    if samples.len() <= max_length {
        return samples;
    }

    samples.truncate(max_length);
    let fade_len = 64.min(max_length / 8);
    for k in 0..fade_len {
        let fade = 1.0 - k as f32 / fade_len as f32;
        samples[max_length - fade_len + k] *= fade;
    }

    samples
}
