//! Sample rate conversion
//!
//! Linear-interpolation resampling. Deterministic and cheap; kept as the
//! canonical reference so converted IR data is reproducible bit-for-bit
//! across runs and platforms.

/// Resample a mono sequence from `source_rate` to `target_rate`.
///
/// Equal rates return the input unchanged. Otherwise the output has
/// `floor(len * target / source)` samples; output index `i` maps to source
/// position `i * source / target` and interpolates linearly between the two
/// neighboring samples (holding the last sample, then zero, past the end).
///
/// # Arguments
/// * `samples` - Source samples
/// * `source_rate` - Source sample rate in Hz
/// * `target_rate` - Target sample rate in Hz
pub fn resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate {
        return samples.to_vec();
    }
    if samples.is_empty() {
        return Vec::new();
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let target_len = (samples.len() as f64 * ratio) as usize;
    let mut output = Vec::with_capacity(target_len);

    for i in 0..target_len {
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos.floor() as usize;
        let frac = (src_pos - src_idx as f64) as f32;

        let sample = if src_idx + 1 < samples.len() {
            samples[src_idx] * (1.0 - frac) + samples[src_idx + 1] * frac
        } else if src_idx < samples.len() {
            samples[src_idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_resample_identity() {
        let samples = vec![0.1, -0.2, 0.3, -0.4];
        assert_eq!(resample(&samples, 48000, 48000), samples);
    }

    #[test]
    fn test_resample_length_formula() {
        // floor(100 * 48000 / 44100) = 108
        let samples = vec![0.0; 100];
        assert_eq!(resample(&samples, 44100, 48000).len(), 108);

        // floor(100 * 44100 / 48000) = 91
        assert_eq!(resample(&samples, 48000, 44100).len(), 91);
    }

    #[test]
    fn test_resample_upsample_interpolates() {
        let samples = vec![0.0, 1.0, 0.0];
        let out = resample(&samples, 24000, 48000);
        assert_eq!(out.len(), 6);
        // Index 1 falls halfway between source samples 0 and 1
        assert_abs_diff_eq!(out[1], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(out[2], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_resample_downsample() {
        let samples = vec![0.0, 0.5, 1.0, 0.5, 0.0, -0.5, -1.0, -0.5];
        let out = resample(&samples, 48000, 24000);
        assert_eq!(out.len(), 4);
        // Even source indices land exactly
        assert_abs_diff_eq!(out[1], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out[3], -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_resample_tail_holds_last_sample() {
        let samples = vec![0.0, 0.0, 1.0];
        let out = resample(&samples, 24000, 48000);
        // Last output positions interpolate toward, then hold, the final
        // source sample rather than reading past the end
        assert_eq!(out.len(), 6);
        assert_abs_diff_eq!(out[4], 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(out[5], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_resample_empty() {
        assert!(resample(&[], 44100, 48000).is_empty());
    }

    #[test]
    fn test_resample_deterministic() {
        let samples: Vec<f32> = (0..500).map(|i| ((i as f32) * 0.1).sin()).collect();
        let a = resample(&samples, 44100, 48000);
        let b = resample(&samples, 44100, 48000);
        assert_eq!(a, b);
    }
}
