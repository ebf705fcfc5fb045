//! Hand-rolled RIFF/WAVE decoder
//!
//! Decodes a WAV byte stream into (sample rate, channel count, interleaved
//! f32 samples) without an external codec: IR source files come from many
//! different capture tools and the converter must control exactly which
//! container quirks are tolerated.
//!
//! Supported sample encodings: 16-bit PCM, 24-bit PCM, 32-bit integer PCM,
//! and 32-bit IEEE float. The `audio_format` tag from `fmt ` disambiguates
//! 32-bit integer from float; `WAVE_FORMAT_EXTENSIBLE` 32-bit is treated as
//! float.

use crate::error::{ConvertError, Result};

/// PCM integer format tag
const FORMAT_PCM: u16 = 1;
/// IEEE float format tag
const FORMAT_IEEE_FLOAT: u16 = 3;
/// Extensible format tag (actual format lives in a sub-chunk we don't parse)
const FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Decoded WAV audio: raw interleaved samples plus stream parameters.
#[derive(Debug, Clone)]
pub struct WavAudio {
    /// Source sample rate in Hz
    pub sample_rate: u32,
    /// Channel count (samples are interleaved per frame)
    pub channels: u16,
    /// Interleaved samples scaled to [-1, 1]
    pub samples: Vec<f32>,
}

impl WavAudio {
    /// Number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }
}

/// Fields extracted from the `fmt ` chunk
struct FmtChunk {
    audio_format: u16,
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

/// Decode a complete WAV byte stream.
///
/// Validates the `RIFF`/`WAVE` magic, then scans chunk headers (4-byte id,
/// 4-byte little-endian length) until both `fmt ` and `data` are found.
/// Unknown chunks are skipped by length; chunk bodies are padded to even
/// offsets per RIFF.
///
/// # Errors
/// * `InvalidContainer` - Missing magic, truncated chunks, or missing
///   `fmt `/`data`
/// * `UnsupportedBitDepth` - Bit depths other than 16/24/32
pub fn decode_wav(bytes: &[u8]) -> Result<WavAudio> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(ConvertError::InvalidContainer {
            reason: "missing RIFF/WAVE magic".to_string(),
        });
    }

    let mut fmt: Option<FmtChunk> = None;
    let mut data: Option<&[u8]> = None;
    let mut pos = 12;

    while pos + 8 <= bytes.len() {
        let chunk_id = &bytes[pos..pos + 4];
        let chunk_size = read_u32(bytes, pos + 4) as usize;
        let body_start = pos + 8;
        let body_end = body_start + chunk_size;

        if body_end > bytes.len() {
            return Err(ConvertError::InvalidContainer {
                reason: format!(
                    "chunk '{}' overruns file ({} of {} bytes)",
                    String::from_utf8_lossy(chunk_id),
                    body_end,
                    bytes.len()
                ),
            });
        }

        let body = &bytes[body_start..body_end];
        match chunk_id {
            b"fmt " => fmt = Some(parse_fmt(body)?),
            b"data" => data = Some(body),
            _ => {} // skip unknown chunk
        }

        // RIFF chunks are word-aligned: odd sizes carry a pad byte
        pos = body_end + (chunk_size & 1);
    }

    let fmt = fmt.ok_or_else(|| ConvertError::InvalidContainer {
        reason: "missing 'fmt ' chunk".to_string(),
    })?;
    let data = data.ok_or_else(|| ConvertError::InvalidContainer {
        reason: "missing 'data' chunk".to_string(),
    })?;

    let samples = decode_samples(data, &fmt)?;

    Ok(WavAudio {
        sample_rate: fmt.sample_rate,
        channels: fmt.channels,
        samples,
    })
}

fn parse_fmt(body: &[u8]) -> Result<FmtChunk> {
    if body.len() < 16 {
        return Err(ConvertError::InvalidContainer {
            reason: format!("'fmt ' chunk too short: {} bytes", body.len()),
        });
    }

    Ok(FmtChunk {
        audio_format: read_u16(body, 0),
        channels: read_u16(body, 2),
        sample_rate: read_u32(body, 4),
        bits_per_sample: read_u16(body, 14),
    })
}

/// Decode raw `data` chunk bytes into f32 samples in [-1, 1].
fn decode_samples(data: &[u8], fmt: &FmtChunk) -> Result<Vec<f32>> {
    match fmt.bits_per_sample {
        16 => Ok(data
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]) as f32 / 32768.0)
            .collect()),
        24 => Ok(data
            .chunks_exact(3)
            .map(|b| {
                // Sign-extend the 3-byte little-endian integer
                let ext = if b[2] & 0x80 != 0 { 0xFF } else { 0x00 };
                let v = i32::from_le_bytes([b[0], b[1], b[2], ext]);
                v as f32 / 8388608.0
            })
            .collect()),
        32 => match fmt.audio_format {
            FORMAT_PCM => Ok(data
                .chunks_exact(4)
                .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f32 / 2147483648.0)
                .collect()),
            // Extensible files in the wild carrying 32-bit samples are
            // float in practice; the sub-format GUID is not parsed.
            FORMAT_IEEE_FLOAT | FORMAT_EXTENSIBLE => Ok(data
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect()),
            other => Err(ConvertError::InvalidContainer {
                reason: format!("unknown audio format tag {} for 32-bit samples", other),
            }),
        },
        bits => Err(ConvertError::UnsupportedBitDepth { bits }),
    }
}

#[inline]
fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

#[inline]
fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a minimal WAV byte stream by hand
    fn build_wav(format: u16, channels: u16, rate: u32, bits: u16, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&((36 + data.len()) as u32).to_le_bytes());
        out.extend_from_slice(b"WAVE");

        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&format.to_le_bytes());
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&rate.to_le_bytes());
        let byte_rate = rate * channels as u32 * bits as u32 / 8;
        out.extend_from_slice(&byte_rate.to_le_bytes());
        out.extend_from_slice(&(channels * bits / 8).to_le_bytes());
        out.extend_from_slice(&bits.to_le_bytes());

        out.extend_from_slice(b"data");
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(data);
        out
    }

    #[test]
    fn test_decode_16bit_mono() {
        let mut data = Vec::new();
        for v in [0i16, 16384, -16384, 32767, -32768] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let wav = build_wav(FORMAT_PCM, 1, 44100, 16, &data);

        let audio = decode_wav(&wav).unwrap();
        assert_eq!(audio.sample_rate, 44100);
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.samples.len(), 5);
        assert_eq!(audio.samples[0], 0.0);
        assert!((audio.samples[1] - 0.5).abs() < 1e-6);
        assert!((audio.samples[2] + 0.5).abs() < 1e-6);
        assert_eq!(audio.samples[4], -1.0);
    }

    #[test]
    fn test_decode_24bit_sign_extension() {
        // +0x400000 -> 0.5, -0x400000 -> -0.5
        let data = [0x00, 0x00, 0x40, 0x00, 0x00, 0xC0];
        let wav = build_wav(FORMAT_PCM, 1, 48000, 24, &data);

        let audio = decode_wav(&wav).unwrap();
        assert_eq!(audio.samples.len(), 2);
        assert!((audio.samples[0] - 0.5).abs() < 1e-6);
        assert!((audio.samples[1] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_decode_32bit_float() {
        let mut data = Vec::new();
        for v in [0.25f32, -0.75f32] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let wav = build_wav(FORMAT_IEEE_FLOAT, 1, 48000, 32, &data);

        let audio = decode_wav(&wav).unwrap();
        assert_eq!(audio.samples, vec![0.25, -0.75]);
    }

    #[test]
    fn test_decode_32bit_int_pcm() {
        let mut data = Vec::new();
        data.extend_from_slice(&(1i32 << 30).to_le_bytes());
        let wav = build_wav(FORMAT_PCM, 1, 48000, 32, &data);

        let audio = decode_wav(&wav).unwrap();
        assert!((audio.samples[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_decode_stereo_frames() {
        let mut data = Vec::new();
        for v in [100i16, -100, 200, -200] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let wav = build_wav(FORMAT_PCM, 2, 44100, 16, &data);

        let audio = decode_wav(&wav).unwrap();
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.frames(), 2);
    }

    #[test]
    fn test_skips_unknown_chunks() {
        // Insert a LIST chunk between fmt and data
        let mut data = Vec::new();
        data.extend_from_slice(&1000i16.to_le_bytes());
        let mut wav = build_wav(FORMAT_PCM, 1, 44100, 16, &data);

        // Splice a LIST chunk before the data chunk (data chunk is the
        // final 8 + 2 bytes)
        let data_chunk_start = wav.len() - 10;
        let mut list = Vec::new();
        list.extend_from_slice(b"LIST");
        list.extend_from_slice(&4u32.to_le_bytes());
        list.extend_from_slice(b"INFO");
        wav.splice(data_chunk_start..data_chunk_start, list);

        let audio = decode_wav(&wav).unwrap();
        assert_eq!(audio.samples.len(), 1);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let err = decode_wav(b"RIFX....WAVE").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONTAINER");
    }

    #[test]
    fn test_rejects_missing_data_chunk() {
        let wav = build_wav(FORMAT_PCM, 1, 44100, 16, &[]);
        // Chop off the data chunk entirely
        let truncated = &wav[..wav.len() - 8];
        let err = decode_wav(truncated).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONTAINER");
    }

    #[test]
    fn test_rejects_unsupported_bit_depth() {
        let wav = build_wav(FORMAT_PCM, 1, 44100, 8, &[0x80]);
        let err = decode_wav(&wav).unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_BIT_DEPTH");
    }

    #[test]
    fn test_rejects_overrunning_chunk() {
        let mut wav = build_wav(FORMAT_PCM, 1, 44100, 16, &[0, 0]);
        // Inflate the declared data chunk size past EOF
        let len = wav.len();
        wav[len - 6..len - 2].copy_from_slice(&9999u32.to_le_bytes());
        assert!(decode_wav(&wav).is_err());
    }
}
