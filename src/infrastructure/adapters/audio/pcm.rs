//! PCM 工具：symphonia 解码、线性重采样、声道混合

use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::AudioError;

/// 解码后的交错 PCM
#[derive(Debug, Clone)]
pub struct PcmBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmBuffer {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }
}

/// 解码任意 symphonia 支持的容器（MP3 / WAV），格式由内容探测
pub fn decode(data: &[u8]) -> Result<PcmBuffer, AudioError> {
    if data.is_empty() {
        return Err(AudioError::InvalidInput("Empty audio data".to_string()));
    }

    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::DecodingError(format!("Probe failed: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| AudioError::DecodingError("No audio track found".to_string()))?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut channels = track.codec_params.channels.map(|c| c.count() as u16);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::DecodingError(format!("Decoder creation failed: {}", e)))?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(AudioError::DecodingError(format!(
                    "Packet read error: {}",
                    e
                )));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!("Decode error (skipping packet): {}", e);
                continue;
            }
        };

        let spec = *decoded.spec();
        sample_rate = Some(spec.rate);
        channels = Some(spec.channels.count() as u16);

        let num_frames = decoded.frames();
        let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        let actual_samples = num_frames * spec.channels.count();
        samples.extend(&sample_buf.samples()[..actual_samples]);
    }

    let sample_rate = sample_rate
        .filter(|r| *r > 0)
        .ok_or_else(|| AudioError::DecodingError("Unknown sample rate".to_string()))?;
    let channels = channels
        .filter(|c| *c > 0)
        .ok_or_else(|| AudioError::DecodingError("Unknown channel count".to_string()))?;

    Ok(PcmBuffer {
        samples,
        sample_rate,
        channels,
    })
}

/// 简单线性重采样
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32, channels: u16) -> Vec<f32> {
    if from_rate == to_rate || channels == 0 {
        return samples.to_vec();
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let channel_count = channels as usize;
    let frame_count = samples.len() / channel_count;
    if frame_count == 0 {
        return Vec::new();
    }

    let new_frame_count = (frame_count as f64 * ratio) as usize;
    let mut resampled = Vec::with_capacity(new_frame_count * channel_count);

    for i in 0..new_frame_count {
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos as usize;
        let frac = src_pos - src_idx as f64;

        for ch in 0..channel_count {
            let idx0 = src_idx * channel_count + ch;
            let idx1 = ((src_idx + 1).min(frame_count - 1)) * channel_count + ch;

            let s0 = samples.get(idx0).copied().unwrap_or(0.0);
            let s1 = samples.get(idx1).copied().unwrap_or(s0);

            // 线性插值
            resampled.push(s0 + (s1 - s0) * frac as f32);
        }
    }

    resampled
}

/// 声道混合
///
/// 单声道 → 多声道复制；多声道 → 单声道取平均；其余情况按声道位置截取
pub fn remix(samples: &[f32], from_channels: u16, to_channels: u16) -> Vec<f32> {
    if from_channels == to_channels || from_channels == 0 || to_channels == 0 {
        return samples.to_vec();
    }

    let from = from_channels as usize;
    let to = to_channels as usize;
    let frames = samples.len() / from;
    let mut mixed = Vec::with_capacity(frames * to);

    for frame in samples.chunks_exact(from) {
        if to == 1 {
            mixed.push(frame.iter().sum::<f32>() / from as f32);
        } else {
            for ch in 0..to {
                mixed.push(frame[ch.min(from - 1)]);
            }
        }
    }

    mixed
}

/// 归一化到目标采样率与声道数
pub fn normalize(pcm: PcmBuffer, sample_rate: u32, channels: u16) -> Vec<f32> {
    let mixed = if pcm.channels == channels {
        pcm.samples
    } else {
        remix(&pcm.samples, pcm.channels, channels)
    };
    if pcm.sample_rate == sample_rate {
        mixed
    } else {
        resample(&mixed, pcm.sample_rate, sample_rate, channels)
    }
}

/// f32 → i16
pub fn to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::audio::encoder::encode_wav;

    #[test]
    fn test_decode_wav() {
        let samples: Vec<i16> = (0..2400).map(|i| ((i % 100) * 100) as i16).collect();
        let wav = encode_wav(&samples, 24000, 1).unwrap();

        let pcm = decode(&wav).unwrap();
        assert_eq!(pcm.sample_rate, 24000);
        assert_eq!(pcm.channels, 1);
        assert_eq!(pcm.frames(), 2400);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode(b"definitely not audio data at all").is_err());
        assert!(matches!(decode(&[]), Err(AudioError::InvalidInput(_))));
    }

    #[test]
    fn test_resample_doubles_frames() {
        let samples = vec![0.0f32; 1000 * 2];
        let out = resample(&samples, 22050, 44100, 2);
        assert_eq!(out.len(), 2000 * 2);
    }

    #[test]
    fn test_resample_same_rate_is_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample(&samples, 44100, 44100, 1), samples);
    }

    #[test]
    fn test_remix_mono_to_stereo() {
        assert_eq!(remix(&[0.5, -0.5], 1, 2), vec![0.5, 0.5, -0.5, -0.5]);
    }

    #[test]
    fn test_remix_stereo_to_mono() {
        assert_eq!(remix(&[0.25, 0.75, -1.0, 1.0], 2, 1), vec![0.5, 0.0]);
    }

    #[test]
    fn test_to_i16_clamps() {
        assert_eq!(to_i16(&[2.0, -2.0, 0.0]), vec![32767, -32767, 0]);
    }
}
