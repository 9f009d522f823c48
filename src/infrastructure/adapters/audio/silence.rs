//! PCM Silence Synthesizer
//!
//! 生成全零样本的 WAV，同一时长输出字节完全一致

use crate::application::ports::{AudioError, OutputSpec, SilenceClip, SilenceSynthesizerPort};

use super::encoder::encode_wav;

/// 单段静音的最长时长（秒）
pub const MAX_SILENCE_SECS: f64 = 600.0;

/// 静音生成器
pub struct PcmSilenceSynthesizer {
    sample_rate: u32,
    channels: u16,
}

impl PcmSilenceSynthesizer {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// 与输出规格一致的静音（拼接时无需重采样）
    pub fn for_output(spec: &OutputSpec) -> Self {
        Self::new(spec.sample_rate, spec.channels)
    }
}

impl Default for PcmSilenceSynthesizer {
    fn default() -> Self {
        Self::for_output(&OutputSpec::default())
    }
}

impl SilenceSynthesizerPort for PcmSilenceSynthesizer {
    fn generate_silence(&self, duration_secs: f64) -> Result<SilenceClip, AudioError> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 || duration_secs > MAX_SILENCE_SECS {
            return Err(AudioError::InvalidInput(format!(
                "Silence duration must be within (0, {}] seconds, got {}",
                MAX_SILENCE_SECS, duration_secs
            )));
        }

        let frames = (duration_secs * self.sample_rate as f64).round() as usize;
        let samples = vec![0i16; frames * self.channels as usize];
        let data = encode_wav(&samples, self.sample_rate, self.channels)?;

        tracing::debug!(
            duration_secs = duration_secs,
            frames = frames,
            size = data.len(),
            "Silence generated"
        );

        Ok(SilenceClip {
            data,
            duration_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::audio::pcm::decode;

    #[test]
    fn test_silence_is_deterministic() {
        let synth = PcmSilenceSynthesizer::default();
        let a = synth.generate_silence(1.5).unwrap();
        let b = synth.generate_silence(1.5).unwrap();
        assert_eq!(a.data, b.data);
        assert_eq!(a.duration_secs, 1.5);
    }

    #[test]
    fn test_silence_has_expected_frames() {
        let synth = PcmSilenceSynthesizer::new(44100, 2);
        let clip = synth.generate_silence(2.0).unwrap();
        let pcm = decode(&clip.data).unwrap();

        assert_eq!(pcm.sample_rate, 44100);
        assert_eq!(pcm.channels, 2);
        assert_eq!(pcm.frames(), 88200);
        assert!(pcm.samples.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_invalid_durations_are_rejected() {
        let synth = PcmSilenceSynthesizer::default();
        for secs in [0.0, -1.0, f64::NAN, f64::INFINITY, MAX_SILENCE_SECS + 1.0] {
            assert!(synth.generate_silence(secs).is_err(), "{} should fail", secs);
        }
    }
}
