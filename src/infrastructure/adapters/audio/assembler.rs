//! PCM Audio Assembler
//!
//! 拼接步骤：
//! 1. 按 index 排序语音段
//! 2. 生成交错序列 seg0, silence, seg1, ..., seg(n-1)
//! 3. 逐项解码、归一化到统一采样率与声道，推入编码 sink
//!
//! 解码与编码是 CPU 密集操作，在 spawn_blocking 中执行

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::ports::{
    AudioAssemblerPort, AudioError, AudioFormat, AudioSegment, MeditationArtifact, OutputSpec,
    SilenceClip,
};
use crate::domain::meditation::{interleave, PlaybackItem};

use super::encoder::{create_sink, opus_compatible_sample_rate};
use super::pcm::{decode, normalize, to_i16};

/// 音频拼接器
pub struct PcmAudioAssembler {
    spec: OutputSpec,
}

impl PcmAudioAssembler {
    /// 创建拼接器，Opus 输出时采样率与声道会被调整为编码器支持的值
    pub fn new(spec: OutputSpec) -> Self {
        let spec = match spec.format {
            AudioFormat::Wav => spec,
            AudioFormat::Opus => OutputSpec {
                sample_rate: opus_compatible_sample_rate(spec.sample_rate),
                channels: spec.channels.clamp(1, 2),
                ..spec
            },
        };
        Self { spec }
    }

    /// 实际使用的输出规格
    pub fn output_spec(&self) -> OutputSpec {
        self.spec
    }

    fn assemble_blocking(
        spec: OutputSpec,
        mut segments: Vec<AudioSegment>,
        silence: &SilenceClip,
    ) -> Result<MeditationArtifact, AudioError> {
        if segments.is_empty() {
            return Err(AudioError::InvalidInput("No audio segments".to_string()));
        }

        segments.sort_by_key(|segment| segment.index);

        let silence_pcm = decode(&silence.data)
            .map_err(|e| AudioError::DecodingError(format!("Silence clip: {}", e)))?;
        let silence_samples = to_i16(&normalize(silence_pcm, spec.sample_rate, spec.channels));

        let mut sink = create_sink(&spec)?;
        let mut total_samples: usize = 0;

        for item in interleave(segments.len()) {
            match item {
                PlaybackItem::Segment(position) => {
                    let segment = &segments[position];
                    let pcm = decode(&segment.data).map_err(|e| {
                        AudioError::DecodingError(format!("Segment {}: {}", segment.index, e))
                    })?;
                    let samples = to_i16(&normalize(pcm, spec.sample_rate, spec.channels));
                    sink.write(&samples)?;
                    total_samples += samples.len();
                }
                PlaybackItem::Silence => {
                    sink.write(&silence_samples)?;
                    total_samples += silence_samples.len();
                }
            }
        }

        let data = sink.finish()?;
        let frames = (total_samples / spec.channels.max(1) as usize) as u64;
        let duration_ms = frames * 1000 / spec.sample_rate.max(1) as u64;

        Ok(MeditationArtifact {
            data,
            format: spec.format,
            duration_ms,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }
}

impl Default for PcmAudioAssembler {
    fn default() -> Self {
        Self::new(OutputSpec::default())
    }
}

#[async_trait]
impl AudioAssemblerPort for PcmAudioAssembler {
    async fn assemble(
        &self,
        segments: Vec<AudioSegment>,
        silence: Arc<SilenceClip>,
    ) -> Result<MeditationArtifact, AudioError> {
        let spec = self.spec;
        let segment_count = segments.len();

        let artifact = tokio::task::spawn_blocking(move || {
            Self::assemble_blocking(spec, segments, &silence)
        })
        .await
        .map_err(|e| AudioError::TaskError(format!("Assembly task failed: {}", e)))??;

        tracing::info!(
            segments = segment_count,
            format = %artifact.format,
            duration_ms = artifact.duration_ms,
            size = artifact.data.len(),
            "Audio assembled"
        );

        Ok(artifact)
    }

    fn output_format(&self) -> AudioFormat {
        self.spec.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::SilenceSynthesizerPort;
    use crate::infrastructure::adapters::audio::encoder::encode_wav;
    use crate::infrastructure::adapters::audio::silence::PcmSilenceSynthesizer;

    const RATE: u32 = 8000;

    /// 生成恒定电平的单声道段，便于在输出中识别顺序
    fn level_segment(index: usize, level: i16, frames: usize) -> AudioSegment {
        AudioSegment {
            index,
            data: encode_wav(&vec![level; frames], RATE, 1).unwrap(),
        }
    }

    fn wav_spec() -> OutputSpec {
        OutputSpec {
            format: AudioFormat::Wav,
            sample_rate: RATE,
            channels: 1,
            bitrate: 0,
        }
    }

    #[tokio::test]
    async fn test_assembly_preserves_index_order() {
        let assembler = PcmAudioAssembler::new(wav_spec());
        let silence = PcmSilenceSynthesizer::new(RATE, 1).generate_silence(0.1).unwrap();

        // 完成顺序 [2, 0, 1]
        let segments = vec![
            level_segment(2, 3000, 400),
            level_segment(0, 1000, 400),
            level_segment(1, 2000, 400),
        ];

        let artifact = assembler.assemble(segments, Arc::new(silence)).await.unwrap();
        let pcm = decode(&artifact.data).unwrap();
        let samples = to_i16(&pcm.samples);

        // 400 + 800 + 400 + 800 + 400
        assert_eq!(samples.len(), 2800);
        let level = |i: usize| samples[i];
        assert!(level(200) > 0 && level(200) < level(1400));
        assert_eq!(level(800), 0);
        assert!(level(1400) < level(2600));
        assert_eq!(level(2000), 0);
        assert_eq!(artifact.duration_ms, 350);
    }

    #[tokio::test]
    async fn test_assembly_normalizes_formats() {
        let assembler = PcmAudioAssembler::new(OutputSpec {
            format: AudioFormat::Wav,
            sample_rate: 16000,
            channels: 2,
            bitrate: 0,
        });
        let silence = PcmSilenceSynthesizer::new(16000, 2).generate_silence(1.0).unwrap();

        // 8kHz 单声道 0.5s → 16kHz 立体声
        let artifact = assembler
            .assemble(vec![level_segment(0, 500, 4000)], Arc::new(silence))
            .await
            .unwrap();

        let pcm = decode(&artifact.data).unwrap();
        assert_eq!(pcm.sample_rate, 16000);
        assert_eq!(pcm.channels, 2);
        assert_eq!(pcm.frames(), 8000);
        assert_eq!(artifact.duration_string(), "0:00");
    }

    #[tokio::test]
    async fn test_single_segment_has_no_silence() {
        let assembler = PcmAudioAssembler::new(wav_spec());
        let silence = PcmSilenceSynthesizer::new(RATE, 1).generate_silence(5.0).unwrap();

        let artifact = assembler
            .assemble(vec![level_segment(0, 1000, 800)], Arc::new(silence))
            .await
            .unwrap();
        assert_eq!(artifact.duration_ms, 100);
    }

    #[tokio::test]
    async fn test_empty_segments_fail() {
        let assembler = PcmAudioAssembler::default();
        let silence = PcmSilenceSynthesizer::default().generate_silence(1.0).unwrap();
        assert!(assembler.assemble(Vec::new(), Arc::new(silence)).await.is_err());
    }

    #[tokio::test]
    async fn test_unreadable_segment_fails() {
        let assembler = PcmAudioAssembler::new(wav_spec());
        let silence = PcmSilenceSynthesizer::new(RATE, 1).generate_silence(0.1).unwrap();
        let broken = AudioSegment {
            index: 0,
            data: b"not audio at all, just some bytes".to_vec(),
        };
        let err = assembler.assemble(vec![broken], Arc::new(silence)).await.unwrap_err();
        assert!(matches!(err, AudioError::DecodingError(_)));
    }

    #[test]
    fn test_opus_spec_is_adjusted() {
        let assembler = PcmAudioAssembler::new(OutputSpec {
            format: AudioFormat::Opus,
            sample_rate: 44100,
            channels: 2,
            bitrate: 192_000,
        });
        assert_eq!(assembler.output_spec().sample_rate, 48000);
        assert_eq!(assembler.output_format(), AudioFormat::Opus);
    }
}
