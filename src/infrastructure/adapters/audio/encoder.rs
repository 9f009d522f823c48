//! 编码输出：16-bit PCM WAV 与 Ogg/Opus（CBR）
//!
//! 两种 sink 都支持分块写入，拼接时按播放顺序逐段推送 PCM

use ogg::writing::PacketWriter;
use ogg::PacketWriteEndInfo;
use opus::{Application, Bitrate, Channels, Encoder};

use crate::application::ports::{AudioError, AudioFormat, OutputSpec};

const WAV_HEADER_LEN: usize = 44;

/// 交错 i16 PCM 的编码目标
pub trait PcmSink {
    /// 追加交错样本
    fn write(&mut self, samples: &[i16]) -> Result<(), AudioError>;

    /// 结束编码并返回完整文件
    fn finish(self: Box<Self>) -> Result<Vec<u8>, AudioError>;
}

/// 根据输出规格创建 sink
pub fn create_sink(spec: &OutputSpec) -> Result<Box<dyn PcmSink>, AudioError> {
    match spec.format {
        AudioFormat::Wav => Ok(Box::new(WavSink::new(spec.sample_rate, spec.channels))),
        AudioFormat::Opus => Ok(Box::new(OpusSink::new(
            spec.sample_rate,
            spec.channels,
            spec.bitrate,
        )?)),
    }
}

/// 获取 Opus 兼容的采样率
pub fn opus_compatible_sample_rate(sample_rate: u32) -> u32 {
    // Opus 支持: 8000, 12000, 16000, 24000, 48000
    match sample_rate {
        8000 | 12000 | 16000 | 24000 | 48000 => sample_rate,
        r if r <= 8000 => 8000,
        r if r <= 12000 => 12000,
        r if r <= 16000 => 16000,
        r if r <= 24000 => 24000,
        _ => 48000,
    }
}

// ============================================================================
// WAV
// ============================================================================

/// WAV sink，写完后回填 RIFF / data 长度
pub struct WavSink {
    buffer: Vec<u8>,
}

impl WavSink {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        let bits_per_sample: u16 = 16;
        let byte_rate = sample_rate * channels as u32 * (bits_per_sample / 8) as u32;
        let block_align = channels * (bits_per_sample / 8);

        let mut buffer = Vec::with_capacity(WAV_HEADER_LEN);

        // RIFF header（长度在 finish 中回填）
        buffer.extend_from_slice(b"RIFF");
        buffer.extend_from_slice(&0u32.to_le_bytes());
        buffer.extend_from_slice(b"WAVE");

        // fmt chunk
        buffer.extend_from_slice(b"fmt ");
        buffer.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buffer.extend_from_slice(&1u16.to_le_bytes()); // PCM format
        buffer.extend_from_slice(&channels.to_le_bytes());
        buffer.extend_from_slice(&sample_rate.to_le_bytes());
        buffer.extend_from_slice(&byte_rate.to_le_bytes());
        buffer.extend_from_slice(&block_align.to_le_bytes());
        buffer.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buffer.extend_from_slice(b"data");
        buffer.extend_from_slice(&0u32.to_le_bytes());

        Self { buffer }
    }
}

impl PcmSink for WavSink {
    fn write(&mut self, samples: &[i16]) -> Result<(), AudioError> {
        self.buffer.reserve(samples.len() * 2);
        for sample in samples {
            self.buffer.extend_from_slice(&sample.to_le_bytes());
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Vec<u8>, AudioError> {
        let mut buffer = self.buffer;
        let data_size = u32::try_from(buffer.len() - WAV_HEADER_LEN)
            .ok()
            .filter(|size| *size <= u32::MAX - 36)
            .ok_or_else(|| AudioError::EncodingError("WAV data exceeds 4 GiB".to_string()))?;
        let file_size = data_size + 36;

        buffer[4..8].copy_from_slice(&file_size.to_le_bytes());
        buffer[40..44].copy_from_slice(&data_size.to_le_bytes());
        Ok(buffer)
    }
}

/// 一次性编码 WAV
pub fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Result<Vec<u8>, AudioError> {
    let mut sink = Box::new(WavSink::new(sample_rate, channels));
    sink.write(samples)?;
    sink.finish()
}

// ============================================================================
// Opus
// ============================================================================

/// Ogg/Opus sink（固定码率，20ms 帧）
pub struct OpusSink {
    encoder: Encoder,
    writer: PacketWriter<'static, Vec<u8>>,
    pending: Vec<i16>,
    samples_per_frame: usize,
    frame_granule: u64,
    granule_pos: u64,
    pre_skip: u16,
    output_buf: Vec<u8>,
}

impl OpusSink {
    pub fn new(sample_rate: u32, channels: u16, bitrate: u32) -> Result<Self, AudioError> {
        if opus_compatible_sample_rate(sample_rate) != sample_rate {
            return Err(AudioError::EncodingError(format!(
                "Sample rate {} is not supported by Opus",
                sample_rate
            )));
        }

        // Opus 仅支持单声道或立体声
        let opus_channels = match channels {
            1 => Channels::Mono,
            2 => Channels::Stereo,
            n => {
                return Err(AudioError::EncodingError(format!(
                    "Opus supports 1 or 2 channels, got {}",
                    n
                )))
            }
        };

        let mut encoder = Encoder::new(sample_rate, opus_channels, Application::Audio).map_err(|e| {
            AudioError::EncodingError(format!("Failed to create Opus encoder: {}", e))
        })?;

        encoder
            .set_bitrate(Bitrate::Bits(bitrate as i32))
            .map_err(|e| AudioError::EncodingError(format!("Failed to set bitrate: {}", e)))?;
        encoder
            .set_vbr(false)
            .map_err(|e| AudioError::EncodingError(format!("Failed to disable VBR: {}", e)))?;

        // 编码器延迟 (lookahead) 作为 pre-skip
        let pre_skip = encoder.get_lookahead().map(|l| l as u16).unwrap_or(312);

        let frame_size = (sample_rate as usize * 20) / 1000;
        let samples_per_frame = frame_size * channels as usize;

        // granule position 以 48kHz 计
        let granule_scale = 48000.0 / sample_rate as f64;
        let frame_granule = (frame_size as f64 * granule_scale) as u64;
        let pre_skip_48k = (pre_skip as f64 * granule_scale) as u64;

        let mut writer = PacketWriter::new(Vec::new());
        writer
            .write_packet(
                opus_head(channels as u8, sample_rate, pre_skip),
                0,
                PacketWriteEndInfo::EndPage,
                0,
            )
            .map_err(|e| AudioError::EncodingError(format!("Failed to write Opus head: {}", e)))?;
        writer
            .write_packet(opus_tags(), 0, PacketWriteEndInfo::EndPage, 0)
            .map_err(|e| AudioError::EncodingError(format!("Failed to write Opus tags: {}", e)))?;

        Ok(Self {
            encoder,
            writer,
            pending: Vec::with_capacity(samples_per_frame),
            samples_per_frame,
            frame_granule,
            granule_pos: pre_skip_48k,
            pre_skip,
            output_buf: vec![0u8; 4000], // Opus 最大包大小
        })
    }

    fn encode_frame(&mut self, frame: &[i16], end_info: PacketWriteEndInfo) -> Result<(), AudioError> {
        let encoded_len = self
            .encoder
            .encode(frame, &mut self.output_buf)
            .map_err(|e| AudioError::EncodingError(format!("Opus encode failed: {}", e)))?;

        self.granule_pos += self.frame_granule;

        self.writer
            .write_packet(
                self.output_buf[..encoded_len].to_vec(),
                0,
                end_info,
                self.granule_pos,
            )
            .map_err(|e| AudioError::EncodingError(format!("Failed to write Opus packet: {}", e)))
    }
}

impl PcmSink for OpusSink {
    fn write(&mut self, samples: &[i16]) -> Result<(), AudioError> {
        let mut input = samples;

        // 先补齐上次剩余的不完整帧
        if !self.pending.is_empty() {
            let take = (self.samples_per_frame - self.pending.len()).min(input.len());
            self.pending.extend_from_slice(&input[..take]);
            input = &input[take..];
            if self.pending.len() < self.samples_per_frame {
                return Ok(());
            }
            let frame = std::mem::take(&mut self.pending);
            self.encode_frame(&frame, PacketWriteEndInfo::NormalPacket)?;
        }

        let mut frames = input.chunks_exact(self.samples_per_frame);
        for frame in &mut frames {
            self.encode_frame(frame, PacketWriteEndInfo::NormalPacket)?;
        }
        self.pending.extend_from_slice(frames.remainder());
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<Vec<u8>, AudioError> {
        // 最后一帧不完整时用零填充
        if !self.pending.is_empty() {
            let mut frame = std::mem::take(&mut self.pending);
            frame.resize(self.samples_per_frame, 0);
            self.encode_frame(&frame, PacketWriteEndInfo::NormalPacket)?;
        }

        // 刷新编码器缓冲区中剩余的样本，最后一个包结束流
        let flush_frames =
            ((self.pre_skip as usize + self.samples_per_frame - 1) / self.samples_per_frame).max(1);
        let silence_frame = vec![0i16; self.samples_per_frame];
        for flush_idx in 0..flush_frames {
            let end_info = if flush_idx == flush_frames - 1 {
                PacketWriteEndInfo::EndStream
            } else {
                PacketWriteEndInfo::NormalPacket
            };
            self.encode_frame(&silence_frame, end_info)?;
        }

        let OpusSink { writer, .. } = *self;
        Ok(writer.into_inner())
    }
}

/// Opus Head 包 (RFC 7845)
fn opus_head(channels: u8, sample_rate: u32, pre_skip: u16) -> Vec<u8> {
    let mut head = Vec::with_capacity(19);
    head.extend_from_slice(b"OpusHead");
    head.push(1); // Version
    head.push(channels);
    head.extend_from_slice(&pre_skip.to_le_bytes());
    head.extend_from_slice(&sample_rate.to_le_bytes());
    head.extend_from_slice(&0i16.to_le_bytes()); // Output gain
    head.push(0); // Channel mapping family
    head
}

/// Opus Tags 包
fn opus_tags() -> Vec<u8> {
    let vendor = "dora";
    let mut tags = Vec::new();
    tags.extend_from_slice(b"OpusTags");
    tags.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    tags.extend_from_slice(vendor.as_bytes());
    tags.extend_from_slice(&0u32.to_le_bytes()); // No user comments
    tags
}
