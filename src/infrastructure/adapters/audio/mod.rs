//! Audio Adapter - 解码、静音生成、拼接与编码

pub mod assembler;
pub mod encoder;
pub mod pcm;
pub mod silence;

pub use assembler::PcmAudioAssembler;
pub use encoder::encode_wav;
pub use silence::{PcmSilenceSynthesizer, MAX_SILENCE_SECS};
