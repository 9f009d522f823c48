//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod audio;
pub mod identity;
pub mod storage;
pub mod text;
pub mod tts;

pub use audio::{PcmAudioAssembler, PcmSilenceSynthesizer};
pub use identity::HmacTokenIdentity;
pub use storage::{FileObjectStorage, UrlSigner};
pub use text::{AnthropicClient, FakeScriptClient, JobPollingScriptClient, OpenAiChatClient};
pub use tts::{ElevenLabsClient, FakeTtsClient, OpenAiTtsClient};
