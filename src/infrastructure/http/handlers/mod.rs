//! HTTP Handlers

mod credits;
mod generate;
mod media;
mod meditations;
mod ping;

pub use credits::*;
pub use generate::*;
pub use media::*;
pub use meditations::*;
pub use ping::*;
