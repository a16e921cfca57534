//! HTTP Handlers

mod keys;
mod ping;
mod synthesis;

pub use keys::*;
pub use ping::*;
pub use synthesis::*;
