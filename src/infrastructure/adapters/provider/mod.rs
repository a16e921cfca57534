//! Provider Adapters - 语音合成服务商客户端

mod fake_provider_client;
mod http_provider_client;
mod wire;

pub use fake_provider_client::{FakeProviderClient, FakeProviderFactory};
pub use http_provider_client::*;
