//! Generator Adapter - 文本补全客户端实现

mod fake_generator;
mod openrouter_client;

pub use fake_generator::{FakeFailure, FakeJokeGenerator, FakeJokeGeneratorConfig};
pub use openrouter_client::*;
