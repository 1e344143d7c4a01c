//! Dialogue provider adapters.

mod mock_provider;
mod openai_provider;

pub use mock_provider::MockDialogueProvider;
pub use openai_provider::{OpenAiConfig, OpenAiProvider};
