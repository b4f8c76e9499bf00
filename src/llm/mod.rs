//! LLM integration for the chat assistant.
//!
//! Defines the `ChatModel` trait and provides implementations for
//! the OpenAI Chat Completions API and the Anthropic Messages API.

pub mod anthropic;
pub mod openai;

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::config::{AppConfig, LlmConfig};
use crate::types::ChatMessage;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiClient;

/// Abstraction over conversational LLM providers.
///
/// Implementors send a system prompt plus the running conversation and
/// return the assistant's reply text. One request per call; callers
/// decide how to surface failures.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Complete the conversation with one assistant turn.
    async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String>;

    /// Model identifier string.
    fn model_name(&self) -> &str;
}

/// Build the configured provider.
pub fn build_model(cfg: &LlmConfig) -> Result<Arc<dyn ChatModel>> {
    let api_key = AppConfig::resolve_env(&cfg.api_key_env)?;
    let model = Some(cfg.model.clone());

    match cfg.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiClient::new(
            api_key,
            model,
            Some(cfg.max_tokens),
            Some(cfg.temperature),
        )?)),
        "anthropic" => Ok(Arc::new(AnthropicClient::new(
            api_key,
            model,
            Some(cfg.max_tokens),
            Some(cfg.temperature),
        )?)),
        other => bail!("Unknown LLM provider: {other}"),
    }
}
