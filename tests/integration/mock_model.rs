//! Mock chat model for integration testing.
//!
//! Returns a scripted reply and records every call, so tests can
//! assert on the exact prompt the assistant assembled. All state is
//! in-memory with no external dependencies.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use fpl_assistant::llm::ChatModel;
use fpl_assistant::types::ChatMessage;

/// One recorded `complete` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub messages: Vec<ChatMessage>,
}

pub struct MockModel {
    reply: String,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    /// If set, all completions return this error.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockModel {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Force all subsequent completions to fail.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Handle for inspecting calls after the model is moved into
    /// an assistant.
    pub fn call_log(&self) -> Arc<Mutex<Vec<RecordedCall>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ChatModel for MockModel {
    async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String> {
        if let Some(msg) = self.force_error.lock().unwrap().clone() {
            return Err(anyhow!("{msg}"));
        }

        self.calls.lock().unwrap().push(RecordedCall {
            system: system.to_string(),
            messages: messages.to_vec(),
        });
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
