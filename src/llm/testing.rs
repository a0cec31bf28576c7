//! Test doubles shared by the chat, parser and route tests.

use crate::error::LlmError;
use crate::llm::{ChatOptions, ChatTransport, Message};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replays canned replies in order; once the script runs out every call
/// times out.
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<Value, LlmError>>>,
    calls: AtomicU32,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedTransport {
    pub fn new(replies: Vec<Result<Value, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicU32::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    /// Answers every call with the same reply.
    pub fn repeating(reply: Value, times: usize) -> Arc<Self> {
        Self::new(vec![reply; times].into_iter().map(Ok).collect())
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<Vec<Message>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn send(
        &self,
        messages: &[Message],
        _options: &ChatOptions,
        timeout: Duration,
    ) -> Result<Value, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(messages.to_vec());
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or(Err(LlmError::Timeout {
            after_ms: timeout.as_millis() as u64,
        }))
    }
}

/// Wraps recipe JSON the way the provider does: as a string in the first
/// choice's message content.
pub fn provider_reply(recipe: Value) -> Value {
    json!({
        "id": "gen-test",
        "choices": [{
            "message": {"role": "assistant", "content": recipe.to_string()}
        }]
    })
}

pub fn recipe_reply() -> Value {
    provider_reply(json!({
        "title": "Simple Pancakes",
        "recipe_data": {
            "ingredients": [
                {"name": "eggs", "amount": 2, "unit": "piece"},
                {"name": "flour", "amount": 1, "unit": "cup"}
            ],
            "steps": [
                {"description": "Mix the eggs and flour"},
                {"description": "Bake until golden"}
            ]
        }
    }))
}
