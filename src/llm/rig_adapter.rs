//! Bridges rig's `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::OneOrMany;
use rig::completion::{AssistantContent, CompletionModel, Message};
use tracing::debug;

use crate::error::LlmError;
use crate::llm::provider::{ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, Role};

const PROVIDER: &str = "openai";

/// `LlmProvider` backed by any rig completion model.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(model: M, model_name: &str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
        }
    }
}

/// Chat messages reshaped for rig: system text becomes the preamble, the
/// last user message is the prompt, earlier ones become history.
#[derive(Debug)]
struct RigPrompt {
    preamble: Option<String>,
    history: Vec<String>,
    prompt: String,
}

fn split_messages(messages: Vec<ChatMessage>) -> Result<RigPrompt, LlmError> {
    let mut system = Vec::new();
    let mut user = Vec::new();
    for message in messages {
        match message.role {
            Role::System => system.push(message.content),
            Role::User => user.push(message.content),
        }
    }

    let prompt = user.pop().ok_or_else(|| LlmError::InvalidResponse {
        provider: PROVIDER.to_string(),
        reason: "completion request has no user message".to_string(),
    })?;

    Ok(RigPrompt {
        preamble: (!system.is_empty()).then(|| system.join("\n\n")),
        history: user,
        prompt,
    })
}

/// Concatenated text of the reply, or `None` when it carries no text.
fn extract_text(choice: &OneOrMany<AssistantContent>) -> Option<String> {
    let text: String = choice
        .iter()
        .filter_map(|content| match content {
            AssistantContent::Text(text) => Some(text.text.as_str()),
            _ => None,
        })
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Map a rig failure message onto our error taxonomy.
fn classify_failure(reason: String) -> LlmError {
    let lower = reason.to_lowercase();
    let auth = ["401", "403", "unauthorized", "invalid_api_key", "incorrect api key"]
        .iter()
        .any(|marker| lower.contains(marker));
    if auth {
        LlmError::AuthFailed {
            provider: PROVIDER.to_string(),
        }
    } else {
        LlmError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason,
        }
    }
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + Send + Sync + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let prompt = split_messages(request.messages)?;

        let mut builder = self.model.completion_request(Message::user(prompt.prompt));
        if let Some(preamble) = prompt.preamble {
            builder = builder.preamble(preamble);
        }
        if !prompt.history.is_empty() {
            builder = builder.messages(prompt.history.into_iter().map(Message::user).collect());
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }
        if let Some(max_tokens) = request.max_tokens {
            builder = builder.max_tokens(u64::from(max_tokens));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify_failure(e.to_string()))?;

        let content = extract_text(&response.choice).ok_or_else(|| LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: "completion contained no text".to_string(),
        })?;

        let completion = CompletionResponse {
            content,
            input_tokens: u32::try_from(response.usage.input_tokens).unwrap_or(u32::MAX),
            output_tokens: u32::try_from(response.usage.output_tokens).unwrap_or(u32::MAX),
        };
        debug!(
            model = %self.model_name,
            input_tokens = completion.input_tokens,
            output_tokens = completion.output_tokens,
            "Completion received"
        );
        Ok(completion)
    }
}
