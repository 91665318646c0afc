//! Chat-completion backend.

use super::TextGenerator;
use crate::config::{ApiSettings, SummarizerSettings};
use crate::error::{Result, VettError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Text generator over an OpenAI-compatible chat endpoint.
pub struct ChatGenerator {
    client: Client<OpenAIConfig>,
    model: String,
}

impl ChatGenerator {
    /// Connect to `api` using `settings.model`.
    pub fn with_config(api: &ApiSettings, settings: &SummarizerSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(api)?,
            model: settings.model.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for ChatGenerator {
    #[instrument(skip(self, system, user), fields(model = %self.model))]
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| VettError::OpenAI(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| VettError::OpenAI(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| VettError::OpenAI(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| VettError::OpenAI(e.to_string()))?;

        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| VettError::OpenAI("No response from model".to_string()))?;

        debug!("Generated {} chars", text.len());
        Ok(text.trim().to_string())
    }
}
