use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::{GenerationError, Result};

/// Default bound on a single model call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Text-in, text-out language model
#[async_trait]
pub trait Generator: Send + Sync {
    /// Run one completion with a system and a user message, returning the
    /// raw text of the first choice
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAIClient {
    pub fn new() -> Self {
        // async-openai reads OPENAI_API_KEY from env automatically
        let config = OpenAIConfig::default();
        let client = Client::with_config(config);

        Self {
            client,
            model: "gpt-4o-mini".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Default for OpenAIClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Generator for OpenAIClient {
    #[instrument(skip(self, system_prompt, user_prompt), fields(model = %self.model))]
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()
                    .map_err(|e| GenerationError::Request(e.to_string()))?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user_prompt)
                    .build()
                    .map_err(|e| GenerationError::Request(e.to_string()))?
                    .into(),
            ])
            .temperature(0.0)
            .build()
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| GenerationError::Timeout(self.timeout))??;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(GenerationError::EmptyResponse)?;

        debug!("Model returned {} chars", content.len());
        Ok(content)
    }
}
