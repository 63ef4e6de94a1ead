//! OpenAI embedding client

use async_openai::{
    config::OpenAIConfig,
    types::embeddings::{CreateEmbeddingRequest, EmbeddingInput},
    Client,
};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::{
    error::{EmbeddingError, Result},
    types::EmbeddingVector,
};

/// Maximum number of inputs sent in one embeddings request
const EMBED_BATCH_SIZE: usize = 256;

/// Source of embedding vectors
///
/// Everything that needs vectors (corpus bootstrap, category index) goes
/// through this trait so tests can supply fixed vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier, used as part of cache keys
    fn model(&self) -> &str;

    /// Dimension of every returned vector
    fn dimension(&self) -> usize;

    /// Embed texts, returning one vector per input in input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>>;
}

/// OpenAI embedding client
pub struct EmbeddingClient {
    client: Client<OpenAIConfig>,
    model: String,
    dimension: usize,
}

impl EmbeddingClient {
    /// Create a new embedding client
    ///
    /// Uses text-embedding-3-small model (1536 dimensions)
    pub fn new(api_key: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
        }
    }

    /// Create a client that reads OPENAI_API_KEY from the environment
    pub fn from_env() -> Self {
        Self {
            client: Client::with_config(OpenAIConfig::default()),
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
        }
    }

    /// Use a different model; `dimension` must match what the model returns
    pub fn with_model(mut self, model: &str, dimension: usize) -> Self {
        self.model = model.to_string();
        self.dimension = dimension;
        self
    }

    /// Generate embedding for arbitrary text
    pub async fn embed_text(&self, text: &str) -> Result<EmbeddingVector> {
        let mut embeddings = self.generate_embeddings(vec![text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| EmbeddingError::Config("No embeddings returned from API".to_string()))
    }

    /// Low-level embedding generation for one request
    async fn generate_embeddings(&self, texts: Vec<String>) -> Result<Vec<EmbeddingVector>> {
        let expected = texts.len();
        let request = CreateEmbeddingRequest {
            model: self.model.clone(),
            input: EmbeddingInput::StringArray(texts),
            encoding_format: None,
            dimensions: None,
            user: None,
        };

        let response = self.client.embeddings().create(request).await?;

        if response.data.len() != expected {
            return Err(EmbeddingError::Config(format!(
                "Expected {} embeddings from API, got {}",
                expected,
                response.data.len()
            )));
        }

        let mut data = response.data;
        data.sort_by_key(|item| item.index);

        let mut embeddings = Vec::with_capacity(data.len());
        for item in data {
            // Validate dimension
            if item.embedding.len() != self.dimension {
                return Err(EmbeddingError::InvalidDimension {
                    expected: self.dimension,
                    actual: item.embedding.len(),
                });
            }
            embeddings.push(item.embedding);
        }

        debug!(
            "Generated {} embeddings: dimension={}, model={}",
            embeddings.len(),
            self.dimension,
            self.model
        );

        Ok(embeddings)
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    fn model(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(EMBED_BATCH_SIZE) {
            embeddings.extend(self.generate_embeddings(chunk.to_vec()).await?);
        }

        info!("Embedded {} texts with {}", embeddings.len(), self.model);
        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires API key
    async fn test_embed_category_label() {
        let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");
        let client = EmbeddingClient::new(api_key);

        let embedding = client
            .embed_text("dining")
            .await
            .expect("Failed to generate embedding");

        assert_eq!(embedding.len(), 1536);
    }

    #[tokio::test]
    #[ignore] // Requires API key
    async fn test_embed_batch_preserves_order() {
        let client = EmbeddingClient::from_env();
        let texts = vec!["dining".to_string(), "transit".to_string()];

        let batch = client.embed_batch(&texts).await.expect("batch failed");
        let single = client.embed_text("transit").await.expect("single failed");

        assert_eq!(batch.len(), 2);
        let diff: f32 = batch[1]
            .iter()
            .zip(single.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();
        assert!(diff < 1e-2, "second batch vector should be the transit vector");
    }
}
