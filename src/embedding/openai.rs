//! OpenAI embeddings implementation.

use super::Embedder;
use crate::config::EmbeddingSettings;
use crate::error::{Result, VettError};
use crate::openai::create_client;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Inputs sent per embeddings request.
const BATCH_SIZE: usize = 100;

/// Embedder backed by an OpenAI-compatible embeddings endpoint.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Create an embedder from settings. Fails when the API key is missing.
    pub fn with_config(settings: &EmbeddingSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(&settings.api)?,
            model: settings.model.clone(),
            dimensions: settings.dimensions as usize,
        })
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| VettError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(EmbeddingInput::StringArray(chunk.to_vec()))
                .dimensions(self.dimensions as u32)
                .build()
                .map_err(|e| VettError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| VettError::OpenAI(format!("Embedding API error: {}", e)))?;

            let mut data = response.data;
            data.sort_by_key(|e| e.index);
            all_embeddings.extend(data.into_iter().map(|e| e.embedding));
        }

        if all_embeddings.len() != texts.len() {
            return Err(VettError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                all_embeddings.len()
            )));
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiSettings;

    #[test]
    fn test_embedder_requires_key() {
        let settings = EmbeddingSettings {
            api: ApiSettings {
                api_key_env: "VETT_TEST_EMBEDDING_KEY_UNSET".to_string(),
                ..ApiSettings::openai()
            },
            ..EmbeddingSettings::default()
        };
        assert!(OpenAIEmbedder::with_config(&settings).is_err());
    }
}
