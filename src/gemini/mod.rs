pub mod image_client;
pub mod text_client;
pub mod traits;

use crate::{
    config::GeminiConfig,
    error::{MagicError, Result},
    models::{
        wire::{GenerateContentRequest, GenerateContentResponse},
        ImageData, StoryPage,
    },
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

pub use image_client::ImageClient;
pub use text_client::TextClient;
pub use traits::GenerationClient;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Shared HTTP plumbing for `models/{model}:generateContent`.
#[derive(Clone)]
pub struct RestTransport {
    client: Client,
    base_url: String,
}

impl RestTransport {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MagicError::ConfigError(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    pub async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header(API_KEY_HEADER, api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                log::error!("Gemini request failed: {}", e);
                MagicError::Generation(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MagicError::Generation(format!("Failed reading Gemini body: {}", e)))?;

        parse_response(status, &body)
    }
}

fn parse_response(status: StatusCode, body: &str) -> Result<GenerateContentResponse> {
    if !status.is_success() {
        log::error!("Gemini API error ({}): {}", status, body);
        return Err(MagicError::Generation(format!(
            "Gemini API error ({}): {}",
            status, body
        )));
    }

    serde_json::from_str(body)
        .map_err(|e| MagicError::Generation(format!("Unparseable Gemini response: {}", e)))
}

/// `GenerationClient` backed by the Gemini REST API.
#[derive(Clone)]
pub struct GeminiClient {
    image_client: ImageClient,
    text_client: TextClient,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let transport = RestTransport::new(config)?;
        Ok(Self {
            image_client: ImageClient::new(transport.clone(), config.image_model.clone()),
            text_client: TextClient::new(transport, config.text_model.clone()),
        })
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn text(&self) -> &TextClient {
        &self.text_client
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn photo(&self, api_key: &str, prompt: &str, source: &ImageData) -> Result<ImageData> {
        self.image_client.generate(api_key, prompt, Some(source)).await
    }

    async fn illustration(
        &self,
        api_key: &str,
        prompt: &str,
        source: Option<&ImageData>,
    ) -> Result<ImageData> {
        self.image_client.generate(api_key, prompt, source).await
    }

    async fn coloring(
        &self,
        api_key: &str,
        prompt: &str,
        source: Option<&ImageData>,
    ) -> Result<ImageData> {
        self.image_client.generate(api_key, prompt, source).await
    }

    async fn sticker(
        &self,
        api_key: &str,
        prompt: &str,
        source: Option<&ImageData>,
    ) -> Result<ImageData> {
        self.image_client.generate(api_key, prompt, source).await
    }

    async fn story(&self, api_key: &str, prompt: &str) -> Result<Vec<StoryPage>> {
        self.text_client.generate_story(api_key, prompt).await
    }

    async fn probe(&self, api_key: &str) -> Result<()> {
        self.text_client.probe(api_key).await
    }
}
