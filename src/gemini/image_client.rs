use crate::{
    error::{MagicError, Result},
    models::{
        wire::{
            Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ImageConfig, Part,
        },
        ImageData,
    },
};

use super::RestTransport;

#[derive(Clone)]
pub struct ImageClient {
    transport: RestTransport,
    model: String,
}

impl ImageClient {
    pub fn new(transport: RestTransport, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` with an optional reference photo and returns the first image part.
    pub async fn generate(
        &self,
        api_key: &str,
        prompt: &str,
        source: Option<&ImageData>,
    ) -> Result<ImageData> {
        let mut parts = vec![Part::text(prompt)];
        if let Some(image) = source {
            parts.push(Part::image(image));
        }

        let request = GenerateContentRequest {
            contents: vec![Content { role: None, parts }],
            generation_config: Some(GenerationConfig {
                image_config: Some(ImageConfig {
                    aspect_ratio: "1:1".to_string(),
                }),
                ..Default::default()
            }),
        };

        log::info!(
            "Generating image with model: {} (reference photo: {})",
            self.model,
            source.is_some()
        );

        let response = self
            .transport
            .generate_content(api_key, &self.model, &request)
            .await?;

        image_from_response(&response)
    }
}

fn image_from_response(response: &GenerateContentResponse) -> Result<ImageData> {
    match response.first_image() {
        Some(image) => image,
        None => {
            log::warn!(
                "Model returned no image part (finish reason: {})",
                response.finish_reason().unwrap_or("unknown")
            );
            Err(MagicError::Generation("No image generated".into()))
        }
    }
}
