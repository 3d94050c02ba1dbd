use crate::{
    error::{MagicError, Result},
    models::{
        wire::{Content, GenerateContentRequest, GenerationConfig, Part},
        StoryPage,
    },
};
use serde_json::{json, Value};

use super::RestTransport;

#[derive(Clone)]
pub struct TextClient {
    transport: RestTransport,
    model: String,
}

/// Schema the story model must follow: an array of `{text, illustrationPrompt}`.
pub fn story_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "text": { "type": "STRING" },
                "illustrationPrompt": { "type": "STRING" }
            },
            "required": ["text", "illustrationPrompt"]
        }
    })
}

/// Parses the structured story payload. Blank pages are rejected.
pub fn parse_story(text: &str) -> Result<Vec<StoryPage>> {
    let pages: Vec<StoryPage> = serde_json::from_str(text.trim())
        .map_err(|e| MagicError::Generation(format!("Malformed story JSON: {}", e)))?;
    if pages.is_empty() {
        return Err(MagicError::Generation("Story has no pages".into()));
    }
    if pages.iter().any(|p| p.text.trim().is_empty()) {
        return Err(MagicError::Generation("Story contains an empty page".into()));
    }
    Ok(pages)
}

impl TextClient {
    pub fn new(transport: RestTransport, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate_story(&self, api_key: &str, prompt: &str) -> Result<Vec<StoryPage>> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part::text(prompt)],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".into()),
                response_schema: Some(story_schema()),
                image_config: None,
            }),
        };

        log::info!("Invoking model: {}", self.model);
        log::debug!("Story prompt: {}", prompt);

        let response = self
            .transport
            .generate_content(api_key, &self.model, &request)
            .await?;

        let text = response
            .text()
            .ok_or_else(|| MagicError::Generation("No story generated".into()))?;
        let pages = parse_story(&text)?;
        log::debug!("Story model returned {} pages", pages.len());
        Ok(pages)
    }

    /// Minimal live call used to check that a key is accepted.
    pub async fn probe(&self, api_key: &str) -> Result<()> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part::text("ping")],
            }],
            generation_config: None,
        };
        self.transport
            .generate_content(api_key, &self.model, &request)
            .await
            .map(|_| ())
    }
}
