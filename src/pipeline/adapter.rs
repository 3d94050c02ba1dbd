use crate::{
    error::{MagicError, Result},
    gemini::GenerationClient,
    logger,
    models::{FeatureKind, GenerationRequest, GenerationResult},
    prompt::compose_prompt,
    store::{CredentialStore, UsageLimiter},
};
use std::sync::Arc;

/// Single entry point for every generation call.
///
/// Checks the credential and the advisory quota before touching the network,
/// composes the prompt and dispatches exactly one client call. No retries.
#[derive(Clone)]
pub struct ImagePipeline {
    client: Arc<dyn GenerationClient>,
    credentials: CredentialStore,
    usage: Option<UsageLimiter>,
}

impl ImagePipeline {
    pub fn new(client: Arc<dyn GenerationClient>, credentials: CredentialStore) -> Self {
        Self {
            client,
            credentials,
            usage: None,
        }
    }

    pub fn with_usage_limit(mut self, usage: UsageLimiter) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn client(&self) -> &dyn GenerationClient {
        self.client.as_ref()
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn usage(&self) -> Option<&UsageLimiter> {
        self.usage.as_ref()
    }

    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult> {
        let api_key = self.credentials.require()?;
        if let Some(usage) = &self.usage {
            usage.check()?;
        }

        let prompt = compose_prompt(&request);
        let source = request.source_image.as_ref();
        let _timer = logger::timer(&format!("{} generation", request.kind));
        log::debug!("Composed {} prompt ({} chars)", request.kind, prompt.len());

        let result = match request.kind {
            FeatureKind::Photo => {
                let source = source.ok_or_else(|| {
                    MagicError::Validation("Photo magic needs a source photo".into())
                })?;
                GenerationResult::Image(self.client.photo(&api_key, &prompt, source).await?)
            }
            FeatureKind::Illustration => {
                GenerationResult::Image(self.client.illustration(&api_key, &prompt, source).await?)
            }
            FeatureKind::Coloring => {
                GenerationResult::Image(self.client.coloring(&api_key, &prompt, source).await?)
            }
            FeatureKind::Sticker => {
                GenerationResult::Image(self.client.sticker(&api_key, &prompt, source).await?)
            }
            FeatureKind::Story => GenerationResult::Story(self.client.story(&api_key, &prompt).await?),
        };

        if let Some(usage) = &self.usage {
            usage.record()?;
        }
        log::info!("✨ {} generation complete", request.kind);
        Ok(result)
    }
}
