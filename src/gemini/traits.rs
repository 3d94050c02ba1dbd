use crate::{
    error::Result,
    models::{ImageData, StoryPage},
};
use async_trait::async_trait;

/// Narrow seam over the hosted model: one call per studio feature.
///
/// `prompt` is the fully composed instruction; implementations send it as-is.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn photo(&self, api_key: &str, prompt: &str, source: &ImageData) -> Result<ImageData>;

    async fn illustration(
        &self,
        api_key: &str,
        prompt: &str,
        source: Option<&ImageData>,
    ) -> Result<ImageData>;

    async fn coloring(
        &self,
        api_key: &str,
        prompt: &str,
        source: Option<&ImageData>,
    ) -> Result<ImageData>;

    async fn sticker(
        &self,
        api_key: &str,
        prompt: &str,
        source: Option<&ImageData>,
    ) -> Result<ImageData>;

    async fn story(&self, api_key: &str, prompt: &str) -> Result<Vec<StoryPage>>;

    /// Cheap live call; `Ok` means the key was accepted.
    async fn probe(&self, api_key: &str) -> Result<()>;
}
