use super::{download_name, require_photo, GenerationStatus, RunState, Wizard};
use crate::{
    error::{MagicError, Result},
    models::{FeatureKind, GenerationRequest, ImageData, StickerStyle, TextParams},
    pipeline::ImagePipeline,
    prompt::sticker_style_prompt,
};

/// Sticker maker: one form, one image. The photo is optional; without it the
/// sticker is drawn from the style and theme alone.
#[derive(Debug, Clone, Default)]
pub struct StickerMaker {
    photo: Option<ImageData>,
    pub style: StickerStyle,
    pub theme: String,
    pub appearance_notes: String,
    run: RunState,
    result: Option<ImageData>,
}

impl StickerMaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_photo(&mut self, photo: ImageData) -> Result<()> {
        require_photo(&photo)?;
        self.photo = Some(photo);
        self.result = None;
        Ok(())
    }

    pub fn clear_photo(&mut self) {
        self.photo = None;
    }

    pub fn photo(&self) -> Option<&ImageData> {
        self.photo.as_ref()
    }

    pub fn build_request(&self) -> GenerationRequest {
        let mut vibe = sticker_style_prompt(self.style).to_string();
        if !self.theme.trim().is_empty() {
            vibe.push_str(&format!(", {} theme", self.theme.trim()));
        }
        let params = TextParams::new()
            .with_style(self.style.label())
            .with_theme(self.theme.trim())
            .with_scene(vibe)
            .with_appearance_notes(self.appearance_notes.trim());
        GenerationRequest::new(FeatureKind::Sticker, self.photo.clone(), params)
    }

    pub async fn generate(&mut self, pipeline: &ImagePipeline) -> Result<&ImageData> {
        let request = self.build_request();
        self.run.start();
        match pipeline.generate(request).await.and_then(|r| {
            r.into_image()
                .ok_or_else(|| MagicError::Generation("No image generated".into()))
        }) {
            Ok(image) => {
                self.run.succeed();
                Ok(self.result.insert(image))
            }
            Err(e) => {
                self.run.fail(&e);
                Err(e)
            }
        }
    }

    pub fn result(&self) -> Option<&ImageData> {
        self.result.as_ref()
    }

    /// Back to the form, keeping the photo and choices.
    pub fn back(&mut self) {
        self.result = None;
        self.run = RunState::default();
    }

    pub fn download_name() -> String {
        download_name(FeatureKind::Sticker, 0)
    }
}

impl Wizard for StickerMaker {
    fn title(&self) -> &'static str {
        "Sticker Maker"
    }

    fn step_label(&self) -> &'static str {
        if self.result.is_some() {
            "result"
        } else {
            "configure"
        }
    }

    fn status(&self) -> GenerationStatus {
        self.run.status
    }

    fn error(&self) -> Option<&str> {
        self.run.error.as_deref()
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
