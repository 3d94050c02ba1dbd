use super::{require_photo, wrong_step, GenerationStatus, RunState, Wizard};
use crate::{
    error::{MagicError, Result},
    models::{ArtStyle, Character, Ethnicity, FeatureKind, GenerationRequest, ImageData, TextParams, Theme},
    pipeline::ImagePipeline,
};
use rand::seq::IndexedRandom;
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub enum PhotoStep {
    Upload,
    SelectTheme { photo: ImageData },
    Configure { photo: ImageData, theme: Theme },
    Result { photo: ImageData, theme: Theme, image: ImageData },
}

impl PhotoStep {
    pub fn label(&self) -> &'static str {
        match self {
            PhotoStep::Upload => "upload",
            PhotoStep::SelectTheme { .. } => "select theme",
            PhotoStep::Configure { .. } => "configure",
            PhotoStep::Result { .. } => "result",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoSettings {
    pub character: Character,
    pub ethnicity: Ethnicity,
    pub style: ArtStyle,
    pub custom_notes: String,
}

/// Photo Magic: composite the child into a scene with a companion character.
#[derive(Debug, Clone)]
pub struct PhotoMagic {
    step: PhotoStep,
    pub settings: PhotoSettings,
    run: RunState,
}

impl Default for PhotoMagic {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoMagic {
    pub fn new() -> Self {
        Self {
            step: PhotoStep::Upload,
            settings: PhotoSettings::default(),
            run: RunState::default(),
        }
    }

    pub fn step(&self) -> &PhotoStep {
        &self.step
    }

    pub fn upload(&mut self, photo: ImageData) -> Result<()> {
        if !matches!(self.step, PhotoStep::Upload) {
            return Err(wrong_step("upload a photo", self.step.label()));
        }
        require_photo(&photo)?;
        self.step = PhotoStep::SelectTheme { photo };
        Ok(())
    }

    pub fn select_theme(&mut self, theme: Theme) -> Result<()> {
        match std::mem::replace(&mut self.step, PhotoStep::Upload) {
            PhotoStep::SelectTheme { photo } | PhotoStep::Configure { photo, .. } => {
                self.step = PhotoStep::Configure { photo, theme };
                Ok(())
            }
            other => {
                let err = wrong_step("pick a theme", other.label());
                self.step = other;
                Err(err)
            }
        }
    }

    pub fn back(&mut self) {
        self.step = match std::mem::replace(&mut self.step, PhotoStep::Upload) {
            PhotoStep::Upload | PhotoStep::SelectTheme { .. } => PhotoStep::Upload,
            PhotoStep::Configure { photo, .. } => PhotoStep::SelectTheme { photo },
            PhotoStep::Result { photo, theme, .. } => PhotoStep::Configure { photo, theme },
        };
        self.run = RunState::default();
    }

    /// Builds the request for the current configuration with a random location and pose
    /// from the chosen character's scene pool.
    pub fn build_request<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<GenerationRequest> {
        let PhotoStep::Configure { photo, theme } = &self.step else {
            return Err(wrong_step("generate", self.step.label()));
        };
        let character = self.settings.character;
        let location = character.locations().choose(rng).copied().unwrap_or_default();
        let pose = character.poses().choose(rng).copied().unwrap_or_default();

        let params = TextParams::new()
            .with_character(character.label())
            .with_character_variant(self.settings.ethnicity.label())
            .with_theme(theme.label())
            .with_setting(location, pose)
            .with_style(self.settings.style.label())
            .with_custom_notes(self.settings.custom_notes.trim());
        Ok(GenerationRequest::new(FeatureKind::Photo, Some(photo.clone()), params))
    }

    pub async fn generate<R: Rng + ?Sized>(
        &mut self,
        pipeline: &ImagePipeline,
        rng: &mut R,
    ) -> Result<&ImageData> {
        let request = self.build_request(rng)?;
        self.run.start();

        let image = match pipeline.generate(request).await.and_then(|r| {
            r.into_image()
                .ok_or_else(|| MagicError::Generation("No image generated".into()))
        }) {
            Ok(image) => image,
            Err(e) => {
                self.run.fail(&e);
                return Err(e);
            }
        };

        if let PhotoStep::Configure { photo, theme } = std::mem::replace(&mut self.step, PhotoStep::Upload) {
            self.step = PhotoStep::Result { photo, theme, image };
        }
        self.run.succeed();
        self.result()
            .ok_or_else(|| MagicError::Generation("No image generated".into()))
    }

    pub fn result(&self) -> Option<&ImageData> {
        match &self.step {
            PhotoStep::Result { image, .. } => Some(image),
            _ => None,
        }
    }
}

impl Wizard for PhotoMagic {
    fn title(&self) -> &'static str {
        "Photo Magic"
    }

    fn step_label(&self) -> &'static str {
        self.step.label()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CredentialStore, MemoryStore};
    use crate::testing::{sample_photo, FakeClient};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn pipeline(client: Arc<FakeClient>) -> ImagePipeline {
        let creds = CredentialStore::new(Arc::new(MemoryStore::new()));
        creds.set("k").unwrap();
        ImagePipeline::new(client, creds)
    }

    fn configured() -> PhotoMagic {
        let mut wizard = PhotoMagic::new();
        wizard.upload(sample_photo()).unwrap();
        wizard.select_theme(Theme::Fantasy).unwrap();
        wizard.settings.character = Character::Dragon;
        wizard
    }

    #[test]
    fn steps_advance_in_order() {
        let mut wizard = PhotoMagic::new();
        assert!(wizard.select_theme(Theme::Easter).is_err());
        assert_eq!(wizard.step(), &PhotoStep::Upload);

        assert!(wizard.upload(ImageData::new("image/png", vec![])).is_err());
        wizard.upload(sample_photo()).unwrap();
        assert_eq!(wizard.step_label(), "select theme");
        wizard.select_theme(Theme::Easter).unwrap();
        assert_eq!(wizard.step_label(), "configure");

        wizard.back();
        assert_eq!(wizard.step_label(), "select theme");
        wizard.back();
        wizard.back();
        assert_eq!(wizard.step(), &PhotoStep::Upload);
    }

    #[test]
    fn location_and_pose_come_from_the_character() {
        let wizard = configured();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            let req = wizard.build_request(&mut rng).unwrap();
            assert!(Character::Dragon.locations().contains(&req.params.location.as_str()));
            assert!(Character::Dragon.poses().contains(&req.params.pose.as_str()));
            assert_eq!(req.params.theme, "Fantasy");
            assert!(req.source_image.is_some());
        }
    }

    #[tokio::test]
    async fn generate_moves_to_result() {
        let client = Arc::new(FakeClient::new());
        let mut wizard = configured();
        wizard
            .generate(&pipeline(client.clone()), &mut StdRng::seed_from_u64(1))
            .await
            .unwrap();
        assert_eq!(wizard.step_label(), "result");
        assert_eq!(wizard.status(), GenerationStatus::Done);
        assert!(wizard.result().is_some());
        assert_eq!(client.calls()[0].kind, FeatureKind::Photo);

        wizard.reset();
        assert_eq!(wizard.step(), &PhotoStep::Upload);
        assert_eq!(wizard.settings, PhotoSettings::default());
    }

    #[tokio::test]
    async fn failure_stays_on_configure() {
        let client = Arc::new(FakeClient::new());
        client.fail_call(0);
        let mut wizard = configured();
        let outcome = wizard
            .generate(&pipeline(client), &mut StdRng::seed_from_u64(1))
            .await;
        assert!(outcome.is_err());
        assert_eq!(wizard.step_label(), "configure");
        assert_eq!(wizard.status(), GenerationStatus::Failed);
        assert_eq!(wizard.error(), Some("The magic ink ran out! Please try again."));
    }

    #[tokio::test]
    async fn generate_outside_configure_is_rejected() {
        let client = Arc::new(FakeClient::new());
        let mut wizard = PhotoMagic::new();
        let outcome = wizard
            .generate(&pipeline(client.clone()), &mut StdRng::seed_from_u64(1))
            .await;
        assert!(matches!(outcome, Err(MagicError::Validation(_))));
        assert_eq!(client.call_count(), 0);
    }
}
