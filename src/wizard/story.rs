use super::{require_photo, require_text, wrong_step, GenerationStatus, RunState, Wizard};
use crate::{
    error::{MagicError, Result},
    models::{AgeGroup, CoverStyle, FeatureKind, GenerationRequest, ImageData, StoryPage, TextParams},
    pipeline::{BatchPipeline, PageJob},
    prompt::{identity_anchor, skin_tone_hint, story_cover_scene},
};

#[derive(Debug, Clone, PartialEq)]
pub enum StoryStep {
    Upload,
    Configure {
        photo: ImageData,
    },
    Review {
        photo: ImageData,
        pages: Vec<StoryPage>,
        current: usize,
    },
}

impl StoryStep {
    pub fn label(&self) -> &'static str {
        match self {
            StoryStep::Upload => "upload",
            StoryStep::Configure { .. } => "configure",
            StoryStep::Review { .. } => "review",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTurn {
    Next,
    Prev,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorySettings {
    pub child_name: String,
    pub age_group: AgeGroup,
    pub theme: String,
    /// Outfit and hair notes. Never used to describe skin.
    pub child_description: String,
    pub skin_tone: String,
    pub cover_style: CoverStyle,
}

/// Story Creator: a six-page personalised storybook, illustrated page by page.
#[derive(Debug, Clone)]
pub struct StoryCreator {
    step: StoryStep,
    pub settings: StorySettings,
    run: RunState,
}

impl Default for StoryCreator {
    fn default() -> Self {
        Self::new()
    }
}

fn page_job(settings: &StorySettings, photo: &ImageData, index: usize, page: &StoryPage, total: usize) -> PageJob {
    let (kind, scene, label) = if index == 0 {
        let kind = match settings.cover_style {
            CoverStyle::Coloring => FeatureKind::Coloring,
            CoverStyle::Colorful => FeatureKind::Illustration,
        };
        let scene = story_cover_scene(&page.illustration_prompt, settings.cover_style);
        (kind, scene, "Painting the cover...".to_string())
    } else {
        (
            FeatureKind::Illustration,
            page.illustration_prompt.clone(),
            format!("Illustrating page {} of {}...", index + 1, total),
        )
    };

    let params = TextParams::new()
        .with_child_name(settings.child_name.trim())
        .with_theme(settings.theme.trim())
        .with_scene(scene)
        .with_appearance_notes(identity_anchor(&settings.child_description))
        .with_skin_tone(skin_tone_hint(&settings.skin_tone));
    PageJob::new(index, label, GenerationRequest::new(kind, Some(photo.clone()), params))
}

impl StoryCreator {
    pub fn new() -> Self {
        Self {
            step: StoryStep::Upload,
            settings: StorySettings::default(),
            run: RunState::default(),
        }
    }

    pub fn step(&self) -> &StoryStep {
        &self.step
    }

    pub fn upload(&mut self, photo: ImageData) -> Result<()> {
        if !matches!(self.step, StoryStep::Upload) {
            return Err(wrong_step("upload a photo", self.step.label()));
        }
        require_photo(&photo)?;
        self.step = StoryStep::Configure { photo };
        Ok(())
    }

    /// Leaving the review drops the generated book.
    pub fn back(&mut self) {
        self.step = match std::mem::replace(&mut self.step, StoryStep::Upload) {
            StoryStep::Upload | StoryStep::Configure { .. } => StoryStep::Upload,
            StoryStep::Review { photo, .. } => StoryStep::Configure { photo },
        };
        self.run = RunState::default();
    }

    pub fn pages(&self) -> &[StoryPage] {
        match &self.step {
            StoryStep::Review { pages, .. } => pages,
            _ => &[],
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        match &self.step {
            StoryStep::Review { current, .. } => Some(*current),
            _ => None,
        }
    }

    pub fn current_page(&self) -> Option<&StoryPage> {
        match &self.step {
            StoryStep::Review { pages, current, .. } => pages.get(*current),
            _ => None,
        }
    }

    /// Writes the story text, moves to the review and illustrates every page in order.
    ///
    /// A failed story call stays on the configure step. A failed illustration keeps
    /// the book and the pages drawn so far.
    pub async fn generate(&mut self, batch: &BatchPipeline) -> Result<()> {
        if !matches!(self.step, StoryStep::Configure { .. }) {
            return Err(wrong_step("write a story", self.step.label()));
        }
        require_text("Child's name", &self.settings.child_name)?;
        require_text("Theme", &self.settings.theme)?;

        self.run.start();
        let request = GenerationRequest::new(
            FeatureKind::Story,
            None,
            TextParams::new()
                .with_child_name(self.settings.child_name.trim())
                .with_age_group(self.settings.age_group.label())
                .with_theme(self.settings.theme.trim()),
        );
        let pages = match batch.pipeline().generate(request).await.and_then(|r| {
            r.into_story()
                .ok_or_else(|| MagicError::Generation("Expected story pages".into()))
        }) {
            Ok(pages) => pages,
            Err(e) => {
                self.run.fail(&e);
                return Err(e);
            }
        };
        log::info!("📖 Story written with {} pages", pages.len());

        if let StoryStep::Configure { photo } = std::mem::replace(&mut self.step, StoryStep::Upload) {
            self.step = StoryStep::Review {
                photo,
                pages,
                current: 0,
            };
        }
        let all = (0..self.pages().len()).collect();
        self.illustrate(batch, all).await
    }

    async fn illustrate(&mut self, batch: &BatchPipeline, indices: Vec<usize>) -> Result<()> {
        let settings = self.settings.clone();
        let step = self.step.label();
        let StoryStep::Review { photo, pages, .. } = &mut self.step else {
            return Err(wrong_step("illustrate pages", step));
        };
        let photo: &ImageData = photo;
        let total = pages.len();
        let jobs: Vec<PageJob> = indices
            .into_iter()
            .filter_map(|i| pages.get(i).map(|page| page_job(&settings, photo, i, page, total)))
            .collect();
        if jobs.is_empty() {
            return Ok(());
        }

        self.run.start();
        let report = batch.run(jobs, pages).await;
        self.run.finish_batch(report).map(|_| ())
    }

    /// Moves one page forward or back, drawing the new page if it has no picture yet.
    pub async fn turn_page(&mut self, turn: PageTurn, batch: &BatchPipeline) -> Result<usize> {
        let step = self.step.label();
        let StoryStep::Review { pages, current, .. } = &mut self.step else {
            return Err(wrong_step("turn the page", step));
        };
        let last = pages.len().saturating_sub(1);
        *current = match turn {
            PageTurn::Next => (*current + 1).min(last),
            PageTurn::Prev => current.saturating_sub(1),
        };
        let index = *current;
        if !pages.get(index).map_or(true, StoryPage::is_illustrated) {
            self.illustrate(batch, vec![index]).await?;
        }
        Ok(index)
    }

    /// Draws one page again, replacing its current picture.
    pub async fn redraw(&mut self, index: usize, batch: &BatchPipeline) -> Result<()> {
        if index >= self.pages().len() {
            return Err(MagicError::Validation(format!("No page {} to redraw", index)));
        }
        let forced = batch.clone().force_regenerate(true);
        self.illustrate(&forced, vec![index]).await
    }
}

impl Wizard for StoryCreator {
    fn title(&self) -> &'static str {
        "Story Creator"
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
    use crate::pipeline::ImagePipeline;
    use crate::store::{CredentialStore, MemoryStore};
    use crate::testing::{sample_photo, FakeClient};
    use std::sync::Arc;

    fn batch(client: Arc<FakeClient>) -> BatchPipeline {
        let creds = CredentialStore::new(Arc::new(MemoryStore::new()));
        creds.set("k").unwrap();
        BatchPipeline::new(ImagePipeline::new(client, creds))
    }

    fn configured() -> StoryCreator {
        let mut wizard = StoryCreator::new();
        wizard.upload(sample_photo()).unwrap();
        wizard.settings.child_name = "Maya".into();
        wizard.settings.theme = "Space pirates".into();
        wizard.settings.child_description = "curly hair, red scarf".into();
        wizard
    }

    #[tokio::test]
    async fn configure_requires_name_and_theme() {
        let client = Arc::new(FakeClient::new());
        let mut wizard = StoryCreator::new();
        wizard.upload(sample_photo()).unwrap();
        wizard.settings.theme = "dinosaurs".into();

        let outcome = wizard.generate(&batch(client.clone())).await;
        assert!(matches!(outcome, Err(MagicError::Validation(_))));
        assert_eq!(wizard.step_label(), "configure");
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn writes_then_illustrates_every_page() {
        let client = Arc::new(FakeClient::new());
        let mut wizard = configured();
        wizard.generate(&batch(client.clone())).await.unwrap();

        assert_eq!(wizard.step_label(), "review");
        assert_eq!(wizard.status(), GenerationStatus::Done);
        assert_eq!(wizard.pages().len(), 4);
        assert!(wizard.pages().iter().all(StoryPage::is_illustrated));

        let calls = client.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0].kind, FeatureKind::Story);
        assert!(calls[0].prompt.contains("named Maya"));
        assert!(calls[1].prompt.contains("VIBRANT BOOK COVER"));
        assert!(calls[2].prompt.contains("Page 1 scene"));
        assert!(calls[2].prompt.contains("curly hair, red scarf"));
        assert!(calls[1..].iter().all(|c| c.with_source));
    }

    #[tokio::test]
    async fn skin_tone_gets_its_own_prompt_line() {
        let client = Arc::new(FakeClient::new());
        let mut wizard = configured();
        wizard.settings.skin_tone = "deep brown".into();
        wizard.generate(&batch(client.clone())).await.unwrap();
        let calls = client.calls();
        assert!(calls[1..].iter().all(|c| c.prompt.ends_with("SKIN TONE: deep brown")));
        assert!(calls[2].prompt.contains("NOTES: curly hair, red scarf"));
    }

    #[tokio::test]
    async fn single_page_book_is_just_the_cover() {
        let client = Arc::new(
            FakeClient::new().with_story(vec![StoryPage::new("The end", "A dragon waves goodbye")]),
        );
        let batch = batch(client.clone());
        let mut wizard = configured();
        wizard.generate(&batch).await.unwrap();

        assert_eq!(wizard.pages().len(), 1);
        assert_eq!(client.call_count(), 2);
        assert_eq!(wizard.turn_page(PageTurn::Next, &batch).await.unwrap(), 0);
        assert_eq!(wizard.turn_page(PageTurn::Prev, &batch).await.unwrap(), 0);
        assert!(wizard.current_page().unwrap().is_illustrated());
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn coloring_cover_goes_through_line_art() {
        let client = Arc::new(FakeClient::new());
        let mut wizard = configured();
        wizard.settings.cover_style = CoverStyle::Coloring;
        wizard.generate(&batch(client.clone())).await.unwrap();
        let calls = client.calls();
        assert_eq!(calls[1].kind, FeatureKind::Coloring);
        assert_eq!(calls[2].kind, FeatureKind::Illustration);
    }

    #[tokio::test]
    async fn failed_story_call_stays_on_configure() {
        let client = Arc::new(FakeClient::new());
        client.fail_call(0);
        let mut wizard = configured();
        assert!(wizard.generate(&batch(client)).await.is_err());
        assert_eq!(wizard.step_label(), "configure");
        assert_eq!(wizard.error(), Some("The magic ink ran out! Please try again."));
    }

    #[tokio::test]
    async fn failed_page_keeps_earlier_pictures_and_can_be_redrawn() {
        let client = Arc::new(FakeClient::new());
        // call 0 is the story text, call 3 is page index 2
        client.fail_call(3);
        let batch = batch(client.clone());
        let mut wizard = configured();

        assert!(wizard.generate(&batch).await.is_err());
        assert_eq!(wizard.step_label(), "review");
        assert_eq!(wizard.status(), GenerationStatus::Failed);
        let drawn: Vec<bool> = wizard.pages().iter().map(StoryPage::is_illustrated).collect();
        assert_eq!(drawn, vec![true, true, false, false]);

        wizard.turn_page(PageTurn::Next, &batch).await.unwrap();
        assert_eq!(client.call_count(), 4);
        let index = wizard.turn_page(PageTurn::Next, &batch).await.unwrap();
        assert_eq!(index, 2);
        assert!(wizard.current_page().unwrap().is_illustrated());
        assert_eq!(client.call_count(), 5);

        let before = wizard.pages()[0].image.clone();
        wizard.redraw(0, &batch).await.unwrap();
        assert_ne!(wizard.pages()[0].image, before);
        assert!(wizard.redraw(9, &batch).await.is_err());
    }

    #[tokio::test]
    async fn page_turns_clamp_to_the_book() {
        let client = Arc::new(FakeClient::new());
        let batch = batch(client);
        let mut wizard = configured();
        wizard.generate(&batch).await.unwrap();

        assert_eq!(wizard.turn_page(PageTurn::Prev, &batch).await.unwrap(), 0);
        for _ in 0..10 {
            wizard.turn_page(PageTurn::Next, &batch).await.unwrap();
        }
        assert_eq!(wizard.current_index(), Some(3));

        wizard.back();
        assert_eq!(wizard.step_label(), "configure");
        assert!(wizard.pages().is_empty());
    }
}
