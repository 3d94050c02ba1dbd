use super::{download_name, require_photo, require_text, wrong_step, GenerationStatus, RunState, Wizard};
use crate::{
    error::{MagicError, Result},
    models::{AgeGroup, FeatureKind, GenerationRequest, ImageData, TextParams},
    pipeline::{BatchPipeline, PageJob},
    prompt::coloring_book_scenes,
};

pub const DEFAULT_PAGE_COUNT: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum ColoringStep {
    Upload,
    Configure { photo: ImageData },
    /// Cover first, then every coloring page.
    Review { photo: ImageData, pages: Vec<ImageData> },
}

impl ColoringStep {
    pub fn label(&self) -> &'static str {
        match self {
            ColoringStep::Upload => "upload",
            ColoringStep::Configure { .. } => "configure",
            ColoringStep::Review { .. } => "review",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColoringSettings {
    pub child_name: String,
    pub age_group: AgeGroup,
    pub theme: String,
    pub child_description: String,
    pub page_count: usize,
}

impl Default for ColoringSettings {
    fn default() -> Self {
        Self {
            child_name: String::new(),
            age_group: AgeGroup::default(),
            theme: String::new(),
            child_description: String::new(),
            page_count: DEFAULT_PAGE_COUNT,
        }
    }
}

/// Coloring Book: a colourful cover followed by line-art pages of the child.
#[derive(Debug, Clone)]
pub struct ColoringBook {
    step: ColoringStep,
    pub settings: ColoringSettings,
    run: RunState,
    /// Pages finished by the last run, kept when a later page fails.
    partial: Vec<Option<ImageData>>,
}

impl Default for ColoringBook {
    fn default() -> Self {
        Self::new()
    }
}

impl ColoringBook {
    pub fn new() -> Self {
        Self {
            step: ColoringStep::Upload,
            settings: ColoringSettings::default(),
            run: RunState::default(),
            partial: Vec::new(),
        }
    }

    pub fn step(&self) -> &ColoringStep {
        &self.step
    }

    pub fn upload(&mut self, photo: ImageData) -> Result<()> {
        if !matches!(self.step, ColoringStep::Upload) {
            return Err(wrong_step("upload a photo", self.step.label()));
        }
        require_photo(&photo)?;
        self.step = ColoringStep::Configure { photo };
        Ok(())
    }

    pub fn back(&mut self) {
        self.step = match std::mem::replace(&mut self.step, ColoringStep::Upload) {
            ColoringStep::Upload | ColoringStep::Configure { .. } => ColoringStep::Upload,
            ColoringStep::Review { photo, .. } => ColoringStep::Configure { photo },
        };
        self.run = RunState::default();
        self.partial.clear();
    }

    pub fn jobs(&self) -> Result<Vec<PageJob>> {
        let ColoringStep::Configure { photo } = &self.step else {
            return Err(wrong_step("draw the book", self.step.label()));
        };
        let settings = &self.settings;
        require_text("Theme", &settings.theme)?;
        if settings.page_count == 0 {
            return Err(MagicError::Validation("A coloring book needs at least one page".into()));
        }

        let scenes = coloring_book_scenes(
            &settings.child_name,
            settings.theme.trim(),
            settings.age_group,
            settings.page_count,
        );
        let total = settings.page_count;
        let jobs = scenes
            .into_iter()
            .enumerate()
            .map(|(index, scene)| {
                let (kind, label) = if index == 0 {
                    (FeatureKind::Illustration, "Designing the cover...".to_string())
                } else {
                    (FeatureKind::Coloring, format!("Drawing page {} of {}...", index, total))
                };
                let params = TextParams::new()
                    .with_child_name(settings.child_name.trim())
                    .with_theme(settings.theme.trim())
                    .with_age_group(settings.age_group.label())
                    .with_scene(scene)
                    .with_appearance_notes(settings.child_description.trim());
                PageJob::new(index, label, GenerationRequest::new(kind, Some(photo.clone()), params))
            })
            .collect();
        Ok(jobs)
    }

    /// Draws the cover and every page in order. Moves to the review only when all
    /// pages are done; otherwise the finished ones stay in [`ColoringBook::partial_pages`].
    pub async fn generate(&mut self, batch: &BatchPipeline) -> Result<()> {
        let jobs = self.jobs()?;
        self.partial = vec![None; jobs.len()];
        self.run.start();

        let report = batch.run(jobs, &mut self.partial).await;
        self.run.finish_batch(report)?;

        if let ColoringStep::Configure { photo } = std::mem::replace(&mut self.step, ColoringStep::Upload) {
            let pages = std::mem::take(&mut self.partial).into_iter().flatten().collect();
            self.step = ColoringStep::Review { photo, pages };
        }
        Ok(())
    }

    pub fn pages(&self) -> &[ImageData] {
        match &self.step {
            ColoringStep::Review { pages, .. } => pages,
            _ => &[],
        }
    }

    pub fn partial_pages(&self) -> &[Option<ImageData>] {
        &self.partial
    }

    pub fn download_name(index: usize) -> String {
        download_name(FeatureKind::Coloring, index)
    }
}

impl Wizard for ColoringBook {
    fn title(&self) -> &'static str {
        "Coloring Book"
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
