//! Step-gated flows for each studio feature.
//!
//! Every wizard keeps its current step as an enum whose variants own exactly the
//! data valid in that step. Forward moves validate their inputs; `back` always
//! succeeds. Generation failures never advance the step.

pub mod coloring;
pub mod photo;
pub mod puzzle_game;
pub mod sticker;
pub mod story;

use crate::error::{MagicError, Result};
use crate::models::{FeatureKind, ImageData};
use crate::pipeline::{BatchReport, BatchStop};

pub use coloring::{ColoringBook, ColoringStep};
pub use photo::{PhotoMagic, PhotoStep};
pub use puzzle_game::{PuzzleGame, PuzzleStep};
pub use sticker::StickerMaker;
pub use story::{PageTurn, StoryCreator, StoryStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationStatus {
    #[default]
    Idle,
    Running,
    Done,
    Failed,
}

/// Read-only view the shell uses to show where a wizard is.
pub trait Wizard {
    fn title(&self) -> &'static str;

    fn step_label(&self) -> &'static str;

    fn status(&self) -> GenerationStatus;

    fn error(&self) -> Option<&str>;

    /// "Create another": back to the first step with every input cleared.
    fn reset(&mut self);
}

/// File name offered when saving a result. `index` is the page within a book.
pub fn download_name(kind: FeatureKind, index: usize) -> String {
    match (kind, index) {
        (FeatureKind::Photo, _) => "photo-magic.png".to_string(),
        (FeatureKind::Sticker, _) => "my-avatar-sticker.png".to_string(),
        (FeatureKind::Coloring, 0) => "cover-page.png".to_string(),
        (FeatureKind::Coloring, i) => format!("coloring-page-{}.png", i),
        (FeatureKind::Illustration | FeatureKind::Story, i) => format!("story-page-{}.png", i + 1),
    }
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MagicError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

pub(crate) fn require_photo(photo: &ImageData) -> Result<()> {
    if photo.bytes.is_empty() {
        return Err(MagicError::Validation("Photo is empty".into()));
    }
    Ok(())
}

pub(crate) fn wrong_step(action: &str, step: &str) -> MagicError {
    MagicError::Validation(format!("Cannot {} during the {} step", action, step))
}

/// Tracks status and the last user-facing error for a wizard.
#[derive(Debug, Clone, Default)]
pub(crate) struct RunState {
    pub status: GenerationStatus,
    pub error: Option<String>,
}

impl RunState {
    pub fn start(&mut self) {
        self.status = GenerationStatus::Running;
        self.error = None;
    }

    pub fn succeed(&mut self) {
        self.status = GenerationStatus::Done;
    }

    pub fn fail(&mut self, error: &MagicError) {
        log::error!("Generation failed: {}", error);
        self.status = GenerationStatus::Failed;
        self.error = Some(error.friendly_message());
    }

    /// Settles a batch run. A cancelled batch goes back to idle without a message.
    pub fn finish_batch(&mut self, report: BatchReport) -> Result<usize> {
        let cancelled = matches!(report.stopped, Some(BatchStop::Cancelled { .. }));
        match report.into_result() {
            Ok(generated) => {
                self.succeed();
                Ok(generated)
            }
            Err(e) if cancelled => {
                log::warn!("Generation cancelled");
                self.status = GenerationStatus::Idle;
                Err(e)
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }
}
