use super::image::ImageData;
use serde::{Deserialize, Serialize};

/// One page of a generated storybook. Page 0 is the cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryPage {
    pub text: String,
    pub illustration_prompt: String,
    #[serde(skip)]
    pub image: Option<ImageData>,
}

impl StoryPage {
    pub fn new(text: impl Into<String>, illustration_prompt: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            illustration_prompt: illustration_prompt.into(),
            image: None,
        }
    }

    pub fn is_illustrated(&self) -> bool {
        self.image.is_some()
    }
}
