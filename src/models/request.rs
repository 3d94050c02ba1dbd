use super::{image::ImageData, story::StoryPage};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Photo,
    Illustration,
    Coloring,
    Sticker,
    Story,
}

impl FeatureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Photo => "photo",
            FeatureKind::Illustration => "illustration",
            FeatureKind::Coloring => "coloring",
            FeatureKind::Sticker => "sticker",
            FeatureKind::Story => "story",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-text inputs collected by the wizards. Missing values stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextParams {
    pub child_name: String,
    pub character: String,
    pub character_variant: String,
    pub theme: String,
    pub location: String,
    pub pose: String,
    pub style: String,
    pub age_group: String,
    /// Scene description for a single image (story page, coloring page, sticker vibe).
    pub scene: String,
    pub custom_notes: String,
    pub appearance_notes: String,
    pub skin_tone: String,
}

impl TextParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_child_name(mut self, name: impl Into<String>) -> Self {
        self.child_name = name.into();
        self
    }

    pub fn with_character(mut self, character: impl Into<String>) -> Self {
        self.character = character.into();
        self
    }

    pub fn with_character_variant(mut self, variant: impl Into<String>) -> Self {
        self.character_variant = variant.into();
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    pub fn with_setting(mut self, location: impl Into<String>, pose: impl Into<String>) -> Self {
        self.location = location.into();
        self.pose = pose.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    pub fn with_age_group(mut self, age_group: impl Into<String>) -> Self {
        self.age_group = age_group.into();
        self
    }

    pub fn with_scene(mut self, scene: impl Into<String>) -> Self {
        self.scene = scene.into();
        self
    }

    pub fn with_custom_notes(mut self, notes: impl Into<String>) -> Self {
        self.custom_notes = notes.into();
        self
    }

    pub fn with_appearance_notes(mut self, notes: impl Into<String>) -> Self {
        self.appearance_notes = notes.into();
        self
    }

    pub fn with_skin_tone(mut self, skin_tone: impl Into<String>) -> Self {
        self.skin_tone = skin_tone.into();
        self
    }
}

/// A single call to the generation backend. Built fresh for every call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub kind: FeatureKind,
    pub source_image: Option<ImageData>,
    pub params: TextParams,
}

impl GenerationRequest {
    pub fn new(kind: FeatureKind, source_image: Option<ImageData>, params: TextParams) -> Self {
        Self {
            kind,
            source_image,
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    Image(ImageData),
    Story(Vec<StoryPage>),
}

impl GenerationResult {
    pub fn into_image(self) -> Option<ImageData> {
        match self {
            GenerationResult::Image(image) => Some(image),
            GenerationResult::Story(_) => None,
        }
    }

    pub fn into_story(self) -> Option<Vec<StoryPage>> {
        match self {
            GenerationResult::Story(pages) => Some(pages),
            GenerationResult::Image(_) => None,
        }
    }
}
