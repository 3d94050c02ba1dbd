pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod prompt;
pub mod puzzle;
pub mod shell;
pub mod store;
pub mod wizard;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Config, GeminiConfig};
pub use error::{MagicError, Result};
pub use gemini::{GeminiClient, GenerationClient};
pub use models::{FeatureKind, GenerationRequest, GenerationResult, ImageData, StoryPage, TextParams};
pub use pipeline::{BatchPipeline, ImagePipeline};
pub use puzzle::{Puzzle, PuzzleSource};
pub use shell::{AppView, Shell};
pub use store::{AuthService, CredentialStore, FileStore, MemoryStore, UsageLimiter};
pub use wizard::{ColoringBook, PhotoMagic, PuzzleGame, StickerMaker, StoryCreator};
