mod llm;

use thiserror::Error;

use crate::{
    content::{GeneratedContent, LessonRequest},
    level::Level,
    path::Module,
};

pub use llm::{LlmConfig, LlmGenerator};

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("content generator not configured: {0} is missing")]
    NotConfigured(&'static str),

    #[error("HTTP request failed: {0}")]
    Http(#[from] Box<ureq::Error>),

    #[error("Failed to read response body: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server returned an error: {status}")]
    Server { status: u16 },

    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("generator returned no content")]
    Empty,
}

/// Produces lesson bodies and new modules on request.
pub trait ContentGenerator {
    fn generate_lesson(
        &self,
        request: &LessonRequest,
    ) -> Result<GeneratedContent, GenerationError>;

    /// `existing_titles` lists every module already on the path so the
    /// generator can avoid repeating topics.
    fn generate_modules(
        &self,
        level: Level,
        existing_titles: &[String],
    ) -> Result<Vec<Module>, GenerationError>;
}

impl<G: ContentGenerator + ?Sized> ContentGenerator for &G {
    fn generate_lesson(
        &self,
        request: &LessonRequest,
    ) -> Result<GeneratedContent, GenerationError> {
        (**self).generate_lesson(request)
    }

    fn generate_modules(
        &self,
        level: Level,
        existing_titles: &[String],
    ) -> Result<Vec<Module>, GenerationError> {
        (**self).generate_modules(level, existing_titles)
    }
}
