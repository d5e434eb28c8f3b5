//! AI inference layer: Gemini image analysis for fine generation and the
//! streaming assistant chat.

mod error;
pub use error::AiError;

pub mod chat;
pub mod gemini;
pub mod image;
pub mod prompt;
mod wire;

pub use chat::{ChatSession, Persona};
pub use gemini::{DEFAULT_MODEL, GeminiClient};
pub use image::ProcessedImage;

use async_trait::async_trait;
use fineforce_core::AnalysisResult;

/// Turns a processed evidence image into a structured assessment.
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    async fn analyze(&self, image: &ProcessedImage) -> Result<AnalysisResult, AiError>;
}
