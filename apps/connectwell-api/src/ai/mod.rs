//! Gateways to the external generative-AI services.
//!
//! Both services are opaque: text goes in, a verdict or an image comes out.
//! Route handlers and actions depend on the traits so tests can swap in
//! fakes.

pub mod gemini;
pub mod image;
pub mod moderation;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{GenerationError, ModerationError};

/// Classifier verdict for a piece of user content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModerationVerdict {
    pub is_harmful: bool,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    /// `data:<mime>;base64,<payload>`
    pub image_data_uri: String,
}

#[async_trait]
pub trait ModerationService: Send + Sync {
    /// Classify `text`. Any failure to reach a verdict is an error; callers
    /// must never treat an error as "not harmful".
    async fn moderate(&self, text: &str) -> Result<ModerationVerdict, ModerationError>;
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, GenerationError>;
}
