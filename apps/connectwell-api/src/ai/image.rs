//! Image generation backed by an image-capable Gemini model.

use async_trait::async_trait;

use crate::ai::gemini::{GeminiClient, GeminiError, GenerateContentRequest, GenerationConfig};
use crate::ai::{GeneratedImage, ImageGenerator};
use crate::error::GenerationError;

pub struct GeminiImageGenerator {
    client: GeminiClient,
    model: String,
}

impl GeminiImageGenerator {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ImageGenerator for GeminiImageGenerator {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, GenerationError> {
        let mut request = GenerateContentRequest::user_text(prompt);
        // The image models only answer when both modalities are requested.
        request.generation_config = Some(GenerationConfig {
            response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            ..Default::default()
        });

        let response = self
            .client
            .generate_content(&self.model, &request)
            .await
            .map_err(|e| match e {
                GeminiError::Unconfigured => GenerationError::Unconfigured,
                GeminiError::Transport(msg) => GenerationError::Transport(msg),
                GeminiError::Status(code) => GenerationError::Status(code),
            })?;

        let image = response
            .parts()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|d| d.mime_type.starts_with("image/") && !d.data.is_empty())
            .map(|d| GeneratedImage {
                image_data_uri: format!("data:{};base64,{}", d.mime_type, d.data),
            })
            .ok_or(GenerationError::NoImage);
        image
    }
}

/// Prompt for a community icon.
pub fn community_icon_prompt(name: &str, description: &str) -> String {
    format!(
        "Create a simple, friendly, minimalist icon for an online health support community \
named \"{name}\". The community is about: {description}. Use soft, calming colors and a \
flat style. Do not include any text or letters in the image."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_prompt_mentions_name_and_description() {
        let prompt = community_icon_prompt("Asthma Circle", "breathing easier together");
        assert!(prompt.contains("\"Asthma Circle\""));
        assert!(prompt.contains("breathing easier together"));
    }
}
