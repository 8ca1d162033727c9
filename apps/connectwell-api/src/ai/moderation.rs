//! Content moderation backed by a Gemini text model.

use async_trait::async_trait;
use serde::Deserialize;

use crate::ai::gemini::{
    GeminiClient, GeminiError, GenerateContentRequest, GenerationConfig, SafetySetting,
};
use crate::ai::{ModerationService, ModerationVerdict};
use crate::error::ModerationError;

/// Per-category blocking thresholds sent with every moderation request.
///
/// Dangerous content is sent as `BLOCK_NONE`, so only the classifier's own
/// verdict covers that category. Whether it should be stricter is an open
/// question.
pub const SAFETY_SETTINGS: [SafetySetting; 4] = [
    SafetySetting {
        category: "HARM_CATEGORY_HATE_SPEECH",
        threshold: "BLOCK_ONLY_HIGH",
    },
    SafetySetting {
        category: "HARM_CATEGORY_DANGEROUS_CONTENT",
        threshold: "BLOCK_NONE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_HARASSMENT",
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        threshold: "BLOCK_LOW_AND_ABOVE",
    },
];

const INSTRUCTIONS: &str = "You are a content moderator for ConnectWell, an online support \
platform for people living with health conditions. Decide whether the content below is \
harmful. Harmful content includes hate speech, harassment, sexually explicit material, \
and encouragement of self-harm. Frank discussion of symptoms, treatments and personal \
struggles is NOT harmful.\n\
Respond only with JSON of the form {\"isHarmful\": boolean, \"reason\": string}. \
The reason must briefly explain the decision.\n\nContent:\n";

pub fn moderation_prompt(text: &str) -> String {
    format!("{INSTRUCTIONS}{text}")
}

pub struct GeminiModerator {
    client: GeminiClient,
    model: String,
}

impl GeminiModerator {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVerdict {
    is_harmful: bool,
    #[serde(default)]
    reason: String,
}

#[async_trait]
impl ModerationService for GeminiModerator {
    async fn moderate(&self, text: &str) -> Result<ModerationVerdict, ModerationError> {
        let mut request = GenerateContentRequest::user_text(moderation_prompt(text));
        request.generation_config = Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            ..Default::default()
        });
        request.safety_settings = SAFETY_SETTINGS.to_vec();

        let response = self
            .client
            .generate_content(&self.model, &request)
            .await
            .map_err(|e| match e {
                GeminiError::Unconfigured => ModerationError::Unconfigured,
                GeminiError::Transport(msg) => ModerationError::Transport(msg),
                GeminiError::Status(code) => ModerationError::Status(code),
            })?;

        // A prompt the safety filter refuses to even classify is treated as
        // harmful.
        if let Some(reason) = response.block_reason() {
            tracing::info!(%reason, "moderation prompt blocked by safety filter");
            return Ok(ModerationVerdict {
                is_harmful: true,
                reason: format!("Blocked by safety filter ({reason})"),
            });
        }

        parse_verdict(&response.text())
    }
}

/// Parse the model's JSON answer, tolerating a surrounding code fence.
pub fn parse_verdict(text: &str) -> Result<ModerationVerdict, ModerationError> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let raw: RawVerdict = serde_json::from_str(body)
        .map_err(|e| ModerationError::InvalidVerdict(format!("{e}: {body}")))?;

    Ok(ModerationVerdict {
        is_harmful: raw.is_harmful,
        reason: raw.reason,
    })
}
