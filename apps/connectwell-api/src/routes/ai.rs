//! Direct access to the moderation and image generation gateways.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::ai::{GeneratedImage, ModerationVerdict};
use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/moderation", post(moderate_content))
        .route("/images", post(generate_image))
}

// ---------------------------------------------------------------------------
// POST /api/v1/moderation
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct ModerateRequest {
    pub text: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/moderation",
    tag = "AI",
    request_body = ModerateRequest,
    responses(
        (status = 200, description = "Moderation verdict", body = ModerationVerdict),
        (status = 400, description = "Empty text", body = ApiErrorBody),
        (status = 502, description = "Moderation unavailable", body = ApiErrorBody),
    ),
)]
pub async fn moderate_content(
    State(state): State<AppState>,
    Json(body): Json<ModerateRequest>,
) -> Result<Json<ModerationVerdict>, ApiError> {
    if body.text.trim().is_empty() {
        return Err(required("text"));
    }
    let verdict = state.moderator.moderate(&body.text).await?;
    if verdict.is_harmful {
        tracing::info!(reason = %verdict.reason, "content flagged");
    }
    Ok(Json(verdict))
}

// ---------------------------------------------------------------------------
// POST /api/v1/images
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateImageRequest {
    pub prompt: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/images",
    tag = "AI",
    request_body = GenerateImageRequest,
    responses(
        (status = 200, description = "Generated image", body = GeneratedImage),
        (status = 400, description = "Empty prompt", body = ApiErrorBody),
        (status = 502, description = "Generation failed", body = ApiErrorBody),
    ),
)]
pub async fn generate_image(
    State(state): State<AppState>,
    Json(body): Json<GenerateImageRequest>,
) -> Result<Json<GeneratedImage>, ApiError> {
    if body.prompt.trim().is_empty() {
        return Err(required("prompt"));
    }
    Ok(Json(state.images.generate_image(&body.prompt).await?))
}

fn required(field: &str) -> ApiError {
    ApiError::validation(vec![FieldError {
        field: field.to_string(),
        message: format!("{field} is required"),
    }])
}
