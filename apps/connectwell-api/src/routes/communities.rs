//! Community endpoints.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{patch, post};
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::actions::{self, ActionResult};
use crate::error::{ApiError, ApiErrorBody};
use crate::models::community::Community;
use crate::routes::forms;
use crate::view::CommunityView;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/communities",
            post(create_community)
                .layer(DefaultBodyLimit::disable())
                .get(list_communities),
        )
        .route(
            "/communities/{id}",
            patch(update_community)
                .layer(DefaultBodyLimit::disable())
                .get(get_community),
        )
        .route("/communities/{id}/icon", post(regenerate_icon))
}

// ---------------------------------------------------------------------------
// POST /api/v1/communities
// ---------------------------------------------------------------------------

/// Multipart fields: `name`, `description`, `longDescription` (optional),
/// `bannerImageFile` (optional).
#[utoipa::path(
    post,
    path = "/api/v1/communities",
    tag = "Communities",
    responses(
        (status = 201, description = "Community created", body = ActionResult),
        (status = 400, description = "Invalid form fields", body = ActionResult),
        (status = 500, description = "Store failure", body = ActionResult),
    ),
)]
pub async fn create_community(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> (StatusCode, Json<ActionResult>) {
    let result = match forms::read_community_form(multipart).await {
        Ok(form) => actions::communities::create_community(&state, form).await,
        Err(errors) => ActionResult::rejected(errors),
    };
    (result.status(StatusCode::CREATED), Json(result))
}

// ---------------------------------------------------------------------------
// GET /api/v1/communities
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/communities",
    tag = "Communities",
    responses(
        (status = 200, description = "All communities, unordered", body = Vec<Community>),
    ),
)]
pub async fn list_communities(
    State(state): State<AppState>,
) -> Result<Json<Vec<Community>>, ApiError> {
    let list = actions::communities::list_communities(&state).await?;
    Ok(Json(list))
}

// ---------------------------------------------------------------------------
// GET /api/v1/communities/{id}
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/communities/{id}",
    tag = "Communities",
    params(("id" = String, Path, description = "Community ID")),
    responses(
        (status = 200, description = "Community with its posts", body = CommunityView),
        (status = 404, description = "Community not found", body = ApiErrorBody),
    ),
)]
pub async fn get_community(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CommunityView>, ApiError> {
    actions::communities::get_community(&state, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Community not found"))
}

// ---------------------------------------------------------------------------
// PATCH /api/v1/communities/{id}
// ---------------------------------------------------------------------------

/// Multipart fields: `name`, `description`, `longDescription` (optional),
/// `bannerImageFile` (optional).
#[utoipa::path(
    patch,
    path = "/api/v1/communities/{id}",
    tag = "Communities",
    params(("id" = String, Path, description = "Community ID")),
    responses(
        (status = 200, description = "Community updated", body = ActionResult),
        (status = 400, description = "Invalid form fields", body = ActionResult),
        (status = 404, description = "Community not found", body = ActionResult),
        (status = 500, description = "Store failure", body = ActionResult),
    ),
)]
pub async fn update_community(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> (StatusCode, Json<ActionResult>) {
    let result = match forms::read_community_form(multipart).await {
        Ok(form) => actions::communities::update_community(&state, &id, form).await,
        Err(errors) => ActionResult::rejected(errors),
    };
    (result.status(StatusCode::OK), Json(result))
}

// ---------------------------------------------------------------------------
// POST /api/v1/communities/{id}/icon
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IconJobResponse {
    pub community_id: String,
    pub status: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/communities/{id}/icon",
    tag = "Communities",
    params(("id" = String, Path, description = "Community ID")),
    responses(
        (status = 202, description = "Icon generation queued", body = IconJobResponse),
        (status = 404, description = "Community not found", body = ApiErrorBody),
        (status = 409, description = "Community already has an icon", body = ApiErrorBody),
    ),
)]
pub async fn regenerate_icon(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<IconJobResponse>), ApiError> {
    if !actions::communities::request_icon_regeneration(&state, &id).await? {
        return Err(ApiError::conflict("Community already has an icon"));
    }
    Ok((
        StatusCode::ACCEPTED,
        Json(IconJobResponse {
            community_id: id,
            status: "queued".to_string(),
        }),
    ))
}
