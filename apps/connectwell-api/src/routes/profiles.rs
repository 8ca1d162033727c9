//! Profile endpoints.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};

use crate::actions::{self, ActionResult};
use crate::auth::middleware::AuthUser;
use crate::error::{ApiError, ApiErrorBody};
use crate::models::profile::UserProfile;
use crate::routes::forms;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users/@me/profile",
            patch(update_my_profile).layer(DefaultBodyLimit::disable()),
        )
        .route("/users/{user_id}/profile", get(get_profile))
}

/// Multipart fields: `bio`, `medicalConditions`, `avatarFile`, `bannerFile`.
/// All optional; omitted fields keep their stored value.
#[utoipa::path(
    patch,
    path = "/api/v1/users/@me/profile",
    tag = "Profiles",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile updated", body = ActionResult),
        (status = 400, description = "Invalid form fields", body = ActionResult),
        (status = 401, description = "Not logged in", body = ApiErrorBody),
        (status = 500, description = "Store failure", body = ActionResult),
    ),
)]
pub async fn update_my_profile(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> (StatusCode, Json<ActionResult>) {
    let result = match forms::read_profile_form(multipart).await {
        Ok(form) => {
            actions::profile::update_user_profile(
                &state,
                &user.user_id,
                Some(user.display_name.as_str()),
                form,
            )
            .await
        }
        Err(errors) => ActionResult::rejected(errors),
    };
    (result.status(StatusCode::OK), Json(result))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/profile",
    tag = "Profiles",
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 404, description = "No profile saved", body = ApiErrorBody),
    ),
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    actions::profile::get_user_profile(&state, &user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Profile not found"))
}
