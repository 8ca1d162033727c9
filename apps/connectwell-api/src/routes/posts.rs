//! Post and comment endpoints. Neither is persisted yet; both answer 501.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};

use crate::actions::{self, ActionResult};
use crate::error::{ApiError, ApiErrorBody};
use crate::models::post::{Comment, NewComment, NewPost};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/communities/{id}/posts", post(create_post))
        .route(
            "/communities/{id}/posts/{post_id}/comments",
            post(add_comment),
        )
}

#[utoipa::path(
    post,
    path = "/api/v1/communities/{id}/posts",
    tag = "Posts",
    params(("id" = String, Path, description = "Community ID")),
    request_body = NewPost,
    responses(
        (status = 501, description = "Post creation is not available", body = ActionResult),
    ),
)]
pub async fn create_post(
    Path(id): Path<String>,
    Json(body): Json<NewPost>,
) -> (StatusCode, Json<ActionResult>) {
    let result = actions::posts::create_post_in_community(&id, &body);
    (result.status(StatusCode::CREATED), Json(result))
}

#[utoipa::path(
    post,
    path = "/api/v1/communities/{id}/posts/{post_id}/comments",
    tag = "Posts",
    params(
        ("id" = String, Path, description = "Community ID"),
        ("post_id" = String, Path, description = "Post ID"),
    ),
    request_body = NewComment,
    responses(
        (status = 201, description = "Comment added", body = Comment),
        (status = 501, description = "Commenting is not available", body = ApiErrorBody),
    ),
)]
pub async fn add_comment(
    Path((id, post_id)): Path<(String, String)>,
    Json(body): Json<NewComment>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    actions::posts::add_comment_to_post(&id, &post_id, &body)
        .map(|comment| (StatusCode::CREATED, Json(comment)))
        .ok_or_else(|| ApiError::not_implemented("Adding comments is not implemented yet."))
}
