pub mod ai;
pub mod auth;
pub mod communities;
pub mod forms;
pub mod health;
pub mod posts;
pub mod profiles;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::AppState;

/// Body limit for JSON routes. Form routes lift it and cap each part in
/// `forms` instead.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest(
            "/api/v1",
            auth::router()
                .merge(communities::router())
                .merge(posts::router())
                .merge(profiles::router())
                .merge(ai::router()),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::login,
        auth::logout,
        communities::create_community,
        communities::list_communities,
        communities::get_community,
        communities::update_community,
        communities::regenerate_icon,
        posts::create_post,
        posts::add_comment,
        profiles::update_my_profile,
        profiles::get_profile,
        ai::moderate_content,
        ai::generate_image,
    ),
    components(
        schemas(
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            crate::error::FieldError,
            crate::actions::ActionResult,
            crate::models::community::Community,
            crate::models::community::IconStatus,
            crate::models::post::Post,
            crate::models::post::Comment,
            crate::models::post::NewPost,
            crate::models::post::NewComment,
            crate::models::profile::UserProfile,
            crate::view::CommunityView,
            crate::view::PostView,
            crate::view::CommentView,
            crate::ai::ModerationVerdict,
            crate::ai::GeneratedImage,
            health::HealthResponse,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            communities::IconJobResponse,
            ai::ModerateRequest,
            ai::GenerateImageRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Auth", description = "Sessions"),
        (name = "Communities", description = "Community browsing and management"),
        (name = "Posts", description = "Posts and comments"),
        (name = "Profiles", description = "User profiles"),
        (name = "AI", description = "Moderation and image generation"),
    )
)]
pub struct ApiDoc;
