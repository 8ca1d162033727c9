use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A user-authored message within a community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: String,
    pub user_avatar_hint: String,
    pub title: String,
    pub content: String,
    /// Number of comments, kept separately from `comment_objects` because the
    /// list may be truncated.
    pub comments: i64,
    #[serde(default)]
    pub comment_objects: Vec<Comment>,
    pub upvotes: i64,
    /// Viewer-relative; always false when read from a store.
    #[serde(default)]
    pub is_upvoted_by_user: bool,
    pub created_at: DateTime<Utc>,
}

/// A reply attached to a post or a research article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_avatar: String,
    pub user_avatar_hint: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Research-article comments only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_liked_by_user: Option<bool>,
}

/// Fields accepted by the (not yet persisted) post creation action.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

/// Fields accepted by the (not yet persisted) comment action.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub text: String,
}
