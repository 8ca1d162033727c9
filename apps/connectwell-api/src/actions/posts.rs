//! Post and comment actions.
//!
//! Posts and comments are not persisted yet. Both actions fail closed so no
//! caller mistakes a dropped submission for a saved one.

use crate::actions::{ActionPhase, ActionResult, FailureKind, Transition};
use crate::models::post::{Comment, NewComment, NewPost};

pub const POSTS_NOT_IMPLEMENTED: &str = "Creating posts is not implemented yet.";

pub fn create_post_in_community(community_id: &str, post: &NewPost) -> ActionResult {
    let mut t = Transition::start("create_post_in_community");
    tracing::warn!(%community_id, title_len = post.title.len(), "post creation requested but not implemented");
    t.enter(ActionPhase::Failed(FailureKind::NotImplemented));
    ActionResult::failed(FailureKind::NotImplemented, POSTS_NOT_IMPLEMENTED)
}

/// Always `None` until comments are persisted.
pub fn add_comment_to_post(community_id: &str, post_id: &str, comment: &NewComment) -> Option<Comment> {
    tracing::warn!(%community_id, %post_id, text_len = comment.text.len(), "comment requested but not implemented");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_creation_fails_closed() {
        let result = create_post_in_community(
            "com_1",
            &NewPost {
                title: "Hello".into(),
                content: "World".into(),
            },
        );
        assert!(!result.success);
        assert_eq!(result.message, POSTS_NOT_IMPLEMENTED);
        assert_eq!(result.phase, ActionPhase::Failed(FailureKind::NotImplemented));
    }

    #[test]
    fn commenting_returns_none() {
        let comment = NewComment { text: "hi".into() };
        assert!(add_comment_to_post("com_1", "post_1", &comment).is_none());
    }
}
