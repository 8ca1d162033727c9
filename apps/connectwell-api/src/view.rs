//! Presentation-ready shapes assembled from stored records.

use chrono::{DateTime, Utc};
use connectwell_common::display::{initials, relative_time};
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::community::Community;
use crate::models::post::{Comment, Post};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommunityView {
    #[serde(flatten)]
    pub community: Community,
    /// Newest first.
    pub posts: Vec<PostView>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_initials: String,
    pub user_avatar: String,
    pub user_avatar_hint: String,
    pub title: String,
    pub content: String,
    pub comments: i64,
    /// Oldest first, as a conversation reads.
    pub comment_objects: Vec<CommentView>,
    pub upvotes: i64,
    pub is_upvoted_by_user: bool,
    pub time: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_initials: String,
    pub user_avatar: String,
    pub user_avatar_hint: String,
    pub text: String,
    pub time: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_liked_by_user: Option<bool>,
}

impl CommunityView {
    pub fn assemble(mut community: Community, now: DateTime<Utc>) -> Self {
        let mut posts = std::mem::take(&mut community.posts);
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self {
            community,
            posts: posts.into_iter().map(|p| PostView::assemble(p, now)).collect(),
        }
    }
}

impl PostView {
    pub fn assemble(post: Post, now: DateTime<Utc>) -> Self {
        let mut comments = post.comment_objects;
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Self {
            user_initials: initials(&post.user_name),
            time: relative_time(post.created_at, now),
            id: post.id,
            user_id: post.user_id,
            user_name: post.user_name,
            user_avatar: post.user_avatar,
            user_avatar_hint: post.user_avatar_hint,
            title: post.title,
            content: post.content,
            comments: post.comments,
            comment_objects: comments
                .into_iter()
                .map(|c| CommentView::assemble(c, now))
                .collect(),
            upvotes: post.upvotes,
            is_upvoted_by_user: post.is_upvoted_by_user,
            created_at: post.created_at,
        }
    }
}

impl CommentView {
    pub fn assemble(comment: Comment, now: DateTime<Utc>) -> Self {
        Self {
            user_initials: initials(&comment.user_name),
            time: relative_time(comment.created_at, now),
            id: comment.id,
            user_id: comment.user_id,
            user_name: comment.user_name,
            user_avatar: comment.user_avatar,
            user_avatar_hint: comment.user_avatar_hint,
            text: comment.text,
            created_at: comment.created_at,
            likes: comment.likes,
            is_liked_by_user: comment.is_liked_by_user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::community::NewCommunity;
    use chrono::Duration;

    fn post(id: &str, user: &str, at: DateTime<Utc>, comments: Vec<Comment>) -> Post {
        Post {
            id: id.into(),
            user_id: "usr_1".into(),
            user_name: user.into(),
            user_avatar: String::new(),
            user_avatar_hint: String::new(),
            title: "t".into(),
            content: "c".into(),
            comments: comments.len() as i64,
            comment_objects: comments,
            upvotes: 0,
            is_upvoted_by_user: false,
            created_at: at,
        }
    }

    fn comment(id: &str, at: DateTime<Utc>) -> Comment {
        Comment {
            id: id.into(),
            user_id: "usr_2".into(),
            user_name: "sam lee".into(),
            user_avatar: String::new(),
            user_avatar_hint: String::new(),
            text: "same here".into(),
            created_at: at,
            likes: None,
            is_liked_by_user: None,
        }
    }

    #[test]
    fn posts_newest_first_comments_oldest_first() {
        let now = Utc::now();
        let mut community = NewCommunity::with_placeholders("Asthma", "d", "l")
            .into_community("com_1".into(), now);
        community.posts = vec![
            post("old", "Ann Bell", now - Duration::days(2), vec![]),
            post(
                "new",
                "Cal Dorn",
                now - Duration::minutes(5),
                vec![
                    comment("c2", now - Duration::minutes(1)),
                    comment("c1", now - Duration::minutes(3)),
                ],
            ),
        ];

        let view = CommunityView::assemble(community, now);
        let ids: Vec<_> = view.posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["new", "old"]);
        assert_eq!(view.posts[0].user_initials, "CD");
        assert_eq!(view.posts[0].time, "5m ago");
        assert_eq!(view.posts[1].time, "2d ago");

        let comment_ids: Vec<_> = view.posts[0]
            .comment_objects
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(comment_ids, ["c1", "c2"]);
        assert_eq!(view.posts[0].comment_objects[0].user_initials, "SL");
    }

    #[test]
    fn view_serializes_community_fields_at_top_level() {
        let now = Utc::now();
        let community = NewCommunity::with_placeholders("Asthma", "d", "l")
            .into_community("com_1".into(), now);
        let value = serde_json::to_value(CommunityView::assemble(community, now)).unwrap();
        assert_eq!(value["id"], "com_1");
        assert_eq!(value["longDescription"], "l");
        assert_eq!(value["posts"], serde_json::json!([]));
    }
}
