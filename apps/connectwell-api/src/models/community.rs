use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::post::Post;

/// Rules every new community starts with.
pub const DEFAULT_RULES: &str = "1. Be kind and respectful. Everyone here is navigating something hard.\n\
2. Share experiences, not medical advice. Always consult a qualified professional.\n\
3. Protect privacy. Do not share personal or health information about others.\n\
4. No spam, advertising, or self-promotion.\n\
5. Report harmful content to the moderators instead of engaging with it.";

const PLACEHOLDER_HOST: &str = "https://placehold.co/";
const PLACEHOLDER_ICON: &str = "https://placehold.co/100x100.png";
const PLACEHOLDER_BANNER: &str = "https://placehold.co/1200x400.png";

/// A support community as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Community {
    pub id: String,
    pub name: String,
    pub description: String,
    pub long_description: String,
    pub members: i64,
    pub image: String,
    pub image_hint: String,
    pub banner_image: String,
    pub banner_image_hint: String,
    pub posts_count: i64,
    pub founded_date: String,
    pub rules: String,
    /// Posts are not persisted yet; this is always empty when read from a
    /// store. Rendered through [`crate::view::CommunityView`].
    #[serde(default, skip_serializing)]
    pub posts: Vec<Post>,
    pub icon_status: IconStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Where a community's icon came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IconStatus {
    /// Committed with a placeholder, generation not yet attempted.
    Pending,
    /// Produced by the image model.
    Generated,
    /// Generation failed; the placeholder stays until a retry succeeds.
    Placeholder,
    /// Supplied by the creator.
    Uploaded,
}

/// Fields supplied when inserting a community. The store assigns the id and
/// timestamps.
#[derive(Debug, Clone)]
pub struct NewCommunity {
    pub name: String,
    pub description: String,
    pub long_description: String,
    pub image: String,
    pub image_hint: String,
    pub banner_image: String,
    pub banner_image_hint: String,
    pub icon_status: IconStatus,
}

impl NewCommunity {
    /// Build a community record with placeholder images derived from `name`.
    pub fn with_placeholders(name: &str, description: &str, long_description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            long_description: long_description.to_string(),
            image: placeholder_icon_url(name),
            image_hint: image_hint(name),
            banner_image: placeholder_banner_url(name),
            banner_image_hint: banner_hint(name),
            icon_status: IconStatus::Pending,
        }
    }

    pub fn into_community(self, id: String, now: DateTime<Utc>) -> Community {
        Community {
            id,
            name: self.name,
            description: self.description,
            long_description: self.long_description,
            members: 0,
            image: self.image,
            image_hint: self.image_hint,
            banner_image: self.banner_image,
            banner_image_hint: self.banner_image_hint,
            posts_count: 0,
            founded_date: connectwell_common::display::founded_label(now),
            rules: DEFAULT_RULES.to_string(),
            posts: Vec::new(),
            icon_status: self.icon_status,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Merge-style partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommunityPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub image: Option<String>,
    pub image_hint: Option<String>,
    pub banner_image: Option<String>,
    pub banner_image_hint: Option<String>,
    pub icon_status: Option<IconStatus>,
}

impl Community {
    /// Apply `patch` in place. `founded_date`, `members` and `rules` are never
    /// touched by a patch.
    pub fn apply(&mut self, patch: CommunityPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.name {
            self.name = v;
        }
        if let Some(v) = patch.description {
            self.description = v;
        }
        if let Some(v) = patch.long_description {
            self.long_description = v;
        }
        if let Some(v) = patch.image {
            self.image = v;
        }
        if let Some(v) = patch.image_hint {
            self.image_hint = v;
        }
        if let Some(v) = patch.banner_image {
            self.banner_image = v;
        }
        if let Some(v) = patch.banner_image_hint {
            self.banner_image_hint = v;
        }
        if let Some(v) = patch.icon_status {
            self.icon_status = v;
        }
        self.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// Placeholder images
// ---------------------------------------------------------------------------

/// Icon placeholder: `…/100x100.png?text=<first three characters of name>`.
pub fn placeholder_icon_url(name: &str) -> String {
    let abbrev: String = name.chars().take(3).collect();
    placeholder_url(PLACEHOLDER_ICON, &abbrev)
}

/// Banner placeholder: `…/1200x400.png?text=<name>`.
pub fn placeholder_banner_url(name: &str) -> String {
    placeholder_url(PLACEHOLDER_BANNER, name)
}

/// Whether `url` is one of our generated placeholders rather than an upload
/// or a generated image.
pub fn is_placeholder(url: &str) -> bool {
    url.starts_with(PLACEHOLDER_HOST)
}

/// Alt-text hint for the icon: the first two words of the name, lowercased.
pub fn image_hint(name: &str) -> String {
    name.split_whitespace()
        .take(2)
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn banner_hint(name: &str) -> String {
    let hint = image_hint(name);
    if hint.is_empty() {
        "community banner".to_string()
    } else {
        format!("{hint} banner")
    }
}

fn placeholder_url(base: &str, text: &str) -> String {
    match reqwest::Url::parse_with_params(base, &[("text", text)]) {
        Ok(url) => url.to_string(),
        Err(_) => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_placeholder_uses_first_three_chars() {
        assert_eq!(
            placeholder_icon_url("Diabetes Support"),
            "https://placehold.co/100x100.png?text=Dia"
        );
        assert_eq!(
            placeholder_icon_url("Hé"),
            "https://placehold.co/100x100.png?text=H%C3%A9"
        );
    }

    #[test]
    fn banner_placeholder_encodes_full_name() {
        assert_eq!(
            placeholder_banner_url("Long Covid"),
            "https://placehold.co/1200x400.png?text=Long+Covid"
        );
    }

    #[test]
    fn placeholder_detection() {
        assert!(is_placeholder(&placeholder_icon_url("abc")));
        assert!(!is_placeholder("data:image/png;base64,AAAA"));
    }

    #[test]
    fn hints_use_first_two_words() {
        assert_eq!(image_hint("Type 1 Diabetes Parents"), "type 1");
        assert_eq!(banner_hint("Asthma"), "asthma banner");
    }

    #[test]
    fn new_community_defaults() {
        let now = Utc::now();
        let c = NewCommunity::with_placeholders("Diabetes Support", "desc", "long")
            .into_community("com_1".into(), now);
        assert_eq!(c.rules, DEFAULT_RULES);
        assert_eq!(c.members, 0);
        assert_eq!(c.icon_status, IconStatus::Pending);
        assert!(c.posts.is_empty());
        assert_eq!(c.founded_date, connectwell_common::display::founded_label(now));
    }

    #[test]
    fn apply_patch_leaves_unset_fields() {
        let now = Utc::now();
        let mut c = NewCommunity::with_placeholders("Asthma", "d", "l")
            .into_community("com_1".into(), now);
        c.apply(
            CommunityPatch {
                description: Some("new".into()),
                ..Default::default()
            },
            now,
        );
        assert_eq!(c.name, "Asthma");
        assert_eq!(c.description, "new");
        assert_eq!(c.long_description, "l");
    }
}
