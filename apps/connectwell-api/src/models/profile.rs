use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Profile details a user maintains about themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub medical_conditions: String,
    /// Inline `data:` URI.
    #[serde(default)]
    pub avatar: Option<String>,
    /// Inline `data:` URI.
    #[serde(default)]
    pub banner_image: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Merge-style profile update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub medical_conditions: Option<String>,
    pub avatar: Option<String>,
    pub banner_image: Option<String>,
}

impl UserProfile {
    pub fn empty(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            display_name: None,
            bio: String::new(),
            medical_conditions: String::new(),
            avatar: None,
            banner_image: None,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: ProfilePatch, now: DateTime<Utc>) {
        if let Some(v) = patch.display_name {
            self.display_name = Some(v);
        }
        if let Some(v) = patch.bio {
            self.bio = v;
        }
        if let Some(v) = patch.medical_conditions {
            self.medical_conditions = v;
        }
        if let Some(v) = patch.avatar {
            self.avatar = Some(v);
        }
        if let Some(v) = patch.banner_image {
            self.banner_image = Some(v);
        }
        self.updated_at = now;
    }
}
