use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;

use crate::db::document::{self, StoredDocument, COMMUNITIES, CURRENT_SCHEMA_VERSION, PROFILES};
use crate::error::StoreError;
use crate::models::community::{Community, CommunityPatch, NewCommunity};
use crate::models::profile::{ProfilePatch, UserProfile};

/// Create/read/update access to community and profile documents.
///
/// `update_*` methods are read-then-write without a cross-document
/// transaction: two concurrent edits of the same record can lose one of them.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Insert a new community; the store assigns its id.
    async fn create_community(&self, new: NewCommunity) -> Result<Community, StoreError>;

    /// `Ok(None)` when no community has this id.
    async fn get_community(&self, id: &str) -> Result<Option<Community>, StoreError>;

    /// All communities, in no particular order.
    async fn list_communities(&self) -> Result<Vec<Community>, StoreError>;

    /// Merge `patch` into an existing community.
    async fn update_community(
        &self,
        id: &str,
        patch: CommunityPatch,
    ) -> Result<Community, StoreError>;

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Merge `patch` into the user's profile, creating it if absent.
    async fn upsert_profile(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> Result<UserProfile, StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// Documents kept in process memory, keyed by `(collection, id)`.
///
/// Goes through the same versioned encoding as the Postgres store.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<(&'static str, String), StoredDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a raw document as an import or fixture would, bypassing encoding.
    pub fn seed_raw(&self, collection: &'static str, id: &str, schema_version: i32, data: Value) {
        let now = Utc::now();
        self.docs.lock().insert(
            (collection, id.to_string()),
            StoredDocument {
                id: id.to_string(),
                schema_version,
                data,
                created_at: now,
                updated_at: now,
            },
        );
    }

    fn read(&self, collection: &'static str, id: &str) -> Option<StoredDocument> {
        self.docs.lock().get(&(collection, id.to_string())).cloned()
    }

    fn write(&self, collection: &'static str, doc: StoredDocument) {
        self.docs.lock().insert((collection, doc.id.clone()), doc);
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn create_community(&self, new: NewCommunity) -> Result<Community, StoreError> {
        let now = Utc::now();
        let id = connectwell_common::id::prefixed_ulid(connectwell_common::id::prefix::COMMUNITY);
        let community = new.into_community(id.clone(), now);

        self.write(
            COMMUNITIES,
            StoredDocument {
                id,
                schema_version: CURRENT_SCHEMA_VERSION,
                data: document::encode_community(&community)?,
                created_at: now,
                updated_at: now,
            },
        );

        Ok(community)
    }

    async fn get_community(&self, id: &str) -> Result<Option<Community>, StoreError> {
        self.read(COMMUNITIES, id)
            .map(document::decode_community)
            .transpose()
    }

    async fn list_communities(&self) -> Result<Vec<Community>, StoreError> {
        let docs: Vec<StoredDocument> = self
            .docs
            .lock()
            .iter()
            .filter(|((collection, _), _)| *collection == COMMUNITIES)
            .map(|(_, doc)| doc.clone())
            .collect();

        docs.into_iter().map(document::decode_community).collect()
    }

    async fn update_community(
        &self,
        id: &str,
        patch: CommunityPatch,
    ) -> Result<Community, StoreError> {
        let doc = self
            .read(COMMUNITIES, id)
            .ok_or_else(|| StoreError::NotFound {
                collection: COMMUNITIES,
                id: id.to_string(),
            })?;
        let created_at = doc.created_at;

        let now = Utc::now();
        let mut community = document::decode_community(doc)?;
        community.apply(patch, now);

        self.write(
            COMMUNITIES,
            StoredDocument {
                id: id.to_string(),
                schema_version: CURRENT_SCHEMA_VERSION,
                data: document::encode_community(&community)?,
                created_at,
                updated_at: now,
            },
        );

        Ok(community)
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        self.read(PROFILES, user_id)
            .map(document::decode_profile)
            .transpose()
    }

    async fn upsert_profile(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> Result<UserProfile, StoreError> {
        let now = Utc::now();
        let existing = self.read(PROFILES, user_id);
        let created_at = existing.as_ref().map_or(now, |d| d.created_at);

        let mut profile = match existing {
            Some(doc) => document::decode_profile(doc)?,
            None => UserProfile::empty(user_id, now),
        };
        profile.apply(patch, now);

        self.write(
            PROFILES,
            StoredDocument {
                id: user_id.to_string(),
                schema_version: CURRENT_SCHEMA_VERSION,
                data: document::encode_profile(&profile)?,
                created_at,
                updated_at: now,
            },
        );

        Ok(profile)
    }
}
