//! PostgreSQL-backed content store.
//!
//! Every record is one JSONB document in the `documents` table, keyed by
//! `(collection, id)` and tagged with its schema version.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::OptionalExtension;
use diesel_async::RunQueryDsl;
use serde_json::Value;

use crate::db::document::{self, StoredDocument, COMMUNITIES, CURRENT_SCHEMA_VERSION, PROFILES};
use crate::db::pool::DbPool;
use crate::db::schema::documents;
use crate::db::store::ContentStore;
use crate::error::StoreError;
use crate::models::community::{Community, CommunityPatch, NewCommunity};
use crate::models::profile::{ProfilePatch, UserProfile};

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = documents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct DocumentRow {
    #[allow(dead_code)]
    collection: String,
    id: String,
    schema_version: i32,
    data: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DocumentRow> for StoredDocument {
    fn from(row: DocumentRow) -> Self {
        Self {
            id: row.id,
            schema_version: row.schema_version,
            data: row.data,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = documents)]
struct NewDocument<'a> {
    collection: &'a str,
    id: &'a str,
    schema_version: i32,
    data: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn read(
        &self,
        collection: &'static str,
        id: &str,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let mut conn = self.pool.get().await.map_err(read_err)?;

        let row: Option<DocumentRow> = documents::table
            .find((collection, id))
            .select(DocumentRow::as_select())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(read_err)?;

        Ok(row.map(StoredDocument::from))
    }

    async fn update_data(
        &self,
        collection: &'static str,
        id: &str,
        data: Value,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.get().await?;

        let updated = diesel::update(documents::table.find((collection, id)))
            .set((
                documents::schema_version.eq(CURRENT_SCHEMA_VERSION),
                documents::data.eq(data),
                documents::updated_at.eq(now),
            ))
            .execute(&mut conn)
            .await?;

        if updated == 0 {
            return Err(StoreError::NotFound {
                collection,
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn create_community(&self, new: NewCommunity) -> Result<Community, StoreError> {
        let now = Utc::now();
        let id = connectwell_common::id::prefixed_ulid(connectwell_common::id::prefix::COMMUNITY);
        let community = new.into_community(id, now);

        let mut conn = self.pool.get().await?;
        diesel::insert_into(documents::table)
            .values(NewDocument {
                collection: COMMUNITIES,
                id: &community.id,
                schema_version: CURRENT_SCHEMA_VERSION,
                data: document::encode_community(&community)?,
                created_at: now,
                updated_at: now,
            })
            .execute(&mut conn)
            .await?;

        tracing::debug!(community_id = %community.id, "community document inserted");

        Ok(community)
    }

    async fn get_community(&self, id: &str) -> Result<Option<Community>, StoreError> {
        self.read(COMMUNITIES, id)
            .await?
            .map(document::decode_community)
            .transpose()
    }

    async fn list_communities(&self) -> Result<Vec<Community>, StoreError> {
        let mut conn = self.pool.get().await.map_err(read_err)?;

        let rows: Vec<DocumentRow> = documents::table
            .filter(documents::collection.eq(COMMUNITIES))
            .select(DocumentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(read_err)?;

        rows.into_iter()
            .map(|row| document::decode_community(row.into()))
            .collect()
    }

    async fn update_community(
        &self,
        id: &str,
        patch: CommunityPatch,
    ) -> Result<Community, StoreError> {
        let doc = self
            .read(COMMUNITIES, id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                collection: COMMUNITIES,
                id: id.to_string(),
            })?;

        let now = Utc::now();
        let mut community = document::decode_community(doc)?;
        community.apply(patch, now);

        self.update_data(COMMUNITIES, id, document::encode_community(&community)?, now)
            .await?;

        Ok(community)
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        self.read(PROFILES, user_id)
            .await?
            .map(document::decode_profile)
            .transpose()
    }

    async fn upsert_profile(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> Result<UserProfile, StoreError> {
        let now = Utc::now();
        let mut profile = match self.read(PROFILES, user_id).await? {
            Some(doc) => document::decode_profile(doc)?,
            None => UserProfile::empty(user_id, now),
        };
        profile.apply(patch, now);
        let data = document::encode_profile(&profile)?;

        let mut conn = self.pool.get().await?;
        diesel::insert_into(documents::table)
            .values(NewDocument {
                collection: PROFILES,
                id: user_id,
                schema_version: CURRENT_SCHEMA_VERSION,
                data: data.clone(),
                created_at: now,
                updated_at: now,
            })
            .on_conflict((documents::collection, documents::id))
            .do_update()
            .set((
                documents::schema_version.eq(CURRENT_SCHEMA_VERSION),
                documents::data.eq(data),
                documents::updated_at.eq(now),
            ))
            .execute(&mut conn)
            .await?;

        Ok(profile)
    }
}

fn read_err(err: impl std::fmt::Display) -> StoreError {
    StoreError::Read(err.to_string())
}
