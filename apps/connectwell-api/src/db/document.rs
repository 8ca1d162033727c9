//! Versioned document encoding for records kept in the content store.
//!
//! Each stored document carries a `schema_version`. Writes always use
//! [`CURRENT_SCHEMA_VERSION`]; reads upgrade older documents in memory. The
//! upgraded form is written back only on the next regular write.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::models::community::{self, Community, IconStatus, DEFAULT_RULES};
use crate::models::profile::UserProfile;

pub const CURRENT_SCHEMA_VERSION: i32 = 1;

pub const COMMUNITIES: &str = "community";
pub const PROFILES: &str = "profile";

/// A document as it sits in a store, before decoding.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: String,
    pub schema_version: i32,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Serialize a record for storage. The id is the document key and is not
/// duplicated in the body; posts are not persisted.
pub fn encode_community(community: &Community) -> Result<Value, StoreError> {
    let mut value = encode(community)?;
    if let Value::Object(ref mut obj) = value {
        obj.remove("id");
        obj.remove("posts");
    }
    Ok(value)
}

pub fn decode_community(doc: StoredDocument) -> Result<Community, StoreError> {
    let mut obj = into_object(doc.data, &doc.id)?;
    match doc.schema_version {
        0 => upgrade_community_v0(&mut obj, doc.created_at, doc.updated_at),
        CURRENT_SCHEMA_VERSION => {}
        v => {
            return Err(StoreError::Read(format!(
                "community {} has unsupported schema version {v}",
                doc.id
            )))
        }
    }
    obj.insert("id".into(), Value::String(doc.id.clone()));
    obj.remove("posts");
    decode(Value::Object(obj), &doc.id)
}

pub fn encode_profile(profile: &UserProfile) -> Result<Value, StoreError> {
    let mut value = encode(profile)?;
    if let Value::Object(ref mut obj) = value {
        obj.remove("userId");
    }
    Ok(value)
}

pub fn decode_profile(doc: StoredDocument) -> Result<UserProfile, StoreError> {
    if doc.schema_version != CURRENT_SCHEMA_VERSION {
        return Err(StoreError::Read(format!(
            "profile {} has unsupported schema version {}",
            doc.id, doc.schema_version
        )));
    }
    let mut obj = into_object(doc.data, &doc.id)?;
    obj.insert("userId".into(), Value::String(doc.id.clone()));
    obj.entry("updatedAt")
        .or_insert_with(|| Value::String(doc.updated_at.to_rfc3339()));
    decode(Value::Object(obj), &doc.id)
}

/// Version 0 documents were written field-by-field without a fixed shape.
/// Fill every field the current schema requires.
fn upgrade_community_v0(
    obj: &mut Map<String, Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) {
    let name = string_field(obj, "name");
    let description = string_field(obj, "description");

    obj.entry("longDescription")
        .or_insert_with(|| Value::String(description.clone()));
    obj.entry("members").or_insert(Value::from(0));
    obj.entry("postsCount").or_insert(Value::from(0));
    obj.entry("rules")
        .or_insert_with(|| Value::String(DEFAULT_RULES.to_string()));
    obj.entry("foundedDate").or_insert_with(|| {
        Value::String(connectwell_common::display::founded_label(created_at))
    });
    obj.entry("image")
        .or_insert_with(|| Value::String(community::placeholder_icon_url(&name)));
    obj.entry("imageHint")
        .or_insert_with(|| Value::String(community::image_hint(&name)));
    obj.entry("bannerImage")
        .or_insert_with(|| Value::String(community::placeholder_banner_url(&name)));
    obj.entry("bannerImageHint")
        .or_insert_with(|| Value::String(community::banner_hint(&name)));

    if !obj.contains_key("iconStatus") {
        let image = string_field(obj, "image");
        let status = if community::is_placeholder(&image) {
            IconStatus::Placeholder
        } else if image.starts_with("data:") {
            IconStatus::Generated
        } else {
            IconStatus::Uploaded
        };
        obj.insert(
            "iconStatus".into(),
            serde_json::to_value(status).unwrap_or(Value::Null),
        );
    }

    obj.entry("createdAt")
        .or_insert_with(|| Value::String(created_at.to_rfc3339()));
    obj.entry("updatedAt")
        .or_insert_with(|| Value::String(updated_at.to_rfc3339()));
}

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn into_object(data: Value, id: &str) -> Result<Map<String, Value>, StoreError> {
    match data {
        Value::Object(obj) => Ok(obj),
        other => Err(StoreError::Read(format!(
            "document {id} is not an object: {other}"
        ))),
    }
}

fn encode<T: Serialize>(record: &T) -> Result<Value, StoreError> {
    serde_json::to_value(record).map_err(|e| StoreError::Write(e.to_string()))
}

fn decode<T: DeserializeOwned>(value: Value, id: &str) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Read(format!("document {id}: {e}")))
}
