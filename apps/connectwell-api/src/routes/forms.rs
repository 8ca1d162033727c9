//! Multipart form decoding for the community and profile forms.
//!
//! Form routes run without the router's body limit. Each part is read
//! under its own ceiling instead, and a part that cannot be read becomes a
//! field error, so every form submission answers with an `ActionResult`.

use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::Multipart;

use crate::validation::{
    CommunityForm, FieldErrors, ProfileForm, Upload, MAX_AVATAR_BYTES,
    MAX_COMMUNITY_BANNER_BYTES, MAX_PROFILE_BANNER_BYTES,
};

/// Ceiling for a single text part.
const MAX_TEXT_BYTES: usize = 64 * 1024;

/// Error key for failures that belong to no single field.
const FORM_ERROR_KEY: &str = "form";

const UNREADABLE_FORM: &str = "The form could not be read. Please try again.";
const UNREADABLE_FIELD: &str = "This field could not be read. Please try again.";
const UNREADABLE_FILE: &str = "This file could not be read. Please try again.";

#[derive(Default)]
struct ReadState {
    errors: FieldErrors,
}

impl ReadState {
    fn finish<T>(self, form: T) -> Result<T, FieldErrors> {
        if self.errors.is_empty() {
            Ok(form)
        } else {
            Err(self.errors)
        }
    }
}

pub async fn read_community_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<CommunityForm, FieldErrors> {
    let mut multipart = open(multipart)?;
    let mut form = CommunityForm::default();
    let mut state = ReadState::default();
    while let Some(field) = next_field(&mut multipart, &mut state).await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => form.name = read_text(field, &mut state).await.unwrap_or_default(),
            "description" => {
                form.description = read_text(field, &mut state).await.unwrap_or_default()
            }
            "longDescription" => form.long_description = read_text(field, &mut state).await,
            "bannerImageFile" => {
                form.banner_image_file =
                    read_upload(field, MAX_COMMUNITY_BANNER_BYTES, &mut state).await
            }
            other => tracing::debug!(field = %other, "ignoring unknown community form field"),
        }
    }
    state.finish(form)
}

pub async fn read_profile_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ProfileForm, FieldErrors> {
    let mut multipart = open(multipart)?;
    let mut form = ProfileForm::default();
    let mut state = ReadState::default();
    while let Some(field) = next_field(&mut multipart, &mut state).await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "bio" => form.bio = read_text(field, &mut state).await,
            "medicalConditions" => form.medical_conditions = read_text(field, &mut state).await,
            "avatarFile" => {
                form.avatar_file = read_upload(field, MAX_AVATAR_BYTES, &mut state).await
            }
            "bannerFile" => {
                form.banner_file = read_upload(field, MAX_PROFILE_BANNER_BYTES, &mut state).await
            }
            other => tracing::debug!(field = %other, "ignoring unknown profile form field"),
        }
    }
    state.finish(form)
}

fn open(multipart: Result<Multipart, MultipartRejection>) -> Result<Multipart, FieldErrors> {
    multipart.map_err(|rejection| {
        tracing::warn!(error = %rejection, "request is not a multipart form");
        form_error()
    })
}

fn form_error() -> FieldErrors {
    FieldErrors::from([(FORM_ERROR_KEY.to_string(), UNREADABLE_FORM.to_string())])
}

async fn next_field<'a>(multipart: &'a mut Multipart, state: &mut ReadState) -> Option<Field<'a>> {
    match multipart.next_field().await {
        Ok(field) => field,
        Err(e) => {
            tracing::warn!(error = %e, "failed to read multipart field");
            state.errors.extend(form_error());
            None
        }
    }
}

/// Reads a part up to `limit + 1` bytes. The part's tail past that point is
/// skipped by the next `next_field` call without being buffered.
async fn read_capped(field: &mut Field<'_>, limit: usize) -> Option<Vec<u8>> {
    let mut bytes = Vec::new();
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                bytes.extend_from_slice(&chunk);
                if bytes.len() > limit {
                    bytes.truncate(limit + 1);
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(field = ?field.name(), error = %e, "failed to read form part");
                return None;
            }
        }
    }
    Some(bytes)
}

async fn read_text(mut field: Field<'_>, state: &mut ReadState) -> Option<String> {
    let name = field.name().unwrap_or_default().to_string();
    let Some(bytes) = read_capped(&mut field, MAX_TEXT_BYTES).await else {
        state.errors.insert(name, UNREADABLE_FIELD.to_string());
        return None;
    };
    if bytes.len() > MAX_TEXT_BYTES {
        state.errors.insert(name, "This field is too long.".to_string());
        return None;
    }
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(_) => {
            state.errors.insert(name, "Must be plain text.".to_string());
            None
        }
    }
}

/// Reads at most `max_bytes + 1` bytes of a file part; a larger file is cut
/// there and left for validation to reject by size. Browsers submit an
/// empty part when no file was chosen; that is no upload.
async fn read_upload(mut field: Field<'_>, max_bytes: usize, state: &mut ReadState) -> Option<Upload> {
    let name = field.name().unwrap_or_default().to_string();
    let file_name = field.file_name().map(str::to_string);
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let Some(bytes) = read_capped(&mut field, max_bytes).await else {
        state.errors.insert(name, UNREADABLE_FILE.to_string());
        return None;
    };
    if bytes.is_empty() {
        return None;
    }
    Some(Upload {
        file_name,
        content_type,
        bytes,
    })
}
