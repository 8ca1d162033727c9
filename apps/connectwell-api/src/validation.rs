//! Form validation. Every function here is pure: it takes the submitted
//! fields and returns the field-keyed messages to show next to each input.
//! An empty map means the form is valid.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine};

/// Field name → user-facing message. Keys match the form field names the
/// client submitted (`name`, `longDescription`, `avatarFile`, ...).
pub type FieldErrors = BTreeMap<String, String>;

pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

const MB: usize = 1024 * 1024;
pub const MAX_AVATAR_BYTES: usize = 2 * MB;
pub const MAX_PROFILE_BANNER_BYTES: usize = 5 * MB;
pub const MAX_COMMUNITY_BANNER_BYTES: usize = 5 * MB;

pub const MAX_COMMUNITY_NAME_CHARS: usize = 100;
pub const MAX_BIO_CHARS: usize = 500;
pub const MAX_MEDICAL_CONDITIONS_CHARS: usize = 300;

/// An uploaded file as received from a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// `data:<mime>;base64,<payload>`, the inline form images are stored in.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.content_type, STANDARD.encode(&self.bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

// ---------------------------------------------------------------------------
// Community forms
// ---------------------------------------------------------------------------

/// Fields of the create and edit community forms.
#[derive(Debug, Clone, Default)]
pub struct CommunityForm {
    pub name: String,
    pub description: String,
    /// On create, falls back to the description when omitted. On edit, an
    /// omitted value leaves the stored one untouched.
    pub long_description: Option<String>,
    pub banner_image_file: Option<Upload>,
}

impl CommunityForm {
    pub fn long_description_or_default(&self) -> String {
        self.long_description
            .as_deref()
            .unwrap_or(&self.description)
            .trim()
            .to_string()
    }
}

pub fn validate_community_form(form: &CommunityForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    check_community_name(&mut errors, &form.name);
    check_required(&mut errors, "description", &form.description, "Description is required.");
    if let Some(ref long) = form.long_description {
        check_required(
            &mut errors,
            "longDescription",
            long,
            "Detailed description is required.",
        );
    }
    if let Some(ref upload) = form.banner_image_file {
        check_image(&mut errors, "bannerImageFile", upload, MAX_COMMUNITY_BANNER_BYTES);
    }
    errors
}

// ---------------------------------------------------------------------------
// Profile form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub bio: Option<String>,
    pub medical_conditions: Option<String>,
    pub avatar_file: Option<Upload>,
    pub banner_file: Option<Upload>,
}

pub fn validate_profile_form(form: &ProfileForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Some(ref bio) = form.bio {
        check_max_chars(&mut errors, "bio", bio, MAX_BIO_CHARS, "Bio");
    }
    if let Some(ref conditions) = form.medical_conditions {
        check_max_chars(
            &mut errors,
            "medicalConditions",
            conditions,
            MAX_MEDICAL_CONDITIONS_CHARS,
            "Medical conditions",
        );
    }
    if let Some(ref upload) = form.avatar_file {
        check_image(&mut errors, "avatarFile", upload, MAX_AVATAR_BYTES);
    }
    if let Some(ref upload) = form.banner_file {
        check_image(&mut errors, "bannerFile", upload, MAX_PROFILE_BANNER_BYTES);
    }
    errors
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

fn check_community_name(errors: &mut FieldErrors, name: &str) {
    let name = name.trim();
    if name.is_empty() {
        errors.insert("name".into(), "Community name is required.".into());
    } else if name.chars().count() > MAX_COMMUNITY_NAME_CHARS {
        errors.insert(
            "name".into(),
            format!("Community name must be {MAX_COMMUNITY_NAME_CHARS} characters or fewer."),
        );
    }
}

fn check_required(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field.into(), message.into());
    }
}

fn check_max_chars(errors: &mut FieldErrors, field: &str, value: &str, max: usize, label: &str) {
    if value.chars().count() > max {
        errors.insert(
            field.into(),
            format!("{label} must be {max} characters or fewer."),
        );
    }
}

pub fn image_too_large(max_bytes: usize) -> String {
    format!("Image must be {}MB or smaller.", max_bytes / MB)
}

fn check_image(errors: &mut FieldErrors, field: &str, upload: &Upload, max_bytes: usize) {
    if upload.size() > max_bytes {
        errors.insert(field.into(), image_too_large(max_bytes));
    } else if !ALLOWED_IMAGE_TYPES.contains(&upload.content_type.as_str()) {
        errors.insert(
            field.into(),
            "Only JPEG, PNG, GIF, or WEBP images are allowed.".into(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, size: usize) -> Upload {
        Upload {
            file_name: Some("file".into()),
            content_type: content_type.into(),
            bytes: vec![0u8; size],
        }
    }

    fn community(name: &str, description: &str, long: Option<&str>) -> CommunityForm {
        CommunityForm {
            name: name.into(),
            description: description.into(),
            long_description: long.map(Into::into),
            banner_image_file: None,
        }
    }

    #[test]
    fn blank_community_fields_each_get_an_error() {
        let errors = validate_community_form(&community("  ", "\t", Some(" ")));
        assert_eq!(
            errors.keys().collect::<Vec<_>>(),
            vec!["description", "longDescription", "name"]
        );
        assert!(errors.values().all(|m| !m.is_empty()));
    }

    #[test]
    fn valid_community_has_no_errors() {
        assert!(validate_community_form(&community("Diabetes Support", "desc", Some("desc"))).is_empty());
        assert!(validate_community_form(&community("Diabetes Support", "desc", None)).is_empty());
    }

    #[test]
    fn long_description_defaults_to_description() {
        let form = community("A", " short ", None);
        assert_eq!(form.long_description_or_default(), "short");
    }

    #[test]
    fn community_name_length_ceiling() {
        let errors = validate_community_form(&community(&"a".repeat(101), "d", None));
        assert!(errors.contains_key("name"));
        assert!(validate_community_form(&community(&"a".repeat(100), "d", None)).is_empty());
    }

    #[test]
    fn community_banner_size_and_type() {
        let mut form = community("A", "d", None);
        form.banner_image_file = Some(upload("image/png", MAX_COMMUNITY_BANNER_BYTES + 1));
        assert!(validate_community_form(&form).contains_key("bannerImageFile"));

        form.banner_image_file = Some(upload("image/svg+xml", 10));
        assert!(validate_community_form(&form).contains_key("bannerImageFile"));

        form.banner_image_file = Some(upload("image/webp", MAX_COMMUNITY_BANNER_BYTES));
        assert!(validate_community_form(&form).is_empty());
    }

    #[test]
    fn avatar_over_two_megabytes_is_rejected() {
        let form = ProfileForm {
            avatar_file: Some(upload("image/jpeg", MAX_AVATAR_BYTES + 1)),
            ..Default::default()
        };
        let errors = validate_profile_form(&form);
        assert_eq!(errors.get("avatarFile").map(String::as_str), Some("Image must be 2MB or smaller."));
    }

    #[test]
    fn avatar_with_disallowed_type_is_rejected() {
        let form = ProfileForm {
            avatar_file: Some(upload("application/pdf", 100)),
            ..Default::default()
        };
        assert!(validate_profile_form(&form).contains_key("avatarFile"));
    }

    #[test]
    fn profile_text_ceilings() {
        let form = ProfileForm {
            bio: Some("x".repeat(MAX_BIO_CHARS + 1)),
            medical_conditions: Some("y".repeat(MAX_MEDICAL_CONDITIONS_CHARS + 1)),
            ..Default::default()
        };
        let errors = validate_profile_form(&form);
        assert!(errors.contains_key("bio"));
        assert!(errors.contains_key("medicalConditions"));

        let ok = ProfileForm {
            bio: Some("x".repeat(MAX_BIO_CHARS)),
            medical_conditions: Some("y".repeat(MAX_MEDICAL_CONDITIONS_CHARS)),
            banner_file: Some(upload("image/gif", MAX_PROFILE_BANNER_BYTES)),
            ..Default::default()
        };
        assert!(validate_profile_form(&ok).is_empty());
    }

    #[test]
    fn data_uri_format() {
        let up = Upload {
            file_name: None,
            content_type: "image/png".into(),
            bytes: b"hi".to_vec(),
        };
        assert_eq!(up.to_data_uri(), "data:image/png;base64,aGk=");
    }
}
