//! Profile actions.

use crate::actions::{ActionPhase, ActionResult, FailureKind, Transition, GENERIC_FAILURE};
use crate::error::StoreError;
use crate::models::profile::{ProfilePatch, UserProfile};
use crate::revalidate::PROFILE_PATH;
use crate::validation::{validate_profile_form, ProfileForm};
use crate::AppState;

pub async fn update_user_profile(
    state: &AppState,
    user_id: &str,
    display_name: Option<&str>,
    form: ProfileForm,
) -> ActionResult {
    let mut t = Transition::start("update_user_profile");

    t.enter(ActionPhase::Validating);
    let errors = validate_profile_form(&form);
    if !errors.is_empty() {
        t.enter(ActionPhase::Rejected);
        return ActionResult::rejected(errors);
    }

    t.enter(ActionPhase::Persisting);
    let patch = ProfilePatch {
        display_name: display_name.map(str::to_string),
        bio: form.bio.map(|s| s.trim().to_string()),
        medical_conditions: form.medical_conditions.map(|s| s.trim().to_string()),
        avatar: form.avatar_file.as_ref().map(|u| u.to_data_uri()),
        banner_image: form.banner_file.as_ref().map(|u| u.to_data_uri()),
    };

    match state.store.upsert_profile(user_id, patch).await {
        Ok(_) => {
            t.enter(ActionPhase::Committed);
            state.revalidator.revalidate([PROFILE_PATH]);
            tracing::info!(%user_id, "profile updated");
            ActionResult::committed("Profile updated successfully!")
        }
        Err(err) => {
            tracing::error!(%err, %user_id, "failed to update profile");
            t.enter(ActionPhase::Failed(FailureKind::Store));
            ActionResult::failed(FailureKind::Store, GENERIC_FAILURE)
        }
    }
}

/// `Ok(None)` when the user has never saved a profile.
pub async fn get_user_profile(
    state: &AppState,
    user_id: &str,
) -> Result<Option<UserProfile>, StoreError> {
    state.store.get_profile(user_id).await
}
