//! Community create / edit / read actions.

use chrono::Utc;

use crate::actions::{ActionPhase, ActionResult, FailureKind, Transition, GENERIC_FAILURE};
use crate::enrichment;
use crate::error::{ApiError, StoreError};
use crate::models::community::{self, Community, CommunityPatch, NewCommunity};
use crate::revalidate::{community_path, COMMUNITIES_PATH};
use crate::validation::{validate_community_form, CommunityForm};
use crate::view::CommunityView;
use crate::AppState;

/// Appended to the success message when the icon could not be generated.
pub const ICON_FALLBACK_WARNING: &str =
    " We couldn't generate an icon right now, so a placeholder is shown instead.";

pub async fn create_community(state: &AppState, form: CommunityForm) -> ActionResult {
    let mut t = Transition::start("create_community");

    t.enter(ActionPhase::Validating);
    let errors = validate_community_form(&form);
    if !errors.is_empty() {
        t.enter(ActionPhase::Rejected);
        return ActionResult::rejected(errors);
    }

    t.enter(ActionPhase::Persisting);
    let mut new = NewCommunity::with_placeholders(
        form.name.trim(),
        form.description.trim(),
        &form.long_description_or_default(),
    );
    if let Some(ref upload) = form.banner_image_file {
        new.banner_image = upload.to_data_uri();
    }

    let created = match state.store.create_community(new).await {
        Ok(c) => c,
        Err(err) => {
            tracing::error!(%err, "failed to create community");
            t.enter(ActionPhase::Failed(FailureKind::Store));
            return ActionResult::failed(FailureKind::Store, GENERIC_FAILURE);
        }
    };
    t.enter(ActionPhase::Committed);
    state.revalidator.revalidate([COMMUNITIES_PATH]);
    tracing::info!(community_id = %created.id, name = %created.name, "community created");

    let mut message = format!("Community \"{}\" created successfully!", created.name);

    // The write above is final; enrichment can only add to it.
    if let Err(err) = enrichment::enrich_icon(
        state.store.as_ref(),
        state.images.as_ref(),
        &state.revalidator,
        &created,
    )
    .await
    {
        tracing::warn!(%err, community_id = %created.id, "icon generation failed; keeping placeholder");
        message.push_str(ICON_FALLBACK_WARNING);
    }

    ActionResult::committed(message).with_community(&created.id, &created.name)
}

pub async fn update_community(state: &AppState, id: &str, form: CommunityForm) -> ActionResult {
    let mut t = Transition::start("update_community");

    t.enter(ActionPhase::Validating);
    let errors = validate_community_form(&form);
    if !errors.is_empty() {
        t.enter(ActionPhase::Rejected);
        return ActionResult::rejected(errors);
    }

    t.enter(ActionPhase::Persisting);
    // Read-then-write: a concurrent edit between these two calls is lost.
    let current = match state.store.get_community(id).await {
        Ok(Some(c)) => c,
        Ok(None) => return not_found(&mut t, id),
        Err(err) => return store_failure(&mut t, id, err),
    };

    let patch = edit_patch(&current, &form);
    let updated = match state.store.update_community(id, patch).await {
        Ok(c) => c,
        Err(StoreError::NotFound { .. }) => return not_found(&mut t, id),
        Err(err) => return store_failure(&mut t, id, err),
    };
    t.enter(ActionPhase::Committed);
    state
        .revalidator
        .revalidate([COMMUNITIES_PATH.to_string(), community_path(id)]);
    tracing::info!(community_id = %id, "community updated");

    ActionResult::committed(format!("Community \"{}\" updated successfully!", updated.name))
        .with_community(&updated.id, &updated.name)
}

/// Build the merge patch for an edit.
///
/// Images that are still placeholders follow the (possibly new) name.
/// Anything else was uploaded or generated and is kept unless a new banner
/// is supplied.
pub fn edit_patch(current: &Community, form: &CommunityForm) -> CommunityPatch {
    let name = form.name.trim().to_string();
    let mut patch = CommunityPatch {
        description: Some(form.description.trim().to_string()),
        long_description: form.long_description.as_deref().map(|s| s.trim().to_string()),
        ..Default::default()
    };

    if community::is_placeholder(&current.image) {
        patch.image = Some(community::placeholder_icon_url(&name));
        patch.image_hint = Some(community::image_hint(&name));
    }

    if let Some(ref upload) = form.banner_image_file {
        patch.banner_image = Some(upload.to_data_uri());
        patch.banner_image_hint = Some(community::banner_hint(&name));
    } else if community::is_placeholder(&current.banner_image) {
        patch.banner_image = Some(community::placeholder_banner_url(&name));
        patch.banner_image_hint = Some(community::banner_hint(&name));
    }

    patch.name = Some(name);
    patch
}

pub async fn list_communities(state: &AppState) -> Result<Vec<Community>, StoreError> {
    state.store.list_communities().await
}

/// `Ok(None)` when the community does not exist.
pub async fn get_community(state: &AppState, id: &str) -> Result<Option<CommunityView>, StoreError> {
    let community = state.store.get_community(id).await?;
    Ok(community.map(|c| CommunityView::assemble(c, Utc::now())))
}

/// Queue an icon regeneration for a community whose icon is still a
/// placeholder. `Ok(false)` means the community already has a real icon.
pub async fn request_icon_regeneration(state: &AppState, id: &str) -> Result<bool, ApiError> {
    let community = state
        .store
        .get_community(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Community not found"))?;

    if !community::is_placeholder(&community.image) {
        return Ok(false);
    }
    state.enrichment.enqueue(id)?;
    Ok(true)
}

fn not_found(t: &mut Transition, id: &str) -> ActionResult {
    tracing::info!(community_id = %id, "edit of missing community");
    t.enter(ActionPhase::Failed(FailureKind::NotFound));
    ActionResult::failed(FailureKind::NotFound, "Community not found.")
}

fn store_failure(t: &mut Transition, id: &str, err: StoreError) -> ActionResult {
    tracing::error!(%err, community_id = %id, "failed to update community");
    t.enter(ActionPhase::Failed(FailureKind::Store));
    ActionResult::failed(FailureKind::Store, GENERIC_FAILURE)
}
