//! Community icon enrichment.
//!
//! A community is committed with a placeholder icon first. Generation runs
//! afterwards: once inline during creation, and again from the background
//! queue whenever a regeneration is requested. A failed generation never
//! touches the committed record beyond marking its icon as a placeholder.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::ai::image::community_icon_prompt;
use crate::ai::ImageGenerator;
use crate::db::store::ContentStore;
use crate::error::{ApiError, GenerationError, StoreError};
use crate::models::community::{self, Community, CommunityPatch, IconStatus};
use crate::revalidate::{community_path, Revalidator, COMMUNITIES_PATH};

/// Attempts per queued job before it is dropped.
pub const ENRICHMENT_MAX_ATTEMPTS: u32 = 3;

const QUEUE_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Generate an icon for `community` and store it.
///
/// On generation failure the icon is marked [`IconStatus::Placeholder`] and
/// the error is returned for the caller to log or report.
pub async fn enrich_icon(
    store: &dyn ContentStore,
    images: &dyn ImageGenerator,
    revalidator: &Revalidator,
    community: &Community,
) -> Result<Community, EnrichmentError> {
    let prompt = community_icon_prompt(&community.name, &community.description);

    match images.generate_image(&prompt).await {
        Ok(image) => {
            let updated = store
                .update_community(
                    &community.id,
                    CommunityPatch {
                        image: Some(image.image_data_uri),
                        icon_status: Some(IconStatus::Generated),
                        ..Default::default()
                    },
                )
                .await?;
            revalidator.revalidate([COMMUNITIES_PATH.to_string(), community_path(&community.id)]);
            tracing::info!(community_id = %community.id, "community icon generated");
            Ok(updated)
        }
        Err(err) => {
            if community.icon_status != IconStatus::Placeholder {
                store
                    .update_community(
                        &community.id,
                        CommunityPatch {
                            icon_status: Some(IconStatus::Placeholder),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
            Err(err.into())
        }
    }
}

#[derive(Debug, Clone)]
struct IconJob {
    community_id: String,
}

/// Background queue of icon regeneration jobs, drained by one worker task.
#[derive(Clone)]
pub struct EnrichmentQueue {
    sender: mpsc::Sender<IconJob>,
}

impl EnrichmentQueue {
    /// Spawn the worker on the current Tokio runtime.
    pub fn spawn(
        store: Arc<dyn ContentStore>,
        images: Arc<dyn ImageGenerator>,
        revalidator: Revalidator,
        retry_delay: Duration,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        tokio::spawn(run_worker(receiver, store, images, revalidator, retry_delay));
        Self { sender }
    }

    /// Queue an icon regeneration for `community_id`.
    pub fn enqueue(&self, community_id: &str) -> Result<(), ApiError> {
        self.sender
            .try_send(IconJob {
                community_id: community_id.to_string(),
            })
            .map_err(|e| {
                tracing::warn!(?e, %community_id, "enrichment queue rejected job");
                ApiError::unavailable("Icon generation is busy; try again shortly")
            })
    }
}

async fn run_worker(
    mut receiver: mpsc::Receiver<IconJob>,
    store: Arc<dyn ContentStore>,
    images: Arc<dyn ImageGenerator>,
    revalidator: Revalidator,
    retry_delay: Duration,
) {
    while let Some(job) = receiver.recv().await {
        process_job(&job, store.as_ref(), images.as_ref(), &revalidator, retry_delay).await;
    }
    tracing::debug!("enrichment worker stopped");
}

async fn process_job(
    job: &IconJob,
    store: &dyn ContentStore,
    images: &dyn ImageGenerator,
    revalidator: &Revalidator,
    retry_delay: Duration,
) {
    for attempt in 1..=ENRICHMENT_MAX_ATTEMPTS {
        let community = match store.get_community(&job.community_id).await {
            Ok(Some(c)) => c,
            Ok(None) => {
                tracing::warn!(community_id = %job.community_id, "icon job for missing community");
                return;
            }
            Err(err) => {
                tracing::error!(%err, community_id = %job.community_id, "icon job read failed");
                return;
            }
        };

        if !community::is_placeholder(&community.image) {
            tracing::debug!(community_id = %community.id, "icon already present; skipping");
            return;
        }

        match enrich_icon(store, images, revalidator, &community).await {
            Ok(_) => return,
            Err(err) => {
                tracing::warn!(%err, attempt, community_id = %community.id, "icon generation attempt failed");
                if attempt < ENRICHMENT_MAX_ATTEMPTS {
                    tokio::time::sleep(retry_delay).await;
                }
            }
        }
    }
    tracing::error!(community_id = %job.community_id, "icon generation gave up");
}
