pub mod actions;
pub mod ai;
pub mod auth;
pub mod config;
pub mod db;
pub mod enrichment;
pub mod error;
pub mod models;
pub mod revalidate;
pub mod routes;
pub mod validation;
pub mod view;

use std::sync::Arc;

use ai::{ImageGenerator, ModerationService};
use auth::identity::IdentityProvider;
use config::Config;
use db::kv::KeyValueStore;
use db::store::ContentStore;
use enrichment::EnrichmentQueue;
use revalidate::Revalidator;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ContentStore>,
    pub kv: Arc<dyn KeyValueStore>,
    pub config: Arc<Config>,
    pub moderator: Arc<dyn ModerationService>,
    pub images: Arc<dyn ImageGenerator>,
    pub identity: Arc<dyn IdentityProvider>,
    pub revalidator: Revalidator,
    pub enrichment: EnrichmentQueue,
}
