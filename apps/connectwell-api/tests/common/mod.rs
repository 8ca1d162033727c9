#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;

use connectwell_api::ai::{GeneratedImage, ImageGenerator, ModerationService, ModerationVerdict};
use connectwell_api::auth::identity::DemoIdentityProvider;
use connectwell_api::config::Config;
use connectwell_api::db::kv::MemoryKv;
use connectwell_api::db::store::{ContentStore, MemoryStore};
use connectwell_api::enrichment::EnrichmentQueue;
use connectwell_api::error::{GenerationError, ModerationError, StoreError};
use connectwell_api::models::community::{Community, CommunityPatch, NewCommunity};
use connectwell_api::models::profile::{ProfilePatch, UserProfile};
use connectwell_api::revalidate::Revalidator;
use connectwell_api::AppState;

pub const FAKE_ICON: &str = "data:image/png;base64,aWNvbg==";

/// Image generator that either always succeeds or always fails, counting calls.
pub struct FakeImages {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeImages {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageGenerator for FakeImages {
    async fn generate_image(&self, _prompt: &str) -> Result<GeneratedImage, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(GenerationError::NoImage);
        }
        Ok(GeneratedImage {
            image_data_uri: FAKE_ICON.to_string(),
        })
    }
}

/// Flags any text containing "hate"; fails outright when `fail` is set.
pub struct FakeModerator {
    pub fail: bool,
}

#[async_trait]
impl ModerationService for FakeModerator {
    async fn moderate(&self, text: &str) -> Result<ModerationVerdict, ModerationError> {
        if self.fail {
            return Err(ModerationError::Transport("connection refused".into()));
        }
        if text.to_lowercase().contains("hate") {
            Ok(ModerationVerdict {
                is_harmful: true,
                reason: "Hateful language".into(),
            })
        } else {
            Ok(ModerationVerdict {
                is_harmful: false,
                reason: String::new(),
            })
        }
    }
}

/// Detail carried by every [`FailingStore`] write error. It must never reach
/// a response body.
pub const STORE_FAILURE_DETAIL: &str = "connection reset by pg-primary-2";

/// Reads go to an in-memory store; every write fails.
#[derive(Default)]
pub struct FailingStore {
    pub inner: MemoryStore,
}

#[async_trait]
impl ContentStore for FailingStore {
    async fn create_community(&self, _new: NewCommunity) -> Result<Community, StoreError> {
        Err(StoreError::Write(STORE_FAILURE_DETAIL.into()))
    }

    async fn get_community(&self, id: &str) -> Result<Option<Community>, StoreError> {
        self.inner.get_community(id).await
    }

    async fn list_communities(&self) -> Result<Vec<Community>, StoreError> {
        self.inner.list_communities().await
    }

    async fn update_community(
        &self,
        _id: &str,
        _patch: CommunityPatch,
    ) -> Result<Community, StoreError> {
        Err(StoreError::Write(STORE_FAILURE_DETAIL.into()))
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        self.inner.get_profile(user_id).await
    }

    async fn upsert_profile(
        &self,
        _user_id: &str,
        _patch: ProfilePatch,
    ) -> Result<UserProfile, StoreError> {
        Err(StoreError::Write(STORE_FAILURE_DETAIL.into()))
    }
}

/// Knobs for the fake AI gateways.
#[derive(Default, Clone, Copy)]
pub struct Fakes {
    pub images_fail: bool,
    pub moderation_fails: bool,
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub images: Arc<FakeImages>,
}

/// Build an [`AppState`] over in-memory storage and fake AI gateways.
pub fn test_state(fakes: Fakes) -> (AppState, Arc<FakeImages>) {
    test_state_with_store(fakes, Arc::new(MemoryStore::new()))
}

pub fn test_state_with_store(
    fakes: Fakes,
    store: Arc<dyn ContentStore>,
) -> (AppState, Arc<FakeImages>) {
    let images = Arc::new(FakeImages {
        fail: fakes.images_fail,
        calls: AtomicUsize::new(0),
    });
    let revalidator = Revalidator::new();
    let enrichment = EnrichmentQueue::spawn(
        store.clone(),
        images.clone(),
        revalidator.clone(),
        Duration::from_millis(10),
    );

    let state = AppState {
        store,
        kv: Arc::new(MemoryKv::new()),
        config: Arc::new(Config::for_tests()),
        moderator: Arc::new(FakeModerator {
            fail: fakes.moderation_fails,
        }),
        images: images.clone(),
        identity: Arc::new(DemoIdentityProvider),
        revalidator,
        enrichment,
    };
    (state, images)
}

/// Build the full application [`Router`] wired to a fresh test state.
pub fn test_router(fakes: Fakes) -> (Router, AppState, Arc<FakeImages>) {
    let (state, images) = test_state(fakes);
    let app = connectwell_api::routes::router().with_state(state.clone());
    (app, state, images)
}

pub fn test_app(fakes: Fakes) -> TestApp {
    let (app, state, images) = test_router(fakes);
    TestApp {
        server: TestServer::new(app).unwrap(),
        state,
        images,
    }
}

/// Like [`test_app`], over a caller-supplied store.
pub fn test_app_with_store(store: Arc<dyn ContentStore>) -> TestApp {
    let (state, images) = test_state_with_store(Fakes::default(), store);
    let app = connectwell_api::routes::router().with_state(state.clone());
    TestApp {
        server: TestServer::new(app).unwrap(),
        state,
        images,
    }
}

pub fn community_form(name: &str, description: &str, long_description: &str) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", name.to_string())
        .add_text("description", description.to_string())
        .add_text("longDescription", long_description.to_string())
}

pub fn image_part(mime: &str, size: usize) -> Part {
    Part::bytes(vec![7u8; size])
        .file_name("upload.bin")
        .mime_type(mime.to_string())
}

/// Create a community through the API and return its id.
pub async fn create_community(server: &TestServer, name: &str) -> String {
    let resp = server
        .post("/api/v1/communities")
        .multipart(community_form(name, "A place to talk", "A longer story"))
        .await;
    let body: serde_json::Value = resp.json();
    body["communityId"].as_str().unwrap().to_string()
}

/// Log in through the demo identity provider and return the bearer token.
pub async fn login(server: &TestServer, email: &str, display_name: &str) -> String {
    let resp = server
        .post("/api/v1/auth/login")
        .json(&serde_json::json!({ "email": email, "displayName": display_name }))
        .await;
    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    body["access_token"].as_str().unwrap().to_string()
}
