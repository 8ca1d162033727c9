mod common;

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::multipart::MultipartForm;

use common::{community_form, FailingStore, STORE_FAILURE_DETAIL};
use connectwell_api::actions::GENERIC_FAILURE;
use connectwell_api::db::store::ContentStore;
use connectwell_api::models::community::NewCommunity;

fn assert_generic_failure(body: &serde_json::Value) {
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], GENERIC_FAILURE);
    assert!(body.get("fieldErrors").is_none());
    assert!(!body.to_string().contains(STORE_FAILURE_DETAIL));
}

#[tokio::test]
async fn create_community_write_failure_is_a_generic_500() {
    let store = Arc::new(FailingStore::default());
    let app = common::test_app_with_store(store);

    let resp = app
        .server
        .post("/api/v1/communities")
        .multipart(community_form("Asthma Allies", "Breathing easier", "Together"))
        .await;

    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_generic_failure(&resp.json());
    assert_eq!(app.images.calls(), 0);
}

#[tokio::test]
async fn update_community_write_failure_is_a_generic_500() {
    let store = Arc::new(FailingStore::default());
    let existing = store
        .inner
        .create_community(NewCommunity::with_placeholders(
            "Asthma Allies",
            "Breathing easier",
            "Together",
        ))
        .await
        .unwrap();
    let app = common::test_app_with_store(store.clone());

    let resp = app
        .server
        .patch(&format!("/api/v1/communities/{}", existing.id))
        .multipart(community_form("Asthma Allies", "New description", "Still together"))
        .await;

    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_generic_failure(&resp.json());

    let stored = store.inner.get_community(&existing.id).await.unwrap().unwrap();
    assert_eq!(stored.description, "Breathing easier");
}

#[tokio::test]
async fn update_profile_write_failure_is_a_generic_500() {
    let app = common::test_app_with_store(Arc::new(FailingStore::default()));
    let token = common::login(&app.server, "sam@example.com", "Sam").await;

    let resp = app
        .server
        .patch("/api/v1/users/@me/profile")
        .add_header(AUTHORIZATION, format!("Bearer {token}"))
        .multipart(MultipartForm::new().add_text("bio", "Hello"))
        .await;

    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_generic_failure(&resp.json());
}
