mod common;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;

use common::Fakes;

#[tokio::test]
async fn login_returns_session_and_user() {
    let app = common::test_app(Fakes::default());

    let resp = app
        .server
        .post("/api/v1/auth/login")
        .json(&serde_json::json!({ "email": "Sam@Example.com", "displayName": " Sam Rivera " }))
        .await;

    resp.assert_status_ok();
    let body: serde_json::Value = resp.json();
    assert!(body["access_token"].as_str().unwrap().starts_with("ses_"));
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    assert_eq!(body["user"]["id"], "usr_sam_example_com");
    assert_eq!(body["user"]["displayName"], "Sam Rivera");
}

#[tokio::test]
async fn login_rejects_invalid_email() {
    let app = common::test_app(Fakes::default());

    let resp = app
        .server
        .post("/api/v1/auth/login")
        .json(&serde_json::json!({ "email": "not-an-email", "displayName": "Sam" }))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"][0]["field"], "email");
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let app = common::test_app(Fakes::default());
    let token = common::login(&app.server, "sam@example.com", "Sam").await;

    app.server
        .post("/api/v1/auth/logout")
        .add_header(AUTHORIZATION, format!("Bearer {token}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .post("/api/v1/auth/logout")
        .add_header(AUTHORIZATION, format!("Bearer {token}"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let app = common::test_app(Fakes::default());

    let resp = app
        .server
        .post("/api/v1/auth/logout")
        .add_header(AUTHORIZATION, "Bearer ses_bogus")
        .await;

    resp.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["error"]["message"], "Invalid or expired session");
}
