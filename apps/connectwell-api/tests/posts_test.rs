mod common;

use axum::http::StatusCode;

use common::Fakes;

#[tokio::test]
async fn creating_a_post_is_not_implemented() {
    let app = common::test_app(Fakes::default());
    let id = common::create_community(&app.server, "Asthma Allies").await;

    for _ in 0..2 {
        let resp = app
            .server
            .post(&format!("/api/v1/communities/{id}/posts"))
            .json(&serde_json::json!({ "title": "Inhalers", "content": "Which one works for you?" }))
            .await;

        resp.assert_status(StatusCode::NOT_IMPLEMENTED);
        let body: serde_json::Value = resp.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Creating posts is not implemented yet.");
    }

    let community: serde_json::Value = app
        .server
        .get(&format!("/api/v1/communities/{id}"))
        .await
        .json();
    assert_eq!(community["posts"], serde_json::json!([]));
}

#[tokio::test]
async fn commenting_is_not_implemented() {
    let app = common::test_app(Fakes::default());
    let id = common::create_community(&app.server, "Asthma Allies").await;

    let resp = app
        .server
        .post(&format!("/api/v1/communities/{id}/posts/post_1/comments"))
        .json(&serde_json::json!({ "text": "Same here" }))
        .await;

    resp.assert_status(StatusCode::NOT_IMPLEMENTED);
    let body: serde_json::Value = resp.json();
    assert_eq!(body["error"]["code"], "NOT_IMPLEMENTED");
}
