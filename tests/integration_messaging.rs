#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, missing_debug_implementations, unreachable_pub)]
use reqwest::StatusCode;
use serde_json::{Value, json};

mod common;

#[tokio::test]
async fn test_send_and_read_flow() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;

    let resp = app.send_message(&alice, &bob.username, "hi").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let sent: Value = resp.json().await.unwrap();
    let message = &sent["message"];
    let id = message["id"].as_i64().unwrap();
    assert_eq!(message["from_username"], alice.username.as_str());
    assert_eq!(message["to_username"], bob.username.as_str());
    assert_eq!(message["body"], "hi");
    assert!(message["sent_at"].is_string());
    assert!(message.get("read_at").is_none());

    for reader in [&alice, &bob] {
        let resp = app.get_message(reader, id).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = resp.json().await.unwrap();
        let detail = &body["message"];
        assert_eq!(detail["id"], id);
        assert_eq!(detail["body"], "hi");
        assert_eq!(detail["sent_at"], message["sent_at"]);
        assert!(detail["read_at"].is_null());
        assert_eq!(detail["from_user"]["username"], alice.username.as_str());
        assert_eq!(detail["from_user"]["first_name"], "ALICE");
        assert_eq!(detail["from_user"]["last_name"], "Tester");
        assert_eq!(detail["from_user"]["phone"], "555-0100");
        assert_eq!(detail["to_user"]["username"], bob.username.as_str());
        assert!(detail["from_user"].get("password_hash").is_none());
    }
}

#[tokio::test]
async fn test_non_participant_cannot_read() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;
    let eve = app.register_user("eve").await;

    let id = app.send_ok(&alice, &bob.username, "secret").await;

    let resp = app.get_message(&eve, id).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "You are not authorized to read this message");
}

#[tokio::test]
async fn test_unknown_message_is_not_found() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;

    let resp = app.get_message(&alice, 999_999).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_send_to_unknown_recipient() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;

    let resp = app.send_message(&alice, "nobody_here", "hello?").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_send_as_someone_else_is_rejected() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;
    let eve = app.register_user("eve").await;

    let resp = app
        .client
        .post(format!("{}/messages", app.server_url))
        .bearer_auth(&eve.token)
        .json(&json!({ "from_username": alice.username, "to_username": bob.username, "body": "from alice, honest" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_explicit_matching_sender_is_accepted() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;

    let resp = app
        .client
        .post(format!("{}/messages", app.server_url))
        .bearer_auth(&alice.token)
        .json(&json!({ "from_username": alice.username, "to_username": bob.username, "body": "hi" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_trusted_client_sender_mode() {
    let mut config = common::get_test_config();
    config.messaging.trust_client_sender = true;
    let app = common::TestApp::spawn_with_config(config).await;

    let alice = app.register_user("alice").await;
    let bob = app.register_user("bob").await;
    let eve = app.register_user("eve").await;

    let resp = app
        .client
        .post(format!("{}/messages", app.server_url))
        .bearer_auth(&eve.token)
        .json(&json!({ "from_username": alice.username, "to_username": bob.username, "body": "legacy" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"]["from_username"], alice.username.as_str());
}

#[tokio::test]
async fn test_malformed_send_body() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;

    let resp = app
        .client
        .post(format!("{}/messages", app.server_url))
        .bearer_auth(&alice.token)
        .json(&json!({ "body": "no recipient" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_message_id() {
    let app = common::TestApp::spawn().await;
    let alice = app.register_user("alice").await;

    for url in [format!("{}/messages/abc", app.server_url), format!("{}/messages/99999999999999999999", app.server_url)] {
        let resp = app.client.get(url).bearer_auth(&alice.token).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["error"], "Invalid message id");
    }

    let resp =
        app.client.post(format!("{}/messages/abc/read", app.server_url)).bearer_auth(&alice.token).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid message id");
}

#[tokio::test]
async fn test_message_endpoints_require_auth() {
    let app = common::TestApp::spawn().await;

    let resp = app.client.get(format!("{}/messages/1", app.server_url)).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .client
        .post(format!("{}/messages", app.server_url))
        .json(&json!({ "to_username": "bob", "body": "hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .client
        .post(format!("{}/messages/1/read", app.server_url))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
