mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{spawn_app, TestApp};

async fn create_contact(app: &TestApp, token: &str, name: &str) -> String {
    let (status, body) = app
        .request(
            Method::POST,
            "/api/contacts",
            Some(token),
            Some(json!({
                "name": name,
                "email": format!("{}@example.com", name.to_lowercase()),
                "phone": "(044) 123-4567"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn contacts_require_authentication() {
    let app = spawn_app();

    let (status, _) = app.request(Method::GET, "/api/contacts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/contacts",
            None,
            Some(json!({ "name": "Ada", "email": "ada@example.com", "phone": "1" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn crud_round_trip() {
    let app = spawn_app();
    let token = app.register_verified("owner@example.com", "secret1").await;

    let id = create_contact(&app, &token, "Ada").await;

    let (status, body) = app
        .request(Method::GET, "/api/contacts", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Ada");
    assert_eq!(body[0]["favorite"], false);

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/contacts/{}", id),
            Some(&token),
            Some(json!({ "phone": "(099) 765-4321" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phone"], "(099) 765-4321");
    assert_eq!(body["name"], "Ada");

    let (status, body) = app
        .request(
            Method::DELETE,
            &format!("/api/contacts/{}", id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Contact deleted");

    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/contacts/{}", id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_with_empty_body_is_rejected() {
    let app = spawn_app();
    let token = app.register_verified("owner@example.com", "secret1").await;
    let id = create_contact(&app, &token, "Ada").await;

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/contacts/{}", id),
            Some(&token),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing fields");
}

#[tokio::test]
async fn favorite_flag_toggles() {
    let app = spawn_app();
    let token = app.register_verified("owner@example.com", "secret1").await;
    let id = create_contact(&app, &token, "Ada").await;

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/contacts/{}/favorite", id),
            Some(&token),
            Some(json!({ "favorite": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["favorite"], true);

    // Missing field fails at parse time
    let (status, _) = app
        .request(
            Method::PATCH,
            &format!("/api/contacts/{}/favorite", id),
            Some(&token),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn contacts_are_invisible_across_owners() {
    let app = spawn_app();
    let alice = app.register_verified("alice@example.com", "secret1").await;
    let bob = app.register_verified("bob@example.com", "secret1").await;

    let id = create_contact(&app, &alice, "Ada").await;

    let (status, body) = app
        .request(Method::GET, "/api/contacts", Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = app
        .request(
            Method::GET,
            &format!("/api/contacts/{}", id),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/contacts/{}", id),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Alice still sees her contact
    let (_, body) = app
        .request(Method::GET, "/api/contacts", Some(&alice), None)
        .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn validation_failures_return_422() {
    let app = spawn_app();
    let token = app.register_verified("owner@example.com", "secret1").await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/contacts",
            Some(&token),
            Some(json!({ "name": "", "email": "bad", "phone": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
