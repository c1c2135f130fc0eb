//! Sign-up, sign-in, roles and sign-out through the HTTP API.

mod common;

use common::spawn_app;
use granja_api::Store;
use serde_json::{json, Value as JsonValue};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn api_routes_require_a_token() {
    let app = spawn_app().await;

    let resp = app.client.get(app.url("/api/aves")).send().await.unwrap();
    assert_eq!(resp.status(), 401);
    let body: JsonValue = resp.json().await.unwrap();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Authentication required"));

    let (status, _) = app.get("not-a-jwt", "/api/aves").await;
    assert_eq!(status, 400);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn first_user_is_admin_and_only_admins_delete() {
    let app = spawn_app().await;
    let admin = app.token_for("admin@granja.ec").await;
    let worker = app.token_for("empleado@granja.ec").await;

    let (status, body) = app.get(&admin, "/auth/me").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["rol"], json!("admin"));
    let (_, body) = app.get(&worker, "/auth/me").await;
    assert_eq!(body["data"]["rol"], json!("empleado"));

    let (status, _) = app.post(&worker, "/api/razas", json!({ "nombre": "Leghorn" })).await;
    assert_eq!(status, 201);

    let (status, body) = app.delete(&worker, "/api/razas/1").await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], json!("Only admin users may do this"));

    let (status, _) = app.delete(&admin, "/api/razas/1").await;
    assert_eq!(status, 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn signup_validation_and_duplicates() {
    let app = spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/signup"))
        .json(&json!({ "email": "no-es-correo", "password": "corta" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: JsonValue = resp.json().await.unwrap();
    assert_eq!(body["errors"].as_array().unwrap().len(), 3);

    assert_eq!(app.sign_up("ana@granja.ec").await.status(), 201);
    assert_eq!(app.sign_up("ana@granja.ec").await.status(), 400);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn storage_level_duplicate_is_409() {
    let app = spawn_app().await;

    // Credentials without a profile: the profile pre-check passes and the
    // credentials table's unique email is what rejects the sign-up.
    let mut row = serde_json::Map::new();
    row.insert("email".into(), json!("huerfano@granja.ec"));
    row.insert("password_hash".into(), json!("x"));
    app.store.insert("auth_usuarios", &row).await.unwrap();

    let resp = app.sign_up("huerfano@granja.ec").await;
    assert_eq!(resp.status(), 409);
    let body: JsonValue = resp.json().await.unwrap();
    assert_eq!(body["error"], json!("Email already registered"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn wrong_password_is_401_and_signout_revokes() {
    let app = spawn_app().await;
    let token = app.token_for("ana@granja.ec").await;

    let resp = app
        .client
        .post(app.url("/auth/signin"))
        .json(&json!({ "email": "ana@granja.ec", "password": "equivocada" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let (status, _) = app.post(&token, "/auth/signout", json!({})).await;
    assert_eq!(status, 200);
    let (status, body) = app.get(&token, "/auth/me").await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], json!("Session has been signed out"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn health_reports_storage() {
    let app = spawn_app().await;
    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: JsonValue = resp.json().await.unwrap();
    assert_eq!(body["data"]["status"], json!("ok"));
}
