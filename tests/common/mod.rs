//! Spins the router up in-process on an ephemeral port, backed by `MemoryStore`.

#![allow(dead_code)]

use granja_api::app::{self, AccountService, RecordService, ReportService};
use granja_api::auth::{JwtConfig, LocalAuth};
use granja_api::transport;
use granja_api::{EntityRegistry, SchemaRegistry, Store};
use reqwest::{Client, Response};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub store: Arc<dyn Store>,
}

pub async fn spawn_app() -> TestApp {
    let entities = Arc::new(EntityRegistry::standard(&SchemaRegistry::standard()).unwrap());
    let store: Arc<dyn Store> = Arc::new(app::memory_store(&entities));
    let auth = Arc::new(LocalAuth::new(store.clone(), JwtConfig::default()));
    let state = transport::http::AppState {
        store: store.clone(),
        records: RecordService::new(store.clone(), entities),
        accounts: AccountService::new(store.clone(), auth),
        reports: ReportService::new(store.clone()),
        production: false,
    };
    let router = transport::http::create_router(state);

    // Bind to an ephemeral port to avoid conflicts with a running server.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        base_url: format!("http://127.0.0.1:{}", port),
        client: Client::new(),
        store,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn sign_up(&self, email: &str) -> Response {
        self.client
            .post(self.url("/auth/signup"))
            .json(&json!({ "email": email, "password": "supersecreta", "nombre": "Prueba" }))
            .send()
            .await
            .unwrap()
    }

    /// Signs up (if needed) and returns a bearer token.
    pub async fn token_for(&self, email: &str) -> String {
        self.sign_up(email).await;
        let resp = self
            .client
            .post(self.url("/auth/signin"))
            .json(&json!({ "email": email, "password": "supersecreta" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: JsonValue = resp.json().await.unwrap();
        body["data"]["access_token"].as_str().unwrap().to_string()
    }

    pub async fn post(&self, token: &str, path: &str, body: JsonValue) -> (u16, JsonValue) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }

    pub async fn put(&self, token: &str, path: &str, body: JsonValue) -> (u16, JsonValue) {
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }

    pub async fn get(&self, token: &str, path: &str) -> (u16, JsonValue) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }

    pub async fn delete(&self, token: &str, path: &str) -> (u16, JsonValue) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        (resp.status().as_u16(), resp.json().await.unwrap())
    }
}
