//! Test setup helpers - an in-process router and a started session
#![allow(dead_code)] // Test utilities may not all be used in every test

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use ultiscore::{
    routes,
    session::repository::{InMemorySnapshotStore, SnapshotStore},
    AppState,
};

// ============================================================================
// Router Harness
// ============================================================================

#[derive(Clone)]
pub struct TestApp {
    router: Router,
}

#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text)
            .unwrap_or_else(|e| panic!("response was not JSON ({e}): {}", self.text))
    }
}

impl TestApp {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            router: routes::app(AppState::new(store)),
        }
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let (content_type, content_disposition) = {
            let header = |name: &str| {
                response
                    .headers()
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };
            (header("content-type"), header("content-disposition"))
        };
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            content_type,
            content_disposition,
            text: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.send("POST", uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send("DELETE", uri, None).await
    }

    /// Creates a session and returns its id
    pub async fn create_session(&self, names: &[&str]) -> String {
        let response = self.post("/sessions", json!({ "names": names })).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.json()["session_id"]
            .as_str()
            .expect("session id should be a string")
            .to_string()
    }
}

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app: TestApp,
    pub store: Arc<InMemorySnapshotStore>,
    pub session_id: String,
    pub players: Vec<String>,
}

pub struct TestSetupBuilder {
    players: Vec<String>,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self { players: vec![] }
    }

    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_three_players(self) -> Self {
        self.with_players(vec!["Anna", "Bence", "Csaba"])
    }

    pub fn with_four_players(self) -> Self {
        self.with_players(vec!["Anna", "Bence", "Csaba", "Dóra"])
    }

    pub async fn build(self) -> TestSetup {
        let store = Arc::new(InMemorySnapshotStore::new());
        let app = TestApp::new(store.clone());
        let names: Vec<&str> = self.players.iter().map(String::as_str).collect();
        let session_id = app.create_session(&names).await;

        TestSetup {
            app,
            store,
            session_id,
            players: self.players,
        }
    }
}

impl Default for TestSetupBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSetup {
    pub fn uri(&self, suffix: &str) -> String {
        format!("/sessions/{}{}", self.session_id, suffix)
    }

    pub async fn session(&self) -> Value {
        let response = self.app.get(&self.uri("")).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text);
        response.json()
    }

    pub async fn declare(&self, declaration: Value) -> TestResponse {
        self.app.post(&self.uri("/rounds"), declaration).await
    }

    pub async fn manual(&self, request: Value) -> TestResponse {
        self.app.post(&self.uri("/rounds/manual"), request).await
    }

    pub async fn undo(&self) -> TestResponse {
        self.app.delete(&self.uri("/rounds/last")).await
    }
}
