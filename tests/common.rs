#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use insignia::config::{ApiConfig, ConfigV1, SessionConfig, StorageBackendConfig};
use insignia::navigation::RecordingNavigator;
use insignia::startup::App;
use serde_json::{json, Value};

pub const TOKEN: &str = "tok-abc";

/// Config pointing at `base_url` with the token persisted in `dir`.
pub fn file_backed_config(base_url: &str, dir: &Path) -> ConfigV1 {
    ConfigV1 {
        api: ApiConfig {
            base_url: Some(base_url.to_string()),
        },
        session: SessionConfig {
            storage: StorageBackendConfig::File {
                path: token_path(dir),
            },
            ..SessionConfig::default()
        },
        ..ConfigV1::default()
    }
}

pub fn token_path(dir: &Path) -> PathBuf {
    dir.join("session.json")
}

pub fn build_app(config: ConfigV1) -> (App, Arc<RecordingNavigator>) {
    let navigator = Arc::new(RecordingNavigator::new());
    let app = App::from_config(config, navigator.clone()).expect("failed to build app");
    (app, navigator)
}

pub fn user_json() -> Value {
    json!({
        "id": 42,
        "email": "ada@example.com",
        "name": "Ada Lovelace",
        "role": "user"
    })
}

pub fn auth_json() -> Value {
    json!({ "accessToken": TOKEN, "user": user_json() })
}

pub fn card_json(id: u64, slug: &str) -> Value {
    json!({
        "id": id,
        "displayName": "Ada Lovelace",
        "slug": slug,
        "title": "Analyst",
        "links": [],
        "createdAt": "2024-03-01T10:00:00Z"
    })
}

pub fn bearer() -> String {
    format!("Bearer {}", TOKEN)
}

/// An app that has already signed in against `server`.
pub async fn signed_in_app(
    server: &mut mockito::ServerGuard,
    dir: &Path,
) -> (App, Arc<RecordingNavigator>) {
    server
        .mock("POST", "/auth/login")
        .with_status(200)
        .with_body(auth_json().to_string())
        .create_async()
        .await;
    let (app, navigator) = build_app(file_backed_config(&server.url(), dir));
    let payload = insignia::validation::SignInForm {
        email: "ada@example.com".to_string(),
        password: "Sup3r$ecret".to_string(),
    }
    .validate()
    .expect("valid credentials");
    app.store.login(&payload).await.expect("login should succeed");
    (app, navigator)
}
