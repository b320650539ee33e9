#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use assetdesk_api::auth::jwt::{generate_access_token, JwtConfig};
use assetdesk_api::auth::password::hash_password;
use assetdesk_api::config::ServerConfig;
use assetdesk_api::router::build_app_router;
use assetdesk_api::state::AppState;
use assetdesk_api::storage::LocalDiskStorage;
use assetdesk_core::permissions::PermissionStoreState;
use assetdesk_db::models::user::{CreateUser, User};
use assetdesk_db::repositories::{PermissionRepo, UserRepo};
use assetdesk_events::WelcomeNotifier;
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(storage_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        document_storage_dir: storage_dir,
        max_upload_bytes: 1024 * 1024,
        app_url: "http://localhost:5173".to_string(),
        run_migrations: false,
        jwt: test_jwt(),
    }
}

pub fn test_jwt() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret".to_string(),
        access_token_expiry_mins: 15,
    }
}

/// A running application plus the temp directory backing its document storage.
pub struct TestApp {
    pub router: Router,
    pub storage_dir: tempfile::TempDir,
}

/// Build the full application router with the production middleware stack.
///
/// The welcome queue receiver is dropped, so notifications are discarded.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let storage_dir = tempfile::tempdir().unwrap();
    let config = test_config(storage_dir.path().to_path_buf());
    let (notifier, _receiver) = WelcomeNotifier::channel();

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        permission_store: PermissionStoreState::Ready,
        notifier,
        storage: Arc::new(LocalDiskStorage::new(storage_dir.path())),
    };
    let router = build_app_router(state, &config).unwrap();
    TestApp { router, storage_dir }
}

/// Insert an active user holding the named permissions.
pub async fn create_user(pool: &PgPool, username: &str, permissions: &[&str]) -> User {
    let mut ids = Vec::new();
    for name in permissions {
        let permission = PermissionRepo::find_by_name(pool, name)
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("permission {name} should be seeded"));
        ids.push(permission.id);
    }
    let input = CreateUser {
        name: format!("{username} tester"),
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
        title: "Tester".to_string(),
        is_active: true,
    };
    UserRepo::create_with_permissions(pool, &input, &ids)
        .await
        .unwrap()
}

pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, &user.username, &test_jwt()).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

fn builder(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response<Body> {
    send(app, builder(Method::GET, uri, token).body(Body::empty()).unwrap()).await
}

pub async fn delete(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, builder(Method::DELETE, uri, Some(token)).body(Body::empty()).unwrap()).await
}

pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    let request = builder(method, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response<Body> {
    send_json(app, Method::POST, uri, token, body).await
}

pub async fn put_json(app: &Router, uri: &str, token: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, Some(token), body).await
}

/// POST with no body at all.
pub async fn post_empty(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, builder(Method::POST, uri, Some(token)).body(Body::empty()).unwrap()).await
}

/// POST a single-file multipart form under the field name `file`.
pub async fn post_file(
    app: &Router,
    uri: &str,
    token: &str,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> Response<Body> {
    let boundary = "assetdesk-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = builder(Method::POST, uri, Some(token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
