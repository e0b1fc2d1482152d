#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use modiste_api::auth::jwt::JwtConfig;
use modiste_api::config::ServerConfig;
use modiste_api::router::build_app_router;
use modiste_api::state::AppState;
use modiste_provider::{
    GenerateParams, GenerationOutput, ImageProvider, ProviderError, ProviderImage, TryOnParams,
};

/// Email provisioned as admin in [`test_config`].
pub const ADMIN_EMAIL: &str = "bruceoz@gmail.com";

/// Password used by [`register`].
pub const PASSWORD: &str = "tailored-fit-42";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uploads go to a fresh directory under the system temp dir.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        admin_emails: vec![ADMIN_EMAIL.to_string()],
        signup_credits: 10,
        upload_dir: std::env::temp_dir().join(format!("modiste-test-{}", uuid::Uuid::new_v4())),
        upload_max_bytes: 1024 * 1024,
        public_base_url: "http://localhost:3000".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Stub provider
// ---------------------------------------------------------------------------

/// What the stub does when called.
enum Behavior {
    Succeed,
    Fail(u16, &'static str),
    /// Zero every regular account's balance, then succeed. Simulates a
    /// concurrent request spending the credits while the call is in flight.
    DrainBalances(PgPool),
    /// Sleep before succeeding.
    Stall(Duration),
}

/// In-process image provider that never touches the network.
pub struct StubProvider {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl StubProvider {
    fn with(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    /// Returns one image per requested image.
    pub fn succeeding() -> Arc<Self> {
        Self::with(Behavior::Succeed)
    }

    /// Fails every call with the given HTTP status and body.
    pub fn failing(status: u16, body: &'static str) -> Arc<Self> {
        Self::with(Behavior::Fail(status, body))
    }

    /// Spends every regular account's credits before returning images.
    pub fn draining(pool: PgPool) -> Arc<Self> {
        Self::with(Behavior::DrainBalances(pool))
    }

    /// Succeeds only after `delay`.
    pub fn stalling(delay: Duration) -> Arc<Self> {
        Self::with(Behavior::Stall(delay))
    }

    /// Number of provider calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn respond(&self, count: i64, prefix: &str) -> Result<GenerationOutput, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Succeed => {}
            Behavior::Fail(status, body) => {
                return Err(ProviderError::Api {
                    status: *status,
                    body: body.to_string(),
                });
            }
            Behavior::DrainBalances(pool) => {
                sqlx::query("UPDATE users SET credits = 0 WHERE role = 'user'")
                    .execute(pool)
                    .await
                    .unwrap();
            }
            Behavior::Stall(delay) => tokio::time::sleep(*delay).await,
        }
        Ok(GenerationOutput {
            images: (0..count)
                .map(|i| ProviderImage {
                    url: format!("https://cdn.test/{prefix}/{i}.png"),
                    width: Some(768),
                    height: Some(1024),
                    content_type: Some("image/png".into()),
                })
                .collect(),
            request_id: Some(format!("stub-{prefix}")),
            seed: Some(7),
        })
    }
}

#[async_trait]
impl ImageProvider for StubProvider {
    async fn generate(&self, params: &GenerateParams) -> Result<GenerationOutput, ProviderError> {
        self.respond(params.num_images, "generate").await
    }

    async fn virtual_try_on(
        &self,
        _params: &TryOnParams,
    ) -> Result<GenerationOutput, ProviderError> {
        self.respond(1, "try-on").await
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build the full application router with a succeeding stub provider.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_provider(pool, StubProvider::succeeding())
}

/// Build the full application router around the given provider, using the
/// same middleware stack as production.
pub fn build_test_app_with_provider(pool: PgPool, provider: Arc<dyn ImageProvider>) -> Router {
    build_test_app_with_config(pool, provider, test_config())
}

/// Build the application router with a custom config.
pub fn build_test_app_with_config(
    pool: PgPool,
    provider: Arc<dyn ImageProvider>,
    config: ServerConfig,
) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        provider,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Send a `multipart/form-data` request with text fields and one file part.
pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
    token: &str,
) -> Response {
    const BOUNDARY: &str = "modiste-test-boundary";
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"upload\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the error envelope and return its `(code, message)`.
pub async fn error_body(response: Response, status: StatusCode) -> (String, String) {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    (
        json["code"].as_str().unwrap().to_string(),
        json["message"].as_str().unwrap().to_string(),
    )
}

/// Register an account through the API and return `(access_token, user)`.
pub async fn register(app: Router, email: &str) -> (String, Value) {
    let response = post_json(
        app,
        "/api/auth/register",
        serde_json::json!({ "email": email, "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    (
        json["data"]["accessToken"].as_str().unwrap().to_string(),
        json["data"]["user"].clone(),
    )
}

/// A 1x1 RGBA PNG.
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];
