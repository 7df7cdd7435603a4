/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and migrations
/// - App construction with a logging mailer (no real email leaves tests)
/// - Account creation and admin promotion helpers
/// - Request helpers (JSON, raw bytes, multipart upload)
///
/// Every test creates its own accounts with unique emails, so tests can
/// share one database and run in parallel.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;
use taskdeck_api::app::{build_router, AppState};
use taskdeck_api::config::{ApiConfig, AuthConfig, Config, DatabaseConfig, EmailConfig};
use taskdeck_shared::email::TraceMailer;
use tower::ServiceExt as _;
use uuid::Uuid;

/// Fixed signing secret for tests (at least 32 bytes)
pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Password that satisfies the strength rules
pub const TEST_PASSWORD: &str = "23Efder!@";

/// Test context containing the app under test and a database handle
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
}

impl TestContext {
    /// Creates a new test context against the DATABASE_URL database
    pub async fn new() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let db = PgPool::connect(&database_url).await?;

        // Migrations path is relative to this crate's Cargo.toml.
        sqlx::migrate!("../taskdeck-shared/migrations")
            .run(&db)
            .await?;

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: 5,
            },
            auth: AuthConfig {
                jwt_secret: TEST_JWT_SECRET.to_string(),
            },
            email: EmailConfig {
                api_key: None,
                from: "no-reply@taskdeck.dev".to_string(),
            },
        };

        let state = AppState::with_mailer(db.clone(), config, Arc::new(TraceMailer));
        let app = build_router(state);

        Ok(Self { db, app })
    }

    /// Sends a JSON request and parses the JSON response body
    ///
    /// An empty response body parses as `Value::Null`.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    /// Sends a request and returns the raw response bytes and content type
    pub async fn request_bytes(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
    ) -> (StatusCode, Option<String>, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty()).unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, content_type, bytes.to_vec())
    }

    /// Uploads a file as the `avatar` multipart field
    pub async fn upload_avatar(
        &self,
        token: &str,
        file_name: &str,
        data: &[u8],
    ) -> (StatusCode, Value) {
        let boundary = "taskdeck-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; \
                 name=\"avatar\"; filename=\"{file_name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri("/users/me/avatar")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, json)
    }

    /// Signs up a fresh account and returns (user body, token, user id)
    pub async fn signup(&self, name: &str) -> (Value, String, Uuid) {
        let email = format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4());
        let (status, body) = self
            .request(
                "POST",
                "/users",
                None,
                Some(json!({
                    "name": name,
                    "email": email,
                    "password": TEST_PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");

        let token = body["token"].as_str().unwrap().to_string();
        let id: Uuid = body["user"]["id"].as_str().unwrap().parse().unwrap();

        (body["user"].clone(), token, id)
    }

    /// Promotes an account to admin directly in the database
    pub async fn make_admin(&self, user_id: Uuid) {
        sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await
            .unwrap();
    }

    /// Creates a task through the API, returning its id
    pub async fn create_task(&self, token: &str, description: &str, completed: bool) -> Uuid {
        let (status, body) = self
            .request(
                "POST",
                "/tasks",
                Some(token),
                Some(json!({ "description": description, "completed": completed })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "task creation failed: {body}");

        body["id"].as_str().unwrap().parse().unwrap()
    }

    /// Removes an account directly, for tests that don't delete through
    /// the API
    pub async fn remove_account(&self, user_id: Uuid) {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await
            .unwrap();
    }
}
