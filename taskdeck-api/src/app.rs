/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskdeck_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskdeck_shared::email::{HttpMailer, Mailer, TraceMailer};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Outbound email delivery
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    /// Creates new application state
    ///
    /// Picks the mailer from configuration: a real HTTP delivery backend
    /// when an email API key is configured, a logging stub otherwise.
    pub fn new(db: PgPool, config: Config) -> Self {
        let mailer: Arc<dyn Mailer> = match &config.email.api_key {
            Some(api_key) => Arc::new(HttpMailer::new(api_key.clone(), config.email.from.clone())),
            None => Arc::new(TraceMailer),
        };

        Self {
            db,
            config: Arc::new(config),
            mailer,
        }
    }

    /// Creates application state with an explicit mailer
    pub fn with_mailer(db: PgPool, config: Config, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            mailer,
        }
    }

    /// Gets the secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.auth.jwt_secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// The router is organized as follows:
/// ```text
/// /
/// ├── /health                    # Health check (public)
/// ├── /users                     # Accounts
/// │   ├── POST   /               # Sign up (public)
/// │   ├── POST   /login          # Log in (public)
/// │   ├── POST   /logout         # Revoke current session
/// │   ├── POST   /logoutAll      # Revoke every session
/// │   ├── GET    /me             # Own profile
/// │   ├── PATCH  /me             # Update own profile
/// │   ├── DELETE /me             # Delete account
/// │   ├── POST   /me/avatar      # Upload avatar
/// │   ├── DELETE /me/avatar      # Remove avatar
/// │   ├── GET    /:id/avatar     # Fetch any user's avatar (public)
/// │   ├── GET    /               # List users (admin)
/// │   ├── GET    /:id            # Fetch user (admin)
/// │   └── DELETE /:id            # Delete user (admin)
/// └── /tasks                     # Per-user tasks
///     ├── POST   /               # Create task
///     ├── GET    /               # List own tasks (filter/sort/paginate)
///     ├── GET    /:id            # Fetch own task
///     ├── PATCH  /:id            # Update own task
///     └── DELETE /:id            # Delete own task
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
///
/// Authentication is an extractor rather than a layer: protected handlers
/// take an `AuthSession` argument and reject with 401 on their own, which
/// lets `POST /users` (public) and `GET /users` (admin) share a path.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Account routes; signup, login and avatar fetch are public, the rest
    // authenticate via the AuthSession extractor
    let user_routes = Router::new()
        .route(
            "/",
            post(routes::users::signup).get(routes::users::list_users),
        )
        .route("/login", post(routes::users::login))
        .route("/logout", post(routes::users::logout))
        .route("/logoutAll", post(routes::users::logout_all))
        .route(
            "/me",
            get(routes::users::read_profile)
                .patch(routes::users::update_profile)
                .delete(routes::users::delete_account),
        )
        .route(
            "/me/avatar",
            post(routes::avatars::upload_avatar).delete(routes::avatars::delete_avatar),
        )
        .route("/:id/avatar", get(routes::avatars::fetch_avatar))
        .route(
            "/:id",
            get(routes::users::read_user).delete(routes::users::delete_user),
        );

    // Task routes (all authenticated)
    let task_routes = Router::new()
        .route(
            "/",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route(
            "/:id",
            get(routes::tasks::read_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        );

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/users", user_routes)
        .nest("/tasks", task_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
