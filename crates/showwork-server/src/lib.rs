#![forbid(unsafe_code)]

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::response::Response;
use axum::routing::{get, patch, post};
use axum::Router;
use rusqlite::Connection;
use showwork_query::DirectoryLimits;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const CRATE_NAME: &str = "showwork-server";

mod config;
mod handlers;
mod identity;
mod params;

pub use config::ApiConfig;
pub use identity::{FakeIdentity, IdentityProvider, TokenIdentity};

/// Shared per-process state. All durable state lives in the database; the
/// only in-process mutable pieces are the view-dedup set and the request
/// id seed.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Arc<ApiConfig>,
    pub limits: DirectoryLimits,
    /// (session_id, project_id) pairs already counted. Session-scoped by
    /// design: the fact is intentionally not durable. Capped at
    /// `ApiConfig::view_dedup_max_entries`; hitting the cap clears the set.
    pub viewed: Arc<std::sync::Mutex<HashSet<(String, String)>>>,
    pub request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(db: Connection, config: ApiConfig) -> Self {
        let db = Arc::new(Mutex::new(db));
        let identity = Arc::new(TokenIdentity::new(Arc::clone(&db)));
        Self::with_identity(db, identity, config)
    }

    #[must_use]
    pub fn with_identity(
        db: Arc<Mutex<Connection>>,
        identity: Arc<dyn IdentityProvider>,
        config: ApiConfig,
    ) -> Self {
        let limits = DirectoryLimits {
            default_limit: config.default_page_size,
            max_limit: config.max_page_size,
            ..Default::default()
        };
        Self {
            db,
            identity,
            config: Arc::new(config),
            limits,
            viewed: Arc::new(std::sync::Mutex::new(HashSet::new())),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }

    pub(crate) fn next_request_id(&self) -> String {
        let id = self.request_id_seed.fetch_add(1, Ordering::Relaxed);
        format!("req-{id:016x}")
    }
}

pub(crate) fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

#[must_use]
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;
    Router::new()
        .route("/v1/health", get(handlers::health))
        .route(
            "/v1/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/v1/projects/{id}",
            get(handlers::get_project)
                .patch(handlers::update_project)
                .delete(handlers::delete_project),
        )
        .route("/v1/projects/{id}/publish", post(handlers::publish_project))
        .route("/v1/projects/{id}/like", post(handlers::toggle_like))
        .route("/v1/projects/{id}/save", post(handlers::toggle_save))
        .route("/v1/projects/{id}/view", post(handlers::record_view))
        .route(
            "/v1/projects/{id}/engagement",
            get(handlers::engagement_status),
        )
        .route("/v1/profiles/{username}", get(handlers::get_profile))
        .route(
            "/v1/profiles/{username}/projects",
            get(handlers::list_profile_projects),
        )
        .route("/v1/me/profile", patch(handlers::update_profile_settings))
        .route("/v1/me/projects", get(handlers::list_own_projects))
        .route("/v1/me/saved", get(handlers::list_saved_projects))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
