use crate::{params, with_request_id, AppState};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use showwork_core::{CoreError, CoreErrorCode, ViewerContext};
use showwork_model::{
    Profile, ProfilePatch, ProfileStats, ProjectDraft, ProjectId, ProjectPatch, SessionId,
    Username,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

const SESSION_HEADER: &str = "x-session-id";

fn status_for(code: CoreErrorCode) -> StatusCode {
    match code {
        CoreErrorCode::NotFound => StatusCode::NOT_FOUND,
        CoreErrorCode::AuthenticationRequired => StatusCode::UNAUTHORIZED,
        CoreErrorCode::OwnershipViolation => StatusCode::FORBIDDEN,
        CoreErrorCode::Validation => StatusCode::BAD_REQUEST,
        CoreErrorCode::Conflict => StatusCode::CONFLICT,
        CoreErrorCode::TransientStorage => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: &CoreError, request_id: &str) -> Response {
    let status = status_for(err.code);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        warn!(request_id, code = err.code.as_str(), message = %err.message, "request failed");
    } else {
        debug!(request_id, code = err.code.as_str(), "request rejected");
    }
    let body = json!({
        "error": {
            "code": err.code.as_str(),
            "message": err.message,
            "details": err.details,
            "request_id": request_id,
        }
    });
    (status, Json(body)).into_response()
}

fn respond(state: &AppState, result: Result<Response, CoreError>) -> Response {
    let request_id = state.next_request_id();
    match result {
        Ok(response) => with_request_id(response, &request_id),
        Err(err) => with_request_id(error_response(&err, &request_id), &request_id),
    }
}

/// Maps the Authorization header to a viewer. No header means an anonymous
/// browser; a present but unusable token is rejected rather than silently
/// downgraded, so a client with an expired token finds out.
async fn resolve_viewer(state: &AppState, headers: &HeaderMap) -> Result<ViewerContext, CoreError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(ViewerContext::Anonymous);
    };
    let token = value
        .to_str()
        .ok()
        .and_then(|raw| raw.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or_else(CoreError::authentication_required)?;
    match state.identity.profile_for_token(token).await? {
        Some(profile_id) => Ok(ViewerContext::Authenticated(profile_id)),
        None => Err(CoreError::authentication_required()),
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &Bytes) -> Result<T, CoreError> {
    serde_json::from_slice(body).map_err(|e| CoreError::validation(format!("invalid body: {e}")))
}

fn session_id_from(headers: &HeaderMap) -> Result<Option<SessionId>, CoreError> {
    let Some(raw) = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) else {
        return Ok(None);
    };
    Ok(Some(SessionId::parse(raw)?))
}

/// Counts a view once per (session, project). The dedup set is in-process
/// and session-scoped on purpose; a restart re-arms it, matching the
/// original per-browser-session semantics.
async fn count_view_once(
    state: &AppState,
    session_id: &SessionId,
    project_id: &ProjectId,
) -> Result<bool, CoreError> {
    let key = (
        session_id.as_str().to_string(),
        project_id.as_str().to_string(),
    );
    let fresh = {
        let mut viewed = state.viewed.lock().unwrap_or_else(|e| e.into_inner());
        if viewed.len() >= state.config.view_dedup_max_entries {
            // Bounded memory beats perfect dedup; a cleared set means some
            // sessions get counted once more.
            viewed.clear();
        }
        viewed.insert(key.clone())
    };
    if !fresh {
        return Ok(false);
    }
    let outcome = {
        let conn = state.db.lock().await;
        showwork_store::increment_views(&conn, project_id)
    };
    if let Err(err) = outcome {
        // Drop the reservation so a later attempt can still count.
        let mut viewed = state.viewed.lock().unwrap_or_else(|e| e.into_inner());
        viewed.remove(&key);
        return Err(err);
    }
    Ok(true)
}

pub(crate) async fn health(State(state): State<AppState>) -> Response {
    respond(
        &state,
        Ok(Json(json!({"status": "ok", "crate": crate::CRATE_NAME})).into_response()),
    )
}

pub(crate) async fn list_projects(
    State(state): State<AppState>,
    Query(raw): Query<BTreeMap<String, String>>,
) -> Response {
    let result = async {
        let filter = params::directory_filter(&raw, &state.limits)?;
        let conn = state.db.lock().await;
        let page = showwork_query::list_public_projects(&conn, &filter, &state.limits)?;
        Ok(Json(page).into_response())
    }
    .await;
    respond(&state, result)
}

pub(crate) async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let result = async {
        let project_id = ProjectId::parse(&id)?;
        let viewer = resolve_viewer(&state, &headers).await?;
        let view = {
            let conn = state.db.lock().await;
            showwork_store::resolve_project(&conn, &project_id, &viewer)?
        };
        // A page load with a session id counts as a view; the resolver has
        // already vouched that this viewer may see the project. Counting is
        // fire-and-forget: a failed increment never fails the fetch.
        if let Some(session_id) = session_id_from(&headers)? {
            if let Err(err) = count_view_once(&state, &session_id, &project_id).await {
                warn!(code = err.code.as_str(), message = %err.message, "view count failed");
            }
        }
        Ok(Json(view).into_response())
    }
    .await;
    respond(&state, result)
}

pub(crate) async fn create_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let result = async {
        let viewer = resolve_viewer(&state, &headers).await?;
        let draft: ProjectDraft = parse_body(&body)?;
        let mut conn = state.db.lock().await;
        let project = showwork_store::create_project(&mut conn, &viewer, &draft)?;
        Ok((StatusCode::CREATED, Json(project)).into_response())
    }
    .await;
    respond(&state, result)
}

pub(crate) async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let result = async {
        let project_id = ProjectId::parse(&id)?;
        let viewer = resolve_viewer(&state, &headers).await?;
        let patch: ProjectPatch = parse_body(&body)?;
        let mut conn = state.db.lock().await;
        let project = showwork_store::update_project(&mut conn, &viewer, &project_id, &patch)?;
        Ok(Json(project).into_response())
    }
    .await;
    respond(&state, result)
}

pub(crate) async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let result = async {
        let project_id = ProjectId::parse(&id)?;
        let viewer = resolve_viewer(&state, &headers).await?;
        let mut conn = state.db.lock().await;
        showwork_store::delete_project(&mut conn, &viewer, &project_id)?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
    .await;
    respond(&state, result)
}

pub(crate) async fn publish_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let result = async {
        let project_id = ProjectId::parse(&id)?;
        let viewer = resolve_viewer(&state, &headers).await?;
        let mut conn = state.db.lock().await;
        let project = showwork_store::publish_project(&mut conn, &viewer, &project_id)?;
        Ok(Json(project).into_response())
    }
    .await;
    respond(&state, result)
}

pub(crate) async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    respond(&state, toggle_engagement(&state, &id, &headers, true).await)
}

pub(crate) async fn toggle_save(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    respond(&state, toggle_engagement(&state, &id, &headers, false).await)
}

async fn toggle_engagement(
    state: &AppState,
    id: &str,
    headers: &HeaderMap,
    like: bool,
) -> Result<Response, CoreError> {
    let project_id = ProjectId::parse(id)?;
    let viewer = resolve_viewer(state, headers).await?;
    let mut conn = state.db.lock().await;
    let result = if like {
        showwork_store::toggle_like(&mut conn, &viewer, &project_id)?
    } else {
        showwork_store::toggle_save(&mut conn, &viewer, &project_id)?
    };
    Ok(Json(result).into_response())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ViewBody {
    session_id: SessionId,
}

pub(crate) async fn record_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let result = async {
        let project_id = ProjectId::parse(&id)?;
        let viewer = resolve_viewer(&state, &headers).await?;
        let session_id = match session_id_from(&headers)? {
            Some(session_id) => session_id,
            None if !body.is_empty() => parse_body::<ViewBody>(&body)?.session_id,
            None => {
                return Err(CoreError::validation(
                    "a session id is required to record a view",
                ));
            }
        };
        {
            // Resolve first so views against hidden projects land as 404
            // without touching the dedup set.
            let conn = state.db.lock().await;
            showwork_store::resolve_project(&conn, &project_id, &viewer)?;
        }
        count_view_once(&state, &session_id, &project_id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
    .await;
    respond(&state, result)
}

pub(crate) async fn engagement_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let result = async {
        let project_id = ProjectId::parse(&id)?;
        let viewer = resolve_viewer(&state, &headers).await?;
        let conn = state.db.lock().await;
        let status = showwork_store::engagement_status(&conn, &viewer, &project_id)?;
        Ok(Json(status).into_response())
    }
    .await;
    respond(&state, result)
}

/// The outward profile shape: everything on the row except the auth
/// provider's account id, plus the public aggregates.
#[derive(Debug, Serialize)]
struct ProfilePage {
    username: Username,
    full_name: String,
    headline: Option<String>,
    bio: Option<String>,
    avatar_url: Option<String>,
    github_url: Option<String>,
    linkedin_url: Option<String>,
    website_url: Option<String>,
    open_to_work: bool,
    created_at: String,
    stats: ProfileStats,
}

impl ProfilePage {
    fn new(profile: Profile, stats: ProfileStats) -> Self {
        Self {
            username: profile.username,
            full_name: profile.full_name,
            headline: profile.headline,
            bio: profile.bio,
            avatar_url: profile.avatar_url,
            github_url: profile.github_url,
            linkedin_url: profile.linkedin_url,
            website_url: profile.website_url,
            open_to_work: profile.open_to_work,
            created_at: profile.created_at,
            stats,
        }
    }
}

pub(crate) async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Response {
    let result = async {
        let username = Username::parse(&username)?;
        let conn = state.db.lock().await;
        let Some(profile) = showwork_store::get_profile_by_username(&conn, &username)? else {
            return Err(CoreError::not_found("profile"));
        };
        let stats = showwork_query::profile_stats(&conn, &profile.id)?;
        Ok(Json(ProfilePage::new(profile, stats)).into_response())
    }
    .await;
    respond(&state, result)
}

pub(crate) async fn list_profile_projects(
    State(state): State<AppState>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Response {
    let result = async {
        let username = Username::parse(&username)?;
        let viewer = resolve_viewer(&state, &headers).await?;
        let conn = state.db.lock().await;
        let Some(profile) = showwork_store::get_profile_by_username(&conn, &username)? else {
            return Err(CoreError::not_found("profile"));
        };
        let rows = showwork_query::list_profile_projects(&conn, &profile.id, &viewer)?;
        Ok(Json(json!({ "rows": rows })).into_response())
    }
    .await;
    respond(&state, result)
}

/// Settings update for the signed-in profile. Returns the caller's own
/// full row, account id included.
pub(crate) async fn update_profile_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let result = async {
        let viewer = resolve_viewer(&state, &headers).await?;
        let patch: ProfilePatch = parse_body(&body)?;
        let mut conn = state.db.lock().await;
        let profile = showwork_store::update_profile(&mut conn, &viewer, &patch)?;
        Ok(Json(profile).into_response())
    }
    .await;
    respond(&state, result)
}

pub(crate) async fn list_own_projects(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let result = async {
        let viewer = resolve_viewer(&state, &headers).await?;
        let conn = state.db.lock().await;
        let rows = showwork_query::list_own_projects(&conn, &viewer)?;
        Ok(Json(json!({ "rows": rows })).into_response())
    }
    .await;
    respond(&state, result)
}

pub(crate) async fn list_saved_projects(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let result = async {
        let viewer = resolve_viewer(&state, &headers).await?;
        let conn = state.db.lock().await;
        let rows = showwork_query::list_saved_projects(&conn, &viewer)?;
        Ok(Json(json!({ "rows": rows })).into_response())
    }
    .await;
    respond(&state, result)
}
