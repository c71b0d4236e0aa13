//! Read-only inspection of live relay sessions.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use serde::Serialize;
use tracing::instrument;

use knightwire_session::domain::session::SessionSnapshot;

use crate::error::ApiError;
use crate::state::AppState;

/// Response body for GET /.
#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    /// Identities of all live sessions, sorted.
    pub identities: Vec<String>,
}

/// Read-only view of one session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    /// The session identity.
    pub identity: String,
    /// Current board diagram.
    pub rendered: String,
    /// `in_progress` or `terminal`.
    pub status: &'static str,
    /// Game result once terminal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

impl From<SessionSnapshot> for SessionView {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            status: snapshot.status.as_str(),
            outcome: snapshot.status.outcome().map(str::to_owned),
            identity: snapshot.identity,
            rendered: snapshot.rendered,
        }
    }
}

/// GET /
async fn list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    Json(SessionListResponse {
        identities: state.registry.identities(),
    })
}

/// GET /{identity}
#[instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    Path(identity): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let snapshot = state.registry.lookup(&identity)?;
    Ok(Json(SessionView::from(snapshot)))
}

/// Returns the router for session inspection.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sessions))
        .route("/{identity}", get(get_session))
}
