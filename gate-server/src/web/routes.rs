//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use tracing::{debug, warn};

use crate::discovery::{Direction, ScanError, ScanOutcome};
use crate::domain::UserId;
use crate::location::{FixedLocation, Geolocator, LocationError};
use crate::store::{ProfileStore, StoreError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/profiles/:user_id", put(save_profile).get(get_profile))
        .route("/scan", post(scan))
        .route("/browse/:user_id", get(browse_current))
        .route("/browse/:user_id/next", post(browse_next))
        .route("/browse/:user_id/prev", post(browse_prev))
        .route("/chat/:user_id", post(chat))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

fn parse_user(raw: &str) -> Result<UserId, AppError> {
    UserId::parse(raw).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })
}

/// Create or replace a traveler's profile.
async fn save_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<SaveResponse>, AppError> {
    let user = parse_user(&user_id)?;
    let profile = req
        .into_profile(user)
        .map_err(|message| AppError::BadRequest { message })?;

    let outcome = state.store.save_profile(&profile).await?;

    // Make the traveler's own write visible to scans at their airport.
    if let Some(airport) = profile.airport {
        state.candidates.invalidate_airport(airport);
    }

    Ok(Json(SaveResponse {
        saved: true,
        asset_skipped: outcome.asset_skipped,
    }))
}

/// Fetch a traveler's profile.
async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileView>, AppError> {
    let user = parse_user(&user_id)?;
    let profile = state.store.require_profile(&user).await?;
    Ok(Json(ProfileView::from_profile(&profile)))
}

/// Run a discovery scan and start a browse session over its result.
async fn scan(
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> Result<Json<ScanResponse>, AppError> {
    let user = parse_user(&req.user_id)?;
    let fix = coordinate_from(req.latitude, req.longitude)
        .map_err(|message| AppError::BadRequest { message })?;

    // Starting a scan ends the previous session and any scan still in flight,
    // whether or not this one succeeds.
    let session = state.session_for(&user).await;
    {
        let mut cursor = session.cursor.lock().await;
        session.scanner.invalidate();
        *cursor = None;
    }

    let profile = state.store.require_profile(&user).await?;

    // A client-supplied fix wins; otherwise the last location the traveler saved.
    let locator = Geolocator::new(FixedLocation::from_option(fix.or(profile.location)))
        .with_max_fix_age(state.config.max_fix_age());

    let result = match session
        .scanner
        .scan(&profile, state.candidates.as_ref(), &locator)
        .await?
    {
        ScanOutcome::Complete(result) => result,
        ScanOutcome::Superseded { generation } => {
            return Err(AppError::Conflict {
                message: format!("scan {generation} was superseded by a newer scan"),
            });
        }
    };

    {
        let mut cursor = session.cursor.lock().await;
        // A newer scan may have started while this one was being stored.
        if !session.scanner.is_current(result.generation) {
            return Err(AppError::Conflict {
                message: format!("scan {} was superseded by a newer scan", result.generation),
            });
        }
        *cursor = result.candidates.cursor();
    }

    debug!(user = %user, candidates = result.candidates.len(), "browse session updated");

    Ok(Json(ScanResponse {
        generation: result.generation,
        candidates: result
            .candidates
            .iter()
            .map(CandidateView::from_candidate)
            .collect(),
        location_issue: result.location_issue.map(|issue| issue.to_string()),
    }))
}

async fn browse(
    state: &AppState,
    user_id: &str,
    direction: Option<Direction>,
) -> Result<Json<BrowseResponse>, AppError> {
    let user = parse_user(user_id)?;
    let no_session = || AppError::NotFound {
        message: format!("no browse session for {user}"),
    };

    let session = state.existing_session(&user).await.ok_or_else(no_session)?;
    let mut cursor = session.cursor.lock().await;
    let cursor = cursor.as_mut().ok_or_else(no_session)?;

    let candidate = match direction {
        Some(direction) => cursor.advance(direction),
        None => cursor.current(),
    };
    let candidate = CandidateView::from_candidate(candidate);

    Ok(Json(BrowseResponse {
        index: cursor.index(),
        total: cursor.len(),
        candidate,
    }))
}

/// Current candidate of the traveler's session.
async fn browse_current(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<BrowseResponse>, AppError> {
    browse(&state, &user_id, None).await
}

/// Step forward, wrapping to the first candidate.
async fn browse_next(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<BrowseResponse>, AppError> {
    browse(&state, &user_id, Some(Direction::Forward)).await
}

/// Step back, wrapping to the last candidate.
async fn browse_prev(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<BrowseResponse>, AppError> {
    browse(&state, &user_id, Some(Direction::Back)).await
}

/// Messaging between matched travelers is not offered.
async fn chat(Path(_user_id): Path<String>) -> AppError {
    AppError::NotImplemented {
        message: "chat is not available".to_string(),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Forbidden { message: String },
    NotFound { message: String },
    Conflict { message: String },
    BadGateway { message: String },
    NotImplemented { message: String },
    Internal { message: String },
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => AppError::NotFound {
                message: e.to_string(),
            },
            StoreError::Config(_) => AppError::Internal {
                message: e.to_string(),
            },
            _ => AppError::BadGateway {
                message: e.to_string(),
            },
        }
    }
}

impl From<ScanError> for AppError {
    fn from(e: ScanError) -> Self {
        match e {
            ScanError::IncompleteProfile(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            ScanError::Location(LocationError::PermissionDenied) => AppError::Forbidden {
                message: e.to_string(),
            },
            ScanError::Location(_) | ScanError::Query(_) => AppError::BadGateway {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Forbidden { message } => (StatusCode::FORBIDDEN, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::NotImplemented { message } => (StatusCode::NOT_IMPLEMENTED, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            warn!(%status, %message, "request failed");
        } else {
            debug!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
