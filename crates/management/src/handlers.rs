//! Axum REST handlers for the wizard and campaign API.

use crate::evaluator::{build_evaluator, ValidationEvaluator};
use crate::models::*;
use crate::store::ManagementStore;
use crate::uploads::{FileStorage, InMemoryFileStorage, UploadOutcome, UploadedFile};
use crate::wizard::{NavigationOutcome, ReviewPreview, SessionView, SubmitOutcome, WizardSession};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::Engine;
use campaign_core::config::WizardConfig;
use campaign_core::{AppConfig, CampaignError, CampaignResult};
use chrono::{DateTime, Utc};
use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Shared management state.
#[derive(Clone)]
pub struct ManagementState {
    pub store: Arc<ManagementStore>,
    pub sessions: Arc<DashMap<Uuid, WizardSession>>,
    pub evaluator: Arc<dyn ValidationEvaluator>,
    pub storage: Arc<InMemoryFileStorage>,
    pub wizard: WizardConfig,
}

impl ManagementState {
    pub fn new(config: &AppConfig, store: Arc<ManagementStore>) -> CampaignResult<Self> {
        let storage = InMemoryFileStorage::new(&config.storage.base_url, config.storage.max_upload_bytes)?;
        Ok(Self {
            store,
            sessions: Arc::new(DashMap::new()),
            evaluator: build_evaluator(&config.validation),
            storage: Arc::new(storage),
            wizard: config.wizard.clone(),
        })
    }

    /// Look up a session for a request and mark it active.
    fn session_mut(&self, id: Uuid) -> Result<RefMut<'_, Uuid, WizardSession>, ApiError> {
        let mut session = self.sessions.get_mut(&id).ok_or_else(|| session_not_found(id))?;
        session.touch();
        Ok(session)
    }

    /// Drop every session idle for longer than the configured TTL.
    pub fn evict_idle_sessions(&self, now: DateTime<Utc>) -> usize {
        let ttl = chrono::Duration::seconds(self.wizard.session_ttl_secs as i64);
        let before = self.sessions.len();
        self.sessions.retain(|id, session| {
            let idle = session.is_idle(now, ttl);
            if idle {
                debug!(session_id = %id, step = ?session.step(), "Evicting idle wizard session");
            }
            !idle
        });
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            info!(evicted, remaining = self.sessions.len(), "Idle wizard sessions evicted");
            metrics::counter!("wizard.sessions.expired").increment(evicted as u64);
        }
        metrics::gauge!("wizard.sessions.active").set(self.sessions.len() as f64);
        evicted
    }

    /// Run `evict_idle_sessions` on the configured sweep interval.
    pub fn spawn_session_sweeper(&self) -> JoinHandle<()> {
        let state = self.clone();
        let period = Duration::from_secs(self.wizard.session_sweep_secs.max(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                state.evict_idle_sessions(Utc::now());
            }
        })
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a domain error onto an HTTP status and JSON body.
pub fn api_error(err: CampaignError) -> ApiError {
    let (status, error) = match &err {
        CampaignError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_failed"),
        CampaignError::Navigation(_) => (StatusCode::CONFLICT, "invalid_step"),
        CampaignError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
        CampaignError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        CampaignError::Upload(_) | CampaignError::Serialization(_) => (StatusCode::BAD_REQUEST, "bad_request"),
        CampaignError::Config(_)
        | CampaignError::Persistence(_)
        | CampaignError::Io(_)
        | CampaignError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };
    if status.is_server_error() {
        warn!(error = %err, "Request failed");
    }
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message: err.to_string(),
        }),
    )
}

fn session_not_found(id: Uuid) -> ApiError {
    api_error(CampaignError::NotFound(format!("wizard session {id}")))
}

#[derive(Debug, Serialize)]
pub struct NavigationResponse {
    pub outcome: NavigationOutcome,
    pub session: SessionView,
}

// ─── Sessions ──────────────────────────────────────────────────────────────

pub async fn create_session(State(state): State<ManagementState>) -> (StatusCode, Json<SessionView>) {
    let session = WizardSession::new(state.wizard.clone());
    let view = session.snapshot();
    state.sessions.insert(session.id(), session);
    metrics::counter!("wizard.sessions.created").increment(1);
    metrics::gauge!("wizard.sessions.active").set(state.sessions.len() as f64);
    (StatusCode::CREATED, Json(view))
}

pub async fn get_session(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state.session_mut(id)?;
    Ok(Json(session.snapshot()))
}

pub async fn delete_session(State(state): State<ManagementState>, Path(id): Path<Uuid>) -> StatusCode {
    match state.sessions.remove(&id) {
        Some((_, session)) => {
            info!(session_id = %id, step = ?session.step(), "Wizard session abandoned");
            metrics::gauge!("wizard.sessions.active").set(state.sessions.len() as f64);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

pub async fn apply_update(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
    Json(update): Json<DraftUpdate>,
) -> Result<Json<SessionView>, ApiError> {
    let mut session = state.session_mut(id)?;
    session.apply(update).map_err(api_error)?;
    Ok(Json(session.snapshot()))
}

pub async fn next_step(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NavigationResponse>, ApiError> {
    let mut session = state.session_mut(id)?;
    let outcome = session.forward();
    Ok(Json(NavigationResponse {
        outcome,
        session: session.snapshot(),
    }))
}

pub async fn previous_step(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
) -> Result<Json<NavigationResponse>, ApiError> {
    let mut session = state.session_mut(id)?;
    let outcome = session.back();
    Ok(Json(NavigationResponse {
        outcome,
        session: session.snapshot(),
    }))
}

pub async fn preview(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReviewPreview>, ApiError> {
    let session = state.session_mut(id)?;
    Ok(Json(session.preview(state.evaluator.as_ref())))
}

// ─── Uploads ───────────────────────────────────────────────────────────────

pub async fn upload(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<UploadOutcome>, ApiError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(req.data_base64.as_bytes())
        .map_err(|e| api_error(CampaignError::Upload(format!("invalid base64 payload: {e}"))))?;
    let file = UploadedFile {
        file_name: req.file_name,
        content_type: req.content_type,
        bytes,
    };

    // The session lock is released while the file is stored; a newer upload
    // for the same target started in between wins.
    let token = {
        let mut session = state.session_mut(id)?;
        session.begin_upload(req.target).map_err(api_error)?
    };

    let result = state.storage.store(&file);

    let mut session = state.session_mut(id)?;
    Ok(Json(session.finish_upload(token, &file, result)))
}

pub async fn get_file(State(state): State<ManagementState>, Path(key): Path<String>) -> Response {
    match state.storage.get(&key) {
        Some(object) => ([(header::CONTENT_TYPE, object.content_type)], object.bytes).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// ─── Suggestions ───────────────────────────────────────────────────────────

pub async fn suggestions(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<Vec<CampaignSummary>>, ApiError> {
    let mut session = state.session_mut(id)?;
    Ok(Json(session.suggestions(&query.q, state.store.as_ref())))
}

// ─── Submission ────────────────────────────────────────────────────────────

pub async fn submit(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<SubmitOutcome>), ApiError> {
    let outcome = {
        let mut session = state.session_mut(id)?;
        session.submit(state.store.as_ref(), "admin").map_err(api_error)?
    };
    state.sessions.remove(&id);
    metrics::gauge!("wizard.sessions.active").set(state.sessions.len() as f64);
    Ok((StatusCode::CREATED, Json(outcome)))
}

// ─── Campaigns ─────────────────────────────────────────────────────────────

pub async fn list_campaigns(State(state): State<ManagementState>) -> Json<Vec<CampaignRecord>> {
    Json(state.store.list_campaigns())
}

pub async fn get_campaign(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CampaignRecord>, StatusCode> {
    state
        .store
        .get_campaign(id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn audit_log(State(state): State<ManagementState>) -> Json<Vec<AuditLogEntry>> {
    Json(state.store.get_audit_log())
}
