use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use interclub_core::{
    FixtureId, PlayerId, SelectionEntry, TeamId,
    lock::{OverrideSource, SelectionLockState},
};
use validator::Validate;

use crate::{AppState, actor::Caller, error::ApiError, pairings::JsonMatchupsGenerated};

#[derive(serde::Deserialize, Validate)]
pub struct JsonSelectionRequest {
    #[validate(length(max = 10))]
    entries: Vec<JsonSelectionEntry>,
}

#[derive(serde::Deserialize, serde::Serialize)]
pub struct JsonSelectionEntry {
    player: i64,
    order: u8,
}

#[derive(serde::Deserialize, Validate)]
pub struct JsonScratchNoticeRequest {
    #[validate(length(min = 1, max = 2000))]
    message: String,
}

#[derive(serde::Serialize)]
pub struct JsonSelectionLock {
    state: &'static str,
    allows_edits: bool,
    deadline: Option<DateTime<Utc>>,
    override_source: Option<&'static str>,
    override_until: Option<DateTime<Utc>>,
}

impl From<SelectionLockState> for JsonSelectionLock {
    fn from(lock: SelectionLockState) -> Self {
        let allows_edits = lock.allows_edits();
        match lock {
            SelectionLockState::Open { deadline } => Self {
                state: "open",
                allows_edits,
                deadline: Some(deadline),
                override_source: None,
                override_until: None,
            },
            SelectionLockState::Locked { deadline } => Self {
                state: "locked",
                allows_edits,
                deadline: Some(deadline),
                override_source: None,
                override_until: None,
            },
            SelectionLockState::OverrideOpen(source) => {
                let (override_source, override_until) = match source {
                    OverrideSource::Administrator => ("administrator", None),
                    OverrideSource::AdminOverride { until } => ("admin_override", Some(until)),
                    OverrideSource::ScratchException => ("scratch_exception", None),
                };
                Self {
                    state: "override_open",
                    allows_edits,
                    deadline: None,
                    override_source: Some(override_source),
                    override_until,
                }
            }
        }
    }
}

pub async fn submit_selection(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path((id, team)): Path<(i64, i64)>,
    Json(request): Json<JsonSelectionRequest>,
) -> Result<Json<JsonMatchupsGenerated>, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::bad_request(format!("Invalid selection: {}", e)))?;
    let entries = request
        .entries
        .into_iter()
        .map(|entry| SelectionEntry {
            player: PlayerId(entry.player),
            order: entry.order,
        })
        .collect();

    let matchups_generated = state
        .app
        .selection_submit_use_case
        .submit_selection(actor, FixtureId(id), TeamId(team), entries, Utc::now())
        .await?;
    Ok(Json(JsonMatchupsGenerated { matchups_generated }))
}

pub async fn get_selection_lock(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path((id, team)): Path<(i64, i64)>,
) -> Result<Json<JsonSelectionLock>, ApiError> {
    let lock = state
        .app
        .selection_lock_use_case
        .get_selection_lock(actor, FixtureId(id), TeamId(team), Utc::now())
        .await?;
    Ok(Json(lock.into()))
}

pub async fn submit_scratch_notice(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path((id, team)): Path<(i64, i64)>,
    Json(request): Json<JsonScratchNoticeRequest>,
) -> Result<StatusCode, ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::bad_request(format!("Invalid scratch notice: {}", e)))?;
    state
        .app
        .scratch_submit_use_case
        .submit_scratch_notice(actor, FixtureId(id), TeamId(team), request.message, Utc::now())
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn acknowledge_scratch_notice(
    State(state): State<AppState>,
    Caller(actor): Caller,
    Path((id, team)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    state
        .app
        .scratch_acknowledge_use_case
        .acknowledge_scratch_notice(actor, FixtureId(id), TeamId(team), Utc::now())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
