//! HTTP handlers for the era endpoints.
//!
//! Each handler builds a [`RequestContext`](world_one_eras::RequestContext)
//! bounded by the configured request timeout and delegates to the
//! [`EraBackend`]. Dropping the handler future (client disconnect) drops the
//! open transaction, which rolls it back.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use chrono::{SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use world_one_eras::RolloverOutcome;
use world_one_types::EraDto;

use crate::backend::EraBackend;
use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /api/v1/eras/rollover`.
#[derive(Debug, Clone, Deserialize)]
pub struct RolloverRequest {
    /// Name of the era to open. Surrounding whitespace is ignored.
    pub name: String,
}

/// Response of `POST /api/v1/eras/rollover`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolloverResponse {
    /// The era that was opened.
    pub new_era: EraDto,
    /// The era that was closed, `null` on the first rollover.
    pub previous_era: Option<EraDto>,
}

impl From<RolloverOutcome> for RolloverResponse {
    fn from(outcome: RolloverOutcome) -> Self {
        Self {
            new_era: outcome.new_era.into(),
            previous_era: outcome.previous_era.map(EraDto::from),
        }
    }
}

/// `GET /api/v1/eras` -- every era in storage order.
pub async fn list_eras<B: EraBackend>(
    State(state): State<Arc<AppState<B>>>,
) -> Result<Json<Vec<EraDto>>, ApiError> {
    let ctx = state.request_context();
    let eras = state.backend.list_eras(&ctx).await?;
    Ok(Json(eras.into_iter().map(EraDto::from).collect()))
}

/// `GET /api/v1/eras/current` -- the era in effect, or 404 before the first
/// rollover.
pub async fn current_era<B: EraBackend>(
    State(state): State<Arc<AppState<B>>>,
) -> Result<Json<EraDto>, ApiError> {
    let ctx = state.request_context();
    let era = state.backend.current_era(&ctx).await?;
    Ok(Json(era.into()))
}

/// `POST /api/v1/eras/rollover` -- close the current era and open a new one
/// at the server's wall-clock time, cut to the microseconds storage keeps.
pub async fn rollover<B: EraBackend>(
    State(state): State<Arc<AppState<B>>>,
    payload: Result<Json<RolloverRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RolloverResponse>), ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))?;

    let ctx = state.request_context();
    let now = Utc::now().trunc_subsecs(6);
    info!(era_name = %request.name, %now, "Era rollover requested");

    let outcome = state.backend.rollover(&ctx, now, &request.name).await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}
