//! Inbound RPC surface
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST | `/v1/conferences` | create |
//! | GET | `/v1/conferences?customer_id=..&page_size=..&page_token=..` | list |
//! | GET | `/v1/conferences/:id` | get |
//! | PUT | `/v1/conferences/:id` | update |
//! | DELETE | `/v1/conferences/:id` | terminate |
//! | POST | `/v1/conferences/:id/terminate` | terminate |
//! | POST | `/v1/conferences/:id/calls` | join |
//! | DELETE | `/v1/conferences/:id/calls/:call_id` | leave |
//! | POST | `/v1/conferences/:id/recording_start` | start recording |
//! | POST | `/v1/conferences/:id/recording_stop` | stop recording |
//! | GET | `/v1/metrics` | counter snapshot |

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::conference::ConferenceEngine;
use crate::error::{ConferenceError, ErrorKind};
use crate::models::{Conference, CreateConference, Recording, UpdateConference};
use crate::monitoring::{CounterMetrics, CounterSample};

#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<ConferenceEngine>,
    pub metrics: Arc<CounterMetrics>,
    pub default_page_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub customer_id: Uuid,
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub page_token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinRequest {
    pub call_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

/// Engine error carried to the HTTP response
#[derive(Debug)]
pub struct ApiError(ConferenceError);

impl From<ConferenceError> for ApiError {
    fn from(err: ConferenceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = match kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Transient => StatusCode::BAD_GATEWAY,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        debug!("API error {}: {}", status, self.0);
        let body = ErrorBody {
            error: kind.as_str().to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/v1/conferences", post(create_conference).get(list_conferences))
        .route(
            "/v1/conferences/:id",
            get(get_conference).put(update_conference).delete(terminate_conference),
        )
        .route("/v1/conferences/:id/terminate", post(terminate_conference))
        .route("/v1/conferences/:id/calls", post(join_call))
        .route("/v1/conferences/:id/calls/:call_id", delete(leave_call))
        .route("/v1/conferences/:id/recording_start", post(recording_start))
        .route("/v1/conferences/:id/recording_stop", post(recording_stop))
        .route("/v1/metrics", get(metrics))
        .with_state(state)
}

async fn create_conference(
    State(state): State<ApiState>,
    Json(body): Json<CreateConference>,
) -> ApiResult<Json<Conference>> {
    Ok(Json(state.engine.create(body).await?))
}

async fn list_conferences(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Conference>>> {
    let page_size = query.page_size.unwrap_or(state.default_page_size);
    let conferences = state
        .engine
        .list(query.customer_id, page_size, query.page_token.as_deref())
        .await?;
    Ok(Json(conferences))
}

async fn get_conference(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult<Json<Conference>> {
    Ok(Json(state.engine.get(id).await?))
}

async fn update_conference(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateConference>,
) -> ApiResult<Json<Conference>> {
    Ok(Json(state.engine.update(id, body).await?))
}

async fn terminate_conference(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult<Json<Conference>> {
    Ok(Json(state.engine.terminate(id, "requested").await?))
}

async fn join_call(
    State(state): State<ApiState>,
    Path(id): Path<Uuid>,
    Json(body): Json<JoinRequest>,
) -> ApiResult<StatusCode> {
    state.engine.join(id, body.call_id).await?;
    Ok(StatusCode::ACCEPTED)
}

async fn leave_call(
    State(state): State<ApiState>,
    Path((id, call_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    state.engine.leave(id, call_id).await?;
    Ok(StatusCode::ACCEPTED)
}

async fn recording_start(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult<Json<Recording>> {
    Ok(Json(state.engine.recording_start(id).await?))
}

async fn recording_stop(State(state): State<ApiState>, Path(id): Path<Uuid>) -> ApiResult<Json<Recording>> {
    Ok(Json(state.engine.recording_stop(id).await?))
}

async fn metrics(State(state): State<ApiState>) -> Json<Vec<CounterSample>> {
    Json(state.metrics.snapshot())
}
