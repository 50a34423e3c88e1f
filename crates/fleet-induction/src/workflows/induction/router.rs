use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use super::domain::{Decision, RuleOverrides, SnapshotError, TrainsetId};
use super::ranking::RankFilters;
use super::repository::{DecisionUpdate, FleetRepository, RepositoryError, WeightsRepository};
use super::service::{InductionService, InductionServiceError, RankQuery};

/// Router builder exposing the induction engine over HTTP.
pub fn induction_router<F, W>(service: Arc<InductionService<F, W>>) -> Router
where
    F: FleetRepository + 'static,
    W: WeightsRepository + 'static,
{
    Router::new()
        .route("/api/v1/trainsets", get(list_handler::<F, W>))
        .route("/api/v1/trainsets/:trainset_id", get(detail_handler::<F, W>))
        .route(
            "/api/v1/trainsets/:trainset_id/decision",
            patch(decision_handler::<F, W>),
        )
        .route("/api/v1/induction/ranked", get(ranked_handler::<F, W>))
        .route("/api/v1/induction/simulate", post(simulate_handler::<F, W>))
        .route(
            "/api/v1/induction/suggestions",
            get(suggestions_handler::<F, W>),
        )
        .route(
            "/api/v1/induction/weights",
            get(weights_handler::<F, W>).put(update_weights_handler::<F, W>),
        )
        .route(
            "/api/v1/induction/weights/reset",
            post(reset_weights_handler::<F, W>),
        )
        .with_state(service)
}

/// Raw query string for ranked listings; values are parsed leniently.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RankedParams {
    pub(crate) decision: Option<String>,
    pub(crate) branding_priority: Option<String>,
    pub(crate) cleaning_status: Option<String>,
    pub(crate) job_card_open: Option<String>,
    pub(crate) min_score: Option<String>,
    pub(crate) skip: Option<String>,
    pub(crate) limit: Option<String>,
    pub(crate) weights: Option<String>,
}

impl RankedParams {
    pub(crate) fn into_query(self) -> RankQuery {
        let weights = self.weights.as_deref().and_then(|raw| {
            match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => Some(map),
                _ => {
                    warn!(weights = raw, "ignoring weights parameter that is not a JSON object");
                    None
                }
            }
        });

        RankQuery {
            weights,
            filters: RankFilters::from_raw(
                self.decision.as_deref(),
                self.branding_priority.as_deref(),
                self.cleaning_status.as_deref(),
                self.job_card_open.as_deref(),
                self.min_score.as_deref(),
            ),
            skip: parse_count(self.skip.as_deref()),
            limit: parse_count(self.limit.as_deref()),
        }
    }
}

fn parse_count(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DecisionUpdateRequest {
    pub(crate) recommendation: Option<String>,
    #[serde(default)]
    pub(crate) manual_override: bool,
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

impl DecisionUpdateRequest {
    fn validate(self) -> Result<DecisionUpdate, SnapshotError> {
        let raw = self
            .recommendation
            .ok_or_else(|| SnapshotError::MissingField {
                field: "recommendation".to_string(),
            })?;
        let recommendation =
            Decision::parse(&raw).ok_or_else(|| SnapshotError::InvalidField {
                field: "recommendation".to_string(),
                value: raw.clone(),
            })?;

        Ok(DecisionUpdate {
            recommendation,
            manual_override: self.manual_override,
            reason: self.reason.filter(|reason| !reason.trim().is_empty()),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SimulationRequest {
    #[serde(flatten)]
    pub(crate) overrides: RuleOverrides,
    #[serde(default)]
    pub(crate) weights: Option<Value>,
}

pub(crate) async fn list_handler<F, W>(
    State(service): State<Arc<InductionService<F, W>>>,
) -> Response
where
    F: FleetRepository + 'static,
    W: WeightsRepository + 'static,
{
    match service.list_with_diagnostics() {
        Ok(trainsets) => (StatusCode::OK, Json(trainsets)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn detail_handler<F, W>(
    State(service): State<Arc<InductionService<F, W>>>,
    Path(trainset_id): Path<String>,
) -> Response
where
    F: FleetRepository + 'static,
    W: WeightsRepository + 'static,
{
    match service.get(&TrainsetId(trainset_id)) {
        Ok(trainset) => (StatusCode::OK, Json(trainset)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn decision_handler<F, W>(
    State(service): State<Arc<InductionService<F, W>>>,
    Path(trainset_id): Path<String>,
    Json(request): Json<DecisionUpdateRequest>,
) -> Response
where
    F: FleetRepository + 'static,
    W: WeightsRepository + 'static,
{
    let update = match request.validate() {
        Ok(update) => update,
        Err(error) => {
            let payload = json!({ "error": error.to_string(), "field": error.field() });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
        }
    };

    match service.update_decision(&TrainsetId(trainset_id), update) {
        Ok(trainset) => (StatusCode::OK, Json(trainset)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn ranked_handler<F, W>(
    State(service): State<Arc<InductionService<F, W>>>,
    Query(params): Query<RankedParams>,
) -> Response
where
    F: FleetRepository + 'static,
    W: WeightsRepository + 'static,
{
    match service.ranked(params.into_query()) {
        Ok(ranked) => (StatusCode::OK, Json(ranked)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn simulate_handler<F, W>(
    State(service): State<Arc<InductionService<F, W>>>,
    Json(request): Json<SimulationRequest>,
) -> Response
where
    F: FleetRepository + 'static,
    W: WeightsRepository + 'static,
{
    let weights = request.weights.as_ref().and_then(Value::as_object);
    match service.simulate(request.overrides, weights) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn suggestions_handler<F, W>(
    State(service): State<Arc<InductionService<F, W>>>,
) -> Response
where
    F: FleetRepository + 'static,
    W: WeightsRepository + 'static,
{
    match service.suggestions() {
        Ok(suggestions) => (StatusCode::OK, Json(suggestions)).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn weights_handler<F, W>(
    State(service): State<Arc<InductionService<F, W>>>,
) -> Response
where
    F: FleetRepository + 'static,
    W: WeightsRepository + 'static,
{
    match service.weights() {
        Ok(weights) => (StatusCode::OK, Json(json!({ "weights": weights }))).into_response(),
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn update_weights_handler<F, W>(
    State(service): State<Arc<InductionService<F, W>>>,
    Json(body): Json<Value>,
) -> Response
where
    F: FleetRepository + 'static,
    W: WeightsRepository + 'static,
{
    let Some(overrides) = body.as_object() else {
        let payload = json!({ "error": "weights payload must be a JSON object" });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
    };

    match service.update_weights(overrides) {
        Ok((weights, report)) => {
            let payload = json!({
                "weights": weights,
                "applied": report.applied,
                "ignored": report.ignored,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => service_error_response(error),
    }
}

pub(crate) async fn reset_weights_handler<F, W>(
    State(service): State<Arc<InductionService<F, W>>>,
) -> Response
where
    F: FleetRepository + 'static,
    W: WeightsRepository + 'static,
{
    match service.reset_weights() {
        Ok(weights) => (StatusCode::OK, Json(json!({ "weights": weights }))).into_response(),
        Err(error) => service_error_response(error),
    }
}

fn service_error_response(error: InductionServiceError) -> Response {
    let status = match &error {
        InductionServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        InductionServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        InductionServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}
