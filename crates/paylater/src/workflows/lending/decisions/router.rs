use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use uuid::Uuid;

use super::clients::{LedgerNotifier, TransactionSource, TransactionSourceError};
use super::domain::{PlanId, UserId};
use super::repository::{DecisionRepository, PlanRepository, RepositoryError};
use super::service::{DecisionRequest, DecisionService, DecisionServiceError};

/// Router builder exposing HTTP endpoints for the decision workflow.
pub fn decision_router<S, N, D, P>(service: Arc<DecisionService<S, N, D, P>>) -> Router
where
    S: TransactionSource + 'static,
    N: LedgerNotifier + 'static,
    D: DecisionRepository + 'static,
    P: PlanRepository + 'static,
{
    Router::new()
        .route("/api/v1/decisions", post(decide_handler::<S, N, D, P>))
        .route(
            "/api/v1/decisions/history/:user_id",
            get(history_handler::<S, N, D, P>),
        )
        .route("/api/v1/plans/:plan_id", get(plan_handler::<S, N, D, P>))
        .with_state(service)
}

pub(crate) async fn decide_handler<S, N, D, P>(
    State(service): State<Arc<DecisionService<S, N, D, P>>>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response
where
    S: TransactionSource + 'static,
    N: LedgerNotifier + 'static,
    D: DecisionRepository + 'static,
    P: PlanRepository + 'static,
{
    match service.decide(request).await {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(DecisionServiceError::InvalidRequest(message)) => {
            let payload = json!({ "error": message });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(DecisionServiceError::Source(TransactionSourceError::UserNotFound(user))) => {
            let payload = json!({ "error": format!("user not found: {user}") });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(DecisionServiceError::Source(TransactionSourceError::Timeout)) => {
            let payload = json!({ "error": "transaction source timed out" });
            (StatusCode::GATEWAY_TIMEOUT, axum::Json(payload)).into_response()
        }
        Err(DecisionServiceError::Source(error @ TransactionSourceError::Upstream { .. })) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn history_handler<S, N, D, P>(
    State(service): State<Arc<DecisionService<S, N, D, P>>>,
    Path(user_id): Path<String>,
) -> Response
where
    S: TransactionSource + 'static,
    N: LedgerNotifier + 'static,
    D: DecisionRepository + 'static,
    P: PlanRepository + 'static,
{
    let user = UserId(user_id);
    match service.decision_history(&user) {
        Ok(records) => {
            let payload = json!({
                "user_id": user.0,
                "decisions": records
                    .iter()
                    .map(|record| record.view())
                    .collect::<Vec<_>>(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn plan_handler<S, N, D, P>(
    State(service): State<Arc<DecisionService<S, N, D, P>>>,
    Path(plan_id): Path<String>,
) -> Response
where
    S: TransactionSource + 'static,
    N: LedgerNotifier + 'static,
    D: DecisionRepository + 'static,
    P: PlanRepository + 'static,
{
    let id = match plan_id.parse::<Uuid>() {
        Ok(id) => PlanId(id),
        Err(_) => {
            let payload = json!({ "error": format!("invalid plan id: {plan_id}") });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };

    match service.plan(&id) {
        Ok(plan) => (StatusCode::OK, axum::Json(plan.view())).into_response(),
        Err(DecisionServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({ "error": format!("plan not found: {}", id.0) });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
