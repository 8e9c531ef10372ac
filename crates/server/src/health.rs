use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use mymove_core::data::MoveDataService;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    data: Arc<dyn MoveDataService>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub data_service: HealthCheck,
    pub checked_at: String,
}

pub fn router(data: Arc<dyn MoveDataService>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { data })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let data_service = data_service_check(state.data.as_ref()).await;
    let ready = data_service.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "mymove-server runtime initialized".to_string(),
        },
        data_service,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn data_service_check(data: &dyn MoveDataService) -> HealthCheck {
    match data.health_check().await {
        Ok(()) => HealthCheck { status: "ready", detail: "data service reachable".to_string() },
        Err(error) => HealthCheck {
            status: "degraded",
            detail: format!("data service check failed: {error}"),
        },
    }
}
