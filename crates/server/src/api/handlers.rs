use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use hwpdf_core::{Config, LaneStatus};
use serde::Serialize;
use std::sync::Arc;

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lane: Option<LaneStatus>,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let lane = state.lane_status();
    let status = match &lane {
        Some(lane) if !lane.running => "degraded",
        _ => "ok",
    };
    Json(HealthResponse {
        status: status.to_string(),
        lane,
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Config> {
    Json(state.config().clone())
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
