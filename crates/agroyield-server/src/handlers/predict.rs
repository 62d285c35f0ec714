//! Prediction HTTP handler.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::{PredictionRequest, PredictionResponse};
use crate::error::AppError;
use crate::services;
use crate::ServerState;

/// Validates one request, runs the model, and echoes the inputs back with
/// the predicted production.
pub async fn predict(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<PredictionRequest>,
) -> Result<Json<PredictionResponse>, AppError> {
    Ok(Json(services::predict::predict(&state, req)?))
}
