//! Root status endpoint reporting the loaded artifact.

use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::StatusResponse;
use crate::ServerState;

/// Returns service status and the path of the model being served.
pub async fn status(State(state): State<Arc<ServerState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        model_path: state.model_path.clone(),
    })
}
