//! Data transfer objects for HTTP message serialization.

use serde::{Deserialize, Serialize};

/// Request body for the prediction endpoint.
///
/// Field names match the training columns, hence PascalCase on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PredictionRequest {
    /// Crop name (e.g., Maize, Rice).
    pub crop: String,
    /// State/region name (e.g., Odisha).
    pub state: String,
    /// Season (e.g., Kharif, Rabi). Optional.
    #[serde(default)]
    pub season: Option<String>,
    /// Cultivated area in hectares.
    pub area: f64,
}

/// Response body for the prediction endpoint: the validated inputs echoed
/// back plus the predicted production in tonnes.
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub crop: String,
    pub state: String,
    pub season: Option<String>,
    pub area: f64,
    pub predicted_production: f64,
}

/// Response body for the root status endpoint.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub model_path: String,
}
