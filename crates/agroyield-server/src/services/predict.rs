//! Input validation and model invocation.
//!
//! Validation runs before the model is touched, so a constraint violation
//! never reaches the forest. A model-side failure (unseen category, missing
//! feature) is still a client error, reported after invocation.

use agroyield_core::{FeatureValue, Row};
use tracing::info;

use crate::dto::{PredictionRequest, PredictionResponse};
use crate::error::AppError;
use crate::ServerState;

/// Upper bound on cultivated area, in hectares.
const MAX_AREA_HECTARES: f64 = 10_000_000.0;

/// Runs one validated prediction.
pub fn predict(
    state: &ServerState,
    req: PredictionRequest,
) -> Result<PredictionResponse, AppError> {
    validate(&req)?;

    info!(
        "Prediction request: crop={}, state={}, season={}, area={}",
        req.crop,
        req.state,
        req.season.as_deref().unwrap_or("-"),
        req.area
    );

    let predicted = state
        .pipeline
        .predict(&to_row(&req))
        .map_err(|e| AppError::BadRequest(format!("Prediction failed: {e}")))?;

    Ok(PredictionResponse {
        crop: req.crop,
        state: req.state,
        season: req.season,
        area: req.area,
        predicted_production: predicted,
    })
}

/// Checks the request constraints the model itself cannot express.
fn validate(req: &PredictionRequest) -> Result<(), AppError> {
    if req.crop.is_empty() {
        return Err(AppError::BadRequest("Crop must be a non-empty string".into()));
    }
    if req.state.is_empty() {
        return Err(AppError::BadRequest("State must be a non-empty string".into()));
    }
    // The comparison is written so NaN also fails it.
    if !(req.area > 0.0) {
        return Err(AppError::BadRequest("Area must be greater than 0".into()));
    }
    if req.area > MAX_AREA_HECTARES {
        return Err(AppError::BadRequest(format!(
            "Area must be at most {MAX_AREA_HECTARES}"
        )));
    }
    Ok(())
}

/// Maps the request onto the tabular row shape the model expects.
///
/// Columns the artifact lists but the request lacks stay missing; the
/// encoder decides whether a stand-in exists.
fn to_row(req: &PredictionRequest) -> Row {
    let season = match &req.season {
        Some(s) => FeatureValue::text(s),
        None => FeatureValue::Missing,
    };
    Row::new()
        .with("Crop", FeatureValue::text(&req.crop))
        .with("State", FeatureValue::text(&req.state))
        .with("Season", season)
        .with("Area", FeatureValue::number(req.area))
}
