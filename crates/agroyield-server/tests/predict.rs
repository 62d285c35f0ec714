//! End-to-end tests driving the router with in-memory requests.

use std::sync::Arc;

use agroyield_core::Pipeline;
use agroyield_server::{build_router, ServerState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

/// A two-tree forest: rice yields the mean of 40/120 split on area 100,
/// with a constant 60-tonne second tree.
fn test_pipeline() -> Pipeline {
    let artifact = json!({
        "schema_version": 1,
        "name": "test-crop-forest",
        "features": [
            { "name": "Crop", "encoder": { "kind": "ordinal", "categories": ["Maize", "Rice", "Wheat"] } },
            { "name": "State", "encoder": { "kind": "ordinal", "categories": ["Odisha", "Punjab"] } },
            { "name": "Season", "encoder": { "kind": "ordinal", "categories": ["Kharif", "Rabi"], "missing": -1.0 } },
            { "name": "Area", "encoder": { "kind": "numeric" } }
        ],
        "forest": {
            "trees": [
                { "nodes": [
                    { "kind": "branch", "feature": 3, "threshold": 100.0, "left": 1, "right": 2 },
                    { "kind": "leaf", "value": 40.0 },
                    { "kind": "leaf", "value": 120.0 }
                ] },
                { "nodes": [ { "kind": "leaf", "value": 60.0 } ] }
            ]
        }
    });
    Pipeline::from_json(&artifact.to_string()).unwrap()
}

fn test_app() -> Router {
    let state = Arc::new(ServerState {
        pipeline: test_pipeline(),
        model_path: "model/test.json".to_string(),
    });
    build_router(state)
}

async fn post_predict(app: Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::post("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn valid_request() -> Value {
    json!({ "Crop": "Rice", "State": "Odisha", "Season": "Kharif", "Area": 50.0 })
}

#[tokio::test]
async fn root_reports_status_and_model_path() {
    let response = test_app()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "status": "ok", "model_path": "model/test.json" }));
}

#[tokio::test]
async fn health_returns_ok() {
    let response = test_app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn valid_request_echoes_inputs_with_prediction() {
    let (status, body) = post_predict(test_app(), valid_request()).await;
    assert_eq!(status, StatusCode::OK);
    // Area 50 -> tree 1 yields 40, tree 2 yields 60; mean 50.
    assert_eq!(
        body,
        json!({
            "crop": "Rice",
            "state": "Odisha",
            "season": "Kharif",
            "area": 50.0,
            "predicted_production": 50.0
        })
    );
}

#[tokio::test]
async fn large_area_routes_to_other_leaf() {
    let mut req = valid_request();
    req["Area"] = json!(5000.0);
    let (status, body) = post_predict(test_app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicted_production"], json!(90.0));
}

#[tokio::test]
async fn season_may_be_omitted() {
    let (status, body) = post_predict(
        test_app(),
        json!({ "Crop": "Rice", "State": "Odisha", "Area": 50.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["season"], Value::Null);
    assert_eq!(body["predicted_production"], json!(50.0));
}

#[tokio::test]
async fn season_may_be_null() {
    let mut req = valid_request();
    req["Season"] = Value::Null;
    let (status, body) = post_predict(test_app(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["season"], Value::Null);
}

#[tokio::test]
async fn empty_crop_is_rejected() {
    let mut req = valid_request();
    req["Crop"] = json!("");
    let (status, body) = post_predict(test_app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Crop must be a non-empty string"));
}

#[tokio::test]
async fn empty_state_is_rejected() {
    let mut req = valid_request();
    req["State"] = json!("");
    let (status, body) = post_predict(test_app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("State must be a non-empty string"));
}

#[tokio::test]
async fn zero_area_is_rejected() {
    let mut req = valid_request();
    req["Area"] = json!(0.0);
    let (status, body) = post_predict(test_app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Area must be greater than 0"));
}

#[tokio::test]
async fn negative_area_is_rejected() {
    let mut req = valid_request();
    req["Area"] = json!(-3.5);
    let (status, _) = post_predict(test_app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_area_is_rejected() {
    let mut req = valid_request();
    req["Area"] = json!(10_000_001.0);
    let (status, body) = post_predict(test_app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Area must be at most"));
}

#[tokio::test]
async fn max_area_is_accepted() {
    let mut req = valid_request();
    req["Area"] = json!(10_000_000.0);
    let (status, _) = post_predict(test_app(), req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_crop_is_a_prediction_failure() {
    let mut req = valid_request();
    req["Crop"] = json!("Quinoa");
    let (status, body) = post_predict(test_app(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Prediction failed:"), "got: {message}");
    assert!(message.contains("Quinoa"));
}

#[tokio::test]
async fn missing_required_field_is_rejected_by_extractor() {
    let response = test_app()
        .oneshot(
            Request::post("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{ "Crop": "Rice", "State": "Odisha" }"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let response = test_app()
        .oneshot(
            Request::post("/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
