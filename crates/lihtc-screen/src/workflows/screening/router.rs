use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{PropertyRecord, TargetPopulation, UsState};
use super::pipeline::ScreeningPipeline;
use super::ScreeningResult;
use crate::spatial::Coordinate;
use crate::workflows::report::ScreeningSummary;

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub properties: Vec<PropertyRecord>,
    /// Run stage one only; rows come back in input order without scores.
    #[serde(default)]
    pub prefilter_only: bool,
    /// Keep only the best `top` ranked rows. Ignored with `prefilter_only`.
    #[serde(default)]
    pub top: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub summary: ScreeningSummary,
    pub results: Vec<ScreeningResult>,
}

#[derive(Debug, Deserialize)]
pub struct LocateRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub state: Option<UsState>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub population: TargetPopulation,
}

/// Router builder exposing the screening endpoints.
pub fn screening_router(pipeline: Arc<ScreeningPipeline>) -> Router {
    Router::new()
        .route("/api/v1/screening/evaluate", post(evaluate_handler))
        .route("/api/v1/screening/locate", post(locate_handler))
        .with_state(pipeline)
}

pub(crate) async fn evaluate_handler(
    State(pipeline): State<Arc<ScreeningPipeline>>,
    axum::Json(request): axum::Json<EvaluateRequest>,
) -> Response {
    if request.properties.is_empty() {
        let payload = json!({ "error": "no properties supplied" });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    }

    let (summary, mut results) = if request.prefilter_only {
        let results = pipeline.prefilter(request.properties);
        (ScreeningSummary::from_results(&results), results)
    } else {
        let run = pipeline.run(request.properties);
        (run.summary, run.results)
    };

    if let (Some(top), false) = (request.top, request.prefilter_only) {
        results.retain(|result| result.rank.is_some_and(|rank| rank <= top));
    }

    (StatusCode::OK, axum::Json(EvaluateResponse { summary, results })).into_response()
}

pub(crate) async fn locate_handler(
    State(pipeline): State<Arc<ScreeningPipeline>>,
    axum::Json(request): axum::Json<LocateRequest>,
) -> Response {
    let coordinate = match Coordinate::new(request.latitude, request.longitude) {
        Ok(coordinate) => coordinate,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };

    let mut property = PropertyRecord::new("point");
    property.coordinate = Some(coordinate);
    property.state = request.state;
    property.county = request.county;
    property.population = request.population;

    let result = pipeline.evaluate_one(property);
    (StatusCode::OK, axum::Json(result)).into_response()
}
