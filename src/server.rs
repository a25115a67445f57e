use axum::http::StatusCode;
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::audit::{Conflict, audit};
use crate::data::{Catalog, GenerationRequest, Placement, Timetable, TimetableOption};
use crate::error::ScheduleError;
use crate::search::SearchConfig;
use crate::solver;

/// Upper bounds on the work one request may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    pub max_variation: u32,
    pub max_options: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_variation: 10,
            max_options: 10,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchConfig>,
    pub limits: RequestLimits,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsRequest {
    #[serde(flatten)]
    pub request: GenerationRequest,
    #[serde(default = "default_num_options")]
    pub num_options: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResponse {
    pub options: Vec<TimetableOption>,
    pub requested: usize,
    pub generated: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRequest {
    pub placements: Vec<Placement>,
    #[serde(default)]
    pub catalog: Option<Catalog>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResponse {
    pub conflicts: Vec<Conflict>,
    pub has_conflicts: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn default_num_options() -> usize {
    3
}

fn api_error(e: ScheduleError) -> ApiError {
    let (status, details) = match &e {
        ScheduleError::InvalidInput(errors) => (
            StatusCode::BAD_REQUEST,
            errors.iter().map(|e| e.message.clone()).collect(),
        ),
        ScheduleError::Infeasible { .. } | ScheduleError::NoOptions { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, Vec::new())
        }
    };
    (
        status,
        Json(ErrorBody {
            error: e.to_string(),
            details,
        }),
    )
}

fn bad_request(message: String) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message,
            details: Vec::new(),
        }),
    )
}

fn check_variation(limits: &RequestLimits, variation: u32) -> Result<(), ApiError> {
    if variation > limits.max_variation {
        return Err(bad_request(format!(
            "variation {variation} exceeds the limit of {}",
            limits.max_variation
        )));
    }
    Ok(())
}

fn worker_error(e: tokio::task::JoinError) -> ApiError {
    error!("Solver task failed: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "solver task failed".to_string(),
            details: Vec::new(),
        }),
    )
}

async fn generate_handler(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<Timetable>, ApiError> {
    check_variation(&state.limits, request.variation)?;
    let search = state.search.clone();
    tokio::task::spawn_blocking(move || solver::generate(&request, &search))
        .await
        .map_err(worker_error)?
        .map(Json)
        .map_err(api_error)
}

async fn options_handler(
    State(state): State<AppState>,
    Json(body): Json<OptionsRequest>,
) -> Result<Json<OptionsResponse>, ApiError> {
    if body.num_options > state.limits.max_options {
        return Err(bad_request(format!(
            "numOptions {} exceeds the limit of {}",
            body.num_options, state.limits.max_options
        )));
    }
    let search = state.search.clone();
    let requested = body.num_options;
    let options = tokio::task::spawn_blocking(move || {
        solver::generate_options(&body.request, body.num_options, &search)
    })
    .await
    .map_err(worker_error)?
    .map_err(api_error)?;

    Ok(Json(OptionsResponse {
        generated: options.len(),
        requested,
        options,
    }))
}

async fn audit_handler(Json(body): Json<AuditRequest>) -> Json<AuditResponse> {
    let conflicts = audit(&body.placements, body.catalog.as_ref());
    Json(AuditResponse {
        has_conflicts: !conflicts.is_empty(),
        conflicts,
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/v1/timetable/generate", post(generate_handler))
        .route("/v1/timetable/options", post(options_handler))
        .route("/v1/timetable/audit", post(audit_handler))
        .with_state(state)
}

pub async fn run_server(
    bind_address: &str,
    search: SearchConfig,
    limits: RequestLimits,
) -> std::io::Result<()> {
    let app = router(AppState {
        search: Arc::new(search),
        limits,
    });

    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState {
            search: Arc::new(SearchConfig {
                base_attempts: 10,
                attempts_per_variation: 5,
                ..SearchConfig::default()
            }),
            limits: RequestLimits {
                max_variation: 3,
                max_options: 4,
            },
        })
    }

    fn generation_body() -> serde_json::Value {
        serde_json::json!({
            "departmentId": 1,
            "semester": 3,
            "academicYear": "2025-26",
            "seed": 5,
            "catalog": {
                "subjects": [{ "id": 1, "name": "DataStructures", "departmentId": 1, "semester": 3, "credits": 4, "hoursPerWeek": 3 }],
                "faculty": [{ "id": 10, "name": "Dr. X", "departmentId": 1 }],
                "classrooms": [{ "id": 101, "name": "Room 101", "capacity": 70 }],
                "batches": [{ "id": 50, "name": "CSE-A", "departmentId": 1, "semester": 3, "studentCount": 60 }],
                "eligibility": [{ "facultyId": 10, "subjectId": 1 }]
            }
        })
    }

    async fn post_json(uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_generate_endpoint() {
        let (status, body) = post_json("/v1/timetable/generate", generation_body()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["placements"].as_array().unwrap().len(), 3);
        assert_eq!(body["seed"], 5);
    }

    #[tokio::test]
    async fn test_generate_infeasible_is_unprocessable() {
        let mut request = generation_body();
        request["catalog"]["eligibility"] = serde_json::json!([]);
        let (status, body) = post_json("/v1/timetable/generate", request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("unable to generate"));
    }

    #[tokio::test]
    async fn test_generate_invalid_params_is_bad_request() {
        let mut request = generation_body();
        request["params"] = serde_json::json!({ "workingDays": 9 });
        let (status, body) = post_json("/v1/timetable/generate", request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_generate_rejects_variation_over_limit() {
        let mut request = generation_body();
        request["variation"] = serde_json::json!(4_000_000_000u64);
        let (status, body) = post_json("/v1/timetable/generate", request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("exceeds the limit of 3"));
    }

    #[tokio::test]
    async fn test_options_rejects_count_over_limit() {
        let mut request = generation_body();
        request["numOptions"] = serde_json::json!(1000);
        let (status, body) = post_json("/v1/timetable/options", request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("numOptions 1000"));
    }

    #[tokio::test]
    async fn test_options_endpoint() {
        let mut request = generation_body();
        request["numOptions"] = serde_json::json!(2);
        let (status, body) = post_json("/v1/timetable/options", request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["requested"], 2);
        assert_eq!(body["generated"], 2);
        assert_eq!(body["options"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_audit_endpoint() {
        let request = serde_json::json!({
            "placements": [
                { "dayOfWeek": 0, "startTime": "09:00", "endTime": "10:00", "subjectId": 1, "facultyId": 10, "classroomId": 101, "batchId": 50 },
                { "dayOfWeek": 0, "startTime": "09:30", "endTime": "10:30", "subjectId": 2, "facultyId": 10, "classroomId": 102, "batchId": 51 }
            ]
        });
        let (status, body) = post_json("/v1/timetable/audit", request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hasConflicts"], true);
        assert_eq!(body["conflicts"][0]["type"], "faculty_conflict");
    }
}
