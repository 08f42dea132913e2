//! Job submission handler.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

use omrgate_core::{JobRequest, JobResult};

use crate::state::AppState;

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Run a grading job.
///
/// Job failures, including a body that is valid JSON but not a valid job,
/// come back with 200 and an error envelope. Only a fault in the job task
/// itself yields a 500.
pub async fn process(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request = match parse_job_request(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    info!(images = request.images.len(), "Accepted job");

    // The job owns its task so it runs to completion even if the client
    // goes away.
    let orchestrator = Arc::clone(state.orchestrator());
    match tokio::spawn(async move { orchestrator.run(request).await }).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            error!(error = %e, "Job task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

fn parse_job_request(body: &[u8]) -> Result<JobRequest, Response> {
    let value: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(body).map_err(|e| {
            error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid job request: {}", e),
            )
        })?
    };

    if is_empty_payload(&value) {
        return Err(error_response(StatusCode::BAD_REQUEST, "No data provided"));
    }

    serde_json::from_value(value).map_err(|e| {
        let result = JobResult::error(format!("Processing failed: {}", e));
        (StatusCode::OK, Json(result)).into_response()
    })
}

/// Null, false, zero and empty strings, arrays or objects carry no job.
fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
