use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use granthub_pipeline::{PipelineError, PipelineRunReport, RunOutcome, RunTrigger};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ErrorBody, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct RunReportItem {
    outcome: RunOutcome,
    #[serde(flatten)]
    report: PipelineRunReport,
}

/// Error envelope that still carries the partial report of a failed run.
#[derive(Debug, Serialize)]
struct RunFailedBody {
    error: ErrorBody,
    data: RunReportItem,
    meta: ResponseMeta,
}

/// POST /api/refresh runs the pipeline now and returns its report.
///
/// 409 while another run holds the guard, 503 when the pipeline is not
/// configured, 500 with the report when the run failed outright.
pub(super) async fn trigger_refresh(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<RunReportItem>>, Response> {
    let Some(pipeline) = state.pipeline.as_ref() else {
        return Err(ApiError::new(
            req_id.0,
            "service_unavailable",
            "pipeline is not configured; set SERP_API_KEY and GEMINI_API_KEY",
        )
        .into_response());
    };

    let report = match pipeline.run(RunTrigger::Manual).await {
        Ok(report) => report,
        Err(PipelineError::AlreadyRunning) => {
            return Err(ApiError::new(
                req_id.0,
                "conflict",
                "a pipeline run is already in progress",
            )
            .into_response());
        }
        Err(e) => {
            tracing::error!(error = %e, "manual pipeline run could not start");
            return Err(
                ApiError::new(req_id.0, "internal_error", "pipeline run failed").into_response(),
            );
        }
    };

    let outcome = report.outcome();
    let item = RunReportItem { outcome, report };

    if outcome == RunOutcome::Failed {
        let body = RunFailedBody {
            error: ErrorBody {
                code: "pipeline_failed".to_string(),
                message: format!(
                    "run finished with {} errors and nothing stored",
                    item.report.errored
                ),
            },
            data: item,
            meta: ResponseMeta::new(req_id.0),
        };
        return Err((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response());
    }

    Ok(Json(ApiResponse {
        data: item,
        meta: ResponseMeta::new(req_id.0),
    }))
}
