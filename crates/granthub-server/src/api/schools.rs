use axum::{extract::State, Extension, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct SchoolItem {
    school_id: Uuid,
    name: String,
    abbreviation: Option<String>,
    description: Option<String>,
    mission_keywords: Vec<String>,
    eligibility_notes: Option<String>,
}

/// GET /api/schools
pub(super) async fn list_schools(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<SchoolItem>>>, ApiError> {
    let rows = granthub_db::list_schools(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| SchoolItem {
            school_id: row.public_id,
            name: row.name,
            abbreviation: row.abbreviation,
            description: row.description,
            mission_keywords: row.mission_keywords,
            eligibility_notes: row.eligibility_notes,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
