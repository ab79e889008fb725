use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use granthub_db::{GrantFilters, GrantRow};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct GrantItem {
    grant_id: Uuid,
    school_name: String,
    title: String,
    description: String,
    source_url: String,
    funder: String,
    deadline: Option<NaiveDate>,
    amount_text: Option<String>,
    amount_value: Option<Decimal>,
    eligibility: Option<String>,
    relevance_score: i32,
    first_seen_at: DateTime<Utc>,
    last_seen_at: DateTime<Utc>,
}

impl From<GrantRow> for GrantItem {
    fn from(row: GrantRow) -> Self {
        Self {
            grant_id: row.public_id,
            school_name: row.school_name,
            title: row.title,
            description: row.description,
            source_url: row.source_url,
            funder: row.funder,
            deadline: row.deadline,
            amount_text: row.amount_text,
            amount_value: row.amount_value,
            eligibility: row.eligibility,
            relevance_score: row.relevance_score,
            first_seen_at: row.first_seen_at,
            last_seen_at: row.last_seen_at,
        }
    }
}

async fn fetch(
    state: &AppState,
    req_id: RequestId,
    filters: GrantFilters<'_>,
) -> Result<Json<ApiResponse<Vec<GrantItem>>>, ApiError> {
    let rows = granthub_db::list_grants(&state.pool, filters)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(GrantItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/grants
pub(super) async fn list_grants(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<GrantItem>>>, ApiError> {
    fetch(&state, req_id, GrantFilters::default()).await
}

/// GET /api/grants/search?query= matches titles case-insensitively.
pub(super) async fn search_grants(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<GrantItem>>>, ApiError> {
    let query = params.query.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "query must be a non-empty string",
        ));
    }

    let filters = GrantFilters {
        school_name: None,
        title_query: Some(query),
    };
    fetch(&state, req_id, filters).await
}

/// GET /api/grants/{school_name}. An unknown school yields an empty list.
pub(super) async fn list_school_grants(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(school_name): Path<String>,
) -> Result<Json<ApiResponse<Vec<GrantItem>>>, ApiError> {
    let filters = GrantFilters {
        school_name: Some(school_name.trim()),
        title_query: None,
    };
    fetch(&state, req_id, filters).await
}
