use std::sync::LazyLock;

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::digest::{render_digest, Digest};
use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

const MAX_SCHOOL_NAME_CHARS: usize = 200;
const MAX_GRANT_IDS: usize = 100;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex")
});

#[derive(Debug, Deserialize)]
pub(super) struct DigestRequest {
    pub school_email: String,
    pub school_name: String,
    pub grant_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub(super) struct DigestResponse {
    #[serde(flatten)]
    digest: Digest,
    /// Requested ids that matched no grant.
    missing_ids: Vec<Uuid>,
}

fn validate(req_id: &str, body: &DigestRequest) -> Result<(), ApiError> {
    if !EMAIL.is_match(body.school_email.trim()) {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            format!("'{}' is not a valid email address", body.school_email),
        ));
    }

    let name_len = body.school_name.trim().chars().count();
    if name_len == 0 || name_len > MAX_SCHOOL_NAME_CHARS {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            format!("school_name must be 1-{MAX_SCHOOL_NAME_CHARS} characters"),
        ));
    }

    if body.grant_ids.is_empty() || body.grant_ids.len() > MAX_GRANT_IDS {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            format!("grant_ids must contain 1-{MAX_GRANT_IDS} ids"),
        ));
    }

    Ok(())
}

/// POST /api/email renders a digest of the selected grants.
pub(super) async fn create_digest(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<DigestRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<DigestResponse>>, ApiError> {
    let rid = &req_id.0;
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected digest request body");
        ApiError::new(rid, "validation_error", rejection.body_text())
    })?;
    validate(rid, &body)?;

    let mut ids = body.grant_ids.clone();
    ids.sort_unstable();
    ids.dedup();

    let grants = granthub_db::list_grants_by_public_ids(&state.pool, &ids)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    if grants.is_empty() {
        return Err(ApiError::new(
            rid,
            "not_found",
            "none of the requested grants exist",
        ));
    }

    let missing_ids = ids
        .into_iter()
        .filter(|id| !grants.iter().any(|g| g.public_id == *id))
        .collect();

    let digest = render_digest(
        body.school_email.trim(),
        body.school_name.trim(),
        &grants,
        Utc::now().date_naive(),
    );
    tracing::info!(school = %body.school_name.trim(), grants = digest.grant_count, "digest rendered");

    Ok(Json(ApiResponse {
        data: DigestResponse {
            digest,
            missing_ids,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
