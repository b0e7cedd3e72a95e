//! Viewer (`/me`) endpoints.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use polleneer_common::AppResult;
use polleneer_db::entities::ledger_entry;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

const fn default_limit() -> u64 {
    20
}

/// Ledger history query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoneyQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

/// Ledger entry response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryResponse {
    pub id: String,
    pub delta: i64,
    pub reason: ledger_entry::LedgerReason,
    pub created_at: String,
}

impl From<ledger_entry::Model> for LedgerEntryResponse {
    fn from(e: ledger_entry::Model) -> Self {
        Self {
            id: e.id,
            delta: e.delta,
            reason: e.reason,
            created_at: e.created_at.to_rfc3339(),
        }
    }
}

/// Honey balance response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoneyResponse {
    pub honey_points: i64,
    pub entries: Vec<LedgerEntryResponse>,
}

/// Get the viewer's honey balance and recent ledger entries.
async fn honey(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<HoneyQuery>,
) -> AppResult<ApiResponse<HoneyResponse>> {
    let limit = query.limit.min(100);
    let (honey_points, entries) = state
        .ledger_service
        .overview(&user.id, limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(HoneyResponse {
        honey_points,
        entries: entries.into_iter().map(Into::into).collect(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/honey", get(honey))
}
