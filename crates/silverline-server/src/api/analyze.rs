use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use silverline_core::ApprovalRecord;

use crate::middleware::RequestId;

use super::{map_json_rejection, map_sentiment_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct AnalyzeRequest {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub subreddit: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct BackfillRequest {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub subreddit: String,
    /// Days before today, `1..=8`.
    #[serde(default)]
    pub date: u32,
}

pub(super) async fn analyze_today(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ApprovalRecord>>, ApiError> {
    let Json(body) = body.map_err(|e| map_json_rejection(req_id.0.clone(), &e))?;

    let outcome = state
        .analyzer
        .analyze_today(&body.keyword, &body.subreddit, Utc::now())
        .await
        .map_err(|e| map_sentiment_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(outcome.into_record(), req_id.0)))
}

pub(super) async fn analyze_backfill_day(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<BackfillRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ApprovalRecord>>, ApiError> {
    let Json(body) = body.map_err(|e| map_json_rejection(req_id.0.clone(), &e))?;

    let record = state
        .analyzer
        .analyze_backfill_day(&body.keyword, &body.subreddit, body.date, Utc::now())
        .await
        .map_err(|e| map_sentiment_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(record, req_id.0)))
}
