use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use silverline_core::ApprovalRecord;

use crate::middleware::RequestId;

use super::{map_sentiment_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ResultsQuery {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub subreddit: String,
}

pub(super) async fn get_results(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ResultsQuery>,
) -> Result<Json<ApiResponse<Vec<ApprovalRecord>>>, ApiError> {
    let records = state
        .analyzer
        .get_results(&query.keyword, &query.subreddit)
        .await
        .map_err(|e| map_sentiment_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(records, req_id.0)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use silverline_sentiment::fakes::{FakeFetcher, InMemoryStore};

    use crate::api::test_support::{get, post_json, send, test_app};

    #[tokio::test]
    async fn results_list_history_oldest_first() {
        let t = test_app(FakeFetcher::with_texts(&["good"]), InMemoryStore::new());
        for date in [3, 1] {
            send(
                &t.app,
                post_json(
                    "/api/v1/analyze/backfill",
                    &json!({"keyword": "rust", "date": date}),
                ),
            )
            .await;
        }
        send(&t.app, post_json("/api/v1/analyze", &json!({"keyword": "rust"}))).await;

        let (status, json) = send(&t.app, get("/api/v1/results?keyword=rust&subreddit=all")).await;

        assert_eq!(status, StatusCode::OK);
        let dates: Vec<&str> = json["data"]
            .as_array()
            .expect("data array")
            .iter()
            .map(|r| r["date"].as_str().expect("date"))
            .collect();
        assert_eq!(dates.len(), 3);
        assert!(dates.windows(2).all(|w| w[0] < w[1]), "{dates:?}");
    }

    #[tokio::test]
    async fn unknown_pair_returns_empty_list() {
        let t = test_app(FakeFetcher::with_texts(&[]), InMemoryStore::new());
        let (status, json) = send(&t.app, get("/api/v1/results?keyword=nobody")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"], json!([]));
    }

    #[tokio::test]
    async fn missing_keyword_is_bad_request() {
        let t = test_app(FakeFetcher::with_texts(&[]), InMemoryStore::new());
        let (status, _) = send(&t.app, get("/api/v1/results")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
