use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use silverline_core::ApprovalRecord;

use crate::middleware::RequestId;

use super::{map_json_rejection, map_sentiment_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct SubscribeRequest {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub subreddit: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SubscribeData {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct InvokeData {
    pub enqueued: usize,
}

pub(super) async fn subscribe(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<SubscribeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SubscribeData>>, ApiError> {
    let Json(body) = body.map_err(|e| map_json_rejection(req_id.0.clone(), &e))?;

    let outcome = state
        .analyzer
        .subscribe(&body.keyword, &body.subreddit)
        .await
        .map_err(|e| map_sentiment_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(
        SubscribeData {
            message: outcome.message(),
        },
        req_id.0,
    )))
}

pub(super) async fn get_subscribed(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<ApprovalRecord>>>, ApiError> {
    let records = state
        .analyzer
        .get_subscribed(Utc::now())
        .await
        .map_err(|e| map_sentiment_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(records, req_id.0)))
}

pub(super) async fn invoke_subscribed_analysis(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<(StatusCode, Json<ApiResponse<InvokeData>>), ApiError> {
    let enqueued = state
        .analyzer
        .invoke_subscribed_analysis()
        .await
        .map_err(|e| map_sentiment_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::new(InvokeData { enqueued }, req_id.0)),
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use silverline_sentiment::fakes::{FakeFetcher, InMemoryStore};
    use silverline_sentiment::AnalysisTask;

    use crate::api::test_support::{get, post_json, send, test_app};

    #[tokio::test]
    async fn subscribe_messages_follow_outcome() {
        let t = test_app(FakeFetcher::with_texts(&[]), InMemoryStore::new());
        let mut messages = Vec::new();
        for subreddit in ["programming", "learnrust", "programming"] {
            let (status, json) = send(
                &t.app,
                post_json(
                    "/api/v1/subscriptions",
                    &json!({"keyword": "rust", "subreddit": subreddit}),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            messages.push(json["data"]["message"].as_str().expect("message").to_string());
        }
        assert_eq!(
            messages,
            vec![
                "Added New Entry to Database",
                "Subreddit has been added to the subscribed list",
                "Subreddit is already subscribed to",
            ]
        );
    }

    #[tokio::test]
    async fn subscribed_today_skips_pairs_without_records() {
        let t = test_app(FakeFetcher::with_texts(&["good"]), InMemoryStore::new());
        for keyword in ["rust", "go"] {
            send(
                &t.app,
                post_json("/api/v1/subscriptions", &json!({"keyword": keyword})),
            )
            .await;
        }
        send(&t.app, post_json("/api/v1/analyze", &json!({"keyword": "go"}))).await;

        let (status, json) = send(&t.app, get("/api/v1/subscriptions/today")).await;
        assert_eq!(status, StatusCode::OK);
        let records = json["data"].as_array().expect("data array");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["keyword"], "go");
    }

    #[tokio::test]
    async fn invoke_enqueues_and_returns_accepted() {
        let mut t = test_app(FakeFetcher::with_texts(&[]), InMemoryStore::new());
        send(
            &t.app,
            post_json(
                "/api/v1/subscriptions",
                &json!({"keyword": "rust", "subreddit": "programming"}),
            ),
        )
        .await;

        let (status, json) = send(
            &t.app,
            post_json("/api/v1/subscriptions/analyze", &json!({})),
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(json["data"]["enqueued"], 1);
        assert_eq!(
            t.rx.try_recv(),
            Some(AnalysisTask::Today {
                keyword: "rust".to_string(),
                subreddit: "programming".to_string(),
            })
        );
        assert!(t.fetcher.calls().is_empty());
    }
}
