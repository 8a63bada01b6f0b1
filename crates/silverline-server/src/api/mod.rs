mod analyze;
mod results;
mod subscriptions;

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use silverline_sentiment::{Analyzer, SentimentError};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId};

const ALLOW_HEADERS: &str = "Authorization,Content-Type,X-Amz-Date,X-Amz-Security-Token,X-Api-Key";
const ALLOW_ORIGIN: &str = "*";
const ALLOW_METHODS: &str = "OPTIONS, POST, GET";

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "upstream_error" | "classification_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_sentiment_error(request_id: String, error: &SentimentError) -> ApiError {
    match error {
        SentimentError::Validation(message) => {
            ApiError::new(request_id, "validation_error", message.clone())
        }
        SentimentError::Fetch(_) => {
            tracing::warn!(error = %error, "upstream fetch failed");
            ApiError::new(request_id, "upstream_error", error.to_string())
        }
        SentimentError::Classification(_) => {
            tracing::warn!(error = %error, "sentiment classification failed");
            ApiError::new(request_id, "classification_error", error.to_string())
        }
        SentimentError::Persistence(_) => {
            tracing::error!(error = %error, "persistence failed");
            ApiError::new(request_id, "persistence_error", "persistence failed")
        }
    }
}

pub(super) fn map_json_rejection(request_id: String, rejection: &JsonRejection) -> ApiError {
    ApiError::new(request_id, "validation_error", rejection.body_text())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::OPTIONS, Method::POST, Method::GET])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-amz-date"),
            HeaderName::from_static("x-amz-security-token"),
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("x-request-id"),
        ])
}

fn fixed_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/analyze", post(analyze::analyze_today))
        .route("/api/v1/analyze/backfill", post(analyze::analyze_backfill_day))
        .route("/api/v1/results", get(results::get_results))
        .route("/api/v1/subscriptions", post(subscriptions::subscribe))
        .route("/api/v1/subscriptions/today", get(subscriptions::get_subscribed))
        .route("/api/v1/subscriptions/analyze", post(subscriptions::invoke_subscribed_analysis))
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api_router())
        .layer(
            ServiceBuilder::new()
                .layer(fixed_header(
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    ALLOW_HEADERS,
                ))
                .layer(fixed_header(header::ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ORIGIN))
                .layer(fixed_header(
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    ALLOW_METHODS,
                ))
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(request_id))
                .layer(build_cors()),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    match state.analyzer.store().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::new(
                HealthData {
                    status: "ok",
                    database: "ok",
                },
                req_id.0,
            )),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::new(
                    HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    req_id.0,
                )),
            )
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use silverline_sentiment::fakes::{FakeClassifier, FakeFetcher, InMemoryStore};
    use silverline_sentiment::{task_queue, AnalysisSettings, Analyzer, TaskReceiver};
    use tower::ServiceExt;

    use super::{build_app, AppState};

    pub(crate) struct TestApp {
        pub app: Router,
        pub store: Arc<InMemoryStore>,
        pub fetcher: Arc<FakeFetcher>,
        pub rx: TaskReceiver,
    }

    pub(crate) fn test_app(fetcher: FakeFetcher, store: InMemoryStore) -> TestApp {
        let fetcher = Arc::new(fetcher);
        let store = Arc::new(store);
        let (queue, rx) = task_queue();
        let analyzer = Analyzer::new(
            fetcher.clone(),
            Arc::new(FakeClassifier::new()),
            store.clone(),
            queue,
            AnalysisSettings::default(),
        );
        TestApp {
            app: build_app(AppState {
                analyzer: Arc::new(analyzer),
            }),
            store,
            fetcher,
            rx,
        }
    }

    pub(crate) fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    pub(crate) fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    pub(crate) async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(req).await.expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).expect("json parse")
        };
        (status, json)
    }
}
