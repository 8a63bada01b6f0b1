//! Integration tests for `HttpClassifier` against a local wiremock server.

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use silverline_core::SentimentLabel;
use silverline_sentiment::{HttpClassifier, SentimentClassifier, SentimentError};

fn test_classifier(server: &MockServer) -> HttpClassifier {
    HttpClassifier::new(&server.uri(), "en", 5).expect("failed to build test HttpClassifier")
}

fn score(positive: f64, negative: f64, neutral: f64, mixed: f64) -> serde_json::Value {
    json!({"Positive": positive, "Negative": negative, "Neutral": neutral, "Mixed": mixed})
}

#[tokio::test]
async fn parses_results_in_any_order_and_any_label_case() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/batch-detect-sentiment"))
        .and(body_json(json!({"TextList": ["love it", "hate it"], "LanguageCode": "en"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ResultList": [
                {"Index": 1, "Sentiment": "NEGATIVE", "SentimentScore": score(0.01, 0.97, 0.01, 0.01)},
                {"Index": 0, "Sentiment": "positive", "SentimentScore": score(0.93, 0.02, 0.04, 0.01)}
            ],
            "ErrorList": []
        })))
        .mount(&server)
        .await;

    let classifier = test_classifier(&server);
    let batch = vec!["love it".to_string(), "hate it".to_string()];
    let results = classifier.classify(&batch).await.expect("classify");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].index, 1);
    assert_eq!(results[0].label, SentimentLabel::Negative);
    assert!((results[0].confidence.negative - 0.97).abs() < f64::EPSILON);
    assert_eq!(results[1].index, 0);
    assert_eq!(results[1].label, SentimentLabel::Positive);
}

#[tokio::test]
async fn non_empty_error_list_fails_the_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/batch-detect-sentiment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ResultList": [],
            "ErrorList": [{"Index": 0, "ErrorCode": "TEXT_TOO_LONG", "ErrorMessage": "too long"}]
        })))
        .mount(&server)
        .await;

    let err = test_classifier(&server)
        .classify(&["x".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, SentimentError::Classification(_)));
    assert!(err.to_string().contains("TEXT_TOO_LONG"), "got {err}");
}

#[tokio::test]
async fn unknown_label_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/batch-detect-sentiment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ResultList": [{"Index": 0, "Sentiment": "ECSTATIC", "SentimentScore": score(1.0, 0.0, 0.0, 0.0)}]
        })))
        .mount(&server)
        .await;

    let err = test_classifier(&server)
        .classify(&["x".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, SentimentError::Classification(_)));
}

#[tokio::test]
async fn server_error_maps_to_classification_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/batch-detect-sentiment"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = test_classifier(&server)
        .classify(&["x".to_string()])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("500"), "got {err}");
}

#[tokio::test]
async fn oversized_batch_is_rejected_before_any_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let batch: Vec<String> = (0..26).map(|i| format!("t{i}")).collect();
    let err = test_classifier(&server).classify(&batch).await.unwrap_err();
    assert!(err.to_string().contains("26"), "got {err}");
}
