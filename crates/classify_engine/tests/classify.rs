use std::time::Duration;

use bytes::Bytes;
use classify_engine::{
    Classifier, ClassifierSettings, EngineEvent, FailureKind, ImageUpload, ReqwestClassifier,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn upload() -> ImageUpload {
    ImageUpload {
        file_name: "apple.png".to_string(),
        mime_type: "image/png".to_string(),
        bytes: Bytes::from_static(b"fake-image-bytes"),
    }
}

fn classifier_for(server: &MockServer) -> ReqwestClassifier {
    ReqwestClassifier::new(ClassifierSettings {
        endpoint: server.uri(),
        ..ClassifierSettings::default()
    })
}

#[tokio::test]
async fn classify_posts_multipart_and_parses_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"image\""))
        .and(body_string_contains("filename=\"apple.png\""))
        .and(body_string_contains("fake-image-bytes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "prediction": "apple",
            "confidence": 92.3,
            "image": "data:image/png;base64,AAAA",
            "all_predictions": [
                {"class": "apple", "confidence": 92.3},
                {"class": "pear", "confidence": 5.1}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let classification = classifier_for(&server)
        .classify(&upload())
        .await
        .expect("classify ok");

    assert_eq!(classification.prediction, "apple");
    assert_eq!(classification.confidence, 92.3);
    assert_eq!(classification.ranked.len(), 2);
    assert_eq!(classification.ranked[0].label, "apple");
    assert_eq!(classification.ranked[1].label, "pear");
    assert_eq!(
        classification.processed_image.as_deref(),
        Some("data:image/png;base64,AAAA")
    );
}

#[tokio::test]
async fn classify_fails_on_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = classifier_for(&server).classify(&upload()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn classify_reports_server_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": false, "error": "bad image"})),
        )
        .mount(&server)
        .await;

    let err = classifier_for(&server).classify(&upload()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Rejected);
    assert!(err.to_string().contains("bad image"));
}

#[tokio::test]
async fn classify_times_out_on_slow_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"success": true, "prediction": "apple", "confidence": 1.0})),
        )
        .mount(&server)
        .await;

    let classifier = ReqwestClassifier::new(ClassifierSettings {
        endpoint: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..ClassifierSettings::default()
    });

    let err = classifier.classify(&upload()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn classify_rejects_oversized_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_string("0123456789012345"))
        .mount(&server)
        .await;

    let classifier = ReqwestClassifier::new(ClassifierSettings {
        endpoint: server.uri(),
        max_response_bytes: 10,
        ..ClassifierSettings::default()
    });

    let err = classifier.classify(&upload()).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: 16
        }
    );
    assert!(err.to_string().contains("16 bytes exceeds the 10 byte limit"));
}

#[tokio::test]
async fn oversized_error_response_keeps_its_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(502).set_body_string("x".repeat(4096)))
        .mount(&server)
        .await;

    let classifier = ReqwestClassifier::new(ClassifierSettings {
        endpoint: server.uri(),
        max_response_bytes: 10,
        ..ClassifierSettings::default()
    });

    let err = classifier.classify(&upload()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(502));
    assert_eq!(err.message, "Bad Gateway");
}

#[tokio::test]
async fn classify_reports_unreachable_server_as_network_error() {
    // Bind and release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let endpoint = format!("http://{}", listener.local_addr().expect("addr"));
    drop(listener);

    let classifier = ReqwestClassifier::new(ClassifierSettings {
        endpoint,
        connect_timeout: Duration::from_secs(2),
        ..ClassifierSettings::default()
    });

    let err = classifier.classify(&upload()).await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::Network | FailureKind::Timeout));
}

#[tokio::test]
async fn health_and_categories_use_get_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "healthy", "model_loaded": true})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"categories": ["apple", "banana"]})),
        )
        .mount(&server)
        .await;

    let classifier = classifier_for(&server);
    let health = classifier.health().await.expect("health ok");
    assert!(health.model_loaded);
    assert_eq!(health.status, "healthy");

    let categories = classifier.categories().await.expect("categories ok");
    assert_eq!(categories, vec!["apple".to_string(), "banana".to_string()]);
}

#[tokio::test(flavor = "multi_thread")]
async fn engine_handle_tags_completions_with_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "prediction": "pear",
            "confidence": 80.0,
            "all_predictions": [{"class": "pear", "confidence": 80.0}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let engine = classify_engine::EngineHandle::new(ClassifierSettings {
        endpoint: server.uri(),
        ..ClassifierSettings::default()
    })
    .expect("engine");
    engine.classify(42, upload()).expect("engine running");

    let mut event = None;
    for _ in 0..100 {
        if let Some(received) = engine.try_recv() {
            event = Some(received);
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    match event.expect("engine event") {
        EngineEvent::Classified { request_id, result } => {
            assert_eq!(request_id, 42);
            assert_eq!(result.expect("classified").prediction, "pear");
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn classify_after_shutdown_is_refused() {
    let mut engine =
        classify_engine::EngineHandle::new(ClassifierSettings::default()).expect("engine");
    engine.shutdown();

    let err = engine.classify(7, upload()).unwrap_err();
    assert_eq!(err.kind, FailureKind::Network);
    assert!(engine.try_recv().is_none());
}
