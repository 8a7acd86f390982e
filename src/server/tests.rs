//! HTTP Boundary Tests
//!
//! Drives the full router in-process with `tower::ServiceExt::oneshot`.

#[cfg(test)]
mod tests {
    use crate::definition::provider::RetryPolicy;
    use crate::definition::provider::scripted::{ScriptedProvider, lexical_payload};
    use crate::definition::service::DefinitionService;
    use crate::definition::store::MemoryStore;
    use crate::search::corpus::Corpus;
    use crate::search::types::Verse;
    use crate::server::router::build_router;
    use crate::server::state::AppState;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn corpus() -> Corpus {
        let verse = |book, chapter, verse, text: &str| Verse {
            book,
            chapter,
            verse,
            text: text.to_string(),
            comment: None,
        };
        Corpus::from_verses(vec![
            verse(1, 1, 1, "В начале сотворил Бог небо и землю."),
            verse(43, 3, 16, "Ибо так возлюбил Бог мир, что отдал Сына Своего."),
            verse(43, 3, 17, "Ибо не послал Бог Сына Своего в мир, чтобы судить мир."),
        ])
    }

    fn app_with(provider: Arc<ScriptedProvider>) -> Router {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(5),
            timeout: Duration::from_secs(2),
        };
        let definitions = Arc::new(DefinitionService::new(
            provider,
            Arc::new(MemoryStore::new()),
            16,
            policy,
        ));
        build_router(&AppState::new(Arc::new(corpus()), definitions))
    }

    fn app() -> Router {
        app_with(Arc::new(ScriptedProvider::always(lexical_payload("мир"))))
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_and_descriptor() {
        let (status, body) = send(app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].is_string());

        let (status, body) = send(app(), get("/api")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["endpoints"]["/api/word"].is_string());
        assert!(body["endpoints"]["/api/search"].is_string());
    }

    #[tokio::test]
    async fn test_search_reference_query() {
        let uri = "/api/search?q=%D0%B8%D0%BD%203%3A16"; // "ин 3:16"
        let (status, body) = send(app(), get(uri)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "reference");
        assert_eq!(body["total"], 1);
        assert_eq!(body["results"][0]["book"], 43);
        assert_eq!(body["results"][0]["verse"], 16);
    }

    #[tokio::test]
    async fn test_search_text_query_and_short_query() {
        let (status, body) = send(app(), get("/api/search?q=%D0%BC%D0%B8%D1%80")).await; // "мир"
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["type"], "text");
        assert_eq!(body["results"].as_array().unwrap().len(), 2);
        assert!(body["results"][0]["highlight"].as_str().unwrap().contains("<mark>мир</mark>"));

        let (status, body) = send(app(), get("/api/search?q=a")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], json!([]));
        assert!(body["message"].is_string());

        let (status, body) = send(app(), get("/api/search")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"], json!([]));
    }

    #[tokio::test]
    async fn test_chapter_and_frequency_routes() {
        let (status, body) = send(app(), get("/api/chapter/43/3")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, body) = send(app(), get("/api/chapter/43/4")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not Found");

        // "бог"
        let (status, body) = send(app(), get("/api/frequency?word=%D0%B1%D0%BE%D0%B3")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);

        let (status, _) = send(app(), get("/api/frequency?word=")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_word_lookup_round_trip() {
        let provider = Arc::new(ScriptedProvider::always(lexical_payload("мир")));
        let app = app_with(provider.clone());
        let body = r#"{"word":"Мир","verseRef":"Ин 3:16","verseContext":"так возлюбил Бог мир"}"#;

        let (status, first) = send(app.clone(), post_json("/api/word", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["word"], "мир");
        assert_eq!(first["verse_ref"], "Ин 3:16");
        assert_eq!(first["greek_hebrew"]["strongs_number"], "G3056");
        assert_eq!(first["ai_generated"], true);
        assert!(first.get("basic_meaning").is_none());

        let (status, second) = send(app.clone(), post_json("/api/word", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first, second);
        assert_eq!(provider.calls(), 1);

        let (_, stats) = send(app, get("/api/word/stats")).await;
        assert_eq!(stats["generations"], 1);
        assert_eq!(stats["memory_hits"], 1);
    }

    #[tokio::test]
    async fn test_word_lookup_missing_fields() {
        let bodies = [
            r#"{"word":"мир"}"#,
            r#"{"verseRef":"Ин 3:16"}"#,
            r#"{"word":"","verseRef":"Ин 3:16"}"#,
        ];
        for body in bodies {
            let (status, resp) = send(app(), post_json("/api/word", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(resp["message"], "Missing required fields: word, verseRef");
        }
    }

    #[tokio::test]
    async fn test_word_lookup_malformed_and_invalid_input() {
        let (status, resp) = send(app(), post_json("/api/word", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["error"], "Bad Request");

        let body = r#"{"word":"мир","verseRef":"Ин 3:16; db.drop()"}"#;
        let (status, resp) = send(app(), post_json("/api/word", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(resp["message"].is_string());
    }

    #[tokio::test]
    async fn test_word_lookup_upstream_failure_is_500_envelope() {
        let provider = Arc::new(ScriptedProvider::always("definitely not json"));
        let app = app_with(provider);
        let body = r#"{"word":"мир","verseRef":"Ин 3:16"}"#;

        let (status, resp) = send(app, post_json("/api/word", body)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp["error"], "Internal Server Error");
        assert_eq!(resp["message"], "Failed to generate definition");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_envelope() {
        let (status, body) = send(app(), get("/api/nothing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["message"], "No route for /api/nothing");
    }

    #[tokio::test]
    async fn test_cors_preflight_and_headers() {
        let preflight = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/word")
            .header(header::ORIGIN, "http://localhost:8080")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(preflight).await.unwrap();
        assert!(resp.status().is_success());
        assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

        let req = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://localhost:8080")
            .body(Body::empty())
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "application/json"
        );
    }
}
