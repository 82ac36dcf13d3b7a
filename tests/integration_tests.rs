//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: client → HTTP requests → pages and items

use async_trait::async_trait;
use canvas_api::http::{HttpRequest, Response, Transport, TransportError};
use canvas_api::{
    BackoffType, Client, ClientOptions, Error, JsonValue, Method, QueryParams, RequestOptions,
};
use futures::TryStreamExt;
use pretty_assertions::assert_eq;
use reqwest::header::HeaderMap;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "secret-token-123";

fn quick_client(base_url: &str) -> Client {
    let options = ClientOptions::builder().no_retries().build();
    Client::with_options(base_url, TOKEN, options).unwrap()
}

/// Mount `pages` at `/page/1`, `/page/2`, ... each linking to the next
async fn mount_pages(server: &MockServer, pages: &[JsonValue]) {
    for (i, body) in pages.iter().enumerate() {
        let n = i + 1;
        let mut template = ResponseTemplate::new(200).set_body_json(body.clone());
        if n < pages.len() {
            let link = format!(
                r#"<{0}/page/1>; rel="first", <{0}/page/{1}>; rel="next", <{0}/page/{2}>; rel="last""#,
                server.uri(),
                n + 1,
                pages.len()
            );
            template = template.insert_header("Link", link.as_str());
        }
        Mock::given(method("GET"))
            .and(path(format!("/page/{n}")))
            .respond_with(template)
            .mount(server)
            .await;
    }
}

// ============================================================================
// Pagination Flows
// ============================================================================

#[tokio::test]
async fn test_three_page_walk() {
    let mock_server = MockServer::start().await;
    mount_pages(
        &mock_server,
        &[json!([{"id": 1}, {"id": 2}]), json!([{"id": 3}]), json!([{"id": 4}])],
    )
    .await;

    let client = quick_client(&mock_server.uri());

    let ids: Vec<i64> = client
        .list_items("page/1", &QueryParams::new())
        .to_array()
        .await
        .unwrap()
        .iter()
        .filter_map(|c| c["id"].as_i64())
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    let pages = client
        .list_pages("page/1", &QueryParams::new())
        .to_array()
        .await
        .unwrap();
    assert_eq!(pages.len(), 3);
    assert!(pages[2].link_header().is_none());
}

#[tokio::test]
async fn test_take_array_crosses_page_boundaries() {
    let mock_server = MockServer::start().await;
    mount_pages(&mock_server, &[json!([1, 2]), json!([3, 4]), json!([5])]).await;

    let client = quick_client(&mock_server.uri());
    let mut items = client.list_items("/page/1", &QueryParams::new());

    assert_eq!(items.take_array(3).await.unwrap(), vec![json!(1), json!(2), json!(3)]);
    assert_eq!(items.yielded(), 3);
    assert_eq!(items.to_array().await.unwrap(), vec![json!(4), json!(5)]);
}

#[tokio::test]
async fn test_error_mid_walk_stops_iteration() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/courses"))
        .and(query_param("per_page", "2"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Link",
                    format!(r#"<{}/courses?page=2&per_page=2>; rel="next""#, mock_server.uri())
                        .as_str(),
                )
                .set_body_json(json!([1, 2])),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/courses"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"errors": [{"message": "forbidden"}]})),
        )
        .mount(&mock_server)
        .await;

    let client = quick_client(&mock_server.uri());
    let mut items = client.list_items("courses", &QueryParams::new().param("per_page", 2));

    assert_eq!(items.try_next().await.unwrap(), Some(json!(1)));
    assert_eq!(items.try_next().await.unwrap(), Some(json!(2)));

    let err = items.try_next().await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    let api_error = err.api_error().unwrap();
    assert_eq!(api_error.body["errors"][0]["message"], "forbidden");
    assert!(api_error.request.url.ends_with("/courses?page=2&per_page=2"));
    assert_eq!(api_error.request.headers["authorization"], "[HIDDEN]");

    assert_eq!(items.try_next().await.unwrap(), None);
}

// ============================================================================
// Transport Behavior
// ============================================================================

#[tokio::test]
async fn test_timeout_is_surfaced_without_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = quick_client(&mock_server.uri());
    let err = client
        .get_with_options(
            "slow",
            &QueryParams::new(),
            RequestOptions::new().timeout(Duration::from_millis(50)),
        )
        .await
        .unwrap_err();

    let api_error = err.api_error().unwrap();
    assert_eq!(api_error.status, None);
    assert!(api_error.status_text.contains("timeout"));
    assert!(err.to_string().starts_with("Request to "));
}

#[tokio::test]
async fn test_get_is_retried_on_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = ClientOptions::builder()
        .max_retries(2)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(10),
            Duration::from_millis(10),
        )
        .build();
    let client = Client::with_options(mock_server.uri(), TOKEN, options).unwrap();

    let response = client.get("flaky", &QueryParams::new()).await.unwrap();
    assert_eq!(response.body["ok"], true);
}

#[tokio::test]
async fn test_default_headers_and_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/self"))
        .and(header("X-Tenant", "north"))
        .and(header("User-Agent", "canvas-sync/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 9})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = ClientOptions::builder()
        .no_retries()
        .header("X-Tenant", "north")
        .user_agent("canvas-sync/1.0")
        .build();
    let client = Client::with_options(mock_server.uri(), TOKEN, options).unwrap();

    let response = client.get("users/self", &QueryParams::new()).await.unwrap();
    assert_eq!(response.body["id"], 9);
}

// ============================================================================
// Custom Transport
// ============================================================================

/// Records requests and answers every one with the same body
#[derive(Default)]
struct RecordingTransport {
    seen: Mutex<Vec<(Method, String)>>,
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: &HttpRequest) -> Result<Response, TransportError> {
        self.seen
            .lock()
            .unwrap()
            .push((request.method, request.url.to_string()));
        Ok(Response {
            status: 200,
            headers: HeaderMap::new(),
            body: json!({"echo": request.url.path()}),
        })
    }
}

#[tokio::test]
async fn test_custom_transport() {
    let transport = Arc::new(RecordingTransport::default());
    let client = Client::with_transport(
        "https://canvas.test/api/v1/",
        TOKEN,
        ClientOptions::default(),
        transport.clone(),
    )
    .unwrap();

    let response = client
        .request("/courses/1", Method::PUT, json!({"course": {"name": "Rust"}}))
        .await
        .unwrap();
    assert_eq!(response.body["echo"], "/api/v1/courses/1");

    let seen = transport.seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![(Method::PUT, "https://canvas.test/api/v1/courses/1".to_string())]
    );
}

#[tokio::test]
async fn test_custom_transport_failure_is_redacted() {
    struct Failing;

    #[async_trait]
    impl Transport for Failing {
        async fn send(&self, _request: &HttpRequest) -> Result<Response, TransportError> {
            Err(TransportError::network(format!("proxy rejected Bearer {TOKEN}")))
        }
    }

    let client = Client::with_transport(
        "https://canvas.test/api/v1",
        TOKEN,
        ClientOptions::default(),
        Arc::new(Failing),
    )
    .unwrap();

    let err = client.get("courses", &QueryParams::new()).await.unwrap_err();
    assert!(matches!(err, Error::Api(_)));

    let text = format!("{err} {err:?} {}", serde_json::to_string(err.api_error().unwrap()).unwrap());
    assert!(!text.contains(TOKEN));
    assert!(text.contains("proxy rejected Bearer [HIDDEN]"));
}
