use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    Router,
};
use chrono::{Datelike, Local};
use oneul_core::PublisherConfig;
use oneul_translation::BulkPacing;
use oneul_server::{api::app_router, build_state, config::Config};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use serde_json::json;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KOREAN_DAY: &str = r#"<html><body>
<section data-mw-section-id="1"><h2 id="사건">사건</h2>
<ul id="mwAQ"><li id="mwAg">1987년 6월 민주화운동이 일어났다</li></ul></section>
</body></html>"#;

const ENGLISH_DAY: &str = r#"{"date": "November 2", "url": "https://wikipedia.org/wiki/November_2",
    "data": {"Events": [{"year": "1950", "text": "The Korean War continues", "html": "", "links": []}],
             "Births": [], "Deaths": []}}"#;

struct TestApp {
    router: Router,
    _db_dir: TempDir,
}

async fn build_app(upstream: &MockServer, cron_secret: Option<&str>) -> TestApp {
    let db_dir = tempfile::tempdir().unwrap();
    let mut config = Config::from_env();
    config.db_path = db_dir.path().join("test.db").to_string_lossy().to_string();
    config.cron_secret = cron_secret.map(str::to_string);
    config.sources.wiki_base_url = upstream.uri();
    config.sources.secondary_url = format!("{}/date", upstream.uri());
    config.sources.relay_templates = vec![];
    config.translation.primary_url = format!("{}/translate/get", upstream.uri());
    config.translation.secondary_url = format!("{}/translate/post", upstream.uri());
    config.publisher = PublisherConfig {
        endpoint: format!("{}/publish", upstream.uri()),
        api_key: None,
        access_token: None,
    };

    let state = build_state(&config).await.unwrap();
    TestApp {
        router: app_router(state, &config),
        _db_dir: db_dir,
    }
}

async fn serve_wiki(upstream: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path_regex("^/api/rest_v1/page/html/"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(upstream)
        .await;
}

async fn fail_secondary(upstream: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex("^/date/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(upstream)
        .await;
}

async fn serve_english_secondary(upstream: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex("^/date/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ENGLISH_DAY))
        .mount(upstream)
        .await;
}

async fn send(app: &TestApp, request: Request<Body>) -> (u16, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn today_label() -> String {
    let today = Local::now().date_naive();
    format!("{}월 {}일", today.month(), today.day())
}

#[tokio::test]
async fn today_returns_extracted_primary_data() {
    let upstream = MockServer::start().await;
    serve_wiki(&upstream, 200, KOREAN_DAY).await;
    let app = build_app(&upstream, None).await;

    let (status, body) = send(&app, get("/api/v1/history/today")).await;

    assert_eq!(status, 200);
    assert_eq!(body["date"], today_label());
    assert_eq!(body["data"]["Events"][0]["year"], "1987");
    assert_eq!(body["data"]["Events"][0]["text"], "민주화운동이 일어났다");
    assert_eq!(body["data"]["Events"][0]["links"], serde_json::json!([]));
}

#[tokio::test]
async fn translated_korean_day_is_unchanged() {
    let upstream = MockServer::start().await;
    serve_wiki(&upstream, 200, KOREAN_DAY).await;
    Mock::given(path_regex("^/translate/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;
    let app = build_app(&upstream, None).await;

    let (status, body) = send(&app, get("/api/v1/history/today?translate=true")).await;

    assert_eq!(status, 200);
    assert_eq!(body["data"]["Events"][0]["text"], "민주화운동이 일어났다");
}

#[tokio::test]
async fn exhausted_sources_return_503() {
    let upstream = MockServer::start().await;
    serve_wiki(&upstream, 500, "").await;
    fail_secondary(&upstream).await;
    let app = build_app(&upstream, None).await;

    let (status, body) = send(&app, get("/api/v1/history/today")).await;

    assert_eq!(status, 503);
    assert_eq!(body["code"], 503);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("데이터를 가져올 수 없습니다"));
}

#[tokio::test]
async fn social_post_requires_cron_secret() {
    let upstream = MockServer::start().await;
    serve_wiki(&upstream, 200, KOREAN_DAY).await;
    let app = build_app(&upstream, Some("s3cret")).await;

    let (status, _) = send(&app, get("/api/v1/social/post")).await;
    assert_eq!(status, 401);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/social/post")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, 401);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/social/post")
        .header(header::AUTHORIZATION, "Bearer s3cret")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, 200);
    // No publisher credentials: content is formatted but not posted.
    assert_eq!(body["success"], false);
    let content = body["content"].as_str().unwrap();
    assert!(content.starts_with(&format!("📅 {}의 역사", today_label())));
    assert!(content.contains("1. 1987년: 민주화운동이 일어났다..."));
}

#[tokio::test]
async fn social_post_reports_fetch_exhaustion() {
    let upstream = MockServer::start().await;
    serve_wiki(&upstream, 500, "").await;
    fail_secondary(&upstream).await;
    let app = build_app(&upstream, None).await;

    let (status, body) = send(&app, get("/api/v1/social/post")).await;

    assert_eq!(status, 500);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn refresher_loads_once_per_day() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex("^/api/rest_v1/page/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(KOREAN_DAY))
        .expect(1)
        .mount(&upstream)
        .await;

    let db_dir = tempfile::tempdir().unwrap();
    let mut config = Config::from_env();
    config.db_path = db_dir.path().join("test.db").to_string_lossy().to_string();
    config.sources.wiki_base_url = upstream.uri();
    config.sources.relay_templates = vec![];
    let state = build_state(&config).await.unwrap();

    oneul_server::scheduler::run_refresh(&state).await;
    assert_eq!(state.loaded_on(), Some(Local::now().date_naive()));

    oneul_server::scheduler::run_refresh(&state).await;
}

#[tokio::test]
async fn translated_request_keeps_original_text_on_cache_miss() {
    let upstream = MockServer::start().await;
    serve_wiki(&upstream, 500, "").await;
    serve_english_secondary(&upstream).await;
    Mock::given(path_regex("^/translate/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(0)
        .mount(&upstream)
        .await;
    let app = build_app(&upstream, None).await;

    let (status, body) = send(&app, get("/api/v1/history/today?translate=true")).await;

    assert_eq!(status, 200);
    assert_eq!(body["date"], "11월 2일");
    assert_eq!(body["data"]["Events"][0]["text"], "The Korean War continues");
}

#[tokio::test]
async fn refresher_warms_translations_served_to_requests() {
    let upstream = MockServer::start().await;
    serve_wiki(&upstream, 500, "").await;
    serve_english_secondary(&upstream).await;
    Mock::given(method("GET"))
        .and(path_regex("^/translate/get"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"responseData": {"translatedText": "한국 전쟁이 계속되다"}})),
        )
        .expect(1)
        .mount(&upstream)
        .await;

    let db_dir = tempfile::tempdir().unwrap();
    let mut config = Config::from_env();
    config.db_path = db_dir.path().join("test.db").to_string_lossy().to_string();
    config.sources.wiki_base_url = upstream.uri();
    config.sources.secondary_url = format!("{}/date", upstream.uri());
    config.sources.relay_templates = vec![];
    config.translation.primary_url = format!("{}/translate/get", upstream.uri());
    config.translation.secondary_url = format!("{}/translate/post", upstream.uri());
    config.translation.bulk = BulkPacing::immediate();
    let state = build_state(&config).await.unwrap();
    let router = app_router(state.clone(), &config);

    oneul_server::scheduler::run_refresh(&state).await;
    assert_eq!(state.loaded_on(), Some(Local::now().date_naive()));

    let app = TestApp {
        router,
        _db_dir: db_dir,
    };
    let (status, body) = send(&app, get("/api/v1/history/today?translate=true")).await;

    assert_eq!(status, 200);
    assert_eq!(body["data"]["Events"][0]["text"], "한국 전쟁이 계속되다");
}
