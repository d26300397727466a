use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use stockctl::api::response::{extract_error_message, parse_token_pair};
use stockctl::guard::{GuardState, LogOnly, SessionGuard};
use stockctl::session::{
    MemoryTokenStore, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_PROFILE_KEY,
};
use stockctl::{ApiClient, RenewalClient, RenewalError, StockError};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, store: Arc<MemoryTokenStore>) -> ApiClient {
    ApiClient::new(
        format!("{}/api/", server.uri()),
        store,
        Duration::from_secs(5),
    )
    .unwrap()
}

fn profile_body() -> serde_json::Value {
    json!({
        "id": 3,
        "username": "ana",
        "nome": "Ana",
        "email": "ana@example.com",
        "funcao": "almoxarife",
        "role": "user",
        "estoques": [1, 4],
        "groups": [{"id": 2, "name": "Padrão"}]
    })
}

#[test]
fn test_parse_token_pair_requires_access() {
    let pair = parse_token_pair(&json!({"access": "a", "refresh": "r"})).unwrap();
    assert_eq!(pair.access, "a");
    assert_eq!(pair.refresh.as_deref(), Some("r"));

    let pair = parse_token_pair(&json!({"access": "a"})).unwrap();
    assert_eq!(pair.refresh, None);

    for body in [
        json!({}),
        json!({"access": ""}),
        json!({"access": 42}),
        json!({"refresh": "r"}),
    ] {
        assert!(matches!(
            parse_token_pair(&body),
            Err(RenewalError::MalformedResponse(_))
        ));
    }
}

#[test]
fn test_extract_error_message() {
    assert_eq!(
        extract_error_message(r#"{"detail": "Token is invalid or expired"}"#),
        "Token is invalid or expired"
    );
    assert_eq!(extract_error_message("  plain text \n"), "plain text");
}

#[test]
fn test_url_joining() {
    let store = Arc::new(MemoryTokenStore::new());
    let client = ApiClient::new("http://host/api", store.clone(), Duration::from_secs(1)).unwrap();
    assert_eq!(client.url("token/refresh/"), "http://host/api/token/refresh/");

    let client = ApiClient::new("http://host/api/", store, Duration::from_secs(1)).unwrap();
    assert_eq!(client.url("/profile/"), "http://host/api/profile/");
}

#[test]
fn test_empty_base_url_rejected() {
    let result = ApiClient::new(" ", Arc::new(MemoryTokenStore::new()), Duration::from_secs(1));
    assert!(matches!(result, Err(StockError::Config(_))));
}

#[tokio::test]
async fn test_refresh_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .and(body_json(json!({"refresh": "r1"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "a2", "refresh": "r2"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
    let pair = client.refresh("r1").await.unwrap();

    assert_eq!(pair.access, "a2");
    assert_eq!(pair.refresh.as_deref(), Some("r2"));
}

#[tokio::test]
async fn test_refresh_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Token is invalid or expired"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::new()));
    let result = client.refresh("stale").await;

    assert!(matches!(
        result,
        Err(RenewalError::RequestFailed { status: 401 })
    ));
}

#[tokio::test]
async fn test_refresh_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "nope"})))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::new()));

    assert!(matches!(
        client.refresh("r1").await,
        Err(RenewalError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_refresh_non_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server, Arc::new(MemoryTokenStore::new()));

    assert!(matches!(
        client.refresh("r1").await,
        Err(RenewalError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_refresh_network_error() {
    // Nothing listens on the discard port
    let client = ApiClient::new(
        "http://127.0.0.1:9/api/",
        Arc::new(MemoryTokenStore::new()),
        Duration::from_secs(2),
    )
    .unwrap();

    let result = client.refresh("r1").await;

    assert!(matches!(
        result,
        Err(RenewalError::Network(_)) | Err(RenewalError::TimedOut)
    ));
}

#[tokio::test]
async fn test_login_stores_tokens_and_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .and(body_json(json!({"username": "ana", "password": "secret"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/profile/"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_body()))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = client_for(&server, store.clone());

    let profile = client.login("ana", "secret").await.unwrap();

    assert_eq!(profile.display_name(), "Ana");
    assert_eq!(profile.estoques, vec![1, 4]);
    assert_eq!(store.access_token().as_deref(), Some("a1"));
    assert_eq!(store.refresh_token().as_deref(), Some("r1"));
    assert_eq!(store.user_profile(), Some(profile));
}

#[tokio::test]
async fn test_login_with_bad_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "No active account found"})),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = client_for(&server, store.clone());

    let result = client.login("ana", "wrong").await;

    assert!(matches!(result, Err(StockError::InvalidCredentials)));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_login_timeout_maps_to_timeout_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access": "a1", "refresh": "r1"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = ApiClient::new(
        format!("{}/api/", server.uri()),
        store.clone(),
        Duration::from_millis(200),
    )
    .unwrap();

    let result = client.login("ana", "secret").await;

    assert!(matches!(result, Err(StockError::Timeout)));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_login_discards_tokens_when_profile_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/profile/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let client = client_for(&server, store.clone());

    let result = client.login("ana", "secret").await;

    assert!(matches!(result, Err(StockError::Api { status: 500, .. })));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_unauthorized_response_drops_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/profile/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    store.set(ACCESS_TOKEN_KEY, "expired").unwrap();
    store.set(REFRESH_TOKEN_KEY, "r1").unwrap();
    let client = client_for(&server, store.clone());

    let result = client.fetch_profile().await;

    assert!(matches!(result, Err(StockError::Unauthorized)));
    assert_eq!(store.access_token(), None);
    assert_eq!(store.refresh_token().as_deref(), Some("r1"));
    assert_eq!(store.get(USER_PROFILE_KEY), None);
}

#[tokio::test]
async fn test_guard_renews_through_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .and(body_json(json!({"refresh": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "a2"})))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    store.set(ACCESS_TOKEN_KEY, "a1").unwrap();
    store.set(REFRESH_TOKEN_KEY, "r1").unwrap();
    let client = client_for(&server, store.clone());

    let guard = SessionGuard::builder()
        .store(store.clone())
        .renewal(Arc::new(client))
        .presenter(Arc::new(LogOnly))
        .build()
        .unwrap();

    assert_eq!(guard.renew_session().await, GuardState::Active);
    assert_eq!(store.access_token().as_deref(), Some("a2"));
    assert_eq!(store.refresh_token().as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_guard_logs_out_when_backend_rejects_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    store.set(ACCESS_TOKEN_KEY, "a1").unwrap();
    store.set(REFRESH_TOKEN_KEY, "r1").unwrap();
    store.set(USER_PROFILE_KEY, "{}").unwrap();
    let client = client_for(&server, store.clone());

    let guard = SessionGuard::builder()
        .store(store.clone())
        .renewal(Arc::new(client))
        .build()
        .unwrap();

    assert_eq!(guard.renew_session().await, GuardState::Expired);
    assert!(store.is_empty());
}
