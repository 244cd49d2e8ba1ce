//! Token exchange and retry-policy flows against a mocked API.

use procore_api::{
    Companies, FindResource, ProcoreClient, ProcoreConfig, ProcoreError, RetryPolicy, Scope,
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_connect_acquires_token_and_find_round_trips() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "T"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1.0/companies"))
        .and(header("Authorization", "Bearer T"))
        .and(query_param("page", "1"))
        .and(query_param("include_free_companies", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 8089, "name": "Acme"},
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1.0/companies"))
        .and(header("Authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let config = ProcoreConfig::new("id", "secret", &mock_server.uri());
    let client = ProcoreClient::connect(config).await.unwrap();

    let by_id = Companies.find(&client, 8089u64).await.unwrap();
    let by_name = Companies.find(&client, "Acme").await.unwrap();
    assert_eq!(by_id, by_name);
    assert_eq!(by_id["name"], "Acme");
}

#[tokio::test]
async fn test_expired_token_refreshes_and_retries_once_when_enabled() {
    let mock_server = MockServer::start().await;

    // First exchange hands out T1, the refresh hands out T2
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "T1"})))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "T2"})))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1.0/ping"))
        .and(header("Authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(498).set_body_string("token expired"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1.0/ping"))
        .and(header("Authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ProcoreConfig::new("id", "secret", &mock_server.uri()).with_retry(
        RetryPolicy {
            max_transient_retries: 0,
            refresh_on_expired: true,
        },
    );
    let client = ProcoreClient::connect(config).await.unwrap();

    let value = client.get("/rest/v1.0/ping", Scope::default()).await.unwrap();
    assert_eq!(value["ok"], true);
}

#[tokio::test]
async fn test_expired_token_is_terminal_by_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "T"})))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1.0/ping"))
        .respond_with(ResponseTemplate::new(498).set_body_string("token expired"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ProcoreConfig::new("id", "secret", &mock_server.uri());
    let client = ProcoreClient::connect(config).await.unwrap();

    let err = client
        .get("/rest/v1.0/ping", Scope::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ProcoreError::ExpiredToken { .. }));
}

#[tokio::test]
async fn test_token_only_client_cannot_refresh() {
    let client = ProcoreClient::with_token("T", "https://sandbox.procore.com").unwrap();
    let err = client.reset_access_token().await.unwrap_err();
    assert!(matches!(err, ProcoreError::ConfigMissing(_)));
}

#[tokio::test]
async fn test_transient_retries_exhaust_to_http_error() {
    // A dropped mock server leaves nothing listening on its port; a bare
    // (non-pooled) server is required, since pooled servers keep their
    // listener open after drop.
    let uri = {
        let mock_server = MockServer::builder().start().await;
        mock_server.uri()
    };

    let config = ProcoreConfig::new("", "", &uri).with_retry(RetryPolicy {
        max_transient_retries: 2,
        refresh_on_expired: false,
    });
    let client = ProcoreClient::with_token_and_config("T", &config).unwrap();

    let err = client
        .get("/rest/v1.0/ping", Scope::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ProcoreError::Http(_)));
}
