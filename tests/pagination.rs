//! Pagination protocol tests against a mocked API.

use procore_api::{
    Companies, ListResource, PageFetch, ProcoreClient, ProcoreConfig, ProcoreError, Projects,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ProcoreClient {
    ProcoreClient::with_token("test-token", &server.uri()).unwrap()
}

#[tokio::test]
async fn test_list_concatenates_pages_and_stops_on_empty() {
    let mock_server = MockServer::start().await;

    let pages = [
        json!([{"id": 1, "name": "P1"}, {"id": 2, "name": "P2"}]),
        json!([{"id": 3, "name": "P3"}]),
        json!([]),
    ];
    for (index, body) in pages.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path("/rest/v1.1/projects"))
            .and(query_param("page", (index + 1).to_string()))
            .and(query_param("per_page", "100"))
            .and(query_param("company_id", "7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let client = client_for(&mock_server);
    let projects = Projects { company_id: 7 }.list(&client).await.unwrap();

    // Two non-empty pages plus the trailing empty request
    assert_eq!(projects.len(), 3);
    assert_eq!(projects[0]["id"], 1);
    assert_eq!(projects[2]["name"], "P3");

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_list_page_numbers_increase_from_one() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1.1/projects"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1.1/projects"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    Projects { company_id: 7 }.list(&client).await.unwrap();

    let pages: Vec<String> = mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == "page")
                .map(|(_, value)| value.into_owned())
                .unwrap()
        })
        .collect();
    assert_eq!(pages, vec!["1", "2"]);
}

#[tokio::test]
async fn test_soft_deleted_items_dropped_without_ending_loop() {
    let mock_server = MockServer::start().await;

    // A page of only-deleted items is non-empty, so the loop continues
    let pages = [
        json!([
            {"id": 1, "name": "a.pdf", "is_deleted": false},
            {"id": 2, "name": "b.pdf", "is_deleted": true},
        ]),
        json!([{"id": 3, "name": "c.pdf", "is_deleted": true}]),
        json!([]),
    ];
    for (index, body) in pages.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path("/rest/v1.0/projects/5/documents"))
            .and(query_param("page", (index + 1).to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let client = client_for(&mock_server);
    let files = procore_api::Files {
        company_id: 1,
        project_id: 5,
        folder_id: None,
    }
    .list(&client)
    .await
    .unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["id"], 1);
}

#[tokio::test]
async fn test_non_terminating_api_hits_page_cap() {
    let mock_server = MockServer::start().await;

    // Always non-empty: the loop must fail at the cap instead of spinning
    Mock::given(method("GET"))
        .and(path("/rest/v1.1/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = Projects { company_id: 7 }.list(&client).await.unwrap_err();
    assert!(
        matches!(err, ProcoreError::PaginationLimit { max_pages: 1000 }),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn test_concurrent_fetch_matches_sequential_result() {
    let mock_server = MockServer::start().await;

    let pages = [
        json!([{"id": 1}, {"id": 2}]),
        json!([{"id": 3}, {"id": 4}]),
        json!([{"id": 5}]),
    ];
    for (index, body) in pages.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path("/rest/v1.0/companies"))
            .and(query_param("page", (index + 1).to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&mock_server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/rest/v1.0/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let sequential = Companies.list(&client_for(&mock_server)).await.unwrap();

    let config = ProcoreConfig::new("", "", &mock_server.uri())
        .with_page_fetch(PageFetch::Concurrent { in_flight: 2 });
    let concurrent_client =
        ProcoreClient::with_token_and_config("test-token", &config).unwrap();
    let concurrent = Companies.list(&concurrent_client).await.unwrap();

    assert_eq!(sequential.len(), 5);
    assert_eq!(sequential, concurrent);
}
