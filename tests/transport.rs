//! Transport encoding tests: JSON vs multipart dispatch, headers, delete.

use procore_api::{FilePart, FileUpdate, ProcoreClient, Scope};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ProcoreClient {
    ProcoreClient::with_token("test-token", &server.uri()).unwrap()
}

fn sample_part() -> FilePart {
    FilePart {
        field: "file[data]".to_string(),
        file_name: "notes.txt".to_string(),
        bytes: b"hello procore".to_vec(),
    }
}

async fn last_request(server: &MockServer) -> wiremock::Request {
    server
        .received_requests()
        .await
        .unwrap()
        .pop()
        .expect("no request received")
}

fn content_type(request: &wiremock::Request) -> String {
    request
        .headers
        .get("content-type")
        .expect("no content-type")
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_post_without_files_is_json() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1.0/folders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let body = json!({"folder": {"name": "Drawings"}});
    client
        .post("/rest/v1.0/folders", Scope::company(1), &[], Some(&body), None)
        .await
        .unwrap();

    let request = last_request(&mock_server).await;
    assert_eq!(content_type(&request), "application/json");
    let sent: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(sent, body);
}

#[tokio::test]
async fn test_post_with_files_is_multipart() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1.0/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let fields = json!({"file[name]": "notes.txt", "file[description]": "None"});
    let files = [sample_part()];
    client
        .post(
            "/rest/v1.0/files",
            Scope::company(1),
            &[("project_id".to_string(), "5".to_string())],
            Some(&fields),
            Some(&files),
        )
        .await
        .unwrap();

    let request = last_request(&mock_server).await;
    assert!(content_type(&request).starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"file[name]\""));
    assert!(body.contains("name=\"file[data]\""));
    assert!(body.contains("filename=\"notes.txt\""));
    assert!(body.contains("hello procore"));
    assert_eq!(request.url.query(), Some("project_id=5"));
}

#[tokio::test]
async fn test_patch_dispatch_is_three_way() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    // No files involved: JSON body
    client
        .patch(
            "/rest/v1.0/folders/3",
            Scope::company(1),
            &[],
            Some(&json!({"folder": {"name": "Submittals"}})),
            &FileUpdate::NoFiles,
        )
        .await
        .unwrap();
    let request = last_request(&mock_server).await;
    assert_eq!(content_type(&request), "application/json");

    // Metadata-only patch of a file-bearing resource: multipart, no part
    client
        .patch(
            "/rest/v1.0/files/3",
            Scope::company(1),
            &[],
            Some(&json!({"file[name]": "renamed.txt"})),
            &FileUpdate::KeepExisting,
        )
        .await
        .unwrap();
    let request = last_request(&mock_server).await;
    assert!(content_type(&request).starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&request.body).into_owned();
    assert!(body.contains("name=\"file[name]\""));
    assert!(!body.contains("filename="));

    // Replacement: multipart with the new file part
    client
        .patch(
            "/rest/v1.0/files/3",
            Scope::company(1),
            &[],
            Some(&json!({"file[name]": "replaced.txt"})),
            &FileUpdate::Replace(vec![sample_part()]),
        )
        .await
        .unwrap();
    let request = last_request(&mock_server).await;
    let body = String::from_utf8_lossy(&request.body).into_owned();
    assert!(body.contains("filename=\"notes.txt\""));
    assert!(body.contains("hello procore"));
}

#[tokio::test]
async fn test_auth_and_company_headers_attached() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1.0/ping"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header("Procore-Company-Id", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let value = client.get("/rest/v1.0/ping", Scope::company(42)).await.unwrap();
    assert_eq!(value["ok"], true);
}

#[tokio::test]
async fn test_delete_returns_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1.0/files/9"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let status = client
        .delete(
            "/rest/v1.0/files/9",
            Scope::company(1),
            &[("project_id".to_string(), "5".to_string())],
        )
        .await
        .unwrap();
    assert_eq!(status.as_u16(), 204);
}
