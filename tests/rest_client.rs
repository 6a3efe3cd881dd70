use kintone_mcp_server::client::ClientFactory;
use kintone_mcp_server::config::{resolve_from, ResolvedConfig};
use kintone_mcp_server::errors::ClientError;
use kintone_mcp_server::services::logger::Logger;
use serde_json::json;
use std::collections::HashMap;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolved(base_url: &str, extra: &[(&str, &str)]) -> ResolvedConfig {
    let mut env: HashMap<String, String> = extra
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    env.insert("KINTONE_BASE_URL".to_string(), base_url.to_string());
    resolve_from(["kintone-mcp-server"], &env).expect("resolved config")
}

#[tokio::test]
async fn get_record_sends_token_and_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/k/v1/record.json"))
        .and(query_param("app", "7"))
        .and(query_param("id", "42"))
        .and(header("x-cybozu-api-token", "tok1"))
        .and(header(
            "user-agent",
            format!("kintone-mcp-server@{}", env!("CARGO_PKG_VERSION")).as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "record": { "$id": { "type": "__ID__", "value": "42" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let factory = ClientFactory::new(Logger::new("test"));
    let client = factory
        .get_client(&resolved(&server.uri(), &[("KINTONE_API_TOKEN", "tok1")]))
        .expect("client");
    let record = client.record().get_record("7", "42").await.expect("record");
    assert_eq!(record["record"]["$id"]["value"], "42");
}

#[tokio::test]
async fn password_auth_and_basic_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/k/v1/app.json"))
        .and(header("x-cybozu-authorization", "dXNlcjpwYXNz"))
        .and(header("authorization", "Basic YmFzaWM6c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "appId": "1" })))
        .expect(1)
        .mount(&server)
        .await;

    let factory = ClientFactory::new(Logger::new("test"));
    let client = factory
        .get_client(&resolved(
            &server.uri(),
            &[
                ("KINTONE_USERNAME", "user"),
                ("KINTONE_PASSWORD", "pass"),
                ("KINTONE_BASIC_AUTH_USERNAME", "basic"),
                ("KINTONE_BASIC_AUTH_PASSWORD", "secret"),
            ],
        ))
        .expect("client");
    let app = client.app().get_app("1").await.expect("app");
    assert_eq!(app["appId"], "1");
}

#[tokio::test]
async fn add_record_posts_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/k/v1/record.json"))
        .and(body_json(json!({
            "app": "3",
            "record": { "title": { "value": "hello" } }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "id": "100", "revision": "1" })),
        )
        .mount(&server)
        .await;

    let factory = ClientFactory::new(Logger::new("test"));
    let client = factory
        .get_client(&resolved(&server.uri(), &[("KINTONE_API_TOKEN", "abc")]))
        .expect("client");
    let created = client
        .record()
        .add_record("3", json!({ "title": { "value": "hello" } }))
        .await
        .expect("created");
    assert_eq!(created["id"], "100");
}

#[tokio::test]
async fn api_error_body_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/k/v1/app/form/fields.json"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "code": "GAIA_NO01",
            "id": "abc",
            "message": "Using this API token, you cannot run the specified API."
        })))
        .mount(&server)
        .await;

    let factory = ClientFactory::new(Logger::new("test"));
    let client = factory
        .get_client(&resolved(&server.uri(), &[("KINTONE_API_TOKEN", "abc")]))
        .expect("client");
    let err = client.app().get_form_fields("5").await.unwrap_err();
    assert_eq!(err.api_code(), Some("GAIA_NO01"));
    match err {
        ClientError::Api { status, message, .. } => {
            assert_eq!(status.as_u16(), 403);
            assert!(message.contains("cannot run"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn download_and_upload_files() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/k/v1/file.json"))
        .and(query_param("fileKey", "key-1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"file-body".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/k/v1/file.json"))
        .and(header_exists("content-type"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "fileKey": "uploaded" })))
        .mount(&server)
        .await;

    let factory = ClientFactory::new(Logger::new("test"));
    let client = factory
        .get_client(&resolved(&server.uri(), &[("KINTONE_API_TOKEN", "abc")]))
        .expect("client");
    let bytes = client.file().download_file("key-1").await.expect("download");
    assert_eq!(&bytes[..], b"file-body");
    let key = client
        .file()
        .upload_file("notes.txt", b"hello".to_vec())
        .await
        .expect("upload");
    assert_eq!(key, "uploaded");
}
