use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use shoplist_api::{ApiConfig, app::SharedStore};
use shoplist_infra::{InMemoryItemStore, ItemStore};

struct TestServer {
    base_url: String,
    addr: std::net::SocketAddr,
    store: SharedStore,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(ApiConfig::default()).await
    }

    async fn spawn_with(config: ApiConfig) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let store: SharedStore = Arc::new(InMemoryItemStore::new());
        let app = shoplist_api::build_app(&config, store.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            addr,
            store,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create(client: &reqwest::Client, srv: &TestServer, body: Value) -> Value {
    let res = client.post(srv.url("/items")).json(&body).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn scenario_a_create_milk() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/items"))
        .json(&json!({ "name": "Milk", "quantity": 2 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(
        res.headers().get(reqwest::header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["data"]["id"].as_str().is_some_and(|s| !s.is_empty()));
    assert_eq!(body["data"]["name"], "Milk");
    assert_eq!(body["data"]["quantity"], 2);
    assert_eq!(body["data"]["purchased"], false);
    assert!(body["data"]["createdAt"].is_string());
    assert!(body["data"]["updatedAt"].is_string());
}

#[tokio::test]
async fn scenario_b_invalid_create_reports_both_fields() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/items"))
        .json(&json!({ "name": "", "quantity": 0 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(body["error"]["message"], "Validation failed");
    let fields: Vec<&str> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["name", "quantity"]);
    assert!(srv.store.is_empty().unwrap());
}

#[tokio::test]
async fn scenario_c_update_unknown_id_is_404() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/items/0190a1b2-0000-7000-8000-000000000000"))
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["message"], "Item not found");
}

#[tokio::test]
async fn scenario_d_delete_twice() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create(&client, &srv, json!({ "name": "Eggs", "quantity": 12 })).await;
    let id = created["data"]["id"].as_str().unwrap();

    let res = client.delete(srv.url(&format!("/items/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.bytes().await.unwrap().is_empty());

    let res = client.delete(srv.url(&format!("/items/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn scenario_e_three_segments_is_404() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create(&client, &srv, json!({ "name": "Tea", "quantity": 1 })).await;
    let id = created["data"]["id"].as_str().unwrap();

    let res = client
        .get(srv.url(&format!("/items/{id}/extra")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
}

/// Write `request` on a fresh connection and read until the server hangs up.
async fn raw_exchange(addr: std::net::SocketAddr, request: &[u8]) -> String {
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();

    // The server closes the connection after responding, so reading to EOF terminates.
    let mut raw = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => raw.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&raw).to_lowercase()
}

fn assert_413_and_close(response: &str) {
    assert!(response.starts_with("http/1.1 413"), "got: {response}");
    assert!(response.contains("connection: close"), "got: {response}");
    assert!(response.contains("\"payload_too_large\""), "got: {response}");
}

async fn small_limit_server() -> TestServer {
    TestServer::spawn_with(ApiConfig {
        max_body_bytes: 64,
        ..ApiConfig::default()
    })
    .await
}

#[tokio::test]
async fn scenario_f_oversized_body_is_413_and_connection_closes() {
    let srv = small_limit_server().await;

    let body = json!({ "name": "x".repeat(200), "quantity": 1 }).to_string();
    let request = format!(
        "POST /items HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        srv.addr,
        body.len(),
        body
    );

    let response = raw_exchange(srv.addr, request.as_bytes()).await;
    assert_413_and_close(&response);
    assert!(srv.store.is_empty().unwrap());
}

#[tokio::test]
async fn chunked_oversized_body_is_413_and_connection_closes() {
    let srv = small_limit_server().await;

    // No Content-Length: the limit can only trip while frames are being read.
    let body = json!({ "name": "x".repeat(200), "quantity": 1 }).to_string();
    let request = format!(
        "POST /items HTTP/1.1\r\nHost: {}\r\nContent-Type: application/json\r\nTransfer-Encoding: chunked\r\n\r\n{:x}\r\n{}\r\n0\r\n\r\n",
        srv.addr,
        body.len(),
        body
    );

    let response = raw_exchange(srv.addr, request.as_bytes()).await;
    assert_413_and_close(&response);
    assert!(srv.store.is_empty().unwrap());
}

#[tokio::test]
async fn round_trip_post_then_get_is_identical() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create(
        &client,
        &srv,
        json!({ "name": "  Bread  ", "quantity": 1, "purchased": true }),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap();

    let res = client.get(srv.url(&format!("/items/{id}"))).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = res.json().await.unwrap();

    assert_eq!(fetched, created);
    assert_eq!(fetched["data"]["name"], "Bread");
}

#[tokio::test]
async fn list_returns_items_in_creation_order() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for name in ["Apples", "Butter", "Cheese"] {
        create(&client, &srv, json!({ "name": name, "quantity": 1 })).await;
    }

    let body: Value = client
        .get(srv.url("/items"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Apples", "Butter", "Cheese"]);
}

#[tokio::test]
async fn update_changes_only_given_fields() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create(&client, &srv, json!({ "name": "Milk", "quantity": 2 })).await;
    let id = created["data"]["id"].as_str().unwrap();

    let res = client
        .put(srv.url(&format!("/items/{id}/")))
        .json(&json!({ "quantity": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();

    assert_eq!(updated["data"]["quantity"], 5);
    assert_eq!(updated["data"]["id"], created["data"]["id"]);
    assert_eq!(updated["data"]["name"], created["data"]["name"]);
    assert_eq!(updated["data"]["purchased"], created["data"]["purchased"]);
    assert_eq!(updated["data"]["createdAt"], created["data"]["createdAt"]);
}

#[tokio::test]
async fn empty_update_is_rejected_before_lookup() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let created = create(&client, &srv, json!({ "name": "Milk", "quantity": 2 })).await;
    let id = created["data"]["id"].as_str().unwrap();

    let res = client
        .put(srv.url(&format!("/items/{id}")))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body["error"]["details"],
        json!([{ "field": "*", "message": "Provide at least one of these: name, quantity, purchased" }])
    );
}

#[tokio::test]
async fn unsupported_method_names_the_method() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.delete(srv.url("/items")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["message"], "DELETE is not allowed for this endpoint");
}

#[tokio::test]
async fn fractional_quantity_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/items"))
        .json(&json!({ "name": "Flour", "quantity": 1.5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(srv.store.is_empty().unwrap());
}
