use catalog_tags::{MemoryStore, TagName};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::{sleep, Duration};

// Test client wrapper for making API calls
struct TestClient {
    client: Client,
    base_url: String,
}

impl TestClient {
    fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn post(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(&format!("{}{}", self.base_url, path))
            .json(&json)
            .send()
            .await
    }

    async fn put(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .put(&format!("{}{}", self.base_url, path))
            .send()
            .await
    }

    async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(&format!("{}{}", self.base_url, path))
            .send()
            .await
    }

    async fn delete(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .delete(&format!("{}{}", self.base_url, path))
            .send()
            .await
    }

    async fn resource_tags(&self, path: &str) -> Vec<String> {
        let body: Value = self.get(path).await.unwrap().json().await.unwrap();
        body["tags"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t.as_str().unwrap().to_string())
            .collect()
    }

    /// Updates are applied in the background, so poll until they land
    async fn wait_for_tags(&self, path: &str, expected: &[&str]) {
        for _ in 0..100 {
            if self.resource_tags(path).await == expected {
                return;
            }
            sleep(Duration::from_millis(20)).await;
        }
        panic!(
            "tags at {} never became {:?}, last saw {:?}",
            path,
            expected,
            self.resource_tags(path).await
        );
    }
}

async fn start_server() -> TestClient {
    start_server_with_catalog(&["finance", "marketing", "pii"]).await
}

async fn start_server_with_catalog(catalog: &[&str]) -> TestClient {
    let store = Arc::new(MemoryStore::with_catalog(
        catalog.iter().map(|name| TagName::from_catalog(*name)),
    ));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(catalog_tags::serve(store, listener));

    TestClient::new(format!("http://{}", addr))
}

#[tokio::test]
async fn test_immediate_add_and_remove() {
    let client = start_server().await;
    let tags = "/table/gold.orders/tags";

    let resp = client.put(&format!("{}/pii", tags)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let op: Value = resp.json().await.unwrap();
    assert_eq!(op, json!({"method": "PUT", "tag_name": "pii"}));
    client.wait_for_tags(tags, &["pii"]).await;

    // Invalid names are rejected before anything is dispatched
    let resp = client.put(&format!("{}/Not%20Valid", tags)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["hint"], "Valid characters include a-z, 0-9, and '_'.");

    let resp = client.delete(&format!("{}/pii", tags)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    client.wait_for_tags(tags, &[]).await;
}

#[tokio::test]
async fn test_batch_session_commit() {
    let client = start_server().await;
    let tags = "/table/gold.orders/tags";
    let session = "/table/gold.orders/tag-session";

    client.put(&format!("{}/pii", tags)).await.unwrap();
    client.put(&format!("{}/finance", tags)).await.unwrap();
    client.wait_for_tags(tags, &["finance", "pii"]).await;

    let resp = client.post(session, json!({})).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let view: Value = resp.json().await.unwrap();
    assert_eq!(view["entries"], json!({"finance": "PRESENT", "pii": "PRESENT"}));

    // Only one session per resource
    let resp = client.post(session, json!({})).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let toggle = format!("{}/toggle", session);
    let resp = client.post(&toggle, json!({"tag_name": "pii"})).await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "REMOVE");
    assert_eq!(body["selected"], false);

    client.post(&toggle, json!({"tag_name": "marketing"})).await.unwrap();
    client.post(&toggle, json!({"tag_name": "scratch"})).await.unwrap();
    let resp = client.post(&toggle, json!({"tag_name": "scratch"})).await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], Value::Null);

    let resp = client.post(&toggle, json!({"tag_name": "Bad Tag"})).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = client.get(session).await.unwrap().json().await.unwrap();
    let choices: Vec<(String, bool)> = body["choices"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| {
            (
                c["tag_name"].as_str().unwrap().to_string(),
                c["selected"].as_bool().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        choices,
        vec![
            ("finance".to_string(), true),
            ("pii".to_string(), false),
            ("marketing".to_string(), true),
        ]
    );

    let resp = client
        .post(&format!("{}/commit", session), json!({}))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["operations"],
        json!([
            {"method": "PUT", "tag_name": "marketing"},
            {"method": "DELETE", "tag_name": "pii"},
        ])
    );

    client.wait_for_tags(tags, &["finance", "marketing"]).await;

    // The session is gone after commit
    let resp = client.get(session).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_batch_session_discard() {
    let client = start_server().await;
    let tags = "/dashboard/mode.sales/tags";
    let session = "/dashboard/mode.sales/tag-session";

    client.post(session, json!({})).await.unwrap();
    client
        .post(&format!("{}/toggle", session), json!({"tag_name": "pii"}))
        .await
        .unwrap();

    let resp = client.delete(session).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = client
        .post(&format!("{}/commit", session), json!({}))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Give the worker a chance to (wrongly) apply something
    sleep(Duration::from_millis(50)).await;
    assert!(client.resource_tags(tags).await.is_empty());

    let catalog: Value = client.get("/tags").await.unwrap().json().await.unwrap();
    assert_eq!(catalog["total"], 3);
}

#[tokio::test]
async fn test_catalogued_legacy_name_can_be_added() {
    let client = start_server_with_catalog(&["Legacy-Tag", "pii"]).await;
    let tags = "/table/gold.orders/tags";
    let session = "/table/gold.orders/tag-session";

    let resp = client.put(&format!("{}/Legacy-Tag", tags)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    client.wait_for_tags(tags, &["Legacy-Tag"]).await;

    // Uncatalogued names still have to be valid
    let resp = client.put(&format!("{}/Other-Tag", tags)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    client.delete(&format!("{}/Legacy-Tag", tags)).await.unwrap();
    client.wait_for_tags(tags, &[]).await;

    client.post(session, json!({})).await.unwrap();
    let toggle = format!("{}/toggle", session);
    let resp = client
        .post(&toggle, json!({"tag_name": "Legacy-Tag"}))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ADD");
    assert_eq!(
        body["pending"],
        json!([{"method": "PUT", "tag_name": "Legacy-Tag"}])
    );

    let resp = client
        .post(&toggle, json!({"tag_name": "Other-Tag"}))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    client
        .post(&format!("{}/commit", session), json!({}))
        .await
        .unwrap();
    client.wait_for_tags(tags, &["Legacy-Tag"]).await;
}

#[tokio::test]
async fn test_unknown_resource_type() {
    let client = start_server().await;

    let resp = client.get("/lineage/gold.orders/tags").await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client.get("/health").await.unwrap();
    assert!(resp.status().is_success());
}
