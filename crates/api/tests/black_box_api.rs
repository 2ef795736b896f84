use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};

use thingmesh_api::app::{AppServices, build_app, build_in_memory_services};
use thingmesh_api::config::TransportConfig;
use thingmesh_core::{DomainError, DomainResult, ErrorKind};
use thingmesh_provision::{ProvisionService, Provisioned};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(services: AppServices) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = build_app(TransportConfig::default(), services);
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
            client: reqwest::Client::new(),
            handle,
        }
    }

    async fn in_memory() -> Self {
        Self::spawn(build_in_memory_services()).await
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

/// Provisioning that always reports the external id as taken.
struct ConflictingProvision;

impl ProvisionService for ConflictingProvision {
    fn provision(&self, _: &str, _: &str, _: &str, _: &str) -> DomainResult<Provisioned> {
        Err(DomainError::with_message(ErrorKind::Conflict, "external id already provisioned"))
    }

    fn mapping(&self, _: &str) -> DomainResult<Value> {
        Ok(json!({}))
    }
}

async fn error_of(res: reqwest::Response) -> String {
    let body: Value = res.json().await.unwrap();
    body["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::in_memory().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "pass");
}

#[tokio::test]
async fn non_json_body_is_unsupported_media_type() {
    let srv = TestServer::in_memory().await;
    let res = srv
        .client
        .post(srv.url("/things/configs"))
        .bearer_auth("owner")
        .header("content-type", "text/plain")
        .body(r#"{"external_id":"e","external_key":"k"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert_eq!(res.text().await.unwrap(), r#"{"error":"unsupported content type"}"#);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let srv = TestServer::in_memory().await;
    for path in ["/things/configs", "/things", "/channels", "/mapping"] {
        let res = srv.client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
    }

    let res = srv
        .client
        .get(srv.url("/things"))
        .header("authorization", "Basic b3duZXI6")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn limit_over_ceiling_is_rejected() {
    let srv = TestServer::in_memory().await;
    let res = srv
        .client
        .get(srv.url("/things?limit=500"))
        .bearer_auth("owner")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await, "invalid query parameters");

    let res = srv
        .client
        .get(srv.url("/things"))
        .bearer_auth("owner")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["limit"], 10);
    assert_eq!(body["offset"], 0);
}

#[tokio::test]
async fn provisioning_conflict_is_409() {
    let mut services = build_in_memory_services();
    services.provision = Arc::new(ConflictingProvision);
    let srv = TestServer::spawn(services).await;

    let res = srv
        .client
        .post(srv.url("/mapping"))
        .bearer_auth("owner")
        .json(&json!({ "external_id": "ext", "external_key": "key", "name": "gw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(error_of(res).await, "external id already provisioned");
}

#[tokio::test]
async fn provisioning_creates_a_bootstrappable_device() {
    let srv = TestServer::in_memory().await;

    let res = srv
        .client
        .get(srv.url("/mapping"))
        .bearer_auth("owner")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv
        .client
        .post(srv.url("/mapping"))
        .bearer_auth("owner")
        .json(&json!({ "external_id": "ext-9", "external_key": "secret", "name": "gw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let provisioned: Value = res.json().await.unwrap();
    assert_eq!(provisioned["whitelisted"], true);
    assert_eq!(provisioned["channels"].as_array().unwrap().len(), 2);

    let res = srv
        .client
        .get(srv.url("/things/bootstrap/ext-9"))
        .bearer_auth("secret")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let view: Value = res.json().await.unwrap();
    assert_eq!(view["mainflux_id"], provisioned["things"][0]["id"]);
}

#[tokio::test]
async fn bootstrap_config_lifecycle() {
    let srv = TestServer::in_memory().await;
    let c = &srv.client;

    let res = c
        .post(srv.url("/things/configs"))
        .bearer_auth("owner")
        .json(&json!({
            "external_id": "ext-1",
            "external_key": "ext-key",
            "channels": ["ch-1"],
            "name": "North Gateway",
            "content": "{}",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let location = res.headers()["location"].to_str().unwrap().to_string();
    assert!(location.starts_with("/things/configs/"));
    assert!(res.bytes().await.unwrap().is_empty());

    let res = c.get(srv.url(&location)).bearer_auth("owner").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let view: Value = res.json().await.unwrap();
    assert_eq!(view["external_id"], "ext-1");
    assert_eq!(view["state"], 0);
    let thing_id = view["mainflux_id"].as_str().unwrap().to_string();

    let res = c
        .put(srv.url(&format!("/things/state/{thing_id}")))
        .bearer_auth("owner")
        .json(&json!({ "state": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = c
        .put(srv.url(&format!("/things/state/{thing_id}")))
        .bearer_auth("owner")
        .json(&json!({ "state": 7 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = c
        .get(srv.url("/things/configs?state=1&name=NORTH"))
        .bearer_auth("owner")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["total"], 1);
    assert_eq!(page["configs"][0]["mainflux_id"], thing_id.as_str());

    let res = c
        .get(srv.url("/things/configs?state=0"))
        .bearer_auth("owner")
        .send()
        .await
        .unwrap();
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["total"], 0);

    let res = c
        .get(srv.url("/things/bootstrap/ext-1"))
        .bearer_auth("ext-key")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let boot: Value = res.json().await.unwrap();
    assert_eq!(boot["mainflux_id"], thing_id.as_str());
    assert_eq!(boot["mainflux_channels"][0]["id"], "ch-1");

    let res = c
        .get(srv.url("/things/bootstrap/ext-1"))
        .bearer_auth("wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = c.get(srv.url("/things/bootstrap/ext-1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = c
        .get(srv.url("/things/bootstrap/secure/ext-1"))
        .bearer_auth("ext-key")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let raw = res.bytes().await.unwrap();
    let sealed: Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(sealed["mainflux_id"], thing_id.as_str());

    let res = c.delete(srv.url(&location)).bearer_auth("owner").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = c.get(srv.url(&location)).bearer_auth("owner").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn things_and_channels_connect() {
    let srv = TestServer::in_memory().await;
    let c = &srv.client;

    let res = c
        .post(srv.url("/things/bulk"))
        .bearer_auth("owner")
        .json(&json!([{ "name": "sensor-a" }, { "name": "sensor-b" }]))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let thing_a = created["things"][0]["id"].as_str().unwrap().to_string();

    let res = c
        .post(srv.url("/channels"))
        .bearer_auth("owner")
        .json(&json!({ "name": "telemetry" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let channel = res.headers()["location"]
        .to_str()
        .unwrap()
        .trim_start_matches("/channels/")
        .to_string();

    let res = c
        .put(srv.url(&format!("/channels/{channel}/things/{thing_a}")))
        .bearer_auth("owner")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = c
        .get(srv.url(&format!("/channels/{channel}/things")))
        .bearer_auth("owner")
        .send()
        .await
        .unwrap();
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["total"], 1);
    assert_eq!(page["things"][0]["name"], "sensor-a");

    let res = c
        .post(srv.url("/connect"))
        .bearer_auth("owner")
        .json(&json!({ "channel_ids": [channel], "thing_ids": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = c
        .delete(srv.url(&format!("/channels/{channel}/things/{thing_a}")))
        .bearer_auth("owner")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = c
        .get(srv.url(&format!("/things/{thing_a}/channels")))
        .bearer_auth("owner")
        .send()
        .await
        .unwrap();
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["total"], 0);

    let res = c
        .get(srv.url(&format!("/things/{thing_a}")))
        .bearer_auth("someone-else")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_client_ids_and_sort_fields_are_rejected() {
    let srv = TestServer::in_memory().await;
    let c = &srv.client;

    let res = c
        .post(srv.url("/things"))
        .bearer_auth("owner")
        .json(&json!({ "id": "not-a-uuid", "name": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_of(res).await, "malformed entity specification");

    let res = c
        .get(srv.url("/channels?order=created"))
        .bearer_auth("owner")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = c
        .post(srv.url("/things"))
        .bearer_auth("owner")
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn keys_issue_retrieve_revoke() {
    let srv = TestServer::in_memory().await;
    let c = &srv.client;

    let res = c
        .post(srv.url("/keys"))
        .bearer_auth("owner")
        .json(&json!({ "type": 2, "duration": 3600 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let issued: Value = res.json().await.unwrap();
    let id = issued["id"].as_str().unwrap().to_string();
    assert!(issued["value"].as_str().is_some_and(|v| !v.is_empty()));
    assert!(issued["expires_at"].is_string());

    let res = c
        .get(srv.url(&format!("/keys/{id}")))
        .bearer_auth("owner")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let key: Value = res.json().await.unwrap();
    assert_eq!(key["type"], 2);
    assert_eq!(key["issuer_id"], "owner");

    let res = c
        .delete(srv.url(&format!("/keys/{id}")))
        .bearer_auth("owner")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = c
        .get(srv.url(&format!("/keys/{id}")))
        .bearer_auth("owner")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = c
        .post(srv.url("/keys"))
        .bearer_auth("owner")
        .json(&json!({ "type": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
