//! Node registry client.

use std::time::Duration;

use tracing::debug;
use vcluster_models::{NodeRecord, NodesResponse, RegisterResponse};

use crate::error::{ClientError, ClientResult};

/// Client for the node registry service.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    /// Default timeout for registry calls.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a client for a registry base URL (`http://host:port`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Self::DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client from a host and port.
    pub fn from_host_port(host: &str, port: u16) -> Self {
        Self::new(format!("http://{}:{}", host, port))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register (or re-register) a node. Returns the registry size.
    pub async fn register(&self, node: &NodeRecord) -> ClientResult<usize> {
        let url = format!("{}/register-node", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(node)
            .send()
            .await
            .map_err(|e| ClientError::transport(&url, e))?;

        let body: RegisterResponse = read_json(&url, response).await?;
        debug!(node_id = %node.id, count = body.count, "Registered node");
        Ok(body.count)
    }

    /// List registered nodes in registration order.
    pub async fn list_nodes(&self) -> ClientResult<Vec<NodeRecord>> {
        let url = format!("{}/nodes", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ClientError::transport(&url, e))?;

        let body: NodesResponse = read_json(&url, response).await?;
        Ok(body.nodes)
    }
}

/// Check the status and decode a JSON body.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    url: &str,
    response: reqwest::Response,
) -> ClientResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ClientError::transport(url, e))?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::malformed(url, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_register_posts_node_and_returns_count() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register-node"))
            .and(body_json(json!({"id": "worker-1", "endpoint": "http://10.0.0.2:8002"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "Node registered", "count": 3})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = RegistryClient::new(server.uri());
        let count = client
            .register(&NodeRecord::new("worker-1", "http://10.0.0.2:8002"))
            .await
            .unwrap();
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_list_nodes_preserves_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nodes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "nodes": [
                    {"id": "b", "endpoint": "http://b:1"},
                    {"id": "a", "url": "http://a:1"}
                ]
            })))
            .mount(&server)
            .await;

        let nodes = RegistryClient::new(format!("{}/", server.uri()))
            .list_nodes()
            .await
            .unwrap();
        let ids: Vec<_> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(nodes[1].endpoint, "http://a:1");
    }

    #[tokio::test]
    async fn test_list_nodes_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nodes"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = RegistryClient::new(server.uri()).list_nodes().await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_list_nodes_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/nodes"))
            .respond_with(ResponseTemplate::new(200).set_body_string("nodes!"))
            .mount(&server)
            .await;

        let err = RegistryClient::new(server.uri()).list_nodes().await.unwrap_err();
        assert!(matches!(err, ClientError::Malformed { .. }));
    }
}
