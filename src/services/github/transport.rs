// HTTP transport for the GitHub REST API.
// Behind a trait so the resolver and publisher can be exercised with a
// scripted transport in tests.

use async_trait::async_trait;
use log::debug;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("subsync/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create HTTP client")
});

const ACCEPT_JSON: &str = "application/vnd.github.v3+json";
const API_VERSION: &str = "2022-11-28";

/// Transport-level failure (connection, DNS, TLS, body read). HTTP error
/// statuses are not transport errors; they come back as a normal
/// [`RawResponse`].
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// A fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|content_type| content_type.contains("application/json"))
            .unwrap_or(false)
    }
}

#[async_trait]
pub trait GithubTransport: Send + Sync {
    /// GET with the standard API headers, plus the auth header when a token
    /// is present.
    async fn get(&self, url: &str, token: Option<&str>) -> Result<RawResponse, TransportError>;

    /// Authenticated PUT with a JSON body.
    async fn put(
        &self,
        url: &str,
        token: &str,
        payload: &Value,
    ) -> Result<RawResponse, TransportError>;
}

/// Production transport backed by a shared reqwest client. Request timeouts
/// are left at the client's defaults.
pub struct ReqwestTransport;

#[async_trait]
impl GithubTransport for ReqwestTransport {
    async fn get(&self, url: &str, token: Option<&str>) -> Result<RawResponse, TransportError> {
        debug!("GET {}", url);
        let mut request = HTTP_CLIENT
            .get(url)
            .header("Accept", ACCEPT_JSON)
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = token {
            request = request.header("Authorization", format!("token {}", token));
        }
        let response = request
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        buffer(response).await
    }

    async fn put(
        &self,
        url: &str,
        token: &str,
        payload: &Value,
    ) -> Result<RawResponse, TransportError> {
        debug!("PUT {}", url);
        let response = HTTP_CLIENT
            .put(url)
            .header("Accept", ACCEPT_JSON)
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("Authorization", format!("token {}", token))
            .json(payload)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        buffer(response).await
    }
}

async fn buffer(response: reqwest::Response) -> Result<RawResponse, TransportError> {
    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = response
        .text()
        .await
        .map_err(|e| TransportError(e.to_string()))?;
    Ok(RawResponse {
        status,
        content_type,
        body,
    })
}
