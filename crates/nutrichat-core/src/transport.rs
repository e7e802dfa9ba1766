use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransportError;
use crate::reply::{MenuItem, Reply};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct MenuResponse {
    #[serde(default)]
    items: Vec<MenuItem>,
}

/// What the backend reports about itself on `GET /`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BackendStatus {
    pub message: Option<String>,
    pub status: Option<String>,
    pub model: Option<String>,
    pub embedding: Option<String>,
    pub token_status: Option<String>,
}

/// One request per user turn, reply already normalized.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, message: &str) -> Result<Reply, TransportError>;

    /// Base URL shown to the user when the backend can't be reached.
    fn base_url(&self) -> &str;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn status(&self) -> Result<BackendStatus, TransportError> {
        let value = self.get_json(&format!("{}/", self.base_url)).await?;
        serde_json::from_value(value).map_err(TransportError::MalformedBody)
    }

    /// All menu items, or the items of a single category.
    pub async fn menu(&self, category: Option<&str>) -> Result<Vec<MenuItem>, TransportError> {
        let url = match category {
            Some(category) => format!(
                "{}/api/menu/category/{}",
                self.base_url,
                encode_path_segment(category)
            ),
            None => format!("{}/api/menu", self.base_url),
        };

        let value = self.get_json(&url).await?;
        let menu: MenuResponse =
            serde_json::from_value(value).map_err(TransportError::MalformedBody)?;
        Ok(menu.items)
    }

    async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        read_json(response).await
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, message: &str) -> Result<Reply, TransportError> {
        let url = format!("{}/api/chat", self.base_url);
        tracing::debug!(%url, chars = message.chars().count(), "sending chat message");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await?;

        let value = read_json(response).await?;
        Ok(Reply::from_value(&value))
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value, TransportError> {
    let status = response.status();
    if !status.is_success() {
        tracing::warn!(%status, "backend returned an error status");
        return Err(TransportError::Status(status));
    }

    let body = response.text().await?;
    tracing::debug!(raw = %body, "raw response");

    serde_json::from_str(&body).map_err(|err| {
        tracing::warn!(error = %err, "backend response is not valid JSON");
        TransportError::MalformedBody(err)
    })
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_path_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
