//! Chat backend: the outbound webhook that produces assistant replies.
//!
//! The backend is behind a trait so tests can script replies without a
//! network. The production implementation POSTs the conversation to a
//! configured webhook URL and accepts either of the two reply shapes the
//! service is known to return.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use sovereign_core::{Message, WalletAddress};

/// Errors from the chat backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered, but not in a recognized shape.
    #[error("malformed reply: {0}")]
    MalformedReply(String),
}

/// One history entry on the wire: role and content only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

impl From<&Message> for WireMessage {
    fn from(m: &Message) -> Self {
        Self {
            role: m.role.as_str().to_string(),
            content: m.content.clone(),
        }
    }
}

/// The request sent to the chat service. Field names are the wire contract;
/// serde serializes them as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub wallet_address: WalletAddress,
    pub system_prompt: String,
    pub conversation_history: Vec<WireMessage>,
    pub new_message: String,
    pub timestamp: String,
}

impl ChatRequest {
    pub fn new(
        wallet: &WalletAddress,
        system_prompt: impl Into<String>,
        history: &[Message],
        new_message: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            wallet_address: wallet.clone(),
            system_prompt: system_prompt.into(),
            conversation_history: history.iter().map(WireMessage::from).collect(),
            new_message: new_message.into(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// The two reply shapes the service returns, normalized at the boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ChatReply {
    Response { response: String },
    Reply { reply: String },
}

impl ChatReply {
    fn into_text(self) -> String {
        match self {
            ChatReply::Response { response } => response,
            ChatReply::Reply { reply } => reply,
        }
    }
}

/// A service that turns a conversation plus a new message into a reply.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, BackendError>;
}

/// HTTP webhook implementation of [`ChatBackend`].
pub struct WebhookBackend {
    client: reqwest::Client,
    url: String,
}

impl WebhookBackend {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl ChatBackend for WebhookBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<String, BackendError> {
        debug!(wallet = %request.wallet_address, url = %self.url, "posting chat request");

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let reply: ChatReply = serde_json::from_str(&body)
            .map_err(|_| BackendError::MalformedReply(truncate(&body, 200)))?;
        Ok(reply.into_text())
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
