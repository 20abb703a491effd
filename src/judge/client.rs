// HTTP client for agent endpoints

use std::time::{Duration, Instant};

use log::debug;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::error::ClientError;
use crate::types::{AgentIdentity, EndPayload, MoveQuery, Seat, StatePayload};

/// The four calls the judge makes on an agent. Every call is bounded by the
/// implementation's own timeout.
#[allow(async_fn_in_trait)]
pub trait AgentClient {
    /// `GET /`: identity probe, also measures latency
    async fn identity(&self, seat: Seat) -> Result<AgentIdentity, ClientError>;

    /// `POST /send-state`
    async fn push_state(&self, payload: &StatePayload) -> Result<(), ClientError>;

    /// `GET /send-move`: the raw move token, not yet validated
    async fn request_move(&self, query: &MoveQuery) -> Result<String, ClientError>;

    /// `POST /end`
    async fn end(&self, payload: &EndPayload) -> Result<(), ClientError>;
}

/// reqwest-backed agent client with a per-request timeout
pub struct HttpAgentClient {
    client: Client,
    base_url: String,
}

impl HttpAgentClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to build client: {}", e)))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(HttpAgentClient { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn json_body(response: reqwest::Response) -> Result<Value, ClientError> {
        expect_ok(response.status())?;
        response
            .json::<Value>()
            .await
            .map_err(|e| ClientError::Body(e.to_string()))
    }
}

/// Agents answer 200 and nothing else; any other status fails the attempt
fn expect_ok(status: StatusCode) -> Result<(), ClientError> {
    if status == StatusCode::OK {
        Ok(())
    } else {
        Err(ClientError::Status(status.as_u16()))
    }
}

fn transport(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::Transport(e.to_string())
    }
}

impl AgentClient for HttpAgentClient {
    async fn identity(&self, seat: Seat) -> Result<AgentIdentity, ClientError> {
        let start = Instant::now();
        let response = self
            .client
            .get(self.url("/"))
            .send()
            .await
            .map_err(transport)?;
        let body = Self::json_body(response).await?;
        let latency = start.elapsed();

        let field = |name: &str, default: String| {
            body.get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(default)
        };
        Ok(AgentIdentity {
            participant: field("participant", format!("Participant{}", seat)),
            agent_name: field("agent_name", format!("Agent{}", seat)),
            latency,
        })
    }

    async fn push_state(&self, payload: &StatePayload) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.url("/send-state"))
            .json(payload)
            .send()
            .await
            .map_err(transport)?;
        expect_ok(response.status())
    }

    async fn request_move(&self, query: &MoveQuery) -> Result<String, ClientError> {
        let response = self
            .client
            .get(self.url("/send-move"))
            .query(query)
            .send()
            .await
            .map_err(transport)?;
        let body = Self::json_body(response).await?;
        debug!("player {} answered {}", query.player_number, body);

        body.get("move")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClientError::Body("response has no string `move`".to_string()))
    }

    async fn end(&self, payload: &EndPayload) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.url("/end"))
            .json(payload)
            .send()
            .await
            .map_err(transport)?;
        expect_ok(response.status())
    }
}
