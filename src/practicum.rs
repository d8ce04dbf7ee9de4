use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error};

use crate::config::Settings;
use crate::error::{BotError, Result};

/// Source of raw homework status responses.
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    /// Fetch submissions updated since `from_date` (unix seconds).
    async fn get_api_answer(&self, from_date: i64) -> Result<Value>;
}

#[derive(Clone)]
pub struct PracticumClient {
    http: Client,
    endpoint: Url,
    token: String,
}

impl fmt::Debug for PracticumClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PracticumClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl PracticumClient {
    pub fn new(token: String, endpoint: Url, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .user_agent("homework-bot/0.1")
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    pub fn from_settings(token: String, settings: &Settings) -> anyhow::Result<Self> {
        let endpoint = Url::parse(&settings.endpoint)
            .with_context(|| format!("invalid endpoint URL: {}", settings.endpoint))?;
        Self::new(token, endpoint, settings.request_timeout())
    }

    pub fn build_request(&self, from_date: i64) -> Result<reqwest::Request> {
        self.http
            .get(self.endpoint.clone())
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .build()
            .map_err(|err| BotError::UpstreamUnavailable(err.to_string()))
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    async fn get_api_answer(&self, from_date: i64) -> Result<Value> {
        let request = self.build_request(from_date)?;
        debug!(url = %request.url(), "requesting homework statuses");
        let res = self.http.execute(request).await.map_err(|err| {
            error!(?err, "homework API request failed");
            BotError::UpstreamUnavailable(err.to_string())
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|err| {
            error!(?err, %status, "failed to read homework API body");
            BotError::UpstreamUnavailable(err.to_string())
        })?;
        interpret_response(status, &body)
    }
}

/// Map a status code and body to the decoded payload.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<Value> {
    if status != StatusCode::OK {
        error!(%status, body_len = body.len(), "homework API returned non-200 status");
        return Err(BotError::UpstreamUnavailable(format!(
            "unexpected status {}",
            status
        )));
    }
    serde_json::from_str(body).map_err(|err| {
        error!(?err, body_len = body.len(), "homework API body is not JSON");
        BotError::MalformedResponseBody(err.to_string())
    })
}
