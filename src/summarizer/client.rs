use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::{HttpConfig, SummarizerConfig};
use crate::error::Result;

pub struct SummarizerClient {
    client: Client,
    url: String,
    api_key: String,
    host: String,
}

impl SummarizerClient {
    pub fn new(config: &SummarizerConfig, http: &HttpConfig) -> Result<Self> {
        let client = Client::builder().timeout(http.timeout).build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            host: config.host.clone(),
        })
    }

    /// Send one transcript. Only transport and decoding problems are errors;
    /// any non-200 answer comes back as [`SummarizeReply::Failed`].
    pub async fn summarize(&self, request: &SummarizeRequest) -> Result<SummarizeReply> {
        let response = self
            .client
            .post(&self.url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "Summarizer returned an error");
            return Ok(SummarizeReply::Failed {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.json::<SummarizeResponse>().await?;
        Ok(SummarizeReply::Summary(body))
    }
}

// --- Request types ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarizeRequest {
    pub text: String,
    /// Fraction of the transcript to keep.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
    /// Alternative to `ratio`: cap on summary sentences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sentences: Option<u32>,
}

impl SummarizeRequest {
    /// `max_sentences` takes precedence over `ratio` when both are given.
    pub fn new(text: impl Into<String>, ratio: f64, max_sentences: Option<u32>) -> Self {
        Self {
            text: text.into(),
            ratio: if max_sentences.is_some() { None } else { Some(ratio) },
            max_sentences,
        }
    }
}

// --- Response types ---

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummarizeResponse {
    pub summary: Option<String>,
    #[serde(default)]
    pub action_items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SummarizeReply {
    Summary(SummarizeResponse),
    Failed { status: u16, body: String },
}
