//! HTTP client for the remote scoring service
//!
//! The reference deployment serves LaBSE embeddings and an XLM-R toxicity
//! classifier behind one HTTP endpoint. Sync ureq, same as every other
//! external call in this crate.

use super::{AttributeClassifier, Embedder, MetricError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct ScoreRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ToxicityResponse {
    toxicity: f64,
}

/// Client for a scoring service exposing `POST /embed` and `POST /toxicity`.
pub struct RemoteScorer {
    base_url: String,
    agent: ureq::Agent,
}

fn make_agent(timeout: Duration) -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // We handle status codes ourselves
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

impl RemoteScorer {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent: make_agent(timeout),
        }
    }

    fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        text: &str,
    ) -> Result<T, String> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json")
            .send_json(&ScoreRequest { text })
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.into_body().read_to_string().unwrap_or_default();
            return Err(format!("{status}: {body}"));
        }

        response
            .into_body()
            .read_json()
            .map_err(|e| format!("bad response body: {e}"))
    }
}

impl Embedder for RemoteScorer {
    fn embed(&self, text: &str) -> Result<Vec<f32>, MetricError> {
        let resp: EmbedResponse = self
            .post_json("/embed", text)
            .map_err(MetricError::Embedding)?;
        Ok(resp.embedding)
    }
}

impl AttributeClassifier for RemoteScorer {
    fn toxicity(&self, text: &str) -> Result<f64, MetricError> {
        let resp: ToxicityResponse = self
            .post_json("/toxicity", text)
            .map_err(MetricError::Classifier)?;
        Ok(resp.toxicity)
    }
}
