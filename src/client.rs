//! HTTP client for the evaluation service.
//!
//! Three endpoints: `GET /questions`, `POST /evaluate` and
//! `GET /leaderboard`. Any transport failure or non-2xx status is reported
//! as a network failure of the calling operation. No retries.

use crate::config::ApiConfig;
use crate::error::{BenchError, Operation, Result};
use crate::models::{AnswerInput, EvaluationResult, Question, RawEntry};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

/// The remote calls the session depends on.
#[async_trait]
pub trait BenchApi: Send + Sync {
    async fn questions(&self) -> Result<Vec<Question>>;

    async fn evaluate(&self, input: &AnswerInput) -> Result<EvaluationResult>;

    async fn leaderboard(&self) -> Result<Vec<RawEntry>>;
}

/// `BenchApi` over HTTP.
#[derive(Clone)]
pub struct BenchClient {
    client: Client,
    config: ApiConfig,
}

impl BenchClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Full URL of an endpoint path.
    fn endpoint(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    /// Read the body of a response, failing on non-2xx, and decode it.
    async fn read_json<T: DeserializeOwned>(
        operation: Operation,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BenchError::network(operation, e.to_string()))?;

        if !status.is_success() {
            tracing::warn!("{} returned HTTP {}: {}", operation, status, body);
            return Err(BenchError::network(
                operation,
                format!("HTTP error! status: {}", status),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!("{} returned an unexpected body: {}", operation, e);
            BenchError::decode(operation, e.to_string())
        })
    }

    async fn get<T: DeserializeOwned>(&self, operation: Operation, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!("{} failed: {}", operation, e);
            BenchError::network(operation, e.to_string())
        })?;

        Self::read_json(operation, response).await
    }

    /// Test connectivity to the API.
    pub async fn test_connection(&self) -> Result<usize> {
        let questions = self.questions().await?;
        Ok(questions.len())
    }
}

#[async_trait]
impl BenchApi for BenchClient {
    async fn questions(&self) -> Result<Vec<Question>> {
        self.get(Operation::FetchQuestions, "questions").await
    }

    async fn evaluate(&self, input: &AnswerInput) -> Result<EvaluationResult> {
        let operation = Operation::Submit;
        let url = self.endpoint("evaluate");
        tracing::debug!(
            "POST {} (question: {}, user: {}, answer length: {} chars)",
            url,
            input.question_id,
            input.username,
            input.student_answer.chars().count()
        );

        let response = self
            .client
            .post(&url)
            .json(input)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("{} failed: {}", operation, e);
                BenchError::network(operation, e.to_string())
            })?;

        Self::read_json(operation, response).await
    }

    async fn leaderboard(&self) -> Result<Vec<RawEntry>> {
        self.get(Operation::FetchLeaderboard, "leaderboard").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> BenchClient {
        BenchClient::new(ApiConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_endpoint_construction() {
        let with_slash = client("http://localhost:8000/");
        assert_eq!(with_slash.endpoint("questions"), "http://localhost:8000/questions");

        // Without trailing slash
        let without_slash = client("http://localhost:8000");
        assert_eq!(without_slash.endpoint("/evaluate"), "http://localhost:8000/evaluate");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let nested = client("https://bench.example.com/api");
        assert_eq!(
            nested.endpoint("leaderboard"),
            "https://bench.example.com/api/leaderboard"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_failure() {
        // Port 9 on loopback: nothing listens there in the test environment.
        let unreachable = client("http://127.0.0.1:9");

        let err = unreachable.questions().await.unwrap_err();
        assert!(err.is_network_failure());
        assert_eq!(err.operation(), Some(Operation::FetchQuestions));

        let err = unreachable
            .evaluate(&AnswerInput::new("q1", "answer", "alice"))
            .await
            .unwrap_err();
        assert_eq!(
            err.user_message(),
            "Failed to submit answer. Please try again later."
        );
    }
}
