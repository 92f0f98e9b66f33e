//! Ollama model engine implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use learning_common::Capability;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{LoadOutcome, ModelEngine, ModelHandle};
use crate::config::OllamaEngineConfig;
use crate::error::{Error, Result};

const SUMMARIZER_SYSTEM_PROMPT: &str = "Summarize the following lecture transcript in two or \
    three sentences. Reply with the summary only.";

const GENERATOR_SYSTEM_PROMPT: &str = "Write two multiple-choice quiz questions about the \
    following text. Reply with a JSON array where each element has the fields \"question\", \
    \"options\" (four strings) and \"answer\".";

/// Ollama model engine.
///
/// Loading a capability makes sure the model exists on the Ollama server
/// (pulling it when `auto_pull` is set) and warms it so the first request
/// does not pay the load cost.
pub struct OllamaEngine {
    http_client: Client,
    base_url: String,
    auto_pull: bool,
    keep_alive: String,
}

impl OllamaEngine {
    pub fn new(config: &OllamaEngineConfig) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build Ollama HTTP client, using defaults: {}", e);
                Client::new()
            });

        Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auto_pull: config.auto_pull,
            keep_alive: config.keep_alive.clone(),
        }
    }

    /// Check whether the Ollama server knows `model`.
    async fn model_exists(&self, model: &str) -> Result<bool> {
        let url = format!("{}/api/show", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(&OllamaModelRequest {
                model: model.to_string(),
                stream: None,
            })
            .send()
            .await
            .map_err(|e| Error::Communication(e.to_string()))?;

        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            s => Err(Error::EngineNotAvailable(format!("Ollama returned {}", s))),
        }
    }

    async fn pull_model(&self, model: &str) -> Result<()> {
        let url = format!("{}/api/pull", self.base_url);
        tracing::info!("Pulling model {} from Ollama registry", model);

        // Pulls can run far past the per-request timeout.
        let response = Client::new()
            .post(&url)
            .json(&OllamaModelRequest {
                model: model.to_string(),
                stream: Some(false),
            })
            .send()
            .await
            .map_err(|e| Error::Communication(e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::LoadFailed(format!(
                "Failed to pull model {}: {}",
                model, body
            )));
        }

        Ok(())
    }

    /// Warm a model by sending an empty prompt with keep_alive.
    async fn warm_model(&self, model: &str) -> Result<()> {
        let url = format!("{}/api/generate", self.base_url);

        let request = OllamaGenerateRequest {
            model: model.to_string(),
            prompt: String::new(),
            system: None,
            stream: false,
            keep_alive: Some(self.keep_alive.clone()),
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Communication(e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::LoadFailed(format!(
                "Failed to load model {}: {}",
                model, body
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Ollama API types
// ============================================================================

#[derive(Debug, Serialize)]
struct OllamaModelRequest {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: String,
}

// ============================================================================
// ModelEngine implementation
// ============================================================================

#[async_trait]
impl ModelEngine for OllamaEngine {
    fn engine_type(&self) -> &'static str {
        "ollama"
    }

    async fn load(&self, capability: Capability, model_name: &str) -> LoadOutcome {
        if !self.model_exists(model_name).await? {
            if !self.auto_pull {
                return Err(Error::ModelNotFound(model_name.to_string()));
            }
            self.pull_model(model_name).await?;
        }

        self.warm_model(model_name).await?;
        tracing::debug!("Model {} warmed for {}", model_name, capability);

        let system = match capability {
            Capability::Summarizer => SUMMARIZER_SYSTEM_PROMPT,
            Capability::Generator => GENERATOR_SYSTEM_PROMPT,
        };

        Ok(Arc::new(OllamaHandle {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            model: model_name.to_string(),
            system: system.to_string(),
            keep_alive: self.keep_alive.clone(),
        }))
    }
}

/// A warmed Ollama model bound to one capability's system prompt.
pub struct OllamaHandle {
    http_client: Client,
    base_url: String,
    model: String,
    system: String,
    keep_alive: String,
}

#[async_trait]
impl ModelHandle for OllamaHandle {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: input.to_string(),
            system: Some(self.system.clone()),
            stream: false,
            keep_alive: Some(self.keep_alive.clone()),
        };

        tracing::debug!("Sending generate request to Ollama: {} model={}", url, self.model);

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Communication(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::InferenceFailed(format!("{}: {}", status, body)));
        }

        let generated: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::InferenceFailed(e.to_string()))?;

        let output = generated.response.trim();
        if output.is_empty() {
            return Err(Error::InferenceFailed(format!(
                "{} returned empty output",
                self.model
            )));
        }

        Ok(output.to_string())
    }
}
