//! Ollama API client for embeddings and generation with retry logic

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::providers::GenerationParams;

/// Ollama API client with automatic retry
pub struct OllamaClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: LlmConfig,
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    prompt: String,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    /// Create a new Ollama client with retry support
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Client that reports the first failure instead of backing off
    pub fn without_retry(config: &LlmConfig) -> Result<Self> {
        Self::new(&LlmConfig {
            max_retries: 0,
            ..config.clone()
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn max_retries(&self) -> u32 {
        self.config.max_retries
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_retries = self.config.max_retries;
        let mut last_error = None;

        for attempt in 0..=max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < max_retries {
                        let delay = Duration::from_secs(2u64.pow(attempt));
                        tracing::warn!(
                            "Request failed (attempt {}/{}), retrying in {:?}",
                            attempt + 1,
                            max_retries + 1,
                            delay
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::llm("Unknown error")))
    }

    /// Check if Ollama answers on `/api/tags`
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.config.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Generate an embedding using Ollama with retry
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.config.base_url);
        let model = self.config.embed_model.clone();

        self.retry_request(|| {
            let request = EmbedRequest {
                model: model.clone(),
                prompt: text.to_string(),
            };
            let client = self.client.clone();
            let url = url.clone();

            async move {
                let response = client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::embedding(format!("Embedding request failed: {}", e)))?;

                if !response.status().is_success() {
                    return Err(Error::embedding(format!(
                        "Embedding failed: HTTP {}",
                        response.status()
                    )));
                }

                let embed_response: EmbedResponse = response.json().await.map_err(|e| {
                    Error::embedding(format!("Failed to parse embedding response: {}", e))
                })?;

                Ok(embed_response.embedding)
            }
        })
        .await
    }

    /// Run a non-streaming generation for a prepared prompt
    pub async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let url = format!("{}/api/generate", self.config.base_url);
        let model = self.config.generate_model.clone();
        // Ollama has no greedy switch; temperature 0 is the equivalent
        let temperature = if params.do_sample { params.temperature } else { 0.0 };

        tracing::debug!(
            "Generating with model: {} ({} prompt chars)",
            model,
            prompt.len()
        );

        self.retry_request(|| {
            let request = GenerateRequest {
                model: model.clone(),
                prompt: prompt.to_string(),
                stream: false,
                options: GenerateOptions {
                    temperature,
                    num_predict: params.max_length,
                },
            };
            let client = self.client.clone();
            let url = url.clone();

            async move {
                let response = client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::llm(format!("Generation request failed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::llm(format!(
                        "Generation failed: HTTP {} - {}",
                        status, body
                    )));
                }

                let generate_response: GenerateResponse = response.json().await.map_err(|e| {
                    Error::llm(format!("Failed to parse generation response: {}", e))
                })?;

                Ok(generate_response.response)
            }
        })
        .await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    /// Local server that counts connections and closes each one unanswered
    pub(crate) async fn counting_server() -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
            }
        });

        (format!("http://{}", addr), hits)
    }

    #[test]
    fn test_generate_request_shape() {
        let request = GenerateRequest {
            model: "phi3".to_string(),
            prompt: "hi".to_string(),
            stream: false,
            options: GenerateOptions {
                temperature: 0.3,
                num_predict: 200,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 200);
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unhealthy() {
        let config = LlmConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            max_retries: 0,
            ..LlmConfig::default()
        };
        let client = OllamaClient::new(&config).unwrap();
        assert!(!client.health_check().await.unwrap());
        assert!(client.generate("hi", &GenerationParams::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_without_retry_makes_one_attempt() {
        let (base_url, hits) = counting_server().await;
        let config = LlmConfig {
            base_url,
            timeout_secs: 5,
            max_retries: 2,
            ..LlmConfig::default()
        };

        let client = OllamaClient::without_retry(&config).unwrap();
        assert_eq!(client.max_retries(), 0);
        assert!(client.embed("sample").await.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retrying_client_repeats_failed_request() {
        let (base_url, hits) = counting_server().await;
        let config = LlmConfig {
            base_url,
            timeout_secs: 5,
            max_retries: 1,
            ..LlmConfig::default()
        };

        let client = OllamaClient::new(&config).unwrap();
        assert!(client.embed("sample").await.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
