use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use shared::settings::{GenerationOptions, ModelSettings};
use std::env;
use std::time::Duration;
use url::Url;

/// Upper bound on a single generate call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const TAGS_TIMEOUT: Duration = Duration::from_secs(10);

const NO_RESPONSE: &str = "No response received.";

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Cannot connect to the model server at {endpoint}. Please ensure Ollama is running.")]
    Connect { endpoint: String },

    #[error("The model server did not answer within {0:?}")]
    Timeout(Duration),

    #[error("API Error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Invalid model server response: {0}")]
    Decode(String),

    #[error("Invalid endpoint URL '{0}'")]
    BadEndpoint(String),

    #[error("{0}")]
    Other(String),
}

impl ModelError {
    fn from_reqwest(err: reqwest::Error, endpoint: &str, timeout: Duration) -> Self {
        if err.is_connect() {
            ModelError::Connect {
                endpoint: endpoint.to_string(),
            }
        } else if err.is_timeout() {
            ModelError::Timeout(timeout)
        } else if err.is_decode() {
            ModelError::Decode(err.to_string())
        } else {
            ModelError::Other(err.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a GenerationOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

pub struct OllamaClient {
    http: Client,
    endpoint: String,
    model: String,
    options: GenerationOptions,
}

impl OllamaClient {
    /// `OLLAMA_URL` in the environment overrides the configured endpoint.
    pub fn new(settings: &ModelSettings) -> Result<Self, ModelError> {
        let endpoint = env::var("OLLAMA_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| settings.endpoint.clone());
        Self::with_endpoint(endpoint, settings)
    }

    pub fn with_endpoint(
        endpoint: impl Into<String>,
        settings: &ModelSettings,
    ) -> Result<Self, ModelError> {
        let endpoint = endpoint.into();
        Url::parse(&endpoint).map_err(|_| ModelError::BadEndpoint(endpoint.clone()))?;
        let http = Client::builder()
            .pool_max_idle_per_host(2)
            .build()
            .map_err(|e| ModelError::Other(e.to_string()))?;
        Ok(Self {
            http,
            endpoint,
            model: settings.name.clone(),
            options: settings.options,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Non-streaming completion for an already rendered prompt.
    pub async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let req = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: &self.options,
        };
        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "sending generate request");

        let resp = self
            .http
            .post(&self.endpoint)
            .timeout(REQUEST_TIMEOUT)
            .json(&req)
            .send()
            .await
            .map_err(|e| ModelError::from_reqwest(e, &self.endpoint, REQUEST_TIMEOUT))?;

        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;
        Ok(body.response.unwrap_or_else(|| NO_RESPONSE.to_string()))
    }

    /// Names of the models the server has pulled.
    pub async fn list_models(&self) -> Result<Vec<String>, ModelError> {
        let url = tags_url(&self.endpoint)?;
        let resp = self
            .http
            .get(url.as_str())
            .timeout(TAGS_TIMEOUT)
            .send()
            .await
            .map_err(|e| ModelError::from_reqwest(e, url.as_str(), TAGS_TIMEOUT))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let tags: TagsResponse = resp
            .json()
            .await
            .map_err(|e| ModelError::Decode(e.to_string()))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

/// `http://host:11434/api/generate` -> `http://host:11434/api/tags`
pub fn tags_url(endpoint: &str) -> Result<Url, ModelError> {
    let base = Url::parse(endpoint).map_err(|_| ModelError::BadEndpoint(endpoint.to_string()))?;
    base.join("/api/tags")
        .map_err(|_| ModelError::BadEndpoint(endpoint.to_string()))
}

/// Keep `current` if the server has it, otherwise fall back to the first
/// model the server reports. An empty list keeps `current`.
pub fn pick_model(current: &str, available: &[String]) -> String {
    if available.is_empty() || available.iter().any(|m| m == current) {
        current.to_string()
    } else {
        available[0].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let options = GenerationOptions::default();
        let req = GenerateRequest {
            model: "phi:2.7b",
            prompt: "hi",
            stream: false,
            options: &options,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["model"], "phi:2.7b");
        assert_eq!(v["stream"], false);
        assert_eq!(v["options"]["max_tokens"], 1024);
        let keys: Vec<&String> = v["options"].as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn test_missing_response_field() {
        let body: GenerateResponse = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert!(body.response.is_none());
    }

    #[test]
    fn test_tags_url() {
        let url = tags_url("http://localhost:11434/api/generate").unwrap();
        assert_eq!(url.as_str(), "http://localhost:11434/api/tags");
        assert!(matches!(
            tags_url("not a url"),
            Err(ModelError::BadEndpoint(_))
        ));
    }

    #[test]
    fn test_pick_model() {
        let available = vec!["qwen3:4b".to_string(), "phi:2.7b".to_string()];
        assert_eq!(pick_model("phi:2.7b", &available), "phi:2.7b");
        assert_eq!(pick_model("llama2:7b", &available), "qwen3:4b");
        assert_eq!(pick_model("llama2:7b", &[]), "llama2:7b");
    }

    #[test]
    fn test_status_error_message() {
        let err = ModelError::Status {
            status: 404,
            body: "model not found".into(),
        };
        assert_eq!(err.to_string(), "API Error: 404 - model not found");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_connect_error() {
        // Port 9 (discard) is closed on practically every host.
        let client =
            OllamaClient::with_endpoint("http://127.0.0.1:9/api/generate", &ModelSettings::default())
                .unwrap();
        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, ModelError::Connect { .. }), "{:?}", err);
    }
}
