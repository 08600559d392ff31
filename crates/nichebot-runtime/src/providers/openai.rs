//! OpenAI-compatible chat-completions provider.
//!
//! Serves both OpenAI itself and DeepSeek, which speaks the same wire format
//! behind a different base URL, key, and default model.
//!
//! ## Security
//!
//! Credentials go through the centralized [`ApiCredential`] wrapper; the raw
//! key is only read at the point the Authorization header is built.

use super::{
    factory::ProviderFactory,
    secrets::{ApiCredential, CredentialSource},
    ChatMessage, GenerationConfig, GenerationResponse, ProviderError, TextGenerator, TokenUsage,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable name for the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable name for the DeepSeek API key.
pub const DEEPSEEK_API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[cfg(feature = "deepseek")]
const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";

/// Chat-completions provider for OpenAI-compatible APIs.
pub struct OpenAiProvider {
    credential: ApiCredential,
    base_url: String,
    provider_name: &'static str,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("provider_name", &self.provider_name)
            .finish()
    }
}

impl OpenAiProvider {
    /// Create a provider talking to api.openai.com.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            credential: ApiCredential::new(
                api_key,
                CredentialSource::Programmatic,
                "OpenAI API key",
            ),
            base_url: OPENAI_BASE_URL.to_string(),
            provider_name: "openai",
        }
    }

    /// Create from `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self, ProviderError> {
        let credential = ApiCredential::from_env(OPENAI_API_KEY_ENV, "OpenAI API key")?;
        Ok(Self {
            credential,
            base_url: OPENAI_BASE_URL.to_string(),
            provider_name: "openai",
        })
    }

    /// Create from JSON configuration with environment fallback.
    pub fn from_config(config: &JsonValue) -> Result<Self, ProviderError> {
        Self::from_config_with(
            config,
            OPENAI_API_KEY_ENV,
            "OpenAI API key",
            OPENAI_BASE_URL,
            "openai",
        )
    }

    fn from_config_with(
        config: &JsonValue,
        env_var: &str,
        key_name: &'static str,
        default_base: &str,
        provider_name: &'static str,
    ) -> Result<Self, ProviderError> {
        let credential =
            ApiCredential::from_config_or_env(config, "api_key", env_var, key_name)?;
        let base_url = config["base_url"]
            .as_str()
            .unwrap_or(default_base)
            .to_string();

        Ok(Self {
            credential,
            base_url,
            provider_name,
        })
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn client(&self) -> &reqwest::Client {
        static CLIENT: std::sync::OnceLock<reqwest::Client> = std::sync::OnceLock::new();
        CLIENT.get_or_init(|| {
            reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client")
        })
    }
}

/// Chat-completions request format.
#[derive(Debug, Serialize)]
struct CompletionsRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

/// Chat-completions response format.
#[derive(Debug, Deserialize)]
struct CompletionsResponse {
    choices: Vec<Choice>,
    model: String,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionsError {
    error: CompletionsErrorDetail,
}

#[derive(Debug, Deserialize)]
struct CompletionsErrorDetail {
    message: String,
}

#[async_trait]
impl TextGenerator for OpenAiProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &GenerationConfig,
    ) -> Result<GenerationResponse, ProviderError> {
        let request = CompletionsRequest {
            model: config.model.clone(),
            messages: messages
                .into_iter()
                .map(|m| WireMessage {
                    role: m.role,
                    content: m.content,
                })
                .collect(),
            max_tokens: config.max_tokens,
            temperature: Some(config.temperature),
        };

        // The credential is only exposed here, at the point of use.
        let response = self
            .client()
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.credential.expose())
            .header("content-type", "application/json")
            .timeout(config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(config.timeout)
                } else {
                    ProviderError::HttpError(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthError);
        }

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(ProviderError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let error_body = response
                .json::<CompletionsError>()
                .await
                .map_err(|e| ProviderError::ParseError(e.to_string()))?;

            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: error_body.error.message,
            });
        }

        let body: CompletionsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ParseError("response has no choices".to_string()))?;

        let usage = body.usage.unwrap_or(WireUsage {
            prompt_tokens: 0,
            completion_tokens: 0,
        });

        Ok(GenerationResponse {
            content: choice.message.content.unwrap_or_default(),
            usage: TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
            },
            model: body.model,
            finish_reason: choice.finish_reason,
        })
    }

    async fn health_check(&self) -> bool {
        !self.credential.is_empty()
    }

    fn name(&self) -> &str {
        self.provider_name
    }
}

/// Factory for the OpenAI backend.
///
/// ## Configuration Format
/// ```json
/// {
///   "api_key": "sk-...",        // Optional, falls back to OPENAI_API_KEY env
///   "base_url": "https://...",  // Optional, custom endpoint
///   "model": "gpt-4o-mini"      // Optional, default model
/// }
/// ```
pub struct OpenAiProviderFactory;

impl ProviderFactory for OpenAiProviderFactory {
    fn provider_type(&self) -> &'static str {
        "openai"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn TextGenerator>, ProviderError> {
        Ok(Arc::new(OpenAiProvider::from_config(config)?))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        if !ApiCredential::is_available(config, "api_key", OPENAI_API_KEY_ENV) {
            return Err(ProviderError::NotConfigured(format!(
                "OpenAI API key required: set 'api_key' in config or {} env",
                OPENAI_API_KEY_ENV
            )));
        }
        validate_base_url(config)
    }

    fn default_config(&self) -> JsonValue {
        serde_json::json!({ "model": "gpt-4o-mini" })
    }

    fn description(&self) -> &'static str {
        "OpenAI chat-completions provider"
    }
}

/// Factory for DeepSeek (OpenAI-compatible wire format).
#[cfg(feature = "deepseek")]
pub struct DeepSeekProviderFactory;

#[cfg(feature = "deepseek")]
impl ProviderFactory for DeepSeekProviderFactory {
    fn provider_type(&self) -> &'static str {
        "deepseek"
    }

    fn create(&self, config: &JsonValue) -> Result<Arc<dyn TextGenerator>, ProviderError> {
        let provider = OpenAiProvider::from_config_with(
            config,
            DEEPSEEK_API_KEY_ENV,
            "DeepSeek API key",
            DEEPSEEK_BASE_URL,
            "deepseek",
        )?;
        Ok(Arc::new(provider))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        if !ApiCredential::is_available(config, "api_key", DEEPSEEK_API_KEY_ENV) {
            return Err(ProviderError::NotConfigured(format!(
                "DeepSeek API key required: set 'api_key' in config or {} env",
                DEEPSEEK_API_KEY_ENV
            )));
        }
        validate_base_url(config)
    }

    fn default_config(&self) -> JsonValue {
        serde_json::json!({ "model": "deepseek-chat" })
    }

    fn description(&self) -> &'static str {
        "DeepSeek provider (OpenAI-compatible API)"
    }
}

fn validate_base_url(config: &JsonValue) -> Result<(), ProviderError> {
    if let Some(url) = config["base_url"].as_str() {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ProviderError::NotConfigured(
                "base_url must start with http:// or https://".to_string(),
            ));
        }
    }
    Ok(())
}
