//! Secure credential handling for text-generation providers.
//!
//! Centralized, type-safe handling of API keys:
//!
//! - **No accidental logging**: credentials cannot appear in Debug output
//! - **Memory safety**: values are zeroed on drop via the `secrecy` crate
//! - **Explicit exposure**: the raw key is only reachable through `.expose()`
//!
//! ```ignore
//! let cred = ApiCredential::from_env("OPENAI_API_KEY", "OpenAI API key")?;
//! request.header("authorization", format!("Bearer {}", cred.expose()));
//! ```

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value as JsonValue;
use std::fmt;

use super::ProviderError;

/// Where a credential was loaded from.
///
/// Useful for debugging configuration issues without exposing the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Loaded from configuration JSON
    Config,
    /// Loaded from an environment variable
    Environment,
    /// Provided programmatically
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Config => write!(f, "config"),
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// A securely-stored API credential.
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    /// Wrap a raw key. After this point the value cannot be logged by
    /// accident.
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Load a credential from an environment variable.
    pub fn from_env(env_var: &str, name: &'static str) -> Result<Self, ProviderError> {
        std::env::var(env_var)
            .map(|v| Self::new(v, CredentialSource::Environment, name))
            .map_err(|_| {
                ProviderError::NotConfigured(format!(
                    "{} not set: configure '{}' environment variable",
                    name, env_var
                ))
            })
    }

    /// Load from JSON config, falling back to an environment variable.
    pub fn from_config_or_env(
        config: &JsonValue,
        config_key: &str,
        env_var: &str,
        name: &'static str,
    ) -> Result<Self, ProviderError> {
        if let Some(value) = config[config_key].as_str() {
            if !value.trim().is_empty() {
                return Ok(Self::new(value, CredentialSource::Config, name));
            }
        }
        Self::from_env(env_var, name)
    }

    /// True when either the config key or the environment variable could
    /// supply a value. Used for startup validation without loading.
    pub fn is_available(config: &JsonValue, config_key: &str, env_var: &str) -> bool {
        config[config_key]
            .as_str()
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false)
            || std::env::var(env_var).map(|v| !v.is_empty()).unwrap_or(false)
    }

    /// Expose the raw key. Call this only at the point of use.
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_the_value() {
        let cred = ApiCredential::new("sk-very-secret", CredentialSource::Programmatic, "test key");
        let debug = format!("{:?}", cred);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn expose_returns_the_raw_value() {
        let cred = ApiCredential::new("sk-raw", CredentialSource::Programmatic, "test key");
        assert_eq!(cred.expose(), "sk-raw");
        assert!(!cred.is_empty());
    }

    #[test]
    fn config_value_wins_over_env() {
        let config = serde_json::json!({ "api_key": "from-config" });
        let cred = ApiCredential::from_config_or_env(
            &config,
            "api_key",
            "NICHEBOT_TEST_UNSET_ENV_VAR",
            "test key",
        )
        .unwrap();
        assert_eq!(cred.expose(), "from-config");
        assert_eq!(cred.source(), CredentialSource::Config);
    }

    #[test]
    fn missing_everywhere_is_not_configured() {
        let config = serde_json::json!({});
        let result = ApiCredential::from_config_or_env(
            &config,
            "api_key",
            "NICHEBOT_TEST_UNSET_ENV_VAR",
            "test key",
        );
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }
}
