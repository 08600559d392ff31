//! Runtime configuration.
//!
//! Everything is read from the environment once at startup and validated
//! immediately; a bad value fails the process before any request runs, not
//! in the middle of one.

use std::time::Duration;
use thiserror::Error;

use crate::providers::GenerationConfig;

/// Configuration problems, raised at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("MIN_AUTO_PUBLISH_SCORE must be an integer in 0..=100, got '{0}'")]
    InvalidMinScore(String),

    #[error("MAX_DAILY_POSTS must be a positive integer, got '{0}'")]
    InvalidDailyLimit(String),

    #[error("GENERATION_TIMEOUT is not a valid duration (e.g. '30s', '2m'): '{0}'")]
    InvalidTimeout(String),

    #[error("DEFAULT_LANGUAGE must be 'tr' or 'en', got '{0}'")]
    InvalidLanguage(String),

    #[error("LLM_PROVIDER must be one of openai, deepseek; got '{0}'")]
    UnknownProvider(String),
}

/// Output language for generated content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Tr,
    En,
}

/// Which provider backend the runtime should construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    DeepSeek,
}

impl ProviderKind {
    /// Registry type name for [`crate::providers::ProviderRegistry`].
    pub fn type_name(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::DeepSeek => "deepseek",
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::DeepSeek => "deepseek-chat",
        }
    }
}

/// Validated runtime settings.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub provider: ProviderKind,
    /// Model override; falls back to the provider's default.
    pub model: Option<String>,
    pub min_auto_publish_score: u8,
    pub max_daily_posts: u32,
    pub default_language: Language,
    pub generation_timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            model: None,
            min_auto_publish_score: 65,
            max_daily_posts: 5,
            default_language: Language::Tr,
            generation_timeout: Duration::from_secs(30),
            max_tokens: 700,
            temperature: 0.8,
        }
    }
}

impl RuntimeConfig {
    /// Build from process environment variables, validating everything.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary lookup. Tests inject closures here instead of
    /// mutating the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let provider = match lookup("LLM_PROVIDER").map(|v| v.trim().to_lowercase()) {
            None => defaults.provider,
            Some(ref v) if v.is_empty() || v == "openai" => ProviderKind::OpenAi,
            Some(ref v) if v == "deepseek" => ProviderKind::DeepSeek,
            Some(other) => return Err(ConfigError::UnknownProvider(other)),
        };

        let min_auto_publish_score = match lookup("MIN_AUTO_PUBLISH_SCORE") {
            None => defaults.min_auto_publish_score,
            Some(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|v| *v <= 100)
                .ok_or(ConfigError::InvalidMinScore(raw))?,
        };

        let max_daily_posts = match lookup("MAX_DAILY_POSTS") {
            None => defaults.max_daily_posts,
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or(ConfigError::InvalidDailyLimit(raw))?,
        };

        let default_language = match lookup("DEFAULT_LANGUAGE").map(|v| v.trim().to_lowercase()) {
            None => defaults.default_language,
            Some(ref v) if v == "tr" => Language::Tr,
            Some(ref v) if v == "en" => Language::En,
            Some(other) => return Err(ConfigError::InvalidLanguage(other)),
        };

        let generation_timeout = match lookup("GENERATION_TIMEOUT") {
            None => defaults.generation_timeout,
            Some(raw) => humantime::parse_duration(raw.trim())
                .map_err(|_| ConfigError::InvalidTimeout(raw))?,
        };

        let model = lookup(match provider {
            ProviderKind::OpenAi => "OPENAI_MODEL",
            ProviderKind::DeepSeek => "DEEPSEEK_MODEL",
        })
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

        Ok(Self {
            provider,
            model,
            min_auto_publish_score,
            max_daily_posts,
            default_language,
            generation_timeout,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
        })
    }

    /// Per-request provider settings derived from this config.
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            model: self
                .model
                .clone()
                .unwrap_or_else(|| self.provider.default_model().to_string()),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: self.generation_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_with_empty_environment() {
        let config = RuntimeConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.min_auto_publish_score, 65);
        assert_eq!(config.max_daily_posts, 5);
        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert_eq!(config.default_language, Language::Tr);
        assert_eq!(config.generation_config().model, "gpt-4o-mini");
    }

    #[test]
    fn min_score_is_range_checked() {
        let over = RuntimeConfig::from_lookup(lookup_from(&[("MIN_AUTO_PUBLISH_SCORE", "101")]));
        assert!(matches!(over, Err(ConfigError::InvalidMinScore(_))));

        let junk = RuntimeConfig::from_lookup(lookup_from(&[("MIN_AUTO_PUBLISH_SCORE", "high")]));
        assert!(matches!(junk, Err(ConfigError::InvalidMinScore(_))));

        let edge = RuntimeConfig::from_lookup(lookup_from(&[("MIN_AUTO_PUBLISH_SCORE", "100")]))
            .unwrap();
        assert_eq!(edge.min_auto_publish_score, 100);
    }

    #[test]
    fn daily_limit_must_be_positive() {
        let zero = RuntimeConfig::from_lookup(lookup_from(&[("MAX_DAILY_POSTS", "0")]));
        assert!(matches!(zero, Err(ConfigError::InvalidDailyLimit(_))));
    }

    #[test]
    fn timeout_uses_humantime_syntax() {
        let config =
            RuntimeConfig::from_lookup(lookup_from(&[("GENERATION_TIMEOUT", "45s")])).unwrap();
        assert_eq!(config.generation_timeout, Duration::from_secs(45));

        let bad = RuntimeConfig::from_lookup(lookup_from(&[("GENERATION_TIMEOUT", "soon")]));
        assert!(matches!(bad, Err(ConfigError::InvalidTimeout(_))));
    }

    #[test]
    fn deepseek_provider_selects_its_model_default() {
        let config = RuntimeConfig::from_lookup(lookup_from(&[("LLM_PROVIDER", "deepseek")]))
            .unwrap();
        assert_eq!(config.provider, ProviderKind::DeepSeek);
        assert_eq!(config.generation_config().model, "deepseek-chat");
    }

    #[test]
    fn model_override_wins() {
        let config = RuntimeConfig::from_lookup(lookup_from(&[("OPENAI_MODEL", "gpt-4o")]))
            .unwrap();
        assert_eq!(config.generation_config().model, "gpt-4o");
    }

    #[test]
    fn unknown_provider_fails_fast() {
        let result = RuntimeConfig::from_lookup(lookup_from(&[("LLM_PROVIDER", "bard")]));
        assert!(matches!(result, Err(ConfigError::UnknownProvider(_))));
    }
}
