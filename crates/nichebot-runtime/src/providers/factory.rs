//! Provider factory pattern for dynamic backend registration.
//!
//! New backends register a factory; callers create providers by type name
//! from configuration without touching an enum anywhere.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::{ProviderError, TextGenerator};

/// Factory for creating providers from configuration.
///
/// Each factory is responsible for validating its configuration format,
/// creating instances, and providing a unique type identifier.
pub trait ProviderFactory: Send + Sync {
    /// Unique identifier, e.g. "openai" or "deepseek".
    fn provider_type(&self) -> &'static str;

    /// Create a provider instance from JSON configuration.
    fn create(&self, config: &JsonValue) -> Result<Arc<dyn TextGenerator>, ProviderError>;

    /// Validate configuration without creating a provider. Used for fast
    /// startup validation.
    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError>;

    /// Default configuration for optional fields.
    fn default_config(&self) -> JsonValue {
        serde_json::json!({})
    }

    /// Human-readable description.
    fn description(&self) -> &'static str {
        "Text-generation provider"
    }
}

/// Registry of available provider factories.
///
/// BTreeMap keeps listing order deterministic.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory; an existing factory with the same type is
    /// replaced.
    pub fn register(&mut self, factory: Arc<dyn ProviderFactory>) {
        self.factories
            .insert(factory.provider_type().to_string(), factory);
    }

    /// Create a provider by type name.
    pub fn create(
        &self,
        provider_type: &str,
        config: &JsonValue,
    ) -> Result<Arc<dyn TextGenerator>, ProviderError> {
        let factory = self.factories.get(provider_type).ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "Unknown provider '{}' (available: {})",
                provider_type,
                self.available().join(", ")
            ))
        })?;
        factory.create(config)
    }

    /// Validate configuration for a provider type.
    pub fn validate(&self, provider_type: &str, config: &JsonValue) -> Result<(), ProviderError> {
        let factory = self.factories.get(provider_type).ok_or_else(|| {
            ProviderError::NotConfigured(format!("Unknown provider '{}'", provider_type))
        })?;
        factory.validate_config(config)
    }

    /// Registered provider type names, sorted.
    pub fn available(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ChatMessage, GenerationConfig, GenerationResponse};
    use async_trait::async_trait;

    struct NullProvider;

    #[async_trait]
    impl TextGenerator for NullProvider {
        async fn complete(
            &self,
            _messages: Vec<ChatMessage>,
            _config: &GenerationConfig,
        ) -> Result<GenerationResponse, ProviderError> {
            Err(ProviderError::NotConfigured("null".to_string()))
        }

        async fn health_check(&self) -> bool {
            false
        }

        fn name(&self) -> &str {
            "null"
        }
    }

    struct NullFactory;

    impl ProviderFactory for NullFactory {
        fn provider_type(&self) -> &'static str {
            "null"
        }

        fn create(&self, _config: &JsonValue) -> Result<Arc<dyn TextGenerator>, ProviderError> {
            Ok(Arc::new(NullProvider))
        }

        fn validate_config(&self, _config: &JsonValue) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    #[test]
    fn registry_creates_registered_types() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(NullFactory));

        let provider = registry.create("null", &serde_json::json!({})).unwrap();
        assert_eq!(provider.name(), "null");
    }

    #[test]
    fn unknown_type_lists_available() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(NullFactory));

        let err = registry
            .create("missing", &serde_json::json!({}))
            .unwrap_err();
        assert!(err.to_string().contains("null"));
    }
}
