use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The completion providers the extractor knows how to talk to. Adding a
/// provider means adding a variant and filling in the three tables below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Groq,
    OpenAi,
}

impl Provider {
    pub fn name(self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::OpenAi => "openai",
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Groq => "https://api.groq.com/openai/v1/chat/completions",
            Self::OpenAi => "https://api.openai.com/v1/chat/completions",
        }
    }

    pub fn model(self) -> &'static str {
        match self {
            Self::Groq => "llama-3.3-70b-versatile",
            Self::OpenAi => "gpt-4o",
        }
    }

    pub fn key_env(self) -> &'static str {
        match self {
            Self::Groq => "GROQ_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }

    /// Whether the provider honors `response_format: {"type": "json_object"}`.
    pub fn supports_json_mode(self) -> bool {
        matches!(self, Self::OpenAi)
    }
}

/// Everything the completion client needs, fixed at construction. Built once
/// per pipeline so concurrent extractions never share ambient state.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub provider: Provider,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            temperature: 0.1,
            max_tokens: 4000,
            timeout: Duration::from_secs(120),
        }
    }

    /// Resolve a config from an explicit key override or the provider's
    /// environment variable. An empty string counts as missing.
    pub fn resolve(provider: Provider, key_override: Option<String>) -> Result<Self, ExtractError> {
        let api_key = key_override
            .filter(|key| !key.is_empty())
            .or_else(|| {
                std::env::var(provider.key_env())
                    .ok()
                    .filter(|key| !key.is_empty())
            })
            .ok_or(ExtractError::Configuration {
                provider: provider.name(),
                env_var: provider.key_env(),
            })?;
        Ok(Self::new(provider, api_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_tables_are_consistent() {
        assert_eq!(
            Provider::Groq.endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(Provider::Groq.model(), "llama-3.3-70b-versatile");
        assert_eq!(Provider::Groq.key_env(), "GROQ_API_KEY");
        assert!(!Provider::Groq.supports_json_mode());

        assert_eq!(
            Provider::OpenAi.endpoint(),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(Provider::OpenAi.model(), "gpt-4o");
        assert_eq!(Provider::OpenAi.key_env(), "OPENAI_API_KEY");
        assert!(Provider::OpenAi.supports_json_mode());
    }

    #[test]
    fn provider_parses_from_lowercase_names() {
        let groq: Provider = serde_json::from_str("\"groq\"").unwrap();
        let openai: Provider = serde_json::from_str("\"openai\"").unwrap();
        assert_eq!(groq, Provider::Groq);
        assert_eq!(openai, Provider::OpenAi);
    }

    #[test]
    fn explicit_key_wins_over_environment() {
        let config =
            ClientConfig::resolve(Provider::Groq, Some("sk-explicit".to_string())).unwrap();
        assert_eq!(config.api_key, "sk-explicit");
        assert_eq!(config.max_tokens, 4000);
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn empty_override_counts_as_missing() {
        // With no GROQ_API_KEY in the test environment an empty override
        // must fall through to a configuration error, not an empty key.
        if std::env::var("GROQ_API_KEY").is_err() {
            let err = ClientConfig::resolve(Provider::Groq, Some(String::new())).unwrap_err();
            assert!(matches!(err, ExtractError::Configuration { .. }));
        }
    }
}
