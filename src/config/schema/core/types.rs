use super::super::{GatewayConfig, MatchingConfig, ResponderConfig};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub responder: ResponderConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.matching
            .validate()
            .map_err(|e| ConfigError::Validation(format!("invalid [matching] section: {e}")))?;
        self.responder
            .validate()
            .map_err(|e| ConfigError::Validation(format!("invalid [responder] section: {e}")))?;
        Ok(())
    }

    /// Copy safe to print: secrets replaced with a marker.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.responder.api_key.is_some() {
            copy.responder.api_key = Some("***".into());
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResponderProvider;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.gateway.port, 3000);
        assert_eq!(config.matching.human_session_prefix, "human");
        assert_eq!(config.responder.provider, ResponderProvider::OpenRouter);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let raw = r#"
            [responder]
            provider = "echo"
            timeout_secs = 5

            [matching]
            max_message_chars = 280
        "#;
        let config: Config = toml::from_str(raw).unwrap();

        assert_eq!(config.responder.provider, ResponderProvider::Echo);
        assert_eq!(config.responder.timeout_secs, 5);
        assert_eq!(config.responder.model, "openai/gpt-4o-mini");
        assert_eq!(config.matching.max_message_chars, 280);
        assert_eq!(config.matching.automated_id_prefix, "ai-");
    }

    #[test]
    fn validate_names_the_failing_section() {
        let mut config = Config::default();
        config.responder.temperature = -1.0;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        let err = err.to_string();
        assert!(err.contains("[responder]"));
        assert!(err.contains("temperature"));
    }

    #[test]
    fn redacted_hides_api_key() {
        let mut config = Config::default();
        config.responder.api_key = Some("sk-live-secret".into());

        let shown = toml::to_string(&config.redacted()).unwrap();
        assert!(!shown.contains("sk-live-secret"));
        assert!(shown.contains("***"));
        assert_eq!(config.responder.api_key.as_deref(), Some("sk-live-secret"));
    }
}
