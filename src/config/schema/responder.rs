use crate::gateway::REQUEST_TIMEOUT_SECS;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Backend that produces the automated participant's replies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResponderProvider {
    #[strum(serialize = "openai")]
    #[serde(rename = "openai")]
    OpenAi,
    #[default]
    #[strum(serialize = "openrouter")]
    #[serde(rename = "openrouter")]
    OpenRouter,
    /// Any OpenAI-compatible endpoint; requires `base_url`.
    Compatible,
    /// Offline echo, for local runs and tests.
    Echo,
}

impl ResponderProvider {
    pub fn default_base_url(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("https://api.openai.com/v1"),
            Self::OpenRouter => Some("https://openrouter.ai/api/v1"),
            Self::Compatible | Self::Echo => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponderConfig {
    #[serde(default)]
    pub provider: ResponderProvider,
    /// Overrides the provider's default endpoint.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Upper bound on a single reply generation before the fallback is used.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_model() -> String {
    "openai/gpt-4o-mini".into()
}

fn default_temperature() -> f64 {
    0.8
}

fn default_timeout_secs() -> u64 {
    20
}

fn default_system_prompt() -> String {
    "You are chatting anonymously with a stranger on a website. \
     Write like a real person texting: short, casual, lowercase is fine, \
     occasional typos are fine. Never say you are an AI or a language model. \
     Keep each reply to one or two sentences."
        .into()
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            provider: ResponderProvider::default(),
            base_url: None,
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl ResponderConfig {
    /// Endpoint the provider should talk to, if it talks to one at all.
    pub fn resolved_base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .or_else(|| self.provider.default_base_url())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            anyhow::bail!(
                "responder.temperature must be within 0.0..=2.0 (got {})",
                self.temperature
            );
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("responder.timeout_secs must be greater than 0");
        }
        // Reply generation must finish inside the gateway request timeout.
        if self.timeout_secs >= REQUEST_TIMEOUT_SECS {
            anyhow::bail!(
                "responder.timeout_secs must be below the {REQUEST_TIMEOUT_SECS}s request timeout (got {})",
                self.timeout_secs
            );
        }
        if self.provider == ResponderProvider::Compatible && self.resolved_base_url().is_none() {
            anyhow::bail!("responder.base_url is required for the compatible provider");
        }
        Ok(())
    }
}
