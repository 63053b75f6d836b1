use super::compatible::{ChatSettings, OpenAiCompatibleResponder};
use super::echo::EchoResponder;
use super::traits::ReplyGenerator;
use crate::config::{ResponderConfig, ResponderProvider};
use anyhow::Context;
use std::sync::Arc;

/// Resolve the API key for a responder backend.
///
/// Resolution order:
/// 1. Explicit `api_key` from config (trimmed, ignored if empty)
/// 2. Provider-specific environment variable (`OPENAI_API_KEY`, `OPENROUTER_API_KEY`)
/// 3. Generic fallback variables (`BLINDCHAT_API_KEY`, `API_KEY`)
pub fn resolve_api_key(provider: ResponderProvider, explicit_api_key: Option<&str>) -> Option<String> {
    if let Some(key) = explicit_api_key.map(str::trim).filter(|k| !k.is_empty()) {
        return Some(key.to_string());
    }

    let provider_env_candidates: &[&str] = match provider {
        ResponderProvider::OpenAi => &["OPENAI_API_KEY"],
        ResponderProvider::OpenRouter => &["OPENROUTER_API_KEY"],
        ResponderProvider::Compatible | ResponderProvider::Echo => &[],
    };

    provider_env_candidates
        .iter()
        .chain(["BLINDCHAT_API_KEY", "API_KEY"].iter())
        .find_map(|env_var| {
            std::env::var(env_var)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
}

/// Build the reply generator described by `[responder]`.
pub fn create_responder(config: &ResponderConfig) -> anyhow::Result<Arc<dyn ReplyGenerator>> {
    if config.provider == ResponderProvider::Echo {
        return Ok(Arc::new(EchoResponder::new()));
    }

    let base_url = config.resolved_base_url().with_context(|| {
        format!("responder.base_url is required for provider {}", config.provider)
    })?;
    let api_key = resolve_api_key(config.provider, config.api_key.as_deref());
    if api_key.is_none() {
        tracing::warn!(
            provider = %config.provider,
            "no API key found; automated replies will use the fallback text"
        );
    }

    let settings = ChatSettings {
        model: config.model.clone(),
        temperature: config.temperature,
        system_prompt: config.system_prompt.clone(),
        timeout_secs: config.timeout_secs,
    };

    Ok(Arc::new(OpenAiCompatibleResponder::new(
        &config.provider.to_string(),
        base_url,
        api_key.as_deref(),
        settings,
    )))
}
