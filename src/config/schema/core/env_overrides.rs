use super::Config;
use crate::config::ResponderProvider;
use std::str::FromStr;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port_str) =
            std::env::var("BLINDCHAT_GATEWAY_PORT").or_else(|_| std::env::var("PORT"))
            && let Ok(port) = port_str.parse::<u16>()
        {
            self.gateway.port = port;
        }

        if let Ok(host) = std::env::var("BLINDCHAT_GATEWAY_HOST").or_else(|_| std::env::var("HOST"))
            && !host.is_empty()
        {
            self.gateway.host = host;
        }

        if let Ok(provider) = std::env::var("BLINDCHAT_PROVIDER") {
            match ResponderProvider::from_str(provider.trim()) {
                Ok(provider) => self.responder.provider = provider,
                Err(_) => tracing::warn!(
                    provider = provider.as_str(),
                    "ignoring unknown BLINDCHAT_PROVIDER"
                ),
            }
        }

        if let Ok(model) = std::env::var("BLINDCHAT_MODEL")
            && !model.is_empty()
        {
            self.responder.model = model;
        }

        if let Ok(key) = std::env::var("BLINDCHAT_API_KEY")
            && !key.is_empty()
        {
            self.responder.api_key = Some(key);
        }

        if let Ok(url) = std::env::var("BLINDCHAT_RESPONDER_URL")
            && !url.is_empty()
        {
            self.responder.base_url = Some(url);
        }

        if let Ok(temp_str) = std::env::var("BLINDCHAT_TEMPERATURE")
            && let Ok(temp) = temp_str.parse::<f64>()
            && (0.0..=2.0).contains(&temp)
        {
            self.responder.temperature = temp;
        }
    }
}
