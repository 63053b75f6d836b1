use serde::{Deserialize, Serialize};

/// Rules for pairing participants and bounding what they may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Session ids starting with this prefix wait for a second human.
    /// Every other session id is paired with the automated responder.
    #[serde(default = "default_human_session_prefix")]
    pub human_session_prefix: String,
    /// Reserved prefix for synthesized responder identities.
    /// Human user ids may not start with it.
    #[serde(default = "default_automated_id_prefix")]
    pub automated_id_prefix: String,
    /// Maximum message length in characters.
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

fn default_human_session_prefix() -> String {
    "human".into()
}

fn default_automated_id_prefix() -> String {
    "ai-".into()
}

fn default_max_message_chars() -> usize {
    2000
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            human_session_prefix: default_human_session_prefix(),
            automated_id_prefix: default_automated_id_prefix(),
            max_message_chars: default_max_message_chars(),
        }
    }
}

impl MatchingConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.human_session_prefix.trim().is_empty() {
            anyhow::bail!("matching.human_session_prefix must not be empty");
        }
        if self.automated_id_prefix.trim().is_empty() {
            anyhow::bail!("matching.automated_id_prefix must not be empty");
        }
        if self.max_message_chars == 0 {
            anyhow::bail!("matching.max_message_chars must be greater than 0");
        }
        Ok(())
    }
}
