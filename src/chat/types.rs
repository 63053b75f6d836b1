use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Who sits on the other side of a session. Fixed when the session is created.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SessionKind {
    Human,
    Automated,
}

/// A relayed chat line.
///
/// The author variant is the only place the automated flag lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "author", rename_all = "snake_case")]
pub enum StoredMessage {
    Human {
        sender_id: String,
        text: String,
        sent_at: DateTime<Utc>,
    },
    Automated {
        sender_id: String,
        text: String,
        sent_at: DateTime<Utc>,
    },
}

impl StoredMessage {
    pub fn human(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Human {
            sender_id: sender_id.into(),
            text: text.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn automated(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Automated {
            sender_id: sender_id.into(),
            text: text.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn sender_id(&self) -> &str {
        match self {
            Self::Human { sender_id, .. } | Self::Automated { sender_id, .. } => sender_id,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Human { text, .. } | Self::Automated { text, .. } => text,
        }
    }

    pub fn sent_at(&self) -> DateTime<Utc> {
        match self {
            Self::Human { sent_at, .. } | Self::Automated { sent_at, .. } => *sent_at,
        }
    }

    pub fn is_automated(&self) -> bool {
        matches!(self, Self::Automated { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStatus {
    /// The session now has both participants.
    Joined,
    /// The caller is alone and waiting for a peer.
    Waiting,
    /// The caller was already in this session; nothing changed.
    AlreadyIn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinOutcome {
    pub status: JoinStatus,
    pub session_id: String,
    pub participants: usize,
    pub kind: SessionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub actual: SessionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub participants: Vec<String>,
    pub message_count: usize,
    pub kind: SessionKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub sessions: usize,
    pub participants: usize,
    pub waiting: usize,
}
