//! Two-party chat sessions: matching, message relay and guess scoring.

pub mod registry;
pub mod types;
pub mod validate;

pub use registry::{FALLBACK_REPLY, MAX_PARTICIPANTS, SessionRegistry};
pub use types::{
    AnswerOutcome, JoinOutcome, JoinStatus, RegistryStats, SessionInfo, SessionKind, StoredMessage,
};
