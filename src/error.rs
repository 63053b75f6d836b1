use thiserror::Error;

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Session registry errors ────────────────────────────────────────────────

/// Failures surfaced by registry operations.
///
/// Every variant reaches the caller; none are swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The user or session has no active mapping.
    #[error("not found: {0}")]
    NotFound(String),

    /// The session already holds two participants.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// The operation is not valid in the session's current state.
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),

    /// A caller-supplied identifier or message is malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Registry bookkeeping is inconsistent.
    #[error("internal: {0}")]
    Internal(String),
}

// ─── Reply generator errors ─────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("responder {provider} request failed: {message}")]
    Request { provider: String, message: String },

    #[error("responder {provider} returned {status}: {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("responder {provider} returned an empty reply")]
    EmptyReply { provider: String },

    #[error("reply generation timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("responder {provider} is not configured: {reason}")]
    NotConfigured { provider: String, reason: String },
}
