//! Axum-based HTTP gateway over the session registry.
//!
//! One route per registry operation, plus `/health`. The router carries the
//! same hardening on every route:
//! - Request body size limits (64KB max)
//! - Request timeouts (30s) to prevent slow-loris attacks
//! - Optional CORS origin allow-list

mod handlers;
mod server;

pub use handlers::ApiError;
pub use server::run_gateway;
pub use server::run_gateway_with_listener;

use crate::Config;
use crate::chat::{SessionKind, SessionRegistry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Maximum request body size (64KB) -- prevents memory exhaustion
pub const MAX_BODY_SIZE: usize = 65_536;
/// Request timeout (30s) -- prevents slow-loris attacks
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<SessionRegistry>,
}

/// `POST /session/join` body
#[derive(Debug, Deserialize, Serialize)]
pub struct JoinBody {
    pub user_id: String,
    pub session_id: String,
}

/// `POST /session/message` body
#[derive(Debug, Deserialize, Serialize)]
pub struct MessageBody {
    pub user_id: String,
    pub text: String,
}

/// Body shared by `/session/receive` and `/session/leave`
#[derive(Debug, Deserialize, Serialize)]
pub struct UserBody {
    pub user_id: String,
}

/// `POST /session/answer` body
#[derive(Debug, Deserialize, Serialize)]
pub struct AnswerBody {
    pub user_id: String,
    pub guess: SessionKind,
}

/// `?user_id=` for the read-only routes
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

/// How `/session/receive` renders each message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiveFormat {
    /// Full records: author, sender, text and timestamp.
    #[default]
    Full,
    /// Bare message text only.
    Text,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReceiveQuery {
    #[serde(default)]
    pub format: ReceiveFormat,
}
