use crate::chat::StoredMessage;
use crate::error::ResponderError;
use std::future::Future;
use std::pin::Pin;

/// Everything a generator sees for one automated turn.
#[derive(Debug, Clone, Copy)]
pub struct ReplyRequest<'a> {
    pub session_id: &'a str,
    /// Transcript before the latest human message, oldest first.
    pub history: &'a [StoredMessage],
    /// The human message being answered.
    pub latest: &'a str,
}

pub type ReplyFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ResponderError>> + Send + 'a>>;

/// Produces the automated participant's side of a conversation.
pub trait ReplyGenerator: Send + Sync {
    /// Backend identifier (e.g. "openrouter", "echo").
    fn name(&self) -> &str;

    fn generate<'a>(&'a self, request: ReplyRequest<'a>) -> ReplyFuture<'a>;

    /// Warm up the HTTP connection pool.
    fn warmup(&self) -> Pin<Box<dyn Future<Output = Result<(), ResponderError>> + Send + '_>> {
        Box::pin(async move { Ok(()) })
    }
}
