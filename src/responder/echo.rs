use super::traits::{ReplyFuture, ReplyGenerator, ReplyRequest};

/// Offline generator that mirrors the human's message back.
///
/// Useful for local runs without an API key; nobody will be fooled by it.
#[derive(Debug, Default)]
pub struct EchoResponder;

impl EchoResponder {
    pub fn new() -> Self {
        Self
    }
}

impl ReplyGenerator for EchoResponder {
    fn name(&self) -> &str {
        "echo"
    }

    fn generate<'a>(&'a self, request: ReplyRequest<'a>) -> ReplyFuture<'a> {
        Box::pin(async move { Ok(format!("you said: {}", request.latest)) })
    }
}
