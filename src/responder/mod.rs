//! Automated counterpart: the `ReplyGenerator` port and its backends.

pub mod compatible;
pub mod echo;
pub mod factory;
pub mod scrub;
pub mod traits;

pub use compatible::{ChatSettings, OpenAiCompatibleResponder};
pub use echo::EchoResponder;
pub use factory::{create_responder, resolve_api_key};
pub use traits::{ReplyFuture, ReplyGenerator, ReplyRequest};
