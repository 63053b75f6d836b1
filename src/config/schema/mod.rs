mod core;
mod gateway;
mod matching;
mod responder;

pub use self::core::Config;
#[cfg(test)]
pub(crate) use self::core::test_env;
pub use gateway::GatewayConfig;
pub use matching::MatchingConfig;
pub use responder::{ResponderConfig, ResponderProvider};
