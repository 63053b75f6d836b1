//! Reply generator backed by any OpenAI-compatible `/chat/completions` API.
//! OpenAI, OpenRouter, Ollama, vLLM and most hosted gateways speak it.

use super::scrub::sanitize_api_error;
use super::traits::{ReplyFuture, ReplyGenerator, ReplyRequest};
use crate::chat::StoredMessage;
use crate::error::ResponderError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Sampling and persona settings for one responder instance.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub model: String,
    pub temperature: f64,
    pub system_prompt: String,
    pub timeout_secs: u64,
}

pub struct OpenAiCompatibleResponder {
    pub(crate) name: String,
    /// Pre-computed `"Bearer <key>"` header value (avoids `format!` per request).
    cached_auth_header: Option<String>,
    /// Pre-computed chat completions URL (avoids `format!` per request).
    cached_chat_url: String,
    /// Lightweight endpoint hit once at startup to open the connection pool.
    cached_models_url: String,
    settings: ChatSettings,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}

impl OpenAiCompatibleResponder {
    pub fn new(name: &str, base_url: &str, api_key: Option<&str>, settings: ChatSettings) -> Self {
        let base_url = base_url.trim_end_matches('/');
        let root = base_url
            .strip_suffix("/chat/completions")
            .unwrap_or(base_url);
        let cached_chat_url = format!("{root}/chat/completions");
        let cached_models_url = format!("{root}/models");

        Self {
            name: name.to_string(),
            cached_auth_header: api_key.map(|k| format!("Bearer {k}")),
            cached_chat_url,
            cached_models_url,
            client: build_client(settings.timeout_secs),
            settings,
        }
    }

    fn chat_completions_url(&self) -> &str {
        &self.cached_chat_url
    }

    /// Map the transcript onto chat roles from the responder's point of view:
    /// its own earlier lines are `assistant`, the human's are `user`.
    fn build_request<'a>(&'a self, request: &ReplyRequest<'a>) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(request.history.len() + 2);

        messages.push(Message {
            role: "system",
            content: &self.settings.system_prompt,
        });

        for turn in request.history {
            let role = match turn {
                StoredMessage::Human { .. } => "user",
                StoredMessage::Automated { .. } => "assistant",
            };
            messages.push(Message {
                role,
                content: turn.text(),
            });
        }

        messages.push(Message {
            role: "user",
            content: request.latest,
        });

        ChatRequest {
            model: &self.settings.model,
            messages,
            temperature: self.settings.temperature,
        }
    }

    async fn complete(&self, request: ReplyRequest<'_>) -> Result<String, ResponderError> {
        let Some(auth_header) = self.cached_auth_header.as_deref() else {
            return Err(ResponderError::NotConfigured {
                provider: self.name.clone(),
                reason: "API key not set; set it in config.toml or via env".into(),
            });
        };

        let body = self.build_request(&request);
        let response = self
            .client
            .post(self.chat_completions_url())
            .header("Authorization", auth_header)
            .json(&body)
            .send()
            .await
            .map_err(|error| ResponderError::Request {
                provider: self.name.clone(),
                message: sanitize_api_error(&error.to_string()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
            return Err(ResponderError::Api {
                provider: self.name.clone(),
                status: status.as_u16(),
                message: sanitize_api_error(&error),
            });
        }

        let chat_response: ChatResponse =
            response
                .json()
                .await
                .map_err(|error| ResponderError::Request {
                    provider: self.name.clone(),
                    message: format!("JSON decode failed: {error}"),
                })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| ResponderError::EmptyReply {
                provider: self.name.clone(),
            })
    }
}

impl ReplyGenerator for OpenAiCompatibleResponder {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate<'a>(&'a self, request: ReplyRequest<'a>) -> ReplyFuture<'a> {
        Box::pin(async move { self.complete(request).await })
    }

    fn warmup(&self) -> Pin<Box<dyn Future<Output = Result<(), ResponderError>> + Send + '_>> {
        Box::pin(async move {
            let Some(auth_header) = self.cached_auth_header.as_ref() else {
                return Ok(());
            };
            let response = self
                .client
                .get(&self.cached_models_url)
                .header("Authorization", auth_header)
                .send()
                .await
                .map_err(|e| ResponderError::Request {
                    provider: self.name.clone(),
                    message: sanitize_api_error(&e.to_string()),
                })?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ResponderError::Api {
                    provider: self.name.clone(),
                    status: status.as_u16(),
                    message: sanitize_api_error(&body),
                });
            }
            Ok(())
        })
    }
}
