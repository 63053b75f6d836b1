use crate::chat::StoredMessage;
use crate::error::SessionError;
use axum::{
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use super::{
    AnswerBody, AppState, JoinBody, MessageBody, ReceiveFormat, ReceiveQuery, UserBody, UserQuery,
};

/// Error surface for every route: a registry failure or an unreadable body.
#[derive(Debug)]
pub enum ApiError {
    Session(SessionError),
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        Self::Session(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Session(SessionError::InvalidArgument(msg)) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Session(SessionError::NotFound(msg)) => (StatusCode::NOT_FOUND, msg),
            ApiError::Session(SessionError::ResourceExhausted(msg)) => (StatusCode::CONFLICT, msg),
            ApiError::Session(SessionError::FailedPrecondition(msg)) => {
                (StatusCode::PRECONDITION_FAILED, msg)
            }
            ApiError::Session(SessionError::Internal(msg)) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// GET /health: liveness plus registry counters
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.registry.stats();
    Json(serde_json::json!({
        "status": "ok",
        "sessions": stats.sessions,
        "participants": stats.participants,
        "waiting": stats.waiting,
    }))
}

/// POST /session/join
pub(super) async fn handle_join(
    State(state): State<AppState>,
    body: Result<Json<JoinBody>, JsonRejection>,
) -> ApiResult<crate::chat::JoinOutcome> {
    let Json(body) = body?;
    let outcome = state.registry.join_or_create(&body.user_id, &body.session_id)?;
    Ok(Json(outcome))
}

/// POST /session/message: returns once any automated reply is stored
pub(super) async fn handle_message(
    State(state): State<AppState>,
    body: Result<Json<MessageBody>, JsonRejection>,
) -> ApiResult<serde_json::Value> {
    let Json(body) = body?;
    state.registry.send_message(&body.user_id, &body.text).await?;
    Ok(Json(serde_json::json!({"status": "sent"})))
}

#[derive(Serialize)]
#[serde(untagged)]
enum ReceivedMessages {
    Full(Vec<StoredMessage>),
    Text(Vec<String>),
}

/// POST /session/receive: drains the caller's pending messages
pub(super) async fn handle_receive(
    State(state): State<AppState>,
    Query(query): Query<ReceiveQuery>,
    body: Result<Json<UserBody>, JsonRejection>,
) -> ApiResult<serde_json::Value> {
    let Json(body) = body?;
    let messages = state.registry.receive_messages(&body.user_id).await?;
    let messages = match query.format {
        ReceiveFormat::Full => ReceivedMessages::Full(messages),
        ReceiveFormat::Text => ReceivedMessages::Text(
            messages
                .into_iter()
                .map(|message| message.text().to_string())
                .collect(),
        ),
    };
    Ok(Json(serde_json::json!({ "messages": messages })))
}

/// POST /session/answer
pub(super) async fn handle_answer(
    State(state): State<AppState>,
    body: Result<Json<AnswerBody>, JsonRejection>,
) -> ApiResult<crate::chat::AnswerOutcome> {
    let Json(body) = body?;
    let outcome = state.registry.submit_answer(&body.user_id, body.guess)?;
    Ok(Json(outcome))
}

/// POST /session/leave
pub(super) async fn handle_leave(
    State(state): State<AppState>,
    body: Result<Json<UserBody>, JsonRejection>,
) -> ApiResult<serde_json::Value> {
    let Json(body) = body?;
    state.registry.leave_session(&body.user_id)?;
    Ok(Json(serde_json::json!({"status": "left"})))
}

/// GET /session/info?user_id=
pub(super) async fn handle_info(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<crate::chat::SessionInfo> {
    let info = state.registry.session_info(&query.user_id).await?;
    Ok(Json(info))
}

/// GET /session/pending?user_id=
pub(super) async fn handle_pending(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<serde_json::Value> {
    let pending = state.registry.pending_count(&query.user_id).await?;
    Ok(Json(serde_json::json!({ "pending": pending })))
}
