use crate::api::AppState;
use crate::api::middleware::{AuthUser, JsonBody, MessageIdPath};
use crate::api::schemas::messaging::{MessageDetail, MessageEnvelope, ReadEnvelope, SendMessage, SentMessage};
use crate::error::Result;
use axum::{Json, extract::State, response::IntoResponse};

/// Returns a message with both participants. Caller must be the sender or recipient.
///
/// # Errors
/// Returns `AppError::Unauthorized` if the caller is not a participant.
/// Returns `AppError::NotFound` if the message does not exist.
/// Returns `AppError::BadRequest` if the id is not a number.
pub async fn get_message(
    auth_user: AuthUser,
    State(state): State<AppState>,
    MessageIdPath(id): MessageIdPath,
) -> Result<impl IntoResponse> {
    let message = state.message_service.get_message(&auth_user.username, id).await?;

    Ok(Json(MessageEnvelope { message: MessageDetail::from(message) }))
}

/// Sends a message from the caller.
///
/// # Errors
/// Returns `AppError::Unauthorized` if `from_username` names someone else.
/// Returns `AppError::NotFound` if either user does not exist.
pub async fn send_message(
    auth_user: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SendMessage>,
) -> Result<impl IntoResponse> {
    let message = state.message_service.send_message(&auth_user.username, payload.into()).await?;

    Ok(Json(MessageEnvelope { message: SentMessage::from(message) }))
}

/// Marks a message read. Caller must be the recipient.
///
/// # Errors
/// Returns `AppError::Unauthorized` if the caller is not the recipient.
/// Returns `AppError::NotFound` if the message does not exist.
/// Returns `AppError::BadRequest` if the id is not a number.
pub async fn mark_read(
    auth_user: AuthUser,
    State(state): State<AppState>,
    MessageIdPath(id): MessageIdPath,
) -> Result<impl IntoResponse> {
    let receipt = state.message_service.mark_read(&auth_user.username, id).await?;

    Ok(Json(ReadEnvelope { read_msg: receipt.into() }))
}
