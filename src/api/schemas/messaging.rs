use crate::domain::message::{self, MessageDraft};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Deserialize)]
pub struct SendMessage {
    /// Optional; defaults to the authenticated caller.
    pub from_username: Option<String>,
    pub to_username: String,
    pub body: String,
}

impl From<SendMessage> for MessageDraft {
    fn from(payload: SendMessage) -> Self {
        Self { from_username: payload.from_username, to_username: payload.to_username, body: payload.body }
    }
}

/// `{"message": ...}` wrapper shared by the read and send responses.
#[derive(Serialize)]
pub struct MessageEnvelope<T> {
    pub message: T,
}

/// `{"readMsg": ...}` wrapper returned by mark-read. Existing clients key on this name.
#[derive(Serialize)]
pub struct ReadEnvelope {
    #[serde(rename = "readMsg")]
    pub read_msg: ReadReceipt,
}

#[derive(Serialize)]
pub struct UserSummary {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl From<message::UserSummary> for UserSummary {
    fn from(user: message::UserSummary) -> Self {
        Self { username: user.username, first_name: user.first_name, last_name: user.last_name, phone: user.phone }
    }
}

#[derive(Serialize)]
pub struct MessageDetail {
    pub id: i64,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub read_at: Option<OffsetDateTime>,
    pub from_user: UserSummary,
    pub to_user: UserSummary,
}

impl From<message::MessageDetail> for MessageDetail {
    fn from(detail: message::MessageDetail) -> Self {
        Self {
            id: detail.id,
            body: detail.body,
            sent_at: detail.sent_at,
            read_at: detail.read_at,
            from_user: detail.from_user.into(),
            to_user: detail.to_user.into(),
        }
    }
}

#[derive(Serialize)]
pub struct SentMessage {
    pub id: i64,
    pub from_username: String,
    pub to_username: String,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
}

impl From<message::Message> for SentMessage {
    fn from(msg: message::Message) -> Self {
        Self {
            id: msg.id,
            from_username: msg.from_username,
            to_username: msg.to_username,
            body: msg.body,
            sent_at: msg.sent_at,
        }
    }
}

#[derive(Serialize)]
pub struct ReadReceipt {
    pub id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub read_at: OffsetDateTime,
}

impl From<message::ReadReceipt> for ReadReceipt {
    fn from(receipt: message::ReadReceipt) -> Self {
        Self { id: receipt.id, read_at: receipt.read_at }
    }
}
