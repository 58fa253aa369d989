use crate::domain::message::{Message, MessageDetail, ReadReceipt, UserSummary};
use crate::domain::user::User;
use time::OffsetDateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct MessageRecord {
    pub id: i64,
    pub from_username: String,
    pub to_username: String,
    pub body: String,
    pub sent_at: OffsetDateTime,
    pub read_at: Option<OffsetDateTime>,
}

impl From<MessageRecord> for Message {
    fn from(record: MessageRecord) -> Self {
        Self {
            id: record.id,
            from_username: record.from_username,
            to_username: record.to_username,
            body: record.body,
            sent_at: record.sent_at,
            read_at: record.read_at,
        }
    }
}

/// Row shape of the message/users join used for detail reads.
#[derive(sqlx::FromRow)]
pub(crate) struct MessageDetailRecord {
    pub id: i64,
    pub body: String,
    pub sent_at: OffsetDateTime,
    pub read_at: Option<OffsetDateTime>,
    pub from_username: String,
    pub from_first_name: String,
    pub from_last_name: String,
    pub from_phone: String,
    pub to_username: String,
    pub to_first_name: String,
    pub to_last_name: String,
    pub to_phone: String,
}

impl From<MessageDetailRecord> for MessageDetail {
    fn from(record: MessageDetailRecord) -> Self {
        Self {
            id: record.id,
            body: record.body,
            sent_at: record.sent_at,
            read_at: record.read_at,
            from_user: UserSummary {
                username: record.from_username,
                first_name: record.from_first_name,
                last_name: record.from_last_name,
                phone: record.from_phone,
            },
            to_user: UserSummary {
                username: record.to_username,
                first_name: record.to_first_name,
                last_name: record.to_last_name,
                phone: record.to_phone,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ReadReceiptRecord {
    pub id: i64,
    pub read_at: OffsetDateTime,
}

impl From<ReadReceiptRecord> for ReadReceipt {
    fn from(record: ReadReceiptRecord) -> Self {
        Self { id: record.id, read_at: record.read_at }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct UserRecord {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub join_at: OffsetDateTime,
    pub last_login_at: Option<OffsetDateTime>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            username: record.username,
            password_hash: record.password_hash,
            first_name: record.first_name,
            last_name: record.last_name,
            phone: record.phone,
            join_at: record.join_at,
            last_login_at: record.last_login_at,
        }
    }
}
