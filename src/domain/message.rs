use time::OffsetDateTime;

pub type MessageId = i64;

/// A stored direct message as written by `MessageStore::create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub from_username: String,
    pub to_username: String,
    pub body: String,
    pub sent_at: OffsetDateTime,
    pub read_at: Option<OffsetDateTime>,
}

/// Public projection of a user, joined into message reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// A message together with both of its participants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDetail {
    pub id: MessageId,
    pub body: String,
    pub sent_at: OffsetDateTime,
    pub read_at: Option<OffsetDateTime>,
    pub from_user: UserSummary,
    pub to_user: UserSummary,
}

impl MessageDetail {
    #[must_use]
    pub fn is_participant(&self, username: &str) -> bool {
        self.from_user.username == username || self.to_user.username == username
    }

    #[must_use]
    pub fn is_recipient(&self, username: &str) -> bool {
        self.to_user.username == username
    }
}

/// Outcome of marking a message read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadReceipt {
    pub id: MessageId,
    pub read_at: OffsetDateTime,
}

/// A message as submitted by a client, before the sender has been resolved.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub from_username: Option<String>,
    pub to_username: String,
    pub body: String,
}
