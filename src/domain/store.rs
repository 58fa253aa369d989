use crate::domain::message::{Message, MessageDetail, MessageId, ReadReceipt};
use crate::domain::user::{NewUser, User};
use crate::error::Result;
use async_trait::async_trait;

/// Persistence for direct messages.
#[async_trait]
pub trait MessageStore: Send + Sync + std::fmt::Debug {
    /// Loads a message with both participants joined in.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if no message has this id.
    async fn get(&self, id: MessageId) -> Result<MessageDetail>;

    /// Persists a new unread message, assigning its id and `sent_at`.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if either username does not exist.
    async fn create(&self, from_username: &str, to_username: &str, body: &str) -> Result<Message>;

    /// Sets `read_at` to now unless it is already set, atomically.
    /// Calling it again returns the original timestamp.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if no message has this id.
    async fn mark_read(&self, id: MessageId) -> Result<ReadReceipt>;

    /// Cheap connectivity probe for readiness checks.
    ///
    /// # Errors
    /// Returns an error if the backing store is unreachable.
    async fn ping(&self) -> Result<()>;
}

/// Persistence for registered users.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug {
    /// # Errors
    /// Returns `AppError::Conflict` if the username is already taken.
    async fn create(&self, user: NewUser) -> Result<User>;

    /// # Errors
    /// Returns `AppError::Database` if the lookup fails.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// # Errors
    /// Returns `AppError::NotFound` if the user does not exist.
    async fn touch_last_login(&self, username: &str) -> Result<()>;
}
