use crate::domain::message::{Message, MessageDetail, MessageId, ReadReceipt};
use crate::domain::store::{MessageStore, UserStore};
use crate::domain::user::{NewUser, User};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct State {
    users: HashMap<String, User>,
    messages: BTreeMap<MessageId, Message>,
    last_id: MessageId,
}

/// Process-local store holding users and messages behind one lock.
///
/// Clones share the same data. Everything is lost on restart.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn get(&self, id: MessageId) -> Result<MessageDetail> {
        let state = self.state.read().await;
        let message = state.messages.get(&id).ok_or(AppError::NotFound)?;

        // Users are never deleted, so a stored message always resolves both sides.
        let from_user = state.users.get(&message.from_username).ok_or(AppError::Internal)?;
        let to_user = state.users.get(&message.to_username).ok_or(AppError::Internal)?;

        Ok(MessageDetail {
            id: message.id,
            body: message.body.clone(),
            sent_at: message.sent_at,
            read_at: message.read_at,
            from_user: from_user.summary(),
            to_user: to_user.summary(),
        })
    }

    async fn create(&self, from_username: &str, to_username: &str, body: &str) -> Result<Message> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(from_username) || !state.users.contains_key(to_username) {
            return Err(AppError::NotFound);
        }

        state.last_id += 1;
        let message = Message {
            id: state.last_id,
            from_username: from_username.to_string(),
            to_username: to_username.to_string(),
            body: body.to_string(),
            sent_at: OffsetDateTime::now_utc(),
            read_at: None,
        };
        state.messages.insert(message.id, message.clone());

        Ok(message)
    }

    async fn mark_read(&self, id: MessageId) -> Result<ReadReceipt> {
        let mut state = self.state.write().await;
        let message = state.messages.get_mut(&id).ok_or(AppError::NotFound)?;
        let read_at = *message.read_at.get_or_insert_with(OffsetDateTime::now_utc);

        Ok(ReadReceipt { id, read_at })
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User> {
        let mut state = self.state.write().await;
        if state.users.contains_key(&user.username) {
            return Err(AppError::Conflict("Username already taken".into()));
        }

        let user = User {
            username: user.username,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            join_at: OffsetDateTime::now_utc(),
            last_login_at: None,
        };
        state.users.insert(user.username.clone(), user.clone());

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(username).cloned())
    }

    async fn touch_last_login(&self, username: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let user = state.users.get_mut(username).ok_or(AppError::NotFound)?;
        user.last_login_at = Some(OffsetDateTime::now_utc());
        Ok(())
    }
}
