use crate::config::MessagingConfig;
use crate::domain::message::{Message, MessageDetail, MessageDraft, MessageId, ReadReceipt};
use crate::domain::store::MessageStore;
use crate::error::{AppError, Result};
use opentelemetry::{KeyValue, global, metrics::Counter};
use std::sync::Arc;

#[derive(Clone, Debug)]
struct Metrics {
    sent_total: Counter<u64>,
    read_total: Counter<u64>,
    denied_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("messagely-server");
        Self {
            sent_total: meter
                .u64_counter("messagely_messages_sent_total")
                .with_description("Total messages sent")
                .build(),
            read_total: meter
                .u64_counter("messagely_messages_read_total")
                .with_description("Total successful mark-read calls")
                .build(),
            denied_total: meter
                .u64_counter("messagely_authorization_denied_total")
                .with_description("Requests rejected because the caller is not a participant")
                .build(),
        }
    }

    fn deny(&self, operation: &'static str, reason: &str) -> AppError {
        self.denied_total.add(1, &[KeyValue::new("operation", operation)]);
        AppError::Unauthorized(reason.to_string())
    }
}

/// Authorization layer over a `MessageStore`.
///
/// Every operation takes the authenticated caller explicitly and checks it against
/// the message's participants before anything is returned or written.
#[derive(Clone, Debug)]
pub struct MessageService {
    store: Arc<dyn MessageStore>,
    config: MessagingConfig,
    metrics: Metrics,
}

impl MessageService {
    #[must_use]
    pub fn new(store: Arc<dyn MessageStore>, config: MessagingConfig) -> Self {
        Self { store, config, metrics: Metrics::new() }
    }

    /// Reads a message. Only its sender or recipient may see it.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the message does not exist.
    /// Returns `AppError::Unauthorized` if the caller is neither sender nor recipient.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn get_message(&self, caller: &str, id: MessageId) -> Result<MessageDetail> {
        let message = self.store.get(id).await?;

        if !message.is_participant(caller) {
            return Err(self.metrics.deny("get", "You are not authorized to read this message"));
        }

        Ok(message)
    }

    /// Stores a new message from the caller.
    ///
    /// # Errors
    /// Returns `AppError::Unauthorized` if the draft names a sender other than the caller.
    /// Returns `AppError::NotFound` if either username does not exist.
    #[tracing::instrument(
        err(level = "warn"),
        skip(self, draft),
        fields(to_username = %draft.to_username, message_id = tracing::field::Empty)
    )]
    pub async fn send_message(&self, caller: &str, draft: MessageDraft) -> Result<Message> {
        let from_username = self.resolve_sender(caller, draft.from_username.as_deref())?;

        match self.store.create(from_username, &draft.to_username, &draft.body).await {
            Ok(message) => {
                tracing::Span::current().record("message_id", message.id);
                tracing::debug!("Message stored");
                self.metrics.sent_total.add(1, &[KeyValue::new("status", "success")]);
                Ok(message)
            }
            Err(e) => {
                self.metrics.sent_total.add(1, &[KeyValue::new("status", "failure")]);
                Err(e)
            }
        }
    }

    /// Marks a message read. Only the recipient may do this; repeat calls keep the first timestamp.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the message does not exist.
    /// Returns `AppError::Unauthorized` if the caller is not the recipient.
    #[tracing::instrument(err(level = "warn"), skip(self))]
    pub async fn mark_read(&self, caller: &str, id: MessageId) -> Result<ReadReceipt> {
        let message = self.store.get(id).await?;

        if !message.is_recipient(caller) {
            return Err(self.metrics.deny("mark_read", "You are not authorized to read this message!"));
        }

        let receipt = self.store.mark_read(id).await?;
        self.metrics.read_total.add(1, &[]);

        Ok(receipt)
    }

    fn resolve_sender<'a>(&self, caller: &'a str, claimed: Option<&'a str>) -> Result<&'a str> {
        match claimed {
            None => Ok(caller),
            Some(claimed) if claimed == caller => Ok(caller),
            Some(claimed) if self.config.trust_client_sender => {
                tracing::warn!(caller, claimed, "Sending on behalf of another user");
                Ok(claimed)
            }
            Some(_) => Err(self.metrics.deny("send", "You may only send messages as yourself")),
        }
    }
}
