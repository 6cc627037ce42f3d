//! Notification fan-out (login → chats → Telegram).

use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};
use trogon_bindings::{BindingError, BindingStore, ChatId};

use crate::events::NotificationIntent;
use crate::sender::OutboundSender;

/// A single recipient that could not be reached. Does not abort the fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub chat_id: ChatId,
    pub reason: String,
}

/// Outcome of one fan-out, per chat.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: Vec<ChatId>,
    pub failed: Vec<DeliveryFailure>,
    /// Chats not reached because the deadline passed first.
    pub cancelled: Vec<ChatId>,
}

impl DispatchReport {
    pub fn recipients(&self) -> usize {
        self.delivered.len() + self.failed.len() + self.cancelled.len()
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The store could not resolve the recipient; nothing was sent.
    #[error("recipient lookup failed: {0}")]
    Lookup(#[from] BindingError),

    /// The deadline passed while resolving the recipient; nothing was sent.
    #[error("deadline passed during recipient lookup")]
    LookupDeadline,
}

/// Resolves a recipient login to bound chats and sends each one the message.
#[derive(Clone)]
pub struct Notifier<S, O> {
    store: S,
    sender: O,
}

impl<S: BindingStore, O: OutboundSender> Notifier<S, O> {
    pub fn new(store: S, sender: O) -> Self {
        Self { store, sender }
    }

    /// Best-effort fan-out of `intent` to every chat bound to its recipient.
    ///
    /// Sends run one after another. A failed send is recorded and the next
    /// chat is tried. No send starts once `deadline` has passed, and a send
    /// still pending at `deadline` is abandoned; it and every remaining chat
    /// are reported as cancelled. No retries.
    pub async fn dispatch(
        &self,
        intent: &NotificationIntent,
        deadline: Instant,
    ) -> Result<DispatchReport, DispatchError> {
        let lookup = self.store.get_by_login(&intent.recipient_login);
        let bindings = tokio::time::timeout_at(deadline, lookup)
            .await
            .map_err(|_| DispatchError::LookupDeadline)??;

        let mut report = DispatchReport::default();
        let mut chats = bindings.into_iter().map(|b| b.chat_id);

        while let Some(chat_id) = chats.next() {
            if Instant::now() >= deadline {
                report.cancelled.push(chat_id);
                report.cancelled.extend(chats.by_ref());
                warn!(
                    cancelled = report.cancelled.len(),
                    "Notification deadline passed before send, remaining sends abandoned"
                );
                break;
            }

            let send = self.sender.send_message(chat_id, &intent.message);
            match tokio::time::timeout_at(deadline, send).await {
                Ok(Ok(())) => report.delivered.push(chat_id),
                Ok(Err(e)) => {
                    warn!(chat_id, error = %e, "Failed to deliver notification");
                    report.failed.push(DeliveryFailure {
                        chat_id,
                        reason: e.to_string(),
                    });
                }
                Err(_) => {
                    report.cancelled.push(chat_id);
                    report.cancelled.extend(chats.by_ref());
                    warn!(
                        cancelled = report.cancelled.len(),
                        "Notification deadline passed, remaining sends abandoned"
                    );
                    break;
                }
            }
        }

        info!(
            recipient = %intent.recipient_login,
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            cancelled = report.cancelled.len(),
            "Notification dispatched"
        );
        Ok(report)
    }
}
