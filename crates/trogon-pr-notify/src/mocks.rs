//! Mock implementations for unit testing without Telegram.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use trogon_bindings::ChatId;

use crate::sender::OutboundSender;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
#[error("mock delivery to chat {0} failed")]
pub struct MockSendError(pub ChatId);

/// Records every message sent during a test run.
///
/// Chats registered with [`fail_for`](Self::fail_for) return an error instead
/// of recording; [`delay`](Self::delay) makes every send sleep first.
#[derive(Clone, Default)]
pub struct MockSender {
    sent: Arc<Mutex<Vec<SentMessage>>>,
    attempts: Arc<Mutex<Vec<ChatId>>>,
    failing: Arc<Mutex<HashSet<ChatId>>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl MockSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, chat_id: ChatId) {
        self.failing.lock().unwrap().insert(chat_id);
    }

    pub fn delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Successfully delivered messages, in send order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Every chat a send was attempted for, including failures.
    pub fn attempts(&self) -> Vec<ChatId> {
        self.attempts.lock().unwrap().clone()
    }
}

impl OutboundSender for MockSender {
    type Error = MockSendError;

    async fn send_message(&self, chat_id: ChatId, text: &str) -> Result<(), Self::Error> {
        self.attempts.lock().unwrap().push(chat_id);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(&chat_id) {
            return Err(MockSendError(chat_id));
        }
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            text: text.to_string(),
        });
        Ok(())
    }
}
