use std::future::Future;

use trogon_bindings::ChatId;

/// Delivers one message to one chat.
///
/// Implement this to replace Telegram in tests.
/// Implementations make a single attempt; the dispatcher decides what a
/// failure means.
pub trait OutboundSender: Send + Sync + Clone + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
