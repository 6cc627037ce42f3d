//! Bind and query operations used by the chat command layer.

use tracing::info;

use crate::binding::{ChatId, UserBinding};
use crate::error::BindingError;
use crate::store::BindingStore;

/// Bind `chat_id` to `login`, replacing any previous binding for the chat.
///
/// Fails with [`BindingError::InvalidLogin`] when the trimmed login is empty.
pub async fn set_login<S: BindingStore>(
    store: &S,
    chat_id: ChatId,
    login: &str,
) -> Result<(), BindingError> {
    let binding = UserBinding::new(chat_id, login)?;
    let github_login = binding.github_login.clone();
    store.upsert(binding).await?;
    info!(chat_id, github_login = %github_login, "GitHub login bound");
    Ok(())
}

/// The GitHub login bound to `chat_id`, or [`BindingError::NotFound`].
pub async fn get_login<S: BindingStore>(store: &S, chat_id: ChatId) -> Result<String, BindingError> {
    let binding = store.get_by_chat(chat_id).await?;
    Ok(binding.github_login.into())
}
