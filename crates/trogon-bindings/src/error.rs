//! Error types for binding operations

use thiserror::Error;

use crate::binding::ChatId;

/// Errors produced by [`BindingStore`](crate::BindingStore) implementations.
///
/// Each variant is a distinct policy decision for callers: `InvalidLogin` is
/// shown to the user, `NotFound` is a normal "not bound yet" state and
/// `Storage` is a system failure.
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("github login is required")]
    InvalidLogin,

    #[error("no github login bound to chat {0}")]
    NotFound(ChatId),

    #[error("binding storage error: {0}")]
    Storage(String),
}

impl BindingError {
    pub(crate) fn storage(context: &str, detail: impl std::fmt::Display) -> Self {
        Self::Storage(format!("{context}: {detail}"))
    }
}
