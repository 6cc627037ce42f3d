//! [`BindingStore`] trait: the single source of truth for chat ↔ login bindings.

use std::future::Future;

use crate::binding::{ChatId, UserBinding};
use crate::error::BindingError;

/// Storage for [`UserBinding`]s, indexed by chat and by normalized login.
///
/// Implementations are shared across request handlers, so they must be
/// `Clone + Send + Sync` with clones observing the same data.
///
/// Consistency contract: a read never observes the chat index and the login
/// index disagreeing. A chat returned by [`get_by_login`](Self::get_by_login)
/// is currently bound to that login.
pub trait BindingStore: Send + Sync + Clone + 'static {
    /// Insert or replace the binding for `binding.chat_id`.
    ///
    /// The chat is removed from its previous login's index before it is
    /// added under the new one.
    fn upsert(&self, binding: UserBinding) -> impl Future<Output = Result<(), BindingError>> + Send;

    /// Current binding for `chat_id`, or [`BindingError::NotFound`].
    fn get_by_chat(
        &self,
        chat_id: ChatId,
    ) -> impl Future<Output = Result<UserBinding, BindingError>> + Send;

    /// All bindings whose login equals the normalized `login`.
    ///
    /// An empty result is not an error.
    fn get_by_login(
        &self,
        login: &str,
    ) -> impl Future<Output = Result<Vec<UserBinding>, BindingError>> + Send;
}
