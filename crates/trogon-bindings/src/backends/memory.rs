//! In-memory [`BindingStore`] backend backed by `Arc<RwLock<…>>`.
//!
//! Both indices live behind one lock, so readers always see them in
//! agreement. Readers share the lock; upserts take it exclusively.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::binding::{ChatId, GithubLogin, UserBinding, normalize_login};
use crate::error::BindingError;
use crate::store::BindingStore;

#[derive(Debug, Default)]
struct Indices {
    by_chat: HashMap<ChatId, UserBinding>,
    by_login: HashMap<GithubLogin, HashSet<ChatId>>,
}

impl Indices {
    fn upsert(&mut self, binding: UserBinding) {
        let previous = self
            .by_chat
            .get(&binding.chat_id)
            .map(|b| b.github_login.clone());

        if let Some(previous) = previous {
            if previous == binding.github_login {
                return;
            }
            if let Some(chats) = self.by_login.get_mut(&previous) {
                chats.remove(&binding.chat_id);
                if chats.is_empty() {
                    self.by_login.remove(&previous);
                }
            }
        }

        self.by_login
            .entry(binding.github_login.clone())
            .or_default()
            .insert(binding.chat_id);
        self.by_chat.insert(binding.chat_id, binding);
    }

    fn bindings_for(&self, login: &str) -> Vec<UserBinding> {
        let Some(chats) = self.by_login.get(login) else {
            return Vec::new();
        };
        let mut out: Vec<UserBinding> = chats
            .iter()
            .filter_map(|chat_id| self.by_chat.get(chat_id).cloned())
            .collect();
        out.sort_by_key(|b| b.chat_id);
        out
    }
}

/// Thread-safe in-memory binding store.
///
/// `Clone` shares the underlying data, so one instance can be handed to every
/// request handler.
#[derive(Clone, Default)]
pub struct MemoryBindingStore {
    inner: Arc<RwLock<Indices>>,
}

impl MemoryBindingStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bound chats.
    ///
    /// Counts through a poisoned lock; upserts never leave the indices half
    /// updated.
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_chat
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned<T>(_: T) -> BindingError {
        BindingError::Storage("binding index lock poisoned".to_string())
    }
}

impl BindingStore for MemoryBindingStore {
    async fn upsert(&self, binding: UserBinding) -> Result<(), BindingError> {
        let chat_id = binding.chat_id;
        let mut guard = self.inner.write().map_err(Self::poisoned)?;
        guard.upsert(binding);
        debug!(chat_id, "Binding upserted");
        Ok(())
    }

    async fn get_by_chat(&self, chat_id: ChatId) -> Result<UserBinding, BindingError> {
        let guard = self.inner.read().map_err(Self::poisoned)?;
        guard
            .by_chat
            .get(&chat_id)
            .cloned()
            .ok_or(BindingError::NotFound(chat_id))
    }

    async fn get_by_login(&self, login: &str) -> Result<Vec<UserBinding>, BindingError> {
        let login = normalize_login(login);
        let guard = self.inner.read().map_err(Self::poisoned)?;
        Ok(guard.bindings_for(&login))
    }
}
